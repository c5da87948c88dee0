//! Transaction list filters and their query-string encoding.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use reqwest::Url;

use crate::models::TxType;

/// Throwaway base for the form-urlencoded serializer; never contacted.
const ENCODER_BASE: &str = "http://localhost/";

/// User-entered constraints on the transaction list. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub tx_type: Option<TxType>,
    pub category_id: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub query: Option<String>,
    pub limit: Option<u32>,
}

impl FilterCriteria {
    /// Only a result-count limit, as used by the recent transactions view
    pub fn limited(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Blank search text counts as absent.
    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

pub struct FilterQueryBuilder;

impl FilterQueryBuilder {
    /// Encode `criteria` using the machine's local timezone for date bounds.
    pub fn build(criteria: &FilterCriteria) -> String {
        Self::build_in(criteria, &Local)
    }

    pub fn build_in<Tz: TimeZone>(criteria: &FilterCriteria, tz: &Tz) -> String {
        let pairs = Self::pairs_in(criteria, tz);
        if pairs.is_empty() {
            return String::new();
        }
        let Ok(mut url) = Url::parse(ENCODER_BASE) else {
            return String::new();
        };
        url.query_pairs_mut().extend_pairs(&pairs);
        url.query().unwrap_or_default().to_string()
    }

    /// Query pairs in their fixed key order; absent fields contribute nothing.
    pub fn pairs_in<Tz: TimeZone>(criteria: &FilterCriteria, tz: &Tz) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(t) = criteria.tx_type {
            pairs.push(("type", t.as_str().to_string()));
        }
        if let Some(id) = criteria.category_id {
            pairs.push(("category_id", id.to_string()));
        }
        if let Some(from) = criteria.date_from {
            pairs.push(("date_from", encode_instant(start_of_day(tz, from))));
        }
        if let Some(to) = criteria.date_to {
            pairs.push(("date_to", encode_instant(end_of_day(tz, to))));
        }
        if let Some(q) = criteria.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            pairs.push(("q", q.to_string()));
        }
        if let Some(limit) = criteria.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

fn encode_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 00:00:00 local on `date`, as an absolute instant
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    resolve_local(tz, naive, true)
}

/// 23:59:59 local on `date`, as an absolute instant
pub fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_hms_opt(23, 59, 59).unwrap_or_else(|| date.and_time(NaiveTime::MIN));
    resolve_local(tz, naive, false)
}

/// Map a wall-clock time to an instant. Ambiguous times take the earliest (start) or
/// latest (end) reading; times inside a DST gap move forward an hour.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime, earliest: bool) -> DateTime<Utc> {
    let pick = |n: &NaiveDateTime| {
        let mapped = tz.from_local_datetime(n);
        if earliest {
            mapped.earliest()
        } else {
            mapped.latest()
        }
    };
    pick(&naive)
        .or_else(|| pick(&(naive + chrono::Duration::hours(1))))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
