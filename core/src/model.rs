//! Wire records exchanged with the analysis and summary services.
//!
//! These are fixed-schema: unknown fields from the service are ignored,
//! missing required fields fail deserialization.

use crate::types::{CaseId, EntityId};
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Characters of a case id shown in list and detail headers.
pub const SHORT_ID_LEN: usize = 8;

// ── Transaction ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id:          EntityId,
    pub customer_id: EntityId,
    pub account_id:  EntityId,
    pub merchant_id: EntityId,
    #[serde(default)]
    pub device_id:   Option<String>,
    #[serde(default)]
    pub ip_address:  Option<String>,
    pub amount:      f64,
    #[serde(default = "default_currency")]
    pub currency:    String,
    #[serde(with = "instant")]
    pub timestamp:   DateTime<FixedOffset>,
    pub channel:     Channel,
    #[serde(default)]
    pub country:     Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Payment channel. Unknown codes are kept verbatim so they round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Channel {
    Web,
    Pos,
    Mobile,
    Atm,
    Branch,
    Other(String),
}

impl Channel {
    pub fn code(&self) -> &str {
        match self {
            Self::Web      => "WEB",
            Self::Pos      => "POS",
            Self::Mobile   => "MOBILE",
            Self::Atm      => "ATM",
            Self::Branch   => "BRANCH",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for Channel {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WEB"    => Self::Web,
            "POS"    => Self::Pos,
            "MOBILE" => Self::Mobile,
            "ATM"    => Self::Atm,
            "BRANCH" => Self::Branch,
            _        => Self::Other(raw),
        }
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Other(s) => s,
            known             => known.code().to_string(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ── Signal / Case / Summary ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    pub name:        String,
    pub score:       f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub case_id:            CaseId,
    pub customer_id:        EntityId,
    pub primary_account_id: EntityId,
    pub transactions:       Vec<Transaction>,
    pub risk_score:         f64,
    pub signals:            Vec<Signal>,
}

impl Case {
    /// Leading characters of the case id, safe on any char boundary.
    pub fn short_id(&self) -> String {
        self.case_id.chars().take(SHORT_ID_LEN).collect()
    }

    /// Transaction amounts summed per currency code, ordered by code.
    pub fn totals_by_currency(&self) -> BTreeMap<&str, f64> {
        let mut totals = BTreeMap::new();
        for t in &self.transactions {
            *totals.entry(t.currency.as_str()).or_insert(0.0) += t.amount;
        }
        totals
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub narrative:      String,
    pub recommendation: String,
}

// ── Instants ─────────────────────────────────────────────────────────────────

/// Canonical textual form of an instant: UTC, millisecond precision, `Z` suffix.
pub fn canonical_instant(ts: &DateTime<FixedOffset>) -> String {
    ts.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an instant from any of the forms the analysis service emits:
/// HTTP-date, RFC 3339 with offset, offset-less ISO (taken as UTC), or epoch millis.
pub fn parse_instant(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    // Flask renders datetimes as HTTP-dates: "Tue, 14 Nov 2023 22:13:20 GMT".
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc().into());
        }
    }
    raw.parse::<i64>().ok().and_then(instant_from_millis)
}

pub fn instant_from_millis(ms: i64) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(Into::into)
}

pub(crate) mod instant {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawInstant {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<FixedOffset>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&canonical_instant(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<FixedOffset>, D::Error> {
        match RawInstant::deserialize(d)? {
            RawInstant::Millis(ms) => instant_from_millis(ms)
                .ok_or_else(|| serde::de::Error::custom(format!("epoch millis out of range: {ms}"))),
            RawInstant::Text(raw) => parse_instant(&raw)
                .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp: {raw}"))),
        }
    }
}
