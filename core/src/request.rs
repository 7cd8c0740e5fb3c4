//! Summarize request payload.
//!
//! RULE: the payload is built field-by-field from an allowlist. Internal
//! case shape never reaches the wire directly, and every timestamp is
//! rendered in the canonical UTC instant form.

use crate::{
    model::{canonical_instant, Case, Signal, Transaction},
    types::{CaseId, EntityId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseSummaryRequest {
    pub case_id:            CaseId,
    pub customer_id:        EntityId,
    pub primary_account_id: EntityId,
    pub risk_score:         f64,
    pub signals:            Vec<SignalPayload>,
    pub transactions:       Vec<TransactionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalPayload {
    pub name:        String,
    pub score:       f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionPayload {
    pub id:          EntityId,
    pub customer_id: EntityId,
    pub account_id:  EntityId,
    pub merchant_id: EntityId,
    pub device_id:   Option<String>,
    pub ip_address:  Option<String>,
    pub amount:      f64,
    pub currency:    String,
    /// Canonical UTC instant, e.g. `2023-11-14T22:13:20.000Z`.
    pub timestamp:   String,
    pub channel:     String,
    pub country:     Option<String>,
}

impl CaseSummaryRequest {
    pub fn from_case(case: &Case) -> Self {
        Self {
            case_id:            case.case_id.clone(),
            customer_id:        case.customer_id.clone(),
            primary_account_id: case.primary_account_id.clone(),
            risk_score:         case.risk_score,
            signals:            case.signals.iter().map(SignalPayload::from).collect(),
            transactions:       case.transactions.iter().map(TransactionPayload::from).collect(),
        }
    }
}

impl From<&Signal> for SignalPayload {
    fn from(s: &Signal) -> Self {
        Self {
            name:        s.name.clone(),
            score:       s.score,
            explanation: s.explanation.clone(),
        }
    }
}

impl From<&Transaction> for TransactionPayload {
    fn from(t: &Transaction) -> Self {
        Self {
            id:          t.id.clone(),
            customer_id: t.customer_id.clone(),
            account_id:  t.account_id.clone(),
            merchant_id: t.merchant_id.clone(),
            device_id:   t.device_id.clone(),
            ip_address:  t.ip_address.clone(),
            amount:      t.amount,
            currency:    t.currency.clone(),
            timestamp:   canonical_instant(&t.timestamp),
            channel:     t.channel.code().to_string(),
            country:     t.country.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{instant_from_millis, Channel};
    use chrono::{FixedOffset, TimeZone};

    fn case_with_timestamp(ts: chrono::DateTime<FixedOffset>) -> Case {
        Case {
            case_id:            "case-0001".into(),
            customer_id:        "CUST-001".into(),
            primary_account_id: "ACC-123".into(),
            transactions: vec![Transaction {
                id:          "tx1001".into(),
                customer_id: "CUST-001".into(),
                account_id:  "ACC-123".into(),
                merchant_id: "M-SUSPICIOUS-SHOP".into(),
                device_id:   Some("DEV-01".into()),
                ip_address:  None,
                amount:      2400.0,
                currency:    "USD".into(),
                timestamp:   ts,
                channel:     Channel::Web,
                country:     Some("US".into()),
            }],
            risk_score: 0.82,
            signals: vec![Signal {
                name:        "velocity".into(),
                score:       0.9,
                explanation: "Two large web purchases within minutes".into(),
            }],
        }
    }

    #[test]
    fn epoch_millis_serialize_to_canonical_utc() {
        let ts = instant_from_millis(1_700_000_000_000).unwrap();
        let request = CaseSummaryRequest::from_case(&case_with_timestamp(ts));
        assert_eq!(request.transactions[0].timestamp, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn offset_representation_does_not_leak() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let ts = ist.with_ymd_and_hms(2023, 11, 15, 3, 43, 20).unwrap();
        let request = CaseSummaryRequest::from_case(&case_with_timestamp(ts));
        assert_eq!(request.transactions[0].timestamp, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn payload_carries_exactly_the_allowlisted_fields() {
        let ts = instant_from_millis(1_700_000_000_000).unwrap();
        let json = serde_json::to_value(CaseSummaryRequest::from_case(&case_with_timestamp(ts))).unwrap();

        let mut top: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        top.sort();
        assert_eq!(
            top,
            ["case_id", "customer_id", "primary_account_id", "risk_score", "signals", "transactions"]
        );

        let tx = json["transactions"][0].as_object().unwrap();
        assert_eq!(tx.len(), 11);
        assert_eq!(tx["channel"], "WEB");
        assert!(tx["ip_address"].is_null());

        let sig = json["signals"][0].as_object().unwrap();
        assert_eq!(sig.len(), 3);
    }
}
