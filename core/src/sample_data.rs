//! The canned demo batch loaded by "Load Sample Data".
//!
//! Two large back-to-back web purchases for CUST-001 at the same shop,
//! a small coffee purchase for the same customer an hour earlier, and an
//! unrelated grocery purchase for CUST-002. Timestamps are relative to `now`
//! so the batch always looks recent.

use crate::model::{Channel, Transaction};
use chrono::{DateTime, Duration, Utc};

pub fn sample_transactions(now: DateTime<Utc>) -> Vec<Transaction> {
    vec![
        tx("tx1001", "CUST-001", "ACC-123", "M-SUSPICIOUS-SHOP", "DEV-01", "10.0.0.5",
           2400.0, now, Channel::Web),
        tx("tx1002", "CUST-001", "ACC-123", "M-SUSPICIOUS-SHOP", "DEV-01", "10.0.0.5",
           2600.0, now + Duration::minutes(3), Channel::Web),
        tx("tx1003", "CUST-001", "ACC-123", "M-COFFEE", "DEV-02", "47.33.21.9",
           4.75, now - Duration::hours(1), Channel::Pos),
        tx("tx1004", "CUST-002", "ACC-555", "M-GROCERY", "DEV-09", "101.88.33.19",
           80.0, now, Channel::Pos),
    ]
}

#[allow(clippy::too_many_arguments)]
fn tx(
    id: &str,
    customer_id: &str,
    account_id: &str,
    merchant_id: &str,
    device_id: &str,
    ip_address: &str,
    amount: f64,
    at: DateTime<Utc>,
    channel: Channel,
) -> Transaction {
    Transaction {
        id:          id.to_string(),
        customer_id: customer_id.to_string(),
        account_id:  account_id.to_string(),
        merchant_id: merchant_id.to_string(),
        device_id:   Some(device_id.to_string()),
        ip_address:  Some(ip_address.to_string()),
        amount,
        currency:    "USD".to_string(),
        timestamp:   at.into(),
        channel,
        country:     Some("US".to_string()),
    }
}
