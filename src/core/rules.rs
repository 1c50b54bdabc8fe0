//! Static rule evaluation
//!
//! Context-free predicates evaluated independently per record. No ordering
//! dependency and no shared state, so callers may evaluate records in any
//! order or in parallel.

use crate::types::{RuleConfig, StaticFlags, TransactionRecord};

/// `amount > threshold` (strict)
pub fn is_large_transaction(record: &TransactionRecord, config: &RuleConfig) -> bool {
    record.amount() > config.large_tx_threshold()
}

/// Exact, case-sensitive membership of the record's country
pub fn is_high_risk_country(record: &TransactionRecord, config: &RuleConfig) -> bool {
    config.is_high_risk(record.country())
}

/// Evaluate every static rule for one record
pub fn evaluate(record: &TransactionRecord, config: &RuleConfig) -> StaticFlags {
    StaticFlags {
        large_tx: is_large_transaction(record, config),
        high_risk_country: is_high_risk_country(record, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn record(amount: Decimal, country: &str) -> TransactionRecord {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        TransactionRecord::new("T1", "S1", ts, amount, country).unwrap()
    }

    #[rstest]
    #[case::above(Decimal::new(15000, 0), true)]
    #[case::exactly_threshold(Decimal::new(10000, 0), false)]
    #[case::just_above(Decimal::new(1000001, 2), true)]
    #[case::below(Decimal::new(9999, 0), false)]
    #[case::zero(Decimal::ZERO, false)]
    fn test_large_transaction_is_strict(#[case] amount: Decimal, #[case] expected: bool) {
        let config = RuleConfig::default();
        assert_eq!(is_large_transaction(&record(amount, "Germany"), &config), expected);
    }

    #[rstest]
    #[case("North Korea", true)]
    #[case("Afghanistan", true)]
    #[case("SYRIA", false)]
    #[case("", false)]
    fn test_high_risk_country(#[case] country: &str, #[case] expected: bool) {
        let config = RuleConfig::default();
        assert_eq!(is_high_risk_country(&record(Decimal::ONE, country), &config), expected);
    }

    #[test]
    fn test_high_risk_small_amount() {
        let flags = evaluate(&record(Decimal::new(10, 0), "Iran"), &RuleConfig::default());
        assert_eq!(
            flags,
            StaticFlags {
                large_tx: false,
                high_risk_country: true,
            }
        );
    }
}
