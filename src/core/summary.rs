//! Summary aggregation over a detection result
//!
//! Everything here is derived from the flagged entries alone, so a summary
//! can be recomputed at any time without re-running detection.

use crate::types::{DetectionError, FlaggedTransaction, Rule};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Number of countries reported in [`SummaryStats::top_countries`]
pub const TOP_COUNTRIES: usize = 3;

/// Per-rule trigger counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RuleCounts {
    pub large_tx: usize,
    pub structuring: usize,
    pub high_risk_country: usize,
}

impl RuleCounts {
    pub fn get(&self, rule: Rule) -> usize {
        match rule {
            Rule::LargeTransaction => self.large_tx,
            Rule::Structuring => self.structuring,
            Rule::HighRiskCountry => self.high_risk_country,
        }
    }

    /// `(label, count)` pairs in reporting order
    pub fn labelled(&self) -> Vec<(&'static str, usize)> {
        Rule::ALL
            .iter()
            .map(|rule| (rule.label(), self.get(*rule)))
            .collect()
    }
}

/// Suspicious-transaction count for one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// Aggregate statistics for one detection run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_transactions: usize,
    pub total_volume: Decimal,
    pub suspicious_count: usize,
    /// `100 * suspicious_count / total_transactions`, or 0 for an empty batch
    pub suspicious_percentage: f64,
    pub rule_counts: RuleCounts,
    /// Top countries by suspicious count; ties keep first-encountered order
    pub top_countries: Vec<CountryCount>,
}

impl SummaryStats {
    /// Derive summary statistics from flagged entries
    ///
    /// # Errors
    ///
    /// Returns an `ArithmeticOverflow` error if the total volume overflows.
    pub fn from_entries(entries: &[FlaggedTransaction]) -> Result<Self, DetectionError> {
        let mut total_volume = Decimal::ZERO;
        let mut suspicious_count = 0;
        let mut rule_counts = RuleCounts::default();
        // Countries in first-encountered order, with an index for lookups
        let mut countries: Vec<CountryCount> = Vec::new();
        let mut country_index: HashMap<&str, usize> = HashMap::new();

        for entry in entries {
            total_volume = total_volume
                .checked_add(entry.record.amount())
                .ok_or_else(|| DetectionError::arithmetic_overflow("total volume", None))?;

            let flags = entry.flags;
            rule_counts.large_tx += usize::from(flags.large_tx());
            rule_counts.structuring += usize::from(flags.structuring());
            rule_counts.high_risk_country += usize::from(flags.high_risk_country());

            if flags.suspicious() {
                suspicious_count += 1;
                let country = entry.record.country();
                match country_index.get(country) {
                    Some(&idx) => countries[idx].count += 1,
                    None => {
                        country_index.insert(country, countries.len());
                        countries.push(CountryCount {
                            country: country.to_string(),
                            count: 1,
                        });
                    }
                }
            }
        }

        // Stable sort: equal counts keep first-encountered order
        countries.sort_by(|a, b| b.count.cmp(&a.count));
        countries.truncate(TOP_COUNTRIES);

        Ok(SummaryStats {
            total_transactions: entries.len(),
            total_volume,
            suspicious_count,
            suspicious_percentage: percentage(suspicious_count, entries.len()),
            rule_counts,
            top_countries: countries,
        })
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}
