//! Per-record rule outcomes

use serde::Serialize;
use std::fmt;

/// Rules evaluated by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rule {
    LargeTransaction,
    Structuring,
    HighRiskCountry,
}

impl Rule {
    /// All rules, in reporting order
    pub const ALL: [Rule; 3] = [Rule::LargeTransaction, Rule::Structuring, Rule::HighRiskCountry];

    /// Human-readable rule label used in summaries
    pub fn label(self) -> &'static str {
        match self {
            Rule::LargeTransaction => "Large Transaction",
            Rule::Structuring => "Structuring",
            Rule::HighRiskCountry => "High-Risk Country",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the context-free rules for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaticFlags {
    pub large_tx: bool,
    pub high_risk_country: bool,
}

/// All rule outcomes for one record
///
/// Built once by the combiner and never mutated. `suspicious` is derived, so
/// it can never disagree with the individual flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct FlagSet {
    large_tx: bool,
    high_risk_country: bool,
    structuring: bool,
}

impl FlagSet {
    pub fn new(large_tx: bool, high_risk_country: bool, structuring: bool) -> Self {
        FlagSet {
            large_tx,
            high_risk_country,
            structuring,
        }
    }

    /// Union the static rule outcomes with the structuring outcome
    pub fn combine(static_flags: StaticFlags, structuring: bool) -> Self {
        FlagSet::new(
            static_flags.large_tx,
            static_flags.high_risk_country,
            structuring,
        )
    }

    pub fn large_tx(&self) -> bool {
        self.large_tx
    }

    pub fn high_risk_country(&self) -> bool {
        self.high_risk_country
    }

    pub fn structuring(&self) -> bool {
        self.structuring
    }

    pub fn suspicious(&self) -> bool {
        self.large_tx || self.high_risk_country || self.structuring
    }

    /// Whether the given rule fired
    pub fn is_set(&self, rule: Rule) -> bool {
        match rule {
            Rule::LargeTransaction => self.large_tx,
            Rule::Structuring => self.structuring,
            Rule::HighRiskCountry => self.high_risk_country,
        }
    }
}
