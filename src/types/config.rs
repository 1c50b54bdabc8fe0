//! Rule configuration for a detection run
//!
//! `RuleConfig` is a validated value object: once constructed it is known to
//! have a positive threshold, a positive window and a well-formed high-risk
//! country set. It is immutable for the duration of a run.
//!
//! Configuration is layered: built-in defaults, then an optional JSON file
//! (see [`RuleConfigFile`]), then CLI overrides.

use crate::types::DetectionError;
use chrono::TimeDelta;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Default large-transaction threshold
pub const DEFAULT_LARGE_TX_THRESHOLD: Decimal = Decimal::from_parts(10000, 0, 0, false, 0);

/// Default structuring window length, in hours
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

/// Jurisdictions screened by default
pub const DEFAULT_HIGH_RISK_COUNTRIES: [&str; 4] = ["North Korea", "Iran", "Syria", "Afghanistan"];

/// Validated detection parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfig {
    large_tx_threshold: Decimal,
    structuring_window: TimeDelta,
    high_risk_countries: BTreeSet<String>,
}

impl RuleConfig {
    /// Create a validated configuration
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if:
    /// - `large_tx_threshold` is zero or negative
    /// - `structuring_window` is zero or negative
    /// - any high-risk country entry is empty or whitespace-only
    pub fn new<I, S>(
        large_tx_threshold: Decimal,
        structuring_window: TimeDelta,
        high_risk_countries: I,
    ) -> Result<Self, DetectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if large_tx_threshold <= Decimal::ZERO {
            return Err(DetectionError::config(format!(
                "large transaction threshold must be positive, got {}",
                large_tx_threshold
            )));
        }

        if structuring_window <= TimeDelta::zero() {
            return Err(DetectionError::config(format!(
                "structuring window must be positive, got {}s",
                structuring_window.num_seconds()
            )));
        }

        let mut countries = BTreeSet::new();
        for country in high_risk_countries {
            let country = country.into();
            if country.trim().is_empty() {
                return Err(DetectionError::config(
                    "high-risk country entries must not be blank",
                ));
            }
            countries.insert(country);
        }

        Ok(RuleConfig {
            large_tx_threshold,
            structuring_window,
            high_risk_countries: countries,
        })
    }

    /// Amount above which a single transaction is "large" (strict)
    pub fn large_tx_threshold(&self) -> Decimal {
        self.large_tx_threshold
    }

    /// Length of the closed structuring window
    pub fn structuring_window(&self) -> TimeDelta {
        self.structuring_window
    }

    pub fn high_risk_countries(&self) -> &BTreeSet<String> {
        &self.high_risk_countries
    }

    /// Exact, case-sensitive membership test
    pub fn is_high_risk(&self, country: &str) -> bool {
        self.high_risk_countries.contains(country)
    }

    /// Apply optional overrides on top of this configuration
    ///
    /// Every `Some` replaces the corresponding setting; the result is
    /// re-validated.
    pub fn with_overrides(&self, overrides: RuleOverrides) -> Result<Self, DetectionError> {
        let threshold = overrides
            .large_tx_threshold
            .unwrap_or(self.large_tx_threshold);
        let window = match overrides.structuring_window_hours {
            Some(hours) => TimeDelta::hours(i64::from(hours)),
            None => self.structuring_window,
        };
        let countries = overrides
            .high_risk_countries
            .unwrap_or_else(|| self.high_risk_countries.iter().cloned().collect());

        RuleConfig::new(threshold, window, countries)
    }

    /// Load a configuration from a JSON file layered over the defaults
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the file cannot be read, is not valid
    /// JSON, contains unknown keys, or yields invalid values.
    pub fn from_json_file(path: &Path) -> Result<Self, DetectionError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DetectionError::config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json_str(&content)
    }

    /// Parse a JSON configuration layered over the defaults
    pub fn from_json_str(content: &str) -> Result<Self, DetectionError> {
        let file: RuleConfigFile = serde_json::from_str(content)
            .map_err(|e| DetectionError::config(format!("invalid config file: {}", e)))?;

        RuleConfig::default().with_overrides(file.into())
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            large_tx_threshold: DEFAULT_LARGE_TX_THRESHOLD,
            structuring_window: TimeDelta::hours(i64::from(DEFAULT_WINDOW_HOURS)),
            high_risk_countries: DEFAULT_HIGH_RISK_COUNTRIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

/// Partial settings layered over an existing configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOverrides {
    pub large_tx_threshold: Option<Decimal>,
    pub structuring_window_hours: Option<u32>,
    pub high_risk_countries: Option<Vec<String>>,
}

/// On-disk JSON shape of a rule configuration
///
/// All keys are optional; missing keys keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfigFile {
    pub large_tx_threshold: Option<Decimal>,
    pub structuring_window_hours: Option<u32>,
    pub high_risk_countries: Option<Vec<String>>,
}

impl From<RuleConfigFile> for RuleOverrides {
    fn from(file: RuleConfigFile) -> Self {
        RuleOverrides {
            large_tx_threshold: file.large_tx_threshold,
            structuring_window_hours: file.structuring_window_hours,
            high_risk_countries: file.high_risk_countries,
        }
    }
}
