//! Statutory constants used by the benefit engine.
//!
//! Built once at start-up (defaults or a TOML file) and shared read-only.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound for every configured claiming age.
pub const MAX_CLAIMING_AGE: u32 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarlyReduction {
    /// Months early covered by the first, steeper tier.
    pub first_tier_months: u32,
    pub first_tier_monthly_rate: f64,
    pub extra_monthly_rate: f64,
}

impl Default for EarlyReduction {
    fn default() -> Self {
        Self {
            first_tier_months: 36,
            first_tier_monthly_rate: 5.0 / 900.0,
            extra_monthly_rate: 5.0 / 1200.0,
        }
    }
}

/// Delayed retirement credit for everyone whose SSA birth year is at least
/// `first_birth_year`, until the next band starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayedCreditBand {
    pub first_birth_year: i32,
    pub annual_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub taxable_maximum: u64,
    pub bend_points: [u64; 2],
    pub pia_factors: [f64; 3],
    pub early_reduction: EarlyReduction,
    pub delayed_credits: Vec<DelayedCreditBand>,
    pub earliest_claiming_age: u32,
    pub latest_credit_age: u32,
    /// Requested claims past this age are rejected.
    pub latest_claiming_age: u32,
    /// Annual cost-of-living growth used for future-dollar estimates.
    pub cola_rate: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            taxable_maximum: 168_600,
            bend_points: [1_174, 7_078],
            pia_factors: [0.90, 0.32, 0.15],
            early_reduction: EarlyReduction::default(),
            delayed_credits: default_delayed_credits(),
            earliest_claiming_age: 62,
            latest_credit_age: 70,
            latest_claiming_age: 100,
            cola_rate: 0.025,
        }
    }
}

fn default_delayed_credits() -> Vec<DelayedCreditBand> {
    let mut bands = vec![DelayedCreditBand {
        first_birth_year: i32::MIN,
        annual_rate: 0.03,
    }];
    // Half a point more every two birth years from 1925 until the 8% cap in 1943.
    for step in 0..9 {
        bands.push(DelayedCreditBand {
            first_birth_year: 1925 + step * 2,
            annual_rate: 0.035 + f64::from(step) * 0.005,
        });
    }
    bands.push(DelayedCreditBand {
        first_birth_year: 1943,
        annual_rate: 0.08,
    });
    bands
}

impl EstimatorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EstimatorConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.taxable_maximum == 0 {
            return Err(invalid("taxable_maximum", "must be > 0"));
        }

        let [first, second] = self.bend_points;
        if first == 0 || second <= first {
            return Err(invalid(
                "bend_points",
                format!("must be ascending and positive, got [{first}, {second}]"),
            ));
        }

        for factor in self.pia_factors {
            if !(0.0..=1.0).contains(&factor) {
                return Err(invalid(
                    "pia_factors",
                    format!("{factor} must be between 0 and 1"),
                ));
            }
        }

        let early = &self.early_reduction;
        for (field, rate) in [
            ("early_reduction.first_tier_monthly_rate", early.first_tier_monthly_rate),
            ("early_reduction.extra_monthly_rate", early.extra_monthly_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(invalid(field, format!("{rate} must be >= 0")));
            }
        }

        if self.delayed_credits.is_empty() {
            return Err(invalid("delayed_credits", "at least one band is required"));
        }
        for pair in self.delayed_credits.windows(2) {
            if pair[1].first_birth_year <= pair[0].first_birth_year {
                return Err(invalid(
                    "delayed_credits",
                    format!(
                        "bands must be ascending by first_birth_year ({} follows {})",
                        pair[1].first_birth_year, pair[0].first_birth_year
                    ),
                ));
            }
        }
        if let Some(band) = self
            .delayed_credits
            .iter()
            .find(|band| !band.annual_rate.is_finite() || band.annual_rate < 0.0)
        {
            return Err(invalid(
                "delayed_credits",
                format!("annual_rate {} must be >= 0", band.annual_rate),
            ));
        }

        if self.earliest_claiming_age > self.latest_credit_age {
            return Err(invalid(
                "earliest_claiming_age",
                "must be <= latest_credit_age",
            ));
        }
        if self.latest_credit_age > self.latest_claiming_age {
            return Err(invalid(
                "latest_credit_age",
                "must be <= latest_claiming_age",
            ));
        }
        if self.latest_claiming_age > MAX_CLAIMING_AGE {
            return Err(invalid(
                "latest_claiming_age",
                format!("must be <= {MAX_CLAIMING_AGE}"),
            ));
        }

        if !self.cola_rate.is_finite() || self.cola_rate <= -1.0 {
            return Err(invalid("cola_rate", "must be > -1"));
        }

        Ok(())
    }

    /// Annual delayed retirement credit for an SSA birth year.
    pub fn delayed_credit_rate(&self, birth_year: i32) -> f64 {
        self.delayed_credits
            .iter()
            .take_while(|band| band.first_birth_year <= birth_year)
            .last()
            .or_else(|| self.delayed_credits.first())
            .map(|band| band.annual_rate)
            .unwrap_or(0.0)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_config_is_valid() {
        EstimatorConfig::default()
            .validate()
            .expect("defaults must validate");
    }

    #[test]
    fn delayed_credit_rate_follows_statutory_bands() {
        let config = EstimatorConfig::default();
        assert_approx(config.delayed_credit_rate(1920), 0.03);
        assert_approx(config.delayed_credit_rate(1924), 0.03);
        assert_approx(config.delayed_credit_rate(1925), 0.035);
        assert_approx(config.delayed_credit_rate(1936), 0.06);
        assert_approx(config.delayed_credit_rate(1941), 0.075);
        assert_approx(config.delayed_credit_rate(1942), 0.075);
        assert_approx(config.delayed_credit_rate(1943), 0.08);
        assert_approx(config.delayed_credit_rate(1990), 0.08);
    }

    #[test]
    fn validate_rejects_unordered_bend_points() {
        let config = EstimatorConfig {
            bend_points: [7_078, 1_174],
            ..EstimatorConfig::default()
        };
        let err = config.validate().expect_err("must reject bend point order");
        assert!(err.to_string().contains("bend_points"));
    }

    #[test]
    fn validate_rejects_factor_above_one() {
        let config = EstimatorConfig {
            pia_factors: [1.2, 0.32, 0.15],
            ..EstimatorConfig::default()
        };
        let err = config.validate().expect_err("must reject factor");
        assert!(err.to_string().contains("pia_factors"));
    }

    #[test]
    fn validate_rejects_descending_credit_bands() {
        let config = EstimatorConfig {
            delayed_credits: vec![
                DelayedCreditBand {
                    first_birth_year: 1943,
                    annual_rate: 0.08,
                },
                DelayedCreditBand {
                    first_birth_year: 1930,
                    annual_rate: 0.045,
                },
            ],
            ..EstimatorConfig::default()
        };
        let err = config.validate().expect_err("must reject band order");
        assert!(err.to_string().contains("delayed_credits"));
    }

    #[test]
    fn validate_bounds_claiming_ages() {
        let config = EstimatorConfig {
            latest_credit_age: 4_000_000,
            ..EstimatorConfig::default()
        };
        let err = config.validate().expect_err("must reject huge credit age");
        assert!(err.to_string().contains("latest_credit_age"));

        let config = EstimatorConfig {
            latest_credit_age: 130,
            latest_claiming_age: 130,
            ..EstimatorConfig::default()
        };
        let err = config.validate().expect_err("must reject ages past the cap");
        assert!(err.to_string().contains("latest_claiming_age"));

        let config = EstimatorConfig {
            latest_credit_age: MAX_CLAIMING_AGE,
            latest_claiming_age: MAX_CLAIMING_AGE,
            ..EstimatorConfig::default()
        };
        config.validate().expect("ages at the cap are allowed");
    }

    #[test]
    fn load_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "taxable_maximum = 176100\nbend_points = [1226, 7391]\ncola_rate = 0.0\n"
        )
        .expect("write config");

        let config = EstimatorConfig::load(file.path()).expect("config should load");
        assert_eq!(config.taxable_maximum, 176_100);
        assert_eq!(config.bend_points, [1_226, 7_391]);
        assert_approx(config.cola_rate, 0.0);
        assert_eq!(config.earliest_claiming_age, 62);
        assert_eq!(config.early_reduction, EarlyReduction::default());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "taxable_maximum = \"lots\"").expect("write config");

        let err = EstimatorConfig::load(file.path()).expect_err("must reject bad toml");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "earliest_claiming_age = 71").expect("write config");

        let err = EstimatorConfig::load(file.path()).expect_err("must reject ages");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "earliest_claiming_age",
                ..
            }
        ));
    }
}
