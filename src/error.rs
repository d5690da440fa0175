use std::path::PathBuf;

use thiserror::Error;

/// Client-side input problems. Every variant maps to a 400 response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid date of birth '{0}': expected a past date formatted YYYY-MM-DD")]
    InvalidDob(String),

    #[error("invalid income '{0}': expected a whole-dollar amount such as 40000 or $40,000")]
    InvalidIncome(String),

    #[error("invalid birth year '{0}': expected a four-digit year")]
    InvalidYear(String),

    #[error("missing required field(s): {}", .0.join(", "))]
    MissingField(Vec<&'static str>),

    #[error("invalid claiming date: {0}")]
    InvalidClaimDate(String),

    #[error("invalid dollars flag '{0}': expected 1 for current dollars or 0 for future dollars")]
    InvalidDollars(String),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidDob(_) => "invalid_dob",
            ValidationError::InvalidIncome(_) => "invalid_income",
            ValidationError::InvalidYear(_) => "invalid_year",
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::InvalidClaimDate(_) => "invalid_claim_date",
            ValidationError::InvalidDollars(_) => "invalid_dollars",
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Failures that end a CLI run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
