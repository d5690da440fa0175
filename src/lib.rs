//! Social Security retirement benefit estimator.
//!
//! - `core`: input normalization, full retirement age, benefit engine and
//!   the `{data, error}` response envelope
//! - `config`: statutory constants, optionally loaded from TOML
//! - `api`: axum HTTP routes and the command-line front end

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use config::EstimatorConfig;
pub use error::{AppError, ConfigError, ValidationError};
