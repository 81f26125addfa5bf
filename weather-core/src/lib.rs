//! Core library for the `weather` checker.
//!
//! This crate defines:
//! - The OpenWeather client and its request-outcome taxonomy
//! - Report formatting and rule-based recommendations
//! - The on-disk query history
//! - Configuration & credentials handling
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod advice;
pub mod config;
pub mod history;
pub mod model;
pub mod provider;
pub mod report;

pub use advice::{Advisory, advisories, recommend};
pub use config::{API_KEY_ENV, Config};
pub use history::{HistoryError, HistoryStore};
pub use model::{City, HistoryDocument, HistoryRecord, QueryEntry, WeatherPayload};
pub use provider::{RequestOutcome, WeatherProvider, provider_from_config};
pub use report::format_report;
