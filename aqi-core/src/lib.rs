//! Core library for the `air` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The saved-stations registry
//! - Abstraction over the AQI provider (WAQI)
//! - AQI severity lookup and table rows
//!
//! It is used by `aqi-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod level;
pub mod model;
pub mod provider;
pub mod registry;
pub mod report;
pub mod show;

pub use config::Config;
pub use level::{AqiLevel, LevelInfo};
pub use model::{AqiValue, Station, StationReading};
pub use provider::{AqiError, AqiProvider};
pub use registry::{AddOutcome, StationRegistry};
pub use report::ReportRow;
