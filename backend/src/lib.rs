//! Trainer and client coaching backend.
//!
//! The crate is laid out hexagonally: [`domain`] owns entities, services and
//! the port traits; [`outbound`] implements the driven ports over PostgreSQL
//! and S3-compatible storage; [`wiring`] assembles the service graph.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
pub mod wiring;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{AppSettings, ConfigError};
pub use wiring::{DrivenPorts, Services};
