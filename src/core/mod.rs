//! Core module - shared infrastructure for flowcheck
//!
//! Contains configuration and error handling used throughout the crate.

pub mod config;
pub mod error;

pub use config::{BrowserConfig, Config, RunnerConfig, Viewport};
pub use error::{FlowcheckError, Result};
