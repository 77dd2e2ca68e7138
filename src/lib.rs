//! Flowcheck - Scripted UI-Verification Harness
//!
//! Drives a headless browser through a declarative sequence of
//! navigation, interaction, and assertion steps against a running web
//! application, captures screenshots and console telemetry, and
//! reports pass/fail with a CI-friendly exit code.
//!
//! # Architecture
//!
//! - **Core**: Configuration and error handling
//! - **Step**: The declarative step model and run reports
//! - **Browser**: The page capability surface and its agent-browser
//!   backed session
//! - **Runner**: The step-sequencing and assertion engine
//! - **Flows**: Built-in flows and JSON flow-file loading
//!
//! # Usage
//!
//! ```rust,no_run
//! use flowcheck::{flows, Config, StepRunner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let flow = flows::builtin("codenest").unwrap();
//!     let runner = StepRunner::with_config(Config::default());
//!     let report = runner
//!         .run("http://localhost:8080", &flow.steps)
//!         .await
//!         .unwrap();
//!     std::process::exit(report.exit_code());
//! }
//! ```

pub mod browser;
pub mod core;
pub mod flows;
pub mod runner;
pub mod step;

pub use crate::core::{Config, FlowcheckError, Result, Viewport};
pub use crate::step::{RunReport, Step, StepResult, StepStatus};
pub use browser::{BrowserSession, Page};
pub use runner::StepRunner;
