//! Step module - declarative verification steps and run reports.

pub mod report;
pub mod types;

pub use report::{ConsoleEvent, ConsoleKind, RunReport, StepResult, StepStatus};
pub use types::{Action, Assertion, Capture, OnFailure, Step, WaitCondition};
