//! Step outcome and run report types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Outcome status of one step.
///
/// FAIL means an assertion evaluated false; ERROR means the harness
/// could not even evaluate (action failed, wait timed out). Callers
/// can tell "app is broken" from "harness couldn't check".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    Pass,
    Fail,
    Error,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Pass => write!(f, "PASS"),
            StepStatus::Fail => write!(f, "FAIL"),
            StepStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of executing one step. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Name of the step this result belongs to
    pub step_name: String,
    /// Outcome status
    pub status: StepStatus,
    /// Ordered human-readable diagnostics
    pub messages: Vec<String>,
    /// Screenshot path, when a capture succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<PathBuf>,
}

impl StepResult {
    /// Create a passing result
    pub fn pass(step_name: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Pass,
            messages,
            artifact_path: None,
        }
    }

    /// Create a failing result (assertion evaluated false)
    pub fn fail(step_name: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Fail,
            messages,
            artifact_path: None,
        }
    }

    /// Create an error result (action or wait could not complete)
    pub fn error(step_name: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Error,
            messages,
            artifact_path: None,
        }
    }

    /// Attach a captured artifact path
    pub fn with_artifact(mut self, path: PathBuf) -> Self {
        self.artifact_path = Some(path);
        self
    }
}

/// Console/page-error telemetry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleKind {
    Log,
    PageError,
}

impl fmt::Display for ConsoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleKind::Log => write!(f, "CONSOLE"),
            ConsoleKind::PageError => write!(f, "JS ERROR"),
        }
    }
}

/// One console message or page error emitted by the browser during
/// the run. Collected in arrival order for the whole run; not tied to
/// step boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleEvent {
    pub kind: ConsoleKind,
    pub text: String,
}

impl ConsoleEvent {
    pub fn log(text: impl Into<String>) -> Self {
        Self {
            kind: ConsoleKind::Log,
            text: text.into(),
        }
    }

    pub fn page_error(text: impl Into<String>) -> Self {
        Self {
            kind: ConsoleKind::PageError,
            text: text.into(),
        }
    }
}

/// Aggregate of all step results for one run.
///
/// Created empty at run start, appended to after each step, finalized
/// after the last step or an early halt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Per-step results in execution order
    pub results: Vec<StepResult>,
    /// Browser telemetry in arrival order
    pub console: Vec<ConsoleEvent>,
    /// Whether the run stopped before executing every step
    pub halted: bool,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step result
    pub fn push(&mut self, result: StepResult) {
        self.results.push(result);
    }

    /// Append newly drained console events
    pub fn extend_console(&mut self, events: Vec<ConsoleEvent>) {
        self.console.extend(events);
    }

    /// Mark the run as halted before completing all steps
    pub fn mark_halted(&mut self) {
        self.halted = true;
    }

    /// Overall PASS iff every executed step passed and at least one ran
    pub fn overall_pass(&self) -> bool {
        !self.results.is_empty()
            && !self.halted
            && self.results.iter().all(|r| r.status == StepStatus::Pass)
    }

    /// Process exit code: 0 on overall PASS, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.overall_pass() {
            0
        } else {
            1
        }
    }

    /// Count of page errors observed during the run
    pub fn page_error_count(&self) -> usize {
        self.console
            .iter()
            .filter(|e| e.kind == ConsoleKind::PageError)
            .count()
    }

    /// Render the final summary listing every step's status.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("Verification summary\n");
        out.push_str("─────────────────────────────\n");
        for result in &self.results {
            out.push_str(&format!("{:5}  {}\n", result.status.to_string(), result.step_name));
            for msg in &result.messages {
                out.push_str(&format!("       - {}\n", msg));
            }
            if let Some(path) = &result.artifact_path {
                out.push_str(&format!("       artifact: {}\n", path.display()));
            }
        }
        if self.halted {
            out.push_str("Run halted before completing all steps.\n");
        }
        out.push_str(&format!(
            "Console events: {} ({} page errors)\n",
            self.console.len(),
            self.page_error_count()
        ));
        out.push_str(&format!(
            "Overall: {}\n",
            if self.overall_pass() { "PASS" } else { "FAIL" }
        ));
        out
    }
}
