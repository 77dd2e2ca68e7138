//! The declarative Step data model.
//!
//! A verification flow is plain data: an ordered list of steps, each
//! bundling its actions, wait condition, assertions, capture request,
//! and failure policy. The same runner executes any flow without code
//! changes, and flows round-trip through serde so they can live in
//! JSON files next to the app they verify.

use serde::{Deserialize, Serialize};

/// One navigate/act/wait/assert/capture unit in a verification flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Human label, e.g. "Open Settings"
    pub name: String,

    /// Browser commands performed in order before the wait/assertions
    #[serde(default)]
    pub actions: Vec<Action>,

    /// Condition the page must reach before assertions run.
    /// Absent means assert immediately against current DOM state.
    #[serde(default)]
    pub wait: Option<WaitCondition>,

    /// Checks against page state, evaluated in order, first false wins
    #[serde(default)]
    pub assertions: Vec<Assertion>,

    /// Optional screenshot request; evidence, not a correctness check
    #[serde(default)]
    pub capture: Option<Capture>,

    /// Whether a FAIL/ERROR on this step stops the run
    #[serde(default)]
    pub on_failure: OnFailure,

    /// Wait-condition timeout override in ms (run default otherwise)
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Delay between actions and wait/assertions, for CSS transitions
    /// and other animation settling
    #[serde(default)]
    pub settle_ms: Option<u64>,
}

impl Step {
    /// Create a bare step with a name; builder methods fill the rest.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
            wait: None,
            assertions: Vec::new(),
            capture: None,
            on_failure: OnFailure::default(),
            timeout_ms: None,
            settle_ms: None,
        }
    }

    /// Append an action
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Set the wait condition
    pub fn wait_for(mut self, condition: WaitCondition) -> Self {
        self.wait = Some(condition);
        self
    }

    /// Append an assertion
    pub fn assert(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Request a screenshot after assertions
    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Halt the run if this step does not PASS
    pub fn halt_on_failure(mut self) -> Self {
        self.on_failure = OnFailure::Halt;
        self
    }

    /// Override the wait timeout for this step
    pub fn timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Sleep after actions before wait/assertions
    pub fn settle(mut self, ms: u64) -> Self {
        self.settle_ms = Some(ms);
        self
    }
}

/// A browser command performed as part of a step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Navigate to a URL. Relative values (including "#/fragment"
    /// routes) are resolved against the run's base location; an empty
    /// string means the base itself.
    Navigate {
        #[serde(default)]
        url: String,
    },
    /// Click an element matching a CSS selector
    Click { selector: String },
    /// Fill an input element with text
    Fill { selector: String, value: String },
    /// Evaluate a JavaScript expression on the page
    Evaluate { script: String },
}

/// Condition a step waits for before asserting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaitCondition {
    /// An element matching the selector is present and visible
    Selector { selector: String },
    /// The given text appears anywhere on the page
    Text { text: String },
    /// A JavaScript expression polled until it evaluates truthy
    Predicate { script: String },
}

impl WaitCondition {
    /// Short description for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Self::Selector { selector } => format!("selector {}", selector),
            Self::Text { text } => format!("text '{}'", text),
            Self::Predicate { script } => format!("predicate {}", script),
        }
    }
}

/// A check against page state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Assertion {
    /// The element's text content contains the expected substring
    TextContains { selector: String, expected: String },
    /// The element's attribute value contains the expected substring
    AttributeContains {
        selector: String,
        attribute: String,
        expected: String,
    },
    /// The element's attribute value does not contain the rejected
    /// substring; a missing attribute counts as absent and passes
    AttributeExcludes {
        selector: String,
        attribute: String,
        rejected: String,
    },
    /// The element is visible
    Visible { selector: String },
    /// The element is absent or not visible
    Hidden { selector: String },
}

/// Screenshot request attached to a step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    /// File name under the configured screenshot directory.
    /// Defaults to a sanitized form of the step name.
    #[serde(default)]
    pub file: Option<String>,
    /// Capture the full scrollable page rather than the viewport
    #[serde(default)]
    pub full_page: bool,
}

impl Capture {
    /// Viewport-sized screenshot with a default file name
    pub fn viewport() -> Self {
        Self {
            file: None,
            full_page: false,
        }
    }

    /// Full-page screenshot with a default file name
    pub fn full_page() -> Self {
        Self {
            file: None,
            full_page: true,
        }
    }

    /// Set an explicit file name
    pub fn named(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Per-step failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Stop processing further steps
    Halt,
    /// Record the result and keep going
    #[default]
    Continue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_builder() {
        let step = Step::new("Load Home")
            .action(Action::Navigate { url: String::new() })
            .wait_for(WaitCondition::Selector {
                selector: "#view-home".to_string(),
            })
            .assert(Assertion::TextContains {
                selector: "h1".to_string(),
                expected: "CodeNest".to_string(),
            })
            .halt_on_failure();

        assert_eq!(step.name, "Load Home");
        assert_eq!(step.actions.len(), 1);
        assert!(step.wait.is_some());
        assert_eq!(step.on_failure, OnFailure::Halt);
        assert!(step.timeout_ms.is_none());
    }

    #[test]
    fn test_on_failure_defaults_to_continue() {
        let step = Step::new("anything");
        assert_eq!(step.on_failure, OnFailure::Continue);
    }

    #[test]
    fn test_step_deserializes_from_json() {
        let json = r##"{
            "name": "Open Settings",
            "actions": [
                {"action": "click", "selector": "#btn-settings"}
            ],
            "wait": {"kind": "selector", "selector": "#modal-settings"},
            "assertions": [
                {"check": "visible", "selector": "#modal-settings"}
            ],
            "capture": {"full_page": true},
            "on_failure": "halt",
            "settle_ms": 500
        }"##;

        let step: Step = serde_json::from_str(json).unwrap();
        assert_eq!(step.name, "Open Settings");
        assert!(matches!(step.actions[0], Action::Click { .. }));
        assert!(matches!(step.wait, Some(WaitCondition::Selector { .. })));
        assert_eq!(step.on_failure, OnFailure::Halt);
        assert_eq!(step.settle_ms, Some(500));
        assert!(step.capture.unwrap().full_page);
    }

    #[test]
    fn test_minimal_step_json() {
        // A step with only a name asserts immediately and continues.
        let step: Step = serde_json::from_str(r#"{"name": "noop"}"#).unwrap();
        assert!(step.actions.is_empty());
        assert!(step.wait.is_none());
        assert_eq!(step.on_failure, OnFailure::Continue);
    }

    #[test]
    fn test_wait_condition_describe() {
        let cond = WaitCondition::Text {
            text: "Good morning".to_string(),
        };
        assert!(cond.describe().contains("Good morning"));
    }
}
