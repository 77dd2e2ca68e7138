//! Built-in verification flows and flow-file loading.
//!
//! A flow is test data, not architecture: the step lists here encode
//! the critical user journeys of the applications this harness grew
//! up verifying. Custom flows load from JSON files with the same
//! serde shape.

use std::fs;
use std::path::Path;

use crate::core::{FlowcheckError, Result, Viewport};
use crate::step::{Action, Assertion, Capture, Step, WaitCondition};

/// A named step sequence plus the session setup it expects.
pub struct Flow {
    pub name: &'static str,
    pub steps: Vec<Step>,
    /// Script injected after each navigation (prompt/alert mocks)
    pub init_script: Option<String>,
    /// Viewport the flow was authored against
    pub viewport: Option<Viewport>,
}

/// Names of the built-in flows
pub fn builtin_names() -> &'static [&'static str] {
    &["codenest", "pages", "libraries", "full"]
}

/// Look up a built-in flow by name
pub fn builtin(name: &str) -> Option<Flow> {
    match name {
        "codenest" => Some(codenest()),
        "pages" => Some(pages()),
        "libraries" => Some(libraries()),
        "full" => Some(full()),
        _ => None,
    }
}

/// Load a step list from a JSON flow file (an array of steps)
pub fn load_steps(path: &Path) -> Result<Vec<Step>> {
    let content = fs::read_to_string(path).map_err(|e| {
        FlowcheckError::config(format!("could not read flow file {}: {}", path.display(), e))
    })?;
    let steps: Vec<Step> = serde_json::from_str(&content).map_err(|e| {
        FlowcheckError::config(format!("invalid flow file {}: {}", path.display(), e))
    })?;
    Ok(steps)
}

/// Mobile walkthrough of the CodeNest editor app: home screen, new
/// project, editor chrome, sidebar, settings modal.
fn codenest() -> Flow {
    let steps = vec![
        Step::new("Load Home")
            .action(Action::Navigate { url: String::new() })
            .wait_for(WaitCondition::Selector {
                selector: "#view-home".to_string(),
            })
            .assert(Assertion::TextContains {
                selector: "h1".to_string(),
                expected: "CodeNest".to_string(),
            })
            .halt_on_failure(),
        Step::new("Create New Project")
            .action(Action::Click {
                selector: "#btn-new-project".to_string(),
            })
            .wait_for(WaitCondition::Selector {
                selector: "#view-editor".to_string(),
            })
            .timeout(10000)
            .settle(1000)
            .assert(Assertion::TextContains {
                selector: "#current-filename".to_string(),
                expected: "main.py".to_string(),
            })
            .assert(Assertion::Visible {
                selector: ".monaco-editor".to_string(),
            })
            .halt_on_failure(),
        Step::new("Run Button").assert(Assertion::Visible {
            selector: "#btn-run-floating".to_string(),
        }),
        Step::new("Open Sidebar")
            .action(Action::Click {
                selector: "#btn-toggle-files".to_string(),
            })
            .settle(1000)
            // Off-canvas panel slides in by dropping its translate class
            .assert(Assertion::AttributeExcludes {
                selector: "#panel-files".to_string(),
                attribute: "class".to_string(),
                rejected: "-translate-x-full".to_string(),
            }),
        Step::new("Close Sidebar")
            .action(Action::Evaluate {
                script: "document.querySelector('#overlay-files').click()".to_string(),
            })
            .settle(500),
        Step::new("Toolbar").assert(Assertion::Visible {
            selector: "#toolbar-keyboard".to_string(),
        }),
        Step::new("Open Settings")
            .action(Action::Click {
                selector: "#btn-settings".to_string(),
            })
            .settle(1000)
            .assert(Assertion::Visible {
                selector: "#modal-settings".to_string(),
            })
            .capture(Capture::viewport().named("codenest_verification.png")),
    ];

    Flow {
        name: "codenest",
        steps,
        init_script: Some(
            "window.prompt = (msg) => { \
               if (msg && msg.includes('Project Name')) return 'TestProject'; \
               return 'file.py'; \
             }; \
             window.alert = (msg) => console.log('ALERT:', msg);"
                .to_string(),
        ),
        viewport: Some(Viewport {
            width: 375,
            height: 812,
        }),
    }
}

/// Page tour of the landing, auth, and dashboard views.
fn pages() -> Flow {
    let steps = vec![
        Step::new("Landing Page")
            .action(Action::Navigate { url: String::new() })
            .wait_for(WaitCondition::Selector {
                selector: "h1".to_string(),
            })
            .timeout(10000)
            .capture(Capture::full_page().named("landing_page.png"))
            .halt_on_failure(),
        Step::new("Sign In Page")
            .action(Action::Evaluate {
                script: "window.location.hash = '/signin'".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Sign In".to_string(),
            })
            .capture(Capture::full_page().named("signin_page.png")),
        Step::new("Dashboard")
            .action(Action::Evaluate {
                script: "window.authLogin()".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Good morning".to_string(),
            })
            .capture(Capture::full_page().named("dashboard_page.png")),
        Step::new("Sign Up Page")
            .action(Action::Evaluate {
                script: "window.authLogout()".to_string(),
            })
            .action(Action::Evaluate {
                script: "window.location.hash = '/signup'".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Create Account".to_string(),
            })
            .capture(Capture::full_page().named("signup_page.png")),
    ];

    Flow {
        name: "pages",
        steps,
        init_script: None,
        viewport: None,
    }
}

/// Quick check that the library picker opens from the settings view.
fn libraries() -> Flow {
    let steps = vec![
        Step::new("Load Editor")
            .action(Action::Navigate { url: String::new() })
            .wait_for(WaitCondition::Selector {
                selector: ".cm-editor".to_string(),
            })
            .timeout(10000)
            .halt_on_failure(),
        Step::new("Open Settings View")
            .action(Action::Click {
                selector: "button[data-target='view-settings']".to_string(),
            })
            .settle(500),
        Step::new("Open Libraries")
            .action(Action::Click {
                selector: "#btn-open-libs".to_string(),
            })
            .wait_for(WaitCondition::Selector {
                selector: "#lib-list div".to_string(),
            })
            .settle(500)
            .capture(Capture::viewport().named("verification_libraries.png")),
    ];

    Flow {
        name: "libraries",
        steps,
        init_script: None,
        viewport: Some(Viewport {
            width: 375,
            height: 812,
        }),
    }
}

/// Full user journey: landing, sign-in form, dashboard, then every
/// major view in turn. Each view leaves a numbered screenshot; any
/// failure stops the walk since later views assume the login state.
fn full() -> Flow {
    let steps = vec![
        Step::new("Landing")
            .action(Action::Navigate { url: String::new() })
            .wait_for(WaitCondition::Text {
                text: "CodeSphere".to_string(),
            })
            .capture(Capture::viewport().named("1_landing.png"))
            .halt_on_failure(),
        Step::new("Open Sign In")
            .action(Action::Click {
                selector: "text=Sign In".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Welcome back".to_string(),
            })
            .halt_on_failure(),
        // The mock login accepts any credentials; the form still has
        // to be filled for submit to enable.
        Step::new("Log In")
            .action(Action::Fill {
                selector: "input[type=email]".to_string(),
                value: "test@example.com".to_string(),
            })
            .action(Action::Fill {
                selector: "input[type=password]".to_string(),
                value: "password".to_string(),
            })
            .action(Action::Click {
                selector: "button:has-text('Sign In →')".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Good morning".to_string(),
            })
            .capture(Capture::viewport().named("2_dashboard.png"))
            .halt_on_failure(),
        Step::new("Roadmap")
            .action(Action::Click {
                selector: "a[href='#/roadmap']".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Python Roadmap".to_string(),
            })
            .capture(Capture::viewport().named("3_roadmap.png"))
            .halt_on_failure(),
        Step::new("Topic")
            .action(Action::Click {
                selector: "text=What is Python?".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "In this lesson".to_string(),
            })
            .capture(Capture::viewport().named("4_topic.png"))
            .halt_on_failure(),
        Step::new("Challenges")
            .action(Action::Navigate {
                url: "#/challenges".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Python Challenges".to_string(),
            })
            .capture(Capture::viewport().named("5_challenges.png"))
            .halt_on_failure(),
        Step::new("Single Challenge")
            .action(Action::Click {
                selector: "a[href='#/challenge/c1']".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Problem Description".to_string(),
            })
            .capture(Capture::viewport().named("6_single_challenge.png"))
            .halt_on_failure(),
        Step::new("Battles")
            .action(Action::Navigate {
                url: "#/battles".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Battle Arena".to_string(),
            })
            .capture(Capture::viewport().named("7_battles.png"))
            .halt_on_failure(),
        Step::new("Type Race")
            .action(Action::Navigate {
                url: "#/game/type-race".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Type Race".to_string(),
            })
            .capture(Capture::viewport().named("8_type_race.png"))
            .halt_on_failure(),
        Step::new("Store")
            .action(Action::Navigate {
                url: "#/store".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "CodeCoin Store".to_string(),
            })
            .capture(Capture::viewport().named("9_store.png"))
            .halt_on_failure(),
        Step::new("Profile")
            .action(Action::Navigate {
                url: "#/profile".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "XP Earned".to_string(),
            })
            .capture(Capture::viewport().named("10_profile.png"))
            .halt_on_failure(),
        Step::new("Leaderboard")
            .action(Action::Navigate {
                url: "#/leaderboard".to_string(),
            })
            .wait_for(WaitCondition::Text {
                text: "Global Leaderboard".to_string(),
            })
            .capture(Capture::viewport().named("11_leaderboard.png"))
            .halt_on_failure(),
    ];

    Flow {
        name: "full",
        steps,
        init_script: None,
        viewport: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::OnFailure;

    #[test]
    fn test_builtin_lookup() {
        for name in builtin_names() {
            let flow = builtin(name).expect("builtin flow");
            assert_eq!(flow.name, *name);
            assert!(!flow.steps.is_empty());
        }
        assert!(builtin("nope").is_none());
    }

    #[test]
    fn test_codenest_bootstrap_halts() {
        let flow = builtin("codenest").unwrap();
        assert_eq!(flow.steps[0].on_failure, OnFailure::Halt);
        assert_eq!(flow.steps.last().unwrap().on_failure, OnFailure::Continue);
        assert!(flow.init_script.is_some());
        assert_eq!(flow.viewport.unwrap().width, 375);
    }

    #[test]
    fn test_flows_round_trip_as_json() {
        let flow = builtin("pages").unwrap();
        let json = serde_json::to_string(&flow.steps).unwrap();
        let parsed: Vec<Step> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), flow.steps.len());
        assert_eq!(parsed[0].name, "Landing Page");
    }

    #[test]
    fn test_full_flow_halts_at_every_step() {
        // Later views assume the login state, so any failure stops
        // the walk instead of producing a cascade of noise.
        let flow = builtin("full").unwrap();
        assert!(flow.steps.iter().all(|s| s.on_failure == OnFailure::Halt));
    }

    #[test]
    fn test_full_flow_fills_the_sign_in_form() {
        let flow = builtin("full").unwrap();
        let login = flow
            .steps
            .iter()
            .find(|s| s.name == "Log In")
            .expect("login step");

        let filled: Vec<&str> = login
            .actions
            .iter()
            .filter_map(|a| match a {
                Action::Fill { selector, .. } => Some(selector.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(filled, vec!["input[type=email]", "input[type=password]"]);
        assert!(matches!(login.wait, Some(WaitCondition::Text { .. })));
    }

    #[test]
    fn test_full_flow_captures_every_view_in_order() {
        let flow = builtin("full").unwrap();
        let files: Vec<String> = flow
            .steps
            .iter()
            .filter_map(|s| s.capture.as_ref().and_then(|c| c.file.clone()))
            .collect();

        assert_eq!(files.first().unwrap(), "1_landing.png");
        assert_eq!(files.last().unwrap(), "11_leaderboard.png");
        assert_eq!(files.len(), 11);
    }

    #[test]
    fn test_load_steps_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.json");
        std::fs::write(
            &path,
            r#"[{"name": "Load Home", "actions": [{"action": "navigate"}]}]"#,
        )
        .unwrap();

        let steps = load_steps(&path).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].name, "Load Home");
    }

    #[test]
    fn test_load_steps_bad_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_steps(&path).unwrap_err();
        assert!(matches!(err, FlowcheckError::Config(_)));
    }
}
