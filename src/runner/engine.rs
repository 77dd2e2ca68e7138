//! Step runner engine
//!
//! Turns a declarative step list into one verification run: performs
//! each step's actions, waits for its condition, evaluates its
//! assertions, captures evidence, and aggregates everything into a
//! [`RunReport`]. Per-step problems become FAIL/ERROR results; only
//! configuration problems escape to the caller, before any browser
//! launches.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use crate::browser::{BrowserSession, Page};
use crate::core::{Config, FlowcheckError, Result};
use crate::step::{
    Action, Assertion, Capture, OnFailure, RunReport, Step, StepResult, StepStatus, WaitCondition,
};

/// Interval between predicate evaluations while waiting
const PREDICATE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Executes ordered verification steps against a browser page.
pub struct StepRunner {
    config: Config,
}

impl StepRunner {
    /// Create a runner with loaded configuration
    pub fn new() -> Self {
        Self::with_config(Config::load())
    }

    /// Create a runner with custom configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Access the active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a full verification: validate inputs, launch one browser
    /// session, execute every step, tear the session down on all exit
    /// paths, and return the aggregated report.
    pub async fn run(&self, base_location: &str, steps: &[Step]) -> Result<RunReport> {
        let base = resolve_base_location(base_location)?;
        if steps.is_empty() {
            return Err(FlowcheckError::config("step list must not be empty"));
        }

        // Idempotent; an unwritable directory only degrades captures.
        if let Err(e) = std::fs::create_dir_all(&self.config.runner.screenshot_dir) {
            tracing::warn!(
                "could not create screenshot dir {}: {}",
                self.config.runner.screenshot_dir.display(),
                e
            );
        }

        let session = BrowserSession::launch(&self.config.browser).await?;

        let report = self.execute(&session, &base, steps).await;

        if report.halted {
            let path = self.config.runner.screenshot_dir.join("failure.png");
            match session.screenshot(&path, false).await {
                Ok(()) => println!("Failure screenshot saved: {}", path.display()),
                Err(e) => tracing::warn!("failure screenshot not captured: {}", e),
            }
        }

        if let Err(e) = session.close().await {
            tracing::warn!("failed to close browser session: {}", e);
        }

        Ok(report)
    }

    /// Execute steps against any [`Page`]. Infallible: every per-step
    /// problem is recorded in the report rather than propagated.
    /// Results appear in the exact order steps were supplied.
    pub async fn execute(&self, page: &dyn Page, base: &Url, steps: &[Step]) -> RunReport {
        let mut report = RunReport::new();
        let deadline = self
            .config
            .runner
            .run_timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let total = steps.len();

        for (index, step) in steps.iter().enumerate() {
            println!("{}. {}", index + 1, step.name);

            let (result, budget_exhausted) = self.execute_with_deadline(page, base, step, deadline).await;

            if let Ok(events) = page.drain_console().await {
                for event in &events {
                    println!("{}: {}", event.kind, event.text);
                }
                report.extend_console(events);
            }

            for msg in &result.messages {
                println!("   {}", msg);
            }
            println!("   -> {}", result.status);

            let halt = result.status != StepStatus::Pass
                && (step.on_failure == OnFailure::Halt || budget_exhausted);
            report.push(result);

            if halt {
                report.mark_halted();
                break;
            }
        }

        report
    }

    /// Execute one step under the remaining run budget, if any.
    /// Returns the result and whether the run deadline was hit.
    async fn execute_with_deadline(
        &self,
        page: &dyn Page,
        base: &Url,
        step: &Step,
        deadline: Option<Instant>,
    ) -> (StepResult, bool) {
        let Some(deadline) = deadline else {
            return (self.execute_step(page, base, step).await, false);
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return (
                StepResult::error(&step.name, vec!["run timeout exceeded".to_string()]),
                true,
            );
        }

        match tokio::time::timeout(remaining, self.execute_step(page, base, step)).await {
            Ok(result) => (result, false),
            Err(_) => (
                StepResult::error(&step.name, vec!["run timeout exceeded".to_string()]),
                true,
            ),
        }
    }

    /// The per-step algorithm: actions, settle, wait, assertions,
    /// best-effort capture.
    async fn execute_step(&self, page: &dyn Page, base: &Url, step: &Step) -> StepResult {
        let mut messages = Vec::new();

        for action in &step.actions {
            if let Err(e) = self.perform_action(page, base, action).await {
                messages.push(e.to_string());
                return StepResult::error(&step.name, messages);
            }
        }

        if let Some(ms) = step.settle_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        if let Some(condition) = &step.wait {
            let timeout_ms = step
                .timeout_ms
                .unwrap_or(self.config.runner.default_timeout_ms);
            if let Err(e) = self.await_condition(page, condition, timeout_ms).await {
                messages.push(format!(
                    "condition not met within timeout: {}",
                    condition.describe()
                ));
                if !e.is_assertion() && !matches!(e, FlowcheckError::Timeout(_)) {
                    messages.push(e.to_string());
                }
                return StepResult::error(&step.name, messages);
            }
        }

        let mut status = StepStatus::Pass;
        for assertion in &step.assertions {
            match self.check_assertion(page, assertion).await {
                Ok(()) => {}
                Err(e) if e.is_assertion() => {
                    messages.push(e.to_string());
                    status = StepStatus::Fail;
                    break;
                }
                Err(e) => {
                    messages.push(format!("could not evaluate assertion: {}", e));
                    status = StepStatus::Error;
                    break;
                }
            }
        }

        // Evidence, not a correctness check: a capture failure is
        // logged and never changes the step's status.
        let mut artifact = None;
        if let Some(capture) = &step.capture {
            let path = self.artifact_path(step, capture);
            match page.screenshot(&path, capture.full_page).await {
                Ok(()) => artifact = Some(path),
                Err(e) => {
                    tracing::warn!("capture failed for step '{}': {}", step.name, e);
                    messages.push(format!("warning: {}", e));
                }
            }
        }

        let result = match status {
            StepStatus::Pass => StepResult::pass(&step.name, messages),
            StepStatus::Fail => StepResult::fail(&step.name, messages),
            StepStatus::Error => StepResult::error(&step.name, messages),
        };
        match artifact {
            Some(path) => result.with_artifact(path),
            None => result,
        }
    }

    async fn perform_action(&self, page: &dyn Page, base: &Url, action: &Action) -> Result<()> {
        match action {
            Action::Navigate { url } => {
                let target = resolve_target(base, url)?;
                page.goto(target.as_str()).await
            }
            Action::Click { selector } => page.click(selector).await,
            Action::Fill { selector, value } => page.fill(selector, value).await,
            Action::Evaluate { script } => page.eval(script).await.map(|_| ()),
        }
    }

    async fn await_condition(
        &self,
        page: &dyn Page,
        condition: &WaitCondition,
        timeout_ms: u64,
    ) -> Result<()> {
        match condition {
            WaitCondition::Selector { selector } => {
                page.wait_for_selector(selector, timeout_ms).await
            }
            WaitCondition::Text { text } => page.wait_for_text(text, timeout_ms).await,
            WaitCondition::Predicate { script } => {
                let deadline = Instant::now() + Duration::from_millis(timeout_ms);
                loop {
                    let value = page.eval(script).await?;
                    if js_truthy(&value) {
                        return Ok(());
                    }
                    if Instant::now() >= deadline {
                        return Err(FlowcheckError::timeout(condition.describe()));
                    }
                    tokio::time::sleep(PREDICATE_POLL_INTERVAL).await;
                }
            }
        }
    }

    async fn check_assertion(&self, page: &dyn Page, assertion: &Assertion) -> Result<()> {
        match assertion {
            Assertion::TextContains { selector, expected } => {
                let observed = page.text_of(selector).await?;
                if observed.contains(expected) {
                    Ok(())
                } else {
                    Err(FlowcheckError::assertion(format!(
                        "text of {}: expected to contain '{}', observed '{}'",
                        selector, expected, observed
                    )))
                }
            }
            Assertion::AttributeContains {
                selector,
                attribute,
                expected,
            } => match page.attribute_of(selector, attribute).await? {
                Some(observed) if observed.contains(expected) => Ok(()),
                Some(observed) => Err(FlowcheckError::assertion(format!(
                    "attribute {} of {}: expected to contain '{}', observed '{}'",
                    attribute, selector, expected, observed
                ))),
                None => Err(FlowcheckError::assertion(format!(
                    "attribute {} of {}: expected to contain '{}', attribute absent",
                    attribute, selector, expected
                ))),
            },
            Assertion::AttributeExcludes {
                selector,
                attribute,
                rejected,
            } => match page.attribute_of(selector, attribute).await? {
                None => Ok(()),
                Some(observed) if !observed.contains(rejected) => Ok(()),
                Some(observed) => Err(FlowcheckError::assertion(format!(
                    "attribute {} of {}: expected not to contain '{}', observed '{}'",
                    attribute, selector, rejected, observed
                ))),
            },
            Assertion::Visible { selector } => {
                if page.is_visible(selector).await? {
                    Ok(())
                } else {
                    Err(FlowcheckError::assertion(format!(
                        "{}: expected visible, observed hidden or absent",
                        selector
                    )))
                }
            }
            Assertion::Hidden { selector } => {
                if page.is_visible(selector).await? {
                    Err(FlowcheckError::assertion(format!(
                        "{}: expected hidden, observed visible",
                        selector
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn artifact_path(&self, step: &Step, capture: &Capture) -> PathBuf {
        let file = capture
            .file
            .clone()
            .unwrap_or_else(|| format!("{}.png", sanitize_name(&step.name)));
        self.config.runner.screenshot_dir.join(file)
    }
}

impl Default for StepRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a base location: an absolute http/https/file URL, or an
/// existing filesystem path converted to a file:// URL.
pub fn resolve_base_location(base: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(base) {
        if matches!(url.scheme(), "http" | "https" | "file") {
            return Ok(url);
        }
    }

    let path = Path::new(base);
    if path.exists() {
        let absolute = path.canonicalize().map_err(|e| {
            FlowcheckError::config(format!("could not resolve path '{}': {}", base, e))
        })?;
        return Url::from_file_path(&absolute).map_err(|_| {
            FlowcheckError::config(format!("path '{}' is not representable as a URL", base))
        });
    }

    Err(FlowcheckError::config(format!(
        "base location '{}' is neither a valid URL nor an existing path",
        base
    )))
}

/// Resolve a step's navigation target against the base location.
/// Empty means the base itself; fragments and relative paths join on.
fn resolve_target(base: &Url, url: &str) -> Result<Url> {
    if url.is_empty() {
        return Ok(base.clone());
    }
    base.join(url)
        .map_err(|e| FlowcheckError::action(format!("invalid navigation target '{}': {}", url, e)))
}

/// Loose JS truthiness for predicate wait output
fn js_truthy(value: &str) -> bool {
    !matches!(value, "" | "false" | "null" | "undefined" | "0" | "NaN")
}

/// Sanitize a step name for use as a screenshot file name
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' | '_' => c,
            'A'..='Z' => c.to_ascii_lowercase(),
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_location_http() {
        let url = resolve_base_location("http://localhost:8080").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_resolve_base_location_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.html");
        std::fs::write(&index, "<h1>CodeNest</h1>").unwrap();

        let url = resolve_base_location(index.to_str().unwrap()).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("index.html"));
    }

    #[test]
    fn test_resolve_base_location_rejects_garbage() {
        let err = resolve_base_location("no-such-place-anywhere").unwrap_err();
        assert!(matches!(err, FlowcheckError::Config(_)));
    }

    #[test]
    fn test_resolve_target_joins_fragments() {
        let base = Url::parse("http://localhost:8080/index.html").unwrap();
        let target = resolve_target(&base, "#/challenges").unwrap();
        assert_eq!(target.fragment(), Some("/challenges"));

        let same = resolve_target(&base, "").unwrap();
        assert_eq!(same, base);
    }

    #[test]
    fn test_js_truthy() {
        assert!(js_truthy("true"));
        assert!(js_truthy("1"));
        assert!(js_truthy("[object Object]"));
        assert!(!js_truthy("false"));
        assert!(!js_truthy(""));
        assert!(!js_truthy("null"));
        assert!(!js_truthy("undefined"));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Open Settings"), "open_settings");
        assert_eq!(sanitize_name("Load Home #1"), "load_home__1");
    }
}
