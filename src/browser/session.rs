//! Browser session - wraps the agent-browser CLI
//!
//! Provides the [`Page`] capability surface over agent-browser
//! commands: `open`, `click`, `fill`, `eval`, `wait`, `get`,
//! `screenshot`, `console`, `errors`, `resize`, `close`. One session
//! (isolated by `--session` name) maps to one run.

use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;

use async_trait::async_trait;

use crate::browser::page::Page;
use crate::core::{BrowserConfig, FlowcheckError, Result};
use crate::step::ConsoleEvent;

/// A launched agent-browser session implementing [`Page`].
pub struct BrowserSession {
    /// Session name for isolation
    session_name: String,
    /// Whether to run with a visible window
    headed: bool,
    /// Script re-injected after every navigation (prompt/alert mocks)
    init_script: Option<String>,
    /// Console/page-error lines already handed out by drain_console
    seen: Mutex<DrainCursor>,
}

#[derive(Default)]
struct DrainCursor {
    logs: usize,
    errors: usize,
}

impl BrowserSession {
    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Launch a session for one run. Verifies the collaborator binary
    /// exists and applies the configured viewport.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        if !Self::is_available().await {
            return Err(FlowcheckError::AgentBrowserNotFound);
        }

        let session = Self {
            session_name: config.session_name.clone(),
            headed: !config.headless,
            init_script: config.init_script.clone(),
            seen: Mutex::new(DrainCursor::default()),
        };

        if let Some(viewport) = config.viewport {
            session
                .run_command(&[
                    "resize",
                    &viewport.width.to_string(),
                    &viewport.height.to_string(),
                ])
                .await?;
        }

        Ok(session)
    }

    /// Close the session. Idempotent on the agent-browser side.
    pub async fn close(&self) -> Result<()> {
        self.run_command(&["close"]).await?;
        Ok(())
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("agent-browser");
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(?args, "agent-browser");

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FlowcheckError::AgentBrowserNotFound
            } else {
                FlowcheckError::action(format!("Failed to run agent-browser: {}", e))
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(FlowcheckError::action(format!(
                "agent-browser command failed: {}",
                stderr.trim()
            )))
        }
    }
}

/// Marker distinguishing "attribute absent" from an empty value in
/// eval round-trips
const ABSENT_MARKER: &str = "__flowcheck_attr_absent__";

/// Escape a string for embedding in a single-quoted JS literal
fn js_quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n");
    format!("'{}'", escaped)
}

#[async_trait]
impl Page for BrowserSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.run_command(&["open", url]).await?;
        if let Some(script) = &self.init_script {
            self.run_command(&["eval", script]).await?;
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.run_command(&["click", selector]).await?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.run_command(&["fill", selector, value]).await?;
        Ok(())
    }

    async fn eval(&self, script: &str) -> Result<String> {
        let output = self.run_command(&["eval", script]).await?;
        Ok(output.trim().to_string())
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()> {
        let timeout = timeout_ms.to_string();
        self.run_command(&["wait", selector, "--timeout", &timeout])
            .await
            .map_err(|e| {
                FlowcheckError::timeout(format!(
                    "condition not met within timeout: selector {} ({})",
                    selector, e
                ))
            })?;
        Ok(())
    }

    async fn wait_for_text(&self, text: &str, timeout_ms: u64) -> Result<()> {
        let timeout = timeout_ms.to_string();
        self.run_command(&["wait", "--text", text, "--timeout", &timeout])
            .await
            .map_err(|e| {
                FlowcheckError::timeout(format!(
                    "condition not met within timeout: text '{}' ({})",
                    text, e
                ))
            })?;
        Ok(())
    }

    async fn text_of(&self, selector: &str) -> Result<String> {
        let output = self.run_command(&["get", "text", selector]).await?;
        Ok(output.trim().to_string())
    }

    async fn attribute_of(&self, selector: &str, attribute: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); \
             if (!el) throw new Error('no element matching ' + {}); \
             const v = el.getAttribute({}); \
             return v === null ? '{}' : v; }})()",
            js_quote(selector),
            js_quote(selector),
            js_quote(attribute),
            ABSENT_MARKER
        );
        let output = self.eval(&script).await?;
        if output == ABSENT_MARKER {
            Ok(None)
        } else {
            Ok(Some(output))
        }
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); \
             if (!el) return false; \
             const style = getComputedStyle(el); \
             return style.display !== 'none' && style.visibility !== 'hidden' \
                 && el.getClientRects().length > 0; }})()",
            js_quote(selector)
        );
        let output = self.eval(&script).await?;
        Ok(output == "true")
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> Result<()> {
        let path_str = path.to_string_lossy();
        let mut args = vec!["screenshot", path_str.as_ref()];
        if full_page {
            args.push("--full");
        }
        self.run_command(&args)
            .await
            .map_err(|e| FlowcheckError::capture(format!("screenshot failed: {}", e)))?;
        Ok(())
    }

    async fn drain_console(&self) -> Result<Vec<ConsoleEvent>> {
        let logs = self.run_command(&["console"]).await?;
        let errors = self.run_command(&["errors"]).await?;

        let log_lines: Vec<&str> = logs.lines().filter(|l| !l.trim().is_empty()).collect();
        let error_lines: Vec<&str> = errors.lines().filter(|l| !l.trim().is_empty()).collect();

        let mut cursor = self
            .seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut events = Vec::new();
        for line in log_lines.iter().skip(cursor.logs) {
            events.push(ConsoleEvent::log(*line));
        }
        for line in error_lines.iter().skip(cursor.errors) {
            events.push(ConsoleEvent::page_error(*line));
        }

        cursor.logs = log_lines.len();
        cursor.errors = error_lines.len();

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_quote_escapes() {
        assert_eq!(js_quote("h1"), "'h1'");
        assert_eq!(js_quote("a'b"), "'a\\'b'");
        assert_eq!(js_quote("a\\b"), "'a\\\\b'");
    }
}
