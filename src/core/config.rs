//! Configuration management for flowcheck
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/flowcheck/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::error::{FlowcheckError, Result};

/// Main configuration for flowcheck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Browser session configuration
    pub browser: BrowserConfig,
    /// Step runner configuration
    pub runner: RunnerConfig,
}

/// Browser session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Session name for agent-browser isolation
    pub session_name: String,
    /// Whether to run without a visible window
    pub headless: bool,
    /// Viewport dimensions applied at session open (none = engine default)
    #[serde(default)]
    pub viewport: Option<Viewport>,
    /// Script evaluated after every navigation completes, e.g.
    /// mocking window.prompt so later interactions run unattended.
    /// Not a pre-load hook: anything the app reads during its own
    /// startup cannot be mocked this way.
    #[serde(default)]
    pub init_script: Option<String>,
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Viewport {
    type Err = FlowcheckError;

    /// Parse "WIDTHxHEIGHT", e.g. "375x812"
    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| FlowcheckError::config(format!("invalid viewport '{}', expected WIDTHxHEIGHT", s)))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| FlowcheckError::config(format!("invalid viewport width '{}'", w)))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| FlowcheckError::config(format!("invalid viewport height '{}'", h)))?;
        Ok(Self { width, height })
    }
}

/// Step runner behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Default wait-condition timeout in ms (per-step overrides win)
    pub default_timeout_ms: u64,
    /// Directory screenshots are written under
    pub screenshot_dir: PathBuf,
    /// Optional whole-run deadline in seconds; an exceeded budget
    /// converts the in-flight step to ERROR and halts the run
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
    /// Whether to show debug output
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            runner: RunnerConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            session_name: env::var("FLOWCHECK_SESSION").unwrap_or_else(|_| "flowcheck".to_string()),
            headless: env::var("FLOWCHECK_HEADED")
                .map(|v| !(v == "true" || v == "1"))
                .unwrap_or(true),
            viewport: env::var("FLOWCHECK_VIEWPORT")
                .ok()
                .and_then(|v| v.parse().ok()),
            init_script: None,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: env::var("FLOWCHECK_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            screenshot_dir: env::var("FLOWCHECK_SCREENSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./verification")),
            run_timeout_secs: env::var("FLOWCHECK_RUN_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
            debug: env::var("FLOWCHECK_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flowcheck")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(FlowcheckError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| FlowcheckError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| FlowcheckError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| FlowcheckError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| FlowcheckError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| FlowcheckError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.runner.default_timeout_ms, 5000);
        assert_eq!(config.runner.screenshot_dir, PathBuf::from("./verification"));
        assert!(config.browser.headless);
        assert!(config.browser.viewport.is_none());
        assert!(config.runner.run_timeout_secs.is_none());
    }

    #[test]
    fn test_viewport_parse() {
        let vp: Viewport = "375x812".parse().unwrap();
        assert_eq!(vp, Viewport { width: 375, height: 812 });

        assert!("375".parse::<Viewport>().is_err());
        assert!("wx812".parse::<Viewport>().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("default_timeout_ms"));
        assert!(toml_str.contains("session_name"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.runner.default_timeout_ms, config.runner.default_timeout_ms);
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("flowcheck"));
    }
}
