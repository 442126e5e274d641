use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::env_vars;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub scenario: ScenarioConfig,
    pub target: TargetConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory with the web UI assets; nothing is served at `/` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Directory holding step files, `scenario.yaml` and `tabs.yaml`
    pub path: String,
}

/// How commands reach the execution target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// `kubectl exec` into a fixed pod/container
    #[default]
    Kubectl,
    /// A shell on the local machine (development and tests)
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub kind: TargetKind,
    pub namespace: String,
    pub pod: String,
    pub container: String,
    /// Shell used for the interactive terminal and to run check scripts
    pub shell: String,
    /// kubectl binary name or path
    #[serde(default = "default_kubectl")]
    pub kubectl: String,
}

fn default_kubectl() -> String {
    "kubectl".to_string()
}

/// Terminal settings for new sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Rows used until the client reports its own size
    #[serde(default = "default_rows")]
    pub rows: u16,
    /// Columns used until the client reports its own size
    #[serde(default = "default_cols")]
    pub cols: u16,
    /// TERM exported to the shell process
    #[serde(default = "default_term")]
    pub term: String,
}

fn default_rows() -> u16 {
    24
}

fn default_cols() -> u16 {
    80
}

fn default_term() -> String {
    "xterm-256color".to_string()
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            term: default_term(),
        }
    }
}

/// Check execution settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Upper bound for a single check run; unset means no limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl CheckConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Expose the `/editor/` tab (routed by the ingress to the shell pod)
    #[serde(default)]
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path; stderr when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    /// Config file looked up in the working directory
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("learning-ui.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the service works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/learning-ui/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("learning-ui").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Unprefixed variables set by existing deployment manifests
        builder = builder.add_source(
            config::Environment::default()
                .separator("__")
                .try_parsing(true)
                .source(Some(env_vars::legacy_overrides())),
        );

        // Environment variables with LEARNING_UI_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix(env_vars::PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn scenario_path(&self) -> PathBuf {
        PathBuf::from(&self.scenario.path)
    }

    pub fn web_root(&self) -> Option<PathBuf> {
        self.server.web_root.as_ref().map(PathBuf::from)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8080,
                web_root: None,
            },
            scenario: ScenarioConfig {
                path: "/scenarios".to_string(),
            },
            target: TargetConfig {
                kind: TargetKind::Kubectl,
                namespace: "default".to_string(),
                pod: "learning-ui-shell-0".to_string(),
                container: "shell".to_string(),
                shell: "/bin/bash".to_string(),
                kubectl: default_kubectl(),
            },
            terminal: TerminalConfig::default(),
            check: CheckConfig::default(),
            editor: EditorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
