//! Centralized environment variable registry.
//!
//! Every variable is documented here once. Prefixed variables use the
//! `LEARNING_UI` prefix with `__` separating nested config paths
//! (e.g. `LEARNING_UI__TARGET__NAMESPACE`). Legacy variables predate the
//! config file and are still set by existing deployment manifests; they are
//! mapped onto the same config keys with lower precedence than prefixed ones.

use std::collections::HashMap;

/// Prefix for structured environment overrides
pub const PREFIX: &str = "LEARNING_UI";

/// An environment variable definition
#[derive(Debug, Clone)]
pub struct EnvVar {
    /// Environment variable name
    pub name: &'static str,
    /// Dotted config key this variable sets
    pub config_key: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Unprefixed variable kept for existing deployments
    pub legacy: bool,
    /// Default value if not set
    pub default: Option<&'static str>,
}

/// Static registry of all documented environment variables
pub static ENV_VARS: &[EnvVar] = &[
    EnvVar {
        name: "PORT",
        config_key: "server.port",
        description: "Port the HTTP server listens on",
        legacy: true,
        default: Some("8080"),
    },
    EnvVar {
        name: "SCENARIO_PATH",
        config_key: "scenario.path",
        description: "Directory with step files, scenario.yaml and tabs.yaml",
        legacy: true,
        default: Some("/scenarios"),
    },
    EnvVar {
        name: "SHELL_POD_NAME",
        config_key: "target.pod",
        description: "Pod that terminals and checks run in",
        legacy: true,
        default: Some("learning-ui-shell-0"),
    },
    EnvVar {
        name: "NAMESPACE",
        config_key: "target.namespace",
        description: "Namespace of the shell pod",
        legacy: true,
        default: Some("default"),
    },
    EnvVar {
        name: "EDITOR_ENABLED",
        config_key: "editor.enabled",
        description: "Expose the editor tab",
        legacy: true,
        default: Some("false"),
    },
    EnvVar {
        name: "LEARNING_UI__TARGET__KIND",
        config_key: "target.kind",
        description: "Execution target: kubectl or local",
        legacy: false,
        default: Some("kubectl"),
    },
    EnvVar {
        name: "LEARNING_UI__TARGET__CONTAINER",
        config_key: "target.container",
        description: "Container inside the shell pod",
        legacy: false,
        default: Some("shell"),
    },
    EnvVar {
        name: "LEARNING_UI__TARGET__SHELL",
        config_key: "target.shell",
        description: "Shell for terminals and check scripts",
        legacy: false,
        default: Some("/bin/bash"),
    },
    EnvVar {
        name: "LEARNING_UI__CHECK__TIMEOUT_SECS",
        config_key: "check.timeout_secs",
        description: "Upper bound in seconds for a single check run",
        legacy: false,
        default: None,
    },
    EnvVar {
        name: "LEARNING_UI__SERVER__WEB_ROOT",
        config_key: "server.web_root",
        description: "Directory with the web UI assets",
        legacy: false,
        default: None,
    },
    EnvVar {
        name: "LEARNING_UI__LOGGING__LEVEL",
        config_key: "logging.level",
        description: "Log level filter (RUST_LOG takes precedence)",
        legacy: false,
        default: Some("info"),
    },
    EnvVar {
        name: "LEARNING_UI__LOGGING__FILE",
        config_key: "logging.file",
        description: "Write logs to this file instead of stderr",
        legacy: false,
        default: None,
    },
];

/// Legacy variables in registry order
pub fn legacy_vars() -> impl Iterator<Item = &'static EnvVar> {
    ENV_VARS.iter().filter(|v| v.legacy)
}

/// Legacy variables from the process environment, keyed for `config::Environment`
pub fn legacy_overrides() -> HashMap<String, String> {
    legacy_overrides_from(|name| std::env::var(name).ok())
}

/// Map set legacy variables to `SECTION__KEY` names; empty values count as unset
pub fn legacy_overrides_from<F>(lookup: F) -> HashMap<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    legacy_vars()
        .filter_map(|var| {
            let value = lookup(var.name).filter(|v| !v.is_empty())?;
            let key = var.config_key.replace('.', "__").to_uppercase();
            Some((key, legacy_value(var, value)))
        })
        .collect()
}

/// Legacy flags are on only for the literal string `true`
fn legacy_value(var: &EnvVar, value: String) -> String {
    if var.config_key == "editor.enabled" {
        (value == "true").to_string()
    } else {
        value
    }
}
