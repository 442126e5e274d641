//! Scenario metadata (`scenario.yaml`) and tab layout (`tabs.yaml`)

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const SCENARIO_FILE: &str = "scenario.yaml";
pub const TABS_FILE: &str = "tabs.yaml";

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("{} not found", SCENARIO_FILE)]
    NotFound(PathBuf),

    #[error("failed to parse {}", SCENARIO_FILE)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Descriptive fields of a scenario; missing keys read as empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioMeta {
    pub name: String,
    pub description: String,
    pub difficulty: String,
    pub estimated_time: String,
}

/// Read `scenario.yaml` from the scenario directory.
///
/// The file is read on every call so edits show up without a restart.
pub async fn load_scenario(dir: &Path) -> Result<ScenarioMeta, ScenarioError> {
    let path = dir.join(SCENARIO_FILE);
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(ScenarioError::NotFound(path)),
        Err(source) => return Err(ScenarioError::Io { path, source }),
    };
    serde_yaml::from_str(&text).map_err(|source| ScenarioError::Parse { path, source })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TerminalTab {
    pub enabled: bool,
}

/// Extra tab declared by the scenario author; missing keys read as empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CustomTab {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Absolute URL, or a path on the current host when it starts with `/`
    pub url: String,
}

/// Contents of `tabs.yaml`.
///
/// Keys left out of a file that parses read as zero values, so a file
/// without a `terminal` section disables the terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabsConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub terminal: TerminalTab,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_tabs: Vec<CustomTab>,
}

impl TabsConfig {
    /// Layout used when `tabs.yaml` is missing or invalid
    pub fn terminal_only() -> Self {
        Self {
            terminal: TerminalTab { enabled: true },
            custom_tabs: Vec::new(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Load `tabs.yaml`, falling back to "terminal only" when it is missing or invalid
pub fn load_tabs(dir: &Path) -> TabsConfig {
    let path = dir.join(TABS_FILE);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            if e.kind() == ErrorKind::NotFound {
                info!(path = %path.display(), "No tabs config, terminal only");
            } else {
                warn!(path = %path.display(), "Failed to read tabs config: {}", e);
            }
            return TabsConfig::terminal_only();
        }
    };

    if text.trim().is_empty() {
        info!(path = %path.display(), "Empty tabs config");
        return TabsConfig::default();
    }

    match serde_yaml::from_str::<TabsConfig>(&text) {
        Ok(tabs) => {
            info!(
                terminal_enabled = tabs.terminal.enabled,
                custom_tabs = tabs.custom_tabs.len(),
                "Loaded tabs config"
            );
            tabs
        }
        Err(e) => {
            warn!(path = %path.display(), "Invalid tabs config: {}", e);
            TabsConfig::terminal_only()
        }
    }
}

/// A tab as presented to the web UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub url: String,
}

/// Where the request for the tab list came from
#[derive(Debug, Clone, Copy)]
pub struct RequestOrigin<'a> {
    /// `Host` header, if any
    pub host: Option<&'a str>,
    pub https: bool,
}

impl RequestOrigin<'_> {
    fn absolute(&self, url: &str) -> String {
        match self.host.filter(|h| !h.is_empty()) {
            Some(host) if url.starts_with('/') => {
                let scheme = if self.https { "https" } else { "http" };
                format!("{}://{}{}", scheme, host, url)
            }
            _ => url.to_string(),
        }
    }
}

/// Editor tab first (when enabled), then the custom tabs in file order
pub fn resolve_tabs(config: &TabsConfig, editor_enabled: bool, origin: RequestOrigin<'_>) -> Vec<Tab> {
    let editor = editor_enabled.then(|| Tab {
        id: "editor".to_string(),
        name: "Editor".to_string(),
        icon: "code".to_string(),
        url: origin.absolute("/editor/"),
    });

    editor
        .into_iter()
        .chain(config.custom_tabs.iter().map(|tab| Tab {
            id: tab.id.clone(),
            name: tab.name.clone(),
            icon: tab.icon.clone(),
            url: origin.absolute(&tab.url),
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ORIGIN: RequestOrigin<'static> = RequestOrigin {
        host: Some("lab.example.com"),
        https: true,
    };

    #[tokio::test]
    async fn test_load_scenario() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SCENARIO_FILE),
            "name: Intro to Pods\ndescription: First steps\ndifficulty: beginner\nestimatedTime: 15m\n",
        )
        .unwrap();

        let meta = load_scenario(dir.path()).await.unwrap();
        assert_eq!(meta.name, "Intro to Pods");
        assert_eq!(meta.estimated_time, "15m");
    }

    #[tokio::test]
    async fn test_load_scenario_missing_fields_default() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SCENARIO_FILE), "name: Only a name\n").unwrap();

        let meta = load_scenario(dir.path()).await.unwrap();
        assert_eq!(meta.name, "Only a name");
        assert!(meta.difficulty.is_empty());
    }

    #[tokio::test]
    async fn test_load_scenario_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_scenario(dir.path()).await.unwrap_err();
        assert!(matches!(err, ScenarioError::NotFound(_)));
        assert_eq!(err.to_string(), "scenario.yaml not found");
    }

    #[tokio::test]
    async fn test_load_scenario_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SCENARIO_FILE), "name: [unclosed\n").unwrap();

        let err = load_scenario(dir.path()).await.unwrap_err();
        assert!(matches!(err, ScenarioError::Parse { .. }));
        assert_eq!(err.to_string(), "failed to parse scenario.yaml");
    }

    #[test]
    fn test_scenario_meta_serializes_camel_case() {
        let meta = ScenarioMeta {
            estimated_time: "10m".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["estimatedTime"], "10m");
    }

    #[test]
    fn test_load_tabs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(TABS_FILE),
            "terminal:\n  enabled: false\ncustomTabs:\n  - id: grafana\n    name: Grafana\n    icon: chart\n    url: /grafana/\n",
        )
        .unwrap();

        let tabs = load_tabs(dir.path());
        assert!(!tabs.terminal.enabled);
        assert_eq!(tabs.custom_tabs.len(), 1);
        assert_eq!(tabs.custom_tabs[0].id, "grafana");
    }

    #[test]
    fn test_load_tabs_missing_or_invalid_is_terminal_only() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_tabs(dir.path()), TabsConfig::terminal_only());
        assert!(load_tabs(dir.path()).terminal.enabled);

        std::fs::write(dir.path().join(TABS_FILE), "customTabs: 42\n").unwrap();
        assert_eq!(load_tabs(dir.path()), TabsConfig::terminal_only());
    }

    #[test]
    fn test_load_tabs_omitted_keys_read_as_zero_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(TABS_FILE);

        std::fs::write(&path, "customTabs: []\n").unwrap();
        assert!(!load_tabs(dir.path()).terminal.enabled);

        std::fs::write(&path, "terminal: {}\n").unwrap();
        assert!(!load_tabs(dir.path()).terminal.enabled);

        std::fs::write(&path, "terminal:\ncustomTabs:\n").unwrap();
        assert_eq!(load_tabs(dir.path()), TabsConfig::default());

        std::fs::write(&path, "").unwrap();
        assert_eq!(load_tabs(dir.path()), TabsConfig::default());
    }

    #[test]
    fn test_custom_tab_missing_fields_keep_other_tabs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(TABS_FILE),
            "terminal:\n  enabled: true\ncustomTabs:\n  - name: No Id\n    url: /a/\n  - id: b\n    name: B\n    url: /b/\n",
        )
        .unwrap();

        let tabs = load_tabs(dir.path());
        assert!(tabs.terminal.enabled);
        assert_eq!(tabs.custom_tabs.len(), 2);
        assert_eq!(
            tabs.custom_tabs[0],
            CustomTab {
                id: String::new(),
                name: "No Id".to_string(),
                icon: String::new(),
                url: "/a/".to_string(),
            }
        );
        assert_eq!(tabs.custom_tabs[1].id, "b");
    }

    #[test]
    fn test_resolve_tabs_editor_first_and_absolute() {
        let config = TabsConfig {
            terminal: TerminalTab { enabled: true },
            custom_tabs: vec![
                CustomTab {
                    id: "docs".to_string(),
                    name: "Docs".to_string(),
                    icon: "book".to_string(),
                    url: "https://docs.example.com".to_string(),
                },
                CustomTab {
                    id: "app".to_string(),
                    name: "App".to_string(),
                    icon: String::new(),
                    url: "/app/".to_string(),
                },
            ],
        };

        let tabs = resolve_tabs(&config, true, ORIGIN);
        let urls: Vec<_> = tabs.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://lab.example.com/editor/",
                "https://docs.example.com",
                "https://lab.example.com/app/",
            ]
        );
        assert_eq!(tabs[0].id, "editor");
    }

    #[test]
    fn test_resolve_tabs_without_host_keeps_paths() {
        let config = TabsConfig {
            terminal: TerminalTab { enabled: true },
            custom_tabs: vec![CustomTab {
                id: "app".to_string(),
                name: "App".to_string(),
                icon: String::new(),
                url: "/app/".to_string(),
            }],
        };
        let origin = RequestOrigin {
            host: None,
            https: false,
        };

        let tabs = resolve_tabs(&config, true, origin);
        assert_eq!(tabs[0].url, "/editor/");
        assert_eq!(tabs[1].url, "/app/");
    }

    #[test]
    fn test_resolve_tabs_editor_disabled() {
        let tabs = resolve_tabs(&TabsConfig::default(), false, ORIGIN);
        assert!(tabs.is_empty());
    }
}
