//! API state management for the REST server.

use std::sync::Arc;

use crate::check::CheckRunner;
use crate::config::Config;
use crate::remote::{executor_from_config, RemoteExecutor};
use crate::scenario::{load_tabs, TabsConfig};
use crate::steps::Catalog;
use crate::terminal::TerminalBridge;

/// Shared state for the REST API.
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub checks: Arc<CheckRunner>,
    pub terminals: Arc<TerminalBridge>,
    pub tabs: Arc<TabsConfig>,
}

impl ApiState {
    /// Scan the scenario directory and connect to the configured target
    pub fn new(config: Config) -> Self {
        let executor = executor_from_config(&config);
        Self::with_executor(config, executor)
    }

    pub fn with_executor(config: Config, executor: Arc<dyn RemoteExecutor>) -> Self {
        let scenario_path = config.scenario_path();
        let catalog = Catalog::load(&scenario_path);
        let tabs = load_tabs(&scenario_path);
        Self::from_parts(config, catalog, tabs, executor)
    }

    pub fn from_parts(
        config: Config,
        catalog: Catalog,
        tabs: TabsConfig,
        executor: Arc<dyn RemoteExecutor>,
    ) -> Self {
        let checks = CheckRunner::new(executor.clone(), &config.check);
        let terminals = TerminalBridge::new(executor, &config.terminal);

        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            checks: Arc::new(checks),
            terminals: Arc::new(terminals),
            tabs: Arc::new(tabs),
        }
    }
}
