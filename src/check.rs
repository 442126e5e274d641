//! Check script execution against the execution target

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::CheckConfig;
use crate::remote::RemoteExecutor;

/// Result of running one check script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub success: bool,
    /// Trimmed combined output, or the executor's diagnostic on failure to run
    pub message: String,
}

impl CheckOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Runs check scripts once each, without retries.
///
/// Every call spawns its own process on the target; concurrent calls share
/// nothing but the executor.
pub struct CheckRunner {
    executor: Arc<dyn RemoteExecutor>,
    timeout: Option<Duration>,
}

impl CheckRunner {
    pub fn new(executor: Arc<dyn RemoteExecutor>, config: &CheckConfig) -> Self {
        Self {
            executor,
            timeout: config.timeout(),
        }
    }

    /// Run `script` and classify the result by exit status
    #[instrument(skip_all, fields(target = %self.executor.describe()))]
    pub async fn run(&self, script: &str) -> CheckOutcome {
        let exec = self.executor.exec(script);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, exec).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_secs = limit.as_secs(), "Check timed out");
                    return CheckOutcome::failed(format!(
                        "check timed out after {}s",
                        limit.as_secs()
                    ));
                }
            },
            None => exec.await,
        };

        let outcome = match result {
            Ok(output) => CheckOutcome {
                success: output.success,
                message: output.output.trim().to_string(),
            },
            Err(e) => {
                warn!("Check could not be executed: {}", e);
                CheckOutcome::failed(e.to_string())
            }
        };

        info!(success = outcome.success, "Check finished");
        outcome
    }
}
