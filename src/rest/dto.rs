//! Data Transfer Objects for the REST API.
//!
//! Field names are camelCase to match what the web UI reads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::check::CheckOutcome;
use crate::scenario::{ScenarioMeta, Tab};
use crate::steps::{StepRecord, StepSummary};

/// Step as listed, without content
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepSummaryResponse {
    /// 1-based position in the catalog
    pub number: usize,
    pub title: String,
    pub has_check: bool,
}

impl From<StepSummary> for StepSummaryResponse {
    fn from(summary: StepSummary) -> Self {
        Self {
            number: summary.number,
            title: summary.title,
            has_check: summary.has_check,
        }
    }
}

/// Full step, including its markdown content
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub number: usize,
    pub title: String,
    pub content: String,
    pub has_check: bool,
}

impl StepResponse {
    pub fn new(number: usize, step: &StepRecord) -> Self {
        Self {
            number,
            title: step.title.clone(),
            content: step.content.clone(),
            has_check: step.has_check(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckResponse {
    pub success: bool,
    /// Trimmed output of the check script
    pub message: String,
}

impl From<CheckOutcome> for CheckResponse {
    fn from(outcome: CheckOutcome) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the step directory could not be scanned
    pub status: String,
    pub steps: usize,
    pub version: String,
    /// Why the catalog is degraded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResponse {
    pub name: String,
    pub description: String,
    pub difficulty: String,
    pub estimated_time: String,
    pub total_steps: usize,
}

impl ScenarioResponse {
    pub fn new(meta: ScenarioMeta, total_steps: usize) -> Self {
        Self {
            name: meta.name,
            description: meta.description,
            difficulty: meta.difficulty,
            estimated_time: meta.estimated_time,
            total_steps,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TabResponse {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub url: String,
    pub enabled: bool,
}

impl From<Tab> for TabResponse {
    fn from(tab: Tab) -> Self {
        Self {
            id: tab.id,
            name: tab.name,
            icon: tab.icon,
            url: tab.url,
            enabled: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TabsResponse {
    pub tabs: Vec<TabResponse>,
    pub terminal_enabled: bool,
}
