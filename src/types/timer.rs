//! Timer types shared by the API client, the store and the lifecycle controller

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{id_string, opt_id_string};

/// Time entry as returned by the current/stop endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunningTimer {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "wid", deserialize_with = "id_string")]
    pub workspace_id: String,
    #[serde(rename = "pid", default, deserialize_with = "opt_id_string")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start: String,
    #[serde(default)]
    pub billable: bool,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl RunningTimer {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// Parameters for a new remote timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeEntry {
    pub description: String,
    pub workspace_id: String,
    pub project_id: Option<String>,
    pub tags: Vec<String>,
    pub billable: bool,
}

/// Snapshot of a stopped timer kept for `resume`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PausedTimer {
    pub workspace_id: String,
    pub description: String,
    pub project_id: Option<String>,
    pub billable: bool,
    pub tags: Option<Vec<String>>,
    pub resumed: bool,
    pub paused_at: DateTime<Utc>,
}

impl PausedTimer {
    /// Capture the fields `resume` needs from a stop response
    pub fn from_stopped(timer: &RunningTimer, paused_at: DateTime<Utc>) -> Self {
        Self {
            workspace_id: timer.workspace_id.clone(),
            description: timer.description().to_string(),
            project_id: timer.project_id.clone(),
            billable: timer.billable,
            tags: timer.tags.clone(),
            resumed: false,
            paused_at,
        }
    }

    /// Entry that recreates this timer on the remote service
    pub fn to_entry(&self) -> NewTimeEntry {
        NewTimeEntry {
            description: self.description.clone(),
            workspace_id: self.workspace_id.clone(),
            project_id: self.project_id.clone(),
            tags: self.tags.clone().unwrap_or_default(),
            billable: self.billable,
        }
    }
}
