//! Account sync: fill the local store from the remote service
//!
//! Inserts run in foreign-key order: workspaces, then the defaults row
//! (credential + default workspace), then projects per stored workspace.

use crate::services::api::TimeTrackingApi;
use crate::services::store::Store;
use crate::types::{Credential, Result, UserInfo};

/// Counts of what a sync stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub workspaces: usize,
    pub projects: usize,
}

pub struct AccountSync<'a, A: TimeTrackingApi> {
    api: &'a A,
    store: &'a Store,
}

impl<'a, A: TimeTrackingApi> AccountSync<'a, A> {
    pub fn new(api: &'a A, store: &'a Store) -> Self {
        Self { api, store }
    }

    /// Populate workspaces, the credential and projects for `credential`.
    ///
    /// Does not re-validate the credential. If anything fails after the
    /// first write, user data is cleared again before the error is returned,
    /// so the store never reads as set up with half its data.
    pub fn sync(&self, credential: &Credential) -> Result<SyncSummary> {
        let info = self.api.user_info(credential)?;

        let result = self.populate(credential, &info);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "account sync failed, clearing partial data");
            self.store.delete_user_data()?;
        }
        result
    }

    fn populate(&self, credential: &Credential, info: &UserInfo) -> Result<SyncSummary> {
        for workspace in &info.workspaces {
            self.store.add_workspace(&workspace.id, &workspace.name)?;
        }

        self.store
            .add_credential(&info.api_token, &info.default_workspace_id)?;

        let mut projects = 0;
        for workspace_id in self.store.workspace_ids()? {
            let remote = self.api.workspace_projects(credential, &workspace_id)?;
            if remote.is_empty() {
                tracing::debug!(workspace_id = %workspace_id, "workspace has no projects");
                continue;
            }
            for project in remote {
                self.store
                    .add_project(&workspace_id, &project.id, &project.name)?;
                projects += 1;
            }
        }

        let summary = SyncSummary {
            workspaces: info.workspaces.len(),
            projects,
        };
        tracing::info!(
            workspaces = summary.workspaces,
            projects = summary.projects,
            "account synced"
        );
        Ok(summary)
    }
}
