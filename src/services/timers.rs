//! Timer lifecycle: start, inspect, stop, pause and resume remote timers
//!
//! The service allows one running timer per account. Pausing stops the
//! remote timer and keeps a local snapshot; resuming starts a new remote
//! timer from that snapshot.

use chrono::{DateTime, Duration, FixedOffset, SubsecRound, Utc};

use crate::services::api::TimeTrackingApi;
use crate::services::store::Store;
use crate::types::{Credential, NewTimeEntry, PausedTimer, Result, TglError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentOutcome {
    NoTimerRunning,
    Running { description: String, elapsed: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    NoTimerRunning,
    Stopped { description: String },
    Paused { description: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    NoPausedTimer,
    Resumed { description: String },
}

pub struct TimerController<'a, A: TimeTrackingApi> {
    api: &'a A,
    store: &'a Store,
}

impl<'a, A: TimeTrackingApi> TimerController<'a, A> {
    pub fn new(api: &'a A, store: &'a Store) -> Self {
        Self { api, store }
    }

    /// Start a remote timer. Checking for an already running timer is the caller's job.
    pub fn start(&self, credential: &Credential, entry: &NewTimeEntry) -> Result<()> {
        self.api
            .start_timer(credential, entry)
            .map_err(|e| e.with_status("Timer not started"))?;
        tracing::info!(description = %entry.description, "timer started");
        Ok(())
    }

    pub fn is_timer_running(&self, credential: &Credential) -> Result<bool> {
        Ok(self.api.current_timer(credential)?.is_some())
    }

    pub fn current(&self, credential: &Credential) -> Result<CurrentOutcome> {
        self.current_at(credential, Utc::now())
    }

    /// Elapsed time is measured against `now` truncated to whole seconds
    pub fn current_at(&self, credential: &Credential, now: DateTime<Utc>) -> Result<CurrentOutcome> {
        let Some(timer) = self.api.current_timer(credential)? else {
            return Ok(CurrentOutcome::NoTimerRunning);
        };

        let started = parse_start_time(&timer.start)?;
        let elapsed = now.trunc_subsecs(0) - started.with_timezone(&Utc);

        Ok(CurrentOutcome::Running {
            description: timer.description().to_string(),
            elapsed: elapsed.max(Duration::zero()),
        })
    }

    /// Stop the running timer. With `for_resume` a snapshot is stored for `resume`.
    pub fn stop(&self, credential: &Credential, for_resume: bool) -> Result<StopOutcome> {
        let Some(current) = self.api.current_timer(credential)? else {
            return Ok(StopOutcome::NoTimerRunning);
        };

        let action = if for_resume {
            "Timer could not be paused"
        } else {
            "Timer could not be stopped"
        };
        let stopped = self
            .api
            .stop_timer(credential, &current.id)
            .map_err(|e| e.with_status(action))?;

        let description = current.description().to_string();
        if !for_resume {
            tracing::info!(timer_id = %current.id, "timer stopped");
            return Ok(StopOutcome::Stopped { description });
        }

        self.store
            .add_paused_timer(&PausedTimer::from_stopped(&stopped, Utc::now()))?;
        tracing::info!(timer_id = %current.id, "timer paused");
        Ok(StopOutcome::Paused { description })
    }

    /// Start a new remote timer from the paused snapshot
    pub fn resume(&self, credential: &Credential) -> Result<ResumeOutcome> {
        let Some(paused) = self.store.paused_timer()? else {
            return Ok(ResumeOutcome::NoPausedTimer);
        };

        self.api
            .start_timer(credential, &paused.to_entry())
            .map_err(|e| e.with_status("Timer could not be resumed"))?;
        self.store.mark_paused_timer_resumed()?;

        tracing::info!(description = %paused.description, "timer resumed");
        Ok(ResumeOutcome::Resumed {
            description: paused.description,
        })
    }

    /// Create a project; returns the workspace name for reporting
    pub fn create_project(
        &self,
        credential: &Credential,
        workspace_id: &str,
        project_name: &str,
    ) -> Result<String> {
        self.api
            .create_project(credential, workspace_id, project_name)
            .map_err(|e| e.with_body("Project could not be created"))?;

        let workspace_name = self
            .store
            .workspace_name_by_id(workspace_id)?
            .unwrap_or_else(|| workspace_id.to_string());
        Ok(workspace_name)
    }

    pub fn delete_project(&self, credential: &Credential, project_id: &str) -> Result<()> {
        self.api
            .delete_project(credential, project_id)
            .map_err(|e| e.with_body("Project could not be deleted"))?;
        tracing::info!(project_id, "project deleted");
        Ok(())
    }
}

/// Parse a start timestamp such as `2024-01-10T09:00:00+00:00`.
/// The offset may carry a colon (`+01:00`) or be `Z`; both are normalized to `+HHMM`.
pub fn parse_start_time(raw: &str) -> Result<DateTime<FixedOffset>> {
    let normalized = normalize_offset(raw.trim());

    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map_err(|e| TglError::Parse(format!("timer start '{}': {}", raw, e)))
}

fn normalize_offset(raw: &str) -> String {
    if let Some(stripped) = raw.strip_suffix('Z') {
        return format!("{}+0000", stripped);
    }

    let bytes = raw.as_bytes();
    let len = bytes.len();
    if len >= 6 && bytes[len - 3] == b':' && matches!(bytes[len - 6], b'+' | b'-') {
        return format!("{}{}", &raw[..len - 3], &raw[len - 2..]);
    }
    raw.to_string()
}

/// Render like `1:02:03`, with a day prefix past 24 hours
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let clock = format!("{}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}
