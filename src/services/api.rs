//! Client for the Toggl API v8
//!
//! [`TimeTrackingApi`] is the seam the rest of the crate talks to;
//! [`HttpClient`] is the blocking reqwest implementation.

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;

use crate::types::{
    Credential, DataEnvelope, NewTimeEntry, RemoteProject, Result, RunningTimer, TglError,
    UserInfo,
};

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "https://api.track.toggl.com/api/v8";

/// Value of `created_with` on every timer we start
const CREATED_WITH: &str = "tgl";

/// Endpoint URL templates. `{}` marks the id placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub user_info: String,
    pub start: String,
    pub current: String,
    pub stop: String,
    pub projects: String,
    pub projects_from_workspace_id: String,
}

impl Endpoints {
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            user_info: format!("{}/me", base),
            start: format!("{}/time_entries/start", base),
            current: format!("{}/time_entries/current", base),
            stop: format!("{}/time_entries/{{}}/stop", base),
            projects: format!("{}/projects", base),
            projects_from_workspace_id: format!("{}/workspaces/{{}}/projects", base),
        }
    }

    /// `(name, url)` pairs as stored in the endpoint table
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("user_info", self.user_info.as_str()),
            ("start", self.start.as_str()),
            ("current", self.current.as_str()),
            ("stop", self.stop.as_str()),
            ("projects", self.projects.as_str()),
            ("projects_from_workspace_id", self.projects_from_workspace_id.as_str()),
        ]
    }

    pub fn stop_url(&self, timer_id: &str) -> String {
        self.stop.replace("{}", timer_id)
    }

    pub fn workspace_projects_url(&self, workspace_id: &str) -> String {
        self.projects_from_workspace_id.replace("{}", workspace_id)
    }

    pub fn project_url(&self, project_id: &str) -> String {
        format!("{}/{}", self.projects, project_id)
    }
}

/// Operations the remote time-tracking service offers.
/// Non-success statuses surface as [`TglError::Remote`].
pub trait TimeTrackingApi {
    fn user_info(&self, credential: &Credential) -> Result<UserInfo>;

    /// Projects of one workspace; the service answers `null` for none
    fn workspace_projects(
        &self,
        credential: &Credential,
        workspace_id: &str,
    ) -> Result<Vec<RemoteProject>>;

    fn start_timer(&self, credential: &Credential, entry: &NewTimeEntry) -> Result<()>;

    fn current_timer(&self, credential: &Credential) -> Result<Option<RunningTimer>>;

    fn stop_timer(&self, credential: &Credential, timer_id: &str) -> Result<RunningTimer>;

    fn create_project(
        &self,
        credential: &Credential,
        workspace_id: &str,
        project_name: &str,
    ) -> Result<()>;

    fn delete_project(&self, credential: &Credential, project_id: &str) -> Result<()>;

    /// True when the user-info call accepts the credential
    fn credentials_valid(&self, credential: &Credential) -> Result<bool> {
        match self.user_info(credential) {
            Ok(_) => Ok(true),
            Err(TglError::Remote { status, .. }) => {
                tracing::debug!(status, "credential check rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(Serialize)]
struct StartBody<'a> {
    time_entry: TimeEntryBody<'a>,
}

#[derive(Serialize)]
struct TimeEntryBody<'a> {
    description: &'a str,
    wid: &'a str,
    /// Empty string means no project
    pid: &'a str,
    tags: &'a [String],
    billable: bool,
    created_with: &'static str,
}

impl<'a> From<&'a NewTimeEntry> for StartBody<'a> {
    fn from(entry: &'a NewTimeEntry) -> Self {
        Self {
            time_entry: TimeEntryBody {
                description: &entry.description,
                wid: &entry.workspace_id,
                pid: entry.project_id.as_deref().unwrap_or_default(),
                tags: &entry.tags,
                billable: entry.billable,
                created_with: CREATED_WITH,
            },
        }
    }
}

#[derive(Serialize)]
struct ProjectBody<'a> {
    project: NewProjectBody<'a>,
}

#[derive(Serialize)]
struct NewProjectBody<'a> {
    name: &'a str,
    wid: &'a str,
}

/// Blocking HTTP implementation of [`TimeTrackingApi`]
pub struct HttpClient {
    client: Client,
    endpoints: Endpoints,
}

impl HttpClient {
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("tgl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoints })
    }

    /// Attach auth, send, and turn non-success statuses into errors
    fn send(&self, request: RequestBuilder, credential: &Credential) -> Result<Response> {
        let response = request
            .basic_auth(credential.username(), Some(credential.password()))
            .send()?;

        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "api response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(TglError::Remote {
            status: status.as_u16(),
            body,
        })
    }
}

impl TimeTrackingApi for HttpClient {
    fn user_info(&self, credential: &Credential) -> Result<UserInfo> {
        let response = self.send(self.client.get(&self.endpoints.user_info), credential)?;
        let envelope: DataEnvelope<UserInfo> = response.json()?;
        Ok(envelope.data)
    }

    fn workspace_projects(
        &self,
        credential: &Credential,
        workspace_id: &str,
    ) -> Result<Vec<RemoteProject>> {
        let url = self.endpoints.workspace_projects_url(workspace_id);
        let response = self.send(self.client.get(url), credential)?;
        let projects: Option<Vec<RemoteProject>> = response.json()?;
        Ok(projects.unwrap_or_default())
    }

    fn start_timer(&self, credential: &Credential, entry: &NewTimeEntry) -> Result<()> {
        let body = StartBody::from(entry);
        self.send(self.client.post(&self.endpoints.start).json(&body), credential)?;
        Ok(())
    }

    fn current_timer(&self, credential: &Credential) -> Result<Option<RunningTimer>> {
        let response = self.send(self.client.get(&self.endpoints.current), credential)?;
        let envelope: DataEnvelope<Option<RunningTimer>> = response.json()?;
        Ok(envelope.data)
    }

    fn stop_timer(&self, credential: &Credential, timer_id: &str) -> Result<RunningTimer> {
        let url = self.endpoints.stop_url(timer_id);
        let response = self.send(self.client.put(url), credential)?;
        let envelope: DataEnvelope<RunningTimer> = response.json()?;
        Ok(envelope.data)
    }

    fn create_project(
        &self,
        credential: &Credential,
        workspace_id: &str,
        project_name: &str,
    ) -> Result<()> {
        let body = ProjectBody {
            project: NewProjectBody {
                name: project_name,
                wid: workspace_id,
            },
        };
        self.send(self.client.post(&self.endpoints.projects).json(&body), credential)?;
        Ok(())
    }

    fn delete_project(&self, credential: &Credential, project_id: &str) -> Result<()> {
        let url = self.endpoints.project_url(project_id);
        self.send(self.client.delete(url), credential)?;
        Ok(())
    }
}

/// In-memory service used by the unit tests
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::types::Workspace;
    use chrono::Utc;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    pub(crate) struct FakeState {
        pub user_info: Option<UserInfo>,
        pub projects: HashMap<String, Vec<RemoteProject>>,
        pub running: Option<RunningTimer>,
        pub started: Vec<NewTimeEntry>,
        pub created_projects: Vec<(String, String)>,
        pub deleted_projects: Vec<String>,
        pub calls: Vec<&'static str>,
        pub rejections: HashMap<&'static str, (u16, String)>,
        pub next_timer_id: u64,
    }

    /// Single-account fake that allows one running timer at a time
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub state: RefCell<FakeState>,
    }

    impl FakeApi {
        pub fn with_account(token: &str, default_wid: &str, workspaces: &[(&str, &str)]) -> Self {
            let api = Self::default();
            api.state.borrow_mut().user_info = Some(UserInfo {
                api_token: token.to_string(),
                default_workspace_id: default_wid.to_string(),
                workspaces: workspaces
                    .iter()
                    .map(|(id, name)| Workspace {
                        id: id.to_string(),
                        name: name.to_string(),
                    })
                    .collect(),
            });
            api
        }

        pub fn with_projects(self, workspace_id: &str, projects: &[(&str, &str)]) -> Self {
            self.state.borrow_mut().projects.insert(
                workspace_id.to_string(),
                projects
                    .iter()
                    .map(|(id, name)| RemoteProject {
                        id: id.to_string(),
                        name: name.to_string(),
                    })
                    .collect(),
            );
            self
        }

        /// Make every later call named `call` answer `status` with `body`
        pub fn reject(&self, call: &'static str, status: u16, body: &str) {
            self.state
                .borrow_mut()
                .rejections
                .insert(call, (status, body.to_string()));
        }

        pub fn allow(&self, call: &'static str) {
            self.state.borrow_mut().rejections.remove(call);
        }

        pub fn set_running(&self, timer: RunningTimer) {
            self.state.borrow_mut().running = Some(timer);
        }

        pub fn calls(&self) -> Vec<&'static str> {
            self.state.borrow().calls.clone()
        }

        pub fn started(&self) -> Vec<NewTimeEntry> {
            self.state.borrow().started.clone()
        }

        pub fn running(&self) -> Option<RunningTimer> {
            self.state.borrow().running.clone()
        }

        fn record(&self, call: &'static str) -> Result<()> {
            let mut state = self.state.borrow_mut();
            state.calls.push(call);
            match state.rejections.get(call) {
                Some((status, body)) => Err(TglError::Remote {
                    status: *status,
                    body: body.clone(),
                }),
                None => Ok(()),
            }
        }
    }

    impl TimeTrackingApi for FakeApi {
        fn user_info(&self, credential: &Credential) -> Result<UserInfo> {
            self.record("user_info")?;
            let state = self.state.borrow();
            let info = state.user_info.clone().ok_or(TglError::Remote {
                status: 403,
                body: String::new(),
            })?;
            let accepted = credential.username() == info.api_token
                || matches!(credential, Credential::Basic { .. });
            if !accepted {
                return Err(TglError::Remote {
                    status: 403,
                    body: String::new(),
                });
            }
            Ok(info)
        }

        fn workspace_projects(
            &self,
            _credential: &Credential,
            workspace_id: &str,
        ) -> Result<Vec<RemoteProject>> {
            self.record("workspace_projects")?;
            Ok(self
                .state
                .borrow()
                .projects
                .get(workspace_id)
                .cloned()
                .unwrap_or_default())
        }

        fn start_timer(&self, _credential: &Credential, entry: &NewTimeEntry) -> Result<()> {
            self.record("start_timer")?;
            let mut state = self.state.borrow_mut();
            state.next_timer_id += 1;
            let timer = RunningTimer {
                id: state.next_timer_id.to_string(),
                workspace_id: entry.workspace_id.clone(),
                project_id: entry.project_id.clone(),
                description: Some(entry.description.clone()),
                start: Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string(),
                billable: entry.billable,
                tags: (!entry.tags.is_empty()).then(|| entry.tags.clone()),
            };
            state.running = Some(timer);
            state.started.push(entry.clone());
            Ok(())
        }

        fn current_timer(&self, _credential: &Credential) -> Result<Option<RunningTimer>> {
            self.record("current_timer")?;
            Ok(self.state.borrow().running.clone())
        }

        fn stop_timer(&self, _credential: &Credential, timer_id: &str) -> Result<RunningTimer> {
            self.record("stop_timer")?;
            let mut state = self.state.borrow_mut();
            match state.running.take() {
                Some(timer) if timer.id == timer_id => Ok(timer),
                other => {
                    state.running = other;
                    Err(TglError::Remote {
                        status: 404,
                        body: "Time entry not found".to_string(),
                    })
                }
            }
        }

        fn create_project(
            &self,
            _credential: &Credential,
            workspace_id: &str,
            project_name: &str,
        ) -> Result<()> {
            self.record("create_project")?;
            let mut state = self.state.borrow_mut();
            state.next_timer_id += 1;
            let id = format!("p{}", state.next_timer_id);
            state
                .projects
                .entry(workspace_id.to_string())
                .or_default()
                .push(RemoteProject {
                    id,
                    name: project_name.to_string(),
                });
            state
                .created_projects
                .push((workspace_id.to_string(), project_name.to_string()));
            Ok(())
        }

        fn delete_project(&self, _credential: &Credential, project_id: &str) -> Result<()> {
            self.record("delete_project")?;
            let mut state = self.state.borrow_mut();
            for projects in state.projects.values_mut() {
                projects.retain(|p| p.id != project_id);
            }
            state.deleted_projects.push(project_id.to_string());
            Ok(())
        }
    }
}
