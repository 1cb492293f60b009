//! Command flows behind each `tgl` subcommand

use std::process::ExitCode;

use crate::cli::prompt::Prompter;
use crate::services::api::TimeTrackingApi;
use crate::services::selection;
use crate::services::store::Store;
use crate::services::sync::AccountSync;
use crate::services::timers::{
    format_elapsed, CurrentOutcome, ResumeOutcome, StopOutcome, TimerController,
};
use crate::types::{Credential, NewTimeEntry, Result};

const SETUP_REQUIRED: &str =
    "Setup is not complete.\nPlease run 'tgl setup' before you can run a timer.";

/// How a command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Finished normally, message goes to stdout
    Done(String),
    /// Stopped at a precondition, message goes to stderr
    Halted(String),
}

impl Status {
    pub fn report(&self) -> ExitCode {
        match self {
            Status::Done(message) => {
                println!("{}", message);
                ExitCode::SUCCESS
            }
            Status::Halted(message) => {
                eprintln!("{}", message);
                ExitCode::FAILURE
            }
        }
    }
}

/// Options of `tgl start`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartRequest {
    pub description: String,
    pub select_project: bool,
    pub select_workspace: bool,
    pub tags: Vec<String>,
    pub billable: bool,
}

pub struct Session<'a, A: TimeTrackingApi, P: Prompter> {
    store: &'a Store,
    api: &'a A,
    prompter: &'a P,
}

impl<'a, A: TimeTrackingApi, P: Prompter> Session<'a, A, P> {
    pub fn new(store: &'a Store, api: &'a A, prompter: &'a P) -> Self {
        Self {
            store,
            api,
            prompter,
        }
    }

    fn timers(&self) -> TimerController<'a, A> {
        TimerController::new(self.api, self.store)
    }

    /// Halt unless setup has stored a credential
    fn ensure_setup(&self) -> Result<Option<Status>> {
        if self.store.is_user_data_saved()? {
            Ok(None)
        } else {
            Ok(Some(Status::Halted(SETUP_REQUIRED.to_string())))
        }
    }

    pub fn setup(&self, use_api_token: bool) -> Result<Status> {
        if self.store.is_user_data_saved()? {
            if !self
                .prompter
                .confirm("User data is not empty. Do you want to reconfigure it?")?
            {
                return Ok(Status::Halted("Data was not changed.".to_string()));
            }
            self.store.delete_user_data()?;
        }

        println!("    Configuring your account. Account information will be saved in plain text in");
        println!("    the database located in {}.\n", self.store.path().display());

        let credential = if use_api_token {
            Credential::ApiToken(self.prompter.input(
                "Please enter your API token (found under 'Profile settings' in the Toggl website)",
            )?)
        } else {
            let email = self.prompter.input("Please enter your email address")?;
            let password = self.prompter.password("Please enter your password")?;
            Credential::Basic { email, password }
        };

        if credential.is_empty() {
            return Ok(Status::Halted(
                "Nothing entered, closing program.".to_string(),
            ));
        }
        if !self.api.credentials_valid(&credential)? {
            return Ok(Status::Halted("Incorrect credentials.".to_string()));
        }

        AccountSync::new(self.api, self.store).sync(&credential)?;
        Ok(Status::Done("Data saved.".to_string()))
    }

    /// Re-download account data with the stored credential
    pub fn reconfig(&self) -> Result<Status> {
        if let Some(halt) = self.ensure_setup()? {
            return Ok(halt);
        }

        let credential = self.store.credential()?;
        if !self.api.credentials_valid(&credential)? {
            return Ok(Status::Halted(
                "Credentials error. Please run 'tgl setup' to reconfigure the credential data."
                    .to_string(),
            ));
        }

        self.store.delete_user_data()?;
        AccountSync::new(self.api, self.store).sync(&credential)?;
        Ok(Status::Done("Data reconfigured.".to_string()))
    }

    pub fn start(&self, request: &StartRequest) -> Result<Status> {
        if let Some(halt) = self.ensure_setup()? {
            return Ok(halt);
        }

        // Menus first so a bad answer never reaches the service
        let workspace_id = if request.select_workspace {
            self.select_workspace(true)?
        } else {
            self.store.default_workspace_id()?
        };
        let project_id = if request.select_project {
            self.select_project(&workspace_id)?
        } else {
            None
        };

        let credential = self.store.credential()?;
        if !self.api.credentials_valid(&credential)? {
            return Ok(Status::Halted(
                "Authentication error.\nRun 'tgl setup' to fully reconfigure the data.".to_string(),
            ));
        }

        let timers = self.timers();
        if timers.is_timer_running(&credential)? {
            println!("There is a timer currently running.");
            if !self
                .prompter
                .confirm("Do you want to stop the current timer and start a new one?")?
            {
                return Ok(Status::Halted(
                    "Current timer not stopped. You can use 'tgl current' for more information of the current timer."
                        .to_string(),
                ));
            }
            timers.stop(&credential, false)?;
        }

        let entry = NewTimeEntry {
            description: request.description.clone(),
            workspace_id,
            project_id,
            tags: request.tags.clone(),
            billable: request.billable,
        };
        timers.start(&credential, &entry)?;
        Ok(Status::Done("Timer started.".to_string()))
    }

    pub fn current(&self) -> Result<Status> {
        if let Some(halt) = self.ensure_setup()? {
            return Ok(halt);
        }

        let credential = self.store.credential()?;
        Ok(match self.timers().current(&credential)? {
            CurrentOutcome::NoTimerRunning => no_timer_running(),
            CurrentOutcome::Running {
                description,
                elapsed,
            } => Status::Done(format!(
                "Current timer:\n    Description:  {}\n    Running time: {}",
                description,
                format_elapsed(elapsed)
            )),
        })
    }

    /// `stop`, or `pause` when `for_resume` is set
    pub fn stop(&self, for_resume: bool) -> Result<Status> {
        if let Some(halt) = self.ensure_setup()? {
            return Ok(halt);
        }

        let credential = self.store.credential()?;
        Ok(match self.timers().stop(&credential, for_resume)? {
            StopOutcome::NoTimerRunning => no_timer_running(),
            StopOutcome::Stopped { description } => {
                Status::Done(format!("Timer \"{}\" stopped.", description))
            }
            StopOutcome::Paused { description } => Status::Done(format!(
                "Timer \"{}\" paused.\nResume using \"tgl resume\".",
                description
            )),
        })
    }

    pub fn resume(&self) -> Result<Status> {
        if let Some(halt) = self.ensure_setup()? {
            return Ok(halt);
        }

        // Local check first: nothing paused means no remote call at all
        if self.store.paused_timer()?.is_none() {
            return Ok(no_paused_timer());
        }

        let credential = self.store.credential()?;
        let timers = self.timers();
        if timers.is_timer_running(&credential)? {
            return Ok(Status::Halted(
                "There is a timer currently running.".to_string(),
            ));
        }

        Ok(match timers.resume(&credential)? {
            ResumeOutcome::NoPausedTimer => no_paused_timer(),
            ResumeOutcome::Resumed { description } => {
                Status::Done(format!("Timer \"{}\" resumed.", description))
            }
        })
    }

    /// Create a project, then refresh local data
    pub fn create_project(&self, project_name: &str) -> Result<Status> {
        if let Some(halt) = self.ensure_setup()? {
            return Ok(halt);
        }

        let workspace_id = self.select_workspace(false)?;
        let credential = self.store.credential()?;
        let workspace_name = self
            .timers()
            .create_project(&credential, &workspace_id, project_name)?;
        println!(
            "\nProject \"{}\" has been created in the \"{}\" workspace.",
            project_name, workspace_name
        );

        self.reconfig()
    }

    /// Delete a project picked from every workspace, then refresh local data
    pub fn delete_project(&self) -> Result<Status> {
        if let Some(halt) = self.ensure_setup()? {
            return Ok(halt);
        }
        if !self.store.are_there_projects()? {
            return Ok(Status::Halted(
                "There are no projects available in the database.\nIf you recently added a project to your account, please use \"tgl reconfig\" to reconfigure your data."
                    .to_string(),
            ));
        }

        let listings = self.store.project_listings()?;
        for line in selection::listing_menu(&listings) {
            println!("{}", line);
        }
        let answer = self
            .prompter
            .input("\nPlease enter the number next to the project you want to delete")?;
        let project_id = selection::resolve_listing(&listings, &answer)?;

        let credential = self.store.credential()?;
        self.timers().delete_project(&credential, &project_id)?;
        println!("\nProject was deleted.");

        self.reconfig()
    }

    /// Pick a workspace; with only one stored, use the default
    fn select_workspace(&self, verbose: bool) -> Result<String> {
        let workspaces = self.store.workspaces()?;
        if workspaces.len() <= 1 {
            if verbose {
                println!(
                    "Only one workspace available in the database.\nIf you recently added a workspace on your account, please use 'tgl reconfig' to reconfigure your data.\nUsing default workspace."
                );
            }
            return self.store.default_workspace_id();
        }

        println!();
        for line in selection::workspace_menu(&workspaces) {
            println!("{}", line);
        }
        let answer = self
            .prompter
            .input("\nPlease enter the number of the workspace you want to use")?;
        selection::resolve_workspace(&workspaces, &answer)
    }

    /// Pick a project in `workspace_id`; `None` when the user opts out or
    /// the account has no projects
    fn select_project(&self, workspace_id: &str) -> Result<Option<String>> {
        if !self.store.are_there_projects()? {
            println!(
                "WARNING: You don't have any projects in your account.\n  If you created one recently, please run 'tgl reconfig' to reconfigure your data.\n  Timer will be created without project.\n"
            );
            return Ok(None);
        }

        let projects = self.store.projects_in_workspace(workspace_id)?;
        println!();
        for line in selection::project_menu(&projects) {
            println!("{}", line);
        }
        let answer = self
            .prompter
            .input("\nPlease enter the number of the project you want to use")?;
        selection::resolve_project(&projects, &answer)
    }
}

fn no_timer_running() -> Status {
    Status::Halted("There is no timer currently running.".to_string())
}

fn no_paused_timer() -> Status {
    Status::Halted("There is no paused timer. Use \"tgl start\" to start a new timer.".to_string())
}
