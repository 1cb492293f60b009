mod commands;
mod prompt;

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Settings;
use crate::services::api::HttpClient;
use crate::services::store::Store;
use commands::{Session, StartRequest};
use prompt::TerminalPrompter;

/// A command line interface for Toggl
#[derive(Parser)]
#[command(name = "tgl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database file to use
    #[arg(short, long, global = true, env = "TGL_DATABASE", value_name = "PATH")]
    database: Option<PathBuf>,

    /// API base URL written to a newly created database
    #[arg(long, global = true, env = "TGL_API_URL", value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the database with Toggl user data
    Setup {
        /// Use API token instead of email and password
        #[arg(short, long)]
        api: bool,
    },

    /// Reconfigure user data in the database
    Reconfig,

    /// Start a Toggl timer
    Start(StartArgs),

    /// Get current timer
    Current,

    /// Stop current timer
    Stop,

    /// Pause the current timer to resume later
    Pause,

    /// Resume a previously paused timer
    Resume,

    /// Create new projects
    Create {
        #[command(subcommand)]
        target: CreateTarget,
    },

    /// Delete projects
    Delete {
        #[command(subcommand)]
        target: DeleteTarget,
    },
}

#[derive(Args)]
struct StartArgs {
    /// Timer description, quote it unless it is one word
    description: String,

    /// Start timer in selected project
    #[arg(short, long)]
    project: bool,

    /// Space separated keywords saved as tags
    #[arg(short, long, num_args = 0..)]
    tags: Vec<String>,

    /// Select workspace to use for timer
    #[arg(short, long)]
    workspace: bool,

    /// Set as billable hours (Toggl Pro members only)
    #[arg(short, long)]
    billable: bool,
}

impl From<StartArgs> for StartRequest {
    fn from(args: StartArgs) -> Self {
        Self {
            description: args.description,
            select_project: args.project,
            select_workspace: args.workspace,
            tags: args.tags,
            billable: args.billable,
        }
    }
}

#[derive(Subcommand)]
enum CreateTarget {
    /// Create a new project
    Project {
        /// Name for the project
        name: String,
    },
}

#[derive(Subcommand)]
enum DeleteTarget {
    /// Delete a project
    Project,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<ExitCode> {
        let Some(command) = self.command else {
            Self::command().print_help()?;
            return Ok(ExitCode::SUCCESS);
        };

        let settings = Settings::resolve(self.database, self.api_url)?;
        let store = Store::open(settings.database_path, &settings.api_base_url)?;
        let api = HttpClient::new(store.endpoints()?)?;
        let prompter = TerminalPrompter;
        let session = Session::new(&store, &api, &prompter);

        let status = match command {
            Commands::Setup { api: use_token } => session.setup(use_token)?,
            Commands::Reconfig => session.reconfig()?,
            Commands::Start(args) => session.start(&args.into())?,
            Commands::Current => session.current()?,
            Commands::Stop => session.stop(false)?,
            Commands::Pause => session.stop(true)?,
            Commands::Resume => session.resume()?,
            Commands::Create {
                target: CreateTarget::Project { name },
            } => session.create_project(&name)?,
            Commands::Delete {
                target: DeleteTarget::Project,
            } => session.delete_project()?,
        };
        Ok(status.report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["tgl"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_setup_api() {
        let cli = Cli::try_parse_from(["tgl", "setup", "-a"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Setup { api: true })));

        let cli = Cli::try_parse_from(["tgl", "setup"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Setup { api: false })));
    }

    #[test]
    fn test_cli_parse_start_full() {
        let cli = Cli::try_parse_from([
            "tgl", "start", "write docs", "-p", "-w", "-b", "-t", "a", "two words",
        ])
        .unwrap();
        let Some(Commands::Start(args)) = cli.command else {
            panic!("expected start");
        };
        let request = StartRequest::from(args);
        assert_eq!(request.description, "write docs");
        assert!(request.select_project);
        assert!(request.select_workspace);
        assert!(request.billable);
        assert_eq!(request.tags, vec!["a", "two words"]);
    }

    #[test]
    fn test_cli_parse_start_requires_description() {
        assert!(Cli::try_parse_from(["tgl", "start"]).is_err());
    }

    #[test]
    fn test_cli_parse_create_and_delete_project() {
        let cli = Cli::try_parse_from(["tgl", "create", "project", "Launch"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Create { target: CreateTarget::Project { ref name } }) if name == "Launch"
        ));

        let cli = Cli::try_parse_from(["tgl", "delete", "project"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Delete {
                target: DeleteTarget::Project
            })
        ));
        assert!(Cli::try_parse_from(["tgl", "delete", "workspace"]).is_err());
    }

    #[test]
    fn test_cli_parse_global_database() {
        let cli = Cli::try_parse_from(["tgl", "current", "-d", "/tmp/t.db"]).unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/t.db")));
        assert!(matches!(cli.command, Some(Commands::Current)));
    }
}
