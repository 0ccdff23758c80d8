//! CLI module for mediate
//!
//! Provides the command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::errors::{MediateError, Result};
use crate::schemas::{Actor, CaseStatus, IntakeStep, Role};

/// Mediate - Dispute intake, panel assignment and resolution over a local store
#[derive(Parser, Debug)]
#[command(name = "mediate")]
#[command(version)]
#[command(about = "Dispute intake, panel assignment and resolution over a local store")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress info-level output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Override the working directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// User id of the caller
    #[arg(long = "as", global = true, value_name = "USER")]
    pub as_user: Option<String>,

    /// Role of the caller (party, panelist, admin)
    #[arg(long, global = true, default_value = "party")]
    pub role: Role,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

impl Cli {
    /// The caller identity from `--as` and `--role`
    pub fn actor(&self) -> Result<Actor> {
        match &self.as_user {
            Some(id) if !id.trim().is_empty() => Ok(Actor::new(id.trim(), self.role)),
            _ => Err(MediateError::Forbidden(
                "pass --as <USER> to identify the caller".to_string(),
            )),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a .mediate store in the current directory
    Init {
        /// Overwrite an existing config.json with defaults
        #[arg(long)]
        force: bool,
    },

    /// Intake sessions
    #[command(subcommand)]
    Session(SessionCommand),

    /// Case records and admin actions
    #[command(subcommand)]
    Case(CaseCommand),

    /// Panel assignment on a case
    #[command(subcommand)]
    Panel(PanelCommand),

    /// Panelist registry
    #[command(subcommand)]
    Panelist(PanelistCommand),

    /// Panelist resolutions
    #[command(subcommand)]
    Resolution(ResolutionCommand),
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Start a new intake session as Party A
    New,

    /// Join Party A's session as Party B
    Join {
        /// Party A's session id
        parent_session_id: String,
    },

    /// Submit one intake step from a JSON file
    Step {
        session_id: String,

        /// Step number (1-6) or name (case_overview, parties, ...)
        step: IntakeStep,

        /// JSON file holding the step payload
        file: PathBuf,
    },

    /// Show a session's progress and draft
    Show { session_id: String },

    /// Finalize a completed session into a case
    Finalize { session_id: String },
}

#[derive(Subcommand, Debug)]
pub enum CaseCommand {
    /// Show a case
    Show { case_id: String },

    /// List cases visible to the caller
    List {
        /// Filter by status (open, assigned, panel_assigned, in_progress, resolved, closed)
        #[arg(long)]
        status: Option<CaseStatus>,
    },

    /// Set the owning admin
    AssignAdmin { case_id: String, admin_id: String },

    /// Move a case to a new status
    Status {
        case_id: String,

        status: CaseStatus,

        /// Admin feedback, for resolving without a complete panel
        #[arg(long, requires = "next_steps")]
        feedback: Option<String>,

        /// Next steps, for resolving without a complete panel
        #[arg(long, requires = "feedback")]
        next_steps: Option<String>,
    },

    /// Add an internal note
    Note { case_id: String, text: String },
}

#[derive(Subcommand, Debug)]
pub enum PanelCommand {
    /// Seat one or more panelists on a case
    Assign {
        case_id: String,

        #[arg(required = true)]
        panelist_ids: Vec<String>,
    },

    /// Remove a panelist from a case
    Remove { case_id: String, panelist_id: String },
}

#[derive(Subcommand, Debug)]
pub enum PanelistCommand {
    /// Register a panelist
    Add {
        panelist_id: String,
        name: String,

        /// Maximum concurrent active cases (defaults to config)
        #[arg(long)]
        max_active_cases: Option<usize>,
    },

    /// List registered panelists and their load
    List,
}

#[derive(Subcommand, Debug)]
pub enum ResolutionCommand {
    /// Submit the caller's resolution from a JSON file
    Submit { case_id: String, file: PathBuf },

    /// Save the caller's draft resolution from a JSON file
    Draft { case_id: String, file: PathBuf },

    /// Show resolution progress for a case
    Status { case_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_step_by_number_and_actor() {
        let cli = Cli::parse_from([
            "mediate", "--as", "user-a", "session", "step", "s-1", "3", "bg.json",
        ]);
        match &cli.command {
            Some(Commands::Session(SessionCommand::Step { step, .. })) => {
                assert_eq!(*step, IntakeStep::Background)
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.actor().unwrap(), Actor::party("user-a"));
    }

    #[test]
    fn test_role_and_status_parse() {
        let cli = Cli::parse_from([
            "mediate", "case", "status", "case-1", "closed", "--as", "boss", "--role", "admin",
        ]);
        assert!(cli.actor().unwrap().is_admin());
        match cli.command {
            Some(Commands::Case(CaseCommand::Status { status, .. })) => {
                assert_eq!(status, CaseStatus::Closed)
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_missing_actor_is_forbidden() {
        let cli = Cli::parse_from(["mediate", "session", "new"]);
        assert_eq!(cli.actor().unwrap_err().code(), "FORBIDDEN");
    }
}
