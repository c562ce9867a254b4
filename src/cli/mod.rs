//! CLI argument parsing for queuelock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Queuelock: inspect and manage the locks that keep duplicate jobs out of a queue.
///
/// Operates on a file-backed lock store shared by the queue's processes.
#[derive(Parser, Debug)]
#[command(name = "queuelock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: queuelock.yaml in the working directory, if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Lock store directory (overrides `store_dir` from the config).
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for queuelock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all held queue locks.
    List,

    /// Clear every held queue lock.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(ClearArgs),

    /// Print the lock key a job would take.
    Key(JobArgs),

    /// Take the lock of a single job, as enqueueing it would.
    ///
    /// Exits with status 4 if the lock is already held.
    Acquire(JobArgs),

    /// Release the lock of a single job.
    Release(JobArgs),
}

/// Arguments for the `clear` command.
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Force clearing the locks (required for safety).
    #[arg(long)]
    pub force: bool,
}

/// A job identified by name and JSON arguments.
#[derive(Parser, Debug)]
pub struct JobArgs {
    /// Job name (e.g., UpdateNetworkGraph).
    pub job: String,

    /// Job arguments as JSON (e.g., '[42, "main"]'). Defaults to no arguments.
    pub args: Option<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["queuelock", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List));
        assert!(cli.config.is_none());
        assert!(cli.store_dir.is_none());
    }

    #[test]
    fn parse_clear_without_force() {
        let cli = Cli::try_parse_from(["queuelock", "clear"]).unwrap();
        if let Command::Clear(args) = cli.command {
            assert!(!args.force);
        } else {
            panic!("Expected Clear command");
        }
    }

    #[test]
    fn parse_clear_with_force() {
        let cli = Cli::try_parse_from(["queuelock", "clear", "--force"]).unwrap();
        if let Command::Clear(args) = cli.command {
            assert!(args.force);
        } else {
            panic!("Expected Clear command");
        }
    }

    #[test]
    fn parse_key_with_args() {
        let cli = Cli::try_parse_from(["queuelock", "key", "Job", "[1, 2]"]).unwrap();
        if let Command::Key(args) = cli.command {
            assert_eq!(args.job, "Job");
            assert_eq!(args.args.as_deref(), Some("[1, 2]"));
        } else {
            panic!("Expected Key command");
        }
    }

    #[test]
    fn parse_acquire_with_args() {
        let cli = Cli::try_parse_from(["queuelock", "acquire", "Job", "[\"a\"]"]).unwrap();
        if let Command::Acquire(args) = cli.command {
            assert_eq!(args.job, "Job");
            assert_eq!(args.args.as_deref(), Some("[\"a\"]"));
        } else {
            panic!("Expected Acquire command");
        }
    }

    #[test]
    fn parse_release_without_args() {
        let cli = Cli::try_parse_from(["queuelock", "release", "Job"]).unwrap();
        if let Command::Release(args) = cli.command {
            assert_eq!(args.job, "Job");
            assert!(args.args.is_none());
        } else {
            panic!("Expected Release command");
        }
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "queuelock",
            "list",
            "--store-dir",
            "/tmp/locks",
            "--config",
            "ql.yaml",
        ])
        .unwrap();
        assert_eq!(cli.store_dir, Some(PathBuf::from("/tmp/locks")));
        assert_eq!(cli.config, Some(PathBuf::from("ql.yaml")));
    }

    #[test]
    fn missing_job_name_is_rejected() {
        assert!(Cli::try_parse_from(["queuelock", "key"]).is_err());
    }
}
