//! Command implementations for queuelock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command runs against a file-backed lock store.

use crate::cli::{ClearArgs, Cli, Command, JobArgs};
use queuelock::config::Config;
use queuelock::error::{QueueLockError, Result};
use queuelock::locks::QueueLock;
use queuelock::logging::init_logging;
use queuelock::store::{FileStore, LockMetadata};
use serde_json::Value;
use std::path::PathBuf;

/// Dispatch a command to its implementation.
///
/// Loads the config, installs logging, and opens the lock store before
/// routing to the command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;
    init_logging(&config.log_level)?;

    let store_dir = cli
        .store_dir
        .unwrap_or_else(|| PathBuf::from(&config.store_dir));
    let lock = QueueLock::new(FileStore::new(store_dir)).with_retry(config.retry_policy());

    match cli.command {
        Command::List => cmd_list(&lock),
        Command::Clear(args) => cmd_clear(&lock, args),
        Command::Key(args) => cmd_key(&lock, &config, args),
        Command::Acquire(args) => cmd_acquire(&lock, &config, args),
        Command::Release(args) => cmd_release(&lock, &config, args),
    }
}

fn cmd_list(lock: &QueueLock<FileStore>) -> Result<()> {
    let keys = lock.all_locks()?;

    if keys.is_empty() {
        println!("No active locks.");
        return Ok(());
    }

    println!("Active locks ({}):", keys.len());
    println!();

    for key in &keys {
        match lock.store().metadata(key) {
            Ok(Some(meta)) => print!("{}", format_lock_entry(&meta)),
            _ => println!("  {}", key),
        }
    }

    Ok(())
}

/// Render one held lock for `list`.
fn format_lock_entry(meta: &LockMetadata) -> String {
    let mut entry = format!("  {}\n", meta.key);
    entry.push_str(&format!("    Owner:      {}\n", meta.owner));
    if let Some(pid) = meta.pid {
        entry.push_str(&format!("    PID:        {}\n", pid));
    }
    entry.push_str(&format!(
        "    Created:    {} ({} ago)\n",
        meta.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        meta.age_string()
    ));
    match meta.expires_at {
        Some(at) => entry.push_str(&format!(
            "    Expires:    {}\n",
            at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        None => entry.push_str("    Expires:    never (release required)\n"),
    }
    entry
}

fn cmd_clear(lock: &QueueLock<FileStore>, args: ClearArgs) -> Result<()> {
    // Require --force flag
    if !args.force {
        return Err(QueueLockError::UserError(
            "refusing to clear locks without --force flag.\n\n\
             Clearing a lock lets a duplicate job be enqueued while the original is still queued.\n\
             Only clear locks if their jobs are known to be lost.\n\n\
             To clear all locks, run:\n  queuelock clear --force"
                .to_string(),
        ));
    }

    let cleared = lock.clear_all_locks()?;
    println!("Cleared {} lock(s).", cleared);

    Ok(())
}

fn cmd_key(lock: &QueueLock<FileStore>, config: &Config, args: JobArgs) -> Result<()> {
    let job_args = parse_job_args(args.args.as_deref())?;
    let policy = config.policy_for(&args.job);

    println!("{}", lock.lock_key(&policy, &job_args)?);
    Ok(())
}

fn cmd_acquire(lock: &QueueLock<FileStore>, config: &Config, args: JobArgs) -> Result<()> {
    let job_args = parse_job_args(args.args.as_deref())?;
    let policy = config.policy_for(&args.job);
    let key = lock.lock_key(&policy, &job_args)?;

    if !lock.try_acquire(&policy, &job_args)? {
        return Err(QueueLockError::LockHeld(key));
    }

    println!("Acquired lock: {}", key);
    Ok(())
}

fn cmd_release(lock: &QueueLock<FileStore>, config: &Config, args: JobArgs) -> Result<()> {
    let job_args = parse_job_args(args.args.as_deref())?;
    let policy = config.policy_for(&args.job);
    let key = lock.lock_key(&policy, &job_args)?;

    let was_locked = lock.is_locked(&policy, &job_args)?;
    lock.release(&policy, &job_args)?;

    if was_locked {
        println!("Released lock: {}", key);
    } else {
        println!("Lock was not held: {}", key);
    }
    Ok(())
}

/// Parse job arguments given as JSON. No arguments means an empty list.
fn parse_job_args(raw: Option<&str>) -> Result<Value> {
    match raw {
        None => Ok(Value::Array(Vec::new())),
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            QueueLockError::UserError(format!("job arguments must be valid JSON: {}", e))
        }),
    }
}
