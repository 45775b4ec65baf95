use crate::error::PublishError;
use chrono::NaiveDate;
use configuration::GitSettings;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// Remote used when only a branch is configured.
const DEFAULT_REMOTE: &str = "origin";

/// Result of the commit step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// git had nothing staged. Not an error.
    NothingToCommit,
}

/// Result of a full stage, commit, push sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Pushed,
    NothingToCommit,
}

/// Combined stdout and stderr of one git invocation.
struct GitOutput {
    status: ExitStatus,
    text: String,
}

/// A handle on the git working tree the snapshots live in.
#[derive(Debug, Clone)]
pub struct GitRepository {
    workdir: PathBuf,
    settings: GitSettings,
}

impl GitRepository {
    /// `workdir` may be the repository root or any directory inside it.
    /// Staging only picks up changes below `workdir`.
    pub fn new(workdir: impl Into<PathBuf>, settings: GitSettings) -> Self {
        Self {
            workdir: workdir.into(),
            settings,
        }
    }

    /// Stages every change below the working directory.
    pub fn stage_all(&self) -> Result<(), PublishError> {
        let out = self.run(&["add", "."])?;
        if !out.status.success() {
            return Err(PublishError::StageError {
                status: out.status,
                output: out.text,
            });
        }
        tracing::info!("Added files to Git staging area.");
        Ok(())
    }

    /// Commits whatever is staged. An empty index is reported as
    /// [`CommitOutcome::NothingToCommit`] rather than an error, whatever the
    /// state of files outside the working directory.
    pub fn commit(&self, message: &str) -> Result<CommitOutcome, PublishError> {
        if !self.has_staged_changes()? {
            tracing::info!("Nothing to commit, working tree clean.");
            return Ok(CommitOutcome::NothingToCommit);
        }

        let out = self.run(&["commit", "-m", message])?;
        if !out.status.success() {
            return Err(PublishError::CommitError {
                status: out.status,
                output: out.text,
            });
        }
        tracing::info!(commit_message = message, "Committed changes.");
        Ok(CommitOutcome::Committed)
    }

    /// `git diff --cached --quiet` exits 0 for an empty index and 1 when
    /// something is staged. Anything else is a git failure.
    fn has_staged_changes(&self) -> Result<bool, PublishError> {
        let out = self.run(&["diff", "--cached", "--quiet"])?;
        match out.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(PublishError::CommitError {
                status: out.status,
                output: out.text,
            }),
        }
    }

    /// Pushes to the configured remote and branch, or to the current
    /// branch's upstream when neither is configured.
    pub fn push(&self) -> Result<(), PublishError> {
        let args = self.push_args();
        let out = self.run(&args)?;
        if !out.status.success() {
            return Err(PublishError::PushError {
                status: out.status,
                output: out.text,
            });
        }
        tracing::info!("Pushed changes to remote repository.");
        Ok(())
    }

    /// Stages, commits with `Data export <date>`, and pushes. Each step only
    /// runs if the previous one succeeded. When there is nothing to commit the
    /// push is skipped.
    pub fn publish(&self, export_date: NaiveDate) -> Result<PublishOutcome, PublishError> {
        self.stage_all()?;

        let message = commit_message(export_date);
        match self.commit(&message)? {
            CommitOutcome::NothingToCommit => Ok(PublishOutcome::NothingToCommit),
            CommitOutcome::Committed => {
                self.push()?;
                Ok(PublishOutcome::Pushed)
            }
        }
    }

    fn push_args(&self) -> Vec<&str> {
        let mut args = vec!["push"];
        match (self.settings.remote.as_deref(), self.settings.branch.as_deref()) {
            (Some(remote), Some(branch)) => args.extend([remote, branch]),
            (Some(remote), None) => args.push(remote),
            (None, Some(branch)) => args.extend([DEFAULT_REMOTE, branch]),
            (None, None) => {}
        }
        args
    }

    fn run(&self, args: &[&str]) -> Result<GitOutput, PublishError> {
        tracing::debug!(workdir = %self.workdir.display(), ?args, "Running git.");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .env("LC_ALL", "C")
            .output()
            .map_err(|source| PublishError::SpawnError {
                command: format!("git {}", args.join(" ")),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        if !text.trim().is_empty() {
            tracing::debug!(output = %text.trim_end(), "git output.");
        }

        Ok(GitOutput {
            status: output.status,
            text,
        })
    }
}

pub fn commit_message(export_date: NaiveDate) -> String {
    format!("Data export {}", export_date.format("%Y-%m-%d"))
}
