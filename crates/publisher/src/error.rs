use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to run `{command}`: {source}")]
    SpawnError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git add failed ({status}), output: {output}")]
    StageError { status: ExitStatus, output: String },

    #[error("git commit failed ({status}), output: {output}")]
    CommitError { status: ExitStatus, output: String },

    #[error("git push failed ({status}), output: {output}")]
    PushError { status: ExitStatus, output: String },
}
