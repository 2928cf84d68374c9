use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WgError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command error: {0}")]
    Exec(#[from] ExecError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid key format: {0}")]
    InvalidKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid tunnel name: {0:?}")]
    InvalidTunnelName(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("File error: {0}")]
    File(#[from] io::Error),
}

/// Failures of an external tool invocation.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("{program}: command not found")]
    NotFound { program: String },

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O with `{command}` failed: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {}: {}", exit_label(.code), trimmed(.stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("`{command}` reported: {}", trimmed(.stderr))]
    Stderr { command: String, stderr: String },

    #[error("`{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },
}

impl ExecError {
    /// Stderr of a run that exited non-zero.
    pub fn failed_stderr(&self) -> Option<&str> {
        match self {
            ExecError::Failed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ExecError::NotFound { .. })
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

fn trimmed(text: &str) -> &str {
    text.trim()
}

pub type Result<T> = std::result::Result<T, WgError>;
