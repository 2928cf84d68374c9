use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::ToolConfig;
use crate::error::ExecError;

/// Whether a tool needs administrative rights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Privilege {
    #[default]
    User,
    Elevated,
}

/// A single external tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Text fed to the child's stdin, followed by a newline
    pub stdin: Option<String>,
    pub privilege: Privilege,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            privilege: Privilege::User,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn elevated(mut self) -> Self {
        self.privilege = Privilege::Elevated;
        self
    }

    /// Human-readable rendering for logs and error messages
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured streams of a run that exited with status 0
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Stdout of the run, failing if the tool wrote anything to stderr.
    pub fn into_clean_stdout(self, invocation: &Invocation) -> Result<String, ExecError> {
        if !self.stderr.is_empty() {
            return Err(ExecError::Stderr {
                command: invocation.command_line(),
                stderr: self.stderr,
            });
        }
        Ok(self.stdout)
    }
}

/// Runs external tools on behalf of a strategy
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the invocation to completion.
    ///
    /// A non-zero exit is reported as [`ExecError::Failed`] with both streams
    /// attached; a program that cannot be found as [`ExecError::NotFound`].
    async fn run(&self, invocation: &Invocation) -> Result<ExecOutput, ExecError>;
}

/// [`CommandRunner`] backed by real child processes
#[derive(Debug, Clone)]
pub struct SystemRunner {
    elevate_with: Option<String>,
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(elevate_with: Option<String>, timeout: Option<Duration>) -> Self {
        Self {
            elevate_with,
            timeout,
        }
    }

    pub fn from_tools(tools: &ToolConfig) -> Self {
        Self::new(tools.elevate_with.clone(), tools.timeout)
    }

    /// Program and argument vector actually spawned for an invocation
    fn resolve(&self, invocation: &Invocation) -> (String, Vec<String>) {
        match (&self.elevate_with, invocation.privilege) {
            (Some(wrapper), Privilege::Elevated) if !running_as_root() => {
                let mut args = Vec::with_capacity(invocation.args.len() + 1);
                args.push(invocation.program.clone());
                args.extend(invocation.args.iter().cloned());
                (wrapper.clone(), args)
            }
            _ => (invocation.program.clone(), invocation.args.clone()),
        }
    }

    async fn spawn_and_wait(
        &self,
        invocation: &Invocation,
        command: &str,
    ) -> Result<std::process::Output, ExecError> {
        let (program, args) = self.resolve(invocation);

        let stdin = if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    ExecError::NotFound { program }
                } else {
                    ExecError::Spawn {
                        command: command.to_string(),
                        source: e,
                    }
                }
            })?;

        if let (Some(input), Some(mut pipe)) = (&invocation.stdin, child.stdin.take()) {
            let io_err = |source| ExecError::Io {
                command: command.to_string(),
                source,
            };
            pipe.write_all(input.as_bytes()).await.map_err(io_err)?;
            pipe.write_all(b"\n").await.map_err(io_err)?;
            // Closing stdin lets tools like `wg pubkey` see EOF
            drop(pipe);
        }

        child.wait_with_output().await.map_err(|source| ExecError::Io {
            command: command.to_string(),
            source,
        })
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::from_tools(&ToolConfig::default())
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ExecOutput, ExecError> {
        let command = invocation.command_line();
        tracing::debug!(command = %command, privilege = ?invocation.privilege, "Running tool");

        let output = match self.timeout {
            Some(limit) => timeout(limit, self.spawn_and_wait(invocation, &command))
                .await
                .map_err(|_| ExecError::Timeout {
                    command: command.clone(),
                    after: limit,
                })??,
            None => self.spawn_and_wait(invocation, &command).await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        tracing::trace!(
            command = %command,
            exit_code = ?output.status.code(),
            stdout = %stdout,
            stderr = %stderr,
            "Tool finished"
        );

        if output.status.success() {
            Ok(ExecOutput { stdout, stderr })
        } else {
            Err(ExecError::Failed {
                command,
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}

#[cfg(unix)]
fn running_as_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn running_as_root() -> bool {
    false
}
