//! In-memory [`CommandRunner`] for strategy tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{CommandRunner, ExecOutput, Invocation};
use crate::error::ExecError;

type Reply = Result<ExecOutput, ExecError>;

/// Replays canned replies and asserts each invocation matches the script.
#[derive(Default)]
pub struct ScriptedRunner {
    script: Mutex<VecDeque<(Invocation, Reply)>>,
    seen: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(self, invocation: Invocation, reply: Reply) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back((invocation, reply));
        self
    }

    pub fn ok(self, invocation: Invocation, stdout: &str) -> Self {
        self.expect(invocation, Ok(ExecOutput::new(stdout, "")))
    }

    pub fn fail(self, invocation: Invocation, stderr: &str) -> Self {
        let command = invocation.command_line();
        self.expect(
            invocation,
            Err(ExecError::Failed {
                command,
                code: Some(1),
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        )
    }

    pub fn missing(self, invocation: Invocation) -> Self {
        let program = invocation.program.clone();
        self.expect(invocation, Err(ExecError::NotFound { program }))
    }

    pub fn seen(&self) -> Vec<Invocation> {
        self.seen.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ExecOutput, ExecError> {
        self.seen.lock().unwrap().push(invocation.clone());
        let (expected, reply) = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected invocation: {}", invocation.command_line()));
        assert_eq!(&expected, invocation);
        reply
    }
}
