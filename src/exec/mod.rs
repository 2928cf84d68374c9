pub mod runner;

#[cfg(test)]
pub(crate) mod scripted;

pub use runner::{CommandRunner, ExecOutput, Invocation, Privilege, SystemRunner};
