use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::output::{first_interface, COMMAND_NOT_FOUND};
use super::traits::{tool_responds, WgStrategy};
use crate::config::ToolConfig;
use crate::error::{ExecError, Result};
use crate::exec::{CommandRunner, Invocation};

/// Linux and macOS: tunnels are brought up and down by `wg-quick`
pub struct WgQuickStrategy {
    tools: ToolConfig,
    runner: Arc<dyn CommandRunner>,
}

impl WgQuickStrategy {
    pub fn new(tools: ToolConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { tools, runner }
    }

    async fn wg_quick(&self, action: &str, config_path: &Path) -> Result<()> {
        let path = config_path.to_string_lossy().into_owned();
        tracing::info!(action, config = %path, "Running wg-quick");
        let invocation = Invocation::new(&self.tools.wg_quick)
            .args([action, path.as_str()])
            .elevated();
        self.runner.run(&invocation).await?;
        Ok(())
    }
}

#[async_trait]
impl WgStrategy for WgQuickStrategy {
    fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    fn tools(&self) -> &ToolConfig {
        &self.tools
    }

    async fn is_installed(&self) -> Result<bool> {
        if !tool_responds(self.runner(), &self.tools.wg).await? {
            return Ok(false);
        }

        // wg-quick has no --version; its help text exits non-zero
        let probe = Invocation::new(&self.tools.wg_quick).arg("-h");
        match self.runner.run(&probe).await {
            Ok(_) => Ok(true),
            Err(ExecError::NotFound { .. }) => Ok(false),
            Err(ExecError::Failed { stderr, .. }) => Ok(!stderr.contains(COMMAND_NOT_FOUND)),
            Err(e) => Err(e.into()),
        }
    }

    async fn active_device(&self) -> Result<Option<String>> {
        let invocation = Invocation::new(&self.tools.wg)
            .args(["show", "interfaces"])
            .elevated();
        let stdout = self
            .runner
            .run(&invocation)
            .await?
            .into_clean_stdout(&invocation)?;
        Ok(first_interface(&stdout))
    }

    async fn up(&self, config_path: &Path) -> Result<()> {
        self.wg_quick("up", config_path).await
    }

    async fn down(&self, config_path: &Path) -> Result<()> {
        self.wg_quick("down", config_path).await
    }
}
