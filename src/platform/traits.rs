use async_trait::async_trait;
use std::path::Path;

use super::output::{reports_interface, NO_SUCH_DEVICE};
use crate::config::ToolConfig;
use crate::error::{ExecError, Result};
use crate::exec::{CommandRunner, Invocation};
use crate::keys::validate_key;

/// Platform-specific way of driving the WireGuard tools
#[async_trait]
pub trait WgStrategy: Send + Sync {
    /// Runner used for every tool invocation
    fn runner(&self) -> &dyn CommandRunner;

    /// Tool locations
    fn tools(&self) -> &ToolConfig;

    /// Whether the tools this strategy relies on are usable
    async fn is_installed(&self) -> Result<bool>;

    /// Name of the WireGuard device currently up, if any
    async fn active_device(&self) -> Result<Option<String>>;

    /// Bring up the tunnel described by `config_path`
    async fn up(&self, config_path: &Path) -> Result<()>;

    /// Tear down the tunnel described by `config_path`
    async fn down(&self, config_path: &Path) -> Result<()>;

    /// Whether `device` exists and is up.
    ///
    /// An unknown device is reported as `false` rather than an error.
    async fn status(&self, device: &str) -> Result<bool> {
        let invocation = Invocation::new(&self.tools().wg)
            .args(["show", device])
            .elevated();

        match self.runner().run(&invocation).await {
            Ok(output) => Ok(reports_interface(&output.into_clean_stdout(&invocation)?)),
            Err(e) if e.failed_stderr().is_some_and(|s| s.contains(NO_SUCH_DEVICE)) => {
                tracing::debug!(device, "Device does not exist");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// New base64 private key from `wg genkey`
    async fn generate_private_key(&self) -> Result<String> {
        let invocation = Invocation::new(&self.tools().wg).arg("genkey");
        let stdout = self
            .runner()
            .run(&invocation)
            .await?
            .into_clean_stdout(&invocation)?;
        Ok(validate_key("Generated private key", &stdout)?.to_string())
    }

    /// Public key for `private_key`, computed by `wg pubkey`
    async fn public_key(&self, private_key: &str) -> Result<String> {
        // Never hand the tool something that is not a key
        let private_key = validate_key("Private key", private_key)?;
        let invocation = Invocation::new(&self.tools().wg)
            .arg("pubkey")
            .stdin(private_key);
        let stdout = self
            .runner()
            .run(&invocation)
            .await?
            .into_clean_stdout(&invocation)?;
        Ok(validate_key("Derived public key", &stdout)?.to_string())
    }
}

/// `--version`-style probe: usable unless missing, failing, or complaining on stderr
pub(crate) async fn tool_responds(runner: &dyn CommandRunner, program: &str) -> Result<bool> {
    match runner.run(&Invocation::new(program).arg("--version")).await {
        Ok(output) => Ok(output.stderr.is_empty()),
        Err(ExecError::NotFound { .. } | ExecError::Failed { .. }) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
