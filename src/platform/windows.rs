use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::output::{device_from_error, device_from_show, tunnel_name, COMMAND_NOT_FOUND};
use super::traits::{tool_responds, WgStrategy};
use crate::config::ToolConfig;
use crate::error::{ExecError, Result};
use crate::exec::{CommandRunner, Invocation};

/// Windows: tunnels are services managed by `wireguard.exe`
pub struct WindowsStrategy {
    tools: ToolConfig,
    runner: Arc<dyn CommandRunner>,
}

impl WindowsStrategy {
    pub fn new(tools: ToolConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { tools, runner }
    }
}

#[async_trait]
impl WgStrategy for WindowsStrategy {
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

        // The native client ships wg.exe but no wg-quick; finding one means
        // a Unix-style toolchain (MSYS, Cygwin) shadows it.
        let probe = Invocation::new(&self.tools.wg_quick).arg("--version");
        match self.runner.run(&probe).await {
            Ok(_) => Ok(false),
            Err(ExecError::NotFound { .. }) => Ok(true),
            Err(ExecError::Failed { stderr, .. }) => Ok(!stderr.contains(COMMAND_NOT_FOUND)),
            Err(e) => Err(e.into()),
        }
    }

    async fn active_device(&self) -> Result<Option<String>> {
        let invocation = Invocation::new(&self.tools.wg).arg("show");
        match self.runner.run(&invocation).await {
            Ok(output) => Ok(device_from_show(&output.into_clean_stdout(&invocation)?)),
            Err(e) => {
                // wg names the device it failed to open
                if let Some(stderr) = e.failed_stderr().filter(|s| !s.is_empty()) {
                    return Ok(device_from_error(stderr));
                }
                Err(e.into())
            }
        }
    }

    async fn up(&self, config_path: &Path) -> Result<()> {
        let path = config_path.to_string_lossy().into_owned();
        tracing::info!(config = %path, "Installing tunnel service");
        let invocation = Invocation::new(&self.tools.wireguard)
            .args(["/installtunnelservice", path.as_str()])
            .elevated();
        self.runner.run(&invocation).await?;
        Ok(())
    }

    async fn down(&self, config_path: &Path) -> Result<()> {
        let path = config_path.to_string_lossy();
        let name = tunnel_name(&path);
        tracing::info!(tunnel = name, "Uninstalling tunnel service");
        let invocation = Invocation::new(&self.tools.wireguard)
            .args(["/uninstalltunnelservice", name])
            .elevated();
        self.runner.run(&invocation).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WgError;
    use crate::exec::scripted::ScriptedRunner;
    use crate::exec::ExecOutput;

    const PRIVATE: &str = "yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=";
    const PUBLIC: &str = "xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=";

    fn tools() -> ToolConfig {
        ToolConfig::default().without_elevation()
    }

    fn strategy(runner: &Arc<ScriptedRunner>) -> WindowsStrategy {
        WindowsStrategy::new(tools(), runner.clone())
    }

    fn wg(args: &[&str]) -> Invocation {
        Invocation::new("wg").args(args.iter().copied())
    }

    fn wg_quick_version() -> Invocation {
        Invocation::new("wg-quick").arg("--version")
    }

    #[tokio::test]
    async fn test_installed_native() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .ok(wg(&["--version"]), "wireguard-tools v1.0.20210914 - https://git.zx2c4.com/wireguard-tools/\n")
                .missing(wg_quick_version()),
        );
        assert!(strategy(&runner).is_installed().await.unwrap());
        assert_eq!(runner.remaining(), 0);
    }

    #[tokio::test]
    async fn test_installed_shell_reports_unrecognized() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .ok(wg(&["--version"]), "wireguard-tools v1.0\n")
                .fail(
                    wg_quick_version(),
                    "'wg-quick' is not recognized as an internal or external command",
                ),
        );
        assert!(strategy(&runner).is_installed().await.unwrap());
    }

    #[tokio::test]
    async fn test_not_installed_when_wg_quick_present() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .ok(wg(&["--version"]), "wireguard-tools v1.0\n")
                .ok(wg_quick_version(), ""),
        );
        assert!(!strategy(&runner).is_installed().await.unwrap());
    }

    #[tokio::test]
    async fn test_not_installed_command_not_found() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .ok(wg(&["--version"]), "wireguard-tools v1.0\n")
                .fail(wg_quick_version(), "bash: wg-quick: command not found"),
        );
        assert!(!strategy(&runner).is_installed().await.unwrap());
    }

    #[tokio::test]
    async fn test_not_installed_when_wg_writes_stderr() {
        let runner = Arc::new(ScriptedRunner::new().expect(
            wg(&["--version"]),
            Ok(ExecOutput::new("", "wg: something is off")),
        ));
        assert!(!strategy(&runner).is_installed().await.unwrap());
        // wg-quick is never probed
        assert_eq!(runner.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_not_installed_when_wg_missing() {
        let runner = Arc::new(ScriptedRunner::new().missing(wg(&["--version"])));
        assert!(!strategy(&runner).is_installed().await.unwrap());
    }

    #[tokio::test]
    async fn test_active_device() {
        let runner = Arc::new(ScriptedRunner::new().ok(
            wg(&["show"]),
            "interface: office\r\n  public key: abc=\r\n  listening port: 51820\r\n",
        ));
        let device = strategy(&runner).active_device().await.unwrap();
        assert_eq!(device.as_deref(), Some("office"));
    }

    #[tokio::test]
    async fn test_active_device_none() {
        let runner = Arc::new(ScriptedRunner::new().ok(wg(&["show"]), ""));
        assert_eq!(strategy(&runner).active_device().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_active_device_from_error() {
        let runner = Arc::new(ScriptedRunner::new().fail(
            wg(&["show"]),
            "Unable to access interface office: Access is denied.",
        ));
        let device = strategy(&runner).active_device().await.unwrap();
        assert_eq!(device.as_deref(), Some("office"));
    }

    #[tokio::test]
    async fn test_active_device_stderr_on_success_is_error() {
        let runner = Arc::new(ScriptedRunner::new().expect(
            wg(&["show"]),
            Ok(ExecOutput::new("interface: wg0\n", "warning")),
        ));
        let err = strategy(&runner).active_device().await.unwrap_err();
        assert!(matches!(err, WgError::Exec(ExecError::Stderr { .. })));
    }

    #[tokio::test]
    async fn test_active_device_missing_tool_propagates() {
        let runner = Arc::new(ScriptedRunner::new().missing(wg(&["show"])));
        let err = strategy(&runner).active_device().await.unwrap_err();
        assert!(matches!(err, WgError::Exec(ExecError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_up_installs_service() {
        let path = r"C:\tunnels\office.conf";
        let runner = Arc::new(ScriptedRunner::new().ok(
            Invocation::new("wireguard")
                .args(["/installtunnelservice", path])
                .elevated(),
            "",
        ));
        strategy(&runner).up(Path::new(path)).await.unwrap();
        assert_eq!(runner.remaining(), 0);
    }

    #[tokio::test]
    async fn test_down_uses_tunnel_name() {
        let runner = Arc::new(ScriptedRunner::new().ok(
            Invocation::new("wireguard")
                .args(["/uninstalltunnelservice", "office"])
                .elevated(),
            "",
        ));
        strategy(&runner)
            .down(Path::new(r"C:\tunnels\office.conf"))
            .await
            .unwrap();
        assert_eq!(runner.remaining(), 0);
    }

    #[tokio::test]
    async fn test_up_failure_propagates() {
        let runner = Arc::new(ScriptedRunner::new().fail(
            Invocation::new("wireguard")
                .args(["/installtunnelservice", "office.conf"])
                .elevated(),
            "Access is denied.",
        ));
        let err = strategy(&runner).up(Path::new("office.conf")).await.unwrap_err();
        assert!(err.to_string().contains("Access is denied."));
    }

    #[tokio::test]
    async fn test_status_up() {
        let runner = Arc::new(ScriptedRunner::new().ok(
            wg(&["show", "office"]).elevated(),
            "interface: office\n  public key: abc=\n",
        ));
        assert!(strategy(&runner).status("office").await.unwrap());
    }

    #[tokio::test]
    async fn test_status_no_such_device() {
        let runner = Arc::new(ScriptedRunner::new().fail(
            wg(&["show", "office"]).elevated(),
            "Unable to access interface: No such device",
        ));
        assert!(!strategy(&runner).status("office").await.unwrap());
    }

    #[tokio::test]
    async fn test_status_other_failure_propagates() {
        let runner = Arc::new(ScriptedRunner::new().fail(
            wg(&["show", "office"]).elevated(),
            "Unable to access interface: Operation not permitted",
        ));
        assert!(strategy(&runner).status("office").await.is_err());
    }

    #[tokio::test]
    async fn test_status_without_interface_block() {
        let runner = Arc::new(ScriptedRunner::new().ok(wg(&["show", "office"]).elevated(), ""));
        assert!(!strategy(&runner).status("office").await.unwrap());
    }

    #[tokio::test]
    async fn test_generate_private_key() {
        let runner = Arc::new(ScriptedRunner::new().ok(wg(&["genkey"]), &format!("{PRIVATE}\n")));
        let key = strategy(&runner).generate_private_key().await.unwrap();
        assert_eq!(key, PRIVATE);
    }

    #[tokio::test]
    async fn test_generate_private_key_stderr() {
        let runner = Arc::new(ScriptedRunner::new().expect(
            wg(&["genkey"]),
            Ok(ExecOutput::new(format!("{PRIVATE}\n"), "Warning: writing to world accessible file.")),
        ));
        assert!(strategy(&runner).generate_private_key().await.is_err());
    }

    #[tokio::test]
    async fn test_generate_private_key_garbage() {
        let runner = Arc::new(ScriptedRunner::new().ok(wg(&["genkey"]), "usage: wg genkey\n"));
        let err = strategy(&runner).generate_private_key().await.unwrap_err();
        assert!(matches!(err, WgError::Config(_)));
    }

    #[tokio::test]
    async fn test_public_key_pipes_private_key() {
        let runner = Arc::new(
            ScriptedRunner::new().ok(wg(&["pubkey"]).stdin(PRIVATE), &format!("{PUBLIC}\n")),
        );
        let key = strategy(&runner).public_key(PRIVATE).await.unwrap();
        assert_eq!(key, PUBLIC);
    }

    #[tokio::test]
    async fn test_public_key_rejects_bad_input() {
        let runner = Arc::new(ScriptedRunner::new());
        let err = strategy(&runner).public_key("$(reboot)").await.unwrap_err();
        assert!(matches!(err, WgError::Config(_)));
        assert!(runner.seen().is_empty());
    }
}
