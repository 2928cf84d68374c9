use std::time::Duration;

/// Default bound on a single tool invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the WireGuard tools live and how to run them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// `wg` binary
    pub wg: String,
    /// `wg-quick` script (Unix)
    pub wg_quick: String,
    /// `wireguard.exe` tunnel service manager (Windows)
    pub wireguard: String,
    /// Program prefixed to elevated invocations (None = run as is)
    pub elevate_with: Option<String>,
    /// Per-invocation time limit (None = wait forever)
    pub timeout: Option<Duration>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            wg: "wg".to_string(),
            wg_quick: "wg-quick".to_string(),
            wireguard: "wireguard".to_string(),
            elevate_with: if cfg!(windows) {
                None
            } else {
                Some("sudo".to_string())
            },
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ToolConfig {
    /// Config that never elevates, for callers already running privileged
    pub fn without_elevation(mut self) -> Self {
        self.elevate_with = None;
        self
    }
}
