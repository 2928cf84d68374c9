pub mod output;
pub mod traits;
pub mod unix;
pub mod windows;

use std::fmt;
use std::sync::Arc;

use crate::config::ToolConfig;
use crate::exec::SystemRunner;

pub use traits::WgStrategy;
pub use unix::WgQuickStrategy;
pub use windows::WindowsStrategy;

/// Which family of WireGuard tooling to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `wireguard.exe` tunnel services
    Windows,
    /// `wg-quick` (Linux, macOS, BSD)
    Unix,
}

impl Platform {
    /// Platform this binary was built for
    pub fn detect() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => f.write_str("windows"),
            Platform::Unix => f.write_str("unix"),
        }
    }
}

/// Strategy for `platform` running the real tools
pub fn strategy_for(platform: Platform, tools: ToolConfig) -> Box<dyn WgStrategy> {
    let runner = Arc::new(SystemRunner::from_tools(&tools));
    match platform {
        Platform::Windows => Box::new(WindowsStrategy::new(tools, runner)),
        Platform::Unix => Box::new(WgQuickStrategy::new(tools, runner)),
    }
}
