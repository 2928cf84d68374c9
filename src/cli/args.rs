use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ToolConfig;
use crate::platform::Platform;

#[derive(Parser, Debug)]
#[command(
    name = "wgctl",
    about = "Manage WireGuard tunnels through the native wg / wg-quick / wireguard tools",
    version
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub tools: ToolArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tool locations and invocation settings
#[derive(Args, Debug)]
pub struct ToolArgs {
    /// Tooling to drive (defaults to the build target)
    #[arg(long, value_enum, default_value_t = PlatformArg::Auto, global = true)]
    pub platform: PlatformArg,

    /// Path to the wg binary
    #[arg(long, env = "WGCTL_WG", global = true)]
    pub wg: Option<String>,

    /// Path to the wg-quick script
    #[arg(long = "wg-quick", env = "WGCTL_WG_QUICK", global = true)]
    pub wg_quick: Option<String>,

    /// Path to wireguard.exe
    #[arg(long, env = "WGCTL_WIREGUARD", global = true)]
    pub wireguard: Option<String>,

    /// Program used to elevate privileged commands (e.g. sudo, doas)
    #[arg(long, env = "WGCTL_ELEVATE", global = true, conflicts_with = "no_elevate")]
    pub elevate: Option<String>,

    /// Run privileged commands as is
    #[arg(long, global = true)]
    pub no_elevate: bool,

    /// Per-command timeout in seconds (0 disables)
    #[arg(long, env = "WGCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformArg {
    Auto,
    Windows,
    Unix,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the WireGuard tools are installed
    Installed,

    /// Print the active WireGuard device
    Active,

    /// Bring up the tunnel described by a config file
    Up {
        /// Path to the tunnel config file
        config: PathBuf,
    },

    /// Bring down the tunnel described by a config file
    Down {
        /// Path to the tunnel config file
        config: PathBuf,
    },

    /// Report whether a device is up
    Status {
        /// Device name
        device: String,
    },

    /// Generate a new private key
    Genkey {
        /// Generate locally instead of calling wg
        #[arg(long)]
        offline: bool,
    },

    /// Derive a public key (reads the private key from stdin if omitted)
    Pubkey {
        /// Base64 private key
        private_key: Option<String>,

        /// Derive locally instead of calling wg
        #[arg(long)]
        offline: bool,
    },

    /// Validate a tunnel config file and summarize it
    Check {
        /// Path to the tunnel config file
        config: PathBuf,
    },
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

impl ToolArgs {
    pub fn platform(&self) -> Platform {
        match self.platform {
            PlatformArg::Auto => Platform::detect(),
            PlatformArg::Windows => Platform::Windows,
            PlatformArg::Unix => Platform::Unix,
        }
    }

    /// Defaults overridden by whatever was given on the command line
    pub fn to_tool_config(&self) -> ToolConfig {
        let mut tools = ToolConfig::default();
        if let Some(wg) = &self.wg {
            tools.wg = wg.clone();
        }
        if let Some(wg_quick) = &self.wg_quick {
            tools.wg_quick = wg_quick.clone();
        }
        if let Some(wireguard) = &self.wireguard {
            tools.wireguard = wireguard.clone();
        }
        if let Some(elevate) = &self.elevate {
            tools.elevate_with = Some(elevate.clone());
        }
        if self.no_elevate {
            tools.elevate_with = None;
        }
        if let Some(secs) = self.timeout {
            tools.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        tools
    }
}
