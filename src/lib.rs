//! wgctl - WireGuard tunnel control through the platform's native tools
//!
//! This library drives the WireGuard command-line tools that ship with each
//! platform instead of implementing the protocol itself: `wireguard.exe`
//! tunnel services on Windows, `wg-quick` elsewhere, and `wg` everywhere for
//! status queries and key material.
//!
//! # Features
//!
//! - Install/uninstall (or up/down) a tunnel from its config file
//! - Query the active device and per-device status
//! - Generate private keys and derive public keys
//! - Validate tunnel config files before handing them to the tools
//!
//! # Example
//!
//! ```no_run
//! use wgctl::config::ToolConfig;
//! use wgctl::platform::{strategy_for, Platform};
//!
//! # async fn run() -> wgctl::Result<()> {
//! let strategy = strategy_for(Platform::detect(), ToolConfig::default());
//! if strategy.is_installed().await? {
//!     println!("active: {:?}", strategy.active_device().await?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod keys;
pub mod platform;

pub use error::{ConfigError, ExecError, Result, WgError};
pub use platform::{strategy_for, Platform, WgStrategy};
