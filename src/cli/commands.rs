use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use crate::config::{parse_config_file, validate_tunnel_name, DnsEntry, TunnelConfig};
use crate::error::{Result, WgError};
use crate::keys::{encode_key, generate_private_key, public_key_for};
use crate::platform::output::tunnel_name;
use crate::platform::WgStrategy;

/// Outcome of a yes/no command, mapped to the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

/// Execute the 'installed' command
pub async fn cmd_installed(strategy: &dyn WgStrategy) -> Result<Answer> {
    let installed = strategy.is_installed().await?;
    println!("{}", if installed { "installed" } else { "not installed" });
    Ok(installed.into())
}

/// Execute the 'active' command
pub async fn cmd_active(strategy: &dyn WgStrategy) -> Result<Answer> {
    match strategy.active_device().await? {
        Some(device) => {
            println!("{}", device);
            Ok(Answer::Yes)
        }
        None => {
            tracing::info!("No active WireGuard device");
            Ok(Answer::No)
        }
    }
}

/// Execute the 'up' command
pub async fn cmd_up(strategy: &dyn WgStrategy, config_path: PathBuf) -> Result<()> {
    let config_path = absolute(config_path)?;
    let config = load_tunnel(&config_path)?;

    tracing::info!(
        public_key = %config.public_key(),
        peers = config.peers.len(),
        "Bringing up tunnel"
    );
    strategy.up(&config_path).await?;

    println!("{} is up", tunnel_name(&config_path.to_string_lossy()));
    Ok(())
}

/// Execute the 'down' command
pub async fn cmd_down(strategy: &dyn WgStrategy, config_path: PathBuf) -> Result<()> {
    let config_path = absolute(config_path)?;
    let name = tunnel_name(&config_path.to_string_lossy()).to_string();
    validate_tunnel_name(&name)?;

    strategy.down(&config_path).await?;

    println!("{} is down", name);
    Ok(())
}

/// Execute the 'status' command
pub async fn cmd_status(strategy: &dyn WgStrategy, device: String) -> Result<Answer> {
    let up = strategy.status(&device).await?;
    println!("{}: {}", device, if up { "up" } else { "down" });
    Ok(up.into())
}

/// Execute the 'genkey' command
pub async fn cmd_genkey(strategy: &dyn WgStrategy, offline: bool) -> Result<()> {
    let key = if offline {
        encode_key(&generate_private_key().to_bytes())
    } else {
        strategy.generate_private_key().await?
    };
    println!("{}", key);
    Ok(())
}

/// Execute the 'pubkey' command
pub async fn cmd_pubkey(
    strategy: &dyn WgStrategy,
    private_key: Option<String>,
    offline: bool,
) -> Result<()> {
    let private_key = match private_key {
        Some(key) => key,
        None => read_stdin_line()?,
    };

    let public_key = if offline {
        public_key_for(&private_key)?
    } else {
        strategy.public_key(&private_key).await?
    };
    println!("{}", public_key);
    Ok(())
}

/// Execute the 'check' command
pub fn cmd_check(config_path: PathBuf) -> Result<()> {
    let config = load_tunnel(&config_path)?;
    print!("{}", summarize(&tunnel_name(&config_path.to_string_lossy()), &config));
    Ok(())
}

/// Parse a tunnel file and make sure its name is usable as an interface
fn load_tunnel(path: &Path) -> Result<TunnelConfig> {
    validate_tunnel_name(tunnel_name(&path.to_string_lossy()))?;
    let config = parse_config_file(path)?;
    if config.peers.is_empty() {
        tracing::warn!(config = %path.display(), "Tunnel has no peers");
    }
    Ok(config)
}

/// Tunnel services are registered by absolute path
fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn read_stdin_line() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| WgError::Other(format!("Failed to read from stdin: {}", e)))?;
    Ok(line.trim().to_string())
}

fn summarize(name: &str, config: &TunnelConfig) -> String {
    let iface = &config.interface;
    let mut out = format!("tunnel: {}\n  public key: {}\n", name, config.public_key());

    if !iface.addresses.is_empty() {
        let addrs: Vec<String> = iface.addresses.iter().map(ToString::to_string).collect();
        out.push_str(&format!("  address: {}\n", addrs.join(", ")));
    }
    if let Some(port) = iface.listen_port {
        out.push_str(&format!("  listening port: {}\n", port));
    }
    if !iface.dns.is_empty() {
        let dns: Vec<String> = iface
            .dns
            .iter()
            .map(|entry| match entry {
                DnsEntry::Server(ip) => ip.to_string(),
                DnsEntry::SearchDomain(domain) => domain.clone(),
            })
            .collect();
        out.push_str(&format!("  dns: {}\n", dns.join(", ")));
    }

    for peer in &config.peers {
        out.push_str(&format!("\npeer: {}\n", encode_key(peer.public_key.as_bytes())));
        if let Some(endpoint) = &peer.endpoint {
            out.push_str(&format!("  endpoint: {}\n", endpoint));
        }
        let allowed: Vec<String> = peer.allowed_ips.iter().map(ToString::to_string).collect();
        out.push_str(&format!("  allowed ips: {}\n", allowed.join(", ")));
        if let Some(secs) = peer.persistent_keepalive {
            out.push_str(&format!("  persistent keepalive: every {} seconds\n", secs));
        }
    }

    if config.is_full_tunnel() {
        out.push_str("\nall traffic is routed through the tunnel\n");
    }
    out
}
