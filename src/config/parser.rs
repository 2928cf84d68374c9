use ini::{Ini, ParseOption, Properties};
use ip_network::IpNetwork;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use x25519_dalek::{PublicKey, StaticSecret};

use super::types::{
    DnsEntry, Endpoint, InterfaceAddress, InterfaceConfig, PeerConfig, RouteTable, TunnelConfig,
};
use crate::error::{ConfigError, Result};
use crate::keys::decode_key;

/// Longest interface name the kernel (and wg-quick) accepts
pub const MAX_TUNNEL_NAME_LEN: usize = 15;

/// Parse a tunnel file from disk
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<TunnelConfig> {
    let text = std::fs::read_to_string(path).map_err(ConfigError::File)?;
    parse_config_str(&text)
}

/// Parse tunnel file contents
pub fn parse_config_str(text: &str) -> Result<TunnelConfig> {
    // Notepad saves with a byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    // PostUp/PostDown hold shell snippets; keep backslashes and quotes verbatim
    let opts = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    };
    let ini = Ini::load_from_str_opt(text, opts).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let mut interface: Option<InterfaceConfig> = None;
    let mut peers = Vec::new();

    for (name, props) in ini.iter() {
        let section = Section(props);
        match name {
            Some(n) if n.eq_ignore_ascii_case("Interface") => {
                if interface.is_some() {
                    return Err(ConfigError::Parse("duplicate [Interface] section".into()).into());
                }
                interface = Some(parse_interface(&section)?);
            }
            Some(n) if n.eq_ignore_ascii_case("Peer") => peers.push(parse_peer(&section)?),
            _ => {}
        }
    }

    let interface = interface.ok_or(ConfigError::MissingField("Interface section"))?;
    Ok(TunnelConfig { interface, peers })
}

/// Reject names wg-quick and the tunnel service would refuse
pub fn validate_tunnel_name(name: &str) -> Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || "_=+.-".contains(c);
    if name.is_empty() || name.len() > MAX_TUNNEL_NAME_LEN || !name.chars().all(allowed) {
        return Err(ConfigError::InvalidTunnelName(name.to_string()).into());
    }
    Ok(())
}

/// Case-insensitive view over one INI section; keys may repeat
struct Section<'a>(&'a Properties);

impl<'a> Section<'a> {
    fn all(&self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let props: &'a Properties = self.0;
        props
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.trim())
    }

    /// Last occurrence wins for scalar settings
    fn get(&self, key: &'a str) -> Option<&'a str> {
        self.all(key).last()
    }

    /// Comma-separated values across every occurrence of `key`
    fn list(&self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.all(key)
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn parsed<T: FromStr>(&self, key: &'a str) -> Result<Option<T>> {
        self.get(key)
            .map(|v| {
                v.parse::<T>()
                    .map_err(|_| ConfigError::Parse(format!("Invalid {}: {}", key, v)).into())
            })
            .transpose()
    }
}

fn parse_interface(section: &Section<'_>) -> Result<InterfaceConfig> {
    let private_key = section
        .get("PrivateKey")
        .ok_or(ConfigError::MissingField("PrivateKey"))?;
    let private_key = StaticSecret::from(decode_key("Private key", private_key)?);

    let addresses = section
        .list("Address")
        .map(parse_interface_address)
        .collect::<Result<Vec<_>>>()?;

    let listen_port = section
        .get("ListenPort")
        .map(|s| s.parse::<u16>().map_err(|_| ConfigError::InvalidPort(s.to_string())))
        .transpose()?;

    let dns = section.list("DNS").map(parse_dns_entry).collect();

    Ok(InterfaceConfig {
        private_key,
        addresses,
        listen_port,
        dns,
        mtu: section.parsed("MTU")?,
        table: section.get("Table").map(parse_table).transpose()?,
        fwmark: section.get("FwMark").map(parse_fwmark).transpose()?,
        pre_up: section.all("PreUp").map(String::from).collect(),
        post_up: section.all("PostUp").map(String::from).collect(),
        pre_down: section.all("PreDown").map(String::from).collect(),
        post_down: section.all("PostDown").map(String::from).collect(),
        save_config: section.parsed("SaveConfig")?.unwrap_or(false),
    })
}

fn parse_peer(section: &Section<'_>) -> Result<PeerConfig> {
    let public_key = section
        .get("PublicKey")
        .ok_or(ConfigError::MissingField("PublicKey"))?;
    let public_key = PublicKey::from(decode_key("Public key", public_key)?);

    let preshared_key = section
        .get("PresharedKey")
        .map(|s| decode_key("Preshared key", s))
        .transpose()?;

    let allowed_ips = section
        .list("AllowedIPs")
        .map(parse_network)
        .collect::<Result<Vec<_>>>()?;

    Ok(PeerConfig {
        public_key,
        preshared_key,
        endpoint: section.get("Endpoint").map(parse_endpoint).transpose()?,
        allowed_ips,
        persistent_keepalive: parse_keepalive(section.get("PersistentKeepalive"))?,
    })
}

/// `ip[/prefix]`; a bare IP gets a host-length prefix
fn split_prefix(s: &str) -> std::result::Result<(IpAddr, u8), ConfigError> {
    let invalid = || ConfigError::InvalidAddress(s.to_string());
    let (ip, prefix) = match s.split_once('/') {
        Some((ip, prefix)) => (ip, Some(prefix)),
        None => (s, None),
    };
    let ip: IpAddr = ip.parse().map_err(|_| invalid())?;
    let max = if ip.is_ipv4() { 32 } else { 128 };
    let prefix = match prefix {
        Some(p) => p.parse::<u8>().map_err(|_| invalid())?,
        None => max,
    };
    if prefix > max {
        return Err(invalid());
    }
    Ok((ip, prefix))
}

/// Interface address; host bits are kept (10.0.0.2/24)
fn parse_interface_address(s: &str) -> Result<InterfaceAddress> {
    let (ip, prefix) = split_prefix(s)?;
    Ok(InterfaceAddress { ip, prefix })
}

/// AllowedIPs entry, truncated to its network
fn parse_network(s: &str) -> Result<IpNetwork> {
    let (ip, prefix) = split_prefix(s)?;
    IpNetwork::new_truncate(ip, prefix)
        .map_err(|_| ConfigError::InvalidAddress(s.to_string()).into())
}

fn parse_dns_entry(s: &str) -> DnsEntry {
    match s.parse::<IpAddr>() {
        Ok(ip) => DnsEntry::Server(ip),
        Err(_) => DnsEntry::SearchDomain(s.to_string()),
    }
}

fn parse_table(s: &str) -> Result<RouteTable> {
    match s.to_ascii_lowercase().as_str() {
        "off" => Ok(RouteTable::Off),
        "auto" => Ok(RouteTable::Auto),
        other => other
            .parse::<u32>()
            .map(RouteTable::Id)
            .map_err(|_| ConfigError::Parse(format!("Invalid Table: {}", s)).into()),
    }
}

/// host:port, [v6]:port, or v6-literal:port
fn parse_endpoint(s: &str) -> Result<Endpoint> {
    let invalid = || ConfigError::InvalidEndpoint(s.to_string());

    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(Endpoint {
            host: addr.ip().to_string(),
            port: addr.port(),
        });
    }

    let (host, port) = s.rsplit_once(':').ok_or_else(invalid)?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(invalid().into());
    }
    let port: u16 = port.parse().map_err(|_| invalid())?;

    Ok(Endpoint {
        host: host.to_string(),
        port,
    })
}

/// Decimal, hex with 0x prefix, or "off"
fn parse_fwmark(s: &str) -> Result<u32> {
    let invalid = || ConfigError::Parse(format!("Invalid FwMark: {}", s));
    if s.eq_ignore_ascii_case("off") {
        return Ok(0);
    }
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).map_err(|_| invalid().into()),
        None => s.parse::<u32>().map_err(|_| invalid().into()),
    }
}

fn parse_keepalive(value: Option<&str>) -> Result<Option<u16>> {
    match value {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("off") => Ok(None),
        Some(v) => match v.parse::<u16>() {
            Ok(0) => Ok(None),
            Ok(secs) => Ok(Some(secs)),
            Err(_) => Err(ConfigError::Parse(format!("Invalid PersistentKeepalive: {}", v)).into()),
        },
    }
}
