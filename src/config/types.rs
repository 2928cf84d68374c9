use ip_network::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::keys::{derive_public_key, encode_key};

/// A tunnel file as consumed by `wg-quick` and the Windows tunnel service
#[derive(Clone)]
pub struct TunnelConfig {
    pub interface: InterfaceConfig,
    pub peers: Vec<PeerConfig>,
}

impl fmt::Debug for TunnelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunnelConfig")
            .field("interface", &self.interface)
            .field("peers", &self.peers)
            .finish()
    }
}

impl TunnelConfig {
    /// Base64 public key matching the interface's private key
    pub fn public_key(&self) -> String {
        encode_key(derive_public_key(&self.interface.private_key).as_bytes())
    }

    /// Every AllowedIPs entry across all peers
    pub fn all_allowed_ips(&self) -> impl Iterator<Item = &IpNetwork> {
        self.peers.iter().flat_map(|p| p.allowed_ips.iter())
    }

    /// Whether any peer routes everything (0.0.0.0/0 or ::/0)
    pub fn is_full_tunnel(&self) -> bool {
        self.all_allowed_ips().any(|net| net.netmask() == 0)
    }
}

/// [Interface] section
#[derive(Clone)]
pub struct InterfaceConfig {
    pub private_key: StaticSecret,
    pub addresses: Vec<InterfaceAddress>,
    pub listen_port: Option<u16>,
    pub dns: Vec<DnsEntry>,
    pub mtu: Option<u32>,
    pub table: Option<RouteTable>,
    pub fwmark: Option<u32>,
    pub pre_up: Vec<String>,
    pub post_up: Vec<String>,
    pub pre_down: Vec<String>,
    pub post_down: Vec<String>,
    pub save_config: bool,
}

impl fmt::Debug for InterfaceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceConfig")
            .field("addresses", &self.addresses)
            .field("listen_port", &self.listen_port)
            .field("dns", &self.dns)
            .field("mtu", &self.mtu)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Address assigned to the tunnel interface, host bits included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub ip: IpAddr,
    pub prefix: u8,
}

impl fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix)
    }
}

/// One entry of the DNS list: a resolver or a search domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsEntry {
    Server(IpAddr),
    SearchDomain(String),
}

/// `Table` setting: where wg-quick installs routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTable {
    Off,
    Auto,
    Id(u32),
}

/// [Peer] section
#[derive(Clone)]
pub struct PeerConfig {
    pub public_key: PublicKey,
    pub preshared_key: Option<[u8; 32]>,
    pub endpoint: Option<Endpoint>,
    pub allowed_ips: Vec<IpNetwork>,
    pub persistent_keepalive: Option<u16>,
}

impl fmt::Debug for PeerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerConfig")
            .field("public_key", &encode_key(self.public_key.as_bytes()))
            .field("preshared_key", &self.preshared_key.map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("allowed_ips", &self.allowed_ips)
            .field("persistent_keepalive", &self.persistent_keepalive)
            .finish()
    }
}

/// Peer endpoint; the host may be a name resolved later by the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
