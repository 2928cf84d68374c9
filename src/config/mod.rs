pub mod parser;
pub mod tools;
pub mod types;

pub use parser::{parse_config_file, parse_config_str, validate_tunnel_name};
pub use tools::ToolConfig;
pub use types::{
    DnsEntry, Endpoint, InterfaceAddress, InterfaceConfig, PeerConfig, RouteTable, TunnelConfig,
};
