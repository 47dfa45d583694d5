//! DHCP option 43 encoding
//!
//! Vendor-specific option 43 carries boot server addresses to PXE clients
//! and ACS-managed CPEs. DHCP servers usually want the payload as a hex
//! string, so this crate assembles the bytes and renders them two ways:
//! - compact hex (`8007000001c0a80101`)
//! - byte list (`0x80 0x07 0x00 0x00 0x01 0xc0 0xa8 0x01 0x01`)
//!
//! Layouts:
//!
//! | format | bytes |
//! |--------|-------|
//! | PXE    | `0x80`, length (`4n + 3`), `0x00 0x00`, count `n`, addresses |
//! | ACS    | `0x01`, length (`4n`), addresses |
//!
//! # Examples
//!
//! ```
//! use macconv_dhcp::{Option43, Option43Format};
//! use std::net::Ipv4Addr;
//!
//! let servers = [Ipv4Addr::new(192, 168, 1, 1)];
//! let pxe = Option43::new(Option43Format::Pxe, &servers).unwrap();
//! assert_eq!(pxe.to_hex(), "8007000001c0a80101");
//! ```

use macconv_core::MacconvError;
use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Most servers a single option 43 payload is built for
pub const MAX_SERVERS: usize = 2;

/// DHCP encoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DhcpError {
    /// Wrong number of server addresses
    #[error("expected 1 or 2 IPv4 addresses, got {0}")]
    ServerCount(usize),

    /// Not an IP literal
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    /// IPv6 literal where IPv4 is required
    #[error("IPv6 address not supported, expected IPv4: {0}")]
    Ipv6NotSupported(String),
}

impl From<DhcpError> for MacconvError {
    fn from(err: DhcpError) -> Self {
        MacconvError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DhcpError>;

/// Option 43 sub-format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Option43Format {
    /// PXE boot servers
    Pxe,
    /// TR-069 auto configuration servers
    Acs,
}

impl Option43Format {
    /// Leading type byte
    pub fn tag(self) -> u8 {
        match self {
            Option43Format::Pxe => 0x80,
            Option43Format::Acs => 0x01,
        }
    }

    pub fn all() -> [Option43Format; 2] {
        [Option43Format::Pxe, Option43Format::Acs]
    }
}

impl fmt::Display for Option43Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Option43Format::Pxe => f.write_str("PXE"),
            Option43Format::Acs => f.write_str("ACS"),
        }
    }
}

/// Parse the server address arguments
///
/// Accepts one or two IPv4 literals.
///
/// ```
/// use macconv_dhcp::parse_servers;
///
/// assert_eq!(parse_servers(&["10.0.0.1", "10.0.0.2"]).unwrap().len(), 2);
/// assert!(parse_servers(&["::1"]).is_err());
/// ```
pub fn parse_servers<S: AsRef<str>>(args: &[S]) -> Result<Vec<Ipv4Addr>> {
    if args.is_empty() || args.len() > MAX_SERVERS {
        return Err(DhcpError::ServerCount(args.len()));
    }

    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            match arg.parse::<IpAddr>() {
                Ok(IpAddr::V4(v4)) => Ok(v4),
                Ok(IpAddr::V6(_)) => Err(DhcpError::Ipv6NotSupported(arg.to_string())),
                Err(_) => Err(DhcpError::InvalidAddress(arg.to_string())),
            }
        })
        .collect()
}

/// An encoded option 43 payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Option43 {
    format: Option43Format,
    servers: Vec<Ipv4Addr>,
}

impl Option43 {
    /// Build a payload for 1 or 2 servers
    pub fn new(format: Option43Format, servers: &[Ipv4Addr]) -> Result<Self> {
        if servers.is_empty() || servers.len() > MAX_SERVERS {
            return Err(DhcpError::ServerCount(servers.len()));
        }

        Ok(Self {
            format,
            servers: servers.to_vec(),
        })
    }

    pub fn format(&self) -> Option43Format {
        self.format
    }

    pub fn servers(&self) -> &[Ipv4Addr] {
        &self.servers
    }

    /// Raw option bytes
    pub fn bytes(&self) -> Vec<u8> {
        let count = self.servers.len() as u8;
        let mut bytes = Vec::with_capacity(5 + self.servers.len() * 4);
        bytes.push(self.format.tag());

        match self.format {
            Option43Format::Pxe => {
                bytes.push(count * 4 + 3);
                bytes.extend_from_slice(&[0x00, 0x00]);
                bytes.push(count);
            }
            Option43Format::Acs => bytes.push(count * 4),
        }

        for server in &self.servers {
            bytes.extend_from_slice(&server.octets());
        }
        bytes
    }

    /// Lower-case hex, no separators
    pub fn to_hex(&self) -> String {
        self.bytes().iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// `0x..` tokens separated by single spaces
    pub fn to_byte_list(&self) -> String {
        self.bytes()
            .iter()
            .map(|b| format!("0x{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Hex renderings of one format, as printed by the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encoded {
    pub format: Option43Format,
    pub hex: String,
    pub bytes: String,
}

/// Encode the servers in every format
pub fn encode_all(servers: &[Ipv4Addr]) -> Result<Vec<Encoded>> {
    Option43Format::all()
        .into_iter()
        .map(|format| {
            let option = Option43::new(format, servers)?;
            tracing::debug!(%format, servers = servers.len(), "encoded option 43");
            Ok(Encoded {
                format,
                hex: option.to_hex(),
                bytes: option.to_byte_list(),
            })
        })
        .collect()
}
