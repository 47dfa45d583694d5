//! CIDR block arithmetic
//!
//! Derives everything a network engineer usually wants to know about an
//! address block from its CIDR notation:
//! - Network address and subnet mask
//! - Inverse (wildcard) mask
//! - First and last usable host
//! - Broadcast address (IPv4 only)
//! - Host count
//!
//! Both address families are supported. The arithmetic works on the raw
//! byte representation (4 bytes for IPv4, 16 for IPv6).
//!
//! # Examples
//!
//! ```
//! use macconv_cidr::compute;
//!
//! let info = compute("192.168.1.0/24").unwrap();
//! assert_eq!(info.network_id().to_string(), "192.168.1.0");
//! assert_eq!(info.inverse_mask().to_string(), "0.0.0.255");
//! assert_eq!(info.total_hosts(), 254);
//! ```

use macconv_core::MacconvError;
use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;

/// Host count reported when the block is too large for an `i64`
pub const HOSTS_TOO_LARGE: i64 = -1;

/// Reason a CIDR string was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// No `/prefix` part
    #[error("missing /prefix length")]
    MissingPrefix,

    /// Address part is not a valid literal for its family
    #[error("invalid {0} address: {1}")]
    InvalidAddress(IpVersion, String),

    /// Prefix part is not a plain decimal number
    #[error("invalid prefix length: {0:?}")]
    InvalidPrefix(String),

    /// Prefix is larger than the address width
    #[error("prefix length {prefix} out of range (0-{max})")]
    PrefixOutOfRange { prefix: u32, max: u8 },
}

/// CIDR errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// The input could not be parsed as CIDR notation
    #[error("invalid CIDR notation {input:?}: {reason}")]
    Parse {
        input: String,
        #[source]
        reason: ParseFailure,
    },
}

impl CidrError {
    fn parse(input: &str, reason: ParseFailure) -> Self {
        CidrError::Parse {
            input: input.to_string(),
            reason,
        }
    }
}

impl From<CidrError> for MacconvError {
    fn from(err: CidrError) -> Self {
        match err {
            CidrError::Parse { input, reason } => MacconvError::Parse {
                input,
                reason: reason.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, CidrError>;

/// Address family of a CIDR block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IpVersion {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
}

impl IpVersion {
    /// Width of an address in bits
    pub fn bit_length(self) -> u8 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPv4"),
            IpVersion::V6 => f.write_str("IPv6"),
        }
    }
}

/// Everything derived from one CIDR string
///
/// Built by [`compute`]; the fields are read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CidrInfo {
    address: IpAddr,
    version: IpVersion,
    prefix_len: u8,
    bit_length: u8,
    network_id: IpAddr,
    first_ip: IpAddr,
    last_ip: IpAddr,
    broadcast_address: Option<IpAddr>,
    subnet_mask: IpAddr,
    inverse_mask: IpAddr,
    total_hosts: i64,
}

impl CidrInfo {
    /// The address as given in the input
    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// Address family
    pub fn version(&self) -> IpVersion {
        self.version
    }

    /// Prefix length
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Address width in bits (32 or 128)
    pub fn bit_length(&self) -> u8 {
        self.bit_length
    }

    /// Address with all host bits cleared
    pub fn network_id(&self) -> IpAddr {
        self.network_id
    }

    /// Network address with the last byte incremented
    ///
    /// The increment wraps within the last byte and never carries, so a
    /// /32 whose last byte is 255 reports a first host ending in 0.
    pub fn first_ip(&self) -> IpAddr {
        self.first_ip
    }

    /// All-ones address with the last byte decremented
    ///
    /// Wraps within the last byte like [`CidrInfo::first_ip`].
    pub fn last_ip(&self) -> IpAddr {
        self.last_ip
    }

    /// Broadcast address, `None` for IPv6
    pub fn broadcast_address(&self) -> Option<IpAddr> {
        self.broadcast_address
    }

    /// Subnet mask
    pub fn subnet_mask(&self) -> IpAddr {
        self.subnet_mask
    }

    /// Inverse (wildcard) mask
    pub fn inverse_mask(&self) -> IpAddr {
        self.inverse_mask
    }

    /// Number of hosts, or [`HOSTS_TOO_LARGE`]
    ///
    /// IPv4 reserves network and broadcast for prefixes up to /30; a /31
    /// counts both addresses (point-to-point) and a /32 counts one.
    pub fn total_hosts(&self) -> i64 {
        self.total_hosts
    }
}

/// Parse a CIDR string and derive its block information
///
/// # Arguments
///
/// * `cidr` - CIDR string (e.g., "10.0.0.0/8" or "2001:db8::/32")
///
/// # Examples
///
/// ```
/// use macconv_cidr::{compute, HOSTS_TOO_LARGE};
///
/// let info = compute("2001:db8::/32").unwrap();
/// assert_eq!(info.network_id().to_string(), "2001:db8::");
/// assert!(info.broadcast_address().is_none());
/// assert_eq!(info.total_hosts(), HOSTS_TOO_LARGE);
///
/// assert!(compute("192.168.1.0").is_err());
/// assert!(compute("192.168.1.0/33").is_err());
/// ```
pub fn compute(cidr: &str) -> Result<CidrInfo> {
    let (address_str, prefix_str) = cidr
        .rsplit_once('/')
        .ok_or_else(|| CidrError::parse(cidr, ParseFailure::MissingPrefix))?;

    let version = if address_str.contains(':') {
        IpVersion::V6
    } else {
        IpVersion::V4
    };

    let address = parse_address(address_str, version)
        .ok_or_else(|| {
            CidrError::parse(
                cidr,
                ParseFailure::InvalidAddress(version, address_str.to_string()),
            )
        })?;

    let prefix_len =
        parse_prefix(prefix_str, version).map_err(|reason| CidrError::parse(cidr, reason))?;

    let info = match address {
        IpAddr::V4(v4) => build(address, version, prefix_len, v4.octets()),
        IpAddr::V6(v6) => build(address, version, prefix_len, v6.octets()),
    };

    tracing::debug!(
        cidr,
        network = %info.network_id,
        hosts = info.total_hosts,
        "computed CIDR block"
    );

    Ok(info)
}

/// Bitwise complement of a mask, keeping its family
///
/// ```
/// use macconv_cidr::inverse_mask;
/// use std::net::IpAddr;
///
/// let mask: IpAddr = "255.255.0.0".parse().unwrap();
/// assert_eq!(inverse_mask(mask).to_string(), "0.0.255.255");
/// ```
pub fn inverse_mask(mask: IpAddr) -> IpAddr {
    match mask {
        IpAddr::V4(v4) => IpAddr::V4(Ipv4Addr::from(v4.octets().map(|b| !b))),
        IpAddr::V6(v6) => IpAddr::V6(Ipv6Addr::from(v6.octets().map(|b| !b))),
    }
}

fn parse_address(address: &str, version: IpVersion) -> Option<IpAddr> {
    match version {
        IpVersion::V4 => address.parse::<Ipv4Addr>().ok().map(IpAddr::V4),
        IpVersion::V6 => address.parse::<Ipv6Addr>().ok().map(IpAddr::V6),
    }
}

fn parse_prefix(prefix: &str, version: IpVersion) -> std::result::Result<u8, ParseFailure> {
    // `str::parse` would also accept a leading '+'
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseFailure::InvalidPrefix(prefix.to_string()));
    }

    let value: u32 = prefix
        .parse()
        .map_err(|_| ParseFailure::InvalidPrefix(prefix.to_string()))?;

    let max = version.bit_length();
    if value > u32::from(max) {
        return Err(ParseFailure::PrefixOutOfRange { prefix: value, max });
    }

    Ok(value as u8)
}

fn build<const N: usize>(
    address: IpAddr,
    version: IpVersion,
    prefix_len: u8,
    octets: [u8; N],
) -> CidrInfo
where
    IpAddr: From<[u8; N]>,
{
    let mask = prefix_mask::<N>(prefix_len);
    let inverse: [u8; N] = mask.map(|b| !b);
    let network: [u8; N] = std::array::from_fn(|i| octets[i] & mask[i]);
    let all_ones: [u8; N] = std::array::from_fn(|i| network[i] | inverse[i]);

    // No carry into the neighbouring byte, see `CidrInfo::first_ip`
    let mut first = network;
    first[N - 1] = first[N - 1].wrapping_add(1);
    let mut last = all_ones;
    last[N - 1] = last[N - 1].wrapping_sub(1);

    CidrInfo {
        address,
        version,
        prefix_len,
        bit_length: version.bit_length(),
        network_id: IpAddr::from(network),
        first_ip: IpAddr::from(first),
        last_ip: IpAddr::from(last),
        broadcast_address: match version {
            IpVersion::V4 => Some(IpAddr::from(all_ones)),
            IpVersion::V6 => None,
        },
        subnet_mask: IpAddr::from(mask),
        inverse_mask: IpAddr::from(inverse),
        total_hosts: total_hosts(version, prefix_len),
    }
}

/// `prefix_len` leading one-bits followed by zero-bits
fn prefix_mask<const N: usize>(prefix_len: u8) -> [u8; N] {
    let mut remaining = usize::from(prefix_len);
    let mut mask = [0u8; N];
    for byte in mask.iter_mut() {
        let take = remaining.min(8);
        if take > 0 {
            *byte = 0xFF << (8 - take);
        }
        remaining -= take;
    }
    mask
}

fn total_hosts(version: IpVersion, prefix_len: u8) -> i64 {
    let host_bits = u32::from(version.bit_length() - prefix_len);
    match version {
        IpVersion::V4 => match prefix_len {
            32 => 1,
            31 => 2,
            _ => (1i64 << host_bits) - 2,
        },
        // 2^63 no longer fits a signed 64-bit counter
        IpVersion::V6 if host_bits >= 63 => HOSTS_TOO_LARGE,
        IpVersion::V6 => 1i64 << host_bits,
    }
}
