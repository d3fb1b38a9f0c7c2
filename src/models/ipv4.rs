//! IPv4 CIDR parsing for the bastion subnet prefix.
//!
//! Provides [`Ipv4`] for `a.b.c.d/n` values along with the mask helpers used
//! to sanity check the prefix before it is sent to Azure.

use std::error::Error;
use std::net::Ipv4Addr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Largest prefix length Azure accepts for `AzureBastionSubnet`.
pub const BASTION_MAX_PREFIX: u8 = 26;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use azure_bastion::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(26).unwrap(), 0xFFFFFFC0);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, Box<dyn Error>> {
    if len > MAX_LENGTH {
        Err("Network length is too long".into())
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;
        let mask = (all_bits >> right_len) << right_len;
        Ok(mask as u32)
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, Box<dyn Error>> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Number of usable host addresses in an Azure subnet.
///
/// Azure reserves 5 IP addresses per subnet (network, broadcast, gateway, and 2 DNS).
pub fn num_az_hosts(len: u8) -> Result<u64, Box<dyn Error>> {
    if len >= MAX_LENGTH - 2 {
        Err("Network length is too long or invalid".into())
    } else {
        Ok((1u64 << (MAX_LENGTH - len)) - 5)
    }
}

/// IPv4 address with CIDR notation support.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The subnet mask length (0-32).
    pub mask: u8,
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.1.0/26").
    pub fn new(addr_cidr: &str) -> Result<Ipv4, Box<dyn Error>> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| format!("Invalid address/mask '{addr_cidr}'"))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| format!("Invalid address {addr}"))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| format!("Invalid subnet mask {mask}"))?;
        if mask > MAX_LENGTH {
            return Err("Network length is too long".into());
        }
        Ok(Ipv4 { addr, mask })
    }

    /// The network address of this prefix.
    pub fn network(&self) -> Ipv4Addr {
        cut_addr(self.addr, self.mask).unwrap_or(self.addr)
    }

    /// True when no host bits are set, i.e. `10.0.1.0/26` but not `10.0.1.5/26`.
    pub fn is_aligned(&self) -> bool {
        self.network() == self.addr
    }

    /// True when the prefix is big enough to host an Azure Bastion.
    pub fn fits_bastion(&self) -> bool {
        self.mask <= BASTION_MAX_PREFIX
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
