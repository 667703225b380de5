use ipnetwork::Ipv4Network;
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid ip address '{0}'")]
    InvalidAddress(String),

    #[error("invalid ip range '{0}'")]
    InvalidRange(String),

    #[error("invalid prefix length '{0}'")]
    InvalidPrefix(String),
}

/// ルールのIP指定: `*` またはCIDR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpSpec {
    Any,
    Network(Ipv4Network),
}

impl IpSpec {
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        if text == "*" {
            return Ok(IpSpec::Any);
        }

        let (addr_str, prefix_str) = match text.split_once('/') {
            Some(parts) => parts,
            None => return Err(AddressError::InvalidRange(text.to_string())),
        };
        if prefix_str.contains('/') {
            return Err(AddressError::InvalidRange(text.to_string()));
        }

        let base = parse_ip(addr_str)?;
        let prefix = parse_prefix(prefix_str)?;

        Ipv4Network::new(Ipv4Addr::from(base), prefix)
            .map(IpSpec::Network)
            .map_err(|_| AddressError::InvalidPrefix(prefix_str.to_string()))
    }

    /// `*` はレンジ判定を通さず常に一致する
    pub fn matches(&self, address: u32) -> Result<bool, AddressError> {
        match self {
            IpSpec::Any => Ok(true),
            IpSpec::Network(net) => {
                if prefix_mask(net.prefix()).is_none() {
                    return Err(AddressError::InvalidPrefix(net.prefix().to_string()));
                }
                Ok(in_range(address, u32::from(net.ip()), net.prefix()))
            }
        }
    }
}

impl fmt::Display for IpSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpSpec::Any => write!(f, "*"),
            IpSpec::Network(net) => write!(f, "{}/{}", net.ip(), net.prefix()),
        }
    }
}

/// ドット区切り4オクテットを32ビット整数に変換する（先頭オクテットが最上位）
pub fn parse_ip(text: &str) -> Result<u32, AddressError> {
    let invalid = || AddressError::InvalidAddress(text.to_string());

    let mut octets = [0u8; 4];
    let mut count = 0;
    for part in text.split('.') {
        if count == octets.len() || !is_decimal(part) {
            return Err(invalid());
        }
        octets[count] = part.parse::<u8>().map_err(|_| invalid())?;
        count += 1;
    }
    if count != octets.len() {
        return Err(invalid());
    }

    Ok(u32::from_be_bytes(octets))
}

/// 上位 `prefix_len` ビットが立ったマスク。32を超える値は `None`
pub fn prefix_mask(prefix_len: u8) -> Option<u32> {
    if prefix_len > 32 {
        return None;
    }
    Some(u32::MAX.checked_shl(32 - u32::from(prefix_len)).unwrap_or(0))
}

pub fn in_range(address: u32, base: u32, prefix_len: u8) -> bool {
    match prefix_mask(prefix_len) {
        Some(mask) => address & mask == base & mask,
        None => false,
    }
}

fn parse_prefix(text: &str) -> Result<u8, AddressError> {
    if !is_decimal(text) {
        return Err(AddressError::InvalidPrefix(text.to_string()));
    }
    match text.parse::<u8>() {
        Ok(prefix) if prefix <= 32 => Ok(prefix),
        _ => Err(AddressError::InvalidPrefix(text.to_string())),
    }
}

pub(crate) fn is_decimal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
