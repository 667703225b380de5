use crate::network::address::is_decimal;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("invalid port '{0}'")]
    InvalidPort(String),

    #[error("invalid port list '{0}'")]
    EmptyList(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSet {
    Any,
    Ports(BTreeSet<u16>),
}

impl PortSet {
    pub fn parse(text: &str) -> Result<Self, PortError> {
        if text == "*" {
            return Ok(PortSet::Any);
        }

        // 空のトークン（"80,,443" など）は読み飛ばす
        let ports = text
            .split(',')
            .filter(|token| !token.is_empty())
            .map(parse_port)
            .collect::<Result<BTreeSet<u16>, PortError>>()?;

        if ports.is_empty() {
            return Err(PortError::EmptyList(text.to_string()));
        }
        Ok(PortSet::Ports(ports))
    }

    pub fn contains(&self, port: u16) -> bool {
        match self {
            PortSet::Any => true,
            PortSet::Ports(ports) => ports.contains(&port),
        }
    }
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSet::Any => write!(f, "*"),
            PortSet::Ports(ports) => {
                let joined: Vec<String> = ports.iter().map(|p| p.to_string()).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}

/// 0〜65535の10進数ポート番号
pub fn parse_port(text: &str) -> Result<u16, PortError> {
    if !is_decimal(text) {
        return Err(PortError::InvalidPort(text.to_string()));
    }
    text.parse::<u16>()
        .map_err(|_| PortError::InvalidPort(text.to_string()))
}
