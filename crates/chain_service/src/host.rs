use std::net::IpAddr;

use chain_core::contract::UNKNOWN_VALUE;
use chain_core::error::ChainError;

/// Host facts reported in every service record.
pub trait HostInfo: Send + Sync {
    fn service_ip(&self) -> Result<String, ChainError>;
    fn hostname(&self) -> String;
}

pub struct SystemHost;

impl HostInfo for SystemHost {
    fn service_ip(&self) -> Result<String, ChainError> {
        let interfaces = if_addrs::get_if_addrs()?;
        let candidates = interfaces
            .iter()
            .map(|iface| (iface.ip(), iface.is_loopback()));
        Ok(first_external_ipv4(candidates).unwrap_or_else(|| UNKNOWN_VALUE.to_string()))
    }

    fn hostname(&self) -> String {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
    }
}

/// First IPv4 address not flagged as loopback, in interface enumeration order.
pub fn first_external_ipv4(candidates: impl IntoIterator<Item = (IpAddr, bool)>) -> Option<String> {
    candidates
        .into_iter()
        .find_map(|(ip, is_loopback)| match ip {
            IpAddr::V4(v4) if !is_loopback && !v4.is_loopback() => Some(v4.to_string()),
            _ => None,
        })
}
