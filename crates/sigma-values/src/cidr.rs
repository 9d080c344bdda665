//! CIDR expression values and their prefix-wildcard expansion.
//!
//! Backends without native CIDR matching receive an expanded list of
//! wildcard prefix patterns instead: IPv4 networks are aligned to the next
//! 8-bit (octet) boundary, IPv6 networks to the next 4-bit (hex digit)
//! boundary, and each resulting subnet is rendered with a trailing `*`.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::Serialize;

use crate::error::{Result, SigmaValueError};

/// A validated CIDR network value from a `|cidr`-modified detection item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SigmaCidrExpression {
    pub network: IpNet,
    /// The CIDR string exactly as given.
    pub original: String,
}

impl SigmaCidrExpression {
    /// Parse and validate a CIDR string. A bare address is treated as a
    /// full-length network; host bits set below the prefix are rejected.
    pub fn new(cidr: &str) -> Result<Self> {
        let network = match IpNet::from_str(cidr) {
            Ok(net) => {
                if net.addr() != net.network() {
                    return Err(SigmaValueError::InvalidValue(format!(
                        "CIDR '{cidr}' has host bits set"
                    )));
                }
                net
            }
            Err(_) => {
                let addr: IpAddr = cidr.parse().map_err(|_| {
                    SigmaValueError::InvalidValue(format!("invalid CIDR expression '{cidr}'"))
                })?;
                IpNet::from(addr)
            }
        };
        Ok(SigmaCidrExpression {
            network,
            original: cidr.to_string(),
        })
    }

    /// Expand into wildcard prefix patterns for targets without CIDR support.
    ///
    /// The network is split at the next octet (IPv4) or hex-digit (IPv6)
    /// boundary and each subnet renders as its literal prefix followed by a
    /// `*`. Subnets that cover a single address render as that address with
    /// no wildcard.
    pub fn expand(&self) -> Vec<String> {
        match self.network {
            IpNet::V4(net) => expand_v4(net),
            IpNet::V6(net) => expand_v6(net),
        }
    }
}

impl fmt::Display for SigmaCidrExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

fn expand_v4(net: Ipv4Net) -> Vec<String> {
    let boundary = net.prefix_len().div_ceil(8) * 8;

    // boundary is always within [prefix_len, 32], so subnets() cannot fail
    let Ok(subnets) = net.subnets(boundary) else {
        return Vec::new();
    };

    if boundary == 32 {
        return subnets.map(|s| s.addr().to_string()).collect();
    }

    let literal_octets = (boundary / 8) as usize;
    subnets
        .map(|s| {
            let octets = s.network().octets();
            let mut groups: Vec<String> = octets[..literal_octets]
                .iter()
                .map(u8::to_string)
                .collect();
            groups.push("*".to_string());
            groups.join(".")
        })
        .collect()
}

fn expand_v6(net: Ipv6Net) -> Vec<String> {
    let boundary = net.prefix_len().div_ceil(4) * 4;

    let Ok(subnets) = net.subnets(boundary) else {
        return Vec::new();
    };

    subnets
        .map(|s| {
            let first = s.network().to_string();
            let last = s.broadcast().to_string();
            if first == last {
                return first;
            }
            // wildcard at the first character where the subnet's lowest and
            // highest canonical addresses diverge
            let cut = first
                .chars()
                .zip(last.chars())
                .position(|(a, b)| a != b)
                .unwrap_or_else(|| first.chars().count().min(last.chars().count()));
            let mut pattern: String = first.chars().take(cut).collect();
            pattern.push('*');
            pattern
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_v4_between_boundaries() {
        let cidr = SigmaCidrExpression::new("192.168.0.0/22").unwrap();
        assert_eq!(
            cidr.expand(),
            vec!["192.168.0.*", "192.168.1.*", "192.168.2.*", "192.168.3.*"]
        );
    }

    #[test]
    fn expand_v4_on_boundary() {
        let cidr = SigmaCidrExpression::new("10.0.0.0/8").unwrap();
        assert_eq!(cidr.expand(), vec!["10.*"]);

        let cidr = SigmaCidrExpression::new("192.168.1.0/24").unwrap();
        assert_eq!(cidr.expand(), vec!["192.168.1.*"]);
    }

    #[test]
    fn expand_v4_host_networks_have_no_wildcard() {
        let cidr = SigmaCidrExpression::new("192.168.1.4/32").unwrap();
        assert_eq!(cidr.expand(), vec!["192.168.1.4"]);

        let cidr = SigmaCidrExpression::new("192.168.1.4/30").unwrap();
        assert_eq!(
            cidr.expand(),
            vec!["192.168.1.4", "192.168.1.5", "192.168.1.6", "192.168.1.7"]
        );
    }

    #[test]
    fn expand_v6_on_hex_digit_boundary() {
        let cidr = SigmaCidrExpression::new("2001:db8::/32").unwrap();
        assert_eq!(cidr.expand(), vec!["2001:db8:*"]);
    }

    #[test]
    fn expand_v6_between_boundaries() {
        // /30 aligns to /32: four subnets differing in the last digit of
        // the second group
        let cidr = SigmaCidrExpression::new("2001:db8::/30").unwrap();
        let patterns = cidr.expand();
        assert_eq!(patterns.len(), 4);
        assert!(patterns.contains(&"2001:db8:*".to_string()));
        assert!(patterns.contains(&"2001:db9:*".to_string()));
        assert!(patterns.contains(&"2001:dba:*".to_string()));
        assert!(patterns.contains(&"2001:dbb:*".to_string()));
    }

    #[test]
    fn expand_v6_full_length() {
        let cidr = SigmaCidrExpression::new("2001:db8::1/128").unwrap();
        assert_eq!(cidr.expand(), vec!["2001:db8::1"]);
    }

    #[test]
    fn bare_address_is_host_network() {
        let cidr = SigmaCidrExpression::new("192.168.1.1").unwrap();
        assert_eq!(cidr.network.prefix_len(), 32);
        assert_eq!(cidr.expand(), vec!["192.168.1.1"]);
    }

    #[test]
    fn host_bits_rejected() {
        let err = SigmaCidrExpression::new("192.168.1.1/24").unwrap_err();
        assert!(
            matches!(err, SigmaValueError::InvalidValue(_)),
            "expected InvalidValue, got: {err}"
        );
    }

    #[test]
    fn garbage_rejected() {
        assert!(SigmaCidrExpression::new("not-a-network").is_err());
        assert!(SigmaCidrExpression::new("192.168.0.0/33").is_err());
    }
}
