//! Network policy evaluation.
//!
//! A policy has a default action and a list of CIDR exceptions. An address
//! matching any exception gets the opposite of the default:
//!
//! | default | matched | result |
//! |---------|---------|--------|
//! | allow | no | allow |
//! | allow | yes | deny |
//! | deny | no | deny |
//! | deny | yes | allow |
//!
//! Malformed exception entries are skipped. A requester address that does not
//! parse matches no exception.

use heron_core::{NetworkAction, NetworkPolicy};
use ipnet::IpNet;
use std::net::IpAddr;

/// Returns true if `ip` may call a resource guarded by `policy`.
///
/// ```
/// use heron_core::NetworkPolicy;
/// use heron_pipeline::network::allowed;
///
/// let internal = NetworkPolicy::deny_all().except("10.0.0.0/8");
/// assert!(allowed("10.1.2.3", &internal));
/// assert!(!allowed("8.8.8.8", &internal));
/// ```
#[must_use]
pub fn allowed(ip: &str, policy: &NetworkPolicy) -> bool {
    let matched = parse_ip(ip).is_some_and(|addr| {
        policy
            .exceptions
            .iter()
            .filter_map(|entry| parse_exception(entry))
            .any(|net| net.contains(&addr))
    });

    match policy.default {
        NetworkAction::Allow => !matched,
        NetworkAction::Deny => matched,
    }
}

fn parse_ip(ip: &str) -> Option<IpAddr> {
    ip.trim().parse::<IpAddr>().ok().map(|addr| addr.to_canonical())
}

/// Parses a CIDR exception. A bare address is treated as a single host.
fn parse_exception(entry: &str) -> Option<IpNet> {
    let entry = entry.trim();
    if let Ok(net) = entry.parse::<IpNet>() {
        return Some(net);
    }
    if let Ok(addr) = entry.parse::<IpAddr>() {
        return Some(IpNet::from(addr));
    }
    tracing::warn!(exception = %entry, "skipping malformed network exception");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_with_exception() {
        let policy = NetworkPolicy::deny_all().except("10.0.0.0/8");
        assert!(allowed("10.1.2.3", &policy));
        assert!(!allowed("8.8.8.8", &policy));
    }

    #[test]
    fn test_allow_with_exception() {
        let policy = NetworkPolicy::allow_all().except("10.0.0.0/8");
        assert!(!allowed("10.1.2.3", &policy));
        assert!(allowed("8.8.8.8", &policy));
    }

    #[test]
    fn test_no_exceptions() {
        assert!(allowed("1.2.3.4", &NetworkPolicy::allow_all()));
        assert!(!allowed("1.2.3.4", &NetworkPolicy::deny_all()));
    }

    #[test]
    fn test_malformed_exception_is_skipped() {
        // The broken entry neither matches nor blocks evaluation of the rest.
        let deny = NetworkPolicy::deny_all()
            .except("10.0.0.0/33")
            .except("not-a-cidr")
            .except("192.168.0.0/16");
        assert!(allowed("192.168.4.4", &deny));
        assert!(!allowed("10.0.0.1", &deny));

        // Under an allow default a malformed entry fails open.
        let allow = NetworkPolicy::allow_all().except("10.0.0.0/33");
        assert!(allowed("10.0.0.1", &allow));
    }

    #[test]
    fn test_unparseable_ip_matches_nothing() {
        let deny = NetworkPolicy::deny_all().except("0.0.0.0/0");
        assert!(!allowed("", &deny));
        assert!(!allowed("localhost", &deny));

        let allow = NetworkPolicy::allow_all().except("0.0.0.0/0");
        assert!(allowed("garbage", &allow));
    }

    #[test]
    fn test_ipv6_and_mapped_addresses() {
        let policy = NetworkPolicy::deny_all()
            .except("fd00::/8")
            .except("10.0.0.0/8");
        assert!(allowed("fd12::1", &policy));
        assert!(allowed("::ffff:10.9.9.9", &policy));
        assert!(!allowed("2001:db8::1", &policy));
    }

    #[test]
    fn test_bare_address_exception() {
        let policy = NetworkPolicy::deny_all().except("127.0.0.1");
        assert!(allowed("127.0.0.1", &policy));
        assert!(!allowed("127.0.0.2", &policy));
    }
}
