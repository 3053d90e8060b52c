//! Utility functions

use std::net::Ipv4Addr;

/// Sort IPv4 addresses lexicographically on their dotted-quad string form,
/// not numerically (spec.md §3: "Sort order is lexicographic on the dotted
/// quad" - `10.0.0.1` sorts before `9.9.9.9`, matching the original's
/// `sorted()` over IP strings rather than `Ipv4Addr`'s numeric `Ord`).
pub fn sort_ips_lexicographic(ips: &mut [Ipv4Addr]) {
    ips.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
}

/// Validate an apex domain name against the registered-name pattern
pub fn is_valid_apex_domain(domain: &str) -> bool {
    let re = regex::Regex::new(r"^(([a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,})$")
        .expect("invalid apex domain regex");
    re.is_match(domain)
}

/// Validate IP address syntax
pub fn is_valid_ip(ip: &str) -> bool {
    ip.parse::<std::net::IpAddr>().is_ok()
}

/// Parse a resolver string (bare IP, defaulted to port 53)
pub fn parse_resolver(addr: &str) -> Result<String, crate::error::EsdError> {
    if is_valid_ip(addr) {
        Ok(format!("{addr}:53"))
    } else {
        let parts: Vec<&str> = addr.split(':').collect();
        if parts.len() == 2 && is_valid_ip(parts[0]) && parts[1].parse::<u16>().is_ok() {
            Ok(addr.to_string())
        } else {
            Err(crate::error::EsdError::invalid_input(format!(
                "invalid resolver address: {addr}"
            )))
        }
    }
}
