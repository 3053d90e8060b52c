//! DNS resolver pool implementation

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::TokioAsyncResolver;
use tokio::sync::Semaphore;
use tracing::{debug, info, trace};

use crate::error::{EsdError, Result};
use crate::utils::parse_resolver;

/// Outcome of a single A-record query, classified per spec.md §4.2 / §7.
///
/// The scheduler's classifier uses this to decide log level without needing
/// to know anything about `hickory_resolver`'s internal error types.
#[derive(Debug)]
pub enum QueryOutcome {
    /// Resolution succeeded with at least a conceptual answer (may be empty).
    Resolved(Vec<Ipv4Addr>),
    /// Expected-silent failure: no-data, NXDOMAIN, unreachable, or timeout.
    Silent,
    /// A DNS error code outside the expected-silent set - logged at INFO.
    Unexpected(String),
}

/// A pool of per-server resolvers bound to `servers.esd`, guarded by a
/// semaphore that enforces the caller's in-flight cap.
pub struct ResolverPool {
    resolvers: Vec<TokioAsyncResolver>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl ResolverPool {
    /// Build a pool with one resolver per server address, capped at
    /// `concurrency` in-flight queries.
    pub fn new(servers: &[String], timeout: Duration, concurrency: usize) -> Result<Self> {
        if servers.is_empty() {
            return Err(EsdError::config("at least one DNS server is required"));
        }

        let mut resolvers = Vec::with_capacity(servers.len());
        for server in servers {
            resolvers.push(single_server_resolver(server, timeout)?);
        }

        Ok(Self {
            resolvers,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            timeout,
        })
    }

    /// Bind a pool to exactly one server (used when the oracle probes each
    /// server individually, spec.md §4.3 step 2).
    pub fn for_single_server(server: &str, timeout: Duration) -> Result<Self> {
        Self::new(std::slice::from_ref(&server.to_string()), timeout, 1)
    }

    /// Query `fqdn` for A records, round-robining across the pool's
    /// resolvers. Every call, success or failure, is meant to be followed by
    /// the caller decrementing its remainder counter (spec.md §4.2
    /// post-condition) - the pool itself doesn't own that counter.
    pub async fn query_a(&self, fqdn: &str) -> QueryOutcome {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => return QueryOutcome::Unexpected("semaphore closed".to_string()),
        };

        let resolver = &self.resolvers[fastrand_index(self.resolvers.len())];
        let lookup = tokio::time::timeout(self.timeout, resolver.lookup_ip(fqdn)).await;

        match lookup {
            Ok(Ok(response)) => {
                let ips: Vec<Ipv4Addr> = response
                    .iter()
                    .filter_map(|ip| match ip {
                        std::net::IpAddr::V4(v4) => Some(v4),
                        std::net::IpAddr::V6(_) => None,
                    })
                    .collect();
                trace!("resolved {} -> {:?}", fqdn, ips);
                QueryOutcome::Resolved(ips)
            }
            Ok(Err(e)) => classify_resolve_error(fqdn, e),
            Err(_) => {
                debug!("query timeout for {}", fqdn);
                QueryOutcome::Silent
            }
        }
    }
}

/// Classify a `hickory_resolver` error per the expected-silent / unexpected
/// split of spec.md §4.2 and §7.
fn classify_resolve_error(fqdn: &str, e: hickory_resolver::error::ResolveError) -> QueryOutcome {
    use hickory_resolver::proto::op::ResponseCode;

    match e.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match response_code {
            ResponseCode::NoError | ResponseCode::NXDomain => QueryOutcome::Silent,
            other => {
                info!("unexpected response code for {}: {:?}", fqdn, other);
                QueryOutcome::Unexpected(format!("{other:?}"))
            }
        },
        ResolveErrorKind::Timeout => QueryOutcome::Silent,
        ResolveErrorKind::NoConnections => QueryOutcome::Silent,
        ResolveErrorKind::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::TimedOut
                || io_err.kind() == std::io::ErrorKind::ConnectionRefused
                || io_err.kind() == std::io::ErrorKind::NetworkUnreachable
            {
                QueryOutcome::Silent
            } else {
                QueryOutcome::Unexpected(io_err.to_string())
            }
        }
        other => {
            info!("unexpected DNS error for {}: {:?}", fqdn, other);
            QueryOutcome::Unexpected(e.to_string())
        }
    }
}

fn single_server_resolver(server: &str, timeout: Duration) -> Result<TokioAsyncResolver> {
    multi_server_resolver(std::slice::from_ref(&server.to_string()), timeout)
}

/// Build one hickory resolver configured with every server in `servers`,
/// used to back the RSC HTTP client (spec.md §4.5 step 1: "bound to a
/// resolver over the configured DNS servers") instead of system DNS.
pub fn multi_server_resolver(servers: &[String], timeout: Duration) -> Result<TokioAsyncResolver> {
    if servers.is_empty() {
        return Err(EsdError::config("at least one DNS server is required"));
    }

    let mut name_servers = NameServerConfigGroup::new();
    for server in servers {
        let addr = parse_resolver(server)?;
        let socket_addr: std::net::SocketAddr = addr
            .parse()
            .map_err(|e| EsdError::invalid_input(format!("invalid resolver address {addr}: {e}")))?;
        name_servers.push(NameServerConfig {
            socket_addr,
            protocol: Protocol::Udp,
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });
    }

    let mut config = ResolverConfig::new();
    config.add_name_server_config(name_servers);

    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = 1;
    opts.validate = false;

    Ok(TokioAsyncResolver::tokio(config, opts))
}

fn fastrand_index(len: usize) -> usize {
    use rand::Rng;
    if len <= 1 {
        0
    } else {
        rand::thread_rng().gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_server_list_is_rejected() {
        let err = ResolverPool::new(&[], Duration::from_secs(1), 10).unwrap_err();
        assert!(matches!(err, EsdError::Config(_)));
    }

    #[test]
    fn fastrand_index_stays_in_bounds() {
        for _ in 0..50 {
            assert!(fastrand_index(5) < 5);
        }
        assert_eq!(fastrand_index(1), 0);
    }
}
