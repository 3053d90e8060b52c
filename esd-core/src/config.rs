//! Runtime options and defaults for an enumeration run

use std::time::Duration;

/// Default DNS server used when `servers.esd` is present but empty
pub const DEFAULT_STABLE_RESOLVERS: &[&str] = &["114.114.114.114"];

/// Default DNS query timeout
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// Default in-flight cap for the DNS fan-out phase
pub const DEFAULT_CONCURRENCY_DNS: usize = 100_000;

/// Default in-flight cap for the RSC HTTP phase
pub const DEFAULT_CONCURRENCY_REQUEST: usize = 100;

/// Default overall timeout for an RSC HTTP probe
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default similarity admission threshold
pub const DEFAULT_RSC_RATIO: f64 = 0.8;

/// Directory results are written to, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "data";

/// Directory the rotating log file lives in
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Options controlling a single enumeration run
#[derive(Debug, Clone)]
pub struct EsdOptions {
    /// DNS servers loaded from `servers.esd`, already shuffled
    pub dns_servers: Vec<String>,
    /// Subset of `dns_servers` trusted for oracle confirmation / fallback
    pub stable_dns_servers: Vec<String>,
    /// DNS query timeout
    pub dns_timeout: Duration,
    /// In-flight cap for the DNS fan-out phase
    pub concurrency_dns: usize,
    /// In-flight cap for the RSC HTTP phase
    pub concurrency_request: usize,
    /// Overall timeout for a single RSC HTTP probe
    pub http_timeout: Duration,
    /// Similarity ratio above which an RSC candidate is rejected
    pub rsc_ratio: f64,
    /// Output directory for the `.esd` result files
    pub output_dir: String,
}

impl Default for EsdOptions {
    fn default() -> Self {
        let stable: Vec<String> = DEFAULT_STABLE_RESOLVERS.iter().map(|s| s.to_string()).collect();
        Self {
            dns_servers: stable.clone(),
            stable_dns_servers: stable,
            dns_timeout: DEFAULT_DNS_TIMEOUT,
            concurrency_dns: DEFAULT_CONCURRENCY_DNS,
            concurrency_request: DEFAULT_CONCURRENCY_REQUEST,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            rsc_ratio: DEFAULT_RSC_RATIO,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}
