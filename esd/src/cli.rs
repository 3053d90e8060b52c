//! CLI argument parsing

use std::path::PathBuf;

use clap::Parser;

/// Subdomain enumerator: DNS bruteforce with wildcard detection and
/// response-similarity classification.
#[derive(Parser)]
#[command(name = "esd")]
#[command(about = "Enumerate subdomains via DNS bruteforce and response similarity", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Target: an apex domain, a comma-separated list, or a path to a file
    /// containing one domain per line.
    pub target: String,

    /// DNS servers file (one `ip` or `ip:port` per line)
    #[arg(short, long, default_value = "servers.esd")]
    pub servers: PathBuf,

    /// Subdomain dictionary / template file
    #[arg(short, long, default_value = "subs.esd")]
    pub dictionary: PathBuf,

    /// Output directory for `.esd` result files
    #[arg(short, long, default_value = "data")]
    pub output_dir: String,

    /// Log directory for the rotating `ESD.log` file
    #[arg(long, default_value = "logs")]
    pub log_dir: String,

    /// In-flight cap for the DNS fan-out phase
    #[arg(long)]
    pub concurrency_dns: Option<usize>,

    /// In-flight cap for the RSC HTTP phase
    #[arg(long)]
    pub concurrency_request: Option<usize>,

    /// DNS query timeout in seconds
    #[arg(long)]
    pub dns_timeout: Option<u64>,

    /// RSC HTTP probe timeout in seconds
    #[arg(long)]
    pub http_timeout: Option<u64>,

    /// Similarity ratio above which an RSC candidate is rejected
    #[arg(long)]
    pub rsc_ratio: Option<f64>,
}
