//! Translate CLI arguments into `esd_core::EsdOptions`

use std::time::Duration;

use esd_core::EsdOptions;

use crate::cli::Cli;

pub fn options_from_cli(cli: &Cli) -> EsdOptions {
    let mut options = EsdOptions {
        output_dir: cli.output_dir.clone(),
        ..EsdOptions::default()
    };

    if let Some(cap) = cli.concurrency_dns {
        options.concurrency_dns = cap;
    }
    if let Some(cap) = cli.concurrency_request {
        options.concurrency_request = cap;
    }
    if let Some(secs) = cli.dns_timeout {
        options.dns_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.http_timeout {
        options.http_timeout = Duration::from_secs(secs);
    }
    if let Some(ratio) = cli.rsc_ratio {
        options.rsc_ratio = ratio;
    }

    options
}
