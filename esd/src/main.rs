//! ESD CLI - subdomain enumeration via DNS bruteforce + response similarity

use anyhow::Result;
use clap::Parser;

mod cli;
mod config;

use cli::Cli;
use esd_core::enumeration::Enumerator;
use esd_core::input::read_target_domains;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = esd_core::logging::init(&cli.log_dir, "ESD.log")?;

    let options = config::options_from_cli(&cli);
    let domains = read_target_domains(&cli.target);

    if domains.is_empty() {
        tracing::error!("no valid target domains in {:?}", cli.target);
        return Ok(());
    }

    let enumerator = Enumerator::new(options);
    for domain in domains {
        let run = enumerator.run(&domain, &cli.servers, &cli.dictionary);
        tokio::select! {
            result = run => match result {
                Ok(report) => {
                    tracing::info!(
                        "{}: {} / {} candidates admitted (wildcard={}) in {:?}",
                        report.domain,
                        report.admitted,
                        report.candidates_total,
                        report.wildcard,
                        report.elapsed
                    );
                }
                Err(e) => {
                    tracing::error!("enumeration failed for {}: {}", domain, e);
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, exiting");
                return Ok(());
            }
        }
    }

    Ok(())
}
