//! Top-level enumeration driver (spec.md §5)

use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::config::EsdOptions;
use crate::dictionary::{expand_dictionary, APEX_SENTINEL};
use crate::error::Result;
use crate::input::{read_servers_file, read_template_file};
use crate::resolver::{QueryOutcome, ResolverPool};
use crate::rsc;
use crate::scheduler::{run_bounded, Remainder};
use crate::store::{ResultStore, Writer};
use crate::utils::sort_ips_lexicographic;
use crate::wildcard::{detect_wildcard, WildcardBaseline};

/// Summary of one domain's enumeration run, for the CLI to report.
#[derive(Debug)]
pub struct EnumerationReport {
    pub domain: String,
    pub candidates_total: usize,
    pub admitted: usize,
    pub wildcard: bool,
    pub elapsed: std::time::Duration,
}

/// Drives a single apex domain through the full pipeline: load inputs,
/// run the wildcard oracle, fan out DNS queries, optionally fan out RSC
/// probes, then write results (spec.md §5 steps 1-7).
pub struct Enumerator {
    options: EsdOptions,
}

impl Enumerator {
    pub fn new(options: EsdOptions) -> Self {
        Self { options }
    }

    pub async fn run(
        &self,
        domain: &str,
        servers_path: &Path,
        dictionary_path: &Path,
    ) -> Result<EnumerationReport> {
        let start = Instant::now();

        let mut options = self.options.clone();
        options.dns_servers = read_servers_file(servers_path)?;
        if options.stable_dns_servers.is_empty() {
            options.stable_dns_servers = options.dns_servers.clone();
        }

        let templates = read_template_file(dictionary_path)?;
        let candidates = expand_dictionary(templates);
        info!("{} candidate subdomains for {}", candidates.len(), domain);

        let baseline = detect_wildcard(domain, &options).await;
        let store = ResultStore::new();

        // spec.md §4.3 step 5: if the oracle's servers disagreed on the
        // probe, the working resolver is rebound to the stable subset only
        // for the rest of the run; otherwise the full shuffled list stands.
        let fanout_servers = if baseline.servers_disagreed {
            info!("DNS servers disagreed on the wildcard probe; rebinding to the stable subset for fan-out");
            &options.stable_dns_servers
        } else {
            &options.dns_servers
        };

        let remainder = Remainder::new(candidates.len());
        let pool = ResolverPool::new(fanout_servers, options.dns_timeout, options.concurrency_dns)?;

        self.dns_phase(domain, &candidates, &pool, &baseline, &store, &remainder)
            .await;

        if baseline.is_wildcard {
            if let Some(html) = &baseline.wildcard_html {
                // spec.md §4.5: the RSC candidate set is every candidate whose
                // FQDN never made it into result_store - both the explicitly
                // rejected wildcard-matchers and the ones that resolved to
                // nothing at all.
                let rsc_candidates: Vec<String> = candidates
                    .iter()
                    .map(|candidate| {
                        if candidate == APEX_SENTINEL {
                            domain.to_string()
                        } else {
                            format!("{candidate}.{domain}")
                        }
                    })
                    .filter(|fqdn| !store.contains(fqdn))
                    .collect();

                self.rsc_phase(&rsc_candidates, &baseline, html, baseline.wildcard_html_len, &options, &store)
                    .await?;
            } else {
                info!("wildcard detected but no baseline body fetched; RSC phase skipped");
            }
        }

        let writer = Writer::new(options.output_dir.clone());
        writer.write(domain, &store)?;

        Ok(EnumerationReport {
            domain: domain.to_string(),
            candidates_total: candidates.len(),
            admitted: store.len(),
            wildcard: baseline.is_wildcard,
            elapsed: start.elapsed(),
        })
    }

    /// Resolve every candidate. Non-wildcard domains admit on any resolved
    /// answer directly; wildcard domains defer candidates whose answer
    /// matches the wildcard IP set to the RSC phase (spec.md §4.4 step 3-5).
    async fn dns_phase(
        &self,
        domain: &str,
        candidates: &std::collections::HashSet<String>,
        pool: &ResolverPool,
        baseline: &WildcardBaseline,
        store: &ResultStore,
        remainder: &Remainder,
    ) {
        let tasks = candidates.iter().map(|candidate| {
            let fqdn = if candidate == APEX_SENTINEL {
                domain.to_string()
            } else {
                format!("{candidate}.{domain}")
            };
            async move {
                let outcome = pool.query_a(&fqdn).await;
                (fqdn, outcome)
            }
        });

        let results = run_bounded(tasks, self.options.concurrency_dns).await;
        for (fqdn, outcome) in results {
            remainder.decrement();
            if let QueryOutcome::Resolved(ips) = outcome {
                if let Some(admitted) = classify_resolved(ips, baseline.is_wildcard, &baseline.wildcard_ips) {
                    store.insert(fqdn, admitted);
                }
            }
        }

        info!("DNS phase done, {} remainder {}", candidates.len(), remainder.get());
    }

    /// Probe every candidate that resolved to the wildcard IP set, or to
    /// nothing at all, over HTTP, admitting those whose body differs enough
    /// from the catch-all page (spec.md §4.5).
    async fn rsc_phase(
        &self,
        candidates: &[String],
        baseline: &WildcardBaseline,
        wildcard_html: &str,
        wildcard_html_len: usize,
        options: &EsdOptions,
        store: &ResultStore,
    ) -> Result<()> {
        if candidates.is_empty() {
            return Ok(());
        }

        let client = rsc::build_client(options.http_timeout, &options.dns_servers, options.dns_timeout)?;

        let remainder = Remainder::new(candidates.len());
        let tasks = candidates.iter().map(|fqdn| {
            let client = &client;
            let fqdn = fqdn.clone();
            async move {
                let outcome = rsc::probe(client, &fqdn, wildcard_html, wildcard_html_len, options.rsc_ratio).await;
                (fqdn, outcome)
            }
        });

        let results = run_bounded(tasks, options.concurrency_request).await;
        for (fqdn, outcome) in results {
            remainder.decrement();
            if let Some(rsc::ProbeOutcome::Admit { .. }) = outcome {
                store.insert(fqdn, baseline.wildcard_ips.clone());
            }
        }

        info!("RSC phase done, {} candidates probed", candidates.len());
        Ok(())
    }
}

/// Pure DNS-phase admission decision (spec.md §4.4 classifier), kept
/// separate from `Enumerator::dns_phase`'s I/O so it can be tested without
/// a live resolver. Returns `Some(sorted_ips)` to admit directly into the
/// store, or `None` when the candidate resolved to nothing or to the
/// wildcard baseline's IP set.
pub fn classify_resolved(
    ips: Vec<std::net::Ipv4Addr>,
    is_wildcard: bool,
    wildcard_ips: &[std::net::Ipv4Addr],
) -> Option<Vec<std::net::Ipv4Addr>> {
    if ips.is_empty() {
        return None;
    }
    let mut sorted = ips;
    sort_ips_lexicographic(&mut sorted);
    if is_wildcard && sorted == wildcard_ips {
        None
    } else {
        Some(sorted)
    }
}
