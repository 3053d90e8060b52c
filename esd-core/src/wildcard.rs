//! Wildcard DNS oracle (spec.md §4.3)

use std::net::Ipv4Addr;
use std::time::Duration;

use rand::Rng;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::EsdOptions;
use crate::resolver::{QueryOutcome, ResolverPool};
use crate::rsc::request_headers;
use crate::utils::sort_ips_lexicographic;

/// Result of probing `D` with a guaranteed-nonexistent label, before fan-out.
#[derive(Debug, Clone, Default)]
pub struct WildcardBaseline {
    pub is_wildcard: bool,
    pub wildcard_ips: Vec<Ipv4Addr>,
    pub wildcard_html: Option<String>,
    pub wildcard_html_len: usize,
    /// Whether the stable-vs-full server lists disagreed (informational).
    pub servers_disagreed: bool,
}

/// Run the wildcard oracle against `domain` using the resolvers in `options`.
///
/// Must run to completion before DNS fan-out begins (spec.md §9, "Wildcard
/// oracle sequentiality") - the scheduler's classifier depends on a stable
/// baseline.
pub async fn detect_wildcard(domain: &str, options: &EsdOptions) -> WildcardBaseline {
    let probe_label = format!("feei-esd-{}", rand::thread_rng().gen_range(0..9999));
    let probe_fqdn = format!("{probe_label}.{domain}");

    let mut per_server_results: Vec<(String, Option<Vec<Ipv4Addr>>)> =
        Vec::with_capacity(options.dns_servers.len());

    for server in &options.dns_servers {
        let pool = match ResolverPool::for_single_server(server, options.dns_timeout) {
            Ok(pool) => pool,
            Err(e) => {
                warn!("could not bind oracle resolver to {}: {}", server, e);
                per_server_results.push((server.clone(), None));
                continue;
            }
        };

        let result = match pool.query_a(&probe_fqdn).await {
            QueryOutcome::Resolved(mut ips) if !ips.is_empty() => {
                sort_ips_lexicographic(&mut ips);
                Some(ips)
            }
            _ => None,
        };

        info!("{} {} {:?}", server, probe_fqdn, result);
        per_server_results.push((server.clone(), result));
    }

    let (is_wildcard, servers_disagreed, wildcard_ips) =
        summarize_oracle_results(&per_server_results, &options.stable_dns_servers);

    let mut baseline = WildcardBaseline {
        is_wildcard,
        servers_disagreed,
        ..Default::default()
    };

    if servers_disagreed {
        info!("DNS servers disagree on the wildcard probe; falling back to the stable subset");
    }

    if is_wildcard {
        baseline.wildcard_ips = wildcard_ips;
        info!("wildcard IPs: {:?}", baseline.wildcard_ips);

        match fetch_wildcard_html(&probe_fqdn, options.http_timeout).await {
            Ok(html) => {
                baseline.wildcard_html_len = html.len();
                baseline.wildcard_html = Some(html);
            }
            Err(e) => {
                warn!("failed to fetch wildcard response body, RSC disabled: {}", e);
            }
        }
    } else {
        info!("{} is not a wildcard domain", domain);
    }

    baseline
}

/// Pure decision logic over the oracle's per-server probe results (spec.md
/// §4.3 steps 3-6), kept separate from `detect_wildcard`'s network I/O so
/// it can be tested without a live resolver.
///
/// Returns `(is_wildcard, servers_disagreed, wildcard_ips)`. `wildcard_ips`
/// prefers the last stable-subset server that answered, falling back to the
/// first server to answer at all - same bias as `ESD.py`'s `run()`.
pub fn summarize_oracle_results(
    per_server_results: &[(String, Option<Vec<Ipv4Addr>>)],
    stable_dns_servers: &[String],
) -> (bool, bool, Vec<Ipv4Addr>) {
    let all_agree = per_server_results
        .first()
        .map(|(_, first)| per_server_results.iter().all(|(_, r)| r == first))
        .unwrap_or(true);

    let is_wildcard = per_server_results.iter().any(|(_, r)| r.is_some());

    if !is_wildcard {
        return (false, !all_agree, Vec::new());
    }

    let stable_result = per_server_results
        .iter()
        .filter(|(server, _)| stable_dns_servers.contains(server))
        .last()
        .and_then(|(_, r)| r.clone());

    let wildcard_ips = stable_result
        .or_else(|| per_server_results.iter().find_map(|(_, r)| r.clone()))
        .unwrap_or_default();

    (true, !all_agree, wildcard_ips)
}

async fn fetch_wildcard_html(probe_fqdn: &str, timeout: Duration) -> reqwest::Result<String> {
    let client = Client::builder().timeout(timeout).build()?;
    let response = client
        .get(format!("http://{probe_fqdn}/"))
        .headers(request_headers())
        .send()
        .await?;
    response.text().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_defaults_to_non_wildcard() {
        let baseline = WildcardBaseline::default();
        assert!(!baseline.is_wildcard);
        assert!(baseline.wildcard_ips.is_empty());
        assert!(baseline.wildcard_html.is_none());
    }

    #[test]
    fn no_server_answering_is_not_a_wildcard() {
        let results = vec![
            ("8.8.8.8".to_string(), None),
            ("1.1.1.1".to_string(), None),
        ];
        let (is_wildcard, disagreed, ips) = summarize_oracle_results(&results, &["8.8.8.8".to_string()]);
        assert!(!is_wildcard);
        assert!(!disagreed);
        assert!(ips.is_empty());
    }

    #[test]
    fn disagreement_prefers_the_stable_subset_result() {
        // spec.md §8 scenario 5: server A answers, B and C are NXDOMAIN.
        let results = vec![
            ("9.9.9.9".to_string(), Some(vec![Ipv4Addr::new(9, 9, 9, 9)])),
            ("8.8.8.8".to_string(), None),
            ("1.1.1.1".to_string(), None),
        ];
        let (is_wildcard, disagreed, ips) = summarize_oracle_results(&results, &["9.9.9.9".to_string()]);
        assert!(is_wildcard);
        assert!(disagreed);
        assert_eq!(ips, vec![Ipv4Addr::new(9, 9, 9, 9)]);
    }

    #[test]
    fn disagreement_falls_back_to_first_answer_when_no_stable_server_answered() {
        let results = vec![
            ("203.0.113.1".to_string(), Some(vec![Ipv4Addr::new(5, 6, 7, 8)])),
            ("203.0.113.2".to_string(), None),
        ];
        let (is_wildcard, disagreed, ips) = summarize_oracle_results(&results, &["9.9.9.9".to_string()]);
        assert!(is_wildcard);
        assert!(disagreed);
        assert_eq!(ips, vec![Ipv4Addr::new(5, 6, 7, 8)]);
    }

    #[test]
    fn agreement_across_all_servers_is_not_flagged_as_disagreement() {
        let results = vec![
            ("8.8.8.8".to_string(), Some(vec![Ipv4Addr::new(1, 2, 3, 4)])),
            ("1.1.1.1".to_string(), Some(vec![Ipv4Addr::new(1, 2, 3, 4)])),
        ];
        let (is_wildcard, disagreed, ips) = summarize_oracle_results(&results, &[]);
        assert!(is_wildcard);
        assert!(!disagreed);
        assert_eq!(ips, vec![Ipv4Addr::new(1, 2, 3, 4)]);
    }
}
