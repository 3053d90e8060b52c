//! Response-Similarity Classifier HTTP prober (spec.md §4.5)

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;
use reqwest::dns::{Addrs, Resolve, Resolving};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use tracing::debug;

use crate::similarity::real_quick_ratio;

/// Outcome of probing one RSC candidate.
#[derive(Debug, PartialEq)]
pub enum ProbeOutcome {
    /// Body was sufficiently dissimilar from the wildcard catch-all; admit
    /// with the wildcard IP set (spec.md §4.5 step 4).
    Admit { ratio: f64, body: String },
    /// Body was too similar to the catch-all page.
    Reject { ratio: f64 },
}

/// The fixed browser-like headers spec.md §6 requires, shared by the oracle's
/// synchronous probe and every RSC candidate fetch.
pub fn request_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));
    headers.insert("Pragma", HeaderValue::from_static("no-cache"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers.insert(
        "User-Agent",
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/64.0.3282.186 Safari/537.36",
        ),
    );
    headers.insert(
        "Accept",
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Referer", HeaderValue::from_static("http://www.baidu.com/robot"));
    headers.insert("Accept-Encoding", HeaderValue::from_static("gzip, deflate"));
    headers.insert("Accept-Language", HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));
    headers
}

/// Fetch `http://sub.D/` and classify it against the wildcard baseline body.
///
/// Any fault (timeout, TCP failure, decode error) is swallowed per spec.md
/// §4.5 step 2 - the candidate is simply dropped, logged at debug level only.
pub async fn probe(
    client: &Client,
    fqdn: &str,
    wildcard_html: &str,
    wildcard_html_len: usize,
    rsc_ratio: f64,
) -> Option<ProbeOutcome> {
    let url = format!("http://{fqdn}/");
    let response = match client.get(&url).headers(request_headers()).send().await {
        Ok(resp) => resp,
        Err(e) => {
            debug!("RSC fetch failed for {}: {}", fqdn, e);
            return None;
        }
    };

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!("RSC body decode failed for {}: {}", fqdn, e);
            return None;
        }
    };

    let ratio = if body.len() == wildcard_html_len {
        1.0
    } else {
        real_quick_ratio(&body, wildcard_html)
    };

    if ratio > rsc_ratio {
        debug!("RSC ratio {} (rejected) {}", ratio, fqdn);
        Some(ProbeOutcome::Reject { ratio })
    } else {
        debug!("RSC ratio {} (admitted) {}", ratio, fqdn);
        Some(ProbeOutcome::Admit { ratio, body })
    }
}

/// Adapts a `hickory_resolver` instance to `reqwest`'s `Resolve` trait, so
/// the RSC HTTP client resolves hostnames through the configured DNS
/// servers instead of system DNS (spec.md §4.5 step 1).
struct HickoryDnsResolver(Arc<TokioAsyncResolver>);

impl Resolve for HickoryDnsResolver {
    fn resolve(&self, name: reqwest::dns::Name) -> Resolving {
        let resolver = self.0.clone();
        let host = name.as_str().to_string();
        Box::pin(async move {
            let lookup = resolver.lookup_ip(host.as_str()).await?;
            let addrs: Vec<SocketAddr> = lookup
                .into_iter()
                .map(|ip| SocketAddr::new(ip, 0))
                .collect();
            let iter: Addrs = Box::new(addrs.into_iter());
            Ok(iter)
        }) as Pin<Box<_>>
    }
}

/// Build the shared HTTP client the RSC phase hands to every probe, bound
/// to `dns_servers` rather than the system resolver.
pub fn build_client(timeout: Duration, dns_servers: &[String], dns_timeout: Duration) -> crate::error::Result<Client> {
    let resolver = crate::resolver::multi_server_resolver(dns_servers, dns_timeout)?;
    Client::builder()
        .timeout(timeout)
        .dns_resolver(Arc::new(HickoryDnsResolver(Arc::new(resolver))))
        .build()
        .map_err(|e| crate::error::EsdError::resolve(e.to_string()))
}
