//! Result accumulation and output file writing (spec.md §6)

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use chrono::Local;
use dashmap::DashMap;
use tracing::info;

use crate::error::Result;

/// Concurrent map of admitted FQDN -> resolved IPs, filled in by both the
/// DNS fan-out phase and the RSC phase.
#[derive(Default)]
pub struct ResultStore {
    entries: DashMap<String, Vec<Ipv4Addr>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, fqdn: String, ips: Vec<Ipv4Addr>) {
        self.entries.insert(fqdn, ips);
    }

    pub fn contains(&self, fqdn: &str) -> bool {
        self.entries.contains_key(fqdn)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot sorted by FQDN, for writing or inspection.
    pub fn snapshot(&self) -> Vec<(String, Vec<Ipv4Addr>)> {
        let mut rows: Vec<(String, Vec<Ipv4Addr>)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }
}

/// Writes the two `.esd` output files spec.md §6 describes: a stable path
/// that's overwritten on each run and a timestamped snapshot alongside it.
pub struct Writer {
    output_dir: PathBuf,
}

impl Writer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write `<D>.esd` and `<D>_YYYY-MM_DD_HH-MM.esd` for `domain`, each line
    /// padded so the IP column lines up under the longest FQDN.
    pub fn write(&self, domain: &str, store: &ResultStore) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;

        let rows = store.snapshot();
        let body = render(&rows);

        let stable_path = self.output_dir.join(format!("{domain}.esd"));
        std::fs::write(&stable_path, &body)?;

        let timestamp = Local::now().format("%Y-%m_%d_%H-%M");
        let timestamped_path = self.output_dir.join(format!("{domain}_{timestamp}.esd"));
        std::fs::write(&timestamped_path, &body)?;

        info!(
            "wrote {} admitted subdomains to {} and {}",
            rows.len(),
            stable_path.display(),
            timestamped_path.display()
        );
        Ok(())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn render(rows: &[(String, Vec<Ipv4Addr>)]) -> String {
    let width = rows.iter().map(|(fqdn, _)| fqdn.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (fqdn, ips) in rows {
        let ip_list = ips
            .iter()
            .map(|ip| ip.to_string())
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&format!("{fqdn:<width$}  {ip_list}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_rendered_sorted_and_padded() {
        let rows = vec![
            ("zeta.example.com".to_string(), vec![Ipv4Addr::new(1, 2, 3, 4)]),
            ("a.example.com".to_string(), vec![Ipv4Addr::new(5, 6, 7, 8)]),
        ];
        let rendered = render(&rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].starts_with("zeta.example.com"));
        assert!(lines[1].starts_with("a.example.com"));
    }

    #[test]
    fn store_dedups_by_fqdn_and_sorts_snapshot() {
        let store = ResultStore::new();
        store.insert("b.example.com".to_string(), vec![]);
        store.insert("a.example.com".to_string(), vec![]);
        store.insert("a.example.com".to_string(), vec![Ipv4Addr::new(1, 1, 1, 1)]);

        let rows = store.snapshot();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "a.example.com");
        assert_eq!(rows[0].1, vec![Ipv4Addr::new(1, 1, 1, 1)]);
    }
}
