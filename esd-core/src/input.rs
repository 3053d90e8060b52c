//! Input handling: target domains, the DNS server list, and the dictionary file

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use rand::seq::SliceRandom;
use tracing::error;

use crate::config::DEFAULT_STABLE_RESOLVERS;
use crate::error::{EsdError, Result};
use crate::utils::is_valid_apex_domain;

/// Resolve the CLI's single positional argument into a validated domain list.
///
/// `arg` is either one apex domain, a comma-separated list, or a path to a
/// file containing one domain per line. Invalid lines are logged and
/// skipped, never fatal (spec.md "Input validation" row).
pub fn read_target_domains(arg: &str) -> Vec<String> {
    let raw: Vec<String> = if Path::new(arg).is_file() {
        match std::fs::read_to_string(arg) {
            Ok(contents) => contents.lines().map(|l| l.to_string()).collect(),
            Err(e) => {
                error!("failed to read domain list file {}: {}", arg, e);
                Vec::new()
            }
        }
    } else if arg.contains(',') {
        arg.split(',').map(|s| s.to_string()).collect()
    } else {
        vec![arg.to_string()]
    };

    raw.into_iter()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .filter(|line| {
            if is_valid_apex_domain(line) {
                true
            } else {
                error!("domain validation failed: {}", line);
                false
            }
        })
        .collect()
}

/// Load DNS server addresses from `servers.esd`.
///
/// Missing file is fatal; an empty file falls back to the built-in stable
/// list (spec.md §4.2). The returned list is shuffled once, matching
/// `ESD.py`'s `random.shuffle(dns_servers)` - later stages (e.g. the
/// oracle's first-server fallback) depend on this not being file order.
pub fn read_servers_file(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(EsdError::config(format!(
            "{} not found",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    let mut servers: Vec<String> = contents
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    if servers.is_empty() {
        servers = DEFAULT_STABLE_RESOLVERS.iter().map(|s| s.to_string()).collect();
    }

    servers.shuffle(&mut rand::thread_rng());
    Ok(servers)
}

/// Read the raw (unexpanded) template lines from `subs.esd`, skipping blank
/// lines and lines containing `#`.
pub fn read_template_file(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .map_err(|e| EsdError::config(format!("failed to open {}: {}", path.display(), e)))?;

    let mut templates = Vec::new();
    for line in io::BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim().to_lowercase();
        if line.is_empty() || line.contains('#') {
            continue;
        }
        templates.push(line);
    }
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn validates_and_lowercases_comma_separated_domains() {
        let domains = read_target_domains("Example.COM,invalid,feei.cn");
        assert_eq!(domains, vec!["example.com".to_string(), "feei.cn".to_string()]);
    }

    #[test]
    fn reads_domains_from_file() {
        let mut file = tempfile_for_test("one.test\nbad\ntwo.test\n");
        let domains = read_target_domains(file.path_str());
        assert_eq!(domains, vec!["one.test".to_string(), "two.test".to_string()]);
        file.cleanup();
    }

    #[test]
    fn missing_servers_file_is_fatal() {
        let err = read_servers_file(Path::new("/nonexistent/servers.esd")).unwrap_err();
        assert!(matches!(err, EsdError::Config(_)));
    }

    #[test]
    fn empty_servers_file_falls_back_to_stable_default() {
        let mut file = tempfile_for_test("");
        let servers = read_servers_file(Path::new(file.path_str())).unwrap();
        assert_eq!(servers, vec!["114.114.114.114".to_string()]);
        file.cleanup();
    }

    #[test]
    fn template_file_skips_blank_and_comment_lines() {
        let mut file = tempfile_for_test("www\n\n# a comment\nmail # trailing\n{letter}\n");
        let templates = read_template_file(Path::new(file.path_str())).unwrap();
        assert_eq!(templates, vec!["www".to_string(), "{letter}".to_string()]);
        file.cleanup();
    }

    // Minimal self-contained temp file helper (no tempfile dependency needed
    // for this module's narrow test surface).
    struct TestFile {
        path: std::path::PathBuf,
    }

    impl TestFile {
        fn path_str(&self) -> &str {
            self.path.to_str().unwrap()
        }

        fn cleanup(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    fn tempfile_for_test(contents: &str) -> TestFile {
        let mut path = std::env::temp_dir();
        let unique = format!(
            "esd-input-test-{:?}-{}",
            std::thread::current().id(),
            contents.len()
        );
        path.push(unique);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        TestFile { path }
    }
}
