use crate::config::ProxyConfig;
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Immutable pool of proxies loaded once at startup.
///
/// Selection is uniform-random with replacement -- no affinity, no health
/// tracking, no back-off on recently failed proxies.
pub struct ProxyManager {
    proxies: Vec<ProxyConfig>,
}

impl ProxyManager {
    /// Loads proxies from the given file.
    /// Format expected: independent lines of host:port or host:port:login:password.
    /// A missing file is replaced with a commented sample and yields an empty pool.
    pub fn load(path: &str) -> Result<Self> {
        let file = Path::new(path);
        if !file.exists() {
            warn!("{} not found. Writing a sample file and running without proxies.", path);
            fs::write(file, "# Format: host:port:login:password\n127.0.0.1:8080:user:pass\n")
                .with_context(|| format!("Failed to write sample proxy file {}", path))?;
            return Ok(Self { proxies: Vec::new() });
        }

        let content =
            fs::read_to_string(file).with_context(|| format!("Failed to read {}", path))?;
        let mut proxies = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_proxy_line(line) {
                Some(proxy) => proxies.push(proxy),
                None => warn!("Skipping invalid proxy line: {}", line),
            }
        }

        if proxies.is_empty() {
            warn!("Proxy file {} contains no usable proxies", path);
        } else {
            info!("Loaded {} proxies from {}", proxies.len(), path);
        }

        Ok(Self { proxies })
    }

    pub fn from_proxies(proxies: Vec<ProxyConfig>) -> Self {
        Self { proxies }
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Picks one proxy uniformly at random, `None` when the pool is empty.
    pub fn select(&self) -> Option<&ProxyConfig> {
        self.proxies.choose(&mut rand::thread_rng())
    }

    /// Builds the reqwest proxy handle for one descriptor.
    pub fn build_proxy(config: &ProxyConfig) -> Result<reqwest::Proxy> {
        let mut proxy = reqwest::Proxy::all(config.url())
            .with_context(|| format!("Invalid proxy URL {}", config.url()))?;
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            proxy = proxy.basic_auth(user, pass);
        }
        Ok(proxy)
    }
}

/// Parses one proxy line. Only the first three `:` are structural; anything
/// after the third is part of the password.
pub fn parse_proxy_line(line: &str) -> Option<ProxyConfig> {
    let mut parts = line.splitn(4, ':');

    let host = parts.next()?.trim();
    let port = parts.next()?.trim().parse::<u16>().ok()?;
    if host.is_empty() {
        return None;
    }

    let (username, password) = match (parts.next(), parts.next()) {
        (Some(login), Some(rest)) => (Some(login.to_string()), Some(rest.to_string())),
        // A trailing login without a password is not a usable credential pair.
        (Some(_), None) => return None,
        _ => (None, None),
    };

    Some(ProxyConfig {
        host: host.to_string(),
        port,
        username,
        password,
    })
}
