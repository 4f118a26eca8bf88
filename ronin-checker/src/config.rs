use anyhow::Result;
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Runtime configuration. Every field has a working default; `config.toml`
/// is optional and only overrides what it names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// File with one address or private key per line.
    pub addresses_file: String,
    /// File with one proxy per line (host:port or host:port:login:password).
    pub proxies_file: String,
    /// Number of concurrent workers.
    pub concurrency: usize,
    pub api: ApiEndpoints,
    /// Ronin chain id.
    pub chain_id: u64,
    /// Axie NFT collection contract.
    pub axie_collection_address: String,
    pub explorer_base_url: String,
    pub logs_dir: String,
    pub results_dir: String,
    pub request_timeout_secs: u64,
    /// Minimum age before the price cache is refreshed again.
    pub price_ttl_secs: u64,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    pub nft_collections: String,
    pub token_balance: String,
    pub token_prices: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            nft_collections:
                "https://wallet-manager.skymavis.com/proxy/v3/public/portfolio/balance/nft-collections"
                    .to_string(),
            token_balance:
                "https://wallet-manager.skymavis.com/proxy/v3/public/portfolio/balance".to_string(),
            token_prices:
                "https://wallet-manager.skymavis.com/proxy/v3/public/fiat/tokens".to_string(),
        }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            addresses_file: "addresses.txt".to_string(),
            proxies_file: "proxies.txt".to_string(),
            concurrency: 100,
            api: ApiEndpoints::default(),
            chain_id: 2020,
            axie_collection_address: "0x32950db2a7164ae833121501c797d79e7b79d74c".to_string(),
            explorer_base_url: "https://app.roninchain.com/address".to_string(),
            logs_dir: "logs".to_string(),
            results_dir: "results".to_string(),
            request_timeout_secs: 30,
            price_ttl_secs: 60,
            max_attempts: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl CheckerConfig {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }

        let settings = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))
    }
}
