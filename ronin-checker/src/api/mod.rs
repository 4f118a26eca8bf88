use crate::config::CheckerConfig;
use crate::models::{NftCollection, TokenBalance, TokenPrice};
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{
    is_proxy_error, with_retry, ApiError, ConfigError, MetricsCollector, ProxyManager, RetryConfig,
};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::error;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// The three wallet-data operations the checker needs. `ApiClient` is the
/// production implementation; tests substitute canned fakes.
#[async_trait]
pub trait WalletApi: Send + Sync {
    async fn token_balances(&self, address: &str) -> Result<Vec<TokenBalance>>;
    async fn token_prices(&self, tokens: &[TokenRef]) -> Result<Vec<TokenPrice>>;
    async fn nft_collections(&self, address: &str) -> Result<Vec<NftCollection>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenRef {
    pub address: String,
    pub chain_id: u64,
}

#[derive(Debug, Serialize)]
struct BalanceRequest {
    addresses: Vec<String>,
    chain_ids: Vec<u64>,
    token_standards: Vec<String>,
    exclude_spams: bool,
    exclude_unverified: bool,
}

#[derive(Debug, Serialize)]
struct NftRequest {
    addresses: Vec<String>,
    chain_ids: Vec<u64>,
    exclude_spams: bool,
}

#[derive(Debug, Serialize)]
struct PriceRequest<'a> {
    tokens: &'a [TokenRef],
}

/// `{ "data": { "items": [...] } }` envelope common to all three endpoints.
/// A missing or oddly-shaped `data` is treated as "no data", not an error.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<ItemPage<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ItemPage<T> {
    #[serde(default)]
    items: Vec<T>,
}

impl<T> Envelope<T> {
    fn into_items(self) -> Vec<T> {
        self.data.map(|page| page.items).unwrap_or_default()
    }
}

/// POSTs JSON to the wallet-data API through a rotating proxy pool.
///
/// Every attempt re-rolls the proxy selection and builds a fresh client, so
/// call-level retries double as proxy failover. There is deliberately no
/// proxy health tracking across calls.
pub struct ApiClient {
    endpoints: crate::config::ApiEndpoints,
    chain_id: u64,
    proxies: Arc<ProxyManager>,
    metrics: Arc<MetricsCollector>,
    timeout: Duration,
    max_attempts: u32,
    retry_base_delay_ms: u64,
}

impl ApiClient {
    pub fn new(
        config: &CheckerConfig,
        proxies: Arc<ProxyManager>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            endpoints: config.api.clone(),
            chain_id: config.chain_id,
            proxies,
            metrics,
            timeout: Duration::from_secs(config.request_timeout_secs),
            max_attempts: config.max_attempts,
            retry_base_delay_ms: config.retry_base_delay_ms,
        }
    }

    /// One logical API operation: up to `max_attempts` proxied attempts with
    /// linear backoff, then `ApiError::Exhausted` carrying the last error.
    async fn execute<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        // An empty pool is a configuration error, not a retryable failure.
        if self.proxies.is_empty() {
            return Err(ConfigError::NoProxies.into());
        }

        let retry = RetryConfig::new(self.max_attempts, self.retry_base_delay_ms);
        match with_retry(retry, endpoint, |_attempt| self.attempt(endpoint, body)).await {
            Ok(value) => Ok(value),
            Err(e) => Err(ApiError::Exhausted {
                attempts: self.max_attempts,
                endpoint: endpoint.to_string(),
                last_error: format!("{:#}", e),
            }
            .into()),
        }
    }

    async fn attempt<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let started = Instant::now();
        let result = self.send(endpoint, body).await;
        self.metrics.record_api_latency(started.elapsed());

        if let Err(e) = &result {
            if matches!(
                e.downcast_ref::<ApiError>(),
                Some(ApiError::ProxyAuthRequired { .. })
            ) {
                error!(
                    "Proxy authentication failed (407) at {}: check proxy login/password",
                    endpoint
                );
            } else if is_proxy_error(e) {
                error!("Proxy error: {:#}. Trying another proxy...", e);
            }
        }

        result
    }

    async fn send<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let proxy_config = self.proxies.select().ok_or(ConfigError::NoProxies)?;
        let proxy = ProxyManager::build_proxy(proxy_config)?;

        let client = Client::builder()
            .proxy(proxy)
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let response = client
            .post(endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify_transport(endpoint, e))?;

        if response.status() == StatusCode::PROXY_AUTHENTICATION_REQUIRED {
            return Err(ApiError::ProxyAuthRequired {
                endpoint: endpoint.to_string(),
            }
            .into());
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status_code: status.as_u16(),
                endpoint: endpoint.to_string(),
            }
            .into());
        }

        response.json::<T>().await.map_err(|e| {
            anyhow::Error::from(ApiError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
        })
    }

    fn classify_transport(&self, endpoint: &str, e: reqwest::Error) -> anyhow::Error {
        if e.is_timeout() {
            ApiError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
                endpoint: endpoint.to_string(),
            }
            .into()
        } else if e.is_connect() {
            // Connections run through the proxy, so connect failures are
            // proxy-layer failures.
            ApiError::ProxyFailure {
                reason: e.to_string(),
            }
            .into()
        } else {
            anyhow::Error::new(e)
        }
    }
}

#[async_trait]
impl WalletApi for ApiClient {
    async fn token_balances(&self, address: &str) -> Result<Vec<TokenBalance>> {
        let body = BalanceRequest {
            addresses: vec![address.to_string()],
            chain_ids: vec![self.chain_id],
            token_standards: vec!["erc20".to_string(), "native".to_string()],
            exclude_spams: true,
            exclude_unverified: true,
        };

        let envelope: Envelope<TokenBalance> =
            self.execute(&self.endpoints.token_balance, &body).await?;
        Ok(envelope.into_items())
    }

    async fn token_prices(&self, tokens: &[TokenRef]) -> Result<Vec<TokenPrice>> {
        let body = PriceRequest { tokens };

        let envelope: Envelope<TokenPrice> =
            self.execute(&self.endpoints.token_prices, &body).await?;
        Ok(envelope.into_items())
    }

    async fn nft_collections(&self, address: &str) -> Result<Vec<NftCollection>> {
        let body = NftRequest {
            addresses: vec![address.to_string()],
            chain_ids: vec![self.chain_id],
            exclude_spams: true,
        };

        let envelope: Envelope<NftCollection> =
            self.execute(&self.endpoints.nft_collections, &body).await?;
        Ok(envelope.into_items())
    }
}
