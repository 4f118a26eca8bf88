use crate::api::{TokenRef, WalletApi};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error};

struct CacheState {
    prices: HashMap<String, Decimal>,
    refreshed_at: Option<Instant>,
}

/// Process-wide USD price cache, refreshed at most once per TTL interval.
///
/// A successful refresh replaces the whole map; a failed one leaves the
/// previous prices and timestamp untouched (stale beats empty). The lock is
/// held across the outbound call so concurrent workers cannot double-fetch
/// or observe a half-replaced map.
pub struct PriceCache {
    state: Mutex<CacheState>,
    ttl: Duration,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState {
                prices: HashMap::new(),
                refreshed_at: None,
            }),
            ttl,
        }
    }

    /// Best-effort refresh for the given tokens; absorbs its own errors.
    pub async fn refresh(&self, api: &dyn WalletApi, tokens: &[TokenRef]) {
        let mut state = self.state.lock().await;

        let fresh = state
            .refreshed_at
            .map(|at| at.elapsed() < self.ttl)
            .unwrap_or(false);
        if fresh && !state.prices.is_empty() {
            return;
        }

        match api.token_prices(tokens).await {
            Ok(prices) => {
                state.prices = prices
                    .into_iter()
                    .map(|p| (p.address.to_lowercase(), p.usd_price))
                    .collect();
                state.refreshed_at = Some(Instant::now());
                debug!("Price cache refreshed with {} tokens", state.prices.len());
            }
            Err(e) => {
                error!("Failed to refresh token prices: {:#}", e);
            }
        }
    }

    /// USD price for a token, `0` when unknown. Case-insensitive.
    pub async fn price_of(&self, token_address: &str) -> Decimal {
        let state = self.state.lock().await;
        state
            .prices
            .get(&token_address.to_lowercase())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NftCollection, TokenBalance, TokenPrice};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakePriceApi {
        calls: AtomicUsize,
        responses: Vec<Vec<TokenPrice>>,
        fail_from_call: Option<usize>,
    }

    impl FakePriceApi {
        fn new(responses: Vec<Vec<TokenPrice>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                responses,
                fail_from_call: None,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WalletApi for FakePriceApi {
        async fn token_balances(&self, _address: &str) -> Result<Vec<TokenBalance>> {
            Ok(Vec::new())
        }

        async fn token_prices(&self, _tokens: &[TokenRef]) -> Result<Vec<TokenPrice>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(fail_from) = self.fail_from_call {
                if call >= fail_from {
                    return Err(anyhow!("price endpoint unavailable"));
                }
            }
            Ok(self
                .responses
                .get(call.min(self.responses.len() - 1))
                .cloned()
                .unwrap_or_default())
        }

        async fn nft_collections(&self, _address: &str) -> Result<Vec<NftCollection>> {
            Ok(Vec::new())
        }
    }

    fn price(address: &str, usd: Decimal) -> TokenPrice {
        TokenPrice {
            address: address.to_string(),
            usd_price: usd,
        }
    }

    fn refs() -> Vec<TokenRef> {
        vec![TokenRef {
            address: "0xAAA".to_string(),
            chain_id: 2020,
        }]
    }

    #[tokio::test]
    async fn second_refresh_within_ttl_is_a_noop() {
        let api = FakePriceApi::new(vec![vec![price("0xAAA", dec!(2.50))]]);
        let cache = PriceCache::new(Duration::from_secs(60));

        cache.refresh(&api, &refs()).await;
        cache.refresh(&api, &refs()).await;

        assert_eq!(api.calls(), 1);
        assert_eq!(cache.price_of("0xaaa").await, dec!(2.50));
        // Case-insensitive lookup
        assert_eq!(cache.price_of("0xAAA").await, dec!(2.50));
    }

    #[tokio::test]
    async fn expired_refresh_replaces_the_whole_map() {
        let api = FakePriceApi::new(vec![
            vec![price("0xAAA", dec!(2.50)), price("0xBBB", dec!(1.00))],
            vec![price("0xAAA", dec!(3.00))],
        ]);
        // Zero TTL: every refresh is considered stale.
        let cache = PriceCache::new(Duration::ZERO);

        cache.refresh(&api, &refs()).await;
        assert_eq!(cache.price_of("0xbbb").await, dec!(1.00));

        cache.refresh(&api, &refs()).await;
        assert_eq!(api.calls(), 2);
        assert_eq!(cache.price_of("0xaaa").await, dec!(3.00));
        // A token absent from the new response disappears from lookups.
        assert_eq!(cache.price_of("0xbbb").await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_prices() {
        let mut api = FakePriceApi::new(vec![vec![price("0xAAA", dec!(2.50))]]);
        api.fail_from_call = Some(1);
        let cache = PriceCache::new(Duration::ZERO);

        cache.refresh(&api, &refs()).await;
        cache.refresh(&api, &refs()).await;

        assert_eq!(api.calls(), 2);
        assert_eq!(cache.price_of("0xaaa").await, dec!(2.50));
    }

    #[tokio::test]
    async fn unknown_tokens_price_at_zero() {
        let cache = PriceCache::new(Duration::from_secs(60));
        assert_eq!(cache.price_of("0xdeadbeef").await, Decimal::ZERO);
    }
}
