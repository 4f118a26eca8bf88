use crate::api::{TokenRef, WalletApi};
use crate::config::CheckerConfig;
use crate::models::{AddressReport, TokenHolding};
use crate::price_cache::PriceCache;
use core_logic::WalletEntry;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, warn};

/// Composes the three API operations into one report per address.
///
/// `inspect` never fails: whatever goes wrong degrades to a zero-value
/// report with the error message attached, so one bad address can never
/// stop the batch.
pub struct AddressInspector {
    api: Arc<dyn WalletApi>,
    prices: Arc<PriceCache>,
    chain_id: u64,
    collection_address: String,
    explorer_base_url: String,
}

impl AddressInspector {
    pub fn new(api: Arc<dyn WalletApi>, prices: Arc<PriceCache>, config: &CheckerConfig) -> Self {
        Self {
            api,
            prices,
            chain_id: config.chain_id,
            collection_address: config.axie_collection_address.to_lowercase(),
            explorer_base_url: config.explorer_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Never fails: per-call errors degrade to defaults (no balances, zero
    /// Axies) and the first one is carried on the report's `error` field.
    pub async fn inspect(&self, entry: &WalletEntry) -> AddressReport {
        let address = entry.address.as_str();
        let explorer_url = format!("{}/{}", self.explorer_base_url, address);
        let mut first_error: Option<String> = None;

        let balances = match self.api.token_balances(address).await {
            Ok(balances) => balances,
            Err(e) => {
                error!("Failed to fetch token balances for {}: {:#}", address, e);
                first_error = Some(format!("{:#}", e));
                Vec::new()
            }
        };

        if !balances.is_empty() {
            let refs: Vec<TokenRef> = balances
                .iter()
                .map(|b| TokenRef {
                    address: b.token_address.clone(),
                    chain_id: self.chain_id,
                })
                .collect();
            self.prices.refresh(self.api.as_ref(), &refs).await;
        }

        let axie_count = match self.api.nft_collections(address).await {
            Ok(collections) => collections
                .iter()
                .find(|c| c.collection_address.eq_ignore_ascii_case(&self.collection_address))
                .map(|c| c.item_amount)
                .unwrap_or(0),
            Err(e) => {
                error!("Failed to fetch NFT collections for {}: {:#}", address, e);
                first_error.get_or_insert_with(|| format!("{:#}", e));
                0
            }
        };

        let mut holdings = Vec::with_capacity(balances.len());
        let mut total_usd_value = Decimal::ZERO;

        for token in &balances {
            let Some(balance) = normalize_balance(token.raw_balance, token.decimals) else {
                warn!(
                    "Skipping token {} for {}: unsupported decimals {}",
                    token.symbol, address, token.decimals
                );
                continue;
            };

            let usd_price = self.prices.price_of(&token.token_address).await;
            let usd_value = balance.checked_mul(usd_price).unwrap_or_else(|| {
                warn!(
                    "USD value overflow for token {} at {}; counting as 0",
                    token.symbol, address
                );
                Decimal::ZERO
            });

            total_usd_value = total_usd_value
                .checked_add(usd_value)
                .unwrap_or(total_usd_value);

            holdings.push(TokenHolding {
                symbol: token.symbol.clone(),
                balance,
                usd_price,
                usd_value,
            });
        }

        AddressReport {
            address: entry.address.clone(),
            explorer_url,
            tokens: holdings,
            axie_count,
            total_usd_value,
            private_key: entry.private_key.clone(),
            error: first_error,
        }
    }
}

/// Converts a raw on-chain integer amount into its decimal representation
/// by shifting the decimal point `decimals` places. `None` when the shift
/// exceeds `Decimal`'s scale range.
pub fn normalize_balance(raw: Decimal, decimals: u32) -> Option<Decimal> {
    let mut value = raw;
    let scale = value.scale().checked_add(decimals)?;
    value.set_scale(scale).ok()?;
    Some(value.normalize())
}
