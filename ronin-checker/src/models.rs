use rust_decimal::Decimal;
use serde::Deserialize;

/// One row of the balances response. `raw_balance` is the on-chain integer
/// amount; the API sends it as a numeric string, which `Decimal` parses
/// losslessly.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenBalance {
    pub token_address: String,
    pub raw_balance: Decimal,
    pub decimals: u32,
    pub symbol: String,
}

/// One row of the NFT collections response.
#[derive(Debug, Clone, Deserialize)]
pub struct NftCollection {
    pub collection_address: String,
    pub item_amount: u64,
}

/// One row of the prices response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPrice {
    pub address: String,
    pub usd_price: Decimal,
}

/// A token position after normalization and valuation.
#[derive(Debug, Clone)]
pub struct TokenHolding {
    pub symbol: String,
    pub balance: Decimal,
    pub usd_price: Decimal,
    pub usd_value: Decimal,
}

/// The full findings for one input entry. Built once by the inspector,
/// consumed once by the results manager.
#[derive(Debug, Clone)]
pub struct AddressReport {
    pub address: String,
    pub explorer_url: String,
    pub tokens: Vec<TokenHolding>,
    pub axie_count: u64,
    pub total_usd_value: Decimal,
    pub private_key: Option<String>,
    pub error: Option<String>,
}

impl AddressReport {
    /// Only reports with something found are persisted.
    pub fn qualifies(&self) -> bool {
        self.total_usd_value > Decimal::ZERO || self.axie_count > 0
    }
}
