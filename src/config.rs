//! Configuration for the wallet core
//!
//! Everything has a working default so the library can be embedded
//! without any environment; `from_env` overrides from the host.

use crate::ton::WalletVersion;
use anyhow::Result;
use std::env;

/// Wallet core configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Toncenter v2 REST base (primary balance/transaction source)
    pub rpc_endpoint: String,

    /// Optional toncenter API key sent as a query parameter
    pub rpc_api_key: Option<String>,

    /// Toncenter v3 base (primary jetton source)
    pub v3_endpoint: String,

    /// Tonapi base (fallback source for all query types)
    pub tonapi_endpoint: String,

    /// Price API base (CoinGecko-compatible)
    pub price_endpoint: String,

    /// Asset id used for native-token price lookups
    pub price_asset_id: String,

    /// Workchain new wallets are derived in
    pub workchain: i32,

    /// Wallet contract version new wallets are derived under
    pub wallet_version: WalletVersion,

    /// Transaction history page size
    pub tx_page_limit: u32,

    /// Per-request timeout at the transport boundary, in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_endpoint: "https://toncenter.com/api/v2".to_string(),
            rpc_api_key: None,
            v3_endpoint: "https://toncenter.com/api/v3".to_string(),
            tonapi_endpoint: "https://tonapi.io/v2".to_string(),
            price_endpoint: "https://api.coingecko.com/api/v3".to_string(),
            price_asset_id: "the-open-network".to_string(),
            workchain: 0,
            wallet_version: WalletVersion::V4R2,
            tx_page_limit: 10,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// the defaults above for anything unset.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let rpc_endpoint =
            env::var("TON_RPC_ENDPOINT").unwrap_or(defaults.rpc_endpoint);

        let rpc_api_key = env::var("TON_API_KEY").ok().filter(|s| !s.is_empty());

        let v3_endpoint =
            env::var("TONCENTER_V3_ENDPOINT").unwrap_or(defaults.v3_endpoint);

        let tonapi_endpoint =
            env::var("TONAPI_ENDPOINT").unwrap_or(defaults.tonapi_endpoint);

        let price_endpoint =
            env::var("PRICE_API_ENDPOINT").unwrap_or(defaults.price_endpoint);

        let price_asset_id =
            env::var("PRICE_ASSET_ID").unwrap_or(defaults.price_asset_id);

        let workchain = env::var("TON_WORKCHAIN")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.workchain);

        let wallet_version = match env::var("WALLET_VERSION") {
            Ok(v) => v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown WALLET_VERSION: {}", v))?,
            Err(_) => defaults.wallet_version,
        };

        let tx_page_limit = env::var("TX_PAGE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.tx_page_limit);

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        Ok(Self {
            rpc_endpoint,
            rpc_api_key,
            v3_endpoint,
            tonapi_endpoint,
            price_endpoint,
            price_asset_id,
            workchain,
            wallet_version,
            tx_page_limit,
            request_timeout_secs,
        })
    }
}
