//! Ledger synchronization
//!
//! Each query type walks its own primary→fallback source chain. A
//! rate limit, network failure or unparseable body moves on to the
//! next source; when every source fails the query resolves to the
//! empty/zero result. Callers treat "no data" as a valid terminal
//! state, so nothing here returns an error.

use crate::config::Config;
use crate::error::SourceError;
use crate::format::{format_nano, NATIVE_DECIMALS};
use crate::services::price::{usd_value, PriceCache};
use crate::services::shapes::{
    BalanceResponse, Event, JettonWalletsResponse, RpcTransaction, TokensResponse,
    TransactionsResponse,
};
use crate::services::transport::HttpTransport;
use crate::ton::{normalize, TonAddress};
use crate::types::{Balance, TokenHolding, Transaction, TxStatus, WalletOverview};
use std::sync::Arc;
use tracing::{debug, warn};

/// Holdings below this many smallest units are hidden as dust.
/// The boundary is inclusive: exactly the threshold stays.
pub const DUST_THRESHOLD: u128 = 100_000;

const NATIVE_SYMBOL: &str = "TON";

/// Read-only client over the remote ledger sources.
pub struct LedgerClient {
    transport: Arc<dyn HttpTransport>,
    config: Config,
}

impl LedgerClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: Config) -> Self {
        Self { transport, config }
    }

    /// Native balance, or [`Balance::zero`] when every source fails.
    pub async fn get_balance(&self, address: &TonAddress) -> Balance {
        let raw = address.to_raw();
        let sources = [
            ("rpc", self.rpc_url(&format!("getAddressBalance?address={}", raw))),
            ("tonapi", format!("{}/accounts/{}", self.config.tonapi_endpoint, raw)),
        ];

        for (name, url) in sources {
            match self.fetch_balance(&url).await {
                Ok(balance) => return balance,
                Err(e) => warn!("balance source {} failed: {}", name, e),
            }
        }
        Balance::zero()
    }

    /// Transaction history, newest first as the sources return it, or
    /// empty when every source fails.
    pub async fn get_transactions(&self, address: &TonAddress, limit: u32) -> Vec<Transaction> {
        let raw = address.to_raw();
        let sources = [
            (
                "rpc",
                self.rpc_url(&format!("getTransactions?address={}&limit={}", raw, limit)),
            ),
            (
                "tonapi",
                format!(
                    "{}/accounts/{}/events?limit={}",
                    self.config.tonapi_endpoint, raw, limit
                ),
            ),
        ];

        for (name, url) in sources {
            match self.fetch_transactions(&url, &raw).await {
                Ok(txs) => return txs,
                Err(e) => warn!("transaction source {} failed: {}", name, e),
            }
        }
        Vec::new()
    }

    /// Jetton holdings above the dust threshold, largest first, or
    /// empty when every source fails.
    pub async fn get_token_holdings(&self, address: &TonAddress) -> Vec<TokenHolding> {
        let raw = address.to_raw();
        let sources = [
            (
                "v3",
                format!(
                    "{}/jetton/wallets?owner_address={}&limit=100",
                    self.config.v3_endpoint, raw
                ),
            ),
            (
                "tonapi",
                format!("{}/accounts/{}/jettons", self.config.tonapi_endpoint, raw),
            ),
        ];

        for (name, url) in sources {
            match self.fetch_tokens(&url).await {
                Ok(tokens) => return tokens,
                Err(e) => warn!("token source {} failed: {}", name, e),
            }
        }
        Vec::new()
    }

    /// Issue balance, history, holdings and the native price
    /// concurrently and assemble the wallet view. The queries are
    /// independent; completion order does not matter.
    pub async fn overview(&self, address: &TonAddress, prices: &PriceCache) -> WalletOverview {
        let (balance, transactions, tokens, price) = tokio::join!(
            self.get_balance(address),
            self.get_transactions(address, self.config.tx_page_limit),
            self.get_token_holdings(address),
            prices.get_price(&self.config.price_asset_id),
        );

        let usd = usd_value(&balance.nano, &price);
        WalletOverview {
            balance,
            transactions,
            tokens,
            price,
            usd_value: usd,
        }
    }

    fn rpc_url(&self, path_and_query: &str) -> String {
        let mut url = format!("{}/{}", self.config.rpc_endpoint, path_and_query);
        if let Some(key) = &self.config.rpc_api_key {
            url.push_str("&api_key=");
            url.push_str(key);
        }
        url
    }

    async fn fetch_balance(&self, url: &str) -> Result<Balance, SourceError> {
        let value = self.transport.get_json(url).await?;
        let parsed: BalanceResponse = serde_json::from_value(value)
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        let nano = parsed
            .into_nano()
            .ok_or_else(|| SourceError::Parse("no usable balance in response".into()))?;
        let formatted = format_nano(&nano);
        Ok(Balance { nano, formatted })
    }

    async fn fetch_transactions(
        &self,
        url: &str,
        wallet_raw: &str,
    ) -> Result<Vec<Transaction>, SourceError> {
        let value = self.transport.get_json(url).await?;
        let parsed: TransactionsResponse = serde_json::from_value(value)
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        match parsed {
            TransactionsResponse::Rpc(rpc) => {
                if !rpc.ok {
                    return Err(SourceError::Parse("rpc envelope not ok".into()));
                }
                Ok(rpc
                    .result
                    .into_iter()
                    .filter_map(|tx| normalize_rpc_transaction(tx, wallet_raw))
                    .collect())
            }
            TransactionsResponse::Events(events) => Ok(events
                .events
                .into_iter()
                .enumerate()
                .flat_map(|(i, event)| normalize_event(event, i, wallet_raw))
                .collect()),
        }
    }

    async fn fetch_tokens(&self, url: &str) -> Result<Vec<TokenHolding>, SourceError> {
        let value = self.transport.get_json(url).await?;
        let parsed: TokensResponse = serde_json::from_value(value)
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let holdings = match parsed {
            TokensResponse::JettonWallets(v3) => normalize_jetton_wallets(v3),
            TokensResponse::JettonBalances(list) => list
                .balances
                .into_iter()
                .filter_map(|entry| {
                    let balance = entry.balance?;
                    let jetton = entry.jetton.unwrap_or_else(|| {
                        debug!("jetton balance without metadata, defaulting");
                        Default::default()
                    });
                    Some(TokenHolding {
                        contract_address: jetton.address.unwrap_or_default(),
                        name: jetton.name.unwrap_or_else(|| "Unknown Token".to_string()),
                        symbol: jetton.symbol.unwrap_or_else(|| "???".to_string()),
                        balance,
                        decimals: jetton.decimals.unwrap_or(NATIVE_DECIMALS),
                        verified: jetton.verification.as_deref() == Some("whitelist"),
                        image_url: jetton.image,
                    })
                })
                .collect(),
        };

        Ok(finalize_holdings(holdings))
    }
}

/// Whether the wallet is the recipient, with both sides routed through
/// address normalization. Unparseable recipients classify as outgoing.
fn is_incoming(recipient: &str, wallet_raw: &str) -> bool {
    normalize(recipient).as_deref() == Some(wallet_raw)
}

/// Legacy RPC record → canonical transaction. Records without a native
/// hash are skipped rather than aborting the page.
fn normalize_rpc_transaction(tx: RpcTransaction, wallet_raw: &str) -> Option<Transaction> {
    let hash = match tx.transaction_id.and_then(|id| id.hash) {
        Some(hash) => hash,
        None => {
            debug!("skipping rpc transaction without a hash");
            return None;
        }
    };

    let in_msg = tx.in_msg;
    let from = in_msg
        .as_ref()
        .and_then(|m| m.source.clone())
        .unwrap_or_default();
    // The wallet itself is the recipient when the message omits one
    let to = in_msg
        .as_ref()
        .and_then(|m| m.destination.clone())
        .unwrap_or_else(|| wallet_raw.to_string());
    let amount = in_msg
        .as_ref()
        .and_then(|m| m.value.clone())
        .unwrap_or_else(|| "0".to_string());
    let comment = in_msg.and_then(|m| m.message);

    Some(Transaction {
        is_incoming: is_incoming(&to, wallet_raw),
        hash,
        from,
        to,
        amount,
        decimals: NATIVE_DECIMALS,
        asset_symbol: NATIVE_SYMBOL.to_string(),
        timestamp_ms: tx.utime.unwrap_or(0) * 1000,
        status: TxStatus::Confirmed,
        comment,
        jetton_contract: None,
    })
}

/// Event → canonical transactions, one per supported action. The
/// sources expose no per-action hash, so list identity comes from the
/// synthetic `{event_id}-{event_index}-{action_index}` key.
fn normalize_event(event: Event, event_index: usize, wallet_raw: &str) -> Vec<Transaction> {
    let Some(event_id) = event.event_id else {
        debug!("skipping event without an id");
        return Vec::new();
    };
    let timestamp_ms = event.timestamp.unwrap_or(0) * 1000;
    let base_status = if event.in_progress {
        TxStatus::Pending
    } else {
        TxStatus::Confirmed
    };

    let mut out = Vec::new();
    for (action_index, action) in event.actions.into_iter().enumerate() {
        let hash = format!("{}-{}-{}", event_id, event_index, action_index);
        let status = match action.status.as_deref() {
            Some("failed") => TxStatus::Failed,
            _ => base_status,
        };

        let tx = match action.kind.as_deref() {
            Some("TonTransfer") => action.ton_transfer.map(|t| {
                let to = t
                    .recipient
                    .and_then(|r| r.address)
                    .unwrap_or_default();
                Transaction {
                    is_incoming: is_incoming(&to, wallet_raw),
                    hash: hash.clone(),
                    from: t.sender.and_then(|s| s.address).unwrap_or_default(),
                    to,
                    amount: t.amount.unwrap_or(0).to_string(),
                    decimals: NATIVE_DECIMALS,
                    asset_symbol: NATIVE_SYMBOL.to_string(),
                    timestamp_ms,
                    status,
                    comment: t.comment,
                    jetton_contract: None,
                }
            }),
            Some("JettonTransfer") => action.jetton_transfer.map(|t| {
                let jetton = t.jetton.unwrap_or_default();
                let to = t
                    .recipient
                    .and_then(|r| r.address)
                    .unwrap_or_default();
                Transaction {
                    is_incoming: is_incoming(&to, wallet_raw),
                    hash: hash.clone(),
                    from: t.sender.and_then(|s| s.address).unwrap_or_default(),
                    to,
                    amount: t.amount.unwrap_or_else(|| "0".to_string()),
                    decimals: jetton.decimals.unwrap_or(NATIVE_DECIMALS),
                    asset_symbol: jetton.symbol.unwrap_or_else(|| "???".to_string()),
                    timestamp_ms,
                    status,
                    comment: t.comment,
                    jetton_contract: jetton.address,
                }
            }),
            other => {
                debug!("skipping unsupported action kind {:?}", other);
                None
            }
        };

        if let Some(tx) = tx {
            out.push(tx);
        }
    }
    out
}

/// Jetton-wallet list + address book → holdings. Metadata is looked
/// up per master contract; absence downgrades to unverified defaults.
fn normalize_jetton_wallets(response: JettonWalletsResponse) -> Vec<TokenHolding> {
    let book = response.address_book;
    response
        .jetton_wallets
        .into_iter()
        .filter_map(|wallet| {
            let master = wallet.jetton?;
            let balance = wallet.balance?;
            let info = book.get(&master);

            let (name, symbol, verified) = match info {
                Some(entry) if entry.is_verified_master() => {
                    // "usdt-minter.ton" → "USDT"
                    let symbol = entry
                        .domain
                        .as_deref()
                        .and_then(|d| d.split('-').next())
                        .map(|s| s.to_uppercase())
                        .unwrap_or_else(|| "???".to_string());
                    (format!("{} Token", symbol), symbol, true)
                }
                _ => ("Unknown Token".to_string(), "???".to_string(), false),
            };

            Some(TokenHolding {
                contract_address: info
                    .and_then(|i| i.user_friendly.clone())
                    .unwrap_or(master),
                name,
                symbol,
                balance,
                decimals: NATIVE_DECIMALS,
                verified,
                image_url: None,
            })
        })
        .collect()
}

/// Shared holding post-processing: drop dust and unparseable
/// balances, sort descending by balance.
fn finalize_holdings(holdings: Vec<TokenHolding>) -> Vec<TokenHolding> {
    let mut keyed: Vec<(u128, TokenHolding)> = holdings
        .into_iter()
        .filter_map(|h| match h.balance.parse::<u128>() {
            Ok(n) if n >= DUST_THRESHOLD => Some((n, h)),
            Ok(_) => None,
            Err(_) => {
                debug!("skipping holding with unparseable balance");
                None
            }
        })
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.into_iter().map(|(_, h)| h).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::ManualClock;
    use crate::services::transport::test_support::{FakeOutcome, FakeTransport};
    use serde_json::json;

    const WALLET_FRIENDLY: &str = "EQAvDfWFG0oYX19jwNDNBBL1rKNT9XfaGP9HyTb5nb2Eml6y";
    const WALLET_RAW: &str = "0:2f0df5851b4a185f5f63c0d0cd0412f5aca353f577da18ff47c936f99dbd849a";

    fn wallet() -> TonAddress {
        TonAddress::parse(WALLET_FRIENDLY).unwrap()
    }

    fn client(transport: FakeTransport) -> LedgerClient {
        LedgerClient::new(Arc::new(transport), Config::default())
    }

    #[tokio::test]
    async fn balance_uses_the_primary_rpc_shape() {
        let transport = FakeTransport::new().route(
            "getAddressBalance",
            FakeOutcome::Json(json!({"ok": true, "result": "2500000000"})),
        );
        let balance = client(transport).get_balance(&wallet()).await;
        assert_eq!(balance.nano, "2500000000");
        assert_eq!(balance.formatted, "2.5000");
    }

    #[tokio::test]
    async fn balance_falls_back_on_rate_limit() {
        let transport = FakeTransport::new()
            .route("getAddressBalance", FakeOutcome::RateLimited)
            .route("/accounts/", FakeOutcome::Json(json!({"balance": 700000000})));
        let balance = client(transport).get_balance(&wallet()).await;
        assert_eq!(balance.nano, "700000000");
        assert_eq!(balance.formatted, "0.7000");
    }

    #[tokio::test]
    async fn balance_degrades_to_zero_when_all_sources_fail() {
        let transport = FakeTransport::new()
            .route("getAddressBalance", FakeOutcome::Network)
            .route("/accounts/", FakeOutcome::Status(500));
        let balance = client(transport).get_balance(&wallet()).await;
        assert_eq!(balance, Balance::zero());
    }

    #[tokio::test]
    async fn balance_rejects_error_envelope_and_falls_back() {
        let transport = FakeTransport::new()
            .route(
                "getAddressBalance",
                FakeOutcome::Json(json!({"ok": false, "result": "rate limited"})),
            )
            .route("/accounts/", FakeOutcome::Json(json!({"balance": "42"})));
        let balance = client(transport).get_balance(&wallet()).await;
        assert_eq!(balance.nano, "42");
    }

    #[tokio::test]
    async fn rpc_transactions_normalize_per_record() {
        let transport = FakeTransport::new().route(
            "getTransactions",
            FakeOutcome::Json(json!({
                "ok": true,
                "result": [
                    {
                        "transaction_id": {"hash": "abc123"},
                        "utime": 1_700_000_000,
                        "in_msg": {
                            "source": "0:1111111111111111111111111111111111111111111111111111111111111111",
                            "destination": WALLET_RAW,
                            "value": "1000000000",
                            "message": "hello"
                        }
                    },
                    // No hash: skipped, does not abort the page
                    {"utime": 1_700_000_001}
                ]
            })),
        );
        let txs = client(transport).get_transactions(&wallet(), 10).await;
        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.hash, "abc123");
        assert!(tx.is_incoming);
        assert_eq!(tx.amount, "1000000000");
        assert_eq!(tx.asset_symbol, "TON");
        assert_eq!(tx.timestamp_ms, 1_700_000_000_000);
        assert_eq!(tx.status, TxStatus::Confirmed);
        assert_eq!(tx.comment.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn incoming_classification_normalizes_mixed_address_forms() {
        // Recipient arrives user-friendly, wallet compares raw
        let transport = FakeTransport::new().route(
            "getTransactions",
            FakeOutcome::Json(json!({
                "ok": true,
                "result": [{
                    "transaction_id": {"hash": "t1"},
                    "utime": 0,
                    "in_msg": {"destination": WALLET_FRIENDLY, "value": "5"}
                }]
            })),
        );
        let txs = client(transport).get_transactions(&wallet(), 10).await;
        assert!(txs[0].is_incoming);
    }

    #[tokio::test]
    async fn events_fan_out_into_one_transaction_per_action() {
        let transport = FakeTransport::new()
            .route("getTransactions", FakeOutcome::RateLimited)
            .route(
                "/events",
                FakeOutcome::Json(json!({
                    "events": [{
                        "event_id": "ev1",
                        "timestamp": 1_700_000_000,
                        "in_progress": false,
                        "actions": [
                            {
                                "type": "TonTransfer",
                                "status": "ok",
                                "TonTransfer": {
                                    "sender": {"address": "0:1111111111111111111111111111111111111111111111111111111111111111"},
                                    "recipient": {"address": WALLET_RAW},
                                    "amount": 2_000_000_000i64,
                                    "comment": "ping"
                                }
                            },
                            {
                                "type": "JettonTransfer",
                                "status": "ok",
                                "JettonTransfer": {
                                    "sender": {"address": WALLET_RAW},
                                    "recipient": {"address": "0:2222222222222222222222222222222222222222222222222222222222222222"},
                                    "amount": "150000",
                                    "jetton": {
                                        "address": "0:3333333333333333333333333333333333333333333333333333333333333333",
                                        "symbol": "USDT",
                                        "decimals": 6
                                    }
                                }
                            },
                            {"type": "SmartContractExec"}
                        ]
                    }]
                })),
            );

        let txs = client(transport).get_transactions(&wallet(), 10).await;
        assert_eq!(txs.len(), 2);

        assert_eq!(txs[0].hash, "ev1-0-0");
        assert!(txs[0].is_incoming);
        assert_eq!(txs[0].amount, "2000000000");
        assert_eq!(txs[0].comment.as_deref(), Some("ping"));

        assert_eq!(txs[1].hash, "ev1-0-1");
        assert!(!txs[1].is_incoming);
        assert_eq!(txs[1].asset_symbol, "USDT");
        assert_eq!(txs[1].decimals, 6);
        assert!(txs[1].jetton_contract.is_some());
    }

    #[tokio::test]
    async fn pending_and_failed_action_states_map_through() {
        let transport = FakeTransport::new()
            .route("getTransactions", FakeOutcome::Network)
            .route(
                "/events",
                FakeOutcome::Json(json!({
                    "events": [{
                        "event_id": "ev2",
                        "timestamp": 1,
                        "in_progress": true,
                        "actions": [
                            {"type": "TonTransfer", "TonTransfer": {"amount": 1}},
                            {"type": "TonTransfer", "status": "failed", "TonTransfer": {"amount": 2}}
                        ]
                    }]
                })),
            );
        let txs = client(transport).get_transactions(&wallet(), 10).await;
        assert_eq!(txs[0].status, TxStatus::Pending);
        assert_eq!(txs[1].status, TxStatus::Failed);
    }

    #[tokio::test]
    async fn transactions_degrade_to_empty_when_all_sources_fail() {
        let transport = FakeTransport::new()
            .route("getTransactions", FakeOutcome::Status(502))
            .route("/events", FakeOutcome::Network);
        let txs = client(transport).get_transactions(&wallet(), 10).await;
        assert!(txs.is_empty());
    }

    #[tokio::test]
    async fn jetton_wallet_shape_filters_dust_and_sorts() {
        let transport = FakeTransport::new().route(
            "jetton/wallets",
            FakeOutcome::Json(json!({
                "jetton_wallets": [
                    {"jetton": "0:aaaa", "balance": "100000"},
                    {"jetton": "0:bbbb", "balance": "99999"},
                    {"jetton": "0:cccc", "balance": "5000000"},
                    {"jetton": "0:dddd", "balance": "not-a-number"}
                ],
                "address_book": {
                    "0:aaaa": {
                        "user_friendly": "EQaaaa",
                        "domain": "usdt-minter.ton",
                        "interfaces": ["jetton_master"]
                    },
                    "0:cccc": {
                        "user_friendly": "EQcccc",
                        "interfaces": ["jetton_master"]
                    }
                }
            })),
        );

        let tokens = client(transport).get_token_holdings(&wallet()).await;
        // 99999 is dust (boundary is inclusive at 100000), garbage skipped
        assert_eq!(tokens.len(), 2);

        // Sorted descending by balance
        assert_eq!(tokens[0].balance, "5000000");
        // In the book but without a domain: not verified, defaults kept
        assert!(!tokens[0].verified);
        assert_eq!(tokens[0].symbol, "???");
        assert_eq!(tokens[0].name, "Unknown Token");

        assert_eq!(tokens[1].balance, "100000");
        assert!(tokens[1].verified);
        assert_eq!(tokens[1].symbol, "USDT");
        assert_eq!(tokens[1].name, "USDT Token");
        assert_eq!(tokens[1].contract_address, "EQaaaa");
    }

    #[tokio::test]
    async fn jetton_balance_shape_reads_inline_metadata() {
        let transport = FakeTransport::new()
            .route("jetton/wallets", FakeOutcome::RateLimited)
            .route(
                "/jettons",
                FakeOutcome::Json(json!({
                    "balances": [
                        {
                            "balance": "2000000",
                            "jetton": {
                                "address": "0:eeee",
                                "name": "Tether USD",
                                "symbol": "USDT",
                                "decimals": 6,
                                "verification": "whitelist",
                                "image": "https://img.example/usdt.png"
                            }
                        },
                        {
                            "balance": "300000",
                            "jetton": {
                                "address": "0:ffff",
                                "name": "Sketchy",
                                "symbol": "SKT",
                                "verification": "none"
                            }
                        }
                    ]
                })),
            );

        let tokens = client(transport).get_token_holdings(&wallet()).await;
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].verified);
        assert_eq!(tokens[0].decimals, 6);
        assert_eq!(tokens[0].image_url.as_deref(), Some("https://img.example/usdt.png"));
        // Verification "none" must not count as verified
        assert!(!tokens[1].verified);
        assert_eq!(tokens[1].decimals, 9);
    }

    #[tokio::test]
    async fn overview_assembles_all_queries_and_the_usd_value() {
        let transport = FakeTransport::new()
            .route(
                "getAddressBalance",
                FakeOutcome::Json(json!({"ok": true, "result": "3000000000"})),
            )
            .route(
                "getTransactions",
                FakeOutcome::Json(json!({"ok": true, "result": []})),
            )
            .route("jetton/wallets", FakeOutcome::Json(json!({"jetton_wallets": []})))
            .route(
                "simple/price",
                FakeOutcome::Json(json!({
                    "the-open-network": {"usd": 2.5, "usd_24h_change": 1.2}
                })),
            );

        let transport = Arc::new(transport);
        let config = Config::default();
        let clock = Arc::new(ManualClock::new(0));
        let prices = PriceCache::new(transport.clone(), clock, config.price_endpoint.clone());
        let client = LedgerClient::new(transport, config);

        let overview = client.overview(&wallet(), &prices).await;
        assert_eq!(overview.balance.formatted, "3.0000");
        assert!(overview.transactions.is_empty());
        assert!(overview.tokens.is_empty());
        assert_eq!(overview.usd_value, rust_decimal_macros::dec!(7.5));
    }
}
