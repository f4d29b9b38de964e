//! Untrusted remote response shapes
//!
//! Every query type is served by at least two structurally different
//! APIs: a legacy RPC envelope and an account/event style. Responses
//! are parsed through untagged enums (try the first shape, fall
//! through to the second), and all non-discriminating fields default
//! instead of failing, since the remote shape is untrusted input.

use serde::Deserialize;
use std::collections::HashMap;

// ---- balance ----

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BalanceResponse {
    Rpc(RpcBalanceResponse),
    Account(AccountResponse),
}

/// `{ "ok": true, "result": "123456789" }`
#[derive(Debug, Deserialize)]
pub struct RpcBalanceResponse {
    pub ok: bool,
    pub result: String,
}

/// `{ "balance": 123456789, ... }`
#[derive(Debug, Deserialize)]
pub struct AccountResponse {
    pub balance: AccountBalance,
}

/// Sources disagree on whether the balance is a number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AccountBalance {
    Number(u64),
    Text(String),
}

impl BalanceResponse {
    /// Extract the nanoton amount, rejecting error envelopes and
    /// non-numeric payloads.
    pub fn into_nano(self) -> Option<String> {
        let raw = match self {
            BalanceResponse::Rpc(r) => {
                if !r.ok {
                    return None;
                }
                r.result
            }
            BalanceResponse::Account(a) => match a.balance {
                AccountBalance::Number(n) => n.to_string(),
                AccountBalance::Text(s) => s,
            },
        };
        raw.parse::<u128>().ok().map(|n| n.to_string())
    }
}

// ---- transactions ----

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TransactionsResponse {
    Rpc(RpcTransactionsResponse),
    Events(EventsResponse),
}

/// Legacy RPC list: one native in-transfer per record.
#[derive(Debug, Deserialize)]
pub struct RpcTransactionsResponse {
    pub ok: bool,
    pub result: Vec<RpcTransaction>,
}

#[derive(Debug, Deserialize)]
pub struct RpcTransaction {
    #[serde(default)]
    pub transaction_id: Option<RpcTransactionId>,
    #[serde(default)]
    pub in_msg: Option<RpcMessage>,
    /// Unix seconds
    #[serde(default)]
    pub utime: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RpcTransactionId {
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RpcMessage {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    /// Nanotons as a decimal string
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Event list: each event bundles heterogeneous actions.
#[derive(Debug, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub event_id: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub in_progress: bool,
    #[serde(default)]
    pub actions: Vec<EventAction>,
}

#[derive(Debug, Deserialize)]
pub struct EventAction {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "TonTransfer", default)]
    pub ton_transfer: Option<TonTransferAction>,
    #[serde(rename = "JettonTransfer", default)]
    pub jetton_transfer: Option<JettonTransferAction>,
}

#[derive(Debug, Deserialize)]
pub struct TonTransferAction {
    #[serde(default)]
    pub sender: Option<AccountRef>,
    #[serde(default)]
    pub recipient: Option<AccountRef>,
    /// Nanotons
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JettonTransferAction {
    #[serde(default)]
    pub sender: Option<AccountRef>,
    #[serde(default)]
    pub recipient: Option<AccountRef>,
    /// Smallest units as a decimal string
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub jetton: Option<JettonPreview>,
}

#[derive(Debug, Deserialize)]
pub struct AccountRef {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JettonPreview {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    /// "whitelist" | "none" | "blacklist"
    #[serde(default)]
    pub verification: Option<String>,
}

// ---- token holdings ----

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TokensResponse {
    JettonWallets(JettonWalletsResponse),
    JettonBalances(JettonBalancesResponse),
}

/// Jetton-wallet list plus a separate address book of contract
/// metadata.
#[derive(Debug, Deserialize)]
pub struct JettonWalletsResponse {
    pub jetton_wallets: Vec<JettonWallet>,
    #[serde(default)]
    pub address_book: HashMap<String, AddressBookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct JettonWallet {
    /// Master contract address
    #[serde(default)]
    pub jetton: Option<String>,
    #[serde(default)]
    pub balance: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddressBookEntry {
    #[serde(default)]
    pub user_friendly: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
}

impl AddressBookEntry {
    /// A contract counts as a whitelisted jetton master only when the
    /// source says so explicitly.
    pub fn is_verified_master(&self) -> bool {
        self.interfaces.iter().any(|i| i == "jetton_master") && self.domain.is_some()
    }
}

/// Balance list with inline jetton metadata.
#[derive(Debug, Deserialize)]
pub struct JettonBalancesResponse {
    pub balances: Vec<JettonBalanceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct JettonBalanceEntry {
    #[serde(default)]
    pub balance: Option<String>,
    #[serde(default)]
    pub jetton: Option<JettonPreview>,
}

// ---- price ----

/// `{ "<asset-id>": { "usd": 2.41, "usd_24h_change": -0.8 } }`
pub type PriceResponse = HashMap<String, PriceEntry>;

#[derive(Debug, Deserialize)]
pub struct PriceEntry {
    #[serde(default)]
    pub usd: Option<rust_decimal::Decimal>,
    #[serde(default)]
    pub usd_24h_change: Option<rust_decimal::Decimal>,
}
