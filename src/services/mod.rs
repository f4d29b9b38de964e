//! Ledger-sync services: remote sources, normalization and caching

pub mod ledger;
pub mod price;
pub mod shapes;
pub mod transport;

pub use ledger::{LedgerClient, DUST_THRESHOLD};
pub use price::{usd_value, PriceCache, PRICE_TTL_MS};
pub use transport::{HttpTransport, ReqwestTransport};
