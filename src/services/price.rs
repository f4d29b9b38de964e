//! TTL-cached asset price lookups
//!
//! The price feed is best effort: a fresh quote is served from cache,
//! a refresh failure falls back to the last quote however stale, and a
//! wallet that has never seen a price gets a zero quote. Concurrent
//! lookups for the same asset coalesce onto one network call.

use crate::clock::Clock;
use crate::error::SourceError;
use crate::services::shapes::PriceResponse;
use crate::services::transport::HttpTransport;
use crate::types::PriceQuote;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

/// How long a fetched quote stays fresh.
pub const PRICE_TTL_MS: i64 = 60_000;

/// Price cache keyed by asset id.
pub struct PriceCache {
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    endpoint: String,
    ttl_ms: i64,
    quotes: RwLock<HashMap<String, PriceQuote>>,
    /// Per-asset flight locks for single-flight refresh
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PriceCache {
    pub fn new(transport: Arc<dyn HttpTransport>, clock: Arc<dyn Clock>, endpoint: String) -> Self {
        Self {
            transport,
            clock,
            endpoint,
            ttl_ms: PRICE_TTL_MS,
            quotes: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Current quote for the asset. Never fails: the worst case is a
    /// zero quote stamped at the current time.
    pub async fn get_price(&self, asset_id: &str) -> PriceQuote {
        if let Some(quote) = self.fresh_quote(asset_id).await {
            return quote;
        }

        // One refresh per asset at a time; late arrivals wait here and
        // then find the cache already warm.
        let gate = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(asset_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _flight = gate.lock().await;

        if let Some(quote) = self.fresh_quote(asset_id).await {
            return quote;
        }

        match self.fetch(asset_id).await {
            Ok(quote) => {
                self.quotes
                    .write()
                    .await
                    .insert(asset_id.to_string(), quote.clone());
                quote
            }
            Err(e) => {
                warn!("price refresh for {} failed: {}", asset_id, e);
                // Stale beats nothing; nothing becomes a zero quote
                match self.quotes.read().await.get(asset_id) {
                    Some(stale) => stale.clone(),
                    None => PriceQuote::zero(self.clock.now_ms()),
                }
            }
        }
    }

    async fn fresh_quote(&self, asset_id: &str) -> Option<PriceQuote> {
        let quotes = self.quotes.read().await;
        let quote = quotes.get(asset_id)?;
        if self.clock.now_ms() - quote.fetched_at_ms < self.ttl_ms {
            Some(quote.clone())
        } else {
            None
        }
    }

    async fn fetch(&self, asset_id: &str) -> Result<PriceQuote, SourceError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.endpoint, asset_id
        );
        let value = self.transport.get_json(&url).await?;
        let parsed: PriceResponse =
            serde_json::from_value(value).map_err(|e| SourceError::Parse(e.to_string()))?;

        let entry = parsed
            .get(asset_id)
            .ok_or_else(|| SourceError::Parse(format!("no entry for {}", asset_id)))?;
        let price = entry
            .usd
            .ok_or_else(|| SourceError::Parse("missing usd price".into()))?;

        Ok(PriceQuote {
            price,
            change_24h_percent: entry.usd_24h_change.unwrap_or(Decimal::ZERO),
            fetched_at_ms: self.clock.now_ms(),
        })
    }
}

/// Value a nanoton balance at a quote. Pure; unparseable balances
/// value at zero.
pub fn usd_value(nano: &str, quote: &PriceQuote) -> Decimal {
    let Ok(n) = nano.parse::<u64>() else {
        return Decimal::ZERO;
    };
    Decimal::from(n) / dec!(1000000000) * quote.price
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::ManualClock;
    use crate::services::transport::test_support::{FakeOutcome, FakeTransport};
    use serde_json::json;

    const ASSET: &str = "the-open-network";

    fn quote_json(usd: f64) -> FakeOutcome {
        FakeOutcome::Json(json!({ASSET: {"usd": usd, "usd_24h_change": -1.5}}))
    }

    fn cache(transport: FakeTransport, clock: Arc<ManualClock>) -> (PriceCache, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let cache = PriceCache::new(
            transport.clone(),
            clock,
            "https://price.example/api/v3".to_string(),
        );
        (cache, transport)
    }

    #[tokio::test]
    async fn calls_within_the_ttl_hit_the_cache() {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let (cache, transport) = cache(FakeTransport::new().route("simple/price", quote_json(2.4)), clock.clone());

        let first = cache.get_price(ASSET).await;
        assert_eq!(first.price, rust_decimal_macros::dec!(2.4));

        clock.advance_ms(10_000);
        let second = cache.get_price(ASSET).await;
        assert_eq!(second, first);
        assert_eq!(transport.call_count().await, 1);
    }

    #[tokio::test]
    async fn expired_ttl_triggers_a_second_fetch() {
        let clock = Arc::new(ManualClock::new(0));
        let (cache, transport) = cache(
            FakeTransport::new()
                .route("simple/price", quote_json(2.4))
                .route("simple/price", quote_json(3.0)),
            clock.clone(),
        );

        assert_eq!(cache.get_price(ASSET).await.price, rust_decimal_macros::dec!(2.4));
        clock.advance_ms(PRICE_TTL_MS + 1);
        assert_eq!(cache.get_price(ASSET).await.price, rust_decimal_macros::dec!(3.0));
        assert_eq!(transport.call_count().await, 2);
    }

    #[tokio::test]
    async fn refresh_failure_serves_the_stale_quote() {
        let clock = Arc::new(ManualClock::new(0));
        let (cache, _) = cache(
            FakeTransport::new()
                .route("simple/price", quote_json(2.4))
                .route("simple/price", FakeOutcome::Network),
            clock.clone(),
        );

        let first = cache.get_price(ASSET).await;
        clock.advance_ms(PRICE_TTL_MS + 1);
        let stale = cache.get_price(ASSET).await;
        assert_eq!(stale, first);
    }

    #[tokio::test]
    async fn failure_with_no_cache_yields_a_zero_quote() {
        let clock = Arc::new(ManualClock::new(5_000));
        let (cache, _) = cache(
            FakeTransport::new().route("simple/price", FakeOutcome::Status(500)),
            clock,
        );

        let quote = cache.get_price(ASSET).await;
        assert_eq!(quote.price, Decimal::ZERO);
        assert_eq!(quote.fetched_at_ms, 5_000);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_flight() {
        let clock = Arc::new(ManualClock::new(0));
        let (cache, transport) = cache(
            FakeTransport::new()
                .route("simple/price", quote_json(2.4))
                .with_delay(std::time::Duration::from_millis(50)),
            clock,
        );
        let cache = Arc::new(cache);

        let a = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get_price(ASSET).await }
        });
        let b = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get_price(ASSET).await }
        });

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a, b);
        assert_eq!(transport.call_count().await, 1);
    }

    #[tokio::test]
    async fn malformed_price_body_degrades_like_a_failure() {
        let clock = Arc::new(ManualClock::new(0));
        let (cache, _) = cache(
            FakeTransport::new()
                .route("simple/price", FakeOutcome::Json(json!({"unexpected": []}))),
            clock,
        );
        let quote = cache.get_price(ASSET).await;
        assert_eq!(quote.price, Decimal::ZERO);
    }

    #[test]
    fn usd_value_is_pure_integer_scaling() {
        let quote = PriceQuote {
            price: rust_decimal_macros::dec!(2.50),
            change_24h_percent: Decimal::ZERO,
            fetched_at_ms: 0,
        };
        assert_eq!(usd_value("3000000000", &quote), rust_decimal_macros::dec!(7.5));
        assert_eq!(usd_value("0", &quote), Decimal::ZERO);
        assert_eq!(usd_value("garbage", &quote), Decimal::ZERO);
    }
}
