//! HTTP transport boundary
//!
//! Ledger and price services speak GET-for-JSON through this port, so
//! tests substitute canned sources and the core never owns timeouts or
//! connection policy directly.

use crate::error::SourceError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Async GET returning parsed JSON. Non-success statuses and body
/// decode failures are classified into [`SourceError`] here, at the
/// boundary, so callers only see the taxonomy.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, SourceError>;
}

/// Production transport on reqwest.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::from_network_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::from_status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    /// Scripted failure kinds for the fake transport.
    #[derive(Debug, Clone)]
    pub(crate) enum FakeOutcome {
        Json(Value),
        RateLimited,
        Network,
        Status(u16),
    }

    struct Route {
        pattern: String,
        outcomes: VecDeque<FakeOutcome>,
    }

    /// Canned transport. Requests are matched by URL substring; a
    /// route with several outcomes serves them in order and then
    /// repeats the last one.
    pub(crate) struct FakeTransport {
        routes: Mutex<Vec<Route>>,
        calls: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl FakeTransport {
        pub(crate) fn new() -> Self {
            Self {
                routes: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        pub(crate) fn route(self, pattern: &str, outcome: FakeOutcome) -> Self {
            {
                // Sync construction: the mutex is uncontended here
                let mut routes = self.routes.try_lock().expect("constructing");
                if let Some(route) = routes.iter_mut().find(|r| r.pattern == pattern) {
                    route.outcomes.push_back(outcome);
                } else {
                    routes.push(Route {
                        pattern: pattern.to_string(),
                        outcomes: VecDeque::from([outcome]),
                    });
                }
            }
            self
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) async fn call_count(&self) -> usize {
            self.calls.lock().await.len()
        }

        pub(crate) async fn calls_matching(&self, pattern: &str) -> usize {
            self.calls
                .lock()
                .await
                .iter()
                .filter(|u| u.contains(pattern))
                .count()
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn get_json(&self, url: &str) -> Result<Value, SourceError> {
            self.calls.lock().await.push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let mut routes = self.routes.lock().await;
            let route = routes
                .iter_mut()
                .find(|r| url.contains(r.pattern.as_str()));
            let Some(route) = route else {
                return Err(SourceError::Status(404));
            };

            let outcome = if route.outcomes.len() > 1 {
                route.outcomes.pop_front().expect("non-empty")
            } else {
                route.outcomes.front().expect("non-empty").clone()
            };

            match outcome {
                FakeOutcome::Json(v) => Ok(v),
                FakeOutcome::RateLimited => Err(SourceError::RateLimited),
                FakeOutcome::Network => Err(SourceError::Network("connection refused".into())),
                FakeOutcome::Status(code) => Err(SourceError::Status(code)),
            }
        }
    }
}
