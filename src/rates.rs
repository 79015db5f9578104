//! Rate resolution. One fresh lookup per expense, no caching, no retry;
//! the resolved table is used once to freeze shares and then never again.

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::error::RateError;
use crate::models::Currency;

/// Base→target multipliers from a single resolution. Always maps the base to
/// 1.0; a target absent from the source is absent here too — callers must
/// treat a missing key as "rate unknown", never as 1.0.
pub type RateTable = HashMap<Currency, f64>;

/// Public endpoint serving daily base→target tables keyed by lowercase codes.
pub const DEFAULT_BASE_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1";

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("reqwest client")
});

/// Narrow seam over the external rate source.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Resolve base→target rates as of now. Implementations must short-circuit
    /// to `{base: 1.0}` without any external call when there is nothing
    /// foreign to resolve.
    async fn resolve(
        &self,
        base: Currency,
        targets: &[Currency],
    ) -> Result<RateTable, RateError>;
}

/// HTTP adapter for the currency API: `GET {base_url}/currencies/{base}.json`
/// returns `{"<base>": {"<target>": <rate>, ...}}` with lowercase codes.
pub struct HttpRateSource {
    base_url: String,
}

impl HttpRateSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for HttpRateSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// `{base: 1.0}` when the target set needs no external data, else `None`.
fn trivial_table(base: Currency, targets: &[Currency]) -> Option<RateTable> {
    if targets.iter().all(|t| *t == base) {
        Some(HashMap::from([(base, 1.0)]))
    } else {
        None
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn resolve(
        &self,
        base: Currency,
        targets: &[Currency],
    ) -> Result<RateTable, RateError> {
        if let Some(table) = trivial_table(base, targets) {
            return Ok(table);
        }

        let base_lower = base.as_str().to_lowercase();
        let url = format!("{}/currencies/{}.json", self.base_url, base_lower);
        tracing::debug!(%url, "fetching conversion rates");

        let resp = CLIENT
            .get(&url)
            .send()
            .await
            .map_err(|e| RateError::SourceUnavailable(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RateError::SourceUnavailable(format!("HTTP {}", status)));
        }
        let payload: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RateError::SourceUnavailable(e.to_string()))?;
        let by_target = payload
            .get(&base_lower)
            .and_then(|v| v.as_object())
            .ok_or_else(|| {
                RateError::SourceUnavailable(format!("malformed payload for {}", base))
            })?;

        let mut table = RateTable::new();
        table.insert(base, 1.0);
        for &target in targets {
            if target == base {
                continue;
            }
            match by_target
                .get(&target.as_str().to_lowercase())
                .and_then(|v| v.as_f64())
            {
                Some(rate) => {
                    table.insert(target, rate);
                }
                // Missing rate is not a hard failure here; the share
                // calculator refuses the expense if the currency is needed.
                None => tracing::warn!(%base, %target, "rate missing from source response"),
            }
        }
        Ok(table)
    }
}
