//! TRY to USD exchange-rate lookup with a configured fallback.

use std::time::Duration;

use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::TranslateError;

const TARGET_CURRENCY: &str = "USD";

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: Rates,
}

/// Only the target currency is read; other entries may hold anything.
#[derive(Debug, Default, Deserialize)]
struct Rates {
    #[serde(rename = "USD")]
    usd: Option<f64>,
}

/// Where a [`RateQuote`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateSource {
    Live,
    Fallback { reason: String },
}

/// The rate applied to every price of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuote {
    pub rate: Decimal,
    pub source: RateSource,
}

impl RateQuote {
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.source == RateSource::Live
    }
}

/// Fetches `{"rates":{"USD":n}}` from a configured URL.
pub struct RateClient {
    client: Client,
    url: String,
}

impl RateClient {
    /// # Errors
    ///
    /// Returns [`TranslateError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    /// Queries the live rate once. No retry.
    ///
    /// # Errors
    ///
    /// - [`TranslateError::Http`] on network failure or timeout.
    /// - [`TranslateError::UnexpectedStatus`] for any non-2xx response.
    /// - [`TranslateError::Deserialize`] if the body is not the expected JSON.
    /// - [`TranslateError::MissingRate`] if the USD entry is absent.
    /// - [`TranslateError::InvalidRate`] if the value is not a positive number.
    pub async fn fetch_rate(&self) -> Result<Decimal, TranslateError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        let parsed: RatesResponse =
            serde_json::from_str(&body).map_err(|source| TranslateError::Deserialize {
                context: "exchange rate response".to_string(),
                source,
            })?;

        let raw = parsed
            .rates
            .usd
            .ok_or_else(|| TranslateError::MissingRate {
                currency: TARGET_CURRENCY.to_string(),
            })?;

        let rate = Decimal::from_f64(raw)
            .ok_or_else(|| TranslateError::InvalidRate(raw.to_string()))?
            .normalize();
        if rate <= Decimal::ZERO {
            return Err(TranslateError::InvalidRate(rate.to_string()));
        }
        Ok(rate)
    }
}

/// Resolves the run's rate, substituting `fallback` on any failure.
pub async fn resolve_rate(client: &RateClient, fallback: Decimal) -> RateQuote {
    match client.fetch_rate().await {
        Ok(rate) => {
            tracing::info!(%rate, "using live TRY->USD rate");
            RateQuote {
                rate,
                source: RateSource::Live,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, %fallback, "exchange rate unavailable, using fallback");
            RateQuote {
                rate: fallback,
                source: RateSource::Fallback {
                    reason: e.to_string(),
                },
            }
        }
    }
}
