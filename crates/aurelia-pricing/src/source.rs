//! External rate sources.

use async_trait::async_trait;

use crate::rates::RateTable;

/// Rate source errors
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("Rate source request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate source returned malformed data: {0}")]
    Malformed(String),
}

/// A source of pricing rates.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<RateTable, RateError>;
}

/// Fetches a `RateTable` as JSON over HTTP.
///
/// The upstream document has the same shape as the local fallback table, so
/// operators can point this at any endpoint exporting the spreadsheet.
pub struct HttpRateSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRateSource {
    pub fn new(url: String) -> Self {
        HttpRateSource {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self) -> Result<RateTable, RateError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let table: RateTable = response
            .json()
            .await
            .map_err(|e| RateError::Malformed(e.to_string()))?;

        if table.metal_rates.is_empty() {
            return Err(RateError::Malformed(
                "rate table contains no metal rates".to_string(),
            ));
        }

        tracing::debug!(
            metals = table.metal_rates.len(),
            gemstones = table.gemstone_rates.len(),
            url = %self.url,
            "Fetched external rate table"
        );

        Ok(table)
    }
}

/// A fixed in-memory source, used in tests and when no external URL is
/// configured.
pub struct StaticRateSource {
    table: RateTable,
}

impl StaticRateSource {
    pub fn new(table: RateTable) -> Self {
        StaticRateSource { table }
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn fetch(&self) -> Result<RateTable, RateError> {
        Ok(self.table.clone())
    }
}
