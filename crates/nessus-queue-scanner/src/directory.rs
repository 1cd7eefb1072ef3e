//! Read access to the scanner's scan list.

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use nessus_queue_core::{ApiConfig, Credentials, ScanId, ScanRecord};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use zeroize::Zeroizing;

/// Source of the current scan list.
#[async_trait]
pub trait ScanDirectory: Send + Sync {
    /// Fetch every scan the scanner knows about, with its current status.
    async fn list_scans(&self) -> Result<Vec<ScanRecord>>;
}

/// `ScanDirectory` backed by the Nessus REST API.
pub struct NessusClient {
    client: Client,
    base_url: String,
    api_keys: Zeroizing<String>,
}

impl NessusClient {
    /// Create a client for the scanner at `credentials.base_url`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(credentials: &Credentials, config: &ApiConfig) -> Result<Self> {
        if config.accept_invalid_certs {
            tracing::warn!(
                "TLS certificate verification is disabled for {}",
                credentials.base_url
            );
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            base_url: credentials.base_url.clone(),
            api_keys: credentials.api_keys_header(),
        })
    }

    fn scans_url(&self) -> String {
        format!("{}/scans", self.base_url)
    }
}

#[async_trait]
impl ScanDirectory for NessusClient {
    async fn list_scans(&self) -> Result<Vec<ScanRecord>> {
        let response = self
            .client
            .get(self.scans_url())
            .header("X-ApiKeys", self.api_keys.as_str())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::RemoteApi {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_scan_list(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ScanListResponse {
    // Nessus sends `"scans": null` when no scans exist.
    #[serde(default)]
    scans: Option<Vec<ScanRecord>>,
}

/// Parse a `GET /scans` response body.
pub fn parse_scan_list(body: &str) -> Result<Vec<ScanRecord>> {
    let response: ScanListResponse = serde_json::from_str(body)?;
    Ok(response.scans.unwrap_or_default())
}

/// Find the record for `scan_id` in a listing.
#[must_use]
pub fn find_scan(scans: &[ScanRecord], scan_id: ScanId) -> Option<&ScanRecord> {
    scans.iter().find(|scan| scan.id == scan_id)
}
