use crate::models::{LinkVerdict, ReputationMap};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const VIRUSTOTAL_API_BASE: &str = "https://www.virustotal.com/api/v3";

/// Per-link scan failures. These never abort the scan of remaining links;
/// their messages become the inline error payload for the affected entry.
#[derive(Debug, Error)]
enum ScanLinkError {
    /// Transport failure, unparseable body, or missing analysis id on the
    /// submission leg.
    #[error("Submission failed")]
    SubmissionFailed,
    /// Transport failure or missing stats structure on the details leg.
    #[error("Details not found")]
    DetailsNotFound,
}

/// Client for the VirusTotal v3 URL analysis API.
pub struct VirusTotalClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl VirusTotalClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("phishing-analyzer/0.1")
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            base_url: VIRUSTOTAL_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API base (stub servers in tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Scan each link in turn and collect per-link verdicts.
    ///
    /// Failures are isolated per link: a link whose submission or details
    /// fetch fails gets an inline error entry and the scan moves on. The
    /// result is keyed by normalized link, so a link that appears twice is
    /// scanned twice but keeps only the last verdict.
    pub async fn scan(&self, links: &[String]) -> ReputationMap {
        let mut results = ReputationMap::new();

        for link in links {
            let normalized = normalize_link(link);
            let verdict = match self.scan_link(&normalized).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    warn!("Scan of {} failed: {}", normalized, e);
                    LinkVerdict::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.insert(normalized, verdict);
        }

        results
    }

    async fn scan_link(&self, link: &str) -> Result<LinkVerdict, ScanLinkError> {
        let analysis_id = self.submit_url(link).await?;
        debug!("Submitted {} for analysis, id {}", link, analysis_id);
        self.fetch_stats(&analysis_id).await
    }

    async fn submit_url(&self, link: &str) -> Result<String, ScanLinkError> {
        let response = self
            .client
            .post(format!("{}/urls", self.base_url))
            .header("x-apikey", &self.api_key)
            .form(&[("url", link)])
            .send()
            .await
            .map_err(|e| {
                debug!("URL submission transport error for {}: {}", link, e);
                ScanLinkError::SubmissionFailed
            })?;

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|_| ScanLinkError::SubmissionFailed)?;

        body.data
            .and_then(|data| data.id)
            .ok_or(ScanLinkError::SubmissionFailed)
    }

    async fn fetch_stats(&self, analysis_id: &str) -> Result<LinkVerdict, ScanLinkError> {
        let response = self
            .client
            .get(format!("{}/analyses/{}", self.base_url, analysis_id))
            .header("x-apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                debug!("Analysis fetch transport error for {}: {}", analysis_id, e);
                ScanLinkError::DetailsNotFound
            })?;

        let body: AnalysisResponse = response
            .json()
            .await
            .map_err(|_| ScanLinkError::DetailsNotFound)?;

        let stats = body
            .data
            .and_then(|data| data.attributes)
            .and_then(|attributes| attributes.stats)
            .ok_or(ScanLinkError::DetailsNotFound)?;

        Ok(LinkVerdict::Stats {
            malicious: stats.malicious,
            suspicious: stats.suspicious,
            undetected: stats.undetected,
        })
    }
}

/// Guarantee an explicit scheme before submission. Links without one are
/// assumed to be https.
pub fn normalize_link(link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{}", link)
    }
}

// Response shapes for the two VirusTotal endpoints. Every field is optional
// so a malformed or error-shaped body decodes into "structure missing"
// rather than a decode failure deciding the error kind.

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    data: Option<AnalysisData>,
}

#[derive(Debug, Deserialize)]
struct AnalysisData {
    attributes: Option<AnalysisAttributes>,
}

#[derive(Debug, Deserialize)]
struct AnalysisAttributes {
    stats: Option<AnalysisStats>,
}

#[derive(Debug, Deserialize)]
struct AnalysisStats {
    #[serde(default)]
    malicious: u64,
    #[serde(default)]
    suspicious: u64,
    #[serde(default)]
    undetected: u64,
}
