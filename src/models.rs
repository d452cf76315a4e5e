use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Inbound payload for `POST /analyze`. A missing `emailContent` field is
/// treated as an empty submission, not a request error.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "emailContent", default)]
    pub email_content: String,
}

/// Plain text and hyperlink targets pulled out of one email submission.
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    pub links: Vec<String>,
}

/// Outcome of scanning a single link. Serialized untagged so the wire shape
/// is either the stats object or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkVerdict {
    Stats {
        malicious: u64,
        suspicious: u64,
        undetected: u64,
    },
    Failed {
        error: String,
    },
}

/// Reputation results keyed by normalized link. A link that appears twice in
/// the email keeps only the verdict of its last scan.
pub type ReputationMap = BTreeMap<String, LinkVerdict>;

/// The assessor's answer: a confidence score in [0, 100], or an inline error
/// object when the assessment itself failed. Assessment failures do not
/// change the HTTP status of the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PhishingScore {
    Score(u8),
    Failed { error: String },
}

/// Combined result of one analysis. This is the only externally visible
/// artifact; nothing is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    #[serde(rename = "phishingScore")]
    pub phishing_score: PhishingScore,
    #[serde(rename = "virusTotalResults")]
    pub virus_total_results: ReputationMap,
}
