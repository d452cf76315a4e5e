use crate::models::{PhishingScore, ReputationMap};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Whole-assessment failures. These stay inside the assessor: callers get
/// an inline error object in place of a score, never an Err.
#[derive(Debug, Error)]
enum AssessmentError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("{0}")]
    Api(String),
    #[error("could not parse model reply: {0}")]
    Parse(String),
    #[error("phishing score {0} outside the 0-100 contract")]
    OutOfRange(i64),
}

/// Builds the phishing-analysis prompt, runs the chat completion, and
/// parses the model's structured reply into a score.
pub struct RiskAssessor {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl RiskAssessor {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .user_agent("phishing-analyzer/0.1")
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Point the assessor at a different API base (stub servers in tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Assess the email text plus its link reputations.
    ///
    /// Never propagates a failure: transport errors, non-JSON replies,
    /// missing fields, and out-of-contract scores all come back as an
    /// inline error object.
    pub async fn assess(&self, text: &str, reputation: &ReputationMap) -> PhishingScore {
        match self.run_assessment(text, reputation).await {
            Ok(score) => PhishingScore::Score(score),
            Err(e) => {
                warn!("Risk assessment failed: {}", e);
                PhishingScore::Failed {
                    error: format!("OpenAI API error: {}", e),
                }
            }
        }
    }

    async fn run_assessment(
        &self,
        text: &str,
        reputation: &ReputationMap,
    ) -> Result<u8, AssessmentError> {
        let prompt = build_prompt(text, reputation);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system("You are an AI specialized in phishing detection."),
                Message::user(prompt),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AssessmentError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AssessmentError::Api(format!(
                "completion request returned {}: {}",
                status, error_text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AssessmentError::Parse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AssessmentError::Api("completion carried no choices".to_string()))?;

        debug!("Model reply: {}", content.trim());
        parse_score(&content)
    }
}

/// Fixed prompt template: detection heuristics, the strict output contract,
/// then the literal email text and serialized reputation data.
fn build_prompt(text: &str, reputation: &ReputationMap) -> String {
    let reputation_json =
        serde_json::to_string_pretty(reputation).unwrap_or_else(|_| "{}".to_string());

    format!(
        "You are an AI specialized in phishing detection. Analyze the following email and its \
         associated VirusTotal data for potential phishing activity. Consider the following \
         factors when determining a phishing confidence score:\n\
         \n\
         1. Email Content:\n\
         - Does the email use urgency, fear, or pressure tactics (e.g., \"Your account is \
         compromised\", \"Act now\", \"Verify your account\")?\n\
         - Are there spelling or grammatical errors that suggest it might be a phishing email?\n\
         - Does the email request sensitive information (e.g., passwords, personal data, credit \
         card details)?\n\
         \n\
         2. VirusTotal Data for Links:\n\
         - How many engines marked the link as malicious, suspicious, or undetected?\n\
         - Are there any red flags in the URL structure (e.g., unusual domains, shortened \
         links)?\n\
         \n\
         Based on the analysis, provide a single phishing confidence score between 0 and 100, \
         where:\n\
         - 0 indicates you are confident the email is legitimate.\n\
         - 100 indicates the email is definitely phishing.\n\
         \n\
         Only respond with a JSON object containing:\n\
         {{\n    \"phishingScore\": <numeric value between 0 and 100>\n}}\n\
         \n\
         Here is the input data:\n\
         - Email Content:\n{}\n\
         \n\
         - VirusTotal Results:\n{}\n",
        text, reputation_json
    )
}

/// Decode the model's reply: trim, parse as JSON, take `phishingScore`,
/// and reject values outside the advertised 0-100 range.
fn parse_score(content: &str) -> Result<u8, AssessmentError> {
    let reply: ScoreReply = serde_json::from_str(content.trim())
        .map_err(|e| AssessmentError::Parse(e.to_string()))?;

    if !(0..=100).contains(&reply.phishing_score) {
        return Err(AssessmentError::OutOfRange(reply.phishing_score));
    }

    Ok(reply.phishing_score as u8)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ScoreReply {
    #[serde(rename = "phishingScore")]
    phishing_score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkVerdict;

    #[test]
    fn parses_a_valid_reply() {
        assert_eq!(parse_score(r#"{"phishingScore": 87}"#).unwrap(), 87);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(parse_score("\n  {\"phishingScore\": 0}  \n").unwrap(), 0);
    }

    #[test]
    fn rejects_non_json_replies() {
        let err = parse_score("The score is 87.").unwrap_err();
        assert!(matches!(err, AssessmentError::Parse(_)));
    }

    #[test]
    fn rejects_replies_missing_the_score_field() {
        let err = parse_score(r#"{"confidence": 87}"#).unwrap_err();
        assert!(matches!(err, AssessmentError::Parse(_)));
    }

    #[test]
    fn rejects_scores_outside_the_contract() {
        assert!(matches!(
            parse_score(r#"{"phishingScore": 150}"#).unwrap_err(),
            AssessmentError::OutOfRange(150)
        ));
        assert!(matches!(
            parse_score(r#"{"phishingScore": -5}"#).unwrap_err(),
            AssessmentError::OutOfRange(-5)
        ));
    }

    #[test]
    fn prompt_embeds_text_contract_and_reputation_data() {
        let mut reputation = ReputationMap::new();
        reputation.insert(
            "http://phishing.com".to_string(),
            LinkVerdict::Stats {
                malicious: 5,
                suspicious: 2,
                undetected: 10,
            },
        );

        let prompt = build_prompt("Your account has been compromised", &reputation);
        assert!(prompt.contains("Your account has been compromised"));
        assert!(prompt.contains("http://phishing.com"));
        assert!(prompt.contains("\"malicious\": 5"));
        assert!(prompt.contains("\"phishingScore\""));
        assert!(prompt.contains("between 0 and 100"));
    }

    #[test]
    fn assessment_errors_carry_the_service_prefix() {
        let err = AssessmentError::Parse("expected value".to_string());
        let score = PhishingScore::Failed {
            error: format!("OpenAI API error: {}", err),
        };
        match score {
            PhishingScore::Failed { error } => {
                assert!(error.starts_with("OpenAI API error:"));
                assert!(error.contains("expected value"));
            }
            _ => unreachable!(),
        }
    }
}
