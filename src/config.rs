use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Chat model used for the risk assessment.
    pub model: String,
    /// Low temperature keeps scores consistent across identical inputs.
    pub temperature: f32,
    /// Upper bound on the completion; the reply is one small JSON object.
    pub max_tokens: u32,
    pub http_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: 5000 },
            analysis: AnalysisConfig {
                model: "gpt-4".to_string(),
                temperature: 0.3,
                max_tokens: 150,
                http_timeout_seconds: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

pub async fn load_config(path: &str) -> crate::models::Result<Config> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// API keys for the two outbound services, read once at startup. Startup
/// fails when either variable is missing so a misconfigured deployment
/// cannot silently degrade every scan and assessment.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub openai_api_key: String,
    pub virustotal_api_key: String,
}

impl Secrets {
    pub fn from_env() -> crate::models::Result<Self> {
        Ok(Self {
            openai_api_key: require_var("OPENAI_API_KEY")?,
            virustotal_api_key: require_var("VIRUSTOTAL_API_KEY")?,
        })
    }
}

fn require_var(name: &str) -> crate::models::Result<String> {
    std::env::var(name).map_err(|_| format!("environment variable {} is not set", name).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_service_expectations() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.analysis.model, "gpt-4");
        assert_eq!(config.analysis.max_tokens, 150);
    }

    #[test]
    fn missing_env_var_names_the_variable() {
        let err = require_var("PHISHING_ANALYZER_TEST_UNSET_VAR").unwrap_err();
        assert!(err.to_string().contains("PHISHING_ANALYZER_TEST_UNSET_VAR"));
    }
}
