//! Google Gemini advisor implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use studivon_core::error::{ErrorCode, StudivonError, StudivonResult};
use studivon_core::traits::{AdviceGenerator, AdvisorConfig, CoachingContext};

use crate::prompts::build_prompt;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini `generateContent` advisor.
pub struct GeminiAdvisor {
    client: Client,
    config: AdvisorConfig,
    api_key: SecretString,
    endpoint: Url,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiAdvisor {
    /// Create a new Gemini advisor.
    pub fn new(config: AdvisorConfig) -> StudivonResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                StudivonError::Configuration("Gemini API key not found. Set GOOGLE_API_KEY environment variable or provide api_key in config.".to_string())
            })?;

        let mut config = config;
        if config.model.is_empty() {
            config.model = DEFAULT_MODEL.to_string();
        }

        let endpoint = generate_endpoint(config.base_url.as_deref(), &config.model)?;
        let client = Client::builder()
            .build()
            .map_err(|e| StudivonError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key: SecretString::new(api_key),
            endpoint,
        })
    }

    fn request_body(&self, prompt: String) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        }
    }
}

/// `{base}/v1beta/models/{model}:generateContent`
fn generate_endpoint(base_url: Option<&str>, model: &str) -> StudivonResult<Url> {
    let mut base = base_url.unwrap_or(GEMINI_API_URL).to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|u| u.join(&format!("v1beta/models/{}:generateContent", model)))
        .map_err(|e| StudivonError::Configuration(format!("Invalid Gemini base URL: {}", e)))
}

/// Throttling maps to `RateLimit` so the coach can retry it; everything else is permanent.
fn map_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> StudivonError {
    let message = serde_json::from_str::<GeminiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    if status == StatusCode::TOO_MANY_REQUESTS {
        StudivonError::RateLimit {
            message: format!("Gemini quota exceeded: {}", message),
            code: ErrorCode::RateLimitExceeded,
            retry_after,
        }
    } else {
        StudivonError::advisor(format!("Gemini API error ({}): {}", status, message))
    }
}

fn extract_text(response: GenerateResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[async_trait]
impl AdviceGenerator for GeminiAdvisor {
    async fn generate_advice(&self, context: &CoachingContext) -> StudivonResult<String> {
        let request = self.request_body(build_prompt(context));
        tracing::debug!(model = %self.config.model, kind = %context.kind, "Requesting coaching advice");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| StudivonError::advisor_connection(format!("Gemini API request failed: {}", e)))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response
            .text()
            .await
            .map_err(|e| StudivonError::advisor(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(map_error(status, retry_after, &body));
        }

        let response: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| StudivonError::advisor(format!("Failed to parse response: {}", e)))?;
        extract_text(response).ok_or_else(|| StudivonError::advisor("Gemini returned no text"))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_for_default_and_custom_base() {
        let url = generate_endpoint(None, "gemini-2.0-flash").unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        let url = generate_endpoint(Some("http://localhost:8089/proxy"), "m").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8089/proxy/v1beta/models/m:generateContent");
        assert!(generate_endpoint(Some("not a url"), "m").is_err());
    }

    #[test]
    fn test_429_is_rate_limit() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_error(StatusCode::TOO_MANY_REQUESTS, Some(30), body);
        assert!(err.is_transient());
        assert!(err.to_string().contains("Resource has been exhausted"));
        assert!(matches!(err, StudivonError::RateLimit { retry_after: Some(30), .. }));

        let err = map_error(StatusCode::BAD_REQUEST, None, "plain text");
        assert!(matches!(err, StudivonError::Advisor { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Keep "},{"text":"going. "}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).as_deref(), Some("Keep going."));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(extract_text(empty).is_none());
    }

    #[test]
    fn test_new_uses_configured_key_and_default_model() {
        let advisor = GeminiAdvisor::new(AdvisorConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(advisor.model_name(), "gemini-2.0-flash");

        let body = serde_json::to_value(advisor.request_body("hi".to_string())).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 512);
    }
}
