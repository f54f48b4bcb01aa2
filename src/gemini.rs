//! Client for the Gemini `generateContent` API
//!
//! Models the small slice of the wire protocol this crate needs: text parts,
//! function-call parts and function-response parts, plus the structured-output
//! constraint. The [`ModelClient`] trait is the seam front-end code and tests
//! plug into; [`GeminiClient`] is the real HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ModelConfig;
use crate::tools::FunctionDeclaration;
use crate::{Result, TripAgentError};

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn carrying plain text
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part {
                text: Some(text.into()),
                ..Part::default()
            }],
        }
    }

    /// A user turn carrying a function result back to the model
    #[must_use]
    pub fn function_result(name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part {
                function_response: Some(FunctionResponse {
                    name: name.into(),
                    response: json!({ "result": result.into() }),
                }),
                ..Part::default()
            }],
        }
    }
}

/// One part of a turn: text, a function call, or a function result
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

/// A model-initiated request to invoke a declared function
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// The local result of a function call, sent back to the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

/// A generation request: conversation so far, declared tools, optional system
/// instruction. The response is always constrained to `response_schema`.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub tools: Vec<FunctionDeclaration>,
    pub system_instruction: Option<String>,
    pub response_schema: Value,
}

/// The model's reply, reduced to the first candidate's content
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub content: Content,
}

impl ModelResponse {
    /// The function call in the response's first part, if any
    #[must_use]
    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.content
            .parts
            .first()
            .and_then(|part| part.function_call.as_ref())
    }

    /// All text parts concatenated, or `None` when there is no text
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

/// Boundary to the generative model service
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Submit one request and return the first candidate's content.
    ///
    /// Transport and service failures are logged and propagated unchanged;
    /// there is no retry.
    async fn generate(&self, request: GenerateRequest) -> Result<ModelResponse>;
}

/// Gemini API wire request/response structures
mod wire {
    use super::{Content, FunctionDeclaration, Value};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenerateContentRequest {
        pub contents: Vec<Content>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub tools: Option<Vec<ToolDeclarations>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub system_instruction: Option<SystemInstruction>,
        pub generation_config: GenerationConfig,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ToolDeclarations {
        pub function_declarations: Vec<FunctionDeclaration>,
    }

    #[derive(Debug, Serialize)]
    pub struct SystemInstruction {
        pub parts: Vec<TextPart>,
    }

    #[derive(Debug, Serialize)]
    pub struct TextPart {
        pub text: String,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenerationConfig {
        pub response_mime_type: String,
        pub response_schema: Value,
    }

    #[derive(Debug, Deserialize)]
    pub struct GenerateContentResponse {
        #[serde(default)]
        pub candidates: Vec<Candidate>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Candidate {
        pub content: Option<Content>,
    }

    impl GenerateContentRequest {
        pub fn from_request(request: super::GenerateRequest) -> Self {
            let tools = if request.tools.is_empty() {
                None
            } else {
                Some(vec![ToolDeclarations {
                    function_declarations: request.tools,
                }])
            };

            Self {
                contents: request.contents,
                tools,
                system_instruction: request.system_instruction.map(|text| SystemInstruction {
                    parts: vec![TextPart { text }],
                }),
                generation_config: GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                    response_schema: request.response_schema,
                },
            }
        }
    }
}

/// HTTP client for the Gemini generateContent endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client from model configuration.
    ///
    /// Requires a configured API key; callers decide mock vs live before
    /// constructing this.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| TripAgentError::config("model API key is not configured"))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()
            .map_err(|e| TripAgentError::api(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<ModelResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = wire::GenerateContentRequest::from_request(request);

        tracing::debug!(model = %self.model, "calling model service");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "model service request failed");
                TripAgentError::api(format!("request to model service failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, "model service returned an error");
            return Err(TripAgentError::api(format!(
                "model service returned {status}: {detail}"
            )));
        }

        let decoded: wire::GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read model service response");
            TripAgentError::api(format!("failed to read model service response: {e}"))
        })?;

        let content = decoded
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .ok_or_else(|| {
                tracing::error!("model service response contained no candidates");
                TripAgentError::api("model service response contained no candidates")
            })?;

        Ok(ModelResponse { content })
    }
}
