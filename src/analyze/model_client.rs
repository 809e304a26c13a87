//! Model query service: provider abstraction + concrete clients.
//!
//! A client only moves text. It returns the raw payload on success and never
//! interprets issue shapes; that is the dispatcher's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ModelConfig;
use crate::error::{AnalyzeError, AnalyzeResult};
use crate::prompt::Prompt;
use crate::types::SourceType;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Everything the model query service receives for one analysis.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub product: &'a str,
    pub prompt: &'a Prompt,
    pub allowed_source_types: &'a [SourceType],
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one prompt; `Ok` carries the raw response text.
    async fn query(&self, request: &ModelRequest<'_>) -> AnalyzeResult<String>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynModelClient = Arc<dyn ModelClient>;

/// Canned structured payload served by the mock client.
pub const MOCK_PAYLOAD: &str = r#"```json
[
  {"description": "App crashes when uploading large photos", "category": "Bug",
   "sources": [{"type": "Reddit Post", "url": "https://reddit.com/r/example/1", "title": "Crash on upload"},
               {"type": "Tweet", "url": "https://twitter.com/example/status/1", "title": "crashing again"}]},
  {"description": "Slow startup on older phones", "category": "Performance",
   "sources": [{"type": "YouTube Comment", "url": "https://youtube.com/watch?v=example", "title": "Review"}]},
  {"description": "Subscription price increased without notice", "category": "Pricing", "sources": []}
]
```"#;

/// Factory: build a client according to config and environment variables.
///
/// * `AI_TEST_MODE=mock` → deterministic mock serving [`MOCK_PAYLOAD`].
/// * `AI_TEST_MODE=error` → mock reporting an upstream failure.
/// * `enabled == false` → [`DisabledClient`].
/// * Otherwise the configured provider.
pub fn build_client_from_config(config: &ModelConfig) -> anyhow::Result<DynModelClient> {
    match std::env::var("AI_TEST_MODE").ok().as_deref() {
        Some("mock") => return Ok(Arc::new(MockClient::payload(MOCK_PAYLOAD))),
        Some("error") => {
            return Ok(Arc::new(MockClient::failing(AnalyzeError::Upstream(
                "mock provider error".into(),
            ))))
        }
        _ => {}
    }

    if !config.enabled {
        return Ok(Arc::new(DisabledClient));
    }

    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::new(config)?)),
        "relay" => Ok(Arc::new(RelayClient::new(config)?)),
        other => anyhow::bail!("unsupported model provider: {other}"),
    }
}

fn http_client(config: &ModelConfig) -> anyhow::Result<reqwest::Client> {
    let http = reqwest::Client::builder()
        .user_agent("product-holmes/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(http)
}

// ------------------------------------------------------------
// Gemini
// ------------------------------------------------------------

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: http_client(config)?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}
#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}
#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReq<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateResp {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}
#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}
#[derive(Deserialize)]
struct RespPart {
    #[serde(default)]
    text: Option<String>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn query(&self, request: &ModelRequest<'_>) -> AnalyzeResult<String> {
        let prompt = request.prompt;
        if self.api_key.is_empty() {
            return Err(AnalyzeError::Transport("missing Gemini API key".into()));
        }

        let req = GenerateReq {
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: &prompt.system,
                }],
            },
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &prompt.user }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let url = format!("{GEMINI_BASE}/{}:generateContent", self.model);
        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;

        if !status.is_success() {
            let msg = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_default();
            return Err(AnalyzeError::Transport(format!("status {status}: {msg}")));
        }

        let parsed: GenerateResp = serde_json::from_str(&body)
            .map_err(|e| AnalyzeError::Upstream(format!("unreadable Gemini response: {e}")))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(AnalyzeError::Upstream(reason));
        }
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// ------------------------------------------------------------
// Relay function ({issues} | {error})
// ------------------------------------------------------------

/// Posts to a serverless relay that answers `{issues: ...}` or `{error: ...}`.
/// The body is returned untouched so shape detection can read the envelope.
pub struct RelayClient {
    http: reqwest::Client,
    url: String,
}

impl RelayClient {
    pub fn new(config: &ModelConfig) -> anyhow::Result<Self> {
        let url = config
            .relay_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("relay provider requires relay_url"))?;
        Ok(Self {
            http: http_client(config)?,
            url,
        })
    }
}

#[async_trait]
impl ModelClient for RelayClient {
    async fn query(&self, request: &ModelRequest<'_>) -> AnalyzeResult<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            product: &'a str,
            prompt: String,
            allowed_source_types: &'a [SourceType],
        }
        #[derive(Deserialize)]
        struct RelayError {
            error: String,
        }

        let resp = self
            .http
            .post(&self.url)
            .json(&Req {
                product: request.product,
                prompt: request.prompt.combined(),
                allowed_source_types: request.allowed_source_types,
            })
            .send()
            .await
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;

        if !status.is_success() {
            let msg = serde_json::from_str::<RelayError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(AnalyzeError::Transport(format!("status {status}: {msg}")));
        }
        Ok(body)
    }

    fn provider_name(&self) -> &'static str {
        "relay"
    }
}

// ------------------------------------------------------------
// Disabled + mock
// ------------------------------------------------------------

/// Used when the model provider is switched off.
pub struct DisabledClient;

#[async_trait]
impl ModelClient for DisabledClient {
    async fn query(&self, _request: &ModelRequest<'_>) -> AnalyzeResult<String> {
        Err(AnalyzeError::Transport("model provider disabled".into()))
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed reply for tests and local runs.
pub struct MockClient {
    reply: AnalyzeResult<String>,
}

impl MockClient {
    pub fn payload(body: impl Into<String>) -> Self {
        Self {
            reply: Ok(body.into()),
        }
    }

    pub fn failing(err: AnalyzeError) -> Self {
        Self { reply: Err(err) }
    }
}

#[async_trait]
impl ModelClient for MockClient {
    async fn query(&self, _request: &ModelRequest<'_>) -> AnalyzeResult<String> {
        self.reply.clone()
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
