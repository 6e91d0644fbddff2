// src/generate.rs
//! Material generator: customized CV section + cover letter per posting.
//!
//! Generation is best-effort. A failing model call yields an empty string
//! for that field and never an error, so a posting is always persisted.

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{AiConfig, CandidateProfile};
use crate::ingest::truncate_chars;
use crate::ingest::types::JobPosting;

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_KEYWORDS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Materials {
    pub customized_cv: String,
    pub cover_letter: String,
}

impl Materials {
    pub fn is_empty(&self) -> bool {
        self.customized_cv.is_empty() && self.cover_letter.is_empty()
    }
}

#[async_trait]
pub trait MaterialGenerator: Send + Sync {
    async fn customize(&self, job: &JobPosting) -> Materials;
    fn name(&self) -> &'static str;
}

pub type DynGenerator = Arc<dyn MaterialGenerator>;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("model transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model returned HTTP {0}")]
    Status(u16),
    #[error("model returned no text")]
    Empty,
}

/// One prompt in, free text out.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerateError>;
    fn name(&self) -> &'static str;
}

fn http_client(timeout_secs: u64) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
}

fn non_empty(text: String) -> Result<String, GenerateError> {
    let t = text.trim();
    if t.is_empty() {
        Err(GenerateError::Empty)
    } else {
        Ok(t.to_string())
    }
}

/// Google Generative Language `generateContent`.
pub struct GeminiModel {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiModel {
    pub fn new(api_key: String, model: &str, timeout_secs: u64) -> reqwest::Result<Self> {
        let model = if model.is_empty() {
            GEMINI_DEFAULT_MODEL
        } else {
            model
        };
        Ok(Self {
            http: http_client(timeout_secs)?,
            api_key,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    async fn complete(&self, prompt: &str) -> Result<String, GenerateError> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            contents: Vec<Content<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: Option<RespContent>,
        }
        #[derive(Deserialize)]
        struct RespContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct RespPart {
            #[serde(default)]
            text: String,
        }

        let req = Req {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let resp = self
            .http
            .post(format!("{GEMINI_BASE}/{}:generateContent", self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(GenerateError::Status(resp.status().as_u16()));
        }
        let body: Resp = resp.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        non_empty(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// OpenAI Chat Completions.
pub struct OpenAiModel {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiModel {
    pub fn new(api_key: String, model: &str, timeout_secs: u64) -> reqwest::Result<Self> {
        let model = if model.is_empty() {
            OPENAI_DEFAULT_MODEL
        } else {
            model
        };
        Ok(Self {
            http: http_client(timeout_secs)?,
            api_key,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextModel for OpenAiModel {
    async fn complete(&self, prompt: &str) -> Result<String, GenerateError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            #[serde(default)]
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: "You write concise, professional job application material. Plain text only.",
                },
                Msg {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.4,
        };
        let resp = self
            .http
            .post(OPENAI_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(GenerateError::Status(resp.status().as_u16()));
        }
        let body: Resp = resp.json().await?;
        let text = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        non_empty(text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Deterministic output for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct MockModel;

#[async_trait]
impl TextModel for MockModel {
    async fn complete(&self, prompt: &str) -> Result<String, GenerateError> {
        let first = prompt.lines().next().unwrap_or_default();
        Ok(format!("[mock] {first}"))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub struct ModelBackedGenerator<M: TextModel> {
    model: M,
    profile: CandidateProfile,
    description_chars: usize,
}

impl<M: TextModel> ModelBackedGenerator<M> {
    pub fn new(model: M, profile: CandidateProfile, description_chars: usize) -> Self {
        Self {
            model,
            profile,
            description_chars,
        }
    }

    fn profile_block(&self) -> String {
        format!(
            "Candidate: {}\nExperience: {} years\nSummary: {}\nSkills: {}",
            self.profile.name,
            self.profile.experience_years,
            self.profile.summary,
            self.profile.skills.join(", ")
        )
    }

    pub fn keywords_prompt(&self, job: &JobPosting) -> String {
        format!(
            "Extract the top {MAX_KEYWORDS} keywords and skills from this job description.\n\n\
             Job description: {}\n\n\
             Reply with a comma-separated list only.",
            truncate_chars(&job.description, self.description_chars)
        )
    }

    pub fn cv_prompt(&self, job: &JobPosting, keywords: &[String]) -> String {
        format!(
            "Write an ATS-optimized CV section for {} applying to {} at {}.\n\n\
             Job description: {}\n\n{}{}\n\n\
             Highlight the matching experience and mirror the posting's key terms.",
            self.profile.name,
            job.title,
            job.company,
            truncate_chars(&job.description, self.description_chars),
            self.profile_block(),
            keywords_line(keywords)
        )
    }

    pub fn cover_letter_prompt(&self, job: &JobPosting, keywords: &[String]) -> String {
        format!(
            "Write a three-paragraph cover letter for {} applying to {} at {}.\n\n\
             Job description: {}\n\n{}{}\n\n\
             Keep it specific to the role and under 300 words.",
            self.profile.name,
            job.title,
            job.company,
            truncate_chars(&job.description, self.description_chars),
            self.profile_block(),
            keywords_line(keywords)
        )
    }

    /// Best-effort: any failure gives an empty list.
    pub async fn extract_keywords(&self, job: &JobPosting) -> Vec<String> {
        let reply = self.field("keywords", job, self.keywords_prompt(job)).await;
        parse_keywords(&reply)
    }

    async fn field(&self, kind: &'static str, job: &JobPosting, prompt: String) -> String {
        match self.model.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                counter!("scout_generation_failures_total", "kind" => kind).increment(1);
                tracing::warn!(
                    model = self.model.name(),
                    kind,
                    title = %job.title,
                    company = %job.company,
                    error = %e,
                    "generation failed, leaving field empty"
                );
                String::new()
            }
        }
    }
}

fn keywords_line(keywords: &[String]) -> String {
    if keywords.is_empty() {
        String::new()
    } else {
        format!("\nTarget keywords: {}", keywords.join(", "))
    }
}

/// Split a comma-separated model reply, trimmed, empties dropped.
pub fn parse_keywords(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl<M: TextModel + 'static> MaterialGenerator for ModelBackedGenerator<M> {
    async fn customize(&self, job: &JobPosting) -> Materials {
        let keywords = self.extract_keywords(job).await;
        let customized_cv = self.field("cv", job, self.cv_prompt(job, &keywords)).await;
        let cover_letter = self
            .field("cover_letter", job, self.cover_letter_prompt(job, &keywords))
            .await;
        Materials {
            customized_cv,
            cover_letter,
        }
    }

    fn name(&self) -> &'static str {
        self.model.name()
    }
}

/// Leaves every field empty.
pub struct DisabledGenerator;

#[async_trait]
impl MaterialGenerator for DisabledGenerator {
    async fn customize(&self, _job: &JobPosting) -> Materials {
        Materials::default()
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

fn mock_mode() -> bool {
    std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
}

/// Build the generator from config.
///
/// * `AI_TEST_MODE=mock` → mock model, regardless of `enabled`.
/// * `enabled = false` → disabled.
/// * missing key, unknown provider or client build error → disabled, with a warning.
pub fn build_generator(ai: &AiConfig, profile: &CandidateProfile) -> DynGenerator {
    if mock_mode() {
        tracing::info!("AI_TEST_MODE=mock, using mock material generator");
        return Arc::new(ModelBackedGenerator::new(
            MockModel,
            profile.clone(),
            ai.description_chars,
        ));
    }
    if !ai.enabled {
        return Arc::new(DisabledGenerator);
    }

    let key = match ai.resolve_api_key() {
        Ok(k) if !k.is_empty() => k,
        Ok(_) => {
            tracing::warn!(provider = %ai.provider, "empty API key, material generation disabled");
            return Arc::new(DisabledGenerator);
        }
        Err(e) => {
            tracing::warn!(provider = %ai.provider, error = %e, "material generation disabled");
            return Arc::new(DisabledGenerator);
        }
    };

    let built: reqwest::Result<DynGenerator> = match ai.provider_normalized().as_str() {
        "gemini" => GeminiModel::new(key, &ai.model, ai.timeout_secs).map(|m| {
            Arc::new(ModelBackedGenerator::new(
                m,
                profile.clone(),
                ai.description_chars,
            )) as DynGenerator
        }),
        "openai" => OpenAiModel::new(key, &ai.model, ai.timeout_secs).map(|m| {
            Arc::new(ModelBackedGenerator::new(
                m,
                profile.clone(),
                ai.description_chars,
            )) as DynGenerator
        }),
        // resolve_api_key already rejected other providers for "ENV"
        other => {
            tracing::warn!(provider = other, "unknown AI provider, material generation disabled");
            return Arc::new(DisabledGenerator);
        }
    };

    match built {
        Ok(g) => {
            tracing::info!(provider = g.name(), "material generator ready");
            g
        }
        Err(e) => {
            tracing::warn!(error = %e, "AI client build failed, material generation disabled");
            Arc::new(DisabledGenerator)
        }
    }
}
