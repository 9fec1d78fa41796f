//! Content generation: the expanded description, SEO metadata and the
//! thumbnail design document, produced by an OpenAI-compatible chat API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use crate::category::Category;
use crate::constants::{CONTENT_TIMEOUT, OPENAI_API_URL};
use crate::error::ThumbforgeError;

/// One chat request.
#[derive(Clone, Debug, PartialEq)]
pub struct Prompt {
    /// System instructions.
    pub system: String,
    /// User message.
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token cap.
    pub max_tokens: Option<u32>,
}

/// A text completion backend.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Free-text completion.
    async fn generate_text(&self, prompt: &Prompt) -> Result<String, ThumbforgeError>;

    /// JSON-mode completion. Returns the raw document text, which callers
    /// parse themselves so they can decide what a malformed reply means.
    async fn generate_structured(&self, prompt: &Prompt) -> Result<String, ThumbforgeError>;
}

// -----------------------------
// Chat completions API
// -----------------------------

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `POST {base}/chat/completions`.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// A client for `model` against the public API.
    pub fn new(api_key: &str, model: &str) -> Result<Self, ThumbforgeError> {
        Self::with_base_url(api_key, model, OPENAI_API_URL)
    }

    /// A client for any OpenAI-compatible API rooted at `base_url`.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        base_url: &str,
    ) -> Result<Self, ThumbforgeError> {
        let client = reqwest::Client::builder()
            .timeout(CONTENT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn request_body(&self, prompt: &Prompt, json_mode: bool) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user},
            ],
            "temperature": prompt.temperature,
        });
        if let Some(max_tokens) = prompt.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }
        body
    }

    async fn chat(&self, prompt: &Prompt, json_mode: bool) -> Result<String, ThumbforgeError> {
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt, json_mode))
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(ThumbforgeError::ContentGeneration(format!(
                "Chat completions API error {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let parsed: ChatCompletion = serde_json::from_slice(&bytes)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                ThumbforgeError::ContentGeneration("Empty completion returned".to_string())
            })
    }
}

#[async_trait]
impl ContentGenerator for OpenAiClient {
    async fn generate_text(&self, prompt: &Prompt) -> Result<String, ThumbforgeError> {
        self.chat(prompt, false).await
    }

    async fn generate_structured(&self, prompt: &Prompt) -> Result<String, ThumbforgeError> {
        self.chat(prompt, true).await
    }
}

/// Rewrites provider failures into messages fit for end users.
pub fn friendly_error(err: ThumbforgeError) -> ThumbforgeError {
    let ThumbforgeError::ContentGeneration(message) = err else {
        return err;
    };
    let lower = message.to_lowercase();
    let friendly = if lower.contains("authentication") || lower.contains("invalid_api_key") {
        "API key is invalid".to_string()
    } else if lower.contains("quota") {
        "API quota exceeded".to_string()
    } else {
        format!("API error: {}", message.chars().take(100).collect::<String>())
    };
    ThumbforgeError::ContentGeneration(friendly)
}

// -----------------------------
// Prompts
// -----------------------------

const DESCRIBE_SYSTEM: &str = "You are a professional YouTube SEO specialist.";

const SEO_SYSTEM: &str = r#"You are a YouTube SEO specialist.

Task: write striking, SEO-friendly Turkish titles, a description and tags.

Rules:
1. Titles: 3 options, 50-70 characters each, emoji allowed
2. Description: 250-500 words, SEO keywords, hashtags
3. Tags: 10-15 items, no # sign
4. SEO score: between 65 and 95

Output:
{
    "title": ["Title 1", "Title 2", "Title 3"],
    "description": "Description...",
    "tags": ["tag1", "tag2"],
    "seo_score": 85
}"#;

const DESIGN_SYSTEM: &str = r##"You are a thumbnail designer.

Output:
{
    "main_text": "MAIN TITLE",
    "sub_text": "subtitle",
    "text_position": "center",
    "colors": {
        "overlay_start": "#000000",
        "overlay_end": "#1a1a1a",
        "overlay_opacity": 0.6,
        "text_main": "#FFFFFF",
        "text_stroke": "#000000"
    },
    "effects": {
        "text_outline_width": 4
    }
}

Rules:
1. main_text: at most 5 words, UPPER CASE
2. text_position: center/top/bottom/left
3. overlay_opacity: 0.5-0.7
4. High contrast
5. Never use emoji, text only"##;

/// Prompt that expands a short idea into a full video description.
pub fn describe_prompt(category: Category, user_input: &str) -> Prompt {
    Prompt {
        system: DESCRIBE_SYSTEM.to_string(),
        user: format!(
            "A YouTube creator is preparing a video in the '{category}' category.\n\
             The creator's summary: '{user_input}'.\n\
             Turn this summary into an engaging, SEO-friendly Turkish description.\n\
             Return only the description text."
        ),
        temperature: 0.7,
        max_tokens: None,
    }
}

/// Prompt for titles, description, tags and score.
pub fn seo_prompt(category: Category, description: &str) -> Prompt {
    Prompt {
        system: SEO_SYSTEM.to_string(),
        user: format!(
            "Category: {category}\nDetailed description: {description}\n\n\
             Optimize this content for YouTube SEO. Use Turkish characters correctly.\n\
             Answer in JSON."
        ),
        temperature: 0.9,
        max_tokens: Some(2000),
    }
}

/// Prompt for the thumbnail design document.
pub fn design_prompt(category: Category, title: &str, seo_score: u32) -> Prompt {
    Prompt {
        system: DESIGN_SYSTEM.to_string(),
        user: format!(
            "Video category: {category}\nVideo title: {title}\nSEO score: {seo_score}\n\n\
             Create a professional YouTube thumbnail concept.\n\
             IMPORTANT: use this title for main_text: \"{title}\"\n\
             Answer in JSON."
        ),
        temperature: 0.85,
        max_tokens: Some(700),
    }
}

// -----------------------------
// Operations
// -----------------------------

/// Expands the user's idea into a detailed description.
pub async fn expand_description(
    generator: &dyn ContentGenerator,
    category: Category,
    user_input: &str,
) -> Result<String, ThumbforgeError> {
    info!(
        "Expanding description: {category}, {} characters",
        user_input.chars().count()
    );
    let prompt = describe_prompt(category, user_input);
    let description = generator
        .generate_text(&prompt)
        .await
        .map_err(friendly_error)?;
    let description = description.trim();
    if description.is_empty() {
        return Err(ThumbforgeError::ContentGeneration(
            "No description returned".to_string(),
        ));
    }
    info!("Description ready: {} characters", description.chars().count());
    Ok(description.to_string())
}

/// SEO metadata for a video.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SeoReport {
    /// Candidate titles, best first.
    pub title: Vec<String>,
    /// Full video description.
    pub description: String,
    /// Tags without `#`.
    pub tags: Vec<String>,
    /// Estimated SEO score, 0-100.
    pub seo_score: u32,
}

impl SeoReport {
    /// The report used when the model's reply is not a JSON object.
    pub fn unparseable(raw: &str) -> Self {
        Self {
            title: vec!["❌ JSON Hatası".to_string()],
            description: raw.to_string(),
            tags: vec!["hata".to_string()],
            seo_score: 0,
        }
    }

    /// Normalizes a raw JSON reply, filling every missing field.
    pub fn from_reply(raw: &str) -> Self {
        let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(raw) else {
            error!("SEO reply was not a JSON object");
            return Self::unparseable(raw);
        };

        let title = string_list(fields.get("title"))
            .unwrap_or_else(|| vec!["🎯 Başlık Yok".to_string()]);
        let tags = string_list(fields.get("tags"))
            .unwrap_or_else(|| vec!["genel".to_string(), "video".to_string()]);
        let description = fields
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .unwrap_or("Açıklama yok")
            .to_string();
        let seo_score = fields
            .get("seo_score")
            .and_then(score)
            .unwrap_or_else(|| estimate_score(&title, &tags, &description));

        Self {
            title,
            description,
            tags,
            seo_score,
        }
    }
}

/// Score for replies that left it out.
pub fn estimate_score(titles: &[String], tags: &[String], description: &str) -> u32 {
    let mut score = 50;
    if titles.len() >= 3 {
        score += 10;
    }
    if tags.len() >= 10 {
        score += 12;
    }
    if description.split_whitespace().count() >= 250 {
        score += 15;
    }
    score.min(95)
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = match value? {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .filter(|text| !text.is_empty())
            .collect(),
        Value::String(text) if !text.trim().is_empty() => vec![text.trim().to_string()],
        _ => Vec::new(),
    };
    (!items.is_empty()).then_some(items)
}

fn score(value: &Value) -> Option<u32> {
    let score = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };
    score.is_finite().then(|| score.clamp(0.0, 100.0).round() as u32)
}

/// Generates and normalizes SEO metadata.
pub async fn generate_seo(
    generator: &dyn ContentGenerator,
    category: Category,
    description: &str,
) -> Result<SeoReport, ThumbforgeError> {
    let prompt = seo_prompt(category, description);
    let raw = generator
        .generate_structured(&prompt)
        .await
        .map_err(friendly_error)?;
    let report = SeoReport::from_reply(&raw);
    info!("SEO ready, score {}", report.seo_score);
    Ok(report)
}

/// Fills the design fields the prompt asks for but models sometimes skip.
pub fn with_design_defaults(mut design: Map<String, Value>) -> Map<String, Value> {
    design
        .entry("text_position")
        .or_insert_with(|| json!("center"));
    design.entry("effects").or_insert_with(|| {
        json!({"glow": true, "shadow_intensity": 0.8, "text_outline_width": 4})
    });
    design
}

/// Generates a thumbnail design document for `title`.
pub async fn generate_design(
    generator: &dyn ContentGenerator,
    category: Category,
    title: &str,
    seo_score: u32,
) -> Result<Value, ThumbforgeError> {
    let prompt = design_prompt(category, title, seo_score);
    let raw = generator
        .generate_structured(&prompt)
        .await
        .map_err(friendly_error)?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(design)) => {
            info!("Thumbnail design received");
            Ok(Value::Object(with_design_defaults(design)))
        }
        _ => {
            warn!("Thumbnail design reply was not a JSON object");
            Err(ThumbforgeError::ContentGeneration(
                "Design could not be created".to_string(),
            ))
        }
    }
}
