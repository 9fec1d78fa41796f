use super::images::jpeg_attachment;
use super::prelude::*;
use crate::constants::{
    DEFAULT_SEO_SCORE, MAX_CUSTOM_TITLE_CHARS, MAX_INPUT_CHARS, MIN_INPUT_CHARS,
};
use crate::content::{self, SeoReport};
use crate::design::DesignIntent;
use crate::sanitize::sanitize_input;
use crate::thumbnail::RenderedThumbnail;
use axum::extract::FromRequest;
use axum::response::Response;

/// `Json` whose rejections answer with the API's JSON error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ThumbforgeError))]
pub(crate) struct ApiJson<T>(pub(crate) T);

#[derive(Deserialize)]
pub(crate) struct DescribeRequest {
    category: Category,
    #[serde(default)]
    user_input: String,
}

pub(crate) async fn describe_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DescribeRequest>,
) -> Result<Json<Value>, ThumbforgeError> {
    let category = request.category;
    let user_input = sanitize_input(&request.user_input, MAX_INPUT_CHARS);
    if user_input.chars().count() < MIN_INPUT_CHARS {
        return Err(ThumbforgeError::BadRequest(format!(
            "Please enter at least {MIN_INPUT_CHARS} characters"
        )));
    }
    let description =
        content::expand_description(state.content()?, category, &user_input).await?;
    Ok(Json(json!({ "description": description })))
}

#[derive(Deserialize)]
pub(crate) struct SeoRequest {
    category: Category,
    #[serde(default)]
    description: String,
}

pub(crate) async fn seo_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SeoRequest>,
) -> Result<Json<SeoReport>, ThumbforgeError> {
    let category = request.category;
    let description = request.description.trim();
    if description.is_empty() {
        return Err(ThumbforgeError::BadRequest(
            "Description is required".to_string(),
        ));
    }
    let report = content::generate_seo(state.content()?, category, description).await?;
    Ok(Json(report))
}

#[derive(Deserialize)]
pub(crate) struct DesignRequest {
    category: Category,
    #[serde(default)]
    title: String,
    seo_score: Option<u32>,
}

pub(crate) async fn design_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DesignRequest>,
) -> Result<Json<Value>, ThumbforgeError> {
    let category = request.category;
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ThumbforgeError::BadRequest("Title is required".to_string()));
    }
    let design = content::generate_design(
        state.content()?,
        category,
        title,
        request.seo_score.unwrap_or(DEFAULT_SEO_SCORE),
    )
    .await?;
    Ok(Json(design))
}

#[derive(Deserialize)]
pub(crate) struct ThumbnailRequest {
    category: Category,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    custom_title: Option<String>,
    seo_score: Option<u32>,
    design: Option<Value>,
}

impl ThumbnailRequest {
    /// The sanitized custom title when one was given, else the plain title.
    fn resolved_title(&self) -> String {
        self.custom_title
            .as_deref()
            .map(|title| sanitize_input(title, MAX_CUSTOM_TITLE_CHARS))
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| self.title.trim().to_string())
    }
}

async fn render(
    state: &AppState,
    design: &Value,
    category: Category,
    title: String,
    description: String,
) -> Result<RenderedThumbnail, ThumbforgeError> {
    let intent = DesignIntent::from_value(design);
    let composer = Arc::clone(&state.composer);
    tokio::task::spawn_blocking(move || {
        composer.compose(&intent, category.as_str(), &title, &description)
    })
    .await?
}

pub(crate) async fn thumbnail_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ThumbnailRequest>,
) -> Result<Json<Value>, ThumbforgeError> {
    let category = request.category;
    let title = request.resolved_title();
    if title.is_empty() {
        warn!("Thumbnail requested without a title");
        return Err(ThumbforgeError::BadRequest("Title is required".to_string()));
    }

    let design = match request.design {
        Some(design) => design,
        None => {
            let seo_score = request.seo_score.unwrap_or(DEFAULT_SEO_SCORE);
            content::generate_design(state.content()?, category, &title, seo_score).await?
        }
    };

    let rendered = render(&state, &design, category, title, request.description).await?;
    info!("Thumbnail preview ready");
    Ok(Json(json!({
        "success": true,
        "image_base64": rendered.base64,
        "design_data": design,
    })))
}

pub(crate) async fn download_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ThumbnailRequest>,
) -> Result<Response, ThumbforgeError> {
    let category = request.category;
    let title = request.resolved_title();
    let Some(design) = request.design else {
        warn!("Download requested without a design");
        return Err(ThumbforgeError::BadRequest("Design is required".to_string()));
    };

    let rendered = render(&state, &design, category, title, request.description).await?;
    info!("Thumbnail downloaded");
    jpeg_attachment(rendered.jpeg)
}

pub(crate) async fn health_handler() -> &'static str {
    "ok"
}
