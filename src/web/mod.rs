//! HTTP API.

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

use crate::constants::MAX_BODY_BYTES;
use crate::content::ContentGenerator;
use crate::error::ThumbforgeError;
use crate::thumbnail::Composer;

mod api;
mod images;
mod prelude;

use api::{
    describe_handler, design_handler, download_handler, health_handler, seo_handler,
    thumbnail_handler,
};

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    composer: Arc<Composer>,
    content: Option<Arc<dyn ContentGenerator>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("composer", &self.composer)
            .field("content", &self.content.is_some())
            .finish()
    }
}

impl AppState {
    /// State for a server rendering with `composer`. Without `content` the
    /// generation endpoints answer 503 and thumbnails need an explicit design.
    pub fn new(composer: Composer, content: Option<Arc<dyn ContentGenerator>>) -> Self {
        Self {
            composer: Arc::new(composer),
            content,
        }
    }

    pub(crate) fn content(&self) -> Result<&dyn ContentGenerator, ThumbforgeError> {
        self.content
            .as_deref()
            .ok_or(ThumbforgeError::ContentUnavailable)
    }
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/describe", post(describe_handler))
        .route("/api/seo", post(seo_handler))
        .route("/api/design", post(design_handler))
        .route("/api/thumbnail", post(thumbnail_handler))
        .route("/api/thumbnail/download", post(download_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
    }
    info!("Shutting down");
}

/// Serves the API on `listen_addr:port` until interrupted.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    state: AppState,
) -> Result<(), anyhow::Error> {
    let app = create_router().with_state(state);

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
    use axum::http::{Request, StatusCode};
    use base64::Engine;
    use base64::engine::general_purpose;
    use http_body_util::BodyExt;
    use image::GenericImageView;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::content::tests::CannedGenerator;

    const DESIGN_REPLY: &str = r##"{"main_text": "OYUN GECESİ", "colors": {"overlay_opacity": 0.6}}"##;

    fn offline_state() -> AppState {
        AppState::new(Composer::offline().with_seed(Some(5)), None)
    }

    fn canned_state(generator: &Arc<CannedGenerator>) -> AppState {
        let content: Arc<dyn ContentGenerator> = generator.clone();
        AppState::new(Composer::offline().with_seed(Some(5)), Some(content))
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_body(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes()
            .to_vec()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        serde_json::from_slice(&read_body(response).await).expect("json body")
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = create_router().with_state(offline_state());
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_body(response).await, b"ok");
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let app = create_router().with_state(offline_state());
        let request = json_request(
            "/api/describe",
            json!({"category": "Cooking", "user_input": "a long enough idea"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        let error = body["error"].as_str().expect("error message");
        assert!(error.contains("Unknown category: Cooking"), "{error}");
    }

    #[tokio::test]
    async fn malformed_json_gets_a_json_error() {
        let app = create_router().with_state(offline_state());
        let request = Request::builder()
            .method("POST")
            .uri("/api/seo")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{\"category\": "))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["error"].is_string(), "{body}");
    }

    #[tokio::test]
    async fn missing_category_gets_a_json_error() {
        let app = create_router().with_state(offline_state());
        let request = json_request("/api/design", json!({"title": "Başlık"}));
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        let error = body["error"].as_str().expect("error message");
        assert!(error.contains("category"), "{error}");
    }

    #[tokio::test]
    async fn missing_content_type_gets_a_json_error() {
        let app = create_router().with_state(offline_state());
        let request = Request::builder()
            .method("POST")
            .uri("/api/thumbnail")
            .body(Body::from(json!({"category": "Vlog"}).to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(read_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn short_input_is_rejected_before_generation() {
        let app = create_router().with_state(offline_state());
        let request = json_request(
            "/api/describe",
            json!({"category": "Vlog", "user_input": "  <b>kısa</b> "}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn generation_without_backend_is_unavailable() {
        let app = create_router().with_state(offline_state());
        let request = json_request(
            "/api/describe",
            json!({"category": "Vlog", "user_input": "sabah rutinim ve kahvaltı"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn describe_returns_generated_text() {
        let generator = Arc::new(CannedGenerator::new("Detaylı açıklama.", "{}"));
        let app = create_router().with_state(canned_state(&generator));
        let request = json_request(
            "/api/describe",
            json!({"category": "Eğitim", "user_input": "onclick=rust dersleri"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["description"], "Detaylı açıklama.");
        let prompts = generator.prompts.lock().expect("lock");
        assert!(prompts[0].user.contains("'rust dersleri'"));
    }

    #[tokio::test]
    async fn seo_report_is_normalized() {
        let generator = Arc::new(CannedGenerator::new("", r#"{"title": "Tek"}"#));
        let app = create_router().with_state(canned_state(&generator));
        let request = json_request(
            "/api/seo",
            json!({"category": "Yemek", "description": "Ev yapımı makarna tarifi"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["title"], json!(["Tek"]));
        assert_eq!(body["tags"], json!(["genel", "video"]));
        assert_eq!(body["seo_score"], 50);
    }

    #[tokio::test]
    async fn design_endpoint_fills_defaults() {
        let generator = Arc::new(CannedGenerator::new("", DESIGN_REPLY));
        let app = create_router().with_state(canned_state(&generator));
        let request = json_request(
            "/api/design",
            json!({"category": "Oyun", "title": "Oyun gecesi"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["text_position"], "center");
        let prompts = generator.prompts.lock().expect("lock");
        assert!(prompts[0].user.contains("SEO score: 80"));
    }

    #[tokio::test]
    async fn thumbnail_with_explicit_design_needs_no_backend() {
        let app = create_router().with_state(offline_state());
        let design = json!({"main_text": "TEST VIDEO", "text_position": "bottom"});
        let request = json_request(
            "/api/thumbnail",
            json!({"category": "Teknoloji", "title": "Test video", "design": design}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["design_data"], design);

        let jpeg = general_purpose::STANDARD
            .decode(body["image_base64"].as_str().expect("base64 string"))
            .expect("valid base64");
        let decoded = image::load_from_memory(&jpeg).expect("valid jpeg");
        assert_eq!(decoded.dimensions(), (1280, 720));
    }

    #[tokio::test]
    async fn thumbnail_without_design_or_backend_is_unavailable() {
        let app = create_router().with_state(offline_state());
        let request = json_request(
            "/api/thumbnail",
            json!({"category": "Vlog", "title": "Günlük"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn thumbnail_without_title_is_rejected() {
        let app = create_router().with_state(offline_state());
        let request = json_request(
            "/api/thumbnail",
            json!({"category": "Vlog", "title": "  ", "custom_title": "<>", "design": {}}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn custom_title_drives_design_generation() {
        let generator = Arc::new(CannedGenerator::new("", DESIGN_REPLY));
        let app = create_router().with_state(canned_state(&generator));
        let request = json_request(
            "/api/thumbnail",
            json!({
                "category": "Oyun",
                "title": "Eski başlık",
                "custom_title": "<i>Yeni başlık</i>",
                "seo_score": 91,
            }),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["design_data"]["main_text"], "OYUN GECESİ");
        assert_eq!(
            body["design_data"]["effects"]["text_outline_width"],
            4
        );
        let prompts = generator.prompts.lock().expect("lock");
        assert!(prompts[0].user.contains("\"iYeni başlık/i\""));
        assert!(prompts[0].user.contains("SEO score: 91"));
    }

    #[tokio::test]
    async fn download_is_a_jpeg_attachment() {
        let app = create_router().with_state(offline_state());
        let request = json_request(
            "/api/thumbnail/download",
            json!({"category": "Spor", "title": "Maç özeti", "design": {"main_text": "GOL"}}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(headers[CONTENT_TYPE], "image/jpeg");
        assert_eq!(headers[CACHE_CONTROL], "no-store");
        assert_eq!(
            headers[CONTENT_DISPOSITION],
            "attachment; filename=\"youtube_thumbnail.jpg\""
        );
        let body = read_body(response).await;
        assert_eq!(headers[CONTENT_LENGTH], body.len().to_string().as_str());
        assert_eq!(&body[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn download_requires_a_design() {
        let app = create_router().with_state(offline_state());
        let request = json_request(
            "/api/thumbnail/download",
            json!({"category": "Spor", "title": "Maç özeti"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_bodies_are_refused() {
        let app = create_router().with_state(offline_state());
        let body = vec![b' '; MAX_BODY_BYTES + 1];
        let request = Request::builder()
            .method("POST")
            .uri("/api/thumbnail")
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
