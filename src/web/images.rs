use axum::body::Body;
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::response::Builder;
use axum::response::Response;

use crate::constants::DOWNLOAD_FILENAME;
use crate::error::ThumbforgeError;

/// Rendered thumbnails are one-offs, never cache them.
const DOWNLOAD_CACHE_CONTROL: &str = "no-store";

/// Applies the download headers to a response builder.
pub(crate) fn apply_download_headers(builder: Builder, length: usize) -> Builder {
    builder
        .header(CONTENT_TYPE, "image/jpeg")
        .header(CONTENT_LENGTH, length)
        .header(CACHE_CONTROL, DOWNLOAD_CACHE_CONTROL)
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
        )
}

/// A JPEG served as a file download.
pub(crate) fn jpeg_attachment(jpeg: Vec<u8>) -> Result<Response, ThumbforgeError> {
    let builder = Response::builder().status(StatusCode::OK);
    apply_download_headers(builder, jpeg.len())
        .body(Body::from(jpeg))
        .map_err(ThumbforgeError::from)
}
