//! The thumbnail compositor.
//!
//! [`Composer::compose`] runs the fixed pipeline: background, overlay, text,
//! sharpen, JPEG encode, base64. Only encoding (or an internal fault) can
//! fail; a missing photo or font degrades to a fallback instead.

pub mod background;
pub mod bitmap_font;
pub mod color;
pub mod filters;
pub mod overlay;
pub mod text;

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::constants::{CANVAS_HEIGHT, CANVAS_WIDTH, JPEG_QUALITY};
use crate::design::DesignIntent;
use crate::error::ThumbforgeError;
use background::{NoPhotos, PhotoSource, resolve_background};
use text::{FontStack, TextRenderer};

/// An encoded thumbnail.
#[derive(Clone, Debug)]
pub struct RenderedThumbnail {
    /// JPEG bytes.
    pub jpeg: Vec<u8>,
    /// The same bytes, base64 encoded for inline previews.
    pub base64: String,
}

/// Runs the thumbnail pipeline. Holds only immutable configuration, so one
/// instance can serve any number of concurrent requests.
pub struct Composer {
    photos: Arc<dyn PhotoSource>,
    text: TextRenderer,
    seed: Option<u64>,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("text", &self.text)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl Composer {
    /// A composer using `photos` for backgrounds and `fonts` for text.
    pub fn new(photos: Arc<dyn PhotoSource>, fonts: FontStack) -> Self {
        Self {
            photos,
            text: TextRenderer::new(fonts),
            seed: None,
        }
    }

    /// Gradient-only backgrounds and the built-in font. Mostly for tests.
    pub fn offline() -> Self {
        Self::new(Arc::new(NoPhotos), FontStack::builtin())
    }

    /// Fixes the gradient choice so renders are reproducible.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Renders the un-encoded canvas.
    pub fn render(
        &self,
        design: &DesignIntent,
        category: &str,
        title: &str,
        description: &str,
    ) -> RgbImage {
        let seed = self.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        info!("Creating thumbnail: {category}");

        let canvas = resolve_background(
            self.photos.as_ref(),
            &mut rng,
            category,
            title,
            description,
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
        );
        let canvas = overlay::apply_overlay(canvas, &design.colors);
        let canvas = self.text.place_text(canvas, design);
        filters::sharpen(&canvas)
    }

    /// Renders and encodes a thumbnail.
    pub fn compose(
        &self,
        design: &DesignIntent,
        category: &str,
        title: &str,
        description: &str,
    ) -> Result<RenderedThumbnail, ThumbforgeError> {
        let canvas = self.render(design, category, title, description);
        let jpeg = encode_jpeg(&canvas)?;
        let base64 = general_purpose::STANDARD.encode(&jpeg);
        info!("Thumbnail created ({} bytes)", jpeg.len());
        Ok(RenderedThumbnail { jpeg, base64 })
    }
}

/// Encodes a canvas as a quality-95 JPEG.
pub fn encode_jpeg(canvas: &RgbImage) -> Result<Vec<u8>, ThumbforgeError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    canvas.write_with_encoder(encoder)?;
    let bytes = buffer.into_inner();
    debug!("Encoded {}x{} canvas", canvas.width(), canvas.height());
    Ok(bytes)
}
