//! Font resolution, size fitting, anchoring and outlined text rendering.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use image::{GrayImage, Rgb, RgbImage};
use rusttype::{Font, Scale, point};
use tracing::{debug, info};

use super::bitmap_font::BitmapFace;
use super::color::{TextBox, blend_over};
use crate::constants::{
    MIN_FONT_SIZE, SUBTITLE_GAP, SUBTITLE_SIZE, SUBTITLE_STROKE, TITLE_FIT_FACTOR,
    TITLE_SIDE_MARGIN, TITLE_TRIAL_SIZE,
};
use crate::design::{DesignIntent, TextPosition};

/// Rasterized coverage of a run of text, positioned relative to a draw origin.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphMask {
    bounds: TextBox,
    coverage: GrayImage,
}

impl GlyphMask {
    /// Wraps a coverage buffer whose top-left sits at `bounds.left, bounds.top`.
    pub fn new(bounds: TextBox, coverage: GrayImage) -> Self {
        Self { bounds, coverage }
    }

    /// A mask with no ink.
    pub fn empty() -> Self {
        Self::new(TextBox::default(), GrayImage::new(0, 0))
    }

    /// Ink bounding box relative to the draw origin.
    pub fn bounds(&self) -> TextBox {
        self.bounds
    }

    /// Coverage buffer, one byte of alpha per pixel of the ink box.
    pub fn coverage(&self) -> &GrayImage {
        &self.coverage
    }

    /// True when nothing would be drawn.
    pub fn is_empty(&self) -> bool {
        self.bounds.width == 0 || self.bounds.height == 0
    }

    /// Alpha-blends the mask onto the canvas in `color`, origin at `(x, y)`.
    /// Pixels falling outside the canvas are skipped.
    pub fn stamp(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);
        for (mx, my, coverage) in self.coverage.enumerate_pixels() {
            let alpha = coverage[0];
            if alpha == 0 {
                continue;
            }
            let px = x + self.bounds.left + mx as i32;
            let py = y + self.bounds.top + my as i32;
            if px < 0 || py < 0 || px >= width || py >= height {
                continue;
            }
            blend_over(canvas.get_pixel_mut(px as u32, py as u32), color, alpha);
        }
    }

    /// Stamps the outline (every offset within `radius`) in `stroke`, then the
    /// fill once on top.
    pub fn stamp_outlined(
        &self,
        canvas: &mut RgbImage,
        x: i32,
        y: i32,
        radius: u32,
        fill: Rgb<u8>,
        stroke: Rgb<u8>,
    ) {
        let r = radius as i32;
        for dx in -r..=r {
            for dy in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.stamp(canvas, x + dx, y + dy, stroke);
                }
            }
        }
        self.stamp(canvas, x, y, fill);
    }
}

/// A font loaded at a particular size.
pub trait Face: Send {
    /// Nominal pixel size.
    fn size(&self) -> f32;
    /// The same typeface at another size.
    fn resized(&self, size: f32) -> Box<dyn Face>;
    /// Rasterizes `text` with its ascender line at the origin.
    fn rasterize(&self, text: &str) -> GlyphMask;
}

/// Something that may be able to produce a [`Face`].
pub trait FontProvider: Send + Sync + fmt::Debug {
    /// Human readable name for logs.
    fn name(&self) -> String;
    /// Loads the font at `size`, or `None` when the resource is unusable.
    fn load(&self, size: f32) -> Option<Box<dyn Face>>;
}

/// A TrueType/OpenType file on disk.
#[derive(Clone, Debug)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    /// A provider for the font at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FontProvider for FontFile {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self, size: f32) -> Option<Box<dyn Face>> {
        if !size.is_finite() || size <= 0.0 {
            return None;
        }
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("Font {} unavailable: {}", self.path.display(), err);
                return None;
            }
        };
        let Some(font) = Font::try_from_vec(bytes) else {
            debug!("Font {} could not be parsed", self.path.display());
            return None;
        };
        Some(Box::new(OutlineFace {
            font: Arc::new(font),
            size,
        }))
    }
}

/// The built-in bitmap font. Always loads.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinFont;

impl FontProvider for BuiltinFont {
    fn name(&self) -> String {
        "built-in bitmap".to_string()
    }

    fn load(&self, size: f32) -> Option<Box<dyn Face>> {
        Some(Box::new(BitmapFace::new(size)))
    }
}

struct OutlineFace {
    font: Arc<Font<'static>>,
    size: f32,
}

impl Face for OutlineFace {
    fn size(&self) -> f32 {
        self.size
    }

    fn resized(&self, size: f32) -> Box<dyn Face> {
        Box::new(OutlineFace {
            font: Arc::clone(&self.font),
            size: size.max(MIN_FONT_SIZE),
        })
    }

    fn rasterize(&self, text: &str) -> GlyphMask {
        let scale = Scale::uniform(self.size);
        let ascent = self.font.v_metrics(scale).ascent;
        let glyphs: Vec<_> = self.font.layout(text, scale, point(0.0, ascent)).collect();

        let mut extent: Option<(i32, i32, i32, i32)> = None;
        for bb in glyphs.iter().filter_map(|glyph| glyph.pixel_bounding_box()) {
            extent = Some(match extent {
                None => (bb.min.x, bb.min.y, bb.max.x, bb.max.y),
                Some((x0, y0, x1, y1)) => (
                    x0.min(bb.min.x),
                    y0.min(bb.min.y),
                    x1.max(bb.max.x),
                    y1.max(bb.max.y),
                ),
            });
        }
        let Some((x0, y0, x1, y1)) = extent else {
            return GlyphMask::empty();
        };

        let bounds = TextBox {
            left: x0,
            top: y0,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        };
        let mut coverage = GrayImage::new(bounds.width, bounds.height);
        for glyph in &glyphs {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, value| {
                let cx = (bb.min.x - x0) as u32 + gx;
                let cy = (bb.min.y - y0) as u32 + gy;
                if cx >= bounds.width || cy >= bounds.height {
                    return;
                }
                let value = (value * 255.0).round().clamp(0.0, 255.0) as u8;
                let pixel = coverage.get_pixel_mut(cx, cy);
                pixel[0] = pixel[0].max(value);
            });
        }
        GlyphMask::new(bounds, coverage)
    }
}

/// Ranked font providers, tried in order on every render.
#[derive(Debug)]
pub struct FontStack {
    providers: Vec<Box<dyn FontProvider>>,
}

impl FontStack {
    /// Providers tried in the given order, before the built-in font.
    pub fn new(providers: Vec<Box<dyn FontProvider>>) -> Self {
        Self { providers }
    }

    /// One [`FontFile`] per path, in order.
    pub fn from_paths<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self::new(
            paths
                .into_iter()
                .map(|path| Box::new(FontFile::new(path)) as Box<dyn FontProvider>)
                .collect(),
        )
    }

    /// Only the built-in font.
    pub fn builtin() -> Self {
        Self::new(Vec::new())
    }

    /// First provider that loads at `size`, falling back to the built-in font.
    pub fn resolve(&self, size: f32) -> Box<dyn Face> {
        for provider in &self.providers {
            if let Some(face) = provider.load(size) {
                info!("Font loaded: {}", provider.name());
                return face;
            }
        }
        info!("No font file could be loaded, using the built-in font");
        Box::new(BitmapFace::new(size))
    }
}

/// Shrinks `face` until `text` fits in `max_width`.
///
/// The first step jumps straight to `size * (max_width / measured) * 0.85`;
/// further 10% steps only happen if hinting kept the run too wide.
pub fn fit_to_width(face: Box<dyn Face>, text: &str, max_width: u32) -> Box<dyn Face> {
    let measured = face.rasterize(text).bounds().width;
    if measured <= max_width {
        return face;
    }
    let ratio = max_width as f32 / measured as f32;
    let mut size = (face.size() * ratio * TITLE_FIT_FACTOR)
        .floor()
        .max(MIN_FONT_SIZE);
    loop {
        let candidate = face.resized(size);
        let width = candidate.rasterize(text).bounds().width;
        if width <= max_width || size <= MIN_FONT_SIZE {
            debug!("Fitted {:?} at {}px ({}px wide)", text, size, width);
            return candidate;
        }
        size = (size * 0.9).floor().max(MIN_FONT_SIZE);
    }
}

/// Top-left corner of an ink box of `width` x `height` under `position`.
pub fn anchor(
    position: TextPosition,
    width: u32,
    height: u32,
    canvas_width: u32,
    canvas_height: u32,
) -> (i32, i32) {
    let (w, h) = (width as i32, height as i32);
    let (cw, ch) = (canvas_width as i32, canvas_height as i32);
    let centered_x = (cw - w) / 2;
    let centered_y = (ch - h) / 2;
    match position {
        TextPosition::Center => (centered_x, centered_y),
        TextPosition::Top => (centered_x, 80),
        TextPosition::Bottom => (centered_x, ch - h - 100),
        TextPosition::Left => (80, centered_y),
    }
}

/// A run of text ready to be stamped.
pub struct PlacedText {
    /// The rasterized run.
    pub mask: GlyphMask,
    /// Draw origin x.
    pub x: i32,
    /// Draw origin y.
    pub y: i32,
    /// Outline radius.
    pub stroke: u32,
    /// Size the run was rasterized at.
    pub size: f32,
}

impl PlacedText {
    /// Canvas-space ink box including the outline.
    pub fn ink(&self) -> TextBox {
        let bounds = self.mask.bounds();
        TextBox {
            left: self.x + bounds.left,
            top: self.y + bounds.top,
            ..bounds
        }
        .inflate(self.stroke)
    }
}

/// Resolved placement of the title and optional subtitle.
pub struct TextPlan {
    /// The upper-cased title.
    pub title: PlacedText,
    /// The subtitle, when the design has one.
    pub subtitle: Option<PlacedText>,
}

/// Lays out and paints the design's text.
#[derive(Debug)]
pub struct TextRenderer {
    fonts: FontStack,
}

impl TextRenderer {
    /// A renderer that resolves `fonts` on every call.
    pub fn new(fonts: FontStack) -> Self {
        Self { fonts }
    }

    /// Works out fonts and positions without touching any pixels.
    pub fn plan(&self, design: &DesignIntent, canvas_width: u32, canvas_height: u32) -> TextPlan {
        let max_width = canvas_width.saturating_sub(TITLE_SIDE_MARGIN);
        let base = self.fonts.resolve(TITLE_TRIAL_SIZE);
        let subtitle_face = base.resized(SUBTITLE_SIZE);

        let title_face = fit_to_width(base, &design.main_text, max_width);
        let mask = title_face.rasterize(&design.main_text);
        let bounds = mask.bounds();
        let (left, top) = anchor(
            design.text_position,
            bounds.width,
            bounds.height,
            canvas_width,
            canvas_height,
        );
        let title = PlacedText {
            x: left - bounds.left,
            y: top - bounds.top,
            stroke: design.effects.text_outline_width,
            size: title_face.size(),
            mask,
        };

        let subtitle = design.sub_text.as_deref().and_then(|sub_text| {
            let face = fit_to_width(subtitle_face, sub_text, max_width);
            let mask = face.rasterize(sub_text);
            if mask.is_empty() {
                return None;
            }
            let sub_bounds = mask.bounds();
            let sub_left = (canvas_width as i32 - sub_bounds.width as i32) / 2;
            let sub_top = top + bounds.height as i32 + SUBTITLE_GAP;
            Some(PlacedText {
                x: sub_left - sub_bounds.left,
                y: sub_top - sub_bounds.top,
                stroke: SUBTITLE_STROKE,
                size: face.size(),
                mask,
            })
        });

        TextPlan { title, subtitle }
    }

    /// Draws the title and subtitle, outline first.
    pub fn place_text(&self, canvas: RgbImage, design: &DesignIntent) -> RgbImage {
        let mut canvas = canvas;
        let plan = self.plan(design, canvas.width(), canvas.height());
        let colors = &design.colors;
        for text in std::iter::once(&plan.title).chain(plan.subtitle.as_ref()) {
            text.mask.stamp_outlined(
                &mut canvas,
                text.x,
                text.y,
                text.stroke,
                colors.text_main,
                colors.text_stroke,
            );
        }
        info!(
            "Text placed at {}px ({:?})",
            plan.title.size, design.text_position
        );
        canvas
    }
}
