//! Design intent: the text, colour and layout hints a thumbnail is rendered from.
//!
//! The document arrives as loosely-typed JSON from the content service, so
//! [`DesignIntent::from_value`] resolves it once into a fully-populated
//! structure. Nothing downstream ever looks at the raw JSON again.

use image::Rgb;
use serde_json::Value;

use crate::constants::{MAX_OUTLINE_WIDTH, PLACEHOLDER_TITLE};
use crate::thumbnail::color::parse_hex;

/// Where the title block is anchored on the canvas.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TextPosition {
    /// Centered on both axes.
    #[default]
    Center,
    /// Horizontally centered, pinned near the top edge.
    Top,
    /// Horizontally centered, pinned near the bottom edge.
    Bottom,
    /// Left margin, vertically centered. Unrecognized positions land here too.
    Left,
}

impl TextPosition {
    /// Resolves a raw `text_position` value. Absent means center, anything
    /// unrecognized behaves like left.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return Self::Center;
        };
        match value.as_str().map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("center") => Self::Center,
            Some("top") => Self::Top,
            Some("bottom") => Self::Bottom,
            _ => Self::Left,
        }
    }
}

/// Overlay and text colours.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorSpec {
    /// Overlay colour at the top row.
    pub overlay_start: Rgb<u8>,
    /// Overlay colour at the bottom row.
    pub overlay_end: Rgb<u8>,
    /// Base overlay opacity in `[0, 1]`.
    pub overlay_opacity: f32,
    /// Text fill colour.
    pub text_main: Rgb<u8>,
    /// Text outline colour.
    pub text_stroke: Rgb<u8>,
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self {
            overlay_start: Rgb([0, 0, 0]),
            overlay_end: Rgb([0, 0, 0]),
            overlay_opacity: 0.75,
            text_main: Rgb([255, 255, 255]),
            text_stroke: Rgb([0, 0, 0]),
        }
    }
}

impl ColorSpec {
    /// Resolves the `colors` object, defaulting each field on its own.
    pub fn from_value(value: Option<&Value>) -> Self {
        let defaults = Self::default();
        let Some(colors) = value.and_then(Value::as_object) else {
            return defaults;
        };
        let color = |key: &str, fallback: Rgb<u8>| {
            colors
                .get(key)
                .and_then(Value::as_str)
                .and_then(parse_hex)
                .unwrap_or(fallback)
        };
        let overlay_opacity = colors
            .get("overlay_opacity")
            .and_then(number)
            .filter(|opacity| opacity.is_finite())
            .map(|opacity| opacity.clamp(0.0, 1.0) as f32)
            .unwrap_or(defaults.overlay_opacity);

        Self {
            overlay_start: color("overlay_start", defaults.overlay_start),
            overlay_end: color("overlay_end", defaults.overlay_end),
            overlay_opacity,
            text_main: color("text_main", defaults.text_main),
            text_stroke: color("text_stroke", defaults.text_stroke),
        }
    }
}

/// Text effects the compositor honours.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Effects {
    /// Outline radius of the title, in pixels.
    pub text_outline_width: u32,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            text_outline_width: 7,
        }
    }
}

impl Effects {
    /// Resolves the `effects` object.
    pub fn from_value(value: Option<&Value>) -> Self {
        let text_outline_width = value
            .and_then(|effects| effects.get("text_outline_width"))
            .and_then(number)
            .filter(|width| width.is_finite())
            .map(|width| width.clamp(0.0, MAX_OUTLINE_WIDTH as f64) as u32)
            .unwrap_or(Self::default().text_outline_width);
        Self { text_outline_width }
    }
}

/// A fully resolved design intent.
#[derive(Clone, Debug, PartialEq)]
pub struct DesignIntent {
    /// Title, already upper-cased.
    pub main_text: String,
    /// Optional secondary line, never empty when present.
    pub sub_text: Option<String>,
    /// Anchor of the text block.
    pub text_position: TextPosition,
    /// Overlay and text colours.
    pub colors: ColorSpec,
    /// Text effects.
    pub effects: Effects,
}

impl Default for DesignIntent {
    fn default() -> Self {
        Self {
            main_text: PLACEHOLDER_TITLE.to_string(),
            sub_text: None,
            text_position: TextPosition::default(),
            colors: ColorSpec::default(),
            effects: Effects::default(),
        }
    }
}

impl DesignIntent {
    /// Normalizes a raw design document. Never fails: every missing or
    /// malformed field falls back to its default.
    pub fn from_value(value: &Value) -> Self {
        let main_text = value
            .get("main_text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(PLACEHOLDER_TITLE)
            .to_uppercase();
        let sub_text = value
            .get("sub_text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        Self {
            main_text,
            sub_text,
            text_position: TextPosition::from_value(value.get("text_position")),
            colors: ColorSpec::from_value(value.get("colors")),
            effects: Effects::from_value(value.get("effects")),
        }
    }
}

// Numbers sometimes come back quoted.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
