//! Shared constants

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

/// Width of every rendered thumbnail, in pixels.
pub const CANVAS_WIDTH: u32 = 1280;

/// Height of every rendered thumbnail, in pixels.
pub const CANVAS_HEIGHT: u32 = 720;

/// JPEG quality used for the final encode.
pub const JPEG_QUALITY: u8 = 95;

/// Horizontal room reserved around the title when fitting the font size.
pub const TITLE_SIDE_MARGIN: u32 = 120;

/// Size the title font is first measured at.
pub const TITLE_TRIAL_SIZE: f32 = 110.0;

/// Extra shrink applied on top of the exact fit ratio.
pub const TITLE_FIT_FACTOR: f32 = 0.85;

/// Smallest font size the fitter will go down to.
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Subtitle font size.
pub const SUBTITLE_SIZE: f32 = 55.0;

/// Stroke radius used for the subtitle outline.
pub const SUBTITLE_STROKE: u32 = 3;

/// Vertical gap between the title block and the subtitle.
pub const SUBTITLE_GAP: i32 = 30;

/// Upper bound for the title outline radius.
pub const MAX_OUTLINE_WIDTH: u32 = 20;

/// Title placed when the design has no usable `main_text`.
pub const PLACEHOLDER_TITLE: &str = "BAŞLIK";

/// Timeout applied to each stock-photo HTTP call.
pub const PHOTO_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout applied to content generation calls.
pub const CONTENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default Unsplash API root.
pub const UNSPLASH_API_URL: &str = "https://api.unsplash.com";

/// Default OpenAI-compatible API root.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Longest free-text idea accepted by the describe endpoint.
pub const MAX_INPUT_CHARS: usize = 1000;

/// Shortest free-text idea accepted by the describe endpoint.
pub const MIN_INPUT_CHARS: usize = 10;

/// Longest user-supplied thumbnail title.
pub const MAX_CUSTOM_TITLE_CHARS: usize = 50;

/// SEO score assumed when a design request does not carry one.
pub const DEFAULT_SEO_SCORE: u32 = 80;

/// Filename offered for thumbnail downloads.
pub const DOWNLOAD_FILENAME: &str = "youtube_thumbnail.jpg";

/// Font files tried in order when none are configured.
pub static DEFAULT_FONT_PATHS: LazyLock<Vec<PathBuf>> = LazyLock::new(|| {
    [
        "C:\\Windows\\Fonts\\impact.ttf",
        "C:\\Windows\\Fonts\\IMPACTED.TTF",
        "C:\\Windows\\Fonts\\ariblk.ttf",
        "C:\\Windows\\Fonts\\ARLRDBD.TTF",
        "C:\\Windows\\Fonts\\calibrib.ttf",
        "C:\\Windows\\Fonts\\BAUHS93.TTF",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/System/Library/Fonts/Impact.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
});
