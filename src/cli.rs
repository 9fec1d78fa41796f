//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::constants::{DEFAULT_FONT_PATHS, DEFAULT_MODEL, OPENAI_API_URL};
use crate::content::{ContentGenerator, OpenAiClient};
use crate::stock_photo::UnsplashClient;
use crate::thumbnail::Composer;
use crate::thumbnail::background::{NoPhotos, PhotoSource};
use crate::thumbnail::text::FontStack;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "THUMBFORGE_DEBUG")]
    /// Enable debug logging. Env: THUMBFORGE_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "5000", env = "THUMBFORGE_PORT")]
    /// http listener, defaults to `5000`.
    /// Env: THUMBFORGE_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "THUMBFORGE_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: THUMBFORGE_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(flatten)]
    /// Rendering and content backends
    pub backends: BackendOptions,
}

/// Options shared by the server and the offline renderer.
#[derive(clap::Args, Debug, Clone)]
pub struct BackendOptions {
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    /// API key for content generation. Without it the generation endpoints
    /// answer 503. Env: OPENAI_API_KEY
    pub openai_api_key: Option<String>,
    #[clap(long, default_value = OPENAI_API_URL, env = "OPENAI_BASE_URL")]
    /// Root of the OpenAI-compatible API. Env: OPENAI_BASE_URL
    pub openai_base_url: String,
    #[clap(long, default_value = DEFAULT_MODEL, env = "THUMBFORGE_MODEL")]
    /// Chat model used for content generation. Env: THUMBFORGE_MODEL
    pub model: String,
    #[clap(long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true)]
    /// Unsplash access key. Without it backgrounds are always gradients.
    /// Env: UNSPLASH_ACCESS_KEY
    pub unsplash_access_key: Option<String>,
    #[clap(long = "font-path", env = "THUMBFORGE_FONT_PATHS", value_delimiter = ',')]
    /// Font files to try, in order, before the built-in font.
    /// Env: THUMBFORGE_FONT_PATHS (comma separated)
    pub font_paths: Vec<PathBuf>,
    #[clap(long, env = "THUMBFORGE_GRADIENT_SEED")]
    /// Fixes the fallback gradient choice. Env: THUMBFORGE_GRADIENT_SEED
    pub gradient_seed: Option<u64>,
}

impl BackendOptions {
    /// The configured fonts, or the platform defaults.
    pub fn font_stack(&self) -> FontStack {
        if self.font_paths.is_empty() {
            FontStack::from_paths(DEFAULT_FONT_PATHS.iter().cloned())
        } else {
            FontStack::from_paths(self.font_paths.iter().cloned())
        }
    }

    /// Unsplash lookups when a key is configured, gradients otherwise.
    pub fn photo_source(&self) -> Arc<dyn PhotoSource> {
        let Some(key) = self.unsplash_access_key.as_deref().filter(|key| !key.is_empty())
        else {
            info!("No Unsplash key configured, using gradient backgrounds");
            return Arc::new(NoPhotos);
        };
        match UnsplashClient::new(key) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                warn!("Unsplash client unavailable: {err}");
                Arc::new(NoPhotos)
            }
        }
    }

    /// A composer wired to the configured photo source and fonts.
    pub fn composer(&self) -> Composer {
        Composer::new(self.photo_source(), self.font_stack()).with_seed(self.gradient_seed)
    }

    /// The content backend, when an API key is configured.
    pub fn content_generator(&self) -> Option<Arc<dyn ContentGenerator>> {
        let key = self.openai_api_key.as_deref().filter(|key| !key.is_empty());
        let Some(key) = key else {
            warn!("No OpenAI API key configured, content generation is disabled");
            return None;
        };
        match OpenAiClient::with_base_url(key, &self.model, &self.openai_base_url) {
            Ok(client) => Some(Arc::new(client)),
            Err(err) => {
                warn!("Content client unavailable: {err}");
                None
            }
        }
    }
}
