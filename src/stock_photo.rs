//! Unsplash-backed stock photo lookup.
//!
//! Blocking: it is only ever called from inside the synchronous
//! compose pipeline, which the web layer runs on the blocking pool.

use image::DynamicImage;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::constants::{PHOTO_FETCH_TIMEOUT, UNSPLASH_API_URL};
use crate::thumbnail::background::PhotoSource;

#[derive(Debug, Deserialize)]
struct RandomPhoto {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

/// Why a lookup came back empty. Only ever logged.
#[derive(Debug)]
enum LookupError {
    Http(ureq::Error),
    Json(serde_json::Error),
    Url(url::ParseError),
    Image(image::ImageError),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "HTTP error: {err}"),
            Self::Json(err) => write!(f, "unexpected response: {err}"),
            Self::Url(err) => write!(f, "bad URL: {err}"),
            Self::Image(err) => write!(f, "undecodable image: {err}"),
        }
    }
}

impl From<ureq::Error> for LookupError {
    fn from(err: ureq::Error) -> Self {
        Self::Http(err)
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<url::ParseError> for LookupError {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err)
    }
}

impl From<image::ImageError> for LookupError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err)
    }
}

/// Random landscape photo search against the Unsplash API.
#[derive(Debug)]
pub struct UnsplashClient {
    agent: ureq::Agent,
    api_url: Url,
    access_key: String,
}

impl UnsplashClient {
    /// A client for the public API.
    pub fn new(access_key: &str) -> Result<Self, url::ParseError> {
        Self::with_api_url(access_key, UNSPLASH_API_URL)
    }

    /// A client for an Unsplash-compatible API rooted at `api_url`.
    pub fn with_api_url(access_key: &str, api_url: &str) -> Result<Self, url::ParseError> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(PHOTO_FETCH_TIMEOUT))
            .build()
            .into();
        let mut api_url = Url::parse(api_url)?;
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }
        Ok(Self {
            agent,
            api_url,
            access_key: access_key.to_string(),
        })
    }

    fn random_photo_url(&self, query: &str) -> Result<String, LookupError> {
        let endpoint = self.api_url.join("photos/random")?;
        let body = self
            .agent
            .get(endpoint.as_str())
            .query("query", query)
            .query("orientation", "landscape")
            .query("client_id", &self.access_key)
            .call()?
            .body_mut()
            .read_to_string()?;
        let photo: RandomPhoto = serde_json::from_str(&body)?;
        Ok(photo.urls.regular)
    }

    fn lookup(&self, query: &str) -> Result<DynamicImage, LookupError> {
        let image_url = self.random_photo_url(query)?;
        let bytes = self
            .agent
            .get(image_url.as_str())
            .call()?
            .body_mut()
            .read_to_vec()?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

impl PhotoSource for UnsplashClient {
    fn fetch_background(&self, query: &str) -> Option<DynamicImage> {
        match self.lookup(query) {
            Ok(photo) => {
                info!("Unsplash photo fetched for {query:?}");
                Some(photo)
            }
            Err(err) => {
                warn!("Unsplash lookup failed: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_gets_a_trailing_slash() {
        let client = UnsplashClient::with_api_url("key", "http://127.0.0.1:9/v2").expect("url");
        assert_eq!(
            client.api_url.join("photos/random").expect("join").as_str(),
            "http://127.0.0.1:9/v2/photos/random"
        );
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        assert!(UnsplashClient::with_api_url("key", "not a url").is_err());
    }

    #[test]
    fn unreachable_api_means_no_photo() {
        // Port 9 (discard) is closed on test machines, so this fails fast.
        let client = UnsplashClient::with_api_url("key", "http://127.0.0.1:9").expect("url");
        assert!(client.fetch_background("anything").is_none());
    }
}
