//! Image Sources
//!
//! An [`ImageSource`] names where an image comes from. Locator strings are
//! classified once, when parsed:
//!
//! - `http://…` / `https://…` → [`ImageSource::Url`] (remote)
//! - `data:…;base64,…` → [`ImageSource::DataUri`] (local)
//! - anything else → [`ImageSource::Path`] (local)
//!
//! Remote pixels cannot be trusted for snapshot read-back, so a single remote
//! source disables the key-frame cache for the whole session.

use std::borrow::Cow;
use std::path::PathBuf;

use base64::Engine as _;
use plunge_core::{AssetError, Image};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// An `http(s)` URL. Fetching requires the `http` feature.
    Url(String),
    /// An inline `data:` URI.
    DataUri(String),
    /// Encoded image bytes already in memory.
    Bytes { name: String, bytes: Vec<u8> },
    /// An image that is already decoded.
    Decoded(Image),
}

impl ImageSource {
    /// Classifies a locator string.
    #[must_use]
    pub fn parse(locator: &str) -> Self {
        let trimmed = locator.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else if lower.starts_with("data:") {
            Self::DataUri(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }

    /// `true` when the pixels come from another origin.
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// A short human-readable name used in logs and errors.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Path(path) => path.to_string_lossy(),
            Self::Url(url) => Cow::Borrowed(url.rsplit('/').next().unwrap_or(url)),
            Self::DataUri(_) => Cow::Borrowed("<data uri>"),
            Self::Bytes { name, .. } => Cow::Borrowed(name),
            Self::Decoded(image) => Cow::Borrowed(image.label()),
        }
    }

    /// Reads and decodes the image. Blocking; the loader runs this on a
    /// worker thread.
    pub fn load(&self) -> Result<Image, AssetError> {
        let name = self.name().into_owned();
        match self {
            Self::Decoded(image) => Ok(image.clone()),
            Self::Path(path) => {
                let bytes = std::fs::read(path).map_err(|error| AssetError::Io {
                    source_name: name.clone(),
                    error,
                })?;
                decode_image(&name, &bytes)
            }
            Self::Bytes { bytes, .. } => decode_image(&name, bytes),
            Self::DataUri(uri) => {
                let bytes = decode_data_uri(uri)?;
                decode_image(&name, &bytes)
            }
            Self::Url(url) => {
                let bytes = fetch_url(url)?;
                decode_image(&name, &bytes)
            }
        }
    }
}

impl From<&str> for ImageSource {
    fn from(locator: &str) -> Self {
        Self::parse(locator)
    }
}

impl From<String> for ImageSource {
    fn from(locator: String) -> Self {
        Self::parse(&locator)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Image> for ImageSource {
    fn from(image: Image) -> Self {
        Self::Decoded(image)
    }
}

impl<'de> Deserialize<'de> for ImageSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let locator = String::deserialize(deserializer)?;
        Ok(Self::parse(&locator))
    }
}

/// CPU image decoding.
pub fn decode_image(name: &str, bytes: &[u8]) -> Result<Image, AssetError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
        source_name: name.to_string(),
        message: e.to_string(),
    })?;
    Ok(Image::new(name, decoded.into_rgba8()))
}

/// Extracts the payload of a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, AssetError> {
    let rest = uri
        .strip_prefix("data:")
        .or_else(|| uri.strip_prefix("DATA:"))
        .ok_or_else(|| AssetError::DataUri("missing 'data:' prefix".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::DataUri("missing ',' separator".to_string()))?;

    if !header.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(AssetError::DataUri(
            "only base64-encoded data URIs are supported".to_string(),
        ));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| AssetError::DataUri(e.to_string()))
}

#[cfg(feature = "http")]
fn fetch_url(url: &str) -> Result<Vec<u8>, AssetError> {
    let request = ehttp::Request::get(url);
    let response = ehttp::fetch_blocking(&request).map_err(|message| AssetError::Http {
        url: url.to_string(),
        message,
    })?;
    if !response.ok {
        return Err(AssetError::Http {
            url: url.to_string(),
            message: format!("status {} {}", response.status, response.status_text),
        });
    }
    Ok(response.bytes)
}

#[cfg(not(feature = "http"))]
fn fetch_url(url: &str) -> Result<Vec<u8>, AssetError> {
    Err(AssetError::FeatureNotEnabled(format!(
        "cannot fetch '{url}': enable the `http` feature"
    )))
}
