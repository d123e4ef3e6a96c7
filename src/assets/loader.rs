//! Image source fetching.
//!
//! Renderers never touch the network or the filesystem directly; they ask an [`ImageLoader`] for
//! the bytes behind an image URL.

use std::path::PathBuf;

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{PagevisError, PagevisResult};

/// Fetches the encoded bytes of an image source.
pub trait ImageLoader {
    /// Bytes behind `src`. Failures are reported as [`PagevisError::AssetLoad`].
    fn load(&self, src: &str) -> PagevisResult<Vec<u8>>;
}

impl<F> ImageLoader for F
where
    F: Fn(&str) -> PagevisResult<Vec<u8>>,
{
    fn load(&self, src: &str) -> PagevisResult<Vec<u8>> {
        self(src)
    }
}

/// Loader for `data:` and `file:` URLs.
#[derive(Clone, Debug, Default)]
pub struct DefaultImageLoader {
    base_dir: Option<PathBuf>,
}

impl DefaultImageLoader {
    /// Loader that only accepts absolute `file:` URLs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that also accepts relative paths, resolved against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn read_file(&self, path: PathBuf) -> PagevisResult<Vec<u8>> {
        std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))
            .map_err(|e| PagevisError::asset_load(format!("{e:#}")))
    }
}

impl ImageLoader for DefaultImageLoader {
    fn load(&self, src: &str) -> PagevisResult<Vec<u8>> {
        if src.starts_with("data:") {
            return decode_data_url(src);
        }

        match url::Url::parse(src) {
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| {
                    PagevisError::asset_load(format!("file URL has no local path: {src}"))
                })?;
                self.read_file(path)
            }
            Ok(url) => Err(PagevisError::asset_load(format!(
                "unsupported image URL scheme '{}': {src}",
                url.scheme()
            ))),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_dir {
                Some(dir) => self.read_file(dir.join(src)),
                None => Err(PagevisError::asset_load(format!(
                    "relative image source without a base directory: {src}"
                ))),
            },
            Err(e) => Err(PagevisError::asset_load(format!(
                "invalid image URL '{src}': {e}"
            ))),
        }
    }
}

/// Decode the payload of a `data:[<mediatype>][;base64],<data>` URL.
pub fn decode_data_url(src: &str) -> PagevisResult<Vec<u8>> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| PagevisError::asset_load("not a data URL"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| PagevisError::asset_load("data URL is missing ','"))?;

    if meta.ends_with(";base64") {
        // Whitespace is allowed inside base64 data URLs.
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| PagevisError::asset_load(format!("invalid base64 in data URL: {e}")))
    } else {
        Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
