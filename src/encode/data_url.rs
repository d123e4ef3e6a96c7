use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::assets::decode::{encode_png, unpremultiply_rgba8_in_place};
use crate::foundation::error::{PagevisError, PagevisResult};
use crate::render::backend::FrameRGBA;

/// JPEG quality used when none is requested.
pub const DEFAULT_JPEG_QUALITY: f64 = 0.92;

/// `data:<mime>;base64,<payload>`.
pub fn base64_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// PNG data URL of a frame. Alpha is kept.
pub fn png_data_url(frame: &FrameRGBA) -> PagevisResult<String> {
    let mut straight = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut straight);
    }
    let png = encode_png(&straight, frame.width, frame.height)?;
    Ok(base64_data_url("image/png", &png))
}

/// JPEG data URL of a frame. Transparent areas come out black; `quality` is in `0..=1`.
pub fn jpeg_data_url(frame: &FrameRGBA, quality: Option<f64>) -> PagevisResult<String> {
    let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY);
    if !(0.0..=1.0).contains(&quality) {
        return Err(PagevisError::validation("jpeg quality must be within 0..=1"));
    }
    let q = ((quality * 100.0).round() as u8).max(1);

    let mut premul = frame.data.clone();
    if !frame.premultiplied {
        crate::assets::decode::premultiply_rgba8_in_place(&mut premul);
    }
    let rgb: Vec<u8> = premul
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, q)
        .encode(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
        .context("encode jpeg")?;
    Ok(base64_data_url("image/jpeg", &buf))
}

/// `data:image/svg+xml,` followed by the percent-encoded markup.
pub fn svg_data_url(markup: &str) -> String {
    format!("data:image/svg+xml,{}", urlencoding::encode(markup))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/data_url.rs"]
mod tests;
