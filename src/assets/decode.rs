use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::fonts::FontLibrary;
use crate::foundation::error::{PagevisError, PagevisResult};

/// Largest edge accepted when rasterizing an SVG image source.
const MAX_SVG_DIM: u32 = 16_384;

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Re-encode as PNG (straight alpha).
    pub fn to_png_bytes(&self) -> PagevisResult<Vec<u8>> {
        let mut straight = self.rgba8_premul.as_ref().clone();
        unpremultiply_rgba8_in_place(&mut straight);
        encode_png(&straight, self.width, self.height)
    }
}

/// Decode image bytes.
///
/// Any format the `image` crate recognizes is accepted; otherwise the bytes are tried as an SVG
/// document and rasterized at its intrinsic size.
pub fn decode_image(bytes: &[u8], fonts: &FontLibrary) -> PagevisResult<DecodedImage> {
    match decode_raster(bytes) {
        Ok(img) => Ok(img),
        Err(raster_err) if looks_like_svg(bytes) => decode_svg(bytes, fonts).map_err(|svg_err| {
            PagevisError::asset_load(format!(
                "decode image: not a raster image ({raster_err}) and not a valid svg ({svg_err})"
            ))
        }),
        Err(e) => Err(PagevisError::asset_load(format!("{e:#}"))),
    }
}

fn decode_raster(bytes: &[u8]) -> anyhow::Result<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let head = String::from_utf8_lossy(head);
    head.contains("<svg")
}

fn decode_svg(bytes: &[u8], fonts: &FontLibrary) -> anyhow::Result<DecodedImage> {
    let opts = usvg::Options {
        fontdb: fonts.database().clone(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let to_px = |v: f32| -> anyhow::Result<u32> {
        anyhow::ensure!(v.is_finite() && v > 0.0, "svg has invalid width/height");
        let px = (v.ceil() as u32).max(1);
        anyhow::ensure!(px <= MAX_SVG_DIM, "svg raster size too large: {px}");
        Ok(px)
    };
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

/// Encode straight-alpha RGBA8 as PNG.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> PagevisResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, rgba.to_vec())
        .ok_or_else(|| anyhow::anyhow!("rgba buffer does not match {width}x{height}"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
