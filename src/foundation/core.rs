use crate::foundation::error::{PagevisError, PagevisResult};

pub use kurbo::{BezPath, Point, Rect};

/// Largest surface edge in pixels; the raster backend addresses pixmaps with `u16`.
pub const MAX_SURFACE_DIM: u32 = u16::MAX as u32;

/// Viewport used to resolve `vw` / `vh` units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Viewport width in pixels.
    pub width: f64,
    /// Viewport height in pixels.
    pub height: f64,
}

/// Surface dimensions and scale shared between the visualizer and its renderer.
///
/// The drawing handle itself stays inside the renderer; the context carries the numbers both sides
/// agree on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderingContext {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// `min(width / pageWidth, height / pageHeight)` after the last resize. Metadata only.
    pub scale: f64,
}

impl RenderingContext {
    /// Context for a `width x height` surface at scale 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
        }
    }

    /// The surface size as a viewport.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: f64::from(self.width),
            height: f64::from(self.height),
        }
    }
}

/// Convert a style dimension into a surface edge length.
pub fn surface_dim(v: f64, what: &str) -> PagevisResult<u32> {
    if !v.is_finite() || v <= 0.0 {
        return Err(PagevisError::validation(format!(
            "{what} must be finite and > 0"
        )));
    }
    let px = v.round().max(1.0);
    if px > f64::from(MAX_SURFACE_DIM) {
        return Err(PagevisError::validation(format!(
            "{what} exceeds {MAX_SURFACE_DIM}px"
        )));
    }
    Ok(px as u32)
}
