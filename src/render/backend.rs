use crate::assets::fonts::FontLibrary;
use crate::assets::loader::{DefaultImageLoader, ImageLoader};
use crate::foundation::core::{RenderingContext, Viewport};
use crate::foundation::error::{PagevisError, PagevisResult};
use crate::page::model::Page;
use crate::page::styles::{ExportFormat, RenderingMode};
use crate::render::animation::SceneGraphSink;

/// A raster surface read back as RGBA8 pixels.
///
/// Surfaces are kept premultiplied; the flag makes that explicit at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Current surface contents.
#[derive(Clone, Debug)]
pub enum SurfaceSnapshot {
    /// Pixels of a raster surface.
    Raster(FrameRGBA),
    /// Markup of a vector surface.
    Vector(String),
}

/// Paints pages onto one kind of surface.
///
/// Both implementations paint in the same order: clear, background (colour, gradient, image),
/// images by stack order, text blocks by stack order, then animations. Nothing from a page is kept
/// between calls except decoded images.
pub trait SurfaceRenderer {
    /// Backend kind.
    fn mode(&self) -> RenderingMode;

    /// Clear the surface and paint `page` at the size in `ctx`. `viewport` resolves `vw`/`vh`.
    fn render_page(
        &mut self,
        page: &Page,
        ctx: &RenderingContext,
        viewport: Viewport,
        scene: &mut dyn SceneGraphSink,
    ) -> PagevisResult<()>;

    /// Resize the surface and record the new size in `ctx`. Does not re-render.
    fn resize(&mut self, ctx: &mut RenderingContext, width: u32, height: u32) -> PagevisResult<()>;

    /// Wipe the surface. A no-op once destroyed.
    fn clear(&mut self);

    /// Encode the surface as a data URL.
    fn data_url(&self, format: ExportFormat, quality: Option<f64>) -> PagevisResult<String>;

    /// Copy of the current surface contents.
    fn snapshot(&self) -> PagevisResult<SurfaceSnapshot>;

    /// Number of decoded images held by the cache.
    fn cached_images(&self) -> usize;

    /// Release the surface and cached images.
    fn destroy(&mut self);
}

/// Collaborators shared by every renderer.
pub struct RendererDeps {
    /// Fetches image bytes by source URL.
    pub loader: Box<dyn ImageLoader>,
    /// Fonts for text shaping and SVG image sources.
    pub fonts: FontLibrary,
}

impl Default for RendererDeps {
    fn default() -> Self {
        Self {
            loader: Box::new(DefaultImageLoader::new()),
            fonts: FontLibrary::default(),
        }
    }
}

impl std::fmt::Debug for RendererDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererDeps")
            .field("fonts", &self.fonts.len())
            .finish_non_exhaustive()
    }
}

/// Create the renderer for `mode` with a surface sized to `ctx`.
pub fn create_renderer(
    mode: RenderingMode,
    ctx: &RenderingContext,
    deps: RendererDeps,
) -> PagevisResult<Box<dyn SurfaceRenderer>> {
    match mode {
        RenderingMode::Raster => Ok(Box::new(crate::render::raster::RasterRenderer::new(
            ctx, deps,
        )?)),
        RenderingMode::Vector => Ok(Box::new(crate::render::vector::VectorRenderer::new(
            ctx, deps,
        ))),
        RenderingMode::Dom => Err(PagevisError::unsupported(
            "dom rendering mode is not implemented",
        )),
    }
}
