//! Pixel surface backed by `vello_cpu`.
//!
//! Every element is painted into its own transparent layer and composited onto the surface with
//! source-over, which is where element opacity, shadows and image blur are applied.

use std::sync::Arc;

use crate::assets::cache::ImageCache;
use crate::assets::decode::{DecodedImage, decode_image};
use crate::assets::fonts::FontLibrary;
use crate::assets::loader::ImageLoader;
use crate::foundation::color::{Rgba8, parse_css_color};
use crate::foundation::core::{BezPath, Point, Rect, RenderingContext, Viewport};
use crate::foundation::error::{PagevisError, PagevisResult};
use crate::layout::stacking::stacking_order;
use crate::layout::text::{
    ApproxMeasurer, TextMeasurer, font_size_px, justify_words, lay_out_block, line_height_px,
    line_start_x, underline_y,
};
use crate::layout::units::{ResolvedBox, UnitResolver};
use crate::page::model::{
    Alignment, Background, BorderOptions, FontStyle, ImageElement, Page, TextBlock,
    TextDecoration,
};
use crate::page::styles::{ExportFormat, RenderingMode};
use crate::render::animation::{SceneGraphSink, apply_animations};
use crate::render::backend::{FrameRGBA, RendererDeps, SurfaceRenderer, SurfaceSnapshot};
use crate::render::blur::blur_rgba8_premul;
use crate::render::composite::{over_in_place, shadow_layer, solid_layer};
use crate::render::style::{
    ImageFilter, LinearGradientSpec, TextShadow, compose_font, dash_pattern,
};
use crate::render::text_shaper::{BlockMeasurer, ShapedFace, TextShaper};

const PLACEHOLDER_FILL: Rgba8 = Rgba8::rgba(0xf0, 0xf0, 0xf0, 0xff);
const PLACEHOLDER_TEXT: Rgba8 = Rgba8::rgba(0x66, 0x66, 0x66, 0xff);
const PLACEHOLDER_FONT: &str = "Arial";
const PLACEHOLDER_FONT_SIZE: f64 = 14.0;
const PLACEHOLDER_LABEL: &str = "Image not found";

/// Decoded image ready to use as a paint.
#[derive(Clone)]
struct RasterImage {
    paint: vello_cpu::Image,
    width: f64,
    height: f64,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl CpuSurface {
    fn new(width: u32, height: u32) -> PagevisResult<Self> {
        let (width, height) = surface_size(width, height)?;
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
    }

    fn composite(&mut self, layer: &[u8], opacity: f32) -> PagevisResult<()> {
        over_in_place(self.pixmap.data_as_u8_slice_mut(), layer, opacity)
    }
}

/// Paints pages onto an RGBA8 pixmap.
pub struct RasterRenderer {
    surface: Option<CpuSurface>,
    images: ImageCache<RasterImage>,
    loader: Box<dyn ImageLoader>,
    fonts: FontLibrary,
    shaper: TextShaper,
}

impl RasterRenderer {
    /// Renderer with a transparent surface sized to `ctx`.
    pub fn new(ctx: &RenderingContext, deps: RendererDeps) -> PagevisResult<Self> {
        Ok(Self {
            surface: Some(CpuSurface::new(ctx.width, ctx.height)?),
            images: ImageCache::new(),
            loader: deps.loader,
            shaper: TextShaper::new(deps.fonts.clone()),
            fonts: deps.fonts,
        })
    }

    fn ensure_surface(&mut self, width: u32, height: u32) -> PagevisResult<&mut CpuSurface> {
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| PagevisError::surface_unavailable("raster surface was destroyed"))?;
        let (w, h) = surface_size(width, height)?;
        if surface.width != w || surface.height != h {
            *surface = CpuSurface::new(width, height)?;
        }
        Ok(surface)
    }

    fn live_surface(&mut self) -> PagevisResult<&mut CpuSurface> {
        self.surface
            .as_mut()
            .ok_or_else(|| PagevisError::surface_unavailable("raster surface was destroyed"))
    }

    fn surface_dims(&self) -> PagevisResult<(u16, u16)> {
        self.surface
            .as_ref()
            .map(|s| (s.width, s.height))
            .ok_or_else(|| PagevisError::surface_unavailable("raster surface was destroyed"))
    }

    fn load_image(&mut self, src: &str) -> PagevisResult<RasterImage> {
        let loader = &self.loader;
        let fonts = &self.fonts;
        self.images.get_or_try_insert_with(src, || {
            let bytes = loader.load(src)?;
            let decoded = decode_image(&bytes, fonts)?;
            raster_image(&decoded)
        })
    }

    fn paint_background(&mut self, background: &Background) -> PagevisResult<()> {
        let (w, h) = self.surface_dims()?;
        let (cw, ch) = (u32::from(w), u32::from(h));

        if let Some(color) = &background.color {
            match parse_css_color(color) {
                Ok(c) => {
                    let layer = solid_layer(cw, ch, c);
                    self.live_surface()?.composite(&layer, 1.0)?;
                }
                Err(e) => tracing::warn!(color = %color, error = %e, "skipping background colour"),
            }
        }

        if let Some(gradient) = &background.gradient {
            if let Some(layer) = gradient_layer(gradient, cw, ch) {
                self.live_surface()?.composite(&layer, 1.0)?;
            }
        }

        if let Some(src) = &background.image {
            match self.load_image(src) {
                Ok(img) => {
                    let full = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
                    let layer = paint_layer(w, h, |ctx| fill_image(ctx, &img, full));
                    self.live_surface()?.composite(&layer, 1.0)?;
                }
                Err(e) => {
                    tracing::warn!(src = %src, error = %e, "failed to load background image");
                }
            }
        }
        Ok(())
    }

    fn paint_image(
        &mut self,
        element: &ImageElement,
        resolver: &UnitResolver,
    ) -> PagevisResult<()> {
        let (w, h) = self.surface_dims()?;
        let rect = resolver
            .resolve_box(&element.position, f64::from(w), f64::from(h))?
            .to_rect();

        match self.load_image(&element.src) {
            Ok(img) => {
                let mut layer = paint_layer(w, h, |ctx| fill_image(ctx, &img, rect));
                for filter in ImageFilter::parse_all(&element.filters) {
                    let ImageFilter::Blur(sigma) = filter;
                    layer = blur_rgba8_premul(&layer, u32::from(w), u32::from(h), sigma)?;
                }
                self.live_surface()?.composite(&layer, 1.0)?;

                if let Some(border) = &element.border
                    && let Some(layer) = border_layer(w, h, rect, border)
                {
                    self.live_surface()?.composite(&layer, 1.0)?;
                }
            }
            Err(e) => {
                tracing::warn!(
                    src = %element.src,
                    error = %e,
                    "failed to load image, drawing placeholder"
                );
                self.paint_placeholder(rect)?;
            }
        }
        Ok(())
    }

    fn paint_placeholder(&mut self, rect: Rect) -> PagevisResult<()> {
        let (w, h) = self.surface_dims()?;
        let face = self.shaper.face(PLACEHOLDER_FONT, 400, FontStyle::Normal);
        let size = PLACEHOLDER_FONT_SIZE;
        let label_width =
            block_measurer(&mut self.shaper, face.as_ref(), size).measure(PLACEHOLDER_LABEL);
        let origin = (
            rect.center().x - label_width / 2.0,
            rect.center().y - size / 2.0,
        );

        let shaper = &mut self.shaper;
        let layer = paint_layer(w, h, |ctx| {
            fill_rect(ctx, rect, PLACEHOLDER_FILL);
            if let Some(face) = &face {
                shaper.fill_line(
                    ctx,
                    face,
                    size as f32,
                    PLACEHOLDER_LABEL,
                    origin,
                    PLACEHOLDER_TEXT,
                );
            }
        });
        self.live_surface()?.composite(&layer, 1.0)
    }

    fn paint_text_block(
        &mut self,
        block: &TextBlock,
        resolver: &UnitResolver,
    ) -> PagevisResult<()> {
        let (w, h) = self.surface_dims()?;
        let fmt = &block.formatting;
        let bx = resolver.resolve_box(&block.position, f64::from(w), f64::from(h))?;
        let font_size = font_size_px(fmt, resolver)?;
        let line_height = line_height_px(fmt, font_size);
        let color = parse_css_color(&fmt.color)?;
        let alignment = block.position.alignment();
        let _span =
            tracing::debug_span!("text_block", font = %compose_font(fmt, font_size)).entered();

        let face = self.shaper.face(
            &fmt.font_family,
            fmt.font_weight.unwrap_or_default().numeric(),
            fmt.font_style.unwrap_or_default(),
        );

        let runs = {
            let mut measurer = block_measurer(&mut self.shaper, face.as_ref(), font_size);
            place_runs(&block.content, &mut measurer, &bx, line_height, alignment)
        };
        let line_count = runs.iter().map(|r| r.line).max().map_or(0, |l| l + 1);

        let shaper = &mut self.shaper;
        let underline = (fmt.text_decoration == Some(TextDecoration::Underline)).then(|| {
            let y = underline_y(bx.y, line_count, line_height);
            Rect::new(bx.x, y - 0.5, bx.x + bx.width, y + 0.5)
        });
        let layer = paint_layer(w, h, |ctx| {
            if let Some(face) = &face {
                for run in &runs {
                    shaper.fill_line(
                        ctx,
                        face,
                        font_size as f32,
                        &run.text,
                        (run.x, run.y),
                        color,
                    );
                }
            }
            if let Some(rect) = underline {
                fill_rect(ctx, rect, color);
            }
        });

        let opacity = fmt.opacity.unwrap_or(1.0) as f32;
        if let Some(shadow) = fmt.shadow.as_deref().and_then(TextShadow::parse) {
            match shadow.rgba() {
                Some(shadow_color) => {
                    let mut cast = shadow_layer(
                        &layer,
                        u32::from(w),
                        u32::from(h),
                        shadow_color,
                        shadow.dx.round() as i32,
                        shadow.dy.round() as i32,
                    );
                    if shadow.blur > 0.0 {
                        cast = blur_rgba8_premul(
                            &cast,
                            u32::from(w),
                            u32::from(h),
                            shadow.blur / 2.0,
                        )?;
                    }
                    self.live_surface()?.composite(&cast, opacity)?;
                }
                None => tracing::warn!(
                    shadow = %shadow.color,
                    "skipping text shadow with unparseable colour"
                ),
            }
        }
        self.live_surface()?.composite(&layer, opacity)
    }

    fn frame(&self) -> PagevisResult<FrameRGBA> {
        let surface = self
            .surface
            .as_ref()
            .ok_or_else(|| PagevisError::surface_unavailable("raster surface was destroyed"))?;
        Ok(FrameRGBA {
            width: u32::from(surface.width),
            height: u32::from(surface.height),
            data: surface.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl SurfaceRenderer for RasterRenderer {
    fn mode(&self) -> RenderingMode {
        RenderingMode::Raster
    }

    fn render_page(
        &mut self,
        page: &Page,
        ctx: &RenderingContext,
        viewport: Viewport,
        scene: &mut dyn SceneGraphSink,
    ) -> PagevisResult<()> {
        self.ensure_surface(ctx.width, ctx.height)?.clear();
        let resolver = UnitResolver::new(viewport);

        if let Some(background) = &page.background {
            self.paint_background(background)?;
        }
        for image in stacking_order(&page.images) {
            self.paint_image(image, &resolver)?;
        }
        for block in stacking_order(&page.text_blocks) {
            self.paint_text_block(block, &resolver)?;
        }
        apply_animations(&page.animations, scene);
        Ok(())
    }

    fn resize(&mut self, ctx: &mut RenderingContext, width: u32, height: u32) -> PagevisResult<()> {
        self.ensure_surface(width, height)?.clear();
        ctx.width = width;
        ctx.height = height;
        Ok(())
    }

    fn clear(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
    }

    fn data_url(&self, format: ExportFormat, quality: Option<f64>) -> PagevisResult<String> {
        match format {
            ExportFormat::Png => crate::encode::data_url::png_data_url(&self.frame()?),
            ExportFormat::Jpeg => crate::encode::data_url::jpeg_data_url(&self.frame()?, quality),
            other => Err(PagevisError::unsupported(format!(
                "raster surface cannot export {}",
                other.as_str()
            ))),
        }
    }

    fn snapshot(&self) -> PagevisResult<SurfaceSnapshot> {
        self.frame().map(SurfaceSnapshot::Raster)
    }

    fn cached_images(&self) -> usize {
        self.images.len()
    }

    fn destroy(&mut self) {
        self.surface = None;
        self.images.clear();
    }
}

/// One line, or one justified word, positioned for painting.
#[derive(Clone, Debug, PartialEq)]
struct TextRun {
    text: String,
    x: f64,
    y: f64,
    line: usize,
}

fn place_runs<M: TextMeasurer>(
    content: &str,
    measurer: &mut M,
    bx: &ResolvedBox,
    line_height: f64,
    alignment: Alignment,
) -> Vec<TextRun> {
    let lines = lay_out_block(content, |s: &str| measurer.measure(s), bx, line_height);
    let mut runs = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if alignment == Alignment::Justify && !line.last {
            for word in justify_words(&line.text, measurer, bx.x, bx.width) {
                runs.push(TextRun {
                    text: word.text.to_string(),
                    x: word.x,
                    y: line.y,
                    line: i,
                });
            }
        } else {
            let width = measurer.measure(&line.text);
            runs.push(TextRun {
                text: line.text.clone(),
                x: line_start_x(alignment, bx.x, bx.width, width),
                y: line.y,
                line: i,
            });
        }
    }
    runs
}

fn block_measurer<'a>(
    shaper: &'a mut TextShaper,
    face: Option<&'a ShapedFace>,
    font_size: f64,
) -> BlockMeasurer<'a> {
    match face {
        Some(face) => BlockMeasurer::Shaped {
            shaper,
            face,
            size_px: font_size as f32,
        },
        None => BlockMeasurer::Approx(ApproxMeasurer::new(font_size)),
    }
}

fn surface_size(width: u32, height: u32) -> PagevisResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PagevisError::validation("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PagevisError::validation("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(PagevisError::validation("surface dimensions must be > 0"));
    }
    Ok((w, h))
}

fn paint_layer(
    width: u16,
    height: u16,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) -> Vec<u8> {
    let mut ctx = vello_cpu::RenderContext::new(width, height);
    draw(&mut ctx);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    ctx.render_to_pixmap(&mut pixmap);
    pixmap.data_as_u8_slice().to_vec()
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, rect: Rect, color: Rgba8) {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, color.a));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1));
}

// Stretch the image over `dst`.
fn fill_image(ctx: &mut vello_cpu::RenderContext, img: &RasterImage, dst: Rect) {
    if img.width <= 0.0 || img.height <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
        return;
    }
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(
        vello_cpu::kurbo::Affine::translate((dst.x0, dst.y0))
            * vello_cpu::kurbo::Affine::scale_non_uniform(
                dst.width() / img.width,
                dst.height() / img.height,
            ),
    );
    ctx.set_paint(img.paint.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, img.width, img.height));
}

fn border_layer(width: u16, height: u16, rect: Rect, border: &BorderOptions) -> Option<Vec<u8>> {
    if border.width <= 0.0 {
        return None;
    }
    let color = match parse_css_color(&border.color) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(color = %border.color, error = %e, "skipping image border");
            return None;
        }
    };

    let outline = border_outline(rect, border);
    Some(paint_layer(width, height, |ctx| {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, color.a));
        ctx.fill_path(&bezpath_to_cpu(&outline));
    }))
}

/// Filled outline of a border stroke, dashed and rounded as requested.
fn border_outline(rect: Rect, border: &BorderOptions) -> BezPath {
    use kurbo::Shape as _;

    let path = match border.radius {
        Some(r) if r > 0.0 => kurbo::RoundedRect::from_rect(rect, r).to_path(0.1),
        _ => rect.to_path(0.1),
    };
    let mut style = kurbo::Stroke::new(border.width);
    if let Some(dashes) = dash_pattern(border.style) {
        style = style.with_dashes(0.0, dashes);
    }
    kurbo::stroke(
        path.elements().iter().copied(),
        &style,
        &kurbo::StrokeOpts::default(),
        0.1,
    )
}

fn gradient_layer(gradient: &str, width: u32, height: u32) -> Option<Vec<u8>> {
    let spec = LinearGradientSpec::parse(gradient)?;
    let (from, to) = match (parse_css_color(&spec.from), parse_css_color(&spec.to)) {
        (Ok(a), Ok(b)) => (a, b),
        _ => {
            tracing::warn!(gradient = %gradient, "skipping gradient with unparseable colour stop");
            return None;
        }
    };

    let ((sx, sy), (ex, ey)) = spec.endpoints(f64::from(width), f64::from(height));
    let (dx, dy) = (ex - sx, ey - sy);
    let len2 = dx * dx + dy * dy;
    if len2 <= f64::EPSILON {
        return None;
    }

    let mut out = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for y in 0..height {
        for x in 0..width {
            let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let t = (((p.x - sx) * dx + (p.y - sy) * dy) / len2).clamp(0.0, 1.0);
            out.extend_from_slice(&lerp_color(from, to, t).premultiplied());
        }
    }
    Some(out)
}

fn lerp_color(a: Rgba8, b: Rgba8, t: f64) -> Rgba8 {
    let mix = |x: u8, y: u8| -> u8 {
        (f64::from(x) + (f64::from(y) - f64::from(x)) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgba8::rgba(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

fn raster_image(decoded: &DecodedImage) -> PagevisResult<RasterImage> {
    let pixmap = image_premul_bytes_to_pixmap(
        decoded.rgba8_premul.as_slice(),
        decoded.width,
        decoded.height,
    )?;
    Ok(RasterImage {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        width: f64::from(decoded.width),
        height: f64::from(decoded.height),
    })
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> PagevisResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PagevisError::asset_load("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PagevisError::asset_load("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(PagevisError::asset_load("decoded image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
