//! Vector surface: pages become a standalone SVG document.

use std::sync::Arc;

use crate::assets::cache::ImageCache;
use crate::assets::decode::decode_image;
use crate::assets::fonts::FontLibrary;
use crate::assets::loader::ImageLoader;
use crate::encode::data_url::{base64_data_url, svg_data_url};
use crate::foundation::color::parse_css_color;
use crate::foundation::core::{RenderingContext, Viewport};
use crate::foundation::error::{PagevisError, PagevisResult};
use crate::layout::stacking::stacking_order;
use crate::layout::text::{
    ApproxMeasurer, anchor_x, font_size_px, justify_words, line_height_px, underline_y,
    wrap_lines,
};
use crate::layout::units::{ResolvedBox, UnitResolver};
use crate::page::model::{
    Alignment, Background, BorderOptions, ImageElement, Page, TextBlock, TextDecoration,
    TextFormatting,
};
use crate::page::styles::{ExportFormat, RenderingMode};
use crate::render::animation::{SceneGraphSink, apply_animations};
use crate::render::backend::{RendererDeps, SurfaceRenderer, SurfaceSnapshot};
use crate::render::style::{ImageFilter, LinearGradientSpec, TextShadow, dash_pattern};
use crate::render::svg::{SvgDocument, SvgElement};

/// Paints pages into an in-memory SVG document.
pub struct VectorRenderer {
    doc: Option<SvgDocument>,
    images: ImageCache<Arc<str>>,
    loader: Box<dyn ImageLoader>,
    fonts: FontLibrary,
}

impl VectorRenderer {
    /// Renderer with an empty document sized to `ctx`.
    pub fn new(ctx: &RenderingContext, deps: RendererDeps) -> Self {
        Self {
            doc: Some(SvgDocument::new(ctx.width, ctx.height)),
            images: ImageCache::new(),
            loader: deps.loader,
            fonts: deps.fonts,
        }
    }

    /// The live document, `None` once destroyed.
    pub fn document(&self) -> Option<&SvgDocument> {
        self.doc.as_ref()
    }

    fn doc_mut(&mut self) -> PagevisResult<&mut SvgDocument> {
        self.doc
            .as_mut()
            .ok_or_else(|| PagevisError::surface_unavailable("svg document was destroyed"))
    }

    // PNG data URL of the decoded source, cached by source URL.
    fn load_image_data_url(&mut self, src: &str) -> PagevisResult<Arc<str>> {
        let loader = &self.loader;
        let fonts = &self.fonts;
        self.images.get_or_try_insert_with(src, || {
            let bytes = loader.load(src)?;
            let png = decode_image(&bytes, fonts)?.to_png_bytes()?;
            Ok(Arc::from(base64_data_url("image/png", &png)))
        })
    }

    fn paint_background(&mut self, background: &Background) -> PagevisResult<()> {
        let doc = self.doc_mut()?;
        let (w, h) = (doc.width(), doc.height());

        if let Some(color) = &background.color {
            doc.push(full_rect("rect", w, h).attr("fill", color));
        }

        if let Some(spec) = background.gradient.as_deref().and_then(LinearGradientSpec::parse) {
            let id = doc.next_id("gradient");
            doc.push_def(
                SvgElement::new("linearGradient")
                    .attr("id", &id)
                    .attr("x1", "0%")
                    .attr("y1", "0%")
                    .attr("x2", "100%")
                    .attr("y2", "100%")
                    .attr("gradientTransform", format!("rotate({})", spec.angle_deg))
                    .child(
                        SvgElement::new("stop")
                            .attr("offset", "0%")
                            .attr("stop-color", &spec.from),
                    )
                    .child(
                        SvgElement::new("stop")
                            .attr("offset", "100%")
                            .attr("stop-color", &spec.to),
                    ),
            );
            doc.push(full_rect("rect", w, h).attr("fill", format!("url(#{id})")));
        }

        if let Some(src) = &background.image {
            match self.load_image_data_url(src) {
                Ok(href) => {
                    self.doc_mut()?.push(
                        full_rect("image", w, h)
                            .attr("href", &*href)
                            .attr("preserveAspectRatio", "xMidYMid slice"),
                    );
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
        let doc = self.doc_mut()?;
        let (cw, ch) = (f64::from(doc.width()), f64::from(doc.height()));
        let bx = resolver.resolve_box(&element.position, cw, ch)?;

        let href = match self.load_image_data_url(&element.src) {
            Ok(href) => href,
            Err(e) => {
                tracing::warn!(
                    src = %element.src,
                    error = %e,
                    "failed to load image, drawing placeholder"
                );
                return self.paint_placeholder(&bx);
            }
        };

        let doc = self.doc_mut()?;
        let mut el = box_element("image", &bx)
            .attr("href", &*href)
            .attr("preserveAspectRatio", "xMidYMid meet");
        if let Some(id) = &element.id {
            el.set_attr("id", id);
        }
        if let Some(alt) = &element.alt_text {
            el.set_attr("aria-label", alt);
        }

        let filters = ImageFilter::parse_all(&element.filters);
        if !filters.is_empty() {
            let id = doc.next_id("filter");
            let mut filter = SvgElement::new("filter").attr("id", &id);
            for f in filters {
                let ImageFilter::Blur(sigma) = f;
                filter =
                    filter.child(SvgElement::new("feGaussianBlur").attr("stdDeviation", sigma));
            }
            doc.push_def(filter);
            el.set_attr("filter", format!("url(#{id})"));
        }
        doc.push(el);

        if let Some(border) = &element.border {
            doc.push(border_rect(&bx, border));
        }
        Ok(())
    }

    fn paint_placeholder(&mut self, bx: &ResolvedBox) -> PagevisResult<()> {
        let doc = self.doc_mut()?;
        doc.push(
            box_element("rect", bx)
                .attr("fill", "#f0f0f0")
                .attr("stroke", "#ccc")
                .attr("stroke-width", 1),
        );
        doc.push(
            SvgElement::new("text")
                .attr("x", bx.x + bx.width / 2.0)
                .attr("y", bx.y + bx.height / 2.0)
                .attr("text-anchor", "middle")
                .attr("fill", "#666")
                .attr("font-family", "Arial")
                .attr("font-size", 14)
                .text("Image not found"),
        );
        Ok(())
    }

    fn paint_text_block(
        &mut self,
        block: &TextBlock,
        resolver: &UnitResolver,
    ) -> PagevisResult<()> {
        let doc = self.doc_mut()?;
        let (cw, ch) = (f64::from(doc.width()), f64::from(doc.height()));
        let fmt = &block.formatting;
        let bx = resolver.resolve_box(&block.position, cw, ch)?;
        let font_size = font_size_px(fmt, resolver)?;
        let line_height = line_height_px(fmt, font_size);
        parse_css_color(&fmt.color)?;
        let alignment = block.position.alignment();

        let x = match alignment {
            Alignment::Center | Alignment::Right => anchor_x(alignment, bx.x, bx.width),
            Alignment::Left | Alignment::Justify => bx.x,
        };
        let mut text = SvgElement::new("text")
            .attr("x", x)
            .attr("y", bx.y + font_size);
        if let Some(id) = &block.id {
            text.set_attr("id", id);
        }
        apply_formatting(&mut text, fmt, font_size, doc);
        match alignment {
            Alignment::Center => text.set_attr("text-anchor", "middle"),
            Alignment::Right => text.set_attr("text-anchor", "end"),
            Alignment::Left | Alignment::Justify => {}
        }

        let lines: Vec<String> =
            wrap_lines(&block.content, ApproxMeasurer::new(font_size), bx.width).collect();
        if let [only] = lines.as_slice() {
            text = text.text(only.as_str());
        } else {
            let last = lines.len().saturating_sub(1);
            for (i, line) in lines.iter().enumerate() {
                let dy = if i == 0 { 0.0 } else { line_height };
                if alignment == Alignment::Justify && i < last {
                    // One positioned span per word; only the first advances the line.
                    let mut measure = ApproxMeasurer::new(font_size);
                    let words = justify_words(line, &mut measure, bx.x, bx.width);
                    for (j, word) in words.iter().enumerate() {
                        let mut span = SvgElement::new("tspan").attr("x", word.x);
                        if j == 0 {
                            span.set_attr("dy", dy);
                        }
                        text = text.child(span.text(word.text));
                    }
                    continue;
                }
                text = text.child(
                    SvgElement::new("tspan")
                        .attr("x", x)
                        .attr("dy", dy)
                        .text(line.as_str()),
                );
            }
        }
        doc.push(text);

        if fmt.text_decoration == Some(TextDecoration::Underline) {
            let y = underline_y(bx.y, lines.len(), line_height);
            doc.push(
                SvgElement::new("line")
                    .attr("x1", bx.x)
                    .attr("y1", y)
                    .attr("x2", bx.x + bx.width)
                    .attr("y2", y)
                    .attr("stroke", &fmt.color)
                    .attr("stroke-width", 1),
            );
        }
        Ok(())
    }
}

impl SurfaceRenderer for VectorRenderer {
    fn mode(&self) -> RenderingMode {
        RenderingMode::Vector
    }

    fn render_page(
        &mut self,
        page: &Page,
        ctx: &RenderingContext,
        viewport: Viewport,
        scene: &mut dyn SceneGraphSink,
    ) -> PagevisResult<()> {
        let doc = self.doc_mut()?;
        doc.set_size(ctx.width, ctx.height);
        doc.clear();
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
        self.doc_mut()?.set_size(width, height);
        ctx.width = width;
        ctx.height = height;
        Ok(())
    }

    fn clear(&mut self) {
        if let Some(doc) = self.doc.as_mut() {
            doc.clear();
        }
    }

    fn data_url(&self, format: ExportFormat, _quality: Option<f64>) -> PagevisResult<String> {
        let doc = self
            .doc
            .as_ref()
            .ok_or_else(|| PagevisError::surface_unavailable("svg document was destroyed"))?;
        match format {
            ExportFormat::Svg => Ok(svg_data_url(&doc.to_markup())),
            other => Err(PagevisError::unsupported(format!(
                "vector surface cannot export {}",
                other.as_str()
            ))),
        }
    }

    fn snapshot(&self) -> PagevisResult<SurfaceSnapshot> {
        self.doc
            .as_ref()
            .map(|doc| SurfaceSnapshot::Vector(doc.to_markup()))
            .ok_or_else(|| PagevisError::surface_unavailable("svg document was destroyed"))
    }

    fn cached_images(&self) -> usize {
        self.images.len()
    }

    fn destroy(&mut self) {
        self.doc = None;
        self.images.clear();
    }
}

fn full_rect(name: &'static str, width: u32, height: u32) -> SvgElement {
    SvgElement::new(name)
        .attr("x", 0)
        .attr("y", 0)
        .attr("width", width)
        .attr("height", height)
}

fn box_element(name: &'static str, bx: &ResolvedBox) -> SvgElement {
    SvgElement::new(name)
        .attr("x", bx.x)
        .attr("y", bx.y)
        .attr("width", bx.width)
        .attr("height", bx.height)
}

fn border_rect(bx: &ResolvedBox, border: &BorderOptions) -> SvgElement {
    let mut rect = box_element("rect", bx)
        .attr("fill", "none")
        .attr("stroke", &border.color)
        .attr("stroke-width", border.width);
    if let Some([on, off]) = dash_pattern(border.style) {
        rect.set_attr("stroke-dasharray", format!("{on},{off}"));
    }
    if let Some(r) = border.radius.filter(|r| *r > 0.0) {
        rect.set_attr("rx", r);
        rect.set_attr("ry", r);
    }
    rect
}

fn apply_formatting(
    text: &mut SvgElement,
    fmt: &TextFormatting,
    font_size: f64,
    doc: &mut SvgDocument,
) {
    text.set_attr("font-family", &fmt.font_family);
    text.set_attr("font-size", font_size);
    text.set_attr("fill", &fmt.color);
    if let Some(style) = fmt.font_style {
        text.set_attr("font-style", style.as_css());
    }
    if let Some(weight) = fmt.font_weight {
        text.set_attr("font-weight", weight.as_css());
    }
    if let Some(spacing) = fmt.letter_spacing {
        text.set_attr("letter-spacing", spacing);
    }
    if let Some(opacity) = fmt.opacity {
        text.set_attr("opacity", opacity);
    }
    if let Some(shadow) = fmt.shadow.as_deref().and_then(TextShadow::parse) {
        let id = doc.next_id("shadow");
        doc.push_def(
            SvgElement::new("filter").attr("id", &id).child(
                SvgElement::new("feDropShadow")
                    .attr("dx", shadow.dx)
                    .attr("dy", shadow.dy)
                    .attr("stdDeviation", shadow.blur)
                    .attr("flood-color", &shadow.color),
            ),
        );
        text.set_attr("filter", format!("url(#{id})"));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/vector.rs"]
mod tests;
