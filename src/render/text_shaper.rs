//! Parley text measurement and glyph painting for the raster surface.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::assets::fonts::FontLibrary;
use crate::foundation::color::Rgba8;
use crate::layout::text::TextMeasurer;
use crate::page::model::FontStyle;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// A face registered with the shaper, ready to shape and paint.
#[derive(Clone, Debug)]
pub(crate) struct ShapedFace {
    family: String,
    font: vello_cpu::peniko::FontData,
}

/// Shapes single lines of text with faces picked from a [`FontLibrary`].
pub(crate) struct TextShaper {
    fonts: FontLibrary,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    // Keyed by "<style> <weight> <families>"; `None` records a lookup that found nothing.
    faces: HashMap<String, Option<ShapedFace>>,
}

impl TextShaper {
    pub(crate) fn new(fonts: FontLibrary) -> Self {
        Self {
            fonts,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
        }
    }

    /// Face for a CSS family list, or `None` when the library has no usable face.
    pub(crate) fn face(
        &mut self,
        families: &str,
        weight: u16,
        style: FontStyle,
    ) -> Option<ShapedFace> {
        let key = format!("{} {weight} {families}", style.as_css());
        if let Some(face) = self.faces.get(&key) {
            return face.clone();
        }
        let face = self.load_face(families, weight, style);
        if face.is_none() {
            tracing::warn!(font = %key, "no font face available, glyphs are not drawn");
        }
        self.faces.insert(key, face.clone());
        face
    }

    fn load_face(&mut self, families: &str, weight: u16, style: FontStyle) -> Option<ShapedFace> {
        let resolved = self.fonts.resolve(families, weight, style)?;
        let registered = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(resolved.data.as_ref().clone()),
            None,
        );
        let collection = &mut self.font_ctx.collection;
        let names: Vec<String> = registered
            .iter()
            .filter_map(|(id, _)| collection.family_name(*id).map(str::to_string))
            .collect();
        let family = names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(&resolved.family))
            .or_else(|| names.first())
            .cloned()?;

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(resolved.data.as_ref().clone()),
            resolved.index,
        );
        Some(ShapedFace { family, font })
    }

    fn layout(
        &mut self,
        face: &ShapedFace,
        size_px: f32,
        text: &str,
        brush: TextBrush,
    ) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Advance width of `text`, trailing spaces included.
    pub(crate) fn measure(&mut self, face: &ShapedFace, size_px: f32, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let layout = self.layout(face, size_px, text, TextBrush::default());
        f64::from(layout.full_width())
    }

    /// Paint `text` on one line with its top-left corner at `(x, top)`.
    pub(crate) fn fill_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        face: &ShapedFace,
        size_px: f32,
        text: &str,
        (x, top): (f64, f64),
        color: Rgba8,
    ) {
        if text.is_empty() {
            return;
        }
        let brush = TextBrush {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        let layout = self.layout(face, size_px, text, brush);

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, top)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&face.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

/// Measurer for one text block: shaped advances when a face is available, the approximation
/// otherwise.
pub(crate) enum BlockMeasurer<'a> {
    Shaped {
        shaper: &'a mut TextShaper,
        face: &'a ShapedFace,
        size_px: f32,
    },
    Approx(crate::layout::text::ApproxMeasurer),
}

impl TextMeasurer for BlockMeasurer<'_> {
    fn measure(&mut self, text: &str) -> f64 {
        match self {
            Self::Shaped {
                shaper,
                face,
                size_px,
            } => shaper.measure(face, *size_px, text),
            Self::Approx(m) => m.measure(text),
        }
    }
}
