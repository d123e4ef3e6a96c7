//! Structural checks for pages, configs, styles and export options.
//!
//! Each checker collects every violation with its field path and reports them together as one
//! [`PagevisError::Validation`].

use std::fmt;

use crate::foundation::color::is_css_color_syntax;
use crate::foundation::core::MAX_SURFACE_DIM;
use crate::foundation::error::{PagevisError, PagevisResult};
use crate::layout::units::is_unit_syntax;
use crate::page::model::{
    Animation, Background, BorderOptions, FontWeight, ImageElement, InteractiveElement,
    LayoutOptions, Page, Position, PositionValue, TextBlock, TextFormatting,
};
use crate::page::styles::{
    CustomTheme, ExportOptions, GlobalStyles, Margin, PartialGlobalStyles, Theme,
    VisualizerConfig,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Index(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaError {
    pub(crate) path: Vec<SchemaPathElem>,
    pub(crate) message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaErrors {
    pub(crate) errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

impl From<SchemaErrors> for PagevisError {
    fn from(value: SchemaErrors) -> Self {
        PagevisError::validation(value.to_string())
    }
}

/// Walks a payload, tracking the JSON path and collecting every violation.
struct Checker {
    path: Vec<SchemaPathElem>,
    errors: Vec<SchemaError>,
}

impl Checker {
    fn new() -> Self {
        Self {
            path: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn field(&mut self, name: &'static str, f: impl FnOnce(&mut Self)) {
        self.path.push(SchemaPathElem::Field(name));
        f(self);
        self.path.pop();
    }

    fn each<T>(&mut self, name: &'static str, items: &[T], mut f: impl FnMut(&mut Self, &T)) {
        self.path.push(SchemaPathElem::Field(name));
        for (i, item) in items.iter().enumerate() {
            self.path.push(SchemaPathElem::Index(i));
            f(self, item);
            self.path.pop();
        }
        self.path.pop();
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(SchemaError::at(&self.path, message));
    }

    fn check(&mut self, ok: bool, name: &'static str, message: &str) {
        if !ok {
            self.field(name, |c| c.fail(message));
        }
    }

    fn color(&mut self, name: &'static str, value: &str) {
        self.check(
            is_css_color_syntax(value),
            name,
            "must be #RRGGBB or an rgb(), rgba(), hsl() or hsla() colour",
        );
    }

    fn non_empty(&mut self, name: &'static str, value: &str) {
        self.check(!value.is_empty(), name, "must not be empty");
    }

    fn url(&mut self, name: &'static str, value: &str) {
        self.check(
            url::Url::parse(value).is_ok(),
            name,
            "must be an absolute URL",
        );
    }

    fn positive(&mut self, name: &'static str, value: f64) {
        self.check(value.is_finite() && value > 0.0, name, "must be > 0");
    }

    fn non_negative(&mut self, name: &'static str, value: f64) {
        self.check(value.is_finite() && value >= 0.0, name, "must be >= 0");
    }

    fn unit_interval(&mut self, name: &'static str, value: f64) {
        self.check(
            (0.0..=1.0).contains(&value),
            name,
            "must be between 0 and 1",
        );
    }

    fn finish(self) -> PagevisResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaErrors {
                errors: self.errors,
            }
            .into())
        }
    }
}

/// Validate a page before it reaches a renderer.
///
/// Every violation is reported, each prefixed with its JSON path.
pub fn validate_page(page: &Page) -> PagevisResult<()> {
    let mut c = Checker::new();
    if let Some(bg) = &page.background {
        c.field("background", |c| background(c, bg));
    }
    c.each("textBlocks", &page.text_blocks, text_block);
    c.each("images", &page.images, image);
    if let Some(layout) = &page.layout {
        c.field("layout", |c| layout_options(c, layout));
    }
    c.each("animations", &page.animations, animation);
    c.each("interactiveElements", &page.interactive_elements, interactive);
    c.finish()
}

/// Validate construction options.
pub fn validate_config(config: &VisualizerConfig) -> PagevisResult<()> {
    let mut c = Checker::new();
    if let Some(partial) = &config.global_styles {
        c.field("globalStyles", |c| partial_styles(c, partial));
    }
    if let Some(vp) = &config.viewport {
        c.field("viewport", |c| {
            c.positive("width", vp.width);
            c.positive("height", vp.height);
        });
    }
    c.finish()
}

/// Validate a complete set of global styles.
pub fn validate_global_styles(styles: &GlobalStyles) -> PagevisResult<()> {
    let mut c = Checker::new();
    page_dimension(&mut c, "pageWidth", styles.page_width);
    page_dimension(&mut c, "pageHeight", styles.page_height);
    c.field("margin", |c| margin(c, &styles.margin));
    c.field("theme", |c| theme(c, &styles.theme));
    c.finish()
}

/// Validate partial global styles passed to an update.
pub fn validate_partial_styles(partial: &PartialGlobalStyles) -> PagevisResult<()> {
    let mut c = Checker::new();
    partial_styles(&mut c, partial);
    c.finish()
}

/// Validate an export request.
pub fn validate_export_options(options: &ExportOptions) -> PagevisResult<()> {
    let mut c = Checker::new();
    if let Some(q) = options.quality {
        c.unit_interval("quality", q);
    }
    c.finish()
}

fn partial_styles(c: &mut Checker, partial: &PartialGlobalStyles) {
    if let Some(w) = partial.page_width {
        page_dimension(c, "pageWidth", w);
    }
    if let Some(h) = partial.page_height {
        page_dimension(c, "pageHeight", h);
    }
    if let Some(m) = &partial.margin {
        c.field("margin", |c| margin(c, m));
    }
    if let Some(t) = &partial.theme {
        c.field("theme", |c| theme(c, t));
    }
}

fn page_dimension(c: &mut Checker, name: &'static str, v: f64) {
    c.positive(name, v);
    c.check(
        !v.is_finite() || v.round() <= f64::from(MAX_SURFACE_DIM),
        name,
        "exceeds the largest supported surface",
    );
}

fn margin(c: &mut Checker, m: &Margin) {
    c.non_negative("top", m.top);
    c.non_negative("right", m.right);
    c.non_negative("bottom", m.bottom);
    c.non_negative("left", m.left);
}

fn theme(c: &mut Checker, t: &Theme) {
    if let Theme::Custom(custom) = t {
        custom_theme(c, custom);
    }
}

fn custom_theme(c: &mut Checker, t: &CustomTheme) {
    c.non_empty("name", &t.name);
    c.field("colors", |c| {
        c.color("primary", &t.colors.primary);
        c.color("secondary", &t.colors.secondary);
        c.color("background", &t.colors.background);
        c.color("text", &t.colors.text);
        c.color("accent", &t.colors.accent);
    });
    c.field("fonts", |c| {
        c.non_empty("primary", &t.fonts.primary);
        c.non_empty("secondary", &t.fonts.secondary);
        c.non_empty("heading", &t.fonts.heading);
    });
    c.field("spacing", |c| {
        c.positive("small", t.spacing.small);
        c.positive("medium", t.spacing.medium);
        c.positive("large", t.spacing.large);
    });
}

fn position_value(c: &mut Checker, name: &'static str, v: &PositionValue) {
    match v {
        PositionValue::Px(px) => c.non_negative(name, *px),
        PositionValue::Unit(s) => c.check(
            is_unit_syntax(s),
            name,
            "must match <number>(px|%|vw|vh|em|rem)",
        ),
    }
}

fn position(c: &mut Checker, p: &Position) {
    position_value(c, "x", &p.x);
    position_value(c, "y", &p.y);
    position_value(c, "width", &p.width);
    position_value(c, "height", &p.height);
}

fn background(c: &mut Checker, bg: &Background) {
    if let Some(color) = &bg.color {
        c.color("color", color);
    }
    if let Some(image) = &bg.image {
        c.url("image", image);
    }
}

fn formatting(c: &mut Checker, f: &TextFormatting) {
    match &f.font_size {
        PositionValue::Px(px) => c.positive("fontSize", *px),
        PositionValue::Unit(s) => c.check(
            is_unit_syntax(s),
            "fontSize",
            "must match <number>(px|%|vw|vh|em|rem)",
        ),
    }
    c.non_empty("fontFamily", &f.font_family);
    if let Some(FontWeight::Numeric(w)) = f.font_weight {
        c.check(
            (100..=900).contains(&w),
            "fontWeight",
            "must be between 100 and 900",
        );
    }
    c.color("color", &f.color);
    if let Some(lh) = f.line_height {
        c.positive("lineHeight", lh);
    }
    if let Some(ls) = f.letter_spacing {
        c.check(ls.is_finite(), "letterSpacing", "must be finite");
    }
    if let Some(o) = f.opacity {
        c.unit_interval("opacity", o);
    }
}

fn text_block(c: &mut Checker, b: &TextBlock) {
    c.field("position", |c| position(c, &b.position));
    c.field("formatting", |c| formatting(c, &b.formatting));
}

fn border(c: &mut Checker, b: &BorderOptions) {
    c.non_negative("width", b.width);
    c.color("color", &b.color);
    if let Some(r) = b.radius {
        c.non_negative("radius", r);
    }
}

fn image(c: &mut Checker, img: &ImageElement) {
    c.url("src", &img.src);
    c.field("position", |c| position(c, &img.position));
    if let Some(b) = &img.border {
        c.field("border", |c| border(c, b));
    }
}

fn layout_options(c: &mut Checker, l: &LayoutOptions) {
    if let Some(cols) = l.columns {
        c.check(cols > 0, "columns", "must be > 0");
    }
    if let Some(rows) = l.rows {
        c.check(rows > 0, "rows", "must be > 0");
    }
}

fn animation(c: &mut Checker, a: &Animation) {
    c.non_empty("target", &a.target);
    c.positive("duration", a.duration);
    if let Some(d) = a.delay {
        c.non_negative("delay", d);
    }
}

fn interactive(c: &mut Checker, e: &InteractiveElement) {
    c.non_empty("id", &e.id);
    c.field("position", |c| position(c, &e.position));
}

#[cfg(test)]
#[path = "../../tests/unit/schema/validate.rs"]
mod tests;
