//! Declarative page description consumed by the renderers.
//!
//! Field names follow the camelCase JSON documents produced by page authoring tools, so a page can
//! be loaded straight from JSON with [`Page::from_json_str`].

use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{PagevisError, PagevisResult};

/// Page identity: a string or an integer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageId {
    /// Integer identifier.
    Int(i64),
    /// String identifier.
    Str(String),
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// One geometric coordinate: absolute pixels or a `<number><unit>` string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionValue {
    /// Pixels.
    Px(f64),
    /// Unit string such as `"50%"`, `"2em"`, `"10vw"`.
    Unit(String),
}

impl From<f64> for PositionValue {
    fn from(v: f64) -> Self {
        Self::Px(v)
    }
}

impl From<&str> for PositionValue {
    fn from(s: &str) -> Self {
        Self::Unit(s.to_string())
    }
}

/// Horizontal text alignment within a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Draw from the left edge.
    #[default]
    Left,
    /// Center on the block's midpoint.
    Center,
    /// Align to the right edge.
    Right,
    /// Stretch inter-word spacing across the block width.
    Justify,
}

/// Element box within the page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Left edge.
    pub x: PositionValue,
    /// Top edge.
    pub y: PositionValue,
    /// Box width.
    pub width: PositionValue,
    /// Box height.
    pub height: PositionValue,
    /// Text alignment, `left` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
}

impl Position {
    /// Pixel box without explicit alignment.
    pub fn px(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            width: width.into(),
            height: height.into(),
            alignment: None,
        }
    }

    /// Effective alignment.
    pub fn alignment(&self) -> Alignment {
        self.alignment.unwrap_or_default()
    }
}

/// Page background. Layers paint in the order colour, gradient, image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Background {
    /// Solid CSS colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Image URL drawn over the whole surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// `linear-gradient(<deg>deg, <color>, <color>)`; any other syntax is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<String>,
}

/// CSS font style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
    /// Oblique.
    Oblique,
}

impl FontStyle {
    /// CSS keyword.
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
            Self::Oblique => "oblique",
        }
    }
}

/// Keyword font weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeightKeyword {
    /// 400.
    Normal,
    /// 700.
    Bold,
}

/// CSS font weight: numeric (100..=900) or keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    /// Numeric weight.
    Numeric(u16),
    /// `normal` / `bold`.
    Keyword(FontWeightKeyword),
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::Keyword(FontWeightKeyword::Normal)
    }
}

impl FontWeight {
    /// Numeric weight used for font matching.
    pub fn numeric(self) -> u16 {
        match self {
            Self::Numeric(w) => w,
            Self::Keyword(FontWeightKeyword::Normal) => 400,
            Self::Keyword(FontWeightKeyword::Bold) => 700,
        }
    }

    /// CSS value as written.
    pub fn as_css(self) -> String {
        match self {
            Self::Numeric(w) => w.to_string(),
            Self::Keyword(FontWeightKeyword::Normal) => "normal".to_string(),
            Self::Keyword(FontWeightKeyword::Bold) => "bold".to_string(),
        }
    }
}

/// Text decoration line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    /// No decoration.
    None,
    /// Line beneath the final baseline.
    Underline,
    /// Declared; not drawn by either backend.
    LineThrough,
}

/// Text styling for a [`TextBlock`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormatting {
    /// Font size, resolved against a 16px container.
    pub font_size: PositionValue,
    /// CSS font family list, e.g. `"Georgia, serif"`.
    pub font_family: String,
    /// Font style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    /// Font weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// Fill colour.
    pub color: String,
    /// Line advance in pixels; defaults to the font size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// Extra spacing between glyphs, in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    /// Decoration line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    /// `"<dx> <dy> <color> [<blur>]"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<String>,
    /// Opacity in `0..=1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl TextFormatting {
    /// Minimal formatting: size in pixels, family and colour.
    pub fn new(font_size: f64, font_family: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            font_size: PositionValue::Px(font_size),
            font_family: font_family.into(),
            font_style: None,
            font_weight: None,
            color: color.into(),
            line_height: None,
            letter_spacing: None,
            text_decoration: None,
            shadow: None,
            opacity: None,
        }
    }
}

/// Border stroke style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    /// Continuous stroke.
    Solid,
    /// `5,5` dashes.
    Dashed,
    /// `2,2` dashes.
    Dotted,
}

/// Border drawn around an image box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BorderOptions {
    /// Stroke width in pixels.
    pub width: f64,
    /// Stroke style.
    pub style: BorderStyle,
    /// Stroke colour.
    pub color: String,
    /// Corner radius in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

/// Positioned block of wrapped text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    /// Optional element id, the target for animations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Text to wrap and draw.
    pub content: String,
    /// Block box.
    pub position: Position,
    /// Styling.
    pub formatting: TextFormatting,
    /// Stack order, 0 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

/// Positioned image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    /// Optional element id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Image URL.
    pub src: String,
    /// Image box; the image is stretched to fill it.
    pub position: Position,
    /// Stack order, 0 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    /// Accessible description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// CSS filter strings; `blur(<n>px)` is honoured.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    /// Optional border.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderOptions>,
}

/// Layout strategy names. Carried as metadata only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    /// Explicit positions.
    Absolute,
    /// Grid layout.
    Grid,
    /// Flex layout.
    Flex,
}

/// Flex direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlexDirection {
    /// Horizontal.
    Row,
    /// Vertical.
    Column,
}

/// Layout hints. Declared on the page but not enforced by the renderers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Layout strategy.
    #[serde(rename = "type")]
    pub kind: LayoutType,
    /// Grid columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    /// Grid rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// Flex direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<FlexDirection>,
    /// Responsive hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<bool>,
}

/// Declared animation kind. Every kind is applied as an opacity fade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    /// Fade in.
    FadeIn,
    /// Slide.
    Slide,
    /// Rotate.
    Rotate,
}

/// Fire-once animation on an element id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    /// Target element id.
    pub target: String,
    /// Declared kind.
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Transition duration in milliseconds.
    pub duration: f64,
    /// Delay before the opacity flip, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
}

/// Interactive element kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractiveKind {
    /// Button.
    Button,
    /// Link.
    Link,
    /// Input field.
    Input,
    /// Host-defined element.
    Custom,
}

/// Interactive element. Declared only; neither backend draws it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveElement {
    /// Element id.
    pub id: String,
    /// Element kind.
    #[serde(rename = "type")]
    pub kind: InteractiveKind,
    /// Element box.
    pub position: Position,
    /// Label or content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Stack order, 0 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

/// A page: background, images, text blocks and animations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Page identity.
    pub id: PageId,
    /// Optional background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    /// Text blocks in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_blocks: Vec<TextBlock>,
    /// Images in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageElement>,
    /// Layout metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutOptions>,
    /// Animations fired after painting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<Animation>,
    /// Interactive elements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interactive_elements: Vec<InteractiveElement>,
}

impl Page {
    /// Empty page with the given id.
    pub fn new(id: PageId) -> Self {
        Self {
            id,
            background: None,
            text_blocks: Vec::new(),
            images: Vec::new(),
            layout: None,
            animations: Vec::new(),
            interactive_elements: Vec::new(),
        }
    }

    /// Parse a page from JSON. Structural problems are reported as validation errors.
    pub fn from_json_str(s: &str) -> PagevisResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| PagevisError::validation(format!("invalid page json: {e}")))
    }

    /// Read and parse a page JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> PagevisResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read page json from '{}'", path.display()))?;
        Self::from_json_str(&s)
    }
}

/// Elements that take part in stacking order.
pub trait Stacked {
    /// Stack order; 0 when undeclared.
    fn z_index(&self) -> i32;
}

impl Stacked for TextBlock {
    fn z_index(&self) -> i32 {
        self.z_index.unwrap_or(0)
    }
}

impl Stacked for ImageElement {
    fn z_index(&self) -> i32 {
        self.z_index.unwrap_or(0)
    }
}

impl Stacked for InteractiveElement {
    fn z_index(&self) -> i32 {
        self.z_index.unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/model.rs"]
mod tests;
