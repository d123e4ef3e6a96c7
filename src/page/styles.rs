//! Page-wide styles, rendering modes and visualizer configuration.
//!
//! Every type here deserializes from camelCase JSON. [`PartialGlobalStyles`] carries the
//! fields of a style update and merges over the current [`GlobalStyles`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Viewport;
use crate::foundation::error::{PagevisError, PagevisResult};

/// Page insets in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    /// Top inset.
    pub top: f64,
    /// Right inset.
    pub right: f64,
    /// Bottom inset.
    pub bottom: f64,
    /// Left inset.
    pub left: f64,
}

impl Margin {
    /// Same inset on every side.
    pub const fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

/// Built-in theme names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

/// Palette of a [`CustomTheme`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    /// Primary colour.
    pub primary: String,
    /// Secondary colour.
    pub secondary: String,
    /// Background colour.
    pub background: String,
    /// Text colour.
    pub text: String,
    /// Accent colour.
    pub accent: String,
}

/// Font families of a [`CustomTheme`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeFonts {
    /// Body font.
    pub primary: String,
    /// Secondary font.
    pub secondary: String,
    /// Heading font.
    pub heading: String,
}

/// Spacing scale of a [`CustomTheme`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeSpacing {
    /// Small step.
    pub small: f64,
    /// Medium step.
    pub medium: f64,
    /// Large step.
    pub large: f64,
}

/// User-defined theme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomTheme {
    /// Theme name.
    pub name: String,
    /// Palette.
    pub colors: ThemeColors,
    /// Font families.
    pub fonts: ThemeFonts,
    /// Spacing scale.
    pub spacing: ThemeSpacing,
}

/// Named or custom theme. Carried as metadata; the renderers do not consult it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Theme {
    /// `light` / `dark`.
    Named(ThemeName),
    /// Custom theme object.
    Custom(Box<CustomTheme>),
}

impl Default for Theme {
    fn default() -> Self {
        Self::Named(ThemeName::Light)
    }
}

/// Page-wide styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStyles {
    /// Logical page width in pixels.
    pub page_width: f64,
    /// Logical page height in pixels.
    pub page_height: f64,
    /// Page insets. Not applied by the renderers.
    pub margin: Margin,
    /// Theme.
    pub theme: Theme,
}

impl Default for GlobalStyles {
    fn default() -> Self {
        Self {
            page_width: 800.0,
            page_height: 600.0,
            margin: Margin::uniform(20.0),
            theme: Theme::default(),
        }
    }
}

impl GlobalStyles {
    /// Overwrite the fields present in `partial`.
    pub fn merge(&mut self, partial: &PartialGlobalStyles) {
        if let Some(w) = partial.page_width {
            self.page_width = w;
        }
        if let Some(h) = partial.page_height {
            self.page_height = h;
        }
        if let Some(m) = partial.margin {
            self.margin = m;
        }
        if let Some(t) = &partial.theme {
            self.theme = t.clone();
        }
    }

    /// Return a copy with `partial` merged in.
    pub fn merged(&self, partial: &PartialGlobalStyles) -> Self {
        let mut out = self.clone();
        out.merge(partial);
        out
    }
}

/// [`GlobalStyles`] with every field optional, used for construction and updates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialGlobalStyles {
    /// Page width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_width: Option<f64>,
    /// Page height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_height: Option<f64>,
    /// Page insets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    /// Theme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl PartialGlobalStyles {
    /// Partial styles that only change the page size.
    pub fn size(page_width: f64, page_height: f64) -> Self {
        Self {
            page_width: Some(page_width),
            page_height: Some(page_height),
            ..Self::default()
        }
    }
}

/// Surface backend selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderingMode {
    /// Pixel surface.
    #[default]
    #[serde(alias = "canvas")]
    Raster,
    /// Vector markup surface.
    #[serde(alias = "svg")]
    Vector,
    /// Declared but not implemented.
    Dom,
}

/// Construction options for a visualizer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizerConfig {
    /// Backend, `raster` when absent.
    #[serde(default)]
    pub mode: RenderingMode,
    /// Styles merged over [`GlobalStyles::default`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_styles: Option<PartialGlobalStyles>,
    /// Viewport for `vw`/`vh`; the surface size when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    /// Extra font directories for the raster text shaper.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub font_dirs: Vec<PathBuf>,
}

impl VisualizerConfig {
    /// Config for `mode` with default styles.
    pub fn new(mode: RenderingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parse a config from JSON. Structural problems are reported as validation errors.
    pub fn from_json_str(s: &str) -> PagevisResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| PagevisError::validation(format!("invalid visualizer config json: {e}")))
    }

    /// Default styles with the configured partial styles merged in.
    pub fn resolved_styles(&self) -> GlobalStyles {
        let mut styles = GlobalStyles::default();
        if let Some(partial) = &self.global_styles {
            styles.merge(partial);
        }
        styles
    }
}

/// Export formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG data URL (raster only).
    Png,
    /// JPEG data URL (raster only).
    Jpeg,
    /// Always unsupported.
    Pdf,
    /// SVG data URL (vector only).
    Svg,
}

impl ExportFormat {
    /// Lowercase format name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Pdf => "pdf",
            Self::Svg => "svg",
        }
    }
}

/// Export request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Output format.
    pub format: ExportFormat,
    /// Lossy quality in `0..=1` (JPEG only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    /// Suggested file name. Not used by the encoders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ExportOptions {
    /// Options for `format` with default quality.
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            quality: None,
            filename: None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/styles.rs"]
mod tests;
