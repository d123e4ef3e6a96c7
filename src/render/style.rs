//! Style strings shared by both backends: font shorthand, text shadow, gradient and filters.

use crate::foundation::color::{Rgba8, parse_css_color};
use crate::page::model::{BorderStyle, TextFormatting};

/// CSS font shorthand: `<style> <weight> <size>px <family>`.
pub fn compose_font(formatting: &TextFormatting, size_px: f64) -> String {
    let style = formatting.font_style.unwrap_or_default().as_css();
    let weight = formatting
        .font_weight
        .map(|w| w.as_css())
        .unwrap_or_else(|| "normal".to_string());
    format!("{style} {weight} {size_px}px {}", formatting.font_family)
}

/// Parse the leading decimal number of `s`, ignoring anything after it. `None` when there is none.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}

/// Text shadow parsed from `"<dx> <dy> <color> [<blur>]"`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextShadow {
    /// Horizontal offset.
    pub dx: f64,
    /// Vertical offset.
    pub dy: f64,
    /// Colour string as written.
    pub color: String,
    /// Blur amount.
    pub blur: f64,
}

impl TextShadow {
    /// Parse a shadow string split on single spaces. Fewer than three parts yields `None`;
    /// numeric parts that do not start with a number read as 0.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(' ').collect();
        if parts.len() < 3 {
            return None;
        }
        let num = |p: Option<&&str>| p.and_then(|p| parse_float_prefix(p)).unwrap_or(0.0);
        Some(Self {
            dx: num(parts.first()),
            dy: num(parts.get(1)),
            color: parts[2].to_string(),
            blur: num(parts.get(3)),
        })
    }

    /// Parsed shadow colour.
    pub fn rgba(&self) -> Option<Rgba8> {
        parse_css_color(&self.color).ok()
    }
}

/// `linear-gradient(<deg>deg, <color>, <color>)`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradientSpec {
    /// Angle in degrees.
    pub angle_deg: f64,
    /// Start colour as written.
    pub from: String,
    /// End colour as written.
    pub to: String,
}

impl LinearGradientSpec {
    /// Parse a gradient string. Anything other than an integer angle in `deg` followed by
    /// exactly two colours yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        const HEAD: &str = "linear-gradient(";
        let start = s.find(HEAD)? + HEAD.len();
        let body = &s[start..];

        let digits_end = body.find(|c: char| !c.is_ascii_digit())?;
        if digits_end == 0 {
            return None;
        }
        let angle_deg: f64 = body[..digits_end].parse().ok()?;
        let rest = body[digits_end..].strip_prefix("deg,")?;

        let args = split_top_level(rest)?;
        let [from, to] = args.as_slice() else {
            return None;
        };
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            return None;
        }
        Some(Self {
            angle_deg,
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Endpoints on a `width x height` surface: `(cos a * w, sin a * h)` to the opposite point.
    pub fn endpoints(&self, width: f64, height: f64) -> ((f64, f64), (f64, f64)) {
        let r = self.angle_deg.to_radians();
        let start = (r.cos() * width, r.sin() * height);
        let end = (
            (r + std::f64::consts::PI).cos() * width,
            (r + std::f64::consts::PI).sin() * height,
        );
        (start, end)
    }
}

// Splits comma separated arguments up to the closing paren of the enclosing call, respecting nested
// parens so `rgb(1, 2, 3)` stays one argument.
fn split_top_level(s: &str) -> Option<Vec<&str>> {
    let mut depth = 0usize;
    let mut args = Vec::new();
    let mut arg_start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                args.push(&s[arg_start..i]);
                return Some(args);
            }
            ')' => depth -= 1,
            ',' if depth == 0 => {
                args.push(&s[arg_start..i]);
                arg_start = i + 1;
            }
            _ => {}
        }
    }
    None
}

/// Image filters honoured by the backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageFilter {
    /// Gaussian blur with the given standard deviation in pixels.
    Blur(f64),
}

impl ImageFilter {
    /// Parse one CSS filter string; only `blur(<digits>px)` is recognized.
    pub fn parse(s: &str) -> Option<Self> {
        let start = s.find("blur(")? + "blur(".len();
        let body = &s[start..];
        let digits_end = body.find(|c: char| !c.is_ascii_digit())?;
        if digits_end == 0 || !body[digits_end..].starts_with("px)") {
            return None;
        }
        body[..digits_end].parse().ok().map(Self::Blur)
    }

    /// Parse every recognized filter in order.
    pub fn parse_all(filters: &[String]) -> Vec<Self> {
        filters.iter().filter_map(|f| Self::parse(f)).collect()
    }
}

/// Dash pattern for a border style.
pub fn dash_pattern(style: BorderStyle) -> Option<[f64; 2]> {
    match style {
        BorderStyle::Solid => None,
        BorderStyle::Dashed => Some([5.0, 5.0]),
        BorderStyle::Dotted => Some([2.0, 2.0]),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/style.rs"]
mod tests;
