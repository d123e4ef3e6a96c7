use std::str::FromStr;

use crate::foundation::error::{PagevisError, PagevisResult};

/// Straight (non-premultiplied) RGBA8 colour parsed from CSS syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Build a colour from raw channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a colour from normalized `0..=1` channels.
    pub fn from_unit(r: f64, g: f64, b: f64, a: f64) -> Self {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
            a: to_u8(a),
        }
    }

    /// Premultiplied `[r, g, b, a]` bytes.
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { ((u16::from(c) * a + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

impl FromStr for Rgba8 {
    type Err = PagevisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_css_color(s)
    }
}

/// Return `true` when `s` passes the colour rule applied at the validation boundary:
/// `#RRGGBB`, or a string starting with `rgb(`, `rgba(`, `hsl(` or `hsla(`.
pub fn is_css_color_syntax(s: &str) -> bool {
    if let Some(hex) = s.strip_prefix('#') {
        return hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    ["rgb(", "rgba(", "hsl(", "hsla("]
        .iter()
        .any(|prefix| s.starts_with(prefix))
        && parse_css_color(s).is_ok()
}

/// Parse a CSS colour: hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), `rgb()`/`rgba()`,
/// `hsl()`/`hsla()` or a basic named colour.
pub fn parse_css_color(s: &str) -> PagevisResult<Rgba8> {
    let s = s.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some((name, rest)) = s.split_once('(') {
        let args = rest
            .strip_suffix(')')
            .ok_or_else(|| PagevisError::parse(format!("unterminated colour function \"{s}\"")))?;
        let args = split_args(args);
        return match name.trim() {
            "rgb" | "rgba" => parse_rgb_args(&args, &s),
            "hsl" | "hsla" => parse_hsl_args(&args, &s),
            other => Err(PagevisError::parse(format!(
                "unknown colour function \"{other}\""
            ))),
        };
    }
    named_color(&s).ok_or_else(|| PagevisError::parse(format!("unrecognized colour \"{s}\"")))
}

fn parse_hex(hex: &str) -> PagevisResult<Rgba8> {
    fn nibble(c: u8) -> PagevisResult<u8> {
        (c as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| PagevisError::parse(format!("invalid hex digit '{}'", c as char)))
    }
    fn byte(pair: &[u8]) -> PagevisResult<u8> {
        Ok(nibble(pair[0])? * 16 + nibble(pair[1])?)
    }

    let b = hex.as_bytes();
    match b.len() {
        3 | 4 => {
            let mut ch = [255u8; 4];
            for (i, &c) in b.iter().enumerate() {
                let n = nibble(c)?;
                ch[i] = n * 16 + n;
            }
            Ok(Rgba8::rgba(ch[0], ch[1], ch[2], ch[3]))
        }
        6 => Ok(Rgba8::rgba(byte(&b[0..2])?, byte(&b[2..4])?, byte(&b[4..6])?, 255)),
        8 => Ok(Rgba8::rgba(
            byte(&b[0..2])?,
            byte(&b[2..4])?,
            byte(&b[4..6])?,
            byte(&b[6..8])?,
        )),
        _ => Err(PagevisError::parse(
            "hex colour must have 3, 4, 6 or 8 digits",
        )),
    }
}

// Accepts both the legacy comma syntax and the space / slash syntax.
fn split_args(args: &str) -> Vec<String> {
    if args.contains(',') {
        args.split(',').map(|a| a.trim().to_string()).collect()
    } else {
        args.split(|c: char| c.is_whitespace() || c == '/')
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn parse_number(arg: &str, src: &str) -> PagevisResult<f64> {
    let v: f64 = arg
        .parse()
        .map_err(|_| PagevisError::parse(format!("invalid number \"{arg}\" in \"{src}\"")))?;
    if !v.is_finite() {
        return Err(PagevisError::parse(format!("non-finite number in \"{src}\"")));
    }
    Ok(v)
}

// Returns a value normalized to 0..=1.
fn parse_channel(arg: &str, src: &str) -> PagevisResult<f64> {
    match arg.strip_suffix('%') {
        Some(pct) => Ok(parse_number(pct, src)? / 100.0),
        None => Ok(parse_number(arg, src)? / 255.0),
    }
}

fn parse_alpha(arg: Option<&String>, src: &str) -> PagevisResult<f64> {
    match arg {
        None => Ok(1.0),
        Some(a) => match a.strip_suffix('%') {
            Some(pct) => Ok(parse_number(pct, src)? / 100.0),
            None => parse_number(a, src),
        },
    }
}

fn parse_rgb_args(args: &[String], src: &str) -> PagevisResult<Rgba8> {
    if args.len() != 3 && args.len() != 4 {
        return Err(PagevisError::parse(format!(
            "rgb colour needs 3 or 4 components: \"{src}\""
        )));
    }
    Ok(Rgba8::from_unit(
        parse_channel(&args[0], src)?,
        parse_channel(&args[1], src)?,
        parse_channel(&args[2], src)?,
        parse_alpha(args.get(3), src)?,
    ))
}

fn parse_hsl_args(args: &[String], src: &str) -> PagevisResult<Rgba8> {
    if args.len() != 3 && args.len() != 4 {
        return Err(PagevisError::parse(format!(
            "hsl colour needs 3 or 4 components: \"{src}\""
        )));
    }
    let hue = args[0].strip_suffix("deg").unwrap_or(&args[0]);
    let h = parse_number(hue, src)?;
    let pct = |a: &str| -> PagevisResult<f64> {
        let v = a.strip_suffix('%').unwrap_or(a);
        Ok(parse_number(v, src)? / 100.0)
    };
    let (r, g, b) = hsl_to_rgb(h, pct(&args[1])?, pct(&args[2])?);
    Ok(Rgba8::from_unit(r, g, b, parse_alpha(args.get(3), src)?))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return (l, l, l);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn named_color(name: &str) -> Option<Rgba8> {
    let c = match name {
        "transparent" => Rgba8::rgba(0, 0, 0, 0),
        "black" => Rgba8::rgba(0, 0, 0, 255),
        "white" => Rgba8::rgba(255, 255, 255, 255),
        "red" => Rgba8::rgba(255, 0, 0, 255),
        "green" => Rgba8::rgba(0, 128, 0, 255),
        "lime" => Rgba8::rgba(0, 255, 0, 255),
        "blue" => Rgba8::rgba(0, 0, 255, 255),
        "yellow" => Rgba8::rgba(255, 255, 0, 255),
        "orange" => Rgba8::rgba(255, 165, 0, 255),
        "purple" => Rgba8::rgba(128, 0, 128, 255),
        "gray" | "grey" => Rgba8::rgba(128, 128, 128, 255),
        "silver" => Rgba8::rgba(192, 192, 192, 255),
        "navy" => Rgba8::rgba(0, 0, 128, 255),
        "teal" => Rgba8::rgba(0, 128, 128, 255),
        "maroon" => Rgba8::rgba(128, 0, 0, 255),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
