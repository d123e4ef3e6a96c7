use super::*;
use crate::page::model::{FontStyle, FontWeight, FontWeightKeyword};

#[test]
fn font_shorthand() {
    let mut f = TextFormatting::new(18.0, "Georgia, serif", "#000000");
    assert_eq!(compose_font(&f, 18.0), "normal normal 18px Georgia, serif");
    f.font_style = Some(FontStyle::Italic);
    f.font_weight = Some(FontWeight::Keyword(FontWeightKeyword::Bold));
    assert_eq!(compose_font(&f, 12.5), "italic bold 12.5px Georgia, serif");
    f.font_weight = Some(FontWeight::Numeric(300));
    assert_eq!(compose_font(&f, 10.0), "italic 300 10px Georgia, serif");
}

#[test]
fn float_prefix_is_lenient() {
    assert_eq!(parse_float_prefix("2px"), Some(2.0));
    assert_eq!(parse_float_prefix("-1.5"), Some(-1.5));
    assert_eq!(parse_float_prefix(".5em"), Some(0.5));
    assert_eq!(parse_float_prefix("3."), Some(3.0));
    assert_eq!(parse_float_prefix("1e2x"), Some(100.0));
    assert_eq!(parse_float_prefix("4e"), Some(4.0));
    assert_eq!(parse_float_prefix("px"), None);
    assert_eq!(parse_float_prefix("-"), None);
    assert_eq!(parse_float_prefix(""), None);
}

#[test]
fn shadow_parsing() {
    let s = TextShadow::parse("2px 3px #ff0000 4px").unwrap();
    assert_eq!((s.dx, s.dy, s.blur), (2.0, 3.0, 4.0));
    assert_eq!(s.color, "#ff0000");
    assert_eq!(s.rgba(), Some(Rgba8::rgba(255, 0, 0, 255)));

    let s = TextShadow::parse("a b black").unwrap();
    assert_eq!((s.dx, s.dy, s.blur), (0.0, 0.0, 0.0));

    assert!(TextShadow::parse("1 2").is_none());
    assert!(TextShadow::parse("1 2 nocolor").unwrap().rgba().is_none());
}

#[test]
fn gradient_parsing() {
    let g = LinearGradientSpec::parse("linear-gradient(45deg, #ff0000, #0000ff)").unwrap();
    assert_eq!(g.angle_deg, 45.0);
    assert_eq!((g.from.as_str(), g.to.as_str()), ("#ff0000", "#0000ff"));

    let g = LinearGradientSpec::parse("linear-gradient(90deg,rgb(1, 2, 3), rgba(0,0,0,0.5))").unwrap();
    assert_eq!(g.from, "rgb(1, 2, 3)");
    assert_eq!(g.to, "rgba(0,0,0,0.5)");

    for bad in [
        "linear-gradient(to right, red, blue)",
        "linear-gradient(45 deg, red, blue)",
        "linear-gradient(-45deg, red, blue)",
        "linear-gradient(45deg, red)",
        "linear-gradient(45deg, red, blue, green)",
        "linear-gradient(45deg, red, blue",
        "radial-gradient(45deg, red, blue)",
        "garbage",
    ] {
        assert!(LinearGradientSpec::parse(bad).is_none(), "{bad}");
    }
}

#[test]
fn gradient_endpoints_mirror_through_origin() {
    let g = LinearGradientSpec::parse("linear-gradient(0deg, red, blue)").unwrap();
    let ((sx, sy), (ex, ey)) = g.endpoints(200.0, 100.0);
    assert_eq!((sx, sy), (200.0, 0.0));
    assert!((ex + 200.0).abs() < 1e-9 && ey.abs() < 1e-9);
}

#[test]
fn filters() {
    assert_eq!(ImageFilter::parse("blur(4px)"), Some(ImageFilter::Blur(4.0)));
    assert_eq!(ImageFilter::parse("blur(1.5px)"), None);
    assert_eq!(ImageFilter::parse("grayscale(1)"), None);
    let all = ImageFilter::parse_all(&["sepia(1)".to_string(), "blur(2px)".to_string()]);
    assert_eq!(all, vec![ImageFilter::Blur(2.0)]);
}

#[test]
fn dashes() {
    assert_eq!(dash_pattern(BorderStyle::Solid), None);
    assert_eq!(dash_pattern(BorderStyle::Dashed), Some([5.0, 5.0]));
    assert_eq!(dash_pattern(BorderStyle::Dotted), Some([2.0, 2.0]));
}
