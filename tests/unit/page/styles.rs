use super::*;

#[test]
fn defaults_match_documented_values() {
    let s = GlobalStyles::default();
    assert_eq!(s.page_width, 800.0);
    assert_eq!(s.page_height, 600.0);
    assert_eq!(s.margin, Margin::uniform(20.0));
    assert_eq!(s.theme, Theme::Named(ThemeName::Light));
}

#[test]
fn merge_only_overwrites_present_fields() {
    let mut s = GlobalStyles::default();
    s.merge(&PartialGlobalStyles {
        page_height: Some(1000.0),
        theme: Some(Theme::Named(ThemeName::Dark)),
        ..PartialGlobalStyles::default()
    });
    assert_eq!(s.page_width, 800.0);
    assert_eq!(s.page_height, 1000.0);
    assert_eq!(s.theme, Theme::Named(ThemeName::Dark));
    assert_eq!(s.margin.left, 20.0);
}

#[test]
fn config_accepts_mode_aliases() {
    let c = VisualizerConfig::from_json_str(r#"{ "mode": "svg" }"#).unwrap();
    assert_eq!(c.mode, RenderingMode::Vector);
    let c = VisualizerConfig::from_json_str(r#"{ "mode": "canvas" }"#).unwrap();
    assert_eq!(c.mode, RenderingMode::Raster);
    let c = VisualizerConfig::from_json_str("{}").unwrap();
    assert_eq!(c.mode, RenderingMode::Raster);
    assert!(VisualizerConfig::from_json_str(r#"{ "mode": "webgl" }"#).is_err());
}

#[test]
fn config_resolves_partial_styles_and_custom_theme() {
    let c = VisualizerConfig::from_json_str(
        r##"{
          "mode": "vector",
          "globalStyles": {
            "pageWidth": 400,
            "theme": {
              "name": "sepia",
              "colors": { "primary": "#704214", "secondary": "#a0522d", "background": "#f4ecd8",
                          "text": "#3b2f2f", "accent": "#c19a6b" },
              "fonts": { "primary": "Georgia", "secondary": "Times", "heading": "Georgia" },
              "spacing": { "small": 4, "medium": 8, "large": 16 }
            }
          },
          "viewport": { "width": 1280, "height": 720 }
        }"##,
    )
    .unwrap();
    let styles = c.resolved_styles();
    assert_eq!(styles.page_width, 400.0);
    assert_eq!(styles.page_height, 600.0);
    match styles.theme {
        Theme::Custom(t) => assert_eq!(t.name, "sepia"),
        other => panic!("expected custom theme, got {other:?}"),
    }
    assert_eq!(c.viewport.unwrap().width, 1280.0);
}

#[test]
fn export_options_parse() {
    let o: ExportOptions = serde_json::from_str(r#"{ "format": "jpeg", "quality": 0.8 }"#).unwrap();
    assert_eq!(o.format, ExportFormat::Jpeg);
    assert_eq!(o.quality, Some(0.8));
    assert_eq!(ExportFormat::Svg.as_str(), "svg");
}
