use super::*;

const SAMPLE: &str = r##"{
  "id": "chapter-1",
  "background": { "color": "#fafafa", "gradient": "linear-gradient(90deg, #ff0000, #0000ff)" },
  "textBlocks": [
    {
      "id": "title",
      "content": "Once upon a time",
      "position": { "x": 10, "y": "5%", "width": "80%", "height": 40, "alignment": "center" },
      "formatting": {
        "fontSize": "2em",
        "fontFamily": "Georgia, serif",
        "fontWeight": "bold",
        "color": "#202020",
        "textDecoration": "underline"
      },
      "zIndex": 2
    }
  ],
  "images": [
    {
      "src": "file:///tmp/panel.png",
      "position": { "x": 0, "y": 0, "width": 100, "height": 100 },
      "altText": "panel",
      "filters": ["blur(2px)"],
      "border": { "width": 2, "style": "dashed", "color": "#000000", "radius": 4 }
    }
  ],
  "layout": { "type": "grid", "columns": 2 },
  "animations": [ { "target": "title", "type": "fadeIn", "duration": 300, "delay": 50 } ],
  "interactiveElements": [
    { "id": "next", "type": "button", "position": { "x": 0, "y": 0, "width": 10, "height": 10 } }
  ]
}"##;

#[test]
fn parses_camel_case_page_json() {
    let page = Page::from_json_str(SAMPLE).unwrap();
    assert_eq!(page.id, PageId::Str("chapter-1".to_string()));
    assert_eq!(page.text_blocks.len(), 1);

    let block = &page.text_blocks[0];
    assert_eq!(block.position.y, PositionValue::Unit("5%".to_string()));
    assert_eq!(block.position.x, PositionValue::Px(10.0));
    assert_eq!(block.position.alignment(), Alignment::Center);
    assert_eq!(
        block.formatting.font_weight,
        Some(FontWeight::Keyword(FontWeightKeyword::Bold))
    );
    assert_eq!(
        block.formatting.text_decoration,
        Some(TextDecoration::Underline)
    );
    assert_eq!(block.z_index(), 2);

    let image = &page.images[0];
    assert_eq!(image.z_index(), 0);
    assert_eq!(image.filters, vec!["blur(2px)".to_string()]);
    assert_eq!(image.border.as_ref().unwrap().style, BorderStyle::Dashed);

    assert_eq!(page.layout.as_ref().unwrap().kind, LayoutType::Grid);
    assert_eq!(page.animations[0].kind, AnimationKind::FadeIn);
    assert_eq!(page.animations[0].delay, Some(50.0));
    assert_eq!(page.interactive_elements[0].kind, InteractiveKind::Button);
}

#[test]
fn integer_ids_and_missing_collections() {
    let page = Page::from_json_str(r#"{ "id": 7 }"#).unwrap();
    assert_eq!(page.id, PageId::Int(7));
    assert_eq!(page.id.to_string(), "7");
    assert!(page.text_blocks.is_empty());
    assert!(page.images.is_empty());
    assert!(page.background.is_none());
}

#[test]
fn unknown_enum_values_are_validation_errors() {
    let err = Page::from_json_str(
        r#"{ "id": 1, "animations": [ { "target": "a", "type": "spin", "duration": 1 } ] }"#,
    )
    .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn serializes_back_to_camel_case() {
    let page = Page::from_json_str(SAMPLE).unwrap();
    let json = serde_json::to_value(&page).unwrap();
    assert!(json.get("textBlocks").is_some());
    assert_eq!(json["textBlocks"][0]["zIndex"], 2);
    assert_eq!(json["textBlocks"][0]["formatting"]["fontFamily"], "Georgia, serif");
    assert_eq!(json["layout"]["type"], "grid");
}

#[test]
fn font_weight_numeric_mapping() {
    assert_eq!(FontWeight::Numeric(300).numeric(), 300);
    assert_eq!(FontWeight::default().numeric(), 400);
    assert_eq!(FontWeight::Keyword(FontWeightKeyword::Bold).as_css(), "bold");
}
