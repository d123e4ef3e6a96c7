use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::page::model::{
    Animation, AnimationKind, BorderStyle, FontStyle, PageId, Position, TextFormatting,
};
use crate::render::animation::{DetachedScene, InMemorySceneGraph};
use crate::render::svg::SvgNode;

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn renderer_with(
    w: u32,
    h: u32,
    sources: HashMap<&'static str, Vec<u8>>,
) -> (VectorRenderer, RenderingContext, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let loader = move |src: &str| -> PagevisResult<Vec<u8>> {
        counter.fetch_add(1, Ordering::SeqCst);
        sources
            .get(src)
            .cloned()
            .ok_or_else(|| PagevisError::asset_load(format!("no such image {src}")))
    };
    let ctx = RenderingContext::new(w, h);
    let deps = RendererDeps {
        loader: Box::new(loader),
        fonts: FontLibrary::empty(),
    };
    (VectorRenderer::new(&ctx, deps), ctx, loads)
}

fn render(r: &mut VectorRenderer, ctx: &RenderingContext, page: &Page) {
    let viewport = ctx.viewport();
    r.render_page(page, ctx, viewport, &mut DetachedScene).unwrap();
}

fn body(r: &VectorRenderer) -> Vec<SvgElement> {
    r.document().unwrap().body().to_vec()
}

fn block(content: &str, pos: Position, fmt: TextFormatting) -> TextBlock {
    TextBlock {
        id: None,
        content: content.to_string(),
        position: pos,
        formatting: fmt,
        z_index: None,
    }
}

fn image_el(src: &str, pos: Position) -> ImageElement {
    ImageElement {
        id: None,
        src: src.to_string(),
        position: pos,
        z_index: None,
        alt_text: None,
        filters: Vec::new(),
        border: None,
    }
}

#[test]
fn background_colour_and_gradient() {
    let (mut r, ctx, _) = renderer_with(30, 20, HashMap::new());
    let mut p = Page::new(PageId::Int(1));
    p.background = Some(Background {
        color: Some("#fff".to_string()),
        gradient: Some("linear-gradient(45deg, red, blue)".to_string()),
        image: None,
    });
    render(&mut r, &ctx, &p);

    let els = body(&r);
    assert_eq!(els.len(), 2);
    assert_eq!(els[0].get_attr("fill"), Some("#fff"));
    assert_eq!(els[0].get_attr("width"), Some("30"));
    assert_eq!(els[1].get_attr("fill"), Some("url(#gradient-0)"));

    let defs = r.document().unwrap().defs();
    assert_eq!(defs[0].name, "linearGradient");
    assert_eq!(defs[0].get_attr("gradientTransform"), Some("rotate(45)"));
    assert_eq!(defs[0].children.len(), 2);
}

#[test]
fn malformed_gradient_is_skipped() {
    let (mut r, ctx, _) = renderer_with(30, 20, HashMap::new());
    let mut p = Page::new(PageId::Int(1));
    p.background = Some(Background {
        gradient: Some("linear-gradient(red, blue)".to_string()),
        ..Background::default()
    });
    render(&mut r, &ctx, &p);
    assert!(r.document().unwrap().is_empty());
}

#[test]
fn single_line_text_is_anchored() {
    let (mut r, ctx, _) = renderer_with(200, 100, HashMap::new());
    let mut p = Page::new(PageId::Int(1));
    let mut fmt = TextFormatting::new(16.0, "Georgia", "#123456");
    fmt.font_style = Some(FontStyle::Italic);
    fmt.opacity = Some(0.5);
    let mut pos = Position::px(10.0, 20.0, 100.0, 40.0);
    pos.alignment = Some(Alignment::Center);
    p.text_blocks.push(block("Hi", pos, fmt));
    render(&mut r, &ctx, &p);

    let text = &body(&r)[0];
    assert_eq!(text.name, "text");
    assert_eq!(text.get_attr("x"), Some("60"));
    assert_eq!(text.get_attr("y"), Some("36"));
    assert_eq!(text.get_attr("text-anchor"), Some("middle"));
    assert_eq!(text.get_attr("font-family"), Some("Georgia"));
    assert_eq!(text.get_attr("font-style"), Some("italic"));
    assert_eq!(text.get_attr("opacity"), Some("0.5"));
    assert_eq!(text.children, vec![SvgNode::Text("Hi".to_string())]);
}

#[test]
fn wrapped_text_uses_tspans() {
    let (mut r, ctx, _) = renderer_with(200, 100, HashMap::new());
    let mut p = Page::new(PageId::Int(1));
    let mut fmt = TextFormatting::new(10.0, "serif", "black");
    fmt.line_height = Some(15.0);
    fmt.text_decoration = Some(TextDecoration::Underline);
    // 6px per char at 10px: "aaaa bbbb" is 54px, wider than the 40px box.
    p.text_blocks.push(block("aaaa bbbb", Position::px(0.0, 0.0, 40.0, 40.0), fmt));
    render(&mut r, &ctx, &p);

    let els = body(&r);
    let text = &els[0];
    let spans: Vec<&SvgElement> = text
        .children
        .iter()
        .filter_map(|c| match c {
            SvgNode::Element(e) => Some(e),
            SvgNode::Text(_) => None,
        })
        .collect();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].get_attr("dy"), Some("0"));
    assert_eq!(spans[1].get_attr("dy"), Some("15"));

    let line = &els[1];
    assert_eq!(line.name, "line");
    assert_eq!(line.get_attr("y1"), Some("28"));
    assert_eq!(line.get_attr("x2"), Some("40"));
}

#[test]
fn justified_lines_spread_words() {
    let (mut r, ctx, _) = renderer_with(200, 100, HashMap::new());
    let mut p = Page::new(PageId::Int(1));
    let mut fmt = TextFormatting::new(10.0, "serif", "black");
    fmt.line_height = Some(10.0);
    let mut pos = Position::px(0.0, 0.0, 100.0, 50.0);
    pos.alignment = Some(Alignment::Justify);
    p.text_blocks.push(block("aa bb cc dd ee ff", pos, fmt));
    render(&mut r, &ctx, &p);

    let els = body(&r);
    let spans: Vec<&SvgElement> = els[0]
        .children
        .iter()
        .filter_map(|c| match c {
            SvgNode::Element(e) => Some(e),
            SvgNode::Text(_) => None,
        })
        .collect();
    // "aa bb cc dd ee" is 84px: 16px of slack over four gaps.
    let xs: Vec<&str> = spans.iter().filter_map(|s| s.get_attr("x")).collect();
    assert_eq!(xs, ["0", "22", "44", "66", "88", "0"]);
    assert_eq!(spans[0].get_attr("dy"), Some("0"));
    assert_eq!(spans[1].get_attr("dy"), None);
    assert_eq!(spans[5].get_attr("dy"), Some("10"));
    assert_eq!(spans[5].children, vec![SvgNode::Text("ff".to_string())]);
}

#[test]
fn unparsable_text_colour_fails_the_render() {
    for colour in ["rgb(oops)", "rgba(var(--x))"] {
        let (mut r, ctx, _) = renderer_with(50, 50, HashMap::new());
        let mut p = Page::new(PageId::Int(1));
        let fmt = TextFormatting::new(10.0, "serif", colour);
        p.text_blocks.push(block("x", Position::px(0.0, 0.0, 10.0, 10.0), fmt));
        let viewport = ctx.viewport();
        let err = r
            .render_page(&p, &ctx, viewport, &mut DetachedScene)
            .unwrap_err();
        assert_eq!(err.code(), "PARSE_ERROR", "{colour}");
    }
}

#[test]
fn shadow_becomes_drop_shadow_filter() {
    let (mut r, ctx, _) = renderer_with(100, 100, HashMap::new());
    let mut p = Page::new(PageId::Int(1));
    let mut fmt = TextFormatting::new(12.0, "serif", "black");
    fmt.shadow = Some("2px 3px #000 4px".to_string());
    p.text_blocks.push(block("x", Position::px(0.0, 0.0, 50.0, 20.0), fmt));
    render(&mut r, &ctx, &p);

    let doc = r.document().unwrap();
    let drop = match &doc.defs()[0].children[0] {
        SvgNode::Element(e) => e,
        SvgNode::Text(_) => panic!("element expected"),
    };
    assert_eq!(drop.name, "feDropShadow");
    assert_eq!(drop.get_attr("dx"), Some("2"));
    assert_eq!(drop.get_attr("dy"), Some("3"));
    assert_eq!(drop.get_attr("stdDeviation"), Some("4"));
    assert_eq!(doc.body()[0].get_attr("filter"), Some("url(#shadow-0)"));
}

#[test]
fn images_are_embedded_once_with_filters_and_border() {
    let sources = HashMap::from([("mem://a", png(2, 2))]);
    let (mut r, ctx, loads) = renderer_with(100, 100, sources);
    let mut p = Page::new(PageId::Int(1));
    let mut el = image_el("mem://a", Position::px(5.0, 5.0, 20.0, 20.0));
    el.id = Some("hero".to_string());
    el.alt_text = Some("A hero".to_string());
    el.filters = vec!["blur(3px)".to_string(), "sepia(1)".to_string()];
    el.border = Some(BorderOptions {
        width: 2.0,
        style: BorderStyle::Dashed,
        color: "red".to_string(),
        radius: Some(4.0),
    });
    p.images.push(el);

    render(&mut r, &ctx, &p);
    render(&mut r, &ctx, &p);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(r.cached_images(), 1);

    let els = body(&r);
    let img = &els[0];
    assert_eq!(img.name, "image");
    assert!(img.get_attr("href").unwrap().starts_with("data:image/png;base64,"));
    assert_eq!(img.get_attr("id"), Some("hero"));
    assert_eq!(img.get_attr("aria-label"), Some("A hero"));
    assert_eq!(img.get_attr("filter"), Some("url(#filter-0)"));

    let border = &els[1];
    assert_eq!(border.get_attr("fill"), Some("none"));
    assert_eq!(border.get_attr("stroke-dasharray"), Some("5,5"));
    assert_eq!(border.get_attr("rx"), Some("4"));
}

#[test]
fn missing_image_draws_placeholder() {
    let (mut r, ctx, _) = renderer_with(100, 100, HashMap::new());
    let mut p = Page::new(PageId::Int(1));
    p.images.push(image_el("mem://gone", Position::px(0.0, 0.0, 40.0, 20.0)));
    render(&mut r, &ctx, &p);

    let els = body(&r);
    assert_eq!(els[0].get_attr("fill"), Some("#f0f0f0"));
    assert_eq!(els[1].get_attr("x"), Some("20"));
    assert_eq!(els[1].children, vec![SvgNode::Text("Image not found".to_string())]);
    assert_eq!(r.cached_images(), 0);
}

#[test]
fn rerender_replaces_content() {
    let (mut r, ctx, _) = renderer_with(10, 10, HashMap::new());
    let mut p = Page::new(PageId::Int(1));
    p.text_blocks.push(block(
        "a",
        Position::px(0.0, 0.0, 10.0, 10.0),
        TextFormatting::new(5.0, "serif", "black"),
    ));
    render(&mut r, &ctx, &p);
    render(&mut r, &ctx, &p);
    assert_eq!(body(&r).len(), 1);
}

#[test]
fn animations_reach_the_scene() {
    let (mut r, ctx, _) = renderer_with(10, 10, HashMap::new());
    let scene = InMemorySceneGraph::new();
    scene.register("title");
    let mut p = Page::new(PageId::Int(1));
    p.animations.push(Animation {
        target: "title".to_string(),
        kind: AnimationKind::FadeIn,
        duration: 300.0,
        delay: None,
    });
    let mut sink = scene.clone();
    r.render_page(&p, &ctx, ctx.viewport(), &mut sink).unwrap();
    assert_eq!(scene.pending(), 1);
}

#[test]
fn export_resize_and_destroy() {
    let (mut r, mut ctx, _) = renderer_with(10, 10, HashMap::new());
    let url = r.data_url(ExportFormat::Svg, None).unwrap();
    assert!(url.starts_with("data:image/svg+xml,%3Csvg"));
    assert!(matches!(
        r.data_url(ExportFormat::Png, None),
        Err(PagevisError::Unsupported(_))
    ));

    r.resize(&mut ctx, 40, 30).unwrap();
    assert_eq!((ctx.width, ctx.height), (40, 30));
    let SurfaceSnapshot::Vector(markup) = r.snapshot().unwrap() else {
        panic!("vector snapshot expected");
    };
    assert!(markup.contains("viewBox=\"0 0 40 30\""));

    r.destroy();
    r.clear();
    assert!(r.document().is_none());
    assert!(matches!(
        r.data_url(ExportFormat::Svg, None),
        Err(PagevisError::SurfaceUnavailable(_))
    ));
}
