use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::page::model::{BorderStyle, PageId, Position, TextFormatting};
use crate::render::animation::DetachedScene;

fn png(color: [u8; 4], w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(color));
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
) -> (RasterRenderer, RenderingContext, Arc<AtomicUsize>) {
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
    (RasterRenderer::new(&ctx, deps).unwrap(), ctx, loads)
}

fn render(r: &mut RasterRenderer, ctx: &RenderingContext, page: &Page) {
    let viewport = ctx.viewport();
    r.render_page(page, ctx, viewport, &mut DetachedScene).unwrap();
}

fn pixel(r: &RasterRenderer, x: u32, y: u32) -> [u8; 4] {
    let SurfaceSnapshot::Raster(frame) = r.snapshot().unwrap() else {
        panic!("raster snapshot expected");
    };
    let i = ((y * frame.width + x) * 4) as usize;
    [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
}

fn image_el(src: &str, pos: Position, z: Option<i32>) -> ImageElement {
    ImageElement {
        id: None,
        src: src.to_string(),
        position: pos,
        z_index: z,
        alt_text: None,
        filters: Vec::new(),
        border: None,
    }
}

fn page() -> Page {
    Page::new(PageId::Int(1))
}

#[test]
fn solid_background_fills_surface() {
    let (mut r, ctx, _) = renderer_with(4, 3, HashMap::new());
    let mut p = page();
    p.background = Some(Background {
        color: Some("#ff0000".to_string()),
        ..Background::default()
    });
    render(&mut r, &ctx, &p);
    assert_eq!(pixel(&r, 0, 0), [255, 0, 0, 255]);
    assert_eq!(pixel(&r, 3, 2), [255, 0, 0, 255]);
}

#[test]
fn malformed_gradient_leaves_surface_cleared() {
    let (mut r, ctx, _) = renderer_with(4, 4, HashMap::new());
    let mut p = page();
    p.background = Some(Background {
        gradient: Some("linear-gradient(to right, red, blue)".to_string()),
        ..Background::default()
    });
    render(&mut r, &ctx, &p);
    assert_eq!(pixel(&r, 1, 1), [0, 0, 0, 0]);
}

#[test]
fn gradient_runs_between_mirrored_endpoints() {
    let (mut r, ctx, _) = renderer_with(10, 2, HashMap::new());
    let mut p = page();
    p.background = Some(Background {
        gradient: Some("linear-gradient(0deg, #ff0000, #0000ff)".to_string()),
        ..Background::default()
    });
    render(&mut r, &ctx, &p);
    let left = pixel(&r, 0, 0);
    let right = pixel(&r, 9, 0);
    assert_eq!(left[3], 255);
    assert!(right[0] > left[0]);
    assert!(left[2] > right[2]);
}

#[test]
fn images_are_stretched_and_loaded_once() {
    let sources = HashMap::from([("mem://green", png([0, 255, 0, 255], 2, 2))]);
    let (mut r, ctx, loads) = renderer_with(8, 8, sources);
    let mut p = page();
    p.images.push(image_el("mem://green", Position::px(2.0, 2.0, 4.0, 4.0), None));

    render(&mut r, &ctx, &p);
    render(&mut r, &ctx, &p);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(r.cached_images(), 1);
    assert_eq!(pixel(&r, 3, 3), [0, 255, 0, 255]);
    assert_eq!(pixel(&r, 0, 0), [0, 0, 0, 0]);
}

#[test]
fn failed_image_draws_placeholder_and_is_retried() {
    let (mut r, ctx, loads) = renderer_with(8, 8, HashMap::new());
    let mut p = page();
    p.images.push(image_el("mem://missing", Position::px(0.0, 0.0, 8.0, 8.0), None));

    render(&mut r, &ctx, &p);
    assert_eq!(pixel(&r, 0, 0), [0xf0, 0xf0, 0xf0, 0xff]);
    render(&mut r, &ctx, &p);
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(r.cached_images(), 0);
}

#[test]
fn higher_z_index_paints_last() {
    let sources = HashMap::from([
        ("mem://red", png([255, 0, 0, 255], 1, 1)),
        ("mem://blue", png([0, 0, 255, 255], 1, 1)),
    ]);
    let (mut r, ctx, _) = renderer_with(4, 4, sources);
    let mut p = page();
    p.images.push(image_el("mem://blue", Position::px(0.0, 0.0, 4.0, 4.0), Some(1)));
    p.images.push(image_el("mem://red", Position::px(0.0, 0.0, 4.0, 4.0), Some(0)));
    render(&mut r, &ctx, &p);
    assert_eq!(pixel(&r, 2, 2), [0, 0, 255, 255]);
}

#[test]
fn border_is_stroked_around_image() {
    let sources = HashMap::from([("mem://white", png([255, 255, 255, 255], 1, 1))]);
    let (mut r, ctx, _) = renderer_with(20, 20, sources);
    let mut p = page();
    let mut el = image_el("mem://white", Position::px(4.0, 4.0, 12.0, 12.0), None);
    el.border = Some(BorderOptions {
        width: 2.0,
        style: BorderStyle::Solid,
        color: "#000000".to_string(),
        radius: None,
    });
    p.images.push(el);
    render(&mut r, &ctx, &p);

    assert_eq!(pixel(&r, 10, 4), [0, 0, 0, 255]);
    assert_eq!(pixel(&r, 10, 10), [255, 255, 255, 255]);
    // The outer half of the stroke lies outside the image box.
    assert_eq!(pixel(&r, 10, 3)[3], 255);
}

#[test]
fn blur_filter_softens_image_edges() {
    let sources = HashMap::from([("mem://white", png([255, 255, 255, 255], 1, 1))]);
    let (mut r, ctx, _) = renderer_with(20, 20, sources);
    let mut p = page();
    let mut el = image_el("mem://white", Position::px(5.0, 5.0, 10.0, 10.0), None);
    el.filters = vec!["blur(2px)".to_string()];
    p.images.push(el);
    render(&mut r, &ctx, &p);

    let outside = pixel(&r, 3, 10);
    assert!(outside[3] > 0 && outside[3] < 255);
}

#[test]
fn underline_is_drawn_without_fonts() {
    let (mut r, ctx, _) = renderer_with(40, 40, HashMap::new());
    let mut p = page();
    let mut fmt = TextFormatting::new(10.0, "Nope Sans", "#0000ff");
    fmt.text_decoration = Some(TextDecoration::Underline);
    p.text_blocks.push(TextBlock {
        id: None,
        content: "hi".to_string(),
        position: Position::px(5.0, 10.0, 30.0, 20.0),
        formatting: fmt,
        z_index: None,
    });
    render(&mut r, &ctx, &p);

    // One line at y = 10 with a 10px line height: underline at 10 + 10 - 2.
    let row17 = pixel(&r, 20, 17);
    let row18 = pixel(&r, 20, 18);
    assert!(row17[3] > 0 || row18[3] > 0);
    assert!(row17[2] > 0 || row18[2] > 0);
    assert_eq!(pixel(&r, 20, 5), [0, 0, 0, 0]);
}

#[test]
fn bad_text_colour_fails_the_render() {
    let (mut r, ctx, _) = renderer_with(10, 10, HashMap::new());
    let mut p = page();
    p.text_blocks.push(TextBlock {
        id: None,
        content: "x".to_string(),
        position: Position::px(0.0, 0.0, 10.0, 10.0),
        formatting: TextFormatting::new(10.0, "serif", "rgb(oops)"),
        z_index: None,
    });
    let viewport = ctx.viewport();
    let err = r
        .render_page(&p, &ctx, viewport, &mut DetachedScene)
        .unwrap_err();
    assert_eq!(err.code(), "PARSE_ERROR");
}

#[test]
fn justified_lines_spread_words() {
    let bx = ResolvedBox {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 50.0,
    };
    // Each char is 6px wide at a 10px font.
    let mut m = ApproxMeasurer::new(10.0);
    let runs = place_runs("aa bb cc dd ee ff", &mut m, &bx, 12.0, Alignment::Justify);

    let first_line: Vec<&TextRun> = runs.iter().filter(|r| r.line == 0).collect();
    assert!(first_line.len() > 1);
    assert_eq!(first_line[0].x, 0.0);
    let last = first_line[first_line.len() - 1];
    assert!((last.x + 12.0 - 100.0).abs() < 1e-9);

    let last_line = runs.iter().map(|r| r.line).max().unwrap();
    let tail: Vec<&TextRun> = runs.iter().filter(|r| r.line == last_line).collect();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].x, 0.0);
    assert_eq!(tail[0].y, 12.0 * last_line as f64);
}

#[test]
fn centered_lines_use_measured_width() {
    let bx = ResolvedBox {
        x: 10.0,
        y: 0.0,
        width: 100.0,
        height: 20.0,
    };
    let mut m = ApproxMeasurer::new(10.0);
    let runs = place_runs("abcd", &mut m, &bx, 10.0, Alignment::Center);
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].x, 10.0 + 50.0 - 12.0);

    let runs = place_runs("abcd", &mut m, &bx, 10.0, Alignment::Right);
    assert_eq!(runs[0].x, 110.0 - 24.0);
}

#[test]
fn resize_clear_and_destroy() {
    let (mut r, mut ctx, _) = renderer_with(4, 4, HashMap::new());
    r.resize(&mut ctx, 6, 5).unwrap();
    assert_eq!((ctx.width, ctx.height), (6, 5));
    let SurfaceSnapshot::Raster(frame) = r.snapshot().unwrap() else {
        panic!("raster snapshot expected");
    };
    assert_eq!((frame.width, frame.height), (6, 5));
    assert!(r.resize(&mut ctx, 70_000, 5).is_err());

    r.clear();
    r.clear();
    assert!(r.data_url(ExportFormat::Png, None).unwrap().starts_with("data:image/png;base64,"));
    assert!(matches!(
        r.data_url(ExportFormat::Svg, None),
        Err(PagevisError::Unsupported(_))
    ));

    r.destroy();
    r.clear();
    assert!(matches!(
        r.data_url(ExportFormat::Png, None),
        Err(PagevisError::SurfaceUnavailable(_))
    ));
}
