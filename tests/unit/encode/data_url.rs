use super::*;
use crate::assets::loader::decode_data_url;

fn frame(px: [u8; 4], w: u32, h: u32, premultiplied: bool) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied,
    }
}

#[test]
fn png_url_decodes_back_to_straight_pixels() {
    let url = png_data_url(&frame([128, 0, 0, 128], 2, 2, true)).unwrap();
    assert!(url.starts_with("data:image/png;base64,"));

    let bytes = decode_data_url(&url).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 2));
    let px = img.get_pixel(0, 0).0;
    assert_eq!(px[3], 128);
    assert!(px[0] >= 254);
}

#[test]
fn jpeg_url_and_quality_bounds() {
    let f = frame([0, 255, 0, 255], 4, 4, true);
    let url = jpeg_data_url(&f, Some(0.5)).unwrap();
    assert!(url.starts_with("data:image/jpeg;base64,"));
    let bytes = decode_data_url(&url).unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (4, 4));

    assert!(jpeg_data_url(&f, None).is_ok());
    assert!(matches!(
        jpeg_data_url(&f, Some(1.5)),
        Err(PagevisError::Validation(_))
    ));
}

#[test]
fn svg_url_is_percent_encoded() {
    let url = svg_data_url("<svg a=\"b c\"/>");
    assert_eq!(url, "data:image/svg+xml,%3Csvg%20a%3D%22b%20c%22%2F%3E");
}
