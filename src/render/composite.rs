use crate::foundation::color::Rgba8;
use crate::foundation::error::{PagevisError, PagevisResult};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over of one premultiplied pixel, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Composite a layer over the surface in place.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> PagevisResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PagevisError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Build a drop-shadow layer: `color` masked by the alpha of `layer`, shifted by `(dx, dy)`.
pub fn shadow_layer(
    layer: &[u8],
    width: u32,
    height: u32,
    color: Rgba8,
    dx: i32,
    dy: i32,
) -> Vec<u8> {
    let (w, h) = (width as i32, height as i32);
    let premul = color.premultiplied();
    let mut out = vec![0u8; layer.len()];
    for y in 0..h {
        let sy = y - dy;
        if sy < 0 || sy >= h {
            continue;
        }
        for x in 0..w {
            let sx = x - dx;
            if sx < 0 || sx >= w {
                continue;
            }
            let mask = u16::from(layer[((sy * w + sx) as usize) * 4 + 3]);
            if mask == 0 {
                continue;
            }
            let idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                out[idx + c] = mul_div255(u16::from(premul[c]), mask);
            }
        }
    }
    out
}

/// Fill a buffer with one straight colour, premultiplied.
pub fn solid_layer(width: u32, height: u32, color: Rgba8) -> Vec<u8> {
    color
        .premultiplied()
        .repeat((width as usize) * (height as usize))
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}
