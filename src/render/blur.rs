use anyhow::anyhow;

use crate::foundation::error::{PagevisError, PagevisResult};

/// Largest kernel radius; wider CSS blurs are clamped.
const MAX_RADIUS: u32 = 128;

/// Kernel radius covering three standard deviations.
pub fn radius_for_sigma(sigma: f64) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    ((sigma * 3.0).ceil() as u32).min(MAX_RADIUS)
}

/// Gaussian blur of a premultiplied RGBA8 buffer with standard deviation `sigma` pixels.
///
/// Matches the CSS `blur(<n>px)` filter and `feGaussianBlur stdDeviation`. Edges clamp.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    sigma: f64,
) -> PagevisResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| anyhow!("blur buffer size overflows for {width}x{height}"))?;
    if src.len() != expected_len {
        return Err(PagevisError::Other(anyhow!(
            "blur buffer holds {} bytes, {width}x{height} needs {expected_len}",
            src.len()
        )));
    }
    let radius = radius_for_sigma(sigma);
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let kernel = kernel_q16(radius, sigma);
    let (w, h) = (width as usize, height as usize);
    let mut rows = vec![0u8; expected_len];
    convolve(src, &mut rows, Axis::Row, w, h, &kernel);
    let mut out = vec![0u8; expected_len];
    convolve(&rows, &mut out, Axis::Column, w, h, &kernel);
    Ok(out)
}

// Symmetric kernel of `2 * radius + 1` taps in Q16, summing to exactly 1.0.
fn kernel_q16(radius: u32, sigma: f64) -> Vec<u32> {
    let r = i64::from(radius);
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (-r..=r)
        .map(|i| (-((i * i) as f64) / denom).exp())
        .collect();
    let sum: f64 = raw.iter().sum();

    let mut taps: Vec<u32> = raw
        .iter()
        .map(|w| ((w / sum) * ONE_Q16 as f64).round().clamp(0.0, ONE_Q16 as f64) as u32)
        .collect();
    let total: i64 = taps.iter().map(|&t| i64::from(t)).sum();
    let mid = taps.len() / 2;
    taps[mid] = (i64::from(taps[mid]) + ONE_Q16 - total).clamp(0, ONE_Q16) as u32;
    taps
}

const ONE_Q16: i64 = 1 << 16;

#[derive(Clone, Copy)]
enum Axis {
    Row,
    Column,
}

fn convolve(src: &[u8], dst: &mut [u8], axis: Axis, w: usize, h: usize, kernel: &[u32]) {
    let radius = kernel.len() / 2;
    let len = match axis {
        Axis::Row => w,
        Axis::Column => h,
    };
    let pixel = |x: usize, y: usize| (y * w + x) * 4;
    for y in 0..h {
        for x in 0..w {
            let at = match axis {
                Axis::Row => x,
                Axis::Column => y,
            };
            let mut acc = [0u64; 4];
            for (k, &weight) in kernel.iter().enumerate() {
                let s = (at + k).saturating_sub(radius).min(len - 1);
                let idx = match axis {
                    Axis::Row => pixel(s, y),
                    Axis::Column => pixel(x, s),
                };
                for (c, sum) in acc.iter_mut().enumerate() {
                    *sum += u64::from(weight) * u64::from(src[idx + c]);
                }
            }
            let out = pixel(x, y);
            for (c, sum) in acc.into_iter().enumerate() {
                dst[out + c] = ((sum + 0x8000) >> 16).min(255) as u8;
            }
        }
    }
}
