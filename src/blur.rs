//! Separable Gaussian blur over 8-bit channel buffers.
//!
//! Backgrounds are blurred as RGBA; the outline halo mask is blurred as
//! single-channel luma. Both share the same Q16 fixed-point kernel and
//! clamp-to-edge two-pass convolution.

use image::{GrayImage, RgbaImage};

use crate::error::{CardError, CardResult};

/// Blur an RGBA image with the given standard deviation.
pub fn gaussian_blur_rgba(src: &RgbaImage, sigma: f32) -> CardResult<RgbaImage> {
    let (w, h) = src.dimensions();
    let out = blur_channels(src.as_raw(), w, h, 4, sigma)?;
    RgbaImage::from_raw(w, h, out)
        .ok_or_else(|| CardError::validation("blurred rgba buffer has wrong length"))
}

/// Blur a single-channel (alpha/luma) image with the given standard deviation.
pub fn gaussian_blur_luma(src: &GrayImage, sigma: f32) -> CardResult<GrayImage> {
    let (w, h) = src.dimensions();
    let out = blur_channels(src.as_raw(), w, h, 1, sigma)?;
    GrayImage::from_raw(w, h, out)
        .ok_or_else(|| CardError::validation("blurred luma buffer has wrong length"))
}

fn blur_channels(
    src: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    sigma: f32,
) -> CardResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| CardError::validation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(CardError::validation(
            "blur expects src matching width*height*channels",
        ));
    }

    let radius = kernel_radius(sigma);
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, channels, &kernel);
    vertical_pass(&tmp, &mut out, width, height, channels, &kernel);
    Ok(out)
}

/// Kernel radius covering three standard deviations.
fn kernel_radius(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CardResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CardError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(CardError::validation("gaussian kernel sum is zero"));
    }

    // Quantize to Q16 and push any rounding drift into the center tap so the
    // kernel still sums to exactly 1.0.
    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let target: i64 = 65536;
    let delta = target - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let mid_val = i64::from(weights[mid]);
        let new_mid = (mid_val + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, ch: usize, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let mut acc = vec![0u64; ch];
    for y in 0..height as i32 {
        for x in 0..w {
            acc.fill(0);
            for (ki, &kw) in k.iter().enumerate() {
                let dx = ki as i32 - radius;
                let sx = (x + dx).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * ch;
                for c in 0..ch {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * ch;
            for c in 0..ch {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, ch: usize, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    let mut acc = vec![0u64; ch];
    for y in 0..h {
        for x in 0..w {
            acc.fill(0);
            for (ki, &kw) in k.iter().enumerate() {
                let dy = ki as i32 - radius;
                let sy = (y + dy).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * ch;
                for c in 0..ch {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * ch;
            for c in 0..ch {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}
