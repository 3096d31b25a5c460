//! Background auto-enhancement operators.
//!
//! These reproduce the classic stock adjustments: each enhancer blends the
//! image with a "degenerate" version of itself (gray, black, grayscale,
//! smoothed), where factor 1.0 is the identity and factors above 1.0
//! extrapolate past the original. Alpha is never touched.

use image::RgbaImage;

/// The fixed auto-enhance chain: equalize, then contrast x1.10,
/// brightness x1.05, color x1.10, sharpness x1.10.
///
/// Order matters: equalization changes the tonal distribution the later
/// adjustments operate on.
pub fn auto_enhance(img: &RgbaImage) -> RgbaImage {
    let img = equalize(img);
    let img = contrast(&img, 1.10);
    let img = brightness(&img, 1.05);
    let img = color(&img, 1.10);
    sharpness(&img, 1.10)
}

/// Per-channel histogram equalization.
pub fn equalize(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    for ch in 0..3 {
        let mut hist = [0u64; 256];
        for px in img.pixels() {
            hist[px.0[ch] as usize] += 1;
        }

        let lut = equalize_lut(&hist);
        for px in out.pixels_mut() {
            px.0[ch] = lut[px.0[ch] as usize];
        }
    }
    out
}

fn equalize_lut(hist: &[u64; 256]) -> [u8; 256] {
    let mut identity = [0u8; 256];
    for (i, v) in identity.iter_mut().enumerate() {
        *v = i as u8;
    }

    let nonzero: Vec<u64> = hist.iter().copied().filter(|&v| v != 0).collect();
    if nonzero.len() <= 1 {
        return identity;
    }

    let total: u64 = nonzero.iter().sum();
    let step = (total - nonzero[nonzero.len() - 1]) / 255;
    if step == 0 {
        return identity;
    }

    let mut lut = [0u8; 256];
    let mut n = step / 2;
    for (i, v) in lut.iter_mut().enumerate() {
        *v = (n / step).min(255) as u8;
        n += hist[i];
    }
    lut
}

/// Contrast adjustment: blend toward a flat gray at the image's mean luma.
pub fn contrast(img: &RgbaImage, factor: f32) -> RgbaImage {
    let mut sum = 0u64;
    let mut count = 0u64;
    for px in img.pixels() {
        sum += luma_601(px.0) as u64;
        count += 1;
    }
    let mean = if count == 0 {
        0
    } else {
        ((sum as f64 / count as f64) + 0.5) as i32
    };
    blend_with(img, factor, |_| [mean, mean, mean])
}

/// Brightness adjustment: blend toward black.
pub fn brightness(img: &RgbaImage, factor: f32) -> RgbaImage {
    blend_with(img, factor, |_| [0, 0, 0])
}

/// Color (saturation) adjustment: blend toward the ITU-R 601-2 grayscale.
pub fn color(img: &RgbaImage, factor: f32) -> RgbaImage {
    blend_with(img, factor, |px| {
        let l = luma_601(px) as i32;
        [l, l, l]
    })
}

/// Sharpness adjustment: blend toward a 3x3 smooth-filtered image.
pub fn sharpness(img: &RgbaImage, factor: f32) -> RgbaImage {
    let smooth = smooth3(img);
    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let deg = smooth.get_pixel(x, y).0;
        for ch in 0..3 {
            px.0[ch] = extrapolate(deg[ch] as i32, px.0[ch] as i32, factor);
        }
    }
    out
}

/// `out = degenerate + factor * (original - degenerate)`, clamped.
fn blend_with(
    img: &RgbaImage,
    factor: f32,
    degenerate: impl Fn([u8; 4]) -> [i32; 3],
) -> RgbaImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        let deg = degenerate(px.0);
        for ch in 0..3 {
            px.0[ch] = extrapolate(deg[ch], px.0[ch] as i32, factor);
        }
    }
    out
}

fn extrapolate(degenerate: i32, original: i32, factor: f32) -> u8 {
    let v = degenerate as f32 + (original - degenerate) as f32 * factor;
    v.round().clamp(0.0, 255.0) as u8
}

fn luma_601(px: [u8; 4]) -> u8 {
    ((px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114) / 1000) as u8
}

/// 3x3 smooth filter (center weight 5, neighbors 1, divisor 13). The
/// one-pixel border is left unfiltered.
fn smooth3(img: &RgbaImage) -> RgbaImage {
    let (w, h) = img.dimensions();
    let mut out = img.clone();
    if w < 3 || h < 3 {
        return out;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut acc = [0u32; 3];
            for dy in 0..3u32 {
                for dx in 0..3u32 {
                    let weight = if dx == 1 && dy == 1 { 5 } else { 1 };
                    let p = img.get_pixel(x + dx - 1, y + dy - 1).0;
                    for ch in 0..3 {
                        acc[ch] += weight * p[ch] as u32;
                    }
                }
            }
            let px = out.get_pixel_mut(x, y);
            for ch in 0..3 {
                px.0[ch] = (acc[ch] / 13).min(255) as u8;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let v = ((x * 37 + y * 11) % 256) as u8;
            Rgba([v, v.wrapping_add(40), v.wrapping_add(90), 255])
        })
    }

    #[test]
    fn factor_one_is_identity() {
        let img = gradient(8, 8);
        assert_eq!(contrast(&img, 1.0).as_raw(), img.as_raw());
        assert_eq!(brightness(&img, 1.0).as_raw(), img.as_raw());
        assert_eq!(color(&img, 1.0).as_raw(), img.as_raw());
        assert_eq!(sharpness(&img, 1.0).as_raw(), img.as_raw());
    }

    #[test]
    fn brightness_zero_is_black() {
        let img = gradient(4, 4);
        let out = brightness(&img, 0.0);
        assert!(out.pixels().all(|p| p.0[0] == 0 && p.0[1] == 0 && p.0[2] == 0));
        assert!(out.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn color_zero_is_grayscale() {
        let img = gradient(4, 4);
        let out = color(&img, 0.0);
        assert!(out.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }

    #[test]
    fn equalize_flat_image_is_identity() {
        let img = RgbaImage::from_pixel(6, 6, Rgba([120, 7, 200, 255]));
        let out = equalize(&img);
        assert_eq!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn equalize_spreads_two_level_image() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([100, 100, 100, 255]));
        for x in 0..4 {
            img.put_pixel(x, 0, Rgba([110, 110, 110, 255]));
        }
        let out = equalize(&img);
        let lo = out.get_pixel(0, 3).0[0];
        let hi = out.get_pixel(0, 0).0[0];
        assert!(hi > lo);
        assert!(u32::from(hi) - u32::from(lo) > 10);
    }

    #[test]
    fn auto_enhance_preserves_dimensions_and_alpha() {
        let img = gradient(10, 7);
        let out = auto_enhance(&img);
        assert_eq!(out.dimensions(), (10, 7));
        assert!(out.pixels().all(|p| p.0[3] == 255));
    }
}
