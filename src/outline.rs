//! Logo scaling and white-halo outline synthesis.
//!
//! The halo is traced at 4x resolution: tracing an anti-aliased outline
//! around an arbitrary alpha mask at native size shows visible
//! stair-stepping, so the mask is supersampled before the morphology/blur
//! passes and the composite is downsampled at the end. Outlining always
//! runs on the already-scaled logo, so halo thickness is proportioned to
//! the output size rather than the source resolution.

use image::{GrayImage, RgbaImage, imageops};

use crate::blur::gaussian_blur_luma;
use crate::error::CardResult;

/// Fixed supersampling factor for outline synthesis.
const SUPERSAMPLE: u32 = 4;

/// Fit a logo into `max_size`: the longer side becomes `max_size`, the
/// shorter side scales proportionally (rounded, minimum 1 px).
pub fn fit_logo(logo: &RgbaImage, max_size: u32) -> RgbaImage {
    let (w, h) = logo.dimensions();
    if w == 0 || h == 0 {
        return logo.clone();
    }
    let (new_w, new_h) = if w > h {
        let nh = (h as f64 * max_size as f64 / w as f64).round() as u32;
        (max_size, nh.max(1))
    } else {
        let nw = (w as f64 * max_size as f64 / h as f64).round() as u32;
        (nw.max(1), max_size)
    };
    imageops::resize(logo, new_w, new_h, imageops::FilterType::Lanczos3)
}

/// Scale a logo to fit `max_size`, optionally tracing a white halo around
/// its silhouette afterwards. `outline_width` is in output-space pixels.
pub fn scale_logo(
    logo: &RgbaImage,
    max_size: u32,
    outline_width: Option<u32>,
) -> CardResult<RgbaImage> {
    let fitted = fit_logo(logo, max_size);
    match outline_width {
        Some(width) => outline_logo(&fitted, width),
        None => Ok(fitted),
    }
}

/// Composite a logo over a soft white halo traced around its non-transparent
/// silhouette. The result is larger than the input by a symmetric padding
/// margin, so the aspect ratio of the *content* is unchanged.
///
/// Zero-dimension inputs pass through unchanged; a fully opaque input gets a
/// halo around its full rectangular bounds.
pub fn outline_logo(logo: &RgbaImage, outline_width: u32) -> CardResult<RgbaImage> {
    let (w, h) = logo.dimensions();
    if w == 0 || h == 0 {
        return Ok(logo.clone());
    }

    let up = imageops::resize(
        logo,
        w * SUPERSAMPLE,
        h * SUPERSAMPLE,
        imageops::FilterType::Lanczos3,
    );
    let (up_w, up_h) = up.dimensions();

    // Padding must contain the blurred halo without clipping.
    let ss_width = outline_width * SUPERSAMPLE;
    let padding = ss_width * 5 / 2 + 2 * ss_width;

    let expanded_w = up_w + 2 * padding;
    let expanded_h = up_h + 2 * padding;
    let mut expanded = GrayImage::new(expanded_w, expanded_h);
    let off_x = (expanded_w - up_w) / 2;
    let off_y = (expanded_h - up_h) / 2;
    for (x, y, px) in up.enumerate_pixels() {
        expanded.put_pixel(off_x + x, off_y + y, image::Luma([px.0[3]]));
    }

    // Dilate before blurring; blur alone shrinks apparent coverage.
    let dilated = dilate3(&expanded);
    let blurred = gaussian_blur_luma(&dilated, ss_width as f32)?;

    let mut result = RgbaImage::from_fn(expanded_w, expanded_h, |x, y| {
        let a = blurred.get_pixel(x, y).0[0];
        image::Rgba([255, 255, 255, a])
    });

    imageops::overlay(&mut result, &up, i64::from(off_x), i64::from(off_y));

    Ok(imageops::resize(
        &result,
        expanded_w / SUPERSAMPLE,
        expanded_h / SUPERSAMPLE,
        imageops::FilterType::Lanczos3,
    ))
}

/// 3x3 max filter with clamp-to-edge sampling.
fn dilate3(src: &GrayImage) -> GrayImage {
    let (w, h) = src.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let mut best = 0u8;
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    let sx = (x + dx).clamp(0, w as i64 - 1) as u32;
                    let sy = (y + dy).clamp(0, h as i64 - 1) as u32;
                    best = best.max(src.get_pixel(sx, sy).0[0]);
                }
            }
            out.put_pixel(x as u32, y as u32, image::Luma([best]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn fit_logo_preserves_aspect_ratio() {
        let logo = RgbaImage::new(300, 150);
        let out = fit_logo(&logo, 450);
        assert_eq!(out.dimensions(), (450, 225));

        let logo = RgbaImage::new(100, 400);
        let out = fit_logo(&logo, 177);
        // 100 * 177 / 400 = 44.25 -> 44
        assert_eq!(out.dimensions(), (44, 177));
    }

    #[test]
    fn fit_logo_never_collapses_to_zero() {
        let logo = RgbaImage::new(1000, 1);
        let out = fit_logo(&logo, 100);
        assert_eq!(out.dimensions(), (100, 1));
    }

    #[test]
    fn outline_degenerate_inputs_pass_through() {
        let empty = RgbaImage::new(0, 0);
        let out = outline_logo(&empty, 3).unwrap();
        assert_eq!(out.dimensions(), (0, 0));

        let tiny = RgbaImage::new(1, 1);
        let out = outline_logo(&tiny, 3).unwrap();
        assert!(out.width() >= 1 && out.height() >= 1);
    }

    #[test]
    fn outline_grows_bounding_box_symmetrically() {
        let logo = RgbaImage::from_pixel(20, 10, Rgba([200, 0, 0, 255]));
        let out = outline_logo(&logo, 3).unwrap();
        assert!(out.width() > 20);
        assert!(out.height() > 10);
        // Symmetric padding: growth is identical on both axes.
        assert_eq!(out.width() - 20, out.height() - 10);
    }

    #[test]
    fn outline_halo_is_white_and_opaque_at_core() {
        let logo = RgbaImage::from_pixel(24, 24, Rgba([200, 0, 0, 255]));
        let out = outline_logo(&logo, 2).unwrap();
        let pad = (out.width() - 24) / 2;

        // Original content survives in the center.
        let center = out.get_pixel(out.width() / 2, out.height() / 2).0;
        assert!(center[0] > 150 && center[1] < 80 && center[2] < 80);

        // Just outside the original bounds the halo is white with strong alpha.
        let halo = out.get_pixel(pad - 1, out.height() / 2).0;
        assert!(halo[3] > 80, "halo alpha too weak: {halo:?}");
        assert!(halo[0] >= 200 && halo[1] >= 200 && halo[2] >= 200);

        // At the outer edge of the padding the halo has faded out.
        let edge = out.get_pixel(0, out.height() / 2).0;
        assert!(edge[3] < 32, "halo should fade at the edge: {edge:?}");
    }

    #[test]
    fn scale_logo_with_outline_is_larger_than_without() {
        let logo = RgbaImage::from_pixel(300, 300, Rgba([0, 0, 255, 255]));
        let plain = scale_logo(&logo, 450, None).unwrap();
        let outlined = scale_logo(&logo, 450, Some(3)).unwrap();
        assert_eq!(plain.dimensions(), (450, 450));
        assert!(outlined.width() > plain.width());
        assert!(outlined.height() > plain.height());
    }

    #[test]
    fn dilate_spreads_single_pixel_to_neighbors() {
        let mut src = GrayImage::new(5, 5);
        src.put_pixel(2, 2, image::Luma([255]));
        let out = dilate3(&src);
        assert_eq!(out.get_pixel(1, 1).0[0], 255);
        assert_eq!(out.get_pixel(3, 3).0[0], 255);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
    }
}
