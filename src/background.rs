//! Background preparation: aspect-fill crop, blur, optional enhancement.

use image::{RgbaImage, imageops};

use crate::blur::gaussian_blur_rgba;
use crate::enhance::auto_enhance;
use crate::error::{CardError, CardResult};

/// Aspect-fill a background photo to exactly `(target_w, target_h)`, blur
/// it, and optionally run the auto-enhancement chain.
///
/// Aspect-fill, never aspect-fit: the canvas is always fully covered and the
/// excess is cropped from the center. Any alpha in the source is flattened
/// to opaque, matching the RGB conversion the final JPEG encode performs.
pub fn prepare_background(
    bg: &RgbaImage,
    target_w: u32,
    target_h: u32,
    blur_sigma: f32,
    enhance: bool,
) -> CardResult<RgbaImage> {
    let (w, h) = bg.dimensions();
    if w == 0 || h == 0 {
        return Err(CardError::validation("background image has zero size"));
    }
    if target_w == 0 || target_h == 0 {
        return Err(CardError::validation("background target size must be non-zero"));
    }

    let aspect_bg = w as f64 / h as f64;
    let aspect_out = target_w as f64 / target_h as f64;

    let (new_w, new_h) = if aspect_bg > aspect_out {
        // Source is relatively wider: match height, crop width.
        let nw = (target_h as f64 * aspect_bg).round() as u32;
        (nw.max(target_w), target_h)
    } else {
        let nh = (target_w as f64 / aspect_bg).round() as u32;
        (target_w, nh.max(target_h))
    };

    let resized = imageops::resize(bg, new_w, new_h, imageops::FilterType::Lanczos3);
    let left = (new_w - target_w) / 2;
    let top = (new_h - target_h) / 2;
    let mut cropped = imageops::crop_imm(&resized, left, top, target_w, target_h).to_image();

    for px in cropped.pixels_mut() {
        px.0[3] = 255;
    }

    let blurred = gaussian_blur_rgba(&cropped, blur_sigma)?;
    Ok(if enhance {
        auto_enhance(&blurred)
    } else {
        blurred
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn output_is_exactly_target_size_for_wide_source() {
        let bg = RgbaImage::new(4000, 500);
        let out = prepare_background(&bg, 1920, 1080, 2.0, false).unwrap();
        assert_eq!(out.dimensions(), (1920, 1080));
    }

    #[test]
    fn output_is_exactly_target_size_for_tall_source() {
        let bg = RgbaImage::new(300, 2000);
        let out = prepare_background(&bg, 480, 720, 2.0, false).unwrap();
        assert_eq!(out.dimensions(), (480, 720));
    }

    #[test]
    fn output_is_exactly_target_size_for_matching_aspect() {
        let bg = RgbaImage::new(960, 540);
        let out = prepare_background(&bg, 1920, 1080, 2.0, false).unwrap();
        assert_eq!(out.dimensions(), (1920, 1080));
    }

    #[test]
    fn crop_is_centered() {
        // Left half black, right half white, square target: the crop should
        // keep the middle so both halves survive.
        let bg = RgbaImage::from_fn(400, 100, |x, _| {
            if x < 200 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let out = prepare_background(&bg, 100, 100, 0.0, false).unwrap();
        assert!(out.get_pixel(5, 50).0[0] < 64);
        assert!(out.get_pixel(95, 50).0[0] > 192);
    }

    #[test]
    fn alpha_is_flattened_to_opaque() {
        let bg = RgbaImage::from_pixel(100, 100, Rgba([10, 20, 30, 0]));
        let out = prepare_background(&bg, 50, 50, 1.0, false).unwrap();
        assert!(out.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn zero_size_background_is_rejected() {
        let bg = RgbaImage::new(0, 0);
        let err = prepare_background(&bg, 100, 100, 1.0, false).unwrap_err();
        assert!(matches!(err, CardError::Validation(_)));
    }

    #[test]
    fn enhanced_output_keeps_target_size() {
        let bg = RgbaImage::from_fn(200, 300, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let out = prepare_background(&bg, 480, 720, 8.1, true).unwrap();
        assert_eq!(out.dimensions(), (480, 720));
    }
}
