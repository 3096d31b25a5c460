//! Scene layout for one resolution profile: logos on anchors, VS glyph
//! centered between them.

use image::{RgbaImage, imageops};
use rusttype::Font;

use crate::profile::ResolutionProfile;
use crate::text::{draw_text, measure_text};

/// The literal glyph text drawn between the two logos.
pub const VS_TEXT: &str = "VS.";

/// Paste a logo so its *center* lands on `anchor`, using the logo's own
/// alpha as the paste mask. Rectangles that extend past the canvas clip.
pub fn paste_centered(canvas: &mut RgbaImage, logo: &RgbaImage, anchor: (i64, i64)) {
    let x = anchor.0 - i64::from(logo.width()) / 2;
    let y = anchor.1 - i64::from(logo.height()) / 2;
    imageops::overlay(canvas, logo, x, y);
}

/// Compose the final scene for one profile.
///
/// The prepared background is copied, never mutated in place; callers reuse
/// it across profiles. Both logos must already be scaled (and outlined,
/// when requested) for this profile.
pub fn compose_scene(
    background: &RgbaImage,
    logo_a: &RgbaImage,
    logo_b: &RgbaImage,
    profile: &ResolutionProfile,
    font: &Font<'_>,
) -> RgbaImage {
    let mut canvas = background.clone();

    paste_centered(&mut canvas, logo_a, profile.logo_a_anchor);
    paste_centered(&mut canvas, logo_b, profile.logo_b_anchor);

    if let Some(bounds) = measure_text(font, profile.font_size, VS_TEXT) {
        let center_x = (canvas.width() as i32 - bounds.width as i32) / 2;
        let center_y = (canvas.height() as i32 - bounds.height as i32) / 2;
        let offset = (canvas.height() as f32 * profile.vs_offset_frac) as i32;
        draw_text(
            &mut canvas,
            font,
            profile.font_size,
            center_x,
            center_y + offset,
            [255, 255, 255],
            VS_TEXT,
        );
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn red_square(size: u32) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba([255, 0, 0, 255]))
    }

    #[test]
    fn paste_centered_aligns_logo_center_with_anchor() {
        let mut canvas = RgbaImage::from_pixel(200, 200, Rgba([0, 0, 0, 255]));
        paste_centered(&mut canvas, &red_square(50), (100, 100));

        assert_eq!(canvas.get_pixel(100, 100).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(75, 75).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(124, 124).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(74, 100).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(125, 100).0, [0, 0, 0, 255]);
    }

    #[test]
    fn paste_centered_clips_at_canvas_edges() {
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        paste_centered(&mut canvas, &red_square(60), (10, 10));
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(39, 39).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(50, 50).0, [0, 0, 0, 255]);
    }

    #[test]
    fn paste_respects_alpha_mask() {
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 255, 255]));
        let mut logo = RgbaImage::from_pixel(20, 20, Rgba([255, 0, 0, 0]));
        logo.put_pixel(10, 10, Rgba([255, 0, 0, 255]));
        paste_centered(&mut canvas, &logo, (50, 50));

        // Only the single opaque pixel lands; transparent ones show background.
        assert_eq!(canvas.get_pixel(50, 50).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(45, 45).0, [0, 0, 255, 255]);
    }

    #[test]
    fn compose_does_not_mutate_background() {
        let background = RgbaImage::from_pixel(480, 720, Rgba([9, 9, 9, 255]));
        let snapshot = background.clone();
        let profiles = crate::profile::builtin_profiles();
        let Ok(font) = crate::text::load_first_font(&[crate::text::FontSource::AnyFace]) else {
            eprintln!("skipping: no system fonts available");
            return;
        };
        let _ = compose_scene(&background, &red_square(10), &red_square(10), &profiles[2], &font);
        assert_eq!(background.as_raw(), snapshot.as_raw());
    }
}
