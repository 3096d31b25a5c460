//! Font resolution and glyph drawing for the VS glyph.
//!
//! Font lookup is an ordered list of [`FontSource`] candidates consumed by
//! [`load_first_font`]; the first candidate that produces a usable face
//! wins. This replaces ad-hoc nested fallback chains: a render never fails
//! just because a preferred face is absent, only when no face loads at all.

use std::path::PathBuf;

use image::RgbaImage;
use rusttype::{Font, Scale, point};

use crate::error::{CardError, CardResult};

/// One way of obtaining a font face.
#[derive(Clone, Debug)]
pub enum FontSource {
    /// A font file on disk (TTF/OTF, or a TTC read at index 0).
    File(PathBuf),
    /// A system font query by family, weight and style.
    System {
        /// Family names, in preference order.
        families: Vec<String>,
        /// CSS-style weight (400 regular, 900 black).
        weight: u16,
        /// Whether an italic face is requested.
        italic: bool,
    },
    /// Any usable face the system has. Terminal fallback.
    AnyFace,
}

/// The default candidate order for the VS glyph: a bold-italic display
/// face first, progressively less specific after that.
pub fn default_font_sources() -> Vec<FontSource> {
    vec![
        FontSource::File(PathBuf::from("Roboto-BlackItalic.ttf")),
        FontSource::File(PathBuf::from("Roboto-Black.ttf")),
        FontSource::File(PathBuf::from("Impact-Italic.ttf")),
        FontSource::File(PathBuf::from("/System/Library/Fonts/Helvetica.ttc")),
        FontSource::System {
            families: vec!["Roboto".to_string()],
            weight: 900,
            italic: true,
        },
        FontSource::System {
            families: vec!["Impact".to_string()],
            weight: 400,
            italic: false,
        },
        FontSource::AnyFace,
    ]
}

/// Load the first candidate that yields a usable face.
pub fn load_first_font(sources: &[FontSource]) -> CardResult<Font<'static>> {
    let mut db: Option<fontdb::Database> = None;

    for source in sources {
        let loaded = match source {
            FontSource::File(path) => std::fs::read(path)
                .ok()
                .and_then(|bytes| Font::try_from_vec_and_index(bytes, 0)),
            FontSource::System {
                families,
                weight,
                italic,
            } => {
                let db = db.get_or_insert_with(system_db);
                let families: Vec<fontdb::Family<'_>> =
                    families.iter().map(|f| fontdb::Family::Name(f)).collect();
                let query = fontdb::Query {
                    families: &families,
                    weight: fontdb::Weight(*weight),
                    stretch: fontdb::Stretch::Normal,
                    style: if *italic {
                        fontdb::Style::Italic
                    } else {
                        fontdb::Style::Normal
                    },
                };
                db.query(&query).and_then(|id| load_face(db, id))
            }
            FontSource::AnyFace => {
                let db = db.get_or_insert_with(system_db);
                let query = fontdb::Query {
                    families: &[fontdb::Family::SansSerif],
                    weight: fontdb::Weight::NORMAL,
                    stretch: fontdb::Stretch::Normal,
                    style: fontdb::Style::Normal,
                };
                db.query(&query)
                    .or_else(|| db.faces().next().map(|f| f.id))
                    .and_then(|id| load_face(db, id))
            }
        };
        if let Some(font) = loaded {
            return Ok(font);
        }
    }

    Err(CardError::missing_capability(
        "no usable font found for the VS glyph (tried all candidates, \
         including system fonts)",
    ))
}

fn system_db() -> fontdb::Database {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    db
}

fn load_face(db: &fontdb::Database, id: fontdb::ID) -> Option<Font<'static>> {
    db.with_face_data(id, |data, index| {
        Font::try_from_vec_and_index(data.to_vec(), index)
    })?
}

/// Pixel bounding box of rendered text, relative to a (0, ascent) origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextBounds {
    /// Leftmost inked pixel.
    pub min_x: i32,
    /// Topmost inked pixel.
    pub min_y: i32,
    /// Inked width in pixels.
    pub width: u32,
    /// Inked height in pixels.
    pub height: u32,
}

/// Measure the inked pixel bounding box of `text` at `px` pixels.
///
/// Returns `None` for text with no inked pixels (empty or all-whitespace).
pub fn measure_text(font: &Font<'_>, px: f32, text: &str) -> Option<TextBounds> {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);

    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for glyph in font.layout(text, scale, point(0.0, v_metrics.ascent)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            min_x = min_x.min(bb.min.x);
            min_y = min_y.min(bb.min.y);
            max_x = max_x.max(bb.max.x);
            max_y = max_y.max(bb.max.y);
        }
    }
    if min_x > max_x {
        return None;
    }
    Some(TextBounds {
        min_x,
        min_y,
        width: (max_x - min_x) as u32,
        height: (max_y - min_y) as u32,
    })
}

/// Draw `text` so its inked bounding box's top-left lands on `(x, y)`,
/// blending `color` over the canvas weighted by glyph coverage.
pub fn draw_text(
    img: &mut RgbaImage,
    font: &Font<'_>,
    px: f32,
    x: i32,
    y: i32,
    color: [u8; 3],
    text: &str,
) {
    let Some(bounds) = measure_text(font, px, text) else {
        return;
    };
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let shift_x = x - bounds.min_x;
    let shift_y = y - bounds.min_y;

    for glyph in font.layout(text, scale, point(0.0, v_metrics.ascent)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, v| {
            let tx = gx as i32 + bb.min.x + shift_x;
            let ty = gy as i32 + bb.min.y + shift_y;
            if tx < 0 || ty < 0 {
                return;
            }
            let (tx, ty) = (tx as u32, ty as u32);
            if tx >= img.width() || ty >= img.height() {
                return;
            }
            let cov = v.clamp(0.0, 1.0);
            if cov <= 0.0 {
                return;
            }
            let dst = img.get_pixel_mut(tx, ty);
            let inv = 1.0 - cov;
            for ch in 0..3 {
                dst.0[ch] = (color[ch] as f32 * cov + dst.0[ch] as f32 * inv).round() as u8;
            }
            dst.0[3] = dst.0[3].max((cov * 255.0).round() as u8);
        });
    }
}
