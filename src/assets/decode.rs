use std::path::Path;

use image::RgbaImage;

use crate::error::{CardError, CardResult};

/// How many leading bytes are inspected when sniffing for vector markup.
const SNIFF_LEN: usize = 512;

/// Decode raw asset bytes into a straight-alpha RGBA bitmap.
///
/// `name_hint` is the original filename, when known; it is only used to
/// classify the buffer as vector markup. Classification falls back to
/// content sniffing when no extension is available. The function is pure:
/// the same bytes always produce the same pixels.
pub fn decode_asset(bytes: &[u8], name_hint: Option<&str>) -> CardResult<RgbaImage> {
    if looks_like_vector(bytes, name_hint) {
        return rasterize_vector(bytes);
    }
    decode_raster(bytes)
}

/// Classify a buffer as vector markup.
///
/// The extension hint wins when present; otherwise the first bytes are
/// checked for an `<svg` tag, an XML declaration, or the SVG namespace.
pub fn looks_like_vector(bytes: &[u8], name_hint: Option<&str>) -> bool {
    if let Some(name) = name_hint
        && let Some(ext) = Path::new(name).extension()
    {
        return ext.eq_ignore_ascii_case("svg");
    }

    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let head = head.to_ascii_lowercase();
    contains(&head, b"<svg")
        || contains(&head, b"<?xml")
        || contains(&head, br#"xmlns="http://www.w3.org/2000/svg""#)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn decode_raster(bytes: &[u8]) -> CardResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| CardError::decode(format!("could not decode raster image: {e}")))?;
    Ok(dyn_img.to_rgba8())
}

#[cfg(feature = "svg")]
fn rasterize_vector(bytes: &[u8]) -> CardResult<RgbaImage> {
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    let opts = usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..usvg::Options::default()
    };

    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| CardError::decode(format!("could not parse vector markup: {e}")))?;

    let (w, h) = vector_raster_size(&tree)?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| CardError::decode("failed to allocate vector pixmap"))?;

    let sx = (w as f32) / tree.size().width();
    let sy = (h as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    let mut data = pixmap.take();
    demultiply_rgba8_in_place(&mut data);
    RgbaImage::from_raw(w, h, data)
        .ok_or_else(|| CardError::decode("vector pixmap has wrong length"))
}

#[cfg(feature = "svg")]
fn vector_raster_size(tree: &usvg::Tree) -> CardResult<(u32, u32)> {
    fn to_px(v: f32) -> CardResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(CardError::decode("vector markup has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let w = to_px(size.width())?;
    let h = to_px(size.height())?;

    // Avoid pathological allocations from hostile markup.
    const MAX_DIM: u32 = 16_384;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(CardError::decode(format!(
            "vector raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

#[cfg(feature = "svg")]
fn demultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(not(feature = "svg"))]
fn rasterize_vector(_bytes: &[u8]) -> CardResult<RgbaImage> {
    Err(CardError::missing_capability(
        "vector (SVG) input detected but no vector rendering backend is compiled in. \
         Two options: (1) supply a raster file (PNG/JPEG) instead, or \
         (2) build matchcard with the `svg` feature enabled",
    ))
}
