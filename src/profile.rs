//! Fixed output resolution presets.
//!
//! Every rendered file targets one of these profiles. Anchors are the
//! *centers* of the pasted logos in output pixel space.

use serde::{Deserialize, Serialize};

/// One output-size/layout preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolutionProfile {
    /// Output canvas width in pixels.
    pub width: u32,
    /// Output canvas height in pixels.
    pub height: u32,
    /// Center point of logo A on the canvas.
    pub logo_a_anchor: (i64, i64),
    /// Center point of logo B on the canvas.
    pub logo_b_anchor: (i64, i64),
    /// Longest side of a scaled logo, in pixels.
    pub logo_max_size: u32,
    /// VS glyph size in pixels.
    pub font_size: f32,
    /// Downward shift of the VS glyph, as a fraction of canvas height.
    ///
    /// Glyph bounding boxes are not symmetric around the optical center, so
    /// plain centering sits slightly high; the fraction is tuned per profile.
    pub vs_offset_frac: f32,
    /// Human-readable label, used in output filenames.
    pub label: String,
}

impl ResolutionProfile {
    /// Blur sigma for this profile's background.
    pub fn blur_sigma(&self) -> f32 {
        blur_sigma_for_width(self.width)
    }
}

/// The three built-in profiles, in their fixed order.
pub fn builtin_profiles() -> Vec<ResolutionProfile> {
    vec![
        ResolutionProfile {
            width: 1920,
            height: 1080,
            logo_a_anchor: (476, 666),
            logo_b_anchor: (1440, 666),
            logo_max_size: 450,
            font_size: 130.0,
            vs_offset_frac: 0.05,
            label: "1920x1080".to_string(),
        },
        ResolutionProfile {
            width: 3840,
            height: 2160,
            logo_a_anchor: (952, 1332),
            logo_b_anchor: (2880, 1332),
            logo_max_size: 900,
            font_size: 260.0,
            vs_offset_frac: 0.05,
            label: "3840x2160".to_string(),
        },
        ResolutionProfile {
            width: 480,
            height: 720,
            logo_a_anchor: (120, 230),
            logo_b_anchor: (360, 515),
            logo_max_size: 177,
            font_size: 60.0,
            vs_offset_frac: 0.02,
            label: "480x720".to_string(),
        },
    ]
}

/// Background blur sigma keyed by canvas width.
///
/// The default arm is unreachable with the built-in profile set but keeps
/// custom profiles usable.
pub fn blur_sigma_for_width(width: u32) -> f32 {
    match width {
        1920 => 11.3,
        3840 => 20.0,
        480 => 8.1,
        _ => 10.0,
    }
}
