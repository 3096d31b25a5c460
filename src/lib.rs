//! Matchcard composes matchup promo images: a blurred, aspect-filled
//! background, two team logos (optionally traced with a white outline),
//! and a centered `VS.` glyph, rendered at a fixed set of output
//! resolutions and encoded as JPEG.
//!
//! # Pipeline overview
//!
//! 1. **Normalize**: raw bytes (raster or SVG) -> RGBA bitmap ([`decode_asset`])
//! 2. **Prepare**: aspect-fill crop + blur + optional enhancement ([`prepare_background`])
//! 3. **Scale/outline**: per-profile logo fit, optional halo ([`scale_logo`])
//! 4. **Compose**: logos on anchors, VS glyph ([`compose_scene`])
//! 5. **Batch**: every (matchup x profile) step in parallel ([`render_batch`])
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure steps**: each rendering step reads only its own matchup's bytes
//!   and profile constants; the batch is embarrassingly parallel.
//! - **Skip and continue**: a failing step is reported as a per-step
//!   `Result`; the batch itself always completes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod assets;
pub mod background;
pub mod blur;
pub mod enhance;
pub mod error;
pub mod layout;
pub mod outline;
pub mod pipeline;
pub mod profile;
pub mod text;

pub use assets::{decode_asset, looks_like_vector};
pub use background::prepare_background;
pub use error::{CardError, CardResult};
pub use layout::{VS_TEXT, compose_scene, paste_centered};
pub use outline::{fit_logo, outline_logo, scale_logo};
pub use pipeline::{
    BatchHooks, Matchup, RenderedFile, StepError, StepResult, render_batch, render_batch_with,
};
pub use profile::{ResolutionProfile, blur_sigma_for_width, builtin_profiles};
pub use text::{FontSource, default_font_sources, load_first_font};
