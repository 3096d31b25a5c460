//! Batch rendering: every queued matchup across every resolution profile.
//!
//! Each (matchup, profile) pair is one independent rendering step. Steps
//! run on the rayon worker pool; a failing step is reported and skipped,
//! never aborting the batch. Results come back in matchup-major,
//! profile-minor order.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::Context as _;
use image::RgbaImage;
use rayon::prelude::*;
use rusttype::Font;

use crate::assets::decode_asset;
use crate::background::prepare_background;
use crate::error::{CardError, CardResult};
use crate::layout::compose_scene;
use crate::outline::scale_logo;
use crate::profile::ResolutionProfile;
use crate::text::{default_font_sources, load_first_font};

/// JPEG quality for encoded output files.
const JPEG_QUALITY: u8 = 95;

/// One unit of work: raw assets plus rendering options for a single
/// pairing. Immutable once created.
#[derive(Clone, Debug)]
pub struct Matchup {
    /// Raw background photo bytes (any raster format).
    pub background: Vec<u8>,
    /// Raw logo bytes for team A (raster or SVG).
    pub logo_a: Vec<u8>,
    /// Raw logo bytes for team B (raster or SVG).
    pub logo_b: Vec<u8>,
    /// Team A display name, used in output filenames.
    pub team_a: String,
    /// Team B display name, used in output filenames.
    pub team_b: String,
    /// Whether to trace a white outline around both logos.
    pub outline: bool,
    /// Outline width in output-space pixels (only used when `outline` is set).
    pub outline_width: u32,
    /// Whether to run the background auto-enhancement chain.
    pub auto_enhance: bool,
}

impl Matchup {
    /// Validate and build a matchup. Invalid input fails here, at ingestion
    /// time, so a bad matchup is never queued.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        background: Vec<u8>,
        logo_a: Vec<u8>,
        logo_b: Vec<u8>,
        team_a: impl Into<String>,
        team_b: impl Into<String>,
        outline: bool,
        outline_width: u32,
        auto_enhance: bool,
    ) -> CardResult<Self> {
        let team_a = team_a.into();
        let team_b = team_b.into();
        if background.is_empty() {
            return Err(CardError::validation("background bytes must be non-empty"));
        }
        if logo_a.is_empty() || logo_b.is_empty() {
            return Err(CardError::validation("both logo buffers must be non-empty"));
        }
        if team_a.trim().is_empty() || team_b.trim().is_empty() {
            return Err(CardError::validation("both team names must be non-empty"));
        }
        if outline && outline_width == 0 {
            return Err(CardError::validation("outline width must be at least 1"));
        }
        Ok(Self {
            background,
            logo_a,
            logo_b,
            team_a,
            team_b,
            outline,
            outline_width,
            auto_enhance,
        })
    }

    /// Label used in reports and filenames: `"A vs B"`.
    pub fn pairing(&self) -> String {
        format!("{} vs {}", self.team_a, self.team_b)
    }

    fn outline_spec(&self) -> Option<u32> {
        self.outline.then_some(self.outline_width)
    }
}

/// One encoded output artifact.
#[derive(Clone, Debug)]
pub struct RenderedFile {
    /// `"{teamA} vs {teamB} - {label}.jpg"`.
    pub filename: String,
    /// JPEG-encoded image bytes.
    pub bytes: Vec<u8>,
}

/// A failed rendering step, named after the pairing and profile it belongs
/// to. The reason is user-facing language.
#[derive(Clone, Debug)]
pub struct StepError {
    /// The affected pairing, `"A vs B"`.
    pub pairing: String,
    /// The affected profile label.
    pub profile: String,
    /// Human-readable cause.
    pub reason: String,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {} failed: {}",
            self.pairing, self.profile, self.reason
        )
    }
}

impl std::error::Error for StepError {}

/// The per-step outcome the batch collects.
pub type StepResult = Result<RenderedFile, StepError>;

/// Optional per-batch callbacks.
#[derive(Default)]
pub struct BatchHooks<'a> {
    /// Invoked after every completed step with `(done, total)`.
    pub progress: Option<&'a (dyn Fn(usize, usize) + Sync)>,
    /// Cooperative cancellation, checked at step granularity. Steps that
    /// never started are absent from the output.
    pub cancel: Option<&'a AtomicBool>,
}

/// Render every matchup at every profile with default hooks.
pub fn render_batch(
    matchups: &[Matchup],
    profiles: &[ResolutionProfile],
) -> CardResult<Vec<StepResult>> {
    render_batch_with(matchups, profiles, &BatchHooks::default())
}

/// Render every matchup at every profile.
///
/// The VS-glyph font is resolved once up front; a system with no usable
/// font at all fails here rather than once per step. Asset problems never
/// do: a corrupt background or logo fails only its own step(s).
#[tracing::instrument(skip_all, fields(matchups = matchups.len(), profiles = profiles.len()))]
pub fn render_batch_with(
    matchups: &[Matchup],
    profiles: &[ResolutionProfile],
    hooks: &BatchHooks<'_>,
) -> CardResult<Vec<StepResult>> {
    let font = load_first_font(&default_font_sources())?;
    let total = matchups.len() * profiles.len();
    tracing::debug!(total, "starting batch render");

    // Backgrounds decode once per matchup and are shared across its steps.
    let backgrounds: Vec<Result<Arc<RgbaImage>, String>> = matchups
        .iter()
        .map(|m| {
            decode_asset(&m.background, None)
                .map(Arc::new)
                .map_err(|e| e.to_string())
        })
        .collect();

    let steps: Vec<(usize, &ResolutionProfile)> = matchups
        .iter()
        .enumerate()
        .flat_map(|(mi, _)| profiles.iter().map(move |p| (mi, p)))
        .collect();

    let done = AtomicUsize::new(0);
    let results: Vec<Option<StepResult>> = steps
        .par_iter()
        .map(|&(mi, profile)| {
            if let Some(cancel) = hooks.cancel
                && cancel.load(Ordering::Relaxed)
            {
                return None;
            }

            let matchup = &matchups[mi];
            let outcome = match &backgrounds[mi] {
                Ok(bg) => render_step(matchup, bg, profile, &font),
                Err(cause) => Err(CardError::decode(format!(
                    "could not open background: {cause}"
                ))),
            };

            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(progress) = hooks.progress {
                progress(finished, total);
            }

            Some(outcome.map_err(|e| {
                let err = StepError {
                    pairing: matchup.pairing(),
                    profile: profile.label.clone(),
                    reason: e.to_string(),
                };
                tracing::warn!(%err, "rendering step failed");
                err
            }))
        })
        .collect();

    Ok(results.into_iter().flatten().collect())
}

/// Render one (matchup, profile) step to an encoded file.
fn render_step(
    matchup: &Matchup,
    background: &RgbaImage,
    profile: &ResolutionProfile,
    font: &Font<'_>,
) -> CardResult<RenderedFile> {
    let prepared = prepare_background(
        background,
        profile.width,
        profile.height,
        profile.blur_sigma(),
        matchup.auto_enhance,
    )?;

    // Logos are decoded and scaled fresh per profile; scaling is
    // profile-specific, so nothing is reusable across profiles.
    let logo_a = decode_asset(&matchup.logo_a, None)?;
    let logo_b = decode_asset(&matchup.logo_b, None)?;
    let logo_a = scale_logo(&logo_a, profile.logo_max_size, matchup.outline_spec())?;
    let logo_b = scale_logo(&logo_b, profile.logo_max_size, matchup.outline_spec())?;

    let scene = compose_scene(&prepared, &logo_a, &logo_b, profile, font);
    let bytes = encode_jpeg(&scene)?;

    Ok(RenderedFile {
        filename: format!("{} - {}.jpg", matchup.pairing(), profile.label),
        bytes,
    })
}

fn encode_jpeg(img: &RgbaImage) -> CardResult<Vec<u8>> {
    let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    encoder.encode_image(&rgb).context("encode jpeg output")?;
    Ok(buf)
}
