use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use matchcard::{Matchup, builtin_profiles};

#[derive(Parser, Debug)]
#[command(name = "matchcard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one matchup at every built-in resolution.
    Render(RenderArgs),
    /// Render a queue of matchups from a JSON manifest.
    Batch(BatchArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Background photo (JPG/PNG).
    #[arg(long)]
    background: PathBuf,

    /// Team A logo (PNG/JPG/SVG).
    #[arg(long)]
    logo_a: PathBuf,

    /// Team B logo (PNG/JPG/SVG).
    #[arg(long)]
    logo_b: PathBuf,

    /// Team A name (default: logo A file stem).
    #[arg(long)]
    team_a: Option<String>,

    /// Team B name (default: logo B file stem).
    #[arg(long)]
    team_b: Option<String>,

    /// Trace a white outline around both logos.
    #[arg(long)]
    outline: bool,

    /// Outline width in pixels.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=8))]
    outline_width: u32,

    /// Auto-enhance the background (equalize + contrast/brightness/color/sharpness).
    #[arg(long)]
    auto_enhance: bool,

    /// Directory the rendered JPEGs are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// JSON manifest: a list of matchup entries.
    #[arg(long)]
    manifest: PathBuf,

    /// Directory the rendered JPEGs are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Deserialize, Debug)]
struct ManifestEntry {
    background: PathBuf,
    logo_a: PathBuf,
    logo_b: PathBuf,
    team_a: Option<String>,
    team_b: Option<String>,
    #[serde(default)]
    outline: bool,
    #[serde(default = "default_outline_width")]
    outline_width: u32,
    #[serde(default)]
    auto_enhance: bool,
}

fn default_outline_width() -> u32 {
    3
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let matchup = load_matchup(
        &args.background,
        &args.logo_a,
        &args.logo_b,
        args.team_a.as_deref(),
        args.team_b.as_deref(),
        args.outline,
        args.outline_width,
        args.auto_enhance,
    )?;
    run_batch(vec![matchup], &args.out_dir)
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.manifest)
        .with_context(|| format!("read manifest '{}'", args.manifest.display()))?;
    let entries: Vec<ManifestEntry> =
        serde_json::from_str(&json).context("parse manifest JSON")?;
    if entries.is_empty() {
        anyhow::bail!("manifest contains no matchups");
    }

    let mut matchups = Vec::with_capacity(entries.len());
    for entry in &entries {
        matchups.push(load_matchup(
            &entry.background,
            &entry.logo_a,
            &entry.logo_b,
            entry.team_a.as_deref(),
            entry.team_b.as_deref(),
            entry.outline,
            entry.outline_width,
            entry.auto_enhance,
        )?);
    }
    run_batch(matchups, &args.out_dir)
}

#[allow(clippy::too_many_arguments)]
fn load_matchup(
    background: &Path,
    logo_a: &Path,
    logo_b: &Path,
    team_a: Option<&str>,
    team_b: Option<&str>,
    outline: bool,
    outline_width: u32,
    auto_enhance: bool,
) -> anyhow::Result<Matchup> {
    let bg = std::fs::read(background)
        .with_context(|| format!("read background '{}'", background.display()))?;
    let la = std::fs::read(logo_a).with_context(|| format!("read logo '{}'", logo_a.display()))?;
    let lb = std::fs::read(logo_b).with_context(|| format!("read logo '{}'", logo_b.display()))?;

    let team_a = match team_a {
        Some(name) => name.to_string(),
        None => file_stem(logo_a)?,
    };
    let team_b = match team_b {
        Some(name) => name.to_string(),
        None => file_stem(logo_b)?,
    };

    Ok(Matchup::new(
        bg,
        la,
        lb,
        team_a,
        team_b,
        outline,
        outline_width,
        auto_enhance,
    )?)
}

fn file_stem(path: &Path) -> anyhow::Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .with_context(|| format!("cannot derive a team name from '{}'", path.display()))
}

fn run_batch(matchups: Vec<Matchup>, out_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory '{}'", out_dir.display()))?;

    let progress = |done: usize, total: usize| {
        eprintln!("rendered {done}/{total}");
    };
    let hooks = matchcard::BatchHooks {
        progress: Some(&progress),
        cancel: None,
    };
    let results = matchcard::render_batch_with(&matchups, &builtin_profiles(), &hooks)?;

    let mut ok = 0usize;
    let mut failed = 0usize;
    for result in results {
        match result {
            Ok(file) => {
                let path = out_dir.join(&file.filename);
                std::fs::write(&path, &file.bytes)
                    .with_context(|| format!("write '{}'", path.display()))?;
                println!("{}", path.display());
                ok += 1;
            }
            Err(step) => {
                eprintln!("error: {step}");
                failed += 1;
            }
        }
    }

    eprintln!("{ok} file(s) written, {failed} step(s) failed");
    Ok(())
}
