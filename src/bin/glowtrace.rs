use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "glowtrace", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one static frame at a loop fraction as a PNG.
    Frame(FrameArgs),
    /// Render a numbered PNG sequence of the running loop.
    Sequence(SequenceArgs),
    /// Print the resolved configuration and curve statistics as JSON.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Engine configuration JSON. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// SVG document; its first path is animated.
    #[arg(long, conflicts_with = "path")]
    svg: Option<PathBuf>,

    /// SVG path data to animate. Defaults to the built-in loader loop.
    #[arg(long)]
    path: Option<String>,

    /// Square canvas size in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Loop duration in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Travel against the path direction.
    #[arg(long)]
    reverse: bool,

    /// Named palette: sunset, violet or pastel.
    #[arg(long)]
    palette: Option<String>,

    /// Leave the background transparent.
    #[arg(long)]
    transparent: bool,

    /// Seed for grain and particles.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Loop fraction in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct SequenceArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Number of frames to render.
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// File name prefix.
    #[arg(long, default_value = "frame")]
    prefix: String,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sequence(args) => cmd_sequence(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn load_config(src: &SourceArgs) -> anyhow::Result<glowtrace::EngineConfig> {
    let mut cfg = match &src.config {
        Some(p) => glowtrace::EngineConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => glowtrace::EngineConfig::default(),
    };
    if let Some(size) = src.size {
        cfg.canvas = glowtrace::Canvas::new(size, size)?;
    }
    if let Some(seconds) = src.duration {
        cfg.pacing = glowtrace::Pacing::Duration { seconds };
    }
    if src.reverse {
        cfg.reverse = true;
    }
    if let Some(name) = &src.palette {
        cfg.palette = glowtrace::Palette::named(name)?;
    }
    if src.transparent {
        cfg.background = glowtrace::Background::Transparent;
    }
    if let Some(seed) = src.seed {
        cfg.seed = seed;
    }
    Ok(cfg.sanitized()?)
}

fn load_curve(src: &SourceArgs) -> anyhow::Result<glowtrace::Curve> {
    if let Some(p) = &src.svg {
        let bytes = std::fs::read(p).with_context(|| format!("read svg '{}'", p.display()))?;
        return glowtrace::Curve::from_svg_document(&bytes)
            .with_context(|| format!("parse svg '{}'", p.display()));
    }
    if let Some(d) = &src.path {
        return glowtrace::Curve::from_svg(d).context("parse path data");
    }
    Ok(glowtrace::Curve::loader_loop()?)
}

fn make_animator(
    cfg: glowtrace::EngineConfig,
    curve: glowtrace::Curve,
    reduced_motion: bool,
) -> anyhow::Result<glowtrace::TrailAnimator<glowtrace::StaticHost, glowtrace::ManualScheduler>>
{
    let host = glowtrace::StaticHost::new(cfg.canvas, cfg.padding_px)
        .with_reduced_motion(reduced_motion);
    Ok(glowtrace::TrailAnimator::new(
        cfg,
        curve,
        host,
        glowtrace::ManualScheduler::new(),
    )?)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.source)?;
    cfg.static_progress = args.progress;
    let curve = load_curve(&args.source)?;

    let mut anim = make_animator(cfg, curve, true)?;
    let state = anim.mount();
    if state != glowtrace::LifecycleState::PausedReducedMotion {
        anyhow::bail!("animator did not produce a static frame (state {state:?})");
    }

    ensure_parent(&args.out)?;
    glowtrace::write_png(&args.out, anim.frame())
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    let fps = glowtrace::Fps::new(args.fps, 1)?;
    let mut cfg = load_config(&args.source)?;
    // Low frame rates would otherwise be slowed down by the per-frame delta clamp.
    cfg.max_frame_delta_ms = cfg.max_frame_delta_ms.max(fps.frame_duration_ms());
    let curve = load_curve(&args.source)?;

    let mut anim = make_animator(cfg, curve, false)?;
    let mut sink = glowtrace::PngSequenceSink::new(&args.out_dir, args.prefix);
    let stats = glowtrace::record(&mut anim, fps, args.frames, 0.0, &mut sink)?;

    eprintln!(
        "wrote {} frames to {} ({} repeated)",
        stats.frames_pushed,
        args.out_dir.display(),
        stats.frames_repeated
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.source)?;
    let curve = load_curve(&args.source)?;

    let table = glowtrace::SampleTable::build(&curve, cfg.sample_count, &cfg.palette);
    let profile = glowtrace::SpeedProfile::build(&table, cfg.speed_profile_opts());
    let (w_min, w_max) = profile
        .weights()
        .iter()
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), &w| (lo.min(w), hi.max(w)));
    let view_box = curve.view_box();

    let report = serde_json::json!({
        "curve": {
            "total_length": curve.total_length(),
            "segments": curve.segment_count(),
            "degenerate": curve.is_degenerate(),
            "view_box": [view_box.x0, view_box.y0, view_box.x1, view_box.y1],
        },
        "samples": {
            "count": table.len(),
            "spacing": table.spacing(),
        },
        "speed": {
            "kappa_ref": profile.kappa_ref(),
            "weight_min": w_min,
            "weight_max": w_max,
            "slowest_to_fastest": if w_max > 0.0 { w_min / w_max } else { 1.0 },
        },
        "config": cfg,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
