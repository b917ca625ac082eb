use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use stardrift::{
    AssetStore, CpuSurface, FfmpegSink, FfmpegSinkOpts, FrameScheduler, FrameSink, HostEnv,
    OfflineRun, PngSequenceSink, SplashConfig,
};

#[derive(Parser, Debug)]
#[command(name = "stardrift", version)]
struct Cli {
    /// Log level written to stderr.
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the splash at one point in time as a PNG.
    Frame(FrameArgs),
    /// Render the splash as an MP4 (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
    /// Print the built-in configuration as JSON.
    PrintDefaultConfig,
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Config JSON; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory asset paths in the config are relative to.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Viewport width in CSS pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in CSS pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Device pixel ratio reported to the engine (capped per device class).
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// RNG seed, overriding the config.
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds to wait for images to load before rendering.
    #[arg(long, default_value_t = 10)]
    asset_timeout_s: u64,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Time of the frame in milliseconds since start.
    #[arg(long, default_value_t = 0)]
    at_ms: u64,

    /// Frame clock used to reach `--at-ms`.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output MP4 path, or directory with `--png-sequence`.
    #[arg(long)]
    out: PathBuf,

    /// Length of the render in seconds.
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Deliver the enter click at this time; the render ends once the exit transition finishes.
    #[arg(long)]
    enter_at_ms: Option<u64>,

    /// Write numbered PNGs instead of an MP4.
    #[arg(long, default_value_t = false)]
    png_sequence: bool,

    /// Overwrite the MP4 if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::PrintDefaultConfig => {
            println!("{}", SplashConfig::default().to_json_pretty()?);
            Ok(())
        }
    }
}

fn start_engine(args: &SceneArgs) -> anyhow::Result<FrameScheduler<CpuSurface>> {
    let mut cfg = match &args.config {
        Some(p) => SplashConfig::from_path(p)?,
        None => SplashConfig::default(),
    };
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }

    let mut store = AssetStore::load(&args.assets, &cfg)?;
    if !store.wait_settled(Duration::from_secs(args.asset_timeout_s)) {
        tracing::warn!("assets still loading; rendering without them");
    }
    let surface = match store.font_bytes() {
        Some(bytes) => CpuSurface::with_font(&bytes)?,
        None => CpuSurface::new(),
    };

    let mut engine = FrameScheduler::new(cfg, store.scene_assets(), || {
        tracing::info!("host entry callback");
    })?;
    let env = HostEnv::new(args.width, args.height, args.dpr)?;
    engine.start(Some(surface), env)?;
    Ok(engine)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut engine = start_engine(&args.scene)?;
    let frame = OfflineRun::new(args.fps, 1)?
        .render_at(&mut engine, Duration::from_millis(args.at_ms))?;
    engine.stop();

    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut engine = start_engine(&args.scene)?;
    let mut run = OfflineRun::for_duration(args.fps, args.seconds)?;
    if let Some(ms) = args.enter_at_ms {
        run = run.with_enter_at(Duration::from_millis(ms));
    }

    let mut sink: Box<dyn FrameSink> = if args.png_sequence {
        Box::new(PngSequenceSink::new(&args.out))
    } else {
        Box::new(FfmpegSink::new(FfmpegSinkOpts {
            out_path: args.out.clone(),
            overwrite: args.overwrite,
            background: engine.config().background,
        }))
    };
    let stats = run.run(&mut engine, sink.as_mut())?;
    engine.stop();

    eprintln!(
        "wrote {} ({} frames{})",
        args.out.display(),
        stats.frames,
        if stats.entry_accepted {
            ", entry accepted"
        } else {
            ""
        }
    );
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
