use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "slidefx", version)]
struct Cli {
    /// Log debug diagnostics to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frames of one effect between two images.
    Transition(TransitionArgs),
    /// Play a JSON slideshow description.
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
struct TransitionArgs {
    /// Leaving slide (PNG).
    #[arg(long)]
    from: PathBuf,

    /// Entering slide (PNG), same size as `--from`.
    #[arg(long)]
    to: PathBuf,

    /// Effect type, e.g. `BarWipe`.
    #[arg(long = "type")]
    transition_type: String,

    /// Effect subtype, e.g. `LeftToRight`.
    #[arg(long, default_value = "Default")]
    subtype: String,

    /// Play the effect in reverse.
    #[arg(long)]
    reverse: bool,

    /// Fade colour as `#rrggbb`.
    #[arg(long)]
    fade_color: Option<String>,

    /// Effect length in milliseconds.
    #[arg(long, default_value_t = 2000)]
    duration_ms: u64,

    /// Output frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Shade on one thread.
    #[arg(long)]
    single_thread: bool,

    /// Output directory for the PNG sequence.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// JSON array of slide descriptors.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Session options (JSON). Flags below override it.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Slide width in document units.
    #[arg(long)]
    slide_width: Option<u32>,

    /// Slide height in document units.
    #[arg(long)]
    slide_height: Option<u32>,

    /// Transition length for slides that declare none, in milliseconds.
    #[arg(long)]
    default_transition_ms: Option<u64>,

    /// Cut instead of crossfading when an effect is unsupported.
    #[arg(long)]
    no_fallback_crossfade: bool,

    /// Shade on one thread.
    #[arg(long)]
    single_thread: bool,

    /// How long each slide and shape effect stays on screen before advancing, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    hold_ms: u64,

    /// Output frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Output directory for the PNG sequence.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Transition(args) => cmd_transition(args),
        Command::Show(args) => cmd_show(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn frame_interval(fps: u32) -> anyhow::Result<Duration> {
    if fps == 0 {
        anyhow::bail!("--fps must be positive");
    }
    Ok(Duration::from_nanos(1_000_000_000 / u64::from(fps)))
}

fn read_png(path: &Path) -> anyhow::Result<slidefx::FrameRGBA> {
    let img = image::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    let mut data = img.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
    Ok(slidefx::FrameRGBA::from_data(width, height, data)?)
}

fn cmd_transition(args: TransitionArgs) -> anyhow::Result<()> {
    use slidefx::{FrameSink as _, Transition as _};

    let dt = frame_interval(args.fps)?;
    let from = read_png(&args.from)?;
    let to = read_png(&args.to)?;
    if from.canvas() != to.canvas() {
        anyhow::bail!(
            "images differ in size: {}x{} vs {}x{}",
            from.width,
            from.height,
            to.width,
            to.height
        );
    }

    let canvas = from.canvas();
    let ctx = slidefx::RenderContext::new(
        canvas,
        slidefx::ContextOpts {
            parallel: !args.single_thread,
        },
    );
    let info = slidefx::TransitionFilterInfo::from_names(
        &args.transition_type,
        &args.subtype,
        !args.reverse,
        true,
        args.fade_color.as_deref(),
    );
    let params = slidefx::TransitionParameters::slide(ctx.clone(), from, to)
        .with_animation_time(Duration::from_millis(args.duration_ms));
    let transition = slidefx::create_transition(&info, params);
    eprintln!("effect: {}", transition.name());

    let mut sink = slidefx::PngSequenceSink::new(&args.out, "frame_");
    sink.begin(slidefx::SinkConfig {
        width: canvas.width,
        height: canvas.height,
    })?;

    let mut player = slidefx::TransitionPlayer::new(transition);
    player.start(Duration::ZERO)?;
    sink.push_frame(0, &ctx.read_pixels())?;
    let mut idx = 1u64;
    loop {
        let more = player.on_frame(dt * idx as u32);
        sink.push_frame(idx, &ctx.read_pixels())?;
        idx += 1;
        if !more {
            break;
        }
    }
    player.stop();
    sink.end()?;

    eprintln!("wrote {idx} frames to {}", args.out.display());
    Ok(())
}

fn cmd_show(args: ShowArgs) -> anyhow::Result<()> {
    let dt = frame_interval(args.fps)?;
    let json = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read slides '{}'", args.in_path.display()))?;
    let slides = slidefx::SlideInfo::list_from_json(&json)
        .with_context(|| format!("parse slides '{}'", args.in_path.display()))?;

    let mut opts = match &args.opts {
        Some(path) => slidefx::SlideShowOpts::from_path(path)?,
        None => slidefx::SlideShowOpts::default(),
    };
    if let Some(w) = args.slide_width {
        opts.slide_width = w;
    }
    if let Some(h) = args.slide_height {
        opts.slide_height = h;
    }
    if let Some(ms) = args.default_transition_ms {
        opts.default_transition_ms = ms;
    }
    if args.no_fallback_crossfade {
        opts.fallback_to_crossfade = false;
    }
    if args.single_thread {
        opts.parallel_raster = false;
    }

    let source = slidefx::SolidLayerSource::new(slidefx::Rgba8Premul::from_straight_rgba(
        255, 255, 255, 255,
    ));
    let sink = slidefx::PngSequenceSink::new(&args.out, "frame_");
    let mut session = slidefx::SlideShowSession::new(opts, slides, source, sink)?;

    let hold = Duration::from_millis(args.hold_ms);
    let mut now = Duration::ZERO;
    session.start(now)?;
    while !session.is_finished() && session.current_slide().is_some() {
        while session.wants_frames() {
            now += dt;
            session.tick(now);
        }
        now += hold;
        session.next(now);
    }
    let frames = session.frames_presented();
    session.stop();

    eprintln!("wrote {frames} frames to {}", args.out.display());
    Ok(())
}
