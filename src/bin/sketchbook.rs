use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sketchbook::{
    AnimationController, CpuBackend, FrameCounter, FrameSink, LocationRecord, MapView, MapViewer,
    MarkerId, Mp4Sink, Pacing, PngSequenceSink, RenderBackend, RunConfig, Scheduler, SketchKind,
    SketchResult, SketchSetup, Tick,
};

#[derive(Parser, Debug)]
#[command(name = "sketchbook", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single sketch frame as a PNG.
    Frame(FrameArgs),
    /// Render a sketch to MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Run a sketch in real time, optionally saving every tick as PNG.
    Play(PlayArgs),
    /// Build a Leaflet map page from a location list.
    Map(MapArgs),
}

#[derive(Args, Debug)]
struct SketchArgs {
    /// Run configuration JSON. Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sketch to run.
    #[arg(long, value_enum)]
    sketch: Option<SketchKind>,

    /// Jitter seed (falls back to SKETCHBOOK_SEED, then a fresh seed).
    #[arg(long)]
    seed: Option<u64>,
}

impl SketchArgs {
    fn load(&self) -> anyhow::Result<RunConfig> {
        let mut cfg = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if let Some(sketch) = self.sketch {
            cfg.sketch = sketch;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        Ok(cfg)
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    sketch: SketchArgs,

    /// Frame counter value to render.
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    sketch: SketchArgs,

    /// Number of ticks to encode.
    #[arg(long)]
    frames: Option<u64>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[command(flatten)]
    sketch: SketchArgs,

    /// Stop after this many ticks. Falls back to `frames` from `--config`; runs until
    /// interrupted when neither is given.
    #[arg(long)]
    ticks: Option<u64>,

    /// Directory to write one PNG per tick into.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct MapArgs {
    /// Location list: JSON array of records (`.json`) or list markup.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output HTML path.
    #[arg(long)]
    out: PathBuf,

    /// Page title.
    #[arg(long, default_value = "Locations")]
    title: String,

    /// Print the popup HTML a click on this marker index would open.
    #[arg(long)]
    click: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Play(args) => cmd_play(args),
        Command::Map(args) => cmd_map(args),
    }
}

fn controller_for(cfg: &RunConfig) -> AnimationController {
    AnimationController::new(cfg.sketch.build(), cfg.random_source())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = args.sketch.load()?;
    let sketch = cfg.sketch.build();
    let setup = sketch.setup();
    let mut rng = cfg.random_source();

    let list = sketch.render(FrameCounter(args.frame), &mut rng)?;
    let mut backend = CpuBackend::new(cfg.render_settings());
    let frame = backend.render_draw_list(setup.canvas, &list)?;
    sketchbook::write_png(&frame, &args.out)?;

    tracing::info!(sketch = %cfg.sketch, frame = args.frame, out = %args.out.display(), "wrote png");
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = args.sketch.load()?;
    if let Some(frames) = args.frames {
        cfg.frames = frames;
    }
    cfg.validate()?;

    let mut controller = controller_for(&cfg);
    let mut sink = Mp4Sink::new(Box::new(CpuBackend::new(cfg.render_settings())), &args.out);
    Scheduler::new(Pacing::Unpaced).run(&mut controller, Some(cfg.frames), &mut sink)?;
    Ok(())
}

/// Rasterizes each tick and drops the pixels, standing in for a display.
struct HeadlessSink {
    backend: CpuBackend,
}

impl FrameSink for HeadlessSink {
    fn consume(&mut self, setup: &SketchSetup, tick: &Tick) -> SketchResult<()> {
        let frame = self.backend.render_draw_list(setup.canvas, &tick.draw)?;
        tracing::trace!(
            tick = tick.index,
            frame = tick.frame.0,
            commands = tick.draw.len(),
            bytes = frame.data.len(),
            "presented"
        );
        Ok(())
    }
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let cfg = args.sketch.load()?;
    let limit = args
        .ticks
        .or_else(|| args.sketch.config.as_ref().map(|_| cfg.frames));
    let mut controller = controller_for(&cfg);
    let scheduler = Scheduler::new(cfg.pacing);
    let backend = CpuBackend::new(cfg.render_settings());

    let stats = match &args.out_dir {
        Some(dir) => {
            let mut sink = PngSequenceSink::new(Box::new(backend), dir, cfg.sketch.as_str());
            scheduler.run(&mut controller, limit, &mut sink)?
        }
        None => {
            let mut sink = HeadlessSink { backend };
            scheduler.run(&mut controller, limit, &mut sink)?
        }
    };
    if stats.late_ticks > 0 {
        tracing::warn!(late = stats.late_ticks, "some ticks missed their deadline");
    }
    Ok(())
}

fn read_records(path: &Path) -> anyhow::Result<Vec<LocationRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read location list '{}'", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let records = if is_json {
        sketchbook::parse_records_json(&text)
    } else {
        sketchbook::parse_location_list(&text)
    }
    .with_context(|| format!("parse location list '{}'", path.display()))?;
    Ok(records)
}

fn cmd_map(args: MapArgs) -> anyhow::Result<()> {
    let records = read_records(&args.in_path)?;
    let mut viewer = MapViewer::with_records(MapView::default(), records)?;

    let html = sketchbook::render_leaflet_page(&viewer, &args.title)?;
    sketchbook::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, html)
        .with_context(|| format!("write map page '{}'", args.out.display()))?;
    tracing::info!(markers = viewer.markers().len(), out = %args.out.display(), "wrote map page");

    if let Some(index) = args.click {
        let popup = viewer.click(MarkerId(index))?;
        println!("{}", popup.to_html());
    }
    Ok(())
}
