use std::{
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "choreo", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize a scene to a PNG sequence or an MP4 (MP4 requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print every display list as one JSON object per line.
    Inspect(SceneArgs),
    /// Print per-frame fingerprints and a SHA-256 over all of them.
    Fingerprint(SceneArgs),
    /// List the scenes declared in a file.
    List {
        /// Input scene description JSON.
        #[arg(long = "in")]
        in_path: PathBuf,
    },
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Input scene description JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scene to run; defaults to the only scene in the file.
    #[arg(long)]
    scene: Option<String>,

    #[arg(long)]
    fps: Option<u32>,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output directory (png) or file (mp4).
    #[arg(long)]
    out: PathBuf,

    /// Defaults to mp4 when `--out` ends in `.mp4`, png otherwise.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Buffer the display lists and rasterize them on a thread pool.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    /// Rasterize repeated frames once (with `--parallel`).
    #[arg(long)]
    elide_static: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Png,
    Mp4,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Fingerprint(args) => cmd_fingerprint(args),
        Command::List { in_path } => cmd_list(&in_path),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_scene_file(path: &Path) -> anyhow::Result<choreo::SceneFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open scene description '{}'", path.display()))?;
    Ok(choreo::SceneFile::from_json(&text)?)
}

fn pick_scene<'a>(
    file: &'a choreo::SceneFile,
    name: Option<&str>,
) -> anyhow::Result<(&'a str, &'a choreo::SceneScript)> {
    if let Some(name) = name {
        let (key, script) = file
            .scenes
            .get_key_value(name)
            .with_context(|| format!("no scene named '{name}'"))?;
        return Ok((key.as_str(), script));
    }
    let mut iter = file.scenes.iter();
    match (iter.next(), iter.next()) {
        (Some((key, script)), None) => Ok((key.as_str(), script)),
        _ => anyhow::bail!(
            "file declares several scenes ({}); pick one with --scene",
            file.scene_names().collect::<Vec<_>>().join(", ")
        ),
    }
}

fn scene_config(file: &choreo::SceneFile, args: &SceneArgs) -> anyhow::Result<choreo::SceneConfig> {
    let mut config = file.config.clone().with_env_overrides();
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if let Some(w) = args.width {
        config.pixel_width = w;
    }
    if let Some(h) = args.height {
        config.pixel_height = h;
    }
    config.validate()?;
    Ok(config)
}

/// Run the chosen scene to completion, handing frames to `sink`.
fn run_scene(
    args: &SceneArgs,
    sink: impl choreo::FrameSink + 'static,
) -> anyhow::Result<choreo::SceneConfig> {
    let file = read_scene_file(&args.in_path)?;
    let (name, script) = pick_scene(&file, args.scene.as_deref())?;
    let config = scene_config(&file, args)?;
    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));

    let mut scene = choreo::Scene::new(config.clone())?
        .with_sink(sink)
        .with_image_loader(Arc::new(choreo::FsImageLoader::new(assets_root)));
    let run = choreo::run_script(&mut scene, script).with_context(|| format!("scene '{name}'"))?;
    scene.finish()?;
    tracing::info!(
        scene = name,
        segments = run.segments.len(),
        frames = scene.frame_count(),
        seconds = scene.time(),
        "scene finished"
    );
    Ok(config)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let format = args.format.unwrap_or_else(|| {
        match args.out.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("mp4") => OutputFormat::Mp4,
            _ => OutputFormat::Png,
        }
    });

    if args.parallel {
        let recorder = choreo::FrameRecorder::new();
        let config = run_scene(&args.scene, recorder.clone())?;
        let frames = recorder.take();
        let mut writer = make_writer(format, &args.out, &config)?;
        let mut backend = choreo::CpuBackend::new(choreo::RenderSettings::from_config(&config));
        let threading = choreo::RenderThreading {
            parallel: true,
            threads: args.threads,
            static_frame_elision: args.elide_static,
            ..choreo::RenderThreading::default()
        };
        let stats = choreo::render_frames_with_stats(&frames, &mut backend, &threading, |f| {
            writer.write_frame(&f)
        })?;
        writer.finish()?;
        eprintln!(
            "rendered {} frames ({} elided)",
            stats.frames_total, stats.frames_elided
        );
    } else {
        let file = read_scene_file(&args.scene.in_path)?;
        let config = scene_config(&file, &args.scene)?;
        let writer = make_writer(format, &args.out, &config)?;
        let backend = choreo::CpuBackend::new(choreo::RenderSettings::from_config(&config));
        run_scene(&args.scene, choreo::RasterSink::new(backend, writer))?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn make_writer(
    format: OutputFormat,
    out: &Path,
    config: &choreo::SceneConfig,
) -> anyhow::Result<Box<dyn choreo::FrameWriter>> {
    Ok(match format {
        OutputFormat::Png => Box::new(choreo::PngSequenceWriter::new(out, config.background)?),
        OutputFormat::Mp4 => {
            if !choreo::is_ffmpeg_on_path() {
                anyhow::bail!("mp4 output needs ffmpeg on PATH; try --format png");
            }
            Box::new(choreo::FfmpegEncoder::create(
                out,
                choreo::VideoSettings::from_config(config),
            )?)
        }
    })
}

fn cmd_inspect(args: SceneArgs) -> anyhow::Result<()> {
    let recorder = choreo::FrameRecorder::new();
    run_scene(&args, recorder.clone())?;
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for frame in recorder.take() {
        serde_json::to_writer(&mut out, &frame).context("serialize display list")?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_fingerprint(args: SceneArgs) -> anyhow::Result<()> {
    let sink = choreo::FingerprintSink::new();
    run_scene(&args, sink.clone())?;
    let prints = sink.fingerprints();
    let mut hasher = sha2::Sha256::new();
    for (i, fp) in prints.iter().enumerate() {
        let hex = fp.to_string();
        println!("{i:05} {hex}");
        hasher.update(hex.as_bytes());
    }
    println!("total {} frames {}", sha256_hex(&hasher.finalize()), prints.len());
    Ok(())
}

fn cmd_list(in_path: &Path) -> anyhow::Result<()> {
    let file = read_scene_file(in_path)?;
    for (name, script) in &file.scenes {
        println!(
            "{name}\tobjects={}\tcommands={}",
            script.objects.len(),
            script.commands.len()
        );
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
