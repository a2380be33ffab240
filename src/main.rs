use anyhow::{bail, Context};
use auto_storyboard::config::check_step_interval;
use auto_storyboard::video::{BackgroundMusic, VideoPlan, VideoSettings, Voice};
use auto_storyboard::{
    AspectRatio, ArtStyle, EngineConfig, ExportFormat, FrameCount, GenerationRequest, GenerationSession,
    HttpImageProbe, MockFrameGenerator, PlaceholderResolver, ProgressScript, Resolution, SceneBoard,
    SceneFrame, StoryboardExport,
};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "auto-storyboard")]
#[command(about = "Turn text into a storyboard or a narrated video plan", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate storyboard frames from text
    Scenes(ScenesArgs),
    /// Split text into paragraphs and plan a narrated video
    Segments(SegmentsArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input text
    #[arg(short, long)]
    text: Option<String>,

    /// Input text file path
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScenesArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Art style: anime, chinese, realistic, scifi, watercolor, sketch
    #[arg(short, long, default_value = "anime")]
    style: ArtStyle,

    /// Number of frames (2-12)
    #[arg(short = 'n', long, default_value = "6")]
    frames: FrameCount,

    #[arg(long, default_value = "720p")]
    resolution: Resolution,

    #[arg(long, default_value = "16:9")]
    aspect_ratio: AspectRatio,

    /// Swap two frames by id, e.g. `--swap 0:3` (repeatable)
    #[arg(long, value_parser = parse_swap)]
    swap: Vec<(usize, usize)>,

    /// Delete the last frame after generation
    #[arg(long)]
    drop_last: bool,

    /// Answer yes to confirmations
    #[arg(short, long)]
    yes: bool,

    /// Check every placeholder image and fall back when it does not load
    #[arg(long)]
    verify_images: bool,

    /// Export format: png, jpg or pdf
    #[arg(long, default_value = "png")]
    format: ExportFormat,

    /// Write the storyboard manifest here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Milliseconds between progress steps
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Placeholder image service base URL
    #[arg(long)]
    image_base: Option<String>,
}

#[derive(Args, Debug)]
struct SegmentsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Seconds each image stays on screen (1-10)
    #[arg(long, default_value_t = 3)]
    seconds_per_frame: u8,

    /// Narration speed (0.5-2.0)
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Narration voice: deep-male, gentle-female, child
    #[arg(long, default_value = "deep-male")]
    voice: Voice,

    /// Background music: warm-piano, upbeat-pop, classical-orchestra, nature-sounds
    #[arg(long, default_value = "warm-piano")]
    music: BackgroundMusic,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,
}

fn parse_swap(value: &str) -> Result<(usize, usize), String> {
    let (a, b) = value
        .split_once(':')
        .ok_or_else(|| format!("expected DRAGGED:TARGET, got '{}'", value))?;
    let parse = |s: &str| s.trim().parse::<usize>().map_err(|e| format!("bad frame id '{}': {}", s, e));
    Ok((parse(a)?, parse(b)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志输出到 stderr，stdout 只输出清单 JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Scenes(args) => run_scenes(args).await,
        Command::Segments(args) => run_segments(args).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn read_input(input: &InputArgs) -> anyhow::Result<String> {
    if let Some(text) = &input.text {
        Ok(text.clone())
    } else if let Some(path) = &input.file {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    } else {
        bail!("Either --text or --file must be provided")
    }
}

async fn run_scenes(args: ScenesArgs) -> anyhow::Result<()> {
    let text = read_input(&args.input).await?;
    info!("Input text length: {} characters", text.chars().count());

    let mut config = EngineConfig::from_env().context("Invalid engine configuration")?;
    if let Some(ms) = args.interval_ms {
        config.step_interval = check_step_interval(Duration::from_millis(ms)).context("Invalid --interval-ms")?;
    }
    if let Some(base) = &args.image_base {
        config.image_base = base.clone();
    }

    let request = GenerationRequest::new(text, args.style, args.frames)
        .with_format(args.resolution, args.aspect_ratio);
    info!(
        "Style: {} ({}), {} frames, {} {}",
        request.style.display_name(),
        request.style,
        request.frame_count.get(),
        request.resolution.id(),
        request.aspect_ratio.id()
    );
    let session = GenerationSession::new(
        MockFrameGenerator::new(config.image_base.clone()),
        ProgressScript::default(),
        &config,
    );

    let mut board = session
        .generate(request.clone(), |state| {
            info!("[{:>3}%] {}", state.percent, state.message);
        })
        .await?;

    if args.verify_images {
        verify_images(&mut board, &request, &config.image_base).await?;
    }

    for (dragged, target) in &args.swap {
        board.move_frame(*dragged, *target)?;
        info!("Swapped frames {} and {}", dragged, target);
    }

    if args.drop_last {
        let yes = args.yes;
        if board.remove_last(|frame| yes || confirm_delete(frame)).is_none() {
            warn!("Kept the last frame");
        }
    }

    let export = StoryboardExport::new(&request, &board, args.format)?;
    match &args.output {
        Some(path) => export.write_to(path).await?,
        None => println!("{}", export.to_json()?),
    }
    Ok(())
}

async fn verify_images(board: &mut SceneBoard, request: &GenerationRequest, image_base: &str) -> anyhow::Result<()> {
    info!("Verifying {} placeholder images...", board.len());
    let probe = HttpImageProbe::new(Duration::from_secs(10))?;
    let (width, height) = request.dimensions();
    let resolver = PlaceholderResolver::new(image_base, width, height)?;

    for frame in board.frames_mut() {
        frame.image_url = resolver
            .resolve_verified(&probe, &frame.description, request.style, frame.id)
            .await?;
    }
    Ok(())
}

fn confirm_delete(frame: &SceneFrame) -> bool {
    eprint!("Delete frame {} ({})? [y/N] ", frame.id, frame.description);
    if std::io::stderr().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

async fn run_segments(args: SegmentsArgs) -> anyhow::Result<()> {
    let text = read_input(&args.input).await?;
    let settings = VideoSettings::new(args.voice, args.music, args.seconds_per_frame, args.speed)?;
    let plan = VideoPlan::build(&text, settings)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} segments, {:.1}s, narration speed {}",
        plan.clips.len(),
        plan.total_duration(),
        auto_storyboard::video::speed_label(settings.speech_speed)
    );
    for clip in &plan.clips {
        println!("{:>6.1}s - {:>6.1}s  {}", clip.start, clip.end(), clip.text);
    }
    Ok(())
}
