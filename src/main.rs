use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use memmap2::Mmap;
use tempfile::NamedTempFile;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lcd_video::capture::FrameSource;
use lcd_video::codec::{PackedFrame, RunStats};
use lcd_video::config::{DEFAULT_FPS, EncodeConfig, FrameConfig};
use lcd_video::container::{ContainerReader, EncodedFrame, Encoding, HEADER_LEN};
use lcd_video::processing::{FitPolicy, Polarity};
use lcd_video::VidError;

/// Turn video into a stream for a 128x64 monochrome display.
#[derive(Parser, Debug)]
#[command(name = "vidproc")]
#[command(about = "Convert video into 128x64 1-bit frames")]
#[command(long_about = "Convert video into 128x64 1-bit frames.
Frames are sampled with ffmpeg, fitted to the display by cropping or letterboxing,
thresholded to black and white, and stored either bit-packed or run-length encoded.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a whole video into a container
    Encode(EncodeArgs),
    /// Export one frame as a packed bitmap (img.bin)
    Frame(FrameArgs),
    /// Write every frame of a container out as PNG
    Dump(DumpArgs),
    /// Show header and size statistics of a container
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct PipelineArgs {
    /// How the source is fitted onto 128x64
    #[arg(long, value_enum, default_value_t = FitPolicy::Letterbox)]
    fit: FitPolicy,

    /// Which source pixels become lit
    #[arg(long, value_enum, default_value_t = Polarity::DarkIsForeground)]
    polarity: Polarity,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Source video (or still image)
    input: PathBuf,

    /// Container file to write
    #[arg(short, long, default_value = "video.bin")]
    output: PathBuf,

    /// Sampling rate in frames per second
    #[arg(short, long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Frame encoding
    #[arg(short, long, value_enum, default_value_t = Encoding::Rle)]
    encoding: Encoding,

    /// Stop after this many frames
    #[arg(long)]
    frame_limit: Option<u64>,

    /// Start offset: 7.8s, 500ms, 2m
    #[arg(long, value_parser = parse_duration)]
    start: Option<Duration>,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Source video or image
    input: PathBuf,

    /// Packed bitmap to write
    #[arg(short, long, default_value = "img.bin")]
    output: PathBuf,

    /// Timestamp of the frame: 7.8s, 500ms, 2m
    #[arg(long, default_value = "0s", value_parser = parse_duration)]
    at: Duration,

    /// Also save an upscaled PNG of the result
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Preview pixel size
    #[arg(long, default_value_t = 4)]
    preview_scale: u32,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
struct DumpArgs {
    /// Container to read
    input: PathBuf,

    /// Encoding the container was written with
    #[arg(short, long, value_enum, default_value_t = Encoding::Rle)]
    encoding: Encoding,

    /// Directory for frame_NNNNN.png files
    #[arg(short, long, default_value = "frames")]
    out_dir: PathBuf,

    /// Preview pixel size
    #[arg(long, default_value_t = 4)]
    scale: u32,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Container to read
    input: PathBuf,

    /// Encoding the container was written with
    #[arg(short, long, value_enum, default_value_t = Encoding::Rle)]
    encoding: Encoding,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Encode(args) => encode(args),
        Command::Frame(args) => frame(args),
        Command::Dump(args) => dump(args),
        Command::Info(args) => show_info(args),
    }
}

fn encode(args: EncodeArgs) -> Result<()> {
    let config = EncodeConfig {
        input: args.input,
        output: args.output,
        fps: args.fps,
        encoding: args.encoding,
        fit: args.pipeline.fit,
        polarity: args.pipeline.polarity,
        frame_limit: args.frame_limit,
        start: args.start,
    };
    config.validate()?;

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received, stopping after the current frame");
        flag.store(true, Ordering::Relaxed);
    })
    .context("failed to install Ctrl+C handler")?;

    let mut source = config.open_source()?;
    let mut session = config.session_builder().with_cancel_flag(cancel).build();
    let mut stats = RunStats::new();

    let summary = write_atomically(&config.output, |file| {
        session.run(&mut source, BufWriter::new(file), &mut stats)
    })?;

    if summary.frames_written == 0 {
        warn!("no frames were written");
    }
    println!("Saved {} ({})", config.output.display(), stats);
    Ok(())
}

fn frame(args: FrameArgs) -> Result<()> {
    let config = FrameConfig {
        input: args.input,
        output: args.output,
        at: args.at,
        fit: args.pipeline.fit,
        polarity: args.pipeline.polarity,
        preview: args.preview,
        preview_scale: args.preview_scale,
    };
    config.validate()?;

    let mut source = config.open_source()?;
    let raw = source
        .next_frame()?
        .ok_or_else(|| anyhow!("{} produced no frame", config.input.display()))?;
    source.shutdown()?;

    let mono = config.session_builder().build().process_frame(&raw)?;
    let packed = PackedFrame::pack(&mono);
    write_atomically(&config.output, |file| {
        file.write_all(packed.as_bytes())?;
        Ok(())
    })?;

    if let Some(preview) = &config.preview {
        mono.to_gray_image(config.preview_scale)
            .save(preview)
            .with_context(|| format!("failed to save preview {}", preview.display()))?;
    }
    println!(
        "Saved {} ({} of {} pixels lit)",
        config.output.display(),
        mono.foreground_count(),
        lcd_video::frame::PIXEL_COUNT
    );
    Ok(())
}

fn dump(args: DumpArgs) -> Result<()> {
    let map = map_file(&args.input)?;
    let reader = ContainerReader::new(&map, args.encoding)?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let mut written = 0usize;
    for (i, frame) in reader.enumerate() {
        let path = args.out_dir.join(format!("frame_{:05}.png", i));
        frame?
            .to_gray_image(args.scale)
            .save(&path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        written += 1;
    }
    println!("Wrote {} frames to {}", written, args.out_dir.display());
    Ok(())
}

fn show_info(args: InfoArgs) -> Result<()> {
    let map = map_file(&args.input)?;
    let mut reader = ContainerReader::new(&map, args.encoding)?;
    let header = reader.header();

    let mut stats = RunStats::new();
    while let Some(entry) = reader.next_encoded() {
        let entry = entry?;
        if let EncodedFrame::Rle(rle) = &entry {
            for (_, len) in rle.runs() {
                stats.record_run(len);
            }
        }
        let foreground = entry.decode()?.foreground_count();
        stats.record_frame(entry.payload().len(), foreground);
    }

    println!("File:      {}", args.input.display());
    println!("Geometry:  {}x{}", header.width, header.height);
    println!("Encoding:  {}", args.encoding);
    println!("Frames:    {}", header.frame_count);
    println!("Size:      {} bytes ({} header)", map.len(), HEADER_LEN);
    println!("Payload:   {}", stats);
    if stats.frames > 0 {
        let lit = stats.foreground_pixels as f64
            / (stats.frames as f64 * lcd_video::frame::PIXEL_COUNT as f64);
        println!("Lit:       {:.1}%", lit * 100.0);
    }
    Ok(())
}

fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path).map_err(|e| VidError::io_at("open_container", path, e))?;
    // The file is only read, and not expected to change while mapped.
    let map = unsafe { Mmap::map(&file) }
        .map_err(|e| VidError::io_at("map_container", path, e))?;
    Ok(map)
}

/// Write through a temporary file next to `path`, renaming it into place only
/// if `write` succeeds.
fn write_atomically<T>(path: &Path, write: impl FnOnce(&mut File) -> Result<T>) -> Result<T> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    let value = write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("failed to move output into {}", path.display()))?;
    Ok(value)
}

/// Parse duration string like "7.8s", "500ms", "2m", "1h" or plain seconds.
fn parse_duration(duration: &str) -> Result<Duration> {
    let duration = duration.trim();
    let split = duration
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(duration.len());
    let (num_str, unit) = duration.split_at(split);
    let num: f64 = num_str
        .parse()
        .map_err(|_| anyhow!("Invalid number in duration: {:?}", num_str))?;
    if !num.is_finite() || num < 0.0 {
        bail!("Duration must be a non-negative number: {}", duration);
    }

    let seconds = match unit {
        "" | "s" => num,
        "ms" => num / 1000.0,
        "m" => num * 60.0,
        "h" => num * 3600.0,
        _ => bail!(
            "Invalid duration unit: {}. Use 'ms', 's', 'm' or 'h'",
            unit
        ),
    };
    Ok(Duration::from_secs_f64(seconds))
}
