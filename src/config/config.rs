//! # Configuration Module
//!
//! Configuration structures and validation for the two pipeline jobs. They
//! are the common interface between the `vidproc` CLI and the library.
//!
//! ## Encode Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `input` | `PathBuf` | video or image path | Source to sample |
//! | `output` | `PathBuf` | any writable path | Container file |
//! | `fps` | `u32` | 1-60 | Sampling rate |
//! | `encoding` | [`Encoding`] | rle / packed | Frame encoding |
//! | `fit` | [`FitPolicy`] | crop / letterbox | Geometry policy |
//! | `polarity` | [`Polarity`] | dark / light | Which side of the threshold is lit |
//! | `frame_limit` | `Option<u64>` | > 0 | Stop after this many frames |
//! | `start` | `Option<Duration>` | any | Seek before sampling |
//!
//! ## Examples
//!
//! ```rust
//! use lcd_video::config::EncodeConfig;
//!
//! let mut config = EncodeConfig::default();
//! config.input = "clip.mp4".into();
//! assert!(config.validate().is_ok());
//!
//! config.fps = 0;
//! assert!(config.validate().is_err());
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::capture::{FfmpegSampler, FrameSource, StillSource};
use crate::container::Encoding;
use crate::error::{VidError, VidResult};
use crate::processing::{FitPolicy, Polarity};
use crate::session::EncodeSessionBuilder;

/// Highest accepted sampling rate.
pub const MAX_FPS: u32 = 60;
/// Default sampling rate.
pub const DEFAULT_FPS: u32 = 12;

/// Parameters of a full video encode.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeConfig {
    /// Source video, or a still image for a one-frame container.
    pub input: PathBuf,

    /// Container path. Written through a temporary file in the same
    /// directory and only renamed into place when the run succeeds.
    pub output: PathBuf,

    /// Frames sampled per second of source video.
    ///
    /// Higher values give smoother playback but grow the container linearly.
    pub fps: u32,

    pub encoding: Encoding,
    pub fit: FitPolicy,
    pub polarity: Polarity,

    /// Stop after this many frames.
    pub frame_limit: Option<u64>,

    /// Seek this far into the source before the first frame.
    pub start: Option<Duration>,
}

impl Default for EncodeConfig {
    /// Default values:
    /// - `output`: "video.bin"
    /// - `fps`: 12
    /// - `encoding`: RLE
    /// - `fit`: letterbox (nothing is cut off)
    /// - `polarity`: dark pixels lit
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from("video.bin"),
            fps: DEFAULT_FPS,
            encoding: Encoding::default(),
            fit: FitPolicy::default(),
            polarity: Polarity::default(),
            frame_limit: None,
            start: None,
        }
    }
}

impl EncodeConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> VidResult<()> {
        validate_paths(&self.input, &self.output)?;
        if !(1..=MAX_FPS).contains(&self.fps) {
            return Err(VidError::config(
                "fps",
                self.fps.to_string(),
                format!("must be between 1 and {}", MAX_FPS),
            ));
        }
        if self.frame_limit == Some(0) {
            return Err(VidError::config(
                "frame_limit",
                "0",
                "must be greater than 0 when set",
            ));
        }
        Ok(())
    }

    /// Session builder carrying this configuration's pipeline choices.
    pub fn session_builder(&self) -> EncodeSessionBuilder {
        EncodeSessionBuilder::new()
            .with_fit(self.fit)
            .with_polarity(self.polarity)
            .with_encoding(self.encoding)
            .with_frame_limit(self.frame_limit)
    }

    /// Open the input as a frame source: images decode in-process, anything
    /// else goes through ffmpeg.
    pub fn open_source(&self) -> Result<Box<dyn FrameSource>> {
        if StillSource::is_image_path(&self.input) {
            return Ok(Box::new(StillSource::open(&self.input)?));
        }
        Ok(Box::new(FfmpegSampler::open(
            &self.input,
            self.fps,
            self.start,
        )?))
    }
}

/// Parameters of a single-frame export.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameConfig {
    pub input: PathBuf,
    /// Packed bitmap path, no header.
    pub output: PathBuf,
    /// Timestamp of the frame to export. Ignored for still images.
    pub at: Duration,
    pub fit: FitPolicy,
    pub polarity: Polarity,
    /// Also write an upscaled PNG of the result here.
    pub preview: Option<PathBuf>,
    /// Pixel size of the preview, 1-16.
    pub preview_scale: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from("img.bin"),
            at: Duration::ZERO,
            fit: FitPolicy::default(),
            polarity: Polarity::default(),
            preview: None,
            preview_scale: 4,
        }
    }
}

impl FrameConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> VidResult<()> {
        validate_paths(&self.input, &self.output)?;
        if !(1..=16).contains(&self.preview_scale) {
            return Err(VidError::config(
                "preview_scale",
                self.preview_scale.to_string(),
                "must be between 1 and 16",
            ));
        }
        Ok(())
    }

    pub fn session_builder(&self) -> EncodeSessionBuilder {
        EncodeSessionBuilder::new()
            .with_fit(self.fit)
            .with_polarity(self.polarity)
    }

    pub fn open_source(&self) -> Result<Box<dyn FrameSource>> {
        if StillSource::is_image_path(&self.input) {
            return Ok(Box::new(StillSource::open(&self.input)?));
        }
        Ok(Box::new(FfmpegSampler::single(&self.input, self.at)?))
    }
}

fn validate_paths(input: &Path, output: &Path) -> VidResult<()> {
    if input.as_os_str().is_empty() {
        return Err(VidError::config("input", "", "an input path is required"));
    }
    if output.as_os_str().is_empty() {
        return Err(VidError::config("output", "", "an output path is required"));
    }
    if input == output {
        return Err(VidError::config(
            "output",
            output.display().to_string(),
            "would overwrite the input",
        ));
    }
    Ok(())
}
