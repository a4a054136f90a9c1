//! Video sampling through an `ffmpeg` subprocess.
//!
//! `ffprobe` reports the stream geometry, then `ffmpeg` decodes the video,
//! resamples it with the `fps` filter, and writes tightly packed `rgb24`
//! frames to its stdout. Each read pulls exactly one frame.
//!
//! ffmpeg runs with `-noautorotate` so the decoded frames keep the stream's
//! stored geometry, which is what `ffprobe` reports. On unix it is also put
//! in its own process group: Ctrl+C in the terminal reaches only `vidproc`,
//! which stops at the next frame boundary and then kills the decoder.

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use mono_scale::Size;
use tracing::{debug, warn};

use super::FrameSource;
use crate::frame::RawFrame;

/// Programs used to probe and decode.
#[derive(Clone, Debug)]
struct Tools {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            ffprobe: PathBuf::from("ffprobe"),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// Ask `ffprobe` for the width and height of the first video stream.
fn probe_dimensions(ffprobe: &Path, path: &Path) -> Result<Size> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=s=x:p=0",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .context("failed to run ffprobe (ensure it's installed and on PATH)")?;

    if !output.status.success() {
        return Err(anyhow!(
            "ffprobe exited with status {} for {}",
            output.status,
            path.display()
        ));
    }
    parse_dimensions(&String::from_utf8_lossy(&output.stdout))
        .with_context(|| format!("no video stream in {}", path.display()))
}

/// Parse ffprobe's `WIDTHxHEIGHT` output.
fn parse_dimensions(text: &str) -> Result<Size> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| anyhow!("ffprobe printed nothing"))?;
    // Some containers append a trailing separator.
    let line = line.trim_end_matches('x');
    let (w, h) = line
        .split_once('x')
        .ok_or_else(|| anyhow!("unexpected ffprobe output: {:?}", line))?;
    let w: u32 = w.parse().with_context(|| format!("bad width {:?}", w))?;
    let h: u32 = h.parse().with_context(|| format!("bad height {:?}", h))?;
    if w == 0 || h == 0 {
        bail!("video stream reports {}x{}", w, h);
    }
    Ok(Size::new(w, h))
}

/// What to pull out of the video.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sampling {
    /// Every frame at a fixed rate.
    Rate(u32),
    /// A single frame.
    Single,
}

fn ffmpeg_args(path: &Path, sampling: Sampling, start: Option<Duration>) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-nostdin".into(),
        "-v".into(),
        "error".into(),
        "-noautorotate".into(),
    ];
    if let Some(start) = start {
        args.push("-ss".into());
        args.push(format!("{:.3}", start.as_secs_f64()));
    }
    args.push("-i".into());
    args.push(path.to_string_lossy().into_owned());
    args.push("-an".into());
    match sampling {
        Sampling::Rate(fps) => {
            args.push("-vf".into());
            args.push(format!("fps={}", fps));
        }
        Sampling::Single => {
            args.push("-frames:v".into());
            args.push("1".into());
        }
    }
    args.extend(
        ["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"]
            .iter()
            .map(|s| s.to_string()),
    );
    args
}

/// Frames decoded by a running `ffmpeg` process.
pub struct FfmpegSampler {
    path: PathBuf,
    child: Child,
    stdout: Option<ChildStdout>,
    size: Size,
    sampling: Sampling,
    start_ms: u64,
    index: u64,
    cancel: Option<Arc<AtomicBool>>,
}

impl FfmpegSampler {
    /// Start sampling `path` at `fps` frames per second.
    pub fn open(path: impl AsRef<Path>, fps: u32, start: Option<Duration>) -> Result<Self> {
        if fps == 0 {
            bail!("sampling rate must be at least 1 fps");
        }
        Self::spawn(&Tools::default(), path.as_ref(), Sampling::Rate(fps), start)
    }

    /// Prepare to pull the single frame at `at`.
    pub fn single(path: impl AsRef<Path>, at: Duration) -> Result<Self> {
        Self::spawn(&Tools::default(), path.as_ref(), Sampling::Single, Some(at))
    }

    fn spawn(
        tools: &Tools,
        path: &Path,
        sampling: Sampling,
        start: Option<Duration>,
    ) -> Result<Self> {
        let size = probe_dimensions(&tools.ffprobe, path)?;
        let args = ffmpeg_args(path, sampling, start);
        debug!(?args, width = size.w, height = size.h, "spawning ffmpeg");

        let mut command = Command::new(&tools.ffmpeg);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command
            .spawn()
            .context("failed to spawn ffmpeg (ensure it's installed and on PATH)")?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("ffmpeg stdout not available"))?;

        Ok(Self {
            path: path.to_path_buf(),
            child,
            stdout: Some(stdout),
            size,
            sampling,
            start_ms: start.map_or(0, |d| d.as_millis() as u64),
            index: 0,
            cancel: None,
        })
    }

    fn cancel_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn pts_ms(&self) -> u64 {
        match self.sampling {
            Sampling::Rate(fps) => self.start_ms + self.index * 1000 / u64::from(fps),
            Sampling::Single => self.start_ms,
        }
    }

    /// Close the pipe and check how ffmpeg exited.
    fn finish(&mut self) -> Result<()> {
        if self.stdout.take().is_none() {
            return Ok(());
        }
        let status = self.child.wait().context("waiting for ffmpeg to finish")?;
        if !status.success() {
            if self.cancel_requested() {
                debug!(code = ?status.code(), frames = self.index, "ffmpeg stopped after cancel");
                return Ok(());
            }
            return Err(anyhow!(
                "ffmpeg exited with code {:?} while decoding {}",
                status.code(),
                self.path.display()
            ));
        }
        Ok(())
    }
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl FrameSource for FfmpegSampler {
    fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        if self.sampling == Sampling::Single && self.index > 0 {
            self.finish()?;
            return Ok(None);
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut data = vec![0u8; self.size.area() * 3];
        let filled = read_full(stdout, &mut data).context("reading frame from ffmpeg")?;
        if filled < data.len() {
            if filled > 0 {
                warn!(
                    bytes = filled,
                    expected = data.len(),
                    frame = self.index,
                    "dropping partial trailing frame"
                );
            }
            self.finish()?;
            if self.index == 0 && self.sampling == Sampling::Single {
                bail!("no frame at the requested time in {}", self.path.display());
            }
            return Ok(None);
        }

        let frame = RawFrame::new(self.size.w, self.size.h, data).with_pts_ms(self.pts_ms());
        self.index += 1;
        Ok(Some(frame))
    }

    fn input_size(&self) -> Size {
        self.size
    }

    fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.stdout.take().is_some() {
            // Stopped early: ffmpeg would block on a full pipe.
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
        Ok(())
    }
}

impl Drop for FfmpegSampler {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
