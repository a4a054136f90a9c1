//! # Encode Session
//!
//! Drives one pass over a [`FrameSource`]:
//!
//! ```text
//! source ─► FrameNormalizer ─► Monochromizer ─► {packed | rle} ─► ContainerWriter
//! ```
//!
//! Sessions are assembled with [`EncodeSessionBuilder`]. All decisions
//! (fit policy, polarity, encoding, limits) are fixed at build time; the run
//! loop only pulls, transforms and appends.
//!
//! ## Stopping
//!
//! A run ends when the source is exhausted, the frame limit is reached, or the
//! cancel flag is raised. In every case the frames written so far form a valid
//! container because the header is patched before returning.

use std::io::{Seek, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::capture::FrameSource;
use crate::codec::RunStats;
use crate::container::{ContainerWriter, Encoding};
use crate::error::VidResult;
use crate::frame::{MonoFrame, RawFrame};
use crate::processing::{FitPolicy, FrameNormalizer, Monochromizer, Polarity};

/// Frames between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 50;

/// How a run ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames_written: u64,
    pub cancelled: bool,
    pub limit_reached: bool,
}

/// Normalizes, binarizes and encodes frames into a container.
pub struct EncodeSession {
    normalizer: FrameNormalizer,
    monochromizer: Monochromizer,
    encoding: Encoding,
    frame_limit: Option<u64>,
    cancel: Option<Arc<AtomicBool>>,
    progress_interval: u64,
}

impl EncodeSession {
    pub fn builder() -> EncodeSessionBuilder {
        EncodeSessionBuilder::new()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn fit_policy(&self) -> FitPolicy {
        self.normalizer.policy()
    }

    pub fn polarity(&self) -> Polarity {
        self.monochromizer.polarity()
    }

    /// Normalize and binarize a single frame.
    pub fn process_frame(&mut self, frame: &RawFrame) -> VidResult<MonoFrame> {
        let normalized = self.normalizer.normalize(frame)?;
        Ok(self.monochromizer.monochromize(&normalized))
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Pull frames from `source` until it ends, the limit is hit, or the run is
    /// cancelled, appending each to a container written to `sink`.
    pub fn run<S, W>(&mut self, source: &mut S, sink: W, stats: &mut RunStats) -> Result<SessionSummary>
    where
        S: FrameSource + ?Sized,
        W: Write + Seek,
    {
        let input = source.input_size();
        info!(
            input_w = input.w,
            input_h = input.h,
            fit = ?self.normalizer.policy(),
            polarity = ?self.monochromizer.polarity(),
            encoding = %self.encoding,
            "encode session started"
        );

        if let Some(flag) = &self.cancel {
            source.set_cancel_flag(Arc::clone(flag));
        }
        let mut writer = ContainerWriter::new(sink, self.encoding)?;
        let mut summary = SessionSummary::default();

        loop {
            if self.cancelled() {
                info!(frames = summary.frames_written, "cancelled, finalizing container");
                summary.cancelled = true;
                break;
            }
            if self
                .frame_limit
                .is_some_and(|limit| summary.frames_written >= limit)
            {
                debug!(frames = summary.frames_written, "frame limit reached");
                summary.limit_reached = true;
                break;
            }

            let index = summary.frames_written;
            let Some(raw) = source
                .next_frame()
                .with_context(|| format!("failed to read frame {}", index))?
            else {
                // An interrupted decoder ends its stream early.
                summary.cancelled = self.cancelled();
                break;
            };

            let mono = self
                .process_frame(&raw)
                .map_err(|e| e.with_frame_index(index))?;
            writer.push(&mono, Some(&mut *stats))?;
            summary.frames_written += 1;

            if summary.frames_written % self.progress_interval == 0 {
                info!(
                    frames = summary.frames_written,
                    bytes = stats.encoded_bytes,
                    pts_ms = raw.pts_ms,
                    "encoding"
                );
            }
        }

        source.shutdown().context("failed to stop frame source")?;
        writer.finish()?;

        info!(
            frames = summary.frames_written,
            bytes = stats.encoded_bytes,
            "encode session finished"
        );
        Ok(summary)
    }
}

/// Fluent configuration for [`EncodeSession`].
#[derive(Clone, Debug, Default)]
pub struct EncodeSessionBuilder {
    fit: FitPolicy,
    polarity: Polarity,
    encoding: Encoding,
    frame_limit: Option<u64>,
    cancel: Option<Arc<AtomicBool>>,
    progress_interval: Option<u64>,
}

impl EncodeSessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fit(mut self, fit: FitPolicy) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Stop after `limit` frames.
    pub fn with_frame_limit(mut self, limit: Option<u64>) -> Self {
        self.frame_limit = limit;
        self
    }

    /// Stop at the next frame boundary once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_progress_interval(mut self, frames: u64) -> Self {
        self.progress_interval = Some(frames);
        self
    }

    pub fn build(self) -> EncodeSession {
        EncodeSession {
            normalizer: FrameNormalizer::new(self.fit, self.polarity.background_rgb()),
            monochromizer: Monochromizer::new(self.polarity),
            encoding: self.encoding,
            frame_limit: self.frame_limit,
            cancel: self.cancel,
            progress_interval: self
                .progress_interval
                .unwrap_or(DEFAULT_PROGRESS_INTERVAL)
                .max(1),
        }
    }
}
