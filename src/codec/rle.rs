//! # Run-Length Encoding
//!
//! Each output byte is one run: `(color_bit << 7) | length`, where `color_bit`
//! is 1 for foreground and `length` is in `1..=127`.
//!
//! The plane is scanned row-major as one flat sequence of 8192 pixels, so a
//! run may continue from the end of one row into the start of the next. Runs
//! longer than 127 are split into consecutive bytes of the same color.
//!
//! ```text
//!   all-foreground frame
//!   ┌──────┬──────┬─────┬──────┬──────┐
//!   │ 0xFF │ 0xFF │ ... │ 0xFF │ 0xC0 │   64 × 127 + 64 = 8192
//!   └──────┴──────┴─────┴──────┴──────┘
//! ```

use crate::error::{VidError, VidResult};
use crate::frame::{MonoFrame, PIXEL_COUNT};

use super::stats::RunStats;

/// Longest run a single byte can carry.
pub const MAX_RUN: u8 = 0x7F;

const COLOR_BIT: u8 = 0x80;

/// Run-length encode any pixel sequence.
///
/// # Errors
/// [`VidError::Encoding`] if `pixels` is empty.
pub fn encode_runs<I>(pixels: I, mut stats: Option<&mut RunStats>) -> VidResult<Vec<u8>>
where
    I: IntoIterator<Item = bool>,
{
    let mut pixels = pixels.into_iter();
    let mut current = pixels
        .next()
        .ok_or_else(|| VidError::encoding("rle_encode", "frame has no pixels"))?;
    let mut count: u8 = 1;
    let mut out = Vec::new();

    let mut flush = |value: bool, count: u8, out: &mut Vec<u8>| {
        let color = if value { COLOR_BIT } else { 0 };
        out.push(color | count);
        if let Some(stats) = stats.as_deref_mut() {
            stats.record_run(count);
        }
    };

    for px in pixels {
        if px != current || count == MAX_RUN {
            flush(current, count, &mut out);
            current = px;
            count = 0;
        }
        count += 1;
    }
    flush(current, count, &mut out);

    Ok(out)
}

/// Expand run bytes back into a frame.
///
/// # Errors
/// [`VidError::Format`] if a run has length zero or the runs do not add up to
/// exactly [`PIXEL_COUNT`] pixels.
pub fn decode_runs(runs: &[u8]) -> VidResult<MonoFrame> {
    let mut bits = Vec::with_capacity(PIXEL_COUNT);
    for (i, &byte) in runs.iter().enumerate() {
        let len = usize::from(byte & MAX_RUN);
        if len == 0 {
            return Err(VidError::format(
                "rle_decode",
                format!("run {} has zero length", i),
            ));
        }
        if bits.len() + len > PIXEL_COUNT {
            return Err(VidError::format(
                "rle_decode",
                format!(
                    "run {} overflows the frame ({} + {} > {} pixels)",
                    i,
                    bits.len(),
                    len,
                    PIXEL_COUNT
                ),
            ));
        }
        bits.resize(bits.len() + len, byte & COLOR_BIT != 0);
    }
    if bits.len() != PIXEL_COUNT {
        return Err(VidError::format(
            "rle_decode",
            format!(
                "stream ended after {} of {} pixels",
                bits.len(),
                PIXEL_COUNT
            ),
        ));
    }
    Ok(MonoFrame::from_vec(bits))
}

/// An RLE-encoded frame: a sequence of run bytes covering exactly 8192 pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct RleFrame {
    runs: Vec<u8>,
}

impl RleFrame {
    pub fn encode(frame: &MonoFrame) -> VidResult<Self> {
        let runs = encode_runs(frame.pixels().iter().copied(), None)?;
        Ok(Self { runs })
    }

    /// Encode and record every emitted run into `stats`.
    pub fn encode_with_stats(frame: &MonoFrame, stats: &mut RunStats) -> VidResult<Self> {
        let runs = encode_runs(frame.pixels().iter().copied(), Some(stats))?;
        Ok(Self { runs })
    }

    /// Validate and wrap run bytes read from storage.
    pub fn from_bytes(runs: Vec<u8>) -> VidResult<Self> {
        decode_runs(&runs)?;
        Ok(Self { runs })
    }

    pub fn decode(&self) -> VidResult<MonoFrame> {
        decode_runs(&self.runs)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.runs
    }

    /// Number of run bytes.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// `(is_foreground, length)` for each run.
    pub fn runs(&self) -> impl Iterator<Item = (bool, u8)> + '_ {
        self.runs
            .iter()
            .map(|&b| (b & COLOR_BIT != 0, b & MAX_RUN))
    }
}

impl std::fmt::Debug for RleFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RleFrame({} runs)", self.runs.len())
    }
}
