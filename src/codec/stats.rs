//! Run-length statistics accumulated across frames.
//!
//! The accumulator is a plain value owned by the caller and passed by `&mut`
//! into each encode step. Counters only grow.

use std::fmt;

use super::packed::PACKED_LEN;
use super::rle::MAX_RUN;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunStats {
    /// Frames recorded
    pub frames: u64,
    /// Encoded payload bytes, excluding container framing
    pub encoded_bytes: u64,
    /// Foreground pixels seen
    pub foreground_pixels: u64,
    /// Runs emitted by the RLE encoder
    pub runs: u64,
    /// `histogram[n]` counts runs of length `n`; index 0 stays zero.
    pub histogram: [u64; MAX_RUN as usize + 1],
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            frames: 0,
            encoded_bytes: 0,
            foreground_pixels: 0,
            runs: 0,
            histogram: [0; MAX_RUN as usize + 1],
        }
    }
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_run(&mut self, len: u8) {
        self.runs += 1;
        self.histogram[usize::from(len.min(MAX_RUN))] += 1;
    }

    pub fn record_frame(&mut self, encoded_len: usize, foreground: usize) {
        self.frames += 1;
        self.encoded_bytes += encoded_len as u64;
        self.foreground_pixels += foreground as u64;
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &RunStats) {
        self.frames += other.frames;
        self.encoded_bytes += other.encoded_bytes;
        self.foreground_pixels += other.foreground_pixels;
        self.runs += other.runs;
        for (a, b) in self.histogram.iter_mut().zip(other.histogram.iter()) {
            *a += b;
        }
    }

    pub fn mean_run_length(&self) -> Option<f64> {
        let total: u64 = self
            .histogram
            .iter()
            .enumerate()
            .map(|(len, &n)| len as u64 * n)
            .sum();
        (self.runs > 0).then(|| total as f64 / self.runs as f64)
    }

    /// Encoded size relative to the packed representation (1.0 = same size).
    pub fn ratio_to_packed(&self) -> Option<f64> {
        (self.frames > 0)
            .then(|| self.encoded_bytes as f64 / (self.frames as f64 * PACKED_LEN as f64))
    }

    /// Runs that hit the length cap and had to be split.
    pub fn capped_runs(&self) -> u64 {
        self.histogram[MAX_RUN as usize]
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} frames, {} bytes", self.frames, self.encoded_bytes)?;
        if let Some(ratio) = self.ratio_to_packed() {
            write!(f, " ({:.1}% of packed)", ratio * 100.0)?;
        }
        if let Some(mean) = self.mean_run_length() {
            write!(
                f,
                ", {} runs, mean length {:.1}, {} capped",
                self.runs,
                mean,
                self.capped_runs()
            )?;
        }
        Ok(())
    }
}
