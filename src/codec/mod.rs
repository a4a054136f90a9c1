//! # Frame Codecs
//!
//! Two byte encodings of a [`MonoFrame`](crate::frame::MonoFrame):
//!
//! - [`packed`]: fixed 1024-byte, row-major, MSB-first bitmap
//! - [`rle`]: variable-length run bytes, one color bit + 7-bit run length
//!
//! [`stats::RunStats`] is a caller-owned accumulator that encoders can record
//! into across frames.

pub mod packed;
pub mod rle;
pub mod stats;

pub use packed::{PackedFrame, PACKED_LEN};
pub use rle::{decode_runs, encode_runs, RleFrame, MAX_RUN};
pub use stats::RunStats;
