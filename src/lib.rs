//! # LCD Video
//!
//! Converts arbitrary video into a compact stream for a fixed 128×64,
//! 1-bit-per-pixel display.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `capture`: frame sources (ffmpeg sampler, still images, in-memory)
//! - `processing`: normalization to 128×64 and binarization
//! - `codec`: packed bitmap and run-length byte formats
//! - `container`: header plus ordered frame entries
//! - `config`: configuration management and validation
//! - `session`: high-level encode orchestration
//!
//! ## Example
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use lcd_video::capture::MemorySource;
//! use lcd_video::codec::RunStats;
//! use lcd_video::container::{read_all, Encoding};
//! use lcd_video::frame::{MonoFrame, RawFrame};
//! use lcd_video::session::EncodeSession;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut source = MemorySource::new([RawFrame::filled(256, 128, [0, 0, 0])]);
//! let mut session = EncodeSession::builder().with_encoding(Encoding::Rle).build();
//! let mut sink = Cursor::new(Vec::new());
//! session.run(&mut source, &mut sink, &mut RunStats::new())?;
//!
//! let frames = read_all(sink.get_ref(), Encoding::Rle)?;
//! assert_eq!(frames, vec![MonoFrame::filled(true)]);
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod codec;
pub mod config;
pub mod container;
pub mod error;
pub mod frame;
pub mod processing;
pub mod session;

/// Re-export error types for convenience
pub use error::{ErrorContext, VidError, VidResult};

pub use codec::{PackedFrame, RleFrame, RunStats};
pub use container::{ContainerReader, ContainerWriter, EncodedFrame, Encoding};
pub use frame::{MonoFrame, NormalizedFrame, RawFrame, DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use processing::{FitPolicy, FrameNormalizer, Monochromizer, Polarity};
pub use session::{EncodeSession, EncodeSessionBuilder, SessionSummary};
