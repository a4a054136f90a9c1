//! # Processing Module
//!
//! This module contains the frame processing stages: geometric normalization to
//! display resolution and binarization.

pub mod mono;
pub mod normalize;

// Re-export commonly used types for convenience
pub use mono::{luma, Monochromizer, Polarity, THRESHOLD};
pub use normalize::FrameNormalizer;
pub use mono_scale::FitPolicy;
