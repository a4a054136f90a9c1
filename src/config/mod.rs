//! # Configuration Module
//!
//! This module provides the configuration structures for encode and single-frame jobs.

pub mod config;

pub use config::{EncodeConfig, FrameConfig, DEFAULT_FPS, MAX_FPS};
