// SPDX-License-Identifier: MIT
//! # mono-scale: Exact-Size Frame Geometry for Fixed-Resolution Displays
//!
//! This crate maps arbitrary source frames onto an exact target canvas (for
//! example a 128×64 LCD) using one of two deterministic fit policies.
//!
//! ## Key Components
//!
//! - [`presets`]: Fit policies and plan computation (crop-to-fill, letterbox)
//! - [`cpu`]: Nearest-neighbour RGB scaling on top of `fast_image_resize`
//!
//! Nearest-neighbour interpolation is used throughout: it preserves hard edges,
//! which matters once the result is thresholded to one bit per pixel.
//!
//! ## Usage Example
//!
//! ```rust
//! use mono_scale::cpu::scale_rgb_cpu;
//! use mono_scale::presets::{build_plan, FitPolicy, Size};
//!
//! let input = Size::new(320, 240);
//! let plan = build_plan(input, Size::new(128, 64), FitPolicy::Crop)?;
//!
//! let src = vec![0u8; input.area() * 3];
//! let mut dst = vec![0u8; 128 * 64 * 3];
//! scale_rgb_cpu(&mut fast_image_resize::Resizer::new(), &src, &plan, &mut dst, [0, 0, 0])?;
//! # Ok::<(), mono_scale::cpu::ScaleError>(())
//! ```

pub mod cpu;
pub mod presets;

pub use cpu::ScaleError;
pub use presets::{build_plan, CropBox, FitPolicy, ScalePlan, Size};
