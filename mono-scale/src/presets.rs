// SPDX-License-Identifier: MIT
//! # Fit Policies and Plan Computation
//!
//! This module computes how an arbitrary source frame is mapped onto an exact
//! target canvas. Two policies are supported and they are mutually exclusive:
//!
//! 1. **Crop-to-fill** ([`FitPolicy::Crop`]): scale to cover the canvas, then
//!    center-crop the axis that overshoots. No borders.
//! 2. **Letterbox** ([`FitPolicy::Letterbox`]): scale to fit inside the canvas,
//!    then pad the short axis. The whole source stays visible.
//!
//! ## Rounding
//!
//! The resized size on each axis is `round(side * scale)`. The binding axis is
//! clamped to the target so float error can never push the plan off the canvas:
//! crop plans are at least the target on both axes, letterbox plans at most the
//! target and at least one pixel.
//!
//! Crop offsets and pad offsets use the same floor split: the lead side gets
//! `(overshoot) / 2`, the trail side gets the remainder.
//!
//! ## Source-space cropping
//!
//! Crop plans do not describe an intermediate resized image. Instead the
//! visible window is mapped back into source coordinates ([`CropBox`]) and the
//! resizer samples only that window, so tall or wide sources never allocate
//! their full resized size.

use crate::cpu::ScaleError;

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Number of pixels covered by this size.
    pub fn area(self) -> usize {
        self.w as usize * self.h as usize
    }
}

/// How a source frame is fitted onto the exact target canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FitPolicy {
    /// Scale to cover the canvas and center-crop the overflow.
    #[value(name = "crop")]
    Crop,
    /// Scale to fit inside the canvas and pad the short axis.
    #[default]
    #[value(name = "letterbox")]
    Letterbox,
}

/// Window of the source image that is sampled, in source pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Complete plan for mapping one source size onto the target canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalePlan {
    /// Original input dimensions
    pub input: Size,
    /// Policy used for planning
    pub policy: FitPolicy,
    /// Uniform scale factor applied to both axes
    pub scale: f64,
    /// Size of the source after scaling, before cropping or padding
    pub resized: Size,
    /// Final canvas dimensions (always the requested target)
    pub out: Size,
    /// Crop plans: the source window that lands on the canvas.
    pub src_crop: Option<CropBox>,
    /// Letterbox plans: sub-rectangle `(x, y, w, h)` of the canvas that receives
    /// the scaled content. Everything outside it is border.
    pub dst_roi: Option<(u32, u32, u32, u32)>,
}

impl ScalePlan {
    /// Pixels discarded from the lead side `(left, top)` of the resized image.
    /// Zero for letterbox plans.
    pub fn crop_offset(&self) -> (u32, u32) {
        match self.policy {
            FitPolicy::Crop => (
                lead_split(self.resized.w, self.out.w),
                lead_split(self.resized.h, self.out.h),
            ),
            FitPolicy::Letterbox => (0, 0),
        }
    }

    /// Border widths `(left, top, right, bottom)` on the canvas.
    /// All zero for crop plans.
    pub fn padding(&self) -> (u32, u32, u32, u32) {
        match self.dst_roi {
            Some((x, y, w, h)) => (x, y, self.out.w - x - w, self.out.h - y - h),
            None => (0, 0, 0, 0),
        }
    }
}

/// Compute the plan that maps `input` onto an exact `target` canvas.
///
/// # Errors
/// [`ScaleError::ZeroDimension`] if any side of `input` or `target` is zero.
pub fn build_plan(input: Size, target: Size, policy: FitPolicy) -> Result<ScalePlan, ScaleError> {
    if input.w == 0 || input.h == 0 || target.w == 0 || target.h == 0 {
        return Err(ScaleError::ZeroDimension { w: input.w, h: input.h });
    }

    let sx = f64::from(target.w) / f64::from(input.w);
    let sy = f64::from(target.h) / f64::from(input.h);

    let plan = match policy {
        FitPolicy::Crop => {
            let scale = sx.max(sy);
            let resized = Size {
                w: scaled_side(input.w, scale).max(target.w),
                h: scaled_side(input.h, scale).max(target.h),
            };
            let off_x = lead_split(resized.w, target.w);
            let off_y = lead_split(resized.h, target.h);
            ScalePlan {
                input,
                policy,
                scale,
                resized,
                out: target,
                src_crop: Some(source_window(input, resized, target, off_x, off_y)),
                dst_roi: None,
            }
        }
        FitPolicy::Letterbox => {
            let scale = sx.min(sy);
            let resized = Size {
                w: scaled_side(input.w, scale).clamp(1, target.w),
                h: scaled_side(input.h, scale).clamp(1, target.h),
            };
            let x = lead_split(target.w, resized.w);
            let y = lead_split(target.h, resized.h);
            ScalePlan {
                input,
                policy,
                scale,
                resized,
                out: target,
                src_crop: None,
                dst_roi: Some((x, y, resized.w, resized.h)),
            }
        }
    };
    Ok(plan)
}

/// `round(side * scale)`, saturating into `u32`.
fn scaled_side(side: u32, scale: f64) -> u32 {
    let v = (f64::from(side) * scale).round();
    if v >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        v as u32
    }
}

/// Lead-side share of the difference between `larger` and `smaller`.
fn lead_split(larger: u32, smaller: u32) -> u32 {
    larger.saturating_sub(smaller) / 2
}

/// Map the visible canvas window of the resized image back into source space.
fn source_window(input: Size, resized: Size, target: Size, off_x: u32, off_y: u32) -> CropBox {
    // Per-axis factors keep the window inside the source even when rounding
    // made the resized size differ from side * scale.
    let fx = f64::from(input.w) / f64::from(resized.w);
    let fy = f64::from(input.h) / f64::from(resized.h);
    let left = f64::from(off_x) * fx;
    let top = f64::from(off_y) * fy;
    CropBox {
        left,
        top,
        width: (f64::from(target.w) * fx).min(f64::from(input.w) - left),
        height: (f64::from(target.h) * fy).min(f64::from(input.h) - top),
    }
}
