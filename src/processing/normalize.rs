//! # Frame Normalization
//!
//! Maps a [`RawFrame`] of any size onto the 128×64 display canvas using a single
//! [`FitPolicy`] chosen at construction time.
//!
//! The normalizer owns its resizer and remembers the last plan, so a stream of
//! equally sized frames (the usual case for video) computes its geometry once.

use fast_image_resize::Resizer;
use mono_scale::cpu::scale_rgb_cpu;
use mono_scale::presets::{build_plan, FitPolicy, ScalePlan, Size};
use tracing::debug;

use crate::error::{VidError, VidResult};
use crate::frame::{NormalizedFrame, RawFrame, DISPLAY_HEIGHT, DISPLAY_WIDTH};

const TARGET: Size = Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);

/// Crop-to-fill or letterbox normalizer producing exact display-size frames.
pub struct FrameNormalizer {
    policy: FitPolicy,
    border_rgb: [u8; 3],
    resizer: Resizer,
    plan: Option<ScalePlan>,
}

impl FrameNormalizer {
    /// `border_rgb` is only used by [`FitPolicy::Letterbox`]; pick a color that
    /// binarizes to background (see [`Polarity::background_rgb`]).
    ///
    /// [`Polarity::background_rgb`]: crate::processing::Polarity::background_rgb
    pub fn new(policy: FitPolicy, border_rgb: [u8; 3]) -> Self {
        Self {
            policy,
            border_rgb,
            resizer: Resizer::new(),
            plan: None,
        }
    }

    pub fn policy(&self) -> FitPolicy {
        self.policy
    }

    /// Plan for a source of the given size, reusing the cached one when possible.
    pub fn plan_for(&mut self, width: u32, height: u32) -> VidResult<ScalePlan> {
        let input = Size::new(width, height);
        if let Some(plan) = self.plan.filter(|p| p.input == input) {
            return Ok(plan);
        }
        let plan = build_plan(input, TARGET, self.policy)?;
        debug!(
            width,
            height,
            policy = ?self.policy,
            scale = plan.scale,
            resized_w = plan.resized.w,
            resized_h = plan.resized.h,
            "computed normalization plan"
        );
        self.plan = Some(plan);
        Ok(plan)
    }

    /// Normalize one frame to exactly 128×64.
    ///
    /// # Errors
    /// [`VidError::Geometry`] if the frame has a zero dimension or its buffer
    /// length disagrees with `width * height * 3`.
    pub fn normalize(&mut self, frame: &RawFrame) -> VidResult<NormalizedFrame> {
        if frame.width == 0 || frame.height == 0 {
            return Err(VidError::geometry(
                frame.width,
                frame.height,
                "width and height must be non-zero",
            ));
        }
        if frame.data.len() != frame.expected_len() {
            return Err(VidError::geometry(
                frame.width,
                frame.height,
                format!(
                    "pixel buffer holds {} bytes, expected {}",
                    frame.data.len(),
                    frame.expected_len()
                ),
            ));
        }

        let plan = self.plan_for(frame.width, frame.height)?;
        let mut out = vec![0u8; NormalizedFrame::BYTES];
        scale_rgb_cpu(&mut self.resizer, &frame.data, &plan, &mut out, self.border_rgb)
            .map_err(|e| VidError::from(e).with_operation("normalize"))?;
        Ok(NormalizedFrame::from_vec(out))
    }
}
