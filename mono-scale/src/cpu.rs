// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize.
// RGB8 in → RGB8 out, nearest-neighbour, direct write into caller-provided dst buffer.

use fast_image_resize as fir;
use fir::images::{TypedCroppedImageMut, TypedImage, TypedImageRef};
use fir::pixels::U8x3;
use fir::{ResizeAlg, ResizeOptions, Resizer};

use crate::presets::ScalePlan;

#[derive(Debug)]
pub enum ScaleError {
    ZeroDimension { w: u32, h: u32 },
    SourceSizeMismatch { expected: usize, actual: usize },
    BufferTooSmall,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
    Crop(fir::CropBoxError),
}

impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }
impl From<fir::CropBoxError> for ScaleError { fn from(e: fir::CropBoxError) -> Self { Self::Crop(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::ZeroDimension { w, h } => write!(f, "Source has a zero dimension ({}x{})", w, h),
            ScaleError::SourceSizeMismatch { expected, actual } => {
                write!(f, "Source buffer holds {} bytes, expected {}", actual, expected)
            }
            ScaleError::BufferTooSmall => write!(f, "Output buffer too small"),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
            ScaleError::Crop(e) => write!(f, "Crop error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            ScaleError::Crop(e) => Some(e),
            _ => None,
        }
    }
}

/// Main scaling entry point.
/// `src_rgb` must be tightly packed `plan.input.w * plan.input.h * 3` bytes.
/// `dst` must hold at least `plan.out.w * plan.out.h * 3` bytes; letterbox borders are
/// filled with `border_rgb`.
pub fn scale_rgb_cpu(
    resizer: &mut Resizer,
    src_rgb: &[u8],
    plan: &ScalePlan,
    dst: &mut [u8],
    border_rgb: [u8; 3],
) -> Result<(), ScaleError> {
    let src_len = plan.input.area() * 3;
    if src_rgb.len() != src_len {
        return Err(ScaleError::SourceSizeMismatch { expected: src_len, actual: src_rgb.len() });
    }
    let dst_len = plan.out.area() * 3;
    if dst.len() < dst_len {
        return Err(ScaleError::BufferTooSmall);
    }
    let dst = &mut dst[..dst_len];

    let src_view = TypedImageRef::<U8x3>::from_buffer(plan.input.w, plan.input.h, src_rgb)?;

    // Borders must be painted before the canvas is borrowed by the image view.
    if plan.dst_roi.is_some() {
        fill_rgb(dst, border_rgb);
    }

    let mut opts = ResizeOptions::new().resize_alg(ResizeAlg::Nearest);
    if let Some(crop) = plan.src_crop {
        opts = opts.crop(crop.left, crop.top, crop.width, crop.height);
    }

    let mut dst_image = TypedImage::<U8x3>::from_buffer(plan.out.w, plan.out.h, dst)?;
    match plan.dst_roi {
        Some((x, y, w, h)) => {
            let mut roi = TypedCroppedImageMut::from_ref(&mut dst_image, x, y, w, h)?;
            resizer.resize_typed::<U8x3>(&src_view, &mut roi, &opts)?;
        }
        None => resizer.resize_typed::<U8x3>(&src_view, &mut dst_image, &opts)?,
    }

    Ok(())
}

#[inline]
fn fill_rgb(dst: &mut [u8], bg: [u8; 3]) {
    for px in dst.chunks_exact_mut(3) {
        px.copy_from_slice(&bg);
    }
}
