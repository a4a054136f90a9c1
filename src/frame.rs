//! # Frame Types
//!
//! The three frame representations that flow through the pipeline:
//!
//! | Type | Layout | Produced by |
//! |------|--------|-------------|
//! | [`RawFrame`] | W×H RGB8, tightly packed | a [`FrameSource`](crate::capture::FrameSource) |
//! | [`NormalizedFrame`] | 128×64 RGB8 | [`FrameNormalizer`](crate::processing::FrameNormalizer) |
//! | [`MonoFrame`] | 128×64 binary plane | [`Monochromizer`](crate::processing::Monochromizer) |
//!
//! Frames are never mutated after construction; every stage produces a new
//! value and hands it to the next.

use image::{GrayImage, Luma, RgbImage};

/// Display width in pixels.
pub const DISPLAY_WIDTH: u32 = 128;
/// Display height in pixels.
pub const DISPLAY_HEIGHT: u32 = 64;
/// Pixels on the display, which is also the length of every decoded frame.
pub const PIXEL_COUNT: usize = (DISPLAY_WIDTH * DISPLAY_HEIGHT) as usize;

/// A decoded source frame in RGB8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Pixel data, `width * height * 3` bytes, row-major RGB.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Presentation time in milliseconds from the start of the source, when known.
    pub pts_ms: Option<u64>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            data,
            width,
            height,
            pts_ms: None,
        }
    }

    /// A frame where every pixel has the same color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb.repeat(width as usize * height as usize);
        Self::new(width, height, data)
    }

    /// Build a frame from a per-pixel color function.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    pub fn with_pts_ms(mut self, pts_ms: u64) -> Self {
        self.pts_ms = Some(pts_ms);
        self
    }

    /// Byte length implied by the declared dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl From<RgbImage> for RawFrame {
    fn from(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }
}

/// A color frame at exactly display resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFrame {
    data: Vec<u8>,
}

impl NormalizedFrame {
    pub const BYTES: usize = PIXEL_COUNT * 3;

    /// Callers inside the crate guarantee `data.len() == BYTES`.
    pub(crate) fn from_vec(data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), Self::BYTES);
        Self { data }
    }

    pub fn width(&self) -> u32 {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> u32 {
        DISPLAY_HEIGHT
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y * DISPLAY_WIDTH + x) as usize * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// A 128×64 binary plane. `true` is foreground (logical 1, lit).
#[derive(Clone, PartialEq, Eq)]
pub struct MonoFrame {
    bits: Vec<bool>,
}

impl MonoFrame {
    /// Every pixel set to `value`.
    pub fn filled(value: bool) -> Self {
        Self {
            bits: vec![value; PIXEL_COUNT],
        }
    }

    /// Build a plane from a per-pixel function of `(x, y)`.
    pub fn from_fn(mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(PIXEL_COUNT);
        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                bits.push(f(x, y));
            }
        }
        Self { bits }
    }

    /// Callers inside the crate guarantee `bits.len() == PIXEL_COUNT`.
    pub(crate) fn from_vec(bits: Vec<bool>) -> Self {
        debug_assert_eq!(bits.len(), PIXEL_COUNT);
        Self { bits }
    }

    /// Wrap a row-major pixel vector. Returns `None` unless it holds exactly
    /// [`PIXEL_COUNT`] pixels.
    pub fn from_pixels(bits: Vec<bool>) -> Option<Self> {
        (bits.len() == PIXEL_COUNT).then_some(Self { bits })
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[(y * DISPLAY_WIDTH + x) as usize]
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> &[bool] {
        &self.bits
    }

    pub fn row(&self, y: u32) -> &[bool] {
        let start = (y * DISPLAY_WIDTH) as usize;
        &self.bits[start..start + DISPLAY_WIDTH as usize]
    }

    pub fn foreground_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Render for viewing: foreground as black ink on white, each pixel blown up
    /// to a `scale`×`scale` block.
    pub fn to_gray_image(&self, scale: u32) -> GrayImage {
        let scale = scale.max(1);
        GrayImage::from_fn(DISPLAY_WIDTH * scale, DISPLAY_HEIGHT * scale, |x, y| {
            if self.get(x / scale, y / scale) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }
}

impl std::fmt::Debug for MonoFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonoFrame")
            .field("foreground", &self.foreground_count())
            .finish()
    }
}
