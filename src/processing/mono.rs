//! # Monochromization
//!
//! Converts a [`NormalizedFrame`] to a [`MonoFrame`] in two steps:
//!
//! 1. **Luma**: BT.601 weights in 14-bit fixed point,
//!    `(4899·R + 9617·G + 1868·B + 8192) >> 14`.
//! 2. **Threshold**: `luma >= 127` is light, everything below is dark.
//!
//! ## Polarity
//!
//! Which of the two classes becomes foreground (logical 1, lit) is fixed by
//! [`Polarity`]. The default, [`Polarity::DarkIsForeground`], treats dark
//! source pixels as ink: a black silhouette on a white background lights the
//! silhouette on the display. Both encoders treat foreground as bit value 1.

use crate::frame::{MonoFrame, NormalizedFrame};

/// Luma values at or above this are light.
pub const THRESHOLD: u8 = 127;

/// Mapping between the light/dark split and the foreground bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Polarity {
    /// Dark source pixels become foreground (lit).
    #[default]
    #[value(name = "dark")]
    DarkIsForeground,
    /// Light source pixels become foreground (lit).
    #[value(name = "light")]
    LightIsForeground,
}

impl Polarity {
    /// Classify a luma sample.
    #[inline]
    pub fn is_foreground(self, luma: u8) -> bool {
        let light = luma >= THRESHOLD;
        match self {
            Polarity::DarkIsForeground => !light,
            Polarity::LightIsForeground => light,
        }
    }

    /// A color that always binarizes to background under this polarity.
    /// Letterbox borders are painted with it.
    pub fn background_rgb(self) -> [u8; 3] {
        match self {
            Polarity::DarkIsForeground => [255, 255, 255],
            Polarity::LightIsForeground => [0, 0, 0],
        }
    }
}

/// BT.601 luma of an RGB8 sample.
#[inline]
pub fn luma([r, g, b]: [u8; 3]) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    ((R * u32::from(r) + G * u32::from(g) + B * u32::from(b) + (1 << 13)) >> 14) as u8
}

/// Grayscale + fixed-threshold binarizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Monochromizer {
    polarity: Polarity,
}

impl Monochromizer {
    pub fn new(polarity: Polarity) -> Self {
        Self { polarity }
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn monochromize(&self, frame: &NormalizedFrame) -> MonoFrame {
        let bits: Vec<bool> = frame
            .pixels()
            .map(|px| self.polarity.is_foreground(luma(px)))
            .collect();
        MonoFrame::from_vec(bits)
    }
}
