//! A still image as a one-frame source.

use std::path::Path;

use anyhow::{Context, Result};
use mono_scale::Size;

use super::FrameSource;
use crate::frame::RawFrame;

pub struct StillSource {
    frame: Option<RawFrame>,
    size: Size,
}

impl StillSource {
    /// Decode any format the `image` crate understands.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("failed to decode image {}", path.display()))?
            .to_rgb8();
        Ok(Self::from_frame(RawFrame::from(img)))
    }

    pub fn from_frame(frame: RawFrame) -> Self {
        let size = Size::new(frame.width, frame.height);
        Self {
            frame: Some(frame.with_pts_ms(0)),
            size,
        }
    }

    /// Whether `path` looks like a still image rather than a video.
    pub fn is_image_path(path: &Path) -> bool {
        image::ImageFormat::from_path(path).is_ok()
    }
}

impl FrameSource for StillSource {
    fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        Ok(self.frame.take())
    }

    fn input_size(&self) -> Size {
        self.size
    }
}
