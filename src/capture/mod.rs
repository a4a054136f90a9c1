// # Capture Module
//
// Frame sources that feed the encode pipeline.

pub mod ffmpeg;
pub mod still;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Result;
use mono_scale::Size;

use crate::frame::RawFrame;

pub use ffmpeg::FfmpegSampler;
pub use still::StillSource;

/// Pull-based source of decoded frames.
///
/// Returning `Ok(None)` means the source is exhausted. Sources are free to
/// change frame dimensions between calls.
pub trait FrameSource {
    /// Decode the next frame.
    fn next_frame(&mut self) -> Result<Option<RawFrame>>;

    /// Native resolution of the source.
    fn input_size(&self) -> Size;

    /// Release underlying resources early. Called once when a session stops.
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    /// Hand the source the session's cancel flag before the first read.
    ///
    /// A source backed by a subprocess can see its stream cut short by the
    /// same interrupt that raised the flag; it checks the flag to report that
    /// as a clean end instead of a failure.
    fn set_cancel_flag(&mut self, _flag: Arc<AtomicBool>) {}

    /// Iterate over the remaining frames.
    fn frames(&mut self) -> Frames<'_, Self>
    where
        Self: Sized,
    {
        Frames { source: self }
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        (**self).next_frame()
    }

    fn input_size(&self) -> Size {
        (**self).input_size()
    }

    fn shutdown(&mut self) -> Result<()> {
        (**self).shutdown()
    }

    fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        (**self).set_cancel_flag(flag)
    }
}

/// Iterator adapter returned by [`FrameSource::frames`].
pub struct Frames<'a, S> {
    source: &'a mut S,
}

impl<S: FrameSource> Iterator for Frames<'_, S> {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_frame().transpose()
    }
}

/// Frames held in memory, yielded in insertion order.
#[derive(Debug)]
pub struct MemorySource {
    frames: VecDeque<RawFrame>,
    size: Size,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = RawFrame>) -> Self {
        let frames: VecDeque<RawFrame> = frames.into_iter().collect();
        let size = frames
            .front()
            .map(|f| Size::new(f.width, f.height))
            .unwrap_or(Size::new(0, 0));
        Self { frames, size }
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        let frame = self.frames.pop_front();
        if let Some(next) = self.frames.front() {
            self.size = Size::new(next.width, next.height);
        }
        Ok(frame)
    }

    fn input_size(&self) -> Size {
        self.size
    }

    fn shutdown(&mut self) -> Result<()> {
        self.frames.clear();
        Ok(())
    }
}
