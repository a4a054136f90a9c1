//! Common test utilities and helpers for the lcd_video tests
//!
//! Frame generators and scripted frame sources shared by the unit and
//! integration suites.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, bail};
use lcd_video::capture::FrameSource;
use lcd_video::frame::{MonoFrame, RawFrame};
use mono_scale::Size;
use rand::Rng;

/// Random binary plane where each pixel is foreground with probability `density`.
pub fn random_mono(rng: &mut impl Rng, density: f64) -> MonoFrame {
    MonoFrame::from_fn(|_, _| rng.gen_bool(density))
}

/// Random plane made of horizontal stripes of random length, which gives
/// long runs that cross row boundaries.
pub fn striped_mono(rng: &mut impl Rng) -> MonoFrame {
    let mut value = rng.gen_bool(0.5);
    let mut left = 0u32;
    MonoFrame::from_fn(|_, _| {
        if left == 0 {
            value = !value;
            left = rng.gen_range(1..400);
        }
        left -= 1;
        value
    })
}

/// Horizontal gray ramp: the red, green and blue of column `x` are all `x`.
pub fn ramp(width: u32, height: u32) -> RawFrame {
    RawFrame::from_fn(width, height, |x, _| [x.min(255) as u8; 3])
}

/// A frame whose left half is black and right half white.
pub fn split(width: u32, height: u32) -> RawFrame {
    RawFrame::from_fn(width, height, |x, _| {
        if x < width / 2 { [0; 3] } else { [255; 3] }
    })
}

/// Scripted source used to observe how a session drives it.
pub struct ScriptedSource {
    frames: Vec<RawFrame>,
    next: usize,
    /// Return an error instead of this frame index.
    pub fail_at: Option<usize>,
    /// Raise this flag right after handing out frame `cancel_after - 1`.
    pub cancel: Option<(Arc<AtomicBool>, usize)>,
    pub shutdowns: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<RawFrame>) -> Self {
        Self {
            frames,
            next: 0,
            fail_at: None,
            cancel: None,
            shutdowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn repeat(frame: RawFrame, count: usize) -> Self {
        Self::new(vec![frame; count])
    }

    pub fn pulled(&self) -> usize {
        self.next
    }
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        if self.fail_at == Some(self.next) {
            bail!("decoder failed at frame {}", self.next);
        }
        let Some(frame) = self.frames.get(self.next).cloned() else {
            return Ok(None);
        };
        self.next += 1;
        if let Some((flag, after)) = &self.cancel {
            if self.next == *after {
                flag.store(true, Ordering::Relaxed);
            }
        }
        Ok(Some(frame.with_pts_ms(self.next as u64 * 83)))
    }

    fn input_size(&self) -> Size {
        self.frames
            .first()
            .map(|f| Size::new(f.width, f.height))
            .unwrap_or(Size::new(0, 0))
    }

    fn shutdown(&mut self) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
