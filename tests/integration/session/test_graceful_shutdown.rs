//! Integration tests for graceful shutdown functionality
//!
//! These tests verify that a cancelled EncodeSession still leaves a valid,
//! correctly counted container behind.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use lcd_video::capture::FrameSource;
use lcd_video::codec::RunStats;
use lcd_video::container::{read_all, Encoding};
use lcd_video::frame::RawFrame;
use lcd_video::session::EncodeSession;
use mono_scale::Size;

use crate::common::{split, ScriptedSource};

#[test]
fn test_cancel_mid_run_keeps_written_frames() {
    let cancel = Arc::new(AtomicBool::new(false));
    let mut source = ScriptedSource::repeat(split(320, 240), 10);
    source.cancel = Some((cancel.clone(), 3));
    let shutdowns = source.shutdowns.clone();

    let mut session = EncodeSession::builder().with_cancel_flag(cancel).build();
    let mut sink = Cursor::new(Vec::new());
    let summary = session
        .run(&mut source, &mut sink, &mut RunStats::new())
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.frames_written, 3);
    assert_eq!(source.pulled(), 3);
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    assert_eq!(&sink.get_ref()[2..6], &3u32.to_le_bytes());
    assert_eq!(read_all(sink.get_ref(), Encoding::Rle).unwrap().len(), 3);
}

/// Endless source that never runs dry on its own.
struct Endless {
    frames: u64,
}

impl FrameSource for Endless {
    fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        self.frames += 1;
        thread::sleep(Duration::from_millis(1));
        Ok(Some(RawFrame::filled(64, 32, [(self.frames % 256) as u8; 3])))
    }

    fn input_size(&self) -> Size {
        Size::new(64, 32)
    }
}

#[test]
fn test_cancel_from_another_thread_stops_endless_source() {
    let cancel = Arc::new(AtomicBool::new(false));
    let trigger = cancel.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        trigger.store(true, Ordering::Relaxed);
    });

    let mut session = EncodeSession::builder()
        .with_encoding(Encoding::Packed)
        .with_cancel_flag(cancel)
        .build();
    let mut source = Endless { frames: 0 };
    let mut sink = Cursor::new(Vec::new());
    let summary = session
        .run(&mut source, &mut sink, &mut RunStats::new())
        .unwrap();
    handle.join().unwrap();

    assert!(summary.cancelled);
    let frames = read_all(sink.get_ref(), Encoding::Packed).unwrap();
    assert_eq!(frames.len() as u64, summary.frames_written);
}

#[test]
fn test_limit_and_cancel_leave_same_layout() {
    let mut limited = EncodeSession::builder().with_frame_limit(Some(2)).build();
    let mut a = Cursor::new(Vec::new());
    limited
        .run(&mut ScriptedSource::repeat(split(128, 64), 5), &mut a, &mut RunStats::new())
        .unwrap();

    let cancel = Arc::new(AtomicBool::new(false));
    let mut source = ScriptedSource::repeat(split(128, 64), 5);
    source.cancel = Some((cancel.clone(), 2));
    let mut cancelled = EncodeSession::builder().with_cancel_flag(cancel).build();
    let mut b = Cursor::new(Vec::new());
    cancelled
        .run(&mut source, &mut b, &mut RunStats::new())
        .unwrap();

    assert_eq!(a.into_inner(), b.into_inner());
}
