//! End-to-end encode runs over scripted sources

use std::io::{BufWriter, Cursor};
use std::sync::atomic::Ordering;

use lcd_video::capture::{FrameSource, MemorySource, StillSource};
use lcd_video::codec::RunStats;
use lcd_video::config::EncodeConfig;
use lcd_video::container::{read_all, ContainerReader, Encoding};
use lcd_video::frame::{MonoFrame, RawFrame};
use lcd_video::processing::{FitPolicy, Polarity};
use lcd_video::session::EncodeSession;
use lcd_video::VidError;

use crate::common::{ramp, split, ScriptedSource};

fn run(session: &mut EncodeSession, source: &mut impl FrameSource) -> (Vec<u8>, RunStats) {
    let mut sink = Cursor::new(Vec::new());
    let mut stats = RunStats::new();
    session.run(source, &mut sink, &mut stats).unwrap();
    (sink.into_inner(), stats)
}

#[test]
fn test_mixed_source_sizes_encode_to_display_frames() {
    for encoding in [Encoding::Packed, Encoding::Rle] {
        let mut source = MemorySource::new([
            split(1920, 1080),
            split(64, 64),
            ramp(300, 20),
            RawFrame::filled(1, 1, [0; 3]),
        ]);
        let mut session = EncodeSession::builder().with_encoding(encoding).build();
        let (data, stats) = run(&mut session, &mut source);

        let reader = ContainerReader::new(&data, encoding).unwrap();
        assert_eq!(reader.header().frame_count, 4);
        let frames: Vec<MonoFrame> = reader.map(Result::unwrap).collect();
        assert_eq!(frames.len(), 4);
        assert_eq!(stats.frames, 4);
        // One black pixel letterboxes to a lit 64x64 square on a blank canvas.
        assert!(frames[3].foreground_count() > 0);
        assert!(!frames[3].get(0, 0));
    }
}

#[test]
fn test_stats_track_encoded_bytes() {
    let mut session = EncodeSession::builder()
        .with_encoding(Encoding::Rle)
        .with_fit(FitPolicy::Crop)
        .build();
    let mut source = ScriptedSource::repeat(split(256, 128), 5);
    let (data, stats) = run(&mut session, &mut source);

    // Each frame is 64 lit columns then 64 unlit, wrapping row to row.
    let payload = data.len() - 6 - 5 * 4;
    assert_eq!(stats.encoded_bytes as usize, payload);
    assert_eq!(stats.runs as usize, payload);
    assert_eq!(stats.foreground_pixels, 5 * 64 * 64);
    assert_eq!(stats.histogram[64], stats.runs);
}

#[test]
fn test_packed_runs_record_no_runs() {
    let mut session = EncodeSession::builder().with_encoding(Encoding::Packed).build();
    let (_, stats) = run(&mut session, &mut ScriptedSource::repeat(split(128, 64), 3));
    assert_eq!(stats.frames, 3);
    assert_eq!(stats.encoded_bytes, 3 * 1024);
    assert_eq!(stats.runs, 0);
}

#[test]
fn test_polarity_inverts_the_stream() {
    let frames = [split(128, 64), ramp(128, 64)];
    let mut decoded = Vec::new();
    for polarity in [Polarity::DarkIsForeground, Polarity::LightIsForeground] {
        let mut session = EncodeSession::builder().with_polarity(polarity).build();
        let (data, _) = run(&mut session, &mut MemorySource::new(frames.clone()));
        decoded.push(read_all(&data, Encoding::Rle).unwrap());
    }
    for (dark, light) in decoded[0].iter().zip(&decoded[1]) {
        let inverted = MonoFrame::from_fn(|x, y| !light.get(x, y));
        assert_eq!(dark, &inverted);
    }
}

#[test]
fn test_source_error_aborts_with_context() {
    let mut source = ScriptedSource::repeat(split(128, 64), 5);
    source.fail_at = Some(2);
    let mut session = EncodeSession::builder().build();
    let err = session
        .run(&mut source, Cursor::new(Vec::new()), &mut RunStats::new())
        .unwrap_err();
    assert!(format!("{err:#}").contains("failed to read frame 2"));
    assert!(err.downcast_ref::<VidError>().is_none());
}

#[test]
fn test_shutdown_is_called_once_per_run() {
    let mut source = ScriptedSource::repeat(split(128, 64), 3);
    let shutdowns = source.shutdowns.clone();
    let mut session = EncodeSession::builder().with_frame_limit(Some(1)).build();
    run(&mut session, &mut source);
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    assert_eq!(source.pulled(), 1);
}

#[test]
fn test_config_drives_a_still_image_run() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("frame.png");
    image::RgbImage::from_fn(256, 128, |x, _| {
        if x < 128 { image::Rgb([0, 0, 0]) } else { image::Rgb([255, 255, 255]) }
    })
    .save(&image_path)
    .unwrap();

    let mut config = EncodeConfig::new(&image_path, dir.path().join("video.bin"));
    config.encoding = Encoding::Packed;
    config.validate().unwrap();

    let mut source = config.open_source().unwrap();
    let mut session = config.session_builder().build();
    let mut file = std::fs::File::create(&config.output).unwrap();
    let summary = session
        .run(&mut source, BufWriter::new(&mut file), &mut RunStats::new())
        .unwrap();
    assert_eq!(summary.frames_written, 1);

    let data = std::fs::read(&config.output).unwrap();
    let frames = read_all(&data, Encoding::Packed).unwrap();
    assert_eq!(frames[0], MonoFrame::from_fn(|x, _| x < 64));
}

#[test]
fn test_still_source_yields_one_frame() {
    let mut source = StillSource::from_frame(split(128, 64));
    let mut session = EncodeSession::builder().build();
    let (data, stats) = run(&mut session, &mut source);
    assert_eq!(stats.frames, 1);
    assert_eq!(read_all(&data, Encoding::Rle).unwrap().len(), 1);
}
