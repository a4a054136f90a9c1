//! Tests for the run-length frame encoding

use lcd_video::codec::{decode_runs, encode_runs, RleFrame, RunStats, MAX_RUN};
use lcd_video::frame::{MonoFrame, PIXEL_COUNT};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::common::{random_mono, striped_mono};

/// Runs are 1..=127 long, add up to the frame, and are maximal: a run is
/// followed by one of the same color only when it is full.
fn assert_well_formed(rle: &RleFrame) {
    let runs: Vec<(bool, u8)> = rle.runs().collect();
    assert!(runs.iter().all(|&(_, len)| (1..=MAX_RUN).contains(&len)));
    let total: usize = runs.iter().map(|&(_, len)| usize::from(len)).sum();
    assert_eq!(total, PIXEL_COUNT);
    for pair in runs.windows(2) {
        if pair[0].0 == pair[1].0 {
            assert_eq!(pair[0].1, MAX_RUN, "split before a full run: {:?}", pair);
        }
    }
}

#[test]
fn test_random_frames_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    for density in [0.0, 0.05, 0.5, 0.95, 1.0] {
        let frame = random_mono(&mut rng, density);
        let rle = RleFrame::encode(&frame).unwrap();
        assert_well_formed(&rle);
        assert_eq!(rle.decode().unwrap(), frame);
    }
}

#[test]
fn test_striped_frames_round_trip() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let frame = striped_mono(&mut rng);
        let rle = RleFrame::encode(&frame).unwrap();
        assert_well_formed(&rle);
        assert_eq!(decode_runs(rle.as_bytes()).unwrap(), frame);
    }
}

#[test]
fn test_uniform_frame_is_65_bytes() {
    for value in [true, false] {
        let rle = RleFrame::encode(&MonoFrame::filled(value)).unwrap();
        assert_eq!(rle.run_count(), 65);
        let (last_color, last_len) = rle.runs().last().unwrap();
        assert_eq!(last_color, value);
        assert_eq!(last_len, 64);
    }
}

#[test]
fn test_checkerboard_merges_only_at_row_wraps() {
    // Pixel (127, y) and (0, y + 1) always share a color, so each of the 63
    // row wraps joins two single-pixel runs.
    let frame = MonoFrame::from_fn(|x, y| (x + y) % 2 == 1);
    let rle = RleFrame::encode(&frame).unwrap();
    assert_eq!(rle.run_count(), PIXEL_COUNT - 63);
    assert_eq!(rle.as_bytes()[0], 0x01);
    assert_eq!(rle.as_bytes()[1], 0x81);
}

#[test]
fn test_vertical_line_runs_wrap_rows() {
    // Column 127 of row y and column 0 of row y + 1 are adjacent in the scan.
    let frame = MonoFrame::from_fn(|x, _| x == 0 || x == 127);
    let runs: Vec<_> = RleFrame::encode(&frame).unwrap().runs().collect();
    assert_eq!(runs[0], (true, 1));
    assert_eq!(runs[1], (false, 126));
    assert_eq!(runs[2], (true, 2));
    assert_eq!(runs.last(), Some(&(true, 1)));
}

#[test]
fn test_encode_runs_accepts_any_length() {
    let pixels = std::iter::repeat(false).take(300).chain(std::iter::once(true));
    assert_eq!(encode_runs(pixels, None).unwrap(), vec![0x7F, 0x7F, 46, 0x81]);
}

#[test]
fn test_stats_accumulate_across_frames() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut stats = RunStats::new();
    let mut bytes = 0u64;
    for _ in 0..5 {
        let rle = RleFrame::encode_with_stats(&random_mono(&mut rng, 0.2), &mut stats).unwrap();
        bytes += rle.run_count() as u64;
    }
    assert_eq!(stats.runs, bytes);
    assert_eq!(stats.histogram[0], 0);
    let covered: u64 = stats
        .histogram
        .iter()
        .enumerate()
        .map(|(len, &n)| len as u64 * n)
        .sum();
    assert_eq!(covered, 5 * PIXEL_COUNT as u64);
}

#[test]
fn test_malformed_streams_are_rejected() {
    let good = RleFrame::encode(&MonoFrame::filled(false)).unwrap();

    let mut short = good.as_bytes().to_vec();
    short.pop();
    assert!(RleFrame::from_bytes(short).unwrap_err().is_format());

    let mut long = good.as_bytes().to_vec();
    long.push(0x01);
    assert!(RleFrame::from_bytes(long).unwrap_err().is_format());

    let mut zero = good.as_bytes().to_vec();
    zero.insert(3, 0x00);
    assert!(RleFrame::from_bytes(zero).unwrap_err().is_format());

    assert!(decode_runs(&[]).unwrap_err().is_format());
}
