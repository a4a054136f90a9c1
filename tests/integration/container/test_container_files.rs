//! Containers written to disk and read back through a memory map

use std::fs::{self, File};
use std::io::BufWriter;

use lcd_video::container::{
    read_all, ContainerReader, ContainerWriter, EncodedFrame, Encoding, HEADER_LEN,
};
use lcd_video::frame::MonoFrame;
use memmap2::Mmap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{random_mono, striped_mono};

fn sample_frames(seed: u64, count: usize) -> Vec<MonoFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| match i % 3 {
            0 => striped_mono(&mut rng),
            1 => random_mono(&mut rng, 0.1),
            _ => MonoFrame::filled(rng.gen_bool(0.5)),
        })
        .collect()
}

fn write_file(frames: &[MonoFrame], encoding: Encoding) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    let mut writer = ContainerWriter::new(BufWriter::new(tmp.as_file_mut()), encoding).unwrap();
    for frame in frames {
        writer.push(frame, None).unwrap();
    }
    writer.finish().unwrap();
    tmp
}

#[test]
fn test_round_trip_through_mapped_file() {
    let frames = sample_frames(1, 24);
    for encoding in [Encoding::Packed, Encoding::Rle] {
        let tmp = write_file(&frames, encoding);
        let file = File::open(tmp.path()).unwrap();
        let map = unsafe { Mmap::map(&file) }.unwrap();

        let reader = ContainerReader::new(&map, encoding).unwrap();
        assert_eq!(reader.header().frame_count, 24);
        let decoded: Vec<MonoFrame> = reader.map(Result::unwrap).collect();
        assert_eq!(decoded, frames, "{encoding}");
    }
}

#[test]
fn test_packed_file_size_is_fixed_per_frame() {
    let frames = sample_frames(2, 10);
    let tmp = write_file(&frames, Encoding::Packed);
    let len = fs::metadata(tmp.path()).unwrap().len() as usize;
    assert_eq!(len, HEADER_LEN + 10 * 1024);
}

#[test]
fn test_rle_beats_packed_on_flat_content() {
    let frames = vec![MonoFrame::filled(false); 8];
    let rle = fs::metadata(write_file(&frames, Encoding::Rle).path()).unwrap().len();
    let packed = fs::metadata(write_file(&frames, Encoding::Packed).path()).unwrap().len();
    assert_eq!(rle as usize, HEADER_LEN + 8 * (4 + 65));
    assert!(rle * 10 < packed);
}

#[test]
fn test_every_truncation_is_detected() {
    let frames = sample_frames(3, 4);
    let mut rng = StdRng::seed_from_u64(4);
    for encoding in [Encoding::Packed, Encoding::Rle] {
        let data = fs::read(write_file(&frames, encoding).path()).unwrap();
        for _ in 0..32 {
            let cut = rng.gen_range(0..data.len());
            let result = read_all(&data[..cut], encoding);
            assert!(result.unwrap_err().is_format(), "{encoding} cut at {cut}");
        }
    }
}

#[test]
fn test_reading_with_the_wrong_encoding_fails() {
    let frames = sample_frames(5, 3);
    let data = fs::read(write_file(&frames, Encoding::Packed).path()).unwrap();
    assert!(read_all(&data, Encoding::Rle).is_err());
}

#[test]
fn test_raw_entries_match_payloads() {
    let frames = sample_frames(6, 6);
    let data = fs::read(write_file(&frames, Encoding::Rle).path()).unwrap();
    let mut reader = ContainerReader::new(&data, Encoding::Rle).unwrap();
    let mut stored = HEADER_LEN;
    for frame in &frames {
        let entry = reader.next_encoded().unwrap().unwrap();
        let expected = EncodedFrame::encode(frame, Encoding::Rle, None).unwrap();
        assert_eq!(entry, expected);
        stored += entry.stored_len();
    }
    assert!(reader.next_encoded().is_none());
    assert_eq!(stored, data.len());
}
