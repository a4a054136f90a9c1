//! Tests for grayscale thresholding and polarity

use lcd_video::frame::RawFrame;
use lcd_video::processing::{luma, FitPolicy, FrameNormalizer, Monochromizer, Polarity, THRESHOLD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn binarize(frame: &RawFrame, fit: FitPolicy, polarity: Polarity) -> lcd_video::frame::MonoFrame {
    let normalized = FrameNormalizer::new(fit, polarity.background_rgb())
        .normalize(frame)
        .unwrap();
    Monochromizer::new(polarity).monochromize(&normalized)
}

#[test]
fn test_gray_127_is_light() {
    assert_eq!(THRESHOLD, 127);
    let dark = Polarity::DarkIsForeground;
    assert!(dark.is_foreground(luma([126; 3])));
    assert!(!dark.is_foreground(luma([127; 3])));
    assert!(Polarity::LightIsForeground.is_foreground(luma([127; 3])));
}

#[test]
fn test_gray_levels_keep_their_value() {
    for v in 0..=255u8 {
        assert_eq!(luma([v; 3]), v);
    }
}

#[test]
fn test_polarities_are_exact_inverses() {
    let mut rng = StdRng::seed_from_u64(5);
    let frame = RawFrame::from_fn(128, 64, |_, _| {
        [rng.gen_range(0..=255), rng.gen_range(0..=255), rng.gen_range(0..=255)]
    });
    let dark = binarize(&frame, FitPolicy::Crop, Polarity::DarkIsForeground);
    let light = binarize(&frame, FitPolicy::Crop, Polarity::LightIsForeground);
    assert!(dark
        .pixels()
        .iter()
        .zip(light.pixels())
        .all(|(a, b)| a != b));
}

#[test]
fn test_default_polarity_lights_dark_pixels() {
    let mono = binarize(&crate::common::split(128, 64), FitPolicy::Crop, Polarity::default());
    assert!(mono.get(0, 0));
    assert!(!mono.get(127, 0));
    assert_eq!(mono.foreground_count(), 64 * 64);
}

#[test]
fn test_letterbox_borders_are_background_under_both_polarities() {
    for polarity in [Polarity::DarkIsForeground, Polarity::LightIsForeground] {
        let content = if polarity == Polarity::DarkIsForeground { [0; 3] } else { [255; 3] };
        let mono = binarize(&RawFrame::filled(64, 64, content), FitPolicy::Letterbox, polarity);
        assert_eq!(mono.foreground_count(), 64 * 64, "{polarity:?}");
        assert!(!mono.get(0, 0));
        assert!(mono.get(64, 32));
    }
}
