//! Reference scenarios: one unit, known input, known output.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use effechain::prelude::*;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn test_mute_stereo_block_is_silent() {
    let mut engine = effechain::builder().block_size(4).build().unwrap();
    engine.controller().add("MutePlugin").unwrap();

    let block = stereo(&[1.0, 1.0, 1.0, 1.0], &[0.5, 0.5, 0.5, 0.5]);
    let out = engine.process(&block);
    assert_eq!(out.samples(), &[0.0; 8]);
}

#[test]
fn test_volume_unity_mono() {
    let mut engine = test_engine();
    add_with(engine.controller(), "VolumePlugin", json!({ "vl": 0 }));

    let out = engine.process(&mono(&[0.2, -0.2, 0.5, -0.5]));
    assert_eq!(out.samples(), &[0.2, -0.2, 0.5, -0.5]);
}

#[test]
fn test_volume_plus_20_db_is_times_ten() {
    let mut engine = test_engine();
    add_with(engine.controller(), "VolumePlugin", json!({ "vl": 20 }));

    let input = generate_sine(440.0, TEST_SAMPLE_RATE, 256);
    let out = engine.process(&mono(&input));
    let expected: Vec<f32> = input.iter().map(|s| s * 10.0).collect();
    assert_signals_equal(out.samples(), &expected, 10.0 * FLOAT_EPSILON, "vl=20");
}

#[test]
fn test_balance_full_right() {
    let mut engine = test_engine();
    add_with(engine.controller(), "StereoBalancePlugin", json!({ "bl": 1 }));

    let out = engine.process(&stereo(&[1.0, 1.0], &[1.0, 1.0]));
    assert_eq!(out.channel(0), &[0.0, 0.0]);
    assert_eq!(out.channel(1), &[1.0, 1.0]);
}

#[test]
fn test_balance_ignores_mono() {
    let mut engine = test_engine();
    add_with(engine.controller(), "StereoBalancePlugin", json!({ "bl": 1 }));

    let out = engine.process(&mono(&[0.5, 0.25]));
    assert_eq!(out.samples(), &[0.5, 0.25]);
}

#[test]
fn test_crosstalk_extremes() {
    let mut engine = test_engine();
    let id = add_with(engine.controller(), "CrosstalkPlugin", json!({ "am": 0 }));
    let out = engine.process(&stereo(&[1.0, 0.2], &[0.0, 0.6]));
    assert_signals_equal(out.channel(0), out.channel(1), FLOAT_EPSILON, "am=0 averages");
    assert_signals_equal(out.channel(0), &[0.5, 0.4], FLOAT_EPSILON, "am=0 mean");

    engine.controller().set_param(id, "am", -96.0);
    let input = noise_block(TEST_BLOCK_SIZE, 3);
    let out = engine.process(&input);
    assert_signals_equal(out.samples(), input.samples(), DSP_EPSILON, "am=-96");
}

#[test]
fn test_width_extremes() {
    let mut engine = test_engine();
    let id = engine.controller().add("StereoBlendPlugin").unwrap();

    let input = noise_block(TEST_BLOCK_SIZE, 9);
    let out = engine.process(&input);
    assert_signals_equal(out.samples(), input.samples(), FLOAT_EPSILON, "stereo=100");

    engine.controller().set_param(id, "stereo", 0.0);
    let out = engine.process(&input);
    assert_signals_equal(out.channel(0), out.channel(1), FLOAT_EPSILON, "stereo=0");
}

#[test]
fn test_ms_encode_decode_round_trip() {
    let mut engine = test_engine();
    add_with(
        engine.controller(),
        "MSMatrixPlugin",
        json!({ "md": 0, "mg": 6, "sg": 6 }),
    );
    add_with(
        engine.controller(),
        "MSMatrixPlugin",
        json!({ "md": 1, "mg": -6, "sg": -6 }),
    );

    let input = noise_block(TEST_BLOCK_SIZE, 21);
    let out = engine.process(&input);
    assert_signals_equal(out.samples(), input.samples(), DSP_EPSILON, "M/S round trip");
}

#[test]
fn test_polarity_twice_restores() {
    let mut engine = test_engine();
    engine.controller().add("PolarityInversionPlugin").unwrap();
    engine.controller().add("PolarityInversionPlugin").unwrap();

    let input = noise_block(TEST_BLOCK_SIZE, 5);
    let out = engine.process(&input);
    assert_eq!(out.samples(), input.samples());
}

#[test]
fn test_harmonic_distortion_adds_even_harmonic_offset() {
    let mut engine = test_engine();
    add_with(
        engine.controller(),
        "HarmonicDistortionPlugin",
        json!({ "h2": 30, "h3": 0, "h4": 0, "h5": 0, "sn": 1 }),
    );

    // A symmetric sine through an x^2 term gains a negative DC component.
    let input = generate_sine(1000.0, TEST_SAMPLE_RATE, 480);
    let out = engine.process(&mono(&input));
    let mean: f32 = out.samples().iter().sum::<f32>() / out.samples().len() as f32;
    assert!(mean < -0.1, "mean {} should be about -0.15", mean);
}

#[test]
fn test_bit_crusher_reduces_resolution() {
    let mut engine = test_engine();
    add_with(
        engine.controller(),
        "BitCrusherPlugin",
        json!({ "bd": 4, "zf": 48000 }),
    );

    let input = generate_sine(440.0, TEST_SAMPLE_RATE, TEST_BLOCK_SIZE);
    let out = engine.process(&mono(&input));
    for s in out.samples() {
        let steps = s * 8.0;
        assert!((steps - steps.round()).abs() < FLOAT_EPSILON, "{} off grid", s);
    }
}

#[test]
fn test_tremolo_modulates_level() {
    let mut engine = test_engine();
    add_with(
        engine.controller(),
        "TremoloPlugin",
        json!({ "dp": 12, "rn": 0, "rt": 20 }),
    );

    let block_size = TEST_BLOCK_SIZE;
    let mut minimum = f32::MAX;
    for _ in 0..(4800 / block_size) {
        let out = engine.process(&mono(&vec![1.0; block_size]));
        minimum = out.samples().iter().cloned().fold(minimum, f32::min);
    }
    assert!(minimum < 0.3, "depth never reached: {}", minimum);
    assert!(minimum > 0.25 - PERCEPTUAL_EPSILON);
}

#[test]
fn test_dc_offset_shifts_silence() {
    let mut engine = test_engine();
    add_with(engine.controller(), "DCOffsetPlugin", json!({ "of": -0.5 }));

    let out = engine.process(&stereo(&[0.0; 4], &[0.0; 4]));
    assert!(out.samples().iter().all(|s| *s == -0.5));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_disabled_instance_is_identity(
        kind in prop::sample::select(UnitKind::ALL.to_vec()),
        seed in any::<u64>(),
    ) {
        let mut engine = test_engine();
        let id = engine.controller().add(kind.tag()).unwrap();
        engine.controller().set_enabled(id, false);

        let input = noise_block(64, seed);
        let out = engine.process(&input);
        prop_assert_eq!(out.samples(), input.samples());
    }

    #[test]
    fn prop_reordering_disabled_units_never_changes_output(
        seed in any::<u64>(),
        flip in any::<bool>(),
    ) {
        let mut engine = test_engine();
        let c = engine.controller();
        let volume = add_with(c, "VolumePlugin", json!({ "vl": -6 }));
        let crusher = add_with(c, "BitCrusherPlugin", json!({ "enabled": false }));
        let width = add_with(c, "StereoBlendPlugin", json!({ "stereo": 40 }));
        let mute = add_with(c, "MutePlugin", json!({ "enabled": false }));

        let input = noise_block(64, seed);
        let before = engine.process(&input);

        let order = if flip {
            vec![mute, volume, crusher, width]
        } else {
            vec![crusher, volume, width, mute]
        };
        engine.controller().reorder(&order);
        let after = engine.process(&input);
        prop_assert_eq!(before.samples(), after.samples());
    }
}
