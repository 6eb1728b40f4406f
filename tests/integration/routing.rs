//! Send/return buses and single-channel targeting with the built-in units.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use effechain::prelude::*;
use serde_json::json;

fn sine_pair() -> Block {
    let left = generate_sine(440.0, TEST_SAMPLE_RATE, TEST_BLOCK_SIZE);
    let right = generate_sine(660.0, TEST_SAMPLE_RATE, TEST_BLOCK_SIZE);
    stereo(&left, &right)
}

#[test]
fn test_parallel_tremolo_on_send_bus() {
    let mut engine = test_engine();
    let c = engine.controller();
    // -6.02 dB send, tremolo on bus 1, unity return into main
    add_with(c, "VolumePlugin", json!({ "vl": -6.0206, "outputBus": 1 }));
    add_with(c, "TremoloPlugin", json!({ "rn": 0, "inputBus": 1, "outputBus": 1 }));
    add_with(c, "VolumePlugin", json!({ "inputBus": 1, "outputBus": 0 }));

    let input = sine_pair();
    let out = engine.process(&input);
    let wet: Vec<f32> = out
        .samples()
        .iter()
        .zip(input.samples())
        .map(|(o, i)| o - i)
        .collect();

    assert_not_silent(&wet, 0.05, "returned send");
    assert!(peak(&wet) <= 0.5 * peak(input.samples()) + PERCEPTUAL_EPSILON);
    assert!(rms(out.samples()) > rms(input.samples()));
}

#[test]
fn test_unreturned_send_leaves_main_dry() {
    let mut engine = test_engine();
    add_with(engine.controller(), "MutePlugin", json!({ "ob": 2 }));
    add_with(engine.controller(), "VolumePlugin", json!({ "vl": 20, "ib": 3, "ob": 4 }));

    let input = noise_block(TEST_BLOCK_SIZE, 21);
    let out = engine.process(&input);
    assert_signals_equal(out.samples(), input.samples(), FLOAT_EPSILON, "dry main");
}

#[test]
fn test_volume_on_left_channel_only() {
    let mut engine = test_engine();
    add_with(engine.controller(), "VolumePlugin", json!({ "vl": -20, "channel": "L" }));

    let input = noise_block(TEST_BLOCK_SIZE, 5);
    let out = engine.process(&input);

    let ratio = rms(out.channel(0)) / rms(input.channel(0));
    assert!((ratio - 0.1).abs() < DSP_EPSILON, "left gain {}", ratio);
    assert_signals_equal(out.channel(1), input.channel(1), FLOAT_EPSILON, "right untouched");
}

#[test]
fn test_channel_target_from_preset() {
    let mut engine = test_engine();
    let preset = Preset::from_json(r#"[{ "type": "MutePlugin", "channel": "R" }]"#).unwrap();
    let ids = engine.controller().load_preset(&preset);
    assert_eq!(
        engine.controller().routing(ids[0]).and_then(|r| r.channel),
        Some(ChannelTarget::Right)
    );

    let out = engine.process(&sine_pair());
    assert_not_silent(out.channel(0), 0.5, "left passes");
    assert_is_silent(out.channel(1), SILENCE_THRESHOLD, "right muted");

    let exported = serde_json::to_value(engine.controller().export_preset()).unwrap();
    assert_eq!(exported[0]["channel"], json!("R"));
    assert!(exported[0].get("inputBus").is_none());
}

#[test]
fn test_stereo_unit_skipped_on_single_channel() {
    let mut engine = test_engine();
    add_with(engine.controller(), "StereoBalancePlugin", json!({ "bl": 1, "channel": "L" }));

    let input = sine_pair();
    let out = engine.process(&input);
    assert_signals_equal(out.samples(), input.samples(), FLOAT_EPSILON, "balance on one side");
}
