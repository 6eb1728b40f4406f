//! Chain editing: order, sections, bypass and instance lifecycle.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use effechain::prelude::*;
use serde_json::json;

#[test]
fn test_order_matters_for_nonlinear_units() {
    let mut engine = test_engine();
    let c = engine.controller();
    let offset = add_with(c, "DCOffsetPlugin", json!({ "of": 0.5 }));
    let volume = add_with(c, "VolumePlugin", json!({ "vl": 20 }));

    let input = stereo(&[0.0; 4], &[0.0; 4]);
    // (0 + 0.5) * 10
    let out = engine.process(&input);
    assert_signals_equal(out.channel(0), &[5.0; 4], FLOAT_EPSILON * 10.0, "offset first");

    assert!(engine.controller().reorder(&[volume, offset]));
    // 0 * 10 + 0.5
    let out = engine.process(&input);
    assert_signals_equal(out.channel(0), &[0.5; 4], FLOAT_EPSILON, "volume first");
}

#[test]
fn test_reorder_ignores_unknown_and_duplicate_ids() {
    let engine = test_engine();
    let c = engine.controller();
    let a = c.add("MutePlugin").unwrap();
    let b = c.add("VolumePlugin").unwrap();
    let d = c.add("SectionPlugin").unwrap();
    let gone = c.add("CrosstalkPlugin").unwrap();
    c.remove(gone);

    c.reorder(&[d, gone, d, a]);
    assert_eq!(c.ids(), vec![d, a, b]);
}

#[test]
fn test_insert_and_move() {
    let engine = test_engine();
    let c = engine.controller();
    let a = c.add("VolumePlugin").unwrap();
    let b = c.add("VolumePlugin").unwrap();
    let front = c.insert(0, "MutePlugin").unwrap();
    assert_eq!(c.ids(), vec![front, a, b]);

    assert!(c.move_to(front, 99));
    assert_eq!(c.ids(), vec![a, b, front]);
    assert_eq!(c.type_of(front), Some("MutePlugin"));
}

#[test]
fn test_disabled_section_gates_until_next_section() {
    let mut engine = test_engine();
    let c = engine.controller();
    let section = add_with(c, "SectionPlugin", json!({ "cm": "lofi" }));
    c.add("MutePlugin").unwrap();
    c.add("SectionPlugin").unwrap();
    add_with(c, "VolumePlugin", json!({ "vl": 20 }));

    let input = stereo(&[0.1, 0.1], &[0.1, 0.1]);
    let out = engine.process(&input);
    assert_is_silent(out.samples(), SILENCE_THRESHOLD, "section enabled");

    engine.controller().set_enabled(section, false);
    let out = engine.process(&input);
    assert_signals_equal(out.samples(), &[1.0; 4], FLOAT_EPSILON * 10.0, "mute gated");
}

#[test]
fn test_master_bypass() {
    let mut engine = test_engine();
    engine.controller().add("MutePlugin").unwrap();
    engine.controller().set_master_bypass(true);

    let input = noise_block(32, 4);
    assert_eq!(engine.process(&input), input);

    engine.controller().set_master_bypass(false);
    assert_is_silent(engine.process(&input).samples(), 0.0, "bypass off");
}

#[test]
fn test_readded_unit_starts_from_fresh_state() {
    let mut engine = test_engine();
    let c = engine.controller();
    let crusher = add_with(c, "BitCrusherPlugin", json!({ "bd": 24, "zf": 16000 }));

    // Leave the hold phase mid-window.
    engine.process(&mono(&[0.5, 0.5, 0.5, 0.5]));
    engine.controller().remove(crusher);
    engine.process(&mono(&[0.0; 4]));

    add_with(
        engine.controller(),
        "BitCrusherPlugin",
        json!({ "bd": 24, "zf": 16000 }),
    );
    let out = engine.process(&mono(&[0.25, 0.0, 0.0, 0.125]));
    // Fresh hold window starts at the first frame.
    assert_eq!(out.samples(), &[0.25, 0.25, 0.25, 0.125]);
}

#[test]
fn test_get_all_reports_wire_format() {
    let engine = test_engine();
    let id = add_with(
        engine.controller(),
        "StereoBlendPlugin",
        json!({ "stereo": 250, "bogus": 1 }),
    );
    let entry = engine.controller().get_all(id).unwrap();
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        value,
        json!({ "type": "StereoBlendPlugin", "enabled": true, "stereo": 200.0 })
    );
}

#[test]
fn test_replace_resets_unlisted_keys() {
    let engine = test_engine();
    let c = engine.controller();
    let id = add_with(c, "HarmonicDistortionPlugin", json!({ "h2": 10, "sn": 2 }));

    let map = json!({ "h3": -5 });
    assert!(c.replace(id, map.as_object().unwrap()));
    assert_eq!(c.param(id, "h2"), Some(ParamValue::Float(2.0)));
    assert_eq!(c.param(id, "h3"), Some(ParamValue::Float(-5.0)));
    assert_eq!(c.param(id, "sn"), Some(ParamValue::Float(0.5)));
}

#[test]
fn test_sample_rate_change_resets_state_and_reports() {
    let mut engine = test_engine();
    engine.controller().add("TremoloPlugin").unwrap();
    engine.process(&noise_block(64, 1));

    engine.controller().set_sample_rate(96000.0).unwrap();
    engine.process(&noise_block(64, 1));

    let events = engine.controller().drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::GeometryChanged { from, to }
            if from.sample_rate == TEST_SAMPLE_RATE && to.sample_rate == 96000.0
    )));
    assert!(engine.controller().set_sample_rate(1.0).is_err());
}

#[test]
fn test_clear_passes_through() {
    let mut engine = test_engine();
    engine.controller().add("MutePlugin").unwrap();
    engine.controller().add("TremoloPlugin").unwrap();
    engine.controller().clear();
    assert!(engine.controller().is_empty());

    let input = noise_block(16, 8);
    assert_eq!(engine.process(&input), input);
}

#[test]
fn test_chain_capped_at_max_instances() {
    let mut engine = effechain::builder()
        .block_size(TEST_BLOCK_SIZE)
        .max_instances(1)
        .build()
        .unwrap();
    engine.controller().add("TremoloPlugin").unwrap();
    for _ in 0..9 {
        assert!(matches!(
            engine.controller().add("TremoloPlugin"),
            Err(effechain::core::Error::ChainFull { capacity: 1 })
        ));
    }
    assert_eq!(engine.controller().len(), 1);

    let input = noise_block(TEST_BLOCK_SIZE, 2);
    engine.process(&input);
    engine.controller().clear();
    engine.process(&input);

    assert!(engine.controller().collect_garbage() >= 1);
    assert_eq!(engine.controller().metrics().dropped_discards, 0);
}
