//! Preset wire format: load, export, and rendering equivalence.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use effechain::prelude::*;
use serde_json::json;

const CHAIN: &str = r#"[
    { "type": "VolumePlugin", "vl": -6 },
    { "type": "SectionPlugin", "enabled": true, "cm": "imaging" },
    { "type": "StereoBlendPlugin", "stereo": 150 },
    { "type": "MSMatrixPlugin", "md": 0, "sw": 1, "enabled": false },
    { "type": "ReverbPlugin", "rt": 2.5 },
    { "type": "CrosstalkPlugin" }
]"#;

#[test]
fn test_load_skips_unknown_types() {
    let engine = test_engine();
    let preset = Preset::from_json(CHAIN).unwrap();
    assert_eq!(preset.len(), 6);

    let ids = engine.controller().load_preset(&preset);
    assert_eq!(ids.len(), 5);
    assert_eq!(engine.controller().ids(), ids);
    assert_eq!(engine.controller().type_of(ids[3]), Some("MSMatrixPlugin"));
    assert_eq!(engine.controller().is_enabled(ids[3]), Some(false));
    assert_eq!(
        engine.controller().param(ids[4], "am"),
        Some(ParamValue::Float(-12.0))
    );
}

#[test]
fn test_export_reloads_identically() {
    let mut first = test_engine();
    first.controller().load_preset(&Preset::from_json(CHAIN).unwrap());
    let exported = first.controller().export_preset();
    let text = exported.to_json().unwrap();

    let mut second = test_engine();
    second.controller().load_preset(&Preset::from_json(&text).unwrap());
    assert_eq!(second.controller().export_preset(), exported);

    let input = noise_block(TEST_BLOCK_SIZE, 77);
    let a = first.process(&input);
    let b = second.process(&input);
    assert_signals_equal(a.samples(), b.samples(), FLOAT_EPSILON, "reloaded chain");
}

#[test]
fn test_export_lists_every_key() {
    let engine = test_engine();
    engine.controller().add("BitCrusherPlugin").unwrap();
    let value = serde_json::to_value(engine.controller().export_preset()).unwrap();
    assert_eq!(
        value,
        json!([{
            "type": "BitCrusherPlugin",
            "enabled": true,
            "bd": 8,
            "td": false,
            "zf": 44100.0,
            "be": 0.0,
            "sd": 11
        }])
    );
}

#[test]
fn test_load_replaces_previous_chain() {
    let mut engine = test_engine();
    engine.controller().add("MutePlugin").unwrap();
    engine
        .controller()
        .load_preset(&Preset::from_json(r#"[{ "type": "VolumePlugin", "vl": 0 }]"#).unwrap());
    assert_eq!(engine.controller().len(), 1);

    let input = noise_block(8, 2);
    assert_eq!(engine.process(&input), input);
}

#[test]
fn test_malformed_preset_is_an_error() {
    assert!(Preset::from_json(r#"{ "type": "VolumePlugin" }"#).is_err());
    assert!(Preset::from_json(r#"[{ "vl": 3 }]"#).is_err());
}

#[test]
fn test_apply_via_wire_entry() {
    let engine = test_engine();
    let entry: PresetEntry =
        serde_json::from_value(json!({ "type": "TremoloPlugin", "rt": 50, "cp": -90 })).unwrap();
    let id = engine.controller().add_entry(&entry).unwrap();
    assert_eq!(engine.controller().param(id, "rt"), Some(ParamValue::Float(20.0)));
    assert_eq!(engine.controller().param(id, "cp"), Some(ParamValue::Float(-90.0)));
}
