//! Fault isolation: a failing instance is bypassed, everything else keeps
//! running.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use effechain::prelude::*;
use serde_json::json;

/// Scribbles over the block, then fails once `trip` is set.
struct Tripwire;

impl Processor for Tripwire {
    type State = ();

    const TYPE_TAG: &'static str = "Tripwire";
    const LABEL: &'static str = "Tripwire";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::toggle("trip", "Trip", false),
        ParamSpec::toggle("panic", "Panic", false),
    ];

    fn init_state(&self, _: &Geometry, _: u64) {}

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        _: &mut (),
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        block.fill(9.0);
        if params.flag(1) {
            panic!("tripwire panicked");
        }
        if params.flag(0) {
            return Err(UnitFault::Failed("tripped"));
        }
        block.fill(0.0);
        Ok(())
    }
}

fn engine_with_tripwire() -> Engine {
    effechain::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .seed(TEST_SEED)
        .register(Tripwire)
        .build()
        .unwrap()
}

#[test]
fn test_error_restores_block_and_others_still_run() {
    let mut engine = engine_with_tripwire();
    let c = engine.controller();
    add_with(c, "VolumePlugin", json!({ "vl": 20 }));
    let wire = add_with(c, "Tripwire", json!({ "trip": true }));
    add_with(c, "PolarityInversionPlugin", json!({}));

    let out = engine.process(&stereo(&[0.1, 0.2], &[0.3, 0.4]));
    // Volume ran, tripwire's scribbling was undone, polarity ran.
    assert_signals_equal(out.channel(0), &[-1.0, -2.0], FLOAT_EPSILON * 10.0, "left");
    assert_signals_equal(out.channel(1), &[-3.0, -4.0], FLOAT_EPSILON * 10.0, "right");

    assert_eq!(engine.controller().is_faulted(wire), Some(true));
    let events = engine.controller().drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        EngineEvent::UnitFault {
            id,
            type_tag: "Tripwire",
            fault: UnitFault::Failed("tripped"),
            frame: 0,
        } if id == wire
    ));
    assert_eq!(engine.controller().metrics().faults, 1);
}

#[test]
fn test_faulted_instance_stays_bypassed() {
    let mut engine = engine_with_tripwire();
    let wire = add_with(engine.controller(), "Tripwire", json!({ "trip": true }));
    engine.process(&mono(&[0.5]));

    // Clearing the trip does not revive the instance on its own.
    engine.controller().set_param(wire, "trip", false);
    let out = engine.process(&mono(&[0.5]));
    assert_eq!(out.samples(), &[0.5]);
    assert_eq!(engine.controller().drain_events().len(), 1);

    assert!(engine.controller().reset(wire));
    assert_eq!(engine.controller().is_faulted(wire), Some(false));
    let out = engine.process(&mono(&[0.5]));
    assert_is_silent(out.samples(), 0.0, "revived tripwire zeroes");
}

#[test]
fn test_panic_is_contained() {
    let mut engine = engine_with_tripwire();
    let c = engine.controller();
    let wire = add_with(c, "Tripwire", json!({ "panic": true }));
    add_with(c, "DCOffsetPlugin", json!({ "of": 0.25 }));

    let out = engine.process(&mono(&[0.5, -0.5]));
    assert_eq!(out.samples(), &[0.75, -0.25]);
    assert_eq!(engine.controller().is_faulted(wire), Some(true));
    assert!(engine
        .controller()
        .drain_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::UnitFault { fault: UnitFault::Panicked, .. })));

    // The panic payload comes back to the control plane for release.
    assert!(engine.controller().collect_garbage() >= 1);
}

#[test]
fn test_removing_faulted_instance_recovers_chain() {
    let mut engine = engine_with_tripwire();
    let wire = add_with(engine.controller(), "Tripwire", json!({ "trip": true }));
    add_with(engine.controller(), "MutePlugin", json!({}));
    engine.process(&mono(&[0.5]));

    assert!(engine.controller().remove(wire));
    assert_eq!(engine.controller().is_faulted(wire), None);
    assert_eq!(engine.process(&mono(&[0.5])).samples(), &[0.0]);
}
