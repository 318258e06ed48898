// End-to-end tests for one mounted reveal.

use glam::{Vec2, Vec3};
use std::cell::Cell;
use std::rc::Rc;
use zodiac_core::*;

fn scenario_config() -> RevealConfig {
    RevealConfig {
        duration_ms: 1000.0,
        easing: Easing::Linear,
        jitter: None,
        fade_out_ms: 300.0,
        phases: ["A", "B", "C", "D"]
            .iter()
            .map(|l| Phase::new("star", l, [1.0, 1.0, 1.0]))
            .collect(),
        field: FieldConfig {
            count: 200,
            ..FieldConfig::default()
        },
        ..RevealConfig::loading_screen()
    }
}

fn frame(dt_sec: f32) -> FrameInput {
    FrameInput {
        dt_sec,
        pointer_ndc: Vec2::ZERO,
        scroll_px: 0.0,
    }
}

fn mount(cfg: RevealConfig) -> (RevealController, Rc<Cell<u32>>) {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let ctl = RevealController::new(cfg, Some(Box::new(move || c.set(c.get() + 1)))).unwrap();
    (ctl, calls)
}

#[test]
fn quarter_and_full_duration_scenario() {
    let (mut ctl, calls) = mount(scenario_config());
    ctl.start(0.0);

    let out = ctl.tick(0.0, frame(0.0));
    assert_eq!(out.phase_changed, Some(0));

    let out = ctl.tick(250.0, frame(0.25));
    assert!((out.progress - 25.0).abs() < 1e-3);
    assert_eq!(out.phase_changed, Some(1));
    assert_eq!(ctl.current_phase().unwrap().label, "B");

    let out = ctl.tick(1000.0, frame(0.75));
    assert_eq!(out.progress, 100.0);
    assert_eq!(ctl.current_phase().unwrap().label, "D");
    assert!(out.running);
    assert_eq!(calls.get(), 0, "callback waits for the exit fade");

    let out = ctl.tick(1150.0, frame(0.15));
    assert!((out.overlay_opacity - 0.5).abs() < 1e-3);

    let out = ctl.tick(1300.0, frame(0.15));
    assert_eq!(out.overlay_opacity, 0.0);
    assert!(!out.running);
    assert_eq!(calls.get(), 1);

    for i in 0..100 {
        let out = ctl.tick(1300.0 + i as f64 * 16.0, frame(0.016));
        assert!(!out.running);
        assert_eq!(out.phase_changed, None);
    }
    assert_eq!(calls.get(), 1);
    assert_eq!(ctl.completion_state(), CompletionState::Done);
}

#[test]
fn phase_change_is_reported_once_per_transition() {
    let (mut ctl, _) = mount(scenario_config());
    ctl.start(0.0);
    let mut changes = Vec::new();
    for i in 0..=70 {
        if let Some(p) = ctl.tick(i as f64 * 16.0, frame(0.016)).phase_changed {
            changes.push(p);
        }
    }
    assert_eq!(changes, vec![0, 1, 2, 3]);
}

#[test]
fn unmount_mid_way_stops_everything_and_drops_callback() {
    let (mut ctl, calls) = mount(scenario_config());
    ctl.start(0.0);
    ctl.tick(400.0, frame(0.4));
    ctl.unmount();
    let out = ctl.tick(5000.0, frame(0.016));
    assert!(!out.running);
    assert!(out.constellations.is_empty());
    assert_eq!(calls.get(), 0);
    assert!(ctl.is_unmounted());
}

#[test]
fn missing_callback_is_not_an_error() {
    let mut ctl = RevealController::new(scenario_config(), None).unwrap();
    ctl.start(0.0);
    ctl.tick(1000.0, frame(1.0));
    let out = ctl.tick(2000.0, frame(1.0));
    assert!(!out.running);
}

#[test]
fn hero_backdrop_keeps_animating_after_completion() {
    let cfg = RevealConfig::hero_backdrop();
    let duration = cfg.duration_ms;
    let (mut ctl, calls) = mount(cfg);
    ctl.start(0.0);
    ctl.tick(0.0, frame(0.0));

    let out = ctl.tick(duration + 1.0, frame(0.016));
    assert_eq!(out.progress, 100.0);
    assert!(out.completed);
    assert!(out.running);
    assert_eq!(calls.get(), 1);

    let before = ctl.tick(duration + 17.0, frame(0.016)).field_model;
    let out = ctl.tick(duration + 33.0, frame(0.016));
    assert!(out.running);
    assert_ne!(out.field_model, before, "field keeps rotating");
    assert_eq!(calls.get(), 1, "hook fires once");
}

#[test]
fn loading_screen_reports_completed_when_it_stops() {
    let (mut ctl, _) = mount(scenario_config());
    ctl.start(0.0);
    let out = ctl.tick(1000.0, frame(1.0));
    assert!(!out.completed);
    let out = ctl.tick(1300.0, frame(0.3));
    assert!(out.completed);
    assert!(!out.running);
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = RevealConfig {
        duration_ms: -1.0,
        ..scenario_config()
    };
    assert!(RevealController::new(cfg, None).is_err());
}

#[test]
fn hovering_a_revealed_vertex_pulses_it() {
    let (mut ctl, _) = mount(scenario_config());
    ctl.start(0.0);
    ctl.tick(0.0, frame(0.0));
    // first constellation is fading in with all four vertices revealed
    ctl.tick(200.0, frame(0.2));

    let ci = ctl.sequencer().active().unwrap();
    let vertex = ctl.sequencer().constellations()[ci].points[0];
    let world = ctl.overlay_model().transform_point3(vertex);
    let eye = Vec3::new(0.0, 0.0, CAMERA_Z);
    let dir = (world - eye).normalize();

    let hit = ctl.hover(eye, dir, 210.0);
    assert_eq!(hit, Some((ci, 0)));
    assert!(ctl.sequencer().pulse_amount(ci, 0, 210.0) > 0.99);

    let miss = ctl.hover(eye, Vec3::new(0.0, 1.0, 0.0), 210.0);
    assert_eq!(miss, None);
}

#[test]
fn external_constellation_dataset_replaces_defaults() {
    let (mut ctl, _) = mount(scenario_config());
    let list = RevealConfig::constellations_from_json(
        r#"[{"name":"Orion","points":[[0,0,0],[1,1,0],[2,0,0]]}]"#,
    )
    .unwrap();
    ctl.replace_constellations(list).unwrap();
    assert_eq!(ctl.sequencer().constellations().len(), 1);
    assert_eq!(ctl.sequencer().constellations()[0].name, "Orion");

    let bad = RevealConfig::constellations_from_json(r#"[{"name":"Dot","points":[[0,0,0]]}]"#);
    assert!(bad.is_err());
}
