// Integration tests for constellation sequencing and reveal.

use zodiac_core::{zodiac_set, ConstellationSequencer, SequencerEvent, Visibility};

const FADE: f64 = 200.0;

fn run(seq: &mut ConstellationSequencer, from: f64, to: f64, dur: f64) -> Vec<SequencerEvent> {
    let mut events = Vec::new();
    let mut now = from;
    while now <= to {
        let progress = (now / dur * 100.0).min(100.0) as f32;
        events.extend(seq.update(progress, now));
        now += 8.0;
    }
    events
}

#[test]
fn fade_in_never_precedes_previous_fade_out_completion() {
    let mut seq = ConstellationSequencer::new(zodiac_set(), FADE, 300.0);
    let events = run(&mut seq, 0.0, 3000.0, 2000.0);

    let mut on_screen: Option<usize> = None;
    let mut fade_ins = 0;
    for ev in &events {
        match *ev {
            SequencerEvent::FadeInStarted { index, .. } => {
                assert!(
                    on_screen.is_none(),
                    "fade-in of {index} while {on_screen:?} still on screen"
                );
                on_screen = Some(index);
                fade_ins += 1;
            }
            SequencerEvent::FadeOutCompleted { index, .. } => {
                assert_eq!(on_screen, Some(index));
                on_screen = None;
            }
            _ => {}
        }
    }
    assert_eq!(fade_ins, 4);
    assert_eq!(seq.active(), Some(3));
}

#[test]
fn fade_out_completion_timestamp_orders_next_fade_in() {
    let mut seq = ConstellationSequencer::new(zodiac_set(), FADE, 300.0);
    let events = run(&mut seq, 0.0, 2500.0, 2000.0);
    let mut last_out = f64::NEG_INFINITY;
    for ev in events {
        match ev {
            SequencerEvent::FadeOutCompleted { at_ms, .. } => last_out = at_ms,
            SequencerEvent::FadeInStarted { index, at_ms } if index > 0 => {
                assert!(at_ms >= last_out);
                assert!(last_out.is_finite());
            }
            _ => {}
        }
    }
}

#[test]
fn draw_range_is_monotonic_and_completes() {
    let mut seq = ConstellationSequencer::new(zodiac_set(), FADE, 300.0);
    let mut prev = vec![0usize; 4];
    for step in 0..=100 {
        seq.update(step as f32, step as f64 * 10.0);
        for (i, p) in prev.iter_mut().enumerate() {
            let r = seq.draw_range(i);
            assert!(r >= *p);
            *p = r;
        }
    }
    for (i, c) in seq.constellations().iter().enumerate() {
        assert_eq!(seq.draw_range(i), c.points.len());
    }
}

#[test]
fn only_latest_target_is_queued_during_fade_out() {
    let mut seq = ConstellationSequencer::new(zodiac_set(), FADE, 300.0);
    seq.update(0.0, 0.0);
    seq.update(0.0, 250.0);
    assert_eq!(seq.visibility(0), Some(Visibility::Visible));
    // jump through two bands while constellation 0 is still fading out
    seq.update(30.0, 260.0);
    seq.update(60.0, 300.0);
    assert!(matches!(seq.visibility(0), Some(Visibility::FadingOut { .. })));
    seq.update(60.0, 460.0);
    assert_eq!(seq.visibility(0), Some(Visibility::Hidden));
    assert_eq!(seq.active(), Some(2));
    assert_eq!(seq.visibility(1), Some(Visibility::Hidden));
}

#[test]
fn pulses_require_a_visible_revealed_vertex() {
    let mut seq = ConstellationSequencer::new(zodiac_set(), FADE, 300.0);
    assert!(!seq.pulse(0, 0, 0.0));
    seq.update(5.0, 0.0);
    seq.update(5.0, 300.0);
    assert!(seq.pulse(0, 0, 300.0));
    assert!(!seq.pulse(0, 3, 300.0), "vertex not revealed yet");
    assert!(!seq.pulse(2, 0, 300.0), "constellation hidden");
    assert!(!seq.pulse(9, 0, 300.0));
}

#[test]
fn pulses_do_not_touch_visibility_or_reveal() {
    let mut seq = ConstellationSequencer::new(zodiac_set(), FADE, 300.0);
    seq.update(10.0, 0.0);
    seq.update(10.0, 300.0);
    let before = (seq.visibility(0), seq.draw_range(0), seq.active());
    for i in 0..20 {
        seq.pulse(0, 0, 300.0 + i as f64);
    }
    assert_eq!(before, (seq.visibility(0), seq.draw_range(0), seq.active()));
    assert_eq!(seq.active_pulses(), 1);
}

#[test]
fn unmount_hides_everything() {
    let mut seq = ConstellationSequencer::new(zodiac_set(), FADE, 300.0);
    run(&mut seq, 0.0, 900.0, 2000.0);
    seq.unmount();
    for i in 0..4 {
        assert_eq!(seq.visibility(i), Some(Visibility::Hidden));
    }
    assert!(seq.frames().is_empty());
    assert_eq!(seq.active(), None);
}
