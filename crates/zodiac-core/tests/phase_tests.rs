// Integration tests for the phase selector.

use zodiac_core::{phase_index, select_phase, Phase, PhaseTracker};

fn phases(n: usize) -> Vec<Phase> {
    (0..n)
        .map(|i| Phase::new("star", &format!("phase {i}"), [1.0, 1.0, 1.0]))
        .collect()
}

#[test]
fn index_is_always_in_range_and_non_decreasing() {
    for n in 1..=9 {
        let mut prev = 0;
        for step in 0..10_000 {
            let p = step as f32 / 100.0; // 0.00 ..= 99.99
            let idx = phase_index(p, n).unwrap();
            assert!(idx < n, "n={n} p={p} idx={idx}");
            assert!(idx >= prev, "n={n} p={p} went back from {prev} to {idx}");
            prev = idx;
        }
        assert_eq!(phase_index(100.0, n), Some(n - 1));
    }
}

#[test]
fn boundaries_use_clamped_floor() {
    assert_eq!(phase_index(0.0, 4), Some(0));
    assert_eq!(phase_index(24.99, 4), Some(0));
    assert_eq!(phase_index(25.0, 4), Some(1));
    assert_eq!(phase_index(75.0, 4), Some(3));
    assert_eq!(phase_index(100.0, 4), Some(3));
    assert_eq!(phase_index(250.0, 4), Some(3));
}

#[test]
fn odd_inputs_fall_into_first_slot_or_none() {
    assert_eq!(phase_index(-10.0, 3), Some(0));
    assert_eq!(phase_index(f32::NAN, 3), Some(0));
    assert_eq!(phase_index(50.0, 0), None);
    assert!(select_phase(50.0, &[]).is_none());
}

#[test]
fn select_phase_returns_the_entry() {
    let list = phases(4);
    assert_eq!(select_phase(60.0, &list).unwrap().label, "phase 2");
}

#[test]
fn tracker_reports_only_changes() {
    let mut t = PhaseTracker::default();
    let reported: Vec<usize> = (0..=100)
        .filter_map(|p| t.update(p as f32, 4))
        .collect();
    assert_eq!(reported, vec![0, 1, 2, 3]);
    assert_eq!(t.update(100.0, 4), None);
    assert_eq!(t.current(), Some(3));
}
