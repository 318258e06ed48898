// Integration tests for the exit fade and completion callback.

use std::cell::Cell;
use std::rc::Rc;
use zodiac_core::{CompletionHook, CompletionState};

fn counting_hook(fade_ms: f64) -> (CompletionHook, Rc<Cell<u32>>) {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let hook = CompletionHook::new(fade_ms, Some(Box::new(move || c.set(c.get() + 1))));
    (hook, calls)
}

#[test]
fn callback_fires_once_after_fade() {
    let (mut hook, calls) = counting_hook(400.0);
    assert_eq!(hook.tick(0.0), 1.0);
    assert!(hook.trigger(1000.0));
    assert!((hook.tick(1200.0) - 0.5).abs() < 1e-4);
    assert_eq!(calls.get(), 0, "callback must wait for the fade");
    assert_eq!(hook.tick(1400.0), 0.0);
    assert_eq!(calls.get(), 1);
    for i in 0..50 {
        hook.tick(1400.0 + i as f64 * 16.0);
        hook.trigger(1400.0 + i as f64 * 16.0);
    }
    assert_eq!(calls.get(), 1);
    assert_eq!(hook.state(), CompletionState::Done);
}

#[test]
fn repeated_triggers_do_not_restart_the_fade() {
    let (mut hook, _) = counting_hook(100.0);
    assert!(hook.trigger(0.0));
    assert!(!hook.trigger(90.0));
    assert_eq!(hook.tick(100.0), 0.0);
    assert!(hook.is_done());
}

#[test]
fn missing_callback_still_fades() {
    let mut hook = CompletionHook::new(50.0, None);
    hook.trigger(0.0);
    assert_eq!(hook.tick(60.0), 0.0);
    assert!(hook.is_done());
}

#[test]
fn zero_fade_completes_on_first_tick() {
    let (mut hook, calls) = counting_hook(0.0);
    hook.trigger(10.0);
    assert_eq!(hook.tick(10.0), 0.0);
    assert_eq!(calls.get(), 1);
}

#[test]
fn cancel_drops_the_callback() {
    let (mut hook, calls) = counting_hook(100.0);
    hook.trigger(0.0);
    hook.cancel();
    hook.tick(500.0);
    assert_eq!(calls.get(), 0);
    assert!(hook.is_done());
}
