// Host-side tests for the DOM contract and tuning constants.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
fn element_ids_are_distinct_and_non_empty() {
    let ids = [
        CANVAS_ID,
        LOADER_ROOT_ID,
        PROGRESS_FILL_ID,
        PERCENT_ID,
        PHASE_LABEL_ID,
        PHASE_ICON_ID,
        CONTACT_FORM_ID,
        CONTACT_STATUS_ID,
    ];
    for (i, a) in ids.iter().enumerate() {
        assert!(!a.is_empty());
        assert!(!a.contains(' '), "id {:?} must not contain spaces", a);
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn icon_table_has_unique_lowercase_keys() {
    for (i, (key, glyph)) in ICON_GLYPHS.iter().enumerate() {
        assert_eq!(*key, key.to_ascii_lowercase());
        assert!(!glyph.is_empty());
        assert!(ICON_GLYPHS[i + 1..].iter().all(|(k, _)| k != key));
    }
}

#[test]
fn default_phase_icons_have_glyphs() {
    for icon in ["satellite", "orbit", "sparkles", "rocket"] {
        assert!(
            ICON_GLYPHS.iter().any(|(k, _)| *k == icon),
            "missing glyph for {}",
            icon
        );
    }
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn frame_limits_are_sane() {
    assert!(MAX_DEVICE_PIXEL_RATIO >= 1.0);
    assert!(MAX_FRAME_DT_SEC > 1.0 / 60.0);
    assert!(MAX_FRAME_DT_SEC <= 0.25);
}
