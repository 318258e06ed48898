/// DOM contract with the hosting page.
///
/// Every element is optional; a missing element simply is not updated.
pub const CANVAS_ID: &str = "zodiac-canvas";
pub const LOADER_ROOT_ID: &str = "zodiac-loader";
pub const PROGRESS_FILL_ID: &str = "zodiac-progress";
pub const PERCENT_ID: &str = "zodiac-percent";
pub const PHASE_LABEL_ID: &str = "zodiac-phase-label";
pub const PHASE_ICON_ID: &str = "zodiac-phase-icon";
pub const CONTACT_FORM_ID: &str = "contact-form";
pub const CONTACT_STATUS_ID: &str = "contact-status";

/// Class toggled on the loader root once the exit fade has finished.
pub const HIDDEN_CLASS: &str = "hidden";

// Icon keys recognised by the overlay; anything else falls back to the dot
pub const ICON_GLYPHS: &[(&str, &str)] = &[
    ("satellite", "🛰"),
    ("orbit", "🪐"),
    ("sparkles", "✨"),
    ("rocket", "🚀"),
    ("star", "★"),
    ("moon", "☾"),
    ("telescope", "🔭"),
];
pub const FALLBACK_GLYPH: &str = "•";

// Status copy for the contact form
pub const STATUS_SUBMITTING: &str = "Sending…";
pub const STATUS_SUCCESS: &str = "Thanks! We'll be in touch.";
pub const STATUS_ERROR_PREFIX: &str = "Could not send: ";

// Canvas backing store is capped to keep fill rate sane on 3x displays
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

// Largest frame step fed to the controller after a background-tab stall
pub const MAX_FRAME_DT_SEC: f32 = 0.1;
