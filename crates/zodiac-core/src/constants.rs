// Shared visual/timing tuning constants used by both web and native frontends.

// Reveal timing
pub const DEFAULT_DURATION_MS: f64 = 4500.0; // full 0..100 sweep of the loading screen
pub const DEFAULT_FADE_OUT_MS: f64 = 800.0; // exit fade before handing off to the page
pub const DEFAULT_CONSTELLATION_FADE_MS: f64 = 600.0; // one leg of a constellation crossfade
pub const DEFAULT_PULSE_MS: f64 = 450.0; // lifetime of a hover pulse on a vertex

// Jitter used by the loading screen preset
pub const DEFAULT_JITTER_AMPLITUDE: f32 = 1.5; // progress points
pub const DEFAULT_JITTER_FREQUENCY_HZ: f32 = 0.8;

// Progress ceiling while still running; 100 is reserved for completion
pub const PROGRESS_RUNNING_CEILING: f32 = 99.9;

// Starfield layout
pub const DEFAULT_STAR_COUNT: usize = 6000;
pub const MAX_STAR_COUNT: usize = 200_000;
pub const FIELD_INNER_RADIUS: f32 = 8.0;
pub const FIELD_OUTER_RADIUS: f32 = 40.0;
pub const STAR_SIZE_SCALE: f32 = 0.05; // world units per unit of star size

// Field motion
pub const ROTATION_SPEED_RAD_PER_SEC: f32 = 0.03;
pub const POINTER_PARALLAX: f32 = 0.6; // world units at full pointer deflection
pub const SCROLL_PARALLAX: f32 = 0.002; // world units per scrolled pixel
pub const PARALLAX_SMOOTHING: f32 = 0.05; // per 60 Hz frame
pub const REFERENCE_FRAME_SEC: f32 = 1.0 / 60.0;
pub const MAX_FRAME_DT_SEC: f32 = 0.1; // longer gaps (stalls, window drags) count as this

// Constellation visuals
pub const CONSTELLATION_DEPTH: f32 = -6.0; // z plane the overlay is drawn on
pub const OVERLAY_PARALLAX_FACTOR: f32 = 0.5; // overlay follows the field parallax at this rate
pub const VERTEX_BASE_SCALE: f32 = 0.12;
pub const VERTEX_PULSE_SCALE: f32 = 0.5; // extra scale at full pulse
pub const VERTEX_BASE_ALPHA: f32 = 0.65; // dot opacity at rest; a full pulse reaches 1
pub const PICK_SPHERE_RADIUS: f32 = 0.25; // ray-sphere radius for vertex hover

// Camera
pub const CAMERA_Z: f32 = 6.0;
pub const CAMERA_FOVY_RAD: f32 = std::f32::consts::FRAC_PI_4;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 200.0;

// Contact form
pub const DEFAULT_SUBMIT_DELAY_MS: f64 = 1500.0;
pub const STATUS_DISPLAY_MS: f64 = 3000.0;

// Background clear colour (deep navy)
pub const CLEAR_COLOR: [f64; 3] = [0.01, 0.015, 0.04];
