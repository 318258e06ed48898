use serde::{Deserialize, Serialize};

/// One step of the loading choreography.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Glyph key the overlay maps to an icon ("rocket", "star", ...).
    pub icon: String,
    pub label: String,
    /// Linear RGB accent used for the bar and label.
    #[serde(default = "default_phase_color")]
    pub color: [f32; 3],
}

fn default_phase_color() -> [f32; 3] {
    [0.55, 0.75, 1.0]
}

impl Phase {
    pub fn new(icon: &str, label: &str, color: [f32; 3]) -> Self {
        Self {
            icon: icon.to_owned(),
            label: label.to_owned(),
            color,
        }
    }
}

/// Index of the slot `progress` falls in when `[0, 100]` is split into `len`
/// equal slots. The last slot also owns 100 itself.
#[inline]
pub fn phase_index(progress: f32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    // NaN and negatives land in the first slot
    let p = if progress.is_nan() { 0.0 } else { progress.max(0.0) };
    let raw = (p / 100.0 * len as f32).floor() as usize;
    Some(raw.min(len - 1))
}

#[inline]
pub fn select_phase(progress: f32, phases: &[Phase]) -> Option<&Phase> {
    phase_index(progress, phases.len()).map(|i| &phases[i])
}

/// Remembers the last selected index so callers only react to real changes.
#[derive(Clone, Debug, Default)]
pub struct PhaseTracker {
    current: Option<usize>,
}

impl PhaseTracker {
    /// Returns the new index when it differs from the previous update.
    pub fn update(&mut self, progress: f32, len: usize) -> Option<usize> {
        let idx = phase_index(progress, len);
        if idx != self.current {
            self.current = idx;
            idx
        } else {
            None
        }
    }

    #[inline]
    pub fn current(&self) -> Option<usize> {
        self.current
    }
}
