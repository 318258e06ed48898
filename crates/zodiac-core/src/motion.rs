use crate::constants::{
    MAX_FRAME_DT_SEC, PARALLAX_SMOOTHING, POINTER_PARALLAX, REFERENCE_FRAME_SEC,
    ROTATION_SPEED_RAD_PER_SEC, SCROLL_PARALLAX,
};
use crate::error::ConfigError;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Radians per second about Y; X turns at half this rate.
    pub rotation_speed: f32,
    pub pointer_strength: f32,
    pub scroll_strength: f32,
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub smoothing: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            rotation_speed: ROTATION_SPEED_RAD_PER_SEC,
            pointer_strength: POINTER_PARALLAX,
            scroll_strength: SCROLL_PARALLAX,
            smoothing: PARALLAX_SMOOTHING,
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing));
        }
        Ok(())
    }
}

/// Whole-field transform: slow constant spin plus smoothed parallax.
#[derive(Clone, Debug)]
pub struct FieldMotion {
    config: MotionConfig,
    rotation: Vec2,
    offset: Vec3,
    target: Vec3,
}

impl FieldMotion {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            rotation: Vec2::ZERO,
            offset: Vec3::ZERO,
            target: Vec3::ZERO,
        }
    }

    /// `pointer_ndc` is the pointer in [-1, 1] with +y up; `scroll_px` is the
    /// page scroll offset.
    pub fn step(&mut self, dt_sec: f32, pointer_ndc: Vec2, scroll_px: f32) {
        let dt = dt_sec.max(0.0);
        self.rotation.y += self.config.rotation_speed * dt;
        self.rotation.x += self.config.rotation_speed * 0.5 * dt;

        let p = pointer_ndc.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        self.target = Vec3::new(
            p.x * self.config.pointer_strength,
            p.y * self.config.pointer_strength - scroll_px * self.config.scroll_strength,
            0.0,
        );
        let alpha = frame_rate_independent_alpha(self.config.smoothing, dt);
        self.offset += (self.target - self.offset) * alpha;
    }

    #[inline]
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    #[inline]
    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.offset)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x)
    }
}

/// Frame delta in seconds for `elapsed_ms` of wall time, clamped to
/// `[0, MAX_FRAME_DT_SEC]`.
#[inline]
pub fn frame_dt_sec(elapsed_ms: f64) -> f32 {
    ((elapsed_ms / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT_SEC)
}

/// Converts a per-reference-frame smoothing factor into the factor for `dt`.
#[inline]
fn frame_rate_independent_alpha(smoothing: f32, dt_sec: f32) -> f32 {
    let frames = dt_sec / REFERENCE_FRAME_SEC;
    (1.0 - (1.0 - smoothing).powf(frames)).clamp(0.0, 1.0)
}
