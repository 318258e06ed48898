//! Wall-clock progress driver.
//!
//! The driver turns timestamps into a 0..=100 progress value. It never reports
//! a value lower than the previous one, and it reports exactly 100 once the
//! configured duration has elapsed, flagging that tick as the completion tick.

use crate::constants::PROGRESS_RUNNING_CEILING;
use crate::easing::Easing;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Small sinusoidal wobble layered on top of the eased progress.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Jitter {
    /// Peak offset in progress points.
    pub amplitude: f32,
    pub frequency_hz: f32,
}

impl Jitter {
    #[inline]
    pub fn offset(&self, now_ms: f64) -> f32 {
        let phase = now_ms / 1000.0 * self.frequency_hz as f64 * std::f64::consts::TAU;
        phase.sin() as f32 * self.amplitude
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.amplitude.is_finite() && self.amplitude >= 0.0 && self.frequency_hz.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::InvalidJitter)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressTick {
    pub value: f32,
    /// True only on the tick that first reached 100.
    pub finished_now: bool,
}

#[derive(Clone, Debug)]
pub struct ProgressDriver {
    duration_ms: f64,
    easing: Easing,
    jitter: Option<Jitter>,
    start_ms: Option<f64>,
    last: f32,
    finished: bool,
}

impl ProgressDriver {
    pub fn new(
        duration_ms: f64,
        easing: Easing,
        jitter: Option<Jitter>,
    ) -> Result<Self, ConfigError> {
        if !(duration_ms.is_finite() && duration_ms > 0.0) {
            return Err(ConfigError::NonPositiveDuration(duration_ms));
        }
        if let Some(j) = &jitter {
            j.validate()?;
        }
        Ok(Self {
            duration_ms,
            easing,
            jitter,
            start_ms: None,
            last: 0.0,
            finished: false,
        })
    }

    /// Anchor the sweep at `now_ms`. Ticks before any call to `start` anchor
    /// on their own timestamp.
    pub fn start(&mut self, now_ms: f64) {
        self.start_ms = Some(now_ms);
    }

    pub fn tick(&mut self, now_ms: f64) -> ProgressTick {
        if self.finished {
            return ProgressTick {
                value: 100.0,
                finished_now: false,
            };
        }
        let start = *self.start_ms.get_or_insert(now_ms);
        let elapsed = (now_ms - start).max(0.0);
        if elapsed >= self.duration_ms {
            self.finished = true;
            self.last = 100.0;
            return ProgressTick {
                value: 100.0,
                finished_now: true,
            };
        }

        let t = (elapsed / self.duration_ms) as f32;
        let mut value = self.easing.apply(t) * 100.0;
        if let Some(j) = &self.jitter {
            value += j.offset(now_ms);
        }
        let value = value.max(self.last).min(PROGRESS_RUNNING_CEILING);
        self.last = value;
        ProgressTick {
            value,
            finished_now: false,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.last
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_durations() {
        for d in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(ProgressDriver::new(d, Easing::Linear, None).is_err(), "{d}");
        }
    }

    #[test]
    fn first_tick_anchors_start() {
        let mut p = ProgressDriver::new(1000.0, Easing::Linear, None).unwrap();
        assert_eq!(p.tick(5_000.0).value, 0.0);
        let v = p.tick(5_500.0).value;
        assert!((v - 50.0).abs() < 1e-3);
    }

    #[test]
    fn clock_going_backwards_does_not_reduce_progress() {
        let mut p = ProgressDriver::new(1000.0, Easing::Linear, None).unwrap();
        p.start(0.0);
        let a = p.tick(600.0).value;
        let b = p.tick(300.0).value;
        assert!(b >= a);
    }
}
