//! Constellation overlay sequencing.
//!
//! Each constellation owns a progress band. The one whose band contains the
//! current progress is shown; switching bands fades the old one out and only
//! then fades the new one in. Vertices are revealed as progress crosses the
//! band, and the revealed count never shrinks.

use crate::error::ConfigError;
use crate::phase::phase_index;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constellation {
    pub name: String,
    pub points: Vec<Vec3>,
}

impl Constellation {
    pub fn new(name: &str, points: &[[f32; 2]]) -> Self {
        Self {
            name: name.to_owned(),
            points: points.iter().map(|p| Vec3::new(p[0], p[1], 0.0)).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points.len() < 2 || self.points.iter().any(|p| !p.is_finite()) {
            return Err(ConfigError::ShortConstellation(self.name.clone()));
        }
        Ok(())
    }
}

/// Default overlay: four zodiac figures, one per loading phase.
pub fn zodiac_set() -> Vec<Constellation> {
    vec![
        Constellation::new("Aries", &[[-2.0, 0.5], [-0.6, 0.9], [0.4, 0.6], [1.1, 0.1]]),
        Constellation::new(
            "Taurus",
            &[
                [-2.2, 1.4],
                [-1.0, 0.5],
                [-0.2, 0.0],
                [0.6, -0.3],
                [1.6, 0.4],
                [2.4, 1.2],
            ],
        ),
        Constellation::new(
            "Leo",
            &[
                [-1.8, -0.6],
                [-0.8, 0.4],
                [0.0, 1.0],
                [0.9, 1.4],
                [1.6, 0.9],
                [1.2, 0.2],
                [0.2, -0.2],
                [-1.8, -0.6],
            ],
        ),
        Constellation::new(
            "Scorpius",
            &[
                [-2.4, 1.2],
                [-1.6, 0.8],
                [-0.9, 0.3],
                [-0.2, -0.3],
                [0.4, -0.9],
                [1.2, -1.2],
                [1.9, -0.9],
                [2.2, -0.3],
            ],
        ),
    ]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Visibility {
    Hidden,
    FadingIn { since_ms: f64 },
    /// Steady; vertex pulses are accepted in this state.
    Visible,
    FadingOut { since_ms: f64, from: f32 },
}

/// Transitions reported by [`ConstellationSequencer::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SequencerEvent {
    FadeInStarted { index: usize, at_ms: f64 },
    FadeInCompleted { index: usize, at_ms: f64 },
    FadeOutStarted { index: usize, at_ms: f64 },
    FadeOutCompleted { index: usize, at_ms: f64 },
}

pub type SequencerEvents = SmallVec<[SequencerEvent; 4]>;

#[derive(Clone, Copy, Debug)]
struct SlotState {
    visibility: Visibility,
    opacity: f32,
    draw_range: usize,
}

#[derive(Clone, Copy, Debug)]
struct Pulse {
    constellation: usize,
    vertex: usize,
    started_ms: f64,
}

/// Per-frame draw data for one constellation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstellationFrame {
    pub index: usize,
    pub opacity: f32,
    /// Number of leading vertices to draw; segments are `draw_range - 1`.
    pub draw_range: usize,
}

pub struct ConstellationSequencer {
    constellations: Vec<Constellation>,
    slots: Vec<SlotState>,
    fade_ms: f64,
    pulse_ms: f64,
    active: Option<usize>,
    queued: Option<usize>,
    pulses: SmallVec<[Pulse; 8]>,
}

impl ConstellationSequencer {
    pub fn new(constellations: Vec<Constellation>, fade_ms: f64, pulse_ms: f64) -> Self {
        let slots = constellations
            .iter()
            .map(|_| SlotState {
                visibility: Visibility::Hidden,
                opacity: 0.0,
                draw_range: 0,
            })
            .collect();
        Self {
            constellations,
            slots,
            fade_ms,
            pulse_ms,
            active: None,
            queued: None,
            pulses: SmallVec::new(),
        }
    }

    #[inline]
    pub fn constellations(&self) -> &[Constellation] {
        &self.constellations
    }

    #[inline]
    pub fn visibility(&self, index: usize) -> Option<Visibility> {
        self.slots.get(index).map(|s| s.visibility)
    }

    #[inline]
    pub fn draw_range(&self, index: usize) -> usize {
        self.slots.get(index).map_or(0, |s| s.draw_range)
    }

    #[inline]
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn update(&mut self, progress: f32, now_ms: f64) -> SequencerEvents {
        let mut events = SequencerEvents::new();
        let n = self.constellations.len();
        let Some(target) = phase_index(progress, n) else {
            return events;
        };

        self.reveal(progress);
        self.advance(now_ms, &mut events);

        match self.active {
            None => self.begin_fade_in(target, now_ms, &mut events),
            Some(a) if a != target => match self.slots[a].visibility {
                Visibility::FadingOut { .. } => self.queued = Some(target),
                Visibility::Hidden => self.begin_fade_in(target, now_ms, &mut events),
                _ => {
                    let from = self.slots[a].opacity;
                    self.slots[a].visibility = Visibility::FadingOut {
                        since_ms: now_ms,
                        from,
                    };
                    self.queued = Some(target);
                    events.push(SequencerEvent::FadeOutStarted {
                        index: a,
                        at_ms: now_ms,
                    });
                    log::debug!("[constellation] fading out {}", self.constellations[a].name);
                }
            },
            Some(_) => {}
        }

        let pulse_ms = self.pulse_ms;
        self.pulses
            .retain(|p| now_ms - p.started_ms < pulse_ms);
        events
    }

    fn reveal(&mut self, progress: f32) {
        let n = self.constellations.len() as f32;
        let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 100.0) };
        for (i, (c, slot)) in self
            .constellations
            .iter()
            .zip(self.slots.iter_mut())
            .enumerate()
        {
            let lo = i as f32 * 100.0 / n;
            let hi = (i as f32 + 1.0) * 100.0 / n;
            let local = ((p - lo) / (hi - lo)).clamp(0.0, 1.0);
            let range = ((local * c.points.len() as f32).ceil() as usize).min(c.points.len());
            slot.draw_range = slot.draw_range.max(range);
        }
    }

    fn advance(&mut self, now_ms: f64, events: &mut SequencerEvents) {
        let Some(a) = self.active else { return };
        let fade = self.fade_ms;
        let fraction = |since: f64| {
            if fade <= 0.0 {
                1.0
            } else {
                ((now_ms - since) / fade).clamp(0.0, 1.0) as f32
            }
        };
        let slot = &mut self.slots[a];
        match slot.visibility {
            Visibility::FadingIn { since_ms } => {
                let f = fraction(since_ms);
                slot.opacity = f;
                if f >= 1.0 {
                    slot.visibility = Visibility::Visible;
                    events.push(SequencerEvent::FadeInCompleted {
                        index: a,
                        at_ms: now_ms,
                    });
                }
            }
            Visibility::FadingOut { since_ms, from } => {
                let f = fraction(since_ms);
                slot.opacity = from * (1.0 - f);
                if f >= 1.0 {
                    slot.visibility = Visibility::Hidden;
                    slot.opacity = 0.0;
                    events.push(SequencerEvent::FadeOutCompleted {
                        index: a,
                        at_ms: now_ms,
                    });
                    self.active = None;
                    if let Some(next) = self.queued.take() {
                        self.begin_fade_in(next, now_ms, events);
                    }
                }
            }
            Visibility::Visible | Visibility::Hidden => {}
        }
    }

    fn begin_fade_in(&mut self, index: usize, now_ms: f64, events: &mut SequencerEvents) {
        self.active = Some(index);
        self.queued = None;
        let slot = &mut self.slots[index];
        slot.visibility = Visibility::FadingIn { since_ms: now_ms };
        slot.opacity = 0.0;
        events.push(SequencerEvent::FadeInStarted {
            index,
            at_ms: now_ms,
        });
        log::info!(
            "[constellation] revealing {}",
            self.constellations[index].name
        );
    }

    /// Register a hover pulse on a revealed vertex. Returns false when the
    /// constellation is not on screen or the vertex is not drawn yet.
    pub fn pulse(&mut self, constellation: usize, vertex: usize, now_ms: f64) -> bool {
        let Some(slot) = self.slots.get(constellation) else {
            return false;
        };
        let on_screen = matches!(
            slot.visibility,
            Visibility::Visible | Visibility::FadingIn { .. }
        );
        if !on_screen || vertex >= slot.draw_range {
            return false;
        }
        if let Some(p) = self
            .pulses
            .iter_mut()
            .find(|p| p.constellation == constellation && p.vertex == vertex)
        {
            p.started_ms = now_ms;
        } else {
            self.pulses.push(Pulse {
                constellation,
                vertex,
                started_ms: now_ms,
            });
        }
        true
    }

    /// Pulse strength in [0, 1] for a vertex; decays linearly over `pulse_ms`.
    pub fn pulse_amount(&self, constellation: usize, vertex: usize, now_ms: f64) -> f32 {
        if self.pulse_ms <= 0.0 {
            return 0.0;
        }
        self.pulses
            .iter()
            .filter(|p| p.constellation == constellation && p.vertex == vertex)
            .map(|p| (1.0 - (now_ms - p.started_ms) / self.pulse_ms).clamp(0.0, 1.0) as f32)
            .fold(0.0, f32::max)
    }

    #[inline]
    pub fn active_pulses(&self) -> usize {
        self.pulses.len()
    }

    pub fn frames(&self) -> SmallVec<[ConstellationFrame; 2]> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.opacity > 0.0 && s.visibility != Visibility::Hidden)
            .map(|(index, s)| ConstellationFrame {
                index,
                opacity: s.opacity,
                draw_range: s.draw_range,
            })
            .collect()
    }

    /// Final teardown: everything hidden, pending work dropped.
    pub fn unmount(&mut self) {
        for s in &mut self.slots {
            s.visibility = Visibility::Hidden;
            s.opacity = 0.0;
        }
        self.active = None;
        self.queued = None;
        self.pulses.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zodiac_set_is_valid() {
        for c in zodiac_set() {
            c.validate().unwrap();
        }
    }

    #[test]
    fn single_point_constellation_is_rejected() {
        let c = Constellation::new("Dot", &[[0.0, 0.0]]);
        assert!(matches!(c.validate(), Err(ConfigError::ShortConstellation(_))));
    }

    #[test]
    fn pulses_expire() {
        let mut s = ConstellationSequencer::new(zodiac_set(), 0.0, 100.0);
        s.update(10.0, 0.0);
        s.update(10.0, 1.0);
        assert!(s.pulse(0, 0, 1.0));
        assert!(s.pulse_amount(0, 0, 51.0) > 0.4);
        s.update(10.0, 200.0);
        assert_eq!(s.active_pulses(), 0);
        assert_eq!(s.pulse_amount(0, 0, 200.0), 0.0);
    }
}
