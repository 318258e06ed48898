//! One mounted reveal: progress, phases, starfield, constellations and the
//! exit fade, advanced together once per animation frame.

use crate::completion::{CompletionHook, CompletionState};
use crate::config::RevealConfig;
use crate::constants::{CONSTELLATION_DEPTH, OVERLAY_PARALLAX_FACTOR, PICK_SPHERE_RADIUS};
use crate::constellation::{
    Constellation, ConstellationFrame, ConstellationSequencer, SequencerEvent,
};
use crate::error::ConfigError;
use crate::field::ParticleField;
use crate::motion::FieldMotion;
use crate::phase::{Phase, PhaseTracker};
use crate::pick::pick_vertex;
use crate::progress::ProgressDriver;
use glam::{Mat4, Vec2, Vec3};
use smallvec::SmallVec;

/// Host input sampled for one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub dt_sec: f32,
    /// Pointer in normalized device coordinates, +y up.
    pub pointer_ndc: Vec2,
    pub scroll_px: f32,
}

#[derive(Clone, Debug)]
pub struct FrameOutput {
    pub progress: f32,
    /// Set only on frames where the selected phase changed.
    pub phase_changed: Option<usize>,
    pub overlay_opacity: f32,
    pub field_model: Mat4,
    pub overlay_model: Mat4,
    pub constellations: SmallVec<[ConstellationFrame; 2]>,
    /// True once the exit fade has finished and the hook has fired.
    pub completed: bool,
    /// False once there is nothing left to animate; stop scheduling.
    pub running: bool,
}

pub struct RevealController {
    config: RevealConfig,
    driver: ProgressDriver,
    phases: PhaseTracker,
    field: ParticleField,
    motion: FieldMotion,
    sequencer: ConstellationSequencer,
    completion: CompletionHook,
    unmounted: bool,
}

impl RevealController {
    pub fn new(
        config: RevealConfig,
        on_loaded: Option<Box<dyn FnOnce()>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let driver = ProgressDriver::new(config.duration_ms, config.easing, config.jitter)?;
        let field = ParticleField::generate(&config.field, &config.palette, config.seed);
        let motion = FieldMotion::new(config.motion.clone());
        let sequencer = ConstellationSequencer::new(
            config.constellations.clone(),
            config.constellation_fade_ms,
            config.pulse_ms,
        );
        let completion = CompletionHook::new(config.fade_out_ms, on_loaded);
        log::info!(
            "[loader] {} stars, {} phases, {} constellations, {} ms",
            field.len(),
            config.phases.len(),
            config.constellations.len(),
            config.duration_ms
        );
        Ok(Self {
            config,
            driver,
            phases: PhaseTracker::default(),
            field,
            motion,
            sequencer,
            completion,
            unmounted: false,
        })
    }

    pub fn start(&mut self, now_ms: f64) {
        self.driver.start(now_ms);
    }

    /// Swap in an externally supplied constellation set. Reveal state restarts
    /// for the new set; progress is unaffected.
    pub fn replace_constellations(&mut self, list: Vec<Constellation>) -> Result<(), ConfigError> {
        for c in &list {
            c.validate()?;
        }
        self.sequencer.unmount();
        self.config.constellations = list.clone();
        self.sequencer = ConstellationSequencer::new(
            list,
            self.config.constellation_fade_ms,
            self.config.pulse_ms,
        );
        Ok(())
    }

    pub fn tick(&mut self, now_ms: f64, input: FrameInput) -> FrameOutput {
        if self.unmounted {
            return FrameOutput {
                progress: self.driver.value(),
                phase_changed: None,
                overlay_opacity: 0.0,
                field_model: self.motion.model_matrix(),
                overlay_model: self.overlay_model(),
                constellations: SmallVec::new(),
                completed: self.completion.is_done(),
                running: false,
            };
        }

        let tick = self.driver.tick(now_ms);
        if tick.finished_now {
            self.completion.trigger(now_ms);
        }

        let phase_changed = self.phases.update(tick.value, self.config.phases.len());
        if let Some(i) = phase_changed {
            log::info!("[phase] {} -> {}", i, self.config.phases[i].label);
        }

        for ev in self.sequencer.update(tick.value, now_ms) {
            if let SequencerEvent::FadeOutCompleted { index, .. } = ev {
                log::debug!(
                    "[constellation] {} hidden",
                    self.sequencer.constellations()[index].name
                );
            }
        }

        self.motion
            .step(input.dt_sec, input.pointer_ndc, input.scroll_px);
        let overlay_opacity = self.completion.tick(now_ms);
        let completed = self.completion.is_done();

        FrameOutput {
            progress: tick.value,
            phase_changed,
            overlay_opacity,
            field_model: self.motion.model_matrix(),
            overlay_model: self.overlay_model(),
            constellations: self.sequencer.frames(),
            completed,
            running: !completed || self.config.hold_after_complete,
        }
    }

    /// Hover test against the constellation currently on screen. A hit
    /// starts a vertex pulse and is reported as `(constellation, vertex)`.
    pub fn hover(&mut self, ray_origin: Vec3, ray_dir: Vec3, now_ms: f64) -> Option<(usize, usize)> {
        let ci = self.sequencer.active()?;
        let range = self.sequencer.draw_range(ci);
        let points = &self.sequencer.constellations()[ci].points;
        let vi = pick_vertex(
            ray_origin,
            ray_dir,
            &points[..range.min(points.len())],
            self.overlay_model(),
            PICK_SPHERE_RADIUS,
        )?;
        self.sequencer.pulse(ci, vi, now_ms).then_some((ci, vi))
    }

    pub fn overlay_model(&self) -> Mat4 {
        Mat4::from_translation(
            Vec3::new(0.0, 0.0, CONSTELLATION_DEPTH) + self.motion.offset() * OVERLAY_PARALLAX_FACTOR,
        )
    }

    /// Release per-mount state. The completion callback is dropped if it has
    /// not fired yet.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        self.sequencer.unmount();
        self.completion.cancel();
        log::info!("[loader] unmounted at {:.1}%", self.driver.value());
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.driver.value()
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases.current().and_then(|i| self.config.phases.get(i))
    }

    #[inline]
    pub fn phases(&self) -> &[Phase] {
        &self.config.phases
    }

    #[inline]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    #[inline]
    pub fn sequencer(&self) -> &ConstellationSequencer {
        &self.sequencer
    }

    #[inline]
    pub fn completion_state(&self) -> CompletionState {
        self.completion.state()
    }

    #[inline]
    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    #[inline]
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }
}
