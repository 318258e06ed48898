use crate::constants::*;
use crate::constellation::{zodiac_set, Constellation};
use crate::easing::Easing;
use crate::error::ConfigError;
use crate::field::{FieldConfig, StarPalette};
use crate::motion::MotionConfig;
use crate::phase::Phase;
use crate::progress::Jitter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything that distinguishes one loader/backdrop variant from another.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub duration_ms: f64,
    pub easing: Easing,
    pub jitter: Option<Jitter>,
    pub fade_out_ms: f64,
    /// Keep the scene animating after the completion hook has fired.
    pub hold_after_complete: bool,
    /// Drive the page's `#zodiac-loader` progress overlay.
    pub show_overlay: bool,
    pub phases: Vec<Phase>,
    pub field: FieldConfig,
    pub palette: StarPalette,
    pub motion: MotionConfig,
    pub constellations: Vec<Constellation>,
    pub constellation_fade_ms: f64,
    pub pulse_ms: f64,
    pub seed: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self::loading_screen()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    LoadingScreen,
    HeroBackdrop,
}

impl RevealConfig {
    /// Full-screen loader shown before the page content.
    pub fn loading_screen() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            easing: Easing::QuadInOut,
            jitter: Some(Jitter {
                amplitude: DEFAULT_JITTER_AMPLITUDE,
                frequency_hz: DEFAULT_JITTER_FREQUENCY_HZ,
            }),
            fade_out_ms: DEFAULT_FADE_OUT_MS,
            hold_after_complete: false,
            show_overlay: true,
            phases: vec![
                Phase::new("satellite", "Calibrating star charts", [0.45, 0.70, 1.00]),
                Phase::new("orbit", "Aligning orbital vectors", [0.60, 0.55, 1.00]),
                Phase::new("sparkles", "Igniting constellations", [0.95, 0.70, 0.35]),
                Phase::new("rocket", "Launching Zodiac Dynamics", [0.40, 0.95, 0.75]),
            ],
            field: FieldConfig::default(),
            palette: StarPalette::default(),
            motion: MotionConfig::default(),
            constellations: zodiac_set(),
            constellation_fade_ms: DEFAULT_CONSTELLATION_FADE_MS,
            pulse_ms: DEFAULT_PULSE_MS,
            seed: 0x5EED_2D1A,
        }
    }

    /// Ambient hero background: slow sweep, no phase messages.
    pub fn hero_backdrop() -> Self {
        Self {
            duration_ms: 60_000.0,
            easing: Easing::Linear,
            jitter: None,
            fade_out_ms: 0.0,
            hold_after_complete: true,
            show_overlay: false,
            phases: Vec::new(),
            field: FieldConfig {
                count: 3000,
                ..FieldConfig::default()
            },
            motion: MotionConfig {
                rotation_speed: ROTATION_SPEED_RAD_PER_SEC * 0.5,
                ..MotionConfig::default()
            },
            constellation_fade_ms: DEFAULT_CONSTELLATION_FADE_MS * 2.0,
            ..Self::loading_screen()
        }
    }

    pub fn preset(p: Preset) -> Self {
        match p {
            Preset::LoadingScreen => Self::loading_screen(),
            Preset::HeroBackdrop => Self::hero_backdrop(),
        }
    }

    /// Parse a config object. An optional `"preset"` key picks the base the
    /// remaining keys are merged over; otherwise the loading screen is used.
    /// Nested objects merge key by key, arrays and scalars replace.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut overrides: Value = serde_json::from_str(json)?;
        let obj = overrides
            .as_object_mut()
            .ok_or_else(|| ConfigError::Json("expected a JSON object".into()))?;
        let preset = match obj.remove("preset") {
            Some(v) => serde_json::from_value::<Preset>(v)?,
            None => Preset::LoadingScreen,
        };
        let mut base = serde_json::to_value(Self::preset(preset))?;
        merge_json(&mut base, overrides);
        let cfg: Self = serde_json::from_value(base)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse an externally supplied `[{name, points}]` dataset.
    pub fn constellations_from_json(json: &str) -> Result<Vec<Constellation>, ConfigError> {
        let list: Vec<Constellation> = serde_json::from_str(json)?;
        for c in &list {
            c.validate()?;
        }
        Ok(list)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.duration_ms.is_finite() && self.duration_ms > 0.0) {
            return Err(ConfigError::NonPositiveDuration(self.duration_ms));
        }
        for (name, value) in [
            ("fade_out_ms", self.fade_out_ms),
            ("constellation_fade_ms", self.constellation_fade_ms),
            ("pulse_ms", self.pulse_ms),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidFade { name, value });
            }
        }
        if let Some(j) = &self.jitter {
            j.validate()?;
        }
        self.field.validate()?;
        self.palette.validate()?;
        self.motion.validate()?;
        for c in &self.constellations {
            c.validate()?;
        }
        Ok(())
    }
}

fn merge_json(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(b), Value::Object(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge_json(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        RevealConfig::loading_screen().validate().unwrap();
        RevealConfig::hero_backdrop().validate().unwrap();
    }

    #[test]
    fn empty_object_is_the_loading_screen() {
        let cfg = RevealConfig::from_json("{}").unwrap();
        assert_eq!(cfg, RevealConfig::loading_screen());
    }

    #[test]
    fn preset_key_selects_base() {
        let cfg = RevealConfig::from_json(r#"{"preset":"hero_backdrop","seed":7}"#).unwrap();
        assert!(cfg.phases.is_empty());
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.field.count, 3000);
    }

    #[test]
    fn nested_override_keeps_preset_siblings() {
        let hero = RevealConfig::hero_backdrop();
        let cfg =
            RevealConfig::from_json(r#"{"preset":"hero_backdrop","field":{"inner_radius":5.0}}"#)
                .unwrap();
        assert_eq!(cfg.field.inner_radius, 5.0);
        assert_eq!(cfg.field.count, hero.field.count);
        assert_eq!(cfg.field.outer_radius, hero.field.outer_radius);

        let cfg =
            RevealConfig::from_json(r#"{"preset":"hero_backdrop","motion":{"smoothing":0.1}}"#)
                .unwrap();
        assert_eq!(cfg.motion.smoothing, 0.1);
        assert_eq!(cfg.motion.rotation_speed, hero.motion.rotation_speed);
        assert!(cfg.hold_after_complete);
    }

    #[test]
    fn only_the_loading_screen_drives_the_overlay() {
        assert!(RevealConfig::loading_screen().show_overlay);
        assert!(!RevealConfig::hero_backdrop().show_overlay);
        let cfg =
            RevealConfig::from_json(r#"{"preset":"hero_backdrop","show_overlay":true}"#).unwrap();
        assert!(cfg.show_overlay);
    }

    #[test]
    fn arrays_replace_rather_than_merge() {
        let cfg = RevealConfig::from_json(
            r#"{"phases":[{"icon":"star","label":"Only","color":[1,1,1]}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.phases.len(), 1);
        assert_eq!(cfg.phases[0].label, "Only");
    }

    #[test]
    fn invalid_values_are_reported() {
        assert_eq!(
            RevealConfig::from_json(r#"{"duration_ms":0}"#),
            Err(ConfigError::NonPositiveDuration(0.0))
        );
        assert!(matches!(
            RevealConfig::from_json("[1,2]"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            RevealConfig::from_json(r#"{"field":{"count":0}}"#),
            Err(ConfigError::ParticleCount(0))
        ));
    }
}
