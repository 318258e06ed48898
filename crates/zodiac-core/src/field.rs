//! Starfield generation.
//!
//! Stars are sampled once per mount from a seeded RNG. Colour and size come
//! from a weighted band table: one draw picks the band, further draws
//! interpolate inside the band's colour and size ranges.

use crate::constants::{DEFAULT_STAR_COUNT, FIELD_INNER_RADIUS, FIELD_OUTER_RADIUS, MAX_STAR_COUNT};
use crate::error::ConfigError;
use glam::Vec3;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarBand {
    /// Relative weight; the table normalizes weights, so they need not sum to 1.
    pub weight: f32,
    pub color_min: [f32; 3],
    pub color_max: [f32; 3],
    pub size_min: f32,
    pub size_max: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarPalette {
    pub bands: Vec<StarBand>,
}

impl Default for StarPalette {
    fn default() -> Self {
        Self {
            bands: vec![
                // rare bright
                StarBand {
                    weight: 0.05,
                    color_min: [0.90, 0.93, 1.00],
                    color_max: [1.00, 1.00, 1.00],
                    size_min: 2.5,
                    size_max: 4.0,
                },
                // uncommon blue-white
                StarBand {
                    weight: 0.25,
                    color_min: [0.55, 0.65, 0.95],
                    color_max: [0.80, 0.85, 1.00],
                    size_min: 1.2,
                    size_max: 2.2,
                },
                // common dim
                StarBand {
                    weight: 0.70,
                    color_min: [0.22, 0.26, 0.45],
                    color_max: [0.45, 0.50, 0.70],
                    size_min: 0.5,
                    size_max: 1.0,
                },
            ],
        }
    }
}

impl StarPalette {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bands.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        for (index, b) in self.bands.iter().enumerate() {
            let ok = b.weight.is_finite()
                && b.weight >= 0.0
                && b.size_min.is_finite()
                && b.size_max.is_finite()
                && b.size_min >= 0.0
                && b.size_min <= b.size_max;
            if !ok {
                return Err(ConfigError::InvalidBand { index });
            }
        }
        if self.total_weight() <= 0.0 {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }

    #[inline]
    pub fn total_weight(&self) -> f32 {
        self.bands.iter().map(|b| b.weight.max(0.0)).sum()
    }

    /// Band selected by a uniform draw `u` in `[0, 1)`.
    pub fn band_for(&self, u: f32) -> usize {
        let target = u.clamp(0.0, 1.0) * self.total_weight();
        let mut acc = 0.0;
        for (i, b) in self.bands.iter().enumerate() {
            acc += b.weight.max(0.0);
            if target < acc {
                return i;
            }
        }
        // u == 1.0 or float round-off: last band with non-zero weight
        self.bands
            .iter()
            .rposition(|b| b.weight > 0.0)
            .unwrap_or(self.bands.len().saturating_sub(1))
    }

    /// Draw a colour and point size.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> (Vec3, f32) {
        let band = &self.bands[self.band_for(rng.gen::<f32>())];
        let t = rng.gen::<f32>();
        let color = Vec3::from(band.color_min).lerp(Vec3::from(band.color_max), t);
        let size = band.size_min + (band.size_max - band.size_min) * rng.gen::<f32>();
        (color, size)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub count: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_STAR_COUNT,
            inner_radius: FIELD_INNER_RADIUS,
            outer_radius: FIELD_OUTER_RADIUS,
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 || self.count > MAX_STAR_COUNT {
            return Err(ConfigError::ParticleCount(self.count));
        }
        let (inner, outer) = (self.inner_radius, self.outer_radius);
        if !(inner.is_finite() && outer.is_finite() && inner >= 0.0 && inner < outer) {
            return Err(ConfigError::FieldRadii { inner, outer });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub color: Vec3,
    pub size: f32,
}

/// GPU-facing layout of one star, shared by both renderers.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarInstance {
    pub pos: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    pub particles: Vec<Particle>,
}

impl ParticleField {
    pub fn generate(config: &FieldConfig, palette: &StarPalette, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let r0 = config.inner_radius.powi(3);
        let r1 = config.outer_radius.powi(3);
        let particles = (0..config.count)
            .map(|_| {
                // uniform in the shell volume
                let r = (r0 + (r1 - r0) * rng.gen::<f32>()).cbrt();
                let z = rng.gen_range(-1.0_f32..=1.0);
                let phi = rng.gen::<f32>() * std::f32::consts::TAU;
                let s = (1.0 - z * z).max(0.0).sqrt();
                let position = Vec3::new(s * phi.cos(), s * phi.sin(), z) * r;
                let (color, size) = palette.sample(&mut rng);
                Particle {
                    position,
                    color,
                    size,
                }
            })
            .collect();
        Self { particles }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Pack for upload; `alpha` is applied uniformly (the exit fade).
    pub fn instances(&self, alpha: f32) -> Vec<StarInstance> {
        self.particles
            .iter()
            .map(|p| StarInstance {
                pos: p.position.to_array(),
                size: p.size,
                color: [p.color.x, p.color.y, p.color.z, alpha],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_lookup_follows_cumulative_weights() {
        let p = StarPalette::default();
        assert_eq!(p.band_for(0.0), 0);
        assert_eq!(p.band_for(0.049), 0);
        assert_eq!(p.band_for(0.051), 1);
        assert_eq!(p.band_for(0.31), 2);
        assert_eq!(p.band_for(1.0), 2);
    }

    #[test]
    fn zero_weight_bands_are_never_picked() {
        let mut p = StarPalette::default();
        p.bands[2].weight = 0.0;
        assert_eq!(p.band_for(0.999), 1);
        assert_eq!(p.band_for(1.0), 1);
    }

    #[test]
    fn validation_rejects_bad_tables() {
        assert_eq!(
            StarPalette { bands: vec![] }.validate(),
            Err(ConfigError::EmptyPalette)
        );
        let mut p = StarPalette::default();
        p.bands[1].size_min = 5.0;
        assert_eq!(p.validate(), Err(ConfigError::InvalidBand { index: 1 }));
        let mut p = StarPalette::default();
        for b in &mut p.bands {
            b.weight = 0.0;
        }
        assert_eq!(p.validate(), Err(ConfigError::EmptyPalette));
    }
}
