use serde::{Deserialize, Serialize};

/// Time-to-progress curves available to the progress driver.
///
/// Every curve maps `0 -> 0` and `1 -> 1` and is non-decreasing in between,
/// so progress stays monotonic whichever curve is picked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicOut,
}

impl Easing {
    /// Evaluate the curve at `t`, clamped to `[0, 1]`.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicOut => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicOut,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for e in ALL {
            assert_eq!(e.apply(0.0), 0.0, "{e:?} at 0");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-6, "{e:?} at 1");
        }
    }

    #[test]
    fn curves_are_non_decreasing() {
        for e in ALL {
            let mut prev = e.apply(0.0);
            for i in 1..=200 {
                let v = e.apply(i as f32 / 200.0);
                assert!(v + 1e-6 >= prev, "{e:?} decreased at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(Easing::QuadIn.apply(-3.0), 0.0);
        assert!((Easing::QuadOut.apply(7.0) - 1.0).abs() < 1e-6);
        assert_eq!(Easing::CubicOut.apply(f32::NAN), 0.0);
    }
}
