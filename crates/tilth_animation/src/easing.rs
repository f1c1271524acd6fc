//! Easing curves
//!
//! Each curve maps normalized progress in `[0, 1]` to eased progress. Input
//! outside that range is clamped, so every curve starts at exactly 0 and
//! ends at exactly 1.

use serde::{Deserialize, Serialize};

/// Easing function applied to animation progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInQuart,
    /// `1 - (1 - t)^4`
    #[default]
    EaseOutQuart,
}

impl Easing {
    /// Apply the curve to progress `t`
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn | Easing::EaseInCubic => t * t * t,
            Easing::EaseOut | Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInQuart => t.powi(4),
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 10] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
    ];

    #[test]
    fn test_endpoints_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?}", easing);
        }
    }

    #[test]
    fn test_clamps_out_of_range() {
        assert_eq!(Easing::EaseOutQuart.apply(1.7), 1.0);
        assert_eq!(Easing::EaseOutQuart.apply(-0.2), 0.0);
    }

    #[test]
    fn test_ease_out_quart_values() {
        // 1 - 0.5^4
        assert!((Easing::EaseOutQuart.apply(0.5) - 0.9375).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut last = 0.0;
            for i in 0..=100 {
                let v = easing.apply(i as f64 / 100.0);
                assert!(v >= last, "{:?} decreased at step {}", easing, i);
                last = v;
            }
        }
    }
}
