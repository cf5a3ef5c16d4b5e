//! Sine generator driven by raw control values.
//!
//! Controls arrive in widget units: frequency in 1e-4 radians per pixel,
//! amplitude in percent, phase in degrees. [`generate`] scales them and
//! samples one sine per pixel; [`usin`] maps scaled values back to widget
//! units so analysis results can be written into a generator.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Widget units per radian-per-pixel.
const FREQUENCY_SCALE: f64 = 1e-4;
/// Widget units per unit of amplitude.
const AMPLITUDE_SCALE: f64 = 1e-2;

/// A generator configuration in raw control units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SineParams {
    pub frequency: f64,
    pub amplitude: f64,
    pub phase_degrees: f64,
}

impl SineParams {
    pub fn new(frequency: f64, amplitude: f64, phase_degrees: f64) -> Self {
        SineParams {
            frequency,
            amplitude,
            phase_degrees,
        }
    }

    /// Sample this configuration over `length` pixels.
    pub fn generate(&self, length: usize) -> Vec<f64> {
        generate(self.frequency, self.amplitude, self.phase_degrees, length)
    }

    /// Scaled `(radians per pixel, amplitude, phase radians)`.
    pub fn scaled(&self) -> (f64, f64, f64) {
        (
            self.frequency * FREQUENCY_SCALE,
            self.amplitude * AMPLITUDE_SCALE,
            self.phase_degrees * PI / 180.0,
        )
    }
}

impl Default for SineParams {
    fn default() -> Self {
        SineParams::new(1000.0, 33.3, 0.0)
    }
}

/// `output[i] = a * sin(s + i * f)` with raw inputs scaled as described above.
pub fn generate(frequency: f64, amplitude: f64, phase_degrees: f64, length: usize) -> Vec<f64> {
    let (f, a, s) = SineParams::new(frequency, amplitude, phase_degrees).scaled();
    (0..length).map(|i| a * (s + i as f64 * f).sin()).collect()
}

/// Undo the control scaling. Phase comes back normalized into `[0, 360)`.
pub fn usin(f: f64, a: f64, s: f64) -> SineParams {
    SineParams {
        frequency: f / FREQUENCY_SCALE,
        amplitude: a / AMPLITUDE_SCALE,
        phase_degrees: normalize_degrees(s * 180.0 / PI),
    }
}

/// Euclidean modulo into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn empty_length() {
        assert!(generate(1000.0, 50.0, 0.0, 0).is_empty());
    }

    #[test]
    fn starts_at_phase() {
        let out = generate(1000.0, 100.0, 90.0, 4);
        assert_abs_diff_eq!(out[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], (PI / 2.0 + 0.1).sin(), epsilon = 1e-12);
    }

    #[test]
    fn amplitude_is_percent() {
        let out = generate(0.0, 250.0, 90.0, 3);
        assert!(out.iter().all(|&s| (s - 2.5).abs() < 1e-12), "got {out:?}");
    }

    #[test]
    fn matches_formula() {
        let out = generate(523.0, 47.0, 12.0, 100);
        let (f, a, s) = (523.0 * 1e-4, 47.0 * 1e-2, 12.0 * PI / 180.0);
        for (i, &v) in out.iter().enumerate() {
            assert_eq!(v, a * (s + i as f64 * f).sin());
        }
    }

    #[test]
    fn usin_round_trip() {
        for &(freq, amp, phase) in &[(1000.0, 33.3, 0.0), (1.0, -20.0, 359.5), (31415.0, 150.0, 180.0)] {
            let (f, a, s) = SineParams::new(freq, amp, phase).scaled();
            let back = usin(f, a, s);
            assert_abs_diff_eq!(back.frequency, freq, epsilon = 1e-9);
            assert_abs_diff_eq!(back.amplitude, amp, epsilon = 1e-9);
            assert_abs_diff_eq!(back.phase_degrees, phase, epsilon = 1e-9);
        }
    }

    #[test]
    fn usin_normalizes_phase() {
        let p = usin(0.1, 0.5, -PI / 2.0);
        assert_abs_diff_eq!(p.phase_degrees, 270.0, epsilon = 1e-9);
        let p = usin(0.1, 0.5, 5.0 * PI);
        assert_abs_diff_eq!(p.phase_degrees, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn normalize_never_returns_360() {
        let d = normalize_degrees(-1e-15);
        assert!((0.0..360.0).contains(&d), "got {d}");
    }
}
