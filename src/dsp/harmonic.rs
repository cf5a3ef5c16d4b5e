//! Harmonic analysis of a captured stroke.
//!
//! The dense stroke is treated as one period of a periodic signal. Each
//! of the first N harmonics is correlated against a sine and a cosine
//! basis with the trapezoidal rule; the strongest components become
//! generator configurations.

use std::cmp::Ordering;
use std::f64::consts::PI;

use log::debug;
use serde::Serialize;

use super::oscillator::{SineParams, usin};
use super::stroke::StrokeBuffer;

/// Number of harmonics analysed when no count is configured.
pub const DEFAULT_HARMONIC_COUNT: usize = 16;

/// One sinusoid in scaled units: radians per pixel, unit amplitude, radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HarmonicComponent {
    /// Harmonic index, 1-based.
    pub harmonic: usize,
    /// Whether this came from the cosine basis.
    pub cosine: bool,
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: f64,
}

impl HarmonicComponent {
    /// Convert to generator control units.
    pub fn to_params(&self) -> SineParams {
        usin(self.frequency, self.amplitude, self.phase)
    }
}

/// Trapezoidal approximation of `∫ dense(x) · trig(2π·harmonic·x / L) dx`
/// over the buffer. Endpoints are weighted by ½. Zero for an empty buffer.
pub fn correlate(dense: &[f64], use_cosine: bool, harmonic: usize) -> f64 {
    let len = dense.len();
    if len == 0 {
        return 0.0;
    }
    let w = 2.0 * PI * harmonic as f64 / len as f64;
    let last = len - 1;
    dense
        .iter()
        .enumerate()
        .map(|(x, &v)| {
            let arg = w * x as f64;
            let basis = if use_cosine { arg.cos() } else { arg.sin() };
            let weight = if x == 0 || x == last { 0.5 } else { 1.0 };
            weight * v * basis
        })
        .sum()
}

/// All `2 × harmonic_count` components of `dense`, strongest first.
///
/// `origin` is the absolute pixel of `dense[0]`; phases are shifted so
/// the components line up with absolute pixel positions.
pub fn candidates(dense: &[f64], origin: i64, harmonic_count: usize) -> Vec<HarmonicComponent> {
    if dense.is_empty() {
        return Vec::new();
    }
    let c = 2.0 / dense.len() as f64;
    let origin = origin as f64;
    let mut out = Vec::with_capacity(2 * harmonic_count);
    for j in 1..=harmonic_count {
        let frequency = j as f64 * PI * c;
        out.push(HarmonicComponent {
            harmonic: j,
            cosine: true,
            frequency,
            amplitude: c * correlate(dense, true, j),
            phase: PI / 2.0 - origin * frequency,
        });
        out.push(HarmonicComponent {
            harmonic: j,
            cosine: false,
            frequency,
            amplitude: c * correlate(dense, false, j),
            phase: -origin * frequency,
        });
    }
    out.sort_by(|a, b| {
        b.amplitude
            .abs()
            .partial_cmp(&a.amplitude.abs())
            .unwrap_or(Ordering::Equal)
    });
    out
}

/// Generator configurations for the `targets` strongest components of a
/// stroke, in rank order. `None` when nothing has been drawn, so callers
/// leave their generators untouched.
pub fn extract(stroke: &StrokeBuffer, harmonic_count: usize, targets: usize) -> Option<Vec<SineParams>> {
    let origin = stroke.origin()?;
    if stroke.is_empty() {
        return None;
    }
    let ranked = candidates(stroke.dense(), origin, harmonic_count);
    if let Some(top) = ranked.first() {
        debug!(
            "strongest harmonic {} ({}) amplitude {:.4} over {} samples",
            top.harmonic,
            if top.cosine { "cos" } else { "sin" },
            top.amplitude,
            stroke.dense().len()
        );
    }
    Some(
        ranked
            .iter()
            .take(targets)
            .map(HarmonicComponent::to_params)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::generate;
    use approx::assert_abs_diff_eq;

    fn harmonic_sine(harmonic: usize, len: usize) -> Vec<f64> {
        (0..len)
            .map(|x| (2.0 * PI * harmonic as f64 * x as f64 / len as f64).sin())
            .collect()
    }

    fn stroke_from(origin: i64, dense: &[f64]) -> StrokeBuffer {
        StrokeBuffer::from_sparse(origin, dense.iter().copied().map(Some).collect())
    }

    #[test]
    fn correlate_empty_is_zero() {
        assert_eq!(correlate(&[], true, 3), 0.0);
        assert_eq!(correlate(&[], false, 1), 0.0);
    }

    #[test]
    fn correlate_weights_endpoints() {
        // harmonic 0 makes the cosine basis constant 1
        let sum = correlate(&[2.0, 2.0, 2.0, 2.0], true, 0);
        assert_eq!(sum, 1.0 + 2.0 + 2.0 + 1.0);
    }

    #[test]
    fn ranks_pure_harmonic_first() {
        let dense = harmonic_sine(3, 120);
        let stroke = stroke_from(0, &dense);

        let ranked = candidates(stroke.dense(), 0, 8);
        assert_eq!(ranked.len(), 16);
        let top = ranked[0];
        assert_eq!(top.harmonic, 3);
        assert!(!top.cosine, "sine basis should win");
        assert_abs_diff_eq!(top.amplitude, 1.0, epsilon = 1e-2);
        assert_abs_diff_eq!(top.frequency, 2.0 * PI * 3.0 / 120.0, epsilon = 1e-12);
        for other in &ranked[1..] {
            assert!(other.amplitude.abs() < 2e-2, "leakage too high: {other:?}");
        }

        let params = extract(&stroke, 8, 2).unwrap();
        assert_eq!(params.len(), 2);
        assert_abs_diff_eq!(params[0].amplitude, 100.0, epsilon = 1.0);
        assert_abs_diff_eq!(params[0].phase_degrees, 0.0, epsilon = 1e-9);
        assert!(params[1].amplitude.abs() < 2.0);
    }

    #[test]
    fn cosine_component_gets_quarter_turn() {
        let dense: Vec<f64> = (0..90)
            .map(|x| 0.5 * (2.0 * PI * 2.0 * x as f64 / 90.0).cos())
            .collect();
        let ranked = candidates(&dense, 0, 4);
        assert!(ranked[0].cosine);
        assert_eq!(ranked[0].harmonic, 2);
        assert_abs_diff_eq!(ranked[0].amplitude, 0.5, epsilon = 2e-2);
        assert_abs_diff_eq!(ranked[0].phase, PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn origin_shift_realigns_phase() {
        // a stroke drawn from pixel 25 that is exactly one harmonic-1 period
        let len = 100;
        let origin = 25;
        let dense = harmonic_sine(1, len);
        let params = extract(&stroke_from(origin, &dense), 4, 1).unwrap();
        let regenerated = params[0].generate(origin as usize + len);
        for (k, &v) in dense.iter().enumerate() {
            assert_abs_diff_eq!(regenerated[origin as usize + k], v, epsilon = 2e-2);
        }
    }

    #[test]
    fn extract_from_generated_wave() {
        let len = 200;
        // one period of harmonic 4 at 60% amplitude
        let freq_raw = 2.0 * PI * 4.0 / len as f64 / 1e-4;
        let dense = generate(freq_raw, 60.0, 0.0, len);
        let params = extract(&stroke_from(0, &dense), 8, 1).unwrap();
        assert_abs_diff_eq!(params[0].frequency, freq_raw, epsilon = 1e-6);
        assert_abs_diff_eq!(params[0].amplitude, 60.0, epsilon = 1.0);
    }

    #[test]
    fn extract_empty_is_none() {
        assert_eq!(extract(&StrokeBuffer::new(), 8, 3), None);
        let mut cleared = stroke_from(0, &[0.1, 0.2]);
        cleared.clear();
        assert_eq!(extract(&cleared, 8, 3), None);
    }

    #[test]
    fn keeps_at_most_all_candidates() {
        let dense = harmonic_sine(1, 32);
        let params = extract(&stroke_from(0, &dense), 2, 10).unwrap();
        assert_eq!(params.len(), 4);
    }
}
