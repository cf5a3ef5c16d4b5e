//! Compositor — combines equal-length traces by sum or mean.

use serde::{Deserialize, Serialize};

use crate::error::CompositeError;

/// How a composite channel combines its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionPolicy {
    /// Element-wise average.
    #[default]
    Mean,
    /// Raw superposition.
    Sum,
}

impl CompositionPolicy {
    pub fn combine<A: AsRef<[f64]>>(&self, arrays: &[A]) -> Result<Vec<f64>, CompositeError> {
        match self {
            CompositionPolicy::Mean => mean(arrays),
            CompositionPolicy::Sum => sum(arrays),
        }
    }
}

/// Element-wise sum of all inputs.
pub fn sum<A: AsRef<[f64]>>(arrays: &[A]) -> Result<Vec<f64>, CompositeError> {
    let (first, rest) = arrays.split_first().ok_or(CompositeError::Degenerate)?;
    let mut out = first.as_ref().to_vec();
    for (i, array) in rest.iter().enumerate() {
        let array = array.as_ref();
        if array.len() != out.len() {
            return Err(CompositeError::LengthMismatch {
                expected: out.len(),
                found: array.len(),
                index: i + 1,
            });
        }
        for (acc, &s) in out.iter_mut().zip(array) {
            *acc += s;
        }
    }
    Ok(out)
}

/// Element-wise arithmetic mean of all inputs.
pub fn mean<A: AsRef<[f64]>>(arrays: &[A]) -> Result<Vec<f64>, CompositeError> {
    let mut out = sum(arrays)?;
    let count = arrays.len() as f64;
    for s in out.iter_mut() {
        *s /= count;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_two() {
        let out = mean(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(out, vec![2.0, 3.0]);
    }

    #[test]
    fn sum_of_two() {
        let out = sum(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(out, vec![4.0, 6.0]);
    }

    #[test]
    fn single_input_passes_through() {
        let out = mean(&[[0.5, -0.25]]).unwrap();
        assert_eq!(out, vec![0.5, -0.25]);
    }

    #[test]
    fn length_mismatch_reported() {
        let err = sum(&[vec![1.0, 2.0], vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            CompositeError::LengthMismatch {
                expected: 2,
                found: 1,
                index: 2
            }
        );
    }

    #[test]
    fn no_inputs_is_degenerate() {
        let empty: [Vec<f64>; 0] = [];
        assert_eq!(mean(&empty).unwrap_err(), CompositeError::Degenerate);
        assert_eq!(sum(&empty).unwrap_err(), CompositeError::Degenerate);
    }

    #[test]
    fn policy_dispatch() {
        let inputs = [vec![2.0], vec![4.0]];
        assert_eq!(CompositionPolicy::Sum.combine(&inputs).unwrap(), vec![6.0]);
        assert_eq!(CompositionPolicy::Mean.combine(&inputs).unwrap(), vec![3.0]);
        assert_eq!(CompositionPolicy::default(), CompositionPolicy::Mean);
    }
}
