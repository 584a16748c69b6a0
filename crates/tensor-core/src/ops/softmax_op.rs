// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax and argmax over a logit vector.

use crate::TensorError;

/// Computes `probs[i] = exp(logits[i] - max) / sum(exp(logits - max))`.
///
/// The maximum is subtracted before exponentiation so large logits cannot
/// overflow single-precision `exp`.
///
/// # Errors
/// Returns [`TensorError::Empty`] for an empty input and
/// [`TensorError::BufferSizeMismatch`] if `probs` is not the same length.
pub fn softmax(logits: &[f32], probs: &mut [f32]) -> Result<(), TensorError> {
    if logits.is_empty() {
        return Err(TensorError::Empty { op: "softmax" });
    }
    if logits.len() != probs.len() {
        return Err(TensorError::BufferSizeMismatch {
            op: "softmax",
            expected: logits.len(),
            actual: probs.len(),
        });
    }

    let max_val = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let mut sum = 0.0f32;
    for (p, &l) in probs.iter_mut().zip(logits) {
        let e = (l - max_val).exp();
        *p = e;
        sum += e;
    }

    if sum > 0.0 {
        for p in probs.iter_mut() {
            *p /= sum;
        }
    }

    Ok(())
}

/// Returns the index and value of the largest element.
///
/// An index is only replaced by a strictly greater value, so among equal
/// maxima the earliest index wins. Returns `None` for an empty slice.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let (&first, rest) = values.split_first()?;
    let mut best = (0, first);
    for (i, &v) in rest.iter().enumerate() {
        if v > best.1 {
            best = (i + 1, v);
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &[f32], b: &[f32], tol: f32) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < tol)
    }

    #[test]
    fn test_softmax_uniform() {
        let mut probs = [0.0f32; 4];
        softmax(&[1.0, 1.0, 1.0, 1.0], &mut probs).unwrap();
        assert!(approx_eq(&probs, &[0.25; 4], 1e-6));
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let mut probs = [0.0f32; 5];
        softmax(&[1.0, 2.0, 3.0, 4.0, 5.0], &mut probs).unwrap();
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_softmax_shift_invariant() {
        let logits = [2.0f32, 1.0, 0.1, -1.0];
        let mut base = [0.0f32; 4];
        softmax(&logits, &mut base).unwrap();

        for shift in [-50.0f32, -1.5, 0.25, 10.0, 80.0] {
            let shifted: Vec<f32> = logits.iter().map(|l| l + shift).collect();
            let mut probs = [0.0f32; 4];
            softmax(&shifted, &mut probs).unwrap();
            assert!(approx_eq(&probs, &base, 1e-5), "shift {shift} changed the result");
        }
    }

    #[test]
    fn test_softmax_known_values() {
        let mut probs = [0.0f32; 4];
        softmax(&[2.0, 1.0, 0.1, -1.0], &mut probs).unwrap();
        assert!((probs[0] - 0.6381).abs() < 1e-3);
        assert!((probs[1] - 0.2347).abs() < 1e-3);
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let mut probs = [0.0f32; 3];
        softmax(&[1000.0, 1001.0, 1002.0], &mut probs).unwrap();
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_softmax_errors() {
        let mut probs = [0.0f32; 2];
        assert!(matches!(
            softmax(&[], &mut []),
            Err(TensorError::Empty { .. })
        ));
        assert!(matches!(
            softmax(&[1.0, 2.0, 3.0], &mut probs),
            Err(TensorError::BufferSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_argmax_first_occurrence() {
        assert_eq!(argmax(&[0.5, 0.5, 0.0, 0.0]), Some((0, 0.5)));
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), Some((1, 0.4)));
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), Some((1, -1.0)));
        assert_eq!(argmax(&[]), None);
    }
}
