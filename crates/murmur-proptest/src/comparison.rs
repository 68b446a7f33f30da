//! Buffer comparison with diagnostics.

use std::fmt;

/// Outcome of comparing two buffers element by element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonResult {
    /// Number of compared elements.
    pub len: usize,
    /// Elements whose absolute difference exceeds the tolerance.
    pub mismatches: usize,
    /// Largest absolute difference seen.
    pub max_abs_diff: f64,
    /// Index of the first mismatch, if any.
    pub first_mismatch: Option<usize>,
}

impl ComparisonResult {
    /// Whether every element was within tolerance.
    pub fn is_match(&self) -> bool {
        self.mismatches == 0
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} mismatches, max_abs_diff={:.3e}",
            self.mismatches, self.len, self.max_abs_diff
        )?;
        if let Some(i) = self.first_mismatch {
            write!(f, ", first at {i}")?;
        }
        Ok(())
    }
}

/// Compares `actual` against `expected` with an absolute `tolerance`.
///
/// A length difference counts every unmatched element as a mismatch. NaN
/// never matches.
pub fn compare_f64(actual: &[f64], expected: &[f64], tolerance: f64) -> ComparisonResult {
    let len = actual.len().max(expected.len());
    let mut mismatches = len - actual.len().min(expected.len());
    let mut max_abs_diff = 0.0f64;
    let mut first_mismatch = (mismatches > 0).then_some(actual.len().min(expected.len()));

    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        let diff = (a - e).abs();
        if diff.is_nan() || diff > tolerance {
            mismatches += 1;
            if first_mismatch.is_none_or(|first| i < first) {
                first_mismatch = Some(i);
            }
        }
        if diff > max_abs_diff || diff.is_nan() {
            max_abs_diff = if diff.is_nan() { f64::INFINITY } else { diff };
        }
    }

    ComparisonResult {
        len,
        mismatches,
        max_abs_diff,
        first_mismatch,
    }
}
