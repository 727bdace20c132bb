use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

pub fn ensure_index(index: usize, len: usize, what: &'static str) -> Result<usize, CoreError> {
    if index < len {
        Ok(index)
    } else {
        Err(CoreError::IndexOob { what, index, len })
    }
}

/// Position of the first element that does not exceed its predecessor.
///
/// `None` means the slice is strictly increasing.
pub fn first_non_increasing(xs: &[Real]) -> Option<usize> {
    xs.windows(2).position(|w| w[1] <= w[0]).map(|i| i + 1)
}

/// Absolute tolerance used by [`compare`].
pub const COMPARE_ABS_EPSILON: Real = 1e-8;

/// Relative tolerance used by [`compare`], applied to the sum of magnitudes.
pub const COMPARE_REL_EPSILON: Real = 1e-5;

/// Outcome of a tolerant slice comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Different,
}

impl Comparison {
    pub fn is_equal(self) -> bool {
        self == Comparison::Equal
    }
}

/// Compare the first `count` elements of two slices.
///
/// Bit-identical prefixes are equal. Otherwise every pair must satisfy
/// `|a - b| <= 1e-8` or `|a - b| <= 1e-5 * (|a| + |b|)`. A NaN on either side
/// fails both tests unless the bits match.
///
/// # Panics
///
/// Panics if either slice is shorter than `count`.
pub fn compare(a: &[Real], b: &[Real], count: usize) -> Comparison {
    let (a, b) = (&a[..count], &b[..count]);
    if a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits()) {
        return Comparison::Equal;
    }

    let all_close = a.iter().zip(b).all(|(&x, &y)| {
        let diff = (x - y).abs();
        diff <= COMPARE_ABS_EPSILON || diff <= COMPARE_REL_EPSILON * (x.abs() + y.abs())
    });

    if all_close {
        Comparison::Equal
    } else {
        Comparison::Different
    }
}
