//! Piecewise-linear table primitives.
//!
//! Every lookup resolves to one interval `[xs[j], xs[j + 1]]`. Points outside
//! the tabulated range use the boundary interval, so values extrapolate
//! linearly and the slope stays that of the boundary segment. A point sitting
//! exactly on an interior breakpoint resolves to the interval below it.
//!
//! All functions expect `xs` strictly increasing with at least two entries and
//! `ys.len() == xs.len()`; table construction guarantees both.

/// Index `j` of the interval used for `x`.
#[inline]
pub fn table_index(xs: &[f64], x: f64) -> usize {
    debug_assert!(xs.len() >= 2);
    let upper = xs.partition_point(|&v| v < x);
    upper.saturating_sub(1).min(xs.len() - 2)
}

/// Value and slope of a piecewise-linear curve at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub slope: f64,
}

/// Interpolate `ys(xs)` at `x`, returning value and local slope together.
#[inline]
pub fn sample(xs: &[f64], ys: &[f64], x: f64) -> Sample {
    let j = table_index(xs, x);
    let slope = (ys[j + 1] - ys[j]) / (xs[j + 1] - xs[j]);
    Sample {
        value: ys[j] + slope * (x - xs[j]),
        slope,
    }
}

#[inline]
pub fn linear_interpolation(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    sample(xs, ys, x).value
}

#[inline]
pub fn linear_interpolation_derivative(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    sample(xs, ys, x).slope
}

/// Position of `x` inside its interval: 0 at `xs[j]`, 1 at `xs[j + 1]`.
///
/// Returns the interval index alongside the weight. Outside the table the
/// weight leaves `[0, 1]`.
#[inline]
pub fn interval_weight(xs: &[f64], x: f64) -> (usize, f64) {
    let j = table_index(xs, x);
    (j, (x - xs[j]) / (xs[j + 1] - xs[j]))
}
