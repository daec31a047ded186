#![forbid(unsafe_code)]

//! Width model for column grids.
//!
//! A grid's widths are percentages that always sum to [`WIDTH_SUM`] and never
//! drop below the configured minimum. Everything here is a pure function over
//! `f64` slices; the document layer reads widths out of the tree, runs them
//! through [`normalize`], and writes the result back in one transaction.
//!
//! # Invariants
//!
//! For any input of length `n` with `min_width * n <= 100`:
//! - `normalize(raw, min).len() == n`
//! - every entry is `>= min`
//! - the entries sum to 100 within [`WIDTH_SUM_TOLERANCE`]
//! - `normalize(normalize(raw, min), min) == normalize(raw, min)`

use std::fmt;

/// Target sum of a grid's width vector.
pub const WIDTH_SUM: f64 = 100.0;

/// Accepted deviation from [`WIDTH_SUM`] after rounding.
pub const WIDTH_SUM_TOLERANCE: f64 = 0.1;

/// Default minimum column width, in percent.
pub const MIN_WIDTH: f64 = 5.0;

/// Fewest columns a grid may hold.
pub const MIN_COLUMNS: usize = 2;

/// Most columns a grid may hold.
pub const MAX_COLUMNS: usize = 10;

/// Raw totals above this are treated as garbage and replaced by an equal split.
pub const MAX_PLAUSIBLE_TOTAL: f64 = 1.0e6;

/// Round a width to two decimal places.
#[inline]
#[must_use]
pub fn round_width(width: f64) -> f64 {
    (width * 100.0).round() / 100.0
}

/// Equal split of [`WIDTH_SUM`] across `count` columns, rounded.
#[must_use]
pub fn equal_widths(count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    vec![round_width(WIDTH_SUM / count as f64); count]
}

/// Minimum that can actually be honored for `count` columns.
///
/// When `min_width * count` exceeds 100 no vector satisfies the minimum; the
/// minimum is lowered to an equal share so every column ends up pinned at
/// `100 / count`.
fn effective_min(min_width: f64, count: usize) -> f64 {
    let min_width = if min_width.is_finite() && min_width > 0.0 {
        min_width
    } else {
        0.0
    };
    min_width.min(WIDTH_SUM / count as f64)
}

/// Normalize a raw width vector so it sums to 100 with every entry at or
/// above `min_width`.
///
/// Negative entries count as zero, so they end up raised to the minimum and
/// never cancel out a huge positive entry. A total that is not positive, not
/// finite, or above [`MAX_PLAUSIBLE_TOTAL`] falls back to an equal split.
///
/// Entries below the minimum are raised to it and the deficit is taken from
/// the remaining entries in proportion to their excess over the minimum, so
/// donors never cross the minimum themselves.
#[must_use]
pub fn normalize(raw: &[f64], min_width: f64) -> Vec<f64> {
    let count = raw.len();
    if count == 0 {
        return Vec::new();
    }

    // NaN and infinities pass through so they poison the total.
    let clamped: Vec<f64> = raw
        .iter()
        .map(|&w| if w.is_finite() { w.max(0.0) } else { w })
        .collect();
    let total: f64 = clamped.iter().sum();
    let mut widths: Vec<f64> = if total > 0.0 && total.is_finite() && total <= MAX_PLAUSIBLE_TOTAL
    {
        clamped.iter().map(|w| w / total * WIDTH_SUM).collect()
    } else {
        vec![WIDTH_SUM / count as f64; count]
    };

    let min_width = effective_min(min_width, count);

    let mut deficit = 0.0;
    for w in &mut widths {
        if *w < min_width {
            deficit += min_width - *w;
            *w = min_width;
        }
    }

    if deficit > 0.0 {
        let excess: f64 = widths
            .iter()
            .filter(|w| **w > min_width)
            .map(|w| w - min_width)
            .sum();
        if excess > 0.0 {
            let take = deficit.min(excess);
            for w in &mut widths {
                if *w > min_width {
                    *w -= (*w - min_width) / excess * take;
                }
            }
        }
    }

    let sum: f64 = widths.iter().sum();
    widths
        .into_iter()
        .map(|w| round_width(w / sum * WIDTH_SUM))
        .collect()
}

/// Move `delta` percent from `b` to `a` while keeping `a + b` constant and
/// both members at or above `min_width`.
///
/// A pair whose sum cannot hold two minimums, or a non-finite delta, is
/// returned unchanged.
#[must_use]
pub fn clamp_pair(a: f64, b: f64, delta: f64, min_width: f64) -> (f64, f64) {
    let total = a + b;
    let upper = total - min_width;
    if !(upper >= min_width && delta.is_finite()) {
        return (a, b);
    }
    let new_a = (a + delta).clamp(min_width, upper);
    (new_a, total - new_a)
}

/// Whether `widths` sums to 100 within `tolerance`.
#[must_use]
pub fn widths_sum_ok(widths: &[f64], tolerance: f64) -> bool {
    let sum: f64 = widths.iter().sum();
    (sum - WIDTH_SUM).abs() <= tolerance
}

/// Bounds a committed width vector must satisfy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthBounds {
    pub min_width: f64,
    pub min_columns: usize,
    pub max_columns: usize,
    pub tolerance: f64,
}

impl Default for WidthBounds {
    fn default() -> Self {
        Self {
            min_width: MIN_WIDTH,
            min_columns: MIN_COLUMNS,
            max_columns: MAX_COLUMNS,
            tolerance: WIDTH_SUM_TOLERANCE,
        }
    }
}

/// Check a committed width vector against `bounds`.
///
/// Rounding to two decimals can leave a pinned column a hair under the
/// minimum, so the per-entry check allows half a rounding step of slack.
pub fn check_widths(widths: &[f64], bounds: WidthBounds) -> Result<(), WidthError> {
    let count = widths.len();
    if count < bounds.min_columns || count > bounds.max_columns {
        return Err(WidthError::ColumnCount {
            count,
            min: bounds.min_columns,
            max: bounds.max_columns,
        });
    }
    let min_width = effective_min(bounds.min_width, count);
    for (index, &width) in widths.iter().enumerate() {
        if !width.is_finite() {
            return Err(WidthError::NonFinite { index });
        }
        if width < min_width - 0.005 {
            return Err(WidthError::BelowMinimum {
                index,
                width,
                min: min_width,
            });
        }
    }
    if !widths_sum_ok(widths, bounds.tolerance) {
        return Err(WidthError::SumOutOfTolerance {
            sum: widths.iter().sum(),
            tolerance: bounds.tolerance,
        });
    }
    Ok(())
}

/// Reasons a width vector violates the grid invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum WidthError {
    ColumnCount { count: usize, min: usize, max: usize },
    NonFinite { index: usize },
    BelowMinimum { index: usize, width: f64, min: f64 },
    SumOutOfTolerance { sum: f64, tolerance: f64 },
}

impl fmt::Display for WidthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnCount { count, min, max } => {
                write!(f, "grid has {count} columns, expected {min}..={max}")
            }
            Self::NonFinite { index } => write!(f, "column {index} width is not finite"),
            Self::BelowMinimum { index, width, min } => {
                write!(f, "column {index} width {width} is below minimum {min}")
            }
            Self::SumOutOfTolerance { sum, tolerance } => {
                write!(f, "widths sum to {sum}, expected 100 ± {tolerance}")
            }
        }
    }
}

impl std::error::Error for WidthError {}
