//! Coordinate lookup: turn physical coordinate values into array indices.
//!
//! Two lookup modes are provided, mirroring the two kinds of coordinate
//! vectors found in model output:
//!
//! - [`locate_sorted`]: for monotonic vectors (latitude, longitude, decoded
//!   time axes). Returns, per target, the first index on the requested side
//!   of the target.
//! - [`locate_unsorted`]: for vectors with no ordering guarantee (e.g. model
//!   level pressures). Returns, per target, the index of a value within a
//!   caller-supplied tolerance.
//!
//! Both modes take a batch of targets and return one index per target, in
//! target order. Callers that need an inclusive upper bound for slicing must
//! add 1 to the returned stop index themselves (see the box extractor).

use std::fmt;

use num::Float;
use serde::{Deserialize, Serialize};

use crate::errors::{ClimboxError, ClimboxResult};

/// Direction of a monotonic coordinate vector.
#[pyo3::pyclass]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchDirection {
    /// Values increase with index; lookup returns the first value `>=` target.
    Ascending,
    /// Values decrease with index; lookup returns the first value `<=` target.
    Descending,
}

impl SearchDirection {
    /// Infer the direction of a coordinate vector from its end points.
    pub fn detect<T: PartialOrd>(first: &T, last: &T) -> SearchDirection {
        if last < first {
            SearchDirection::Descending
        } else {
            SearchDirection::Ascending
        }
    }
}

/// Locate a single target in a sorted coordinate vector.
///
/// Returns the smallest index `i` such that `values[i] >= target`
/// (ascending) or `values[i] <= target` (descending). The vector must be
/// monotonic in the stated direction; this is not checked.
///
/// # Errors
///
/// [`ClimboxError::TargetOutOfRange`] when no element satisfies the
/// comparison (the target lies beyond the covered range).
pub fn locate_sorted_scalar<T>(
    values: &[T],
    target: T,
    direction: SearchDirection,
) -> ClimboxResult<usize>
where
    T: PartialOrd + Copy + fmt::Display,
{
    let index = match direction {
        SearchDirection::Ascending => values.partition_point(|v| *v < target),
        SearchDirection::Descending => values.partition_point(|v| *v > target),
    };
    if index == values.len() {
        Err(ClimboxError::TargetOutOfRange {
            target: target.to_string(),
        })
    } else {
        Ok(index)
    }
}

/// Locate a batch of targets in a sorted coordinate vector.
///
/// One index per target, preserving target order. See
/// [`locate_sorted_scalar`] for the per-target semantics.
///
/// # Examples
///
/// ```rust
/// use climbox_core::coords::{locate_sorted, SearchDirection};
///
/// let lats = [-30.0, -15.0, 0.0, 15.0, 30.0];
/// let idx = locate_sorted(&lats, &[-10.0, 15.0], SearchDirection::Ascending).unwrap();
/// assert_eq!(idx, vec![2, 3]);
/// ```
pub fn locate_sorted<T>(
    values: &[T],
    targets: &[T],
    direction: SearchDirection,
) -> ClimboxResult<Vec<usize>>
where
    T: PartialOrd + Copy + fmt::Display,
{
    targets
        .iter()
        .map(|&t| locate_sorted_scalar(values, t, direction))
        .collect()
}

/// Locate a single target in an unsorted coordinate vector.
///
/// Scans for values strictly within `tolerance` of the target. With one or
/// two hits the lower index is returned; two hits are tolerated because cell
/// edges can straddle a target, and the tie-break is deliberately the first
/// hit, not the nearest.
///
/// # Errors
///
/// [`ClimboxError::NoMatch`] with zero hits,
/// [`ClimboxError::AmbiguousMatch`] with more than two.
pub fn locate_unsorted_scalar<F>(values: &[F], target: F, tolerance: F) -> ClimboxResult<usize>
where
    F: Float + fmt::Display,
{
    let hits: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| (**v - target).abs() < tolerance)
        .map(|(i, _)| i)
        .collect();
    match hits.len() {
        0 => Err(ClimboxError::NoMatch {
            target: target.to_string(),
            tolerance: tolerance.to_string(),
        }),
        1 | 2 => Ok(hits[0]),
        n => Err(ClimboxError::AmbiguousMatch {
            target: target.to_string(),
            count: n,
        }),
    }
}

/// Locate a batch of targets in an unsorted coordinate vector.
///
/// One index per target, preserving target order. See
/// [`locate_unsorted_scalar`] for the per-target semantics.
pub fn locate_unsorted<F>(values: &[F], targets: &[F], tolerance: F) -> ClimboxResult<Vec<usize>>
where
    F: Float + fmt::Display,
{
    targets
        .iter()
        .map(|&t| locate_unsorted_scalar(values, t, tolerance))
        .collect()
}
