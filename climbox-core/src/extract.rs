//! Box extraction: physical coordinates to index ranges and subarrays.
//!
//! The open/closed convention is deliberately asymmetric. Spatial boxes are
//! inclusive of both corner grid points (the locator result for the
//! upper-right corner gets +1 so the stop index covers it), while time
//! ranges are inclusive of the start date and exclusive of the stop date
//! (the locator result is used as-is).

use log::{debug, warn};
use ndarray::{s, Array1, ArrayD, ArrayView1, Ix3, Ix4};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDate;
use crate::coords::{locate_sorted, locate_sorted_scalar, SearchDirection};
use crate::errors::{ClimboxError, ClimboxResult};
use crate::geometry::GridBox;
use crate::variable::GriddedVariable;
use crate::FloatValue;

/// A half-open interval `[start, stop)` over one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: usize,
    pub stop: usize,
}

impl IndexRange {
    /// Build a range, enforcing `start <= stop`.
    pub fn new(start: usize, stop: usize) -> ClimboxResult<Self> {
        if start > stop {
            return Err(ClimboxError::ShapeMismatch(format!(
                "index range start {start} exceeds stop {stop}"
            )));
        }
        Ok(Self { start, stop })
    }

    /// Build a range covering `first..=last` (stop becomes `last + 1`).
    pub fn from_inclusive(first: usize, last: usize) -> Self {
        Self {
            start: first,
            stop: last + 1,
        }
    }

    /// The full axis `[0, len)`.
    pub fn full(len: usize) -> Self {
        Self {
            start: 0,
            stop: len,
        }
    }

    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    pub fn to_range(self) -> std::ops::Range<usize> {
        self.start..self.stop
    }
}

/// The result of extracting a box from a gridded variable: the selected
/// coordinate subvectors, the data subarray, and the raw index ranges so
/// callers can slice companion arrays (e.g. cell areas) with matching
/// indices.
#[derive(Debug, Clone)]
pub struct BoxSelection {
    pub time: Vec<CalendarDate>,
    pub level: Option<Array1<FloatValue>>,
    pub lat: Array1<FloatValue>,
    pub lon: Array1<FloatValue>,
    pub data: ArrayD<FloatValue>,
    pub time_range: IndexRange,
    pub lat_range: IndexRange,
    pub lon_range: IndexRange,
}

fn contiguous(view: ArrayView1<'_, FloatValue>) -> ClimboxResult<&[FloatValue]> {
    view.to_slice().ok_or_else(|| {
        ClimboxError::ShapeMismatch("coordinate vector is not contiguous".into())
    })
}

/// Index range over a sorted spatial coordinate, inclusive of both the
/// `low` and `high` corner grid points. Handles descending axes (common
/// for latitude) by locating with the matching direction.
fn spatial_range(coords: &[FloatValue], low: FloatValue, high: FloatValue) -> ClimboxResult<IndexRange> {
    if coords.is_empty() {
        return Err(ClimboxError::ShapeMismatch(
            "empty spatial coordinate vector".into(),
        ));
    }
    let direction = SearchDirection::detect(&coords[0], &coords[coords.len() - 1]);
    let targets = match direction {
        SearchDirection::Ascending => [low, high],
        SearchDirection::Descending => [high, low],
    };
    let indices = locate_sorted(coords, &targets, direction)?;
    IndexRange::new(indices[0], indices[1] + 1)
}

/// Extract a lat/lon/time box from a gridded variable.
///
/// `region == None` selects the full spatial domain. `start == None` means
/// "from the first time step"; `stop == None` means "to the end". A given
/// stop date is exclusive; the spatial corners are inclusive.
///
/// # Errors
///
/// Locator errors propagate when a corner or date lies outside the covered
/// range; [`ClimboxError::ShapeMismatch`] when the resulting ranges are
/// inverted (e.g. swapped corners).
pub fn extract_box(
    var: &GriddedVariable,
    region: Option<&GridBox>,
    start: Option<CalendarDate>,
    stop: Option<CalendarDate>,
) -> ClimboxResult<BoxSelection> {
    let (lat_range, lon_range) = match region {
        None => (
            IndexRange::full(var.lat().len()),
            IndexRange::full(var.lon().len()),
        ),
        Some(region) => {
            if !region.is_rectilinear() {
                warn!("box {region} is not axis-aligned; slicing uses the ll/ur corners only");
            }
            let lat_range = spatial_range(contiguous(var.lat())?, region.ll.lat, region.ur.lat)?;
            let lon_range = spatial_range(contiguous(var.lon())?, region.ll.lon, region.ur.lon)?;
            (lat_range, lon_range)
        }
    };

    let times = var.time();
    let t_start = match start {
        None => 0,
        Some(date) => locate_sorted_scalar(times, date, SearchDirection::Ascending)?,
    };
    let t_stop = match stop {
        None => times.len(),
        Some(date) => locate_sorted_scalar(times, date, SearchDirection::Ascending)?,
    };
    let time_range = IndexRange::new(t_start, t_stop)?;
    debug!(
        "extract {:?}: time {:?} lat {:?} lon {:?}",
        var.name(),
        time_range,
        lat_range,
        lon_range
    );

    let data: ArrayD<FloatValue> = if var.has_levels() {
        let view = var
            .data()
            .into_dimensionality::<Ix4>()
            .map_err(|e| ClimboxError::ShapeMismatch(e.to_string()))?;
        view.slice(s![
            time_range.to_range(),
            ..,
            lat_range.to_range(),
            lon_range.to_range()
        ])
        .to_owned()
        .into_dyn()
    } else {
        let view = var
            .data()
            .into_dimensionality::<Ix3>()
            .map_err(|e| ClimboxError::ShapeMismatch(e.to_string()))?;
        view.slice(s![
            time_range.to_range(),
            lat_range.to_range(),
            lon_range.to_range()
        ])
        .to_owned()
        .into_dyn()
    };

    Ok(BoxSelection {
        time: times[time_range.to_range()].to_vec(),
        level: var.level().map(|l| l.to_owned()),
        lat: var.lat().slice(s![lat_range.to_range()]).to_owned(),
        lon: var.lon().slice(s![lon_range.to_range()]).to_owned(),
        data,
        time_range,
        lat_range,
        lon_range,
    })
}
