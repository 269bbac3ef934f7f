//! Model-level helpers: hybrid-coordinate pressures and level-indexed box
//! averages.

use ndarray::{Array1, ArrayView1, ArrayView2, ArrayView3, Axis, Ix4, s};

use crate::average::area_weighted_mean_series;
use crate::calendar::CalendarDate;
use crate::coords::locate_unsorted_scalar;
use crate::errors::{ClimboxError, ClimboxResult};
use crate::extract::extract_box;
use crate::geometry::GridBox;
use crate::variable::GriddedVariable;
use crate::FloatValue;

/// Level pressures of a hybrid sigma-pressure coordinate:
/// `ap + b * mean(ps)`, with the surface pressure averaged over all times
/// and cells (NaN cells excluded).
///
/// `ap` is expected in Pa; unit quirks of individual models (hPa
/// coefficients) are the caller's concern.
///
/// # Errors
///
/// [`ClimboxError::ShapeMismatch`] when `ap` and `b` differ in length.
pub fn hybrid_level_pressure(
    ap: ArrayView1<'_, FloatValue>,
    b: ArrayView1<'_, FloatValue>,
    surface_pressure: ArrayView3<'_, FloatValue>,
) -> ClimboxResult<Array1<FloatValue>> {
    if ap.len() != b.len() {
        return Err(ClimboxError::ShapeMismatch(format!(
            "hybrid coefficients differ in length: ap {} vs b {}",
            ap.len(),
            b.len()
        )));
    }
    let mut sum = 0.0;
    let mut count = 0.0;
    for &v in surface_pressure.iter() {
        if !v.is_nan() {
            sum += v;
            count += 1.0;
        }
    }
    let ps_mean = if count > 0.0 { sum / count } else { FloatValue::NAN };
    Ok(ap.to_owned() + b.mapv(|v| v * ps_mean))
}

/// Find the index of a model level by value (pressure levels are not
/// guaranteed monotonic across files, so this is the unsorted lookup).
pub fn locate_level(
    levels: ArrayView1<'_, FloatValue>,
    target: FloatValue,
    tolerance: FloatValue,
) -> ClimboxResult<usize> {
    let values: Vec<FloatValue> = levels.iter().copied().collect();
    locate_unsorted_scalar(&values, target, tolerance)
}

/// Area-weighted box average of a 4-D variable at one model level.
///
/// Extracts the box and time range, picks the level nearest `level_target`
/// (within `tolerance`), slices the full-grid `areas` with the returned
/// lat/lon index ranges, and reduces each time step to its area-weighted
/// mean.
///
/// # Errors
///
/// [`ClimboxError::ShapeMismatch`] when the variable has no level axis or
/// `areas` does not cover the variable's full lat/lon grid; locator and
/// extraction errors propagate.
pub fn box_average_at_level(
    var: &GriddedVariable,
    areas: ArrayView2<'_, FloatValue>,
    level_target: FloatValue,
    tolerance: FloatValue,
    region: Option<&GridBox>,
    start: Option<CalendarDate>,
    stop: Option<CalendarDate>,
) -> ClimboxResult<Array1<FloatValue>> {
    let levels = var.level().ok_or_else(|| {
        ClimboxError::ShapeMismatch(format!("variable {:?} has no level axis", var.name()))
    })?;
    if areas.dim() != (var.lat().len(), var.lon().len()) {
        return Err(ClimboxError::ShapeMismatch(format!(
            "area weights {:?} do not cover the {}x{} lat/lon grid",
            areas.shape(),
            var.lat().len(),
            var.lon().len()
        )));
    }
    let level_index = locate_level(levels, level_target, tolerance)?;
    let selection = extract_box(var, region, start, stop)?;
    let box_areas = areas.slice(s![
        selection.lat_range.to_range(),
        selection.lon_range.to_range()
    ]);
    let data = selection
        .data
        .view()
        .into_dimensionality::<Ix4>()
        .map_err(|e| ClimboxError::ShapeMismatch(e.to_string()))?;
    let at_level = data.index_axis(Axis(1), level_index);
    area_weighted_mean_series(at_level, box_areas)
}
