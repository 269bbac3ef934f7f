//! Spatial and temporal reductions.
//!
//! Missing values are NaN cells. Every reduction here excludes NaN cells
//! from both the numerator and the denominator (weighted area total or cell
//! count); a reduction with no valid cells yields NaN.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayView3, Axis, Zip};

use crate::errors::{ClimboxError, ClimboxResult};
use crate::FloatValue;

fn check_spatial_shape(
    field: &[usize],
    areas: (usize, usize),
) -> ClimboxResult<()> {
    let n = field.len();
    if (field[n - 2], field[n - 1]) != areas {
        return Err(ClimboxError::ShapeMismatch(format!(
            "field spatial axes {:?} do not match area weights {:?}",
            &field[n - 2..],
            [areas.0, areas.1]
        )));
    }
    Ok(())
}

fn weighted_cell_mean(field: ArrayView2<'_, FloatValue>, areas: ArrayView2<'_, FloatValue>) -> FloatValue {
    let mut num = 0.0;
    let mut total_area = 0.0;
    Zip::from(&field).and(&areas).for_each(|&v, &a| {
        if !v.is_nan() {
            num += v * a;
            total_area += a;
        }
    });
    if total_area > 0.0 {
        num / total_area
    } else {
        FloatValue::NAN
    }
}

/// Area-weighted mean of a single lat/lon field.
///
/// `sum(field * area) / sum(area)` over both spatial axes, with NaN cells
/// excluded from both sums.
///
/// # Errors
///
/// [`ClimboxError::ShapeMismatch`] when the field and area shapes differ.
pub fn area_weighted_mean(
    field: ArrayView2<'_, FloatValue>,
    areas: ArrayView2<'_, FloatValue>,
) -> ClimboxResult<FloatValue> {
    check_spatial_shape(field.shape(), areas.dim())?;
    Ok(weighted_cell_mean(field, areas))
}

/// Area-weighted mean of each step of a (time | level, lat, lon) field,
/// collapsing the two spatial axes to give a 1-D series.
pub fn area_weighted_mean_series(
    field: ArrayView3<'_, FloatValue>,
    areas: ArrayView2<'_, FloatValue>,
) -> ClimboxResult<Array1<FloatValue>> {
    check_spatial_shape(field.shape(), areas.dim())?;
    Ok(field
        .outer_iter()
        .map(|step| weighted_cell_mean(step, areas))
        .collect())
}

/// NaN-aware mean of a 2-D array along one axis.
pub(crate) fn nanmean_axis2(a: ArrayView2<'_, FloatValue>, axis: Axis) -> Array1<FloatValue> {
    let out_len = a.len_of(Axis(1 - axis.index()));
    let mut sum = Array1::<FloatValue>::zeros(out_len);
    let mut count = Array1::<FloatValue>::zeros(out_len);
    for lane in a.axis_iter(axis) {
        Zip::from(&mut sum).and(&mut count).and(&lane).for_each(|s, c, &v| {
            if !v.is_nan() {
                *s += v;
                *c += 1.0;
            }
        });
    }
    Zip::from(&sum)
        .and(&count)
        .map_collect(|&s, &c| if c > 0.0 { s / c } else { FloatValue::NAN })
}

/// NaN-aware mean of a 1-D array.
pub(crate) fn nanmean1(a: ArrayView1<'_, FloatValue>) -> FloatValue {
    let mut sum = 0.0;
    let mut count = 0.0;
    for &v in a.iter() {
        if !v.is_nan() {
            sum += v;
            count += 1.0;
        }
    }
    if count > 0.0 {
        sum / count
    } else {
        FloatValue::NAN
    }
}

/// Mean over the leading (time) axis of a (time, lat, lon) field, giving
/// the 2-D map of time averages.
pub fn time_mean(field: ArrayView3<'_, FloatValue>) -> Array2<FloatValue> {
    let (_, ny, nx) = field.dim();
    let mut sum = Array2::<FloatValue>::zeros((ny, nx));
    let mut count = Array2::<FloatValue>::zeros((ny, nx));
    for step in field.outer_iter() {
        Zip::from(&mut sum).and(&mut count).and(&step).for_each(|s, c, &v| {
            if !v.is_nan() {
                *s += v;
                *c += 1.0;
            }
        });
    }
    Zip::from(&sum)
        .and(&count)
        .map_collect(|&s, &c| if c > 0.0 { s / c } else { FloatValue::NAN })
}

/// Unweighted spatial mean of a (time, lat, lon) field, giving the 1-D
/// time series. Latitude is averaged before longitude, as two sequential
/// means, not one joint mean; with NaN cells present the two differ.
pub fn spatial_mean(field: ArrayView3<'_, FloatValue>) -> Array1<FloatValue> {
    field
        .outer_iter()
        .map(|step| {
            let lat_mean = nanmean_axis2(step, Axis(0));
            nanmean1(lat_mean.view())
        })
        .collect()
}
