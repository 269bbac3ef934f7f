//! Python bindings for the analysis core.
//!
//! Array-level operations take and return numpy arrays; the record types
//! ([`LonLat`], [`GridBox`], [`CalendarDate`], [`Season`]) are exposed as
//! classes. Locator failures raise `LookupError`, everything else
//! `ValueError`.

use numpy::{
    IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArray3,
    PyReadonlyArray4,
};
use pyo3::basic::CompareOp;
use pyo3::exceptions::{PyLookupError, PyValueError};
use pyo3::prelude::*;

use crate::average;
use crate::calendar::{decode_times, Calendar, CalendarDate, TimeUnits};
use crate::coords::{self, SearchDirection};
use crate::errors::ClimboxError;
use crate::extract::IndexRange;
use crate::geometry::{GridBox, LonLat};
use crate::levels;
use crate::seasonal::{self, Season};

impl From<ClimboxError> for PyErr {
    fn from(err: ClimboxError) -> PyErr {
        match err {
            ClimboxError::TargetOutOfRange { .. }
            | ClimboxError::NoMatch { .. }
            | ClimboxError::AmbiguousMatch { .. } => PyLookupError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

#[pymethods]
impl LonLat {
    #[new]
    fn py_new(lon: f64, lat: f64) -> Self {
        LonLat::new(lon, lat)
    }

    fn __repr__(&self) -> String {
        format!("LonLat(lon={}, lat={})", self.lon, self.lat)
    }
}

#[pymethods]
impl GridBox {
    /// Construct from the lower-left and upper-right corners.
    #[new]
    fn py_new(ll: LonLat, ur: LonLat) -> Self {
        GridBox::from_corners(ll, ur)
    }

    /// The closed five-point corner ring, for drawing.
    #[pyo3(name = "outline")]
    fn py_outline(&self) -> Vec<LonLat> {
        self.outline().to_vec()
    }

    fn __repr__(&self) -> String {
        format!("GridBox(ll={}, ur={})", self.ll, self.ur)
    }
}

#[pymethods]
impl CalendarDate {
    #[new]
    #[pyo3(signature = (year, month, day, hour=0, minute=0, second=0))]
    fn py_new(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> PyResult<Self> {
        Ok(CalendarDate::new(year, month, day, hour, minute, second)?)
    }

    fn __richcmp__(&self, other: PyRef<'_, Self>, op: CompareOp) -> bool {
        match op {
            CompareOp::Lt => *self < *other,
            CompareOp::Le => *self <= *other,
            CompareOp::Eq => *self == *other,
            CompareOp::Ne => *self != *other,
            CompareOp::Gt => *self > *other,
            CompareOp::Ge => *self >= *other,
        }
    }

    fn __repr__(&self) -> String {
        format!("CalendarDate({self})")
    }

    fn __str__(&self) -> String {
        self.to_string()
    }
}

#[pymethods]
impl Season {
    #[new]
    fn py_new(months: Vec<u32>) -> PyResult<Self> {
        Ok(Season::new(months)?)
    }

    #[staticmethod]
    #[pyo3(name = "mam")]
    fn py_mam() -> Self {
        Season::mam()
    }

    #[staticmethod]
    #[pyo3(name = "jja")]
    fn py_jja() -> Self {
        Season::jja()
    }

    #[staticmethod]
    #[pyo3(name = "son")]
    fn py_son() -> Self {
        Season::son()
    }

    #[staticmethod]
    #[pyo3(name = "djf")]
    fn py_djf() -> Self {
        Season::djf()
    }

    #[getter(months)]
    fn py_months(&self) -> Vec<u32> {
        self.months().to_vec()
    }

    fn __repr__(&self) -> String {
        format!("Season(months={:?})", self.months())
    }
}

#[pyfunction]
#[pyo3(name = "locate_sorted", signature = (values, targets, ascending=true))]
fn py_locate_sorted(
    values: PyReadonlyArray1<'_, f64>,
    targets: Vec<f64>,
    ascending: bool,
) -> PyResult<Vec<usize>> {
    let direction = if ascending {
        SearchDirection::Ascending
    } else {
        SearchDirection::Descending
    };
    let values = values.as_array().to_vec();
    Ok(coords::locate_sorted(&values, &targets, direction)?)
}

#[pyfunction]
#[pyo3(name = "locate_unsorted", signature = (values, targets, tolerance=1.0))]
fn py_locate_unsorted(
    values: PyReadonlyArray1<'_, f64>,
    targets: Vec<f64>,
    tolerance: f64,
) -> PyResult<Vec<usize>> {
    let values = values.as_array().to_vec();
    Ok(coords::locate_unsorted(&values, &targets, tolerance)?)
}

#[pyfunction]
#[pyo3(name = "decode_times")]
fn py_decode_times(
    values: PyReadonlyArray1<'_, f64>,
    units: &str,
    calendar: &str,
) -> PyResult<Vec<CalendarDate>> {
    let units = TimeUnits::parse(units)?;
    let calendar = Calendar::parse(calendar)?;
    Ok(decode_times(&values.as_array().to_vec(), &units, calendar)?)
}

#[pyfunction]
#[pyo3(name = "area_weighted_mean")]
fn py_area_weighted_mean(
    field: PyReadonlyArray2<'_, f64>,
    areas: PyReadonlyArray2<'_, f64>,
) -> PyResult<f64> {
    Ok(average::area_weighted_mean(field.as_array(), areas.as_array())?)
}

#[pyfunction]
#[pyo3(name = "area_weighted_mean_series")]
fn py_area_weighted_mean_series<'py>(
    py: Python<'py>,
    field: PyReadonlyArray3<'_, f64>,
    areas: PyReadonlyArray2<'_, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let series = average::area_weighted_mean_series(field.as_array(), areas.as_array())?;
    Ok(series.into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(name = "time_mean")]
fn py_time_mean<'py>(
    py: Python<'py>,
    field: PyReadonlyArray3<'_, f64>,
) -> Bound<'py, PyArray2<f64>> {
    average::time_mean(field.as_array()).into_pyarray_bound(py)
}

#[pyfunction]
#[pyo3(name = "spatial_mean")]
fn py_spatial_mean<'py>(
    py: Python<'py>,
    field: PyReadonlyArray3<'_, f64>,
) -> Bound<'py, PyArray1<f64>> {
    average::spatial_mean(field.as_array()).into_pyarray_bound(py)
}

#[pyfunction]
#[pyo3(name = "seasonal_mean", signature = (field, season, lat_range=None, lon_range=None))]
fn py_seasonal_mean<'py>(
    py: Python<'py>,
    field: PyReadonlyArray4<'_, f64>,
    season: Season,
    lat_range: Option<(usize, usize)>,
    lon_range: Option<(usize, usize)>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let lat_range = lat_range.map(|(a, b)| IndexRange::new(a, b)).transpose()?;
    let lon_range = lon_range.map(|(a, b)| IndexRange::new(a, b)).transpose()?;
    let profile = seasonal::seasonal_mean(field.as_array(), &season, lat_range, lon_range)?;
    Ok(profile.into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(name = "winter_mean", signature = (field, lat_range=None, lon_range=None))]
fn py_winter_mean<'py>(
    py: Python<'py>,
    field: PyReadonlyArray4<'_, f64>,
    lat_range: Option<(usize, usize)>,
    lon_range: Option<(usize, usize)>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let lat_range = lat_range.map(|(a, b)| IndexRange::new(a, b)).transpose()?;
    let lon_range = lon_range.map(|(a, b)| IndexRange::new(a, b)).transpose()?;
    let profile = seasonal::winter_mean(field.as_array(), lat_range, lon_range)?;
    Ok(profile.into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(name = "hybrid_level_pressure")]
fn py_hybrid_level_pressure<'py>(
    py: Python<'py>,
    ap: PyReadonlyArray1<'_, f64>,
    b: PyReadonlyArray1<'_, f64>,
    surface_pressure: PyReadonlyArray3<'_, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let pressures =
        levels::hybrid_level_pressure(ap.as_array(), b.as_array(), surface_pressure.as_array())?;
    Ok(pressures.into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(name = "locate_level")]
fn py_locate_level(
    levels_values: PyReadonlyArray1<'_, f64>,
    target: f64,
    tolerance: f64,
) -> PyResult<usize> {
    Ok(levels::locate_level(levels_values.as_array(), target, tolerance)?)
}

#[pymodule]
pub fn core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<LonLat>()?;
    m.add_class::<GridBox>()?;
    m.add_class::<CalendarDate>()?;
    m.add_class::<Calendar>()?;
    m.add_class::<SearchDirection>()?;
    m.add_class::<Season>()?;
    m.add_function(wrap_pyfunction!(py_locate_sorted, m)?)?;
    m.add_function(wrap_pyfunction!(py_locate_unsorted, m)?)?;
    m.add_function(wrap_pyfunction!(py_decode_times, m)?)?;
    m.add_function(wrap_pyfunction!(py_area_weighted_mean, m)?)?;
    m.add_function(wrap_pyfunction!(py_area_weighted_mean_series, m)?)?;
    m.add_function(wrap_pyfunction!(py_time_mean, m)?)?;
    m.add_function(wrap_pyfunction!(py_spatial_mean, m)?)?;
    m.add_function(wrap_pyfunction!(py_seasonal_mean, m)?)?;
    m.add_function(wrap_pyfunction!(py_winter_mean, m)?)?;
    m.add_function(wrap_pyfunction!(py_hybrid_level_pressure, m)?)?;
    m.add_function(wrap_pyfunction!(py_locate_level, m)?)?;
    Ok(())
}
