//! In-memory gridded variables.
//!
//! A [`GriddedVariable`] owns a numeric array with the fixed axis order
//! (time, [level], lat, lon) and the coordinate vector for each axis, with
//! the time axis already decoded to comparable dates. Axis lengths are
//! validated once at construction; the analysis functions then only read
//! slices and never mutate.

use ndarray::{Array1, ArrayD, ArrayView1, ArrayViewD};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDate;
use crate::errors::{ClimboxError, ClimboxResult};
use crate::FloatValue;

/// A gridded model variable with named axes (time, [level], lat, lon).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GriddedVariable {
    name: String,
    units: String,
    data: ArrayD<FloatValue>,
    time: Vec<CalendarDate>,
    level: Option<Array1<FloatValue>>,
    lat: Array1<FloatValue>,
    lon: Array1<FloatValue>,
}

impl GriddedVariable {
    /// Build a variable, validating the array layout against the
    /// coordinate vectors.
    ///
    /// The data must be 4-D (time, level, lat, lon) when a level coordinate
    /// is given and 3-D (time, lat, lon) otherwise; every axis length must
    /// match its coordinate vector.
    ///
    /// # Errors
    ///
    /// [`ClimboxError::ShapeMismatch`] on any layout violation.
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        data: ArrayD<FloatValue>,
        time: Vec<CalendarDate>,
        level: Option<Array1<FloatValue>>,
        lat: Array1<FloatValue>,
        lon: Array1<FloatValue>,
    ) -> ClimboxResult<Self> {
        let name = name.into();
        let expected: Vec<usize> = match &level {
            Some(lev) => vec![time.len(), lev.len(), lat.len(), lon.len()],
            None => vec![time.len(), lat.len(), lon.len()],
        };
        if data.shape() != expected.as_slice() {
            return Err(ClimboxError::ShapeMismatch(format!(
                "variable {:?} has shape {:?} but its coordinates imply {:?} (axis order time, [level], lat, lon)",
                name,
                data.shape(),
                expected
            )));
        }
        Ok(Self {
            name,
            units: units.into(),
            data,
            time,
            level,
            lat,
            lon,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    /// Read-only view of the data array.
    pub fn data(&self) -> ArrayViewD<'_, FloatValue> {
        self.data.view()
    }

    /// Decoded time coordinate.
    pub fn time(&self) -> &[CalendarDate] {
        &self.time
    }

    /// Level coordinate, when the variable has a level axis.
    pub fn level(&self) -> Option<ArrayView1<'_, FloatValue>> {
        self.level.as_ref().map(Array1::view)
    }

    pub fn lat(&self) -> ArrayView1<'_, FloatValue> {
        self.lat.view()
    }

    pub fn lon(&self) -> ArrayView1<'_, FloatValue> {
        self.lon.view()
    }

    pub fn has_levels(&self) -> bool {
        self.level.is_some()
    }
}

/// A flat, name-keyed collection of gridded variables.
///
/// Stands in for an opened model-output dataset: the variables of one file
/// loaded into memory and fetched by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableCollection {
    variables: Vec<GriddedVariable>,
}

impl VariableCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable to the collection.
    ///
    /// Panics if a variable with the same name already exists in the collection
    pub fn add(&mut self, variable: GriddedVariable) {
        if self.get(variable.name()).is_some() {
            panic!("variable {} already exists", variable.name());
        }
        self.variables.push(variable);
    }

    pub fn get(&self, name: &str) -> Option<&GriddedVariable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GriddedVariable> {
        self.variables.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(GriddedVariable::name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl IntoIterator for VariableCollection {
    type Item = GriddedVariable;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.into_iter()
    }
}
