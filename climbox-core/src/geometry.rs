//! Geographic records for box selection.
//!
//! [`LonLat`] and [`GridBox`] are plain immutable records. Only the
//! lower-left and upper-right corners of a box participate in slicing; the
//! other two corners are retained so callers can draw the full box outline
//! on a map.

use std::fmt;

use is_close::is_close;
use serde::{Deserialize, Serialize};

use crate::FloatValue;

/// A (longitude, latitude) pair in degrees.
#[pyo3::pyclass]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    #[pyo3(get)]
    pub lon: FloatValue,
    #[pyo3(get)]
    pub lat: FloatValue,
}

impl LonLat {
    pub fn new(lon: FloatValue, lat: FloatValue) -> Self {
        Self { lon, lat }
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}

/// A lat/lon selection box given by its four corners.
///
/// Corner order is lower-left, lower-right, upper-right, upper-left.
/// Slicing uses `ll` and `ur` only; `lr` and `ul` are redundant metadata
/// kept for drawing. Immutable once constructed.
///
/// # Examples
///
/// ```rust
/// use climbox_core::geometry::{GridBox, LonLat};
///
/// let warm_pool = GridBox::from_corners(LonLat::new(85.0, -10.0), LonLat::new(160.0, 15.0));
/// assert_eq!(warm_pool.lr, LonLat::new(160.0, -10.0));
/// assert!(warm_pool.is_rectilinear());
/// ```
#[pyo3::pyclass]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBox {
    #[pyo3(get)]
    pub ll: LonLat,
    #[pyo3(get)]
    pub lr: LonLat,
    #[pyo3(get)]
    pub ur: LonLat,
    #[pyo3(get)]
    pub ul: LonLat,
}

impl GridBox {
    /// Build a box from all four corners.
    pub fn new(ll: LonLat, lr: LonLat, ur: LonLat, ul: LonLat) -> Self {
        Self { ll, lr, ur, ul }
    }

    /// Build a box from the two corners that matter for slicing, deriving
    /// the redundant lower-right and upper-left corners.
    pub fn from_corners(ll: LonLat, ur: LonLat) -> Self {
        Self {
            ll,
            lr: LonLat::new(ur.lon, ll.lat),
            ur,
            ul: LonLat::new(ll.lon, ur.lat),
        }
    }

    /// Whether the four corners form an axis-aligned box.
    ///
    /// Boxes built with [`from_corners`](Self::from_corners) always are;
    /// hand-built corner sets may not be, in which case only `ll`/`ur` are
    /// honoured by the extractor.
    pub fn is_rectilinear(&self) -> bool {
        is_close!(self.ll.lon, self.ul.lon)
            && is_close!(self.lr.lon, self.ur.lon)
            && is_close!(self.ll.lat, self.lr.lat)
            && is_close!(self.ul.lat, self.ur.lat)
    }

    /// The closed five-point corner ring, for drawing the box on a map.
    pub fn outline(&self) -> [LonLat; 5] {
        [self.ll, self.lr, self.ur, self.ul, self.ll]
    }
}

impl fmt::Display for GridBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.ll, self.ur)
    }
}
