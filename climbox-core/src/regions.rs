//! Named analysis regions.
//!
//! Two regions are built in (the tropical warm pool and the wider tropics
//! band used throughout the tropical feedback analyses); further regions can be
//! loaded from a TOML table:
//!
//! ```toml
//! [regions.nino34]
//! lower_left = [190.0, -5.0]
//! upper_right = [240.0, 5.0]
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::ClimboxResult;
use crate::geometry::{GridBox, LonLat};
use crate::FloatValue;

/// The tropical warm pool, 85E-160E, 10S-15N.
pub fn warm_pool() -> GridBox {
    GridBox::from_corners(LonLat::new(85.0, -10.0), LonLat::new(160.0, 15.0))
}

/// The tropics band, 85E-210E, 10S-15N.
pub fn tropics() -> GridBox {
    GridBox::from_corners(LonLat::new(85.0, -10.0), LonLat::new(210.0, 15.0))
}

/// One region entry as written in TOML: corner pairs are `[lon, lat]`.
#[derive(Debug, Clone, Deserialize)]
struct RegionSpec {
    lower_left: [FloatValue; 2],
    upper_right: [FloatValue; 2],
}

#[derive(Debug, Clone, Deserialize)]
struct RegionFile {
    #[serde(default)]
    regions: BTreeMap<String, RegionSpec>,
}

/// A name-keyed table of selection boxes.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    regions: BTreeMap<String, GridBox>,
}

impl RegionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in regions (`warm_pool`, `tropics`).
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert("warm_pool", warm_pool());
        table.insert("tropics", tropics());
        table
    }

    /// Parse a TOML region table on top of the built-ins.
    ///
    /// File entries override built-in regions of the same name.
    pub fn from_toml_str(text: &str) -> ClimboxResult<Self> {
        let file: RegionFile = toml::from_str(text)?;
        let mut table = Self::builtin();
        for (name, spec) in file.regions {
            let ll = LonLat::new(spec.lower_left[0], spec.lower_left[1]);
            let ur = LonLat::new(spec.upper_right[0], spec.upper_right[1]);
            table.insert(name, GridBox::from_corners(ll, ur));
        }
        Ok(table)
    }

    pub fn insert(&mut self, name: impl Into<String>, region: GridBox) {
        self.regions.insert(name.into(), region);
    }

    pub fn get(&self, name: &str) -> Option<&GridBox> {
        self.regions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
