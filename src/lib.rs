//! Python-facing wrapper around [`climbox_core`].
//!
//! The analysis semantics live in the core crate; this crate re-exports
//! them for Rust users and assembles the `climbox._lib` Python module.

mod python;

pub use climbox_core::{
    average, calendar, coords, errors, extract, geometry, levels, regions, seasonal, variable,
    FloatValue,
};
