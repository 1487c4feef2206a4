//! Gridded datasets
//!
//! - [`model`] - in-memory variables, dimensions and coordinates
//! - [`cf`] - CF conventions decoding (fill values, scaling, time units)
//! - [`netcdf`] - NetCDF file reader behind the [`DatasetReader`] seam

pub mod cf;
pub mod model;
pub mod netcdf;

pub use model::{Dataset, Dimension, Values, Variable};
pub use netcdf::{DatasetReader, NetCdfReader};
