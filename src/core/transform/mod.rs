//! Data transformation logic
//!
//! Variables are flattened into rows and written as gzip-compressed CSV,
//! the format the Athena tables are declared over.

pub mod flatten;

pub use flatten::{encode_gzip_csv, EncodedTable};
