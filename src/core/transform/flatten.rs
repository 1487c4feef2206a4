//! Tabular flattening of dataset variables
//!
//! A variable with dimensions `(d0, d1, .., dn)` becomes one row per
//! coordinate combination, in C order (last dimension varies fastest). Each
//! row holds the coordinate label for every dimension followed by the value.
//! No header is written; for `air_temperature(time, latitude, longitude)`:
//!
//! ```text
//! 2024-01-01 00:00:00,50.5,-3.0,280.15
//! ```
//!
//! The label of a dimension is its coordinate variable's value when the
//! dataset has one and the positional index otherwise.

use crate::core::dataset::{Dataset, Variable};
use crate::domain::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// A variable serialized as gzip-compressed CSV
#[derive(Debug, Clone)]
pub struct EncodedTable {
    /// Gzip stream of headerless CSV
    pub bytes: Vec<u8>,

    /// Number of data rows
    pub rows: usize,

    /// Number of columns per row (dimensions + 1)
    pub columns: usize,
}

/// Flatten `variable` and encode it as headerless, gzip-compressed CSV
///
/// # Errors
///
/// Returns `MissingVariable` if the dataset has no such variable, or a
/// `Conversion` error if writing or compressing fails.
///
/// # Examples
///
/// ```
/// use gridload::core::dataset::{Dataset, Dimension, Values, Variable};
/// use gridload::core::transform::flatten::encode_gzip_csv;
///
/// # fn example() -> gridload::domain::Result<()> {
/// let dataset = Dataset::new().with_variable(Variable::new(
///     "visibility_in_air",
///     vec![Dimension::new("x", 2), Dimension::new("y", 3)],
///     Values::I32(vec![1, 2, 3, 4, 5, 6]),
/// )?);
///
/// let table = encode_gzip_csv(&dataset, "visibility_in_air")?;
/// assert_eq!(table.rows, 6);
/// assert_eq!(table.columns, 3);
/// # Ok(())
/// # }
/// ```
pub fn encode_gzip_csv(dataset: &Dataset, variable: &str) -> Result<EncodedTable> {
    let var = dataset.variable(variable)?;

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(encoder);

    let rows = write_rows(dataset, var, &mut writer)?;

    let encoder = writer.into_inner().map_err(|e| {
        crate::domain::GridloadError::Conversion(format!("Failed to flush CSV writer: {e}"))
    })?;
    let bytes = encoder.finish().map_err(|e| {
        crate::domain::GridloadError::Conversion(format!("Failed to finish gzip stream: {e}"))
    })?;

    Ok(EncodedTable {
        bytes,
        rows,
        columns: var.dims().len() + 1,
    })
}

/// Write one CSV record per element of `var`, returning the row count
pub fn write_rows<W: Write>(
    dataset: &Dataset,
    var: &Variable,
    writer: &mut csv::Writer<W>,
) -> Result<usize> {
    let shape = var.shape();
    let labels = dimension_labels(dataset, var);
    let values = var.values();

    let mut index = vec![0usize; shape.len()];
    for flat in 0..var.len() {
        let value = values.format_at(flat);
        let mut record: Vec<&str> = Vec::with_capacity(shape.len() + 1);
        for (dim, &i) in index.iter().enumerate() {
            record.push(&labels[dim][i]);
        }
        record.push(&value);
        writer.write_record(&record)?;

        // Odometer step, last dimension fastest
        for dim in (0..shape.len()).rev() {
            index[dim] += 1;
            if index[dim] < shape[dim] {
                break;
            }
            index[dim] = 0;
        }
    }

    Ok(var.len())
}

fn dimension_labels(dataset: &Dataset, var: &Variable) -> Vec<Vec<String>> {
    var.dims()
        .iter()
        .map(|dim| match dataset.coordinate(dim) {
            Some(coord) => (0..dim.size).map(|i| coord.values().format_at(i)).collect(),
            None => (0..dim.size).map(|i| i.to_string()).collect(),
        })
        .collect()
}
