//! NetCDF dataset reader
//!
//! Reads NetCDF-4 (HDF5) as well as classic and 64-bit offset files through
//! the `netcdf` crate, which links a bundled libnetcdf/HDF5, and applies CF
//! decoding to every variable.

use super::cf::{self, CfAttributes};
use super::model::{Dataset, Dimension, Values, Variable};
use crate::domain::errors::GridloadError;
use crate::domain::result::Result;
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;
use std::path::Path;

/// Opens a downloaded file as a [`Dataset`]
pub trait DatasetReader: Send + Sync {
    /// Read every variable of the file at `path`
    ///
    /// # Errors
    ///
    /// Returns `GridloadError::Dataset` if the file cannot be parsed.
    fn read(&self, path: &Path) -> Result<Dataset>;
}

/// [`DatasetReader`] for NetCDF files
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCdfReader;

impl DatasetReader for NetCdfReader {
    fn read(&self, path: &Path) -> Result<Dataset> {
        let file = netcdf::open(path).map_err(|e| {
            GridloadError::Dataset(format!("Failed to open {}: {e}", path.display()))
        })?;

        let mut dataset = Dataset::new();
        for var in file.variables() {
            let name = var.name();

            let Some(raw) = read_values(&var).map_err(|e| {
                GridloadError::Dataset(format!(
                    "Failed to read variable '{name}' from {}: {e}",
                    path.display()
                ))
            })?
            else {
                tracing::warn!(variable = %name, "Skipping variable of non-numeric type");
                continue;
            };

            let dims: Vec<Dimension> = var
                .dimensions()
                .iter()
                .map(|d| Dimension::new(d.name(), d.len()))
                .collect();

            let attrs = CfAttributes {
                fill_value: numeric_attr(&var, "_FillValue"),
                missing_value: numeric_attr(&var, "missing_value"),
                scale_factor: numeric_attr(&var, "scale_factor"),
                add_offset: numeric_attr(&var, "add_offset"),
                units: string_attr(&var, "units"),
                calendar: string_attr(&var, "calendar"),
            };
            let values = cf::decode(raw, &attrs);

            tracing::debug!(
                variable = %name,
                dims = ?dims.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
                value_type = values.type_name(),
                "Loaded variable"
            );

            dataset.insert(Variable::new(name, dims, values)?);
        }

        Ok(dataset)
    }
}

// `None` for char, string and user-defined types
fn read_values(var: &netcdf::Variable<'_>) -> std::result::Result<Option<Values>, netcdf::Error> {
    let values = match var.vartype() {
        NcVariableType::Int(IntType::I8) => Values::I8(var.get_values::<i8, _>(..)?),
        NcVariableType::Int(IntType::U8) => Values::U8(var.get_values::<u8, _>(..)?),
        NcVariableType::Int(IntType::I16) => Values::I16(var.get_values::<i16, _>(..)?),
        NcVariableType::Int(IntType::I32) => Values::I32(var.get_values::<i32, _>(..)?),
        NcVariableType::Int(IntType::U16) => Values::F64(widen(var.get_values::<u16, _>(..)?)),
        NcVariableType::Int(IntType::U32) => Values::F64(widen(var.get_values::<u32, _>(..)?)),
        NcVariableType::Int(IntType::I64) => Values::F64(
            var.get_values::<i64, _>(..)?
                .into_iter()
                .map(|v| v as f64)
                .collect(),
        ),
        NcVariableType::Int(IntType::U64) => Values::F64(
            var.get_values::<u64, _>(..)?
                .into_iter()
                .map(|v| v as f64)
                .collect(),
        ),
        NcVariableType::Float(FloatType::F32) => Values::F32(var.get_values::<f32, _>(..)?),
        NcVariableType::Float(FloatType::F64) => Values::F64(var.get_values::<f64, _>(..)?),
        _ => return Ok(None),
    };
    Ok(Some(values))
}

fn widen<T: Into<f64>>(values: Vec<T>) -> Vec<f64> {
    values.into_iter().map(Into::into).collect()
}

// First element of a numeric attribute, whatever its stored type
fn numeric_attr(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    let value = var.attribute(name)?.value().ok()?;
    match value {
        AttributeValue::Schar(v) => Some(f64::from(v)),
        AttributeValue::Schars(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Uchar(v) => Some(f64::from(v)),
        AttributeValue::Uchars(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Shorts(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Ushort(v) => Some(f64::from(v)),
        AttributeValue::Ushorts(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Ints(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Uint(v) => Some(f64::from(v)),
        AttributeValue::Uints(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Floats(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Doubles(v) => v.first().copied(),
        _ => None,
    }
}

fn string_attr(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(v) => v.into_iter().next(),
        _ => None,
    }
}
