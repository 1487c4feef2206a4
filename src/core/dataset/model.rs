//! In-memory labeled multi-dimensional dataset

use crate::domain::errors::GridloadError;
use crate::domain::result::Result;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Typed, C-ordered value buffer of one variable
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    /// Decoded CF time values; `None` marks a missing value
    DateTime(Vec<Option<NaiveDateTime>>),
}

impl Values {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Values::I8(v) => v.len(),
            Values::U8(v) => v.len(),
            Values::I16(v) => v.len(),
            Values::I32(v) => v.len(),
            Values::F32(v) => v.len(),
            Values::F64(v) => v.len(),
            Values::DateTime(v) => v.len(),
        }
    }

    /// Returns true if the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index` widened to f64, if numeric
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            Values::I8(v) => v.get(index).map(|x| f64::from(*x)),
            Values::U8(v) => v.get(index).map(|x| f64::from(*x)),
            Values::I16(v) => v.get(index).map(|x| f64::from(*x)),
            Values::I32(v) => v.get(index).map(|x| f64::from(*x)),
            Values::F32(v) => v.get(index).map(|x| f64::from(*x)),
            Values::F64(v) => v.get(index).copied(),
            Values::DateTime(_) => None,
        }
    }

    /// All elements widened to f64
    pub fn to_f64_vec(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.get_f64(i).unwrap_or(f64::NAN))
            .collect()
    }

    /// Text rendering of the element at `index`
    ///
    /// Missing values (NaN, absent times) render as an empty string. Whole
    /// floats keep one decimal place, so `3.0` stays `3.0`.
    pub fn format_at(&self, index: usize) -> String {
        match self {
            Values::I8(v) => v[index].to_string(),
            Values::U8(v) => v[index].to_string(),
            Values::I16(v) => v[index].to_string(),
            Values::I32(v) => v[index].to_string(),
            Values::F32(v) => format_float(f64::from(v[index]), v[index].to_string()),
            Values::F64(v) => format_float(v[index], v[index].to_string()),
            Values::DateTime(v) => v[index]
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }

    /// Short type label used in logs
    pub fn type_name(&self) -> &'static str {
        match self {
            Values::I8(_) => "i8",
            Values::U8(_) => "u8",
            Values::I16(_) => "i16",
            Values::I32(_) => "i32",
            Values::F32(_) => "f32",
            Values::F64(_) => "f64",
            Values::DateTime(_) => "datetime",
        }
    }
}

// `shortest` is the type's own shortest round-trip rendering; f32 must not be
// widened first or 280.15 would print as 280.1499938964844.
fn format_float(value: f64, shortest: String) -> String {
    if value.is_nan() {
        String::new()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        shortest
    }
}

/// Named dimension of a variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub size: usize,
}

impl Dimension {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Named array with ordered dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    dims: Vec<Dimension>,
    values: Values,
}

impl Variable {
    /// Create a variable, checking the buffer length against the shape
    ///
    /// # Errors
    ///
    /// Returns `GridloadError::Dataset` if the number of values does not
    /// equal the product of the dimension sizes.
    pub fn new(name: impl Into<String>, dims: Vec<Dimension>, values: Values) -> Result<Self> {
        let name = name.into();
        let expected: usize = dims.iter().map(|d| d.size).product();
        if values.len() != expected {
            return Err(GridloadError::Dataset(format!(
                "Variable '{}' has {} values but its shape {:?} needs {}",
                name,
                values.len(),
                dims.iter().map(|d| d.size).collect::<Vec<_>>(),
                expected
            )));
        }
        Ok(Self { name, dims, values })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Dimension sizes in order
    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.size).collect()
    }

    /// Number of elements (product of the shape; 1 for a scalar)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True for a 1-D variable named after its only dimension
    pub fn is_coordinate(&self) -> bool {
        self.dims.len() == 1 && self.dims[0].name == self.name
    }
}

/// Collection of variables keyed by name
///
/// Loaded once per invocation and shared read-only between export tasks.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    variables: BTreeMap<String, Variable>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, replacing any previous one of the same name
    pub fn insert(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Builder-style insert
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.insert(variable);
        self
    }

    /// Look up a variable by name
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Look up a variable by name, failing with `MissingVariable`
    pub fn variable(&self, name: &str) -> Result<&Variable> {
        self.get(name)
            .ok_or_else(|| GridloadError::MissingVariable(name.to_string()))
    }

    /// Variable names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Coordinate variable labelling `dim`, if the dataset has one
    pub fn coordinate(&self, dim: &Dimension) -> Option<&Variable> {
        self.get(&dim.name)
            .filter(|v| v.is_coordinate() && v.dims[0].size == dim.size)
    }
}
