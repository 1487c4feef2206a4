//! Domain identifier types with validation
//!
//! Newtype wrappers for the names that flow into object keys and SQL text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returns true if `name` is a plain SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Dataset variable name
///
/// The name doubles as the key prefix and the target table name, so it must
/// be a plain identifier.
///
/// # Examples
///
/// ```
/// use gridload::domain::ids::VariableName;
/// use std::str::FromStr;
///
/// let var = VariableName::from_str("air_temperature").unwrap();
/// assert_eq!(var.as_str(), "air_temperature");
/// assert!(VariableName::from_str("air temperature").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariableName(String);

impl VariableName {
    /// Creates a new VariableName from a string
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Variable name cannot be empty".to_string());
        }
        if !is_identifier(&name) {
            return Err(format!(
                "Invalid variable name '{name}': expected letters, digits and underscores"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the variable name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VariableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VariableName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VariableName> for String {
    fn from(value: VariableName) -> Self {
        value.0
    }
}

impl AsRef<str> for VariableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Query execution identifier returned by the query service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryExecutionId(String);

impl QueryExecutionId {
    /// Creates a new QueryExecutionId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Query execution ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the execution ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueryExecutionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
