use super::Field;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A column to select.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    table_constraint: Option<String>,
}

impl Attribute {
    pub fn new(field: impl Into<String>) -> Attribute {
        Attribute {
            field: field.into(),
            table_constraint: None,
        }
    }

    /// Restricts resolution to tables whose name contains `constraint`.
    pub fn with_table_constraint(mut self, constraint: impl Into<String>) -> Attribute {
        self.table_constraint = Some(constraint.into());
        self
    }
}

impl Field for Attribute {
    fn field(&self) -> &str {
        &self.field
    }

    fn table_constraint(&self) -> Option<&str> {
        self.table_constraint.as_deref()
    }
}

impl From<&str> for Attribute {
    fn from(field: &str) -> Attribute {
        Attribute::new(field)
    }
}

impl From<String> for Attribute {
    fn from(field: String) -> Attribute {
        Attribute::new(field)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table_constraint {
            Some(constraint) => write!(f, "{}@{}", self.field, constraint),
            None => f.write_str(&self.field),
        }
    }
}
