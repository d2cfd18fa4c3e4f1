use super::{Field, Op};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `WHERE` condition on one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    table_constraint: Option<String>,
    condition: Condition,
}

/// The right-hand side of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// `column <op> ?`, e.g. `=`, `>=`, `like`
    Compare { op: Op, value: String },

    /// `column IN (?, ?, ...)`
    InList(Vec<String>),

    IsNull,

    IsNotNull,
}

impl Filter {
    pub fn new(field: impl Into<String>, condition: Condition) -> Filter {
        Filter {
            field: field.into(),
            table_constraint: None,
            condition,
        }
    }

    pub fn compare(field: impl Into<String>, op: Op, value: impl Into<String>) -> Filter {
        Filter::new(
            field,
            Condition::Compare {
                op,
                value: value.into(),
            },
        )
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Filter {
        Filter::compare(field, Op::Eq, value)
    }

    pub fn in_list(
        field: impl Into<String>,
        identifiers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Filter {
        Filter::new(
            field,
            Condition::InList(identifiers.into_iter().map(Into::into).collect()),
        )
    }

    pub fn is_null(field: impl Into<String>) -> Filter {
        Filter::new(field, Condition::IsNull)
    }

    pub fn is_not_null(field: impl Into<String>) -> Filter {
        Filter::new(field, Condition::IsNotNull)
    }

    /// Restricts resolution to tables whose name contains `constraint`.
    pub fn with_table_constraint(mut self, constraint: impl Into<String>) -> Filter {
        self.table_constraint = Some(constraint.into());
        self
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Identifiers of an `IN` list filter.
    pub fn identifiers(&self) -> Option<&[String]> {
        match &self.condition {
            Condition::InList(identifiers) => Some(identifiers),
            _ => None,
        }
    }

    /// Same filter on the same column with a different id list.
    pub fn with_identifiers(&self, identifiers: Vec<String>) -> Filter {
        Filter {
            field: self.field.clone(),
            table_constraint: self.table_constraint.clone(),
            condition: Condition::InList(identifiers),
        }
    }

    /// The clause appended to the qualified column name, with one `?`
    /// placeholder per bind value.
    pub fn right_hand_clause(&self) -> String {
        match &self.condition {
            Condition::Compare { op, .. } if op.is_word() => format!(" {op} ?"),
            Condition::Compare { op, .. } => format!("{op}?"),
            Condition::InList(identifiers) if identifiers.is_empty() => " IN (NULL)".to_string(),
            Condition::InList(identifiers) => {
                let placeholders = vec!["?"; identifiers.len()];
                format!(" IN ({})", placeholders.join(", "))
            }
            Condition::IsNull => " IS NULL".to_string(),
            Condition::IsNotNull => " IS NOT NULL".to_string(),
        }
    }

    /// Values to bind, in placeholder order.
    pub fn bind_values(&self) -> &[String] {
        match &self.condition {
            Condition::Compare { value, .. } => std::slice::from_ref(value),
            Condition::InList(identifiers) => identifiers,
            Condition::IsNull | Condition::IsNotNull => &[],
        }
    }
}

impl Field for Filter {
    fn field(&self) -> &str {
        &self.field
    }

    fn table_constraint(&self) -> Option<&str> {
        self.table_constraint.as_deref()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.field)?;
        if let Some(constraint) = &self.table_constraint {
            write!(f, "@{constraint}")?;
        }
        match &self.condition {
            Condition::Compare { op, value } if op.is_word() => write!(f, " {op} {value}"),
            Condition::Compare { op, value } => write!(f, "{op}{value}"),
            Condition::InList(identifiers) if identifiers.len() > 10 => {
                write!(f, " IN <{} ids>", identifiers.len())
            }
            Condition::InList(identifiers) => write!(f, " IN ({})", identifiers.join(", ")),
            Condition::IsNull => f.write_str(" IS NULL"),
            Condition::IsNotNull => f.write_str(" IS NOT NULL"),
        }
    }
}
