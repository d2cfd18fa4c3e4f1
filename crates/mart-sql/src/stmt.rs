//! A minimal `SELECT` statement tree.
//!
//! Compilation builds one [`Select`]; variants such as the key-augmented
//! select list or a paged batch are derived by transforming a copy and
//! serializing it again.

/// `SELECT columns FROM tables [WHERE ...] [ORDER BY ...] [LIMIT ...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    /// Qualified select list
    pub columns: Vec<String>,

    /// Tables, in the order they were first touched
    pub from: Vec<String>,

    /// Conjunction of predicates
    pub filter: Vec<Predicate>,

    pub order_by: Option<String>,

    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// A user filter: qualified column followed by its right-hand clause.
    /// `values` bind to the clause's placeholders in order.
    Filter {
        column: String,
        clause: String,
        values: Vec<String>,
    },

    /// `left = right`, joining two tables on the primary key.
    Join { left: String, right: String },

    /// `column >= ?`
    AtLeast { column: String, value: String },
}

impl Select {
    pub fn new(columns: Vec<String>, from: Vec<String>) -> Select {
        Select {
            columns,
            from,
            filter: vec![],
            order_by: None,
            limit: None,
        }
    }

    /// Appends `column` to the select list.
    pub fn with_column(mut self, column: impl Into<String>) -> Select {
        self.columns.push(column.into());
        self
    }

    /// Adds `predicate` to the `WHERE` conjunction.
    pub fn and(mut self, predicate: Predicate) -> Select {
        self.filter.push(predicate);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Select {
        self.order_by = Some(column.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Select {
        self.limit = Some(limit);
        self
    }
}
