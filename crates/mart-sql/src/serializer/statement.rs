use super::{Comma, Delimited, Formatter, Params, ToSql};

use crate::stmt::{Predicate, Select};

impl ToSql for &Select {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        fmt!(f, "SELECT " Comma(&self.columns) " FROM " Delimited(&self.from, " , "));

        if !self.filter.is_empty() {
            fmt!(f, " WHERE " Delimited(&self.filter, " AND "));
        }

        if let Some(order_by) = &self.order_by {
            fmt!(f, " ORDER BY " order_by);
        }

        if let Some(limit) = self.limit {
            fmt!(f, " LIMIT " limit);
        }
    }
}

impl ToSql for &Predicate {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        match self {
            Predicate::Filter {
                column,
                clause,
                values,
            } => {
                fmt!(f, column clause);
                for value in values {
                    f.params.push(value);
                }
            }
            Predicate::Join { left, right } => {
                fmt!(f, left " = " right);
            }
            Predicate::AtLeast { column, value } => {
                fmt!(f, column " >= ?");
                f.params.push(value);
            }
        }
    }
}
