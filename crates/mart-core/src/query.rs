mod attribute;
pub use attribute::Attribute;

mod filter;
pub use filter::{Condition, Filter};

mod op;
pub use op::Op;

mod shape;
pub use shape::QueryShape;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A column reference that can be resolved against a set of tables.
pub trait Field {
    /// Column name, optionally qualified as `table.column`.
    fn field(&self) -> &str;

    /// Substring of the owning table's name, used to disambiguate columns
    /// that appear in several tables.
    fn table_constraint(&self) -> Option<&str>;
}

/// A mart query: the attributes to select, the filters to apply and the
/// star schema family to look them up in.
///
/// `Query` is a value. Every transformation returns a new query; compiling a
/// query never observes later changes made to a copy of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    attributes: Vec<Attribute>,
    filters: Vec<Filter>,
    star_bases: Vec<String>,
    primary_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Query {
        Query::default()
    }

    /// Sets the table name prefixes identifying the star schema family.
    pub fn with_star_bases(
        mut self,
        star_bases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Query {
        self.star_bases = star_bases.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the candidate join keys, in priority order.
    pub fn with_primary_keys(
        mut self,
        primary_keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Query {
        self.primary_keys = primary_keys.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an attribute. Adding an attribute already present is a no-op.
    pub fn with_attribute(mut self, attribute: impl Into<Attribute>) -> Query {
        let attribute = attribute.into();
        if !self.attributes.contains(&attribute) {
            self.attributes.push(attribute);
        }
        self
    }

    pub fn without_attribute(&self, attribute: &Attribute) -> Query {
        let mut query = self.clone();
        query.attributes.retain(|a| a != attribute);
        query
    }

    pub fn with_filter(mut self, filter: Filter) -> Query {
        self.filters.push(filter);
        self
    }

    pub fn without_filter(&self, filter: &Filter) -> Query {
        let mut query = self.clone();
        query.filters.retain(|f| f != filter);
        query
    }

    /// Returns a copy with `old` swapped for `new` in place, keeping the
    /// filter's position (and therefore its bind order).
    pub fn replace_filter(&self, old: &Filter, new: Filter) -> Query {
        let mut query = self.clone();
        match query.filters.iter().position(|f| f == old) {
            Some(index) => query.filters[index] = new,
            None => query.filters.push(new),
        }
        query
    }

    /// Limits the number of rows returned. Zero means no limit.
    pub fn with_limit(mut self, limit: usize) -> Query {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn filter_by_name(&self, name: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.field() == name)
    }

    pub fn star_bases(&self) -> &[String] {
        &self.star_bases
    }

    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// The part of the query that determines which tables and mappers apply.
    pub fn shape(&self) -> QueryShape {
        QueryShape::new(self.star_bases.clone(), self.primary_keys.clone())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[starBases=[{}], primaryKeys=[{}], attributes=[",
            self.star_bases.join(", "),
            self.primary_keys.join(", ")
        )?;
        let mut s = "";
        for attribute in &self.attributes {
            write!(f, "{s}{attribute}")?;
            s = ", ";
        }
        f.write_str("], filters=[")?;
        s = "";
        for filter in &self.filters {
            write!(f, "{s}{filter}")?;
            s = ", ";
        }
        f.write_str("]")?;
        if let Some(limit) = self.limit {
            write!(f, ", limit={limit}")?;
        }
        f.write_str("]")
    }
}
