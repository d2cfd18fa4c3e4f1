use crate::{
    stmt::{Predicate, Select},
    FieldMapper, Serializer,
};

use indexmap::IndexSet;
use mart_core::{Error, Query, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// A query paired with its mapper candidates, compiled to SQL on first use.
///
/// The first call to any accessor walks the candidates and freezes the
/// result; later calls return the same values. A failed compilation leaves
/// nothing behind, so the next call tries again against the same query.
#[derive(Debug)]
pub struct CompiledQuery {
    query: Arc<Query>,
    mappers: Arc<[FieldMapper]>,
    compiled: Option<Compiled>,
}

#[derive(Debug)]
struct Compiled {
    select: Select,
    sql: String,
    pk_sql: String,
    params: Vec<String>,

    /// Either a `_main` table or the single dimension table chosen.
    main_table: String,

    /// Key of the winning mapper.
    primary_key: String,

    /// `main_table.primary_key`
    qualified_primary_key: String,
}

impl CompiledQuery {
    pub fn new(query: impl Into<Arc<Query>>, mappers: Arc<[FieldMapper]>) -> CompiledQuery {
        CompiledQuery {
            query: query.into(),
            mappers,
            compiled: None,
        }
    }

    pub fn query(&self) -> &Arc<Query> {
        &self.query
    }

    pub fn mappers(&self) -> &[FieldMapper] {
        &self.mappers
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// SQL with one `?` placeholder per bind value in [`params`].
    ///
    /// [`params`]: CompiledQuery::params
    pub fn to_sql(&mut self) -> Result<&str> {
        Ok(&self.compile()?.sql)
    }

    /// Same as [`to_sql`], with the qualified primary key appended to the
    /// select list.
    ///
    /// [`to_sql`]: CompiledQuery::to_sql
    pub fn to_sql_with_key(&mut self) -> Result<&str> {
        Ok(&self.compile()?.pk_sql)
    }

    /// Bind values for both SQL variants, in placeholder order.
    pub fn params(&mut self) -> Result<&[String]> {
        Ok(&self.compile()?.params)
    }

    pub fn primary_key(&mut self) -> Result<&str> {
        Ok(&self.compile()?.primary_key)
    }

    pub fn qualified_primary_key(&mut self) -> Result<&str> {
        Ok(&self.compile()?.qualified_primary_key)
    }

    pub fn main_table(&mut self) -> Result<&str> {
        Ok(&self.compile()?.main_table)
    }

    pub fn from_tables(&mut self) -> Result<&[String]> {
        Ok(&self.compile()?.select.from)
    }

    /// The compiled statement tree.
    pub fn select(&mut self) -> Result<&Select> {
        Ok(&self.compile()?.select)
    }

    /// The compiled statement tree with the qualified primary key appended
    /// to the select list.
    pub fn select_with_key(&mut self) -> Result<Select> {
        let compiled = self.compile()?;
        Ok(compiled
            .select
            .clone()
            .with_column(compiled.qualified_primary_key.clone()))
    }

    fn compile(&mut self) -> Result<&Compiled> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => compile_sql(&self.query, &self.mappers)?,
        };
        Ok(self.compiled.insert(compiled))
    }
}

/// Tries each mapper in order and builds SQL from the first one that maps
/// every attribute and filter. Per-candidate failures are silent; only
/// running out of candidates is an error.
fn compile_sql(query: &Query, mappers: &[FieldMapper]) -> Result<Compiled> {
    if query.attributes().is_empty() {
        return Err(Error::invalid_query("no attributes selected"));
    }

    for mapper in mappers {
        let Some(columns) = select_clause(query, mapper) else {
            continue;
        };
        debug!(%mapper, columns = ?columns, "select clause");

        let Some((from, main_table)) = from_clause(query, mapper) else {
            continue;
        };
        debug!(%mapper, from = ?from, %main_table, "from clause");

        let Some(filter) = where_clause(query, mapper, &from, &main_table) else {
            continue;
        };

        let primary_key = mapper.primary_key().to_string();
        let qualified_primary_key = format!("{main_table}.{primary_key}");

        let select = Select {
            columns,
            from,
            filter,
            order_by: None,
            limit: None,
        };

        let mut params = Vec::new();
        let sql = Serializer.serialize(&select, &mut params);
        let pk_sql = Serializer.serialize(
            &select.clone().with_column(qualified_primary_key.as_str()),
            &mut Vec::new(),
        );

        info!(%sql, %pk_sql, %main_table, %primary_key, "compiled query");

        return Ok(Compiled {
            select,
            sql,
            pk_sql,
            params,
            main_table,
            primary_key,
            qualified_primary_key,
        });
    }

    Err(Error::invalid_query(format!("failed to compile query: {query}")))
}

/// Qualified select list, or `None` if an attribute is unmappable.
fn select_clause(query: &Query, mapper: &FieldMapper) -> Option<Vec<String>> {
    query
        .attributes()
        .iter()
        .map(|attribute| mapper.qualified_name(attribute))
        .collect()
}

/// Tables touched by attributes and filters, in first-touched order, plus
/// the main table: the first `_main` table if there is one, else the first
/// table.
fn from_clause(query: &Query, mapper: &FieldMapper) -> Option<(Vec<String>, String)> {
    let mut tables = IndexSet::new();

    for attribute in query.attributes() {
        tables.insert(mapper.table_name(attribute)?);
    }

    for filter in query.filters() {
        tables.insert(mapper.table_name(filter)?);
    }

    let from: Vec<String> = tables.into_iter().collect();
    let main_table = from
        .iter()
        .find(|table| mart_core::schema::is_main_table(table))
        .or_else(|| from.first())?
        .clone();

    Some((from, main_table))
}

/// User filters followed by one primary key join per non-main table.
fn where_clause(
    query: &Query,
    mapper: &FieldMapper,
    from: &[String],
    main_table: &str,
) -> Option<Vec<Predicate>> {
    let mut predicates = vec![];

    for filter in query.filters() {
        predicates.push(Predicate::Filter {
            column: mapper.qualified_name(filter)?,
            clause: filter.right_hand_clause(),
            values: filter.bind_values().to_vec(),
        });
    }

    if from.len() > 1 {
        let key = mapper.primary_key();

        for table in from.iter().filter(|table| *table != main_table) {
            predicates.push(Predicate::Join {
                left: format!("{main_table}.{key}"),
                right: format!("{table}.{key}"),
            });
        }
    }

    Some(predicates)
}
