//! Builds the ordered list of mapper candidates for a query shape.
//!
//! Candidates are tried cheapest join shape first: every single main table,
//! then every single dimension table, then each main table joined with all
//! dimension tables.

use crate::FieldMapper;

use mart_core::{schema, Error, QueryShape, Result, Table};
use tracing::debug;

/// Returns mapper candidates for `tables` in priority order.
///
/// `tables` is in discovery order, which fixes the order of the dimension
/// candidates and of the dimension tables inside each join candidate. Main
/// and join candidates are produced for each primary key in turn, and for
/// each star base within a key.
pub fn candidates(tables: &[Table], shape: &QueryShape) -> Result<Vec<FieldMapper>> {
    let mut dimension_mappers = vec![];
    let mut dimension_tables = vec![];

    for table in tables {
        let in_star = shape
            .star_bases
            .iter()
            .any(|star_base| schema::starts_with_ignore_case(&table.name, star_base));

        if !in_star || !table.is_dimension() {
            continue;
        }

        dimension_tables.push(table);

        // First query key the table carries, spelled the way the table does.
        let key = shape
            .primary_keys
            .iter()
            .find_map(|key| table.column_ignore_case(key));

        match key {
            Some(key) => dimension_mappers.push(FieldMapper::new([table], key)),
            None => debug!(table = %table.name, "dimension table has no primary key column"),
        }
    }

    let mut sorted = tables.to_vec();
    sorted.sort();

    let mut main_mappers = vec![];
    let mut join_mappers = vec![];

    for primary_key in &shape.primary_keys {
        for star_base in &shape.star_bases {
            let main = main_table(star_base, &sorted)?;
            main_mappers.push(FieldMapper::new([main], primary_key.as_str()));

            let joined = std::iter::once(main).chain(dimension_tables.iter().copied());
            join_mappers.push(FieldMapper::new(joined, primary_key.as_str()));
        }
    }

    debug!(
        main = main_mappers.len(),
        dimension = dimension_mappers.len(),
        join = join_mappers.len(),
        "built mapper candidates"
    );

    let mut mappers = main_mappers;
    mappers.extend(dimension_mappers);
    mappers.extend(join_mappers);
    Ok(mappers)
}

/// Finds `<star>_main`, falling back to `<star>__main`.
fn main_table<'a>(star_base: &str, sorted: &'a [Table]) -> Result<&'a Table> {
    let single = format!("{star_base}_main");
    let double = format!("{star_base}__main");

    Table::find(&single, sorted)
        .or_else(|| Table::find(&double, sorted))
        .ok_or_else(|| {
            let known = sorted
                .iter()
                .map(|table| table.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Error::invalid_schema(format!(
                "failed to find a table called {single} or {double}; known tables are [{known}]"
            ))
        })
}
