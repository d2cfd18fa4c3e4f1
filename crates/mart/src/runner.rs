use crate::{Config, Format};

use mart_core::{driver::Connection, Error, Filter, Query, Result, Rows};
use mart_sql::{Catalog, Predicate, Select, Serializer};
use std::io::Write;
use tracing::{debug, info};

/// Counters reported after a query has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Rows written to the output
    pub rows: usize,

    /// Statements sent to the database
    pub batches: usize,
}

/// Runs a query and writes its rows in a tabulated [`Format`].
///
/// Unlimited queries are paged by primary key: each batch asks for rows with
/// a key at least as large as the last one written, ordered by key, and the
/// batch size doubles up to [`Config::max_batch_size`]. Queries carrying an
/// id list longer than [`Config::id_list_batch_size`] are instead split into
/// one statement per slice of the list.
#[derive(Debug)]
pub struct AttributeQueryRunner<'a> {
    catalog: &'a Catalog,
    config: &'a Config,
    format: &'a Format,
}

/// Position of the last written row, used to resume the next batch.
#[derive(Debug, Default)]
struct Keyset {
    last_id: Option<i64>,

    /// Rows already written for `last_id`
    last_id_rows: usize,
}

/// A statement and its key column, ready to page through.
struct Statement {
    select: Select,
    primary_key: String,
    qualified_primary_key: String,
}

impl<'a> AttributeQueryRunner<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a Config, format: &'a Format) -> Self {
        Self {
            catalog,
            config,
            format,
        }
    }

    pub async fn execute(&self, query: &Query, out: &mut impl Write) -> Result<RunStats> {
        let big_list = self.big_list(query)?;

        let mut conn = self.catalog.driver().connect().await?;
        let mut stats = RunStats::default();

        match big_list {
            Some(filter) if query.limit().is_none() => {
                self.execute_id_batches(conn.as_mut(), query, filter, out, &mut stats)
                    .await?
            }
            _ => self.execute_paged(conn.as_mut(), query, out, &mut stats).await?,
        }

        info!(rows = stats.rows, batches = stats.batches, "query complete");
        Ok(stats)
    }

    /// The single id list filter too long to send in one statement.
    fn big_list<'q>(&self, query: &'q Query) -> Result<Option<&'q Filter>> {
        let max = self.config.id_list_batch_size;

        let mut big_lists = query
            .filters()
            .iter()
            .filter(|filter| filter.identifiers().is_some_and(|ids| ids.len() > max));

        let first = big_lists.next();
        if big_lists.next().is_some() {
            return Err(Error::invalid_query(format!(
                "only one id list longer than {max} identifiers is supported; query={query}"
            )));
        }

        Ok(first)
    }

    async fn execute_id_batches(
        &self,
        conn: &mut dyn Connection,
        query: &Query,
        big_list: &Filter,
        out: &mut impl Write,
        stats: &mut RunStats,
    ) -> Result<()> {
        let identifiers = big_list.identifiers().unwrap_or_default();

        for chunk in identifiers.chunks(self.config.id_list_batch_size.max(1)) {
            let batch = query.replace_filter(big_list, big_list.with_identifiers(chunk.to_vec()));
            let stmt = self.statement(batch).await?;

            let rows = self.query(conn, &stmt.select, stats).await?;
            self.write_rows(&rows, &stmt.primary_key, &mut Keyset::default(), out, stats)?;
        }

        Ok(())
    }

    async fn execute_paged(
        &self,
        conn: &mut dyn Connection,
        query: &Query,
        out: &mut impl Write,
        stats: &mut RunStats,
    ) -> Result<()> {
        let stmt = self.statement(query.clone()).await?;

        let mut keyset = Keyset::default();
        let mut batch_size = self.config.batch_size.max(1);

        loop {
            let requested = query.limit().unwrap_or(batch_size);

            let mut select = stmt.select.clone();
            if let Some(last_id) = keyset.last_id {
                select = select.and(Predicate::AtLeast {
                    column: stmt.qualified_primary_key.clone(),
                    value: last_id.to_string(),
                });
            }
            let select = select
                .order_by(stmt.qualified_primary_key.as_str())
                .limit(requested as u64);

            let rows = self.query(conn, &select, stats).await?;
            let written = self.write_rows(&rows, &stmt.primary_key, &mut keyset, out, stats)?;

            if query.limit().is_some() || rows.len() < requested {
                return Ok(());
            }

            if written == 0 {
                return Err(Error::invalid_result(format!(
                    "more than {requested} rows share {}={}; cannot page past them",
                    stmt.qualified_primary_key,
                    keyset.last_id.unwrap_or_default(),
                )));
            }

            batch_size = batch_size
                .saturating_mul(2)
                .min(self.config.max_batch_size.max(batch_size));
        }
    }

    async fn statement(&self, query: Query) -> Result<Statement> {
        let mut compiled = self.catalog.compile(query).await?;

        Ok(Statement {
            select: compiled.select_with_key()?,
            primary_key: compiled.primary_key()?.to_string(),
            qualified_primary_key: compiled.qualified_primary_key()?.to_string(),
        })
    }

    async fn query(
        &self,
        conn: &mut dyn Connection,
        select: &Select,
        stats: &mut RunStats,
    ) -> Result<Rows> {
        let mut params = vec![];
        let sql = Serializer.serialize(select, &mut params);

        info!(%sql, "executing batch");
        debug!(params = ?params, "bind values");

        stats.batches += 1;
        conn.query(&sql, &params).await
    }

    /// Writes every row not already written by the previous batch, leaving
    /// out the key column. Returns the number of rows written.
    fn write_rows(
        &self,
        rows: &Rows,
        primary_key: &str,
        keyset: &mut Keyset,
        out: &mut impl Write,
        stats: &mut RunStats,
    ) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let key_index = rows.column_index(primary_key).ok_or_else(|| {
            Error::invalid_result(format!("result has no `{primary_key}` column"))
        })?;

        // Rows ordered by key start with the ones sharing the last key, and
        // those were written at the end of the previous batch.
        let skip = keyset.last_id.map_or(0, |_| keyset.last_id_rows);
        let mut written = 0;

        for row in rows.rows.iter().skip(skip) {
            let id = parse_key(primary_key, row.get(key_index))?;

            if keyset.last_id != Some(id) {
                keyset.last_id_rows = 0;
            }

            let values = row
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != key_index)
                .map(|(_, value)| value.as_deref());
            self.format.write_row(out, values)?;

            keyset.last_id = Some(id);
            keyset.last_id_rows += 1;
            written += 1;
        }

        stats.rows += written;
        Ok(written)
    }
}

fn parse_key(primary_key: &str, value: Option<&Option<String>>) -> Result<i64> {
    let Some(Some(value)) = value else {
        return Err(Error::invalid_result(format!("`{primary_key}` is NULL")));
    };

    value.trim().parse().map_err(|_| {
        Error::invalid_result(format!(
            "`{primary_key}` value `{value}` is not an integer"
        ))
    })
}
