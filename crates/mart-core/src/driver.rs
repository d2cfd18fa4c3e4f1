mod response;
pub use response::Rows;

use crate::{async_trait, Result};

use std::fmt::Debug;

/// Opens connections to a mart database.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Opens a new connection. The connection is closed when dropped.
    async fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// A single database connection.
#[async_trait]
pub trait Connection: Debug + Send {
    /// Lists every table name in the connection's catalog.
    async fn table_names(&mut self) -> Result<Vec<String>>;

    /// Lists the column names of `table` in ordinal order.
    async fn column_names(&mut self, table: &str) -> Result<Vec<String>>;

    /// Runs a prepared `SELECT`, binding `params` positionally.
    async fn query(&mut self, sql: &str, params: &[String]) -> Result<Rows>;
}
