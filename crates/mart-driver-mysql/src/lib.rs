mod value;
pub(crate) use value::Value;

use mart_core::{async_trait, driver, Error, Result, Rows};
use mysql_async::{prelude::Queryable, Conn, Pool};
use tracing::debug;
use url::Url;

const COLUMNS_SQL: &str = "SELECT column_name FROM information_schema.columns \
                           WHERE table_schema = DATABASE() AND table_name = ? \
                           ORDER BY ordinal_position";

#[derive(Debug)]
pub struct MySQL {
    pool: Pool,
}

impl MySQL {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)?;

        if url.scheme() != "mysql" {
            return Err(Error::invalid_connection_url(format!(
                "connection url does not have a `mysql` scheme; url={url}"
            )));
        }

        if url.host_str().is_none() {
            return Err(Error::invalid_connection_url(format!(
                "missing host in connection URL; url={url}"
            )));
        }

        if url.path().trim_start_matches('/').is_empty() {
            return Err(Error::invalid_connection_url(format!(
                "no database specified - missing path in connection URL; url={url}"
            )));
        }

        let opts = mysql_async::Opts::from_url(url.as_ref())
            .map_err(|err| Error::invalid_connection_url(err.to_string()))?;

        Ok(Self {
            pool: Pool::new(opts),
        })
    }

    /// Closes the pool once every connection has been returned.
    pub async fn disconnect(self) -> Result<()> {
        self.pool
            .disconnect()
            .await
            .map_err(Error::driver_operation_failed)
    }
}

impl From<Pool> for MySQL {
    fn from(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl driver::Driver for MySQL {
    async fn connect(&self) -> Result<Box<dyn driver::Connection>> {
        let conn = self
            .pool
            .get_conn()
            .await
            .map_err(Error::connection_pool)?;
        Ok(Box::new(Connection::new(conn)))
    }
}

#[derive(Debug)]
pub struct Connection {
    conn: Conn,
}

impl Connection {
    pub fn new(conn: Conn) -> Self {
        Self { conn }
    }
}

impl From<Conn> for Connection {
    fn from(conn: Conn) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl driver::Connection for Connection {
    async fn table_names(&mut self) -> Result<Vec<String>> {
        self.conn
            .query::<String, _>("SHOW TABLES")
            .await
            .map_err(Error::driver_operation_failed)
    }

    async fn column_names(&mut self, table: &str) -> Result<Vec<String>> {
        self.conn
            .exec::<String, _, _>(COLUMNS_SQL, (table,))
            .await
            .map_err(Error::driver_operation_failed)
    }

    async fn query(&mut self, sql: &str, params: &[String]) -> Result<Rows> {
        debug!(%sql, params = params.len(), "executing");

        let args = params
            .iter()
            .map(|param| Value::bind(param))
            .collect::<Vec<_>>();

        let mut result = self
            .conn
            .exec_iter(sql, mysql_async::Params::Positional(args))
            .await
            .map_err(Error::driver_operation_failed)?;

        let columns = result
            .columns()
            .map(|columns| {
                columns
                    .iter()
                    .map(|column| column.name_str().into_owned())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let rows: Vec<mysql_async::Row> = result
            .collect()
            .await
            .map_err(Error::driver_operation_failed)?;

        let mut ret = Rows::new(columns);
        for row in rows {
            ret.push(
                row.unwrap_raw()
                    .into_iter()
                    .map(|value| value.and_then(Value::into_text)),
            );
        }

        Ok(ret)
    }
}
