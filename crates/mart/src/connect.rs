//! Picks a driver from a connection URL.

use mart_core::{driver::Driver, Error, Result};

use std::sync::Arc;
use url::Url;

/// Builds the driver matching `url`'s scheme.
///
/// The driver opens connections lazily; a bad host or password surfaces on
/// the first query, not here.
pub fn driver(url: &str) -> Result<Arc<dyn Driver>> {
    let parsed = Url::parse(url)?;

    match parsed.scheme() {
        "mysql" => connect_mysql(url),
        scheme => Err(Error::invalid_connection_url(format!(
            "unsupported database; scheme={scheme}; url={parsed}"
        ))),
    }
}

#[cfg(feature = "mysql")]
fn connect_mysql(url: &str) -> Result<Arc<dyn Driver>> {
    let driver = mart_driver_mysql::MySQL::new(url)?;
    Ok(Arc::new(driver))
}

#[cfg(not(feature = "mysql"))]
fn connect_mysql(_url: &str) -> Result<Arc<dyn Driver>> {
    Err(Error::invalid_connection_url("`mysql` feature not enabled"))
}
