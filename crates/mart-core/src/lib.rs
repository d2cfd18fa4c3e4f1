pub mod driver;
pub use driver::{Connection, Driver, Rows};

mod error;
pub use error::{Error, IntoError};

pub mod query;
pub use query::{Attribute, Condition, Field, Filter, Op, Query, QueryShape};

pub mod schema;
pub use schema::Table;

/// A Result type alias that uses Mart's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
