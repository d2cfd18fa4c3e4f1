mod config;
pub use config::Config;

pub mod connect;

mod db;
pub use db::Mart;

mod format;
pub use format::Format;

mod runner;
pub use runner::{AttributeQueryRunner, RunStats};

pub use mart_core::{
    async_trait, driver, Attribute, Condition, Error, Field, Filter, Op, Query, QueryShape, Result,
    Table,
};
pub use mart_sql::{Catalog, CompiledQuery, FieldMapper};
