mod cache;
pub use cache::{MapperCache, TableCache, DEFAULT_CACHE_CAPACITY};

pub mod candidates;
pub use candidates::candidates;

mod catalog;
pub use catalog::Catalog;

mod compiled;
pub use compiled::CompiledQuery;

mod field_mapper;
pub use field_mapper::FieldMapper;

pub mod serializer;
pub use serializer::{Params, Serializer};

pub mod stmt;
pub use stmt::{Predicate, Select};
