use crate::FieldMapper;

use lru::LruCache;
use mart_core::{schema, Driver, QueryShape, Result, Table};
use parking_lot::Mutex;
use std::{num::NonZeroUsize, sync::Arc};
use tracing::debug;

/// Default number of query shapes kept by each cache.
pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// Bounded, thread-safe map from query shape to a shared slice.
#[derive(Debug)]
struct ShapeCache<T> {
    entries: Mutex<LruCache<QueryShape, Arc<[T]>>>,
}

impl<T> ShapeCache<T> {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn get(&self, shape: &QueryShape) -> Option<Arc<[T]>> {
        self.entries.lock().get(shape).cloned()
    }

    fn insert(&self, shape: QueryShape, values: Arc<[T]>) {
        self.entries.lock().put(shape, values);
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Caches the tables discovered for each query shape.
#[derive(Debug)]
pub struct TableCache {
    inner: ShapeCache<Table>,
}

impl TableCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: ShapeCache::new(capacity),
        }
    }

    /// Returns the tables belonging to `shape`'s star bases, reading them
    /// from the database on a miss.
    ///
    /// A miss opens one connection, lists every table, keeps those whose
    /// name starts with a star base (ignoring case) and reads their columns.
    /// The connection is closed before returning. Driver errors propagate
    /// unchanged and nothing is cached.
    pub async fn get(&self, shape: &QueryShape, driver: &dyn Driver) -> Result<Arc<[Table]>> {
        if let Some(tables) = self.inner.get(shape) {
            return Ok(tables);
        }

        debug!(shape = shape.fingerprint(), "table cache miss");

        let mut connection = driver.connect().await?;
        let mut tables = vec![];

        for name in connection.table_names().await? {
            let star_base = shape
                .star_bases
                .iter()
                .find(|star_base| schema::starts_with_ignore_case(&name, star_base));

            let Some(star_base) = star_base else {
                continue;
            };

            let columns = connection.column_names(&name).await?;
            tables.push(Table::for_star_base(star_base, name, columns));
        }

        drop(connection);

        debug!(shape = shape.fingerprint(), tables = tables.len(), "discovered tables");

        let tables: Arc<[Table]> = tables.into();
        self.inner.insert(shape.clone(), tables.clone());
        Ok(tables)
    }

    pub fn cached(&self, shape: &QueryShape) -> Option<Arc<[Table]>> {
        self.inner.get(shape)
    }

    pub fn insert(&self, shape: QueryShape, tables: impl Into<Arc<[Table]>>) {
        self.inner.insert(shape, tables.into());
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TableCache {
    fn default() -> Self {
        TableCache::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Caches the ordered mapper candidates built for each query shape.
#[derive(Debug)]
pub struct MapperCache {
    inner: ShapeCache<FieldMapper>,
}

impl MapperCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: ShapeCache::new(capacity),
        }
    }

    pub fn get(&self, shape: &QueryShape) -> Option<Arc<[FieldMapper]>> {
        self.inner.get(shape)
    }

    pub fn insert(&self, shape: QueryShape, mappers: impl Into<Arc<[FieldMapper]>>) {
        self.inner.insert(shape, mappers.into());
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MapperCache {
    fn default() -> Self {
        MapperCache::new(DEFAULT_CACHE_CAPACITY)
    }
}
