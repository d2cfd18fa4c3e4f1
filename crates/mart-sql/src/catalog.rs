use crate::{candidates, CompiledQuery, FieldMapper, MapperCache, TableCache};

use mart_core::{Driver, Query, Result};
use std::{num::NonZeroUsize, sync::Arc};
use tracing::debug;

/// Table and mapper discovery for one database.
///
/// A catalog owns the driver used for metadata reads and the two caches.
/// It is cheap to share behind an `Arc`; the caches lock internally.
#[derive(Debug)]
pub struct Catalog {
    driver: Arc<dyn Driver>,
    tables: TableCache,
    mappers: MapperCache,
}

impl Catalog {
    pub fn new(driver: Arc<dyn Driver>, capacity: NonZeroUsize) -> Catalog {
        Catalog::with_caches(driver, TableCache::new(capacity), MapperCache::new(capacity))
    }

    pub fn with_caches(
        driver: Arc<dyn Driver>,
        tables: TableCache,
        mappers: MapperCache,
    ) -> Catalog {
        Catalog {
            driver,
            tables,
            mappers,
        }
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub fn table_cache(&self) -> &TableCache {
        &self.tables
    }

    pub fn mapper_cache(&self) -> &MapperCache {
        &self.mappers
    }

    /// Returns the ordered mapper candidates for `query`'s shape.
    pub async fn mappers_for(&self, query: &Query) -> Result<Arc<[FieldMapper]>> {
        let shape = query.shape();

        if let Some(mappers) = self.mappers.get(&shape) {
            return Ok(mappers);
        }

        let tables = self.tables.get(&shape, self.driver.as_ref()).await?;
        let mappers: Arc<[FieldMapper]> = candidates(&tables, &shape)?.into();

        debug!(shape = shape.fingerprint(), mappers = mappers.len(), "built mappers");

        self.mappers.insert(shape, mappers.clone());
        Ok(mappers)
    }

    /// Prepares `query` for compilation. SQL is generated on first use.
    pub async fn compile(&self, query: impl Into<Arc<Query>>) -> Result<CompiledQuery> {
        let query = query.into();
        let mappers = self.mappers_for(&query).await?;
        Ok(CompiledQuery::new(query, mappers))
    }

    /// Forgets every cached table and mapper.
    pub fn clear(&self) {
        self.tables.clear();
        self.mappers.clear();
    }
}
