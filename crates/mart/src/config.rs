use std::num::NonZeroUsize;

/// Tuning knobs for compiling and running mart queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Rows requested by the first keyset batch
    pub batch_size: usize,

    /// Upper bound the batch size doubles towards
    pub max_batch_size: usize,

    /// Id lists longer than this are split into several queries
    pub id_list_batch_size: usize,

    /// Entries kept by each of the table and mapper caches
    pub cache_capacity: NonZeroUsize,
}

impl Config {
    /// Create a new Config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self.max_batch_size = self.max_batch_size.max(self.batch_size);
        self
    }

    pub fn max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self.batch_size = self.batch_size.min(self.max_batch_size);
        self
    }

    pub fn id_list_batch_size(mut self, id_list_batch_size: usize) -> Self {
        self.id_list_batch_size = id_list_batch_size.max(1);
        self
    }

    pub fn cache_capacity(mut self, cache_capacity: NonZeroUsize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 50_000,
            max_batch_size: 200_000,
            id_list_batch_size: 1_000,
            cache_capacity: mart_sql::DEFAULT_CACHE_CAPACITY,
        }
    }
}
