mod entry;
mod metrics;
mod storage;

pub use entry::AnswerEntry;
pub use metrics::CacheMetrics;
pub use storage::AnswerCacheStore;
