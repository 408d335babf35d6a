mod answer_cache;
mod cache_maintenance_port;
mod upstream_resolver;

pub use answer_cache::{AnswerCache, CacheMetricsSnapshot, CachedAnswer};
pub use cache_maintenance_port::{CacheMaintenancePort, CacheSweepOutcome};
pub use upstream_resolver::{ResolvedAnswer, UpstreamResolver};
