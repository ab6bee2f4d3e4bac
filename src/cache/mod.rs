mod span_cache;
mod status;

pub use span_cache::SpanCache;
pub use status::{CacheStatus, CacheStatusMap};
