mod policy;
mod queue;
mod traits;
mod worker;

pub use policy::{DistanceRule, PreloadIntensity, PreloadPriorityPolicy};
pub use queue::{PreloadQueue, PreloadTask};
pub use traits::{CachedRangeQuery, ItemSource, PreloadBackend, PreloadEvent};
pub use worker::{
    ChannelBackend, EventReceiver, PreloadCommand, WorkerConfig, spawn_preload_worker,
};
