mod config;
mod index_set;
mod manager;

pub use config::{ItemCount, WindowConfig};
pub use index_set::WindowIndexSet;
pub use manager::{ManagerState, ShiftDirection, SlidingWindowManager, WindowUpdate};
