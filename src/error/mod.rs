//! 统一错误处理模块
//!
//! 提供项目中所有模块的结构化错误类型。

mod app;
mod cache;
mod preload;
mod window;

pub use app::AppError;
pub use cache::CacheError;
pub use preload::{PolicyError, PreloadError};
pub use window::{IndexSetError, WindowError};
