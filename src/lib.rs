pub mod cache;
pub mod cli;
pub mod domain;
pub mod error;
pub mod logging;
pub mod preload;
pub mod session;
pub mod settings;
pub mod window;
