pub mod model;

pub use model::{MediaItem, Playlist};
