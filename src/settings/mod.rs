pub mod store;

pub use store::{AppSettings, PolicySettings, load_settings, save_settings, settings_path};
