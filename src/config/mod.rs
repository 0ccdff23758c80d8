//! Configuration loading

mod loader;

pub use loader::{init_store, load_config};
