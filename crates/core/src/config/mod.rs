//! Configuration loading and schema definitions
//!
//! Preferences and conversion defaults are read once at startup and passed
//! down explicitly to the components that need them.

mod loader;
mod schema;

pub use loader::{Config, user_config_path};
pub use schema::*;
