//! Configuration loading for the docs search service: defaults, an
//! optional TOML file, and `DOCSEARCH_`-prefixed environment variables,
//! in ascending precedence.
pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{load_settings, load_settings_from};
pub use models::Settings;
pub use validation::validate;
