//! Environment-keyed configuration loading.
//!
//! A document is processed in four stages: the environment [`Snapshot`] is
//! captured, `{{.NAME}}` placeholders are expanded against it, the expanded
//! YAML is parsed and the active environment's entry selected, and that entry
//! is written into the caller's value.

mod assign;
mod env;
mod error;
mod loader;
mod select;
mod template;

pub use env::{Snapshot, DEFAULT_ENVIRONMENT, ENVIRONMENT_VAR};
pub use error::ConfigError;
pub use loader::{load, load_from_file, LogSink, Loader};
