//! Load per-environment configuration from a YAML document, with
//! `{{.NAME}}` placeholders filled in from environment variables.
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Config {
//!     host: String,
//! }
//!
//! let mut config = Config::default();
//! let environment = yamlenv::load_from_file("config.yml", &mut config, None)?;
//! println!("{environment}: {}", config.host);
//! # Ok::<(), yamlenv::ConfigError>(())
//! ```

pub mod config;
pub mod context;
mod error;

pub use config::{
    load, load_from_file, ConfigError, LogSink, Loader, Snapshot, DEFAULT_ENVIRONMENT,
    ENVIRONMENT_VAR,
};
pub use context::AppContext;
pub use error::Error;
