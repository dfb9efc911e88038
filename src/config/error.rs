use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read config source: {0}")]
    StreamReadError(#[source] std::io::Error),

    #[error("template syntax error on line {line}: {message}")]
    TemplateSyntax { line: usize, message: String },

    #[error("template references undefined variable '{name}' on line {line}")]
    UndefinedVariable { name: String, line: usize },

    #[error("failed to parse expanded config: {0}")]
    ParseError(#[source] serde_yaml::Error),

    #[error("merge key '<<' must reference a mapping or a sequence of mappings, found {0}")]
    InvalidMerge(&'static str),

    #[error("config document must be a mapping of environment names, found {0}")]
    NotAMapping(&'static str),

    #[error("environment '{name}' not found in config (available: {})", available.join(", "))]
    MissingEnvironment {
        name: String,
        available: Vec<String>,
    },

    #[error("config for the active environment does not fit the destination: {0}")]
    NotAssignable(#[source] serde_yaml::Error),
}
