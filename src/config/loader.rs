use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::Value;

use super::assign::{assign, bind};
use super::env::{Snapshot, DEFAULT_ENVIRONMENT, ENVIRONMENT_VAR};
use super::select::select;
use super::template::expand;
use super::ConfigError;
use crate::{AppContext, Error};

/// Receives diagnostic messages from a [`Loader`].
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Loads environment-specific configuration from a YAML document.
///
/// The document is a mapping from environment name to that environment's
/// config. Before parsing, `{{.NAME}}` placeholders are replaced with
/// environment variables; the active environment comes from `GOENV` and
/// defaults to `development`.
///
/// ```yaml
/// default: &default
///   host: localhost
///   db: "awesome_{{.GOENV}}"
///
/// development:
///   <<: *default
///
/// production:
///   <<: *default
///   host: prod.example.com
/// ```
///
/// ## Example
///
/// ```no_run
/// use yamlenv::Loader;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct MyConfig {
///     host: String,
///     db: String,
/// }
///
/// let mut config = MyConfig::default();
/// let environment = Loader::new().load_file("config.yml", &mut config)?;
/// println!("loaded {environment} config for {}", config.host);
/// # Ok::<(), yamlenv::ConfigError>(())
/// ```
#[must_use = "loaders do nothing until a load method is called"]
pub struct Loader {
    env_var: String,
    default_environment: String,
    vars: Option<Vec<(String, String)>>,
    log: LogSink,
    log_document: bool,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            env_var: ENVIRONMENT_VAR.to_string(),
            default_environment: DEFAULT_ENVIRONMENT.to_string(),
            vars: None,
            log: default_sink(),
            log_document: false,
        }
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("env_var", &self.env_var)
            .field("default_environment", &self.default_environment)
            .field("vars", &self.vars.as_ref().map(Vec::len))
            .field("log_document", &self.log_document)
            .finish_non_exhaustive()
    }
}

impl Loader {
    /// Creates a loader reading `GOENV` from the process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the variable that selects the active environment.
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = name.into();
        self
    }

    /// Sets the environment used when the control variable is unset.
    pub fn with_default_environment(mut self, name: impl Into<String>) -> Self {
        self.default_environment = name.into();
        self
    }

    /// Expands templates against `vars` instead of the process environment.
    pub fn with_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Sends diagnostic messages to `sink` instead of `tracing`.
    pub fn with_log_sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.log = Arc::new(sink);
        self
    }

    /// Logs the raw document before it is expanded.
    ///
    /// Off by default since the raw text can hold secrets. The document is
    /// logged before any stage runs, so it is available even when expansion
    /// or parsing fails.
    pub fn log_document(mut self, enabled: bool) -> Self {
        self.log_document = enabled;
        self
    }

    /// Captures the variables templates are expanded against.
    pub fn snapshot(&self) -> Snapshot {
        match &self.vars {
            Some(vars) => Snapshot::from_vars(
                vars.iter().cloned(),
                &self.env_var,
                &self.default_environment,
            ),
            None => Snapshot::capture(&self.env_var, &self.default_environment),
        }
    }

    /// Reads a document from `source` and writes the active environment's
    /// config into `destination`.
    ///
    /// Returns the active environment name. On error `destination` is left
    /// unchanged.
    pub fn load<R, T>(&self, source: R, destination: &mut T) -> Result<String, ConfigError>
    where
        R: Read,
        T: Serialize + DeserializeOwned,
    {
        let raw = read_source(source)?;
        self.load_str(&raw, destination)
    }

    /// Like [`load`](Self::load), reading the document from `path`.
    pub fn load_file<T>(
        &self,
        path: impl AsRef<Path>,
        destination: &mut T,
    ) -> Result<String, ConfigError>
    where
        T: Serialize + DeserializeOwned,
    {
        let raw = read_file(path.as_ref())?;
        self.load_str(&raw, destination)
    }

    /// Loads from an in-memory document.
    pub fn load_str<T>(&self, raw: &str, destination: &mut T) -> Result<String, ConfigError>
    where
        T: Serialize + DeserializeOwned,
    {
        let (selected, environment) = self.select_environment(raw)?;
        assign(selected, destination)?;
        Ok(environment)
    }

    /// Reads a document from `source` and binds the active environment's
    /// config into a new value.
    pub fn resolve<R, T>(&self, source: R) -> Result<AppContext<T>, Error>
    where
        R: Read,
        T: DeserializeOwned,
    {
        let raw = read_source(source)?;
        self.resolve_str(&raw)
    }

    /// Like [`resolve`](Self::resolve), reading the document from `path`.
    pub fn resolve_file<T>(&self, path: impl AsRef<Path>) -> Result<AppContext<T>, Error>
    where
        T: DeserializeOwned,
    {
        let raw = read_file(path.as_ref())?;
        self.resolve_str(&raw)
    }

    fn resolve_str<T: DeserializeOwned>(&self, raw: &str) -> Result<AppContext<T>, Error> {
        let (selected, environment) = self.select_environment(raw)?;
        let config = bind::<T>(selected)?;

        AppContext::builder()
            .with_config(config)
            .with_environment(environment)
            .build()
    }

    /// Runs every stage up to, but not including, the write into the
    /// destination.
    fn select_environment(&self, raw: &str) -> Result<(Value, String), ConfigError> {
        if self.log_document {
            (self.log)(&format!("CONFIG: {raw}"));
        }

        let snapshot = self.snapshot();
        let environment = snapshot.environment().to_string();
        tracing::debug!(
            environment = %environment,
            vars = snapshot.len(),
            "expanding config template"
        );

        let expanded = expand(raw, &snapshot)?;
        let selected = select(&expanded, &environment).inspect_err(|e| {
            if let ConfigError::MissingEnvironment { .. } = e {
                (self.log)(&format!("ERROR: {e}"));
            }
        })?;

        tracing::debug!(environment = %environment, "selected environment config");
        Ok((selected, environment))
    }
}

/// Reads a document from `source` into the destination, with a default
/// [`Loader`].
///
/// Passing a `log` sink also opts in to logging the raw document.
pub fn load<R, T>(
    source: R,
    destination: &mut T,
    log: Option<LogSink>,
) -> Result<String, ConfigError>
where
    R: Read,
    T: Serialize + DeserializeOwned,
{
    loader_with(log).load(source, destination)
}

/// Reads a document from `path` into the destination, with a default
/// [`Loader`].
pub fn load_from_file<T>(
    path: impl AsRef<Path>,
    destination: &mut T,
    log: Option<LogSink>,
) -> Result<String, ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    loader_with(log).load_file(path, destination)
}

fn loader_with(log: Option<LogSink>) -> Loader {
    match log {
        Some(sink) => Loader {
            log: sink,
            ..Loader::new()
        }
        .log_document(true),
        None => Loader::new(),
    }
}

fn default_sink() -> LogSink {
    Arc::new(|message: &str| tracing::info!(target: "yamlenv", "{message}"))
}

fn read_source<R: Read>(mut source: R) -> Result<String, ConfigError> {
    let mut raw = String::new();
    source
        .read_to_string(&mut raw)
        .map_err(ConfigError::StreamReadError)?;
    Ok(raw)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    tracing::debug!(path = %path.display(), "reading config file");
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
