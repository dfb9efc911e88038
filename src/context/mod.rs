//! Resolved configuration bundled with the environment it was loaded for.

use crate::config::DEFAULT_ENVIRONMENT;
use crate::Error;

/// A bound configuration and the name of the environment it came from.
///
/// Generic over the configuration type `C`, which is deserialized once when
/// the document is resolved. Access configuration via [`config()`](Self::config).
///
/// ## Example
///
/// ```no_run
/// use yamlenv::{AppContext, Loader};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct MyConfig {
///     host: String,
///     port: u16,
/// }
///
/// let ctx: AppContext<MyConfig> = Loader::new().resolve_file("config.yml")?;
///
/// println!("{} on {}:{}", ctx.environment(), ctx.config().host, ctx.config().port);
/// # Ok::<(), yamlenv::Error>(())
/// ```
#[derive(Debug)]
pub struct AppContext<C> {
    config: C,
    environment: String,
}

impl<C> AppContext<C> {
    /// Returns a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// The environment the configuration was selected for.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn into_config(self) -> C {
        self.config
    }
}

impl AppContext<()> {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder<()> {
        AppContextBuilder {
            config: None,
            environment: None,
        }
    }
}

/// Builder for constructing an [`AppContext`].
///
/// The builder starts with no config (`AppContextBuilder<()>`) and transitions
/// to `AppContextBuilder<C>` when [`with_config`](Self::with_config) is called.
/// Without an explicit environment the context reports `development`.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder<C> {
    config: Option<C>,
    environment: Option<String>,
}

impl AppContextBuilder<()> {
    /// Attaches a configuration to the application context.
    pub fn with_config<C>(self, config: C) -> AppContextBuilder<C> {
        AppContextBuilder {
            config: Some(config),
            environment: self.environment,
        }
    }
}

impl<C> AppContextBuilder<C> {
    /// Records the environment the configuration was selected for.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Builds the `AppContext`.
    ///
    /// Returns an error if no configuration was provided.
    pub fn build(self) -> Result<AppContext<C>, Error> {
        Ok(AppContext {
            config: self.config.ok_or(Error::MissingConfig)?,
            environment: self
                .environment
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
        })
    }
}
