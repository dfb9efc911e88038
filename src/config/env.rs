//! Snapshot of the environment variables a document is expanded against.

use std::collections::HashMap;

/// Variable that selects the active environment.
pub const ENVIRONMENT_VAR: &str = "GOENV";

/// Environment used when [`ENVIRONMENT_VAR`] is not set.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Immutable view of the variables available to templates, plus the
/// active environment name derived from them.
///
/// If the control variable is absent, the default environment is inserted
/// under its name so `{{.GOENV}}` always resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    vars: HashMap<String, String>,
    environment: String,
}

impl Snapshot {
    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    /// The process environment is read once; callers mutating it from other
    /// threads at the same time must synchronize themselves.
    pub fn capture(control_var: &str, default_environment: &str) -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        Self::from_vars(vars, control_var, default_environment)
    }

    /// Builds a snapshot from `(name, value)` pairs instead of the process
    /// environment.
    pub fn from_vars(
        vars: impl IntoIterator<Item = (String, String)>,
        control_var: &str,
        default_environment: &str,
    ) -> Self {
        let mut vars: HashMap<String, String> = vars.into_iter().collect();
        let environment = vars
            .entry(control_var.to_string())
            .or_insert_with(|| default_environment.to_string())
            .clone();

        Self { vars, environment }
    }

    /// Builds a snapshot from raw `NAME=VALUE` lines.
    ///
    /// Lines without a `=` separator are skipped.
    pub fn from_environ<I, S>(lines: I, control_var: &str, default_environment: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vars = lines.into_iter().filter_map(|line| {
            let (key, value) = line.as_ref().split_once('=')?;
            Some((key.to_string(), value.to_string()))
        });
        Self::from_vars(vars, control_var, default_environment)
    }

    /// The active environment name.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_environment_inserted() {
        let snapshot = Snapshot::from_vars(
            vars(&[("HOME", "/home/app")]),
            ENVIRONMENT_VAR,
            DEFAULT_ENVIRONMENT,
        );

        assert_eq!(snapshot.environment(), "development");
        assert_eq!(snapshot.get("GOENV"), Some("development"));
        assert_eq!(snapshot.get("HOME"), Some("/home/app"));
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_control_variable_selects_environment() {
        let snapshot = Snapshot::from_vars(
            vars(&[("GOENV", "production")]),
            ENVIRONMENT_VAR,
            DEFAULT_ENVIRONMENT,
        );

        assert_eq!(snapshot.environment(), "production");
        assert_eq!(snapshot.get("GOENV"), Some("production"));
    }

    #[test]
    fn test_empty_control_variable_is_kept() {
        let snapshot =
            Snapshot::from_vars(vars(&[("GOENV", "")]), ENVIRONMENT_VAR, DEFAULT_ENVIRONMENT);

        assert_eq!(snapshot.environment(), "");
    }

    #[test]
    fn test_custom_control_variable() {
        let snapshot = Snapshot::from_vars(
            vars(&[("GOENV", "production"), ("APP_ENV", "test")]),
            "APP_ENV",
            "local",
        );
        assert_eq!(snapshot.environment(), "test");

        let snapshot = Snapshot::from_vars(vars(&[("GOENV", "production")]), "APP_ENV", "local");
        assert_eq!(snapshot.environment(), "local");
        assert_eq!(snapshot.get("APP_ENV"), Some("local"));
    }

    #[test]
    fn test_environ_lines_skip_malformed() {
        let snapshot = Snapshot::from_environ(
            ["HOME=/root", "BROKEN", "DSN=host=db port=5432", "EMPTY="],
            ENVIRONMENT_VAR,
            DEFAULT_ENVIRONMENT,
        );

        assert_eq!(snapshot.get("HOME"), Some("/root"));
        assert_eq!(snapshot.get("BROKEN"), None);
        assert_eq!(snapshot.get("DSN"), Some("host=db port=5432"));
        assert_eq!(snapshot.get("EMPTY"), Some(""));
        assert_eq!(snapshot.environment(), "development");
    }
}
