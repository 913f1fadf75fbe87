//! Console configuration.
use std::env;
use std::path::PathBuf;

/// Settings for one `datahub-tweak` session.
#[derive(Clone, Debug)]
pub struct TweakConfig {
    /// Scope file or directory of scope files. `None` loads the built-in
    /// `unittest` scope.
    pub schema: Option<PathBuf>,
    /// Print changes of watched fields after each command.
    pub echo: bool,
    /// Write logs to `<log_dir>/datahub-tweak.log` instead of stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for TweakConfig {
    fn default() -> Self {
        Self {
            schema: None,
            echo: true,
            log_dir: None,
        }
    }
}

impl TweakConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DATAHUB_SCHEMA` - Scope file (`.ron`/`.toml`) or directory of them
    /// - `DATAHUB_ECHO` - Echo watched field changes (default: true)
    /// - `DATAHUB_LOG_DIR` - Log to a file in this directory
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("DATAHUB_SCHEMA").filter(|v| !v.trim().is_empty()) {
            config.schema = Some(PathBuf::from(path));
        }
        if let Some(echo) = lookup("DATAHUB_ECHO").and_then(|v| parse_flag(&v)) {
            config.echo = echo;
        }
        if let Some(dir) = lookup("DATAHUB_LOG_DIR").filter(|v| !v.trim().is_empty()) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// Apply a schema path given on the command line.
    #[must_use]
    pub fn with_schema_arg(mut self, arg: Option<String>) -> Self {
        if let Some(path) = arg {
            self.schema = Some(PathBuf::from(path));
        }
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
