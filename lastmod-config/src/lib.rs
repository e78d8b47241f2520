//! Loader for run configuration with YAML + environment overlays.
//!
//! Precedence, lowest first: built-in defaults, an optional or required YAML
//! file, then `LASTMOD__`-prefixed environment variables (`__` separates
//! nesting levels, e.g. `LASTMOD__HTTP__TIMEOUT_SECS=10`). String values may
//! reference other environment variables as `${VAR}`.
use config::{Config, ConfigError, Environment, File};
use lastmod_common::observability::LogFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (UpdateChecker/1.0)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 25;

#[derive(Debug, Clone, Deserialize)]
pub struct LastmodConfig {
    /// Newline-delimited list of URLs to check.
    #[serde(default = "default_urls_path")]
    pub urls_path: PathBuf,
    /// Destination of the CSV report.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Maximum number of requests in flight. `1` is fully sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// When set, events are also written to a daily rolling file here.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LastmodConfig {
    fn default() -> Self {
        Self {
            urls_path: default_urls_path(),
            output_path: default_output_path(),
            concurrency: default_concurrency(),
            http: HttpSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            filter: default_log_filter(),
        }
    }
}

impl LastmodConfig {
    /// Reject values that would make the run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Message("concurrency must be at least 1".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "http.timeout_secs must be at least 1".into(),
            ));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("http.user_agent must not be empty".into()));
        }
        Ok(())
    }
}

fn default_urls_path() -> PathBuf {
    PathBuf::from("urls.txt")
}
fn default_output_path() -> PathBuf {
    PathBuf::from("output").join("update_report.csv")
}
fn default_concurrency() -> usize {
    1
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_log_filter() -> String {
    "info".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct LastmodConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env: Environment,
}

impl Default for LastmodConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LastmodConfigLoader {
    /// Start with defaults plus `LASTMOD__` env overrides.
    ///
    /// ```
    /// use lastmod_config::LastmodConfigLoader;
    ///
    /// let config = LastmodConfigLoader::new()
    ///     .with_yaml_str("concurrency: 4")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.concurrency, 4);
    /// assert_eq!(config.http.timeout_secs, 25);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env: Environment::with_prefix("LASTMOD")
                .separator("__")
                .try_parsing(true),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is merged only when present.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use lastmod_config::LastmodConfigLoader;
    ///
    /// let cfg = LastmodConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// urls_path: "lists/news.txt"
    /// http:
    ///   user_agent: "probe/2.0"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.urls_path.to_str(), Some("lists/news.txt"));
    /// assert_eq!(cfg.http.user_agent, "probe/2.0");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// Environment variables are applied last, `${VAR}` placeholders are
    /// expanded, and the result is validated.
    pub fn load(self) -> Result<LastmodConfig, ConfigError> {
        let cfg = self.builder.add_source(self.env).build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: LastmodConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Utrecht")), ("LIST", Some("nl"))], || {
            let mut v = json!([
                "hello-$CITY",
                { "urls_path": "${LIST}-${CITY}.txt" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Utrecht", { "urls_path": "nl-Utrecht.txt" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn defaults_match_report_conventions() {
        let cfg = LastmodConfig::default();
        assert_eq!(cfg.urls_path, PathBuf::from("urls.txt"));
        assert_eq!(cfg.output_path, PathBuf::from("output/update_report.csv"));
        assert_eq!(cfg.concurrency, 1);
        assert_eq!(cfg.http.timeout_secs, 25);
        assert_eq!(cfg.http.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let cfg = LastmodConfig {
            concurrency: 0,
            ..LastmodConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = LastmodConfig::default();
        cfg.http.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }
}
