//! Loader for Glance configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are attached; `GLANCE__`-prefixed
//! environment variables are applied last and use `__` as the nesting
//! separator (`GLANCE__INTERACTION__SCROLL__WHEEL_STEPS=5`). String values may
//! reference `${VAR}` placeholders, which are expanded before the typed
//! structs are materialised. Every section has defaults, so an empty source
//! set yields a usable configuration.
use config::{Config, ConfigError, Environment, File};
use glance_common::observability::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub mod interaction;

pub use interaction::{DelayRange, InteractionConfig, PointerConfig, ScrollConfig, SettleConfig};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const DEFAULT_FILE_NAME: &str = "glance.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlanceConfig {
    pub version: Option<String>,
    pub webdriver: WebDriverConfig,
    pub interaction: InteractionConfig,
    pub logging: LoggingConfig,
}

/// Where the browser automation endpoint lives and how to launch the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    pub endpoint: String,
    pub headless: bool,
    /// Extra command-line switches handed to the browser.
    pub args: Vec<String>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".into(),
            headless: false,
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub filter: String,
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            filter: "info".into(),
            stderr: false,
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(cfg: &LoggingConfig) -> Self {
        LogConfig {
            log_dir: cfg.dir.clone(),
            emit_stderr: cfg.stderr,
            format: cfg.format,
            default_filter: cfg.filter.clone(),
            ..LogConfig::default()
        }
    }
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
pub struct GlanceConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GlanceConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GlanceConfigLoader {
    /// Start with no files; only defaults apply until sources are attached.
    ///
    /// ```
    /// use glance_config::GlanceConfigLoader;
    ///
    /// let config = GlanceConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.webdriver.endpoint, "http://localhost:9515");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file) but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach `<config dir>/glance/glance.yaml` if it exists.
    pub fn with_default_location(self) -> Self {
        match default_config_path() {
            Some(path) => self.with_optional_file(path),
            None => self,
        }
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use glance_config::GlanceConfigLoader;
    ///
    /// let cfg = GlanceConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// interaction:
    ///   scroll:
    ///     wheel_steps: 5
    ///   pointer:
    ///     step_delay: { min_ms: 0, max_ms: 5 }
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.interaction.scroll.wheel_steps, 5);
    /// assert_eq!(cfg.interaction.scroll.wheel_delta, 100.0);
    /// assert_eq!(cfg.interaction.pointer.step_delay.max_ms, 5);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment overrides are layered on top of every attached source and
    /// `${VAR}` placeholders are expanded before deserialization.
    pub fn load(self) -> Result<GlanceConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("GLANCE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

/// Platform config directory joined with `glance/glance.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("glance").join(DEFAULT_FILE_NAME))
}
