//! Loader for linkgrab configuration with YAML + environment overlays.
//!
//! Sources are merged lowest to highest precedence: an optional or required
//! YAML file, `LINKGRAB__`-prefixed environment variables (`__` separates
//! nested keys, e.g. `LINKGRAB__BROWSER__HEADLESS=false`), then explicit
//! overrides supplied by the CLI. String values may reference `${VAR}`
//! placeholders, which are expanded after merging.
use config::{Config, Environment, File};
pub use config::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_ARCHIVE_NAME: &str = "downloaded_files.zip";
pub const DEFAULT_TRIGGER_TEXT: &str = "Download this file";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Everything one batch run needs, validated at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct GrabConfig {
    /// Text file with one page URL per line.
    #[serde(default)]
    pub links_file: PathBuf,
    /// Directory the archive is written into.
    #[serde(default)]
    pub save_dir: PathBuf,
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default)]
    pub kind: BrowserKind,
    #[serde(default = "default_true")]
    pub headless: bool,
    /// Upper bound on the wait for the trigger anchor.
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    /// Exact visible text of the anchor that carries the download link.
    #[serde(default = "default_trigger_text")]
    pub trigger_text: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            kind: BrowserKind::default(),
            headless: true,
            wait_timeout_secs: default_wait_timeout_secs(),
            trigger_text: default_trigger_text(),
        }
    }
}

impl BrowserConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

/// Browser family requested from the WebDriver endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Firefox,
    Chrome,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub cookie_scope: CookieScope,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            cookie_scope: CookieScope::default(),
        }
    }
}

/// How browser cookies carry over between links in the HTTP session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookieScope {
    /// Reset the HTTP session's cookies before each link.
    #[default]
    PerLink,
    /// Keep every cookie ever copied; later values overwrite earlier ones by name.
    Shared,
}

fn default_archive_name() -> String {
    DEFAULT_ARCHIVE_NAME.into()
}
fn default_webdriver_url() -> String {
    "http://localhost:4444".into()
}
fn default_true() -> bool {
    true
}
fn default_wait_timeout_secs() -> u64 {
    10
}
fn default_trigger_text() -> String {
    DEFAULT_TRIGGER_TEXT.into()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_connect_timeout_secs() -> u64 {
    10
}

impl GrabConfig {
    /// Full path of the archive written at the end of the batch.
    pub fn archive_path(&self) -> PathBuf {
        self.save_dir.join(&self.archive_name)
    }

    /// Reject blank or zero settings instead of running with silent defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.links_file.as_os_str().is_empty() {
            problems.push("links_file is required");
        }
        if self.save_dir.as_os_str().is_empty() {
            problems.push("save_dir is required");
        }
        if self.archive_name.trim().is_empty() {
            problems.push("archive_name must not be empty");
        }
        if self.browser.webdriver_url.trim().is_empty() {
            problems.push("browser.webdriver_url must not be empty");
        }
        if self.browser.trigger_text.is_empty() {
            problems.push("browser.trigger_text must not be empty");
        }
        if self.browser.wait_timeout_secs == 0 {
            problems.push("browser.wait_timeout_secs must be positive");
        }
        if self.http.timeout_secs == 0 {
            problems.push("http.timeout_secs must be positive");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(problems.join("; ")))
        }
    }
}

/// Expand `$VAR` / `${VAR}` until the text stops changing, at most
/// [`MAXIMUM_ENV_EXPANSION_DEPTH`] rounds. Unknown variables stay literal.
fn expand_env(raw: &str) -> String {
    let mut current = raw.to_string();
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
        let Ok(next) = shellexpand::env(&current) else {
            break;
        };
        if next == current {
            break;
        }
        current = next.into_owned();
    }
    current
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) if s.contains('$') => *s = expand_env(s),
        Value::Array(items) => items.iter_mut().for_each(expand_env_in_value),
        Value::Object(fields) => fields.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Layers YAML files, `LINKGRAB__` environment variables and CLI overrides.
pub struct GrabConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GrabConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GrabConfigLoader {
    /// Empty loader; `LINKGRAB__` environment variables are merged at [`load`](Self::load).
    ///
    /// ```
    /// use linkgrab_config::GrabConfigLoader;
    ///
    /// let config = GrabConfigLoader::new()
    ///     .with_yaml_str("links_file: links.txt\nsave_dir: out")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.archive_path(), std::path::Path::new("out/downloaded_files.zip"));
    /// assert_eq!(config.browser.wait_timeout_secs, 10);
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

    /// Attach a file that is merged only when it exists.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Force a single key, taking precedence over files and environment.
    ///
    /// ```
    /// use linkgrab_config::GrabConfigLoader;
    ///
    /// let config = GrabConfigLoader::new()
    ///     .with_yaml_str("links_file: links.txt\nsave_dir: out")
    ///     .with_override("browser.headless", false)
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(!config.browser.headless);
    /// ```
    pub fn with_override<V>(mut self, key: &str, value: V) -> Result<Self, ConfigError>
    where
        V: Into<config::Value>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Consume the builder, expand `${VAR}` placeholders and validate.
    pub fn load(self) -> Result<GrabConfig, ConfigError> {
        // Added last so the environment outranks every file.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("LINKGRAB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: GrabConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}
