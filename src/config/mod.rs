use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod validator;
pub mod watcher;

use crate::cli::Cli;
use crate::faker::FakerSettings;

pub const DEFAULT_SCHEMA_FILE: &str = "schema.faker.graphql";
pub const DEFAULT_EXTENSION_FILE: &str = "schema_extension.faker.graphql";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub schema: SchemaSettings,
    /// Present when an upstream server is extended rather than fully mocked
    #[serde(default)]
    pub proxy: Option<ProxySettings>,
    #[serde(default)]
    pub faker: FakerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin, any origin when unset
    #[serde(default)]
    pub cors_origin: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9002,
            cors_origin: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchemaSettings {
    /// Local SDL file. Defaults depend on the mode, see [`Settings::schema_file`].
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub override_fields: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxySettings {
    pub url: String,
    /// Static headers as `"Name: value"`
    #[serde(default)]
    pub headers: Vec<String>,
    /// Inbound header names copied onto forwarded requests
    #[serde(default)]
    pub forward_headers: Vec<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl ProxySettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            forward_headers: Vec::new(),
            timeout_seconds: default_timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Static headers split into name and value. Malformed entries are skipped; the
    /// validator reports them.
    pub fn parsed_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .filter_map(|header| parse_header(header))
            .collect()
    }
}

/// Splits `"Name: value"`
pub fn parse_header(header: &str) -> Option<(String, String)> {
    let (name, value) = header.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

impl Settings {
    /// Loads `fakeql.toml` from the working directory and the environment
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::new_with_cli(&Cli {
            config: PathBuf::from("fakeql.toml"),
            ..Default::default()
        })
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(&cli.config)?;

        // Apply CLI overrides (CLI > env vars > config file)
        settings.apply_cli_overrides(cli);

        validator::ConfigValidator::validate(&settings).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })?;

        Ok(settings)
    }

    /// Config file, then `FAKEQL_`-prefixed environment variables (`FAKEQL_SERVER__PORT`)
    pub fn load(config_path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(config_path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("FAKEQL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 9002)?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(origin) = &cli.cors_origin {
            self.server.cors_origin = Some(origin.clone());
        }

        if let Some(file) = &cli.file {
            self.schema.file = Some(file.clone());
        }
        if cli.override_fields {
            self.schema.override_fields = true;
        }

        if let Some(url) = &cli.extend {
            let proxy = self
                .proxy
                .get_or_insert_with(|| ProxySettings::new(url.clone()));
            proxy.url = url.clone();
        }
        if let Some(proxy) = self.proxy.as_mut() {
            proxy.headers.extend(cli.headers.iter().cloned());
            proxy
                .forward_headers
                .extend(cli.forward_headers.iter().cloned());
        }

        if let Some(locale) = &cli.locale {
            match locale.parse() {
                Ok(locale) => self.faker.locale = locale,
                Err(e) => tracing::warn!("Ignoring --locale: {}", e),
            }
        }
    }

    pub fn is_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    /// The configured SDL file, or the default file name of the mode
    pub fn schema_file(&self) -> PathBuf {
        match &self.schema.file {
            Some(file) => file.clone(),
            None if self.is_proxy() => PathBuf::from(DEFAULT_EXTENSION_FILE),
            None => PathBuf::from(DEFAULT_SCHEMA_FILE),
        }
    }
}
