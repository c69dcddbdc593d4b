use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::catalog::models::{AttributeIds, UpsertStrategy};
use crate::catalog::store::{TableNames, is_valid_identifier};
use crate::errors::DataAccessError;
use crate::locale_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Locale of the authoritative product rows
    #[serde(default = "default_source_locale")]
    pub source_locale: String,

    /// Locales to translate into, processed in this order
    #[serde(default = "default_target_locales")]
    pub target_locales: Vec<String>,

    /// Attribute ids of the translatable fields
    #[serde(default)]
    pub attributes: AttributeIds,

    /// Database config
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Database driver
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    // @driver: MySQL / MariaDB shop database
    #[default]
    MySql,
    // @driver: Local SQLite file
    Sqlite,
}

impl std::fmt::Display for DatabaseDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MySql => write!(f, "mysql"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for DatabaseDriver {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(anyhow!("Invalid database driver: {}", s)),
        }
    }
}

/// Database connection and table settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Database driver
    #[serde(default)]
    pub driver: DatabaseDriver,

    /// Server host
    #[serde(default = "default_db_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_db_port")]
    pub port: u16,

    /// User name
    #[serde(default)]
    pub user: String,

    /// Password
    #[serde(default)]
    pub password: String,

    /// Database (schema) name
    #[serde(default)]
    pub name: String,

    /// Database file when the driver is sqlite
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,

    /// Flat per-locale product table
    #[serde(default = "default_flat_table")]
    pub flat_table: String,

    /// Attribute-value table
    #[serde(default = "default_attribute_value_table")]
    pub attribute_value_table: String,

    /// How attribute values are deduplicated
    #[serde(default)]
    pub upsert_strategy: UpsertStrategy,

    /// Maximum pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Maximum lifetime of a pooled connection in seconds
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,

    /// Idle timeout of a pooled connection in seconds
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Timeout for acquiring a connection in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            host: default_db_host(),
            port: default_db_port(),
            user: String::new(),
            password: String::new(),
            name: String::new(),
            sqlite_path: default_sqlite_path(),
            flat_table: default_flat_table(),
            attribute_value_table: default_attribute_value_table(),
            upsert_strategy: UpsertStrategy::default(),
            max_connections: default_max_connections(),
            max_lifetime_secs: default_max_lifetime_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    /// Validated table names
    pub fn table_names(&self) -> Result<TableNames, DataAccessError> {
        TableNames::new(&self.flat_table, &self.attribute_value_table)
    }

    /// Connection URL with the password masked, for log lines
    pub fn display_url(&self) -> String {
        match self.driver {
            DatabaseDriver::MySql => format!(
                "mysql://{}:***@{}:{}/{}",
                self.user, self.host, self.port, self.name
            ),
            DatabaseDriver::Sqlite => format!("sqlite://{}", self.sqlite_path.display()),
        }
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Cloud Translation v3
    #[default]
    Google,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google Cloud Translation",
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
        }
    }
}

/// Content type sent to the translation service
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub enum MimeType {
    /// Plain text
    #[default]
    #[serde(rename = "text/plain")]
    Plain,
    /// HTML, markup is preserved by the service
    #[serde(rename = "text/html")]
    Html,
}

impl MimeType {
    /// Value of the `mimeType` request field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "text/plain",
            Self::Html => "text/html",
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Cloud project id
    #[serde(default)]
    pub project_id: String,

    /// Cloud location of the translation resource
    #[serde(default = "default_location")]
    pub location: String,

    /// Service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// OAuth access token, sent as a bearer token.
    ///
    /// The token is used as given and never refreshed. Tokens printed by
    /// `gcloud auth print-access-token` expire after about an hour; once that
    /// happens every remaining pair fails with an authentication error, so
    /// long runs should be split (see `--limit`) or started with a fresh token.
    #[serde(default)]
    pub access_token: String,

    /// Content type of the product texts
    #[serde(default)]
    pub mime_type: MimeType,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for retryable failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            project_id: String::new(),
            location: default_location(),
            endpoint: default_endpoint(),
            access_token: String::new(),
            mime_type: MimeType::default(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_locale() -> String {
    "nl".to_string()
}

fn default_target_locales() -> Vec<String> {
    vec!["en".to_string(), "fr".to_string(), "de".to_string()]
}

fn default_db_host() -> String {
    "127.0.0.1".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("catalog.db")
}

fn default_flat_table() -> String {
    "trrc_product_flat".to_string()
}

fn default_attribute_value_table() -> String {
    "trrc_product_attribute_values".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_max_lifetime_secs() -> u64 {
    180
}

fn default_idle_timeout_secs() -> u64 {
    180
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_location() -> String {
    "global".to_string()
}

fn default_endpoint() -> String {
    "https://translation.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

/// Source of environment values, so overrides can be tested without
/// touching the process environment
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Config {
    /// Load configuration from a JSON file, writing a default one if missing
    pub fn load_or_create(path: &Path) -> Result<(Self, bool)> {
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok((config, false));
        }

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok((config, true))
    }

    /// Apply `DATABASE_*` and `GOOGLE_*` environment overrides
    pub fn apply_env_overrides(&mut self, env: &impl EnvSource) -> Result<()> {
        if let Some(user) = env.var("DATABASE_USER") {
            self.database.user = user;
        }
        if let Some(password) = env.var("DATABASE_PASS") {
            self.database.password = password;
        }
        if let Some(host) = env.var("DATABASE_HOST") {
            self.database.host = host;
        }
        if let Some(port) = env.var("DATABASE_PORT") {
            self.database.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid DATABASE_PORT: {}", port))?;
        }
        if let Some(name) = env.var("DATABASE_NAME") {
            self.database.name = name;
        }
        if let Some(project_id) = env.var("GOOGLE_PROJECT_ID") {
            self.translation.project_id = project_id;
        }
        if let Some(token) = env.var("GOOGLE_ACCESS_TOKEN") {
            self.translation.access_token = token;
        }
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        locale_utils::parse_locale(&self.source_locale)
            .with_context(|| format!("Invalid source locale: {}", self.source_locale))?;

        if self.target_locales.is_empty() {
            return Err(anyhow!("At least one target locale is required"));
        }

        let mut seen = HashSet::new();
        for locale in &self.target_locales {
            let code = locale_utils::to_service_code(locale)
                .with_context(|| format!("Invalid target locale: {}", locale))?;
            if locale_utils::locales_match(locale, &self.source_locale) {
                return Err(anyhow!("Target locale {} is the source locale", locale));
            }
            if !seen.insert(code) {
                return Err(anyhow!("Target locale {} is listed twice", locale));
            }
        }

        if !self.attributes.are_distinct() {
            return Err(anyhow!("Attribute ids must be distinct: {:?}", self.attributes));
        }

        for table in [&self.database.flat_table, &self.database.attribute_value_table] {
            if !is_valid_identifier(table) {
                return Err(anyhow!("Invalid table name: {}", table));
            }
        }

        match self.database.driver {
            DatabaseDriver::MySql => {
                if self.database.user.is_empty() || self.database.name.is_empty() {
                    return Err(anyhow!("Database user and name are required for the MySQL driver"));
                }
                if self.database.max_connections == 0 {
                    return Err(anyhow!("max_connections must be at least 1"));
                }
            }
            DatabaseDriver::Sqlite => {
                if self.database.sqlite_path.as_os_str().is_empty() {
                    return Err(anyhow!("sqlite_path is required for the SQLite driver"));
                }
            }
        }

        match self.translation.provider {
            TranslationProvider::Google => {
                if self.translation.project_id.is_empty() {
                    return Err(anyhow!("Translation project id is required for Google"));
                }
                if self.translation.access_token.is_empty() {
                    return Err(anyhow!("Translation access token is required for Google"));
                }
                url::Url::parse(&self.translation.endpoint)
                    .with_context(|| format!("Invalid translation endpoint: {}", self.translation.endpoint))?;
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_locale: default_source_locale(),
            target_locales: default_target_locales(),
            attributes: AttributeIds::default(),
            database: DatabaseConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
