//! Configuration for the people service
//!
//! Every section has defaults, so a missing file or a partial file is fine.
//! Environment variables override the file; the command line overrides both.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use crate::constants::{
    DEFAULT_BODY_LIMIT, DEFAULT_CLIENT_TIMEOUT_MS, DEFAULT_DB_NAME, DEFAULT_DB_TYPENAME,
    DEFAULT_SERVICE_URL,
};
use crate::types::{Error, Result};

/// Available storage backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    /// In-process store
    #[serde(rename = "InMemoryDB")]
    InMemoryDb,
    /// External MongoDB adaptor
    #[serde(rename = "MongoDB")]
    MongoDb,
}

impl FromStr for StorageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "InMemoryDB" => Ok(StorageType::InMemoryDb),
            "MongoDB" => Ok(StorageType::MongoDb),
            other => Err(Error::config(format!("Unknown storage type: {}", other))),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::InMemoryDb => f.write_str("InMemoryDB"),
            StorageType::MongoDb => f.write_str("MongoDB"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development; error details are returned to callers
    #[default]
    Development,
    /// Automated tests; error details are returned to callers
    Test,
    /// Production; error bodies are withheld
    Production,
}

impl Environment {
    /// Whether error messages and stacks go into response bodies
    pub fn exposes_errors(&self) -> bool {
        *self != Environment::Production
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" => Ok(Environment::Production),
            other => Err(Error::config(format!("Unknown environment: {}", other))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Client configuration
    pub client: ClientConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: SocketAddr,

    /// Largest accepted request body in bytes
    #[serde(deserialize_with = "deserialize_byte_size")]
    pub body_limit: usize,

    /// Deployment environment
    pub environment: Environment,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend type
    pub storage_type: StorageType,

    /// Database name
    pub name: String,

    /// Name of the record type stored
    pub typename: String,
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Endpoint the client posts requests to
    pub service_url: String,

    /// Per-request timeout
    #[serde(deserialize_with = "deserialize_duration", serialize_with = "serialize_duration")]
    pub timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Master switch
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            body_limit: DEFAULT_BODY_LIMIT,
            environment: Environment::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::InMemoryDb,
            name: DEFAULT_DB_NAME.to_string(),
            typename: DEFAULT_DB_TYPENAME.to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_CLIENT_TIMEOUT_MS),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    ///
    /// Every valid override is applied. Invalid ones are collected and
    /// reported together, naming the variable each came from.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        // Server overrides
        if let Some(env) = lookup("PEOPLE_ENV") {
            match env.parse() {
                Ok(env) => self.server.environment = env,
                Err(e) => errors.push(override_error("PEOPLE_ENV", e)),
            }
        }

        if let Some(addr) = lookup("PEOPLE_HTTP_ADDR") {
            match addr.parse() {
                Ok(addr) => self.server.http_addr = addr,
                Err(e) => errors.push(format!("PEOPLE_HTTP_ADDR: Invalid HTTP address: {}", e)),
            }
        }

        if let Some(limit) = lookup("PEOPLE_BODY_LIMIT") {
            match parse_byte_size(&limit) {
                Ok(limit) => self.server.body_limit = limit,
                Err(e) => errors.push(format!("PEOPLE_BODY_LIMIT: {}", e)),
            }
        }

        // Storage overrides
        if let Some(db_type) = lookup("PEOPLE_DB_TYPE") {
            match db_type.parse() {
                Ok(db_type) => self.storage.storage_type = db_type,
                Err(e) => errors.push(override_error("PEOPLE_DB_TYPE", e)),
            }
        }

        // Client overrides
        if let Some(url) = lookup("PEOPLE_SERVICE_URL") {
            self.client.service_url = url;
        }

        // Logging overrides
        if let Some(level) = lookup("PEOPLE_LOG_LEVEL") {
            self.logging.level = level;
        }

        if lookup("DISABLE_LOGGING").is_some() {
            self.logging.enabled = false;
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::config(errors.join("; ")))
        }
    }

    /// Check that values are usable
    pub fn validate(&self) -> Result<()> {
        if self.server.body_limit == 0 {
            return Err(Error::config("Body limit must be greater than zero"));
        }

        if self.storage.name.is_empty() {
            return Err(Error::config("Storage name must not be empty"));
        }

        if !(self.client.service_url.starts_with("http://")
            || self.client.service_url.starts_with("https://"))
        {
            return Err(Error::config("Service URL must be http or https"));
        }

        if self.client.timeout.is_zero() {
            return Err(Error::config("Client timeout must be greater than zero"));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(Error::config("Invalid log level")),
        }

        Ok(())
    }
}

fn override_error(key: &str, error: Error) -> String {
    match error {
        Error::Config(msg) => format!("{}: {}", key, msg),
        other => format!("{}: {}", key, other),
    }
}

/// Load configuration from file, then apply environment overrides
///
/// A missing or unparseable file is an error, as is any bad override.
pub fn load_config(path: &str) -> Result<Config> {
    load_with(Some(path), |key| std::env::var(key).ok())
}

/// Load configuration from the given file, or start from defaults when no
/// file is named. Environment overrides apply either way.
pub fn load_config_or_default(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => load_with(None, |key| std::env::var(key).ok()),
    }
}

fn load_with<F>(path: Option<&str>, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_overrides(lookup)?;
    config.validate()?;
    Ok(config)
}

// Custom deserializer for byte sizes given as a number or a string like "100kb"
fn deserialize_byte_size<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    struct ByteSizeVisitor;

    impl<'de> Visitor<'de> for ByteSizeVisitor {
        type Value = usize;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a byte count or a size string like '100kb' or '1mb'")
        }

        fn visit_u64<E>(self, value: u64) -> std::result::Result<usize, E>
        where
            E: de::Error,
        {
            usize::try_from(value).map_err(E::custom)
        }

        fn visit_i64<E>(self, value: i64) -> std::result::Result<usize, E>
        where
            E: de::Error,
        {
            usize::try_from(value).map_err(E::custom)
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<usize, E>
        where
            E: de::Error,
        {
            parse_byte_size(value).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(ByteSizeVisitor)
}

// Custom deserializer for Duration from string or milliseconds
fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("milliseconds or a duration string like '500ms' or '5s'")
        }

        fn visit_u64<E>(self, value: u64) -> std::result::Result<Duration, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_millis(value))
        }

        fn visit_i64<E>(self, value: i64) -> std::result::Result<Duration, E>
        where
            E: de::Error,
        {
            u64::try_from(value).map(Duration::from_millis).map_err(E::custom)
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Duration, E>
        where
            E: de::Error,
        {
            parse_duration(value).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{}ms", duration.as_millis()))
}

/// Parse sizes such as `1024`, `100kb` or `1mb` (case-insensitive, 1kb = 1024 bytes)
pub fn parse_byte_size(s: &str) -> std::result::Result<usize, String> {
    let s = s.trim().to_ascii_lowercase();
    let (digits, multiplier) = if let Some(n) = s.strip_suffix("gb") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("mb") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("kb") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('b') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };

    let value: usize = digits.trim().parse()
        .map_err(|_| format!("Invalid byte size: {}", s))?;
    value.checked_mul(multiplier)
        .ok_or_else(|| format!("Byte size too large: {}", s))
}

// Simple duration parser for common formats
fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    if let Some(ms) = s.strip_suffix("ms") {
        let ms: u64 = ms.parse().map_err(|_| "Invalid milliseconds")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(secs) = s.strip_suffix('s') {
        let secs: u64 = secs.parse().map_err(|_| "Invalid seconds")?;
        Ok(Duration::from_secs(secs))
    } else if let Some(mins) = s.strip_suffix('m') {
        let mins: u64 = mins.parse().map_err(|_| "Invalid minutes")?;
        Ok(Duration::from_secs(mins * 60))
    } else {
        // Raw milliseconds
        let ms: u64 = s.parse().map_err(|_| "Invalid duration format")?;
        Ok(Duration::from_millis(ms))
    }
}
