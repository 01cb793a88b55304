//! Configuration loading and management
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 3000
//! listing:
//!   default_page_size: 20
//!   max_page_size: 100
//! auth:
//!   session_ttl_minutes: 480
//! registries:
//!   - singular: client
//!     plural: clients
//!     auth:
//!       read: authenticated
//!       write: role:admin,operator
//!       delete: admin_only
//! ```

use crate::core::auth::AuthPolicy;
use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Environment variable holding the configuration file path
pub const CONFIG_PATH_ENV: &str = "BACKOFFICE_CONFIG";
pub const HOST_ENV: &str = "BACKOFFICE_HOST";
pub const PORT_ENV: &str = "BACKOFFICE_PORT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_page_size() -> usize {
    20
}

fn default_max_page_size() -> usize {
    100
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl ListingConfig {
    /// Requested page size, defaulted and clamped to `[1, max_page_size]`
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Events buffered per slow subscriber
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    1024
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Administrator created at startup when no account uses its e-mail yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: i64,

    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// One year
pub const MAX_SESSION_TTL_MINUTES: i64 = 365 * 24 * 60;

fn default_session_ttl() -> i64 {
    8 * 60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_minutes: default_session_ttl(),
            bootstrap_admin: None,
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES))
    }
}

/// Authorization policies of a registry's operations
///
/// Examples: "public", "authenticated", "admin_only", "role:admin,operator"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryAuthConfig {
    /// List, view, export and live view
    #[serde(default = "default_read_policy")]
    pub read: String,

    /// Create, edit and status changes
    #[serde(default = "default_write_policy")]
    pub write: String,

    /// Single and bulk delete
    #[serde(default = "default_delete_policy")]
    pub delete: String,
}

fn default_read_policy() -> String {
    "authenticated".to_string()
}

fn default_write_policy() -> String {
    "role:admin,operator".to_string()
}

fn default_delete_policy() -> String {
    "admin_only".to_string()
}

impl Default for RegistryAuthConfig {
    fn default() -> Self {
        Self {
            read: default_read_policy(),
            write: default_write_policy(),
            delete: default_delete_policy(),
        }
    }
}

impl RegistryAuthConfig {
    /// Every operation restricted to administrators
    pub fn admin_only() -> Self {
        Self {
            read: "admin_only".to_string(),
            write: "admin_only".to_string(),
            delete: "admin_only".to_string(),
        }
    }

    pub fn policies(&self) -> RegistryPolicies {
        RegistryPolicies {
            read: AuthPolicy::parse_policy(&self.read),
            write: AuthPolicy::parse_policy(&self.write),
            delete: AuthPolicy::parse_policy(&self.delete),
        }
    }
}

/// Parsed registry policies
#[derive(Debug, Clone)]
pub struct RegistryPolicies {
    pub read: AuthPolicy,
    pub write: AuthPolicy,
    pub delete: AuthPolicy,
}

/// Configuration of one registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Singular form (e.g., "client")
    pub singular: String,

    /// Plural form used in URLs (e.g., "clients")
    pub plural: String,

    #[serde(default)]
    pub auth: RegistryAuthConfig,
}

impl RegistryConfig {
    pub fn new(singular: &str, plural: &str) -> Self {
        Self {
            singular: singular.to_string(),
            plural: plural.to_string(),
            auth: RegistryAuthConfig::default(),
        }
    }

    /// Built-in settings for a registry the configuration leaves out
    pub fn default_for(singular: &str, plural: &str) -> Self {
        default_registries()
            .into_iter()
            .find(|r| r.singular == singular)
            .unwrap_or_else(|| Self::new(singular, plural))
    }
}

fn default_registries() -> Vec<RegistryConfig> {
    vec![
        RegistryConfig::new("client", "clients"),
        RegistryConfig::new("product", "products"),
        RegistryConfig::new("carrier", "carriers"),
        RegistryConfig::new("supplier", "suppliers"),
        RegistryConfig::new("entry", "entries"),
        RegistryConfig {
            auth: RegistryAuthConfig::admin_only(),
            ..RegistryConfig::new("user", "users")
        },
    ]
}

/// Complete configuration of the back office
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub listing: ListingConfig,

    #[serde(default)]
    pub events: EventsConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default = "default_registries")]
    pub registries: Vec<RegistryConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Default configuration: every registry with default policies
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            listing: ListingConfig::default(),
            events: EventsConfig::default(),
            auth: AuthConfig::default(),
            registries: default_registries(),
        }
    }

    /// Load from `BACKOFFICE_CONFIG` (or defaults), apply environment
    /// overrides and validate
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                tracing::info!(path = %path, "loading configuration");
                Self::from_yaml_file(path)?
            }
            Err(_) => {
                tracing::info!("no {} set, using default configuration", CONFIG_PATH_ENV);
                Self::default_config()
            }
        };

        let config = config.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BACKOFFICE_HOST` / `BACKOFFICE_PORT` style overrides
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV) {
            self.server.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: port.clone(),
                message: "expected a port number".to_string(),
            })?;
        }
        Ok(self)
    }

    /// Reject inconsistent settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, value: String, message: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            message: message.to_string(),
        };

        if self.listing.default_page_size == 0 {
            return Err(invalid(
                "listing.default_page_size",
                "0".to_string(),
                "must be at least 1",
            ));
        }
        if self.listing.max_page_size < self.listing.default_page_size {
            return Err(invalid(
                "listing.max_page_size",
                self.listing.max_page_size.to_string(),
                "must not be smaller than default_page_size",
            ));
        }
        if self.events.capacity == 0 {
            return Err(invalid("events.capacity", "0".to_string(), "must be at least 1"));
        }
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&self.auth.session_ttl_minutes) {
            return Err(invalid(
                "auth.session_ttl_minutes",
                self.auth.session_ttl_minutes.to_string(),
                "must be between 1 and 525600 (one year)",
            ));
        }

        let mut seen = HashSet::new();
        for registry in &self.registries {
            for name in [&registry.singular, &registry.plural] {
                if !seen.insert(name.as_str()) {
                    return Err(invalid("registries", name.clone(), "duplicate registry name"));
                }
            }
            for (operation, policy) in [
                ("read", &registry.auth.read),
                ("write", &registry.auth.write),
                ("delete", &registry.auth.delete),
            ] {
                if AuthPolicy::try_parse(policy).is_none() {
                    return Err(invalid(
                        &format!("registries.{}.auth.{}", registry.singular, operation),
                        policy.clone(),
                        "unknown policy",
                    ));
                }
            }
        }

        Ok(())
    }

    /// Registry settings by singular name
    pub fn registry(&self, singular: &str) -> Option<&RegistryConfig> {
        self.registries.iter().find(|r| r.singular == singular)
    }

    /// Address to bind the HTTP server to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default_config();
        assert_eq!(config.registries.len(), 6);
        assert!(config.validate().is_ok());
        assert_eq!(config.registry("user").unwrap().auth.read, "admin_only");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_yaml_serialization() {
        let config = AppConfig::default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = AppConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.registries.len(), config.registries.len());
        assert_eq!(parsed.listing.max_page_size, config.listing.max_page_size);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = AppConfig::from_yaml_str("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.listing.default_page_size, 20);
        assert_eq!(config.registries.len(), 6);
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "listing:\n  default_page_size: 5\n  max_page_size: 50\nregistries:\n  - singular: client\n    plural: clientes\n"
        )
        .unwrap();

        let config = AppConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.listing.default_page_size, 5);
        assert_eq!(config.registries.len(), 1);
        assert_eq!(config.registry("client").unwrap().plural, "clientes");
        assert_eq!(
            config.registry("client").unwrap().auth.write,
            "role:admin,operator"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_yaml_file("/nonexistent/backoffice.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_bad_yaml() {
        let err = AppConfig::from_yaml_str("server: [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { file: None, .. }));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::default_config()
            .with_overrides(|key| match key {
                HOST_ENV => Some("127.0.0.1".to_string()),
                PORT_ENV => Some("9000".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9000");

        let err = AppConfig::default_config()
            .with_overrides(|key| (key == PORT_ENV).then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_page_sizes() {
        let mut config = AppConfig::default_config();
        config.listing.default_page_size = 50;
        config.listing.max_page_size = 10;
        assert!(config.validate().is_err());

        config.listing.default_page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_session_ttl() {
        let mut config = AppConfig::default_config();
        config.auth.session_ttl_minutes = MAX_SESSION_TTL_MINUTES;
        assert!(config.validate().is_ok());

        config.auth.session_ttl_minutes = i64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("auth.session_ttl_minutes"));
        assert_eq!(
            config.auth.session_ttl(),
            chrono::Duration::minutes(MAX_SESSION_TTL_MINUTES)
        );

        config.auth.session_ttl_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_duplicates_and_unknown_policies() {
        let mut config = AppConfig::default_config();
        config.registries.push(RegistryConfig::new("client", "clients"));
        assert!(config.validate().is_err());

        let mut config = AppConfig::default_config();
        config.registries[0].auth.delete = "owner".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("registries.client.auth.delete"));
    }

    #[test]
    fn test_page_size_clamped() {
        let listing = ListingConfig::default();
        assert_eq!(listing.page_size(None), 20);
        assert_eq!(listing.page_size(Some(0)), 1);
        assert_eq!(listing.page_size(Some(1000)), 100);
    }
}
