use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("flock.db")
}

/// Flight search provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Provider backend type
    pub backend: ProviderBackend,
    /// Amadeus-specific configuration (required when backend = "amadeus")
    #[serde(default)]
    pub amadeus: Option<AmadeusConfig>,
}

/// Available flight search backends
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderBackend {
    Amadeus,
}

/// Amadeus self-service API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AmadeusConfig {
    /// API base URL (test or production environment)
    #[serde(default = "default_amadeus_url")]
    pub base_url: String,
    /// OAuth2 client id
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// HTTP request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Ask the provider to price offers in this currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Upper bound on offers returned per search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

fn default_amadeus_url() -> String {
    "https://test.api.amadeus.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Fan-out behaviour of a single job
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Provider calls in flight per job (1 = sequential)
    #[serde(default = "default_parallel_searches")]
    pub max_parallel_searches: usize,
    /// Deadline for one provider call, after which the pair counts as failed
    #[serde(default = "default_timeout")]
    pub provider_timeout_secs: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_parallel_searches: default_parallel_searches(),
            provider_timeout_secs: default_timeout(),
        }
    }
}

fn default_parallel_searches() -> usize {
    1
}

/// Background worker pool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Jobs processed concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Enqueued job ids buffered before submissions are refused
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_concurrency() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    256
}

/// Log output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub provider: SanitizedProviderConfig,
    pub search: SearchConfig,
    pub worker: WorkerConfig,
}

/// Sanitized provider config (credentials redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProviderConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amadeus: Option<SanitizedAmadeusConfig>,
}

/// Sanitized Amadeus config (client secret hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAmadeusConfig {
    pub base_url: String,
    pub client_id_configured: bool,
    pub client_secret_configured: bool,
    pub timeout_secs: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            provider: SanitizedProviderConfig {
                backend: match config.provider.backend {
                    ProviderBackend::Amadeus => "amadeus".to_string(),
                },
                amadeus: config
                    .provider
                    .amadeus
                    .as_ref()
                    .map(|a| SanitizedAmadeusConfig {
                        base_url: a.base_url.clone(),
                        client_id_configured: !a.client_id.is_empty(),
                        client_secret_configured: !a.client_secret.is_empty(),
                        timeout_secs: a.timeout_secs,
                        currency: a.currency.clone(),
                    }),
            },
            search: config.search.clone(),
            worker: config.worker.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[provider]
backend = "amadeus"

[provider.amadeus]
client_id = "id"
client_secret = "secret"
"#;

    #[test]
    fn test_deserialize_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert!(config.server.cors_allowed_origins.is_empty());
        assert_eq!(config.database.path.to_str().unwrap(), "flock.db");
        assert_eq!(config.search.max_parallel_searches, 1);
        assert_eq!(config.search.provider_timeout_secs, 30);
        assert_eq!(config.worker.concurrency, 2);
        assert_eq!(config.worker.queue_capacity, 256);
        assert_eq!(config.logging.format, LogFormat::Pretty);

        let amadeus = config.provider.amadeus.as_ref().unwrap();
        assert_eq!(amadeus.base_url, "https://test.api.amadeus.com");
        assert_eq!(amadeus.timeout_secs, 30);
        assert!(amadeus.currency.is_none());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
cors_allowed_origins = ["http://localhost:5173"]

[database]
path = "/data/flock.sqlite"

[provider]
backend = "amadeus"

[provider.amadeus]
base_url = "https://api.amadeus.com"
client_id = "id"
client_secret = "secret"
timeout_secs = 10
currency = "EUR"
max_results = 20

[search]
max_parallel_searches = 4
provider_timeout_secs = 15

[worker]
concurrency = 8
queue_capacity = 32

[logging]
format = "json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.cors_allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.database.path.to_str().unwrap(), "/data/flock.sqlite");
        assert_eq!(config.search.max_parallel_searches, 4);
        assert_eq!(config.search.provider_timeout_secs, 15);
        assert_eq!(config.worker.concurrency, 8);
        assert_eq!(config.logging.format, LogFormat::Json);

        let amadeus = config.provider.amadeus.as_ref().unwrap();
        assert_eq!(amadeus.currency.as_deref(), Some("EUR"));
        assert_eq!(amadeus.max_results, Some(20));
    }

    #[test]
    fn test_deserialize_missing_provider_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_secret() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.provider.backend, "amadeus");

        let amadeus = sanitized.provider.amadeus.as_ref().unwrap();
        assert!(amadeus.client_id_configured);
        assert!(amadeus.client_secret_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret\""));
    }
}
