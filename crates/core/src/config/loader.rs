use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// Nested keys are addressed with a double underscore, e.g.
/// `FLOCK_PROVIDER__AMADEUS__CLIENT_SECRET`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("FLOCK_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PROVIDER: &str = r#"
[provider]
backend = "amadeus"

[provider.amadeus]
client_id = "id"
client_secret = "secret"
"#;

    #[test]
    fn test_search_and_worker_defaults() {
        let config = load_config_from_str(PROVIDER).unwrap();

        assert_eq!(config.search.max_parallel_searches, 1);
        assert_eq!(config.search.provider_timeout_secs, 30);
        assert_eq!(config.worker.concurrency, 2);
        assert_eq!(config.worker.queue_capacity, 256);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_search_worker_and_logging_sections() {
        let toml = format!(
            r#"
[search]
max_parallel_searches = 8
provider_timeout_secs = 5

[worker]
concurrency = 4
queue_capacity = 32

[logging]
format = "json"
{}"#,
            PROVIDER
        );

        let config = load_config_from_str(&toml).unwrap();
        assert_eq!(config.search.max_parallel_searches, 8);
        assert_eq!(config.search.provider_timeout_secs, 5);
        assert_eq!(config.worker.concurrency, 4);
        assert_eq!(config.worker.queue_capacity, 32);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let toml = r#"
[provider]
backend = "skyscanner"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/flock.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[database]
path = "/var/lib/flock/jobs.db"

[search]
max_parallel_searches = 3
{}"#,
            PROVIDER
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.database.path, Path::new("/var/lib/flock/jobs.db"));
        assert_eq!(config.search.max_parallel_searches, 3);
        assert_eq!(config.provider.amadeus.unwrap().client_id, "id");
    }
}
