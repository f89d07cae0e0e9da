use super::{types::Config, ConfigError, ProviderBackend};

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.worker.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "worker.concurrency must be at least 1".to_string(),
        ));
    }

    if config.worker.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "worker.queue_capacity must be at least 1".to_string(),
        ));
    }

    if config.search.max_parallel_searches == 0 {
        return Err(ConfigError::ValidationError(
            "search.max_parallel_searches must be at least 1".to_string(),
        ));
    }

    if config.search.provider_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "search.provider_timeout_secs must be at least 1".to_string(),
        ));
    }

    match config.provider.backend {
        ProviderBackend::Amadeus => {
            let Some(amadeus) = &config.provider.amadeus else {
                return Err(ConfigError::ValidationError(
                    "provider.amadeus is required when backend = \"amadeus\"".to_string(),
                ));
            };
            if amadeus.client_id.is_empty() || amadeus.client_secret.is_empty() {
                return Err(ConfigError::ValidationError(
                    "provider.amadeus.client_id and client_secret must be set".to_string(),
                ));
            }
        }
    }

    Ok(())
}
