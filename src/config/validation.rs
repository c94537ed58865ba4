use crate::config::types::{Config, CrawlerConfig, OutputConfig, RelevanceConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_relevance_config(&config.relevance)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_content_length < 1 {
        return Err(ConfigError::Validation(format!(
            "max_content_length must be >= 1, got {}",
            config.max_content_length
        )));
    }

    if config.fetch_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout must be >= 1s, got {}s",
            config.fetch_timeout
        )));
    }

    Ok(())
}

/// Validates keyword and extension lists
fn validate_relevance_config(config: &RelevanceConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "keywords cannot be empty".to_string(),
        ));
    }

    if config.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "keywords cannot contain blank entries".to_string(),
        ));
    }

    validate_extensions("asset_extensions", &config.asset_extensions)?;
    validate_extensions("image_extensions", &config.image_extensions)?;

    if let Some(ext) = config.asset_extensions.iter().find(|a| {
        config
            .image_extensions
            .iter()
            .any(|i| i.eq_ignore_ascii_case(a))
    }) {
        return Err(ConfigError::Validation(format!(
            "extension '{}' is listed both as asset and image",
            ext
        )));
    }

    Ok(())
}

fn validate_extensions(name: &str, extensions: &[String]) -> Result<(), ConfigError> {
    if extensions.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    for ext in extensions {
        if ext.is_empty() || ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "{} entries must be non-empty and written without a leading dot, got '{}'",
                name, ext
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("input_path", &config.input_path),
        ("directory", &config.directory),
        ("aggregate_path", &config.aggregate_path),
        ("error_log", &config.error_log),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}
