use crate::config::types::{
    Config, CrawlerConfig, DomainConfig, EngineConfig, OutputConfig, ScreenshotConfig,
};
use crate::url::{normalize_url, DomainPattern};
use crate::ConfigError;
use std::collections::HashSet;

/// Bounds for the per-navigation timeout (milliseconds)
const MIN_NAVIGATION_TIMEOUT: u64 = 100;
const MAX_NAVIGATION_TIMEOUT: u64 = 600_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_domain_config(&config.domain)?;
    validate_screenshot_config(&config.screenshots)?;
    validate_engine_config(&config.engine)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    let mut distinct = HashSet::new();
    for seed in &config.seeds {
        let url = normalize_url(seed).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
        })?;
        distinct.insert(url.to_string());
    }

    if config.max_links < 1 {
        return Err(ConfigError::Validation(format!(
            "max_links must be >= 1, got {}",
            config.max_links
        )));
    }

    if distinct.len() > config.max_links {
        return Err(ConfigError::Validation(format!(
            "{} distinct seed URLs exceed max_links ({})",
            distinct.len(),
            config.max_links
        )));
    }

    if config.relaunch_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "relaunch_interval must be >= 1, got {}",
            config.relaunch_interval
        )));
    }

    if config.navigation_timeout < MIN_NAVIGATION_TIMEOUT
        || config.navigation_timeout > MAX_NAVIGATION_TIMEOUT
    {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout must be between {} and {} ms, got {}ms",
            MIN_NAVIGATION_TIMEOUT, MAX_NAVIGATION_TIMEOUT, config.navigation_timeout
        )));
    }

    Ok(())
}

/// Validates the domain allow-list
fn validate_domain_config(config: &DomainConfig) -> Result<(), ConfigError> {
    match (&config.allow, config.enforce) {
        (Some(pattern), _) => {
            DomainPattern::parse(pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("domain.allow: {}", e)))?;
        }
        (None, true) => {
            return Err(ConfigError::Validation(
                "domain.allow is required when domain.enforce is true".to_string(),
            ));
        }
        (None, false) => {}
    }

    Ok(())
}

/// Validates screenshot configuration
fn validate_screenshot_config(config: &ScreenshotConfig) -> Result<(), ConfigError> {
    if config.any_enabled() && config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "screenshots.directory cannot be empty when captures are enabled".to_string(),
        ));
    }

    if config.source_annotation && config.highlight_style.trim().is_empty() {
        return Err(ConfigError::Validation(
            "screenshots.highlight-style cannot be empty when source-annotation is enabled"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validates engine configuration
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "engine.user-agent cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.executable {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "engine.executable cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("summary-path", &config.summary_path),
        ("database-path", &config.database_path),
    ] {
        if path.as_deref().map_or(false, |p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "output.{} cannot be empty when set",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::WaitUntil;

    fn crawler(seeds: &[&str], max_links: usize) -> CrawlerConfig {
        CrawlerConfig {
            seeds: seeds.iter().map(|s| s.to_string()).collect(),
            max_links,
            relaunch_interval: 5,
            navigation_timeout: 30_000,
            wait_until: WaitUntil::NetworkIdle,
        }
    }

    #[test]
    fn test_valid_crawler_config() {
        assert!(validate_crawler_config(&crawler(&["https://example.com/"], 10)).is_ok());
    }

    #[test]
    fn test_seeds_required() {
        assert!(validate_crawler_config(&crawler(&[], 10)).is_err());
    }

    #[test]
    fn test_relative_seed_rejected() {
        let result = validate_crawler_config(&crawler(&["/relative"], 10));
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_seeds_cannot_exceed_cap() {
        let config = crawler(&["https://a.com/", "https://b.com/", "https://c.com/"], 2);
        assert!(validate_crawler_config(&config).is_err());

        // Duplicates count once
        let config = crawler(&["https://a.com/", "https://a.com/#top"], 1);
        assert!(validate_crawler_config(&config).is_ok());
    }

    #[test]
    fn test_zero_relaunch_interval() {
        let mut config = crawler(&["https://example.com/"], 10);
        config.relaunch_interval = 0;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = crawler(&["https://example.com/"], 10);
        config.navigation_timeout = 50;
        assert!(validate_crawler_config(&config).is_err());
        config.navigation_timeout = 700_000;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_enforce_requires_allow() {
        let config = DomainConfig {
            enforce: true,
            ..DomainConfig::default()
        };
        assert!(validate_domain_config(&config).is_err());

        let config = DomainConfig {
            enforce: true,
            allow: Some("*.example.com".to_string()),
            ..DomainConfig::default()
        };
        assert!(validate_domain_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_allow_pattern() {
        let config = DomainConfig {
            allow: Some("bad..pattern".to_string()),
            ..DomainConfig::default()
        };
        assert!(matches!(
            validate_domain_config(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_screenshot_directory_required_when_enabled() {
        let config = ScreenshotConfig {
            destination_failure: true,
            directory: " ".to_string(),
            ..ScreenshotConfig::default()
        };
        assert!(validate_screenshot_config(&config).is_err());
    }

    #[test]
    fn test_empty_output_path_rejected() {
        let config = OutputConfig {
            summary_path: Some(String::new()),
            database_path: None,
        };
        assert!(validate_output_config(&config).is_err());
    }
}
