use crate::config::types::{Config, NotifyConfig, ScraperConfig, SelectorConfig, StorageConfig};
use crate::scrape::FieldRule;
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use url::Url;

/// Prefix every Slack incoming webhook starts with
const SLACK_WEBHOOK_PREFIX: &str = "https://hooks.slack.com";

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_scraper_config(&config.scraper)?;
    validate_selectors(&config.selectors)?;
    validate_storage_config(&config.storage)?;
    validate_notify_config(&config.notify)?;
    Ok(())
}

/// Validates listing traversal settings
fn validate_scraper_config(config: &ScraperConfig) -> ConfigResult<()> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if !config.jobs_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "jobs-path must start with '/', got '{}'",
            config.jobs_path
        )));
    }

    if config.category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "category cannot be empty".to_string(),
        ));
    }

    if config.random_delay_min_ms > config.random_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "random-delay-min-ms ({}) must not exceed random-delay-max-ms ({})",
            config.random_delay_min_ms, config.random_delay_max_ms
        )));
    }

    if config.page_load_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "page-load-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every selector and field rule compiles
fn validate_selectors(config: &SelectorConfig) -> ConfigResult<()> {
    for (name, css) in [
        ("job-container", &config.job_container),
        ("job-item", &config.job_item),
        ("pagination", &config.pagination),
        ("pagination-pages", &config.pagination_pages),
    ] {
        Selector::parse(css)
            .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {:?}", name, css, e)))?;
    }

    if config.id.is_empty() {
        return Err(ConfigError::Validation(
            "selectors.id needs at least one rule".to_string(),
        ));
    }

    for (name, rules) in [
        ("id", &config.id),
        ("title", &config.title),
        ("url", &config.url),
        ("budget", &config.budget),
        ("client-name", &config.client_name),
        ("client-country", &config.client_country),
        ("client-payment-verified", &config.client_payment_verified),
    ] {
        for rule in rules {
            FieldRule::parse(rule).map_err(|e| {
                ConfigError::InvalidSelector(format!("{} rule '{}': {}", name, rule, e))
            })?;
        }
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.max_jobs < 1 {
        return Err(ConfigError::Validation(format!(
            "max-jobs must be >= 1, got {}",
            config.max_jobs
        )));
    }

    Ok(())
}

/// Validates notification configuration
fn validate_notify_config(config: &NotifyConfig) -> ConfigResult<()> {
    let webhook = config
        .slack_webhook_url
        .as_deref()
        .filter(|w| !w.trim().is_empty());
    if let Some(webhook) = webhook {
        if !webhook.trim().starts_with(SLACK_WEBHOOK_PREFIX) {
            return Err(ConfigError::InvalidUrl(format!(
                "slack-webhook-url should start with '{}'",
                SLACK_WEBHOOK_PREFIX
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            scraper: toml::from_str(r#"base-url = "https://www.workana.com""#).unwrap(),
            selectors: SelectorConfig::default(),
            storage: StorageConfig {
                database_path: "./jobs.db".to_string(),
                max_jobs: 100,
            },
            notify: NotifyConfig::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_rejects_inverted_random_delay() {
        let mut config = valid_config();
        config.scraper.random_delay_min_ms = 900;
        config.scraper.random_delay_max_ms = 100;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_bad_selector() {
        let mut config = valid_config();
        config.selectors.job_item = "div[[".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_rejects_bad_field_rule() {
        let mut config = valid_config();
        config.selectors.budget = vec![".budget@".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_rejects_empty_id_rules() {
        let mut config = valid_config();
        config.selectors.id.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_non_slack_webhook() {
        let mut config = valid_config();
        config.notify.slack_webhook_url = Some("https://example.com/hook".to_string());
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.notify.slack_webhook_url =
            Some("https://hooks.slack.com/services/T/B/X".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_max_jobs() {
        let mut config = valid_config();
        config.storage.max_jobs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_relative_jobs_path() {
        let mut config = valid_config();
        config.scraper.jobs_path = "jobs".to_string();
        assert!(validate(&config).is_err());
    }
}
