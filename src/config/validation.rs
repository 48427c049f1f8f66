use crate::config::types::{Config, CrawlerConfig, OutputConfig, SprawlConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on simultaneous fetches
const MAX_CONCURRENT_FETCHES: u32 = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let corpus = config.corpus()?;
    validate_crawler_config(&config.crawler)?;
    validate_sprawl_config(&config.sprawl)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;

    for seed in config.seed_references()? {
        if !corpus.is_article(&seed) {
            return Err(ConfigError::Validation(format!(
                "Seed '{}' is not an article under {}",
                seed,
                corpus.article_root()
            )));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > MAX_CONCURRENT_FETCHES
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and {}, got {}",
            MAX_CONCURRENT_FETCHES, config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates sprawl configuration
fn validate_sprawl_config(config: &SprawlConfig) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "sprawl must have at least one seed".to_string(),
        ));
    }

    if config.seeds.iter().any(|seed| seed.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "sprawl seeds cannot be empty strings".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("graph_path", &config.graph_path),
        ("database_path", &config.database_path),
        ("summary_path", &config.summary_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorpusConfig;

    fn create_test_config() -> Config {
        Config {
            corpus: CorpusConfig::default(),
            crawler: CrawlerConfig::default(),
            sprawl: SprawlConfig {
                iterations: 2,
                seeds: vec!["Europe".to_string()],
            },
            user_agent: UserAgentConfig {
                crawler_name: "TestSprawler".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            output: OutputConfig {
                graph_path: "./graph.json".to_string(),
                database_path: "./test.db".to_string(),
                summary_path: "./summary.md".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&create_test_config()).is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = create_test_config();
        config.crawler.max_concurrent_fetches = 0;
        assert!(validate(&config).is_err());

        config.crawler.max_concurrent_fetches = MAX_CONCURRENT_FETCHES + 1;
        assert!(validate(&config).is_err());

        config.crawler.max_concurrent_fetches = MAX_CONCURRENT_FETCHES;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = create_test_config();
        config.crawler.request_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_no_seeds_rejected() {
        let mut config = create_test_config();
        config.sprawl.seeds.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_off_corpus_seed_rejected() {
        let mut config = create_test_config();
        config.sprawl.seeds = vec!["https://example.com/wiki/Europe".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_bad_prefix_rejected() {
        let mut config = create_test_config();
        config.corpus.path_prefix = "wiki".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_crawler_name_characters() {
        let mut config = create_test_config();
        config.user_agent.crawler_name = "Bad Name!".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_output_path_rejected() {
        let mut config = create_test_config();
        config.output.graph_path.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }
}
