use crate::config::types::{ApiConfig, Config, DownloadConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Largest page size the catalog accepts
const MAX_PAGE_SIZE: u32 = 500;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_download_config(&config.download)?;
    Ok(())
}

/// Validates catalog API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Endpoint '{}' must use HTTP or HTTPS",
            config.endpoint
        )));
    }

    if let Some(key) = &config.api_key {
        validate_api_key(key)?;
    }

    Ok(())
}

/// Validates an API key: non-empty, no whitespace
pub fn validate_api_key(key: &str) -> Result<(), ConfigError> {
    if key.is_empty() {
        return Err(ConfigError::Validation("api_key cannot be empty".to_string()));
    }

    if key.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(
            "api_key cannot contain whitespace".to_string(),
        ));
    }

    Ok(())
}

/// Validates the identification sent in the User-Agent header
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    let name = &config.crawler_name;
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "crawler-name must be non-empty letters, digits and hyphens, got '{}'",
            name
        )));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    if let Some(email) = &config.contact_email {
        validate_email(email)?;
    }

    Ok(())
}

/// Validates download configuration
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Rejects option combinations that cannot run together
///
/// * an input file with an output file
/// * an input file with license filters
/// * an output file with license filters, since URL lists are never filtered
pub fn validate_mode_combination(
    has_input_file: bool,
    has_output_file: bool,
    has_license_filters: bool,
) -> Result<(), ConfigError> {
    if has_input_file && has_output_file {
        return Err(ConfigError::Conflict(
            "--input-file cannot be combined with --output-file".to_string(),
        ));
    }

    if has_input_file && has_license_filters {
        return Err(ConfigError::Conflict(
            "--input-file cannot be combined with license filters".to_string(),
        ));
    }

    if has_output_file && has_license_filters {
        return Err(ConfigError::Conflict(
            "--output-file cannot be combined with license filters".to_string(),
        ));
    }

    Ok(())
}

/// Basic email shape check: `local@domain.tld`
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.contains('@')
        }
        None => false,
    };

    if !valid {
        return Err(ConfigError::Validation(format!(
            "Invalid contact-email: '{}'",
            email
        )));
    }

    Ok(())
}
