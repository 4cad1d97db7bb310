//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Checks that every setting converts into a usable runtime value.
pub fn check(config: &ClientConfig) -> ClientResult<()> {
    config.api.to_api_config().map_err(ClientError::Config)?;
    config
        .display
        .to_normalizer_config()
        .map_err(ClientError::Config)?;
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    check(config)?;
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    let config_path = ClientConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(check(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn invalid_timezone_fails_validation() {
        let mut config = ClientConfig::default();
        config.display.timezone = "Nowhere/Special".to_string();

        let err = check(&config).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("Nowhere/Special"));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = ClientConfig::default();
        config.api.timeout = 0;

        let err = check(&config).unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }
}
