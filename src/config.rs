//! This module provides functionality for loading and handling the application's configuration.
//!
//! It defines the `BotdeckConfig` struct, which holds the configuration parameters,
//! and a `load_config` function to load the configuration from a file.
//!
//! # Examples
//!
//! Loading the configuration from a file:
//!
//! ```no_run
//! use botdeck::config::{BotdeckConfig, load_config};
//!
//! let config_file_path = "/path/to/config.yaml";
//! let config: BotdeckConfig = load_config(config_file_path).unwrap();
//! println!("{:?}", config);
//! ```

use serde::{Deserialize, Serialize};
use std::{error::Error, fs, time::Duration};

/// Represents the application's configuration.
///
/// This struct holds the parameters needed to talk to the dashboard backend:
/// the API base URL and the two transport timeouts. It can be constructed by
/// loading a YAML configuration file using the `load_config` function.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct BotdeckConfig {
    /// Base URL of the dashboard backend (e.g. `http://localhost:8000`).
    pub api_base: String,

    /// Default per-request timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Extended timeout for chatbot updates carrying knowledge files, in
    /// seconds. Large uploads are the only calls that use it.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_upload_timeout_secs() -> u64 {
    300
}

impl BotdeckConfig {
    /// The default per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The extended upload timeout as a [`Duration`].
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl Default for BotdeckConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
            upload_timeout_secs: default_upload_timeout_secs(),
        }
    }
}

/// Loads the application's configuration from a YAML file.
///
/// This function reads the file at the given path, parses it as YAML, and
/// constructs a `BotdeckConfig` struct from it.
///
/// # Parameters
///
/// - `file`: The path to the YAML configuration file.
///
/// # Returns
///
/// - `Ok(BotdeckConfig)`: The loaded configuration.
/// - `Err(Box<dyn Error>)`: An error occurred while reading the file or parsing the YAML.
///
/// # Examples
///
/// ```no_run
/// use botdeck::config::load_config;
///
/// let config_file_path = "/path/to/config.yaml";
/// match load_config(config_file_path) {
///     Ok(config) => println!("{:?}", config),
///     Err(err) => eprintln!("Error loading config: {}", err),
/// }
/// ```
pub fn load_config(file: &str) -> Result<BotdeckConfig, Box<dyn Error>> {
    let content = fs::read_to_string(file)?;
    let config: BotdeckConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_valid_file() {
        // Create a temporary file with a valid configuration.
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
api_base: "http://example.com"
request_timeout_secs: 15
upload_timeout_secs: 600
"#
        )
        .unwrap();

        // Load the configuration from the temporary file.
        let config = load_config(temp_file.path().to_str().unwrap());

        // Assert that the configuration was loaded successfully and has the expected values.
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.api_base, "http://example.com");
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.upload_timeout(), Duration::from_secs(600));
    }

    #[test]
    fn test_load_config_timeouts_default() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"api_base: "http://example.com""#).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.upload_timeout_secs, 300);
    }

    #[test]
    fn test_load_config_invalid_file() {
        // Try to load a configuration from a non-existent file path.
        let config = load_config("non/existent/path");

        // Assert that an error occurred.
        assert!(config.is_err());
    }

    #[test]
    fn test_load_config_invalid_format() {
        // Create a temporary file with an invalid configuration format.
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"invalid: config: format"#).unwrap();

        // Try to load the configuration from the temporary file.
        let config = load_config(temp_file.path().to_str().unwrap());

        // Assert that an error occurred due to the invalid format.
        assert!(config.is_err());
    }
}
