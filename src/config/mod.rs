//! Pipeline configuration
//!
//! Loads settings from the environment once at startup into an explicit
//! struct that is passed by reference into each stage. Stages validate the
//! values they need before doing any work.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default gas limit for deployment transactions
pub const DEFAULT_GAS_LIMIT: u64 = 3_000_000;
/// Default gas price in wei
pub const DEFAULT_GAS_PRICE: u64 = 1_000_000_000;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing {0} (set it in .env or the environment)")]
    Missing(&'static str),
    #[error("Invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Project directory holding contract sources, `build/`, `deployments/`
    pub project_dir: PathBuf,
    /// JSON-RPC endpoint of the target network
    pub rpc_url: Option<String>,
    /// Hex-encoded private key used to sign deployment transactions
    pub private_key: Option<String>,
    /// Gas limit applied to every deployment transaction
    pub gas_limit: u64,
    /// Gas price in wei applied to every deployment transaction
    pub gas_price: u64,
    /// Block-explorer base URL, used to print browse links after deployment
    pub explorer_url: Option<String>,
    /// Explorer verification endpoint; absent selects the on-chain fallback
    pub explorer_api: Option<String>,
    /// Path of the solc binary
    pub solc_path: PathBuf,
}

impl PipelineConfig {
    /// Build the configuration from the process environment.
    ///
    /// Missing endpoint/credential values are not an error here; the stages
    /// that need them fail at startup instead, so compile-only runs work
    /// without any environment.
    pub fn from_env(project_dir: PathBuf) -> Result<Self, ConfigError> {
        Ok(Self {
            project_dir,
            rpc_url: non_empty(env::var("RPC_URL").ok()),
            private_key: non_empty(env::var("PRIVATE_KEY").ok()),
            gas_limit: parse_env("GAS_LIMIT", DEFAULT_GAS_LIMIT)?,
            gas_price: parse_env("GAS_PRICE", DEFAULT_GAS_PRICE)?,
            explorer_url: non_empty(env::var("EXPLORER_URL").ok()),
            explorer_api: non_empty(env::var("EXPLORER_API").ok()),
            solc_path: env::var("SOLC_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("solc")),
        })
    }

    /// Directory holding build artifacts
    pub fn build_dir(&self) -> PathBuf {
        self.project_dir.join("build")
    }

    /// Directory holding deployment records
    pub fn deployments_dir(&self) -> PathBuf {
        self.project_dir.join("deployments")
    }

    /// Endpoint and credential needed to sign and submit transactions.
    pub fn require_signer(&self) -> Result<(&str, &str), ConfigError> {
        let rpc_url = self.require_rpc()?;
        let private_key = self
            .private_key
            .as_deref()
            .ok_or(ConfigError::Missing("PRIVATE_KEY"))?;
        Ok((rpc_url, private_key))
    }

    /// Endpoint needed for read-only chain queries.
    pub fn require_rpc(&self) -> Result<&str, ConfigError> {
        self.rpc_url.as_deref().ok_or(ConfigError::Missing("RPC_URL"))
    }
}

/// Treat unset and blank environment values the same way.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Read an integer from the environment, falling back to a default.
fn parse_env(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(default);
            }
            trimmed.parse().map_err(|_| ConfigError::Invalid {
                name,
                value: value.clone(),
            })
        }
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_config() -> PipelineConfig {
        PipelineConfig {
            project_dir: PathBuf::from("."),
            rpc_url: None,
            private_key: None,
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price: DEFAULT_GAS_PRICE,
            explorer_url: None,
            explorer_api: None,
            solc_path: PathBuf::from("solc"),
        }
    }

    #[test]
    fn test_parse_env_default() {
        // Unique variable names: tests in this binary run in parallel
        assert_eq!(parse_env("PIPELINE_TEST_UNSET", 42).unwrap(), 42);
    }

    #[test]
    fn test_parse_env_value() {
        env::set_var("PIPELINE_TEST_GAS", "5000000");
        assert_eq!(parse_env("PIPELINE_TEST_GAS", 1).unwrap(), 5_000_000);
    }

    #[test]
    fn test_parse_env_invalid() {
        env::set_var("PIPELINE_TEST_BAD_GAS", "lots");
        assert!(parse_env("PIPELINE_TEST_BAD_GAS", 1).is_err());
    }

    #[test]
    fn test_parse_env_blank_uses_default() {
        env::set_var("PIPELINE_TEST_BLANK_GAS", "  ");
        assert_eq!(parse_env("PIPELINE_TEST_BLANK_GAS", 7).unwrap(), 7);
    }

    #[test]
    fn test_non_empty_filters_blank() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
    }

    #[test]
    fn test_require_signer_missing() {
        let config = empty_config();
        assert!(matches!(
            config.require_signer(),
            Err(ConfigError::Missing("RPC_URL"))
        ));

        let config = PipelineConfig {
            rpc_url: Some("http://localhost:8545".to_string()),
            ..empty_config()
        };
        assert!(matches!(
            config.require_signer(),
            Err(ConfigError::Missing("PRIVATE_KEY"))
        ));
    }

    #[test]
    fn test_require_signer_present() {
        let config = PipelineConfig {
            rpc_url: Some("http://localhost:8545".to_string()),
            private_key: Some("abc123".to_string()),
            ..empty_config()
        };
        let (rpc_url, private_key) = config.require_signer().unwrap();
        assert_eq!(rpc_url, "http://localhost:8545");
        assert_eq!(private_key, "abc123");
    }

    #[test]
    fn test_derived_dirs() {
        let config = PipelineConfig {
            project_dir: PathBuf::from("/tmp/project"),
            ..empty_config()
        };
        assert_eq!(config.build_dir(), PathBuf::from("/tmp/project/build"));
        assert_eq!(
            config.deployments_dir(),
            PathBuf::from("/tmp/project/deployments")
        );
    }
}
