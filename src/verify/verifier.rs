//! Verification of deployed contracts
//!
//! Loads deployment records, matches them back to their source files, and
//! checks each contract through the explorer or the on-chain fallback.

use crate::compile::source;
use crate::config::{ConfigError, PipelineConfig};
use crate::deploy::record::{DeploymentRecord, DeploymentStore, RecordError};
use crate::verify::explorer::{ExplorerClient, VerifyRequest};
use ethers::providers::{Http, JsonRpcClient, Middleware, Provider};
use ethers::types::Address;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Pause between successive verifications in a batch
pub const VERIFY_INTERVAL: Duration = Duration::from_secs(1);

/// Verification stage errors
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Contract {0} is not deployed")]
    NotDeployed(String),
    #[error("Source code not found for {0}")]
    SourceNotFound(String),
    #[error("Invalid RPC endpoint: {0}")]
    Endpoint(String),
    #[error("Invalid address: {0}")]
    Address(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Record error: {0}")]
    Record(#[from] RecordError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of verifying one contract, held in memory for the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub name: String,
    pub verified: bool,
}

/// Verification stage over deployment records
pub struct Verifier<P: JsonRpcClient = Http> {
    provider: Provider<P>,
    explorer: Option<ExplorerClient>,
    contracts_dir: PathBuf,
    records: DeploymentStore,
}

impl Verifier {
    /// Prepare the stage from configuration.
    ///
    /// The RPC endpoint is required even with an explorer configured, since
    /// it backs the fallback existence check.
    pub fn new(config: &PipelineConfig) -> Result<Self, VerifyError> {
        let rpc_url = config.require_rpc()?;
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| VerifyError::Endpoint(e.to_string()))?;

        Ok(Self::with_provider(
            provider,
            config.explorer_api.as_deref().map(ExplorerClient::new),
            config.project_dir.clone(),
            DeploymentStore::new(config.deployments_dir()),
        ))
    }
}

impl<P: JsonRpcClient> Verifier<P> {
    /// Build the stage over an existing provider; [`Verifier::new`] wires
    /// this up from configuration.
    pub fn with_provider(
        provider: Provider<P>,
        explorer: Option<ExplorerClient>,
        contracts_dir: PathBuf,
        records: DeploymentStore,
    ) -> Self {
        Self {
            provider,
            explorer,
            contracts_dir,
            records,
        }
    }

    /// Names with deployment records, excluding the batch summary.
    pub fn deployed_contracts(&self) -> Result<Vec<String>, VerifyError> {
        Ok(self.records.list()?)
    }

    /// Verify one contract against its deployment record.
    pub async fn verify_contract(&self, name: &str) -> Result<VerificationResult, VerifyError> {
        let record = self
            .records
            .try_load(name)?
            .ok_or_else(|| VerifyError::NotDeployed(name.to_string()))?;
        let (path, text) = source::find_source(&self.contracts_dir, name)?
            .ok_or_else(|| VerifyError::SourceNotFound(name.to_string()))?;

        println!("   Address: {}", record.address);
        println!("   Tx Hash: {}", record.tx_hash);
        log::debug!("source for {} found at {}", name, path.display());

        let verified = match &self.explorer {
            Some(explorer) => self.verify_on_explorer(explorer, &record, &text).await,
            None => self.check_on_chain(&record).await?,
        };

        Ok(VerificationResult {
            name: name.to_string(),
            verified,
        })
    }

    /// Submit to the explorer; a transport or service failure is reported
    /// and counts as unverified.
    async fn verify_on_explorer(
        &self,
        explorer: &ExplorerClient,
        record: &DeploymentRecord,
        text: &str,
    ) -> bool {
        println!("\n🔍 Verifying {} on explorer...", record.name);

        let request = VerifyRequest::new(record.address.clone(), record.name.clone(), text);
        match explorer.submit(&request).await {
            Ok(response) if response.verified() => {
                println!("✅ {} verified successfully!", record.name);
                true
            }
            Ok(response) => {
                println!(
                    "❌ Verification failed: {}",
                    response.message.unwrap_or_default()
                );
                false
            }
            Err(e) => {
                println!("❌ Error during verification: {}", e);
                false
            }
        }
    }

    /// Fallback existence check: code present at the recorded address.
    ///
    /// This proves something is deployed there, not that it matches the
    /// source; byte-level verification needs the explorer path.
    async fn check_on_chain(&self, record: &DeploymentRecord) -> Result<bool, VerifyError> {
        let address: Address = record
            .address
            .parse()
            .map_err(|_| VerifyError::Address(record.address.clone()))?;

        let code = self
            .provider
            .get_code(address, None)
            .await
            .map_err(|e| VerifyError::Rpc(e.to_string()))?;

        if code.is_empty() {
            println!("❌ No code at address {}", record.address);
            Ok(false)
        } else {
            println!("✅ {} is deployed at {}", record.name, record.address);
            println!("   Code size: {} bytes", code.len());
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::MockProvider;
    use ethers::types::Bytes;
    use std::fs;
    use std::path::Path;

    fn test_config(project_dir: PathBuf) -> PipelineConfig {
        PipelineConfig {
            project_dir,
            rpc_url: Some("http://localhost:8545".to_string()),
            private_key: None,
            gas_limit: 3_000_000,
            gas_price: 1_000_000_000,
            explorer_url: None,
            explorer_api: None,
            solc_path: PathBuf::from("solc"),
        }
    }

    fn sample_record(name: &str) -> DeploymentRecord {
        DeploymentRecord::new(
            name,
            "0x52908400098527886E0F7030069857D2E4169EE7",
            "0xdeadbeef",
            "http://localhost:8545",
            "0x8617E340B3D01FA5F11F306F4090FD50E238070D",
        )
    }

    fn mocked_verifier(project_dir: &Path) -> (Verifier<MockProvider>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        let verifier = Verifier::with_provider(
            provider,
            None,
            project_dir.to_path_buf(),
            DeploymentStore::new(project_dir.join("deployments")),
        );
        (verifier, mock)
    }

    #[test]
    fn test_new_requires_rpc() {
        let config = PipelineConfig {
            rpc_url: None,
            ..test_config(PathBuf::from("."))
        };
        assert!(matches!(
            Verifier::new(&config),
            Err(VerifyError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_record_is_not_deployed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let verifier = Verifier::new(&test_config(temp_dir.path().to_path_buf())).unwrap();

        let err = verifier.verify_contract("Token").await.unwrap_err();
        assert!(matches!(err, VerifyError::NotDeployed(name) if name == "Token"));
    }

    #[tokio::test]
    async fn test_missing_source_is_reported() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = test_config(temp_dir.path().to_path_buf());

        // A record exists but no .sol file declares the contract
        let store = DeploymentStore::new(config.deployments_dir());
        store.save(&sample_record("Token")).unwrap();
        fs::write(temp_dir.path().join("Other.sol"), "contract Other {}").unwrap();

        let verifier = Verifier::new(&config).unwrap();
        let err = verifier.verify_contract("Token").await.unwrap_err();
        assert!(matches!(err, VerifyError::SourceNotFound(name) if name == "Token"));
    }

    #[tokio::test]
    async fn test_fallback_verifies_when_code_present() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (verifier, mock) = mocked_verifier(temp_dir.path());

        verifier.records.save(&sample_record("Token")).unwrap();
        fs::write(temp_dir.path().join("Token.sol"), "contract Token {}").unwrap();

        mock.push(Bytes::from(vec![0x60, 0x80, 0x60, 0x40])).unwrap();
        let result = verifier.verify_contract("Token").await.unwrap();
        assert!(result.verified);
    }

    #[tokio::test]
    async fn test_fallback_rejects_when_code_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (verifier, mock) = mocked_verifier(temp_dir.path());

        verifier.records.save(&sample_record("Token")).unwrap();
        fs::write(temp_dir.path().join("Token.sol"), "contract Token {}").unwrap();

        mock.push(Bytes::default()).unwrap();
        let result = verifier.verify_contract("Token").await.unwrap();
        assert!(!result.verified);
    }

    #[test]
    fn test_deployed_contracts_excludes_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = test_config(temp_dir.path().to_path_buf());

        let store = DeploymentStore::new(config.deployments_dir());
        store.save(&sample_record("Token")).unwrap();
        store
            .save_summary(&crate::deploy::DeploymentSummary::from_records(&[]))
            .unwrap();

        let verifier = Verifier::new(&config).unwrap();
        assert_eq!(verifier.deployed_contracts().unwrap(), vec!["Token"]);
    }
}
