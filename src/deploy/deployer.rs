//! Deployment transactions
//!
//! Wraps an ethers provider + wallet behind one client and turns build
//! artifacts into deployment transactions, one at a time: estimate gas for
//! information, submit with the configured limit and price, wait for the
//! receipt, persist the record.

use crate::compile::{ArtifactStore, BuildArtifact, CompileError};
use crate::config::{ConfigError, PipelineConfig};
use crate::deploy::record::{DeploymentRecord, DeploymentStore, RecordError};
use ethers::abi::token::{LenientTokenizer, Tokenizer};
use ethers::abi::{Abi, Constructor, Token};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Bytes, TransactionRequest, U256};
use ethers::utils::to_checksum;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Pause between successive deployments in a batch
pub const DEPLOY_INTERVAL: Duration = Duration::from_secs(2);

/// Deployment stage errors
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Contract {0} is not compiled")]
    NotCompiled(String),
    #[error("Invalid RPC endpoint: {0}")]
    Endpoint(String),
    #[error("Invalid signing key: {0}")]
    Credential(String),
    #[error("Invalid bytecode for {name}: {reason}")]
    Bytecode { name: String, reason: String },
    #[error("Invalid ABI for {name}: {reason}")]
    Abi { name: String, reason: String },
    #[error("Constructor arguments: {0}")]
    ConstructorArgs(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Transaction {tx_hash} was dropped before confirmation")]
    Dropped { tx_hash: String },
    #[error("No contract address in receipt for transaction {tx_hash}")]
    NoAddress { tx_hash: String },
    #[error("Artifact error: {0}")]
    Artifact(#[from] CompileError),
    #[error("Record error: {0}")]
    Record(#[from] RecordError),
}

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Signs and submits deployment transactions for compiled artifacts
pub struct Deployer<M: Middleware = Client> {
    client: Arc<M>,
    deployer_address: String,
    rpc_url: String,
    gas_limit: U256,
    gas_price: U256,
    explorer_url: Option<String>,
    artifacts: ArtifactStore,
    records: DeploymentStore,
}

impl Deployer {
    /// Connect to the configured network and prepare the signing wallet.
    ///
    /// Fails immediately when the endpoint or credential is missing.
    pub async fn connect(config: &PipelineConfig) -> Result<Self, DeployError> {
        let (rpc_url, private_key) = config.require_signer()?;

        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| DeployError::Endpoint(e.to_string()))?;
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| DeployError::Rpc(e.to_string()))?;

        let wallet = private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| DeployError::Credential(e.to_string()))?
            .with_chain_id(chain_id.as_u64());
        let address = to_checksum(&wallet.address(), None);

        Self::with_client(
            Arc::new(SignerMiddleware::new(provider, wallet)),
            address,
            config,
        )
    }
}

impl<M: Middleware> Deployer<M> {
    /// Build the stage over an existing client; [`Deployer::connect`] wires
    /// this up from configuration.
    pub fn with_client(
        client: Arc<M>,
        deployer_address: String,
        config: &PipelineConfig,
    ) -> Result<Self, DeployError> {
        let rpc_url = config.require_rpc()?.to_string();

        Ok(Self {
            client,
            deployer_address,
            rpc_url,
            gas_limit: U256::from(config.gas_limit),
            gas_price: U256::from(config.gas_price),
            explorer_url: config.explorer_url.clone(),
            artifacts: ArtifactStore::new(config.build_dir()),
            records: DeploymentStore::new(config.deployments_dir()),
        })
    }

    /// Checksummed address of the signing wallet.
    pub fn address(&self) -> &str {
        &self.deployer_address
    }

    /// The endpoint deployments are submitted to.
    pub fn network(&self) -> &str {
        &self.rpc_url
    }

    /// Deploy a contract by name from its build artifact.
    ///
    /// Fails with [`DeployError::NotCompiled`] when no artifact exists, so
    /// the caller can point at the compile stage.
    pub async fn deploy_named(
        &self,
        name: &str,
        args: &[String],
    ) -> Result<DeploymentRecord, DeployError> {
        let artifact = self
            .artifacts
            .try_load(name)?
            .ok_or_else(|| DeployError::NotCompiled(name.to_string()))?;
        self.deploy(&artifact, args).await
    }

    /// Submit a deployment transaction and wait for its receipt.
    pub async fn deploy(
        &self,
        artifact: &BuildArtifact,
        args: &[String],
    ) -> Result<DeploymentRecord, DeployError> {
        let name = &artifact.contract_name;
        println!("\n🚀 Deploying {}...", name);

        let calldata = deployment_calldata(artifact, args)?;
        let request = TransactionRequest::new()
            .data(Bytes::from(calldata))
            .gas(self.gas_limit)
            .gas_price(self.gas_price);
        let tx: TypedTransaction = request.into();

        // Informational only; a failed estimate is reported, never fatal
        match self.client.estimate_gas(&tx, None).await {
            Ok(estimate) => println!("   Estimated gas: {}", estimate),
            Err(e) => log::warn!("gas estimate for {} failed: {}", name, e),
        }

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| DeployError::Rpc(e.to_string()))?;
        let tx_hash = format!("{:?}", pending.tx_hash());
        println!("   Transaction hash: {}", tx_hash);
        println!("   Waiting for confirmation...");

        let receipt = pending
            .await
            .map_err(|e| DeployError::Rpc(e.to_string()))?
            .ok_or_else(|| DeployError::Dropped {
                tx_hash: tx_hash.clone(),
            })?;
        let address = receipt.contract_address.ok_or_else(|| DeployError::NoAddress {
            tx_hash: tx_hash.clone(),
        })?;
        let address = to_checksum(&address, None);

        println!("✅ {} deployed at: {}", name, address);
        if let Some(base) = &self.explorer_url {
            println!("   Explorer: {}/address/{}", base.trim_end_matches('/'), address);
        }

        let record = DeploymentRecord::new(
            name.clone(),
            address,
            format!("{:?}", receipt.transaction_hash),
            self.rpc_url.clone(),
            self.deployer_address.clone(),
        );
        let path = self.records.save(&record)?;
        log::debug!("deployment record written to {}", path.display());

        Ok(record)
    }
}

/// Assemble creation calldata: bytecode plus ABI-encoded constructor args.
fn deployment_calldata(artifact: &BuildArtifact, args: &[String]) -> Result<Vec<u8>, DeployError> {
    let name = &artifact.contract_name;

    let code = artifact.bytecode_bytes().map_err(|e| DeployError::Bytecode {
        name: name.clone(),
        reason: e.to_string(),
    })?;
    let abi: Abi = serde_json::from_value(artifact.abi.clone()).map_err(|e| DeployError::Abi {
        name: name.clone(),
        reason: e.to_string(),
    })?;

    match &abi.constructor {
        Some(constructor) => {
            let tokens = parse_constructor_args(constructor, args)?;
            constructor
                .encode_input(code, &tokens)
                .map_err(|e| DeployError::ConstructorArgs(e.to_string()))
        }
        None if !args.is_empty() => Err(DeployError::ConstructorArgs(format!(
            "{} has no constructor but {} argument(s) were given",
            name,
            args.len()
        ))),
        None => Ok(code),
    }
}

/// Tokenize string arguments against the constructor's parameter types.
fn parse_constructor_args(
    constructor: &Constructor,
    args: &[String],
) -> Result<Vec<Token>, DeployError> {
    if constructor.inputs.len() != args.len() {
        return Err(DeployError::ConstructorArgs(format!(
            "expected {} argument(s), got {}",
            constructor.inputs.len(),
            args.len()
        )));
    }

    constructor
        .inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            LenientTokenizer::tokenize(&param.kind, arg)
                .map_err(|e| DeployError::ConstructorArgs(format!("{}: {}", param.name, e)))
        })
        .collect()
}
