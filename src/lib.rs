//! Contract Pipeline: compile, deploy, and verify EVM smart contracts
//!
//! This crate provides a three-stage command-line pipeline:
//! - Compile Solidity sources to build artifacts via the `solc` binary
//! - Deploy build artifacts to a configured network, recording each
//!   deployment on disk
//! - Verify deployed contracts through a block-explorer service, or fall
//!   back to checking that code exists at the recorded address
//!
//! Each stage reads the previous stage's output from disk, so stages can be
//! re-run independently and per contract.
//!
//! # Example
//!
//! ```ignore
//! use contract_pipeline::cli;
//! use contract_pipeline::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_env(".".into())?;
//!
//! // Compile every source file in the project directory
//! let artifacts = cli::cmd_compile_all(&config)?;
//! println!("{} contracts ready to deploy", artifacts.len());
//! ```

pub mod cli;
pub mod compile;
pub mod config;
pub mod deploy;
pub mod pipeline;
pub mod verify;

// Re-export commonly used types
pub use compile::{ArtifactStore, BuildArtifact, CompileError, SolcCompiler};
pub use config::{ConfigError, PipelineConfig};
pub use deploy::{DeployError, Deployer, DeploymentRecord, DeploymentStore, DeploymentSummary};
pub use pipeline::{ContractState, Throttle};
pub use verify::{VerificationResult, Verifier, VerifyError};
