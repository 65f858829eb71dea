//! Deployment stage
//!
//! Submits compiled artifacts to the configured network as deployment
//! transactions and records every successful deployment on disk.

pub mod deployer;
pub mod record;

pub use deployer::{DeployError, Deployer, DEPLOY_INTERVAL};
pub use record::{
    DeploymentRecord, DeploymentStore, DeploymentSummary, RecordError, SummaryEntry, SUMMARY_FILE,
};
