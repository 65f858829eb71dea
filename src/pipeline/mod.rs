//! Pipeline state
//!
//! Each contract moves through `unknown → compiled → deployed`; verification
//! results stay in memory, so the furthest persisted state is `deployed`.
//! The state is derived from the artifacts on disk, which keeps every stage
//! re-runnable: a re-run overwrites only the named contract's own files.

pub mod throttle;

pub use throttle::Throttle;

use crate::compile::ArtifactStore;
use crate::deploy::DeploymentStore;
use std::fmt;

/// Pipeline progress of a single contract, derived from disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractState {
    /// Source known, no build artifact yet
    Unknown,
    /// Build artifact present
    Compiled,
    /// Deployment record present
    Deployed,
}

impl fmt::Display for ContractState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContractState::Unknown => "unknown",
            ContractState::Compiled => "compiled",
            ContractState::Deployed => "deployed",
        };
        write!(f, "{}", label)
    }
}

/// Derive a contract's pipeline state from the stores.
pub fn contract_state(
    name: &str,
    artifacts: &ArtifactStore,
    records: &DeploymentStore,
) -> ContractState {
    if records.exists(name) {
        ContractState::Deployed
    } else if artifacts.exists(name) {
        ContractState::Compiled
    } else {
        ContractState::Unknown
    }
}
