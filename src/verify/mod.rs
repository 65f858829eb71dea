//! Verification stage
//!
//! Confirms deployed contracts against their source, through a block
//! explorer's verification endpoint when one is configured, otherwise by
//! checking that code exists at the recorded address.

pub mod explorer;
pub mod verifier;

pub use explorer::{ExplorerClient, VerifyRequest, VerifyResponse};
pub use verifier::{VerificationResult, Verifier, VerifyError, VERIFY_INTERVAL};
