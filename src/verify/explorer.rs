//! Explorer verification client
//!
//! Submits contract source and compiler metadata to a block-explorer
//! verification endpoint and interprets its status reply.

use crate::compile::{OPTIMIZER_ENABLED, OPTIMIZER_RUNS, SOLC_VERSION};
use serde::{Deserialize, Serialize};

/// Request body for explorer verification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub address: String,
    pub contract_name: String,
    pub source_code: String,
    pub compiler_version: String,
    pub optimization_used: bool,
    pub runs: u32,
}

impl VerifyRequest {
    /// Build a request carrying the compiler settings the build pinned.
    pub fn new(
        address: impl Into<String>,
        contract_name: impl Into<String>,
        source_code: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            contract_name: contract_name.into(),
            source_code: source_code.into(),
            compiler_version: SOLC_VERSION.to_string(),
            optimization_used: OPTIMIZER_ENABLED,
            runs: OPTIMIZER_RUNS,
        }
    }
}

/// Explorer reply; status "1" means verified
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl VerifyResponse {
    /// Whether the explorer accepted the verification.
    pub fn verified(&self) -> bool {
        self.status == "1"
    }
}

/// HTTP client for a block-explorer verification endpoint
pub struct ExplorerClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ExplorerClient {
    /// Create a client for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Submit a verification request.
    ///
    /// `Ok` covers rejected verifications too; the caller reads the status.
    pub async fn submit(&self, request: &VerifyRequest) -> Result<VerifyResponse, reqwest::Error> {
        self.http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<VerifyResponse>()
            .await
    }
}
