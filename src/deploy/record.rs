//! Deployment records
//!
//! One JSON file per deployed contract plus a per-run summary, written by
//! the deployment stage and read back by verification. Later deployments
//! overwrite earlier records for the same contract name.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the batch summary, excluded from per-contract listings
pub const SUMMARY_FILE: &str = "summary.json";

/// Record store errors
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Metadata for one on-chain instantiation of a contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub name: String,
    pub address: String,
    pub tx_hash: String,
    pub deployed_at: String,
    pub network: String,
    pub deployer: String,
}

impl DeploymentRecord {
    /// Build a record stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        tx_hash: impl Into<String>,
        network: impl Into<String>,
        deployer: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            tx_hash: tx_hash.into(),
            deployed_at: Utc::now().to_rfc3339(),
            network: network.into(),
            deployer: deployer.into(),
        }
    }
}

/// Aggregate of every successful deployment in a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSummary {
    pub timestamp: String,
    pub deployer: String,
    pub network: String,
    pub contracts: Vec<SummaryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    pub name: String,
    pub address: String,
    pub tx_hash: String,
}

impl DeploymentSummary {
    /// Summarize a batch of successful deployments.
    pub fn from_records(records: &[DeploymentRecord]) -> Self {
        let first = records.first();

        Self {
            timestamp: Utc::now().to_rfc3339(),
            deployer: first.map(|r| r.deployer.clone()).unwrap_or_default(),
            network: first.map(|r| r.network.clone()).unwrap_or_default(),
            contracts: records
                .iter()
                .map(|r| SummaryEntry {
                    name: r.name.clone(),
                    address: r.address.clone(),
                    tx_hash: r.tx_hash.clone(),
                })
                .collect(),
        }
    }
}

/// On-disk store of deployment records
pub struct DeploymentStore {
    deployments_dir: PathBuf,
}

impl DeploymentStore {
    /// Create a store over the given deployments directory.
    pub fn new(deployments_dir: impl Into<PathBuf>) -> Self {
        Self {
            deployments_dir: deployments_dir.into(),
        }
    }

    /// Path of the named contract's deployment record.
    pub fn path(&self, name: &str) -> PathBuf {
        self.deployments_dir.join(format!("{}.json", name))
    }

    /// Whether a deployment record exists for the named contract.
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Persist a record, overwriting any previous deployment of the name.
    pub fn save(&self, record: &DeploymentRecord) -> Result<PathBuf, RecordError> {
        let path = self.path(&record.name);
        self.write_json(&path, record)?;
        Ok(path)
    }

    /// Load the named contract's record, or `None` when it was never deployed.
    pub fn try_load(&self, name: &str) -> Result<Option<DeploymentRecord>, RecordError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }

        let file = fs::File::open(&path)?;
        Ok(Some(serde_json::from_reader(BufReader::new(file))?))
    }

    /// Deployed contract names, excluding the batch summary, sorted.
    pub fn list(&self) -> Result<Vec<String>, RecordError> {
        let mut names = Vec::new();

        if !self.deployments_dir.exists() {
            return Ok(names);
        }

        for entry in fs::read_dir(&self.deployments_dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json")
                && path.file_name().map_or(false, |f| f != SUMMARY_FILE)
            {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Write the batch summary.
    pub fn save_summary(&self, summary: &DeploymentSummary) -> Result<PathBuf, RecordError> {
        let path = self.deployments_dir.join(SUMMARY_FILE);
        self.write_json(&path, summary)?;
        Ok(path)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), RecordError> {
        fs::create_dir_all(&self.deployments_dir)?;

        // Write to a temporary file first, then rename into place
        let temp_path = path.with_extension("json.tmp");
        let file = fs::File::create(&temp_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), value)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(name: &str) -> DeploymentRecord {
        DeploymentRecord::new(
            name,
            "0x52908400098527886E0F7030069857D2E4169EE7",
            "0xdeadbeef",
            "http://localhost:8545",
            "0x8617E340B3D01FA5F11F306F4090FD50E238070D",
        )
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(temp_dir.path());

        let record = sample_record("Token");
        store.save(&record).unwrap();
        assert!(store.exists("Token"));

        let loaded = store.try_load("Token").unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(!loaded.deployed_at.is_empty());
    }

    #[test]
    fn test_load_missing_is_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(temp_dir.path());

        assert!(store.try_load("Nope").unwrap().is_none());
    }

    #[test]
    fn test_list_excludes_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(temp_dir.path());

        store.save(&sample_record("Vault")).unwrap();
        store.save(&sample_record("Escrow")).unwrap();
        store
            .save_summary(&DeploymentSummary::from_records(&[sample_record("Vault")]))
            .unwrap();

        assert_eq!(store.list().unwrap(), vec!["Escrow", "Vault"]);
    }

    #[test]
    fn test_summary_lists_every_record() {
        let records = vec![
            sample_record("A"),
            sample_record("B"),
            sample_record("C"),
        ];

        let summary = DeploymentSummary::from_records(&records);
        assert_eq!(summary.contracts.len(), 3);
        assert_eq!(summary.deployer, records[0].deployer);
        assert_eq!(summary.network, records[0].network);

        for entry in &summary.contracts {
            assert!(!entry.name.is_empty());
            assert!(!entry.address.is_empty());
            assert!(!entry.tx_hash.is_empty());
        }
    }

    #[test]
    fn test_summary_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(temp_dir.path());

        let summary = DeploymentSummary::from_records(&[sample_record("Token")]);
        let path = store.save_summary(&summary).unwrap();

        let file = fs::File::open(path).unwrap();
        let loaded: DeploymentSummary = serde_json::from_reader(BufReader::new(file)).unwrap();
        assert_eq!(loaded, summary);
    }
}
