//! Build artifacts
//!
//! One JSON file per compiled contract under the build directory, keyed by
//! contract name and overwritten on recompilation. Written only by the
//! compiler stage; the deployment stage reads them back.

use crate::compile::solc::CompileError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// A compiled contract: name, ABI, and creation bytecode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildArtifact {
    pub contract_name: String,
    /// ABI as emitted by the compiler
    pub abi: serde_json::Value,
    /// Hex-encoded creation bytecode
    pub bytecode: String,
}

impl BuildArtifact {
    /// Decode the creation bytecode into raw bytes.
    pub fn bytecode_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(self.bytecode.trim_start_matches("0x"))
    }
}

/// On-disk store of build artifacts
pub struct ArtifactStore {
    build_dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store over the given build directory.
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    /// Path of the named contract's artifact file.
    pub fn path(&self, name: &str) -> PathBuf {
        self.build_dir.join(format!("{}.json", name))
    }

    /// Whether an artifact exists for the named contract.
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Persist an artifact, overwriting any previous build of the same name.
    pub fn save(&self, artifact: &BuildArtifact) -> Result<PathBuf, CompileError> {
        fs::create_dir_all(&self.build_dir)?;

        let path = self.path(&artifact.contract_name);

        // Write to a temporary file first, then rename into place
        let temp_path = self.build_dir.join(format!("{}.json.tmp", artifact.contract_name));
        let file = fs::File::create(&temp_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), artifact)?;
        fs::rename(&temp_path, &path)?;

        Ok(path)
    }

    /// Load the named contract's artifact, or `None` when it was never built.
    pub fn try_load(&self, name: &str) -> Result<Option<BuildArtifact>, CompileError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }

        let file = fs::File::open(&path)?;
        Ok(Some(serde_json::from_reader(BufReader::new(file))?))
    }

    /// Contract names with artifacts present, sorted.
    pub fn list(&self) -> Result<Vec<String>, CompileError> {
        let mut names = Vec::new();

        if !self.build_dir.exists() {
            return Ok(names);
        }

        for entry in fs::read_dir(&self.build_dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
