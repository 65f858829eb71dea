//! Solidity compiler invocation
//!
//! Speaks solc's standard-JSON protocol over a subprocess: one source per
//! request, fixed optimizer settings, abi + bytecode selected in the output.

use crate::compile::artifact::BuildArtifact;
use crate::compile::{source, EVM_VERSION, OPTIMIZER_ENABLED, OPTIMIZER_RUNS};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Compiler stage errors
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No contract found in {0}")]
    NoContract(String),
    #[error("Compiler failed: {0}")]
    Solc(String),
    #[error("Compilation errors:\n{0}")]
    Diagnostics(String),
    #[error("Contract {0} not found in compiler output")]
    MissingOutput(String),
}

/// Standard-JSON request body
#[derive(Debug, Serialize)]
struct StandardJsonInput {
    language: String,
    sources: BTreeMap<String, SourceInput>,
    settings: Settings,
}

#[derive(Debug, Serialize)]
struct SourceInput {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    optimizer: Optimizer,
    evm_version: String,
    output_selection: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct Optimizer {
    enabled: bool,
    runs: u32,
}

/// Standard-JSON response body, reduced to the fields the pipeline reads
#[derive(Debug, Deserialize)]
struct StandardJsonOutput {
    #[serde(default)]
    errors: Vec<Diagnostic>,
    #[serde(default)]
    contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Diagnostic {
    severity: String,
    #[serde(default)]
    formatted_message: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ContractOutput {
    abi: serde_json::Value,
    evm: EvmOutput,
}

#[derive(Debug, Deserialize)]
struct EvmOutput {
    bytecode: BytecodeOutput,
}

#[derive(Debug, Deserialize)]
struct BytecodeOutput {
    object: String,
}

/// Drives the `solc` binary over standard JSON
pub struct SolcCompiler {
    solc_path: PathBuf,
}

impl SolcCompiler {
    /// Create a compiler wrapper around the given binary.
    pub fn new(solc_path: impl Into<PathBuf>) -> Self {
        Self {
            solc_path: solc_path.into(),
        }
    }

    /// Report the installed compiler's version string.
    pub fn version(&self) -> Result<String, CompileError> {
        let output = Command::new(&self.solc_path)
            .arg("--version")
            .output()
            .map_err(|e| {
                CompileError::Solc(format!("failed to run {}: {}", self.solc_path.display(), e))
            })?;

        if !output.status.success() {
            return Err(CompileError::Solc(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .find_map(|line| line.strip_prefix("Version: "))
            .map(|v| v.trim().to_string())
            .ok_or_else(|| CompileError::Solc("unrecognized --version output".to_string()))
    }

    /// Compile one source file and return its artifact.
    ///
    /// The contract name is extracted from the source text; a file declaring
    /// no contract fails with [`CompileError::NoContract`].
    pub fn compile_file(&self, path: &Path) -> Result<BuildArtifact, CompileError> {
        let text = fs::read_to_string(path)?;
        let name = source::contract_name(&text)
            .ok_or_else(|| CompileError::NoContract(path.display().to_string()))?;
        self.compile_source(&path.display().to_string(), &text, &name)
    }

    /// Compile source text and extract the named contract's artifact.
    pub fn compile_source(
        &self,
        source_key: &str,
        text: &str,
        name: &str,
    ) -> Result<BuildArtifact, CompileError> {
        let input = standard_input(source_key, text);
        let output = self.run(&input)?;
        extract_artifact(&output, source_key, name)
    }

    /// Feed a request to `solc --standard-json` and decode the response.
    fn run(&self, input: &StandardJsonInput) -> Result<StandardJsonOutput, CompileError> {
        let mut child = Command::new(&self.solc_path)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CompileError::Solc(format!("failed to run {}: {}", self.solc_path.display(), e))
            })?;

        let request = serde_json::to_vec(input)?;
        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(&request)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(CompileError::Solc(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

/// Build the standard-JSON request for a single source.
fn standard_input(source_key: &str, text: &str) -> StandardJsonInput {
    let mut sources = BTreeMap::new();
    sources.insert(
        source_key.to_string(),
        SourceInput {
            content: text.to_string(),
        },
    );

    StandardJsonInput {
        language: "Solidity".to_string(),
        sources,
        settings: Settings {
            optimizer: Optimizer {
                enabled: OPTIMIZER_ENABLED,
                runs: OPTIMIZER_RUNS,
            },
            evm_version: EVM_VERSION.to_string(),
            output_selection: json!({
                "*": {
                    "*": ["abi", "evm.bytecode"]
                }
            }),
        },
    }
}

/// Collect error-severity diagnostics, formatted for display.
///
/// Warnings pass; only `severity == "error"` aborts a file.
fn error_diagnostics(output: &StandardJsonOutput) -> Vec<String> {
    output
        .errors
        .iter()
        .filter(|d| d.severity == "error")
        .map(|d| {
            d.formatted_message
                .clone()
                .unwrap_or_else(|| d.message.clone())
        })
        .collect()
}

/// Pull the named contract out of a compiler response.
fn extract_artifact(
    output: &StandardJsonOutput,
    source_key: &str,
    name: &str,
) -> Result<BuildArtifact, CompileError> {
    let errors = error_diagnostics(output);
    if !errors.is_empty() {
        return Err(CompileError::Diagnostics(errors.join("\n")));
    }

    let contract = output
        .contracts
        .get(source_key)
        .and_then(|file| file.get(name))
        .ok_or_else(|| CompileError::MissingOutput(name.to_string()))?;

    Ok(BuildArtifact {
        contract_name: name.to_string(),
        abi: contract.abi.clone(),
        bytecode: contract.evm.bytecode.object.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canned_output(json: &str) -> StandardJsonOutput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_standard_input_shape() {
        let input = standard_input("Token.sol", "contract Token {}");
        let value = serde_json::to_value(&input).unwrap();

        assert_eq!(value["language"], "Solidity");
        assert_eq!(value["sources"]["Token.sol"]["content"], "contract Token {}");
        assert_eq!(value["settings"]["optimizer"]["enabled"], true);
        assert_eq!(value["settings"]["optimizer"]["runs"], 200);
        assert_eq!(value["settings"]["evmVersion"], "paris");
        assert_eq!(
            value["settings"]["outputSelection"]["*"]["*"][0],
            "abi"
        );
    }

    #[test]
    fn test_extract_artifact_success() {
        let output = canned_output(
            r#"{
                "errors": [
                    {"severity": "warning", "message": "unused variable"}
                ],
                "contracts": {
                    "Token.sol": {
                        "Token": {
                            "abi": [],
                            "evm": {"bytecode": {"object": "6080604052"}}
                        }
                    }
                }
            }"#,
        );

        let artifact = extract_artifact(&output, "Token.sol", "Token").unwrap();
        assert_eq!(artifact.contract_name, "Token");
        assert_eq!(artifact.bytecode, "6080604052");
    }

    #[test]
    fn test_extract_artifact_error_diagnostics() {
        let output = canned_output(
            r#"{
                "errors": [
                    {
                        "severity": "error",
                        "formattedMessage": "ParserError: Expected ';'",
                        "message": "Expected ';'"
                    }
                ],
                "contracts": {}
            }"#,
        );

        let err = extract_artifact(&output, "Token.sol", "Token").unwrap_err();
        match err {
            CompileError::Diagnostics(text) => assert!(text.contains("ParserError")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_extract_artifact_name_mismatch() {
        let output = canned_output(
            r#"{
                "contracts": {
                    "Token.sol": {
                        "Token": {
                            "abi": [],
                            "evm": {"bytecode": {"object": "60"}}
                        }
                    }
                }
            }"#,
        );

        let err = extract_artifact(&output, "Token.sol", "Vault").unwrap_err();
        assert!(matches!(err, CompileError::MissingOutput(name) if name == "Vault"));
    }

    #[test]
    fn test_diagnostics_prefer_formatted_message() {
        let output = canned_output(
            r#"{
                "errors": [
                    {"severity": "error", "message": "short"},
                    {
                        "severity": "error",
                        "formattedMessage": "long and formatted",
                        "message": "short"
                    }
                ]
            }"#,
        );

        let diagnostics = error_diagnostics(&output);
        assert_eq!(diagnostics, vec!["short", "long and formatted"]);
    }
}
