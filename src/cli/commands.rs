//! CLI commands for the pipeline
//!
//! Implements all command handlers. Batch handlers catch per-contract
//! failures, report them, and keep going; only configuration problems abort
//! the process.

use crate::compile::{self, source, ArtifactStore, BuildArtifact, CompileError, SolcCompiler};
use crate::config::PipelineConfig;
use crate::deploy::{
    DeployError, Deployer, DeploymentRecord, DeploymentStore, DeploymentSummary, DEPLOY_INTERVAL,
};
use crate::pipeline::{contract_state, Throttle};
use crate::verify::{VerificationResult, Verifier, VERIFY_INTERVAL};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Compile every source file in the project directory.
pub fn cmd_compile_all(config: &PipelineConfig) -> CliResult<Vec<BuildArtifact>> {
    println!("🚀 Starting compilation of all contracts...");

    let compiler = SolcCompiler::new(&config.solc_path);
    report_compiler_version(&compiler);

    let store = ArtifactStore::new(config.build_dir());
    let sources = source::list_sources(&config.project_dir)?;

    let mut compiled = Vec::new();
    for path in &sources {
        if let Some(artifact) = compile_file(&compiler, &store, path) {
            compiled.push(artifact);
        }
    }

    println!("\n🎉 Compiled {} contracts successfully!", compiled.len());
    Ok(compiled)
}

/// Compile the single contract with the given declared name.
pub fn cmd_compile_one(config: &PipelineConfig, name: &str) -> CliResult<()> {
    let compiler = SolcCompiler::new(&config.solc_path);
    let store = ArtifactStore::new(config.build_dir());

    match source::find_source(&config.project_dir, name)? {
        Some((path, _)) => {
            compile_file(&compiler, &store, &path);
        }
        None => {
            println!("❌ No source file declares contract {}", name);
        }
    }

    Ok(())
}

/// Deploy every compiled artifact, then write the batch summary.
pub async fn cmd_deploy_all(config: &PipelineConfig) -> CliResult<()> {
    println!("🚀 Starting deployment of all contracts...");

    let deployer = Deployer::connect(config).await?;
    println!("   Network: {}", deployer.network());
    println!("   Deployer: {}", deployer.address());

    let artifacts = ArtifactStore::new(config.build_dir());
    let names = artifacts.list()?;
    if names.is_empty() {
        println!("❌ No compiled contracts found");
        println!("   Run: pipeline compile all");
        return Ok(());
    }

    println!("\n📋 Found {} contracts to deploy:", names.len());
    for (i, name) in names.iter().enumerate() {
        println!("   {}. {}", i + 1, name);
    }

    let mut throttle = Throttle::new(DEPLOY_INTERVAL);
    let mut records = Vec::new();
    for name in &names {
        throttle.pause().await;
        if let Some(record) = deploy_one(&deployer, name).await {
            records.push(record);
        }
    }

    if records.is_empty() {
        println!("\n❌ No contracts were deployed successfully");
        return Ok(());
    }

    println!("\n🎉 Deployment Summary:");
    println!("{}", "=".repeat(50));
    print_summary_table(&records);

    let store = DeploymentStore::new(config.deployments_dir());
    store.save_summary(&DeploymentSummary::from_records(&records))?;
    println!(
        "\n📄 Deployment details saved in {}",
        config.deployments_dir().display()
    );

    Ok(())
}

/// Deploy a single named contract from its build artifact.
pub async fn cmd_deploy_one(config: &PipelineConfig, name: &str, args: &[String]) -> CliResult<()> {
    let deployer = Deployer::connect(config).await?;

    match deployer.deploy_named(name, args).await {
        Ok(_) => {}
        Err(DeployError::NotCompiled(name)) => {
            println!("❌ Compiled contract {} not found", name);
            println!("   Run: pipeline compile all");
        }
        Err(e) => {
            println!("❌ Error deploying {}:", name);
            println!("   {}", e);
        }
    }

    Ok(())
}

/// Verify every deployed contract and report the aggregate count.
pub async fn cmd_verify_all(config: &PipelineConfig) -> CliResult<()> {
    println!("🔎 Verifying all deployed contracts...");

    let verifier = Verifier::new(config)?;
    let names = verifier.deployed_contracts()?;
    if names.is_empty() {
        println!("❌ No deployment files found");
        return Ok(());
    }

    let mut throttle = Throttle::new(VERIFY_INTERVAL);
    let mut results = Vec::new();
    for name in &names {
        throttle.pause().await;
        results.push(verify_one(&verifier, name).await);
    }

    let verified = results.iter().filter(|r| r.verified).count();
    let total = results.len();

    println!("\n📊 Verification Summary:");
    println!("{}", "=".repeat(40));
    println!("   Verified: {}/{}", verified, total);

    if verified == total {
        println!("🎉 All contracts verified successfully!");
    } else {
        println!("⚠️  {} contracts failed verification", total - verified);
    }

    Ok(())
}

/// Verify a single named contract.
pub async fn cmd_verify_one(config: &PipelineConfig, name: &str) -> CliResult<()> {
    let verifier = Verifier::new(config)?;
    verify_one(&verifier, name).await;
    Ok(())
}

/// Full pipeline: compile everything, then deploy everything.
pub async fn cmd_run(config: &PipelineConfig) -> CliResult<()> {
    println!("🚀 Starting full deployment pipeline...");
    println!("{}", "=".repeat(50));

    println!("\n📦 Step 1: Compiling contracts...");
    let compiled = cmd_compile_all(config)?;
    if compiled.is_empty() {
        return Err("no contracts compiled successfully".into());
    }

    println!("\n🚀 Step 2: Deploying contracts...");
    cmd_deploy_all(config).await?;

    println!("\n🎉 Full deployment completed successfully!");
    Ok(())
}

/// Show each contract's pipeline state, derived from artifacts on disk.
pub fn cmd_status(config: &PipelineConfig) -> CliResult<()> {
    let artifacts = ArtifactStore::new(config.build_dir());
    let records = DeploymentStore::new(config.deployments_dir());

    let mut names = BTreeSet::new();
    for path in source::list_sources(&config.project_dir)? {
        let text = fs::read_to_string(&path)?;
        if let Some(name) = source::contract_name(&text) {
            names.insert(name);
        }
    }
    names.extend(artifacts.list()?);
    names.extend(records.list()?);

    if names.is_empty() {
        println!("📭 No contracts found in {}", config.project_dir.display());
        return Ok(());
    }

    println!("📋 Pipeline status:");
    for name in &names {
        println!("   {:<24} {}", name, contract_state(name, &artifacts, &records));
    }

    Ok(())
}

/// Compile one source file, reporting failures without propagating them.
fn compile_file(
    compiler: &SolcCompiler,
    store: &ArtifactStore,
    path: &Path,
) -> Option<BuildArtifact> {
    println!("\n🔨 Compiling: {}", path.display());

    match compiler.compile_file(path).and_then(|artifact| {
        store.save(&artifact)?;
        Ok(artifact)
    }) {
        Ok(artifact) => {
            println!(
                "✅ Compiled {} → {}",
                artifact.contract_name,
                store.path(&artifact.contract_name).display()
            );
            Some(artifact)
        }
        Err(CompileError::NoContract(file)) => {
            println!("⚠️  No contract found in {}", file);
            None
        }
        Err(CompileError::Diagnostics(diagnostics)) => {
            println!("❌ Compilation errors:");
            for line in diagnostics.lines() {
                println!("   {}", line);
            }
            None
        }
        Err(e) => {
            println!("❌ Error compiling {}:", path.display());
            println!("   {}", e);
            None
        }
    }
}

/// Deploy one artifact, reporting failures without propagating them.
async fn deploy_one(deployer: &Deployer, name: &str) -> Option<DeploymentRecord> {
    match deployer.deploy_named(name, &[]).await {
        Ok(record) => Some(record),
        Err(e) => {
            println!("❌ Error deploying {}:", name);
            println!("   {}", e);
            None
        }
    }
}

/// Verify one contract; any stage error counts as unverified.
async fn verify_one(verifier: &Verifier, name: &str) -> VerificationResult {
    println!("\n🔎 Verifying {}...", name);

    match verifier.verify_contract(name).await {
        Ok(result) => result,
        Err(e) => {
            println!("❌ {}", e);
            VerificationResult {
                name: name.to_string(),
                verified: false,
            }
        }
    }
}

/// Print the solc version and warn when it drifts from the pinned one.
fn report_compiler_version(compiler: &SolcCompiler) {
    match compiler.version() {
        Ok(version) => {
            println!("   Compiler: {}", version);
            let pinned = compile::SOLC_VERSION.trim_start_matches('v');
            if !version.starts_with(pinned) {
                log::warn!(
                    "installed solc {} differs from {} reported to explorers",
                    version,
                    compile::SOLC_VERSION
                );
            }
        }
        Err(e) => log::warn!("could not determine solc version: {}", e),
    }
}

/// Aligned console table for the deployment summary.
fn print_summary_table(records: &[DeploymentRecord]) {
    let name_width = records
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("Contract".len());
    let addr_width = records
        .iter()
        .map(|r| r.address.len())
        .max()
        .unwrap_or(0)
        .max("Address".len());

    println!("   {:<name_width$}  {:<addr_width$}  Tx Hash", "Contract", "Address");
    for record in records {
        println!(
            "   {:<name_width$}  {:<addr_width$}  {}",
            record.name, record.address, record.tx_hash
        );
    }
}
