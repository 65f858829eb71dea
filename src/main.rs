//! Contract Pipeline CLI
//!
//! Compile, deploy, and verify EVM smart contracts in three stages.

use clap::{Parser, Subcommand};
use contract_pipeline::cli::{self, CliResult};
use contract_pipeline::config::PipelineConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pipeline")]
#[command(version = "0.1.0")]
#[command(about = "Compile, deploy, and verify EVM smart contracts", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Project directory holding contract sources, build/, and deployments/
    #[arg(short, long, default_value = ".")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile contract sources to build artifacts
    Compile {
        /// Contract name, or "all" for every source file
        target: String,
    },

    /// Deploy compiled contracts to the configured network
    Deploy {
        /// Contract name, or "all" for every compiled contract
        target: String,

        /// Constructor arguments (single-contract mode only)
        args: Vec<String>,
    },

    /// Verify deployed contracts against their source
    Verify {
        /// Contract name, or "all" for every deployment record
        target: String,
    },

    /// Compile and deploy everything in one run
    Run,

    /// Show each contract's pipeline state
    Status,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load .env before reading configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env(cli.project_dir)?;

    match cli.command {
        Commands::Compile { target } => {
            if target == "all" {
                cli::cmd_compile_all(&config)?;
            } else {
                cli::cmd_compile_one(&config, &target)?;
            }
        }

        Commands::Deploy { target, args } => {
            run_async(async {
                if target == "all" {
                    if !args.is_empty() {
                        println!("⚠️  Constructor arguments are ignored in all mode");
                    }
                    cli::cmd_deploy_all(&config).await
                } else {
                    cli::cmd_deploy_one(&config, &target, &args).await
                }
            })?;
        }

        Commands::Verify { target } => {
            run_async(async {
                if target == "all" {
                    cli::cmd_verify_all(&config).await
                } else {
                    cli::cmd_verify_one(&config, &target).await
                }
            })?;
        }

        Commands::Run => {
            run_async(cli::cmd_run(&config))?;
        }

        Commands::Status => {
            cli::cmd_status(&config)?;
        }
    }

    Ok(())
}

/// Drive an async command on a dedicated runtime.
fn run_async<F>(future: F) -> CliResult<()>
where
    F: std::future::Future<Output = CliResult<()>>,
{
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(future)
}
