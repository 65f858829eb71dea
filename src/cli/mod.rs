//! Command-line interface
//!
//! Implements the handlers behind each subcommand.

pub mod commands;

pub use commands::{
    cmd_compile_all, cmd_compile_one, cmd_deploy_all, cmd_deploy_one, cmd_run, cmd_status,
    cmd_verify_all, cmd_verify_one, CliResult,
};
