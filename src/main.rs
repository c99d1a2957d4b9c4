use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chain_env::common::constants::DEFAULT_ENV_DIR;
use chain_env::common::logger::setup_logger;
use chain_env::{Config, RunMode};
use clap::Parser;
use colored::Colorize;
use log::{info, LevelFilter};

/// Resolve chain endpoints, accounts and contract addresses for an environment.
#[derive(Debug, Parser)]
#[command(name = "chain-env", version)]
struct Args {
    /// Environment profile to load; falls back to NODE_ENV, then `test`
    #[arg(long = "node-env")]
    node_env: Option<String>,

    /// Directory holding the `.env*` files
    #[arg(long, default_value = DEFAULT_ENV_DIR)]
    env_dir: PathBuf,

    /// Print the record as JSON on stdout (private keys are omitted)
    #[arg(long)]
    json: bool,

    /// Exit with failure if the config has any validation warnings
    #[arg(long)]
    check: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    setup_logger(level).context("failed to initialise logger")?;

    let mode = RunMode::resolve(args.node_env.as_deref());
    let config = Config::load_from(&args.env_dir, Some(mode.as_str()))?;
    info!(
        "mode '{}': {} rpc(s), {} account(s), {} contract(s)",
        mode,
        config.rpcs.len(),
        config.accounts.len(),
        config.contract_address.len()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print_summary(&config);
    }

    if args.check && !config.validate().is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(config: &Config) {
    println!("{}", "rpcs".bold());
    for (name, url) in &config.rpcs {
        println!("  {:<10} {}", name.cyan(), url);
    }
    println!("{}", "accounts".bold());
    for (i, account) in config.accounts.iter().enumerate() {
        let key = if config.account_keys.get(i).is_some() {
            "key set".green()
        } else {
            "no key".red()
        };
        println!("  {account} ({key})");
    }
    println!("{}", "contracts".bold());
    for (name, address) in &config.contract_address {
        println!("  {:<10} {}", name.cyan(), address);
    }
}
