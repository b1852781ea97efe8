//! private-token command-line client.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!   CLI command   │                 TokenClient                  │
//!   ──────────────┼─▶ validate ─▶ wallet ─▶ session ─▶ ledger    │
//!                 │      │          │          │          │      │
//!                 └──────┼──────────┼──────────┼──────────┼──────┘
//!                        ▼          ▼          ▼          ▼
//!                   amount.rs   LocalWallet  encryption  JSON-RPC
//!                                (signer)      host       node
//! ```
//!
//! Configuration comes from `PRIVATE_TOKEN_*` environment variables, optionally
//! layered over a TOML file passed with `--config`.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use private_token::abi::{default_interface, normalize, parse_interface, InterfaceItem};
use private_token::blockchain::{LedgerClient, LocalWallet, WalletProvider};
use private_token::config::{load_config, TokenConfig};
use private_token::fhe::{HttpEncryptionRuntime, NetworkProfile, SessionManager, SessionSettings};
use private_token::observability::logging::init_logging;
use private_token::TokenClient;

#[derive(Parser)]
#[command(name = "private-token")]
#[command(about = "Transfer and decrypt balances of an encrypted token", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables take precedence.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Contract interface JSON to use instead of the bundled one.
    #[arg(long, global = true)]
    abi: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an encrypted amount to a recipient
    Transfer {
        /// Recipient address (0x-prefixed)
        to: String,
        /// Amount in tokens, up to 18 decimal places
        amount: String,
    },
    /// Decrypt the wallet's balance
    Balance,
    /// Print the normalized contract interface
    NormalizeAbi,
    /// Validate configuration and print the resolved values
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let interface = load_interface(cli.abi.as_deref())?;

    match cli.command {
        Commands::NormalizeAbi => {
            println!("{}", serde_json::to_string_pretty(&normalize(&interface))?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckConfig => {
            let config = load_config(cli.config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Transfer { to, amount } => {
            let client = build_client(load_config(cli.config.as_deref())?, &interface)?;
            let result = client.transfer(&to, &amount).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Balance => {
            let client = build_client(load_config(cli.config.as_deref())?, &interface)?;
            let balance = client.get_balance().await?;
            println!(
                "{}",
                serde_json::json!({
                    "handle": balance.handle,
                    "raw": balance.raw,
                    "tokens": balance.tokens(),
                })
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_interface(path: Option<&Path>) -> Result<Vec<InterfaceItem>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(parse_interface(&std::fs::read_to_string(path)?)?),
        None => Ok(default_interface()),
    }
}

fn build_client(
    config: TokenConfig,
    interface: &[InterfaceItem],
) -> Result<TokenClient, Box<dyn std::error::Error>> {
    let config = Arc::new(config);

    let ledger = LedgerClient::new(
        &config.rpc_url,
        &config.failover_rpc_urls,
        config.rpc_timeout_secs,
    )?;

    let wallet = LocalWallet::from_env(&config.rpc_url)?
        .map(|wallet| Arc::new(wallet) as Arc<dyn WalletProvider>);
    if wallet.is_none() {
        tracing::warn!("No signing wallet configured; set PRIVATE_TOKEN_PRIVATE_KEY");
    }

    let runtime = HttpEncryptionRuntime::new(&config.session.host_url)?;
    let sessions = SessionManager::new(
        Arc::new(runtime),
        NetworkProfile::sepolia(),
        SessionSettings::from(&config.session),
    );

    tracing::info!(
        contract = %config.contract_address,
        chain_id = config.chain_id,
        rpc_url = %config.rpc_url,
        "Token client ready"
    );

    Ok(TokenClient::new(config, wallet, Arc::new(ledger), sessions, interface)?)
}
