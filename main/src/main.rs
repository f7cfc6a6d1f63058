// Copyright 2024, Blog Creator Contributors
// For licensing, see licenses/COPYRIGHT.md

use artifact::ContractArtifact;
use blog_creator_util::{
    color::{Color, DebugColor},
    sys,
};
use chain::{Chain, RpcChain};
use clap::{Args, Parser};
use deploy::Deployment;
use ethers::utils::to_checksum;
use eyre::{eyre, Context, Result};
use macros::*;
use std::{io, path::PathBuf};
use tokio::runtime::Builder;

mod artifact;
mod chain;
mod constants;
mod deploy;
mod macros;
mod wallet;

#[derive(Parser, Debug)]
#[command(name = "blog-creator-deploy")]
#[command(author = "Blog Creator Contributors")]
#[command(about = "Deploy the BlogCreator contract and print the tables it mints.", long_about = None)]
#[command(version)]
struct Opts {
    /// JSON-RPC endpoint of the network to deploy to.
    #[arg(short, long, env = "ETH_RPC_URL", default_value = constants::DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Directory holding compiled contract artifacts.
    #[arg(long, env = "ARTIFACTS_DIR", default_value = constants::DEFAULT_ARTIFACTS_DIR)]
    artifacts: PathBuf,
    /// Name of the contract to deploy.
    #[arg(long, default_value = constants::DEFAULT_CONTRACT)]
    contract: String,
    /// Number of blocks to wait for after the deployment tx is mined.
    #[arg(long, default_value_t = 1)]
    confirmations: usize,
    /// Account to deploy from (defaults to the node's first account).
    #[command(flatten)]
    auth: AuthOpts,
    /// Whether to print debug info.
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AuthOpts {
    /// Private key 0x-prefixed hex string. Warning: this exposes your private key secret in
    /// plaintext in your CLI history. Prefer the PRIVATE_KEY environment variable or
    /// --private-key-path.
    #[arg(
        long,
        env = "PRIVATE_KEY",
        hide_env_values = true,
        conflicts_with_all = ["private_key_path", "keystore_path"]
    )]
    private_key: Option<String>,
    /// File path to a text file containing a private key.
    #[arg(long, conflicts_with = "keystore_path")]
    private_key_path: Option<PathBuf>,
    /// Path to an Ethereum wallet keystore file, such as the one produced by clef.
    #[arg(long)]
    keystore_path: Option<PathBuf>,
    /// Path to a text file containing a password to the specified wallet keystore file.
    #[arg(long, requires = "keystore_path")]
    keystore_password_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Opts::parse();
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(main_impl(args))
}

async fn main_impl(args: Opts) -> Result<()> {
    macro_rules! run {
        ($expr:expr, $($msg:expr),+) => {
            $expr.wrap_err_with(|| eyre!($($msg),+))?
        };
    }

    let name = &args.contract;
    let artifact = run!(
        artifact::find(&args.artifacts, name),
        "failed to get contract factory for {name}"
    );
    let wallet = run!(args.auth.wallet(), "could not load wallet");
    let provider = sys::new_provider(&args.endpoint)?;

    let deployment = match wallet {
        Some(wallet) => {
            let chain = run!(
                RpcChain::with_wallet(provider, wallet, args.confirmations, args.verbose).await,
                "could not connect to {}",
                args.endpoint
            );
            deploy_with(&chain, &artifact).await?
        }
        None => {
            let chain = run!(
                RpcChain::with_node_account(provider, args.confirmations, args.verbose).await,
                "could not connect to {}",
                args.endpoint
            );
            if args.verbose {
                greyln!(
                    "no signer configured, deploying from node account {}",
                    to_checksum(&chain.sender(), None)
                );
            }
            deploy_with(&chain, &artifact).await?
        }
    };

    if args.verbose {
        greyln!(
            "deployment tx hash: {}",
            deployment.tx_hash.debug_lavender()
        );
        greyln!(
            "read {} table names from {}",
            deployment.tables.len(),
            to_checksum(&deployment.address, None).mint()
        );
    }
    Ok(())
}

/// Runs the deployment, reporting to stdout.
async fn deploy_with<C: Chain>(chain: &C, artifact: &ContractArtifact) -> Result<Deployment> {
    deploy::run(chain, artifact, &mut io::stdout())
        .await
        .wrap_err_with(|| eyre!("failed to deploy {}", artifact.name))
}
