mod output;
mod rpc;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use multisig_signer::{
    assemble, calls::mint_call_data, config::SIGNER_KEYS_VAR, propose_and_execute, recover_operation_signer, Clock,
    ConfigError, FlowError, MockWallet, SystemClock, WalletConfig,
};
use multisig_wallet_types::{
    operation::{parse_address, parse_u256},
    BaseCall, DirectAddress, ExecutorAddressResolver, MultiSigWallet, Rejection, SignedOperation, SignerSet,
    StaticAddressMap,
};
use tracing_subscriber::EnvFilter;

use crate::{
    output::{read_signed_operation, write_signed_operation},
    rpc::RpcWallet,
};

/// Co-sign and execute operations on a 2-of-3 multisig wallet.
///
/// Signer one proposes (signs off-chain), signer two executes (submits on-chain); the
/// deployer is the third registered co-signer.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Comma-separated private keys of the two co-signers (proposer first).
    #[arg(long, env = "SIGNER_PRIVATE_KEYS", global = true, hide_env_values = true)]
    signer_keys: Option<String>,

    /// Deployer private key (third registered co-signer).
    #[arg(long, env = "DEPLOYER_PRIVATE_KEY", global = true, hide_env_values = true)]
    deployer_key: Option<String>,

    /// Address the wallet sees for the executor, when the chain translates caller addresses.
    #[arg(long, env = "EXECUTOR_ADDRESS", global = true)]
    executor_address: Option<String>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the three co-signer addresses used to initialise the wallet.
    Signers,

    /// ABI-encode `mint(address,uint256)` call data.
    MintCalldata {
        #[arg(long)]
        account: String,
        #[arg(long, default_value = "100")]
        amount: String,
    },

    /// Sign an operation for a known sequence id and print the transport record.
    Sign {
        #[arg(long)]
        sequence_id: String,
        /// Call target.
        #[arg(long)]
        to: String,
        /// Native value in wei (defaults to 0).
        #[arg(long)]
        value: Option<String>,
        /// Hex call data.
        #[arg(long, default_value = "0x")]
        data: String,
        /// Validity window in seconds.
        #[arg(long, default_value_t = 60)]
        expire_in: u64,
        /// Which configured co-signer signs (1 or 2).
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
        signer: u8,
        /// Also write the record (with audit metadata) to this path.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check a signed operation file and report who signed it.
    Inspect {
        path: PathBuf,
    },

    /// Run the mint flow against an in-memory wallet, including a replay attempt.
    Simulate {
        /// Token contract the wallet mints on.
        #[arg(long, default_value = "0x5FbDB2315678afecb367f032d93F642f64180aa3")]
        token: String,
        #[arg(long, default_value = "100")]
        amount: String,
        #[arg(long, default_value_t = 60)]
        expire_in: u64,
    },

    /// Fetch the next sequence id, sign with signer one, submit with signer two.
    Execute {
        #[arg(long, env = "RPC_URL")]
        rpc_url: String,
        /// Deployed wallet contract.
        #[arg(long, env = "WALLET_ADDRESS")]
        wallet: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        value: Option<String>,
        #[arg(long, default_value = "0x")]
        data: String,
        #[arg(long, default_value_t = 60)]
        expire_in: u64,
    },

    /// Submit a signed operation file as signer two.
    Submit {
        #[arg(long, env = "RPC_URL")]
        rpc_url: String,
        #[arg(long, env = "WALLET_ADDRESS")]
        wallet: String,
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match &cli.command {
        Command::Signers => {
            let config = load_config(&cli)?;
            let set = signer_set(&cli, &config)?;
            println!("Signer one (proposer): {}", config.signer_one().address());
            println!("Signer two (executor): {}", config.signer_two().address());
            if set.executor() != config.signer_two().address() {
                println!("    Executor resolved address: {}", set.executor());
            }
            println!("Deployer: {}", config.deployer()?.address());
            println!("Signer addresses: {set}");
        }
        Command::MintCalldata { account, amount } => {
            let data = mint_call_data(parse_address(account)?, parse_u256(amount)?);
            println!("{data}");
        }
        Command::Sign { sequence_id, to, value, data, expire_in, signer, out } => {
            let config = load_config(&cli)?;
            let identity = config
                .signer(usize::from(*signer) - 1)
                .ok_or_else(|| anyhow!("no co-signer #{signer} configured"))?;
            let call = BaseCall::parse(to, value.as_deref(), data)?;

            println!("    Signing tx using signer {signer}({})", identity.address());
            let signed = assemble(parse_u256(sequence_id)?, call, *expire_in, identity, &SystemClock)?;
            println!("{}", serde_json::to_string_pretty(&signed)?);

            if let Some(path) = out {
                write_signed_operation(path, &signed, identity.address())?;
                println!("Wrote signed operation to {}", path.display());
            }
        }
        Command::Inspect { path } => {
            let signed = read_signed_operation(path)?;
            let proposer = recover_operation_signer(&signed)?;
            let now = SystemClock.now_millis();
            println!("Proposer: {proposer}");
            println!("Sequence id: {}", signed.sequence_id());
            if signed.expire_time() < now {
                println!("Expired {}s ago", (now - signed.expire_time()) / 1000);
            } else {
                println!("Expires in {}s", (signed.expire_time() - now) / 1000);
            }
        }
        Command::Simulate { token, amount, expire_in } => {
            let config = load_config(&cli)?;
            simulate(&cli, &config, token, amount, *expire_in).await?;
        }
        Command::Execute { rpc_url, wallet, to, value, data, expire_in } => {
            let config = load_config(&cli)?;
            let call = BaseCall::parse(to, value.as_deref(), data)?;
            let rpc = RpcWallet::connect(rpc_url, parse_address(wallet)?, config.signer_two()).await?;

            println!("    Signing tx using signer one({})", config.signer_one().address());
            println!("    Executing tx using signer two({})", rpc.executor());
            let (signed, handle) =
                propose_and_execute(&rpc, &rpc, call, *expire_in, config.signer_one(), &SystemClock).await?;
            println!("Executed sequence id {} in tx {}", signed.sequence_id(), handle.hash);
        }
        Command::Submit { rpc_url, wallet, path } => {
            let config = load_config(&cli)?;
            let signed = read_signed_operation(path)?;
            let rpc = RpcWallet::connect(rpc_url, parse_address(wallet)?, config.signer_two()).await?;

            println!("    Executing tx using signer two({})", rpc.executor());
            let handle = rpc.send_multi_sig(&signed).await?;
            println!("Executed sequence id {} in tx {}", signed.sequence_id(), handle.hash);
        }
    }
    Ok(())
}

async fn simulate(cli: &Cli, config: &WalletConfig, token: &str, amount: &str, expire_in: u64) -> Result<()> {
    let deployer = config.deployer()?;
    let set = signer_set(cli, config)?;
    println!("Signer addresses: {set}");

    let wallet = MockWallet::new(set, SystemClock.now_millis());
    let executor = wallet.connect(wallet.signers().executor());
    let call = BaseCall::new(
        parse_address(token)?,
        None,
        mint_call_data(deployer.address(), parse_u256(amount)?),
    );

    println!("    Signing tx using signer one({})", config.signer_one().address());
    println!("    Executing tx using signer two({})", executor.caller());
    let (signed, handle) =
        match propose_and_execute(&wallet, &executor, call, expire_in, config.signer_one(), &SystemClock).await {
            Ok(done) => done,
            Err(FlowError::Wallet(rejection)) => bail!("wallet rejected operation: {rejection}"),
            Err(err) => return Err(err.into()),
        };
    println!("{}", serde_json::to_string_pretty(&signed)?);
    println!("Accepted in tx {}, next sequence id {}", handle.hash, wallet.current_sequence_id());

    match replay(&executor, &signed).await {
        Err(Rejection::SequenceIdStale) => println!("Replay rejected: sequence id already used"),
        Err(other) => bail!("replay rejected for an unexpected reason: {other}"),
        Ok(_) => bail!("replayed operation was accepted"),
    }
    Ok(())
}

async fn replay(wallet: &MockWallet, signed: &SignedOperation) -> Result<(), Rejection> {
    wallet.send_multi_sig(signed).await.map(|_| ())
}

fn load_config(cli: &Cli) -> Result<WalletConfig> {
    let keys = cli
        .signer_keys
        .as_deref()
        .ok_or(ConfigError::MissingVar(SIGNER_KEYS_VAR))?;
    WalletConfig::from_parts(keys, cli.deployer_key.as_deref()).context("invalid co-signer configuration")
}

fn signer_set(cli: &Cli, config: &WalletConfig) -> Result<SignerSet> {
    let one = config.signer_one().address();
    let two = config.signer_two().address();
    let deployer = config.deployer()?.address();

    let resolver: Box<dyn ExecutorAddressResolver> = match &cli.executor_address {
        Some(raw) => {
            tracing::warn!("using translated address for executor (signer two)");
            Box::new(StaticAddressMap::new().with(two, parse_address(raw)?))
        }
        None => Box::new(DirectAddress),
    };
    Ok(SignerSet::new(one, two, deployer, resolver.as_ref()))
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|err| anyhow!("invalid log filter {level:?}: {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
