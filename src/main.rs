use blockchain::chain::{Chain, Transaction, UtxoSet};
use blockchain::crypto::{hash_pubkey, validate_address};
use blockchain::wallet::Wallets;
use blockchain::{BtcError, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    prelude::*,
};

#[derive(Debug, Parser)]
#[command(name = "ledgerchain", about = "A single-node, UTXO-based educational ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(name = "init-chain", about = "Create the chain, minting the genesis reward to an address")]
    InitChain {
        #[arg(long)]
        address: String,
    },
    #[command(name = "create-wallet", about = "Create a new wallet and print its address")]
    CreateWallet,
    #[command(name = "address-list", about = "List every address in the local wallet file")]
    AddressList,
    #[command(about = "Print an address's spendable balance")]
    Balance {
        #[arg(long)]
        address: String,
    },
    #[command(about = "Send coins from one address to another")]
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: i64,
    },
    #[command(about = "Rebuild the UTXO index from the full chain")]
    Reindex,
    #[command(name = "print-chain", about = "Print every block from the tip to genesis")]
    PrintChain,
}

fn initialize_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .init();
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn init_chain(address: &str) -> Result<()> {
    validate_address(address)?;
    let chain = Chain::init_chain(address)?;
    println!("Chain created. Genesis hash: {}", hex_string(chain.tip()));
    Ok(())
}

fn create_wallet() -> Result<()> {
    let mut wallets = Wallets::new()?;
    let address = wallets.create_wallet()?;
    println!("{address}");
    Ok(())
}

fn address_list() -> Result<()> {
    let wallets = Wallets::new()?;
    for address in wallets.get_addresses() {
        println!("{address}");
    }
    Ok(())
}

fn balance(address: &str) -> Result<()> {
    let pubkey_hash = validate_address(address)?;
    let chain = Chain::get_chain()?;
    let utxo = UtxoSet::new(&chain);
    let balance = utxo.get_balance(pubkey_hash.as_slice())?;
    println!("Balance of {address}: {balance}");
    Ok(())
}

fn send(from: &str, to: &str, amount: i64) -> Result<()> {
    validate_address(to)?;
    validate_address(from)?;

    let mut chain = Chain::get_chain()?;
    let wallets = Wallets::new()?;
    let wallet = wallets
        .get_wallet(from)
        .ok_or_else(|| BtcError::WalletNotFound(from.to_string()))?;
    let from_pubkey_hash = hash_pubkey(wallet.get_public_key());

    let (utxo_sum, selected) = {
        let utxo = UtxoSet::new(&chain);
        utxo.find_spendable_outputs(from_pubkey_hash.as_slice(), amount)?
    };

    let mut spend = Transaction::new_utxo_transaction(
        wallet.get_public_key(),
        to,
        amount,
        utxo_sum,
        selected.as_slice(),
        from,
    )?;
    chain.sign_transaction(&mut spend, wallet.get_pkcs8())?;

    let coinbase = Transaction::new_coinbase_tx(from)?;
    let block = chain.add_block(vec![coinbase, spend])?;
    info!(index = block.index, "mined block for send");
    println!("Success!");
    Ok(())
}

fn reindex() -> Result<()> {
    let chain = Chain::get_chain()?;
    let utxo = UtxoSet::new(&chain);
    utxo.reindex()?;
    println!(
        "Done! There are {} unspent outputs in the UTXO set.",
        utxo.count_utxo()?
    );
    Ok(())
}

fn print_chain() -> Result<()> {
    let chain = Chain::get_chain()?;
    for block in chain.iterator() {
        let block = block?;
        println!("index: {}", block.index);
        println!("prev. hash: {}", hex_string(block.prev_hash.as_slice()));
        println!("hash: {}", hex_string(block.hash.as_slice()));
        println!("timestamp: {}", block.timestamp);
        for tx in &block.transactions {
            println!("  tx {}: {} output(s)", hex_string(tx.id.as_slice()), tx.vout.len());
        }
        println!();
    }
    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::InitChain { address } => init_chain(&address),
        Command::CreateWallet => create_wallet(),
        Command::AddressList => address_list(),
        Command::Balance { address } => balance(&address),
        Command::Send { from, to, amount } => send(&from, &to, amount),
        Command::Reindex => reindex(),
        Command::PrintChain => print_chain(),
    }
}

fn main() {
    initialize_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
