use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use swap_config::{Config, ConfigLoader};
use swap_core::{SwapBuilder, SwapEngine, SwapSession};
use swap_types::{Intent, SwapQuote, WalletHandle};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod notify;

#[derive(Parser)]
#[command(name = "intent-swap")]
#[command(about = "Gasless intent swaps through an escrow contract and relayer", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(short, long, value_name = "FILE", default_value = "config/example.toml")]
	config: PathBuf,

	#[arg(long, env = "SWAP_LOG_LEVEL", default_value = "info")]
	log_level: String,

	/// Emit logs as JSON lines
	#[arg(long)]
	json: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Execute one swap and wait for its settlement
	Swap(SwapArgs),
	/// Show a maker's order history
	Orders {
		#[arg(long)]
		maker: String,
	},
	/// Print the canonical encoding and hash of an intent
	Hash(HashArgs),
	/// Validate the configuration file
	Validate,
}

#[derive(Args)]
struct SwapArgs {
	/// Custody wallet id
	#[arg(long)]
	wallet_id: String,
	/// On-chain address of the wallet
	#[arg(long)]
	address: String,
	/// Token to sell, by symbol or type tag
	#[arg(long)]
	sell: String,
	/// Token to buy, by symbol or type tag
	#[arg(long)]
	buy: String,
	/// Sell amount in whole tokens
	#[arg(long)]
	amount: Decimal,
	/// Buy tokens received per sell token
	#[arg(long)]
	rate: Decimal,
}

#[derive(Args)]
struct HashArgs {
	#[arg(long)]
	maker: String,
	#[arg(long)]
	nonce: u64,
	#[arg(long)]
	sell_token: String,
	#[arg(long)]
	buy_token: String,
	/// Smallest units
	#[arg(long)]
	sell_amount: Decimal,
	#[arg(long)]
	start_buy_amount: Decimal,
	#[arg(long)]
	end_buy_amount: Decimal,
	#[arg(long)]
	start_time: u64,
	#[arg(long)]
	end_time: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level, cli.json)?;

	match &cli.command {
		Commands::Swap(args) => run_swap(&cli, args).await,
		Commands::Orders { maker } => show_orders(&cli, maker).await,
		Commands::Hash(args) => print_hash(args),
		Commands::Validate => validate_config(&cli).await,
	}
}

async fn load_config(cli: &Cli) -> Result<Config> {
	ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")
}

fn build_engine(config: Config) -> Result<SwapEngine> {
	SwapBuilder::new(config)
		.with_account_factory("custody", swap_account::implementations::custody::create_account)
		.with_delivery_factory(swap_delivery::implementations::aptos::create_delivery)
		.with_relayer_factory(swap_settlement::implementations::http::create_relayer)
		.build()
		.context("Failed to build swap engine")
}

async fn run_swap(cli: &Cli, args: &SwapArgs) -> Result<()> {
	let config = load_config(cli).await?;
	let tokens = config.token_registry();
	let sell = tokens
		.resolve(&args.sell)
		.cloned()
		.ok_or_else(|| anyhow!("Unknown token: {}", args.sell))?;
	let buy = tokens
		.resolve(&args.buy)
		.cloned()
		.ok_or_else(|| anyhow!("Unknown token: {}", args.buy))?;
	let quote = SwapQuote::new(sell, buy, args.amount, args.rate).context("Invalid quote")?;

	let engine = build_engine(config)?;
	let mut events = engine.event_bus().subscribe();

	let wallet = WalletHandle::new(&args.wallet_id, &args.address);
	let mut session = SwapSession::new(&args.wallet_id, wallet);
	session.remember_quote(quote);

	let receipt = engine
		.execute(&mut session)
		.await
		.context("Swap failed")?;
	info!(intent_hash = %receipt.intent_hash, nonce = receipt.nonce, "Tracking settlement");
	print_events(&mut events, engine.config());

	tokio::select! {
		outcome = receipt.settlement => {
			let outcome = outcome.context("Settlement task failed")?;
			print_events(&mut events, engine.config());
			if !outcome.is_notifiable() {
				info!("No settlement before the local deadline, the order may still fill");
			}
		}
		_ = signal::ctrl_c() => {
			info!("Interrupted, settlement was not observed");
		}
	}

	Ok(())
}

fn print_events(events: &mut broadcast::Receiver<swap_types::SwapEvent>, config: &Config) {
	let tokens = config.token_registry();
	while let Ok(event) = events.try_recv() {
		println!("{}", notify::render(&event, &tokens));
	}
}

async fn show_orders(cli: &Cli, maker: &str) -> Result<()> {
	let config = load_config(cli).await?;
	let engine = build_engine(config)?;

	let orders = engine
		.orders(maker)
		.await
		.context("Failed to fetch orders")?;
	if orders.is_empty() {
		println!("No orders for {}", maker);
	}
	for order in &orders {
		println!("{}", notify::order_line(order));
	}
	Ok(())
}

fn print_hash(args: &HashArgs) -> Result<()> {
	let intent = Intent {
		maker: args.maker.clone(),
		nonce: args.nonce,
		sell_token: args.sell_token.clone(),
		buy_token: args.buy_token.clone(),
		sell_amount: args.sell_amount,
		start_buy_amount: args.start_buy_amount,
		end_buy_amount: args.end_buy_amount,
		start_time: args.start_time,
		end_time: args.end_time,
	};

	let hash = swap_intent::commit(&intent).context("Intent rejected")?;
	let encoded = swap_intent::encode(&intent).context("Intent rejected")?;
	println!("encoding: 0x{}", hex::encode(&encoded));
	println!("length:   {}", encoded.len());
	println!("hash:     {}", hash.to_prefixed_hex());
	Ok(())
}

async fn validate_config(cli: &Cli) -> Result<()> {
	info!("Validating configuration file: {:?}", cli.config);

	let config = load_config(cli).await?;
	info!("Configuration is valid");
	info!("Name: {}", config.swap.name);
	info!("Signing backend: {}", config.account.implementation);
	for token in &config.tokens {
		info!("  Token: {} ({}, {} decimals)", token.symbol, token.type_tag, token.decimals);
	}

	// Backend sections are checked by their own schemas.
	build_engine(config)?;
	info!("Backends configured");
	Ok(())
}

fn setup_tracing(log_level: &str, json: bool) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	let registry = tracing_subscriber::registry().with(env_filter);
	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json())
			.try_init()?;
	} else {
		registry
			.with(tracing_subscriber::fmt::layer())
			.try_init()?;
	}

	Ok(())
}
