//! Configuration validation utility
//!
//! Usage: cargo run --bin validate-config config/example.toml

use std::env;
use std::process;

use swap_config::ConfigLoader;

#[tokio::main]
async fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() != 2 {
		eprintln!("Usage: {} <config-file>", args[0]);
		process::exit(1);
	}

	let config_path = &args[1];

	println!("Validating configuration file: {}", config_path);

	match ConfigLoader::new().with_file(config_path).load().await {
		Ok(config) => {
			println!("Configuration is valid");
			println!("Name: {}", config.swap.name);
			println!("Chain REST endpoint: {}", config.chain.rest_url);
			println!("Contract: {}", config.chain.contract_address);
			println!("Relayer: {}", config.relayer.url);
			println!(
				"Tracker: every {}s for up to {}s",
				config.tracker.poll_interval_secs, config.tracker.timeout_secs
			);
			println!("Signing backend: {}", config.account.implementation);
			println!("Tokens configured: {}", config.tokens.len());
		}
		Err(e) => {
			eprintln!("Configuration validation failed:");
			eprintln!("{}", e);
			process::exit(1);
		}
	}
}
