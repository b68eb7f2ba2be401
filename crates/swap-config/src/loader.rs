//! Configuration loading from files and environment.

use crate::types::Config;
use crate::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use swap_types::{Address, MAX_DECIMALS};
use tracing::{debug, info};

/// Longest accepted intent validity window: one week.
pub const MAX_INTENT_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "SWAP_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Reads, substitutes, parses, overrides and validates the configuration.
	pub async fn load(&self) -> Result<Config, ConfigError> {
		let path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;
		info!("Loading configuration from {:?}", path);

		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				ConfigError::FileNotFound(path.display().to_string())
			} else {
				ConfigError::IoError(e)
			}
		})?;

		let substituted = substitute_env_vars(&content)?;
		let mut config = parse(path, &substituted)?;

		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	fn apply_env_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
		if let Ok(url) = env::var(format!("{}RELAYER_URL", self.env_prefix)) {
			debug!("Overriding relayer URL from environment");
			config.relayer.url = url;
		}

		if let Ok(url) = env::var(format!("{}CHAIN_REST_URL", self.env_prefix)) {
			debug!("Overriding chain REST URL from environment");
			config.chain.rest_url = url;
		}

		if let Ok(secs) = env::var(format!("{}POLL_INTERVAL_SECS", self.env_prefix)) {
			config.tracker.poll_interval_secs = secs.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid poll interval: {}", e))
			})?;
		}

		if let Ok(secs) = env::var(format!("{}TRACKER_TIMEOUT_SECS", self.env_prefix)) {
			config.tracker.timeout_secs = secs.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid tracker timeout: {}", e))
			})?;
		}

		Ok(())
	}
}

/// Parses configuration text, picking the format from the file extension.
pub fn parse(path: &Path, contents: &str) -> Result<Config, ConfigError> {
	match path.extension().and_then(|s| s.to_str()) {
		Some("toml") | None => {
			toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		Some("json") => {
			serde_json::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		Some("yaml") | Some("yml") => {
			serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		Some(other) => Err(ConfigError::ParseError(format!(
			"Unsupported config format: {}",
			other
		))),
	}
}

/// Replaces `${VAR_NAME}` placeholders with values from the environment.
pub fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
		.map_err(|e| ConfigError::ParseError(e.to_string()))?;

	let mut missing = None;
	let result = re.replace_all(content, |caps: &regex::Captures<'_>| {
		match env::var(&caps[1]) {
			Ok(value) => value,
			Err(_) => {
				missing.get_or_insert_with(|| caps[1].to_string());
				String::new()
			}
		}
	});

	match missing {
		Some(var) => Err(ConfigError::EnvVarNotFound(var)),
		None => Ok(result.into_owned()),
	}
}

/// Checks cross-field constraints serde cannot express.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
	let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

	if config.swap.intent_ttl_secs == 0 {
		return invalid("swap.intent_ttl_secs must be positive".into());
	}
	if config.swap.intent_ttl_secs > MAX_INTENT_TTL_SECS {
		return invalid(format!(
			"swap.intent_ttl_secs must be at most {}",
			MAX_INTENT_TTL_SECS
		));
	}
	if config.swap.slippage_bps >= swap_types::BPS_DENOMINATOR {
		return invalid(format!(
			"swap.slippage_bps must be below {}",
			swap_types::BPS_DENOMINATOR
		));
	}

	if config.tracker.poll_interval_secs == 0 {
		return invalid("tracker.poll_interval_secs must be positive".into());
	}
	if config.tracker.timeout_secs < config.tracker.poll_interval_secs {
		return invalid("tracker.timeout_secs must be at least one poll interval".into());
	}
	if config.tracker.order_history_limit == 0 {
		return invalid("tracker.order_history_limit must be positive".into());
	}

	for (name, url) in [
		("chain.rest_url", &config.chain.rest_url),
		("relayer.url", &config.relayer.url),
	] {
		if !(url.starts_with("http://") || url.starts_with("https://")) {
			return invalid(format!("{} must start with http:// or https://", name));
		}
	}

	if let Err(e) = Address::parse(&config.chain.contract_address) {
		return invalid(format!("chain.contract_address: {}", e));
	}

	let mut symbols = HashSet::new();
	let mut tags = HashSet::new();
	for token in &config.tokens {
		if !symbols.insert(token.symbol.to_ascii_uppercase()) {
			return invalid(format!("Duplicate token symbol: {}", token.symbol));
		}
		if !tags.insert(token.type_tag.to_ascii_lowercase()) {
			return invalid(format!("Duplicate token type tag: {}", token.type_tag));
		}
		if token.decimals > MAX_DECIMALS {
			return invalid(format!(
				"Token {} has {} decimals, at most {} are supported",
				token.symbol, token.decimals, MAX_DECIMALS
			));
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const SAMPLE: &str = r#"
[swap]
slippage_bps = 300

[chain]
rest_url = "https://fullnode.testnet.aptoslabs.com/v1"
contract_address = "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa"

[relayer]
url = "https://relayer.example"

[tracker]
poll_interval_secs = 2
timeout_secs = 60

[account]
implementation = "custody"
[account.config]
api_url = "https://custody.example/v1"
app_id = "app"
app_secret = "${SWAP_TEST_CUSTODY_SECRET}"

[[tokens]]
symbol = "APT"
type_tag = "0x1::aptos_coin::AptosCoin"
decimals = 8
"#;

	#[test]
	fn test_toml_parsing_with_defaults() {
		let contents = SAMPLE.replace("${SWAP_TEST_CUSTODY_SECRET}", "x");
		let config = parse(Path::new("config.toml"), &contents).unwrap();

		assert_eq!(config.swap.slippage_bps, 300);
		assert_eq!(config.swap.intent_ttl_secs, 600);
		assert_eq!(config.chain.escrow_module, "escrow");
		assert_eq!(config.tracker.poll_interval_secs, 2);
		assert_eq!(config.tracker.recency_window_secs, 120);
		assert_eq!(config.account.implementation, "custody");
		assert_eq!(
			config
				.token_registry()
				.symbol_for("0x1::aptos_coin::AptosCoin"),
			"APT"
		);
		assert!(validate_config(&config).is_ok());
	}

	#[test]
	fn test_env_substitution() {
		env::set_var("SWAP_TEST_SUBST_VALUE", "hunter2");
		let out = substitute_env_vars("secret = \"${SWAP_TEST_SUBST_VALUE}\"").unwrap();
		assert_eq!(out, "secret = \"hunter2\"");

		let err = substitute_env_vars("x = \"${SWAP_TEST_DEFINITELY_UNSET}\"").unwrap_err();
		assert!(
			matches!(err, ConfigError::EnvVarNotFound(v) if v == "SWAP_TEST_DEFINITELY_UNSET")
		);
	}

	#[test]
	fn test_validation_rejects_bad_tracker_settings() {
		let mut config =
			parse(Path::new("c.toml"), &SAMPLE.replace("${SWAP_TEST_CUSTODY_SECRET}", "x"))
				.unwrap();
		config.tracker.timeout_secs = 1;
		assert!(matches!(
			validate_config(&config),
			Err(ConfigError::ValidationError(_))
		));

		config.tracker.timeout_secs = 60;
		config.relayer.url = "relayer.example".into();
		assert!(validate_config(&config).is_err());
	}

	#[test]
	fn test_validation_rejects_unsupported_decimals_and_ttl() {
		let mut config =
			parse(Path::new("c.toml"), &SAMPLE.replace("${SWAP_TEST_CUSTODY_SECRET}", "x"))
				.unwrap();
		config.tokens[0].decimals = MAX_DECIMALS;
		assert!(validate_config(&config).is_ok());

		config.tokens[0].decimals = MAX_DECIMALS + 1;
		match validate_config(&config) {
			Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("APT")),
			other => panic!("unexpected result: {:?}", other),
		}

		config.tokens[0].decimals = 8;
		config.swap.intent_ttl_secs = MAX_INTENT_TTL_SECS + 1;
		assert!(matches!(
			validate_config(&config),
			Err(ConfigError::ValidationError(_))
		));
	}

	#[tokio::test]
	async fn test_load_from_file() {
		env::set_var("SWAP_TEST_CUSTODY_SECRET", "from-env");
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		file.write_all(SAMPLE.as_bytes()).unwrap();

		let config = ConfigLoader::new()
			.with_env_prefix("SWAP_TEST_LOADER_")
			.with_file(file.path())
			.load()
			.await
			.unwrap();

		assert_eq!(
			config.account.config.get("app_secret").and_then(|v| v.as_str()),
			Some("from-env")
		);
	}

	#[tokio::test]
	async fn test_missing_file() {
		let result = ConfigLoader::new()
			.with_file("/definitely/not/here.toml")
			.load()
			.await;
		assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
	}
}
