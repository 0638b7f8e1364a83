use chrono::DateTime;
use config::{Config as ConfigLoader, File, FileFormat};
use cosmwasm_std::Addr;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use super::sale::{
    FinishGate, PoolAddresses, ReleasePolicy, SaftTierBasis, SaleConfig, DEFAULT_MIN_SALE_SECS,
};
use crate::error::Error;

/// Environment variable prefixes for different configuration sections
const ENV_PREFIX: &str = "CROWDSALE";
const ENV_SALE_PREFIX: &str = "CROWDSALE_SALE";
const ENV_LOG_PREFIX: &str = "CROWDSALE_LOG";

/// Sale parameters loaded from environment/files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleEnvConfig {
    /// Treasury wallet receiving contributions
    pub wallet_address: Option<String>,
    /// Whole USD per ETH
    pub eth_usd_rate: Option<u64>,
    /// Token cap in whole tokens
    pub token_cap: Option<u64>,
    pub ecosystem_address: Option<String>,
    pub reserve_address: Option<String>,
    pub team_address: Option<String>,
    #[serde(default)]
    pub advisors_addresses: Vec<String>,
    #[serde(default)]
    pub admin_addresses: Vec<String>,
    /// RFC 3339 instant before which the sale cannot be finished
    pub finish_not_before: Option<String>,
    /// Minimum seconds between deployment and finish
    pub finish_min_elapsed_secs: Option<u64>,
    /// "anyone" or "admin_only"
    pub release_policy: Option<String>,
    /// "contribution" or "raised_to_date"
    pub saft_tier_basis: Option<String>,
    /// Team lock after the sale finished, in seconds
    pub team_lock_secs: Option<u64>,
}

/// Logging configuration from environment/files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingEnvConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: Option<String>,
    /// Log format (compact, pretty, json)
    pub format: Option<String>,
    /// Enable colored output
    pub enable_colors: Option<bool>,
}

/// Complete environment configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub sale: SaleEnvConfig,
    pub logging: LoggingEnvConfig,
    /// Custom environment variables
    pub custom: HashMap<String, String>,
    /// Configuration file paths that were loaded
    pub loaded_files: Vec<String>,
}

/// Parse a 20-byte hex address (with or without `0x`), normalized to lowercase
pub fn parse_address(raw: &str) -> Result<Addr, Error> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(body)
        .map_err(|e| Error::Config(format!("Invalid address '{}': {}", raw, e)))?;
    if bytes.len() != 20 {
        return Err(Error::Config(format!(
            "Invalid address '{}': expected 20 bytes, got {}",
            raw,
            bytes.len()
        )));
    }
    Ok(Addr::unchecked(format!("0x{}", hex::encode(bytes))))
}

fn parse_address_list(raw: &[String]) -> Result<Vec<Addr>, Error> {
    raw.iter().map(|a| parse_address(a)).collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl EnvironmentConfig {
    /// Load configuration from `.env`, configuration files and environment variables
    pub fn load() -> Result<Self, Error> {
        // A missing .env file is fine
        dotenv::dotenv().ok();

        let mut env_config = Self::default();

        // Load from configuration files first
        env_config.load_from_files()?;

        // Override with environment variables
        env_config.load_from_env()?;

        env_config.validate()?;

        Ok(env_config)
    }

    /// Load configuration from a single file, then apply environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self, Error> {
        let mut env_config = Self::default();
        env_config.load_config_file(path)?;
        env_config
            .loaded_files
            .push(path.to_string_lossy().to_string());
        env_config.load_from_env()?;
        env_config.validate()?;
        Ok(env_config)
    }

    fn load_from_files(&mut self) -> Result<(), Error> {
        let config_dir =
            env::var("CROWDSALE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let config_files = vec!["crowdsale.toml", "crowdsale.json"];
        let search_paths = vec![config_dir, "config".to_string(), ".".to_string()];

        for search_path in &search_paths {
            for config_file in &config_files {
                let file_path = Path::new(search_path).join(config_file);
                let display = file_path.to_string_lossy().to_string();
                if file_path.exists() && !self.loaded_files.contains(&display) {
                    self.load_config_file(&file_path)?;
                    self.loaded_files.push(display);
                }
            }
        }

        Ok(())
    }

    fn load_config_file(&mut self, file_path: &Path) -> Result<(), Error> {
        let file_format = match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        };

        let settings = ConfigLoader::builder()
            .add_source(File::from(file_path).format(file_format))
            .build()
            .map_err(|e| Error::Config(format!("Failed to load config file: {}", e)))?;

        if let Ok(sale_config) = settings.get::<SaleEnvConfig>("sale") {
            self.merge_sale_config(sale_config);
        }

        if let Ok(logging_config) = settings.get::<LoggingEnvConfig>("logging") {
            self.merge_logging_config(logging_config);
        }

        if let Ok(custom_map) = settings.get::<HashMap<String, String>>("custom") {
            self.custom.extend(custom_map);
        }

        Ok(())
    }

    fn load_from_env(&mut self) -> Result<(), Error> {
        self.load_sale_env()?;
        self.load_logging_env();
        self.load_custom_env();
        Ok(())
    }

    fn load_sale_env(&mut self) -> Result<(), Error> {
        let var = |name: &str| env::var(format!("{}_{}", ENV_SALE_PREFIX, name)).ok();

        if let Some(wallet) = var("WALLET_ADDRESS") {
            self.sale.wallet_address = Some(wallet);
        }

        if let Some(rate) = var("ETH_USD_RATE") {
            let rate = rate
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("Invalid ETH/USD rate '{}': {}", rate, e)))?;
            self.sale.eth_usd_rate = Some(rate);
        }

        if let Some(cap) = var("TOKEN_CAP") {
            let cap = cap
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("Invalid token cap '{}': {}", cap, e)))?;
            self.sale.token_cap = Some(cap);
        }

        if let Some(ecosystem) = var("ECOSYSTEM_ADDRESS") {
            self.sale.ecosystem_address = Some(ecosystem);
        }

        if let Some(reserve) = var("RESERVE_ADDRESS") {
            self.sale.reserve_address = Some(reserve);
        }

        if let Some(team) = var("TEAM_ADDRESS") {
            self.sale.team_address = Some(team);
        }

        if let Some(advisors) = var("ADVISORS_ADDRESSES") {
            self.sale.advisors_addresses = split_list(&advisors);
        }

        if let Some(admins) = var("ADMIN_ADDRESSES") {
            self.sale.admin_addresses = split_list(&admins);
        }

        if let Some(not_before) = var("FINISH_NOT_BEFORE") {
            self.sale.finish_not_before = Some(not_before);
        }

        if let Some(min_elapsed) = var("FINISH_MIN_ELAPSED_SECS") {
            let secs = min_elapsed.parse::<u64>().map_err(|e| {
                Error::Config(format!(
                    "Invalid finish minimum elapsed seconds '{}': {}",
                    min_elapsed, e
                ))
            })?;
            self.sale.finish_min_elapsed_secs = Some(secs);
        }

        if let Some(policy) = var("RELEASE_POLICY") {
            self.sale.release_policy = Some(policy);
        }

        if let Some(basis) = var("SAFT_TIER_BASIS") {
            self.sale.saft_tier_basis = Some(basis);
        }

        if let Some(team_lock) = var("TEAM_LOCK_SECS") {
            let secs = team_lock.parse::<u64>().map_err(|e| {
                Error::Config(format!("Invalid team lock seconds '{}': {}", team_lock, e))
            })?;
            self.sale.team_lock_secs = Some(secs);
        }

        Ok(())
    }

    fn load_logging_env(&mut self) {
        if let Ok(level) = env::var(format!("{}_LEVEL", ENV_LOG_PREFIX)) {
            self.logging.level = Some(level);
        }

        if let Ok(format) = env::var(format!("{}_FORMAT", ENV_LOG_PREFIX)) {
            self.logging.format = Some(format);
        }

        if let Ok(colors_str) = env::var(format!("{}_ENABLE_COLORS", ENV_LOG_PREFIX)) {
            if let Ok(colors) = colors_str.parse::<bool>() {
                self.logging.enable_colors = Some(colors);
            }
        }
    }

    fn load_custom_env(&mut self) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX)
                && !key.starts_with(ENV_SALE_PREFIX)
                && !key.starts_with(ENV_LOG_PREFIX)
            {
                self.custom.insert(key, value);
            }
        }
    }

    /// Merge sale configuration (file config is overridden by env)
    fn merge_sale_config(&mut self, file_config: SaleEnvConfig) {
        let sale = &mut self.sale;
        if sale.wallet_address.is_none() {
            sale.wallet_address = file_config.wallet_address;
        }
        if sale.eth_usd_rate.is_none() {
            sale.eth_usd_rate = file_config.eth_usd_rate;
        }
        if sale.token_cap.is_none() {
            sale.token_cap = file_config.token_cap;
        }
        if sale.ecosystem_address.is_none() {
            sale.ecosystem_address = file_config.ecosystem_address;
        }
        if sale.reserve_address.is_none() {
            sale.reserve_address = file_config.reserve_address;
        }
        if sale.team_address.is_none() {
            sale.team_address = file_config.team_address;
        }
        if sale.advisors_addresses.is_empty() {
            sale.advisors_addresses = file_config.advisors_addresses;
        }
        if sale.admin_addresses.is_empty() {
            sale.admin_addresses = file_config.admin_addresses;
        }
        if sale.finish_not_before.is_none() {
            sale.finish_not_before = file_config.finish_not_before;
        }
        if sale.finish_min_elapsed_secs.is_none() {
            sale.finish_min_elapsed_secs = file_config.finish_min_elapsed_secs;
        }
        if sale.release_policy.is_none() {
            sale.release_policy = file_config.release_policy;
        }
        if sale.saft_tier_basis.is_none() {
            sale.saft_tier_basis = file_config.saft_tier_basis;
        }
        if sale.team_lock_secs.is_none() {
            sale.team_lock_secs = file_config.team_lock_secs;
        }
    }

    /// Merge logging configuration (file config is overridden by env)
    fn merge_logging_config(&mut self, file_config: LoggingEnvConfig) {
        if self.logging.level.is_none() {
            self.logging.level = file_config.level;
        }
        if self.logging.format.is_none() {
            self.logging.format = file_config.format;
        }
        if self.logging.enable_colors.is_none() {
            self.logging.enable_colors = file_config.enable_colors;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(rate) = self.sale.eth_usd_rate {
            if rate == 0 {
                return Err(Error::Config("ETH/USD rate must be positive".to_string()));
            }
        }

        if let Some(cap) = self.sale.token_cap {
            if cap == 0 {
                return Err(Error::Config("Token cap must be positive".to_string()));
            }
        }

        for address in [
            &self.sale.wallet_address,
            &self.sale.ecosystem_address,
            &self.sale.reserve_address,
            &self.sale.team_address,
        ]
        .into_iter()
        .flatten()
        {
            parse_address(address)?;
        }
        parse_address_list(&self.sale.advisors_addresses)?;
        parse_address_list(&self.sale.admin_addresses)?;

        if let Some(ref not_before) = self.sale.finish_not_before {
            DateTime::parse_from_rfc3339(not_before).map_err(|e| {
                Error::Config(format!("Invalid finish_not_before '{}': {}", not_before, e))
            })?;
        }

        if let Some(ref policy) = self.sale.release_policy {
            if policy != "anyone" && policy != "admin_only" {
                return Err(Error::Config(
                    "Release policy must be 'anyone' or 'admin_only'".to_string(),
                ));
            }
        }

        if let Some(ref basis) = self.sale.saft_tier_basis {
            if basis != "contribution" && basis != "raised_to_date" {
                return Err(Error::Config(
                    "SAFT tier basis must be 'contribution' or 'raised_to_date'".to_string(),
                ));
            }
        }

        if let Some(ref level) = self.logging.level {
            let valid_levels = ["error", "warn", "info", "debug", "trace"];
            if !valid_levels.contains(&level.as_str()) {
                return Err(Error::Config(format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    level, valid_levels
                )));
            }
        }

        if let Some(ref format) = self.logging.format {
            let valid_formats = ["compact", "pretty", "json"];
            if !valid_formats.contains(&format.as_str()) {
                return Err(Error::Config(format!(
                    "Invalid log format '{}'. Must be one of: {:?}",
                    format, valid_formats
                )));
            }
        }

        Ok(())
    }

    /// Treasury wallet address, required to run a sale
    pub fn wallet_address(&self) -> Result<Addr, Error> {
        let raw = self
            .sale
            .wallet_address
            .as_deref()
            .ok_or_else(|| Error::Config("Wallet address is not configured".to_string()))?;
        parse_address(raw)
    }

    /// Build a validated [`SaleConfig`] on top of the defaults
    pub fn to_sale_config(&self) -> Result<SaleConfig, Error> {
        let mut config = SaleConfig::default();

        if let Some(rate) = self.sale.eth_usd_rate {
            config.pricing.eth_usd_rate = rate as u128;
        }
        if let Some(cap) = self.sale.token_cap {
            config.token_cap = cap as u128;
        }
        if let Some(ref basis) = self.sale.saft_tier_basis {
            config.pricing.saft_tier_basis = match basis.as_str() {
                "raised_to_date" => SaftTierBasis::RaisedToDate,
                _ => SaftTierBasis::Contribution,
            };
        }
        if let Some(ref policy) = self.sale.release_policy {
            config.release_policy = match policy.as_str() {
                "admin_only" => ReleasePolicy::AdminOnly,
                _ => ReleasePolicy::Anyone,
            };
        }
        if let Some(team_lock) = self.sale.team_lock_secs {
            config.vesting.team_lock_secs = team_lock;
        }

        let not_before = match self.sale.finish_not_before {
            Some(ref raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| Error::Config(format!("Invalid finish_not_before: {}", e)))?
                    .timestamp()
                    .max(0) as u64,
            ),
            None => None,
        };
        config.finish_gate = FinishGate {
            not_before,
            min_elapsed_secs: self
                .sale
                .finish_min_elapsed_secs
                .unwrap_or(DEFAULT_MIN_SALE_SECS),
        };

        config.admins = parse_address_list(&self.sale.admin_addresses)?;

        config.pools = match (
            &self.sale.ecosystem_address,
            &self.sale.reserve_address,
            &self.sale.team_address,
        ) {
            (Some(ecosystem), Some(reserve), Some(team)) => Some(PoolAddresses {
                ecosystem: parse_address(ecosystem)?,
                reserve: parse_address(reserve)?,
                team: parse_address(team)?,
                advisors: parse_address_list(&self.sale.advisors_addresses)?,
            }),
            _ => None,
        };

        config.validate()?;
        Ok(config)
    }

    /// Generate default configuration file contents
    pub fn generate_default_config() -> Self {
        let mut config = Self::default();

        config.sale.eth_usd_rate = Some(400);
        config.sale.token_cap = Some(1_500_000_000);
        config.sale.finish_min_elapsed_secs = Some(DEFAULT_MIN_SALE_SECS);
        config.sale.release_policy = Some("anyone".to_string());
        config.sale.saft_tier_basis = Some("contribution".to_string());

        config.logging.level = Some("info".to_string());
        config.logging.format = Some("compact".to_string());
        config.logging.enable_colors = Some(true);

        config
    }

    /// Save configuration to file
    pub fn save_to_file(&self, file_path: &Path) -> Result<(), Error> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(file_path, content)?;
        Ok(())
    }

    /// Get a custom environment variable value
    pub fn get_custom(&self, key: &str) -> Option<&String> {
        self.custom.get(key)
    }
}
