//! Crowdsale operator CLI
//!
//! Offline helpers around the sale engine: price quotes, the vesting
//! schedule, a dry-run deployment and config file generation.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use crowdsale_sdk::config::MONTH_SECS;
use crowdsale_sdk::sale::{PricingContext, PricingEngine, VestingSchedule};
use crowdsale_sdk::{
    init_logging, EnvironmentConfig, Ledger, MemoryToken, MemoryTreasury, SaleStage, SystemClock,
    TokenLedger, Uint128,
};

/// Crowdsale operator CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "crowdsale")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CROWDSALE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Quote the token amount for a contribution
    Quote(QuoteArgs),

    /// Print the vesting gates and TGE price steps
    Schedule,

    /// Deploy against in-memory collaborators and print the resulting state
    DryRun,

    /// Write a default configuration file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Contribution value in wei
    #[arg(long)]
    value_wei: u128,

    /// Pricing phase to quote in
    #[arg(long, value_enum, default_value = "saft")]
    stage: StageArg,

    /// Active TGE price step
    #[arg(long, default_value_t = 0)]
    step: usize,

    /// Value raised before this contribution, in wei
    #[arg(long, default_value_t = 0)]
    raised_wei: u128,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum StageArg {
    Saft,
    Tge,
}

impl From<StageArg> for SaleStage {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::Saft => SaleStage::Saft,
            StageArg::Tge => SaleStage::Tge,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EnvironmentConfig> {
    let config = match path {
        Some(path) => EnvironmentConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EnvironmentConfig::load().context("loading environment configuration")?,
    };
    init_logging(&config.logging)?;
    Ok(config)
}

fn quote(env: &EnvironmentConfig, args: &QuoteArgs) -> Result<serde_json::Value> {
    let sale = env.to_sale_config()?;
    let unit = MemoryToken::default().unit()?;
    let engine = PricingEngine::new(sale.pricing, unit)?;
    let value = Uint128::new(args.value_wei);
    let ctx = PricingContext {
        sale_stage: args.stage.into(),
        price_step: args.step,
        tokens_sold: Uint128::zero(),
        wei_raised: Uint128::new(args.raised_wei),
    };

    let tokens = engine.price(value, &ctx)?;
    Ok(json!({
        "value_wei": value,
        "usd": engine.usd_value(value)?,
        "sale_stage": ctx.sale_stage.to_string(),
        "price_step": ctx.price_step,
        "stage_price_usd": engine.stage_price_usd(ctx.sale_stage, ctx.price_step),
        "tokens": tokens,
    }))
}

fn schedule(env: &EnvironmentConfig) -> Result<serde_json::Value> {
    let sale = env.to_sale_config()?;
    let unit = MemoryToken::default().unit()?;
    let engine = PricingEngine::new(sale.pricing.clone(), unit)?;
    let vesting = VestingSchedule::new(sale.vesting);

    let steps: Vec<_> = (1..=engine.step_count())
        .map(|step| {
            json!({
                "step": step,
                "tokens_sold_threshold": engine.step_threshold(step),
                "price_usd": engine.stage_price_usd(SaleStage::Tge, step),
            })
        })
        .collect();

    Ok(json!({
        "month_secs": MONTH_SECS,
        "saft_tge_threshold": engine.saft_tge_threshold(),
        "tge_steps": steps,
        "vesting": vesting.gates(),
    }))
}

fn dry_run(env: &EnvironmentConfig) -> Result<serde_json::Value> {
    let sale = env.to_sale_config()?;
    let wallet = env.wallet_address()?;
    let deployer = sale
        .admins
        .first()
        .cloned()
        .unwrap_or_else(|| wallet.clone());

    let ledger = Ledger::deploy(
        sale,
        deployer,
        Arc::new(MemoryToken::default()),
        Arc::new(MemoryTreasury::new(wallet)),
        Arc::new(SystemClock),
    )?;

    Ok(json!({
        "info": ledger.info(),
        "audit": ledger.audit(),
    }))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_ref();

    let output = match &cli.command {
        Command::InitConfig { path } => {
            EnvironmentConfig::generate_default_config().save_to_file(path)?;
            println!("Wrote default configuration to {}", path.display());
            return Ok(());
        }
        Command::Quote(args) => quote(&load_config(config)?, args)?,
        Command::Schedule => schedule(&load_config(config)?)?,
        Command::DryRun => dry_run(&load_config(config)?)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
