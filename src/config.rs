//! Configuration management for the crowdsale engine
//!
//! [`SaleConfig`] is the validated, multi-step initialization object the
//! ledger is built from. [`EnvironmentConfig`] loads its inputs from
//! configuration files, a `.env` file and `CROWDSALE_*` environment variables.

pub mod env;
pub mod sale;

pub use env::{parse_address, EnvironmentConfig, LoggingEnvConfig, SaleEnvConfig};
pub use sale::{
    AllocationConfig, FinishGate, PoolAddresses, PricingConfig, ReleasePolicy, SaftTier,
    SaftTierBasis, SaleConfig, SaleConfigBuilder, TgeStep, VestingConfig, VolumeDiscount,
    DEFAULT_MIN_SALE_SECS, DEFAULT_TOKEN_CAP, MONTH_SECS, PRICE_UNIT, WEI_PER_ETH,
};
