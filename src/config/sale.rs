use cosmwasm_std::{Addr, Uint128};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Seconds in one sale "month" (30.44 days)
pub const MONTH_SECS: u64 = 2_630_000;

/// Micro-USD per USD; all prices are quoted in this unit
pub const PRICE_UNIT: u128 = 1_000_000;

/// Wei per ETH; contribution values are quoted in wei
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// Default token cap in whole tokens (1.5 billion)
pub const DEFAULT_TOKEN_CAP: u128 = 1_500_000_000;

/// How a SAFT price tier is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaftTierBasis {
    /// USD value of the contribution being priced
    Contribution,
    /// USD raised before the contribution being priced
    RaisedToDate,
}

/// One SAFT price tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaftTier {
    /// Inclusive lower bound in whole USD
    pub from_usd: u128,
    /// Price as a percentage of the basis price
    pub price_percent: u32,
}

/// One TGE price step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TgeStep {
    /// Whole tokens that must be sold on top of the previous step's threshold
    pub added_volume: u128,
    /// Price as a percentage of the basis price
    pub price_percent: u32,
}

/// Single-contribution volume discount applied during TGE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDiscount {
    /// Inclusive minimum contribution in whole USD
    pub min_usd: u128,
    /// Discount in percent
    pub percent: u32,
}

/// Price schedule of the sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Whole USD per ETH of contribution value
    pub eth_usd_rate: u128,
    /// Basis price in micro-USD per whole token
    pub basis_price_usd: u128,
    pub saft_tier_basis: SaftTierBasis,
    /// SAFT tiers ordered by `from_usd`
    pub saft_tiers: Vec<SaftTier>,
    /// Whole tokens sold that move the sale from SAFT to TGE
    pub saft_tge_threshold: u128,
    /// TGE base price as a percentage of the basis price
    pub tge_base_percent: u32,
    pub tge_steps: Vec<TgeStep>,
    pub volume_discount: VolumeDiscount,
}

impl PricingConfig {
    /// Price schedule with the given ETH/USD rate
    pub fn with_rate(eth_usd_rate: u128) -> Self {
        Self {
            eth_usd_rate,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.eth_usd_rate == 0 {
            return Err(Error::Config("ETH/USD rate must be positive".to_string()));
        }
        if self.basis_price_usd == 0 {
            return Err(Error::Config("Basis price must be positive".to_string()));
        }
        if self.saft_tiers.is_empty() {
            return Err(Error::Config("At least one SAFT tier is required".to_string()));
        }
        if self
            .saft_tiers
            .windows(2)
            .any(|pair| pair[0].from_usd >= pair[1].from_usd)
        {
            return Err(Error::Config(
                "SAFT tiers must be strictly ordered by from_usd".to_string(),
            ));
        }
        if self.saft_tiers.iter().any(|t| t.price_percent == 0) || self.tge_base_percent == 0 {
            return Err(Error::Config("Price percentages must be positive".to_string()));
        }
        if self
            .tge_steps
            .iter()
            .any(|s| s.added_volume == 0 || s.price_percent == 0)
        {
            return Err(Error::Config(
                "TGE steps need a positive volume and price".to_string(),
            ));
        }
        if self.volume_discount.percent >= 100 {
            return Err(Error::Config(
                "Volume discount must be below 100%".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            eth_usd_rate: 400,
            basis_price_usd: 25_000,
            saft_tier_basis: SaftTierBasis::Contribution,
            saft_tiers: vec![
                SaftTier {
                    from_usd: 10_000,
                    price_percent: 125,
                },
                SaftTier {
                    from_usd: 100_000,
                    price_percent: 110,
                },
                SaftTier {
                    from_usd: 500_000,
                    price_percent: 90,
                },
            ],
            saft_tge_threshold: 150_000_000,
            tge_base_percent: 130,
            tge_steps: vec![
                TgeStep {
                    added_volume: 225_000_000,
                    price_percent: 160,
                },
                TgeStep {
                    added_volume: 93_750_000,
                    price_percent: 180,
                },
                TgeStep {
                    added_volume: 46_875_000,
                    price_percent: 190,
                },
            ],
            volume_discount: VolumeDiscount {
                min_usd: 50_000,
                percent: 5,
            },
        }
    }
}

/// Lock gates of the beneficiary classes, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingConfig {
    /// Advisors unlock half after this long since the sale started
    pub advisor_first_gate_secs: u64,
    /// Advisors unlock everything after this long since the sale started
    pub advisor_second_gate_secs: u64,
    /// Investors and referrers unlock after this long since the sale started
    pub investor_gate_secs: u64,
    /// Reserve unlocks this long after the sale finished
    pub reserve_lock_secs: u64,
    /// Team unlocks this long after the sale finished
    pub team_lock_secs: u64,
}

impl Default for VestingConfig {
    fn default() -> Self {
        Self {
            advisor_first_gate_secs: 3 * MONTH_SECS,
            advisor_second_gate_secs: 6 * MONTH_SECS,
            investor_gate_secs: 6 * MONTH_SECS,
            reserve_lock_secs: 6 * MONTH_SECS,
            team_lock_secs: 6 * MONTH_SECS,
        }
    }
}

impl VestingConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.advisor_first_gate_secs > self.advisor_second_gate_secs {
            return Err(Error::Config(
                "Advisor first gate must not be after the second gate".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shares of the token cap handed out by the initial distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    pub ecosystem_percent: u32,
    pub reserve_percent: u32,
    pub team_percent: u32,
    /// Split evenly across all advisors
    pub advisors_percent: u32,
    /// Bonus credited to a referrer, in percent of the purchased amount
    pub referral_bonus_percent: u32,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            ecosystem_percent: 15,
            reserve_percent: 30,
            team_percent: 13,
            advisors_percent: 7,
            referral_bonus_percent: 5,
        }
    }
}

impl AllocationConfig {
    /// Combined share of all initial pools
    pub fn pools_percent(&self) -> u32 {
        self.ecosystem_percent + self.reserve_percent + self.team_percent + self.advisors_percent
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.pools_percent() > 100 {
            return Err(Error::Config(format!(
                "Initial pools take {}% of the cap, at most 100% allowed",
                self.pools_percent()
            )));
        }
        if self.referral_bonus_percent > 100 {
            return Err(Error::Config(
                "Referral bonus must not exceed 100%".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default minimum sale duration before an admin `finish`
pub const DEFAULT_MIN_SALE_SECS: u64 = 3 * MONTH_SECS;

/// Time gate of the admin `finish` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishGate {
    /// Absolute unix timestamp before which finishing is refused
    pub not_before: Option<u64>,
    /// Minimum seconds since the sale started
    pub min_elapsed_secs: u64,
}

impl Default for FinishGate {
    fn default() -> Self {
        Self {
            not_before: None,
            min_elapsed_secs: DEFAULT_MIN_SALE_SECS,
        }
    }
}

/// Who may trigger a vesting release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    #[default]
    Anyone,
    AdminOnly,
}

/// Beneficiaries of the initial distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAddresses {
    pub ecosystem: Addr,
    pub reserve: Addr,
    pub team: Addr,
    pub advisors: Vec<Addr>,
}

/// Complete sale configuration
///
/// Admins can either be listed here (added at construction) or left empty and
/// added later through `add_addresses_to_admins`. The same holds for the pool
/// addresses and `distribute_initial_tokens`. The sale does not accept
/// purchases until both the initial distribution and the stage initialization
/// have happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleConfig {
    /// Token cap in whole tokens
    pub token_cap: u128,
    pub pricing: PricingConfig,
    pub vesting: VestingConfig,
    pub allocation: AllocationConfig,
    pub finish_gate: FinishGate,
    pub release_policy: ReleasePolicy,
    /// Admins added at construction
    pub admins: Vec<Addr>,
    /// Pools distributed by `Ledger::deploy`
    pub pools: Option<PoolAddresses>,
}

impl Default for SaleConfig {
    fn default() -> Self {
        Self {
            token_cap: DEFAULT_TOKEN_CAP,
            pricing: PricingConfig::default(),
            vesting: VestingConfig::default(),
            allocation: AllocationConfig::default(),
            finish_gate: FinishGate::default(),
            release_policy: ReleasePolicy::default(),
            admins: Vec::new(),
            pools: None,
        }
    }
}

impl SaleConfig {
    /// Start a builder from the default configuration
    pub fn builder() -> SaleConfigBuilder {
        SaleConfigBuilder::default()
    }

    /// Token cap in smallest token units
    pub fn token_cap_units(&self, token_unit: u128) -> Result<Uint128, Error> {
        Ok(Uint128::new(self.token_cap).checked_mul(Uint128::new(token_unit))?)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.token_cap == 0 {
            return Err(Error::Config("Token cap must be positive".to_string()));
        }
        self.pricing.validate()?;
        self.vesting.validate()?;
        self.allocation.validate()?;

        if let Some(pools) = &self.pools {
            if pools.advisors.is_empty() {
                return Err(Error::Config(
                    "At least one advisor address is required".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Step-by-step construction of a [`SaleConfig`]
#[derive(Debug, Clone, Default)]
pub struct SaleConfigBuilder {
    config: SaleConfig,
}

impl SaleConfigBuilder {
    pub fn token_cap(mut self, whole_tokens: u128) -> Self {
        self.config.token_cap = whole_tokens;
        self
    }

    pub fn eth_usd_rate(mut self, rate: u128) -> Self {
        self.config.pricing.eth_usd_rate = rate;
        self
    }

    pub fn pricing(mut self, pricing: PricingConfig) -> Self {
        self.config.pricing = pricing;
        self
    }

    pub fn vesting(mut self, vesting: VestingConfig) -> Self {
        self.config.vesting = vesting;
        self
    }

    pub fn allocation(mut self, allocation: AllocationConfig) -> Self {
        self.config.allocation = allocation;
        self
    }

    pub fn finish_gate(mut self, gate: FinishGate) -> Self {
        self.config.finish_gate = gate;
        self
    }

    pub fn release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.config.release_policy = policy;
        self
    }

    pub fn admins<I: IntoIterator<Item = Addr>>(mut self, admins: I) -> Self {
        self.config.admins.extend(admins);
        self
    }

    pub fn pools(mut self, pools: PoolAddresses) -> Self {
        self.config.pools = Some(pools);
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<SaleConfig, Error> {
        self.config.validate()?;
        Ok(self.config)
    }
}
