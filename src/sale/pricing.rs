//! Tiered price curve.
//!
//! Every price is a percentage of one basis price, quoted in micro-USD per
//! whole token. A contribution is converted to tokens with a single floor
//! division over 256-bit intermediates, so rounding never pushes a purchase
//! past the cap.

use cosmwasm_std::Uint128;
use tracing::debug;

use super::types::SaleStage;
use crate::config::{PricingConfig, SaftTier, SaftTierBasis, PRICE_UNIT, WEI_PER_ETH};
use crate::error::Error;

/// Percent scale used for price percentages and discounts
const PERCENT: u128 = 100;

/// Sale state the price of a contribution depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingContext {
    pub sale_stage: SaleStage,
    pub price_step: usize,
    pub tokens_sold: Uint128,
    pub wei_raised: Uint128,
}

/// Maps contribution value to a token amount
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
    token_unit: u128,
    saft_tge_threshold: Uint128,
    /// Cumulative tokens-sold level that activates each TGE step
    step_thresholds: Vec<Uint128>,
}

impl PricingEngine {
    pub fn new(config: PricingConfig, token_unit: u128) -> Result<Self, Error> {
        config.validate()?;
        let unit = Uint128::new(token_unit);

        let saft_tge_threshold = Uint128::new(config.saft_tge_threshold).checked_mul(unit)?;

        let mut step_thresholds = Vec::with_capacity(config.tge_steps.len());
        let mut level = Uint128::zero();
        for step in &config.tge_steps {
            level = level.checked_add(Uint128::new(step.added_volume).checked_mul(unit)?)?;
            step_thresholds.push(level);
        }

        Ok(Self {
            config,
            token_unit,
            saft_tge_threshold,
            step_thresholds,
        })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Number of TGE steps above the base TGE price
    pub fn step_count(&self) -> usize {
        self.step_thresholds.len()
    }

    /// Tokens-sold level that activates TGE step `step` (1-based)
    pub fn step_threshold(&self, step: usize) -> Option<Uint128> {
        step.checked_sub(1)
            .and_then(|i| self.step_thresholds.get(i).copied())
    }

    pub fn saft_tge_threshold(&self) -> Uint128 {
        self.saft_tge_threshold
    }

    /// Whole-USD value of a contribution, rounded down
    pub fn usd_value(&self, value: Uint128) -> Result<Uint128, Error> {
        Ok(value.checked_multiply_ratio(self.config.eth_usd_rate, WEI_PER_ETH)?)
    }

    /// SAFT tier for a USD amount; amounts below the first bound use the first tier
    pub fn saft_tier(&self, usd: Uint128) -> &SaftTier {
        self.config
            .saft_tiers
            .iter()
            .rev()
            .find(|tier| usd >= Uint128::new(tier.from_usd))
            .unwrap_or(&self.config.saft_tiers[0])
    }

    fn percent_of_basis(&self, percent: u32) -> u128 {
        self.config.basis_price_usd * percent as u128 / PERCENT
    }

    fn tge_percent(&self, step: usize) -> u32 {
        match step.checked_sub(1) {
            None => self.config.tge_base_percent,
            Some(i) => self
                .config
                .tge_steps
                .get(i)
                .or_else(|| self.config.tge_steps.last())
                .map(|s| s.price_percent)
                .unwrap_or(self.config.tge_base_percent),
        }
    }

    /// Advertised price of a stage in micro-USD per token.
    ///
    /// SAFT advertises its first tier; TGE advertises the active step.
    pub fn stage_price_usd(&self, sale_stage: SaleStage, step: usize) -> u128 {
        match sale_stage {
            SaleStage::Saft => self.percent_of_basis(self.config.saft_tiers[0].price_percent),
            SaleStage::Tge => self.percent_of_basis(self.tge_percent(step)),
        }
    }

    /// Token units bought by `value` wei in the given context
    pub fn price(&self, value: Uint128, ctx: &PricingContext) -> Result<Uint128, Error> {
        if value.is_zero() {
            return Ok(Uint128::zero());
        }

        let usd = self.usd_value(value)?;
        let (percent, discount) = match ctx.sale_stage {
            SaleStage::Saft => {
                let basis_usd = match self.config.saft_tier_basis {
                    SaftTierBasis::Contribution => usd,
                    SaftTierBasis::RaisedToDate => self.usd_value(ctx.wei_raised)?,
                };
                (self.saft_tier(basis_usd).price_percent, 0)
            }
            SaleStage::Tge => {
                let discount = if usd >= Uint128::new(self.config.volume_discount.min_usd) {
                    self.config.volume_discount.percent
                } else {
                    0
                };
                (self.tge_percent(ctx.price_step), discount)
            }
        };

        // tokens = value * rate * PRICE_UNIT * unit / (WEI * basis * percent% * (100 - discount)%)
        let numerator = Uint128::new(self.config.eth_usd_rate)
            .checked_mul(Uint128::new(PRICE_UNIT))?
            .checked_mul(Uint128::new(self.token_unit))?
            .checked_mul(Uint128::new(PERCENT * PERCENT))?;
        let denominator = Uint128::new(WEI_PER_ETH)
            .checked_mul(Uint128::new(self.config.basis_price_usd))?
            .checked_mul(Uint128::new(percent as u128))?
            .checked_mul(Uint128::new(PERCENT - discount as u128))?;

        let amount = value.checked_multiply_ratio(numerator, denominator)?;
        debug!(
            "Priced {} wei (${}) at {}% of basis with {}% discount in {}: {} units",
            value, usd, percent, discount, ctx.sale_stage, amount
        );
        Ok(amount)
    }

    /// Sale stage after a purchase brought the total sold to `tokens_sold`
    pub fn next_sale_stage(&self, current: SaleStage, tokens_sold: Uint128) -> SaleStage {
        match current {
            SaleStage::Saft if tokens_sold >= self.saft_tge_threshold => SaleStage::Tge,
            other => other,
        }
    }

    /// TGE step after a purchase brought the total sold to `tokens_sold`.
    /// Advances by at most one step per purchase.
    pub fn next_price_step(&self, step: usize, tokens_sold: Uint128) -> usize {
        match self.step_thresholds.get(step) {
            Some(threshold) if tokens_sold >= *threshold => step + 1,
            _ => step,
        }
    }
}
