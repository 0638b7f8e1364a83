//! Sale ledger: the single owner of all mutable sale state.
//!
//! Every mutating operation follows the same shape: sample the clock once,
//! check permissions and stage, compute the new counters into locals with
//! checked arithmetic, perform the external effect (treasury forward or token
//! credit), and only then commit. A failure at any point before the commit
//! leaves the ledger untouched.

use cosmwasm_std::{Addr, Uint128};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use super::access::{is_zero_address, AccessControl};
use super::pricing::{PricingContext, PricingEngine};
use super::types::{
    Account, BeneficiaryClass, LedgerAudit, SaleEvent, SaleInfo, SaleStage, Stage,
};
use super::vesting::VestingSchedule;
use crate::clock::Clock;
use crate::config::{AllocationConfig, FinishGate, PoolAddresses, ReleasePolicy, SaleConfig};
use crate::error::Error;
use crate::token::{TokenLedger, Treasury};

#[derive(Debug, Clone)]
struct SaleState {
    stage: Stage,
    sale_stage: SaleStage,
    price_step: usize,
    tokens_sold: Uint128,
    tokens_allocated: Uint128,
    token_cap: Uint128,
    total_released: Uint128,
    wei_raised: Uint128,
    started_time: u64,
    ended_time: Option<u64>,
    stages_initialized: bool,
}

/// Counters after a purchase or admin allocation, computed before commit
struct Booking {
    beneficiary: Addr,
    amount: Uint128,
    referral: Option<(Addr, Uint128)>,
    tokens_sold: Uint128,
    tokens_allocated: Uint128,
}

/// Token sale ledger
pub struct Ledger {
    pricing: PricingEngine,
    vesting: VestingSchedule,
    access: AccessControl,
    allocation: AllocationConfig,
    finish_gate: FinishGate,
    release_policy: ReleasePolicy,
    token: Arc<dyn TokenLedger>,
    treasury: Arc<dyn Treasury>,
    clock: Arc<dyn Clock>,
    state: SaleState,
    accounts: HashMap<Addr, Account>,
    pools: Option<PoolAddresses>,
    events: Vec<SaleEvent>,
}

impl Ledger {
    /// Create a ledger owned by `owner`.
    ///
    /// Admins listed in the configuration are added immediately; pools and
    /// sale stages still have to be set up before purchases are accepted.
    pub fn new(
        config: SaleConfig,
        owner: Addr,
        token: Arc<dyn TokenLedger>,
        treasury: Arc<dyn Treasury>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        config.validate()?;

        let token_unit = token.unit()?;
        let pricing = PricingEngine::new(config.pricing.clone(), token_unit)?;
        let token_cap = config.token_cap_units(token_unit)?;

        let mut access = AccessControl::new(owner.clone());
        access.add_admins(config.admins.iter().cloned());

        let started_time = clock.now();
        info!(
            "Sale deployed by {} at {} with cap {} and rate {} USD/ETH",
            owner, started_time, token_cap, config.pricing.eth_usd_rate
        );

        Ok(Self {
            pricing,
            vesting: VestingSchedule::new(config.vesting),
            access,
            allocation: config.allocation,
            finish_gate: config.finish_gate,
            release_policy: config.release_policy,
            token,
            treasury,
            clock,
            state: SaleState {
                stage: Stage::Investment,
                sale_stage: SaleStage::Saft,
                price_step: 0,
                tokens_sold: Uint128::zero(),
                tokens_allocated: Uint128::zero(),
                token_cap,
                total_released: Uint128::zero(),
                wei_raised: Uint128::zero(),
                started_time,
                ended_time: None,
                stages_initialized: false,
            },
            accounts: HashMap::new(),
            pools: None,
            events: Vec::new(),
        })
    }

    /// Construct the ledger and run the full deployment sequence: configured
    /// admins, initial pool distribution (when pools are configured) and sale
    /// stage initialization.
    pub fn deploy(
        config: SaleConfig,
        deployer: Addr,
        token: Arc<dyn TokenLedger>,
        treasury: Arc<dyn Treasury>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        let pools = config.pools.clone();
        let mut ledger = Self::new(config, deployer.clone(), token, treasury, clock)?;

        if let Some(pools) = pools {
            ledger.distribute_initial_tokens(
                &deployer,
                pools.ecosystem,
                pools.reserve,
                pools.team,
                pools.advisors,
            )?;
        }
        ledger.initialize_sale_stages(&deployer)?;

        Ok(ledger)
    }

    // ========== Guards ==========

    fn ensure_investment(&self, operation: &str) -> Result<(), Error> {
        if self.state.stage != Stage::Investment {
            return Err(Error::InvalidStage(format!(
                "{} is not allowed once the sale is {}",
                operation, self.state.stage
            )));
        }
        Ok(())
    }

    fn ensure_open(&self, operation: &str) -> Result<(), Error> {
        self.ensure_investment(operation)?;
        if self.pools.is_none() {
            return Err(Error::InvalidStage(format!(
                "{} requires the initial tokens to be distributed",
                operation
            )));
        }
        if !self.state.stages_initialized {
            return Err(Error::InvalidStage(format!(
                "{} requires the sale stages to be initialized",
                operation
            )));
        }
        Ok(())
    }

    fn pricing_context(&self) -> PricingContext {
        PricingContext {
            sale_stage: self.state.sale_stage,
            price_step: self.state.price_step,
            tokens_sold: self.state.tokens_sold,
            wei_raised: self.state.wei_raised,
        }
    }

    // ========== Admin setup ==========

    /// Add admins; already-present admins are ignored
    pub fn add_addresses_to_admins(
        &mut self,
        caller: &Addr,
        admins: Vec<Addr>,
    ) -> Result<(), Error> {
        self.access.ensure_admin(caller, "add_addresses_to_admins")?;
        let added = self.access.add_admins(admins);
        if !added.is_empty() {
            info!("Added {} admin(s)", added.len());
            self.events.push(SaleEvent::AdminsAdded { admins: added });
        }
        Ok(())
    }

    /// Allow `address` to receive purchased tokens
    pub fn add_address_to_whitelist(&mut self, caller: &Addr, address: Addr) -> Result<(), Error> {
        self.access.ensure_admin(caller, "add_address_to_whitelist")?;
        if self.access.add_to_whitelist(address.clone()) {
            debug!("Whitelisted {}", address);
            self.events.push(SaleEvent::Whitelisted { address });
        }
        Ok(())
    }

    /// Lock the initial pools. One-time; the first advisor absorbs the
    /// remainder of the even advisor split.
    pub fn distribute_initial_tokens(
        &mut self,
        caller: &Addr,
        ecosystem: Addr,
        reserve: Addr,
        team: Addr,
        advisors: Vec<Addr>,
    ) -> Result<(), Error> {
        self.access.ensure_admin(caller, "distribute_initial_tokens")?;
        self.ensure_investment("distribute_initial_tokens")?;
        if self.pools.is_some() {
            return Err(Error::InvalidStage(
                "Initial tokens have already been distributed".to_string(),
            ));
        }
        if !self.state.tokens_sold.is_zero() {
            return Err(Error::InvalidStage(
                "Initial tokens must be distributed before any purchase".to_string(),
            ));
        }
        if advisors.is_empty() {
            return Err(Error::Config(
                "At least one advisor address is required".to_string(),
            ));
        }

        let mut unique = HashSet::new();
        for address in [&ecosystem, &reserve, &team].into_iter().chain(advisors.iter()) {
            if !unique.insert(address) {
                return Err(Error::Config(format!(
                    "Address {} appears in more than one pool",
                    address
                )));
            }
            if self.accounts.contains_key(address) {
                return Err(Error::Config(format!(
                    "Address {} already holds an allocation",
                    address
                )));
            }
        }

        let cap = self.state.token_cap;
        let share = |percent: u32| cap.checked_multiply_ratio(percent as u128, 100u128);
        let ecosystem_amount = share(self.allocation.ecosystem_percent)?;
        let reserve_amount = share(self.allocation.reserve_percent)?;
        let team_amount = share(self.allocation.team_percent)?;
        let advisors_amount = share(self.allocation.advisors_percent)?;

        let count = advisors.len() as u128;
        let per_advisor = Uint128::new(advisors_amount.u128() / count);
        let remainder = Uint128::new(advisors_amount.u128() % count);

        let total = ecosystem_amount
            .checked_add(reserve_amount)?
            .checked_add(team_amount)?
            .checked_add(advisors_amount)?;
        let tokens_allocated = self.state.tokens_allocated.checked_add(total)?;
        if tokens_allocated > cap {
            return Err(Error::CapExceeded {
                requested: total,
                available: cap.saturating_sub(self.state.tokens_allocated),
            });
        }

        let mut lock = |address: &Addr, class: BeneficiaryClass, amount: Uint128| {
            let account = self
                .accounts
                .entry(address.clone())
                .or_insert_with(|| Account::new(class));
            account.locked += amount;
        };
        lock(&ecosystem, BeneficiaryClass::Ecosystem, ecosystem_amount);
        lock(&reserve, BeneficiaryClass::Reserve, reserve_amount);
        lock(&team, BeneficiaryClass::Team, team_amount);
        for (i, advisor) in advisors.iter().enumerate() {
            let amount = if i == 0 { per_advisor + remainder } else { per_advisor };
            lock(advisor, BeneficiaryClass::Advisor, amount);
        }

        self.state.tokens_allocated = tokens_allocated;
        self.pools = Some(PoolAddresses {
            ecosystem,
            reserve,
            team,
            advisors,
        });
        self.events.push(SaleEvent::InitialTokensDistributed {
            ecosystem: ecosystem_amount,
            reserve: reserve_amount,
            team: team_amount,
            advisors: advisors_amount,
        });
        info!("Initial pools locked: {} tokens allocated", tokens_allocated);
        Ok(())
    }

    /// Install the TGE price steps. One-time.
    pub fn initialize_sale_stages(&mut self, caller: &Addr) -> Result<(), Error> {
        self.access.ensure_admin(caller, "initialize_sale_stages")?;
        self.ensure_investment("initialize_sale_stages")?;
        if self.state.stages_initialized {
            return Err(Error::InvalidStage(
                "Sale stages have already been initialized".to_string(),
            ));
        }

        self.state.stages_initialized = true;
        let steps = self.pricing.step_count();
        self.events.push(SaleEvent::SaleStagesInitialized { steps });
        info!("Sale stages initialized with {} TGE price steps", steps);
        Ok(())
    }

    // ========== Purchases and allocations ==========

    fn plan_booking(
        &self,
        beneficiary: &Addr,
        amount: Uint128,
        referrer: Option<&Addr>,
    ) -> Result<Booking, Error> {
        if amount.is_zero() {
            return Err(Error::InvalidAmount(
                "Allocation must be at least one token unit".to_string(),
            ));
        }

        // Purchased and referred tokens follow the investor rules, never a pool's
        let parties = std::iter::once(("beneficiary", beneficiary))
            .chain(referrer.map(|r| ("referrer", r)));
        for (role, address) in parties {
            if let Some(class) = self.class_of(address).filter(|c| c.is_pool()) {
                return Err(Error::Unauthorized(format!(
                    "{} {} holds a {} pool allocation and cannot receive sale tokens",
                    role, address, class
                )));
            }
        }

        let referral = match referrer.filter(|r| !is_zero_address(r)) {
            Some(referrer) => {
                let bonus = amount.checked_multiply_ratio(
                    self.allocation.referral_bonus_percent as u128,
                    100u128,
                )?;
                Some((referrer.clone(), bonus))
            }
            None => None,
        };
        let bonus = referral.as_ref().map(|(_, b)| *b).unwrap_or_default();
        let total = amount.checked_add(bonus)?;

        let available = self
            .state
            .token_cap
            .saturating_sub(self.state.tokens_allocated);
        if total > available {
            return Err(Error::CapExceeded {
                requested: total,
                available,
            });
        }

        Ok(Booking {
            beneficiary: beneficiary.clone(),
            amount,
            referral,
            tokens_sold: self.state.tokens_sold.checked_add(total)?,
            tokens_allocated: self.state.tokens_allocated.checked_add(total)?,
        })
    }

    fn commit_booking(&mut self, booking: Booking, now: u64) {
        self.accounts
            .entry(booking.beneficiary.clone())
            .or_insert_with(|| Account::new(BeneficiaryClass::Investor))
            .locked += booking.amount;

        if let Some((referrer, bonus)) = booking.referral {
            if !bonus.is_zero() {
                self.accounts
                    .entry(referrer.clone())
                    .or_insert_with(|| Account::new(BeneficiaryClass::Referrer))
                    .locked += bonus;
                self.events.push(SaleEvent::ReferralCredited {
                    referrer,
                    amount: bonus,
                });
            }
        }

        self.state.tokens_sold = booking.tokens_sold;
        self.state.tokens_allocated = booking.tokens_allocated;

        // Price steps only move once the sale is already in TGE
        if self.state.sale_stage == SaleStage::Tge {
            let step = self
                .pricing
                .next_price_step(self.state.price_step, self.state.tokens_sold);
            if step != self.state.price_step {
                self.state.price_step = step;
                let price_usd = self.pricing.stage_price_usd(SaleStage::Tge, step);
                info!("TGE price step {} reached: {} micro-USD per token", step, price_usd);
                self.events
                    .push(SaleEvent::PriceStepAdvanced { step, price_usd });
            }
        }

        let next = self
            .pricing
            .next_sale_stage(self.state.sale_stage, self.state.tokens_sold);
        if next != self.state.sale_stage {
            info!("Sale stage changed from {} to {}", self.state.sale_stage, next);
            self.events.push(SaleEvent::SaleStageChanged {
                from: self.state.sale_stage,
                to: next,
            });
            self.state.sale_stage = next;
        }

        if self.state.tokens_allocated == self.state.token_cap {
            self.close(now, true);
        }
    }

    /// Buy tokens for `beneficiary` with `value` wei sent by `purchaser`.
    ///
    /// Returns the purchased amount, excluding any referral bonus.
    pub fn buy_tokens(
        &mut self,
        purchaser: &Addr,
        beneficiary: &Addr,
        referrer: Option<&Addr>,
        value: Uint128,
    ) -> Result<Uint128, Error> {
        let now = self.clock.now();
        self.ensure_open("buy_tokens")?;
        self.access.ensure_whitelisted(beneficiary)?;

        let amount = self.pricing.price(value, &self.pricing_context())?;
        let booking = self.plan_booking(beneficiary, amount, referrer)?;
        let wei_raised = self.state.wei_raised.checked_add(value)?;

        self.treasury.forward(purchaser, value)?;

        self.state.wei_raised = wei_raised;
        self.events.push(SaleEvent::TokensPurchased {
            purchaser: purchaser.clone(),
            beneficiary: beneficiary.clone(),
            value,
            amount,
        });
        info!(
            "{} bought {} token units for {} with {} wei",
            purchaser, amount, beneficiary, value
        );
        self.commit_booking(booking, now);
        Ok(amount)
    }

    /// Allocate `amount` token units to `beneficiary` without payment
    pub fn invest_on_behalf_of(
        &mut self,
        caller: &Addr,
        beneficiary: &Addr,
        amount: Uint128,
        referrer: Option<&Addr>,
    ) -> Result<(), Error> {
        let now = self.clock.now();
        self.access.ensure_admin(caller, "invest_on_behalf_of")?;
        self.ensure_open("invest_on_behalf_of")?;

        let booking = self.plan_booking(beneficiary, amount, referrer)?;

        self.events.push(SaleEvent::InvestedOnBehalf {
            admin: caller.clone(),
            beneficiary: beneficiary.clone(),
            amount,
        });
        info!("{} allocated {} token units to {}", caller, amount, beneficiary);
        self.commit_booking(booking, now);
        Ok(())
    }

    /// Reverse the still-locked balance of an investor or referrer
    pub fn refund(&mut self, caller: &Addr, beneficiary: &Addr) -> Result<Uint128, Error> {
        self.access.ensure_admin(caller, "refund")?;
        self.ensure_investment("refund")?;

        let account = self
            .accounts
            .get(beneficiary)
            .ok_or_else(|| Error::NothingToRefund(format!("{} has no allocation", beneficiary)))?;
        if account.class.is_pool() {
            return Err(Error::NothingToRefund(format!(
                "{} holds a {} pool allocation, which is not refundable",
                beneficiary, account.class
            )));
        }
        let amount = account.locked;
        if amount.is_zero() {
            return Err(Error::NothingToRefund(format!(
                "{} has no locked balance",
                beneficiary
            )));
        }

        let tokens_sold = self.state.tokens_sold.checked_sub(amount)?;
        let tokens_allocated = self.state.tokens_allocated.checked_sub(amount)?;

        if let Some(account) = self.accounts.get_mut(beneficiary) {
            account.locked = Uint128::zero();
        }
        self.state.tokens_sold = tokens_sold;
        self.state.tokens_allocated = tokens_allocated;
        self.events.push(SaleEvent::Refunded {
            beneficiary: beneficiary.clone(),
            amount,
        });
        info!("Refunded {} token units of {}", amount, beneficiary);
        Ok(amount)
    }

    // ========== Lifecycle ==========

    fn close(&mut self, now: u64, cap_reached: bool) -> Uint128 {
        let unsold = self
            .state
            .token_cap
            .saturating_sub(self.state.tokens_allocated);
        if !unsold.is_zero() {
            if let Some(pools) = &self.pools {
                self.accounts
                    .entry(pools.reserve.clone())
                    .or_insert_with(|| Account::new(BeneficiaryClass::Reserve))
                    .locked += unsold;
                self.state.tokens_allocated = self.state.token_cap;
            }
        }

        self.state.stage = Stage::Finished;
        self.state.ended_time = Some(now);
        self.events.push(SaleEvent::SaleFinished {
            unsold,
            ended_time: now,
            cap_reached,
        });
        info!(
            "Sale finished at {} (cap reached: {}), {} unsold token units moved to reserve",
            now, cap_reached, unsold
        );
        unsold
    }

    /// End the sale, moving unsold tokens to the reserve pool.
    ///
    /// Returns the amount credited to the reserve.
    pub fn finish(&mut self, caller: &Addr) -> Result<Uint128, Error> {
        let now = self.clock.now();
        self.access.ensure_admin(caller, "finish")?;
        self.ensure_investment("finish")?;
        if self.pools.is_none() {
            return Err(Error::InvalidStage(
                "finish requires the initial tokens to be distributed".to_string(),
            ));
        }

        if let Some(not_before) = self.finish_gate.not_before {
            if now < not_before {
                return Err(Error::TimeGateNotReached(format!(
                    "sale cannot finish before {}, now {}",
                    not_before, now
                )));
            }
        }
        let elapsed = now.saturating_sub(self.state.started_time);
        if elapsed < self.finish_gate.min_elapsed_secs {
            return Err(Error::TimeGateNotReached(format!(
                "sale must run {}s before finishing, ran {}s",
                self.finish_gate.min_elapsed_secs, elapsed
            )));
        }

        Ok(self.close(now, false))
    }

    // ========== Release ==========

    /// Release the vested part of a beneficiary's locked balance to the
    /// token ledger.
    pub fn release_tokens_for(&mut self, caller: &Addr, beneficiary: &Addr) -> Result<Uint128, Error> {
        let now = self.clock.now();
        if self.release_policy == ReleasePolicy::AdminOnly {
            self.access.ensure_admin(caller, "release_tokens_for")?;
        }

        let account = self
            .accounts
            .get(beneficiary)
            .ok_or_else(|| Error::NothingToRelease(beneficiary.to_string()))?;
        let class = account.class;
        let fraction = self
            .vesting
            .releasable(class, now, self.state.started_time, self.state.ended_time);
        let delta = fraction
            .apply(account.entitlement())
            .saturating_sub(account.released);
        debug!(
            "Release check for {} ({}): {:?} of {} vested, {} already released",
            beneficiary,
            class,
            fraction,
            account.entitlement(),
            account.released
        );
        if delta.is_zero() {
            return Err(Error::NothingToRelease(beneficiary.to_string()));
        }
        let total_released = self.state.total_released.checked_add(delta)?;

        self.token.credit(beneficiary, delta)?;

        if let Some(account) = self.accounts.get_mut(beneficiary) {
            account.locked -= delta;
            account.released += delta;
        }
        self.state.total_released = total_released;
        self.events.push(SaleEvent::TokensReleased {
            beneficiary: beneficiary.clone(),
            class,
            amount: delta,
        });
        info!("Released {} token units to {} ({})", delta, beneficiary, class);
        Ok(delta)
    }

    /// Amount a release call would credit right now
    pub fn releasable_now(&self, beneficiary: &Addr) -> Uint128 {
        self.accounts
            .get(beneficiary)
            .map(|account| {
                self.vesting.releasable_amount(
                    account.class,
                    account.entitlement(),
                    account.released,
                    self.clock.now(),
                    self.state.started_time,
                    self.state.ended_time,
                )
            })
            .unwrap_or_default()
    }

    // ========== Queries ==========

    /// Tokens `value` wei would buy right now
    pub fn get_token_amount(&self, value: Uint128) -> Result<Uint128, Error> {
        self.pricing.price(value, &self.pricing_context())
    }

    pub fn locked_balance_of(&self, address: &Addr) -> Uint128 {
        self.accounts
            .get(address)
            .map(|a| a.locked)
            .unwrap_or_default()
    }

    pub fn released_of(&self, address: &Addr) -> Uint128 {
        self.accounts
            .get(address)
            .map(|a| a.released)
            .unwrap_or_default()
    }

    pub fn class_of(&self, address: &Addr) -> Option<BeneficiaryClass> {
        self.accounts.get(address).map(|a| a.class)
    }

    pub fn account(&self, address: &Addr) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn tokens_sold(&self) -> Uint128 {
        self.state.tokens_sold
    }

    pub fn tokens_allocated(&self) -> Uint128 {
        self.state.tokens_allocated
    }

    pub fn token_cap(&self) -> Uint128 {
        self.state.token_cap
    }

    pub fn total_released(&self) -> Uint128 {
        self.state.total_released
    }

    pub fn wei_raised(&self) -> Uint128 {
        self.state.wei_raised
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn sale_stage(&self) -> SaleStage {
        self.state.sale_stage
    }

    pub fn price_step(&self) -> usize {
        self.state.price_step
    }

    /// Current stage price in micro-USD per token
    pub fn sale_stage_price_usd(&self) -> u128 {
        self.pricing
            .stage_price_usd(self.state.sale_stage, self.state.price_step)
    }

    pub fn started_time(&self) -> u64 {
        self.state.started_time
    }

    pub fn ended_time(&self) -> Option<u64> {
        self.state.ended_time
    }

    pub fn is_admin(&self, address: &Addr) -> bool {
        self.access.is_admin(address)
    }

    pub fn is_whitelisted(&self, address: &Addr) -> bool {
        self.access.is_whitelisted(address)
    }

    pub fn owner(&self) -> &Addr {
        self.access.owner()
    }

    /// Wallet receiving contribution value
    pub fn treasury(&self) -> &Addr {
        self.treasury.address()
    }

    pub fn pools(&self) -> Option<&PoolAddresses> {
        self.pools.as_ref()
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    pub fn vesting(&self) -> &VestingSchedule {
        &self.vesting
    }

    /// Snapshot of all scalar sale state
    pub fn info(&self) -> SaleInfo {
        SaleInfo {
            stage: self.state.stage,
            sale_stage: self.state.sale_stage,
            price_step: self.state.price_step,
            sale_stage_price_usd: self.sale_stage_price_usd(),
            tokens_sold: self.state.tokens_sold,
            tokens_allocated: self.state.tokens_allocated,
            token_cap: self.state.token_cap,
            total_released: self.state.total_released,
            wei_raised: self.state.wei_raised,
            started_time: self.state.started_time,
            ended_time: self.state.ended_time,
            treasury: self.treasury.address().clone(),
            pools_distributed: self.pools.is_some(),
            stages_initialized: self.state.stages_initialized,
        }
    }

    /// Reconcile locked balances against the allocation counters
    pub fn audit(&self) -> LedgerAudit {
        let locked_total = self.accounts.values().map(|a| a.locked).sum();
        let released_total = self.accounts.values().map(|a| a.released).sum();
        LedgerAudit {
            locked_total,
            released_total,
            tokens_allocated: self.state.tokens_allocated,
            tokens_sold: self.state.tokens_sold,
            token_cap: self.state.token_cap,
        }
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SaleEvent> {
        std::mem::take(&mut self.events)
    }
}
