/// Sale-specific types and structures
use cosmwasm_std::{Addr, Uint128};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level sale lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Investment,
    Finished,
}

/// Pricing phase within the investment stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStage {
    Saft,
    Tge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Investment => write!(f, "Investment"),
            Stage::Finished => write!(f, "Finished"),
        }
    }
}

impl fmt::Display for SaleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleStage::Saft => write!(f, "SAFT"),
            SaleStage::Tge => write!(f, "TGE"),
        }
    }
}

/// Category of a beneficiary, selecting its vesting rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryClass {
    Ecosystem,
    Reserve,
    Team,
    Advisor,
    Investor,
    Referrer,
}

impl BeneficiaryClass {
    /// Initial pools are allocated by the operator, not purchased
    pub fn is_pool(&self) -> bool {
        matches!(
            self,
            BeneficiaryClass::Ecosystem
                | BeneficiaryClass::Reserve
                | BeneficiaryClass::Team
                | BeneficiaryClass::Advisor
        )
    }
}

impl fmt::Display for BeneficiaryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BeneficiaryClass::Ecosystem => "ecosystem",
            BeneficiaryClass::Reserve => "reserve",
            BeneficiaryClass::Team => "team",
            BeneficiaryClass::Advisor => "advisor",
            BeneficiaryClass::Investor => "investor",
            BeneficiaryClass::Referrer => "referrer",
        };
        write!(f, "{}", name)
    }
}

/// Per-address ledger entry. Entries are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub class: BeneficiaryClass,
    /// Tokens credited but not yet released
    pub locked: Uint128,
    /// Tokens already credited to the token ledger
    pub released: Uint128,
}

impl Account {
    pub fn new(class: BeneficiaryClass) -> Self {
        Self {
            class,
            locked: Uint128::zero(),
            released: Uint128::zero(),
        }
    }

    /// Everything this account was ever entitled to that has not been refunded
    pub fn entitlement(&self) -> Uint128 {
        self.locked + self.released
    }
}

/// Consistent snapshot of the sale state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleInfo {
    pub stage: Stage,
    pub sale_stage: SaleStage,
    /// Active TGE price step (0 is the base TGE price)
    pub price_step: usize,
    /// Current stage price in micro-USD per token
    pub sale_stage_price_usd: u128,
    pub tokens_sold: Uint128,
    pub tokens_allocated: Uint128,
    pub token_cap: Uint128,
    pub total_released: Uint128,
    pub wei_raised: Uint128,
    pub started_time: u64,
    pub ended_time: Option<u64>,
    pub treasury: Addr,
    pub pools_distributed: bool,
    pub stages_initialized: bool,
}

impl SaleInfo {
    /// Whether purchases are currently accepted
    pub fn is_open(&self) -> bool {
        self.stage == Stage::Investment && self.pools_distributed && self.stages_initialized
    }

    /// Tokens that can still be allocated before the cap
    pub fn remaining(&self) -> Uint128 {
        self.token_cap.saturating_sub(self.tokens_allocated)
    }
}

/// Result of reconciling locked balances against the allocation counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAudit {
    pub locked_total: Uint128,
    pub released_total: Uint128,
    pub tokens_allocated: Uint128,
    pub tokens_sold: Uint128,
    pub token_cap: Uint128,
}

impl LedgerAudit {
    /// All accounting invariants hold
    pub fn is_consistent(&self) -> bool {
        self.locked_total + self.released_total == self.tokens_allocated
            && self.tokens_allocated <= self.token_cap
            && self.tokens_sold <= self.tokens_allocated
    }
}

/// Events appended by successful ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SaleEvent {
    AdminsAdded {
        admins: Vec<Addr>,
    },
    Whitelisted {
        address: Addr,
    },
    InitialTokensDistributed {
        ecosystem: Uint128,
        reserve: Uint128,
        team: Uint128,
        advisors: Uint128,
    },
    SaleStagesInitialized {
        steps: usize,
    },
    TokensPurchased {
        purchaser: Addr,
        beneficiary: Addr,
        value: Uint128,
        amount: Uint128,
    },
    InvestedOnBehalf {
        admin: Addr,
        beneficiary: Addr,
        amount: Uint128,
    },
    ReferralCredited {
        referrer: Addr,
        amount: Uint128,
    },
    Refunded {
        beneficiary: Addr,
        amount: Uint128,
    },
    SaleStageChanged {
        from: SaleStage,
        to: SaleStage,
    },
    PriceStepAdvanced {
        step: usize,
        price_usd: u128,
    },
    SaleFinished {
        unsold: Uint128,
        ended_time: u64,
        cap_reached: bool,
    },
    TokensReleased {
        beneficiary: Addr,
        class: BeneficiaryClass,
        amount: Uint128,
    },
}
