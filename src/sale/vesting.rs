//! Time-gated release rules per beneficiary class.

use cosmwasm_std::Uint128;
use serde::{Deserialize, Serialize};

use super::types::BeneficiaryClass;
use crate::config::VestingConfig;

/// Share of an entitlement that is releasable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VestedFraction {
    Zero,
    Half,
    Full,
}

impl VestedFraction {
    /// Apply the fraction to an amount, rounding down
    pub fn apply(&self, amount: Uint128) -> Uint128 {
        match self {
            VestedFraction::Zero => Uint128::zero(),
            VestedFraction::Half => amount.multiply_ratio(1u128, 2u128),
            VestedFraction::Full => amount,
        }
    }
}

/// Release gates of one class, as shown by the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseGate {
    pub class: BeneficiaryClass,
    /// Reference instant the gate is measured from
    pub measured_from: GateReference,
    pub after_secs: u64,
    pub fraction: VestedFraction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateReference {
    /// Always open
    Allocation,
    /// Deployment of the sale
    Started,
    /// The sale reaching `Finished`
    Ended,
}

/// Pure vesting rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VestingSchedule {
    config: VestingConfig,
}

impl VestingSchedule {
    pub fn new(config: VestingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VestingConfig {
        &self.config
    }

    /// Fraction of the entitlement of `class` releasable at `now`
    pub fn releasable(
        &self,
        class: BeneficiaryClass,
        now: u64,
        started_time: u64,
        ended_time: Option<u64>,
    ) -> VestedFraction {
        let since_start = now.saturating_sub(started_time);
        let after_end = |lock: u64| match ended_time {
            Some(ended) if now >= ended.saturating_add(lock) => VestedFraction::Full,
            _ => VestedFraction::Zero,
        };

        match class {
            BeneficiaryClass::Ecosystem => VestedFraction::Full,
            BeneficiaryClass::Reserve => after_end(self.config.reserve_lock_secs),
            BeneficiaryClass::Team => after_end(self.config.team_lock_secs),
            BeneficiaryClass::Advisor => {
                if since_start >= self.config.advisor_second_gate_secs {
                    VestedFraction::Full
                } else if since_start >= self.config.advisor_first_gate_secs {
                    VestedFraction::Half
                } else {
                    VestedFraction::Zero
                }
            }
            BeneficiaryClass::Investor | BeneficiaryClass::Referrer => {
                if since_start >= self.config.investor_gate_secs {
                    VestedFraction::Full
                } else {
                    VestedFraction::Zero
                }
            }
        }
    }

    /// Amount that may be released now given the original entitlement and
    /// what has already been released
    pub fn releasable_amount(
        &self,
        class: BeneficiaryClass,
        entitlement: Uint128,
        released: Uint128,
        now: u64,
        started_time: u64,
        ended_time: Option<u64>,
    ) -> Uint128 {
        self.releasable(class, now, started_time, ended_time)
            .apply(entitlement)
            .saturating_sub(released)
    }

    /// All gates in chronological order of their reference
    pub fn gates(&self) -> Vec<ReleaseGate> {
        let gate = |class, measured_from, after_secs, fraction| ReleaseGate {
            class,
            measured_from,
            after_secs,
            fraction,
        };
        vec![
            gate(
                BeneficiaryClass::Ecosystem,
                GateReference::Allocation,
                0,
                VestedFraction::Full,
            ),
            gate(
                BeneficiaryClass::Advisor,
                GateReference::Started,
                self.config.advisor_first_gate_secs,
                VestedFraction::Half,
            ),
            gate(
                BeneficiaryClass::Advisor,
                GateReference::Started,
                self.config.advisor_second_gate_secs,
                VestedFraction::Full,
            ),
            gate(
                BeneficiaryClass::Investor,
                GateReference::Started,
                self.config.investor_gate_secs,
                VestedFraction::Full,
            ),
            gate(
                BeneficiaryClass::Referrer,
                GateReference::Started,
                self.config.investor_gate_secs,
                VestedFraction::Full,
            ),
            gate(
                BeneficiaryClass::Reserve,
                GateReference::Ended,
                self.config.reserve_lock_secs,
                VestedFraction::Full,
            ),
            gate(
                BeneficiaryClass::Team,
                GateReference::Ended,
                self.config.team_lock_secs,
                VestedFraction::Full,
            ),
        ]
    }
}

impl Default for VestingSchedule {
    fn default() -> Self {
        Self::new(VestingConfig::default())
    }
}
