//! Token sale engine
//!
//! The [`Ledger`] owns all sale state and implements the SAFT -> TGE ->
//! Finished lifecycle, tiered pricing, referral bonuses, refunds and
//! class-based vesting releases. [`SaleService`] wraps it for concurrent
//! async callers.

pub mod access;
pub mod ledger;
pub mod pricing;
pub mod service;
pub mod types;
pub mod vesting;

pub use access::AccessControl;
pub use ledger::Ledger;
pub use pricing::{PricingContext, PricingEngine};
pub use service::SaleService;
pub use types::{
    Account, BeneficiaryClass, LedgerAudit, SaleEvent, SaleInfo, SaleStage, Stage,
};
pub use vesting::{GateReference, ReleaseGate, VestedFraction, VestingSchedule};
