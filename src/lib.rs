pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod sale;
pub mod token;

// Ledger exports
pub use sale::{
    Account, BeneficiaryClass, Ledger, LedgerAudit, SaleEvent, SaleInfo, SaleService, SaleStage,
    Stage,
};

// Collaborator exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use token::{MemoryToken, MemoryTreasury, TokenLedger, Treasury};

pub use config::{EnvironmentConfig, SaleConfig, SaleConfigBuilder};
pub use error::Error;
pub use logging::init_logging;

// Re-export common types from cosmwasm-std
pub use cosmwasm_std::{Addr, Uint128};
