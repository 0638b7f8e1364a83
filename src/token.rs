//! Token ledger and treasury collaborators.
//!
//! The sale ledger only ever needs two things from the fungible token:
//! crediting a releasable balance and reading the unit scale. The in-memory
//! implementations here back the CLI and the test suites.

use cosmwasm_std::{Addr, Uint128};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::debug;

use crate::error::Error;

/// Default number of decimals for sale tokens
pub const DEFAULT_DECIMALS: u8 = 18;

/// Spendable-balance ledger that receives released tokens
pub trait TokenLedger: Send + Sync {
    /// Increase the spendable balance of `to` by `amount`
    fn credit(&self, to: &Addr, amount: Uint128) -> Result<(), Error>;

    /// Number of decimals of the token unit
    fn decimals(&self) -> u8;

    /// Smallest-unit scale, i.e. `10^decimals`
    fn unit(&self) -> Result<u128, Error> {
        10u128
            .checked_pow(self.decimals() as u32)
            .ok_or_else(|| Error::Token(format!("Unsupported decimals: {}", self.decimals())))
    }
}

/// Destination of contribution value collected by purchases
pub trait Treasury: Send + Sync {
    /// Treasury (wallet) address
    fn address(&self) -> &Addr;

    /// Forward contribution value sent by `from`
    fn forward(&self, from: &Addr, value: Uint128) -> Result<(), Error>;
}

#[derive(Debug, Default)]
struct TokenState {
    balances: HashMap<Addr, Uint128>,
    burn_allowances: HashMap<Addr, Uint128>,
    managers: HashSet<Addr>,
    total_supply: Uint128,
}

/// Token balances held in memory
///
/// Burning is gated by an allowance that only a manager can grant. The
/// allowance is a one-time spend right: [`MemoryToken::burn`] consumes it in
/// the same critical section that debits the balance.
#[derive(Debug)]
pub struct MemoryToken {
    decimals: u8,
    state: RwLock<TokenState>,
}

/// Read-only view of a token holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHolder {
    pub address: Addr,
    pub balance: Uint128,
    pub burn_allowance: Uint128,
}

impl MemoryToken {
    /// Create an empty token with the given decimals
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals,
            state: RwLock::new(TokenState::default()),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, TokenState>, Error> {
        self.state
            .read()
            .map_err(|e| Error::Token(format!("Token state poisoned: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, TokenState>, Error> {
        self.state
            .write()
            .map_err(|e| Error::Token(format!("Token state poisoned: {}", e)))
    }

    /// Spendable balance of an address
    pub fn balance_of(&self, address: &Addr) -> Uint128 {
        self.read()
            .ok()
            .and_then(|s| s.balances.get(address).copied())
            .unwrap_or_default()
    }

    /// Total amount ever credited minus burns
    pub fn total_supply(&self) -> Uint128 {
        self.read().map(|s| s.total_supply).unwrap_or_default()
    }

    /// Register an address allowed to grant burn allowances
    pub fn add_manager(&self, manager: Addr) -> Result<(), Error> {
        self.write()?.managers.insert(manager);
        Ok(())
    }

    /// Whether an address is a token manager
    pub fn is_manager(&self, address: &Addr) -> bool {
        self.read()
            .map(|s| s.managers.contains(address))
            .unwrap_or(false)
    }

    /// Grant `holder` the right to burn up to `amount` of its own tokens
    pub fn set_burn_allowance(
        &self,
        manager: &Addr,
        holder: &Addr,
        amount: Uint128,
    ) -> Result<(), Error> {
        let mut state = self.write()?;
        if !state.managers.contains(manager) {
            return Err(Error::Unauthorized(format!(
                "{} is not a token manager",
                manager
            )));
        }
        state.burn_allowances.insert(holder.clone(), amount);
        debug!("Burn allowance for {} set to {}", holder, amount);
        Ok(())
    }

    /// Current burn allowance of a holder
    pub fn burn_allowance_of(&self, holder: &Addr) -> Uint128 {
        self.read()
            .ok()
            .and_then(|s| s.burn_allowances.get(holder).copied())
            .unwrap_or_default()
    }

    /// Burn `amount` of the holder's tokens, consuming the allowance
    pub fn burn(&self, holder: &Addr, amount: Uint128) -> Result<(), Error> {
        if amount.is_zero() {
            return Err(Error::InvalidAmount("Burn amount must be positive".to_string()));
        }

        let mut state = self.write()?;
        let allowance = state.burn_allowances.get(holder).copied().unwrap_or_default();
        if allowance < amount {
            return Err(Error::Unauthorized(format!(
                "Burn of {} exceeds allowance {} for {}",
                amount, allowance, holder
            )));
        }
        let balance = state.balances.get(holder).copied().unwrap_or_default();
        let new_balance = balance.checked_sub(amount)?;
        let new_supply = state.total_supply.checked_sub(amount)?;

        state.burn_allowances.insert(holder.clone(), allowance - amount);
        state.balances.insert(holder.clone(), new_balance);
        state.total_supply = new_supply;
        Ok(())
    }

    /// Snapshot of a holder
    pub fn holder(&self, address: &Addr) -> TokenHolder {
        TokenHolder {
            address: address.clone(),
            balance: self.balance_of(address),
            burn_allowance: self.burn_allowance_of(address),
        }
    }
}

impl Default for MemoryToken {
    fn default() -> Self {
        Self::new(DEFAULT_DECIMALS)
    }
}

impl TokenLedger for MemoryToken {
    fn credit(&self, to: &Addr, amount: Uint128) -> Result<(), Error> {
        let mut state = self.write()?;
        let balance = state.balances.get(to).copied().unwrap_or_default();
        let new_balance = balance.checked_add(amount)?;
        let new_supply = state.total_supply.checked_add(amount)?;
        state.balances.insert(to.clone(), new_balance);
        state.total_supply = new_supply;
        Ok(())
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }
}

/// Treasury wallet that records forwarded value per contributor
#[derive(Debug)]
pub struct MemoryTreasury {
    address: Addr,
    received: RwLock<HashMap<Addr, Uint128>>,
}

impl MemoryTreasury {
    pub fn new(address: Addr) -> Self {
        Self {
            address,
            received: RwLock::new(HashMap::new()),
        }
    }

    /// Total value forwarded to this wallet
    pub fn balance(&self) -> Uint128 {
        self.received
            .read()
            .map(|r| r.values().copied().sum())
            .unwrap_or_default()
    }

    /// Value forwarded on behalf of one contributor
    pub fn received_from(&self, from: &Addr) -> Uint128 {
        self.received
            .read()
            .ok()
            .and_then(|r| r.get(from).copied())
            .unwrap_or_default()
    }
}

impl Treasury for MemoryTreasury {
    fn address(&self) -> &Addr {
        &self.address
    }

    fn forward(&self, from: &Addr, value: Uint128) -> Result<(), Error> {
        let mut received = self
            .received
            .write()
            .map_err(|e| Error::Treasury(format!("Treasury state poisoned: {}", e)))?;
        let entry = received.entry(from.clone()).or_default();
        *entry = entry.checked_add(value)?;
        Ok(())
    }
}
