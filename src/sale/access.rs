/// Admin set and contributor whitelist
use cosmwasm_std::Addr;
use std::collections::HashSet;
use tracing::warn;

use crate::error::Error;

/// Whether `address` is the all-zero address, with or without `0x`
pub fn is_zero_address(address: &Addr) -> bool {
    let raw = address.as_str();
    let body = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    !body.is_empty() && body.bytes().all(|b| b == b'0')
}

/// Append-only access sets. The owner is always an admin.
#[derive(Debug, Clone)]
pub struct AccessControl {
    owner: Addr,
    admins: HashSet<Addr>,
    whitelist: HashSet<Addr>,
}

impl AccessControl {
    pub fn new(owner: Addr) -> Self {
        Self {
            owner,
            admins: HashSet::new(),
            whitelist: HashSet::new(),
        }
    }

    pub fn owner(&self) -> &Addr {
        &self.owner
    }

    pub fn is_admin(&self, address: &Addr) -> bool {
        address == &self.owner || self.admins.contains(address)
    }

    pub fn is_whitelisted(&self, address: &Addr) -> bool {
        self.whitelist.contains(address)
    }

    /// Fail with `Unauthorized` unless `caller` is an admin
    pub fn ensure_admin(&self, caller: &Addr, operation: &str) -> Result<(), Error> {
        if self.is_admin(caller) {
            return Ok(());
        }
        warn!("Rejected {} from non-admin {}", operation, caller);
        Err(Error::Unauthorized(format!(
            "{} is not an admin and cannot call {}",
            caller, operation
        )))
    }

    /// Fail with `Unauthorized` unless `address` is whitelisted
    pub fn ensure_whitelisted(&self, address: &Addr) -> Result<(), Error> {
        if self.is_whitelisted(address) {
            return Ok(());
        }
        warn!("Rejected purchase for non-whitelisted {}", address);
        Err(Error::Unauthorized(format!("{} is not whitelisted", address)))
    }

    /// Insert admins, returning the ones that were new
    pub fn add_admins<I: IntoIterator<Item = Addr>>(&mut self, admins: I) -> Vec<Addr> {
        admins
            .into_iter()
            .filter(|admin| self.admins.insert(admin.clone()))
            .collect()
    }

    /// Insert an address into the whitelist, returning whether it was new
    pub fn add_to_whitelist(&mut self, address: Addr) -> bool {
        self.whitelist.insert(address)
    }

    pub fn admin_count(&self) -> usize {
        self.admins.len()
    }
}
