//! Async front of the ledger.
//!
//! Operations are serialized through one mutex so each one runs to
//! completion against a consistent state. After every successful mutation a
//! fresh [`SaleInfo`] snapshot is published to watchers and the ledger's
//! pending events are moved onto a bounded broadcast channel, so the ledger
//! never accumulates events for the lifetime of the service.

use cosmwasm_std::{Addr, Uint128};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::debug;

use super::ledger::Ledger;
use super::types::{Account, BeneficiaryClass, LedgerAudit, SaleEvent, SaleInfo};
use crate::error::Error;

/// Events buffered per subscriber before it starts lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Shared handle to a sale ledger
#[derive(Clone)]
pub struct SaleService {
    ledger: Arc<Mutex<Ledger>>,
    info_tx: Arc<watch::Sender<SaleInfo>>,
    events_tx: broadcast::Sender<SaleEvent>,
}

impl SaleService {
    /// Wrap a ledger. Events recorded before this call (deployment) are
    /// discarded.
    pub fn new(mut ledger: Ledger) -> Self {
        let setup_events = ledger.drain_events();
        debug!("Discarded {} deployment event(s)", setup_events.len());

        let (info_tx, _) = watch::channel(ledger.info());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            info_tx: Arc::new(info_tx),
            events_tx,
        }
    }

    /// Run a mutating operation and publish the resulting snapshot
    async fn mutate<T, F>(&self, operation: &str, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Ledger) -> Result<T, Error>,
    {
        let mut ledger = self.ledger.lock().await;
        let result = f(&mut *ledger)?;
        let info = ledger.info();
        debug!(
            "{} committed: {} sold, {} allocated",
            operation, info.tokens_sold, info.tokens_allocated
        );
        self.info_tx.send_replace(info);

        // Sending only fails when nobody is subscribed
        for event in ledger.drain_events() {
            let _ = self.events_tx.send(event);
        }
        Ok(result)
    }

    pub async fn add_addresses_to_admins(&self, caller: &Addr, admins: Vec<Addr>) -> Result<(), Error> {
        self.mutate("add_addresses_to_admins", |l| {
            l.add_addresses_to_admins(caller, admins)
        })
        .await
    }

    pub async fn add_address_to_whitelist(&self, caller: &Addr, address: Addr) -> Result<(), Error> {
        self.mutate("add_address_to_whitelist", |l| {
            l.add_address_to_whitelist(caller, address)
        })
        .await
    }

    pub async fn distribute_initial_tokens(
        &self,
        caller: &Addr,
        ecosystem: Addr,
        reserve: Addr,
        team: Addr,
        advisors: Vec<Addr>,
    ) -> Result<(), Error> {
        self.mutate("distribute_initial_tokens", |l| {
            l.distribute_initial_tokens(caller, ecosystem, reserve, team, advisors)
        })
        .await
    }

    pub async fn initialize_sale_stages(&self, caller: &Addr) -> Result<(), Error> {
        self.mutate("initialize_sale_stages", |l| l.initialize_sale_stages(caller))
            .await
    }

    pub async fn buy_tokens(
        &self,
        purchaser: &Addr,
        beneficiary: &Addr,
        referrer: Option<&Addr>,
        value: Uint128,
    ) -> Result<Uint128, Error> {
        self.mutate("buy_tokens", |l| {
            l.buy_tokens(purchaser, beneficiary, referrer, value)
        })
        .await
    }

    pub async fn invest_on_behalf_of(
        &self,
        caller: &Addr,
        beneficiary: &Addr,
        amount: Uint128,
        referrer: Option<&Addr>,
    ) -> Result<(), Error> {
        self.mutate("invest_on_behalf_of", |l| {
            l.invest_on_behalf_of(caller, beneficiary, amount, referrer)
        })
        .await
    }

    pub async fn refund(&self, caller: &Addr, beneficiary: &Addr) -> Result<Uint128, Error> {
        self.mutate("refund", |l| l.refund(caller, beneficiary)).await
    }

    pub async fn finish(&self, caller: &Addr) -> Result<Uint128, Error> {
        self.mutate("finish", |l| l.finish(caller)).await
    }

    pub async fn release_tokens_for(&self, caller: &Addr, beneficiary: &Addr) -> Result<Uint128, Error> {
        self.mutate("release_tokens_for", |l| {
            l.release_tokens_for(caller, beneficiary)
        })
        .await
    }

    // ========== Queries ==========

    /// Latest published snapshot, without taking the ledger lock
    pub fn info(&self) -> SaleInfo {
        self.info_tx.borrow().clone()
    }

    /// Receive a snapshot after every committed mutation
    pub fn subscribe(&self) -> watch::Receiver<SaleInfo> {
        self.info_tx.subscribe()
    }

    /// Receive every event committed after this call
    pub fn subscribe_events(&self) -> broadcast::Receiver<SaleEvent> {
        self.events_tx.subscribe()
    }

    pub async fn get_token_amount(&self, value: Uint128) -> Result<Uint128, Error> {
        self.ledger.lock().await.get_token_amount(value)
    }

    pub async fn locked_balance_of(&self, address: &Addr) -> Uint128 {
        self.ledger.lock().await.locked_balance_of(address)
    }

    pub async fn released_of(&self, address: &Addr) -> Uint128 {
        self.ledger.lock().await.released_of(address)
    }

    pub async fn class_of(&self, address: &Addr) -> Option<BeneficiaryClass> {
        self.ledger.lock().await.class_of(address)
    }

    pub async fn account(&self, address: &Addr) -> Option<Account> {
        self.ledger.lock().await.account(address).cloned()
    }

    pub async fn releasable_now(&self, address: &Addr) -> Uint128 {
        self.ledger.lock().await.releasable_now(address)
    }

    pub async fn is_admin(&self, address: &Addr) -> bool {
        self.ledger.lock().await.is_admin(address)
    }

    pub async fn is_whitelisted(&self, address: &Addr) -> bool {
        self.ledger.lock().await.is_whitelisted(address)
    }

    pub async fn audit(&self) -> LedgerAudit {
        self.ledger.lock().await.audit()
    }
}
