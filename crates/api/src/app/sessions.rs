use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use paydesk_core::{DomainError, DomainResult, WalletId};
use paydesk_wallet::{ConfigError, Ledger, WalletConfig, WalletSnapshot};

/// Session-owned ledgers.
///
/// Each session gets its own [`Ledger`]. A caller holds the map lock for the
/// whole of one operation, so no request observes a half-applied change.
#[derive(Debug)]
pub struct SessionStore {
    config: WalletConfig,
    ledgers: Mutex<HashMap<WalletId, Ledger>>,
}

impl SessionStore {
    pub fn new(config: WalletConfig) -> Self {
        Self {
            config,
            ledgers: Mutex::new(HashMap::new()),
        }
    }

    /// Open a freshly seeded ledger and return its first snapshot.
    pub fn open(&self) -> Result<WalletSnapshot, ConfigError> {
        let ledger = Ledger::open(WalletId::new(), &self.config, Utc::now())?;
        let snapshot = ledger.snapshot();
        self.lock().insert(ledger.id_typed(), ledger);
        Ok(snapshot)
    }

    pub fn snapshot(&self, id: WalletId) -> DomainResult<WalletSnapshot> {
        self.with_ledger(id, |ledger| ledger.snapshot())
    }

    /// Run `f` against one session's ledger under the store lock.
    pub fn with_ledger<T>(&self, id: WalletId, f: impl FnOnce(&mut Ledger) -> T) -> DomainResult<T> {
        let mut ledgers = self.lock();
        let ledger = ledgers.get_mut(&id).ok_or_else(DomainError::not_found)?;
        Ok(f(ledger))
    }

    /// End a session; its ledger is discarded.
    pub fn close(&self, id: WalletId) -> DomainResult<()> {
        self.lock()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(DomainError::not_found)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Ledgers validate before mutating; a poisoned map still holds consistent state.
    fn lock(&self) -> MutexGuard<'_, HashMap<WalletId, Ledger>> {
        self.ledgers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
