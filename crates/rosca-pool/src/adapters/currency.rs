//! In-Memory Currency Adapter
//!
//! Implements `CurrencyAdapter` over in-process wallets. Supports both the
//! native asset (contributions debit the wallet directly) and tokens
//! (contributions consume a prior allowance).

use crate::domain::{Address, Amount, CurrencyError, CurrencyKind};
use crate::ports::outbound::{CurrencyAdapter, FundsRecipient};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Default)]
struct Books {
    pool: Amount,
    wallets: HashMap<Address, Amount>,
    allowances: HashMap<Address, Amount>,
}

/// In-memory custody for one pool.
pub struct InMemoryCurrency {
    kind: CurrencyKind,
    books: Mutex<Books>,
    /// Recipient hooks, run after the books lock is released.
    recipients: RwLock<HashMap<Address, Arc<dyn FundsRecipient>>>,
}

impl InMemoryCurrency {
    /// Create empty custody for `kind`.
    pub fn new(kind: CurrencyKind) -> Self {
        Self {
            kind,
            books: Mutex::new(Books::default()),
            recipients: RwLock::new(HashMap::new()),
        }
    }

    /// Native-asset custody.
    pub fn native() -> Self {
        Self::new(CurrencyKind::Native)
    }

    /// Token custody.
    pub fn token() -> Self {
        Self::new(CurrencyKind::Token)
    }

    /// Credit `amount` to `owner`'s wallet.
    pub fn mint(&self, owner: Address, amount: Amount) {
        let mut books = self.books.lock();
        let wallet = books.wallets.entry(owner).or_default();
        *wallet = wallet.saturating_add(amount);
    }

    /// Let the pool pull up to `amount` from `owner` (token mode).
    pub fn approve(&self, owner: Address, amount: Amount) {
        self.books.lock().allowances.insert(owner, amount);
    }

    /// Remaining allowance of `owner`.
    pub fn allowance(&self, owner: Address) -> Amount {
        self.books.lock().allowances.get(&owner).copied().unwrap_or(0)
    }

    /// Wallet balance of `owner`.
    pub fn wallet_balance(&self, owner: Address) -> Amount {
        self.books.lock().wallets.get(&owner).copied().unwrap_or(0)
    }

    /// Run `hook` whenever `owner` receives funds from the pool.
    pub fn register_recipient(&self, owner: Address, hook: Arc<dyn FundsRecipient>) {
        debug!("[rosca] Registering recipient hook for {}", owner);
        self.recipients.write().insert(owner, hook);
    }

    fn hook_for(&self, owner: &Address) -> Option<Arc<dyn FundsRecipient>> {
        self.recipients.read().get(owner).cloned()
    }
}

impl Default for InMemoryCurrency {
    fn default() -> Self {
        Self::native()
    }
}

impl CurrencyAdapter for InMemoryCurrency {
    fn kind(&self) -> CurrencyKind {
        self.kind
    }

    fn balance_of_pool(&self) -> Amount {
        self.books.lock().pool
    }

    fn pull_from(&self, from: Address, amount: Amount) -> Result<(), CurrencyError> {
        let mut books = self.books.lock();

        if self.kind == CurrencyKind::Token {
            let approved = books.allowances.get(&from).copied().unwrap_or(0);
            if approved < amount {
                return Err(CurrencyError::InsufficientAllowance {
                    owner: from,
                    requested: amount,
                    approved,
                });
            }
        }

        let available = books.wallets.get(&from).copied().unwrap_or(0);
        if available < amount {
            return Err(CurrencyError::InsufficientFunds {
                owner: from,
                requested: amount,
                available,
            });
        }

        books.wallets.insert(from, available - amount);
        if self.kind == CurrencyKind::Token {
            if let Some(approved) = books.allowances.get_mut(&from) {
                *approved -= amount;
            }
        }
        books.pool = books.pool.saturating_add(amount);

        debug!("[rosca] Pulled {} from {} into pool", amount, from);
        Ok(())
    }

    fn transfer_out(&self, to: Address, amount: Amount) -> bool {
        {
            let mut books = self.books.lock();
            if books.pool < amount {
                warn!(
                    "[rosca] Pool holds {} but transfer of {} requested",
                    books.pool, amount
                );
                return false;
            }
            books.pool -= amount;
        }

        // Funds are in flight: out of the pool, not yet in the wallet. The
        // lock is released so the hook may call back into the pool.
        if let Some(hook) = self.hook_for(&to) {
            if !hook.on_funds_received(amount) {
                let mut books = self.books.lock();
                books.pool = books.pool.saturating_add(amount);
                warn!("[rosca] Recipient {} rejected transfer of {}", to, amount);
                return false;
            }
        }

        let mut books = self.books.lock();
        let wallet = books.wallets.entry(to).or_default();
        *wallet = wallet.saturating_add(amount);
        info!("[rosca] Transferred {} to {}", amount, to);
        true
    }
}
