//! # Outbound Ports
//!
//! Traits for the pool's collaborators: custody of funds, the clock and
//! the notification channel.

use crate::domain::{Address, Amount, CurrencyKind, Timestamp};
use crate::events::PoolEvent;

pub use crate::domain::CurrencyError;

/// Custody of the pool's funds - outbound port.
///
/// `transfer_out` may synchronously run code owned by the recipient
/// (see [`FundsRecipient`]). Callers must finish their ledger effects
/// before invoking it.
pub trait CurrencyAdapter: Send + Sync {
    /// Asset held by the pool.
    fn kind(&self) -> CurrencyKind;

    /// Funds currently held by the pool.
    fn balance_of_pool(&self) -> Amount;

    /// Move `amount` from `from` into the pool.
    fn pull_from(&self, from: Address, amount: Amount) -> Result<(), CurrencyError>;

    /// Move `amount` from the pool to `to`. Returns false if the transfer
    /// was refused, in which case no funds moved.
    fn transfer_out(&self, to: Address, amount: Amount) -> bool;
}

/// Code run by a recipient when it receives funds.
///
/// Returning false rejects the transfer.
pub trait FundsRecipient: Send + Sync {
    /// Called with `amount` in flight: debited from the pool, credited to
    /// the recipient only if this returns true.
    fn on_funds_received(&self, amount: Amount) -> bool;
}

/// Source of the current time - outbound port.
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

/// Notification channel - outbound port.
pub trait RoscaEventSink: Send + Sync {
    /// Publish one event.
    fn publish(&self, event: PoolEvent);
}
