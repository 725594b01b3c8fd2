//! # Value Objects
//!
//! Immutable domain primitives for the pool: addresses, amounts, and the
//! small state machines (round phase, escape hatch) that other components
//! read.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unsigned currency amount (smallest unit).
pub type Amount = u128;

/// Signed currency amount. Negative values represent debt.
pub type SignedAmount = i128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte participant address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// ROUND PHASE
// =============================================================================

/// Coarse lifecycle phase of the pool, derived from the round counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Round 0: membership may still change, no bidding.
    #[default]
    NotStarted,
    /// A round between 1 and the member count is open.
    InProgress,
    /// The final round has been closed.
    Ended,
}

impl RoundPhase {
    /// Derive the phase from the round counter and the end-of-life flag.
    #[must_use]
    pub fn of(current_round: u32, end_of_life: bool) -> Self {
        match (current_round, end_of_life) {
            (_, true) => Self::Ended,
            (0, false) => Self::NotStarted,
            _ => Self::InProgress,
        }
    }

    /// Check if transition is valid.
    #[must_use]
    pub fn can_transition_to(&self, next: RoundPhase) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::InProgress)
                | (Self::InProgress, Self::InProgress)
                | (Self::InProgress, Self::Ended)
        )
    }

    /// Check if terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

// =============================================================================
// ESCAPE HATCH STATE
// =============================================================================

/// Two-phase emergency freeze: `Disabled -> Enabled -> Active`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapeHatchState {
    /// Normal operation.
    #[default]
    Disabled,
    /// Armed by the enabler; normal operation continues.
    Enabled,
    /// Frozen: contributions and withdrawals fail, sweep allowed.
    Active,
}

impl EscapeHatchState {
    /// Check if transition is valid.
    #[must_use]
    pub fn can_transition_to(&self, next: EscapeHatchState) -> bool {
        matches!(
            (self, next),
            (Self::Disabled, Self::Enabled) | (Self::Enabled, Self::Active)
        )
    }

    /// Check if terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether ordinary fund movement (contribute/withdraw) is frozen.
    #[must_use]
    pub fn blocks_fund_movement(&self) -> bool {
        matches!(self, Self::Active)
    }
}

// =============================================================================
// POOL FLAVOURS
// =============================================================================

/// How each round's winner is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinnerSelection {
    /// Reverse auction, random fallback when nobody bids.
    #[default]
    Bidding,
    /// No bidding; a random eligible member wins the full pot.
    Lottery,
    /// No bidding; eligible members win in member order.
    PreOrdered,
}

impl WinnerSelection {
    /// Whether `bid` is accepted in this mode.
    #[must_use]
    pub fn accepts_bids(&self) -> bool {
        matches!(self, Self::Bidding)
    }
}

/// Asset held by the pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyKind {
    /// The substrate's native asset, sent along with the call.
    #[default]
    Native,
    /// A token moved with an approve/pull handshake.
    Token,
}
