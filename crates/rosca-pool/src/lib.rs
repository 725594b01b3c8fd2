//! # Rosca Pool
//!
//! Rotating savings and credit association: a fixed group of members
//! contributes a fixed amount every round, and each round one member takes
//! the whole pot.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Members bid for the pot in a reverse auction; the gap between the pot
//!   and the winning bid is shared as a discount by every member.
//! - Contributions and winnings accumulate as per-member credit; members
//!   withdraw whatever exceeds what they owe for the current round.
//! - An escape hatch, armed by a designated enabler and triggered by the
//!   foreperson, freezes the pool and lets the foreperson sweep it.
//!
//! ## Round Lifecycle
//!
//! | Call | Effect |
//! |------|--------|
//! | `start_round` in round 0 | opens round 1 (needs the member minimum) |
//! | `start_round` in round r < N | settles round r, opens r + 1 |
//! | `start_round` in round N | settles round N, ends the pool |
//! | `end_retrieve_*` | after one extra period, drains what is left |
//!
//! ## Safety Properties
//!
//! | Property | Enforced by |
//! |----------|-------------|
//! | Debit before transfer | `RoscaState::begin_withdrawal` |
//! | Failed transfers revert | `revert_*` on the aggregate |
//! | Conservation | `RoscaApi::audit` |
//! | One winner per member | `Member::has_won` |
//!
//! ## Module Structure
//!
//! ```text
//! rosca-pool/
//! ├── domain/          # Members, ledger, auction, escape hatch, errors
//! ├── algorithms/      # Fallback winner selection
//! ├── ports/           # RoscaApi, CurrencyAdapter, TimeSource, RoscaEventSink
//! ├── adapters/        # In-memory currency, clocks, event sinks
//! ├── config.rs        # Limits from environment variables
//! ├── events.rs        # Notifications
//! └── service.rs       # RoscaService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    InMemoryCurrency, InMemoryEventSink, ManualClock, SystemClock, TracingEventSink,
};
pub use algorithms::{pick_index, round_entropy, select_fallback_winner};
pub use config::{ConfigError, RoscaConfig};
pub use domain::{
    Address, Amount, BidOutcome, ConservationReport, CurrencyError, CurrencyKind, ErrorKind,
    EscapeHatchState, Member, MemberEntry, PoolStatus, RoscaError, RoscaParams,
    RoscaParamsBuilder, RoscaState, RoundOutcome, RoundPhase, RoundTransition, SignedAmount,
    Timestamp, WinnerSelection, WithdrawalReceipt, SECONDS_PER_DAY,
};
pub use events::{PoolEvent, RoscaEvent};
pub use ports::{CurrencyAdapter, FundsRecipient, RoscaApi, RoscaEventSink, TimeSource};
pub use service::{RoscaService, ServiceStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
