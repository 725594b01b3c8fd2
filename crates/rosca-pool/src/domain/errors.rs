//! # Domain Errors
//!
//! Error types for the pool. Every variant maps to one class of the
//! failure taxonomy through [`RoscaError::kind`].

use super::value_objects::{
    Address, Amount, CurrencyKind, SignedAmount, Timestamp, WinnerSelection,
};
use crate::config::ConfigError;
use thiserror::Error;

/// Failure reported by a currency collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// Token pull without a sufficient prior approval.
    #[error("Insufficient allowance for {owner}: requested {requested}, approved {approved}")]
    InsufficientAllowance {
        /// Owner of the funds.
        owner: Address,
        /// Amount the pool tried to pull.
        requested: Amount,
        /// Amount currently approved.
        approved: Amount,
    },

    /// Payer does not hold enough funds.
    #[error("Insufficient funds for {owner}: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Owner of the funds.
        owner: Address,
        /// Amount requested.
        requested: Amount,
        /// Amount held.
        available: Amount,
    },
}

/// Failure class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid construction parameters. No pool is created.
    ParameterValidation,
    /// Caller lacks the role required by the operation.
    Authorization,
    /// Operation invoked outside its valid window.
    Phase,
    /// The currency collaborator refused to move funds.
    Transfer,
}

/// Pool error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoscaError {
    // ===== PARAMETER VALIDATION =====
    /// Round period outside the allowed range.
    #[error("Round period {days} days outside [{min}, {max}]")]
    RoundPeriodOutOfRange {
        /// Requested period.
        days: u64,
        /// Minimum allowed.
        min: u64,
        /// Maximum allowed.
        max: u64,
    },

    /// Contribution size outside the allowed range.
    #[error("Contribution size {size} outside [{min}, {max}]")]
    ContributionSizeOutOfRange {
        /// Requested size.
        size: Amount,
        /// Minimum allowed.
        min: Amount,
        /// Maximum allowed.
        max: Amount,
    },

    /// Fewer members than the commitment minimum.
    #[error("Too few members: {count} < {min}")]
    TooFewMembers {
        /// Members present (foreperson included).
        count: usize,
        /// Required minimum.
        min: usize,
    },

    /// Start time too close to creation time.
    #[error("Start time {start_time} is before earliest allowed {earliest}")]
    StartTimeTooEarly {
        /// Requested start.
        start_time: Timestamp,
        /// Earliest allowed start.
        earliest: Timestamp,
    },

    /// Service fee above the ceiling.
    #[error("Fee {fee} thousandths exceeds maximum {max}")]
    FeeTooHigh {
        /// Requested fee.
        fee: u32,
        /// Ceiling.
        max: u32,
    },

    /// Same address listed twice.
    #[error("Duplicate member: {0}")]
    DuplicateMember(Address),

    /// Escape hatch enabler must be a distinct, non-zero identity.
    #[error("Invalid escape hatch enabler: {0}")]
    InvalidEscapeHatchEnabler(Address),

    /// Pot size does not fit the amount type.
    #[error("Pot size overflows for contribution {contribution} x {members} members")]
    PotOverflow {
        /// Contribution size.
        contribution: Amount,
        /// Member count.
        members: usize,
    },

    /// Currency adapter holds a different asset than the pool expects.
    #[error("Pool expects {pool:?} currency but adapter holds {adapter:?}")]
    CurrencyMismatch {
        /// Asset named in the parameters.
        pool: CurrencyKind,
        /// Asset held by the adapter.
        adapter: CurrencyKind,
    },

    /// Configured limits are incoherent.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    // ===== AUTHORIZATION =====
    /// Caller is not a member.
    #[error("Not a member: {0}")]
    NotMember(Address),

    /// Caller is not the foreperson.
    #[error("Not the foreperson: {0}")]
    NotForeperson(Address),

    /// Caller is not the designated escape hatch enabler.
    #[error("Not the escape hatch enabler: {0}")]
    NotEscapeHatchEnabler(Address),

    /// Caller is not the fee collector.
    #[error("Not the fee collector: {0}")]
    NotFeeCollector(Address),

    // ===== PHASE =====
    /// Address already belongs to the pool.
    #[error("Already a member: {0}")]
    AlreadyMember(Address),

    /// Accepting a join nobody requested.
    #[error("No pending join request from {0}")]
    NoPendingRequest(Address),

    /// Membership is frozen once round 1 opens.
    #[error("Pool already started")]
    AlreadyStarted,

    /// Operation needs an open round.
    #[error("No round in progress")]
    NotStarted,

    /// Round boundary not reached yet.
    #[error("Round not due: now={now}, round start={round_start_time}")]
    RoundNotDue {
        /// Current time.
        now: Timestamp,
        /// Next boundary.
        round_start_time: Timestamp,
    },

    /// Final round already closed.
    #[error("Pool has ended")]
    PoolEnded,

    /// Member count fell short when opening round 1.
    #[error("Not enough members to start: {count} < {min}")]
    NotEnoughMembers {
        /// Members present.
        count: usize,
        /// Required minimum.
        min: usize,
    },

    /// Member owes contributions for the current round.
    #[error("Member not in good standing: {0}")]
    NotInGoodStanding(Address),

    /// Member already received a pot.
    #[error("Member already won: {0}")]
    AlreadyWon(Address),

    /// Bid under the distribution floor.
    #[error("Bid {amount} below minimum {minimum}")]
    BidBelowMinimum {
        /// Offered amount.
        amount: Amount,
        /// Floor.
        minimum: Amount,
    },

    /// Bid above the pot.
    #[error("Bid {amount} above pot {pot}")]
    BidAbovePot {
        /// Offered amount.
        amount: Amount,
        /// Pot size.
        pot: Amount,
    },

    /// Pool flavour does not take bids.
    #[error("Bidding disabled for {0:?} pools")]
    BiddingDisabled(WinnerSelection),

    /// Nothing withdrawable.
    #[error("Nothing to withdraw: entitlement {entitlement}")]
    NothingToWithdraw {
        /// Computed entitlement (zero or negative).
        entitlement: SignedAmount,
    },

    /// Entitlement is positive but the pool holds nothing to send.
    #[error("Pool holds no funds; entitlement {entitlement} deferred")]
    PoolDepleted {
        /// Outstanding entitlement.
        entitlement: Amount,
    },

    /// Pool is frozen by the escape hatch.
    #[error("Escape hatch active")]
    EscapeHatchActive,

    /// Escape hatch not armed/activated as required.
    #[error("Invalid escape hatch transition: {from} -> {to}")]
    InvalidEscapeHatchTransition {
        /// Current state.
        from: String,
        /// Attempted state.
        to: String,
    },

    /// End-of-life retrieval before the pool ended.
    #[error("Pool has not ended")]
    NotEnded,

    /// End-of-life retrieval during the grace period.
    #[error("Grace period not elapsed: now={now}, available at {available_at}")]
    GracePeriodNotElapsed {
        /// Current time.
        now: Timestamp,
        /// First allowed time.
        available_at: Timestamp,
    },

    /// Fees were already retrieved.
    #[error("Fees already retrieved")]
    FeesAlreadyRetrieved,

    /// Foreperson surplus was already retrieved.
    #[error("Surplus already retrieved")]
    SurplusAlreadyRetrieved,

    /// Nothing left for this retrieval.
    #[error("Nothing to retrieve")]
    NothingToRetrieve,

    // ===== TRANSFER =====
    /// Outbound transfer refused; the operation was reverted.
    #[error("Transfer of {amount} to {to} failed")]
    TransferFailed {
        /// Recipient.
        to: Address,
        /// Amount.
        amount: Amount,
    },

    /// Currency collaborator error.
    #[error("Currency error: {0}")]
    Currency(#[from] CurrencyError),
}

impl RoscaError {
    /// Failure class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        use RoscaError::*;
        match self {
            RoundPeriodOutOfRange { .. }
            | ContributionSizeOutOfRange { .. }
            | TooFewMembers { .. }
            | StartTimeTooEarly { .. }
            | FeeTooHigh { .. }
            | DuplicateMember(_)
            | InvalidEscapeHatchEnabler(_)
            | PotOverflow { .. }
            | CurrencyMismatch { .. }
            | Config(_) => ErrorKind::ParameterValidation,
            NotMember(_) | NotForeperson(_) | NotEscapeHatchEnabler(_) | NotFeeCollector(_) => {
                ErrorKind::Authorization
            }
            TransferFailed { .. } | Currency(_) => ErrorKind::Transfer,
            _ => ErrorKind::Phase,
        }
    }
}
