//! # Domain Invariants
//!
//! Creation-time limits and the arithmetic rules every component shares:
//! good standing, participant balance, the bid floor and the conservation
//! identity.

use super::errors::RoscaError;
use super::value_objects::{Amount, SignedAmount, Timestamp};

/// Default limits. Overridable through [`crate::RoscaConfig`].
pub mod limits {
    use super::Amount;

    /// Shortest round period in days.
    pub const MIN_ROUND_PERIOD_DAYS: u64 = 1;
    /// Longest round period in days.
    pub const MAX_ROUND_PERIOD_DAYS: u64 = 30;
    /// Smallest contribution size (1e15 units).
    pub const MIN_CONTRIBUTION: Amount = 1_000_000_000_000_000;
    /// Largest contribution size (1e19 units).
    pub const MAX_CONTRIBUTION: Amount = 10_000_000_000_000_000_000;
    /// Fee ceiling in thousandths of the winning amount.
    pub const MAX_FEE_IN_THOUSANDTHS: u32 = 20;
    /// A winning bid must be at least this percentage of the pot.
    pub const MIN_DISTRIBUTION_PERCENT: u32 = 65;
    /// Minimum delay between creation and the first round (one day).
    pub const MIN_TIME_BEFORE_START_SECS: u64 = 86_400;
    /// Minimum members, foreperson included.
    pub const MIN_MEMBERS: usize = 2;
}

// =============================================================================
// CREATION-TIME CHECKS
// =============================================================================

/// Invariant: round period within `[min, max]` days.
pub fn invariant_round_period(days: u64, min: u64, max: u64) -> Result<(), RoscaError> {
    if days < min || days > max {
        return Err(RoscaError::RoundPeriodOutOfRange { days, min, max });
    }
    Ok(())
}

/// Invariant: contribution size within `[min, max]`.
pub fn invariant_contribution_size(
    size: Amount,
    min: Amount,
    max: Amount,
) -> Result<(), RoscaError> {
    if size < min || size > max {
        return Err(RoscaError::ContributionSizeOutOfRange { size, min, max });
    }
    Ok(())
}

/// Invariant: member count meets the commitment minimum.
pub fn invariant_member_count(count: usize, min: usize) -> Result<(), RoscaError> {
    if count < min {
        return Err(RoscaError::TooFewMembers { count, min });
    }
    Ok(())
}

/// Invariant: first round starts at least `min_delay` after `now`.
pub fn invariant_start_time(
    start_time: Timestamp,
    now: Timestamp,
    min_delay: u64,
) -> Result<(), RoscaError> {
    let earliest = now.saturating_add(min_delay);
    if start_time < earliest {
        return Err(RoscaError::StartTimeTooEarly {
            start_time,
            earliest,
        });
    }
    Ok(())
}

/// Invariant: service fee at or below the ceiling.
pub fn invariant_fee(fee: u32, max: u32) -> Result<(), RoscaError> {
    if fee > max {
        return Err(RoscaError::FeeTooHigh { fee, max });
    }
    Ok(())
}

// =============================================================================
// RUNTIME RULES
// =============================================================================

/// Amortized discount each member may count against their obligation.
#[must_use]
pub fn discount_share(total_discounts: Amount, member_count: usize) -> Amount {
    if member_count == 0 {
        return 0;
    }
    total_discounts / member_count as Amount
}

/// Participant balance: `credit - round * contribution + totalDiscounts / N`.
///
/// Negative means the member owes contributions.
#[must_use]
pub fn participant_balance(
    credit: SignedAmount,
    round: u32,
    contribution: Amount,
    total_discounts: Amount,
    member_count: usize,
) -> SignedAmount {
    let owed = to_signed(contribution.saturating_mul(Amount::from(round)));
    let share = to_signed(discount_share(total_discounts, member_count));
    credit.saturating_sub(owed).saturating_add(share)
}

/// Invariant: good standing for round `round`.
///
/// `credit + totalDiscounts / N >= round * contribution`
#[must_use]
pub fn invariant_good_standing(
    credit: SignedAmount,
    round: u32,
    contribution: Amount,
    total_discounts: Amount,
    member_count: usize,
) -> bool {
    participant_balance(credit, round, contribution, total_discounts, member_count) >= 0
}

/// Lowest acceptable winning bid for a pot.
#[must_use]
pub fn minimum_bid(pot: Amount, min_distribution_percent: u32) -> Amount {
    pot.saturating_mul(Amount::from(min_distribution_percent)) / 100
}

/// Invariant: bid within `[floor, pot]`.
pub fn invariant_bid_range(
    amount: Amount,
    pot: Amount,
    min_distribution_percent: u32,
) -> Result<(), RoscaError> {
    let minimum = minimum_bid(pot, min_distribution_percent);
    if amount < minimum {
        return Err(RoscaError::BidBelowMinimum { amount, minimum });
    }
    if amount > pot {
        return Err(RoscaError::BidAbovePot { amount, pot });
    }
    Ok(())
}

/// Invariant: ledger conservation.
///
/// `credits + discounts + fees + dust == deposited - withdrawn + released`
#[must_use]
pub fn invariant_conservation(
    sum_of_credits: SignedAmount,
    total_discounts: Amount,
    total_fees: Amount,
    discount_dust: Amount,
    total_deposited: Amount,
    total_withdrawn: Amount,
    total_released: Amount,
) -> bool {
    let lhs = sum_of_credits
        + to_signed(total_discounts)
        + to_signed(total_fees)
        + to_signed(discount_dust);
    let rhs = to_signed(total_deposited) - to_signed(total_withdrawn) + to_signed(total_released);
    lhs == rhs
}

/// Saturating conversion to the signed amount type.
#[must_use]
pub fn to_signed(amount: Amount) -> SignedAmount {
    SignedAmount::try_from(amount).unwrap_or(SignedAmount::MAX)
}
