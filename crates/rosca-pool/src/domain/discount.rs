//! # Discount and Fee Engine
//!
//! Splits a round's winning amount into the service fee, the per-member
//! discount and the winner's payout.

use super::value_objects::Amount;
use serde::{Deserialize, Serialize};

/// Amounts produced by settling one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Pot size for the round.
    pub pot: Amount,
    /// Winning amount before fee.
    pub winning_amount: Amount,
    /// `winning_amount * fee / 1000`.
    pub fee: Amount,
    /// `(pot - winning_amount) / member_count`.
    pub discount_per_member: Amount,
    /// `discount_per_member * member_count`.
    pub discount_total: Amount,
    /// Remainder of the discount split, kept by the pool.
    pub dust: Amount,
    /// Credited to the winner: `winning_amount - fee`.
    pub payout: Amount,
}

/// Settle a round won at `winning_amount`.
///
/// `winning_amount` is clamped to `pot`.
#[must_use]
pub fn settle(
    pot: Amount,
    member_count: usize,
    fee_in_thousandths: u32,
    winning_amount: Amount,
) -> Settlement {
    let winning_amount = winning_amount.min(pot);
    let fee = winning_amount.saturating_mul(Amount::from(fee_in_thousandths)) / 1000;
    let gap = pot - winning_amount;
    let n = member_count.max(1) as Amount;
    let discount_per_member = gap / n;
    let discount_total = discount_per_member * n;

    Settlement {
        pot,
        winning_amount,
        fee,
        discount_per_member,
        discount_total,
        dust: gap - discount_total,
        payout: winning_amount - fee,
    }
}
