//! # Contribution Ledger
//!
//! Pool-level totals and the credit mutations applied to member records.
//! Every credit change goes through here so the conservation identity can
//! be audited from these totals alone.

use super::discount::Settlement;
use super::entities::Member;
use super::invariants::{
    discount_share, invariant_conservation, invariant_good_standing, participant_balance,
    to_signed,
};
use super::value_objects::{Amount, SignedAmount};
use serde::{Deserialize, Serialize};

/// Pool totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionLedger {
    /// Accumulated discounts (sum of per-member discount times member count).
    pub total_discounts: Amount,
    /// Accumulated service fees.
    pub total_fees: Amount,
    /// Discount remainders that could not be split evenly.
    pub discount_dust: Amount,
    /// Value ever contributed.
    pub total_deposited: Amount,
    /// Value ever paid to members through `withdraw`.
    pub total_withdrawn: Amount,
    /// Value ever swept out by the foreperson or fee collector.
    pub total_swept: Amount,
    /// Pot size times the number of rounds with a winner.
    pub total_released: Amount,
}

/// Outcome of a conservation audit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConservationReport {
    /// Sum of member credits.
    pub sum_of_credits: SignedAmount,
    /// Ledger identity holds.
    pub ledger_balanced: bool,
    /// Balance the pool should hold.
    pub expected_pool_balance: Amount,
    /// Balance the currency collaborator reports.
    pub actual_pool_balance: Amount,
}

impl ConservationReport {
    /// Both identities hold.
    #[must_use]
    pub fn holds(&self) -> bool {
        self.ledger_balanced && self.expected_pool_balance == self.actual_pool_balance
    }
}

impl ContributionLedger {
    /// Credit a contribution.
    pub fn deposit(&mut self, member: &mut Member, amount: Amount) {
        member.credit = member.credit.saturating_add(to_signed(amount));
        self.total_deposited = self.total_deposited.saturating_add(amount);
    }

    /// Debit a withdrawal before funds leave the pool.
    pub fn debit(&mut self, member: &mut Member, amount: Amount) {
        member.credit = member.credit.saturating_sub(to_signed(amount));
        self.total_withdrawn = self.total_withdrawn.saturating_add(amount);
    }

    /// Undo a [`debit`](Self::debit) whose transfer failed.
    pub fn revert_debit(&mut self, member: &mut Member, amount: Amount) {
        member.credit = member.credit.saturating_add(to_signed(amount));
        self.total_withdrawn = self.total_withdrawn.saturating_sub(amount);
    }

    /// Apply a round settlement to the winner and the totals.
    pub fn settle(&mut self, winner: &mut Member, settlement: &Settlement) {
        winner.credit = winner.credit.saturating_add(to_signed(settlement.payout));
        winner.has_won = true;
        self.total_fees = self.total_fees.saturating_add(settlement.fee);
        self.total_discounts = self
            .total_discounts
            .saturating_add(settlement.discount_total);
        self.discount_dust = self.discount_dust.saturating_add(settlement.dust);
        self.total_released = self.total_released.saturating_add(settlement.pot);
    }

    /// Record value swept out of the pool outside member accounting.
    pub fn sweep(&mut self, amount: Amount) {
        self.total_swept = self.total_swept.saturating_add(amount);
    }

    /// Undo a [`sweep`](Self::sweep) whose transfer failed.
    pub fn revert_sweep(&mut self, amount: Amount) {
        self.total_swept = self.total_swept.saturating_sub(amount);
    }

    /// Per-member share of the accumulated discounts.
    #[must_use]
    pub fn discount_share(&self, member_count: usize) -> Amount {
        discount_share(self.total_discounts, member_count)
    }

    /// Withdrawable balance of `member` in round `round`.
    #[must_use]
    pub fn balance(
        &self,
        member: &Member,
        round: u32,
        contribution: Amount,
        member_count: usize,
    ) -> SignedAmount {
        participant_balance(
            member.credit,
            round,
            contribution,
            self.total_discounts,
            member_count,
        )
    }

    /// Whether `member` has paid what round `round` requires.
    #[must_use]
    pub fn in_good_standing(
        &self,
        member: &Member,
        round: u32,
        contribution: Amount,
        member_count: usize,
    ) -> bool {
        invariant_good_standing(
            member.credit,
            round,
            contribution,
            self.total_discounts,
            member_count,
        )
    }

    /// Balance the pool should currently hold.
    #[must_use]
    pub fn expected_pool_balance(&self) -> Amount {
        self.total_deposited
            .saturating_sub(self.total_withdrawn)
            .saturating_sub(self.total_swept)
    }

    /// Evaluate both conservation identities.
    #[must_use]
    pub fn audit(
        &self,
        sum_of_credits: SignedAmount,
        actual_pool_balance: Amount,
    ) -> ConservationReport {
        ConservationReport {
            sum_of_credits,
            ledger_balanced: invariant_conservation(
                sum_of_credits,
                self.total_discounts,
                self.total_fees,
                self.discount_dust,
                self.total_deposited,
                self.total_withdrawn,
                self.total_released,
            ),
            expected_pool_balance: self.expected_pool_balance(),
            actual_pool_balance,
        }
    }
}
