//! # Domain Entities
//!
//! Member records, creation parameters and the result types returned by
//! pool operations.

use super::errors::RoscaError;
use super::invariants::{
    invariant_contribution_size, invariant_fee, invariant_member_count, invariant_round_period,
    invariant_start_time,
};
use super::value_objects::{
    Address, Amount, CurrencyKind, EscapeHatchState, RoundPhase, SignedAmount, Timestamp,
    WinnerSelection, SECONDS_PER_DAY,
};
use crate::config::RoscaConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-member ledger record. Non-members read as `Member::default()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Net contributions plus winnings minus withdrawals.
    pub credit: SignedAmount,
    /// Already received a pot.
    pub has_won: bool,
    /// Active participant.
    pub is_member: bool,
}

impl Member {
    /// A fresh, active member with zero credit.
    #[must_use]
    pub fn active() -> Self {
        Self {
            credit: 0,
            has_won: false,
            is_member: true,
        }
    }
}

/// Pool creation parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoscaParams {
    /// Creator and administrator; always member index 0.
    pub foreperson: Address,
    /// Initial members besides the foreperson.
    pub members: Vec<Address>,
    /// Per-round contribution.
    pub contribution_size: Amount,
    /// Round length in days.
    pub round_period_days: u64,
    /// First round boundary.
    pub start_time: Timestamp,
    /// Service fee in thousandths of each winning amount.
    pub fee_in_thousandths: u32,
    /// Identity allowed to arm the escape hatch.
    pub escape_hatch_enabler: Address,
    /// Recipient of collected fees. Defaults to the foreperson.
    pub fee_collector: Option<Address>,
    /// Winner selection flavour.
    pub selection: WinnerSelection,
    /// Asset held by the pool.
    pub currency: CurrencyKind,
}

impl RoscaParams {
    /// Member count including the foreperson.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len() + usize::from(!self.members.contains(&self.foreperson))
    }

    /// Round length in seconds.
    #[must_use]
    pub fn round_period_secs(&self) -> u64 {
        self.round_period_days.saturating_mul(SECONDS_PER_DAY)
    }

    /// Validate against the configured limits at creation time `now`.
    pub fn validate(&self, config: &RoscaConfig, now: Timestamp) -> Result<(), RoscaError> {
        invariant_round_period(
            self.round_period_days,
            config.min_round_period_days,
            config.max_round_period_days,
        )?;
        invariant_contribution_size(
            self.contribution_size,
            config.min_contribution,
            config.max_contribution,
        )?;
        invariant_start_time(self.start_time, now, config.min_time_before_start_secs)?;
        invariant_fee(self.fee_in_thousandths, config.max_fee_in_thousandths)?;

        let mut seen = HashSet::with_capacity(self.members.len());
        for member in &self.members {
            if !seen.insert(*member) {
                return Err(RoscaError::DuplicateMember(*member));
            }
        }
        invariant_member_count(self.member_count(), config.min_members)?;

        if self.escape_hatch_enabler.is_zero() || self.escape_hatch_enabler == self.foreperson {
            return Err(RoscaError::InvalidEscapeHatchEnabler(
                self.escape_hatch_enabler,
            ));
        }
        Ok(())
    }
}

/// Builder for [`RoscaParams`].
#[derive(Clone, Debug)]
pub struct RoscaParamsBuilder {
    params: RoscaParams,
}

impl RoscaParamsBuilder {
    /// Start from the required fields.
    pub fn new(
        foreperson: Address,
        contribution_size: Amount,
        start_time: Timestamp,
        escape_hatch_enabler: Address,
    ) -> Self {
        Self {
            params: RoscaParams {
                foreperson,
                members: Vec::new(),
                contribution_size,
                round_period_days: 1,
                start_time,
                fee_in_thousandths: 0,
                escape_hatch_enabler,
                fee_collector: None,
                selection: WinnerSelection::Bidding,
                currency: CurrencyKind::Native,
            },
        }
    }

    /// Set the initial member list (foreperson excluded).
    pub fn members(mut self, members: Vec<Address>) -> Self {
        self.params.members = members;
        self
    }

    /// Set the round period in days.
    pub fn round_period_days(mut self, days: u64) -> Self {
        self.params.round_period_days = days;
        self
    }

    /// Set the service fee.
    pub fn fee_in_thousandths(mut self, fee: u32) -> Self {
        self.params.fee_in_thousandths = fee;
        self
    }

    /// Set a dedicated fee collector.
    pub fn fee_collector(mut self, collector: Address) -> Self {
        self.params.fee_collector = Some(collector);
        self
    }

    /// Set the winner selection flavour.
    pub fn selection(mut self, selection: WinnerSelection) -> Self {
        self.params.selection = selection;
        self
    }

    /// Set the currency kind.
    pub fn currency(mut self, currency: CurrencyKind) -> Self {
        self.params.currency = currency;
        self
    }

    /// Build the parameters.
    pub fn build(self) -> RoscaParams {
        self.params
    }
}

/// Result of a bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidOutcome {
    /// The bid is the new lowest.
    NewLowest,
    /// Not below the current lowest; no effect.
    Ignored,
}

/// Winner and amounts settled when a round closes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Round that closed.
    pub round: u32,
    /// Winner, if anyone was eligible.
    pub winner: Option<Address>,
    /// Winning amount before fee.
    pub winning_amount: Amount,
    /// Fee withheld.
    pub fee: Amount,
    /// Discount credited to each member.
    pub discount_per_member: Amount,
}

/// Effect of a successful `start_round`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTransition {
    /// Cleanup of the round that just closed (absent when opening round 1).
    pub closed: Option<RoundOutcome>,
    /// Round now open (absent when the pool ended).
    pub opened: Option<u32>,
    /// True when this call closed the final round.
    pub ended: bool,
}

/// Result of a withdrawal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    /// Full entitlement at call time.
    pub entitlement: Amount,
    /// Amount actually sent.
    pub sent: Amount,
}

impl WithdrawalReceipt {
    /// Whether the pool could not cover the whole entitlement.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.sent < self.entitlement
    }
}

/// One row of the member table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEntry {
    /// Member address.
    pub address: Address,
    /// Ledger record.
    pub record: Member,
}

/// Snapshot of the pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Current round (0 before start).
    pub current_round: u32,
    /// Lifecycle phase.
    pub phase: RoundPhase,
    /// Next round boundary.
    pub round_start_time: Timestamp,
    /// Contribution size.
    pub contribution_size: Amount,
    /// Pot size.
    pub pot_size: Amount,
    /// Current lowest bid (sentinel `pot + 1` when none).
    pub lowest_bid: Amount,
    /// Provisional winner.
    pub winner: Option<Address>,
    /// Accumulated discounts.
    pub total_discounts: Amount,
    /// Accumulated fees.
    pub total_fees: Amount,
    /// Discount remainders kept by the pool.
    pub discount_dust: Amount,
    /// Currency held by the pool.
    pub pool_balance: Amount,
    /// Final round closed.
    pub end_of_life: bool,
    /// Escape hatch state.
    pub escape_hatch: EscapeHatchState,
    /// Members in member order.
    pub members: Vec<MemberEntry>,
}
