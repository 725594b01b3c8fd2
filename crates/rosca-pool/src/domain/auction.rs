//! # Round Auction
//!
//! Round counter, schedule and the per-round reverse auction.
//!
//! ```text
//! NotStarted(0) --start--> InProgress(1) --cleanup+start--> ... --> Ended
//! ```
//!
//! `lowest_bid` only decreases within a round and is reset to the sentinel
//! `pot + 1` whenever a round opens.

use super::entities::BidOutcome;
use super::errors::RoscaError;
use super::value_objects::{Address, Amount, RoundPhase, Timestamp};
use serde::{Deserialize, Serialize};

/// Auction and schedule state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundAuction {
    pot: Amount,
    current_round: u32,
    round_start_time: Timestamp,
    round_period_secs: u64,
    lowest_bid: Amount,
    winner: Option<Address>,
    end_of_life: bool,
    closed_at: Option<Timestamp>,
}

impl RoundAuction {
    /// A pool that has not started; round 1 opens at `start_time`.
    #[must_use]
    pub fn new(pot: Amount, start_time: Timestamp, round_period_secs: u64) -> Self {
        Self {
            pot,
            current_round: 0,
            round_start_time: start_time,
            round_period_secs,
            lowest_bid: pot.saturating_add(1),
            winner: None,
            end_of_life: false,
            closed_at: None,
        }
    }

    /// Pot size.
    #[must_use]
    pub fn pot(&self) -> Amount {
        self.pot
    }

    /// Resize the pot after a membership change. Only before round 1.
    pub fn set_pot(&mut self, pot: Amount) -> Result<(), RoscaError> {
        self.ensure_not_started()?;
        self.pot = pot;
        self.lowest_bid = self.sentinel();
        Ok(())
    }

    /// Sentinel meaning "no qualifying bid yet".
    #[must_use]
    pub fn sentinel(&self) -> Amount {
        self.pot.saturating_add(1)
    }

    /// Current round (0 before start).
    #[must_use]
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Next round boundary.
    #[must_use]
    pub fn round_start_time(&self) -> Timestamp {
        self.round_start_time
    }

    /// Round length in seconds.
    #[must_use]
    pub fn round_period_secs(&self) -> u64 {
        self.round_period_secs
    }

    /// Current lowest bid.
    #[must_use]
    pub fn lowest_bid(&self) -> Amount {
        self.lowest_bid
    }

    /// Provisional winner of the open round.
    #[must_use]
    pub fn winner(&self) -> Option<Address> {
        self.winner
    }

    /// Final round closed.
    #[must_use]
    pub fn end_of_life(&self) -> bool {
        self.end_of_life
    }

    /// Boundary at which the final round closed.
    #[must_use]
    pub fn closed_at(&self) -> Option<Timestamp> {
        self.closed_at
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> RoundPhase {
        RoundPhase::of(self.current_round, self.end_of_life)
    }

    /// Fail unless a round is open.
    pub fn ensure_in_progress(&self) -> Result<(), RoscaError> {
        match self.phase() {
            RoundPhase::NotStarted => Err(RoscaError::NotStarted),
            RoundPhase::Ended => Err(RoscaError::PoolEnded),
            RoundPhase::InProgress => Ok(()),
        }
    }

    /// Fail unless round 1 has not opened yet.
    pub fn ensure_not_started(&self) -> Result<(), RoscaError> {
        if self.phase() != RoundPhase::NotStarted {
            return Err(RoscaError::AlreadyStarted);
        }
        Ok(())
    }

    /// Fail unless `now` has reached the next boundary and the pool is live.
    pub fn ensure_due(&self, now: Timestamp) -> Result<(), RoscaError> {
        if self.end_of_life {
            return Err(RoscaError::PoolEnded);
        }
        if now < self.round_start_time {
            return Err(RoscaError::RoundNotDue {
                now,
                round_start_time: self.round_start_time,
            });
        }
        Ok(())
    }

    /// Record a bid that already passed the bidder checks.
    ///
    /// Bids at or above the current lowest are ignored.
    pub fn place_bid(&mut self, bidder: Address, amount: Amount) -> BidOutcome {
        if amount >= self.lowest_bid {
            return BidOutcome::Ignored;
        }
        self.lowest_bid = amount;
        self.winner = Some(bidder);
        BidOutcome::NewLowest
    }

    /// Winning bid of the open round, if any.
    #[must_use]
    pub fn winning_bid(&self) -> Option<(Address, Amount)> {
        self.winner.map(|w| (w, self.lowest_bid))
    }

    /// Whether the open round is the last one for `member_count` members.
    #[must_use]
    pub fn is_final_round(&self, member_count: usize) -> bool {
        self.current_round as usize >= member_count
    }

    /// Open the next round and push the boundary by one period.
    pub fn open_next_round(&mut self) -> u32 {
        self.current_round += 1;
        self.lowest_bid = self.sentinel();
        self.winner = None;
        self.round_start_time = self.round_start_time.saturating_add(self.round_period_secs);
        self.current_round
    }

    /// Close the pool at the current boundary.
    pub fn finish(&mut self) {
        self.end_of_life = true;
        self.closed_at = Some(self.round_start_time);
        self.winner = None;
        self.lowest_bid = self.sentinel();
    }

    /// First time end-of-life retrievals are allowed.
    #[must_use]
    pub fn retrieval_opens_at(&self) -> Option<Timestamp> {
        self.closed_at
            .map(|t| t.saturating_add(self.round_period_secs))
    }
}
