//! # Pool Notifications
//!
//! Events emitted for observers. Not read back by the pool itself.
//!
//! | Event | Emitted by |
//! |-------|------------|
//! | `ContributionMade` | `contribute` |
//! | `NewLowestBid` | `bid` (accepted) |
//! | `RoundStarted` | `start_round` (opening a round) |
//! | `RoundFundsReleased` | round cleanup with a winner |
//! | `FundsWithdrawal` | `withdraw` |
//! | `PartialWithdrawal` | `withdraw` when the pool is short |
//! | `EndOfRosca` | final `start_round` |
//! | `ForepersonSurplusWithdrawal` | `end_retrieve_funds`, `end_retrieve_surplus` |
//! | `FeesRetrieved` | `end_retrieve_fees` |
//! | `EscapeHatch*`, `EmergencyWithdrawal` | escape hatch operations |

use crate::domain::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoscaEvent {
    /// A join request was recorded.
    JoinRequested {
        /// Requesting address.
        from: Address,
    },
    /// A member was admitted.
    MemberAdded {
        /// New member.
        member: Address,
    },
    /// A member contributed.
    ContributionMade {
        /// Contributor.
        member: Address,
        /// Amount contributed.
        amount: Amount,
    },
    /// A bid became the lowest.
    NewLowestBid {
        /// Bidder.
        bidder: Address,
        /// Bid amount.
        amount: Amount,
    },
    /// A round opened.
    RoundStarted {
        /// Round number.
        round: u32,
        /// Boundary of the following round.
        next_round_start: Timestamp,
    },
    /// A round's pot was credited to its winner.
    RoundFundsReleased {
        /// Round number.
        round: u32,
        /// Winner.
        winner: Address,
        /// Winning amount before fee.
        amount: Amount,
    },
    /// A member withdrew.
    FundsWithdrawal {
        /// Member.
        member: Address,
        /// Amount sent.
        amount: Amount,
    },
    /// The pool could not cover a full entitlement.
    PartialWithdrawal {
        /// Member.
        member: Address,
        /// Amount actually sent.
        amount: Amount,
        /// Entitlement at call time.
        entitlement: Amount,
    },
    /// The final round closed.
    EndOfRosca {
        /// Boundary at which the pool closed.
        closed_at: Timestamp,
    },
    /// The foreperson retrieved remaining funds.
    ForepersonSurplusWithdrawal {
        /// Amount sent.
        amount: Amount,
    },
    /// The fee collector retrieved fees.
    FeesRetrieved {
        /// Collector.
        collector: Address,
        /// Amount sent.
        amount: Amount,
    },
    /// The escape hatch was armed.
    EscapeHatchEnabled,
    /// The escape hatch was activated.
    EscapeHatchActivated,
    /// The foreperson swept the pool.
    EmergencyWithdrawal {
        /// Amount sent.
        amount: Amount,
    },
}

impl RoscaEvent {
    /// Event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRequested { .. } => "JoinRequested",
            Self::MemberAdded { .. } => "MemberAdded",
            Self::ContributionMade { .. } => "ContributionMade",
            Self::NewLowestBid { .. } => "NewLowestBid",
            Self::RoundStarted { .. } => "RoundStarted",
            Self::RoundFundsReleased { .. } => "RoundFundsReleased",
            Self::FundsWithdrawal { .. } => "FundsWithdrawal",
            Self::PartialWithdrawal { .. } => "PartialWithdrawal",
            Self::EndOfRosca { .. } => "EndOfRosca",
            Self::ForepersonSurplusWithdrawal { .. } => "ForepersonSurplusWithdrawal",
            Self::FeesRetrieved { .. } => "FeesRetrieved",
            Self::EscapeHatchEnabled => "EscapeHatchEnabled",
            Self::EscapeHatchActivated => "EscapeHatchActivated",
            Self::EmergencyWithdrawal { .. } => "EmergencyWithdrawal",
        }
    }
}

/// An event stamped with its pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEvent {
    /// Emitting pool.
    pub pool_id: Uuid,
    /// Payload.
    pub event: RoscaEvent,
}
