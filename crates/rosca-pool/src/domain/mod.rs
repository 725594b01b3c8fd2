//! # Domain Module
//!
//! Core domain types for the savings pool: member records, the contribution
//! ledger, the round auction and the escape hatch, composed by
//! [`RoscaState`].

pub mod auction;
pub mod discount;
pub mod entities;
pub mod errors;
pub mod escape_hatch;
pub mod invariants;
pub mod ledger;
pub mod membership;
pub mod state;
pub mod value_objects;

pub use auction::RoundAuction;
pub use discount::{settle, Settlement};
pub use entities::*;
pub use errors::*;
pub use escape_hatch::EscapeHatch;
pub use invariants::*;
pub use ledger::{ConservationReport, ContributionLedger};
pub use membership::MembershipRegistry;
pub use state::RoscaState;
pub use value_objects::*;
