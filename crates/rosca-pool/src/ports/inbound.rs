//! # Inbound Ports
//!
//! API trait defining what a savings pool can do. Every call names its
//! caller explicitly; time comes from the service's clock.

use crate::domain::{
    Address, Amount, BidOutcome, ConservationReport, Member, PoolStatus, RoscaError,
    RoundTransition, SignedAmount, WithdrawalReceipt,
};

/// Savings pool API - inbound port.
pub trait RoscaApi: Send + Sync {
    // ===== MEMBERSHIP =====

    /// Ask to join. Only before round 1.
    fn request_join(&self, from: Address) -> Result<(), RoscaError>;

    /// Foreperson admits a pending request.
    fn accept_join(&self, caller: Address, candidate: Address) -> Result<(), RoscaError>;

    /// Foreperson admits an address directly.
    fn add_member(&self, caller: Address, address: Address) -> Result<(), RoscaError>;

    // ===== FUNDS =====

    /// Pull `amount` from `from` into the pool and credit it.
    fn contribute(&self, from: Address, amount: Amount) -> Result<(), RoscaError>;

    /// Pay out the caller's balance, or whatever the pool holds if less.
    fn withdraw(&self, member: Address) -> Result<WithdrawalReceipt, RoscaError>;

    // ===== ROUNDS =====

    /// Offer to take the pot for `amount`.
    fn bid(&self, from: Address, amount: Amount) -> Result<BidOutcome, RoscaError>;

    /// Close the open round (if any) and open the next one.
    fn start_round(&self) -> Result<RoundTransition, RoscaError>;

    // ===== ESCAPE HATCH =====

    /// Arm the escape hatch (enabler only).
    fn enable_escape_hatch(&self, caller: Address) -> Result<(), RoscaError>;

    /// Freeze the pool (foreperson only, once armed).
    fn activate_escape_hatch(&self, caller: Address) -> Result<(), RoscaError>;

    /// Sweep the frozen pool to the foreperson.
    fn emergency_withdrawal(&self, caller: Address) -> Result<Amount, RoscaError>;

    // ===== END OF LIFE =====

    /// Foreperson drains the pool after the grace period.
    fn end_retrieve_funds(&self, caller: Address) -> Result<Amount, RoscaError>;

    /// Foreperson takes everything except unretrieved fees.
    fn end_retrieve_surplus(&self, caller: Address) -> Result<Amount, RoscaError>;

    /// Fee collector takes the accumulated fees.
    fn end_retrieve_fees(&self, caller: Address) -> Result<Amount, RoscaError>;

    // ===== VIEWS =====

    /// Withdrawable balance; negative when the member owes contributions.
    fn participant_balance(&self, address: Address) -> SignedAmount;

    /// Ledger record for `address`.
    fn member(&self, address: Address) -> Member;

    /// Pool snapshot.
    fn status(&self) -> PoolStatus;

    /// Conservation audit against the currency adapter's balance.
    fn audit(&self) -> ConservationReport;
}
