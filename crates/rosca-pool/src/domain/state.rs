//! # Pool Aggregate
//!
//! One record holding the member registry, ledger totals, auction and
//! escape hatch of a pool. All methods are pure state transitions; moving
//! currency is the caller's job.
//!
//! Methods named `begin_*` apply their ledger effect before the caller
//! transfers funds. If the transfer fails the matching `revert_*` undoes
//! exactly that effect.

use super::auction::RoundAuction;
use super::discount::settle;
use super::entities::{
    BidOutcome, Member, PoolStatus, RoscaParams, RoundOutcome, RoundTransition,
    WithdrawalReceipt,
};
use super::errors::RoscaError;
use super::escape_hatch::EscapeHatch;
use super::invariants::invariant_bid_range;
use super::ledger::{ConservationReport, ContributionLedger};
use super::membership::MembershipRegistry;
use super::value_objects::{
    Address, Amount, CurrencyKind, SignedAmount, Timestamp, WinnerSelection,
};
use crate::algorithms::{round_entropy, select_fallback_winner};
use crate::config::RoscaConfig;
use uuid::Uuid;

/// Complete state of one pool.
#[derive(Clone, Debug)]
pub struct RoscaState {
    id: Uuid,
    contribution_size: Amount,
    fee_in_thousandths: u32,
    min_distribution_percent: u32,
    min_members: usize,
    selection: WinnerSelection,
    currency: CurrencyKind,
    fee_collector: Address,
    fees_retrieved: bool,
    surplus_retrieved: bool,
    registry: MembershipRegistry,
    ledger: ContributionLedger,
    auction: RoundAuction,
    hatch: EscapeHatch,
}

fn pot_for(contribution: Amount, members: usize) -> Result<Amount, RoscaError> {
    contribution
        .checked_mul(members as Amount)
        .ok_or(RoscaError::PotOverflow {
            contribution,
            members,
        })
}

impl RoscaState {
    /// Validate `params` at time `now` and build the pool.
    pub fn new(
        id: Uuid,
        params: &RoscaParams,
        config: &RoscaConfig,
        now: Timestamp,
    ) -> Result<Self, RoscaError> {
        config.validate()?;
        params.validate(config, now)?;
        let registry = MembershipRegistry::new(params.foreperson, &params.members)?;
        let pot = pot_for(params.contribution_size, registry.count())?;

        Ok(Self {
            id,
            contribution_size: params.contribution_size,
            fee_in_thousandths: params.fee_in_thousandths,
            min_distribution_percent: config.min_distribution_percent,
            min_members: config.min_members,
            selection: params.selection,
            currency: params.currency,
            fee_collector: params.fee_collector.unwrap_or(params.foreperson),
            fees_retrieved: false,
            surplus_retrieved: false,
            registry,
            ledger: ContributionLedger::default(),
            auction: RoundAuction::new(pot, params.start_time, params.round_period_secs()),
            hatch: EscapeHatch::new(params.escape_hatch_enabler),
        })
    }

    // ===== ACCESSORS =====

    /// Pool id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The foreperson.
    #[must_use]
    pub fn foreperson(&self) -> Address {
        self.registry.foreperson()
    }

    /// Fee collector.
    #[must_use]
    pub fn fee_collector(&self) -> Address {
        self.fee_collector
    }

    /// Member count, foreperson included.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.registry.count()
    }

    /// Contribution size.
    #[must_use]
    pub fn contribution_size(&self) -> Amount {
        self.contribution_size
    }

    /// Winner selection flavour.
    #[must_use]
    pub fn selection(&self) -> WinnerSelection {
        self.selection
    }

    /// Asset held by the pool.
    #[must_use]
    pub fn currency(&self) -> CurrencyKind {
        self.currency
    }

    /// Auction and schedule.
    #[must_use]
    pub fn auction(&self) -> &RoundAuction {
        &self.auction
    }

    /// Ledger totals.
    #[must_use]
    pub fn ledger(&self) -> &ContributionLedger {
        &self.ledger
    }

    /// Member registry.
    #[must_use]
    pub fn registry(&self) -> &MembershipRegistry {
        &self.registry
    }

    /// Escape hatch.
    #[must_use]
    pub fn escape_hatch(&self) -> &EscapeHatch {
        &self.hatch
    }

    /// Record for `address` (default for non-members).
    #[must_use]
    pub fn member(&self, address: &Address) -> Member {
        self.registry.member(address)
    }

    /// `credit - round * contribution + totalDiscounts / N` for `address`.
    #[must_use]
    pub fn participant_balance(&self, address: &Address) -> SignedAmount {
        self.ledger.balance(
            &self.registry.member(address),
            self.auction.current_round(),
            self.contribution_size,
            self.registry.count(),
        )
    }

    /// Good standing of `address` for the current round.
    #[must_use]
    pub fn in_good_standing(&self, address: &Address) -> bool {
        self.ledger.in_good_standing(
            &self.registry.member(address),
            self.auction.current_round(),
            self.contribution_size,
            self.registry.count(),
        )
    }

    // ===== MEMBERSHIP =====

    /// Record a join request. Only before round 1.
    pub fn request_join(&mut self, from: Address) -> Result<(), RoscaError> {
        self.auction.ensure_not_started()?;
        self.registry.request_join(from)
    }

    /// Foreperson accepts a pending request. Only before round 1.
    pub fn accept_join(&mut self, caller: Address, candidate: Address) -> Result<(), RoscaError> {
        self.registry.ensure_foreperson(&caller)?;
        self.auction.ensure_not_started()?;
        let pot = pot_for(self.contribution_size, self.registry.count() + 1)?;
        self.registry.accept_join(caller, candidate)?;
        self.auction.set_pot(pot)
    }

    /// Foreperson adds a member directly. Only before round 1.
    pub fn add_member(&mut self, caller: Address, address: Address) -> Result<(), RoscaError> {
        self.registry.ensure_foreperson(&caller)?;
        self.auction.ensure_not_started()?;
        let pot = pot_for(self.contribution_size, self.registry.count() + 1)?;
        self.registry.add_member(caller, address)?;
        self.auction.set_pot(pot)
    }

    // ===== CONTRIBUTIONS =====

    /// Fail unless `from` may contribute right now.
    pub fn check_contribution(&self, from: &Address) -> Result<(), RoscaError> {
        self.registry.ensure_member(from)?;
        self.hatch.ensure_inactive()
    }

    /// Credit a contribution whose funds already reached the pool.
    pub fn record_contribution(&mut self, from: Address, amount: Amount) -> Result<(), RoscaError> {
        self.check_contribution(&from)?;
        let member = self.registry.member_mut(&from)?;
        self.ledger.deposit(member, amount);
        Ok(())
    }

    // ===== AUCTION =====

    /// Submit a bid for the open round.
    pub fn bid(&mut self, from: Address, amount: Amount) -> Result<BidOutcome, RoscaError> {
        if !self.selection.accepts_bids() {
            return Err(RoscaError::BiddingDisabled(self.selection));
        }
        self.auction.ensure_in_progress()?;
        self.registry.ensure_member(&from)?;
        if self.registry.member(&from).has_won {
            return Err(RoscaError::AlreadyWon(from));
        }
        if !self.in_good_standing(&from) {
            return Err(RoscaError::NotInGoodStanding(from));
        }
        invariant_bid_range(amount, self.auction.pot(), self.min_distribution_percent)?;
        Ok(self.auction.place_bid(from, amount))
    }

    /// Advance the round at time `now`, closing the open round first.
    pub fn start_round(&mut self, now: Timestamp) -> Result<RoundTransition, RoscaError> {
        self.auction.ensure_due(now)?;

        if self.auction.current_round() == 0 {
            let count = self.registry.count();
            if count < self.min_members {
                return Err(RoscaError::NotEnoughMembers {
                    count,
                    min: self.min_members,
                });
            }
            let opened = self.auction.open_next_round();
            return Ok(RoundTransition {
                closed: None,
                opened: Some(opened),
                ended: false,
            });
        }

        let outcome = self.close_round(now)?;
        if self.auction.is_final_round(self.registry.count()) {
            self.auction.finish();
            return Ok(RoundTransition {
                closed: Some(outcome),
                opened: None,
                ended: true,
            });
        }
        let opened = self.auction.open_next_round();
        Ok(RoundTransition {
            closed: Some(outcome),
            opened: Some(opened),
            ended: false,
        })
    }

    /// Members who may receive the pot without a bid, in member order.
    #[must_use]
    pub fn eligible_members(&self) -> Vec<Address> {
        self.registry
            .iter()
            .filter(|(addr, m)| m.is_member && !m.has_won && self.in_good_standing(addr))
            .map(|(addr, _)| addr)
            .collect()
    }

    fn close_round(&mut self, now: Timestamp) -> Result<RoundOutcome, RoscaError> {
        let round = self.auction.current_round();
        let pot = self.auction.pot();

        let winning = match self.auction.winning_bid() {
            Some(bid) => Some(bid),
            None => {
                let eligible = self.eligible_members();
                let entropy = round_entropy(&self.id, now, round);
                select_fallback_winner(self.selection, &eligible, &entropy).map(|w| (w, pot))
            }
        };

        let Some((winner, amount)) = winning else {
            return Ok(RoundOutcome {
                round,
                winner: None,
                winning_amount: 0,
                fee: 0,
                discount_per_member: 0,
            });
        };

        let settlement = settle(pot, self.registry.count(), self.fee_in_thousandths, amount);
        let record = self.registry.member_mut(&winner)?;
        self.ledger.settle(record, &settlement);

        Ok(RoundOutcome {
            round,
            winner: Some(winner),
            winning_amount: settlement.winning_amount,
            fee: settlement.fee,
            discount_per_member: settlement.discount_per_member,
        })
    }

    // ===== WITHDRAWALS =====

    /// Debit `member` for a withdrawal from a pool holding `available`.
    ///
    /// Sends the full entitlement when covered, otherwise everything the
    /// pool holds. The debit happens here, before any transfer.
    pub fn begin_withdrawal(
        &mut self,
        member: Address,
        available: Amount,
    ) -> Result<WithdrawalReceipt, RoscaError> {
        self.registry.ensure_member(&member)?;
        self.hatch.ensure_inactive()?;

        let entitlement = self.participant_balance(&member);
        if entitlement <= 0 {
            return Err(RoscaError::NothingToWithdraw { entitlement });
        }
        let entitlement = entitlement.unsigned_abs();
        let sent = entitlement.min(available);
        if sent == 0 {
            return Err(RoscaError::PoolDepleted { entitlement });
        }

        let record = self.registry.member_mut(&member)?;
        self.ledger.debit(record, sent);
        Ok(WithdrawalReceipt { entitlement, sent })
    }

    /// Undo a withdrawal debit after a failed transfer.
    pub fn revert_withdrawal(&mut self, member: Address, amount: Amount) -> Result<(), RoscaError> {
        let record = self.registry.member_mut(&member)?;
        self.ledger.revert_debit(record, amount);
        Ok(())
    }

    // ===== ESCAPE HATCH =====

    /// Arm the escape hatch.
    pub fn enable_escape_hatch(&mut self, caller: Address) -> Result<(), RoscaError> {
        self.hatch.enable(caller)
    }

    /// Activate the escape hatch.
    pub fn activate_escape_hatch(&mut self, caller: Address) -> Result<(), RoscaError> {
        let foreperson = self.registry.foreperson();
        self.hatch.activate(caller, foreperson)
    }

    /// Sweep the whole pool balance to the foreperson.
    pub fn begin_emergency_withdrawal(
        &mut self,
        caller: Address,
        available: Amount,
    ) -> Result<Amount, RoscaError> {
        self.registry.ensure_foreperson(&caller)?;
        self.hatch.ensure_active()?;
        if available == 0 {
            return Err(RoscaError::NothingToRetrieve);
        }
        self.ledger.sweep(available);
        Ok(available)
    }

    /// Undo a sweep after a failed transfer.
    pub fn revert_sweep(&mut self, amount: Amount) {
        self.ledger.revert_sweep(amount);
    }

    // ===== END OF LIFE =====

    fn ensure_retrieval_window(&self, now: Timestamp) -> Result<(), RoscaError> {
        let Some(available_at) = self.auction.retrieval_opens_at() else {
            return Err(RoscaError::NotEnded);
        };
        if now < available_at {
            return Err(RoscaError::GracePeriodNotElapsed { now, available_at });
        }
        Ok(())
    }

    /// Foreperson drains the pool after the grace period.
    pub fn begin_retrieve_funds(
        &mut self,
        caller: Address,
        now: Timestamp,
        available: Amount,
    ) -> Result<Amount, RoscaError> {
        self.registry.ensure_foreperson(&caller)?;
        self.ensure_retrieval_window(now)?;
        if available == 0 {
            return Err(RoscaError::NothingToRetrieve);
        }
        self.ledger.sweep(available);
        Ok(available)
    }

    /// Foreperson takes everything except unretrieved fees, once.
    pub fn begin_retrieve_surplus(
        &mut self,
        caller: Address,
        now: Timestamp,
        available: Amount,
    ) -> Result<Amount, RoscaError> {
        self.registry.ensure_foreperson(&caller)?;
        self.ensure_retrieval_window(now)?;
        if self.surplus_retrieved {
            return Err(RoscaError::SurplusAlreadyRetrieved);
        }
        let reserved = if self.fees_retrieved {
            0
        } else {
            self.ledger.total_fees
        };
        let amount = available.saturating_sub(reserved);
        if amount == 0 {
            return Err(RoscaError::NothingToRetrieve);
        }
        self.surplus_retrieved = true;
        self.ledger.sweep(amount);
        Ok(amount)
    }

    /// Undo a surplus retrieval after a failed transfer.
    pub fn revert_surplus_retrieval(&mut self, amount: Amount) {
        self.surplus_retrieved = false;
        self.ledger.revert_sweep(amount);
    }

    /// Fee collector takes the accumulated fees, once.
    pub fn begin_retrieve_fees(
        &mut self,
        caller: Address,
        now: Timestamp,
        available: Amount,
    ) -> Result<Amount, RoscaError> {
        if caller != self.fee_collector {
            return Err(RoscaError::NotFeeCollector(caller));
        }
        self.ensure_retrieval_window(now)?;
        if self.fees_retrieved {
            return Err(RoscaError::FeesAlreadyRetrieved);
        }
        let amount = self.ledger.total_fees.min(available);
        if amount == 0 {
            return Err(RoscaError::NothingToRetrieve);
        }
        self.fees_retrieved = true;
        self.ledger.sweep(amount);
        Ok(amount)
    }

    /// Undo a fee retrieval after a failed transfer.
    pub fn revert_fee_retrieval(&mut self, amount: Amount) {
        self.fees_retrieved = false;
        self.ledger.revert_sweep(amount);
    }

    // ===== VIEWS =====

    /// Snapshot with the collaborator-reported `pool_balance`.
    #[must_use]
    pub fn status(&self, pool_balance: Amount) -> PoolStatus {
        PoolStatus {
            current_round: self.auction.current_round(),
            phase: self.auction.phase(),
            round_start_time: self.auction.round_start_time(),
            contribution_size: self.contribution_size,
            pot_size: self.auction.pot(),
            lowest_bid: self.auction.lowest_bid(),
            winner: self.auction.winner(),
            total_discounts: self.ledger.total_discounts,
            total_fees: self.ledger.total_fees,
            discount_dust: self.ledger.discount_dust,
            pool_balance,
            end_of_life: self.auction.end_of_life(),
            escape_hatch: self.hatch.state(),
            members: self.registry.entries(),
        }
    }

    /// Evaluate the conservation identities against `pool_balance`.
    #[must_use]
    pub fn audit(&self, pool_balance: Amount) -> ConservationReport {
        let credits: SignedAmount = self.registry.iter().map(|(_, m)| m.credit).sum();
        self.ledger.audit(credits, pool_balance)
    }
}
