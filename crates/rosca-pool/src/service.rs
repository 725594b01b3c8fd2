//! # Pool Service
//!
//! Wires one [`RoscaState`] to its collaborators and implements
//! [`RoscaApi`].
//!
//! ## Serialization
//!
//! Every operation runs under one reentrant lock per pool. The lock is
//! reentrant because a recipient hook invoked during a transfer runs on
//! the calling thread and may call back into the pool. The ledger borrow
//! is always released before funds leave, so a nested call observes the
//! debit already applied by the outer one.
//!
//! ## Logging
//!
//! Successful operations log at `info`, ignored bids at `debug` and
//! rejected operations at `warn`. Every span carries the pool id.

use crate::config::RoscaConfig;
use crate::domain::{
    Address, Amount, BidOutcome, ConservationReport, Member, PoolStatus, RoscaError,
    RoscaParams, RoscaState, RoundTransition, SignedAmount, WithdrawalReceipt,
};
use crate::events::{PoolEvent, RoscaEvent};
use crate::ports::inbound::RoscaApi;
use crate::ports::outbound::{CurrencyAdapter, RoscaEventSink, TimeSource};

use parking_lot::{Mutex, ReentrantMutex};
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Counters for one pool.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Successful contributions.
    pub contributions: u64,
    /// Bids that became the lowest.
    pub bids_accepted: u64,
    /// Valid bids that did not beat the lowest.
    pub bids_ignored: u64,
    /// Rounds closed by `start_round`.
    pub rounds_closed: u64,
    /// Successful withdrawals.
    pub withdrawals: u64,
    /// Withdrawals capped by the pool balance.
    pub partial_withdrawals: u64,
    /// Operations that returned an error.
    pub rejected_operations: u64,
}

struct Inner<C, K> {
    id: Uuid,
    state: ReentrantMutex<RefCell<RoscaState>>,
    currency: Arc<C>,
    clock: Arc<K>,
    events: Arc<dyn RoscaEventSink>,
    stats: Mutex<ServiceStats>,
}

/// A savings pool bound to its custody, clock and notification sink.
///
/// Cloning yields another handle to the same pool.
pub struct RoscaService<C: CurrencyAdapter, K: TimeSource> {
    inner: Arc<Inner<C, K>>,
}

impl<C: CurrencyAdapter, K: TimeSource> Clone for RoscaService<C, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: CurrencyAdapter, K: TimeSource> RoscaService<C, K> {
    /// Validate `params` against `config` at the clock's current time and
    /// create the pool.
    pub fn new(
        params: &RoscaParams,
        config: &RoscaConfig,
        currency: Arc<C>,
        clock: Arc<K>,
        events: Arc<dyn RoscaEventSink>,
    ) -> Result<Self, RoscaError> {
        if params.currency != currency.kind() {
            return Err(RoscaError::CurrencyMismatch {
                pool: params.currency,
                adapter: currency.kind(),
            });
        }

        let id = Uuid::new_v4();
        let state = RoscaState::new(id, params, config, clock.now())?;

        info!(
            pool_id = %id,
            foreperson = %params.foreperson,
            members = state.member_count(),
            contribution = %params.contribution_size,
            selection = ?params.selection,
            "[rosca] Pool created"
        );

        let service = Self {
            inner: Arc::new(Inner {
                id,
                state: ReentrantMutex::new(RefCell::new(state)),
                currency,
                clock,
                events,
                stats: Mutex::new(ServiceStats::default()),
            }),
        };
        // The initial roster is admitted at creation time.
        for member in service.with_state(|s| s.registry().addresses().to_vec()) {
            service.emit(RoscaEvent::MemberAdded { member });
        }
        Ok(service)
    }

    /// Pool id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Counters since creation.
    pub fn stats(&self) -> ServiceStats {
        self.inner.stats.lock().clone()
    }

    /// Run `f` against a read-only view of the pool state.
    pub fn with_state<R>(&self, f: impl FnOnce(&RoscaState) -> R) -> R {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        f(&state)
    }

    // ===== INTERNAL =====

    fn with_state_mut<R>(&self, f: impl FnOnce(&mut RoscaState) -> R) -> R {
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }

    fn emit(&self, event: RoscaEvent) {
        self.inner.events.publish(PoolEvent {
            pool_id: self.inner.id,
            event,
        });
    }

    fn track<T>(
        &self,
        operation: &'static str,
        result: Result<T, RoscaError>,
    ) -> Result<T, RoscaError> {
        if let Err(e) = &result {
            warn!(operation, error = %e, kind = ?e.kind(), "Operation rejected");
            self.inner.stats.lock().rejected_operations += 1;
        }
        result
    }

    /// Send `amount` to `to`, running `revert` if the transfer is refused.
    fn pay_out(
        &self,
        state: &RefCell<RoscaState>,
        to: Address,
        amount: Amount,
        revert: impl FnOnce(&mut RoscaState) -> Result<(), RoscaError>,
    ) -> Result<(), RoscaError> {
        if self.inner.currency.transfer_out(to, amount) {
            return Ok(());
        }
        revert(&mut state.borrow_mut())?;
        Err(RoscaError::TransferFailed { to, amount })
    }

    fn do_contribute(&self, from: Address, amount: Amount) -> Result<(), RoscaError> {
        let guard = self.inner.state.lock();
        guard.borrow().check_contribution(&from)?;
        self.inner.currency.pull_from(from, amount)?;
        guard.borrow_mut().record_contribution(from, amount)?;

        self.inner.stats.lock().contributions += 1;
        info!(member = %from, amount = %amount, "Contribution received");
        self.emit(RoscaEvent::ContributionMade {
            member: from,
            amount,
        });
        Ok(())
    }

    fn do_bid(&self, from: Address, amount: Amount) -> Result<BidOutcome, RoscaError> {
        let guard = self.inner.state.lock();
        let outcome = guard.borrow_mut().bid(from, amount)?;

        match outcome {
            BidOutcome::NewLowest => {
                self.inner.stats.lock().bids_accepted += 1;
                info!(bidder = %from, amount = %amount, "New lowest bid");
                self.emit(RoscaEvent::NewLowestBid {
                    bidder: from,
                    amount,
                });
            }
            BidOutcome::Ignored => {
                self.inner.stats.lock().bids_ignored += 1;
                debug!(
                    bidder = %from,
                    amount = %amount,
                    lowest = %guard.borrow().auction().lowest_bid(),
                    "Bid not below current lowest"
                );
            }
        }
        Ok(outcome)
    }

    fn do_start_round(&self) -> Result<RoundTransition, RoscaError> {
        let now = self.inner.clock.now();
        let guard = self.inner.state.lock();
        let transition = guard.borrow_mut().start_round(now)?;
        let state = guard.borrow();

        if let Some(closed) = transition.closed {
            self.inner.stats.lock().rounds_closed += 1;
            match closed.winner {
                Some(winner) => {
                    info!(
                        round = closed.round,
                        winner = %winner,
                        amount = %closed.winning_amount,
                        fee = %closed.fee,
                        discount = %closed.discount_per_member,
                        "Round funds released"
                    );
                    self.emit(RoscaEvent::RoundFundsReleased {
                        round: closed.round,
                        winner,
                        amount: closed.winning_amount,
                    });
                }
                None => warn!(round = closed.round, "Round closed with no eligible winner"),
            }
        }

        if let Some(round) = transition.opened {
            let next_round_start = state.auction().round_start_time();
            info!(round, next_round_start, "Round started");
            self.emit(RoscaEvent::RoundStarted {
                round,
                next_round_start,
            });
        }

        if transition.ended {
            let closed_at = state.auction().closed_at().unwrap_or(now);
            info!(closed_at, "Pool reached end of life");
            self.emit(RoscaEvent::EndOfRosca { closed_at });
        }
        Ok(transition)
    }

    fn do_withdraw(&self, member: Address) -> Result<WithdrawalReceipt, RoscaError> {
        let guard = self.inner.state.lock();
        let available = self.inner.currency.balance_of_pool();
        let receipt = guard.borrow_mut().begin_withdrawal(member, available)?;

        self.pay_out(&guard, member, receipt.sent, |s| {
            s.revert_withdrawal(member, receipt.sent)
        })?;

        {
            let mut stats = self.inner.stats.lock();
            stats.withdrawals += 1;
            if receipt.is_partial() {
                stats.partial_withdrawals += 1;
            }
        }
        info!(member = %member, amount = %receipt.sent, "Funds withdrawn");
        self.emit(RoscaEvent::FundsWithdrawal {
            member,
            amount: receipt.sent,
        });
        if receipt.is_partial() {
            warn!(
                member = %member,
                sent = %receipt.sent,
                entitlement = %receipt.entitlement,
                "Pool short of funds; partial withdrawal"
            );
            self.emit(RoscaEvent::PartialWithdrawal {
                member,
                amount: receipt.sent,
                entitlement: receipt.entitlement,
            });
        }
        Ok(receipt)
    }

    fn do_emergency_withdrawal(&self, caller: Address) -> Result<Amount, RoscaError> {
        let guard = self.inner.state.lock();
        let available = self.inner.currency.balance_of_pool();
        let amount = guard
            .borrow_mut()
            .begin_emergency_withdrawal(caller, available)?;

        self.pay_out(&guard, caller, amount, |s| {
            s.revert_sweep(amount);
            Ok(())
        })?;

        warn!(foreperson = %caller, amount = %amount, "Emergency withdrawal");
        self.emit(RoscaEvent::EmergencyWithdrawal { amount });
        Ok(amount)
    }

    fn do_end_retrieve(&self, caller: Address, surplus_only: bool) -> Result<Amount, RoscaError> {
        let now = self.inner.clock.now();
        let guard = self.inner.state.lock();
        let available = self.inner.currency.balance_of_pool();
        let amount = {
            let mut state = guard.borrow_mut();
            if surplus_only {
                state.begin_retrieve_surplus(caller, now, available)?
            } else {
                state.begin_retrieve_funds(caller, now, available)?
            }
        };

        self.pay_out(&guard, caller, amount, |s| {
            if surplus_only {
                s.revert_surplus_retrieval(amount);
            } else {
                s.revert_sweep(amount);
            }
            Ok(())
        })?;

        info!(foreperson = %caller, amount = %amount, surplus_only, "End-of-life retrieval");
        self.emit(RoscaEvent::ForepersonSurplusWithdrawal { amount });
        Ok(amount)
    }

    fn do_end_retrieve_fees(&self, caller: Address) -> Result<Amount, RoscaError> {
        let now = self.inner.clock.now();
        let guard = self.inner.state.lock();
        let available = self.inner.currency.balance_of_pool();
        let amount = guard
            .borrow_mut()
            .begin_retrieve_fees(caller, now, available)?;

        self.pay_out(&guard, caller, amount, |s| {
            s.revert_fee_retrieval(amount);
            Ok(())
        })?;

        info!(collector = %caller, amount = %amount, "Fees retrieved");
        self.emit(RoscaEvent::FeesRetrieved {
            collector: caller,
            amount,
        });
        Ok(amount)
    }
}

impl<C: CurrencyAdapter, K: TimeSource> RoscaApi for RoscaService<C, K> {
    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn request_join(&self, from: Address) -> Result<(), RoscaError> {
        self.track("request_join", self.with_state_mut(|s| s.request_join(from)))?;
        info!(from = %from, "Join requested");
        self.emit(RoscaEvent::JoinRequested { from });
        Ok(())
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn accept_join(&self, caller: Address, candidate: Address) -> Result<(), RoscaError> {
        self.track("accept_join", self.with_state_mut(|s| s.accept_join(caller, candidate)))?;
        info!(member = %candidate, "Join accepted");
        self.emit(RoscaEvent::MemberAdded { member: candidate });
        Ok(())
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn add_member(&self, caller: Address, address: Address) -> Result<(), RoscaError> {
        self.track("add_member", self.with_state_mut(|s| s.add_member(caller, address)))?;
        info!(member = %address, "Member added");
        self.emit(RoscaEvent::MemberAdded { member: address });
        Ok(())
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn contribute(&self, from: Address, amount: Amount) -> Result<(), RoscaError> {
        self.track("contribute", self.do_contribute(from, amount))
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn withdraw(&self, member: Address) -> Result<WithdrawalReceipt, RoscaError> {
        self.track("withdraw", self.do_withdraw(member))
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn bid(&self, from: Address, amount: Amount) -> Result<BidOutcome, RoscaError> {
        self.track("bid", self.do_bid(from, amount))
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn start_round(&self) -> Result<RoundTransition, RoscaError> {
        self.track("start_round", self.do_start_round())
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn enable_escape_hatch(&self, caller: Address) -> Result<(), RoscaError> {
        self.track("enable_escape_hatch", self.with_state_mut(|s| s.enable_escape_hatch(caller)))?;
        warn!(enabler = %caller, "Escape hatch enabled");
        self.emit(RoscaEvent::EscapeHatchEnabled);
        Ok(())
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn activate_escape_hatch(&self, caller: Address) -> Result<(), RoscaError> {
        self.track(
            "activate_escape_hatch",
            self.with_state_mut(|s| s.activate_escape_hatch(caller)),
        )?;
        warn!(foreperson = %caller, "Escape hatch activated; pool frozen");
        self.emit(RoscaEvent::EscapeHatchActivated);
        Ok(())
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn emergency_withdrawal(&self, caller: Address) -> Result<Amount, RoscaError> {
        self.track("emergency_withdrawal", self.do_emergency_withdrawal(caller))
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn end_retrieve_funds(&self, caller: Address) -> Result<Amount, RoscaError> {
        self.track("end_retrieve_funds", self.do_end_retrieve(caller, false))
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn end_retrieve_surplus(&self, caller: Address) -> Result<Amount, RoscaError> {
        self.track("end_retrieve_surplus", self.do_end_retrieve(caller, true))
    }

    #[instrument(skip(self), fields(pool_id = %self.inner.id))]
    fn end_retrieve_fees(&self, caller: Address) -> Result<Amount, RoscaError> {
        self.track("end_retrieve_fees", self.do_end_retrieve_fees(caller))
    }

    fn participant_balance(&self, address: Address) -> SignedAmount {
        self.with_state(|s| s.participant_balance(&address))
    }

    fn member(&self, address: Address) -> Member {
        self.with_state(|s| s.member(&address))
    }

    fn status(&self) -> PoolStatus {
        let guard = self.inner.state.lock();
        let pool_balance = self.inner.currency.balance_of_pool();
        let state = guard.borrow();
        state.status(pool_balance)
    }

    fn audit(&self) -> ConservationReport {
        let guard = self.inner.state.lock();
        let pool_balance = self.inner.currency.balance_of_pool();
        let state = guard.borrow();
        state.audit(pool_balance)
    }
}
