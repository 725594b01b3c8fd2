//! # Pool Lifecycle Flows
//!
//! Membership before start, round timing, partial withdrawals, the escape
//! hatch, end-of-life gating, and the lottery, pre-ordered and token
//! flavours.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use rosca_pool::{
        Amount, CurrencyAdapter, CurrencyError, CurrencyKind, ErrorKind, EscapeHatchState,
        RoscaApi, RoscaError, RoscaEvent, RoscaParamsBuilder, WinnerSelection,
    };

    const P: Amount = 4 * C;

    // =========================================================================
    // MEMBERSHIP
    // =========================================================================

    #[test]
    fn test_join_flow_before_start() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        let pool = &h.service;

        assert_eq!(
            pool.accept_join(A, OUTSIDER),
            Err(RoscaError::NoPendingRequest(OUTSIDER))
        );
        pool.request_join(OUTSIDER).unwrap();
        assert_eq!(
            pool.accept_join(B, OUTSIDER),
            Err(RoscaError::NotForeperson(B))
        );
        pool.accept_join(A, OUTSIDER).unwrap();

        let status = pool.status();
        assert_eq!(status.members.len(), 5);
        assert_eq!(status.pot_size, 5 * C);
        assert_eq!(status.lowest_bid, 5 * C + 1);
        assert!(pool.member(OUTSIDER).is_member);
        assert_eq!(
            pool.request_join(OUTSIDER),
            Err(RoscaError::AlreadyMember(OUTSIDER))
        );

        let names = h.sink.names();
        assert_eq!(&names[names.len() - 2..], &["JoinRequested", "MemberAdded"]);
    }

    #[test]
    fn test_membership_frozen_once_started() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        h.at_boundary(0);
        h.service.start_round().unwrap();

        let err = h.service.request_join(OUTSIDER).unwrap_err();
        assert_eq!(err, RoscaError::AlreadyStarted);
        assert_eq!(err.kind(), ErrorKind::Phase);
        assert_eq!(
            h.service.add_member(A, OUTSIDER),
            Err(RoscaError::AlreadyStarted)
        );
        assert_eq!(h.service.status().pot_size, P);
    }

    // =========================================================================
    // ROUND TIMING
    // =========================================================================

    #[test]
    fn test_premature_start_changes_nothing() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        let before = h.service.status();
        h.clock.set(START - 1);
        assert!(matches!(
            h.service.start_round(),
            Err(RoscaError::RoundNotDue { .. })
        ));
        assert_eq!(h.service.status(), before);

        h.at_boundary(0);
        h.service.start_round().unwrap();
        let before = h.service.status();
        h.clock.set(START + PERIOD - 1);
        assert!(h.service.start_round().is_err());
        assert_eq!(h.service.status(), before);
    }

    #[test]
    fn test_cadence_is_fixed_despite_late_calls() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        h.clock.set(START + 3 * PERIOD / 2);
        h.service.start_round().unwrap();
        assert_eq!(h.service.status().round_start_time, START + PERIOD);

        // Already past the next boundary, so the next call succeeds at once.
        h.service.start_round().unwrap();
        assert_eq!(h.service.status().round_start_time, START + 2 * PERIOD);
        assert_eq!(h.service.status().current_round, 2);
    }

    #[test]
    fn test_unfunded_round_has_no_winner() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        h.at_boundary(0);
        h.service.start_round().unwrap();
        h.at_boundary(1);
        let t = h.service.start_round().unwrap();
        assert_eq!(t.closed.unwrap().winner, None);
        assert!(!h.sink.names().contains(&"RoundFundsReleased"));
        assert!(h.service.audit().holds());
    }

    // =========================================================================
    // WITHDRAWALS
    // =========================================================================

    #[test]
    fn test_partial_withdrawal_then_depleted() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        let pool = &h.service;
        pool.contribute(A, 4 * C).unwrap();
        h.at_boundary(0);
        pool.start_round().unwrap();
        h.at_boundary(1);

        // A is the only member in good standing and takes the full pot.
        let t = pool.start_round().unwrap();
        assert_eq!(t.closed.unwrap().winner, Some(A));

        let entitlement = 4 * C + P * 99 / 100 - 2 * C;
        let receipt = pool.withdraw(A).unwrap();
        assert!(receipt.is_partial());
        assert_eq!(receipt.sent, 4 * C);
        assert_eq!(receipt.entitlement, entitlement);
        assert!(matches!(
            h.sink.events().last().map(|e| &e.event),
            Some(RoscaEvent::PartialWithdrawal { amount, .. }) if *amount == 4 * C
        ));
        assert_eq!(pool.stats().partial_withdrawals, 1);

        assert_eq!(
            pool.withdraw(A),
            Err(RoscaError::PoolDepleted {
                entitlement: entitlement - 4 * C
            })
        );
        assert!(pool.audit().holds());
    }

    #[test]
    fn test_debtor_cannot_withdraw() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        h.service.contribute(B, C).unwrap();
        h.at_boundary(0);
        h.service.start_round().unwrap();
        h.at_boundary(1);
        h.service.start_round().unwrap();

        assert!(h.service.participant_balance(D) < 0);
        assert!(matches!(
            h.service.withdraw(D),
            Err(RoscaError::NothingToWithdraw { entitlement }) if entitlement < 0
        ));
        assert_eq!(h.service.withdraw(OUTSIDER), Err(RoscaError::NotMember(OUTSIDER)));
    }

    // =========================================================================
    // ESCAPE HATCH
    // =========================================================================

    #[test]
    fn test_escape_hatch_freezes_and_sweeps() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        let pool = &h.service;
        for who in [A, B, CM] {
            pool.contribute(who, 2 * C).unwrap();
        }

        assert_eq!(
            pool.enable_escape_hatch(A),
            Err(RoscaError::NotEscapeHatchEnabler(A))
        );
        assert!(pool.emergency_withdrawal(A).is_err());
        pool.enable_escape_hatch(ENABLER).unwrap();

        // Armed but not active: withdrawals still go through.
        assert_eq!(pool.status().escape_hatch, EscapeHatchState::Enabled);
        assert_eq!(pool.withdraw(CM).unwrap().sent, 2 * C);
        assert_eq!(
            pool.activate_escape_hatch(ENABLER),
            Err(RoscaError::NotForeperson(ENABLER))
        );
        pool.activate_escape_hatch(A).unwrap();
        assert_eq!(pool.status().escape_hatch, EscapeHatchState::Active);

        assert_eq!(pool.contribute(D, C), Err(RoscaError::EscapeHatchActive));
        assert_eq!(pool.withdraw(B), Err(RoscaError::EscapeHatchActive));
        assert_eq!(pool.emergency_withdrawal(B), Err(RoscaError::NotForeperson(B)));

        assert_eq!(pool.emergency_withdrawal(A), Ok(4 * C));
        assert_eq!(h.currency.balance_of_pool(), 0);
        assert_eq!(h.currency.wallet_balance(A), WALLET - 2 * C + 4 * C);
        assert_eq!(pool.emergency_withdrawal(A), Err(RoscaError::NothingToRetrieve));
        assert!(pool.audit().holds());

        let names = h.sink.names();
        assert!(names.ends_with(&[
            "EscapeHatchEnabled",
            "FundsWithdrawal",
            "EscapeHatchActivated",
            "EmergencyWithdrawal"
        ]));
    }

    // =========================================================================
    // END OF LIFE
    // =========================================================================

    fn ended_pool() -> Harness {
        let h = Harness::four_members(WinnerSelection::Bidding);
        h.service.contribute(A, 3 * C).unwrap();
        h.service.contribute(D, C).unwrap();
        for round in 0..=4 {
            h.at_boundary(round);
            h.service.start_round().unwrap();
        }
        h
    }

    #[test]
    fn test_end_retrieve_funds_gating() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        h.service.contribute(A, 3 * C).unwrap();
        assert_eq!(h.service.end_retrieve_funds(A), Err(RoscaError::NotEnded));

        let h = ended_pool();
        h.clock.set(START + 5 * PERIOD - 1);
        assert!(matches!(
            h.service.end_retrieve_funds(A),
            Err(RoscaError::GracePeriodNotElapsed { .. })
        ));
        h.at_boundary(5);
        assert_eq!(h.service.end_retrieve_funds(B), Err(RoscaError::NotForeperson(B)));

        let balance = h.currency.balance_of_pool();
        assert_eq!(balance, 4 * C);
        assert_eq!(h.service.end_retrieve_funds(A), Ok(balance));
        assert_eq!(h.currency.balance_of_pool(), 0);
        assert_eq!(h.service.end_retrieve_funds(A), Err(RoscaError::NothingToRetrieve));
        assert!(h.service.audit().holds());
    }

    #[test]
    fn test_fee_collector_retrieves_once() {
        let params = RoscaParamsBuilder::new(A, C, START, ENABLER)
            .members(vec![B, CM, D])
            .fee_in_thousandths(20)
            .fee_collector(OUTSIDER)
            .build();
        let h = Harness::new(params);
        for who in [A, B, CM, D] {
            h.service.contribute(who, 4 * C).unwrap();
        }
        for round in 0..=4 {
            h.at_boundary(round);
            h.service.start_round().unwrap();
        }
        h.at_boundary(5);

        let fees = h.service.status().total_fees;
        assert_eq!(fees, 4 * (P * 20 / 1_000));
        assert_eq!(h.service.end_retrieve_fees(A), Err(RoscaError::NotFeeCollector(A)));

        let surplus = h.service.end_retrieve_surplus(A).unwrap();
        assert_eq!(surplus, 16 * C - fees);
        assert_eq!(h.service.end_retrieve_fees(OUTSIDER), Ok(fees));
        assert_eq!(
            h.service.end_retrieve_fees(OUTSIDER),
            Err(RoscaError::FeesAlreadyRetrieved)
        );
        assert_eq!(h.currency.wallet_balance(OUTSIDER), WALLET + fees);

        // A late debt payment is not swept by a second surplus call.
        h.service.contribute(B, C).unwrap();
        assert_eq!(
            h.service.end_retrieve_surplus(A),
            Err(RoscaError::SurplusAlreadyRetrieved)
        );
        assert_eq!(h.currency.balance_of_pool(), C);
        assert!(h.service.audit().holds());
    }

    // =========================================================================
    // POOL FLAVOURS
    // =========================================================================

    #[test]
    fn test_pre_ordered_pool_pays_in_member_order() {
        let h = Harness::four_members(WinnerSelection::PreOrdered);
        for who in [A, B, CM, D] {
            h.service.contribute(who, 4 * C).unwrap();
        }
        assert_eq!(
            h.service.bid(B, P),
            Err(RoscaError::BiddingDisabled(WinnerSelection::PreOrdered))
        );
        h.at_boundary(0);
        h.service.start_round().unwrap();

        let mut winners = Vec::new();
        for round in 1..=4 {
            h.at_boundary(round);
            let t = h.service.start_round().unwrap();
            let closed = t.closed.unwrap();
            assert_eq!(closed.winning_amount, P);
            assert_eq!(closed.discount_per_member, 0);
            winners.push(closed.winner.unwrap());
        }
        assert_eq!(winners, vec![A, B, CM, D]);
        assert!(h.service.audit().holds());
    }

    #[test]
    fn test_lottery_pool_pays_everyone_once() {
        let h = Harness::four_members(WinnerSelection::Lottery);
        for who in [A, B, CM, D] {
            h.service.contribute(who, 4 * C).unwrap();
        }
        h.at_boundary(0);
        h.service.start_round().unwrap();
        assert!(matches!(
            h.service.bid(CM, P),
            Err(RoscaError::BiddingDisabled(WinnerSelection::Lottery))
        ));
        for round in 1..=4 {
            h.at_boundary(round);
            h.service.start_round().unwrap();
        }
        let status = h.service.status();
        assert!(status.members.iter().all(|m| m.record.has_won));
        assert_eq!(status.total_discounts, 0);
    }

    #[test]
    fn test_token_pool_requires_allowance() {
        let params = RoscaParamsBuilder::new(A, C, START, ENABLER)
            .members(vec![B, CM])
            .currency(CurrencyKind::Token)
            .build();
        let h = Harness::new(params);
        assert_eq!(h.currency.kind(), CurrencyKind::Token);

        h.service.contribute(B, 2 * C).unwrap();
        assert_eq!(h.currency.allowance(B), WALLET - 2 * C);

        h.currency.approve(CM, C / 2);
        assert_eq!(
            h.service.contribute(CM, C),
            Err(RoscaError::Currency(CurrencyError::InsufficientAllowance {
                owner: CM,
                requested: C,
                approved: C / 2,
            }))
        );
        assert_eq!(h.service.member(CM).credit, 0);
        assert_eq!(h.currency.balance_of_pool(), 2 * C);
        assert!(h.service.audit().holds());
    }
}
