//! # Concurrent Callers
//!
//! Many threads hammering one pool through cloned handles. Operations are
//! serialized per pool, so totals add up exactly and no member is paid
//! twice.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use rosca_pool::{CurrencyAdapter, RoscaApi, RoscaError, WinnerSelection};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_contributions_are_all_credited() {
        let h = Harness::four_members(WinnerSelection::Bidding);

        let mut handles = Vec::new();
        for who in [A, B, CM, D] {
            for _ in 0..25 {
                let pool = h.service.clone();
                handles.push(tokio::task::spawn_blocking(move || {
                    pool.contribute(who, C / 5)
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for who in [A, B, CM, D] {
            assert_eq!(h.service.member(who).credit, 5 * C as i128);
        }
        assert_eq!(h.currency.balance_of_pool(), 20 * C);
        assert_eq!(h.service.stats().contributions, 100);
        assert!(h.service.audit().holds());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_withdrawals_pay_once() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        h.service.contribute(B, 7 * C).unwrap();
        h.service.contribute(A, C).unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let pool = h.service.clone();
            handles.push(tokio::task::spawn_blocking(move || pool.withdraw(B)));
        }

        let mut paid = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(receipt) => paid += receipt.sent,
                Err(e) => assert!(matches!(e, RoscaError::NothingToWithdraw { .. })),
            }
        }

        assert_eq!(paid, 7 * C);
        assert_eq!(h.currency.balance_of_pool(), C);
        assert_eq!(h.service.stats().withdrawals, 1);
        assert!(h.service.audit().holds());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_bids_keep_the_minimum() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        for who in [A, B, CM, D] {
            h.service.contribute(who, C).unwrap();
        }
        h.at_boundary(0);
        h.service.start_round().unwrap();

        let bidders = [A, B, CM, D];
        let mut handles = Vec::new();
        for step in 0..40u128 {
            let pool = h.service.clone();
            let who = bidders[(step % 4) as usize];
            let amount = 4 * C - step * C / 50;
            handles.push(tokio::task::spawn_blocking(move || pool.bid(who, amount)));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let status = h.service.status();
        assert_eq!(status.lowest_bid, 4 * C - 39 * C / 50);
        assert_eq!(status.winner, Some(D));
    }
}
