//! # Randomized Ledger Properties
//!
//! Seeded random operation sequences against a five-member pool. After
//! every call, successful or not, the conservation audit must hold; within
//! a round the lowest bid may only fall.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rosca_pool::{
        Address, Amount, BidOutcome, RoscaApi, RoscaParamsBuilder, WinnerSelection,
    };

    const E: Address = Address::new([0xE5; 20]);
    const MEMBERS: [Address; 5] = [A, B, CM, D, E];

    fn harness() -> Harness {
        let params = RoscaParamsBuilder::new(A, C, START, ENABLER)
            .members(vec![B, CM, D, E])
            .fee_in_thousandths(15)
            .build();
        let h = Harness::new(params);
        h.currency.mint(E, WALLET);
        h
    }

    fn run(seed: u64, steps: usize) {
        let h = harness();
        let pool = &h.service;
        let pot: Amount = 5 * C;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut round = (pool.status().current_round, false);
        let mut lowest = pool.status().lowest_bid;
        let mut boundary = 0u64;

        for _ in 0..steps {
            let who = MEMBERS[rng.gen_range(0..MEMBERS.len())];
            match rng.gen_range(0..10) {
                0..=3 => {
                    let _ = pool.contribute(who, rng.gen_range(C / 2..=2 * C));
                }
                4..=5 => {
                    let amount = rng.gen_range(pot * 60 / 100..=pot + C / 10);
                    if let Ok(BidOutcome::NewLowest) = pool.bid(who, amount) {
                        assert!(amount < lowest);
                    }
                }
                6..=7 => {
                    if let Ok(receipt) = pool.withdraw(who) {
                        assert!(receipt.sent > 0);
                        assert!(receipt.sent <= receipt.entitlement);
                    }
                }
                _ => {
                    h.at_boundary(boundary);
                    if pool.start_round().is_ok() {
                        boundary += 1;
                    }
                }
            }

            let status = pool.status();
            let now_round = (status.current_round, status.end_of_life);
            if now_round == round {
                assert!(status.lowest_bid <= lowest, "lowest bid rose within a round");
            }
            round = now_round;
            lowest = status.lowest_bid;

            let report = pool.audit();
            assert!(report.holds(), "seed {seed}: {report:?}");

            let winners = status.members.iter().filter(|m| m.record.has_won).count();
            assert!(winners <= status.current_round as usize);
        }
    }

    #[test]
    fn test_conservation_holds_under_random_operations() {
        for seed in 0..16 {
            run(seed, 400);
        }
    }

    #[test]
    fn test_pool_reaches_end_of_life_under_random_operations() {
        let h = harness();
        let pool = &h.service;
        let mut rng = StdRng::seed_from_u64(0x5EED);

        for boundary in 0..=5u64 {
            for _ in 0..10 {
                let who = MEMBERS[rng.gen_range(0..MEMBERS.len())];
                let _ = pool.contribute(who, rng.gen_range(C..=3 * C));
                let _ = pool.bid(who, rng.gen_range(13 * C / 4..=5 * C));
                assert!(pool.audit().holds());
            }
            h.at_boundary(boundary);
            pool.start_round().unwrap();
        }

        assert!(pool.status().end_of_life);
        for who in MEMBERS {
            let _ = pool.withdraw(who);
            assert!(pool.audit().holds());
        }
    }
}
