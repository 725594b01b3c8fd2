//! # Reentrant Recipient Attacks
//!
//! A recipient whose funds-received hook calls back into the pool while the
//! outer transfer is still in flight. The pool debits before paying, so
//! every nested attempt sees what is left after the first payout.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use parking_lot::Mutex;
    use rosca_pool::{
        Address, Amount, CurrencyAdapter, CurrencyError, FundsRecipient, RoscaApi, RoscaError,
        WinnerSelection, WithdrawalReceipt,
    };
    use std::sync::{Arc, OnceLock};

    /// Re-enters `withdraw` up to `depth` times from inside its own payout.
    struct DrainingRecipient {
        pool: OnceLock<Service>,
        me: Address,
        depth: usize,
        attempts: Mutex<Vec<Result<WithdrawalReceipt, RoscaError>>>,
    }

    impl DrainingRecipient {
        fn install(h: &Harness, me: Address, depth: usize) -> Arc<Self> {
            let attacker = Arc::new(Self {
                pool: OnceLock::new(),
                me,
                depth,
                attempts: Mutex::new(Vec::new()),
            });
            let _ = attacker.pool.set(h.service.clone());
            h.currency.register_recipient(me, attacker.clone());
            attacker
        }
    }

    impl FundsRecipient for DrainingRecipient {
        fn on_funds_received(&self, _amount: Amount) -> bool {
            let Some(pool) = self.pool.get() else {
                return true;
            };
            if self.attempts.lock().len() >= self.depth {
                return true;
            }
            // Lock released before re-entering so deeper hooks can record.
            let slot = {
                let mut attempts = self.attempts.lock();
                attempts.push(Err(RoscaError::NothingToRetrieve));
                attempts.len() - 1
            };
            let result = pool.withdraw(self.me);
            self.attempts.lock()[slot] = result;
            true
        }
    }

    #[test]
    fn test_nested_withdraw_pays_once() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        h.service.contribute(D, 5 * C).unwrap();
        h.service.contribute(B, 5 * C).unwrap();
        let attacker = DrainingRecipient::install(&h, D, 3);

        let receipt = h.service.withdraw(D).unwrap();
        assert_eq!(receipt.sent, 5 * C);

        let attempts = attacker.attempts.lock();
        assert_eq!(attempts.len(), 1);
        assert!(matches!(
            attempts[0],
            Err(RoscaError::NothingToWithdraw { entitlement: 0 })
        ));
        drop(attempts);

        // Exactly one entitlement left the pool; B's funds are untouched.
        assert_eq!(h.currency.wallet_balance(D), WALLET);
        assert_eq!(h.currency.balance_of_pool(), 5 * C);
        assert_eq!(h.service.participant_balance(B), 5 * C as i128);
        assert!(h.service.audit().holds());
    }

    #[test]
    fn test_nested_withdraw_after_winning() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        for who in [A, B, CM, D] {
            h.service.contribute(who, 2 * C).unwrap();
        }
        h.at_boundary(0);
        h.service.start_round().unwrap();
        h.service.bid(D, 3 * C).unwrap();
        h.at_boundary(1);
        h.service.start_round().unwrap();

        let attacker = DrainingRecipient::install(&h, D, 2);
        let entitlement = h.service.participant_balance(D);
        assert!(entitlement > 0);

        let receipt = h.service.withdraw(D).unwrap();
        assert_eq!(receipt.sent as i128, entitlement);
        assert_eq!(h.service.participant_balance(D), 0);
        assert!(matches!(
            attacker.attempts.lock()[0],
            Err(RoscaError::NothingToWithdraw { .. })
        ));
        assert!(h.service.audit().holds());
    }

    /// Accepts the first payout, re-enters, then rejects the outer transfer.
    struct RejectAfterReentry {
        pool: OnceLock<Service>,
        me: Address,
        nested: Mutex<Option<Result<WithdrawalReceipt, RoscaError>>>,
    }

    impl FundsRecipient for RejectAfterReentry {
        fn on_funds_received(&self, _amount: Amount) -> bool {
            if let Some(pool) = self.pool.get() {
                let result = pool.withdraw(self.me);
                *self.nested.lock() = Some(result);
            }
            false
        }
    }

    #[test]
    fn test_rejected_transfer_after_reentry_restores_credit() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        h.service.contribute(CM, 3 * C).unwrap();
        let attacker = Arc::new(RejectAfterReentry {
            pool: OnceLock::new(),
            me: CM,
            nested: Mutex::new(None),
        });
        let _ = attacker.pool.set(h.service.clone());
        h.currency.register_recipient(CM, attacker.clone());

        assert_eq!(
            h.service.withdraw(CM),
            Err(RoscaError::TransferFailed {
                to: CM,
                amount: 3 * C
            })
        );
        assert!(matches!(
            *attacker.nested.lock(),
            Some(Err(RoscaError::NothingToWithdraw { entitlement: 0 }))
        ));
        assert_eq!(h.service.participant_balance(CM), 3 * C as i128);
        assert_eq!(h.currency.balance_of_pool(), 3 * C);
        assert_eq!(h.currency.wallet_balance(CM), WALLET - 3 * C);
        assert!(h.service.audit().holds());
    }

    /// Re-contributes the incoming payout, then refuses it. Once.
    struct RecontributeThenRefuse {
        pool: OnceLock<Service>,
        me: Address,
        nested: Mutex<Option<Result<(), RoscaError>>>,
    }

    impl FundsRecipient for RecontributeThenRefuse {
        fn on_funds_received(&self, amount: Amount) -> bool {
            let mut nested = self.nested.lock();
            if nested.is_some() {
                return true;
            }
            let Some(pool) = self.pool.get() else {
                return true;
            };
            *nested = Some(pool.contribute(self.me, amount));
            false
        }
    }

    #[test]
    fn test_refused_payout_cannot_be_recontributed() {
        let h = Harness::four_members(WinnerSelection::Bidding);
        h.service.contribute(CM, WALLET).unwrap();
        assert_eq!(h.currency.wallet_balance(CM), 0);

        let attacker = Arc::new(RecontributeThenRefuse {
            pool: OnceLock::new(),
            me: CM,
            nested: Mutex::new(None),
        });
        let _ = attacker.pool.set(h.service.clone());
        h.currency.register_recipient(CM, attacker.clone());

        assert_eq!(
            h.service.withdraw(CM),
            Err(RoscaError::TransferFailed {
                to: CM,
                amount: WALLET
            })
        );
        // The refused payout never reached the wallet, so it could not be spent.
        assert!(matches!(
            *attacker.nested.lock(),
            Some(Err(RoscaError::Currency(CurrencyError::InsufficientFunds { .. })))
        ));
        assert_eq!(h.currency.balance_of_pool(), WALLET);
        assert_eq!(h.service.participant_balance(CM), WALLET as i128);
        assert!(h.service.audit().holds());

        let receipt = h.service.withdraw(CM).unwrap();
        assert_eq!(receipt.sent, WALLET);
        assert_eq!(h.currency.wallet_balance(CM), WALLET);
        assert_eq!(h.currency.balance_of_pool(), 0);
        assert!(h.service.audit().holds());
    }
}
