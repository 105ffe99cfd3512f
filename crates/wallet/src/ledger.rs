use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paydesk_core::{Aggregate, AggregateRoot, TransactionId, WalletId};
use paydesk_events::Event;

use crate::amount::{ensure_positive, parse_amount};
use crate::config::{ConfigError, WalletConfig};
use crate::error::WalletError;
use crate::snapshot::WalletSnapshot;
use crate::transaction::Transaction;

/// Aggregate root: Ledger.
///
/// Owns the spendable balance, the operator's fee pool and the transaction
/// history (newest first). The only way to change any of them is a
/// [`WalletCommand`]; a rejected command leaves all three untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    id: WalletId,
    fee_rate: Decimal,
    balance: Decimal,
    accumulated_fees: Decimal,
    history: VecDeque<Transaction>,
    version: u64,
}

impl Ledger {
    /// Open a session ledger from `config`.
    ///
    /// With `seed_history` enabled the history starts with a deposit from one
    /// day before `now` and a withdrawal from two days before. They are
    /// demonstration entries only and do not move the seeded balance or fees.
    pub fn open(
        id: WalletId,
        config: &WalletConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut history = VecDeque::new();
        if config.seed_history {
            let seed_withdrawal = Decimal::from(2000);
            history.push_back(Transaction::deposit(
                TransactionId::new(),
                Decimal::from(5000),
                now - Duration::days(1),
            ));
            history.push_back(Transaction::withdrawal(
                TransactionId::new(),
                seed_withdrawal,
                seed_withdrawal * config.fee_rate,
                now - Duration::days(2),
            ));
        }

        Ok(Self {
            id,
            fee_rate: config.fee_rate,
            balance: config.seed_balance,
            accumulated_fees: Decimal::ZERO,
            history,
            version: 0,
        })
    }

    pub fn id_typed(&self) -> WalletId {
        self.id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn accumulated_fees(&self) -> Decimal {
        self.accumulated_fees
    }

    pub fn fee_rate(&self) -> Decimal {
        self.fee_rate
    }

    /// Transactions, newest first.
    pub fn history(&self) -> &VecDeque<Transaction> {
        &self.history
    }

    /// Display estimate of what a full withdrawal would pay out.
    ///
    /// Not a limit: [`Ledger::withdraw`] checks against the whole balance.
    pub fn available_for_withdrawal(&self) -> Decimal {
        self.balance * (Decimal::ONE - self.fee_rate)
    }

    /// `amount * fee_rate`, or `None` when the product has no exact `Decimal` form.
    pub fn fee_for(&self, amount: Decimal) -> Option<Decimal> {
        exact_product(amount, self.fee_rate)
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        WalletSnapshot {
            wallet_id: self.id,
            balance: self.balance,
            accumulated_fees: self.accumulated_fees,
            available_for_withdrawal: self.available_for_withdrawal(),
            fee_rate: self.fee_rate,
            version: self.version,
            transactions: self.history.iter().cloned().collect(),
        }
    }

    /// Top up the balance from raw user input.
    pub fn deposit(&mut self, raw_amount: &str) -> Result<Transaction, WalletError> {
        self.deposit_at(raw_amount, Utc::now())
    }

    pub fn deposit_at(
        &mut self,
        raw_amount: &str,
        occurred_at: DateTime<Utc>,
    ) -> Result<Transaction, WalletError> {
        let amount = parse_amount(raw_amount)?;
        self.record(&WalletCommand::Deposit(Deposit {
            transaction_id: TransactionId::new(),
            amount,
            occurred_at,
        }))
    }

    /// Withdraw a gross amount from raw user input; the fee is kept back.
    pub fn withdraw(&mut self, raw_amount: &str) -> Result<Transaction, WalletError> {
        self.withdraw_at(raw_amount, Utc::now())
    }

    pub fn withdraw_at(
        &mut self,
        raw_amount: &str,
        occurred_at: DateTime<Utc>,
    ) -> Result<Transaction, WalletError> {
        let amount = parse_amount(raw_amount)?;
        self.record(&WalletCommand::Withdraw(Withdraw {
            transaction_id: TransactionId::new(),
            amount,
            occurred_at,
        }))
    }

    /// Decide, apply and return the transaction the command produced.
    pub fn record(&mut self, command: &WalletCommand) -> Result<Transaction, WalletError> {
        let event = self.decide(command)?;
        self.apply(&event);
        Ok(event.transaction())
    }
}

/// Multiply without the rounding `Decimal` applies past 28 fractional digits.
fn exact_product(a: Decimal, b: Decimal) -> Option<Decimal> {
    let (a, b) = (a.normalize(), b.normalize());
    let mut mantissa = a.mantissa().checked_mul(b.mantissa())?;
    let mut scale = a.scale() + b.scale();
    while scale > 0 && mantissa % 10 == 0 {
        mantissa /= 10;
        scale -= 1;
    }
    Decimal::try_from_i128_with_scale(mantissa, scale).ok()
}

/// Add, refusing results `Decimal` would overflow or round.
fn exact_sum(a: Decimal, b: Decimal) -> Option<Decimal> {
    let (a, b) = (a.normalize(), b.normalize());
    let sum = a.checked_add(b)?;
    (sum.scale() >= a.scale().max(b.scale())).then_some(sum)
}

impl AggregateRoot for Ledger {
    type Id = WalletId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: Deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Withdraw (gross amount).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletCommand {
    Deposit(Deposit),
    Withdraw(Withdraw),
}

/// Event: FundsDeposited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsDeposited {
    pub wallet_id: WalletId,
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: FundsWithdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsWithdrawn {
    pub wallet_id: WalletId,
    pub transaction_id: TransactionId,
    /// Gross amount debited from the balance.
    pub amount: Decimal,
    /// Part of `amount` moved to the fee pool.
    pub fee: Decimal,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    FundsDeposited(FundsDeposited),
    FundsWithdrawn(FundsWithdrawn),
}

impl WalletEvent {
    /// History entry recorded when this event is applied.
    pub fn transaction(&self) -> Transaction {
        match self {
            WalletEvent::FundsDeposited(e) => {
                Transaction::deposit(e.transaction_id, e.amount, e.occurred_at)
            }
            WalletEvent::FundsWithdrawn(e) => {
                Transaction::withdrawal(e.transaction_id, e.amount, e.fee, e.occurred_at)
            }
        }
    }
}

impl Event for WalletEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WalletEvent::FundsDeposited(_) => "wallet.ledger.funds_deposited",
            WalletEvent::FundsWithdrawn(_) => "wallet.ledger.funds_withdrawn",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            WalletEvent::FundsDeposited(e) => e.occurred_at,
            WalletEvent::FundsWithdrawn(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Ledger {
    type Command = WalletCommand;
    type Event = WalletEvent;
    type Error = WalletError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            WalletEvent::FundsDeposited(e) => {
                self.balance += e.amount;
            }
            WalletEvent::FundsWithdrawn(e) => {
                self.balance -= e.amount;
                self.accumulated_fees += e.fee;
            }
        }
        self.history.push_front(event.transaction());

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        self.decide(command).map(|event| vec![event])
    }
}

impl Ledger {
    fn decide(&self, command: &WalletCommand) -> Result<WalletEvent, WalletError> {
        match command {
            WalletCommand::Deposit(cmd) => self.handle_deposit(cmd),
            WalletCommand::Withdraw(cmd) => self.handle_withdraw(cmd),
        }
    }

    fn handle_deposit(&self, cmd: &Deposit) -> Result<WalletEvent, WalletError> {
        ensure_positive(cmd.amount)?;

        // `apply` must reproduce this sum exactly: no overflow, no rounding.
        if exact_sum(self.balance, cmd.amount).is_none() {
            return Err(WalletError::invalid_amount(cmd.amount.to_string()));
        }

        Ok(WalletEvent::FundsDeposited(FundsDeposited {
            wallet_id: self.id,
            transaction_id: cmd.transaction_id,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        }))
    }

    fn handle_withdraw(&self, cmd: &Withdraw) -> Result<WalletEvent, WalletError> {
        ensure_positive(cmd.amount)?;

        // Gross comparison: the fee comes out of the requested amount.
        if cmd.amount > self.balance {
            return Err(WalletError::InsufficientFunds {
                balance: self.balance,
                requested: cmd.amount,
            });
        }

        let fee = self
            .fee_for(cmd.amount)
            .filter(|fee| exact_sum(self.accumulated_fees, *fee).is_some())
            .filter(|_| exact_sum(self.balance, -cmd.amount).is_some())
            .ok_or_else(|| WalletError::invalid_amount(cmd.amount.to_string()))?;

        Ok(WalletEvent::FundsWithdrawn(FundsWithdrawn {
            wallet_id: self.id,
            transaction_id: cmd.transaction_id,
            amount: cmd.amount,
            fee,
            occurred_at: cmd.occurred_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{TransactionKind, TransactionStatus, DEPOSIT_DESCRIPTION};
    use paydesk_core::Entity;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn ledger_with_balance(balance: &str) -> Ledger {
        let config = WalletConfig {
            seed_balance: dec(balance),
            seed_history: false,
            ..WalletConfig::default()
        };
        Ledger::open(WalletId::new(), &config, test_time()).unwrap()
    }

    #[test]
    fn opened_ledger_carries_seed_data() {
        let now = test_time();
        let ledger = Ledger::open(WalletId::new(), &WalletConfig::default(), now).unwrap();

        assert_eq!(ledger.balance(), dec("10000"));
        assert_eq!(ledger.accumulated_fees(), Decimal::ZERO);
        assert_eq!(ledger.version(), 0);

        let history: Vec<_> = ledger.history().iter().collect();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind(), TransactionKind::Deposit);
        assert_eq!(history[0].amount(), dec("5000"));
        assert_eq!(history[1].kind(), TransactionKind::Withdrawal);
        assert_eq!(history[1].fee(), Some(dec("200")));
        assert!(history[0].timestamp() > history[1].timestamp());
    }

    #[test]
    fn open_rejects_invalid_config() {
        let config = WalletConfig {
            fee_rate: dec("1.5"),
            ..WalletConfig::default()
        };
        let err = Ledger::open(WalletId::new(), &config, test_time()).unwrap_err();
        assert_eq!(err, ConfigError::FeeRateOutOfRange(dec("1.5")));
    }

    #[test]
    fn withdrawal_scenario_from_ten_thousand() {
        let mut ledger = ledger_with_balance("10000");

        let tx = ledger.withdraw("2000").unwrap();

        assert_eq!(ledger.balance(), dec("8000"));
        assert_eq!(tx.fee(), Some(dec("200")));
        assert_eq!(ledger.accumulated_fees(), dec("200"));
        assert_eq!(tx.net_amount(), dec("1800"));
        assert_eq!(tx.amount(), dec("2000"));
        assert_eq!(tx.kind(), TransactionKind::Withdrawal);
        assert_eq!(tx.status(), TransactionStatus::Completed);
        assert_eq!(ledger.history().front(), Some(&tx));
    }

    #[test]
    fn deposit_scenario_from_ten_thousand() {
        let mut ledger = ledger_with_balance("10000");

        let tx = ledger.deposit("5000").unwrap();

        assert_eq!(ledger.balance(), dec("15000"));
        assert_eq!(ledger.accumulated_fees(), Decimal::ZERO);
        assert_eq!(tx.fee(), None);
        assert_eq!(tx.description(), DEPOSIT_DESCRIPTION);
        assert_eq!(ledger.history().len(), 1);
    }

    #[test]
    fn withdrawing_exact_balance_drains_to_zero() {
        let mut ledger = ledger_with_balance("500");

        let tx = ledger.withdraw("500").unwrap();

        assert_eq!(ledger.balance(), Decimal::ZERO);
        assert_eq!(tx.fee(), Some(dec("50")));
    }

    #[test]
    fn withdrawing_a_cent_over_balance_is_rejected() {
        let mut ledger = ledger_with_balance("500");
        let before = ledger.clone();

        let err = ledger.withdraw("500.01").unwrap_err();

        assert_eq!(
            err,
            WalletError::InsufficientFunds {
                balance: dec("500"),
                requested: dec("500.01"),
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn display_hint_is_not_the_withdrawal_limit() {
        let mut ledger = ledger_with_balance("1000");
        assert_eq!(ledger.available_for_withdrawal(), dec("900"));

        ledger.withdraw("950").unwrap();

        assert_eq!(ledger.balance(), dec("50"));
        assert_eq!(ledger.accumulated_fees(), dec("95"));
    }

    #[test]
    fn invalid_input_leaves_state_unchanged() {
        let mut ledger = ledger_with_balance("10000");
        let before = ledger.clone();

        for raw in ["abc", "-5", "0", ""] {
            assert!(matches!(
                ledger.deposit(raw),
                Err(WalletError::InvalidAmount { .. })
            ));
            assert!(matches!(
                ledger.withdraw(raw),
                Err(WalletError::InvalidAmount { .. })
            ));
        }

        assert_eq!(ledger, before);
    }

    #[test]
    fn invalid_amount_is_checked_before_funds() {
        let mut ledger = ledger_with_balance("1");
        assert!(matches!(
            ledger.withdraw("-1"),
            Err(WalletError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn history_is_newest_first() {
        let mut ledger = ledger_with_balance("100");
        let first = ledger.deposit("1").unwrap();
        let second = ledger.withdraw("2").unwrap();
        let third = ledger.deposit("3").unwrap();

        let ids: Vec<_> = ledger.history().iter().map(|t| *t.id()).collect();
        assert_eq!(ids, vec![*third.id(), *second.id(), *first.id()]);
        assert_eq!(ledger.version(), 3);
    }

    #[test]
    fn reads_are_idempotent() {
        let mut ledger = ledger_with_balance("100");
        ledger.withdraw("10").unwrap();

        assert_eq!(ledger.snapshot(), ledger.snapshot());
        assert_eq!(ledger.balance(), ledger.balance());
        assert_eq!(ledger.history(), ledger.history());
    }

    #[test]
    fn handle_does_not_mutate() {
        let ledger = ledger_with_balance("100");
        let cmd = WalletCommand::Withdraw(Withdraw {
            transaction_id: TransactionId::new(),
            amount: dec("40"),
            occurred_at: test_time(),
        });

        let events = ledger.handle(&cmd).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(ledger.balance(), dec("100"));
        match &events[0] {
            WalletEvent::FundsWithdrawn(e) => {
                assert_eq!(e.fee, dec("4"));
                assert_eq!(e.wallet_id, ledger.id_typed());
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(events[0].event_type(), "wallet.ledger.funds_withdrawn");
    }

    #[test]
    fn execute_applies_what_handle_decides() {
        let mut ledger = ledger_with_balance("100");
        let cmd = WalletCommand::Deposit(Deposit {
            transaction_id: TransactionId::new(),
            amount: dec("25.5"),
            occurred_at: test_time(),
        });

        let events = ledger.execute(&cmd).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(ledger.balance(), dec("125.5"));
        assert_eq!(ledger.version(), 1);
    }

    #[test]
    fn commands_with_non_positive_amounts_are_rejected() {
        let mut ledger = ledger_with_balance("100");
        let cmd = WalletCommand::Deposit(Deposit {
            transaction_id: TransactionId::new(),
            amount: Decimal::ZERO,
            occurred_at: test_time(),
        });
        assert!(matches!(
            ledger.record(&cmd),
            Err(WalletError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn deposit_that_would_overflow_is_rejected() {
        let mut ledger = ledger_with_balance("1");
        let before = ledger.clone();
        let cmd = WalletCommand::Deposit(Deposit {
            transaction_id: TransactionId::new(),
            amount: Decimal::MAX,
            occurred_at: test_time(),
        });

        assert!(matches!(
            ledger.record(&cmd),
            Err(WalletError::InvalidAmount { .. })
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn withdrawal_whose_fee_would_round_is_rejected() {
        let mut ledger = ledger_with_balance("1");
        let before = ledger.clone();

        let err = ledger.withdraw("0.0000000000000000000000000005").unwrap_err();

        assert!(matches!(err, WalletError::InvalidAmount { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn tiny_withdrawal_keeps_exact_fee() {
        let mut ledger = ledger_with_balance("1");

        let tx = ledger.withdraw("0.000000000000000000000000001").unwrap();

        let fee = tx.fee().unwrap();
        assert_eq!(fee, dec("0.0000000000000000000000000001"));
        assert_eq!(fee * Decimal::from(10), tx.amount());
        assert_eq!(ledger.accumulated_fees(), fee);
    }

    #[test]
    fn operations_that_would_round_the_balance_are_rejected() {
        let mut ledger = ledger_with_balance("10000000000");
        let before = ledger.clone();

        assert!(matches!(
            ledger.deposit("0.0000000000000000000000000001"),
            Err(WalletError::InvalidAmount { .. })
        ));
        assert!(matches!(
            ledger.withdraw("0.000000000000000000000000001"),
            Err(WalletError::InvalidAmount { .. })
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn fee_keeps_trailing_zero_products_exact() {
        let config = WalletConfig {
            fee_rate: dec("0.2"),
            seed_balance: Decimal::ONE,
            seed_history: false,
        };
        let ledger = Ledger::open(WalletId::new(), &config, test_time()).unwrap();

        assert_eq!(
            ledger.fee_for(dec("0.0000000000000000000000000005")),
            Some(dec("0.0000000000000000000000000001"))
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        Deposit(i64),
        Withdraw(i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1i64..1_000_000i64).prop_map(Op::Deposit),
            (1i64..2_000_000i64).prop_map(Op::Withdraw),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: every accepted operation moves balance and fee pool by
        /// exactly its amount and fee, every rejected one moves nothing, and
        /// money is conserved across the user/fee split.
        #[test]
        fn operations_conserve_money(
            seed_cents in 1i64..1_000_000i64,
            ops in prop::collection::vec(op_strategy(), 1..40)
        ) {
            let seed = Decimal::new(seed_cents, 2);
            let config = WalletConfig {
                seed_balance: seed,
                seed_history: false,
                ..WalletConfig::default()
            };
            let mut ledger = Ledger::open(WalletId::new(), &config, test_time()).unwrap();

            let mut deposited = Decimal::ZERO;
            let mut paid_out = Decimal::ZERO;

            for op in ops {
                let before = ledger.clone();
                match op {
                    Op::Deposit(cents) => {
                        let amount = Decimal::new(cents, 2);
                        let tx = ledger.deposit(&amount.to_string()).unwrap();
                        prop_assert_eq!(ledger.balance(), before.balance() + amount);
                        prop_assert_eq!(ledger.accumulated_fees(), before.accumulated_fees());
                        prop_assert_eq!(tx.fee(), None);
                        deposited += amount;
                    }
                    Op::Withdraw(cents) => {
                        let amount = Decimal::new(cents, 2);
                        match ledger.withdraw(&amount.to_string()) {
                            Ok(tx) => {
                                let fee = amount * dec("0.10");
                                prop_assert!(amount <= before.balance());
                                prop_assert_eq!(tx.fee(), Some(fee));
                                prop_assert_eq!(ledger.balance(), before.balance() - amount);
                                prop_assert_eq!(
                                    ledger.accumulated_fees(),
                                    before.accumulated_fees() + fee
                                );
                                paid_out += tx.net_amount();
                            }
                            Err(WalletError::InsufficientFunds { .. }) => {
                                prop_assert!(amount > before.balance());
                                prop_assert_eq!(&ledger, &before);
                            }
                            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
                        }
                    }
                }

                prop_assert!(ledger.balance() >= Decimal::ZERO);
                prop_assert_eq!(
                    ledger.balance() + ledger.accumulated_fees() + paid_out,
                    seed + deposited
                );
            }
        }
    }
}
