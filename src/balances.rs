//! Balance derivation: a pure fold of the full expense history. Balances are
//! never stored; every call recomputes from the append-only log, so they can
//! never drift from it.

use crate::ledger::Ledger;
use crate::models::{Balance, Money};

/// Net balance per participant, in that participant's home currency, in
/// participant insertion order. Positive means the participant is owed money.
///
/// Every term comes from data frozen on the expense at creation time (shares
/// and payer credit); no rate is ever looked up here. Balances are not netted
/// across currencies — each stands alone in its owner's home currency.
pub fn compute_balances(ledger: &Ledger) -> Vec<Balance> {
    ledger
        .participants()
        .iter()
        .map(|participant| {
            let mut net = 0.0;
            for expense in ledger.expenses() {
                if expense.payer == participant.name {
                    net += expense.payer_credit.amount;
                }
                if let Some(share) = expense.shares.get(&participant.name) {
                    net -= share.amount;
                }
            }
            Balance {
                participant: participant.name.clone(),
                net: Money::new(net, participant.home_currency),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::*;
    use crate::ids::ExpenseId;
    use crate::models::{Currency, Expense};

    fn ledger_with_alice_and_bob() -> Ledger {
        let mut ledger = Ledger::default();
        ledger.add_participant("Alice", Currency::USD).unwrap();
        ledger.add_participant("Bob", Currency::EUR).unwrap();
        ledger
    }

    fn push_expense(
        ledger: &mut Ledger,
        payer: &str,
        shares: &[(&str, Money)],
        credit: Money,
    ) {
        let expense = Expense {
            id: ExpenseId::new(),
            amount: Money::new(100.0, ledger.trip_currency()),
            description: "test".to_string(),
            payer: payer.to_string(),
            split_with: shares.iter().map(|(n, _)| n.to_string()).collect(),
            shares: shares
                .iter()
                .map(|(n, m)| (n.to_string(), *m))
                .collect::<BTreeMap<_, _>>(),
            payer_credit: credit,
            created_at: Utc::now(),
        };
        ledger.append_expense(expense).unwrap();
    }

    #[test]
    fn empty_history_yields_zero_balances() {
        let ledger = ledger_with_alice_and_bob();
        let balances = compute_balances(&ledger);
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].participant, "Alice");
        assert_eq!(balances[0].net, Money::new(0.0, Currency::USD));
        assert_eq!(balances[1].participant, "Bob");
        assert_eq!(balances[1].net, Money::new(0.0, Currency::EUR));
    }

    #[test]
    fn payer_is_credited_and_splitters_are_debited() {
        let mut ledger = ledger_with_alice_and_bob();
        push_expense(
            &mut ledger,
            "Alice",
            &[
                ("Alice", Money::new(50.0, Currency::USD)),
                ("Bob", Money::new(45.0, Currency::EUR)),
            ],
            Money::new(100.0, Currency::USD),
        );

        let balances = compute_balances(&ledger);
        assert_eq!(balances[0].net, Money::new(50.0, Currency::USD));
        assert_eq!(balances[1].net, Money::new(-45.0, Currency::EUR));
    }

    #[test]
    fn self_paid_solo_expense_nets_to_zero() {
        let mut ledger = ledger_with_alice_and_bob();
        push_expense(
            &mut ledger,
            "Bob",
            &[("Bob", Money::new(40.5, Currency::EUR))],
            Money::new(40.5, Currency::EUR),
        );

        let balances = compute_balances(&ledger);
        assert!(balances[1].net.is_zero(crate::models::DISPLAY_EPSILON));
    }

    #[test]
    fn expenses_accumulate_across_the_history() {
        let mut ledger = ledger_with_alice_and_bob();
        push_expense(
            &mut ledger,
            "Alice",
            &[
                ("Alice", Money::new(50.0, Currency::USD)),
                ("Bob", Money::new(45.0, Currency::EUR)),
            ],
            Money::new(100.0, Currency::USD),
        );
        push_expense(
            &mut ledger,
            "Bob",
            &[("Bob", Money::new(40.5, Currency::EUR))],
            Money::new(40.5, Currency::EUR),
        );

        let balances = compute_balances(&ledger);
        assert_eq!(balances[0].net, Money::new(50.0, Currency::USD));
        assert_eq!(balances[1].net, Money::new(-45.0, Currency::EUR));
    }

    #[test]
    fn recomputation_is_idempotent() {
        let mut ledger = ledger_with_alice_and_bob();
        push_expense(
            &mut ledger,
            "Alice",
            &[("Bob", Money::new(90.0, Currency::EUR))],
            Money::new(100.0, Currency::USD),
        );
        assert_eq!(compute_balances(&ledger), compute_balances(&ledger));
    }
}
