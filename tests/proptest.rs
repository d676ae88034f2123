// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Property-based tests for the ledger and settlement engine.
//!
//! These tests verify invariants that should hold for any sequence of
//! valid expenses.

use expense_splitter_rs::{Ledger, LedgerError, ParticipantName, settle};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;

const NAMES: [&str; 6] = ["Ana", "Ben", "Cai", "Dee", "Eli", "Fay"];

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// Generate a positive amount (0.01 to 10000.00).
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// An expense as (amount, payer index, split membership mask).
fn arb_expense() -> impl Strategy<Value = (Decimal, usize, Vec<bool>)> {
    (
        arb_amount(),
        0..NAMES.len(),
        prop::collection::vec(any::<bool>(), NAMES.len())
            .prop_filter("split must be non-empty", |mask| mask.iter().any(|m| *m)),
    )
}

/// Balances that sum to zero, built by pairing a credit with an equal debit.
fn arb_balanced() -> impl Strategy<Value = Vec<(ParticipantName, Decimal)>> {
    prop::collection::vec((0..NAMES.len(), 0..NAMES.len(), arb_amount()), 0..12).prop_map(
        |moves| {
            let mut balances: HashMap<&str, Decimal> =
                NAMES.iter().map(|n| (*n, Decimal::ZERO)).collect();
            for (from, to, amount) in moves {
                *balances.entry(NAMES[from]).or_default() -= amount;
                *balances.entry(NAMES[to]).or_default() += amount;
            }
            balances
                .into_iter()
                .map(|(name, balance)| (ParticipantName::new(name), balance))
                .collect()
        },
    )
}

fn ledger_with_all() -> Ledger {
    let ledger = Ledger::new();
    for name in NAMES {
        ledger.register_participant(name).unwrap();
    }
    ledger
}

fn post(ledger: &Ledger, (amount, payer, mask): &(Decimal, usize, Vec<bool>)) {
    let split: Vec<&str> = NAMES
        .iter()
        .zip(mask)
        .filter(|(_, included)| **included)
        .map(|(name, _)| *name)
        .collect();
    ledger
        .post_expense("generated", *amount, NAMES[*payer], &split)
        .unwrap();
}

// =============================================================================
// Ledger Invariant Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Balances sum to exactly zero after every posting.
    #[test]
    fn conservation_after_every_posting(
        expenses in prop::collection::vec(arb_expense(), 1..20),
    ) {
        let ledger = ledger_with_all();
        for expense in &expenses {
            post(&ledger, expense);
            prop_assert_eq!(ledger.total_balance(), Decimal::ZERO);
        }
        prop_assert_eq!(ledger.expense_count(), expenses.len());
    }

    /// Non-payer members owe exactly the rounded share; the payer is off by
    /// at most half a cent per member from the unrounded amount.
    #[test]
    fn payer_residue_is_bounded(expense in arb_expense()) {
        let ledger = ledger_with_all();
        post(&ledger, &expense);

        let (amount, payer, mask) = &expense;
        let members = mask.iter().filter(|m| **m).count();
        let count = Decimal::from(members);
        let payer_in_split = mask[*payer];
        let payer_balance = ledger.net_balance(NAMES[*payer]).unwrap();

        let exact_credit = if payer_in_split {
            *amount - *amount / count
        } else {
            *amount
        };
        let bound = Decimal::new(5, 3) * Decimal::from(members);
        prop_assert!((payer_balance - exact_credit).abs() <= bound);
    }

    /// A rejected posting never changes balances or history.
    #[test]
    fn rejected_posting_is_atomic(
        expenses in prop::collection::vec(arb_expense(), 0..5),
        amount in arb_amount(),
    ) {
        let ledger = ledger_with_all();
        for expense in &expenses {
            post(&ledger, expense);
        }
        let before: Vec<_> = ledger.balances().iter().map(|p| p.balance()).collect();

        let result = ledger.post_expense("bad", amount, NAMES[0], &[NAMES[1], "Nobody"]);

        prop_assert_eq!(
            result,
            Err(LedgerError::UnknownParticipant(ParticipantName::new("Nobody")))
        );
        let after: Vec<_> = ledger.balances().iter().map(|p| p.balance()).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(ledger.expense_count(), expenses.len());
    }
}

// =============================================================================
// Settlement Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Applying every transfer to the input balances zeroes them all.
    #[test]
    fn settlement_zeroes_balances(balances in arb_balanced()) {
        let plan = settle(balances.clone()).unwrap();

        let mut remaining: HashMap<ParticipantName, Decimal> = balances.into_iter().collect();
        for transfer in &plan {
            prop_assert!(transfer.amount() > Decimal::ZERO);
            *remaining.get_mut(transfer.debtor()).unwrap() += transfer.amount();
            *remaining.get_mut(transfer.creditor()).unwrap() -= transfer.amount();
        }
        prop_assert!(remaining.values().all(|b| b.is_zero()));
    }

    /// Greedy pairing never needs more than `nonzero - 1` transfers.
    #[test]
    fn settlement_transfer_count_is_bounded(balances in arb_balanced()) {
        let nonzero = balances.iter().filter(|(_, b)| !b.is_zero()).count();
        let plan = settle(balances).unwrap();
        prop_assert!(plan.len() <= nonzero.saturating_sub(1));
    }

    /// Debtors only pay and creditors only receive.
    #[test]
    fn settlement_respects_sides(balances in arb_balanced()) {
        let signs: HashMap<ParticipantName, Decimal> = balances.iter().cloned().collect();
        let plan = settle(balances).unwrap();
        for transfer in &plan {
            prop_assert!(signs[transfer.debtor()] < Decimal::ZERO);
            prop_assert!(signs[transfer.creditor()] > Decimal::ZERO);
        }
    }

    /// Any imbalance is surfaced instead of being dropped.
    #[test]
    fn imbalance_is_reported(balances in arb_balanced(), extra in arb_amount()) {
        let mut skewed = balances;
        skewed.push((ParticipantName::new("Extra"), extra));

        let result = settle(skewed);
        let is_residue = matches!(
            result,
            Err(LedgerError::RoundingResidue { amount, .. }) if amount == extra
        );
        prop_assert!(is_residue);
    }

    /// Ledger-driven plans settle the ledger completely.
    #[test]
    fn ledger_settle_up_zeroes_everyone(
        expenses in prop::collection::vec(arb_expense(), 1..15),
    ) {
        let ledger = ledger_with_all();
        for expense in &expenses {
            post(&ledger, expense);
        }

        ledger.settle_up().unwrap();

        prop_assert!(ledger.balances().iter().all(|p| p.balance().is_zero()));
    }
}
