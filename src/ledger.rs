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

//! Shared-expense ledger.
//!
//! The [`Ledger`] owns the group's participants and the history of posted
//! expenses, and keeps every participant's net balance up to date as expenses
//! are posted.
//!
//! # Posting
//!
//! An expense of `amount` paid by `payer` and split among `n` participants
//! has a share of `amount / n`, rounded half-up to cents. Every split member
//! other than the payer owes that share; the payer is credited exactly what
//! the others owe. When the amount does not divide evenly the payer carries
//! the leftover cent(s) in their own effective share, so balances always sum
//! to exactly zero:
//!
//! | Expense | Share | A | B | C |
//! |---------|-------|---|---|---|
//! | 100.00 paid by A, split A/B/C | 33.33 | +66.66 | -33.33 | -33.33 |
//! | 100.00 paid by A, split B/C/D | 33.33 | +99.99 | -33.33 | -33.33 |
//!
//! A payer outside the split is credited only what the members owe, so in the
//! second row A is left out of pocket by the 0.01 residue even though A is not
//! part of the expense.
//!
//! # Settlement
//!
//! [`Ledger::settlement_plan`] is advisory: it computes transfers from a
//! snapshot and never touches stored balances. Committing a plan is a separate
//! step, either [`Ledger::apply_settlement`] or [`Ledger::settle_up`].
//!
//! # Thread Safety
//!
//! All state sits behind a single [`Mutex`], so each operation (including the
//! snapshot a settlement plan is computed from) observes a consistent ledger.

use crate::base::{ParticipantName, round_money};
use crate::error::LedgerError;
use crate::expense::Expense;
use crate::expense_log::ExpenseLog;
use crate::participant::Participant;
use crate::settlement::{Transfer, settle};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

#[derive(Debug, Default)]
struct LedgerState {
    /// Participants keyed by name; iteration is ordered by name.
    participants: BTreeMap<ParticipantName, Participant>,
    expenses: ExpenseLog,
}

impl LedgerState {
    fn assert_invariants(&self) {
        debug_assert!(
            self.total_balance().is_zero(),
            "Invariant violated: balances sum to {}",
            self.total_balance()
        );
    }

    fn total_balance(&self) -> Decimal {
        self.participants.values().map(Participant::balance).sum()
    }

    /// Resolves raw input to a registered participant's name.
    fn resolve(&self, raw: &str) -> Result<ParticipantName, LedgerError> {
        ParticipantName::parse(raw)
            .filter(|name| self.participants.contains_key(name))
            .ok_or_else(|| LedgerError::UnknownParticipant(ParticipantName::new(raw.trim())))
    }

    fn participant_mut(&mut self, name: &ParticipantName) -> Result<&mut Participant, LedgerError> {
        self.participants
            .get_mut(name)
            .ok_or_else(|| LedgerError::UnknownParticipant(name.clone()))
    }

    fn register(&mut self, raw: &str) -> Result<Participant, LedgerError> {
        let name = ParticipantName::parse(raw).ok_or(LedgerError::InvalidName)?;
        if self.participants.contains_key(&name) {
            return Err(LedgerError::DuplicateParticipant(name));
        }
        let participant = Participant::new(name.clone());
        self.participants.insert(name, participant.clone());
        Ok(participant)
    }

    /// Validates an expense without touching any balance.
    fn build_expense(
        &self,
        description: &str,
        amount: Decimal,
        paid_by: &str,
        split_among: &[&str],
    ) -> Result<Expense, LedgerError> {
        let quantized = round_money(amount);
        if quantized <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount));
        }

        let payer = self.resolve(paid_by)?;

        if split_among.is_empty() {
            return Err(LedgerError::EmptySplitSet);
        }
        let mut seen = HashSet::with_capacity(split_among.len());
        let mut members = Vec::with_capacity(split_among.len());
        for raw in split_among {
            let member = self.resolve(raw)?;
            if !seen.insert(member.clone()) {
                return Err(LedgerError::DuplicateSplitMember(member));
            }
            members.push(member);
        }

        Ok(Expense::new(
            self.expenses.next_id(),
            description.trim().to_owned(),
            quantized,
            payer,
            members,
        ))
    }

    /// Computes the balances a batch of moves would leave, without touching
    /// any participant. A name may appear more than once.
    fn stage<'a>(
        &self,
        moves: impl IntoIterator<Item = (&'a ParticipantName, Decimal)>,
    ) -> Result<BTreeMap<ParticipantName, Decimal>, LedgerError> {
        let mut staged: BTreeMap<ParticipantName, Decimal> = BTreeMap::new();
        for (name, delta) in moves {
            let next = match staged.get(name) {
                Some(balance) => balance.checked_add(delta),
                None => self
                    .participants
                    .get(name)
                    .ok_or_else(|| LedgerError::UnknownParticipant(name.clone()))?
                    .checked_balance(delta),
            }
            .ok_or_else(|| LedgerError::AmountOverflow(name.clone()))?;
            staged.insert(name.clone(), next);
        }
        Ok(staged)
    }

    fn commit(&mut self, staged: BTreeMap<ParticipantName, Decimal>) -> Result<(), LedgerError> {
        for (name, balance) in staged {
            self.participant_mut(&name)?.set_balance(balance);
        }
        self.assert_invariants();
        Ok(())
    }

    fn post(&mut self, expense: Expense) -> Result<(), LedgerError> {
        let share = expense.share_per_person();
        let moves = expense
            .debtors()
            .map(|debtor| (debtor, -share))
            .chain(std::iter::once((expense.paid_by(), expense.payer_credit())));
        let staged = self.stage(moves)?;
        self.commit(staged)?;
        self.expenses.push(expense);
        Ok(())
    }

    fn validate_transfers(&self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        for transfer in transfers {
            if transfer.amount() <= Decimal::ZERO {
                return Err(LedgerError::NonPositiveAmount(transfer.amount()));
            }
            if round_money(transfer.amount()) != transfer.amount() {
                return Err(LedgerError::SubCentAmount(transfer.amount()));
            }
            if transfer.debtor() == transfer.creditor() {
                return Err(LedgerError::SelfTransfer(transfer.debtor().clone()));
            }
            for name in [transfer.debtor(), transfer.creditor()] {
                if !self.participants.contains_key(name) {
                    return Err(LedgerError::UnknownParticipant(name.clone()));
                }
            }
        }
        Ok(())
    }

    /// Moves money along already-validated transfers. Nothing changes unless
    /// every resulting balance is representable.
    fn apply_transfers(&mut self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        let moves = transfers.iter().flat_map(|transfer| {
            [
                (transfer.debtor(), transfer.amount()),
                (transfer.creditor(), -transfer.amount()),
            ]
        });
        let staged = self.stage(moves)?;
        self.commit(staged)
    }

    fn plan(&self) -> Result<Vec<Transfer>, LedgerError> {
        settle(
            self.participants
                .values()
                .map(|p| (p.name().clone(), p.balance())),
        )
    }
}

/// A group's participants, expense history and running balances.
///
/// # Invariants
///
/// - Participant names are unique; participants are never removed.
/// - Expenses are append-only and numbered in posting order.
/// - Balances sum to exactly zero after every committed operation.
/// - A failed operation leaves balances and history untouched.
#[derive(Debug, Default)]
pub struct Ledger {
    inner: Mutex<LedgerState>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a participant with a zero balance.
    ///
    /// Surrounding whitespace is trimmed from `name`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidName`] - `name` is blank.
    /// - [`LedgerError::DuplicateParticipant`] - `name` is already registered.
    pub fn register_participant(&self, name: &str) -> Result<Participant, LedgerError> {
        let participant = self.inner.lock().register(name)?;
        debug!(participant = %participant.name(), "participant registered");
        Ok(participant)
    }

    /// Posts an expense and updates every involved balance.
    ///
    /// The amount is quantized to cents (half-up) before use. All inputs are
    /// validated before anything changes, so on error the ledger is exactly as
    /// it was.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NonPositiveAmount`] - `amount` is zero or negative at cent precision.
    /// - [`LedgerError::UnknownParticipant`] - payer or a split member is not registered.
    /// - [`LedgerError::EmptySplitSet`] - `split_among` is empty.
    /// - [`LedgerError::DuplicateSplitMember`] - a split member is named twice.
    /// - [`LedgerError::AmountOverflow`] - a resulting balance would be out of range.
    pub fn post_expense(
        &self,
        description: &str,
        amount: Decimal,
        paid_by: &str,
        split_among: &[&str],
    ) -> Result<Expense, LedgerError> {
        let mut state = self.inner.lock();
        let expense = state.build_expense(description, amount, paid_by, split_among)?;
        state.post(expense.clone())?;
        debug!(
            id = %expense.id(),
            amount = %expense.amount(),
            paid_by = %expense.paid_by(),
            split = expense.split_among().len(),
            share = %expense.share_per_person(),
            "expense posted"
        );
        Ok(expense)
    }

    /// Posted expenses in posting order.
    pub fn expenses(&self) -> Vec<Expense> {
        self.inner.lock().expenses.iter().cloned().collect()
    }

    pub fn expense_count(&self) -> usize {
        self.inner.lock().expenses.len()
    }

    /// Current balance of `name`: positive when owed, negative when owing.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownParticipant`] if `name` is not registered.
    pub fn net_balance(&self, name: &str) -> Result<Decimal, LedgerError> {
        let state = self.inner.lock();
        let name = state.resolve(name)?;
        state
            .participants
            .get(&name)
            .map(Participant::balance)
            .ok_or(LedgerError::UnknownParticipant(name))
    }

    /// Returns a copy of the participant, or `None` if not registered.
    pub fn participant(&self, name: &str) -> Option<Participant> {
        self.inner.lock().participants.get(name.trim()).cloned()
    }

    /// Snapshot of every participant, ordered by name.
    pub fn balances(&self) -> Vec<Participant> {
        self.inner.lock().participants.values().cloned().collect()
    }

    /// Sum of all balances. Zero unless the conservation invariant is broken.
    pub fn total_balance(&self) -> Decimal {
        self.inner.lock().total_balance()
    }

    pub fn participant_count(&self) -> usize {
        self.inner.lock().participants.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().participants.contains_key(name.trim())
    }

    /// Computes transfers that would settle every balance.
    ///
    /// Read-only: stored balances are not changed. See [`settle`] for the
    /// algorithm.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RoundingResidue`] if balances do not sum to zero.
    pub fn settlement_plan(&self) -> Result<Vec<Transfer>, LedgerError> {
        self.inner.lock().plan()
    }

    /// Commits transfers into the stored balances.
    ///
    /// Each transfer raises the debtor's balance and lowers the creditor's by
    /// the same amount. Every transfer is validated before any is applied.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NonPositiveAmount`] - a transfer amount is zero or negative.
    /// - [`LedgerError::SubCentAmount`] - a transfer amount is finer than one cent.
    /// - [`LedgerError::AmountOverflow`] - a resulting balance would be out of range.
    /// - [`LedgerError::SelfTransfer`] - a transfer names the same participant twice.
    /// - [`LedgerError::UnknownParticipant`] - a transfer names someone not registered.
    pub fn apply_settlement(&self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        let mut state = self.inner.lock();
        state.validate_transfers(transfers)?;
        state.apply_transfers(transfers)?;
        debug!(transfers = transfers.len(), "settlement applied");
        Ok(())
    }

    /// Computes a settlement plan and commits it under one lock.
    ///
    /// Returns the committed transfers; afterwards every balance is zero.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RoundingResidue`] if balances do not sum to zero. Nothing
    /// is committed in that case.
    pub fn settle_up(&self) -> Result<Vec<Transfer>, LedgerError> {
        let mut state = self.inner.lock();
        let plan = state.plan()?;
        state.apply_transfers(&plan)?;
        debug!(transfers = plan.len(), "group settled up");
        Ok(plan)
    }
}
