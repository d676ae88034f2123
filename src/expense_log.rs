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

//! Append-only expense history.

use crate::base::ExpenseId;
use crate::expense::Expense;

/// Expenses in the order they were posted.
///
/// Entries are never removed or modified. Ids are assigned here, so the
/// `n`th expense always carries `ExpenseId(n)`.
#[derive(Debug, Default)]
pub(crate) struct ExpenseLog {
    expenses: Vec<Expense>,
}

impl ExpenseLog {
    /// Id the next appended expense will receive.
    pub fn next_id(&self) -> ExpenseId {
        ExpenseId(self.expenses.len() + 1)
    }

    /// Appends an expense built with [`next_id`](Self::next_id).
    pub fn push(&mut self, expense: Expense) {
        debug_assert_eq!(expense.id(), self.next_id(), "expense ids must be sequential");
        self.expenses.push(expense);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.iter()
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }
}
