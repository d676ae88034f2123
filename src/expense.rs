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

//! Expense records.
//!
//! An [`Expense`] is immutable once posted. Corrections are made by posting
//! another expense, never by editing one in place.

use crate::base::{ExpenseId, ParticipantName, round_money};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    id: ExpenseId,
    description: String,
    amount: Decimal,
    paid_by: ParticipantName,
    split_among: Vec<ParticipantName>,
}

impl Expense {
    /// Builds an expense record.
    ///
    /// Callers are expected to have validated the inputs: `amount` positive at
    /// minor-unit precision and `split_among` non-empty with no repeats.
    pub(crate) fn new(
        id: ExpenseId,
        description: String,
        amount: Decimal,
        paid_by: ParticipantName,
        split_among: Vec<ParticipantName>,
    ) -> Self {
        debug_assert!(!split_among.is_empty(), "expense split set must not be empty");
        Self {
            id,
            description,
            amount,
            paid_by,
            split_among,
        }
    }

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn paid_by(&self) -> &ParticipantName {
        &self.paid_by
    }

    pub fn split_among(&self) -> &[ParticipantName] {
        &self.split_among
    }

    /// `amount / |split_among|`, rounded half-up to the minor unit.
    pub fn share_per_person(&self) -> Decimal {
        round_money(self.amount / Decimal::from(self.split_among.len()))
    }

    /// Amount owed to the payer by the other split members.
    ///
    /// Each non-payer owes exactly [`share_per_person`](Self::share_per_person),
    /// so the payer is credited `share * others` and carries any rounding
    /// residue in their own effective share.
    pub fn payer_credit(&self) -> Decimal {
        self.share_per_person() * Decimal::from(self.debtors().count())
    }

    /// The payer's own effective share: what the payer paid but is not
    /// reimbursed for.
    ///
    /// This is non-zero even for a payer outside the split whenever the amount
    /// does not divide evenly: `10.00` split among three others leaves the
    /// payer `0.01` out of pocket.
    pub fn payer_share(&self) -> Decimal {
        self.amount - self.payer_credit()
    }

    /// Split members who owe the payer their share.
    pub fn debtors(&self) -> impl Iterator<Item = &ParticipantName> {
        self.split_among
            .iter()
            .filter(move |name| **name != self.paid_by)
    }
}
