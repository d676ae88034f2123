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

//! Settlement engine.
//!
//! [`settle`] turns a set of net balances into point-to-point transfers that
//! bring every balance to zero. It is a greedy largest-first matching:
//!
//! 1. Split the group into creditors (balance > 0) and debtors (balance < 0).
//!    Settled participants take no part.
//! 2. Order creditors by balance, largest first, and debtors by debt, largest
//!    first. Equal balances are ordered by name.
//! 3. Repeatedly pair the head creditor with the head debtor, transfer the
//!    smaller of the two open amounts and move past whoever reached zero.
//!
//! This produces at most `creditors + debtors - 1` transfers but is not
//! guaranteed to find the minimum transfer count; that problem is NP-hard in
//! general.
//!
//! # Example
//!
//! ```
//! use expense_splitter_rs::{ParticipantName, settle};
//! use rust_decimal_macros::dec;
//!
//! let balances = vec![
//!     (ParticipantName::new("A"), dec!(30)),
//!     (ParticipantName::new("B"), dec!(10)),
//!     (ParticipantName::new("C"), dec!(-25)),
//!     (ParticipantName::new("D"), dec!(-15)),
//! ];
//!
//! let plan = settle(balances).unwrap();
//! assert_eq!(plan.len(), 3);
//! assert_eq!(plan[0].debtor().as_str(), "C");
//! assert_eq!(plan[0].creditor().as_str(), "A");
//! assert_eq!(plan[0].amount(), dec!(25));
//! ```

use crate::base::ParticipantName;
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// A single settlement instruction: `debtor` pays `creditor` `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    #[serde(rename = "from")]
    debtor: ParticipantName,
    #[serde(rename = "to")]
    creditor: ParticipantName,
    amount: Decimal,
}

impl Transfer {
    pub fn new(debtor: ParticipantName, creditor: ParticipantName, amount: Decimal) -> Self {
        Self {
            debtor,
            creditor,
            amount,
        }
    }

    pub fn debtor(&self) -> &ParticipantName {
        &self.debtor
    }

    pub fn creditor(&self) -> &ParticipantName {
        &self.creditor
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// One side of the matching with the amount still open, always positive.
#[derive(Debug)]
struct Position {
    name: ParticipantName,
    open: Decimal,
}

/// Largest open amount first, then by name.
fn by_open_amount_desc(a: &Position, b: &Position) -> Ordering {
    b.open.cmp(&a.open).then_with(|| a.name.cmp(&b.name))
}

/// Computes a settlement plan for the given net balances.
///
/// Returns an empty plan when every balance is zero.
///
/// # Errors
///
/// [`LedgerError::RoundingResidue`] if the balances do not sum to zero, so one
/// side runs out of counterparties while the other still has money open. The
/// error names the first participant left open and the total amount left
/// unsettled, signed like a balance (positive when creditors are still owed).
pub fn settle<I>(balances: I) -> Result<Vec<Transfer>, LedgerError>
where
    I: IntoIterator<Item = (ParticipantName, Decimal)>,
{
    let mut creditors = Vec::new();
    let mut debtors = Vec::new();
    for (name, balance) in balances {
        match balance.cmp(&Decimal::ZERO) {
            Ordering::Greater => creditors.push(Position { name, open: balance }),
            Ordering::Less => debtors.push(Position {
                name,
                open: -balance,
            }),
            Ordering::Equal => {}
        }
    }

    if creditors.is_empty() && debtors.is_empty() {
        debug!("all balances settled, no transfers needed");
        return Ok(Vec::new());
    }

    creditors.sort_by(by_open_amount_desc);
    debtors.sort_by(by_open_amount_desc);

    let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
    let (mut i, mut j) = (0, 0);
    while i < creditors.len() && j < debtors.len() {
        let creditor = &mut creditors[i];
        let debtor = &mut debtors[j];

        let amount = creditor.open.min(debtor.open);
        creditor.open -= amount;
        debtor.open -= amount;
        transfers.push(Transfer::new(
            debtor.name.clone(),
            creditor.name.clone(),
            amount,
        ));

        // min() zeroes at least one side, so every step advances a cursor
        if creditor.open.is_zero() {
            i += 1;
        }
        if debtor.open.is_zero() {
            j += 1;
        }
    }

    let owed: Decimal = creditors[i..].iter().map(|p| p.open).sum();
    let owing: Decimal = debtors[j..].iter().map(|p| p.open).sum();
    let leftover = creditors[i..].first().or(debtors[j..].first());
    if let Some(position) = leftover {
        let residue = owed - owing;
        warn!(
            participant = %position.name,
            %residue,
            transfers = transfers.len(),
            "settlement left a balance open"
        );
        return Err(LedgerError::RoundingResidue {
            participant: position.name.clone(),
            amount: residue,
        });
    }

    debug!(
        creditors = creditors.len(),
        debtors = debtors.len(),
        transfers = transfers.len(),
        "settlement plan computed"
    );
    Ok(transfers)
}
