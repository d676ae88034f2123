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

//! Participants and their net balances.
//!
//! A positive balance means the group owes the participant money; a negative
//! balance means the participant owes the group.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use expense_splitter_rs::{BalanceStatus, Participant, ParticipantName};
//!
//! let participant = Participant::new(ParticipantName::new("Alice"));
//! assert_eq!(participant.balance(), dec!(0.00));
//! assert_eq!(participant.status(), BalanceStatus::Settled);
//! ```

use crate::base::{ParticipantName, round_money};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Where a participant stands, with the absolute amount involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceStatus {
    /// The group owes this participant the amount.
    Owed(Decimal),
    /// This participant owes the group the amount.
    Owes(Decimal),
    Settled,
}

impl BalanceStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Owed(_) => "owed",
            Self::Owes(_) => "owes",
            Self::Settled => "settled",
        }
    }
}

/// A member of the group with a running net balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    name: ParticipantName,
    balance: Decimal,
}

impl Participant {
    pub fn new(name: ParticipantName) -> Self {
        Self {
            name,
            balance: Decimal::ZERO,
        }
    }

    pub fn name(&self) -> &ParticipantName {
        &self.name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn status(&self) -> BalanceStatus {
        if self.balance > Decimal::ZERO {
            BalanceStatus::Owed(self.balance)
        } else if self.balance < Decimal::ZERO {
            BalanceStatus::Owes(self.balance.abs())
        } else {
            BalanceStatus::Settled
        }
    }

    /// Balance after moving `delta`, or `None` if it would overflow.
    ///
    /// A positive `delta` means the group owes this participant more.
    pub(crate) fn checked_balance(&self, delta: Decimal) -> Option<Decimal> {
        self.balance.checked_add(delta)
    }

    pub(crate) fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}

impl Serialize for Participant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Participant", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("balance", &round_money(self.balance))?;
        state.serialize_field("status", self.status().label())?;
        state.end()
    }
}
