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

//! Error types for ledger and settlement operations.

use crate::base::ParticipantName;
use rust_decimal::Decimal;
use thiserror::Error;

/// Ledger and settlement errors.
///
/// None of these are fatal: a failed operation leaves the ledger exactly as
/// it was, and the caller decides how to report it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A participant with this name is already registered
    #[error("{0} already exists")]
    DuplicateParticipant(ParticipantName),

    /// A payer, split member or transfer party is not registered
    #[error("{0} not found")]
    UnknownParticipant(ParticipantName),

    /// Participant name is empty after trimming
    #[error("participant name must not be blank")]
    InvalidName,

    /// The expense names no one to split the cost among
    #[error("no one to split the expense among")]
    EmptySplitSet,

    /// The same participant appears twice in one split list
    #[error("{0} is listed more than once in the split")]
    DuplicateSplitMember(ParticipantName),

    /// Amount is zero or negative at minor-unit precision
    #[error("invalid amount {0} (must be positive)")]
    NonPositiveAmount(Decimal),

    /// Amount carries more decimal places than the minor unit allows
    #[error("invalid amount {0} (finer than one cent)")]
    SubCentAmount(Decimal),

    /// Applying the change would push a balance out of the representable range
    #[error("balance of {0} would overflow")]
    AmountOverflow(ParticipantName),

    /// A transfer names the same participant on both sides
    #[error("{0} cannot pay themselves")]
    SelfTransfer(ParticipantName),

    /// Settlement ran out of counterparties with a balance still open
    #[error("settlement left {amount} unsettled for {participant}")]
    RoundingResidue {
        participant: ParticipantName,
        amount: Decimal,
    },
}
