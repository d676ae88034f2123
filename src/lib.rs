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

//! # Expense Splitter
//!
//! This library tracks shared expenses within a group and works out who
//! should pay whom to settle up.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Participants, expense history and running balances
//! - [`Expense`]: An immutable record of who paid what, split among whom
//! - [`settle`]: Greedy settlement engine producing [`Transfer`]s
//! - [`LedgerError`]: Error types for rejected operations
//!
//! All money is [`rust_decimal::Decimal`] at cent precision; shares are
//! rounded half-up.
//!
//! ## Example
//!
//! ```
//! use expense_splitter_rs::Ledger;
//! use rust_decimal_macros::dec;
//!
//! let ledger = Ledger::new();
//! for name in ["A", "B", "C"] {
//!     ledger.register_participant(name).unwrap();
//! }
//!
//! // Split a dinner three ways
//! let expense = ledger
//!     .post_expense("Dinner", dec!(100.00), "A", &["A", "B", "C"])
//!     .unwrap();
//! assert_eq!(expense.share_per_person(), dec!(33.33));
//! assert_eq!(ledger.net_balance("A").unwrap(), dec!(66.66));
//! assert_eq!(ledger.net_balance("B").unwrap(), dec!(-33.33));
//!
//! // Work out who pays whom
//! let plan = ledger.settlement_plan().unwrap();
//! assert_eq!(plan.len(), 2);
//! ```
//!
//! ## Thread Safety
//!
//! A [`Ledger`] serializes every operation behind one lock and can be shared
//! across threads with an `Arc`.

mod base;
pub mod error;
mod expense;
mod expense_log;
mod ledger;
mod participant;
pub mod settlement;

pub use base::{ExpenseId, MINOR_UNIT_SCALE, ParticipantName, round_money};
pub use error::LedgerError;
pub use expense::Expense;
pub use ledger::Ledger;
pub use participant::{BalanceStatus, Participant};
pub use settlement::{Transfer, settle};
