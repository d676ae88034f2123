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

//! Core identifier types and money helpers.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Number of decimal places in the currency's minor unit (cents).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Rounds `value` to the minor unit using round-half-up.
///
/// Half-up here means midpoints move away from zero, so `0.005` becomes
/// `0.01` and `-0.005` becomes `-0.01`. The result always carries exactly
/// [`MINOR_UNIT_SCALE`] decimal places, so `5` becomes `5.00`.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MINOR_UNIT_SCALE);
    rounded
}

/// Unique, case-sensitive name of a participant.
///
/// The name is the participant's identity: two participants can never share
/// one, and `"alice"` and `"Alice"` are different people.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ParticipantName(String);

impl ParticipantName {
    /// Creates a name from already-trimmed input.
    ///
    /// Use [`ParticipantName::parse`] for raw user input.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Trims surrounding whitespace, returning `None` for a blank name.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ParticipantName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Sequential identifier of a posted expense.
///
/// Starts at 1 and follows insertion order, so it doubles as the display
/// number of the expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ExpenseId(pub usize);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round_money_is_half_up() {
        assert_eq!(round_money(dec!(0.005)), dec!(0.01));
        assert_eq!(round_money(dec!(0.015)), dec!(0.02));
        assert_eq!(round_money(dec!(0.025)), dec!(0.03));
        assert_eq!(round_money(dec!(33.333333)), dec!(33.33));
        assert_eq!(round_money(dec!(16.665)), dec!(16.67));
    }

    #[test]
    fn round_money_negative_midpoint_moves_away_from_zero() {
        assert_eq!(round_money(dec!(-0.005)), dec!(-0.01));
        assert_eq!(round_money(dec!(-2.344)), dec!(-2.34));
    }

    #[test]
    fn round_money_pads_scale() {
        assert_eq!(round_money(dec!(5)).to_string(), "5.00");
        assert_eq!(round_money(dec!(10.5)).to_string(), "10.50");
    }

    #[test]
    fn parse_trims_and_rejects_blank() {
        assert_eq!(ParticipantName::parse("  Alice "), Some(ParticipantName::new("Alice")));
        assert_eq!(ParticipantName::parse("   "), None);
        assert_eq!(ParticipantName::parse(""), None);
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_ne!(ParticipantName::new("alice"), ParticipantName::new("Alice"));
    }

    #[test]
    fn display_formats() {
        assert_eq!(ParticipantName::new("Bob").to_string(), "Bob");
        assert_eq!(ExpenseId(7).to_string(), "7");
    }
}
