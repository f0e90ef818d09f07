// Copyright 2015-2020 Parity Technologies (UK) Ltd.
// This file is part of OpenEthereum.

// OpenEthereum is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// OpenEthereum is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with OpenEthereum.  If not, see <http://www.gnu.org/licenses/>.

//! Ordered hardfork identifiers and the `Schedule` each one selects.

use schedule::Schedule;

/// A named point in Ethereum protocol history. Ordered so that
/// `fork.is_at_least(other)` / `fork.is_before(other)` answer opcode and gas
/// gating questions without a chain of fork-specific booleans at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fork {
    Frontier,
    Homestead,
    TangerineWhistle,
    SpuriousDragon,
    Byzantium,
    Constantinople,
    Istanbul,
    Berlin,
    London,
    Merge,
    Shanghai,
    Cancun,
}

impl Fork {
    /// True if `self` is `other` or later in protocol history.
    pub fn is_at_least(&self, other: Fork) -> bool {
        *self >= other
    }

    /// True if `self` comes strictly before `other`.
    pub fn is_before(&self, other: Fork) -> bool {
        *self < other
    }

    /// The cost schedule mandated for this fork.
    ///
    /// Built by layering the teacher's per-fork schedule constructors; each
    /// fork only flips the handful of fields the corresponding EIPs touch,
    /// same as `Schedule::new_berlin`/`new_london` already do.
    pub fn schedule(&self) -> Schedule {
        match *self {
            Fork::Frontier => Schedule::new_frontier(),
            Fork::Homestead => Schedule::new_homestead(),
            Fork::TangerineWhistle => Schedule::new_post_eip150(24576, false, false, false),
            Fork::SpuriousDragon => Schedule::new_post_eip150(24576, true, true, true),
            Fork::Byzantium => Schedule::new_byzantium(),
            Fork::Constantinople => Schedule::new_constantinople(),
            Fork::Istanbul => Schedule::new_istanbul(),
            Fork::Berlin => Schedule::new_berlin(),
            Fork::London => Schedule::new_london(),
            Fork::Merge => Schedule::new_merge(),
            Fork::Shanghai => Schedule::new_shanghai(),
            Fork::Cancun => Schedule::new_cancun(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Fork;

    #[test]
    fn orders_forks_by_history() {
        assert!(Fork::Cancun.is_at_least(Fork::Shanghai));
        assert!(Fork::Frontier.is_before(Fork::Homestead));
        assert!(!Fork::Istanbul.is_at_least(Fork::Berlin));
        assert!(Fork::Berlin.is_at_least(Fork::Berlin));
    }
}
