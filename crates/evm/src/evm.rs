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

//! Gas unit abstraction. The interpreter is generic over `Cost` so a host
//! can pick `usize` for speed on 64-bit targets with small budgets, or
//! `U256` when a gas budget might not fit in a machine word.

use ethereum_types::U256;
use std::{fmt, ops};
use vm;

/// Gas type usable by the interpreter's internal counters.
pub trait CostType:
    Sized
    + fmt::Debug
    + From<usize>
    + Copy
    + Clone
    + ops::Add<Output = Self>
    + ops::Sub<Output = Self>
    + ops::Mul<Output = Self>
    + ops::Div<Output = Self>
    + ops::Rem<Output = Self>
    + PartialOrd
    + Ord
    + Eq
{
    /// Converts this cost into a 256-bit word.
    fn as_u256(&self) -> U256;
    /// Tries to convert a 256-bit word into this cost; fails if it would not
    /// round-trip (used to reject a sub-call's "gas left" when it somehow
    /// exceeds what was provided).
    fn from_u256(val: U256) -> vm::Result<Self>;
    /// Returns the number of bits required to represent `self`, used by the
    /// EXP opcode's per-byte exponent surcharge.
    fn as_usize(&self) -> usize;
    /// Adds with overflow detection; overflow saturates to the maximum
    /// representable cost (which in turn triggers `OutOfGas` upstream).
    fn overflow_add(self, other: Self) -> (Self, bool);
    /// Multiplies with overflow detection.
    fn overflow_mul(self, other: Self) -> (Self, bool);
    /// Computes `(self * other) >> shr` with overflow detection on the
    /// multiplication (used by the quadratic memory-expansion formula).
    fn overflow_mul_shr(self, other: Self, shr: usize) -> (Self, bool);
}

impl CostType for U256 {
    fn as_u256(&self) -> U256 {
        *self
    }

    fn from_u256(val: U256) -> vm::Result<Self> {
        Ok(val)
    }

    fn as_usize(&self) -> usize {
        self.as_usize()
    }

    fn overflow_add(self, other: Self) -> (Self, bool) {
        self.overflowing_add(other)
    }

    fn overflow_mul(self, other: Self) -> (Self, bool) {
        self.overflowing_mul(other)
    }

    fn overflow_mul_shr(self, other: Self, shr: usize) -> (Self, bool) {
        let (c, o) = self.overflowing_mul(other);
        (c >> shr, o)
    }
}

impl CostType for usize {
    fn as_u256(&self) -> U256 {
        U256::from(*self)
    }

    fn from_u256(val: U256) -> vm::Result<Self> {
        if val <= U256::from(usize::max_value()) {
            Ok(val.as_usize())
        } else {
            Err(vm::Error::OutOfGas)
        }
    }

    fn as_usize(&self) -> usize {
        *self
    }

    fn overflow_add(self, other: Self) -> (Self, bool) {
        self.overflowing_add(other)
    }

    fn overflow_mul(self, other: Self) -> (Self, bool) {
        self.overflowing_mul(other)
    }

    fn overflow_mul_shr(self, other: Self, shr: usize) -> (Self, bool) {
        let (c, o) = self.overflowing_mul(other);
        (c >> shr, o)
    }
}
