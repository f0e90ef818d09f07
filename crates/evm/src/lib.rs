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

//! Rust EVM interpreter.
//!
//! Dispatches Ethereum bytecode, metering gas and deferring every effect
//! that leaves the current frame (storage persistence, balance transfers,
//! nested CALL/CREATE execution, precompiles) to the host via `vm::Ext`.

extern crate bit_set;
extern crate ethereum_types;
extern crate keccak_hash as hash;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate lru_cache;
extern crate num_bigint;
extern crate parity_bytes as bytes;
extern crate parity_util_mem as mem;
extern crate parking_lot;
extern crate vm;

#[cfg(test)]
extern crate rustc_hex;

mod evm;
mod factory;
mod instructions;
mod interpreter;
mod vmtype;

pub use evm::CostType;
pub use factory::Factory;
pub use interpreter::{Interpreter, SharedCache};
pub use vmtype::VMType;
