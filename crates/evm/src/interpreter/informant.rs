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

//! Per-step debug logging, compiled out unless the `evm-debug` feature is
//! enabled (it walks the stack and formats every instruction, which is far
//! too slow to leave on by default).

/// Runs `$x` only when built with `--features evm-debug`.
macro_rules! evm_debug {
    ($x: expr) => {
        #[cfg(feature = "evm-debug")]
        {
            $x
        }
    };
}

use evm::CostType;
use instructions::{Instruction, InstructionInfo};

/// Tracks depth for indentation when `evm-debug` logging is on; a no-op
/// shell otherwise.
pub struct EvmInformant {
    #[cfg_attr(not(feature = "evm-debug"), allow(dead_code))]
    depth: usize,
}

impl EvmInformant {
    /// Creates an informant for a frame at the given call depth.
    pub fn new(depth: usize) -> Self {
        EvmInformant { depth }
    }

    #[cfg(feature = "evm-debug")]
    pub fn before_instruction<Cost: CostType, S: ::std::fmt::Debug>(
        &mut self,
        pc: usize,
        instruction: Instruction,
        info: &InstructionInfo,
        current_gas: &Cost,
        stack: &S,
    ) {
        println!(
            "{}[{}] {} (gas: {:?})\n  stack: {:?}",
            "  ".repeat(self.depth),
            pc,
            info.name,
            current_gas,
            stack
        );
        let _ = instruction;
    }

    #[cfg(feature = "evm-debug")]
    pub fn after_instruction(&mut self, _instruction: Instruction) {}

    /// Marks the frame as finished.
    pub fn done(&mut self) {}
}
