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

//! EVM instruction set.

/// Gas fee tier, indexing `Schedule::tier_step_gas`.
pub mod tier {
    pub const ZERO: usize = 0;
    pub const BASE: usize = 1;
    pub const VERY_LOW: usize = 2;
    pub const LOW: usize = 3;
    pub const MID: usize = 4;
    pub const HIGH: usize = 5;
    pub const EXT: usize = 6;
    pub const SPECIAL: usize = 7;
}

/// Information about a particular instruction that does not depend on
/// hardfork or context.
#[derive(Debug, Clone, Copy)]
pub struct InstructionInfo {
    /// Mnemonic, for errors and tracing.
    pub name: &'static str,
    /// Number of stack items the instruction pops.
    pub args: usize,
    /// Number of stack items the instruction pushes.
    pub ret: usize,
    /// Base gas tier, looked up in `Schedule::tier_step_gas`.
    pub tier: usize,
}

impl InstructionInfo {
    fn new(name: &'static str, args: usize, ret: usize, tier: usize) -> Self {
        InstructionInfo {
            name,
            args,
            ret,
            tier,
        }
    }
}

macro_rules! instructions {
    ($( $op:expr => $variant:ident, $name:expr, $args:expr, $ret:expr, $tier:expr; )*) => {
        /// A single EVM opcode.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Instruction {
            $( $variant = $op, )*
        }

        pub use self::Instruction::*;

        impl Instruction {
            /// Decode an opcode byte, returning `None` for unassigned opcodes.
            pub fn from_u8(opcode: u8) -> Option<Instruction> {
                match opcode {
                    $( $op => Some(Instruction::$variant), )*
                    _ => None,
                }
            }

            /// Static information about this instruction.
            pub fn info(&self) -> &'static InstructionInfo {
                match *self {
                    $( Instruction::$variant => {
                        const INFO: InstructionInfo = InstructionInfo {
                            name: $name,
                            args: $args,
                            ret: $ret,
                            tier: $tier,
                        };
                        &INFO
                    } )*
                }
            }
        }
    }
}

instructions! {
    0x00 => STOP, "STOP", 0, 0, tier::ZERO;
    0x01 => ADD, "ADD", 2, 1, tier::VERY_LOW;
    0x02 => MUL, "MUL", 2, 1, tier::LOW;
    0x03 => SUB, "SUB", 2, 1, tier::VERY_LOW;
    0x04 => DIV, "DIV", 2, 1, tier::LOW;
    0x05 => SDIV, "SDIV", 2, 1, tier::LOW;
    0x06 => MOD, "MOD", 2, 1, tier::LOW;
    0x07 => SMOD, "SMOD", 2, 1, tier::LOW;
    0x08 => ADDMOD, "ADDMOD", 3, 1, tier::MID;
    0x09 => MULMOD, "MULMOD", 3, 1, tier::MID;
    0x0a => EXP, "EXP", 2, 1, tier::SPECIAL;
    0x0b => SIGNEXTEND, "SIGNEXTEND", 2, 1, tier::LOW;
    0x10 => LT, "LT", 2, 1, tier::VERY_LOW;
    0x11 => GT, "GT", 2, 1, tier::VERY_LOW;
    0x12 => SLT, "SLT", 2, 1, tier::VERY_LOW;
    0x13 => SGT, "SGT", 2, 1, tier::VERY_LOW;
    0x14 => EQ, "EQ", 2, 1, tier::VERY_LOW;
    0x15 => ISZERO, "ISZERO", 1, 1, tier::VERY_LOW;
    0x16 => AND, "AND", 2, 1, tier::VERY_LOW;
    0x17 => OR, "OR", 2, 1, tier::VERY_LOW;
    0x18 => XOR, "XOR", 2, 1, tier::VERY_LOW;
    0x19 => NOT, "NOT", 1, 1, tier::VERY_LOW;
    0x1a => BYTE, "BYTE", 2, 1, tier::VERY_LOW;
    0x1b => SHL, "SHL", 2, 1, tier::VERY_LOW;
    0x1c => SHR, "SHR", 2, 1, tier::VERY_LOW;
    0x1d => SAR, "SAR", 2, 1, tier::VERY_LOW;
    0x20 => SHA3, "SHA3", 2, 1, tier::SPECIAL;
    0x30 => ADDRESS, "ADDRESS", 0, 1, tier::BASE;
    0x31 => BALANCE, "BALANCE", 1, 1, tier::SPECIAL;
    0x32 => ORIGIN, "ORIGIN", 0, 1, tier::BASE;
    0x33 => CALLER, "CALLER", 0, 1, tier::BASE;
    0x34 => CALLVALUE, "CALLVALUE", 0, 1, tier::BASE;
    0x35 => CALLDATALOAD, "CALLDATALOAD", 1, 1, tier::VERY_LOW;
    0x36 => CALLDATASIZE, "CALLDATASIZE", 0, 1, tier::BASE;
    0x37 => CALLDATACOPY, "CALLDATACOPY", 3, 0, tier::VERY_LOW;
    0x38 => CODESIZE, "CODESIZE", 0, 1, tier::BASE;
    0x39 => CODECOPY, "CODECOPY", 3, 0, tier::VERY_LOW;
    0x3a => GASPRICE, "GASPRICE", 0, 1, tier::BASE;
    0x3b => EXTCODESIZE, "EXTCODESIZE", 1, 1, tier::SPECIAL;
    0x3c => EXTCODECOPY, "EXTCODECOPY", 4, 0, tier::SPECIAL;
    0x3d => RETURNDATASIZE, "RETURNDATASIZE", 0, 1, tier::BASE;
    0x3e => RETURNDATACOPY, "RETURNDATACOPY", 3, 0, tier::VERY_LOW;
    0x3f => EXTCODEHASH, "EXTCODEHASH", 1, 1, tier::SPECIAL;
    0x40 => BLOCKHASH, "BLOCKHASH", 1, 1, tier::EXT;
    0x41 => COINBASE, "COINBASE", 0, 1, tier::BASE;
    0x42 => TIMESTAMP, "TIMESTAMP", 0, 1, tier::BASE;
    0x43 => NUMBER, "NUMBER", 0, 1, tier::BASE;
    0x44 => DIFFICULTY, "DIFFICULTY", 0, 1, tier::BASE;
    0x45 => GASLIMIT, "GASLIMIT", 0, 1, tier::BASE;
    0x46 => CHAINID, "CHAINID", 0, 1, tier::BASE;
    0x47 => SELFBALANCE, "SELFBALANCE", 0, 1, tier::LOW;
    0x48 => BASEFEE, "BASEFEE", 0, 1, tier::BASE;
    0x49 => BLOBHASH, "BLOBHASH", 1, 1, tier::VERY_LOW;
    0x4a => BLOBBASEFEE, "BLOBBASEFEE", 0, 1, tier::BASE;
    0x50 => POP, "POP", 1, 0, tier::BASE;
    0x51 => MLOAD, "MLOAD", 1, 1, tier::VERY_LOW;
    0x52 => MSTORE, "MSTORE", 2, 0, tier::VERY_LOW;
    0x53 => MSTORE8, "MSTORE8", 2, 0, tier::VERY_LOW;
    0x54 => SLOAD, "SLOAD", 1, 1, tier::SPECIAL;
    0x55 => SSTORE, "SSTORE", 2, 0, tier::SPECIAL;
    0x56 => JUMP, "JUMP", 1, 0, tier::MID;
    0x57 => JUMPI, "JUMPI", 2, 0, tier::HIGH;
    0x58 => PC, "PC", 0, 1, tier::BASE;
    0x59 => MSIZE, "MSIZE", 0, 1, tier::BASE;
    0x5a => GAS, "GAS", 0, 1, tier::BASE;
    0x5b => JUMPDEST, "JUMPDEST", 0, 0, tier::SPECIAL;
    0x5c => TLOAD, "TLOAD", 1, 1, tier::SPECIAL;
    0x5d => TSTORE, "TSTORE", 2, 0, tier::SPECIAL;
    0x5e => MCOPY, "MCOPY", 3, 0, tier::VERY_LOW;
    0x5f => PUSH0, "PUSH0", 0, 1, tier::BASE;
    0x60 => PUSH1, "PUSH1", 0, 1, tier::VERY_LOW;
    0x61 => PUSH2, "PUSH2", 0, 1, tier::VERY_LOW;
    0x62 => PUSH3, "PUSH3", 0, 1, tier::VERY_LOW;
    0x63 => PUSH4, "PUSH4", 0, 1, tier::VERY_LOW;
    0x64 => PUSH5, "PUSH5", 0, 1, tier::VERY_LOW;
    0x65 => PUSH6, "PUSH6", 0, 1, tier::VERY_LOW;
    0x66 => PUSH7, "PUSH7", 0, 1, tier::VERY_LOW;
    0x67 => PUSH8, "PUSH8", 0, 1, tier::VERY_LOW;
    0x68 => PUSH9, "PUSH9", 0, 1, tier::VERY_LOW;
    0x69 => PUSH10, "PUSH10", 0, 1, tier::VERY_LOW;
    0x6a => PUSH11, "PUSH11", 0, 1, tier::VERY_LOW;
    0x6b => PUSH12, "PUSH12", 0, 1, tier::VERY_LOW;
    0x6c => PUSH13, "PUSH13", 0, 1, tier::VERY_LOW;
    0x6d => PUSH14, "PUSH14", 0, 1, tier::VERY_LOW;
    0x6e => PUSH15, "PUSH15", 0, 1, tier::VERY_LOW;
    0x6f => PUSH16, "PUSH16", 0, 1, tier::VERY_LOW;
    0x70 => PUSH17, "PUSH17", 0, 1, tier::VERY_LOW;
    0x71 => PUSH18, "PUSH18", 0, 1, tier::VERY_LOW;
    0x72 => PUSH19, "PUSH19", 0, 1, tier::VERY_LOW;
    0x73 => PUSH20, "PUSH20", 0, 1, tier::VERY_LOW;
    0x74 => PUSH21, "PUSH21", 0, 1, tier::VERY_LOW;
    0x75 => PUSH22, "PUSH22", 0, 1, tier::VERY_LOW;
    0x76 => PUSH23, "PUSH23", 0, 1, tier::VERY_LOW;
    0x77 => PUSH24, "PUSH24", 0, 1, tier::VERY_LOW;
    0x78 => PUSH25, "PUSH25", 0, 1, tier::VERY_LOW;
    0x79 => PUSH26, "PUSH26", 0, 1, tier::VERY_LOW;
    0x7a => PUSH27, "PUSH27", 0, 1, tier::VERY_LOW;
    0x7b => PUSH28, "PUSH28", 0, 1, tier::VERY_LOW;
    0x7c => PUSH29, "PUSH29", 0, 1, tier::VERY_LOW;
    0x7d => PUSH30, "PUSH30", 0, 1, tier::VERY_LOW;
    0x7e => PUSH31, "PUSH31", 0, 1, tier::VERY_LOW;
    0x7f => PUSH32, "PUSH32", 0, 1, tier::VERY_LOW;
    0x80 => DUP1, "DUP1", 1, 2, tier::VERY_LOW;
    0x81 => DUP2, "DUP2", 2, 3, tier::VERY_LOW;
    0x82 => DUP3, "DUP3", 3, 4, tier::VERY_LOW;
    0x83 => DUP4, "DUP4", 4, 5, tier::VERY_LOW;
    0x84 => DUP5, "DUP5", 5, 6, tier::VERY_LOW;
    0x85 => DUP6, "DUP6", 6, 7, tier::VERY_LOW;
    0x86 => DUP7, "DUP7", 7, 8, tier::VERY_LOW;
    0x87 => DUP8, "DUP8", 8, 9, tier::VERY_LOW;
    0x88 => DUP9, "DUP9", 9, 10, tier::VERY_LOW;
    0x89 => DUP10, "DUP10", 10, 11, tier::VERY_LOW;
    0x8a => DUP11, "DUP11", 11, 12, tier::VERY_LOW;
    0x8b => DUP12, "DUP12", 12, 13, tier::VERY_LOW;
    0x8c => DUP13, "DUP13", 13, 14, tier::VERY_LOW;
    0x8d => DUP14, "DUP14", 14, 15, tier::VERY_LOW;
    0x8e => DUP15, "DUP15", 15, 16, tier::VERY_LOW;
    0x8f => DUP16, "DUP16", 16, 17, tier::VERY_LOW;
    0x90 => SWAP1, "SWAP1", 2, 2, tier::VERY_LOW;
    0x91 => SWAP2, "SWAP2", 3, 3, tier::VERY_LOW;
    0x92 => SWAP3, "SWAP3", 4, 4, tier::VERY_LOW;
    0x93 => SWAP4, "SWAP4", 5, 5, tier::VERY_LOW;
    0x94 => SWAP5, "SWAP5", 6, 6, tier::VERY_LOW;
    0x95 => SWAP6, "SWAP6", 7, 7, tier::VERY_LOW;
    0x96 => SWAP7, "SWAP7", 8, 8, tier::VERY_LOW;
    0x97 => SWAP8, "SWAP8", 9, 9, tier::VERY_LOW;
    0x98 => SWAP9, "SWAP9", 10, 10, tier::VERY_LOW;
    0x99 => SWAP10, "SWAP10", 11, 11, tier::VERY_LOW;
    0x9a => SWAP11, "SWAP11", 12, 12, tier::VERY_LOW;
    0x9b => SWAP12, "SWAP12", 13, 13, tier::VERY_LOW;
    0x9c => SWAP13, "SWAP13", 14, 14, tier::VERY_LOW;
    0x9d => SWAP14, "SWAP14", 15, 15, tier::VERY_LOW;
    0x9e => SWAP15, "SWAP15", 16, 16, tier::VERY_LOW;
    0x9f => SWAP16, "SWAP16", 17, 17, tier::VERY_LOW;
    0xa0 => LOG0, "LOG0", 2, 0, tier::SPECIAL;
    0xa1 => LOG1, "LOG1", 3, 0, tier::SPECIAL;
    0xa2 => LOG2, "LOG2", 4, 0, tier::SPECIAL;
    0xa3 => LOG3, "LOG3", 5, 0, tier::SPECIAL;
    0xa4 => LOG4, "LOG4", 6, 0, tier::SPECIAL;
    0xf0 => CREATE, "CREATE", 3, 1, tier::SPECIAL;
    0xf1 => CALL, "CALL", 7, 1, tier::SPECIAL;
    0xf2 => CALLCODE, "CALLCODE", 7, 1, tier::SPECIAL;
    0xf3 => RETURN, "RETURN", 2, 0, tier::ZERO;
    0xf4 => DELEGATECALL, "DELEGATECALL", 6, 1, tier::SPECIAL;
    0xf5 => CREATE2, "CREATE2", 4, 1, tier::SPECIAL;
    0xfa => STATICCALL, "STATICCALL", 6, 1, tier::SPECIAL;
    0xfd => REVERT, "REVERT", 2, 0, tier::ZERO;
    0xff => SUICIDE, "SUICIDE", 1, 0, tier::SPECIAL;
    0xb0 => BEGINSUB, "BEGINSUB", 0, 0, tier::BASE;
    0xb1 => JUMPSUB, "JUMPSUB", 1, 0, tier::LOW;
    0xb2 => RETURNSUB, "RETURNSUB", 0, 0, tier::LOW;
}

impl Instruction {
    /// Returns the number of immediate bytes following a `PUSH1..PUSH32`
    /// opcode, `None` otherwise.
    pub fn push_bytes(&self) -> Option<usize> {
        let op = *self as u8;
        if (PUSH1 as u8..=PUSH32 as u8).contains(&op) {
            Some((op - PUSH1 as u8 + 1) as usize)
        } else {
            None
        }
    }

    /// Returns the stack depth a `DUP1..DUP16` duplicates from (0-indexed
    /// from the top), `None` otherwise.
    pub fn dup_position(&self) -> Option<usize> {
        let op = *self as u8;
        if (DUP1 as u8..=DUP16 as u8).contains(&op) {
            Some((op - DUP1 as u8) as usize)
        } else {
            None
        }
    }

    /// Returns the stack depth a `SWAP1..SWAP16` swaps with the top
    /// against (0-indexed, so SWAP1 is position 1), `None` otherwise.
    pub fn swap_position(&self) -> Option<usize> {
        let op = *self as u8;
        if (SWAP1 as u8..=SWAP16 as u8).contains(&op) {
            Some((op - SWAP1 as u8 + 1) as usize)
        } else {
            None
        }
    }

    /// Returns the number of topics a `LOG0..LOG4` instruction takes,
    /// `None` otherwise.
    pub fn log_topics(&self) -> Option<usize> {
        let op = *self as u8;
        if (LOG0 as u8..=LOG4 as u8).contains(&op) {
            Some((op - LOG0 as u8) as usize)
        } else {
            None
        }
    }
}
