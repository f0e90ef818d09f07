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

//! Block/transaction context visible to opcode handlers. Populated by the
//! host (out of scope here); the core only ever reads it.

use ethereum_types::{Address, H256, U256};
use std::sync::Arc;

/// Information concerning the execution environment for a message-call/
/// create frame, as provided by the enclosing block and transaction.
#[derive(Debug, Clone)]
pub struct EnvInfo {
    /// The block number.
    pub number: u64,
    /// The block author (COINBASE).
    pub author: Address,
    /// The block timestamp.
    pub timestamp: u64,
    /// The block difficulty, read by DIFFICULTY pre-Merge.
    pub difficulty: U256,
    /// PREVRANDAO, read by the same opcode (0x44) from the Merge onward
    /// (EIP-4399).
    pub prevrandao: H256,
    /// The block gas limit.
    pub gas_limit: U256,
    /// The last 256 block hashes, most recent first; `last_hashes[0]` is the
    /// parent of the currently executing block. Backs BLOCKHASH.
    pub last_hashes: Arc<Vec<H256>>,
    /// EIP-1559 base fee, present from London onward.
    pub base_fee: Option<U256>,
    /// EIP-4844 blob base fee, present from Cancun onward.
    pub blob_base_fee: Option<U256>,
    /// EIP-4844 per-transaction blob versioned hashes, indexed by BLOBHASH.
    pub blob_hashes: Vec<H256>,
}

impl Default for EnvInfo {
    fn default() -> Self {
        EnvInfo {
            number: 0,
            author: Address::zero(),
            timestamp: 0,
            difficulty: U256::zero(),
            prevrandao: H256::zero(),
            gas_limit: U256::zero(),
            last_hashes: Arc::new(Vec::new()),
            base_fee: None,
            blob_base_fee: None,
            blob_hashes: Vec::new(),
        }
    }
}
