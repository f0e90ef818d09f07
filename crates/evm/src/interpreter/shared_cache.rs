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

//! Jump-destination analysis, cached per code hash so a contract invoked
//! many times in a block only pays for the linear scan once.

use bit_set::BitSet;
use ethereum_types::H256;
use instructions;
use lru_cache::LruCache;
use parking_lot::Mutex;
use std::sync::Arc;

const DEFAULT_CACHE_SIZE: usize = 4096;

/// LRU cache of valid-jumpdest / valid-subentry bitmaps, keyed by code hash.
pub struct SharedCache {
    jump_destinations: Mutex<LruCache<H256, (Arc<BitSet>, Arc<BitSet>)>>,
}

impl SharedCache {
    /// Create a default-sized cache.
    pub fn new() -> Self {
        SharedCache::with_capacity(DEFAULT_CACHE_SIZE)
    }

    /// Create a cache holding at most `cache_size` entries.
    pub fn with_capacity(cache_size: usize) -> Self {
        SharedCache {
            jump_destinations: Mutex::new(LruCache::new(cache_size)),
        }
    }

    /// Returns (and caches, if not already cached) the valid-JUMPDEST and
    /// valid-subroutine-entry bitmaps for `code`.
    ///
    /// Falls back to computing directly (no caching) when `code_hash` is
    /// unknown, which happens for code supplied inline (e.g. CREATE init
    /// code that has not been hashed by the host yet).
    pub fn jump_and_sub_destinations(
        &self,
        code_hash: &Option<H256>,
        code: &[u8],
    ) -> (Arc<BitSet>, Arc<BitSet>) {
        match code_hash {
            Some(ref hash) => {
                let mut cache = self.jump_destinations.lock();
                if let Some(entry) = cache.get_mut(hash) {
                    return entry.clone();
                }
                let analysis = Self::analyze(code);
                cache.insert(*hash, analysis.clone());
                analysis
            }
            None => Self::analyze(code),
        }
    }

    fn analyze(code: &[u8]) -> (Arc<BitSet>, Arc<BitSet>) {
        let mut jump_dests = BitSet::with_capacity(code.len());
        let mut sub_entries = BitSet::with_capacity(code.len());
        let mut position = 0;

        while position < code.len() {
            let instruction = code[position];

            if instruction == instructions::JUMPDEST as u8 {
                jump_dests.insert(position);
            } else if instruction == instructions::BEGINSUB as u8 {
                sub_entries.insert(position);
            } else if let Some(push_bytes) = instructions::Instruction::from_u8(instruction)
                .and_then(|i| i.push_bytes())
            {
                position += push_bytes;
            }
            position += 1;
        }

        (Arc::new(jump_dests), Arc::new(sub_entries))
    }
}

impl Default for SharedCache {
    fn default() -> Self {
        SharedCache::new()
    }
}

#[cfg(test)]
mod tests {
    use super::SharedCache;
    use ethereum_types::H256;

    #[test]
    fn finds_jumpdest_and_skips_push_data() {
        // PUSH1 0x5B, JUMPDEST
        let code = [0x60, 0x5b, 0x5b];
        let cache = SharedCache::new();
        let (jump_dests, _) = cache.jump_and_sub_destinations(&None, &code);
        assert!(!jump_dests.contains(1));
        assert!(jump_dests.contains(2));
    }

    #[test]
    fn caches_by_code_hash() {
        let code = [0x5b];
        let cache = SharedCache::new();
        let hash = Some(H256::from_low_u64_be(42));
        let first = cache.jump_and_sub_destinations(&hash, &code);
        let second = cache.jump_and_sub_destinations(&hash, &code);
        assert!(first.0.contains(0));
        assert!(second.0.contains(0));
    }
}
