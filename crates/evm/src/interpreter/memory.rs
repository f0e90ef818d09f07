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

//! Linear memory, word-addressed, growing only. Sizing and the quadratic
//! expansion charge live in `gasometer`; this module only ever grows to a
//! size the gasometer has already paid for.

use ethereum_types::U256;
use vm::ReturnData;

/// Size beyond which we consider a memory access/copy request impossible to
/// satisfy and therefore not worth tracing (the gasometer will have already
/// turned any such request into `OutOfGas` well before this point).
const MAX_RANGE: u64 = u32::max_value() as u64;

#[inline]
fn to_usize(value: U256) -> usize {
    if value > U256::from(MAX_RANGE) {
        MAX_RANGE as usize
    } else {
        value.low_u64() as usize
    }
}

/// True iff `(offset, size)` is a range the interpreter could plausibly have
/// already paid memory-expansion gas for; used to suppress bogus trace
/// writes for unreachably large ranges.
pub fn is_valid_range(offset: usize, size: usize) -> bool {
    size == 0 || offset.checked_add(size).is_some()
}

/// Operations on the interpreter's linear byte memory.
pub trait Memory {
    /// Current size in bytes; always a multiple of 32.
    fn size(&self) -> usize;
    /// Grows the buffer to at least `size` bytes, zero-filling the tail.
    /// No-op if already at least that large.
    fn expand(&mut self, size: usize) -> &mut Self;
    /// Reads one 32-byte big-endian word starting at `offset`.
    fn read(&self, offset: U256) -> U256;
    /// Writes one 32-byte big-endian word starting at `offset`.
    fn write(&mut self, offset: U256, value: U256);
    /// Writes the low byte of `value` at `offset`.
    fn write_byte(&mut self, offset: U256, value: U256);
    /// Writes `bytes` starting at `offset`.
    fn write_slice(&mut self, offset: U256, bytes: &[u8]);
    /// Borrows `size` bytes starting at `offset` for reading.
    fn read_slice(&self, offset: U256, size: U256) -> &[u8];
    /// Borrows `size` bytes starting at `offset` for writing.
    fn writeable_slice(&mut self, offset: U256, size: U256) -> &mut [u8];
    /// Copies a slice of memory into a standalone, cheaply-cloneable
    /// `ReturnData` buffer (RETURN/REVERT).
    fn into_return_data(self, offset: U256, size: U256) -> ReturnData;
    /// Copies `length` bytes from `src` to `dest`, correctly handling
    /// overlap (MCOPY, EIP-5656).
    fn copy_within(&mut self, src: U256, dest: U256, length: U256);
}

impl Memory for Vec<u8> {
    fn size(&self) -> usize {
        self.len()
    }

    fn expand(&mut self, size: usize) -> &mut Self {
        if size > self.len() {
            self.resize(size, 0);
        }
        self
    }

    fn read(&self, offset: U256) -> U256 {
        let offset = to_usize(offset);
        U256::from(&self[offset..offset + 32])
    }

    fn write(&mut self, offset: U256, value: U256) {
        let offset = to_usize(offset);
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        self[offset..offset + 32].copy_from_slice(&bytes);
    }

    fn write_byte(&mut self, offset: U256, value: U256) {
        let offset = to_usize(offset);
        let byte = (value.low_u64() & 0xff) as u8;
        self[offset] = byte;
    }

    fn write_slice(&mut self, offset: U256, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let offset = to_usize(offset);
        self[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn read_slice(&self, offset: U256, size: U256) -> &[u8] {
        if size.is_zero() {
            return &[];
        }
        let offset = to_usize(offset);
        let size = to_usize(size);
        &self[offset..offset + size]
    }

    fn writeable_slice(&mut self, offset: U256, size: U256) -> &mut [u8] {
        if size.is_zero() {
            return &mut [];
        }
        let offset = to_usize(offset);
        let size = to_usize(size);
        &mut self[offset..offset + size]
    }

    fn into_return_data(mut self, offset: U256, size: U256) -> ReturnData {
        let size = to_usize(size);
        if size == 0 {
            return ReturnData::empty();
        }
        let offset = to_usize(offset);
        self.expand(offset + size);
        ReturnData::new(self, offset, size)
    }

    fn copy_within(&mut self, src: U256, dest: U256, length: U256) {
        if length.is_zero() {
            return;
        }
        let src = to_usize(src);
        let dest = to_usize(dest);
        let length = to_usize(length);
        self.copy_within(src..src + length, dest);
    }
}

#[cfg(test)]
mod tests {
    use super::Memory;
    use ethereum_types::U256;

    #[test]
    fn expand_is_idempotent_and_zero_fills() {
        let mut mem: Vec<u8> = Vec::new();
        mem.expand(32);
        assert_eq!(mem.size(), 32);
        mem.write(U256::zero(), U256::from(0xff));
        mem.expand(32);
        assert_eq!(mem.size(), 32);
        assert_eq!(mem.read(U256::zero()), U256::from(0xff));
    }

    #[test]
    fn mcopy_handles_forward_overlap() {
        let mut mem: Vec<u8> = Vec::new();
        mem.expand(64);
        mem.write_slice(U256::zero(), &[1, 2, 3, 4]);
        mem.copy_within(U256::zero(), U256::from(2), U256::from(4));
        assert_eq!(&mem[2..6], &[1, 2, 3, 4]);
    }
}
