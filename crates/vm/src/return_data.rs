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

//! Return data buffer, shared between a frame and its most recent sub-call.

use bytes::Bytes;
use std::ops::Deref;
use std::sync::Arc;

/// Cheaply-cloneable owner of a sub-call's output bytes. RETURNDATACOPY,
/// RETURNDATASIZE and the CREATE/CALL family all read through this; it is
/// replaced wholesale on every sub-call, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReturnData {
    mem: Arc<Bytes>,
    offset: usize,
    size: usize,
}

impl ReturnData {
    /// Empty return data.
    pub fn empty() -> Self {
        ReturnData {
            mem: Arc::new(Vec::new()),
            offset: 0,
            size: 0,
        }
    }

    /// New return data from full memory slice.
    pub fn new(mem: Bytes, offset: usize, size: usize) -> Self {
        ReturnData {
            mem: Arc::new(mem),
            offset,
            size,
        }
    }
}

impl Deref for ReturnData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.mem[self.offset..self.offset + self.size]
    }
}
