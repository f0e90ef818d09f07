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

//! Evm factory.
//!
//! Creates new evm interpreter instance, picking a gas counter
//! representation cheap enough for the gas actually provided.

use ethereum_types::U256;
use std::sync::Arc;
use vm::{ActionParams, Exec, Schedule};

use interpreter::{Interpreter, SharedCache};
use vmtype::VMType;

/// Evm factory. Creates appropriate Evm.
#[derive(Clone)]
pub struct Factory {
    evm: VMType,
    cache: Arc<SharedCache>,
}

impl Factory {
    /// Create fresh instance of evm factory, might choose different evm based on
    /// parameters.
    pub fn create(&self, params: ActionParams, schedule: &Schedule, depth: usize) -> Box<dyn Exec> {
        match self.evm {
            VMType::Interpreter => {
                if Self::can_fit_in_usize(&params.gas) {
                    Box::new(Interpreter::<usize>::new(
                        params,
                        self.cache.clone(),
                        schedule,
                        depth,
                    ))
                } else {
                    Box::new(Interpreter::<U256>::new(
                        params,
                        self.cache.clone(),
                        schedule,
                        depth,
                    ))
                }
            }
        }
    }

    /// Create new instance of specific `VMType` factory
    pub fn new(evm: VMType, cache_size: usize) -> Self {
        Factory {
            evm,
            cache: Arc::new(SharedCache::with_capacity(cache_size)),
        }
    }

    fn can_fit_in_usize(gas: &U256) -> bool {
        gas <= &U256::from(usize::max_value())
    }
}

impl Default for Factory {
    /// Returns native rust evm factory
    fn default() -> Factory {
        Factory {
            evm: VMType::Interpreter,
            cache: Arc::new(SharedCache::default()),
        }
    }
}
