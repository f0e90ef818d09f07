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

//! Frame execution outcome types and the suspend/resume traps a frame uses
//! to hand a CALL or CREATE back out to its caller without recursing.

use ethereum_types::{Address, U256};
use ext::Ext;
use return_data::ReturnData;
use ExecTrapResult;

/// Gas Left: either it is a known value, or it needs to be computed by
/// evaluating a `RETURN`/`REVERT` against memory still owned by the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GasLeft {
    /// Known gas left.
    Known(U256),
    /// Return or revert instruction reached. Contains an amount of gas left
    /// and the output data.
    NeedsReturn {
        /// Amount of gas left.
        gas_left: U256,
        /// Output data.
        data: ReturnData,
        /// Apply or revert state changes.
        apply_state: bool,
    },
}

/// Types that can be executed on top of the `Ext` host.
///
/// A boxed `Exec` is how a frame's future is suspended: running it may
/// return `Err(TrapError::Call/Create(..))` instead of a result, at which
/// point the caller is responsible for performing the sub-call/create and
/// calling `resume_call`/`resume_create` with the outcome before calling
/// `exec` again.
pub trait Exec {
    /// This function should be used to execute transaction.
    fn exec(self: Box<Self>, ext: &mut dyn Ext) -> ExecTrapResult<GasLeft>;
}

/// Resume call interface.
pub trait ResumeCall {
    /// Resume an execution for call, returning a new execution
    fn resume_call(self: Box<Self>, result: MessageCallResult) -> Box<dyn Exec>;
}

/// Resume create interface.
pub trait ResumeCreate {
    /// Resume an execution from a create, returning a new execution
    fn resume_create(self: Box<Self>, result: ContractCreateResult) -> Box<dyn Exec>;
}

/// The result of a CREATE/CREATE2, as observed by the frame that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCreateResult {
    /// Under the provided address a new account will be created.
    Created(Address, U256),
    /// Contract creation was reverted; gas left and output data are returned.
    Reverted(U256, ReturnData),
    /// Contract creation failed.
    Failed,
}

/// The result of a CALL/CALLCODE/DELEGATECALL/STATICCALL, as observed by
/// the frame that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageCallResult {
    /// Message call was successful, gas left and output data are returned.
    Success(U256, ReturnData),
    /// Message call was reverted; gas left and output data are returned.
    Reverted(U256, ReturnData),
    /// Message call failed.
    Failed,
}
