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

//! Virtual machine support library. Defines the host-facing types an
//! interpreter is built against: action parameters, the cost schedule, the
//! `Ext` host trait, and the error taxonomy. Holds no interpreter logic of
//! its own.

extern crate ethereum_types;
extern crate keccak_hash as hash;
extern crate parity_bytes as bytes;
extern crate rlp;

#[macro_use]
extern crate log;

pub mod action_params;
pub mod env_info;
pub mod error;
pub mod exec;
pub mod ext;
pub mod fork;
pub mod return_data;
pub mod schedule;
pub mod tests;

pub use action_params::{ActionParams, ActionValue, CallType, CreateContractAddress, ParamsType};
pub use env_info::EnvInfo;
pub use error::{Error, ExecTrapError, ExecTrapResult, Result, TrapError, TrapKind, TrapResult};
pub use exec::{ContractCreateResult, Exec, GasLeft, MessageCallResult, ResumeCall, ResumeCreate};
pub use ext::Ext;
pub use fork::Fork;
pub use return_data::ReturnData;
pub use schedule::Schedule;
