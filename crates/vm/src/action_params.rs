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

//! Action (message call / create) parameters.

use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use hash;
use std::sync::Arc;

/// Transaction value.
///
/// `Apparent` is used by DELEGATECALL, where the executing frame sees the
/// parent's value on the stack (CALLVALUE) without any balance actually
/// moving.
#[derive(Clone, Copy, Debug)]
pub enum ActionValue {
    /// Value that should be transferred.
    Transfer(U256),
    /// Value that executing frame should see as a result of CALLVALUE
    /// instruction, but no actual transfer occurs.
    Apparent(U256),
}

impl ActionValue {
    /// Returns action value as U256.
    pub fn value(&self) -> U256 {
        match *self {
            ActionValue::Transfer(x) | ActionValue::Apparent(x) => x,
        }
    }

    /// Returns the transfer action value of this value.
    pub fn transfer(value: U256) -> ActionValue {
        ActionValue::Transfer(value)
    }

    /// Returns the apparent action value of this value.
    pub fn apparent(value: U256) -> ActionValue {
        ActionValue::Apparent(value)
    }
}

/// Type of the way parameters encoded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamsType {
    /// Parameters are included in code.
    Embedded,
    /// Parameters are passed in data section.
    Separate,
}

/// The type of the call-like instruction that produced this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallType {
    /// Not a call, a regular (transaction-entry or CREATE-spawned) frame.
    None,
    /// CALL
    Call,
    /// CALLCODE
    CallCode,
    /// DELEGATECALL
    DelegateCall,
    /// STATICCALL
    StaticCall,
}

/// Scheme used to derive a new contract's address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateContractAddress {
    /// Address derived as `keccak256(rlp([sender, sender_nonce]))[12:]` (CREATE).
    FromSenderAndNonce,
    /// Address derived as `keccak256(0xFF ++ sender ++ salt ++ keccak256(init_code))[12:]` (CREATE2).
    FromSenderSaltAndCodeHash(H256),
    /// Address derived as `keccak256(sender ++ keccak256(init_code))[12:]`. Unused by the core
    /// opcode set but kept for hosts that support deterministic deployment proxies.
    FromSenderAndCodeHash,
}

/// Action (call/create) params. Everything an interpreter needs to know
/// about the frame it is about to run, minus the bytecode itself (carried
/// separately so it can be wrapped in a `CodeReader`).
#[derive(Clone, Debug)]
pub struct ActionParams {
    /// Address of currently executed code.
    pub code_address: Address,
    /// Hash of currently executed code.
    pub code_hash: Option<H256>,
    /// Receive address. Usually equal to code_address, except when called
    /// using CALLCODE.
    pub address: Address,
    /// Sender of current part of the transaction.
    pub sender: Address,
    /// Transaction initiator.
    pub origin: Address,
    /// Gas paid up front for transaction execution.
    pub gas: U256,
    /// Gas price.
    pub gas_price: U256,
    /// Transaction value.
    pub value: ActionValue,
    /// Code being executed.
    pub code: Option<Arc<Bytes>>,
    /// Input data.
    pub data: Option<Bytes>,
    /// Type of call.
    pub call_type: CallType,
    /// Param types encoding.
    pub params_type: ParamsType,
}

impl Default for ActionParams {
    /// Returns default ActionParams initialized with zeros.
    fn default() -> ActionParams {
        ActionParams {
            code_address: Address::zero(),
            code_hash: Some(hash::KECCAK_EMPTY),
            address: Address::zero(),
            sender: Address::zero(),
            origin: Address::zero(),
            gas: U256::zero(),
            gas_price: U256::zero(),
            value: ActionValue::Transfer(U256::zero()),
            code: None,
            data: None,
            call_type: CallType::None,
            params_type: ParamsType::Separate,
        }
    }
}
