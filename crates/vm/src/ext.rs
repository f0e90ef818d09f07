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

//! The `Ext` trait: everything an interpreter asks of its host. State
//! persistence, precompile bodies, and block orchestration all live on the
//! other side of this trait and are out of scope for this crate.

use action_params::CreateContractAddress;
use bytes::Bytes;
use env_info::EnvInfo;
use error::{Result, TrapKind};
use ethereum_types::{Address, H256, U256};
use exec::{ContractCreateResult, MessageCallResult};
use action_params::CallType;
use schedule::Schedule;
use std::sync::Arc;

/// Describes how much of the memory region an instruction is about to
/// write, for a tracer.
pub type MemoryDiff = Option<(usize, usize)>;
/// Describes an SSTORE an instruction is about to perform, for a tracer.
pub type StorageDiff = Option<(U256, U256)>;

/// Context owned by the client, exposed to the interpreter for all external
/// effects and queries.
pub trait Ext {
    /// Returns the cost schedule active for the current fork.
    fn schedule(&self) -> &Schedule;

    /// Returns true if this frame is executing inside a STATICCALL
    /// (directly, or nested under one via DELEGATECALL/CALLCODE).
    fn is_static(&self) -> bool;

    /// Returns the current call-stack depth (0 at the transaction entry
    /// frame).
    fn depth(&self) -> usize;

    /// Returns the chain identifier (EIP-1344).
    fn chain_id(&self) -> u64;

    /// Returns block/transaction environment info.
    fn env_info(&self) -> &EnvInfo;

    /// Returns the balance of account `address`.
    fn balance(&self, address: &Address) -> Result<U256>;

    /// Returns the value stored at `key` in the current account's storage.
    fn storage_at(&self, key: &H256) -> Result<H256>;

    /// Returns the value stored at `key` in the current account's storage
    /// as of the start of the *transaction* (the EIP-2200 `original` value).
    fn initial_storage_at(&self, key: &H256) -> Result<H256>;

    /// Stores a value at `key` in the current account's storage.
    fn set_storage(&mut self, key: H256, value: H256) -> Result<()>;

    /// Reads the current account's transient storage at `key` (EIP-1153).
    /// Zero-initialized per transaction, never persisted.
    fn tload(&self, key: &H256) -> H256;

    /// Writes the current account's transient storage at `key` (EIP-1153).
    fn tstore(&mut self, key: H256, value: H256) -> Result<()>;

    /// Returns whether `address` was already touched this transaction
    /// (EIP-2929 warm/cold for BALANCE/EXTCODE*/CALL family/SELFDESTRUCT).
    fn al_is_warm_address(&self, address: &Address) -> bool;

    /// Returns whether `(current account, key)` was already touched this
    /// transaction (EIP-2929 warm/cold for SLOAD/SSTORE).
    fn al_is_warm_storage_key(&self, address: &Address, key: &H256) -> bool;

    /// Marks `address` as warm for the rest of the transaction. Idempotent.
    fn al_insert_address(&mut self, address: Address);

    /// Marks `(address, key)` as warm for the rest of the transaction.
    /// Idempotent.
    fn al_insert_storage_key(&mut self, address: Address, key: H256);

    /// Adds to the per-transaction gas refund counter.
    fn add_sstore_refund(&mut self, value: usize);

    /// Removes from the per-transaction gas refund counter (used to undo a
    /// previously-applied clear refund per EIP-2200's dirty-slot rule).
    fn sub_sstore_refund(&mut self, value: usize);

    /// Returns true iff `address` was created by a CREATE/CREATE2 earlier
    /// in the *current transaction* (EIP-6780 SELFDESTRUCT gating).
    fn was_created_in_tx(&self, address: &Address) -> bool;

    /// Returns true if the account has no code, no balance and zero nonce
    /// (used to price CALL's new-account surcharge and EIP-6780).
    fn exists_and_not_null(&self, address: &Address) -> Result<bool>;

    /// Returns code size at given address, `None` if no such account.
    fn extcodesize(&self, address: &Address) -> Result<Option<usize>>;

    /// Returns code at given address, `None` if no such account.
    fn extcode(&self, address: &Address) -> Result<Option<Arc<Bytes>>>;

    /// Returns code hash at given address, `None` if no such account.
    fn extcodehash(&self, address: &Address) -> Result<Option<H256>>;

    /// Creates new contract.
    ///
    /// Returns `Err(TrapKind::Create)` and leaves actual execution to the
    /// caller (so a recursive interpreter never recurses through `Ext`
    /// itself).
    fn create(
        &mut self,
        gas: &U256,
        value: &U256,
        code: &[u8],
        address: CreateContractAddress,
        trap: bool,
    ) -> ::std::result::Result<ContractCreateResult, TrapKind>;

    /// Calculates a new contract's address from the sender/nonce/salt/code,
    /// or `None` if the scheme's inputs are unavailable (e.g. sender nonce
    /// unreadable).
    fn calc_address(&self, code: &[u8], address: CreateContractAddress) -> Option<Address>;

    /// Message call.
    ///
    /// Returns `Err(TrapKind::Call)` and leaves actual execution to the
    /// caller, same as `create`.
    fn call(
        &mut self,
        gas: &U256,
        sender_address: &Address,
        receive_address: &Address,
        value: Option<U256>,
        data: &[u8],
        code_address: &Address,
        call_type: CallType,
        trap: bool,
    ) -> ::std::result::Result<MessageCallResult, TrapKind>;

    /// Returns the hash of a recent block, or zero if unavailable.
    fn blockhash(&mut self, number: &U256) -> H256;

    /// Creates log entry with given topics and data.
    fn log(&mut self, topics: Vec<H256>, data: &[u8]) -> Result<()>;

    /// Should be called when contract commits suicide (SELFDESTRUCT).
    /// Address is the beneficiary of the self-destructing account's balance.
    fn suicide(&mut self, refund_address: &Address) -> Result<()>;

    /// Decide whether any more operations should be traced. Passed the
    /// flat-zero-index PC, the opcode byte, and the current remaining gas.
    fn trace_next_instruction(&mut self, _pc: usize, _instruction: u8, _current_gas: U256) -> bool {
        false
    }

    /// Prepare to trace an operation. Passed the flat-zero-index PC, the
    /// opcode byte, the gas cost about to be charged, and diffs describing
    /// the memory/storage write the instruction is about to make.
    fn trace_prepare_execute(
        &mut self,
        _pc: usize,
        _instruction: u8,
        _gas_cost: U256,
        _mem_written: MemoryDiff,
        _store_written: StorageDiff,
    ) {
    }

    /// Trace the finalised execution of a single instruction.
    fn trace_executed(&mut self, _gas_used: U256, _stack_push: &[U256], _mem: &[u8]) {}

    /// Mark the just-prepared instruction as failed (no execution took
    /// place).
    fn trace_failed(&mut self) {}
}
