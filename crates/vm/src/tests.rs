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

//! In-memory `Ext` implementation used by interpreter unit tests. No
//! persistence, no real state trie: just enough bookkeeping to assert
//! against.

use action_params::{CallType, CreateContractAddress};
use bytes::Bytes;
use env_info::EnvInfo;
use error::{Error, ExecTrapResult, Result, TrapKind};
use ethereum_types::{Address, H256, U256};
use exec::{ContractCreateResult, GasLeft, MessageCallResult};
use ext::{Ext, MemoryDiff, StorageDiff};
use hash::keccak;
use schedule::Schedule;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// `keccak256(rlp([sender, nonce]))[12:]`, the CREATE address scheme.
fn contract_address_from_sender_and_nonce(sender: &Address, nonce: u64) -> Address {
    let mut stream = rlp::RlpStream::new_list(2);
    stream.append(sender);
    stream.append(&nonce);
    Address::from_slice(&keccak(stream.as_raw()).as_bytes()[12..])
}

/// `keccak256(0xff ++ sender ++ salt ++ keccak256(init_code))[12:]`, the
/// CREATE2 address scheme (EIP-1014).
fn contract_address_from_sender_salt_and_code_hash(
    sender: &Address,
    salt: H256,
    code: &[u8],
) -> Address {
    let code_hash = keccak(code);
    let mut buffer = [0u8; 1 + 20 + 32 + 32];
    buffer[0] = 0xff;
    buffer[1..21].copy_from_slice(sender.as_bytes());
    buffer[21..53].copy_from_slice(salt.as_bytes());
    buffer[53..85].copy_from_slice(code_hash.as_bytes());
    Address::from_slice(&keccak(&buffer[..]).as_bytes()[12..])
}

/// `keccak256(sender ++ keccak256(init_code))[12:]`.
fn contract_address_from_sender_and_code_hash(sender: &Address, code: &[u8]) -> Address {
    let code_hash = keccak(code);
    let mut buffer = [0u8; 20 + 32];
    buffer[0..20].copy_from_slice(sender.as_bytes());
    buffer[20..52].copy_from_slice(code_hash.as_bytes());
    Address::from_slice(&keccak(&buffer[..]).as_bytes()[12..])
}

/// Record of a single call/create dispatched through `FakeExt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCall {
    /// The kind of call.
    pub call_type: FakeCallType,
    /// Gas given.
    pub gas: U256,
    /// Sender.
    pub sender_address: Option<Address>,
    /// Receiver.
    pub receive_address: Option<Address>,
    /// Value transferred.
    pub value: Option<U256>,
    /// Input/init data.
    pub data: Bytes,
    /// Code address (for CALL family).
    pub code_address: Option<Address>,
}

/// Distinguishes a logged `FakeCall`'s instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeCallType {
    Call,
    Create,
}

/// Test harness implementing `Ext` entirely in memory.
pub struct FakeExt {
    pub schedule: Schedule,
    pub store: HashMap<H256, H256>,
    pub initial_store: HashMap<H256, H256>,
    pub transient_store: HashMap<H256, H256>,
    pub blockhashes: HashMap<U256, H256>,
    pub codes: HashMap<Address, Arc<Bytes>>,
    pub logs: Vec<FakeLogEntry>,
    pub suicides: HashSet<Address>,
    pub created: HashSet<Address>,
    pub info: EnvInfo,
    pub chain_id: u64,
    pub balances: HashMap<Address, U256>,
    pub depth: usize,
    pub is_static: bool,
    pub sstore_clears: isize,
    pub warm_addresses: HashSet<Address>,
    pub warm_storage_keys: HashSet<(Address, H256)>,
    pub calls: Vec<FakeCall>,
    pub tracing: bool,
    /// Address of the account executing the current frame, used as the
    /// `sender` input to `calc_address`.
    pub own_address: Address,
    /// Nonce of `own_address`, consumed by the CREATE address scheme.
    pub nonce: u64,
    /// When set, returned (and, for `Created`, acted upon) by `create`
    /// instead of the default `Failed`.
    pub create_result: Option<ContractCreateResult>,
}

/// A `LOG0`..`LOG4` call, recorded for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeLogEntry {
    pub topics: Vec<H256>,
    pub data: Bytes,
}

impl Default for FakeExt {
    fn default() -> Self {
        FakeExt {
            schedule: Schedule::new_frontier(),
            store: HashMap::new(),
            initial_store: HashMap::new(),
            transient_store: HashMap::new(),
            blockhashes: HashMap::new(),
            codes: HashMap::new(),
            logs: Vec::new(),
            suicides: HashSet::new(),
            created: HashSet::new(),
            info: EnvInfo::default(),
            chain_id: 0,
            balances: HashMap::new(),
            depth: 0,
            is_static: false,
            sstore_clears: 0,
            warm_addresses: HashSet::new(),
            warm_storage_keys: HashSet::new(),
            calls: Vec::new(),
            tracing: false,
            own_address: Address::zero(),
            nonce: 0,
            create_result: None,
        }
    }
}

impl FakeExt {
    pub fn new() -> Self {
        FakeExt::default()
    }

    pub fn new_byzantium() -> Self {
        let mut ext = FakeExt::new();
        ext.schedule = Schedule::new_byzantium();
        ext
    }

    pub fn new_constantinople() -> Self {
        let mut ext = FakeExt::new();
        ext.schedule = Schedule::new_constantinople();
        ext
    }

    pub fn new_istanbul() -> Self {
        let mut ext = FakeExt::new();
        ext.schedule = Schedule::new_istanbul();
        ext
    }

    pub fn new_berlin() -> Self {
        let mut ext = FakeExt::new();
        ext.schedule = Schedule::new_berlin();
        ext
    }

    pub fn new_london() -> Self {
        let mut ext = FakeExt::new();
        ext.schedule = Schedule::new_london();
        ext
    }

    pub fn new_shanghai() -> Self {
        let mut ext = FakeExt::new();
        ext.schedule = Schedule::new_shanghai();
        ext
    }

    pub fn new_cancun() -> Self {
        let mut ext = FakeExt::new();
        ext.schedule = Schedule::new_cancun();
        ext
    }
}

impl Ext for FakeExt {
    fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn env_info(&self) -> &EnvInfo {
        &self.info
    }

    fn balance(&self, address: &Address) -> Result<U256> {
        Ok(self.balances.get(address).cloned().unwrap_or_else(U256::zero))
    }

    fn storage_at(&self, key: &H256) -> Result<H256> {
        Ok(self.store.get(key).cloned().unwrap_or_else(H256::zero))
    }

    fn initial_storage_at(&self, key: &H256) -> Result<H256> {
        Ok(self
            .initial_store
            .get(key)
            .cloned()
            .unwrap_or_else(H256::zero))
    }

    fn set_storage(&mut self, key: H256, value: H256) -> Result<()> {
        self.store.insert(key, value);
        Ok(())
    }

    fn tload(&self, key: &H256) -> H256 {
        self.transient_store
            .get(key)
            .cloned()
            .unwrap_or_else(H256::zero)
    }

    fn tstore(&mut self, key: H256, value: H256) -> Result<()> {
        self.transient_store.insert(key, value);
        Ok(())
    }

    fn al_is_warm_address(&self, address: &Address) -> bool {
        self.warm_addresses.contains(address)
    }

    fn al_is_warm_storage_key(&self, address: &Address, key: &H256) -> bool {
        self.warm_storage_keys.contains(&(*address, *key))
    }

    fn al_insert_address(&mut self, address: Address) {
        self.warm_addresses.insert(address);
    }

    fn al_insert_storage_key(&mut self, address: Address, key: H256) {
        self.warm_storage_keys.insert((address, key));
    }

    fn add_sstore_refund(&mut self, value: usize) {
        self.sstore_clears += value as isize;
    }

    fn sub_sstore_refund(&mut self, value: usize) {
        self.sstore_clears -= value as isize;
    }

    fn was_created_in_tx(&self, address: &Address) -> bool {
        self.created.contains(address)
    }

    fn exists_and_not_null(&self, address: &Address) -> Result<bool> {
        Ok(self.balances.contains_key(address) || self.codes.contains_key(address))
    }

    fn extcodesize(&self, address: &Address) -> Result<Option<usize>> {
        Ok(self.codes.get(address).map(|c| c.len()))
    }

    fn extcode(&self, address: &Address) -> Result<Option<Arc<Bytes>>> {
        Ok(self.codes.get(address).cloned())
    }

    fn extcodehash(&self, _address: &Address) -> Result<Option<H256>> {
        Ok(None)
    }

    fn create(
        &mut self,
        gas: &U256,
        value: &U256,
        code: &[u8],
        _address: CreateContractAddress,
        _trap: bool,
    ) -> ::std::result::Result<ContractCreateResult, TrapKind> {
        self.calls.push(FakeCall {
            call_type: FakeCallType::Create,
            gas: *gas,
            sender_address: None,
            receive_address: None,
            value: None,
            data: code.to_vec(),
            code_address: None,
        });

        match self.create_result.clone() {
            Some(ContractCreateResult::Created(new_address, gas_left)) => {
                let sender_balance = self
                    .balances
                    .get(&self.own_address)
                    .cloned()
                    .unwrap_or_else(U256::zero);
                self.balances
                    .insert(self.own_address, sender_balance - *value);
                *self.balances.entry(new_address).or_insert_with(U256::zero) += *value;
                self.codes.insert(new_address, Arc::new(code.to_vec()));
                self.created.insert(new_address);
                self.nonce += 1;
                Ok(ContractCreateResult::Created(new_address, gas_left))
            }
            Some(other) => Ok(other),
            None => Ok(ContractCreateResult::Failed),
        }
    }

    fn calc_address(&self, code: &[u8], address: CreateContractAddress) -> Option<Address> {
        match address {
            CreateContractAddress::FromSenderAndNonce => Some(
                contract_address_from_sender_and_nonce(&self.own_address, self.nonce),
            ),
            CreateContractAddress::FromSenderSaltAndCodeHash(salt) => Some(
                contract_address_from_sender_salt_and_code_hash(&self.own_address, salt, code),
            ),
            CreateContractAddress::FromSenderAndCodeHash => Some(
                contract_address_from_sender_and_code_hash(&self.own_address, code),
            ),
        }
    }

    fn call(
        &mut self,
        gas: &U256,
        sender_address: &Address,
        receive_address: &Address,
        value: Option<U256>,
        data: &[u8],
        code_address: &Address,
        _call_type: CallType,
        _trap: bool,
    ) -> ::std::result::Result<MessageCallResult, TrapKind> {
        self.calls.push(FakeCall {
            call_type: FakeCallType::Call,
            gas: *gas,
            sender_address: Some(*sender_address),
            receive_address: Some(*receive_address),
            value,
            data: data.to_vec(),
            code_address: Some(*code_address),
        });
        Ok(MessageCallResult::Success(*gas, ::return_data::ReturnData::empty()))
    }

    fn blockhash(&mut self, number: &U256) -> H256 {
        self.blockhashes
            .get(number)
            .cloned()
            .unwrap_or_else(H256::zero)
    }

    fn log(&mut self, topics: Vec<H256>, data: &[u8]) -> Result<()> {
        self.logs.push(FakeLogEntry {
            topics,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn suicide(&mut self, refund_address: &Address) -> Result<()> {
        let own_balance = self.balances.get(&self.own_address).cloned().unwrap_or_else(U256::zero);
        self.balances.insert(self.own_address, U256::zero());
        *self.balances.entry(*refund_address).or_insert_with(U256::zero) += own_balance;

        if !self.schedule.eip6780 || self.was_created_in_tx(&self.own_address) {
            self.suicides.insert(self.own_address);
        }
        Ok(())
    }

    fn trace_next_instruction(&mut self, _pc: usize, _instruction: u8, _current_gas: U256) -> bool {
        self.tracing
    }

    fn trace_prepare_execute(
        &mut self,
        _pc: usize,
        _instruction: u8,
        _gas_cost: U256,
        _mem_written: MemoryDiff,
        _store_written: StorageDiff,
    ) {
    }

    fn trace_executed(&mut self, _gas_used: U256, _stack_push: &[U256], _mem: &[u8]) {}

    fn trace_failed(&mut self) {}
}

/// Reduces an interpreter's raw return value to a plain gas-left result,
/// failing the test (via `Err`) on any unresolved trap. Tests never issue
/// real sub-calls, so a trap reaching this point is a harness bug, not an
/// expected outcome.
pub fn test_finalize(result: ExecTrapResult<GasLeft>) -> Result<U256> {
    match result {
        Ok(Ok(GasLeft::Known(gas))) => Ok(gas),
        Ok(Ok(GasLeft::NeedsReturn { gas_left, .. })) => Ok(gas_left),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(Error::Internal("unexpected trap in test".to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::FakeExt;
    use ext::Ext;

    #[test]
    fn default_storage_reads_zero() {
        let ext = FakeExt::new();
        assert_eq!(ext.storage_at(&Default::default()).unwrap(), Default::default());
    }

    #[test]
    fn transient_storage_is_isolated_from_storage() {
        let mut ext = FakeExt::new_cancun();
        let key = ethereum_types::H256::from_low_u64_be(1);
        let value = ethereum_types::H256::from_low_u64_be(42);
        ext.tstore(key, value).unwrap();
        assert_eq!(ext.tload(&key), value);
        assert_eq!(ext.storage_at(&key).unwrap(), ethereum_types::H256::zero());
    }

    #[test]
    fn calc_address_from_nonce_is_deterministic_and_nonce_sensitive() {
        use action_params::CreateContractAddress;

        let mut ext = FakeExt::new();
        ext.own_address = ethereum_types::Address::from_low_u64_be(0x42);
        ext.nonce = 0;
        let a0 = ext.calc_address(&[], CreateContractAddress::FromSenderAndNonce).unwrap();
        ext.nonce = 1;
        let a1 = ext.calc_address(&[], CreateContractAddress::FromSenderAndNonce).unwrap();
        assert_ne!(a0, a1);

        ext.nonce = 0;
        let a0_again = ext.calc_address(&[], CreateContractAddress::FromSenderAndNonce).unwrap();
        assert_eq!(a0, a0_again);
    }

    #[test]
    fn calc_address_create2_depends_on_salt_and_code() {
        use action_params::CreateContractAddress;

        let mut ext = FakeExt::new();
        ext.own_address = ethereum_types::Address::from_low_u64_be(0x42);
        let salt = ethereum_types::H256::from_low_u64_be(1);
        let other_salt = ethereum_types::H256::from_low_u64_be(2);

        let a = ext
            .calc_address(&[0x60, 0x00], CreateContractAddress::FromSenderSaltAndCodeHash(salt))
            .unwrap();
        let b = ext
            .calc_address(&[0x60, 0x00], CreateContractAddress::FromSenderSaltAndCodeHash(other_salt))
            .unwrap();
        let c = ext
            .calc_address(&[0x60, 0x01], CreateContractAddress::FromSenderSaltAndCodeHash(salt))
            .unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);

        let a_again = ext
            .calc_address(&[0x60, 0x00], CreateContractAddress::FromSenderSaltAndCodeHash(salt))
            .unwrap();
        assert_eq!(a, a_again);
    }
}
