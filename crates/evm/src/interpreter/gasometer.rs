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

//! Per-instruction gas accounting: static tier costs, the dynamic costs that
//! depend on stack/storage/memory state, and the word-quadratic cost of
//! growing linear memory.

use super::stack::Stack;
use ethereum_types::{Address, BigEndianHash, H256, U256};
use evm::CostType;
use instructions::{self, Instruction, InstructionInfo};
use vm::{self, Ext, Schedule};

/// Everything the interpreter needs to do before it can run an instruction:
/// the gas to deduct, how much of it (if any) to forward to a CALL/CREATE,
/// and the memory size the instruction requires.
pub struct InstructionRequirements<Gas> {
    /// Gas required for the instruction, including any memory expansion.
    pub gas_cost: Gas,
    /// Gas to forward to a CALL/CREATE/CREATE2, `None` for other instructions.
    pub provide_gas: Option<Gas>,
    /// Memory size (bytes) the instruction requires; always a multiple of 32.
    pub memory_required_size: usize,
    /// Total (not incremental) gas charged so far for memory of that size.
    pub memory_total_gas: Gas,
}

/// Tracks the gas remaining in a frame and the memory gas already paid for.
pub struct Gasometer<Gas> {
    pub current_gas: Gas,
    pub current_mem_gas: Gas,
}

impl<Gas: CostType> Gasometer<Gas> {
    pub fn new(current_gas: Gas) -> Self {
        Gasometer {
            current_gas,
            current_mem_gas: Gas::from(0),
        }
    }

    /// Returns `Err(OutOfGas)` unless at least `gas_cost` remains.
    pub fn verify_gas(&self, gas_cost: &Gas) -> vm::Result<()> {
        if self.current_gas < *gas_cost {
            Err(vm::Error::OutOfGas)
        } else {
            Ok(())
        }
    }

    /// Computes the gas and memory requirements of `instruction`.
    pub fn requirements(
        &mut self,
        ext: &dyn Ext,
        instruction: Instruction,
        info: &InstructionInfo,
        stack: &dyn Stack<U256>,
        current_address: &Address,
        current_mem_size: usize,
    ) -> vm::Result<InstructionRequirements<Gas>> {
        let schedule = ext.schedule();
        let tier_gas = Gas::from(schedule.tier_step_gas[info.tier]);

        let mut provide_gas = None;
        let mut mem_size = current_mem_size;
        let mut gas_cost = tier_gas;

        use instructions::*;
        match instruction {
            JUMPDEST => {
                gas_cost = Gas::from(schedule.jumpdest_gas);
            }
            MLOAD | MSTORE => {
                mem_size = mem_needed(stack.peek(0), &U256::from(32))?;
            }
            MSTORE8 => {
                mem_size = mem_needed(stack.peek(0), &U256::from(1))?;
            }
            SHA3 => {
                let size = *stack.peek(1);
                mem_size = mem_needed(stack.peek(0), &size)?;
                gas_cost = add_gas(
                    Gas::from(schedule.sha3_gas),
                    mul_gas(Gas::from(schedule.sha3_word_gas), Gas::from(to_word_size(size)))?,
                )?;
            }
            LOG0 | LOG1 | LOG2 | LOG3 | LOG4 => {
                let no_of_topics = instruction
                    .log_topics()
                    .expect("log_topics always returns Some for LOG*; qed");
                let size = *stack.peek(1);
                mem_size = mem_needed(stack.peek(0), &size)?;
                let log_gas = add_gas(
                    Gas::from(schedule.log_gas),
                    mul_gas(Gas::from(schedule.log_topic_gas), Gas::from(no_of_topics))?,
                )?;
                gas_cost = add_gas(
                    log_gas,
                    mul_gas(Gas::from(schedule.log_data_gas), Gas::from(to_usize(size)))?,
                )?;
            }
            EXP => {
                let expon = *stack.peek(1);
                let byte_size = ((expon.bits() + 7) / 8) as usize;
                gas_cost = add_gas(
                    Gas::from(schedule.exp_gas),
                    mul_gas(Gas::from(schedule.exp_byte_gas), Gas::from(byte_size))?,
                )?;
            }
            CALLDATACOPY | CODECOPY | RETURNDATACOPY => {
                let size = *stack.peek(2);
                mem_size = mem_needed(stack.peek(0), &size)?;
                gas_cost = add_gas(
                    tier_gas,
                    mul_gas(Gas::from(schedule.copy_gas), Gas::from(to_word_size(size)))?,
                )?;
            }
            MCOPY => {
                let size = *stack.peek(2);
                let dest_size = mem_needed(stack.peek(0), &size)?;
                let src_size = mem_needed(stack.peek(1), &size)?;
                mem_size = ::std::cmp::max(dest_size, src_size);
                gas_cost = add_gas(
                    tier_gas,
                    mul_gas(Gas::from(schedule.copy_gas), Gas::from(to_word_size(size)))?,
                )?;
            }
            EXTCODECOPY => {
                let address = u256_to_address(stack.peek(0));
                let size = *stack.peek(3);
                mem_size = mem_needed(stack.peek(1), &size)?;
                let base = access_cost(
                    schedule,
                    ext.al_is_warm_address(&address),
                    schedule.extcodecopy_base_gas,
                );
                gas_cost = add_gas(
                    base,
                    mul_gas(Gas::from(schedule.copy_gas), Gas::from(to_word_size(size)))?,
                )?;
            }
            BALANCE => {
                let address = u256_to_address(stack.peek(0));
                gas_cost = access_cost(
                    schedule,
                    ext.al_is_warm_address(&address),
                    schedule.balance_gas,
                );
            }
            EXTCODESIZE => {
                let address = u256_to_address(stack.peek(0));
                gas_cost = access_cost(
                    schedule,
                    ext.al_is_warm_address(&address),
                    schedule.extcodesize_gas,
                );
            }
            EXTCODEHASH => {
                let address = u256_to_address(stack.peek(0));
                gas_cost = access_cost(
                    schedule,
                    ext.al_is_warm_address(&address),
                    schedule.extcodehash_gas,
                );
            }
            SLOAD => {
                let key: H256 = BigEndianHash::from_uint(stack.peek(0));
                gas_cost = if schedule.eip2929 {
                    if ext.al_is_warm_storage_key(current_address, &key) {
                        Gas::from(schedule.warm_storage_read_cost)
                    } else {
                        Gas::from(schedule.cold_sload_cost)
                    }
                } else {
                    Gas::from(schedule.sload_gas)
                };
            }
            SSTORE => {
                let key: H256 = BigEndianHash::from_uint(stack.peek(0));
                let new_value = *stack.peek(1);
                let current_value = ext.storage_at(&key)?.into_uint();

                if schedule.eip1706 && self.current_gas.as_u256() <= U256::from(2300) {
                    return Err(vm::Error::OutOfGas);
                }

                let warm = ext.al_is_warm_storage_key(current_address, &key);
                let cold_surcharge = if schedule.eip2929 && !warm {
                    schedule.cold_sload_cost
                } else {
                    0
                };

                let dirty_cost = if schedule.eip1283 || schedule.eip2929 {
                    let original_value = ext.initial_storage_at(&key)?.into_uint();
                    if current_value == new_value {
                        schedule.warm_storage_read_cost.max(schedule.sload_gas)
                    } else if original_value == current_value {
                        if original_value.is_zero() {
                            schedule.sstore_set_gas
                        } else {
                            schedule.sstore_reset_gas
                        }
                    } else {
                        schedule.warm_storage_read_cost.max(schedule.sload_gas)
                    }
                } else if current_value.is_zero() && !new_value.is_zero() {
                    schedule.sstore_set_gas
                } else {
                    schedule.sstore_reset_gas
                };

                gas_cost = Gas::from(dirty_cost + cold_surcharge);
            }
            TLOAD | TSTORE => {
                gas_cost = Gas::from(schedule.transient_storage_gas);
            }
            CREATE | CREATE2 => {
                let size = *stack.peek(2);
                mem_size = mem_needed(stack.peek(1), &size)?;
                let word_size = to_word_size(size);

                let mut cost = Gas::from(schedule.create_gas);
                if instruction == CREATE2 {
                    cost = add_gas(
                        cost,
                        mul_gas(Gas::from(schedule.sha3_word_gas), Gas::from(word_size))?,
                    )?;
                }
                if schedule.eip3860 {
                    cost = add_gas(
                        cost,
                        mul_gas(Gas::from(schedule.initcode_word_gas), Gas::from(word_size))?,
                    )?;
                }
                gas_cost = cost;

                let current_mem_gas =
                    self.mem_gas_cost(schedule, ::std::cmp::max(mem_size, current_mem_size))?;
                let after_static = sub_gas(self.current_gas, gas_cost)?;
                let after_mem = sub_gas(
                    after_static,
                    sub_gas(current_mem_gas, self.current_mem_gas).unwrap_or_else(|_| Gas::from(0)),
                )
                .unwrap_or_else(|_| Gas::from(0));
                provide_gas = Some(all_but_one_64th(schedule, after_mem));
            }
            CALL | CALLCODE | DELEGATECALL | STATICCALL => {
                let call_gas_requested = *stack.peek(0);
                let code_address = u256_to_address(stack.peek(1));

                let (value, mem_offset_idx, has_value) = match instruction {
                    CALL | CALLCODE => (*stack.peek(2), 3, true),
                    DELEGATECALL | STATICCALL => (U256::zero(), 2, false),
                    _ => unreachable!(),
                };

                let in_off = *stack.peek(mem_offset_idx);
                let in_size = *stack.peek(mem_offset_idx + 1);
                let out_off = *stack.peek(mem_offset_idx + 2);
                let out_size = *stack.peek(mem_offset_idx + 3);

                let in_mem = mem_needed(&in_off, &in_size)?;
                let out_mem = mem_needed(&out_off, &out_size)?;
                mem_size = ::std::cmp::max(in_mem, out_mem);

                let mut cost = access_cost(
                    schedule,
                    ext.al_is_warm_address(&code_address),
                    schedule.call_gas,
                );
                if has_value && !value.is_zero() {
                    cost = add_gas(cost, Gas::from(schedule.call_value_transfer_gas))?;
                }
                let transfers_value = has_value && !value.is_zero();
                if (instruction == CALL || instruction == CALLCODE)
                    && !ext.exists_and_not_null(&code_address)?
                    && (transfers_value || !schedule.no_empty)
                {
                    cost = add_gas(cost, Gas::from(schedule.call_new_account_gas))?;
                }
                gas_cost = cost;

                let current_mem_gas =
                    self.mem_gas_cost(schedule, ::std::cmp::max(mem_size, current_mem_size))?;
                let after_static = sub_gas(self.current_gas, gas_cost)?;
                let after_mem = sub_gas(
                    after_static,
                    sub_gas(current_mem_gas, self.current_mem_gas).unwrap_or_else(|_| Gas::from(0)),
                )
                .unwrap_or_else(|_| Gas::from(0));
                let cap = all_but_one_64th(schedule, after_mem);
                let requested = Gas::from_u256(call_gas_requested).unwrap_or(cap);
                provide_gas = Some(if requested < cap { requested } else { cap });
            }
            SUICIDE => {
                let beneficiary = u256_to_address(stack.peek(0));
                let mut cost = Gas::from(schedule.suicide_gas);
                if schedule.eip2929 && !ext.al_is_warm_address(&beneficiary) {
                    cost = add_gas(cost, Gas::from(schedule.cold_account_access_cost))?;
                }
                if ext.exists_and_not_null(&beneficiary)? == false
                    && ext.balance(current_address)?.is_zero() == false
                {
                    cost = add_gas(cost, Gas::from(schedule.suicide_to_new_account_cost))?;
                }
                gas_cost = cost;
            }
            _ => {}
        }

        if instruction != CREATE
            && instruction != CREATE2
            && instruction != CALL
            && instruction != CALLCODE
            && instruction != DELEGATECALL
            && instruction != STATICCALL
        {
            let new_mem_size = ::std::cmp::max(mem_size, current_mem_size);
            let new_mem_gas = self.mem_gas_cost(schedule, new_mem_size)?;
            let mem_increase = sub_gas(new_mem_gas, self.current_mem_gas).unwrap_or_else(|_| Gas::from(0));
            gas_cost = add_gas(gas_cost, mem_increase)?;

            return Ok(InstructionRequirements {
                gas_cost,
                provide_gas,
                memory_required_size: new_mem_size,
                memory_total_gas: new_mem_gas,
            });
        }

        let new_mem_size = ::std::cmp::max(mem_size, current_mem_size);
        let new_mem_gas = self.mem_gas_cost(schedule, new_mem_size)?;
        let mem_increase = sub_gas(new_mem_gas, self.current_mem_gas).unwrap_or_else(|_| Gas::from(0));
        gas_cost = add_gas(gas_cost, mem_increase)?;

        Ok(InstructionRequirements {
            gas_cost,
            provide_gas,
            memory_required_size: new_mem_size,
            memory_total_gas: new_mem_gas,
        })
    }

    /// Total (not incremental) memory gas cost for a buffer of `mem_size`
    /// bytes: `C(w) = memory_gas * w + w^2 / quad_coeff_div`, `w` in words.
    fn mem_gas_cost(&self, schedule: &Schedule, mem_size: usize) -> vm::Result<Gas> {
        let words = Gas::from(to_word_size(U256::from(mem_size)));
        let linear = mul_gas(words, Gas::from(schedule.memory_gas))?;
        let shr = schedule.quad_coeff_div.trailing_zeros() as usize;
        let (quad, overflow) = words.overflow_mul_shr(words, shr);
        if overflow {
            return Err(vm::Error::OutOfGas);
        }
        add_gas(linear, quad)
    }
}

/// EIP-2929 dependent warm/cold access surcharge, applied on top of the
/// schedule's already-fork-differentiated flat cost.
fn access_cost<Gas: CostType>(schedule: &Schedule, warm: bool, flat: usize) -> Gas {
    if schedule.eip2929 {
        Gas::from(if warm {
            schedule.warm_storage_read_cost
        } else {
            schedule.cold_account_access_cost
        })
    } else {
        Gas::from(flat)
    }
}

/// `gas - gas / 64` (EIP-150's 63/64 rule).
fn all_but_one_64th<Gas: CostType>(schedule: &Schedule, gas: Gas) -> Gas {
    match schedule.sub_gas_cap_divisor {
        Some(divisor) => gas - gas / Gas::from(divisor),
        None => gas,
    }
}

fn add_gas<Gas: CostType>(a: Gas, b: Gas) -> vm::Result<Gas> {
    let (sum, overflow) = a.overflow_add(b);
    if overflow {
        Err(vm::Error::OutOfGas)
    } else {
        Ok(sum)
    }
}

fn sub_gas<Gas: CostType>(a: Gas, b: Gas) -> vm::Result<Gas> {
    if a < b {
        Err(vm::Error::OutOfGas)
    } else {
        Ok(a - b)
    }
}

fn mul_gas<Gas: CostType>(a: Gas, b: Gas) -> vm::Result<Gas> {
    let (product, overflow) = a.overflow_mul(b);
    if overflow {
        Err(vm::Error::OutOfGas)
    } else {
        Ok(product)
    }
}

fn to_usize(value: U256) -> usize {
    if value > U256::from(u32::max_value()) {
        u32::max_value() as usize
    } else {
        value.low_u64() as usize
    }
}

fn to_word_size(value: U256) -> usize {
    let bytes = to_usize(value);
    (bytes + 31) / 32
}

fn u256_to_address(value: &U256) -> Address {
    Address::from(<H256 as BigEndianHash>::from_uint(value))
}

/// Highest byte offset a `(offset, size)` memory range touches, rounded up to
/// a whole number of words.
fn mem_needed(offset: &U256, size: &U256) -> vm::Result<usize> {
    if size.is_zero() {
        return Ok(0);
    }
    let (end, overflow) = offset.overflowing_add(*size);
    if overflow || end > U256::from(u32::max_value()) {
        return Err(vm::Error::OutOfGas);
    }
    Ok(to_word_size(end) * 32)
}

/// Reduces the per-transaction SSTORE refund counter per EIP-1283/EIP-3529's
/// dirty-storage-slot bookkeeping. Called from `SSTORE`'s handler, outside
/// the cost calculation above because it mutates the refund counter rather
/// than the current gas.
pub fn handle_eip1283_sstore_clears_refund(
    ext: &mut dyn Ext,
    original: &U256,
    current: &U256,
    new: &U256,
) {
    let sstore_clears_schedule = ext.schedule().sstore_refund_gas;

    if current == new {
        return;
    }

    if original == current {
        if !original.is_zero() && new.is_zero() {
            ext.add_sstore_refund(sstore_clears_schedule);
        }
    } else {
        if !original.is_zero() {
            if current.is_zero() {
                ext.sub_sstore_refund(sstore_clears_schedule);
            } else if new.is_zero() {
                ext.add_sstore_refund(sstore_clears_schedule);
            }
        }
        if original == new {
            if original.is_zero() {
                ext.add_sstore_refund(
                    ext.schedule().sstore_set_gas - ext.schedule().warm_storage_read_cost.max(ext.schedule().sload_gas),
                );
            } else {
                ext.add_sstore_refund(
                    ext.schedule().sstore_reset_gas - ext.schedule().warm_storage_read_cost.max(ext.schedule().sload_gas),
                );
            }
        }
    }
}
