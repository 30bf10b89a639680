use soroban_sdk::{contracttype, Address, BytesN, Env, Vec};

use crate::error::LedgerError;

/// Storage keys for the contract.
/// Everything lives in persistent storage: positions and conditions outlive
/// any single market and must not expire with the instance.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Prepared condition: Condition(condition_id)
    Condition(BytesN<32>),
    /// Position balance: Balance(owner, position_id)
    Balance(Address, BytesN<32>),
    /// Operator approval: Approval(owner, operator)
    Approval(Address, Address),
    /// Collateral received for top-level splits: Escrow(collateral, condition_id)
    Escrow(Address, BytesN<32>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Condition {
    pub outcome_slot_count: u32,
    /// One numerator per slot, all zero until reported
    pub payout_numerators: Vec<u32>,
    /// Sum of numerators; zero means unresolved
    pub payout_denominator: u64,
}

impl Condition {
    pub fn new(env: &Env, outcome_slot_count: u32) -> Self {
        let mut payout_numerators = Vec::new(env);
        for _ in 0..outcome_slot_count {
            payout_numerators.push_back(0u32);
        }
        Self {
            outcome_slot_count,
            payout_numerators,
            payout_denominator: 0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.payout_denominator != 0
    }
}

pub const DAY_IN_LEDGERS: u32 = 17280;
pub const BUMP_THRESHOLD: u32 = 14 * DAY_IN_LEDGERS;
pub const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

fn bump(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, BUMP_THRESHOLD, BUMP_AMOUNT);
}

pub fn read_condition(env: &Env, condition_id: &BytesN<32>) -> Option<Condition> {
    env.storage()
        .persistent()
        .get(&DataKey::Condition(condition_id.clone()))
}

pub fn write_condition(env: &Env, condition_id: &BytesN<32>, condition: &Condition) {
    let key = DataKey::Condition(condition_id.clone());
    env.storage().persistent().set(&key, condition);
    bump(env, &key);
}

pub fn balance(env: &Env, owner: &Address, position_id: &BytesN<32>) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Balance(owner.clone(), position_id.clone()))
        .unwrap_or(0)
}

fn set_balance(env: &Env, owner: &Address, position_id: &BytesN<32>, amount: i128) {
    let key = DataKey::Balance(owner.clone(), position_id.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        bump(env, &key);
    }
}

pub fn credit(
    env: &Env,
    owner: &Address,
    position_id: &BytesN<32>,
    amount: i128,
) -> Result<(), LedgerError> {
    let updated = balance(env, owner, position_id)
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;
    set_balance(env, owner, position_id, updated);
    Ok(())
}

pub fn debit(
    env: &Env,
    owner: &Address,
    position_id: &BytesN<32>,
    amount: i128,
) -> Result<(), LedgerError> {
    let current = balance(env, owner, position_id);
    if current < amount {
        return Err(LedgerError::InsufficientBalance);
    }
    set_balance(env, owner, position_id, current - amount);
    Ok(())
}

/// Burns the whole balance and returns what was held.
pub fn take_all(env: &Env, owner: &Address, position_id: &BytesN<32>) -> i128 {
    let held = balance(env, owner, position_id);
    if held != 0 {
        set_balance(env, owner, position_id, 0);
    }
    held
}

pub fn is_approved(env: &Env, owner: &Address, operator: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Approval(owner.clone(), operator.clone()))
        .unwrap_or(false)
}

pub fn set_approval(env: &Env, owner: &Address, operator: &Address, approved: bool) {
    let key = DataKey::Approval(owner.clone(), operator.clone());
    if approved {
        env.storage().persistent().set(&key, &true);
        bump(env, &key);
    } else {
        env.storage().persistent().remove(&key);
    }
}

pub fn escrow(env: &Env, collateral: &Address, condition_id: &BytesN<32>) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Escrow(collateral.clone(), condition_id.clone()))
        .unwrap_or(0)
}

pub fn add_escrow(
    env: &Env,
    collateral: &Address,
    condition_id: &BytesN<32>,
    amount: i128,
) -> Result<(), LedgerError> {
    let key = DataKey::Escrow(collateral.clone(), condition_id.clone());
    let updated = escrow(env, collateral, condition_id)
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;
    env.storage().persistent().set(&key, &updated);
    bump(env, &key);
    Ok(())
}

pub fn release_escrow(
    env: &Env,
    collateral: &Address,
    condition_id: &BytesN<32>,
    amount: i128,
) -> Result<(), LedgerError> {
    let key = DataKey::Escrow(collateral.clone(), condition_id.clone());
    let current = escrow(env, collateral, condition_id);
    // Top-level tokens only exist against escrowed collateral
    if current < amount {
        return Err(LedgerError::StorageCorrupted);
    }
    env.storage().persistent().set(&key, &(current - amount));
    bump(env, &key);
    Ok(())
}
