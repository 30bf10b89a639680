use soroban_sdk::{contracttype, Address, BytesN, Env, Vec};

use crate::error::OracleError;

/// Storage keys for the contract.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Conditional tokens ledger the payouts are reported to
    Ledger,
    /// Seconds a proposal stays open to disputes
    DisputeWindow,
    /// Admin role: Admin(account)
    Admin(Address),
    /// Resolver role: Resolver(account)
    Resolver(Address),
    /// Resolution record: Resolution(condition_id)
    Resolution(BytesN<32>),
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ResolutionStatus {
    Unresolved = 0,
    Proposed = 1,
    Disputed = 2,
    Finalized = 3,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct ResolutionRecord {
    pub status: ResolutionStatus,
    pub payouts: Vec<u32>,
    /// None when an admin finalized without a proposal
    pub proposer: Option<Address>,
    pub proposed_at: u64,
    pub dispute_ends_at: u64,
    pub disputer: Option<Address>,
}

pub const DAY_IN_LEDGERS: u32 = 17280;
pub const BUMP_THRESHOLD: u32 = 14 * DAY_IN_LEDGERS;
pub const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

pub fn ledger(env: &Env) -> Result<Address, OracleError> {
    env.storage()
        .instance()
        .get(&DataKey::Ledger)
        .ok_or(OracleError::StorageCorrupted)
}

pub fn dispute_window(env: &Env) -> Result<u64, OracleError> {
    env.storage()
        .instance()
        .get(&DataKey::DisputeWindow)
        .ok_or(OracleError::StorageCorrupted)
}

pub fn set_dispute_window(env: &Env, seconds: u64) {
    env.storage()
        .instance()
        .set(&DataKey::DisputeWindow, &seconds);
}

pub fn has_role(env: &Env, key: &DataKey) -> bool {
    env.storage().instance().get(key).unwrap_or(false)
}

pub fn set_role(env: &Env, key: &DataKey, granted: bool) {
    if granted {
        env.storage().instance().set(key, &true);
    } else {
        env.storage().instance().remove(key);
    }
}

pub fn resolution(env: &Env, condition_id: &BytesN<32>) -> Option<ResolutionRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::Resolution(condition_id.clone()))
}

pub fn set_resolution(env: &Env, condition_id: &BytesN<32>, record: &ResolutionRecord) {
    let key = DataKey::Resolution(condition_id.clone());
    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, BUMP_THRESHOLD, BUMP_AMOUNT);
}
