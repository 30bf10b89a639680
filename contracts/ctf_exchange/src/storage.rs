use soroban_sdk::{contracttype, Address, BytesN, Env};

use crate::error::ExchangeError;

/// Storage keys for the contract.
/// Configuration and roles live in instance storage, per-account and
/// per-order state in persistent storage.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Conditional tokens ledger contract
    Ledger,
    /// Collateral token contract
    Collateral,
    /// Fee rate ceiling in basis points
    MaxFeeRate,
    /// Whether fills and matches are halted
    Paused,
    /// Admin role: Admin(account)
    Admin(Address),
    /// Operator role: Operator(account)
    Operator(Address),
    /// Current nonce generation: Nonce(maker)
    Nonce(Address),
    /// Fill state: OrderStatus(order_hash)
    OrderStatus(BytesN<32>),
    /// Token pair registry: Registry(token_id)
    Registry(BytesN<32>),
    /// Maker a signing key is bound to: SignerOwner(public_key)
    SignerOwner(BytesN<65>),
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[contracttype]
pub struct OrderStatus {
    pub is_filled_or_cancelled: bool,
    /// Maker amount still fillable; zero until the first fill
    pub remaining: i128,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct TokenInfo {
    pub complement: BytesN<32>,
    pub condition_id: BytesN<32>,
}

/// Default fee ceiling: 10%.
pub const DEFAULT_MAX_FEE_RATE_BPS: u32 = 1_000;

/// A fee rate can never exceed 100%.
pub const MAX_FEE_RATE_LIMIT_BPS: u32 = 10_000;

pub const DAY_IN_LEDGERS: u32 = 17280;
pub const BUMP_THRESHOLD: u32 = 14 * DAY_IN_LEDGERS;
pub const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

fn bump(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, BUMP_THRESHOLD, BUMP_AMOUNT);
}

pub fn ledger(env: &Env) -> Result<Address, ExchangeError> {
    env.storage()
        .instance()
        .get(&DataKey::Ledger)
        .ok_or(ExchangeError::StorageCorrupted)
}

pub fn collateral(env: &Env) -> Result<Address, ExchangeError> {
    env.storage()
        .instance()
        .get(&DataKey::Collateral)
        .ok_or(ExchangeError::StorageCorrupted)
}

pub fn max_fee_rate(env: &Env) -> Result<u32, ExchangeError> {
    env.storage()
        .instance()
        .get(&DataKey::MaxFeeRate)
        .ok_or(ExchangeError::StorageCorrupted)
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
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

pub fn nonce(env: &Env, maker: &Address) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::Nonce(maker.clone()))
        .unwrap_or(0)
}

pub fn set_nonce(env: &Env, maker: &Address, nonce: u64) {
    let key = DataKey::Nonce(maker.clone());
    env.storage().persistent().set(&key, &nonce);
    bump(env, &key);
}

pub fn order_status(env: &Env, order_hash: &BytesN<32>) -> OrderStatus {
    env.storage()
        .persistent()
        .get(&DataKey::OrderStatus(order_hash.clone()))
        .unwrap_or_default()
}

pub fn set_order_status(env: &Env, order_hash: &BytesN<32>, status: &OrderStatus) {
    let key = DataKey::OrderStatus(order_hash.clone());
    env.storage().persistent().set(&key, status);
    bump(env, &key);
}

pub fn token_info(env: &Env, token_id: &BytesN<32>) -> Option<TokenInfo> {
    env.storage()
        .persistent()
        .get(&DataKey::Registry(token_id.clone()))
}

pub fn set_token_info(env: &Env, token_id: &BytesN<32>, info: &TokenInfo) {
    let key = DataKey::Registry(token_id.clone());
    env.storage().persistent().set(&key, info);
    bump(env, &key);
}

pub fn signer_owner(env: &Env, signer: &BytesN<65>) -> Option<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::SignerOwner(signer.clone()))
}

pub fn set_signer_owner(env: &Env, signer: &BytesN<65>, owner: Option<&Address>) {
    let key = DataKey::SignerOwner(signer.clone());
    match owner {
        Some(owner) => {
            env.storage().persistent().set(&key, owner);
            bump(env, &key);
        }
        None => env.storage().persistent().remove(&key),
    }
}
