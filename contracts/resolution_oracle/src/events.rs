use soroban_sdk::{symbol_short, Address, BytesN, Env, Symbol, Vec};

pub fn resolution_proposed(
    env: &Env,
    condition_id: &BytesN<32>,
    question_id: &BytesN<32>,
    proposer: &Address,
    payouts: &Vec<u32>,
    dispute_ends_at: u64,
) {
    env.events().publish(
        (symbol_short!("proposed"), condition_id.clone(), question_id.clone()),
        (proposer.clone(), payouts.clone(), dispute_ends_at),
    );
}

pub fn resolution_disputed(env: &Env, condition_id: &BytesN<32>, disputer: &Address) {
    env.events().publish(
        (symbol_short!("disputed"), condition_id.clone()),
        disputer.clone(),
    );
}

/// `overridden` marks an admin finalization that skipped the dispute window.
pub fn resolution_finalized(
    env: &Env,
    condition_id: &BytesN<32>,
    payouts: &Vec<u32>,
    overridden: bool,
) {
    env.events().publish(
        (symbol_short!("finalized"), condition_id.clone()),
        (payouts.clone(), overridden),
    );
}

pub fn dispute_window_updated(env: &Env, old_window: u64, new_window: u64) {
    env.events()
        .publish((symbol_short!("window"),), (old_window, new_window));
}

pub fn role_changed(env: &Env, role: Symbol, account: &Address, by: &Address, granted: bool) {
    env.events()
        .publish((role, account.clone()), (by.clone(), granted));
}
