use soroban_sdk::{symbol_short, Address, BytesN, Env, Symbol};

use crate::order::Side;

#[allow(clippy::too_many_arguments)]
pub fn order_filled(
    env: &Env,
    order_hash: &BytesN<32>,
    maker: &Address,
    taker: &Address,
    token_id: &BytesN<32>,
    side: Side,
    making: i128,
    taking: i128,
    fee: i128,
) {
    env.events().publish(
        (symbol_short!("filled"), order_hash.clone(), maker.clone()),
        (taker.clone(), token_id.clone(), side as u32, making, taking, fee),
    );
}

pub fn orders_matched(
    env: &Env,
    taker_order_hash: &BytesN<32>,
    taker_order_maker: &Address,
    token_id: &BytesN<32>,
    making: i128,
    taking: i128,
) {
    env.events().publish(
        (symbol_short!("matched"), taker_order_hash.clone(), taker_order_maker.clone()),
        (token_id.clone(), making, taking),
    );
}

pub fn order_cancelled(env: &Env, order_hash: &BytesN<32>, maker: &Address) {
    env.events().publish(
        (symbol_short!("cancelled"), order_hash.clone()),
        maker.clone(),
    );
}

pub fn nonce_incremented(env: &Env, maker: &Address, nonce: u64) {
    env.events()
        .publish((symbol_short!("nonce"), maker.clone()), nonce);
}

pub fn token_registered(
    env: &Env,
    token: &BytesN<32>,
    complement: &BytesN<32>,
    condition_id: &BytesN<32>,
) {
    env.events().publish(
        (symbol_short!("token_reg"), token.clone(), complement.clone()),
        condition_id.clone(),
    );
}

pub fn signer_bound(env: &Env, maker: &Address, signer: &BytesN<65>, bound: bool) {
    env.events().publish(
        (symbol_short!("signer"), maker.clone()),
        (signer.clone(), bound),
    );
}

pub fn trading_paused(env: &Env, admin: &Address, paused: bool) {
    let topic = if paused {
        symbol_short!("paused")
    } else {
        symbol_short!("unpaused")
    };
    env.events().publish((topic, admin.clone()), ());
}

pub fn fee_rate_updated(env: &Env, old_rate: u32, new_rate: u32) {
    env.events()
        .publish((symbol_short!("fee_rate"),), (old_rate, new_rate));
}

/// `role` is "admin" or "operator".
pub fn role_changed(env: &Env, role: Symbol, account: &Address, by: &Address, granted: bool) {
    env.events()
        .publish((role, account.clone()), (by.clone(), granted));
}
