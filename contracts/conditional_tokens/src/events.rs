use soroban_sdk::{symbol_short, Address, BytesN, Env, Vec};

pub fn condition_preparation(
    env: &Env,
    condition_id: &BytesN<32>,
    oracle: &Address,
    question_id: &BytesN<32>,
    outcome_slot_count: u32,
) {
    env.events().publish(
        (symbol_short!("cond_prep"), condition_id.clone(), oracle.clone()),
        (question_id.clone(), outcome_slot_count),
    );
}

pub fn condition_resolution(
    env: &Env,
    condition_id: &BytesN<32>,
    oracle: &Address,
    question_id: &BytesN<32>,
    payout_numerators: &Vec<u32>,
) {
    env.events().publish(
        (symbol_short!("cond_res"), condition_id.clone(), oracle.clone()),
        (question_id.clone(), payout_numerators.clone()),
    );
}

pub fn position_split(
    env: &Env,
    stakeholder: &Address,
    collateral: &Address,
    parent_collection_id: &BytesN<32>,
    condition_id: &BytesN<32>,
    partition: &Vec<BytesN<32>>,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("split"), stakeholder.clone(), condition_id.clone()),
        (
            collateral.clone(),
            parent_collection_id.clone(),
            partition.clone(),
            amount,
        ),
    );
}

pub fn positions_merge(
    env: &Env,
    stakeholder: &Address,
    collateral: &Address,
    parent_collection_id: &BytesN<32>,
    condition_id: &BytesN<32>,
    partition: &Vec<BytesN<32>>,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("merge"), stakeholder.clone(), condition_id.clone()),
        (
            collateral.clone(),
            parent_collection_id.clone(),
            partition.clone(),
            amount,
        ),
    );
}

pub fn payout_redemption(
    env: &Env,
    redeemer: &Address,
    collateral: &Address,
    parent_collection_id: &BytesN<32>,
    condition_id: &BytesN<32>,
    index_sets: &Vec<BytesN<32>>,
    payout: i128,
) {
    env.events().publish(
        (symbol_short!("redeem"), redeemer.clone(), condition_id.clone()),
        (
            collateral.clone(),
            parent_collection_id.clone(),
            index_sets.clone(),
            payout,
        ),
    );
}

pub fn transfer_single(
    env: &Env,
    operator: &Address,
    from: &Address,
    to: &Address,
    position_id: &BytesN<32>,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("transfer"), from.clone(), to.clone()),
        (operator.clone(), position_id.clone(), amount),
    );
}

pub fn approval_for_all(env: &Env, owner: &Address, operator: &Address, approved: bool) {
    env.events().publish(
        (symbol_short!("approval"), owner.clone(), operator.clone()),
        approved,
    );
}
