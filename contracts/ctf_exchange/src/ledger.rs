use soroban_sdk::{contractclient, Address, BytesN, Env, Vec};

/// The part of the conditional tokens ledger the exchange calls into.
#[allow(dead_code)]
#[contractclient(name = "LedgerClient")]
pub trait PositionLedger {
    fn split_position(
        env: Env,
        stakeholder: Address,
        collateral: Address,
        parent_collection_id: BytesN<32>,
        condition_id: BytesN<32>,
        partition: Vec<BytesN<32>>,
        amount: i128,
    );

    fn merge_positions(
        env: Env,
        stakeholder: Address,
        collateral: Address,
        parent_collection_id: BytesN<32>,
        condition_id: BytesN<32>,
        partition: Vec<BytesN<32>>,
        amount: i128,
    );

    fn transfer(env: Env, from: Address, to: Address, position_id: BytesN<32>, amount: i128);

    fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        position_id: BytesN<32>,
        amount: i128,
    );

    fn balance_of(env: Env, account: Address, position_id: BytesN<32>) -> i128;
}
