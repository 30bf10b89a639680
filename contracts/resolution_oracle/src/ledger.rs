use soroban_sdk::{contractclient, Address, BytesN, Env, Vec};

/// The ledger entry point the oracle commits final payouts through.
#[allow(dead_code)]
#[contractclient(name = "LedgerClient")]
pub trait PayoutLedger {
    fn report_payouts(env: Env, oracle: Address, question_id: BytesN<32>, payouts: Vec<u32>);
}
