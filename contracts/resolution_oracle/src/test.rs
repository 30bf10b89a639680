use super::*;
use conditional_tokens::{ConditionalTokens, ConditionalTokensClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    vec, Env,
};

const WINDOW: u64 = 7_200;

/// Returns (env, oracle_id, ledger_id, admin, question_id)
fn setup_test() -> (Env, Address, Address, Address, BytesN<32>) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_000);

    let admin = Address::generate(&env);
    let ledger_id = env.register(ConditionalTokens, ());
    let oracle_id = env.register(ResolutionOracle, (admin.clone(), ledger_id.clone(), WINDOW));

    let question_id = BytesN::from_array(&env, &[1u8; 32]);
    ConditionalTokensClient::new(&env, &ledger_id).prepare_condition(&oracle_id, &question_id, &2);

    (env, oracle_id, ledger_id, admin, question_id)
}

#[test]
fn test_constructor() {
    let (env, oracle_id, ledger_id, admin, _) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    assert!(client.is_admin(&admin));
    assert!(client.is_resolver(&admin));
    assert_eq!(client.get_dispute_window(), WINDOW);
    assert_eq!(client.get_ledger(), ledger_id);
}

#[test]
#[should_panic(expected = "Error(Contract, #8)")] // InvalidDisputeWindow = 8
fn test_constructor_zero_window() {
    let env = Env::default();
    let admin = Address::generate(&env);
    let ledger = Address::generate(&env);
    env.register(ResolutionOracle, (admin, ledger, 0u64));
}

#[test]
fn test_propose_and_finalize() {
    let (env, oracle_id, ledger_id, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);
    let ledger = ConditionalTokensClient::new(&env, &ledger_id);

    assert_eq!(client.get_status(&q, &2), ResolutionStatus::Unresolved);

    let ends_at = client.propose_resolution(&admin, &q, &2, &vec![&env, 1u32, 0u32]);
    assert_eq!(ends_at, 1_000 + WINDOW);
    assert_eq!(client.get_status(&q, &2), ResolutionStatus::Proposed);
    assert!(!client.ready_to_finalize(&q, &2));

    let record = client.get_resolution(&q, &2).unwrap();
    assert_eq!(record.proposer, Some(admin.clone()));
    assert_eq!(record.proposed_at, 1_000);
    assert_eq!(record.disputer, None);

    env.ledger().set_timestamp(1_000 + WINDOW);
    assert!(client.ready_to_finalize(&q, &2));
    client.finalize_resolution(&admin, &q, &2);

    assert_eq!(client.get_status(&q, &2), ResolutionStatus::Finalized);
    let condition = ledger.get_condition_id(&oracle_id, &q, &2);
    assert_eq!(ledger.payout_numerators(&condition), vec![&env, 1u32, 0u32]);
    assert_eq!(ledger.payout_denominator(&condition), 1);
}

#[test]
fn test_finalize_before_window_fails() {
    let (env, oracle_id, _, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    client.propose_resolution(&admin, &q, &2, &vec![&env, 1u32, 0u32]);
    env.ledger().set_timestamp(1_000 + WINDOW - 1);

    let res = client.try_finalize_resolution(&admin, &q, &2);
    assert_eq!(res, Err(Ok(OracleError::DisputePeriodActive)));
}

#[test]
fn test_finalize_without_proposal_fails() {
    let (env, oracle_id, _, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    let res = client.try_finalize_resolution(&admin, &q, &2);
    assert_eq!(res, Err(Ok(OracleError::NotProposed)));
}

#[test]
fn test_disputed_proposal_is_never_committed() {
    let (env, oracle_id, ledger_id, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);
    let disputer = Address::generate(&env);

    client.propose_resolution(&admin, &q, &2, &vec![&env, 1u32, 0u32]);
    client.dispute_resolution(&disputer, &q, &2);

    let record = client.get_resolution(&q, &2).unwrap();
    assert_eq!(record.status, ResolutionStatus::Disputed);
    assert_eq!(record.disputer, Some(disputer));

    env.ledger().set_timestamp(1_000 + 10 * WINDOW);
    assert!(!client.ready_to_finalize(&q, &2));
    let res = client.try_finalize_resolution(&admin, &q, &2);
    assert_eq!(res, Err(Ok(OracleError::NotProposed)));

    let ledger = ConditionalTokensClient::new(&env, &ledger_id);
    let condition = ledger.get_condition_id(&oracle_id, &q, &2);
    assert_eq!(ledger.payout_denominator(&condition), 0);
}

#[test]
fn test_dispute_after_window_fails() {
    let (env, oracle_id, _, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    client.propose_resolution(&admin, &q, &2, &vec![&env, 1u32, 0u32]);
    env.ledger().set_timestamp(1_000 + WINDOW);

    let res = client.try_dispute_resolution(&Address::generate(&env), &q, &2);
    assert_eq!(res, Err(Ok(OracleError::DisputePeriodElapsed)));
}

#[test]
fn test_dispute_without_proposal_fails() {
    let (env, oracle_id, _, _, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    let res = client.try_dispute_resolution(&Address::generate(&env), &q, &2);
    assert_eq!(res, Err(Ok(OracleError::NotProposed)));
}

#[test]
fn test_admin_settles_dispute() {
    let (env, oracle_id, ledger_id, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    client.propose_resolution(&admin, &q, &2, &vec![&env, 1u32, 0u32]);
    client.dispute_resolution(&Address::generate(&env), &q, &2);
    client.admin_finalize_resolution(&admin, &q, &2, &vec![&env, 0u32, 1u32]);

    let record = client.get_resolution(&q, &2).unwrap();
    assert_eq!(record.status, ResolutionStatus::Finalized);
    assert_eq!(record.payouts, vec![&env, 0u32, 1u32]);
    assert_eq!(record.proposer, Some(admin.clone()));

    let ledger = ConditionalTokensClient::new(&env, &ledger_id);
    let condition = ledger.get_condition_id(&oracle_id, &q, &2);
    assert_eq!(ledger.payout_numerators(&condition), vec![&env, 0u32, 1u32]);

    let res = client.try_admin_finalize_resolution(&admin, &q, &2, &vec![&env, 1u32, 0u32]);
    assert_eq!(res, Err(Ok(OracleError::AlreadyResolved)));
}

#[test]
fn test_admin_finalize_without_proposal() {
    let (env, oracle_id, _, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    client.admin_finalize_resolution(&admin, &q, &2, &vec![&env, 1u32, 1u32]);

    let record = client.get_resolution(&q, &2).unwrap();
    assert_eq!(record.status, ResolutionStatus::Finalized);
    assert_eq!(record.proposer, None);

    let res = client.try_propose_resolution(&admin, &q, &2, &vec![&env, 1u32, 0u32]);
    assert_eq!(res, Err(Ok(OracleError::AlreadyResolved)));
}

#[test]
fn test_admin_finalize_requires_admin() {
    let (env, oracle_id, _, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);
    let resolver = Address::generate(&env);
    client.add_resolver(&admin, &resolver);

    let res = client.try_admin_finalize_resolution(&resolver, &q, &2, &vec![&env, 1u32, 0u32]);
    assert_eq!(res, Err(Ok(OracleError::NotAdmin)));
}

#[test]
fn test_propose_requires_resolver() {
    let (env, oracle_id, _, _, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    let res =
        client.try_propose_resolution(&Address::generate(&env), &q, &2, &vec![&env, 1u32, 0u32]);
    assert_eq!(res, Err(Ok(OracleError::NotResolver)));
}

#[test]
fn test_propose_invalid_payouts() {
    let (env, oracle_id, _, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    let res = client.try_propose_resolution(&admin, &q, &2, &vec![&env, 1u32]);
    assert_eq!(res, Err(Ok(OracleError::InvalidPayouts)));

    let res = client.try_propose_resolution(&admin, &q, &2, &vec![&env, 0u32, 0u32]);
    assert_eq!(res, Err(Ok(OracleError::InvalidPayouts)));
}

#[test]
#[should_panic(expected = "Error(Contract, #4)")] // AlreadyResolved = 4
fn test_propose_twice_fails() {
    let (env, oracle_id, _, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    client.propose_resolution(&admin, &q, &2, &vec![&env, 1u32, 0u32]);
    client.propose_resolution(&admin, &q, &2, &vec![&env, 0u32, 1u32]);
}

#[test]
fn test_dispute_window_applies_to_future_proposals() {
    let (env, oracle_id, _, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);

    let first = client.propose_resolution(&admin, &q, &2, &vec![&env, 1u32, 0u32]);
    client.set_dispute_window(&admin, &60);
    assert_eq!(client.get_dispute_window(), 60);

    let other = BytesN::from_array(&env, &[2u8; 32]);
    let second = client.propose_resolution(&admin, &other, &2, &vec![&env, 1u32, 0u32]);

    assert_eq!(first, 1_000 + WINDOW);
    assert_eq!(second, 1_060);
    assert_eq!(client.get_resolution(&q, &2).unwrap().dispute_ends_at, first);

    let res = client.try_set_dispute_window(&admin, &0);
    assert_eq!(res, Err(Ok(OracleError::InvalidDisputeWindow)));
}

#[test]
fn test_roles() {
    let (env, oracle_id, _, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);
    let resolver = Address::generate(&env);
    let admin2 = Address::generate(&env);

    client.add_resolver(&admin, &resolver);
    assert!(client.is_resolver(&resolver));
    client.propose_resolution(&resolver, &q, &2, &vec![&env, 1u32, 0u32]);

    client.remove_resolver(&admin, &resolver);
    assert!(!client.is_resolver(&resolver));
    env.ledger().set_timestamp(1_000 + WINDOW);
    let res = client.try_finalize_resolution(&resolver, &q, &2);
    assert_eq!(res, Err(Ok(OracleError::NotResolver)));

    client.add_admin(&admin, &admin2);
    client.remove_admin(&admin2, &admin);
    assert!(!client.is_admin(&admin));
    let res = client.try_add_resolver(&admin, &resolver);
    assert_eq!(res, Err(Ok(OracleError::NotAdmin)));
}

#[test]
fn test_finalized_condition_pays_out_on_ledger() {
    use soroban_sdk::token::{StellarAssetClient, TokenClient};

    let (env, oracle_id, ledger_id, admin, q) = setup_test();
    let client = ResolutionOracleClient::new(&env, &oracle_id);
    let ledger = ConditionalTokensClient::new(&env, &ledger_id);

    let collateral = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let holder = Address::generate(&env);
    StellarAssetClient::new(&env, &collateral).mint(&holder, &100);

    let condition = ledger.get_condition_id(&oracle_id, &q, &2);
    let root = position_ids::root_collection(&env);
    let yes = position_ids::index_set::to_bytes(&env, &position_ids::index_set::from_slots(&[0]));
    let no = position_ids::index_set::to_bytes(&env, &position_ids::index_set::from_slots(&[1]));
    ledger.split_position(
        &holder,
        &collateral,
        &root,
        &condition,
        &vec![&env, yes.clone(), no],
        &100,
    );

    client.propose_resolution(&admin, &q, &2, &vec![&env, 1u32, 0u32]);
    env.ledger().set_timestamp(1_000 + WINDOW);
    client.finalize_resolution(&admin, &q, &2);

    let paid = ledger.redeem_positions(&holder, &collateral, &root, &condition, &vec![&env, yes]);
    assert_eq!(paid, 100);
    assert_eq!(TokenClient::new(&env, &collateral).balance(&holder), 100);
}
