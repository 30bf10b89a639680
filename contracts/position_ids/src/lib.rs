//! Content-addressed identifiers for conditions, collections and positions.
//!
//! Every identifier is a keccak256 digest over a canonical encoding of its
//! inputs, so any two parties computing the id of the same logical entity
//! get the same 32 bytes without consulting contract state:
//!
//! - condition:  keccak256(xdr(oracle) || question_id || be32(outcome_slot_count))
//! - collection: keccak256(parent_collection_id || condition_id || index_set)
//! - position:   keccak256(xdr(collateral) || collection_id)
//!
//! Addresses are encoded as their ScVal XDR, integers as fixed-width
//! big-endian. The root collection (no parent) is 32 zero bytes.
#![no_std]

pub mod index_set;

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env};

/// Smallest number of outcome slots a condition can have.
pub const MIN_OUTCOME_SLOTS: u32 = 2;

/// Largest number of outcome slots a condition can have (one bit per slot
/// in a 256-bit index set).
pub const MAX_OUTCOME_SLOTS: u32 = 256;

/// The parent collection id of top-level positions.
pub fn root_collection(env: &Env) -> BytesN<32> {
    BytesN::from_array(env, &[0u8; 32])
}

pub fn is_root_collection(collection_id: &BytesN<32>) -> bool {
    collection_id.to_array() == [0u8; 32]
}

pub fn condition_id(
    env: &Env,
    oracle: &Address,
    question_id: &BytesN<32>,
    outcome_slot_count: u32,
) -> BytesN<32> {
    let mut preimage: Bytes = oracle.clone().to_xdr(env);
    preimage.extend_from_array(&question_id.to_array());
    preimage.extend_from_array(&outcome_slot_count.to_be_bytes());
    env.crypto().keccak256(&preimage).to_bytes()
}

pub fn collection_id(
    env: &Env,
    parent_collection_id: &BytesN<32>,
    condition_id: &BytesN<32>,
    index_set: &BytesN<32>,
) -> BytesN<32> {
    let mut preimage = Bytes::new(env);
    preimage.extend_from_array(&parent_collection_id.to_array());
    preimage.extend_from_array(&condition_id.to_array());
    preimage.extend_from_array(&index_set.to_array());
    env.crypto().keccak256(&preimage).to_bytes()
}

pub fn position_id(env: &Env, collateral: &Address, collection_id: &BytesN<32>) -> BytesN<32> {
    let mut preimage: Bytes = collateral.clone().to_xdr(env);
    preimage.extend_from_array(&collection_id.to_array());
    env.crypto().keccak256(&preimage).to_bytes()
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::testutils::Address as _;

    #[test]
    fn test_ids_are_deterministic() {
        let env = Env::default();
        let oracle = Address::generate(&env);
        let question = BytesN::from_array(&env, &[7u8; 32]);

        let a = condition_id(&env, &oracle, &question, 2);
        let b = condition_id(&env, &oracle, &question, 2);
        assert_eq!(a, b);

        let yes = index_set::to_bytes(&env, &index_set::from_slots(&[0]));
        let c1 = collection_id(&env, &root_collection(&env), &a, &yes);
        let c2 = collection_id(&env, &root_collection(&env), &b, &yes);
        assert_eq!(c1, c2);

        let collateral = Address::generate(&env);
        assert_eq!(
            position_id(&env, &collateral, &c1),
            position_id(&env, &collateral, &c2)
        );
    }

    #[test]
    fn test_condition_id_binds_every_input() {
        let env = Env::default();
        let oracle = Address::generate(&env);
        let other_oracle = Address::generate(&env);
        let question = BytesN::from_array(&env, &[1u8; 32]);
        let other_question = BytesN::from_array(&env, &[2u8; 32]);

        let base = condition_id(&env, &oracle, &question, 2);
        assert_ne!(base, condition_id(&env, &other_oracle, &question, 2));
        assert_ne!(base, condition_id(&env, &oracle, &other_question, 2));
        assert_ne!(base, condition_id(&env, &oracle, &question, 3));
    }

    #[test]
    fn test_nested_collection_differs_from_root() {
        let env = Env::default();
        let oracle = Address::generate(&env);
        let condition = condition_id(&env, &oracle, &BytesN::from_array(&env, &[3u8; 32]), 2);
        let yes = index_set::to_bytes(&env, &index_set::from_slots(&[0]));

        let top = collection_id(&env, &root_collection(&env), &condition, &yes);
        let nested = collection_id(&env, &top, &condition, &yes);
        assert_ne!(top, nested);
        assert!(is_root_collection(&root_collection(&env)));
        assert!(!is_root_collection(&top));
    }
}
