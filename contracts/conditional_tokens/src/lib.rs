#![no_std]

mod error;
mod events;
mod storage;

pub use error::LedgerError;
use position_ids::{
    collection_id, condition_id, index_set, is_root_collection, position_id, MAX_OUTCOME_SLOTS,
    MIN_OUTCOME_SLOTS,
};
use soroban_sdk::{contract, contractimpl, log, token, Address, BytesN, Env, Vec};
use storage::Condition;

/// Conditional Tokens Contract
///
/// Combinatorial position ledger for prediction markets.
///
/// Key features:
/// - Conditions are registered per (oracle, question, outcome slot count)
/// - Collateral is split into outcome positions and merged back 1:1
/// - Positions nest: a position can be split again on another condition
/// - The condition's oracle reports a payout vector, after which
///   positions redeem for their share of the escrowed collateral
///
/// Condition, collection and position ids are recomputed from their
/// inputs on every call (see `position_ids`), never looked up.
#[contract]
pub struct ConditionalTokens;

#[contractimpl]
impl ConditionalTokens {
    /// Register a condition.
    ///
    /// # Arguments
    /// * `oracle` - Address that will report the payouts
    /// * `question_id` - Identifier of the question, opaque to the ledger
    /// * `outcome_slot_count` - Number of outcomes, 2..=256
    ///
    /// # Returns
    /// The condition id
    pub fn prepare_condition(
        env: Env,
        oracle: Address,
        question_id: BytesN<32>,
        outcome_slot_count: u32,
    ) -> Result<BytesN<32>, LedgerError> {
        if !(MIN_OUTCOME_SLOTS..=MAX_OUTCOME_SLOTS).contains(&outcome_slot_count) {
            return Err(LedgerError::InvalidSlotCount);
        }

        let id = condition_id(&env, &oracle, &question_id, outcome_slot_count);
        if storage::read_condition(&env, &id).is_some() {
            return Err(LedgerError::AlreadyPrepared);
        }

        storage::write_condition(&env, &id, &Condition::new(&env, outcome_slot_count));

        events::condition_preparation(&env, &id, &oracle, &question_id, outcome_slot_count);
        log!(&env, "condition prepared", id, outcome_slot_count);

        Ok(id)
    }

    /// Split a position into one position per index set of `partition`.
    ///
    /// If the partition covers every slot, the source is the parent
    /// collection: collateral for the root collection, otherwise the parent
    /// position. If it covers only some slots, the source is the position
    /// for the union of the partition under the same parent.
    ///
    /// Collateral pulled from the stakeholder is measured by the ledger's
    /// balance delta; that measured amount is what gets minted.
    pub fn split_position(
        env: Env,
        stakeholder: Address,
        collateral: Address,
        parent_collection_id: BytesN<32>,
        condition_id: BytesN<32>,
        partition: Vec<BytesN<32>>,
        amount: i128,
    ) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }

        stakeholder.require_auth();

        let condition = Self::require_condition(&env, &condition_id)?;
        let full = index_set::full(condition.outcome_slot_count);
        let covered = Self::check_partition(&partition, &full)?;

        let minted = if covered == full {
            if is_root_collection(&parent_collection_id) {
                let received = Self::pull_collateral(&env, &collateral, &stakeholder, amount)?;
                storage::add_escrow(&env, &collateral, &condition_id, received)?;
                received
            } else {
                let parent = position_id(&env, &collateral, &parent_collection_id);
                storage::debit(&env, &stakeholder, &parent, amount)?;
                amount
            }
        } else {
            let union_collection = collection_id(
                &env,
                &parent_collection_id,
                &condition_id,
                &index_set::to_bytes(&env, &covered),
            );
            let source = position_id(&env, &collateral, &union_collection);
            storage::debit(&env, &stakeholder, &source, amount)?;
            amount
        };

        for set in partition.iter() {
            let child = position_id(
                &env,
                &collateral,
                &collection_id(&env, &parent_collection_id, &condition_id, &set),
            );
            storage::credit(&env, &stakeholder, &child, minted)?;
        }

        events::position_split(
            &env,
            &stakeholder,
            &collateral,
            &parent_collection_id,
            &condition_id,
            &partition,
            minted,
        );

        Ok(())
    }

    /// Merge the positions of `partition` back into their source.
    ///
    /// Exact inverse of `split_position`: every child position is burned by
    /// `amount` or nothing happens.
    pub fn merge_positions(
        env: Env,
        stakeholder: Address,
        collateral: Address,
        parent_collection_id: BytesN<32>,
        condition_id: BytesN<32>,
        partition: Vec<BytesN<32>>,
        amount: i128,
    ) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }

        stakeholder.require_auth();

        let condition = Self::require_condition(&env, &condition_id)?;
        let full = index_set::full(condition.outcome_slot_count);
        let covered = Self::check_partition(&partition, &full)?;

        let mut children = Vec::new(&env);
        for set in partition.iter() {
            let child = position_id(
                &env,
                &collateral,
                &collection_id(&env, &parent_collection_id, &condition_id, &set),
            );
            if storage::balance(&env, &stakeholder, &child) < amount {
                return Err(LedgerError::InsufficientBalance);
            }
            children.push_back(child);
        }
        for child in children.iter() {
            storage::debit(&env, &stakeholder, &child, amount)?;
        }

        if covered == full {
            if is_root_collection(&parent_collection_id) {
                storage::release_escrow(&env, &collateral, &condition_id, amount)?;
                token::Client::new(&env, &collateral).transfer(
                    &env.current_contract_address(),
                    &stakeholder,
                    &amount,
                );
            } else {
                let parent = position_id(&env, &collateral, &parent_collection_id);
                storage::credit(&env, &stakeholder, &parent, amount)?;
            }
        } else {
            let union_collection = collection_id(
                &env,
                &parent_collection_id,
                &condition_id,
                &index_set::to_bytes(&env, &covered),
            );
            let target = position_id(&env, &collateral, &union_collection);
            storage::credit(&env, &stakeholder, &target, amount)?;
        }

        events::positions_merge(
            &env,
            &stakeholder,
            &collateral,
            &parent_collection_id,
            &condition_id,
            &partition,
            amount,
        );

        Ok(())
    }

    /// Report the payout vector of a condition (oracle only).
    ///
    /// The condition is derived from the calling oracle, so an address can
    /// only ever resolve conditions prepared in its own name.
    ///
    /// # Arguments
    /// * `oracle` - Oracle the condition was prepared with (must authorize)
    /// * `question_id` - Question the condition was prepared with
    /// * `payouts` - One numerator per outcome slot; the length selects the condition
    pub fn report_payouts(
        env: Env,
        oracle: Address,
        question_id: BytesN<32>,
        payouts: Vec<u32>,
    ) -> Result<(), LedgerError> {
        oracle.require_auth();

        let id = condition_id(&env, &oracle, &question_id, payouts.len());
        let mut condition = Self::require_condition(&env, &id)?;
        if condition.is_resolved() {
            return Err(LedgerError::AlreadyResolved);
        }

        let mut denominator: u64 = 0;
        for numerator in payouts.iter() {
            denominator = denominator
                .checked_add(numerator as u64)
                .ok_or(LedgerError::Overflow)?;
        }
        if denominator == 0 {
            return Err(LedgerError::InvalidPayouts);
        }

        condition.payout_numerators = payouts.clone();
        condition.payout_denominator = denominator;
        storage::write_condition(&env, &id, &condition);

        events::condition_resolution(&env, &id, &oracle, &question_id, &payouts);
        log!(&env, "condition resolved", id, denominator);

        Ok(())
    }

    /// Redeem positions of a resolved condition.
    ///
    /// Each listed index set pays `balance * covered_numerators / denominator`,
    /// rounded down per index set, and its position is burned in full.
    /// The rounding remainder stays with the ledger.
    ///
    /// # Returns
    /// Total collateral (or parent position) credited to the redeemer
    pub fn redeem_positions(
        env: Env,
        redeemer: Address,
        collateral: Address,
        parent_collection_id: BytesN<32>,
        condition_id: BytesN<32>,
        index_sets: Vec<BytesN<32>>,
    ) -> Result<i128, LedgerError> {
        redeemer.require_auth();

        let condition = Self::require_condition(&env, &condition_id)?;
        if !condition.is_resolved() {
            return Err(LedgerError::ConditionNotResolved);
        }
        let denominator = condition.payout_denominator as i128;
        let full = index_set::full(condition.outcome_slot_count);

        let mut total_payout: i128 = 0;
        for set in index_sets.iter() {
            let slots = set.to_array();
            if index_set::is_empty(&slots) || !index_set::is_subset(&slots, &full) {
                return Err(LedgerError::InvalidIndexSet);
            }

            let mut numerator: i128 = 0;
            for slot in 0..condition.outcome_slot_count {
                if index_set::contains(&slots, slot) {
                    let share = condition
                        .payout_numerators
                        .get(slot)
                        .ok_or(LedgerError::StorageCorrupted)?;
                    numerator += share as i128;
                }
            }

            let position = position_id(
                &env,
                &collateral,
                &collection_id(&env, &parent_collection_id, &condition_id, &set),
            );
            let stake = storage::take_all(&env, &redeemer, &position);
            if stake > 0 {
                let payout = stake
                    .checked_mul(numerator)
                    .ok_or(LedgerError::Overflow)?
                    / denominator;
                total_payout = total_payout
                    .checked_add(payout)
                    .ok_or(LedgerError::Overflow)?;
            }
        }

        if total_payout > 0 {
            if is_root_collection(&parent_collection_id) {
                storage::release_escrow(&env, &collateral, &condition_id, total_payout)?;
                token::Client::new(&env, &collateral).transfer(
                    &env.current_contract_address(),
                    &redeemer,
                    &total_payout,
                );
            } else {
                let parent = position_id(&env, &collateral, &parent_collection_id);
                storage::credit(&env, &redeemer, &parent, total_payout)?;
            }
        }

        events::payout_redemption(
            &env,
            &redeemer,
            &collateral,
            &parent_collection_id,
            &condition_id,
            &index_sets,
            total_payout,
        );

        Ok(total_payout)
    }

    // --- Balances and transfers ---

    /// Balance of `account` in a position; 0 if never held.
    pub fn balance_of(env: Env, account: Address, position_id: BytesN<32>) -> i128 {
        storage::balance(&env, &account, &position_id)
    }

    /// Balances for paired `accounts` and `position_ids`.
    pub fn balance_of_batch(
        env: Env,
        accounts: Vec<Address>,
        position_ids: Vec<BytesN<32>>,
    ) -> Result<Vec<i128>, LedgerError> {
        if accounts.len() != position_ids.len() {
            return Err(LedgerError::LengthMismatch);
        }
        let mut balances = Vec::new(&env);
        for (account, id) in accounts.iter().zip(position_ids.iter()) {
            balances.push_back(storage::balance(&env, &account, &id));
        }
        Ok(balances)
    }

    /// Move `amount` of a position from `from` (must authorize) to `to`.
    pub fn transfer(
        env: Env,
        from: Address,
        to: Address,
        position_id: BytesN<32>,
        amount: i128,
    ) -> Result<(), LedgerError> {
        from.require_auth();
        Self::move_position(&env, &from, &from, &to, &position_id, amount)
    }

    /// Move `amount` of a position on behalf of `from`.
    ///
    /// `spender` must authorize and be `from` itself or an operator
    /// approved through `set_approval_for_all`.
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        position_id: BytesN<32>,
        amount: i128,
    ) -> Result<(), LedgerError> {
        spender.require_auth();
        Self::require_approved(&env, &from, &spender)?;
        Self::move_position(&env, &spender, &from, &to, &position_id, amount)
    }

    /// Move several positions from `from` to `to` in one call, all or nothing.
    ///
    /// Same approval rule as `transfer_from`.
    pub fn batch_transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        position_ids: Vec<BytesN<32>>,
        amounts: Vec<i128>,
    ) -> Result<(), LedgerError> {
        if position_ids.len() != amounts.len() {
            return Err(LedgerError::LengthMismatch);
        }
        spender.require_auth();
        Self::require_approved(&env, &from, &spender)?;
        for (id, amount) in position_ids.iter().zip(amounts.iter()) {
            Self::move_position(&env, &spender, &from, &to, &id, amount)?;
        }
        Ok(())
    }

    /// Let `operator` move every position of `owner` (or revoke it).
    pub fn set_approval_for_all(env: Env, owner: Address, operator: Address, approved: bool) {
        owner.require_auth();
        storage::set_approval(&env, &owner, &operator, approved);
        events::approval_for_all(&env, &owner, &operator, approved);
    }

    /// Whether `operator` may move the positions of `owner`.
    pub fn is_approved_for_all(env: Env, owner: Address, operator: Address) -> bool {
        storage::is_approved(&env, &owner, &operator)
    }

    // --- Views ---

    /// Condition id for an oracle, question and slot count.
    pub fn get_condition_id(
        env: Env,
        oracle: Address,
        question_id: BytesN<32>,
        outcome_slot_count: u32,
    ) -> BytesN<32> {
        condition_id(&env, &oracle, &question_id, outcome_slot_count)
    }

    /// Collection id of `index_set` under a condition, nested in `parent_collection_id`.
    pub fn get_collection_id(
        env: Env,
        parent_collection_id: BytesN<32>,
        condition_id: BytesN<32>,
        index_set: BytesN<32>,
    ) -> BytesN<32> {
        collection_id(&env, &parent_collection_id, &condition_id, &index_set)
    }

    /// Position id of a collection backed by `collateral`.
    pub fn get_position_id(env: Env, collateral: Address, collection_id: BytesN<32>) -> BytesN<32> {
        position_id(&env, &collateral, &collection_id)
    }

    /// Number of outcome slots, 0 if the condition was never prepared.
    pub fn get_outcome_slot_count(env: Env, condition_id: BytesN<32>) -> u32 {
        storage::read_condition(&env, &condition_id)
            .map(|condition| condition.outcome_slot_count)
            .unwrap_or(0)
    }

    /// Reported payout numerators; all zero until resolved.
    pub fn payout_numerators(env: Env, condition_id: BytesN<32>) -> Result<Vec<u32>, LedgerError> {
        Ok(Self::require_condition(&env, &condition_id)?.payout_numerators)
    }

    /// Sum of the numerators; 0 until resolved.
    pub fn payout_denominator(env: Env, condition_id: BytesN<32>) -> Result<u64, LedgerError> {
        Ok(Self::require_condition(&env, &condition_id)?.payout_denominator)
    }

    /// Collateral held for top-level positions of a condition, including
    /// any redemption rounding remainder.
    pub fn escrowed(env: Env, collateral: Address, condition_id: BytesN<32>) -> i128 {
        storage::escrow(&env, &collateral, &condition_id)
    }

    // --- Internal helpers ---

    fn require_condition(env: &Env, condition_id: &BytesN<32>) -> Result<Condition, LedgerError> {
        storage::read_condition(env, condition_id).ok_or(LedgerError::ConditionNotPrepared)
    }

    fn require_approved(env: &Env, owner: &Address, spender: &Address) -> Result<(), LedgerError> {
        if owner != spender && !storage::is_approved(env, owner, spender) {
            return Err(LedgerError::NotApproved);
        }
        Ok(())
    }

    /// Validate a partition and return the union of its index sets.
    fn check_partition(
        partition: &Vec<BytesN<32>>,
        full: &index_set::IndexSet,
    ) -> Result<index_set::IndexSet, LedgerError> {
        if partition.len() < 2 {
            return Err(LedgerError::InvalidPartition);
        }

        let mut covered = index_set::EMPTY;
        for set in partition.iter() {
            let slots = set.to_array();
            if index_set::is_empty(&slots)
                || !index_set::is_subset(&slots, full)
                || index_set::intersects(&slots, &covered)
            {
                return Err(LedgerError::InvalidPartition);
            }
            covered = index_set::union(&covered, &slots);
        }
        Ok(covered)
    }

    /// Pull collateral into the ledger and return what actually arrived.
    fn pull_collateral(
        env: &Env,
        collateral: &Address,
        from: &Address,
        amount: i128,
    ) -> Result<i128, LedgerError> {
        let token_client = token::Client::new(env, collateral);
        let this = env.current_contract_address();

        let before = token_client.balance(&this);
        token_client.transfer(from, &this, &amount);
        let after = token_client.balance(&this);

        let received = after.checked_sub(before).ok_or(LedgerError::Overflow)?;
        if received <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(received)
    }

    fn move_position(
        env: &Env,
        operator: &Address,
        from: &Address,
        to: &Address,
        position_id: &BytesN<32>,
        amount: i128,
    ) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        storage::debit(env, from, position_id, amount)?;
        storage::credit(env, to, position_id, amount)?;
        events::transfer_single(env, operator, from, to, position_id, amount);
        Ok(())
    }
}
