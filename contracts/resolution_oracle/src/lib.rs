#![no_std]

mod error;
mod events;
mod ledger;
mod storage;

pub use error::OracleError;
pub use storage::{ResolutionRecord, ResolutionStatus};
use ledger::LedgerClient;
use position_ids::condition_id;
use soroban_sdk::{
    contract, contractimpl, log, panic_with_error, symbol_short, Address, BytesN, Env, Vec,
};
use storage::DataKey;

/// Resolution Oracle Contract
///
/// Decides the payout vector of conditions prepared on the ledger in this
/// contract's name.
///
/// A resolver proposes payouts, which stay open to disputes for a fixed
/// window. An undisputed proposal is committed to the ledger once the window
/// has passed. A disputed proposal is never committed automatically; an
/// admin settles it with `admin_finalize_resolution`.
#[contract]
pub struct ResolutionOracle;

#[contractimpl]
impl ResolutionOracle {
    /// Constructor.
    ///
    /// # Arguments
    /// * `admin` - Initial admin, also granted the resolver role
    /// * `ledger` - Conditional tokens contract the payouts are reported to
    /// * `dispute_window` - Seconds a proposal stays open to disputes
    pub fn __constructor(env: Env, admin: Address, ledger: Address, dispute_window: u64) {
        if dispute_window == 0 {
            panic_with_error!(&env, OracleError::InvalidDisputeWindow);
        }

        env.storage().instance().set(&DataKey::Ledger, &ledger);
        storage::set_dispute_window(&env, dispute_window);
        storage::set_role(&env, &DataKey::Admin(admin.clone()), true);
        storage::set_role(&env, &DataKey::Resolver(admin), true);
    }

    /// Propose payouts for a condition (resolver only).
    ///
    /// # Arguments
    /// * `resolver` - Proposing resolver
    /// * `question_id` - Question the condition was prepared with
    /// * `outcome_slot_count` - Slot count the condition was prepared with
    /// * `payouts` - One numerator per outcome slot
    ///
    /// # Returns
    /// Timestamp at which the dispute window closes
    pub fn propose_resolution(
        env: Env,
        resolver: Address,
        question_id: BytesN<32>,
        outcome_slot_count: u32,
        payouts: Vec<u32>,
    ) -> Result<u64, OracleError> {
        Self::require_resolver(&env, &resolver)?;
        Self::check_payouts(&payouts, outcome_slot_count)?;

        let id = Self::condition_of(&env, &question_id, outcome_slot_count);
        if storage::resolution(&env, &id).is_some() {
            return Err(OracleError::AlreadyResolved);
        }

        let now = env.ledger().timestamp();
        let dispute_ends_at = now
            .checked_add(storage::dispute_window(&env)?)
            .ok_or(OracleError::Overflow)?;

        storage::set_resolution(
            &env,
            &id,
            &ResolutionRecord {
                status: ResolutionStatus::Proposed,
                payouts: payouts.clone(),
                proposer: Some(resolver.clone()),
                proposed_at: now,
                dispute_ends_at,
                disputer: None,
            },
        );

        events::resolution_proposed(&env, &id, &question_id, &resolver, &payouts, dispute_ends_at);
        log!(&env, "resolution proposed", id, dispute_ends_at);

        Ok(dispute_ends_at)
    }

    /// Challenge a pending proposal. Anyone may dispute while the window is open.
    pub fn dispute_resolution(
        env: Env,
        disputer: Address,
        question_id: BytesN<32>,
        outcome_slot_count: u32,
    ) -> Result<(), OracleError> {
        disputer.require_auth();

        let id = Self::condition_of(&env, &question_id, outcome_slot_count);
        let mut record = Self::require_proposed(&env, &id)?;
        if env.ledger().timestamp() >= record.dispute_ends_at {
            return Err(OracleError::DisputePeriodElapsed);
        }

        record.status = ResolutionStatus::Disputed;
        record.disputer = Some(disputer.clone());
        storage::set_resolution(&env, &id, &record);

        events::resolution_disputed(&env, &id, &disputer);
        log!(&env, "resolution disputed", id);

        Ok(())
    }

    /// Commit an undisputed proposal to the ledger once its window has passed
    /// (resolver only).
    pub fn finalize_resolution(
        env: Env,
        resolver: Address,
        question_id: BytesN<32>,
        outcome_slot_count: u32,
    ) -> Result<(), OracleError> {
        Self::require_resolver(&env, &resolver)?;

        let id = Self::condition_of(&env, &question_id, outcome_slot_count);
        let mut record = Self::require_proposed(&env, &id)?;
        if env.ledger().timestamp() < record.dispute_ends_at {
            return Err(OracleError::DisputePeriodActive);
        }

        record.status = ResolutionStatus::Finalized;
        storage::set_resolution(&env, &id, &record);

        Self::commit(&env, &id, &question_id, &record.payouts, false)
    }

    /// Finalize with the given payouts, skipping the proposal and dispute
    /// window (admin only). Settles disputed proposals.
    pub fn admin_finalize_resolution(
        env: Env,
        admin: Address,
        question_id: BytesN<32>,
        outcome_slot_count: u32,
        payouts: Vec<u32>,
    ) -> Result<(), OracleError> {
        Self::require_admin(&env, &admin)?;
        Self::check_payouts(&payouts, outcome_slot_count)?;

        let id = Self::condition_of(&env, &question_id, outcome_slot_count);
        let record = match storage::resolution(&env, &id) {
            Some(record) if record.status == ResolutionStatus::Finalized => {
                return Err(OracleError::AlreadyResolved);
            }
            Some(record) => ResolutionRecord {
                status: ResolutionStatus::Finalized,
                payouts: payouts.clone(),
                ..record
            },
            None => {
                let now = env.ledger().timestamp();
                ResolutionRecord {
                    status: ResolutionStatus::Finalized,
                    payouts: payouts.clone(),
                    proposer: None,
                    proposed_at: now,
                    dispute_ends_at: now,
                    disputer: None,
                }
            }
        };
        storage::set_resolution(&env, &id, &record);

        Self::commit(&env, &id, &question_id, &payouts, true)
    }

    // --- Administration ---

    /// Grant the resolver role (admin only).
    pub fn add_resolver(env: Env, admin: Address, resolver: Address) -> Result<(), OracleError> {
        Self::require_admin(&env, &admin)?;
        storage::set_role(&env, &DataKey::Resolver(resolver.clone()), true);
        events::role_changed(&env, symbol_short!("resolver"), &resolver, &admin, true);
        Ok(())
    }

    /// Revoke the resolver role (admin only).
    pub fn remove_resolver(
        env: Env,
        admin: Address,
        resolver: Address,
    ) -> Result<(), OracleError> {
        Self::require_admin(&env, &admin)?;
        storage::set_role(&env, &DataKey::Resolver(resolver.clone()), false);
        events::role_changed(&env, symbol_short!("resolver"), &resolver, &admin, false);
        Ok(())
    }

    /// Grant the admin role (admin only).
    pub fn add_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), OracleError> {
        Self::require_admin(&env, &admin)?;
        storage::set_role(&env, &DataKey::Admin(new_admin.clone()), true);
        events::role_changed(&env, symbol_short!("admin"), &new_admin, &admin, true);
        Ok(())
    }

    /// Revoke the admin role (admin only).
    pub fn remove_admin(env: Env, admin: Address, target: Address) -> Result<(), OracleError> {
        Self::require_admin(&env, &admin)?;
        storage::set_role(&env, &DataKey::Admin(target.clone()), false);
        events::role_changed(&env, symbol_short!("admin"), &target, &admin, false);
        Ok(())
    }

    /// Change the dispute window for future proposals (admin only).
    pub fn set_dispute_window(env: Env, admin: Address, seconds: u64) -> Result<(), OracleError> {
        Self::require_admin(&env, &admin)?;
        if seconds == 0 {
            return Err(OracleError::InvalidDisputeWindow);
        }

        let old_window = storage::dispute_window(&env)?;
        storage::set_dispute_window(&env, seconds);

        events::dispute_window_updated(&env, old_window, seconds);
        Ok(())
    }

    // --- Views ---

    /// Resolution record of a condition, if one was proposed or forced.
    pub fn get_resolution(
        env: Env,
        question_id: BytesN<32>,
        outcome_slot_count: u32,
    ) -> Option<ResolutionRecord> {
        storage::resolution(&env, &Self::condition_of(&env, &question_id, outcome_slot_count))
    }

    /// Lifecycle state; `Unresolved` when no record exists.
    pub fn get_status(
        env: Env,
        question_id: BytesN<32>,
        outcome_slot_count: u32,
    ) -> ResolutionStatus {
        Self::get_resolution(env, question_id, outcome_slot_count)
            .map(|record| record.status)
            .unwrap_or(ResolutionStatus::Unresolved)
    }

    /// Whether `finalize_resolution` would succeed now.
    pub fn ready_to_finalize(env: Env, question_id: BytesN<32>, outcome_slot_count: u32) -> bool {
        let now = env.ledger().timestamp();
        match Self::get_resolution(env, question_id, outcome_slot_count) {
            Some(record) => {
                record.status == ResolutionStatus::Proposed && now >= record.dispute_ends_at
            }
            None => false,
        }
    }

    /// Whether `account` may propose and finalize.
    pub fn is_resolver(env: Env, account: Address) -> bool {
        storage::has_role(&env, &DataKey::Resolver(account))
    }

    /// Whether `account` is an admin.
    pub fn is_admin(env: Env, account: Address) -> bool {
        storage::has_role(&env, &DataKey::Admin(account))
    }

    /// Dispute window in seconds applied to new proposals.
    pub fn get_dispute_window(env: Env) -> Result<u64, OracleError> {
        storage::dispute_window(&env)
    }

    /// Position ledger the payouts are reported to.
    pub fn get_ledger(env: Env) -> Result<Address, OracleError> {
        storage::ledger(&env)
    }

    // --- Internal helpers ---

    fn require_admin(env: &Env, caller: &Address) -> Result<(), OracleError> {
        if !storage::has_role(env, &DataKey::Admin(caller.clone())) {
            return Err(OracleError::NotAdmin);
        }
        caller.require_auth();
        Ok(())
    }

    fn require_resolver(env: &Env, caller: &Address) -> Result<(), OracleError> {
        if !storage::has_role(env, &DataKey::Resolver(caller.clone())) {
            return Err(OracleError::NotResolver);
        }
        caller.require_auth();
        Ok(())
    }

    fn require_proposed(env: &Env, id: &BytesN<32>) -> Result<ResolutionRecord, OracleError> {
        match storage::resolution(env, id) {
            Some(record) if record.status == ResolutionStatus::Proposed => Ok(record),
            _ => Err(OracleError::NotProposed),
        }
    }

    fn check_payouts(payouts: &Vec<u32>, outcome_slot_count: u32) -> Result<(), OracleError> {
        if payouts.len() != outcome_slot_count || payouts.iter().all(|p| p == 0) {
            return Err(OracleError::InvalidPayouts);
        }
        Ok(())
    }

    /// Conditions are prepared with this contract as their oracle.
    fn condition_of(env: &Env, question_id: &BytesN<32>, outcome_slot_count: u32) -> BytesN<32> {
        condition_id(
            env,
            &env.current_contract_address(),
            question_id,
            outcome_slot_count,
        )
    }

    fn commit(
        env: &Env,
        id: &BytesN<32>,
        question_id: &BytesN<32>,
        payouts: &Vec<u32>,
        overridden: bool,
    ) -> Result<(), OracleError> {
        LedgerClient::new(env, &storage::ledger(env)?).report_payouts(
            &env.current_contract_address(),
            question_id,
            payouts,
        );

        events::resolution_finalized(env, id, payouts, overridden);
        log!(env, "resolution finalized", id, overridden);
        Ok(())
    }
}

#[cfg(test)]
mod test;
