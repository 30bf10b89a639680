#![no_std]

mod calculator;
mod error;
mod events;
mod ledger;
mod order;
mod storage;
mod trading;

pub use error::ExchangeError;
pub use order::{Order, Side};
pub use storage::{OrderStatus, TokenInfo};
use soroban_sdk::{contract, contractimpl, log, symbol_short, Address, BytesN, Env, Vec};
use storage::{DataKey, DEFAULT_MAX_FEE_RATE_BPS, MAX_FEE_RATE_LIMIT_BPS};

/// CTF Exchange Contract
///
/// Settles signed limit orders for conditional-token outcome positions
/// against collateral.
///
/// Key features:
/// - Orders are signed off-chain with secp256k1 keys bound to maker accounts
/// - Operators fill orders directly or match a taker order against makers
/// - Complementary outcome tokens can be matched buy/buy (mint) or
///   sell/sell (merge) through the ledger
/// - Makers cancel single orders, or all orders at once by bumping their nonce
/// - Admins register tradeable token pairs, manage roles, cap fees and
///   pause trading
///
/// Makers grant the exchange a collateral allowance and ledger operator
/// approval; the exchange moves balances only while settling a valid order.
#[contract]
pub struct CtfExchange;

#[contractimpl]
impl CtfExchange {
    /// Constructor.
    ///
    /// # Arguments
    /// * `admin` - Initial admin, also granted the operator role
    /// * `ledger` - Conditional tokens contract holding outcome positions
    /// * `collateral` - Collateral token all tokens are priced in
    pub fn __constructor(env: Env, admin: Address, ledger: Address, collateral: Address) {
        env.storage().instance().set(&DataKey::Ledger, &ledger);
        env.storage().instance().set(&DataKey::Collateral, &collateral);
        env.storage()
            .instance()
            .set(&DataKey::MaxFeeRate, &DEFAULT_MAX_FEE_RATE_BPS);
        env.storage().instance().set(&DataKey::Paused, &false);
        storage::set_role(&env, &DataKey::Admin(admin.clone()), true);
        storage::set_role(&env, &DataKey::Operator(admin), true);
    }

    // --- Trading ---

    /// Fill an order directly against `taker` (operator only).
    ///
    /// # Arguments
    /// * `operator` - Operator submitting the fill; receives the fee
    /// * `taker` - Counterparty paying the taker asset (must authorize)
    /// * `order` - Signed maker order
    /// * `fill_amount` - Amount of the maker asset to fill
    ///
    /// # Returns
    /// Amount of the taker asset paid to the maker
    pub fn fill_order(
        env: Env,
        operator: Address,
        taker: Address,
        order: Order,
        fill_amount: i128,
    ) -> Result<i128, ExchangeError> {
        Self::require_trading(&env, &operator)?;
        taker.require_auth();

        trading::fill_order(&env, &operator, &taker, &order, fill_amount)
    }

    /// Fill several orders against one taker, all or nothing.
    pub fn fill_orders(
        env: Env,
        operator: Address,
        taker: Address,
        orders: Vec<Order>,
        fill_amounts: Vec<i128>,
    ) -> Result<(), ExchangeError> {
        if orders.len() != fill_amounts.len() {
            return Err(ExchangeError::LengthMismatch);
        }
        Self::require_trading(&env, &operator)?;
        taker.require_auth();

        for (order, fill_amount) in orders.iter().zip(fill_amounts.iter()) {
            trading::fill_order(&env, &operator, &taker, &order, fill_amount)?;
        }
        Ok(())
    }

    /// Match a taker order against a list of maker orders (operator only).
    ///
    /// # Arguments
    /// * `taker_order` - Order filled by `taker_fill_amount` of its maker asset
    /// * `maker_orders` - Orders filled in sequence against the taker order
    /// * `maker_fill_amounts` - Maker asset amount to fill for each maker order
    pub fn match_orders(
        env: Env,
        operator: Address,
        taker_order: Order,
        maker_orders: Vec<Order>,
        taker_fill_amount: i128,
        maker_fill_amounts: Vec<i128>,
    ) -> Result<(), ExchangeError> {
        Self::require_trading(&env, &operator)?;

        trading::match_orders(
            &env,
            &operator,
            &taker_order,
            &maker_orders,
            taker_fill_amount,
            &maker_fill_amounts,
        )
    }

    /// Check an order without filling it. Available while paused.
    ///
    /// # Returns
    /// The order hash
    pub fn validate_order(env: Env, order: Order) -> Result<BytesN<32>, ExchangeError> {
        trading::validate_order(&env, &order)
    }

    /// Cancel an unfilled order (its maker only). Available while paused.
    pub fn cancel_order(env: Env, maker: Address, order: Order) -> Result<(), ExchangeError> {
        maker.require_auth();
        Self::cancel(&env, &maker, &order)
    }

    /// Cancel several orders of one maker, all or nothing.
    pub fn cancel_orders(
        env: Env,
        maker: Address,
        orders: Vec<Order>,
    ) -> Result<(), ExchangeError> {
        maker.require_auth();
        for order in orders.iter() {
            Self::cancel(&env, &maker, &order)?;
        }
        Ok(())
    }

    /// Invalidate every order `maker` signed under the current nonce.
    ///
    /// # Returns
    /// The new nonce
    pub fn increment_nonce(env: Env, maker: Address) -> Result<u64, ExchangeError> {
        maker.require_auth();

        let nonce = storage::nonce(&env, &maker)
            .checked_add(1)
            .ok_or(ExchangeError::Overflow)?;
        storage::set_nonce(&env, &maker, nonce);

        events::nonce_incremented(&env, &maker, nonce);
        Ok(nonce)
    }

    /// Nonce new orders of `maker` must carry.
    pub fn get_nonce(env: Env, maker: Address) -> u64 {
        storage::nonce(&env, &maker)
    }

    /// Whether `nonce` is the current nonce of `maker`.
    pub fn is_valid_nonce(env: Env, maker: Address, nonce: u64) -> bool {
        storage::nonce(&env, &maker) == nonce
    }

    // --- Signer keys ---

    /// Bind a secp256k1 key to `maker` so orders it signs count as the maker's.
    ///
    /// # Arguments
    /// * `maker` - Account the key will sign for (must authorize)
    /// * `signer` - Uncompressed public key
    /// * `proof` - Signature by `signer` over `signer_binding_digest(maker)`
    pub fn bind_signer(
        env: Env,
        maker: Address,
        signer: BytesN<65>,
        proof: BytesN<65>,
    ) -> Result<(), ExchangeError> {
        maker.require_auth();

        let digest = order::signer_binding_digest(&env, &maker);
        if order::recover_signer(&env, &digest, &proof) != Some(signer.clone()) {
            return Err(ExchangeError::InvalidSignature);
        }
        if let Some(owner) = storage::signer_owner(&env, &signer) {
            if owner != maker {
                return Err(ExchangeError::SignerTaken);
            }
        }

        storage::set_signer_owner(&env, &signer, Some(&maker));
        events::signer_bound(&env, &maker, &signer, true);
        Ok(())
    }

    /// Release a key bound to `maker`; orders it signed stop validating.
    pub fn unbind_signer(
        env: Env,
        maker: Address,
        signer: BytesN<65>,
    ) -> Result<(), ExchangeError> {
        maker.require_auth();

        if storage::signer_owner(&env, &signer) != Some(maker.clone()) {
            return Err(ExchangeError::NotOwner);
        }

        storage::set_signer_owner(&env, &signer, None);
        events::signer_bound(&env, &maker, &signer, false);
        Ok(())
    }

    /// Maker a key is bound to, if any.
    pub fn get_signer_owner(env: Env, signer: BytesN<65>) -> Option<Address> {
        storage::signer_owner(&env, &signer)
    }

    /// Digest a key signs as the proof for `bind_signer`.
    pub fn signer_binding_digest(env: Env, maker: Address) -> BytesN<32> {
        order::signer_binding_digest(&env, &maker).to_bytes()
    }

    // --- Hashing and order state ---

    /// Digest the maker signs; also the key of the order's fill state.
    pub fn hash_order(env: Env, order: Order) -> BytesN<32> {
        order::order_digest(&env, &order).to_bytes()
    }

    /// Domain hash binding signatures to this deployment and network.
    pub fn domain_separator(env: Env) -> BytesN<32> {
        order::domain_separator(&env)
    }

    /// Fill state of an order by hash; default for unseen orders.
    pub fn get_order_status(env: Env, order_hash: BytesN<32>) -> OrderStatus {
        storage::order_status(&env, &order_hash)
    }

    // --- Token registry ---

    /// Register an outcome token and its complement (admin only).
    ///
    /// Registration is symmetric: each token becomes the other's complement.
    pub fn register_token(
        env: Env,
        admin: Address,
        token: BytesN<32>,
        complement: BytesN<32>,
        condition_id: BytesN<32>,
    ) -> Result<(), ExchangeError> {
        Self::require_admin(&env, &admin)?;

        if token == complement {
            return Err(ExchangeError::InvalidComplement);
        }
        if storage::token_info(&env, &token).is_some()
            || storage::token_info(&env, &complement).is_some()
        {
            return Err(ExchangeError::AlreadyRegistered);
        }

        storage::set_token_info(
            &env,
            &token,
            &TokenInfo {
                complement: complement.clone(),
                condition_id: condition_id.clone(),
            },
        );
        storage::set_token_info(
            &env,
            &complement,
            &TokenInfo {
                complement: token.clone(),
                condition_id: condition_id.clone(),
            },
        );

        events::token_registered(&env, &token, &complement, &condition_id);
        events::token_registered(&env, &complement, &token, &condition_id);
        log!(&env, "token pair registered", condition_id);

        Ok(())
    }

    /// Complement of a registered token.
    pub fn get_complement(env: Env, token: BytesN<32>) -> Result<BytesN<32>, ExchangeError> {
        storage::token_info(&env, &token)
            .map(|info| info.complement)
            .ok_or(ExchangeError::InvalidTokenId)
    }

    /// Condition a registered token belongs to.
    pub fn get_condition_id(env: Env, token: BytesN<32>) -> Result<BytesN<32>, ExchangeError> {
        storage::token_info(&env, &token)
            .map(|info| info.condition_id)
            .ok_or(ExchangeError::InvalidTokenId)
    }

    /// Fails unless `complement` is registered as the complement of `token`.
    pub fn validate_complement(
        env: Env,
        token: BytesN<32>,
        complement: BytesN<32>,
    ) -> Result<(), ExchangeError> {
        trading::validate_complement(&env, &token, &complement)
    }

    // --- Administration ---

    /// Halt fills and matches (admin only). Cancels and nonce bumps still work.
    pub fn pause_trading(env: Env, admin: Address) -> Result<(), ExchangeError> {
        Self::require_admin(&env, &admin)?;
        env.storage().instance().set(&DataKey::Paused, &true);
        events::trading_paused(&env, &admin, true);
        Ok(())
    }

    /// Resume trading (admin only).
    pub fn unpause_trading(env: Env, admin: Address) -> Result<(), ExchangeError> {
        Self::require_admin(&env, &admin)?;
        env.storage().instance().set(&DataKey::Paused, &false);
        events::trading_paused(&env, &admin, false);
        Ok(())
    }

    /// Whether trading is paused.
    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    /// Set the fee rate ceiling in basis points (admin only, at most 10000).
    pub fn set_max_fee_rate(
        env: Env,
        admin: Address,
        max_fee_rate_bps: u32,
    ) -> Result<(), ExchangeError> {
        Self::require_admin(&env, &admin)?;
        if max_fee_rate_bps > MAX_FEE_RATE_LIMIT_BPS {
            return Err(ExchangeError::FeeTooHigh);
        }

        let old_rate = storage::max_fee_rate(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::MaxFeeRate, &max_fee_rate_bps);

        events::fee_rate_updated(&env, old_rate, max_fee_rate_bps);
        Ok(())
    }

    /// Fee rate ceiling in basis points.
    pub fn get_max_fee_rate(env: Env) -> Result<u32, ExchangeError> {
        storage::max_fee_rate(&env)
    }

    /// Grant the admin role (admin only).
    pub fn add_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), ExchangeError> {
        Self::require_admin(&env, &admin)?;
        storage::set_role(&env, &DataKey::Admin(new_admin.clone()), true);
        events::role_changed(&env, symbol_short!("admin"), &new_admin, &admin, true);
        Ok(())
    }

    /// Revoke the admin role (admin only).
    pub fn remove_admin(env: Env, admin: Address, target: Address) -> Result<(), ExchangeError> {
        Self::require_admin(&env, &admin)?;
        storage::set_role(&env, &DataKey::Admin(target.clone()), false);
        events::role_changed(&env, symbol_short!("admin"), &target, &admin, false);
        Ok(())
    }

    /// Grant the operator role (admin only).
    pub fn add_operator(env: Env, admin: Address, operator: Address) -> Result<(), ExchangeError> {
        Self::require_admin(&env, &admin)?;
        storage::set_role(&env, &DataKey::Operator(operator.clone()), true);
        events::role_changed(&env, symbol_short!("operator"), &operator, &admin, true);
        Ok(())
    }

    /// Revoke the operator role (admin only).
    pub fn remove_operator(
        env: Env,
        admin: Address,
        operator: Address,
    ) -> Result<(), ExchangeError> {
        Self::require_admin(&env, &admin)?;
        storage::set_role(&env, &DataKey::Operator(operator.clone()), false);
        events::role_changed(&env, symbol_short!("operator"), &operator, &admin, false);
        Ok(())
    }

    /// Drop the caller's own operator role.
    pub fn renounce_operator(env: Env, operator: Address) -> Result<(), ExchangeError> {
        Self::require_operator(&env, &operator)?;
        storage::set_role(&env, &DataKey::Operator(operator.clone()), false);
        events::role_changed(&env, symbol_short!("operator"), &operator, &operator, false);
        Ok(())
    }

    /// Whether `account` is an admin.
    pub fn is_admin(env: Env, account: Address) -> bool {
        storage::has_role(&env, &DataKey::Admin(account))
    }

    /// Whether `account` may submit fills and matches.
    pub fn is_operator(env: Env, account: Address) -> bool {
        storage::has_role(&env, &DataKey::Operator(account))
    }

    /// Position ledger contract.
    pub fn get_ledger(env: Env) -> Result<Address, ExchangeError> {
        storage::ledger(&env)
    }

    /// Collateral token contract.
    pub fn get_collateral(env: Env) -> Result<Address, ExchangeError> {
        storage::collateral(&env)
    }

    // --- Internal helpers ---

    fn require_admin(env: &Env, caller: &Address) -> Result<(), ExchangeError> {
        if !storage::has_role(env, &DataKey::Admin(caller.clone())) {
            return Err(ExchangeError::NotAdmin);
        }
        caller.require_auth();
        Ok(())
    }

    fn require_operator(env: &Env, caller: &Address) -> Result<(), ExchangeError> {
        if !storage::has_role(env, &DataKey::Operator(caller.clone())) {
            return Err(ExchangeError::NotOperator);
        }
        caller.require_auth();
        Ok(())
    }

    fn require_trading(env: &Env, operator: &Address) -> Result<(), ExchangeError> {
        Self::require_operator(env, operator)?;
        if storage::is_paused(env) {
            return Err(ExchangeError::Paused);
        }
        Ok(())
    }

    fn cancel(env: &Env, maker: &Address, order: &Order) -> Result<(), ExchangeError> {
        if order.maker != *maker {
            return Err(ExchangeError::NotOwner);
        }

        let order_hash = order::order_digest(env, order).to_bytes();
        let mut status = storage::order_status(env, &order_hash);
        if status.is_filled_or_cancelled {
            return Err(ExchangeError::OrderFilledOrCancelled);
        }

        status.is_filled_or_cancelled = true;
        storage::set_order_status(env, &order_hash, &status);

        events::order_cancelled(env, &order_hash, maker);
        Ok(())
    }
}
