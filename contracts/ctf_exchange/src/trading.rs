//! Order validation and settlement.
//!
//! Settlement never trusts computed amounts alone: when the exchange sits
//! in the middle of a match it pays out of what it measurably gained
//! during that match, so a short mint or merge fails the whole call
//! instead of under-delivering. Balances the exchange already held before
//! the match are never paid out.

use position_ids::{index_set, root_collection};
use soroban_sdk::{
    auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation},
    log, token, vec, Address, BytesN, Env, IntoVal, Symbol, Vec,
};

use crate::calculator;
use crate::error::ExchangeError;
use crate::events;
use crate::ledger::LedgerClient;
use crate::order::{self, Order, Side};
use crate::storage;

/// Exchange balances at the start of a match, for the three assets a
/// match can touch: collateral, the taker order's token and its complement.
struct Baseline {
    token: BytesN<32>,
    collateral_balance: i128,
    token_balance: i128,
    complement_balance: i128,
}

impl Baseline {
    /// `token` must be registered.
    fn take(env: &Env, token: &BytesN<32>) -> Result<Self, ExchangeError> {
        let this = env.current_contract_address();
        let complement = storage::token_info(env, token)
            .ok_or(ExchangeError::InvalidTokenId)?
            .complement;
        Ok(Self {
            token: token.clone(),
            collateral_balance: balance_of(env, &Asset::Collateral, &this)?,
            token_balance: balance_of(env, &Asset::Position(token.clone()), &this)?,
            complement_balance: balance_of(env, &Asset::Position(complement), &this)?,
        })
    }

    /// Maker orders only ever trade the taker token or its complement.
    fn held(&self, asset: &Asset) -> i128 {
        match asset {
            Asset::Collateral => self.collateral_balance,
            Asset::Position(id) if *id == self.token => self.token_balance,
            Asset::Position(_) => self.complement_balance,
        }
    }

    /// Amount of `asset` the exchange holds on top of its starting balance.
    fn gained(&self, env: &Env, asset: &Asset) -> Result<i128, ExchangeError> {
        balance_of(env, asset, &env.current_contract_address())?
            .checked_sub(self.held(asset))
            .ok_or(ExchangeError::Overflow)
    }
}

/// Something an order gives or receives.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Asset {
    Collateral,
    Position(BytesN<32>),
}

impl Asset {
    pub fn given_by(order: &Order) -> Self {
        match order.side {
            Side::Buy => Asset::Collateral,
            Side::Sell => Asset::Position(order.token_id.clone()),
        }
    }

    pub fn received_by(order: &Order) -> Self {
        match order.side {
            Side::Buy => Asset::Position(order.token_id.clone()),
            Side::Sell => Asset::Collateral,
        }
    }
}

/// How a maker order settles against the taker order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchType {
    /// Buy against sell of the same token
    Complementary,
    /// Two buys of complementary tokens, funded by splitting collateral
    Mint,
    /// Two sells of complementary tokens, settled by merging into collateral
    Merge,
}

impl MatchType {
    pub fn derive(taker: Side, maker: Side) -> Self {
        match (taker, maker) {
            (Side::Buy, Side::Buy) => MatchType::Mint,
            (Side::Sell, Side::Sell) => MatchType::Merge,
            _ => MatchType::Complementary,
        }
    }
}

/// Run every order check and return the order hash.
///
/// Checks run in a fixed order so the reported error is stable:
/// signature, expiration, fee, nonce, token, fill state, amounts.
pub fn validate_order(env: &Env, order: &Order) -> Result<BytesN<32>, ExchangeError> {
    let digest = order::order_digest(env, order);

    let recovered = order::recover_signer(env, &digest, &order.signature)
        .ok_or(ExchangeError::InvalidSignature)?;
    if recovered != order.signer {
        return Err(ExchangeError::InvalidSignature);
    }
    if storage::signer_owner(env, &order.signer).as_ref() != Some(&order.maker) {
        return Err(ExchangeError::InvalidSignature);
    }

    if order.expiration != 0 && order.expiration < env.ledger().timestamp() {
        return Err(ExchangeError::OrderExpired);
    }

    if order.fee_rate_bps > storage::max_fee_rate(env)? {
        return Err(ExchangeError::FeeTooHigh);
    }

    if order.nonce != storage::nonce(env, &order.maker) {
        return Err(ExchangeError::InvalidNonce);
    }

    if storage::token_info(env, &order.token_id).is_none() {
        return Err(ExchangeError::InvalidTokenId);
    }

    let order_hash = digest.to_bytes();
    if storage::order_status(env, &order_hash).is_filled_or_cancelled {
        return Err(ExchangeError::OrderFilledOrCancelled);
    }

    if order.maker_amount <= 0 || order.taker_amount <= 0 {
        return Err(ExchangeError::InvalidAmount);
    }

    Ok(order_hash)
}

/// Validate the order, consume `making` of its remaining amount and
/// return (taking, order_hash).
fn perform_order_checks(
    env: &Env,
    order: &Order,
    making: i128,
) -> Result<(i128, BytesN<32>), ExchangeError> {
    if making <= 0 {
        return Err(ExchangeError::InvalidAmount);
    }

    let order_hash = validate_order(env, order)?;
    let taking = calculator::taking_amount(making, order.maker_amount, order.taker_amount)?;

    let mut status = storage::order_status(env, &order_hash);
    let remaining = if status.remaining == 0 {
        order.maker_amount
    } else {
        status.remaining
    };
    if making > remaining {
        return Err(ExchangeError::ExceedsRemaining);
    }
    status.remaining = remaining - making;
    status.is_filled_or_cancelled = status.remaining == 0;
    storage::set_order_status(env, &order_hash, &status);

    Ok((taking, order_hash))
}

/// Fill `making` of `order` directly against `taker`.
///
/// The taker receives the maker asset minus the fee, the operator receives
/// the fee in that same asset, and the maker receives the full taking
/// amount. Returns the taking amount.
pub fn fill_order(
    env: &Env,
    operator: &Address,
    taker: &Address,
    order: &Order,
    making: i128,
) -> Result<i128, ExchangeError> {
    let (taking, order_hash) = perform_order_checks(env, order, making)?;
    if let Some(restricted) = &order.taker {
        if restricted != taker {
            return Err(ExchangeError::NotTaker);
        }
    }
    let fee = calculator::fee_amount(making, order.fee_rate_bps)?;

    let given = Asset::given_by(order);
    let received = Asset::received_by(order);

    transfer(env, &given, &order.maker, taker, making - fee)?;
    transfer(env, &given, &order.maker, operator, fee)?;
    transfer(env, &received, taker, &order.maker, taking)?;

    events::order_filled(
        env,
        &order_hash,
        &order.maker,
        taker,
        &order.token_id,
        order.side,
        making,
        taking,
        fee,
    );

    Ok(taking)
}

/// Fill the taker order against `maker_orders`, with the exchange as the
/// counterparty of every leg.
///
/// The taker order's maker asset is pulled into the exchange up front;
/// each maker order is settled against it (minting or merging through the
/// ledger when the orders trade complementary tokens); the taker order's
/// maker then receives everything the exchange collected, minus fees, plus
/// a refund of any unused maker asset.
pub fn match_orders(
    env: &Env,
    operator: &Address,
    taker_order: &Order,
    maker_orders: &Vec<Order>,
    taker_fill_amount: i128,
    maker_fill_amounts: &Vec<i128>,
) -> Result<(), ExchangeError> {
    if maker_orders.len() != maker_fill_amounts.len() {
        return Err(ExchangeError::LengthMismatch);
    }

    let this = env.current_contract_address();
    let making = taker_fill_amount;
    let (taking, taker_hash) = perform_order_checks(env, taker_order, making)?;
    if let Some(restricted) = &taker_order.taker {
        if restricted != operator {
            return Err(ExchangeError::NotTaker);
        }
    }

    let given = Asset::given_by(taker_order);
    let received = Asset::received_by(taker_order);
    let baseline = Baseline::take(env, &taker_order.token_id)?;

    transfer(env, &given, &taker_order.maker, &this, making)?;

    for (maker_order, fill_amount) in maker_orders.iter().zip(maker_fill_amounts.iter()) {
        fill_maker_order(env, operator, taker_order, &maker_order, fill_amount, &baseline)?;
    }

    let proceeds = baseline.gained(env, &received)?;
    if proceeds < taking {
        return Err(ExchangeError::TooLittleReceived);
    }
    let fee = calculator::fee_amount(proceeds, taker_order.fee_rate_bps)?;

    transfer(env, &received, &this, &taker_order.maker, proceeds - fee)?;
    transfer(env, &received, &this, operator, fee)?;

    let leftover = baseline.gained(env, &given)?;
    if leftover > 0 {
        transfer(env, &given, &this, &taker_order.maker, leftover)?;
    }

    events::order_filled(
        env,
        &taker_hash,
        &taker_order.maker,
        &this,
        &taker_order.token_id,
        taker_order.side,
        making,
        proceeds,
        fee,
    );
    events::orders_matched(
        env,
        &taker_hash,
        &taker_order.maker,
        &taker_order.token_id,
        making,
        proceeds,
    );
    log!(env, "orders matched", taker_hash, maker_orders.len(), proceeds);

    Ok(())
}

fn fill_maker_order(
    env: &Env,
    operator: &Address,
    taker_order: &Order,
    maker_order: &Order,
    making: i128,
    baseline: &Baseline,
) -> Result<(), ExchangeError> {
    let match_type = MatchType::derive(taker_order.side, maker_order.side);
    validate_taker_and_maker(env, taker_order, maker_order, match_type)?;

    let (taking, order_hash) = perform_order_checks(env, maker_order, making)?;
    if let Some(restricted) = &maker_order.taker {
        if *restricted != taker_order.maker {
            return Err(ExchangeError::NotTaker);
        }
    }
    let fee = calculator::fee_amount(taking, maker_order.fee_rate_bps)?;

    let this = env.current_contract_address();
    let given = Asset::given_by(maker_order);
    let received = Asset::received_by(maker_order);

    transfer(env, &given, &maker_order.maker, &this, making)?;

    match match_type {
        MatchType::Mint => mint(env, &condition_of(env, &maker_order.token_id)?, taking)?,
        MatchType::Merge => merge(env, &condition_of(env, &maker_order.token_id)?, making)?,
        MatchType::Complementary => {}
    }

    if baseline.gained(env, &received)? < taking {
        return Err(ExchangeError::TooLittleReceived);
    }

    transfer(env, &received, &this, &maker_order.maker, taking - fee)?;
    transfer(env, &received, &this, operator, fee)?;

    events::order_filled(
        env,
        &order_hash,
        &maker_order.maker,
        &taker_order.maker,
        &maker_order.token_id,
        maker_order.side,
        making,
        taking,
        fee,
    );

    Ok(())
}

fn validate_taker_and_maker(
    env: &Env,
    taker_order: &Order,
    maker_order: &Order,
    match_type: MatchType,
) -> Result<(), ExchangeError> {
    if !calculator::is_crossing(taker_order, maker_order)? {
        return Err(ExchangeError::NotCrossing);
    }

    match match_type {
        MatchType::Complementary => {
            if taker_order.token_id != maker_order.token_id {
                return Err(ExchangeError::MismatchedTokenIds);
            }
        }
        MatchType::Mint | MatchType::Merge => {
            validate_complement(env, &taker_order.token_id, &maker_order.token_id)?;
        }
    }
    Ok(())
}

pub fn validate_complement(
    env: &Env,
    token: &BytesN<32>,
    complement: &BytesN<32>,
) -> Result<(), ExchangeError> {
    let info = storage::token_info(env, token).ok_or(ExchangeError::InvalidTokenId)?;
    if info.complement != *complement {
        return Err(ExchangeError::InvalidComplement);
    }
    Ok(())
}

fn condition_of(env: &Env, token: &BytesN<32>) -> Result<BytesN<32>, ExchangeError> {
    storage::token_info(env, token)
        .map(|info| info.condition_id)
        .ok_or(ExchangeError::InvalidTokenId)
}

fn binary_partition(env: &Env) -> Vec<BytesN<32>> {
    vec![
        env,
        index_set::to_bytes(env, &index_set::from_slots(&[0])),
        index_set::to_bytes(env, &index_set::from_slots(&[1])),
    ]
}

/// Split `amount` of the exchange's collateral into both outcome tokens.
fn mint(env: &Env, condition_id: &BytesN<32>, amount: i128) -> Result<(), ExchangeError> {
    let ledger = storage::ledger(env)?;
    let collateral = storage::collateral(env)?;
    let this = env.current_contract_address();

    // The ledger pulls the collateral from us one call deeper
    env.authorize_as_current_contract(vec![
        env,
        InvokerContractAuthEntry::Contract(SubContractInvocation {
            context: ContractContext {
                contract: collateral.clone(),
                fn_name: Symbol::new(env, "transfer"),
                args: (this.clone(), ledger.clone(), amount).into_val(env),
            },
            sub_invocations: vec![env],
        }),
    ]);

    LedgerClient::new(env, &ledger).split_position(
        &this,
        &collateral,
        &root_collection(env),
        condition_id,
        &binary_partition(env),
        &amount,
    );
    Ok(())
}

/// Merge `amount` of both outcome tokens held by the exchange into collateral.
fn merge(env: &Env, condition_id: &BytesN<32>, amount: i128) -> Result<(), ExchangeError> {
    let ledger = storage::ledger(env)?;
    let collateral = storage::collateral(env)?;
    let this = env.current_contract_address();

    LedgerClient::new(env, &ledger).merge_positions(
        &this,
        &collateral,
        &root_collection(env),
        condition_id,
        &binary_partition(env),
        &amount,
    );
    Ok(())
}

fn balance_of(env: &Env, asset: &Asset, account: &Address) -> Result<i128, ExchangeError> {
    Ok(match asset {
        Asset::Collateral => token::Client::new(env, &storage::collateral(env)?).balance(account),
        Asset::Position(id) => {
            LedgerClient::new(env, &storage::ledger(env)?).balance_of(account, id)
        }
    })
}

/// Move an asset. Outgoing moves from the exchange are plain transfers;
/// anything else goes through the allowance / operator approval the owner
/// granted the exchange.
fn transfer(
    env: &Env,
    asset: &Asset,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), ExchangeError> {
    if amount == 0 || from == to {
        return Ok(());
    }
    if amount < 0 {
        return Err(ExchangeError::InvalidAmount);
    }

    let this = env.current_contract_address();
    match asset {
        Asset::Collateral => {
            let client = token::Client::new(env, &storage::collateral(env)?);
            if *from == this {
                client.transfer(from, to, &amount);
            } else {
                client.transfer_from(&this, from, to, &amount);
            }
        }
        Asset::Position(id) => {
            let client = LedgerClient::new(env, &storage::ledger(env)?);
            if *from == this {
                client.transfer(from, to, id, &amount);
            } else {
                client.transfer_from(&this, from, to, id, &amount);
            }
        }
    }
    Ok(())
}
