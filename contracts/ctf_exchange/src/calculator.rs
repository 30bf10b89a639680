//! Order price arithmetic.
//!
//! Prices are collateral per outcome token in fixed point with `ONE`
//! (10^18) as the unit. All arithmetic is checked i128; intermediate
//! products overflow only for amounts above ~10^20 base units.

use crate::error::ExchangeError;
use crate::order::{Order, Side};

/// Fixed-point unit for prices.
pub const ONE: i128 = 1_000_000_000_000_000_000;

/// Basis points denominator (100% = 10000 bp).
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Amount the maker receives for giving `making`, at the order's ratio.
/// Rounds down.
pub fn taking_amount(
    making: i128,
    maker_amount: i128,
    taker_amount: i128,
) -> Result<i128, ExchangeError> {
    if maker_amount <= 0 {
        return Err(ExchangeError::InvalidAmount);
    }
    making
        .checked_mul(taker_amount)
        .ok_or(ExchangeError::Overflow)?
        .checked_div(maker_amount)
        .ok_or(ExchangeError::Overflow)
}

/// Fee on `amount` at `fee_rate_bps`. Rounds down, so amounts below
/// 10000 / fee_rate_bps pay nothing.
pub fn fee_amount(amount: i128, fee_rate_bps: u32) -> Result<i128, ExchangeError> {
    amount
        .checked_mul(fee_rate_bps as i128)
        .ok_or(ExchangeError::Overflow)?
        .checked_div(BPS_DENOMINATOR)
        .ok_or(ExchangeError::Overflow)
}

/// Limit price of an order in collateral per token, scaled by `ONE`.
pub fn price(order: &Order) -> Result<i128, ExchangeError> {
    let (collateral, tokens) = match order.side {
        Side::Buy => (order.maker_amount, order.taker_amount),
        Side::Sell => (order.taker_amount, order.maker_amount),
    };
    if tokens <= 0 || collateral < 0 {
        return Err(ExchangeError::InvalidAmount);
    }
    collateral
        .checked_mul(ONE)
        .ok_or(ExchangeError::Overflow)?
        .checked_div(tokens)
        .ok_or(ExchangeError::Overflow)
}

/// Whether the taker order can trade against the maker order.
///
/// - Buy vs Sell on one token: the bid must reach the ask.
/// - Buy vs Buy on complements: the two bids must fund a full set (sum >= 1).
/// - Sell vs Sell on complements: the two asks must be covered by a full
///   set's redemption value (sum <= 1).
pub fn is_crossing(taker: &Order, maker: &Order) -> Result<bool, ExchangeError> {
    let taker_price = price(taker)?;
    let maker_price = price(maker)?;

    let crossing = match (taker.side, maker.side) {
        (Side::Buy, Side::Sell) => taker_price >= maker_price,
        (Side::Sell, Side::Buy) => taker_price <= maker_price,
        (Side::Buy, Side::Buy) => {
            taker_price
                .checked_add(maker_price)
                .ok_or(ExchangeError::Overflow)?
                >= ONE
        }
        (Side::Sell, Side::Sell) => {
            taker_price
                .checked_add(maker_price)
                .ok_or(ExchangeError::Overflow)?
                <= ONE
        }
    };
    Ok(crossing)
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{testutils::Address as _, Address, BytesN, Env};

    fn order(env: &Env, side: Side, maker_amount: i128, taker_amount: i128) -> Order {
        Order {
            salt: 0,
            maker: Address::generate(env),
            signer: BytesN::from_array(env, &[0u8; 65]),
            taker: None,
            token_id: BytesN::from_array(env, &[1u8; 32]),
            maker_amount,
            taker_amount,
            expiration: 0,
            nonce: 0,
            fee_rate_bps: 0,
            side,
            signature: BytesN::from_array(env, &[0u8; 65]),
        }
    }

    #[test]
    fn test_taking_amount_is_proportional() {
        assert_eq!(taking_amount(100, 100, 60).unwrap(), 60);
        assert_eq!(taking_amount(50, 100, 60).unwrap(), 30);
        // 33 * 60 / 100 = 19.8
        assert_eq!(taking_amount(33, 100, 60).unwrap(), 19);
    }

    #[test]
    fn test_taking_amount_zero_maker_amount() {
        assert_eq!(taking_amount(1, 0, 60), Err(ExchangeError::InvalidAmount));
    }

    #[test]
    fn test_fee_amount() {
        assert_eq!(fee_amount(100, 100).unwrap(), 1);
        assert_eq!(fee_amount(99, 100).unwrap(), 0);
        assert_eq!(fee_amount(10_000, 0).unwrap(), 0);
        assert_eq!(fee_amount(i128::MAX, 2), Err(ExchangeError::Overflow));
    }

    #[test]
    fn test_price_by_side() {
        let env = Env::default();
        // Buying 100 tokens for 40 collateral: 0.4
        assert_eq!(price(&order(&env, Side::Buy, 40, 100)).unwrap(), ONE * 4 / 10);
        // Selling 100 tokens for 60 collateral: 0.6
        assert_eq!(price(&order(&env, Side::Sell, 100, 60)).unwrap(), ONE * 6 / 10);
    }

    #[test]
    fn test_crossing_rules() {
        let env = Env::default();
        let bid_50 = order(&env, Side::Buy, 50, 100);
        let bid_60 = order(&env, Side::Buy, 60, 100);
        let ask_55 = order(&env, Side::Sell, 100, 55);
        let ask_40 = order(&env, Side::Sell, 100, 40);

        assert!(is_crossing(&bid_60, &ask_55).unwrap());
        assert!(!is_crossing(&bid_50, &ask_55).unwrap());
        assert!(is_crossing(&ask_55, &bid_60).unwrap());
        assert!(!is_crossing(&ask_55, &bid_50).unwrap());

        // Mint: 0.5 + 0.6 >= 1, 0.5 + 0.4 < 1
        assert!(is_crossing(&bid_50, &bid_60).unwrap());
        assert!(!is_crossing(&bid_50, &order(&env, Side::Buy, 40, 100)).unwrap());

        // Merge: 0.55 + 0.4 <= 1, 0.55 + 0.6 > 1
        assert!(is_crossing(&ask_55, &ask_40).unwrap());
        assert!(!is_crossing(&ask_55, &order(&env, Side::Sell, 100, 60)).unwrap());
    }
}
