//! Order types and the signing digest.
//!
//! Orders are signed off-chain with secp256k1 over an EIP-712 style
//! digest: `keccak256(0x19 0x01 || domain_separator || struct_hash)`.
//! The domain binds the exchange name and version, the network id and the
//! exchange contract address, so a signature is only valid for one
//! deployment on one network.

use soroban_sdk::{contracttype, crypto::Hash, xdr::ToXdr, Address, Bytes, BytesN, Env};

pub const DOMAIN_NAME: &str = "CTF Exchange";
pub const DOMAIN_VERSION: &str = "1";

const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,bytes32 networkId,address verifyingContract)";
const ORDER_TYPE: &str = concat!(
    "Order(uint64 salt,address maker,bytes signer,address taker,bytes32 tokenId,",
    "int128 makerAmount,int128 takerAmount,uint64 expiration,uint64 nonce,",
    "uint32 feeRateBps,uint32 side)"
);
const SIGNER_BINDING_TYPE: &str = "SignerBinding(address maker)";

/// secp256k1 group order n, big-endian.
const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// n / 2, the largest accepted s.
const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Side {
    /// Maker pays collateral for outcome tokens
    Buy = 0,
    /// Maker pays outcome tokens for collateral
    Sell = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Order {
    /// Unique entropy so otherwise identical orders hash differently
    pub salt: u64,
    /// Account whose balances the order moves
    pub maker: Address,
    /// Uncompressed secp256k1 public key that signed the order
    pub signer: BytesN<65>,
    /// Restricts the order to a single counterparty
    pub taker: Option<Address>,
    /// Outcome token (position id) being bought or sold
    pub token_id: BytesN<32>,
    /// Amount the maker gives
    pub maker_amount: i128,
    /// Amount the maker wants in return
    pub taker_amount: i128,
    /// Unix timestamp after which the order is void, 0 for none
    pub expiration: u64,
    /// Maker nonce generation the order was signed under
    pub nonce: u64,
    pub fee_rate_bps: u32,
    pub side: Side,
    /// r || s || v, v in {0, 1, 27, 28}
    pub signature: BytesN<65>,
}

fn keccak(env: &Env, data: &[u8]) -> [u8; 32] {
    env.crypto()
        .keccak256(&Bytes::from_slice(env, data))
        .to_array()
}

pub fn domain_separator(env: &Env) -> BytesN<32> {
    let mut preimage = Bytes::new(env);
    preimage.extend_from_array(&keccak(env, DOMAIN_TYPE.as_bytes()));
    preimage.extend_from_array(&keccak(env, DOMAIN_NAME.as_bytes()));
    preimage.extend_from_array(&keccak(env, DOMAIN_VERSION.as_bytes()));
    preimage.extend_from_array(&env.ledger().network_id().to_array());
    preimage.append(&env.current_contract_address().to_xdr(env));
    env.crypto().keccak256(&preimage).to_bytes()
}

fn struct_hash(env: &Env, order: &Order) -> [u8; 32] {
    let mut preimage = Bytes::new(env);
    preimage.extend_from_array(&keccak(env, ORDER_TYPE.as_bytes()));
    preimage.extend_from_array(&order.salt.to_be_bytes());
    preimage.append(&order.maker.clone().to_xdr(env));
    preimage.extend_from_array(&order.signer.to_array());
    match &order.taker {
        Some(taker) => {
            preimage.push_back(1);
            preimage.append(&taker.clone().to_xdr(env));
        }
        None => preimage.push_back(0),
    }
    preimage.extend_from_array(&order.token_id.to_array());
    preimage.extend_from_array(&order.maker_amount.to_be_bytes());
    preimage.extend_from_array(&order.taker_amount.to_be_bytes());
    preimage.extend_from_array(&order.expiration.to_be_bytes());
    preimage.extend_from_array(&order.nonce.to_be_bytes());
    preimage.extend_from_array(&order.fee_rate_bps.to_be_bytes());
    preimage.extend_from_array(&(order.side as u32).to_be_bytes());
    env.crypto().keccak256(&preimage).to_array()
}

fn typed_digest(env: &Env, struct_hash: &[u8; 32]) -> Hash<32> {
    let mut preimage = Bytes::from_array(env, &[0x19, 0x01]);
    preimage.extend_from_array(&domain_separator(env).to_array());
    preimage.extend_from_array(struct_hash);
    env.crypto().keccak256(&preimage)
}

/// Digest the maker signs; also the key of the order's fill state.
pub fn order_digest(env: &Env, order: &Order) -> Hash<32> {
    typed_digest(env, &struct_hash(env, order))
}

/// Digest a key signs to prove it may act for `maker`.
pub fn signer_binding_digest(env: &Env, maker: &Address) -> Hash<32> {
    let mut preimage = Bytes::new(env);
    preimage.extend_from_array(&keccak(env, SIGNER_BINDING_TYPE.as_bytes()));
    preimage.append(&maker.clone().to_xdr(env));
    let hash = env.crypto().keccak256(&preimage).to_array();
    typed_digest(env, &hash)
}

/// Recover the public key that produced `signature` over `digest`.
///
/// Returns `None` instead of reaching the host for anything it would
/// trap on: an out-of-range recovery byte, r or s outside 1..n, or a
/// high-s signature (only the low-s form of a signature is accepted).
pub fn recover_signer(env: &Env, digest: &Hash<32>, signature: &BytesN<65>) -> Option<BytesN<65>> {
    let raw = signature.to_array();
    let recovery_id = match raw[64] {
        v @ 0..=1 => v as u32,
        v @ 27..=28 => (v - 27) as u32,
        _ => return None,
    };

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&raw[..32]);
    s.copy_from_slice(&raw[32..64]);
    if r == [0u8; 32] || r >= CURVE_ORDER || s == [0u8; 32] || s > HALF_CURVE_ORDER {
        return None;
    }

    let mut rs = [0u8; 64];
    rs.copy_from_slice(&raw[..64]);

    Some(
        env.crypto()
            .secp256k1_recover(digest, &BytesN::from_array(env, &rs), recovery_id),
    )
}
