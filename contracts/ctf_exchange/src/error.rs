use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ExchangeError {
    /// Only an admin can perform this action
    NotAdmin = 1,
    /// Only an operator can perform this action
    NotOperator = 2,
    /// Caller is not the maker of the order or owner of the signer key
    NotOwner = 3,
    /// Trading is paused
    Paused = 4,
    /// Signature does not recover to the order signer, or the signer is not bound to the maker
    InvalidSignature = 5,
    /// Order expiration is in the past
    OrderExpired = 6,
    /// Fee rate above the configured ceiling
    FeeTooHigh = 7,
    /// Order nonce is not the maker's current nonce
    InvalidNonce = 8,
    /// Token is not registered
    InvalidTokenId = 9,
    /// Order was already filled or cancelled
    OrderFilledOrCancelled = 10,
    /// Tokens are not registered complements, or a token was paired with itself
    InvalidComplement = 11,
    /// Token pair already registered
    AlreadyRegistered = 12,
    /// Order is restricted to another counterparty
    NotTaker = 13,
    /// Fill amount exceeds the order's remaining amount
    ExceedsRemaining = 14,
    /// Order prices do not cross
    NotCrossing = 15,
    /// Complementary orders must trade the same token
    MismatchedTokenIds = 16,
    /// Exchange received less than the order's required taking amount
    TooLittleReceived = 17,
    /// Amount must be positive
    InvalidAmount = 18,
    /// Batch arguments have different lengths
    LengthMismatch = 19,
    /// Arithmetic overflow
    Overflow = 20,
    /// Signer key is bound to another maker
    SignerTaken = 21,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 22,
}
