use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum LedgerError {
    /// Condition with this oracle, question and slot count already exists
    AlreadyPrepared = 1,
    /// Condition has not been prepared
    ConditionNotPrepared = 2,
    /// Payouts for the condition were already reported
    AlreadyResolved = 3,
    /// Payouts for the condition have not been reported yet
    ConditionNotResolved = 4,
    /// Outcome slot count must be within 2..=256
    InvalidSlotCount = 5,
    /// Partition must hold at least two non-empty, disjoint index sets inside the condition
    InvalidPartition = 6,
    /// Index set is empty or addresses slots the condition does not have
    InvalidIndexSet = 7,
    /// Payout vector is all zeroes
    InvalidPayouts = 8,
    /// Amount must be positive
    InvalidAmount = 9,
    /// Position balance too low for the debit
    InsufficientBalance = 10,
    /// Spender is neither the owner nor an approved operator
    NotApproved = 11,
    /// Arithmetic overflow
    Overflow = 12,
    /// Batch arguments have different lengths
    LengthMismatch = 13,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 14,
}
