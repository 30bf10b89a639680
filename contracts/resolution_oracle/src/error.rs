use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum OracleError {
    /// Only an admin can perform this action
    NotAdmin = 1,
    /// Only a resolver can perform this action
    NotResolver = 2,
    /// Payout vector length differs from the slot count, or all zero
    InvalidPayouts = 3,
    /// A resolution already exists (or is final) for this condition
    AlreadyResolved = 4,
    /// No pending proposal for this condition
    NotProposed = 5,
    /// Dispute window still open
    DisputePeriodActive = 6,
    /// Dispute window already closed
    DisputePeriodElapsed = 7,
    /// Dispute window must be positive
    InvalidDisputeWindow = 8,
    /// Arithmetic overflow
    Overflow = 9,
    /// Mandatory configuration missing
    StorageCorrupted = 10,
}
