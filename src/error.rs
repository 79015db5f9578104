//! Error taxonomy. Validation failures surface synchronously to the caller;
//! a failed mutation always leaves the ledger exactly as it was.

use thiserror::Error;

use crate::models::Currency;

/// Failures of the external rate source. Network trouble, non-2xx responses
/// and malformed payloads all collapse into `SourceUnavailable`: the caller
/// can only retry later either way.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("rate source unavailable: {0}")]
    SourceUnavailable(String),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Arithmetic across two different currencies. Internal invariant; if this
    /// ever reaches a caller it is a bug, not a user mistake.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },
    #[error("participant `{0}` already exists")]
    DuplicateParticipant(String),
    #[error("unknown participant `{0}`")]
    UnknownParticipant(String),
    #[error("participant name must not be empty")]
    EmptyName,
    #[error("expense must be split with at least one participant")]
    EmptySplit,
    #[error("expense amount must be a positive number")]
    InvalidAmount,
    #[error("expense description must not be empty")]
    EmptyDescription,
    /// One or more home currencies had no rate in the resolved table. The
    /// whole expense is refused; shares are never partially frozen.
    #[error("no conversion rate for {currencies:?}")]
    UnresolvedRate { currencies: Vec<Currency> },
    #[error("an expense is already awaiting rate resolution")]
    ExpenseInFlight,
    /// An expense's share map does not line up with its split set. Internal
    /// invariant; only a buggy producer can trigger it.
    #[error("expense shares do not match its split set")]
    ShareSetMismatch,
    #[error(transparent)]
    Rate(#[from] RateError),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serde(err.to_string())
    }
}
