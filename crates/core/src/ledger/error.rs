//! Ledger error types.
//!
//! Four failure classes reach callers: validation (nothing written),
//! not-found (nothing written), storage (backend message surfaced, no retry)
//! and partial recalculation (some rows rewritten before the backend failed).

use ledgerline_shared::types::{AccountId, TransactionId};
use thiserror::Error;

use super::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Input rejected before any write.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Batch delete ids belong to more than one account.
    #[error("Batch delete spans multiple accounts")]
    MixedAccounts,

    /// Reference timezone is not a valid IANA name.
    #[error("Invalid reference timezone: {0}")]
    InvalidTimezone(String),

    /// A running balance left the range `Decimal` can represent.
    #[error("Running balance of account {0} overflowed")]
    BalanceOverflow(AccountId),

    // ========== Not Found Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    // ========== Storage Errors ==========
    /// Storage call failed before the ledger was touched.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The recalculation write loop failed part-way.
    ///
    /// Rows after `updated` and the account balance still hold stale values
    /// until the next successful recalculation.
    #[error(
        "Recalculation for account {account_id} stopped after {updated} of {total} rows: {source}"
    )]
    PartialRecalculation {
        /// Account being recalculated.
        account_id: AccountId,
        /// Rows rewritten before the failure.
        updated: usize,
        /// Rows the pass meant to rewrite.
        total: usize,
        /// Underlying failure.
        #[source]
        source: StoreError,
    },
}

impl LedgerError {
    /// Builds a validation error from a single message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::MixedAccounts => "MIXED_ACCOUNTS",
            Self::InvalidTimezone(_) => "INVALID_TIMEZONE",
            Self::BalanceOverflow(_) => "BALANCE_OVERFLOW",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::PartialRecalculation { .. } => "PARTIAL_RECALCULATION",
        }
    }

    /// Returns true if re-running the whole operation can succeed.
    ///
    /// A partial recalculation converges once a full pass completes.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(source) | Self::PartialRecalculation { source, .. } => {
                source.is_transient()
            }
            _ => false,
        }
    }

    /// Returns true if the ledger may be left inconsistent.
    #[must_use]
    pub fn leaves_ledger_inconsistent(&self) -> bool {
        matches!(self, Self::PartialRecalculation { .. })
    }
}
