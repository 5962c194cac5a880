//! Storage collaborator for the ledger engine.

use std::future::Future;

use chrono::{NaiveDate, NaiveTime};
use ledgerline_shared::types::{AccountId, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::{LedgerTransaction, NewTransaction, TransactionPatch};

/// Errors raised by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A row targeted by an update does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Table or entity name.
        entity: &'static str,
        /// Missing key.
        id: Uuid,
    },

    /// The backend call failed.
    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    /// Create a backend error.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Returns true if the same call may succeed when repeated.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

/// Relational storage for accounts and their transaction rows.
///
/// Ordered queries sort by `(transaction_date, transaction_time,
/// created_at)` ascending. This trait is implemented by the db crate; the
/// in-memory implementation backs tests.
pub trait LedgerStore: Send + Sync {
    /// Stored balance of an account, `None` if the account does not exist.
    fn account_balance(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<Option<Decimal>, StoreError>> + Send;

    /// Overwrites the stored balance of an account.
    fn set_account_balance(
        &self,
        account_id: AccountId,
        balance: Decimal,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Chronologically first transaction of an account.
    fn first_transaction(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<Option<LedgerTransaction>, StoreError>> + Send;

    /// Latest transaction strictly before `(date, time)`.
    fn latest_transaction_before(
        &self,
        account_id: AccountId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> impl Future<Output = Result<Option<LedgerTransaction>, StoreError>> + Send;

    /// Every transaction of an account in chronological order.
    fn ordered_transactions(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<Vec<LedgerTransaction>, StoreError>> + Send;

    /// Number of transactions of an account.
    fn count_transactions(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Fetch a transaction by id.
    fn find_transaction(
        &self,
        id: TransactionId,
    ) -> impl Future<Output = Result<Option<LedgerTransaction>, StoreError>> + Send;

    /// Fetch every existing transaction among `ids`.
    fn find_transactions(
        &self,
        ids: &[TransactionId],
    ) -> impl Future<Output = Result<Vec<LedgerTransaction>, StoreError>> + Send;

    /// Insert a row and return it as stored.
    fn insert_transaction(
        &self,
        row: NewTransaction,
    ) -> impl Future<Output = Result<LedgerTransaction, StoreError>> + Send;

    /// Apply a partial update to a row.
    fn update_transaction(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a row. Returns false if it did not exist.
    fn delete_transaction(
        &self,
        id: TransactionId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete every row among `ids`. Returns the number removed.
    fn delete_transactions(
        &self,
        ids: &[TransactionId],
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
