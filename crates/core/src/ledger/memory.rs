//! In-memory `LedgerStore`.
//!
//! Keeps accounts and transaction rows behind an async `RwLock` and counts
//! the calls the engine makes, so tests can assert how many passes ran.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use chrono::{NaiveDate, NaiveTime, Utc};
use ledgerline_shared::types::{AccountId, TransactionId};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::store::{LedgerStore, StoreError};
use super::types::{LedgerTransaction, NewTransaction, TransactionPatch};

#[derive(Debug, Clone)]
struct StoredRow {
    // Insertion sequence; breaks ties between equal creation timestamps.
    seq: u64,
    row: LedgerTransaction,
}

impl StoredRow {
    fn chronological_cmp(&self, other: &Self) -> Ordering {
        let a = &self.row;
        let b = &other.row;
        (a.transaction_date, a.transaction_time, a.created_at, self.seq).cmp(&(
            b.transaction_date,
            b.transaction_time,
            b.created_at,
            other.seq,
        ))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<AccountId, Decimal>,
    rows: HashMap<TransactionId, StoredRow>,
    next_seq: u64,
}

impl MemoryState {
    fn ordered_rows(&self, account_id: AccountId) -> Vec<&StoredRow> {
        let mut rows: Vec<&StoredRow> = self
            .rows
            .values()
            .filter(|r| r.row.account_id == account_id)
            .collect();
        rows.sort_by(|a, b| a.chronological_cmp(b));
        rows
    }
}

/// Counters of storage calls, for asserting engine behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Full ordered scans of an account's ledger.
    pub ordered_scans: usize,
    /// Writes of an account's stored balance.
    pub balance_writes: usize,
    /// Partial updates of transaction rows.
    pub row_updates: usize,
}

/// Ledger storage kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<MemoryState>,
    ordered_scans: AtomicUsize,
    balance_writes: AtomicUsize,
    row_updates: AtomicUsize,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account with its opening balance.
    ///
    /// This is the onboarding path; afterwards only the recalculation engine
    /// writes the balance.
    pub async fn open_account(&self, account_id: AccountId, opening_balance: Decimal) {
        self.state
            .write()
            .await
            .accounts
            .insert(account_id, opening_balance);
    }

    /// Snapshot of the call counters.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            ordered_scans: self.ordered_scans.load(AtomicOrdering::Relaxed),
            balance_writes: self.balance_writes.load(AtomicOrdering::Relaxed),
            row_updates: self.row_updates.load(AtomicOrdering::Relaxed),
        }
    }
}

impl LedgerStore for InMemoryLedgerStore {
    async fn account_balance(&self, account_id: AccountId) -> Result<Option<Decimal>, StoreError> {
        Ok(self.state.read().await.accounts.get(&account_id).copied())
    }

    async fn set_account_balance(
        &self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<(), StoreError> {
        self.balance_writes.fetch_add(1, AtomicOrdering::Relaxed);
        let mut state = self.state.write().await;
        let stored = state
            .accounts
            .get_mut(&account_id)
            .ok_or(StoreError::NotFound {
                entity: "account",
                id: account_id.into_inner(),
            })?;
        *stored = balance;
        Ok(())
    }

    async fn first_transaction(
        &self,
        account_id: AccountId,
    ) -> Result<Option<LedgerTransaction>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .ordered_rows(account_id)
            .first()
            .map(|r| r.row.clone()))
    }

    async fn latest_transaction_before(
        &self,
        account_id: AccountId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<LedgerTransaction>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .ordered_rows(account_id)
            .into_iter()
            .filter(|r| (r.row.transaction_date, r.row.transaction_time) < (date, time))
            .next_back()
            .map(|r| r.row.clone()))
    }

    async fn ordered_transactions(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<LedgerTransaction>, StoreError> {
        self.ordered_scans.fetch_add(1, AtomicOrdering::Relaxed);
        let state = self.state.read().await;
        Ok(state
            .ordered_rows(account_id)
            .into_iter()
            .map(|r| r.row.clone())
            .collect())
    }

    async fn count_transactions(&self, account_id: AccountId) -> Result<u64, StoreError> {
        let state = self.state.read().await;
        let count = state
            .rows
            .values()
            .filter(|r| r.row.account_id == account_id)
            .count();
        Ok(count as u64)
    }

    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<LedgerTransaction>, StoreError> {
        Ok(self.state.read().await.rows.get(&id).map(|r| r.row.clone()))
    }

    async fn find_transactions(
        &self,
        ids: &[TransactionId],
    ) -> Result<Vec<LedgerTransaction>, StoreError> {
        let state = self.state.read().await;
        let mut seen = HashSet::with_capacity(ids.len());
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| state.rows.get(id))
            .map(|r| r.row.clone())
            .collect())
    }

    async fn insert_transaction(&self, row: NewTransaction) -> Result<LedgerTransaction, StoreError> {
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(&row.account_id) {
            return Err(StoreError::NotFound {
                entity: "account",
                id: row.account_id.into_inner(),
            });
        }

        let now = Utc::now();
        let stored = LedgerTransaction {
            id: TransactionId::new(),
            account_id: row.account_id,
            reference: row.reference,
            transaction_date: row.transaction_date,
            transaction_time: row.transaction_time,
            transaction_type: row.transaction_type,
            amount: row.amount,
            columns: row.columns,
            balance_after: row.balance_after,
            status: row.status,
            details: row.details,
            created_at: now,
            updated_at: now,
        };

        let seq = state.next_seq;
        state.next_seq += 1;
        state.rows.insert(
            stored.id,
            StoredRow {
                seq,
                row: stored.clone(),
            },
        );
        Ok(stored)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<(), StoreError> {
        self.row_updates.fetch_add(1, AtomicOrdering::Relaxed);
        let mut state = self.state.write().await;
        let stored = state.rows.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "transaction",
            id: id.into_inner(),
        })?;
        patch.apply_to(&mut stored.row);
        stored.row.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<bool, StoreError> {
        Ok(self.state.write().await.rows.remove(&id).is_some())
    }

    async fn delete_transactions(&self, ids: &[TransactionId]) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let removed = ids
            .iter()
            .filter(|id| state.rows.remove(id).is_some())
            .count();
        Ok(removed as u64)
    }
}
