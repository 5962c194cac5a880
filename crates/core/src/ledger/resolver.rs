//! Initial balance resolution.
//!
//! The anchor of a replay is reverse-derived from the earliest row:
//! `first.balance_after - impact(first)`. Accounts without rows fall back to
//! their stored balance. A corrupted earliest snapshot propagates silently.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use ledgerline_shared::types::AccountId;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::store::LedgerStore;

/// Resolves starting balances from the stored ledger.
#[derive(Debug)]
pub struct BalanceResolver<S> {
    store: Arc<S>,
}

impl<S> Clone for BalanceResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> BalanceResolver<S> {
    /// Creates a resolver over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Balance before the chronologically first transaction.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` when the account has no rows and does not exist;
    /// `Storage` when a lookup fails; `BalanceOverflow` for a corrupted
    /// earliest snapshot.
    pub async fn initial_balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        if let Some(first) = self.store.first_transaction(account_id).await? {
            return first
                .balance_after
                .checked_sub(first.impact())
                .ok_or(LedgerError::BalanceOverflow(account_id));
        }

        self.store
            .account_balance(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Running balance immediately before the `(date, time)` position.
    ///
    /// # Errors
    ///
    /// Same as [`Self::initial_balance`].
    pub async fn balance_before(
        &self,
        account_id: AccountId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Decimal, LedgerError> {
        match self
            .store
            .latest_transaction_before(account_id, date, time)
            .await?
        {
            Some(previous) => Ok(previous.balance_after),
            None => self.initial_balance(account_id).await,
        }
    }
}
