//! Ledger recalculation engine.
//!
//! A recalculation is always a full replay: every row of the account is
//! folded in chronological order, every row's `balance_after` is rewritten
//! and the final running balance becomes the account balance. The pass is
//! idempotent, so a failed pass is repaired by running it again.

use std::sync::Arc;

use ledgerline_shared::types::AccountId;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::error::LedgerError;
use super::resolver::BalanceResolver;
use super::store::LedgerStore;
use super::types::{
    BalanceSnapshot, DriftReport, LedgerTransaction, RecalculationReport, TransactionPatch,
};

/// Folds `transactions` (already in chronological order) from `initial`.
///
/// Every row gets a snapshot, including rows whose status carries no
/// impact. Returns the snapshots and the final running balance, or `None`
/// if the running balance overflows `Decimal`.
#[must_use]
pub fn replay(
    initial: Decimal,
    transactions: &[LedgerTransaction],
) -> Option<(Vec<BalanceSnapshot>, Decimal)> {
    let mut running = initial;
    let mut snapshots = Vec::with_capacity(transactions.len());
    for tx in transactions {
        running = running.checked_add(tx.impact())?;
        snapshots.push(BalanceSnapshot {
            transaction_id: tx.id,
            balance_after: running,
        });
    }

    Some((snapshots, running))
}

/// Rewrites running balances from the stored ledger.
#[derive(Debug)]
pub struct RecalculationEngine<S> {
    store: Arc<S>,
    resolver: BalanceResolver<S>,
}

impl<S> Clone for RecalculationEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            resolver: self.resolver.clone(),
        }
    }
}

impl<S: LedgerStore> RecalculationEngine<S> {
    /// Creates an engine over `store`.
    pub fn new(store: Arc<S>) -> Self {
        let resolver = BalanceResolver::new(Arc::clone(&store));
        Self { store, resolver }
    }

    /// The resolver the engine anchors on.
    pub fn resolver(&self) -> &BalanceResolver<S> {
        &self.resolver
    }

    /// Compares stored balances with a replay without writing anything.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or `Storage`.
    pub async fn audit(&self, account_id: AccountId) -> Result<DriftReport, LedgerError> {
        let stored_balance = self
            .store
            .account_balance(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        let initial_balance = self.resolver.initial_balance(account_id).await?;

        let transactions = self.store.ordered_transactions(account_id).await?;
        let (snapshots, expected_balance) = replay(initial_balance, &transactions)
            .ok_or(LedgerError::BalanceOverflow(account_id))?;
        let mismatched_rows = transactions
            .iter()
            .zip(&snapshots)
            .filter(|(tx, snapshot)| tx.balance_after != snapshot.balance_after)
            .count();

        Ok(DriftReport {
            account_id,
            initial_balance,
            stored_balance,
            expected_balance,
            mismatched_rows,
            total_rows: transactions.len(),
        })
    }

    /// Recalculates an account, anchoring on its current first row.
    ///
    /// # Errors
    ///
    /// See [`Self::recalculate_from`].
    pub async fn recalculate(&self, account_id: AccountId) -> Result<RecalculationReport, LedgerError> {
        let initial = self.resolver.initial_balance(account_id).await?;
        self.recalculate_from(account_id, initial).await
    }

    /// Recalculates an account from a pinned anchor.
    ///
    /// Mutations resolve the anchor before they change the ledger so that
    /// removing or editing the first row does not move it.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or `Storage` when nothing was written yet;
    /// `PartialRecalculation` when the write loop stopped part-way.
    pub async fn recalculate_from(
        &self,
        account_id: AccountId,
        initial_balance: Decimal,
    ) -> Result<RecalculationReport, LedgerError> {
        let previous_balance = self
            .store
            .account_balance(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let transactions = self.store.ordered_transactions(account_id).await?;
        let (snapshots, final_balance) = replay(initial_balance, &transactions)
            .ok_or(LedgerError::BalanceOverflow(account_id))?;
        let total = snapshots.len();

        debug!(
            account_id = %account_id,
            rows = total,
            initial_balance = %initial_balance,
            "Replaying ledger"
        );

        for (updated, snapshot) in snapshots.iter().enumerate() {
            let patch = TransactionPatch::balance_after(snapshot.balance_after);
            if let Err(source) = self
                .store
                .update_transaction(snapshot.transaction_id, &patch)
                .await
            {
                warn!(
                    account_id = %account_id,
                    updated,
                    total,
                    error = %source,
                    "Recalculation aborted"
                );
                return Err(LedgerError::PartialRecalculation {
                    account_id,
                    updated,
                    total,
                    source,
                });
            }
        }

        if let Err(source) = self
            .store
            .set_account_balance(account_id, final_balance)
            .await
        {
            warn!(
                account_id = %account_id,
                error = %source,
                "Account balance write failed after row rewrite"
            );
            return Err(LedgerError::PartialRecalculation {
                account_id,
                updated: total,
                total,
                source,
            });
        }

        info!(
            account_id = %account_id,
            rows = total,
            previous_balance = %previous_balance,
            final_balance = %final_balance,
            "Ledger recalculated"
        );

        Ok(RecalculationReport {
            account_id,
            initial_balance,
            previous_balance,
            final_balance,
            transactions_updated: total,
        })
    }
}
