//! Ledger mutation service.
//!
//! Each mutation changes the stored ledger and then replays it through the
//! recalculation engine. The replay anchor is resolved before the mutation,
//! so deleting or editing the earliest row keeps the opening balance.
//!
//! No locking is done here. Results are only guaranteed for sequential,
//! non-overlapping mutations of the same account; the last recalculation
//! wins.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Timelike;
use chrono_tz::Tz;
use ledgerline_shared::config::LedgerConfig;
use ledgerline_shared::types::{AccountId, TransactionId};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::classification::{DebitCreditColumns, classify_legacy};
use super::clock::{Clock, SystemClock};
use super::engine::RecalculationEngine;
use super::error::LedgerError;
use super::impact::{EditImpact, ImpactInput, calculate_edit_impact, calculate_impact};
use super::reference::generate_reference;
use super::resolver::BalanceResolver;
use super::store::LedgerStore;
use super::types::{
    AddTransactionInput, AddTransactionOutcome, BatchDeleteOutcome, DeletePreview,
    DeleteTransactionOutcome, DriftReport, EditTransactionInput, EditTransactionOutcome,
    LedgerTransaction, NewTransaction, RecalculationReport, TransactionDetails, TransactionPatch,
};
use super::validation::{validate_add_input, validate_edit_input};

/// Runtime settings of the mutation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Timezone used to stamp the logical date and time of new rows.
    pub timezone: Tz,
    /// Prefix of generated transaction references.
    pub reference_prefix: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Kolkata,
            reference_prefix: "TXN".to_string(),
        }
    }
}

impl LedgerSettings {
    /// Builds settings from the `ledger` configuration section.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimezone` if the timezone is not an IANA name.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let timezone = config
            .reference_timezone
            .parse::<Tz>()
            .map_err(|_| LedgerError::InvalidTimezone(config.reference_timezone.clone()))?;

        Ok(Self {
            timezone,
            reference_prefix: config.reference_prefix.clone(),
        })
    }
}

/// Row patch derived from an edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPlan {
    /// Fields to write.
    pub patch: TransactionPatch,
    /// Impact of the row before and after the edit.
    pub impact: EditImpact,
    /// Whether direction, amount or status changes.
    pub recalculation_required: bool,
}

/// Works out what an edit writes and whether it moves any balance.
///
/// The new direction is the explicit operation type when given. Otherwise a
/// row with explicit columns keeps its direction and a legacy row is
/// re-classified from its (possibly new) label. Columns are regenerated when
/// the amount or direction changes.
#[must_use]
pub fn plan_edit(original: &LedgerTransaction, input: &EditTransactionInput) -> EditPlan {
    let label = input
        .transaction_type
        .as_deref()
        .map(str::trim)
        .unwrap_or(original.transaction_type.as_str());
    let amount = input.amount.unwrap_or(original.amount);
    let status = input.status.unwrap_or(original.status);

    let original_direction = original.direction();
    let direction = input
        .operation_type
        .or_else(|| original.columns.direction())
        .or_else(|| classify_legacy(label));

    let direction_changed = direction != original_direction;
    let recalculation_required =
        direction_changed || amount != original.amount || status != original.status;

    let regenerate_columns =
        input.amount.is_some() || input.operation_type.is_some() || direction_changed;
    let columns = match direction {
        Some(direction) if regenerate_columns => {
            Some(DebitCreditColumns::for_operation(amount, direction))
        }
        _ => None,
    };

    let patch = TransactionPatch {
        transaction_type: input.transaction_type.as_ref().map(|l| l.trim().to_string()),
        amount: input.amount,
        columns,
        status: input.status,
        balance_after: None,
        narration: input.narration.as_ref().map(|n| n.trim().to_string()),
        description: input.description.clone(),
        beneficiary_name: input.beneficiary_name.clone(),
        reference_number: input.reference_number.clone(),
    };

    let impact = calculate_edit_impact(
        original.impact_input(),
        ImpactInput {
            amount,
            direction,
            status,
        },
    );

    EditPlan {
        patch,
        impact,
        recalculation_required,
    }
}

/// Orchestrates ledger mutations over a [`LedgerStore`].
#[derive(Debug)]
pub struct LedgerService<S, C = SystemClock> {
    store: Arc<S>,
    engine: RecalculationEngine<S>,
    clock: C,
    settings: LedgerSettings,
}

impl<S: LedgerStore> LedgerService<S, SystemClock> {
    /// Creates a service stamping rows with the system clock.
    pub fn new(store: Arc<S>, settings: LedgerSettings) -> Self {
        Self::with_clock(store, settings, SystemClock)
    }
}

impl<S: LedgerStore, C: Clock> LedgerService<S, C> {
    /// Creates a service with an explicit clock.
    pub fn with_clock(store: Arc<S>, settings: LedgerSettings, clock: C) -> Self {
        let engine = RecalculationEngine::new(Arc::clone(&store));
        Self {
            store,
            engine,
            clock,
            settings,
        }
    }

    /// Service settings.
    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    fn resolver(&self) -> &BalanceResolver<S> {
        self.engine.resolver()
    }

    async fn fetch(&self, id: TransactionId) -> Result<LedgerTransaction, LedgerError> {
        self.store
            .find_transaction(id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    // ========== Add ==========

    /// Adds a transaction and recalculates the account.
    ///
    /// The row is stamped with the current time in the reference timezone;
    /// the date defaults to today there.
    ///
    /// # Errors
    ///
    /// `Validation` before any write; `AccountNotFound`; `Storage` when the
    /// insert fails (no recalculation runs); `PartialRecalculation`.
    pub async fn add_transaction(
        &self,
        input: AddTransactionInput,
    ) -> Result<AddTransactionOutcome, LedgerError> {
        let validated = validate_add_input(&input)?;
        let account_id = input.account_id;

        let anchor = self.resolver().initial_balance(account_id).await?;

        let now = self.clock.now();
        let local = now.with_timezone(&self.settings.timezone);
        let transaction_date = input.transaction_date.unwrap_or_else(|| local.date_naive());
        let transaction_time = local.time().with_nanosecond(0).unwrap_or_else(|| local.time());

        let status = input.status.unwrap_or_default();
        let amount = validated.amount.value();
        let balance_before = self
            .resolver()
            .balance_before(account_id, transaction_date, transaction_time)
            .await?;
        let balance_after = balance_before
            .checked_add(calculate_impact(amount, Some(validated.direction), status))
            .ok_or(LedgerError::BalanceOverflow(account_id))?;

        let row = NewTransaction {
            account_id,
            reference: generate_reference(&self.settings.reference_prefix, now),
            transaction_date,
            transaction_time,
            transaction_type: input.transaction_type.trim().to_string(),
            amount,
            columns: DebitCreditColumns::for_operation(amount, validated.direction),
            balance_after,
            status,
            details: TransactionDetails {
                narration: Some(input.narration.trim().to_string()),
                description: input.description.unwrap_or_default(),
                beneficiary_name: input.beneficiary_name,
                remarks: input.remarks,
                reference_number: input.reference_number,
                category: input.category,
                ..TransactionDetails::default()
            },
        };

        let stored = self.store.insert_transaction(row).await.map_err(|e| {
            warn!(account_id = %account_id, error = %e, "Failed to insert transaction");
            LedgerError::Storage(e)
        })?;

        let recalculation = self.engine.recalculate_from(account_id, anchor).await?;
        // Insert and replay are committed; a failed re-read falls back to
        // the inserted row.
        let transaction = match self.store.find_transaction(stored.id).await {
            Ok(Some(refreshed)) => refreshed,
            Ok(None) => stored,
            Err(e) => {
                warn!(
                    account_id = %account_id,
                    transaction_id = %stored.id,
                    error = %e,
                    "Failed to re-read added transaction"
                );
                stored
            }
        };

        info!(
            account_id = %account_id,
            transaction_id = %transaction.id,
            reference = %transaction.reference,
            final_balance = %recalculation.final_balance,
            "Transaction added"
        );

        Ok(AddTransactionOutcome {
            transaction,
            recalculation,
        })
    }

    // ========== Edit ==========

    /// Computes the impact change an edit would cause, without writing.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` or `Storage`.
    pub async fn preview_edit(
        &self,
        id: TransactionId,
        input: &EditTransactionInput,
    ) -> Result<EditImpact, LedgerError> {
        let original = self.fetch(id).await?;
        Ok(plan_edit(&original, input).impact)
    }

    /// Applies a partial edit, recalculating only when direction, amount or
    /// status changes.
    ///
    /// # Errors
    ///
    /// `Validation`, `TransactionNotFound`, `Storage` or
    /// `PartialRecalculation`.
    pub async fn edit_transaction(
        &self,
        id: TransactionId,
        input: EditTransactionInput,
    ) -> Result<EditTransactionOutcome, LedgerError> {
        validate_edit_input(&input)?;
        let original = self.fetch(id).await?;
        let plan = plan_edit(&original, &input);

        if plan.patch.is_empty() {
            debug!(transaction_id = %id, "Empty edit, nothing to write");
            return Ok(EditTransactionOutcome {
                transaction_id: id,
                recalculation_required: false,
                recalculation: None,
            });
        }

        let anchor = if plan.recalculation_required {
            Some(self.resolver().initial_balance(original.account_id).await?)
        } else {
            None
        };

        self.store.update_transaction(id, &plan.patch).await?;

        let recalculation = match anchor {
            Some(anchor) => Some(
                self.engine
                    .recalculate_from(original.account_id, anchor)
                    .await?,
            ),
            None => None,
        };

        info!(
            account_id = %original.account_id,
            transaction_id = %id,
            recalculated = plan.recalculation_required,
            difference = %plan.impact.difference,
            "Transaction edited"
        );

        Ok(EditTransactionOutcome {
            transaction_id: id,
            recalculation_required: plan.recalculation_required,
            recalculation,
        })
    }

    // ========== Delete ==========

    /// Describes what deleting a transaction would do, without writing.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` or `Storage`.
    pub async fn preview_delete(&self, id: TransactionId) -> Result<DeletePreview, LedgerError> {
        let tx = self.fetch(id).await?;
        let balance_impact = -tx.impact();

        Ok(DeletePreview {
            transaction_id: tx.id,
            transaction_date: tx.transaction_date,
            transaction_type: tx.transaction_type,
            amount: tx.amount,
            status: tx.status,
            balance_impact,
            will_affect_balance: !balance_impact.is_zero(),
        })
    }

    /// Deletes a transaction and recalculates its account.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound`, `Storage` or `PartialRecalculation`.
    pub async fn delete_transaction(
        &self,
        id: TransactionId,
    ) -> Result<DeleteTransactionOutcome, LedgerError> {
        let deleted = self.fetch(id).await?;
        let account_id = deleted.account_id;
        let anchor = self.resolver().initial_balance(account_id).await?;

        if !self.store.delete_transaction(id).await? {
            return Err(LedgerError::TransactionNotFound(id));
        }

        let recalculation = self.engine.recalculate_from(account_id, anchor).await?;
        let balance_impact = -deleted.impact();

        info!(
            account_id = %account_id,
            transaction_id = %id,
            balance_impact = %balance_impact,
            "Transaction deleted"
        );

        Ok(DeleteTransactionOutcome {
            deleted,
            balance_impact,
            recalculation,
        })
    }

    /// Deletes several transactions of one account with a single
    /// recalculation pass.
    ///
    /// Ids that do not exist are skipped; repeated ids count once.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty id list; `TransactionNotFound` when none of
    /// the ids exist; `MixedAccounts` when they span accounts; `Storage` or
    /// `PartialRecalculation`.
    pub async fn delete_transactions(
        &self,
        ids: &[TransactionId],
    ) -> Result<BatchDeleteOutcome, LedgerError> {
        let Some(&first_id) = ids.first() else {
            return Err(LedgerError::validation(
                "At least one transaction id is required",
            ));
        };

        let mut seen = HashSet::with_capacity(ids.len());
        let unique: Vec<TransactionId> =
            ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let rows = self.store.find_transactions(&unique).await?;
        let account_id = rows
            .first()
            .map(|tx| tx.account_id)
            .ok_or(LedgerError::TransactionNotFound(first_id))?;
        if rows.iter().any(|tx| tx.account_id != account_id) {
            return Err(LedgerError::MixedAccounts);
        }

        let anchor = self.resolver().initial_balance(account_id).await?;
        let total_balance_impact = -rows
            .iter()
            .map(LedgerTransaction::impact)
            .sum::<Decimal>();
        let found: Vec<TransactionId> = rows.iter().map(|tx| tx.id).collect();

        let deleted_count = self.store.delete_transactions(&found).await?;
        let recalculation = self.engine.recalculate_from(account_id, anchor).await?;

        info!(
            account_id = %account_id,
            requested = ids.len(),
            deleted = deleted_count,
            total_balance_impact = %total_balance_impact,
            "Transactions deleted"
        );

        Ok(BatchDeleteOutcome {
            account_id,
            deleted_count,
            total_balance_impact,
            recalculation,
        })
    }

    // ========== Balances ==========

    /// Replays the account's whole ledger.
    ///
    /// This is the repair path after a `PartialRecalculation`.
    ///
    /// # Errors
    ///
    /// `AccountNotFound`, `Storage` or `PartialRecalculation`.
    pub async fn recalculate_account(
        &self,
        account_id: AccountId,
    ) -> Result<RecalculationReport, LedgerError> {
        self.engine.recalculate(account_id).await
    }

    /// Compares an account's stored balances with a fresh replay.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or `Storage`.
    pub async fn audit_account(&self, account_id: AccountId) -> Result<DriftReport, LedgerError> {
        self.engine.audit(account_id).await
    }

    /// Balance before the account's earliest transaction.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or `Storage`.
    pub async fn initial_balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        self.resolver().initial_balance(account_id).await
    }

    /// Number of transactions recorded for an account.
    ///
    /// # Errors
    ///
    /// `Storage`.
    pub async fn transaction_count(&self, account_id: AccountId) -> Result<u64, LedgerError> {
        Ok(self.store.count_transactions(account_id).await?)
    }
}
