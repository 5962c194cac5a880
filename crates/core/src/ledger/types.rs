//! Ledger domain types: stored rows, mutation inputs and outcomes.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use ledgerline_shared::types::{AccountId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::classification::{
    DebitCreditColumns, OperationType, TransactionStatus, resolve_direction,
};
use super::impact::{ImpactInput, calculate_impact};

/// Descriptive metadata carried by a transaction.
///
/// None of these fields has balance semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    /// Mandatory free-text narration for new transactions.
    pub narration: Option<String>,
    /// Longer description, empty when not provided.
    pub description: String,
    /// Payee name.
    pub beneficiary_name: Option<String>,
    /// Payee account number.
    pub beneficiary_account_number: Option<String>,
    /// Payee IFSC code.
    pub beneficiary_ifsc: Option<String>,
    /// Payee bank name.
    pub beneficiary_bank_name: Option<String>,
    /// Payee bank code.
    pub beneficiary_bank_code: Option<String>,
    /// Operator remarks.
    pub remarks: Option<String>,
    /// External reference number (cheque number, UTR, ...).
    pub reference_number: Option<String>,
    /// Reporting category.
    pub category: Option<String>,
    /// Whether the counterparty banks with us.
    pub is_within_bank: bool,
}

/// A persisted ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Row identifier.
    pub id: TransactionId,
    /// Owning account.
    pub account_id: AccountId,
    /// Generated, never reused transaction reference (`TXN_...`).
    pub reference: String,
    /// Logical date; primary ordering key.
    pub transaction_date: NaiveDate,
    /// Logical time; secondary ordering key.
    pub transaction_time: NaiveTime,
    /// Transaction-type label (IMPS, DEPOSIT, ...).
    pub transaction_type: String,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Explicit direction columns.
    pub columns: DebitCreditColumns,
    /// Running balance immediately after this transaction.
    pub balance_after: Decimal,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Descriptive metadata.
    pub details: TransactionDetails,
    /// Creation timestamp; tertiary ordering key.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Resolved direction: explicit columns first, then the legacy table.
    #[must_use]
    pub fn direction(&self) -> Option<OperationType> {
        resolve_direction(&self.columns, &self.transaction_type)
    }

    /// Balance-relevant facts of this row.
    #[must_use]
    pub fn impact_input(&self) -> ImpactInput {
        ImpactInput {
            amount: self.amount,
            direction: self.direction(),
            status: self.status,
        }
    }

    /// Signed contribution of this row to the balance.
    #[must_use]
    pub fn impact(&self) -> Decimal {
        calculate_impact(self.amount, self.direction(), self.status)
    }
}

/// A row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Owning account.
    pub account_id: AccountId,
    /// Generated transaction reference.
    pub reference: String,
    /// Logical date.
    pub transaction_date: NaiveDate,
    /// Logical time.
    pub transaction_time: NaiveTime,
    /// Transaction-type label.
    pub transaction_type: String,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Explicit direction columns.
    pub columns: DebitCreditColumns,
    /// Running balance at the insertion point.
    pub balance_after: Decimal,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Descriptive metadata.
    pub details: TransactionDetails,
}

/// Partial update of a stored row. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    /// New transaction-type label.
    pub transaction_type: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// Regenerated direction columns.
    pub columns: Option<DebitCreditColumns>,
    /// New status.
    pub status: Option<TransactionStatus>,
    /// Recomputed running balance.
    pub balance_after: Option<Decimal>,
    /// New narration.
    pub narration: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New beneficiary name.
    pub beneficiary_name: Option<String>,
    /// New reference number.
    pub reference_number: Option<String>,
}

impl TransactionPatch {
    /// A patch that only rewrites the running balance snapshot.
    #[must_use]
    pub fn balance_after(balance: Decimal) -> Self {
        Self {
            balance_after: Some(balance),
            ..Self::default()
        }
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch to an in-memory row.
    pub fn apply_to(&self, row: &mut LedgerTransaction) {
        if let Some(label) = &self.transaction_type {
            row.transaction_type.clone_from(label);
        }
        if let Some(amount) = self.amount {
            row.amount = amount;
        }
        if let Some(columns) = self.columns {
            row.columns = columns;
        }
        if let Some(status) = self.status {
            row.status = status;
        }
        if let Some(balance) = self.balance_after {
            row.balance_after = balance;
        }
        if let Some(narration) = &self.narration {
            row.details.narration = Some(narration.clone());
        }
        if let Some(description) = &self.description {
            row.details.description.clone_from(description);
        }
        if let Some(name) = &self.beneficiary_name {
            row.details.beneficiary_name = Some(name.clone());
        }
        if let Some(reference) = &self.reference_number {
            row.details.reference_number = Some(reference.clone());
        }
    }
}

/// Input for adding a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTransactionInput {
    /// Owning account.
    pub account_id: AccountId,
    /// Logical date; defaults to today in the reference timezone.
    pub transaction_date: Option<NaiveDate>,
    /// Explicit direction. When absent the label must be classifiable.
    pub operation_type: Option<OperationType>,
    /// Transaction-type label.
    pub transaction_type: String,
    /// Amount, must be greater than zero.
    pub amount: Decimal,
    /// Narration, must not be blank.
    pub narration: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional payee name.
    pub beneficiary_name: Option<String>,
    /// Status; defaults to success.
    pub status: Option<TransactionStatus>,
    /// Optional category.
    pub category: Option<String>,
    /// Optional remarks.
    pub remarks: Option<String>,
    /// Optional external reference number.
    pub reference_number: Option<String>,
}

impl AddTransactionInput {
    /// Minimal input with an explicit direction.
    #[must_use]
    pub fn new(
        account_id: AccountId,
        operation_type: OperationType,
        transaction_type: impl Into<String>,
        amount: Decimal,
        narration: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            transaction_date: None,
            operation_type: Some(operation_type),
            transaction_type: transaction_type.into(),
            amount,
            narration: narration.into(),
            description: None,
            beneficiary_name: None,
            status: None,
            category: None,
            remarks: None,
            reference_number: None,
        }
    }

    /// Sets the logical date.
    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.transaction_date = Some(date);
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Partial edit of an existing transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditTransactionInput {
    /// New explicit direction.
    pub operation_type: Option<OperationType>,
    /// New transaction-type label.
    pub transaction_type: Option<String>,
    /// New amount, must be greater than zero.
    pub amount: Option<Decimal>,
    /// New status.
    pub status: Option<TransactionStatus>,
    /// New narration, must not be blank.
    pub narration: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New beneficiary name.
    pub beneficiary_name: Option<String>,
    /// New reference number.
    pub reference_number: Option<String>,
}

/// Running balance assigned to one transaction by a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Transaction row.
    pub transaction_id: TransactionId,
    /// Balance after the transaction.
    pub balance_after: Decimal,
}

/// Result of a full ledger recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationReport {
    /// Recalculated account.
    pub account_id: AccountId,
    /// Anchor the replay started from.
    pub initial_balance: Decimal,
    /// Account balance stored before the pass.
    pub previous_balance: Decimal,
    /// Account balance stored by the pass.
    pub final_balance: Decimal,
    /// Number of transaction rows rewritten.
    pub transactions_updated: usize,
}

/// Read-only comparison of stored balances against a fresh replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Audited account.
    pub account_id: AccountId,
    /// Anchor the replay started from.
    pub initial_balance: Decimal,
    /// Account balance currently stored.
    pub stored_balance: Decimal,
    /// Account balance a recalculation would store.
    pub expected_balance: Decimal,
    /// Rows whose stored `balance_after` differs from the replay.
    pub mismatched_rows: usize,
    /// Rows examined.
    pub total_rows: usize,
}

impl DriftReport {
    /// Returns true if stored balances already match the replay.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.mismatched_rows == 0 && self.stored_balance == self.expected_balance
    }
}

/// Result of adding a transaction.
#[derive(Debug, Clone)]
pub struct AddTransactionOutcome {
    /// The inserted row, with the balance computed at its insertion point.
    pub transaction: LedgerTransaction,
    /// The recalculation that followed the insert.
    pub recalculation: RecalculationReport,
}

/// Result of editing a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionOutcome {
    /// Edited row.
    pub transaction_id: TransactionId,
    /// Whether the edit touched a balance-relevant field.
    pub recalculation_required: bool,
    /// The recalculation, when one ran.
    pub recalculation: Option<RecalculationReport>,
}

impl EditTransactionOutcome {
    /// Account balance after the edit, when a recalculation ran.
    #[must_use]
    pub fn new_account_balance(&self) -> Option<Decimal> {
        self.recalculation.as_ref().map(|r| r.final_balance)
    }
}

/// Result of deleting a single transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionOutcome {
    /// The deleted row.
    pub deleted: LedgerTransaction,
    /// Change of the account balance caused by the delete.
    pub balance_impact: Decimal,
    /// The recalculation that followed the delete.
    pub recalculation: RecalculationReport,
}

/// Result of deleting several transactions of one account.
#[derive(Debug, Clone)]
pub struct BatchDeleteOutcome {
    /// Account the rows belonged to.
    pub account_id: AccountId,
    /// Number of rows removed.
    pub deleted_count: u64,
    /// Combined change of the account balance.
    pub total_balance_impact: Decimal,
    /// The single recalculation that followed.
    pub recalculation: RecalculationReport,
}

/// What deleting a transaction would do, without doing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePreview {
    /// Previewed row.
    pub transaction_id: TransactionId,
    /// Logical date of the row.
    pub transaction_date: NaiveDate,
    /// Transaction-type label.
    pub transaction_type: String,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Status of the row.
    pub status: TransactionStatus,
    /// Change the delete would apply to the account balance.
    pub balance_impact: Decimal,
    /// Whether the delete moves the balance at all.
    pub will_affect_balance: bool,
}
