//! Input validation for ledger mutations.
//!
//! Every issue found is collected so callers can show them together.
//! Nothing is written when validation fails.

use ledgerline_shared::types::Amount;
use rust_decimal::Decimal;

use super::classification::{OperationType, classify_legacy};
use super::error::LedgerError;
use super::types::{AddTransactionInput, EditTransactionInput};

/// Add input that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedAdd {
    /// Strictly positive amount.
    pub amount: Amount,
    /// Direction of the new row.
    pub direction: OperationType,
}

fn check_amount(amount: Decimal, issues: &mut Vec<String>) -> Option<Amount> {
    match Amount::new(amount) {
        Ok(amount) => Some(amount),
        Err(e) => {
            issues.push(e.to_string());
            None
        }
    }
}

fn check_narration(narration: &str, issues: &mut Vec<String>) {
    if narration.trim().is_empty() {
        issues.push("Narration is required".to_string());
    }
}

/// Validates an add request and resolves its direction.
///
/// An explicit operation type wins. Without one, the label must be known to
/// the legacy table.
///
/// # Errors
///
/// Returns `LedgerError::Validation` listing every issue found.
pub fn validate_add_input(input: &AddTransactionInput) -> Result<ValidatedAdd, LedgerError> {
    let mut issues = Vec::new();

    let amount = check_amount(input.amount, &mut issues);
    check_narration(&input.narration, &mut issues);

    let label = input.transaction_type.trim();
    if label.is_empty() {
        issues.push("Transaction type is required".to_string());
    }

    let direction = input.operation_type.or_else(|| classify_legacy(label));
    if direction.is_none() && !label.is_empty() {
        issues.push(format!(
            "Operation type is required for transaction type '{label}'"
        ));
    }

    match (amount, direction) {
        (Some(amount), Some(direction)) if issues.is_empty() => {
            Ok(ValidatedAdd { amount, direction })
        }
        _ => Err(LedgerError::Validation(issues)),
    }
}

/// Validates the supplied fields of an edit request.
///
/// # Errors
///
/// Returns `LedgerError::Validation` listing every issue found.
pub fn validate_edit_input(input: &EditTransactionInput) -> Result<(), LedgerError> {
    let mut issues = Vec::new();

    if let Some(amount) = input.amount {
        check_amount(amount, &mut issues);
    }
    if let Some(narration) = &input.narration {
        check_narration(narration, &mut issues);
    }
    if input
        .transaction_type
        .as_deref()
        .is_some_and(|label| label.trim().is_empty())
    {
        issues.push("Transaction type must not be blank".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::Validation(issues))
    }
}
