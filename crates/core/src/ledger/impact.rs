//! Balance impact of a single transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::classification::{OperationType, TransactionStatus, classify_legacy};

/// Signed effect of a transaction on the running balance.
///
/// Zero unless the status is `success`, or when the direction could not be
/// resolved. Never fails.
#[must_use]
pub fn calculate_impact(
    amount: Decimal,
    direction: Option<OperationType>,
    status: TransactionStatus,
) -> Decimal {
    if !status.impacts_balance() {
        return Decimal::ZERO;
    }

    direction.map_or(Decimal::ZERO, |d| d.signed(amount))
}

/// Impact using the legacy label table to infer the direction.
#[must_use]
pub fn calculate_impact_legacy(amount: Decimal, label: &str, status: TransactionStatus) -> Decimal {
    calculate_impact(amount, classify_legacy(label), status)
}

/// Balance-relevant facts of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImpactInput {
    /// Unsigned amount.
    pub amount: Decimal,
    /// Resolved direction.
    pub direction: Option<OperationType>,
    /// Lifecycle status.
    pub status: TransactionStatus,
}

impl ImpactInput {
    /// Impact of these facts.
    #[must_use]
    pub fn impact(&self) -> Decimal {
        calculate_impact(self.amount, self.direction, self.status)
    }
}

/// Impact change caused by an edit, for previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditImpact {
    /// Impact before the edit.
    pub original_impact: Decimal,
    /// Impact after the edit.
    pub new_impact: Decimal,
    /// `new_impact - original_impact`; the shift of every later balance.
    pub difference: Decimal,
}

/// Compares the impact of a transaction before and after an edit.
#[must_use]
pub fn calculate_edit_impact(original: ImpactInput, updated: ImpactInput) -> EditImpact {
    let original_impact = original.impact();
    let new_impact = updated.impact();

    EditImpact {
        original_impact,
        new_impact,
        difference: new_impact - original_impact,
    }
}
