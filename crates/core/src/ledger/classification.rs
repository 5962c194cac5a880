//! Credit/debit classification and balance-relevant statuses.
//!
//! Two strategies coexist:
//! - an explicit [`OperationType`] persisted through the `debit`/`credit`
//!   columns, where the transaction-type label is purely descriptive;
//! - the legacy table, which infers the direction from the label itself.
//!
//! A stored row resolves its direction from the columns first, so both
//! strategies agree for every row written with explicit columns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Money in (+).
    Credit,
    /// Money out (-).
    Debit,
}

impl OperationType {
    /// Applies the direction's sign to an unsigned amount.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(format!("Unknown operation type: {s}")),
        }
    }
}

/// Known transaction-type labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Generic debit.
    Debit,
    /// Generic credit.
    Credit,
    /// Outgoing transfer.
    TransferOut,
    /// Incoming transfer.
    TransferIn,
    /// Cash withdrawal at an ATM.
    AtmWithdrawal,
    /// Cash deposit.
    Deposit,
    /// Bill payment.
    UtilityPayment,
    /// UPI transfer.
    UpiTransfer,
    /// Cheque paid in.
    ChequeDeposit,
    /// Cheque paid out.
    ChequeWithdrawal,
    /// IMPS transfer.
    Imps,
    /// NEFT transfer.
    Neft,
}

/// Labels the legacy table classifies as credits.
pub const CREDIT_TRANSACTION_TYPES: [TransactionType; 4] = [
    TransactionType::Credit,
    TransactionType::TransferIn,
    TransactionType::Deposit,
    TransactionType::ChequeDeposit,
];

/// Labels the legacy table classifies as debits.
pub const DEBIT_TRANSACTION_TYPES: [TransactionType; 8] = [
    TransactionType::Debit,
    TransactionType::TransferOut,
    TransactionType::AtmWithdrawal,
    TransactionType::UtilityPayment,
    TransactionType::UpiTransfer,
    TransactionType::ChequeWithdrawal,
    TransactionType::Imps,
    TransactionType::Neft,
];

impl TransactionType {
    /// Every known label, in display order.
    pub const ALL: [Self; 12] = [
        Self::Debit,
        Self::Credit,
        Self::TransferOut,
        Self::TransferIn,
        Self::AtmWithdrawal,
        Self::Deposit,
        Self::UtilityPayment,
        Self::UpiTransfer,
        Self::ChequeDeposit,
        Self::ChequeWithdrawal,
        Self::Imps,
        Self::Neft,
    ];

    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
            Self::TransferOut => "TRANSFER_OUT",
            Self::TransferIn => "TRANSFER_IN",
            Self::AtmWithdrawal => "ATM_WITHDRAWAL",
            Self::Deposit => "DEPOSIT",
            Self::UtilityPayment => "UTILITY_PAYMENT",
            Self::UpiTransfer => "UPI_TRANSFER",
            Self::ChequeDeposit => "CHEQUE_DEPOSIT",
            Self::ChequeWithdrawal => "CHEQUE_WITHDRAWAL",
            Self::Imps => "IMPS",
            Self::Neft => "NEFT",
        }
    }

    /// Direction assigned by the legacy classification table.
    #[must_use]
    pub fn legacy_direction(self) -> OperationType {
        if CREDIT_TRANSACTION_TYPES.contains(&self) {
            OperationType::Credit
        } else {
            OperationType::Debit
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == label)
            .ok_or_else(|| format!("Unknown transaction type: {s}"))
    }
}

/// Infers a direction from a label using the legacy table.
///
/// Labels outside both sets return `None`, which callers treat as zero
/// impact.
#[must_use]
pub fn classify_legacy(label: &str) -> Option<OperationType> {
    label
        .parse::<TransactionType>()
        .ok()
        .map(TransactionType::legacy_direction)
}

/// Lifecycle status of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Settled; the only status that moves the balance.
    #[default]
    Success,
    /// Awaiting settlement.
    Pending,
    /// Rejected.
    Failed,
    /// Undone after settlement.
    Reversed,
}

/// Statuses whose transactions contribute to the balance.
pub const BALANCE_IMPACTING_STATUSES: [TransactionStatus; 1] = [TransactionStatus::Success];

impl TransactionStatus {
    /// Returns true if transactions in this status move the balance.
    #[must_use]
    pub fn impacts_balance(self) -> bool {
        BALANCE_IMPACTING_STATUSES.contains(&self)
    }

    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Reversed => "reversed",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            "reversed" => Ok(Self::Reversed),
            _ => Err(format!("Unknown transaction status: {s}")),
        }
    }
}

/// The persisted `debit`/`credit` column pair.
///
/// Exactly one side holds the amount for rows written with an explicit
/// operation type. Legacy rows carry neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebitCreditColumns {
    /// Amount when the direction is debit.
    pub debit: Option<Decimal>,
    /// Amount when the direction is credit.
    pub credit: Option<Decimal>,
}

impl DebitCreditColumns {
    /// Builds the column pair for an amount moving in `direction`.
    #[must_use]
    pub fn for_operation(amount: Decimal, direction: OperationType) -> Self {
        match direction {
            OperationType::Credit => Self {
                debit: None,
                credit: Some(amount),
            },
            OperationType::Debit => Self {
                debit: Some(amount),
                credit: None,
            },
        }
    }

    /// Direction encoded by the columns, if exactly one side is set.
    #[must_use]
    pub fn direction(&self) -> Option<OperationType> {
        match (self.debit, self.credit) {
            (None, Some(_)) => Some(OperationType::Credit),
            (Some(_), None) => Some(OperationType::Debit),
            _ => None,
        }
    }
}

/// Resolves the direction of a stored row.
///
/// Explicit columns win; otherwise the legacy label table decides.
#[must_use]
pub fn resolve_direction(columns: &DebitCreditColumns, label: &str) -> Option<OperationType> {
    columns.direction().or_else(|| classify_legacy(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_legacy_credit_set() {
        for label in ["CREDIT", "TRANSFER_IN", "DEPOSIT", "CHEQUE_DEPOSIT"] {
            assert_eq!(classify_legacy(label), Some(OperationType::Credit), "{label}");
        }
    }

    #[test]
    fn test_legacy_debit_set() {
        for label in [
            "DEBIT",
            "TRANSFER_OUT",
            "ATM_WITHDRAWAL",
            "UTILITY_PAYMENT",
            "UPI_TRANSFER",
            "CHEQUE_WITHDRAWAL",
            "IMPS",
            "NEFT",
        ] {
            assert_eq!(classify_legacy(label), Some(OperationType::Debit), "{label}");
        }
    }

    #[test]
    fn test_unknown_label_is_unclassified() {
        assert_eq!(classify_legacy("SALARY"), None);
        assert_eq!(classify_legacy(""), None);
        assert_eq!(classify_legacy("credit"), None);
    }

    #[test]
    fn test_sets_partition_all_labels() {
        for t in TransactionType::ALL {
            let in_credit = CREDIT_TRANSACTION_TYPES.contains(&t);
            let in_debit = DEBIT_TRANSACTION_TYPES.contains(&t);
            assert!(in_credit ^ in_debit, "{t} must be in exactly one set");
        }
    }

    #[test]
    fn test_only_success_impacts_balance() {
        assert!(TransactionStatus::Success.impacts_balance());
        assert!(!TransactionStatus::Pending.impacts_balance());
        assert!(!TransactionStatus::Failed.impacts_balance());
        assert!(!TransactionStatus::Reversed.impacts_balance());
    }

    #[test]
    fn test_columns_for_operation() {
        let credit = DebitCreditColumns::for_operation(dec!(50), OperationType::Credit);
        assert_eq!(credit.debit, None);
        assert_eq!(credit.credit, Some(dec!(50)));
        assert_eq!(credit.direction(), Some(OperationType::Credit));

        let debit = DebitCreditColumns::for_operation(dec!(50), OperationType::Debit);
        assert_eq!(debit.debit, Some(dec!(50)));
        assert_eq!(debit.credit, None);
        assert_eq!(debit.direction(), Some(OperationType::Debit));
    }

    #[test]
    fn test_explicit_columns_override_label() {
        // IMPS is a legacy debit, but the columns say credit.
        let columns = DebitCreditColumns::for_operation(dec!(10), OperationType::Credit);
        assert_eq!(resolve_direction(&columns, "IMPS"), Some(OperationType::Credit));
    }

    #[test]
    fn test_missing_or_conflicting_columns_fall_back_to_label() {
        let empty = DebitCreditColumns::default();
        assert_eq!(resolve_direction(&empty, "DEPOSIT"), Some(OperationType::Credit));

        let both = DebitCreditColumns {
            debit: Some(dec!(1)),
            credit: Some(dec!(1)),
        };
        assert_eq!(resolve_direction(&both, "NEFT"), Some(OperationType::Debit));
        assert_eq!(resolve_direction(&both, "OTHER"), None);
    }

    #[test]
    fn test_label_round_trip_through_str() {
        assert_eq!("UPI_TRANSFER".parse::<TransactionType>(), Ok(TransactionType::UpiTransfer));
        assert_eq!(TransactionType::ChequeWithdrawal.to_string(), "CHEQUE_WITHDRAWAL");
        assert_eq!("Reversed".parse::<TransactionStatus>(), Ok(TransactionStatus::Reversed));
        assert_eq!(" DEBIT ".parse::<OperationType>(), Ok(OperationType::Debit));
        assert!("sideways".parse::<OperationType>().is_err());
    }
}
