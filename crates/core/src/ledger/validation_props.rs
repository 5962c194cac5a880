//! Property-based tests for mutation input validation.

use ledgerline_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::classification::{OperationType, TransactionType};
use super::error::LedgerError;
use super::types::{AddTransactionInput, EditTransactionInput};
use super::validation::{validate_add_input, validate_edit_input};

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // Amounts from 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

/// Strategy to generate a zero or negative amount.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|paise| Decimal::new(-paise, 2))
}

fn operation() -> impl Strategy<Value = OperationType> {
    prop_oneof![Just(OperationType::Credit), Just(OperationType::Debit)]
}

fn legacy_label() -> impl Strategy<Value = TransactionType> {
    proptest::sample::select(TransactionType::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any positive amount with a narration and explicit direction is accepted.
    #[test]
    fn prop_positive_amount_accepted(
        amount in positive_amount(),
        op in operation(),
        narration in "[a-zA-Z0-9]{1,40}",
    ) {
        let input = AddTransactionInput::new(AccountId::new(), op, "UPI", amount, narration);
        let validated = validate_add_input(&input);
        prop_assert!(validated.is_ok(), "got {:?}", validated);
        let validated = validated.unwrap();
        prop_assert_eq!(validated.amount.value(), amount);
        prop_assert_eq!(validated.direction, op);
    }

    /// Zero or negative amounts are rejected on add and on edit.
    #[test]
    fn prop_non_positive_amount_rejected(amount in non_positive_amount(), op in operation()) {
        let input = AddTransactionInput::new(AccountId::new(), op, "UPI", amount, "n");
        prop_assert!(matches!(validate_add_input(&input), Err(LedgerError::Validation(_))));

        let edit = EditTransactionInput {
            amount: Some(amount),
            ..EditTransactionInput::default()
        };
        prop_assert!(matches!(validate_edit_input(&edit), Err(LedgerError::Validation(_))));
    }

    /// Whitespace-only narrations are rejected.
    #[test]
    fn prop_blank_narration_rejected(blank in "[ \t]{0,10}", amount in positive_amount()) {
        let input = AddTransactionInput::new(
            AccountId::new(),
            OperationType::Debit,
            "NEFT",
            amount,
            blank,
        );
        prop_assert!(matches!(validate_add_input(&input), Err(LedgerError::Validation(_))));
    }

    /// Without an explicit direction, every legacy label resolves to its table direction.
    #[test]
    fn prop_legacy_label_direction(label in legacy_label(), amount in positive_amount()) {
        let mut input = AddTransactionInput::new(
            AccountId::new(),
            OperationType::Credit,
            label.as_str(),
            amount,
            "legacy",
        );
        input.operation_type = None;

        let validated = validate_add_input(&input).unwrap();
        prop_assert_eq!(validated.direction, label.legacy_direction());
    }
}
