//! Property-based tests for the replay fold and the recalculation engine.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use ledgerline_shared::types::{AccountId, TransactionId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::classification::{DebitCreditColumns, OperationType, TransactionStatus};
use super::engine::{RecalculationEngine, replay};
use super::memory::InMemoryLedgerStore;
use super::store::LedgerStore;
use super::types::{LedgerTransaction, NewTransaction, TransactionDetails};

#[derive(Debug, Clone)]
struct RowSpec {
    day_offset: i64,
    hour: u32,
    amount: Decimal,
    direction: OperationType,
    status: TransactionStatus,
}

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

fn opening_balance() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..100_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

fn status() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        3 => Just(TransactionStatus::Success),
        1 => Just(TransactionStatus::Pending),
        1 => Just(TransactionStatus::Failed),
        1 => Just(TransactionStatus::Reversed),
    ]
}

fn row_spec() -> impl Strategy<Value = RowSpec> {
    (
        0i64..60,
        0u32..24,
        amount(),
        prop_oneof![Just(OperationType::Credit), Just(OperationType::Debit)],
        status(),
    )
        .prop_map(|(day_offset, hour, amount, direction, status)| RowSpec {
            day_offset,
            hour,
            amount,
            direction,
            status,
        })
}

fn new_row(account_id: AccountId, spec: &RowSpec) -> NewTransaction {
    let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    NewTransaction {
        account_id,
        reference: format!("TXN_{}_{}", spec.day_offset, spec.hour),
        transaction_date: base + Duration::days(spec.day_offset),
        transaction_time: NaiveTime::from_hms_opt(spec.hour, 0, 0).unwrap(),
        transaction_type: "IMPS".to_string(),
        amount: spec.amount,
        columns: DebitCreditColumns::for_operation(spec.amount, spec.direction),
        balance_after: Decimal::ZERO,
        status: spec.status,
        details: TransactionDetails::default(),
    }
}

fn ledger_row(spec: &RowSpec) -> LedgerTransaction {
    let row = new_row(AccountId::new(), spec);
    let now = Utc::now();
    LedgerTransaction {
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
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Fold correctness: each snapshot is the previous one plus the row impact,
    // and the final balance is the last snapshot.
    // =========================================================================

    #[test]
    fn prop_fold_correctness(initial in opening_balance(), specs in prop::collection::vec(row_spec(), 0..40)) {
        let rows: Vec<LedgerTransaction> = specs.iter().map(ledger_row).collect();
        let (snapshots, last) = replay(initial, &rows).unwrap();

        prop_assert_eq!(snapshots.len(), rows.len());
        let mut previous = initial;
        for (snapshot, row) in snapshots.iter().zip(&rows) {
            prop_assert_eq!(snapshot.transaction_id, row.id);
            prop_assert_eq!(snapshot.balance_after, previous + row.impact());
            previous = snapshot.balance_after;
        }
        prop_assert_eq!(last, previous);
    }

    // =========================================================================
    // Status gating: non-success rows never move the final balance.
    // =========================================================================

    #[test]
    fn prop_status_gating(initial in opening_balance(), specs in prop::collection::vec(row_spec(), 0..40)) {
        let rows: Vec<LedgerTransaction> = specs.iter().map(ledger_row).collect();
        let settled: Vec<LedgerTransaction> = rows
            .iter()
            .filter(|r| r.status == TransactionStatus::Success)
            .cloned()
            .collect();

        let (_, with_all) = replay(initial, &rows).unwrap();
        let (_, settled_only) = replay(initial, &settled).unwrap();
        prop_assert_eq!(with_all, settled_only);

        let expected: Decimal = initial
            + settled
                .iter()
                .map(|r| r.direction().map_or(Decimal::ZERO, |d| d.signed(r.amount)))
                .sum::<Decimal>();
        prop_assert_eq!(with_all, expected);
    }

    // =========================================================================
    // Idempotence: a second recalculation changes nothing.
    // =========================================================================

    #[test]
    fn prop_recalculation_idempotent(initial in opening_balance(), specs in prop::collection::vec(row_spec(), 1..25)) {
        runtime().block_on(async {
            let store = Arc::new(InMemoryLedgerStore::new());
            let account = AccountId::new();
            store.open_account(account, Decimal::ZERO).await;
            for spec in &specs {
                store.insert_transaction(new_row(account, spec)).await.unwrap();
            }

            let engine = RecalculationEngine::new(Arc::clone(&store));
            let first = engine.recalculate_from(account, initial).await.unwrap();
            let rows_after_first = store.ordered_transactions(account).await.unwrap();

            let second = engine.recalculate(account).await.unwrap();
            let rows_after_second = store.ordered_transactions(account).await.unwrap();

            prop_assert_eq!(first.final_balance, second.final_balance);
            prop_assert_eq!(second.initial_balance, initial);
            prop_assert_eq!(second.previous_balance, first.final_balance);

            let balances = |rows: &[LedgerTransaction]| {
                rows.iter().map(|r| (r.id, r.balance_after)).collect::<Vec<_>>()
            };
            prop_assert_eq!(balances(&rows_after_first), balances(&rows_after_second));
            Ok(())
        })?;
    }
}
