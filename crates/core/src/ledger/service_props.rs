//! Property-based tests for LedgerService mutations.
//!
//! Each case builds a random ledger through the service, applies one
//! mutation and checks how balances moved.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use ledgerline_shared::types::{AccountId, TransactionId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::classification::{OperationType, TransactionStatus};
use super::clock::FixedClock;
use super::memory::InMemoryLedgerStore;
use super::service::{LedgerService, LedgerSettings};
use super::store::LedgerStore;
use super::types::{AddTransactionInput, EditTransactionInput, LedgerTransaction};

type Service = LedgerService<InMemoryLedgerStore, FixedClock>;

#[derive(Debug, Clone, Copy)]
struct Op {
    amount: Decimal,
    direction: OperationType,
    status: TransactionStatus,
}

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..5_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

fn opening_balance() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

fn op() -> impl Strategy<Value = Op> {
    (
        amount(),
        prop_oneof![Just(OperationType::Credit), Just(OperationType::Debit)],
        prop_oneof![
            4 => Just(TransactionStatus::Success),
            1 => Just(TransactionStatus::Pending),
            1 => Just(TransactionStatus::Failed),
        ],
    )
        .prop_map(|(amount, direction, status)| Op {
            amount,
            direction,
            status,
        })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// Rows land on even days of 2025 so a new row can slot in between.
fn even_day(index: usize) -> NaiveDate {
    let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    base + chrono::Duration::days(i64::try_from(index * 2).unwrap())
}

fn input(account: AccountId, op: Op, date: NaiveDate) -> AddTransactionInput {
    AddTransactionInput::new(account, op.direction, "UPI", op.amount, "prop")
        .on(date)
        .with_status(op.status)
}

async fn build_ledger(
    opening: Decimal,
    ops: &[Op],
) -> (Arc<InMemoryLedgerStore>, Service, AccountId, Vec<TransactionId>) {
    let store = Arc::new(InMemoryLedgerStore::new());
    let service = LedgerService::with_clock(
        Arc::clone(&store),
        LedgerSettings::default(),
        FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap()),
    );
    let account = AccountId::new();
    store.open_account(account, opening).await;

    let mut ids = Vec::with_capacity(ops.len());
    for (i, op) in ops.iter().enumerate() {
        let outcome = service
            .add_transaction(input(account, *op, even_day(i)))
            .await
            .unwrap();
        ids.push(outcome.transaction.id);
    }
    (store, service, account, ids)
}

async fn balances(store: &InMemoryLedgerStore, account: AccountId) -> Vec<(TransactionId, Decimal)> {
    store
        .ordered_transactions(account)
        .await
        .unwrap()
        .iter()
        .map(|tx: &LedgerTransaction| (tx.id, tx.balance_after))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // =========================================================================
    // Add in the middle: earlier rows keep their balances, later rows and the
    // account balance shift by exactly the new row's impact.
    // =========================================================================

    #[test]
    fn prop_add_in_middle_shifts_tail(
        opening in opening_balance(),
        ops in prop::collection::vec(op(), 1..12),
        new_op in op(),
        position in any::<prop::sample::Index>(),
    ) {
        runtime().block_on(async {
            let (store, service, account, _) = build_ledger(opening, &ops).await;
            let before = balances(&store, account).await;
            let balance_before = store.account_balance(account).await.unwrap().unwrap();

            let k = position.index(ops.len() + 1);
            // Odd day between rows k-1 and k.
            let date = even_day(k) - chrono::Duration::days(1);
            let added = service.add_transaction(input(account, new_op, date)).await.unwrap();
            let impact = added.transaction.impact();

            let after = balances(&store, account).await;
            prop_assert_eq!(after.len(), before.len() + 1);
            for (i, (id, balance)) in before.iter().enumerate() {
                let shifted = if i < k { *balance } else { *balance + impact };
                let now = after.iter().find(|(a, _)| a == id).unwrap().1;
                prop_assert_eq!(now, shifted);
            }

            let balance_after = store.account_balance(account).await.unwrap().unwrap();
            prop_assert_eq!(balance_after, balance_before + impact);
            Ok(())
        })?;
    }

    // =========================================================================
    // Delete reverses exactly: the account balance moves by minus the deleted
    // row's impact, and the preview predicted that move.
    // =========================================================================

    #[test]
    fn prop_delete_reverses_impact(
        opening in opening_balance(),
        ops in prop::collection::vec(op(), 1..12),
        target in any::<prop::sample::Index>(),
    ) {
        runtime().block_on(async {
            let (store, service, account, ids) = build_ledger(opening, &ops).await;
            let id = ids[target.index(ids.len())];
            let balance_before = store.account_balance(account).await.unwrap().unwrap();
            let impact = store.find_transaction(id).await.unwrap().unwrap().impact();

            let preview = service.preview_delete(id).await.unwrap();
            let deleted = service.delete_transaction(id).await.unwrap();

            let balance_after = store.account_balance(account).await.unwrap().unwrap();
            prop_assert_eq!(balance_after, balance_before - impact);
            prop_assert_eq!(preview.balance_impact, balance_after - balance_before);
            prop_assert_eq!(deleted.balance_impact, preview.balance_impact);
            prop_assert_eq!(service.initial_balance(account).await.unwrap(), opening);
            Ok(())
        })?;
    }

    // =========================================================================
    // Edit toggle: success -> failed -> success restores every balance.
    // =========================================================================

    #[test]
    fn prop_status_toggle_round_trips(
        opening in opening_balance(),
        ops in prop::collection::vec(op(), 1..12),
        target in any::<prop::sample::Index>(),
    ) {
        runtime().block_on(async {
            let (store, service, account, ids) = build_ledger(opening, &ops).await;
            let id = ids[target.index(ids.len())];
            service
                .edit_transaction(id, EditTransactionInput {
                    status: Some(TransactionStatus::Success),
                    ..EditTransactionInput::default()
                })
                .await
                .unwrap();
            let settled = balances(&store, account).await;
            let settled_balance = store.account_balance(account).await.unwrap().unwrap();
            let impact = store.find_transaction(id).await.unwrap().unwrap().impact();

            let failed = service
                .edit_transaction(id, EditTransactionInput {
                    status: Some(TransactionStatus::Failed),
                    ..EditTransactionInput::default()
                })
                .await
                .unwrap();
            prop_assert!(failed.recalculation_required);
            prop_assert_eq!(failed.new_account_balance(), Some(settled_balance - impact));

            service
                .edit_transaction(id, EditTransactionInput {
                    status: Some(TransactionStatus::Success),
                    ..EditTransactionInput::default()
                })
                .await
                .unwrap();
            prop_assert_eq!(balances(&store, account).await, settled);
            prop_assert_eq!(
                store.account_balance(account).await.unwrap().unwrap(),
                settled_balance
            );
            Ok(())
        })?;
    }

    // =========================================================================
    // Descriptive edits never recalculate or move a balance.
    // =========================================================================

    #[test]
    fn prop_descriptive_edit_is_balance_noop(
        opening in opening_balance(),
        ops in prop::collection::vec(op(), 1..12),
        target in any::<prop::sample::Index>(),
        narration in "[a-zA-Z][a-zA-Z0-9 ]{0,30}",
        description in proptest::option::of("[a-z ]{0,30}"),
        beneficiary in proptest::option::of("[A-Z][a-z]{1,15}"),
    ) {
        runtime().block_on(async {
            let (store, service, account, ids) = build_ledger(opening, &ops).await;
            let id = ids[target.index(ids.len())];
            let before = balances(&store, account).await;
            let balance_before = store.account_balance(account).await.unwrap();
            let stats_before = store.stats();

            let outcome = service
                .edit_transaction(id, EditTransactionInput {
                    narration: Some(narration),
                    description,
                    beneficiary_name: beneficiary,
                    ..EditTransactionInput::default()
                })
                .await
                .unwrap();

            prop_assert!(!outcome.recalculation_required);
            prop_assert!(outcome.recalculation.is_none());
            prop_assert_eq!(balances(&store, account).await, before);
            prop_assert_eq!(store.account_balance(account).await.unwrap(), balance_before);
            prop_assert_eq!(store.stats().ordered_scans, stats_before.ordered_scans);
            prop_assert_eq!(store.stats().balance_writes, stats_before.balance_writes);
            Ok(())
        })?;
    }
}
