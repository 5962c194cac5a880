//! Ledger balance engine.
//!
//! This module keeps per-account running balances consistent with an
//! editable, chronologically ordered transaction log:
//! - Transaction classification (credit vs debit, balance-moving statuses)
//! - The balance impact function
//! - Initial balance resolution
//! - Full-replay recalculation
//! - Add, edit and delete mutations
//! - The storage trait and an in-memory implementation

pub mod classification;
pub mod clock;
pub mod engine;
pub mod error;
pub mod impact;
pub mod memory;
pub mod reference;
pub mod resolver;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod engine_props;
#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use classification::{
    CREDIT_TRANSACTION_TYPES, DEBIT_TRANSACTION_TYPES, DebitCreditColumns, OperationType,
    TransactionStatus, TransactionType, classify_legacy, resolve_direction,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{RecalculationEngine, replay};
pub use error::LedgerError;
pub use impact::{
    EditImpact, ImpactInput, calculate_edit_impact, calculate_impact, calculate_impact_legacy,
};
pub use memory::{InMemoryLedgerStore, StoreStats};
pub use resolver::BalanceResolver;
pub use service::{EditPlan, LedgerService, LedgerSettings, plan_edit};
pub use store::{LedgerStore, StoreError};
pub use types::{
    AddTransactionInput, AddTransactionOutcome, BalanceSnapshot, BatchDeleteOutcome,
    DeletePreview, DeleteTransactionOutcome, DriftReport, EditTransactionInput,
    EditTransactionOutcome, LedgerTransaction, NewTransaction, RecalculationReport,
    TransactionDetails, TransactionPatch,
};
