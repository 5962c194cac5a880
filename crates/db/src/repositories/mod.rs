//! Repository implementations for database access.

pub mod account;
pub mod beneficiary;
pub mod ledger;

pub use account::{AccountError, AccountRepository, AccountType, OpenAccountInput};
pub use beneficiary::{BeneficiaryRepository, NewBeneficiary};
pub use ledger::SeaOrmLedgerStore;
