//! `SeaORM` entity definitions.

pub mod accounts;
pub mod beneficiaries;
pub mod user_transactions;
pub mod users;
