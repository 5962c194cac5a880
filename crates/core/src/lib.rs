//! Core business logic for Ledgerline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and balance calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Running-balance engine over per-account transaction logs
pub mod ledger;
