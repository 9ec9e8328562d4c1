//! Core reporting logic for Ledgerlens.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All report types, aggregation rules, and tree calculations live here.
//!
//! # Modules
//!
//! - `reports` - Ledger aggregation, report tree rollup, and export layout
pub mod reports;
