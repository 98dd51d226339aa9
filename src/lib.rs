//! # Bankflow Core
//!
//! Core engine for normalizing personal banking exports: a declarative rule
//! engine over tabular transaction records and a ledger construction engine
//! deriving per-account, balance-annotated views.
//!
//! ## Features
//!
//! - **Rule engine**: conjunctive column predicates paired with assignment
//!   actions, applied in declared order over an owned transaction table
//! - **Operator registry**: canonical comparison operators plus
//!   user-registered binary functions as an escape hatch
//! - **Round-trippable rule documents**: `{type, data}` envelopes in JSON
//!   and human-editable TOML
//! - **Ledger construction**: double-entry projection of every transaction
//!   into its sender's and recipient's ledgers with running balances
//! - **Balance seeding**: synthetic initial-balance rows anchored to
//!   externally asserted balance declarations
//!
//! File discovery, per-bank CSV parsing, and presentation of the finished
//! ledgers are collaborator responsibilities; this crate consumes the
//! normalized transaction table and rule/declaration values they supply.
//!
//! ## Quick Start
//!
//! ```rust
//! use bankflow_core::{LedgerBuilder, RuleEngine, Table, Transaction};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let transactions = vec![Transaction::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     "Paycheck",
//!     BigDecimal::from(1000),
//!     "Income:Employer".parse().unwrap(),
//!     "Assets:Checking".parse().unwrap(),
//! )];
//!
//! let table = Table::from_transactions(&transactions).unwrap();
//! let ledgers = LedgerBuilder::new().build(&table, None).unwrap();
//! assert_eq!(ledgers.len(), 2);
//! ```

pub mod account;
pub mod document;
pub mod ledger;
pub mod rules;
pub mod table;
pub mod types;

// Re-export commonly used types
pub use account::*;
pub use document::*;
pub use ledger::*;
pub use rules::*;
pub use table::*;
pub use types::*;
