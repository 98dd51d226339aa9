//! Ledger module containing per-account projection and balance seeding

pub mod builder;
pub mod seed;

pub use builder::*;
pub use seed::*;
