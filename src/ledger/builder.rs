//! Per-account ledger derivation from the transaction table

use std::collections::{BTreeMap, BTreeSet};

use bigdecimal::BigDecimal;

use crate::account::Account;
use crate::ledger::seed::seed_rows;
use crate::table::Table;
use crate::types::{BalanceDeclaration, EngineResult, Ledger, LedgerRow, Transaction};

/// Derives per-account, time-ordered, balance-annotated ledger views.
///
/// Every transaction lands in exactly two ledgers, once with a negative
/// amount in its sender's view and once with a positive amount in its
/// recipient's, each carrying the other account as counterparty. Seeding
/// from balance declarations is inclusive by default: a declaration dated
/// on the first transaction's day still applies.
#[derive(Debug, Clone)]
pub struct LedgerBuilder {
    inclusive: bool,
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerBuilder {
    /// Create a builder with inclusive seeding
    pub fn new() -> Self {
        Self { inclusive: true }
    }

    /// Whether a declaration dated exactly on the first transaction's day
    /// seeds the ledger (`true`) or only strictly earlier ones do (`false`)
    pub fn inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }

    /// Build one ledger per account named by the table
    pub fn build(
        &self,
        table: &Table,
        declarations: Option<&[BalanceDeclaration]>,
    ) -> EngineResult<BTreeMap<Account, Ledger>> {
        let transactions = table.to_transactions()?;
        self.build_from_transactions(&transactions, declarations)
    }

    /// Build one ledger per account named by the transactions.
    ///
    /// Accounts appear as map keys in their natural order; an account with
    /// no transactions is not enumerated.
    pub fn build_from_transactions(
        &self,
        transactions: &[Transaction],
        declarations: Option<&[BalanceDeclaration]>,
    ) -> EngineResult<BTreeMap<Account, Ledger>> {
        for transaction in transactions {
            transaction.validate()?;
        }

        let mut accounts = BTreeSet::new();
        for transaction in transactions {
            if !transaction.from_account.is_empty() {
                accounts.insert(transaction.from_account.clone());
            }
            if !transaction.to_account.is_empty() {
                accounts.insert(transaction.to_account.clone());
            }
        }

        let mut ledgers = BTreeMap::new();
        for account in accounts {
            let mut rows = project_rows(transactions, &account);
            // stable: input order breaks date ties
            rows.sort_by_key(|row| row.date);
            if let Some(declarations) = declarations {
                seed_rows(&mut rows, &account, declarations, self.inclusive);
            }
            recompute_balances(&mut rows);
            ledgers.insert(account.clone(), Ledger { account, rows });
        }
        tracing::debug!(
            accounts = ledgers.len(),
            transactions = transactions.len(),
            "built ledgers"
        );
        Ok(ledgers)
    }
}

/// Build ledgers with the default (inclusive) seeding policy
pub fn build_ledgers(
    transactions: &[Transaction],
    declarations: Option<&[BalanceDeclaration]>,
) -> EngineResult<BTreeMap<Account, Ledger>> {
    LedgerBuilder::new().build_from_transactions(transactions, declarations)
}

fn project_rows(transactions: &[Transaction], account: &Account) -> Vec<LedgerRow> {
    let mut rows = Vec::new();
    for transaction in transactions {
        if transaction.from_account == *account {
            rows.push(LedgerRow {
                date: transaction.date,
                description: transaction.description.clone(),
                counterparty: transaction.to_account.clone(),
                amount: -&transaction.amount,
                balance: BigDecimal::from(0),
            });
        }
        if transaction.to_account == *account {
            rows.push(LedgerRow {
                date: transaction.date,
                description: transaction.description.clone(),
                counterparty: transaction.from_account.clone(),
                amount: transaction.amount.clone(),
                balance: BigDecimal::from(0),
            });
        }
    }
    rows
}

pub(crate) fn recompute_balances(rows: &mut [LedgerRow]) {
    let mut running = BigDecimal::from(0);
    for row in rows {
        running = &running + &row.amount;
        row.balance = running.clone();
    }
}
