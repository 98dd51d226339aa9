//! Balance seeding from externally asserted declarations

use bigdecimal::BigDecimal;

use crate::account::Account;
use crate::ledger::builder::recompute_balances;
use crate::types::{BalanceDeclaration, Ledger, LedgerRow};

/// Description carried by the synthetic initial-balance row
pub const INITIAL_BALANCE_DESCRIPTION: &str = "Initial Balance";

/// Seed a ledger with the latest applicable balance declaration.
///
/// The applicable declaration is the one for the ledger's account with the
/// latest date `<=` the first row's date (`< ` when `inclusive` is false);
/// date ties resolve to the last declaration in input order. When one is
/// found, a synthetic row dated at the declaration carries the statement
/// balance as its signed amount, with the account itself as counterparty
/// placeholder, and running balances are recomputed from scratch so the
/// synthetic row becomes the baseline. When none applies the ledger is
/// returned unchanged; at most one synthetic row is ever injected.
pub fn seed_initial_balance(
    mut ledger: Ledger,
    declarations: &[BalanceDeclaration],
    inclusive: bool,
) -> Ledger {
    if seed_rows(&mut ledger.rows, &ledger.account, declarations, inclusive) {
        recompute_balances(&mut ledger.rows);
    }
    ledger
}

/// Insert the synthetic row if an applicable declaration exists.
///
/// Returns whether a row was injected; balances are left for the caller to
/// recompute.
pub(crate) fn seed_rows(
    rows: &mut Vec<LedgerRow>,
    account: &Account,
    declarations: &[BalanceDeclaration],
    inclusive: bool,
) -> bool {
    let first_date = match rows.first() {
        Some(row) => row.date,
        None => return false,
    };

    let mut chosen: Option<&BalanceDeclaration> = None;
    for declaration in declarations.iter().filter(|d| d.account == *account) {
        let applicable = if inclusive {
            declaration.date <= first_date
        } else {
            declaration.date < first_date
        };
        if applicable && chosen.is_none_or(|best| declaration.date >= best.date) {
            chosen = Some(declaration);
        }
    }

    let Some(declaration) = chosen else {
        tracing::debug!(account = %account, "no applicable balance declaration");
        return false;
    };

    rows.insert(
        0,
        LedgerRow {
            date: declaration.date,
            description: INITIAL_BALANCE_DESCRIPTION.to_string(),
            counterparty: account.clone(),
            amount: declaration.statement_balance.clone(),
            balance: BigDecimal::from(0),
        },
    );
    // stable: the synthetic row stays ahead of same-dated transactions
    rows.sort_by_key(|row| row.date);
    tracing::debug!(account = %account, date = %declaration.date, "seeded initial balance");
    true
}
