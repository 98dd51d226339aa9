//! Basic pipeline example: rules from TOML, then per-account ledgers

use bankflow_core::{
    rules_from_toml, BalanceDeclaration, LedgerBuilder, RuleEngine, Table, Transaction,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Bankflow Core - Basic Pipeline Example\n");

    // 1. A normalized transaction table, as a bank-file collaborator
    //    would supply it
    println!("📋 Normalizing transactions...");
    let transactions = vec![
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "ACME PAYROLL",
            BigDecimal::from(2500),
            "Income:Acme".parse()?,
            "Assets:Checking".parse()?,
        ),
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            "AMZN*ORDER 4411",
            BigDecimal::from(60),
            "Assets:Checking".parse()?,
            "Expenses:Unknown".parse()?,
        ),
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            "RENT JANUARY",
            BigDecimal::from(1200),
            "Assets:Checking".parse()?,
            "Expenses:Housing:Rent".parse()?,
        ),
    ];
    let mut table = Table::from_transactions(&transactions)?;
    println!("  ✓ {} transactions normalized\n", table.len());

    // 2. Rewrite rules as a user would declare them in a config file
    println!("🏷️  Applying rewrite rules...");
    let rules = rules_from_toml(
        r#"
        [[rules]]
        type = "Rule"

        [rules.data]

        [[rules.data.select]]
        type = "SelectOp"

        [rules.data.select.data]
        op = "contains"
        column = "Description"
        b = "AMZN"

        [[rules.data.apply]]
        type = "ApplyOp"

        [rules.data.apply.data]
        op = "assign"
        column = "To"
        b = "Expenses:Shopping:Amazon"
        "#,
    )?;

    let engine = RuleEngine::new();
    engine.apply_all(&rules, &mut table)?;
    println!("  ✓ {} rule(s) applied\n", rules.len());

    // 3. Derive per-account ledgers, seeded from a statement balance
    println!("📒 Building ledgers...\n");
    let declarations = vec![BalanceDeclaration::new(
        "Assets:Checking".parse()?,
        NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        BigDecimal::from(340),
    )];
    let ledgers = LedgerBuilder::new().build(&table, Some(&declarations))?;

    for (account, ledger) in &ledgers {
        println!("  {}", account);
        for row in &ledger.rows {
            println!(
                "    {}  {:<24} {:>10}  balance {:>10}",
                row.date, row.description, row.amount, row.balance
            );
        }
        println!();
    }

    println!("🎉 Example completed successfully!");
    Ok(())
}
