//! Integration tests for bankflow-core

use bankflow_core::{
    build_ledgers, rules_from_json, rules_from_toml, rules_to_json, rules_to_toml, Account,
    ApplyOp, BalanceDeclaration, EngineError, LedgerBuilder, Operator, Rule, RuleEngine, SelectOp,
    Table, Transaction, Value, INITIAL_BALANCE_DESCRIPTION,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn account(identifier: &str) -> Account {
    identifier.parse().unwrap()
}

fn sample_transactions() -> Vec<Transaction> {
    vec![
        Transaction::new(
            date(2024, 1, 1),
            "Paycheck",
            BigDecimal::from(1000),
            account("Employer"),
            account("Checking"),
        ),
        Transaction::new(
            date(2024, 1, 3),
            "AMZN*ORDER 4411",
            BigDecimal::from(60),
            account("Checking"),
            account("Expenses:Unknown"),
        ),
        Transaction::new(
            date(2024, 1, 5),
            "Rent",
            BigDecimal::from(800),
            account("Checking"),
            account("Landlord"),
        ),
    ]
}

#[test]
fn test_rules_then_ledgers_workflow() {
    let mut table = Table::from_transactions(&sample_transactions()).unwrap();

    // Rewrite the Amazon charge to a real expense account
    let rules = vec![Rule::builder()
        .when(SelectOp::column(Operator::Contains, "Description", "AMZN"))
        .then(ApplyOp::assign("To", "Expenses:Shopping:Amazon"))
        .build()
        .unwrap()];

    let engine = RuleEngine::new();
    engine.apply_all(&rules, &mut table).unwrap();

    let ledgers = LedgerBuilder::new().build(&table, None).unwrap();

    // the rewritten account now owns the charge
    let amazon = &ledgers[&account("Expenses:Shopping:Amazon")];
    assert_eq!(amazon.rows.len(), 1);
    assert_eq!(amazon.rows[0].amount, BigDecimal::from(60));
    assert_eq!(amazon.rows[0].counterparty, account("Checking"));
    assert!(!ledgers.contains_key(&account("Expenses:Unknown")));

    // and Checking still nets out
    let checking = &ledgers[&account("Checking")];
    assert_eq!(checking.rows.len(), 3);
    assert_eq!(checking.closing_balance(), Some(&BigDecimal::from(140)));
}

#[test]
fn test_amzn_rule_leaves_non_matching_rows_untouched() {
    let mut table = Table::from_transactions(&sample_transactions()).unwrap();
    let rule = Rule::builder()
        .when(SelectOp::column(Operator::Contains, "Description", "AMZN"))
        .then(ApplyOp::assign("To", "Shopping:Amazon"))
        .build()
        .unwrap();

    RuleEngine::new().apply(&rule, &mut table).unwrap();

    assert_eq!(
        table.column("To").unwrap(),
        &[
            Value::from("Checking"),
            Value::from("Shopping:Amazon"),
            Value::from("Landlord"),
        ]
    );
}

#[test]
fn test_later_rules_win_on_overlap() {
    let mut table = Table::from_transactions(&sample_transactions()).unwrap();

    // RuleA assigns where the predicate holds, RuleB unconditionally after
    let rule_a = Rule::builder()
        .when(SelectOp::column(Operator::Contains, "Description", "AMZN"))
        .then(ApplyOp::assign("Category", "Shopping"))
        .build()
        .unwrap();
    let rule_b = Rule::builder()
        .when(SelectOp::literal(Operator::Eq, "always", "always"))
        .then(ApplyOp::assign("Category", "Reviewed"))
        .build()
        .unwrap();

    RuleEngine::new()
        .apply_all(&[rule_a, rule_b], &mut table)
        .unwrap();

    assert_eq!(
        table.column("Category").unwrap(),
        &[
            Value::from("Reviewed"),
            Value::from("Reviewed"),
            Value::from("Reviewed"),
        ]
    );
}

#[test]
fn test_double_entry_invariant_over_ledgers() {
    let transactions = sample_transactions();
    let ledgers = build_ledgers(&transactions, None).unwrap();

    // each transaction appears exactly twice across all ledgers, once per sign
    for transaction in &transactions {
        let appearances: Vec<_> = ledgers
            .values()
            .flat_map(|ledger| {
                ledger
                    .rows
                    .iter()
                    .filter(|row| row.description == transaction.description)
                    .map(move |row| (ledger.account.clone(), row.amount.clone()))
            })
            .collect();
        assert_eq!(appearances.len(), 2);
        assert!(appearances
            .contains(&(transaction.from_account.clone(), -&transaction.amount)));
        assert!(appearances
            .contains(&(transaction.to_account.clone(), transaction.amount.clone())));
    }

    // signed amounts sum to zero across the whole system
    let total: BigDecimal = ledgers.values().map(|ledger| ledger.net_change()).sum();
    assert_eq!(total, BigDecimal::from(0));
}

#[test]
fn test_running_balance_is_prefix_sum() {
    let ledgers = build_ledgers(&sample_transactions(), None).unwrap();
    for ledger in ledgers.values() {
        let mut expected = BigDecimal::from(0);
        for row in &ledger.rows {
            expected = &expected + &row.amount;
            assert_eq!(row.balance, expected);
        }
    }
}

#[test]
fn test_balance_declaration_seeds_checking() {
    let declarations = vec![BalanceDeclaration::new(
        account("Checking"),
        date(2023, 12, 31),
        BigDecimal::from(50),
    )];
    let transactions = vec![
        Transaction::new(
            date(2024, 1, 1),
            "Paycheck",
            BigDecimal::from(1000),
            account("Employer"),
            account("Checking"),
        ),
        Transaction::new(
            date(2024, 1, 5),
            "Rent",
            BigDecimal::from(800),
            account("Checking"),
            account("Landlord"),
        ),
    ];

    let ledgers = build_ledgers(&transactions, Some(&declarations)).unwrap();
    let checking = &ledgers[&account("Checking")];

    assert_eq!(checking.rows.len(), 3);
    assert_eq!(checking.rows[0].description, INITIAL_BALANCE_DESCRIPTION);
    assert_eq!(checking.rows[0].amount, BigDecimal::from(50));
    assert_eq!(checking.rows[0].balance, BigDecimal::from(50));
    assert_eq!(checking.rows[1].balance, BigDecimal::from(1050));
    assert_eq!(checking.rows[2].balance, BigDecimal::from(250));

    // only the declared account is seeded
    assert_eq!(ledgers[&account("Employer")].rows.len(), 1);
}

#[test]
fn test_rule_documents_round_trip_both_formats() {
    let rules = vec![
        Rule::builder()
            .when(SelectOp::column(Operator::Contains, "Description", "AMZN"))
            .when(SelectOp::column(
                Operator::Ge,
                "Amount",
                Value::Number(BigDecimal::from(20)),
            ))
            .then(ApplyOp::assign("To", "Expenses:Shopping:Amazon"))
            .build()
            .unwrap(),
        Rule::builder()
            .when(SelectOp::column(
                Operator::Lt,
                "Date",
                Value::Date(date(2024, 1, 1)),
            ))
            .then(ApplyOp::assign("Category", "Archived"))
            .build()
            .unwrap(),
    ];

    let json = rules_to_json(&rules).unwrap();
    assert_eq!(rules_from_json(&json).unwrap(), rules);

    let document = rules_to_toml(&rules).unwrap();
    assert_eq!(rules_from_toml(&document).unwrap(), rules);
}

#[test]
fn test_deserialized_rules_drive_the_engine() {
    let json = r#"[{
        "type": "Rule",
        "data": {
            "select": [
                {"type": "SelectOp", "data": {"op": "contains", "column": "Description", "b": "AMZN"}}
            ],
            "apply": [
                {"type": "ApplyOp", "data": {"op": "assign", "column": "To", "b": "Shopping:Amazon"}}
            ]
        }
    }]"#;

    let rules = rules_from_json(json).unwrap();
    let mut table = Table::from_transactions(&sample_transactions()).unwrap();
    RuleEngine::new().apply_all(&rules, &mut table).unwrap();

    let ledgers = LedgerBuilder::new().build(&table, None).unwrap();
    assert!(ledgers.contains_key(&account("Shopping:Amazon")));
}

#[test]
fn test_unknown_operator_deserializes_but_fails_on_use() {
    let json = r#"[{
        "type": "Rule",
        "data": {
            "select": [{"type": "SelectOp", "data": {"op": "regex", "column": "Description", "b": ".*"}}],
            "apply": [{"type": "ApplyOp", "data": {"op": "assign", "column": "To", "b": "x"}}]
        }
    }]"#;

    // the file parses even though this program implements no 'regex'
    let rules = rules_from_json(json).unwrap();

    let mut table = Table::from_transactions(&sample_transactions()).unwrap();
    let before = table.clone();
    let err = RuleEngine::new()
        .apply_all(&rules, &mut table)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedOperator(tag) if tag == "regex"));
    assert_eq!(table, before);
}

#[test]
fn test_custom_operator_end_to_end() {
    let mut engine = RuleEngine::new();
    engine
        .registry_mut()
        .register("starts_with", |x: &Value, y: &Value| match (x, y) {
            (Value::Text(text), Value::Text(prefix)) => Ok(text.starts_with(prefix.as_str())),
            _ => Ok(false),
        });

    let rule = Rule::builder()
        .when(SelectOp::column(
            Operator::from_tag("starts_with"),
            "Description",
            "AMZN",
        ))
        .then(ApplyOp::assign("To", "Expenses:Shopping:Amazon"))
        .build()
        .unwrap();

    let mut table = Table::from_transactions(&sample_transactions()).unwrap();
    engine.apply_all(&[rule], &mut table).unwrap();
    assert_eq!(
        table.column("To").unwrap()[1],
        Value::from("Expenses:Shopping:Amazon")
    );
}
