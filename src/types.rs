//! Core types and data structures for the transaction engine

use std::cmp::Ordering;
use std::fmt;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::account::Account;

/// Dynamically typed table cell.
///
/// Columns of the transaction table hold these; rule literals are expressed
/// as them as well. `Null` marks a missing value and never matches an
/// equality or containment test.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value
    Null,
    /// Free text (descriptions, account identifiers)
    Text(String),
    /// Decimal number (amounts, balances)
    Number(BigDecimal),
    /// Calendar date
    Date(NaiveDate),
}

impl Value {
    /// Name of the value's type, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Date(_) => "date",
        }
    }

    /// Whether this value is the missing-value marker
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Equality test used by the `eq` operator.
    ///
    /// Values of different types are unequal, and `Null` matches nothing,
    /// itself included.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Text(x), Value::Text(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::Date(x), Value::Date(y)) => x == y,
            _ => false,
        }
    }

    /// Substring test used by the `contains` operator.
    ///
    /// A `Null` haystack or needle is a non-match; non-text operands are a
    /// type error.
    pub fn contains(&self, needle: &Value) -> EngineResult<bool> {
        match (self, needle) {
            (Value::Null, _) | (_, Value::Null) => Ok(false),
            (Value::Text(haystack), Value::Text(needle)) => Ok(haystack.contains(needle)),
            (left, right) => Err(EngineError::TypeMismatch {
                operation: "contains".to_string(),
                left: left.type_name(),
                right: right.type_name(),
            }),
        }
    }

    /// Ordering used by the comparison operators (`gt`, `ge`, `lt`, `le`).
    ///
    /// Returns `None` when either side is `Null` (a non-match, not an
    /// error). Comparing across types is a type error.
    pub fn compare(&self, other: &Value, operation: &str) -> EngineResult<Option<Ordering>> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => Ok(None),
            (Value::Text(x), Value::Text(y)) => Ok(Some(x.cmp(y))),
            (Value::Number(x), Value::Number(y)) => Ok(Some(x.cmp(y))),
            (Value::Date(x), Value::Date(y)) => Ok(Some(x.cmp(y))),
            (left, right) => Err(EngineError::TypeMismatch {
                operation: operation.to_string(),
                left: left.type_name(),
                right: right.type_name(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Text(t) => write!(f, "{}", t),
            Value::Number(n) => write!(f, "{}", n),
            Value::Date(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<BigDecimal> for Value {
    fn from(number: BigDecimal) -> Self {
        Value::Number(number)
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Date(date)
    }
}

// Text serializes as a bare string and Null as null so rule files stay
// readable; Number and Date use single-key maps ({"number": "800"},
// {"date": "2023-12-31"}) so round-trips are exact in both JSON and TOML.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Text(t) => serializer.serialize_str(t),
            Value::Number(n) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("number", &n.to_string())?;
                map.end()
            }
            Value::Date(d) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("date", &d.to_string())?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("null, a string, a number, or a {\"number\"}/{\"date\"} map")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                Ok(Value::Text(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Number(BigDecimal::from(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                Ok(Value::Number(BigDecimal::from(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
                v.to_string()
                    .parse()
                    .map(Value::Number)
                    .map_err(de::Error::custom)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
                let key: String = map
                    .next_key()?
                    .ok_or_else(|| de::Error::custom("empty value map"))?;
                let value = match key.as_str() {
                    "number" => {
                        let raw: String = map.next_value()?;
                        raw.parse().map(Value::Number).map_err(de::Error::custom)?
                    }
                    "date" => {
                        let raw: String = map.next_value()?;
                        raw.parse().map(Value::Date).map_err(de::Error::custom)?
                    }
                    other => return Err(de::Error::unknown_field(other, &["number", "date"])),
                };
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom("value map must have exactly one key"));
                }
                Ok(value)
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// One money movement between two accounts.
///
/// The amount is non-negative by convention at entry time: it leaves
/// `from_account` and arrives at `to_account`, and sign flips happen only
/// during ledger projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Date when the money moved
    pub date: NaiveDate,
    /// Statement description as exported by the bank
    pub description: String,
    /// Unsigned amount
    pub amount: BigDecimal,
    /// Account the amount leaves
    pub from_account: Account,
    /// Account the amount arrives at
    pub to_account: Account,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: BigDecimal,
        from_account: Account,
        to_account: Account,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            from_account,
            to_account,
        }
    }

    /// Validate the transaction
    pub fn validate(&self) -> EngineResult<()> {
        if self.amount < BigDecimal::from(0) {
            return Err(EngineError::Validation(format!(
                "Transaction amount must be non-negative, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Externally asserted account balance at a point in time.
///
/// Used only to seed ledgers with an initial balance; never validated
/// against computed balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceDeclaration {
    /// Account the statement balance belongs to
    pub account: Account,
    /// Date the balance was asserted
    pub date: NaiveDate,
    /// Balance as printed on the statement
    pub statement_balance: BigDecimal,
}

impl BalanceDeclaration {
    /// Create a new balance declaration
    pub fn new(account: Account, date: NaiveDate, statement_balance: BigDecimal) -> Self {
        Self {
            account,
            date,
            statement_balance,
        }
    }
}

/// One row of a per-account ledger view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    /// Transaction date
    pub date: NaiveDate,
    /// Transaction description
    pub description: String,
    /// The other account of the movement
    pub counterparty: Account,
    /// Signed amount: negative when the ledger's account is the sender,
    /// positive when it is the recipient
    pub amount: BigDecimal,
    /// Running balance after this row
    pub balance: BigDecimal,
}

/// Time-ordered, balance-annotated per-account projection of the
/// transaction table.
///
/// Derived and read-only: regenerated from the transaction table (and
/// declarations) on demand, with no mutation API of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ledger {
    /// Account this ledger belongs to
    pub account: Account,
    /// Rows sorted by date ascending, ties in input order
    pub rows: Vec<LedgerRow>,
}

impl Ledger {
    /// Sum of signed amounts across all rows
    pub fn net_change(&self) -> BigDecimal {
        self.rows.iter().map(|row| &row.amount).sum()
    }

    /// Balance after the last row, if any rows exist
    pub fn closing_balance(&self) -> Option<&BigDecimal> {
        self.rows.last().map(|row| &row.balance)
    }
}

/// Errors that can occur in the rule and ledger engines
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed rule or predicate structure
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Invalid input data
    #[error("Validation error: {0}")]
    Validation(String),
    /// Operator tag not known to the registry, detected at evaluation time
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    /// Action tag the engine does not implement, detected at apply time
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),
    /// A referenced column is absent from the table
    #[error("Column not found: {0}")]
    MissingColumn(String),
    /// Operator applied across incompatible value types
    #[error("Type mismatch: cannot apply '{operation}' to {left} and {right}")]
    TypeMismatch {
        operation: String,
        left: &'static str,
        right: &'static str,
    },
    /// Malformed document envelope or format-level error
    #[error("Document error: {0}")]
    Document(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_null_never_matches() {
        assert!(!Value::Null.equals(&Value::Null));
        assert!(!Value::Null.equals(&Value::from("x")));
        assert!(!Value::from("x").equals(&Value::Null));
        assert!(!Value::Null.contains(&Value::from("x")).unwrap());
        assert!(!Value::from("x").contains(&Value::Null).unwrap());
    }

    #[test]
    fn test_equality_is_typed() {
        assert!(Value::from("10").equals(&Value::from("10")));
        assert!(!Value::from("10").equals(&Value::Number(BigDecimal::from(10))));
        assert!(Value::Number(BigDecimal::from(10)).equals(&Value::Number(BigDecimal::from(10))));
    }

    #[test]
    fn test_contains_rejects_non_text() {
        let err = Value::from("abc")
            .contains(&Value::Number(BigDecimal::from(1)))
            .unwrap_err();
        assert!(matches!(err, EngineError::TypeMismatch { .. }));
    }

    #[test]
    fn test_compare_across_types_fails() {
        let err = Value::Date(date(2024, 1, 1))
            .compare(&Value::from("2024-01-01"), "gt")
            .unwrap_err();
        assert!(matches!(err, EngineError::TypeMismatch { .. }));
    }

    #[test]
    fn test_compare_null_is_non_match() {
        let result = Value::Null
            .compare(&Value::Number(BigDecimal::from(1)), "gt")
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_value_json_round_trip() {
        for value in [
            Value::from("AMZN"),
            Value::Number("12.50".parse().unwrap()),
            Value::Date(date(2023, 12, 31)),
            Value::Null,
        ] {
            let json = serde_json::to_string(&value).unwrap();
            let back: Value = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_value_tagged_encoding() {
        let json = serde_json::to_string(&Value::Date(date(2023, 12, 31))).unwrap();
        assert_eq!(json, r#"{"date":"2023-12-31"}"#);
        let json = serde_json::to_string(&Value::Number(BigDecimal::from(800))).unwrap();
        assert_eq!(json, r#"{"number":"800"}"#);
        let json = serde_json::to_string(&Value::from("AMZN")).unwrap();
        assert_eq!(json, r#""AMZN""#);
    }

    #[test]
    fn test_plain_numbers_deserialize() {
        let value: Value = serde_json::from_str("800").unwrap();
        assert_eq!(value, Value::Number(BigDecimal::from(800)));
    }

    #[test]
    fn test_negative_transaction_amount_rejected() {
        let txn = Transaction::new(
            date(2024, 1, 1),
            "Refund",
            BigDecimal::from(-5),
            "Assets:Checking".parse().unwrap(),
            "Expenses:Shopping".parse().unwrap(),
        );
        assert!(matches!(txn.validate(), Err(EngineError::Validation(_))));
    }
}
