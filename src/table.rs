//! Column-oriented transaction table
//!
//! The table is an owned, mutable value threaded explicitly through rule
//! application; there is no hidden shared state. Rules address columns by
//! name, so the table keeps the normalized transaction columns alongside
//! any extra columns rules assign into.

use std::collections::HashMap;

use crate::types::{EngineError, EngineResult, Transaction, Value};

/// Column names of the normalized transaction shape
pub mod columns {
    /// Transaction date column
    pub const DATE: &str = "Date";
    /// Statement description column
    pub const DESCRIPTION: &str = "Description";
    /// Unsigned amount column
    pub const AMOUNT: &str = "Amount";
    /// Sending account column
    pub const FROM: &str = "From";
    /// Receiving account column
    pub const TO: &str = "To";
}

/// Owned, mutable table of named equal-length columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    order: Vec<String>,
    data: HashMap<String, Vec<Value>>,
    rows: usize,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the normalized five-column table from typed transactions
    pub fn from_transactions(transactions: &[Transaction]) -> EngineResult<Self> {
        for transaction in transactions {
            transaction.validate()?;
        }
        let mut table = Self::new();
        table.push_column(
            columns::DATE,
            transactions.iter().map(|t| Value::Date(t.date)).collect(),
        )?;
        table.push_column(
            columns::DESCRIPTION,
            transactions
                .iter()
                .map(|t| Value::Text(t.description.clone()))
                .collect(),
        )?;
        table.push_column(
            columns::AMOUNT,
            transactions
                .iter()
                .map(|t| Value::Number(t.amount.clone()))
                .collect(),
        )?;
        table.push_column(
            columns::FROM,
            transactions
                .iter()
                .map(|t| Value::Text(t.from_account.to_string()))
                .collect(),
        )?;
        table.push_column(
            columns::TO,
            transactions
                .iter()
                .map(|t| Value::Text(t.to_account.to_string()))
                .collect(),
        )?;
        Ok(table)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Values of a column, if it exists
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.data.get(name).map(Vec::as_slice)
    }

    /// Append a new column.
    ///
    /// The first column fixes the row count; later columns must match it.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> EngineResult<()> {
        let name = name.into();
        if self.data.contains_key(&name) {
            return Err(EngineError::Configuration(format!(
                "Column '{}' already exists",
                name
            )));
        }
        if self.order.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(EngineError::Configuration(format!(
                "Column '{}' has {} rows, table has {}",
                name,
                values.len(),
                self.rows
            )));
        }
        self.order.push(name.clone());
        self.data.insert(name, values);
        Ok(())
    }

    /// Broadcast a literal into a column for every masked row.
    ///
    /// An absent column is materialized as `Null`-filled first, so rules may
    /// assign into columns the normalized table does not carry. Returns the
    /// number of rows written.
    pub fn set_where(&mut self, name: &str, mask: &[bool], value: &Value) -> EngineResult<usize> {
        if mask.len() != self.rows {
            return Err(EngineError::Configuration(format!(
                "Selection mask has {} rows, table has {}",
                mask.len(),
                self.rows
            )));
        }
        if !self.data.contains_key(name) {
            self.push_column(name.to_string(), vec![Value::Null; self.rows])?;
        }
        let column = self
            .data
            .get_mut(name)
            .ok_or_else(|| EngineError::MissingColumn(name.to_string()))?;
        let mut written = 0;
        for (cell, selected) in column.iter_mut().zip(mask) {
            if *selected {
                *cell = value.clone();
                written += 1;
            }
        }
        Ok(written)
    }

    /// Re-type the normalized five columns back into transactions.
    ///
    /// Fails loudly when a required column is absent or a cell does not
    /// carry the expected type; nothing is coerced.
    pub fn to_transactions(&self) -> EngineResult<Vec<Transaction>> {
        let dates = self.required_column(columns::DATE)?;
        let descriptions = self.required_column(columns::DESCRIPTION)?;
        let amounts = self.required_column(columns::AMOUNT)?;
        let from_accounts = self.required_column(columns::FROM)?;
        let to_accounts = self.required_column(columns::TO)?;

        let mut transactions = Vec::with_capacity(self.rows);
        for row in 0..self.rows {
            let date = match &dates[row] {
                Value::Date(date) => *date,
                other => return Err(Self::cell_error(columns::DATE, row, "date", other)),
            };
            let description = match &descriptions[row] {
                Value::Text(text) => text.clone(),
                other => {
                    return Err(Self::cell_error(columns::DESCRIPTION, row, "text", other));
                }
            };
            let amount = match &amounts[row] {
                Value::Number(number) => number.clone(),
                other => return Err(Self::cell_error(columns::AMOUNT, row, "number", other)),
            };
            let from_account = match &from_accounts[row] {
                Value::Text(text) => text.parse()?,
                other => return Err(Self::cell_error(columns::FROM, row, "text", other)),
            };
            let to_account = match &to_accounts[row] {
                Value::Text(text) => text.parse()?,
                other => return Err(Self::cell_error(columns::TO, row, "text", other)),
            };
            let transaction =
                Transaction::new(date, description, amount, from_account, to_account);
            transaction.validate()?;
            transactions.push(transaction);
        }
        Ok(transactions)
    }

    fn required_column(&self, name: &str) -> EngineResult<&[Value]> {
        self.column(name)
            .ok_or_else(|| EngineError::MissingColumn(name.to_string()))
    }

    fn cell_error(column: &str, row: usize, expected: &str, found: &Value) -> EngineError {
        EngineError::Validation(format!(
            "Column '{}' row {}: expected {}, found {}",
            column,
            row,
            expected,
            found.type_name()
        ))
    }
}
