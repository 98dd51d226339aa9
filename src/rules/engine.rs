//! Rule evaluation and application over transaction tables

use crate::rules::operator::OperatorRegistry;
use crate::rules::rule::{Rule, SelectOp, ACTION_ASSIGN};
use crate::table::Table;
use crate::types::{EngineError, EngineResult, Value};

/// Applies declarative rules to a transaction table.
///
/// The engine owns the operator registry; rules themselves stay plain data
/// so they serialize independently of any registered functions.
#[derive(Debug, Default)]
pub struct RuleEngine {
    registry: OperatorRegistry,
}

impl RuleEngine {
    /// Create an engine with the builtin operators only
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a pre-populated registry
    pub fn with_registry(registry: OperatorRegistry) -> Self {
        Self { registry }
    }

    /// Mutable access to the operator registry
    pub fn registry_mut(&mut self) -> &mut OperatorRegistry {
        &mut self.registry
    }

    /// Evaluate one predicate into a boolean mask over the table's rows.
    ///
    /// The column form resolves the named column and tests every cell
    /// against `b`; an absent column is a [`EngineError::MissingColumn`]
    /// error rather than a silent fallback. The literal form tests `a`
    /// against `b` once and broadcasts the constant.
    pub fn evaluate(&self, predicate: &SelectOp, table: &Table) -> EngineResult<Vec<bool>> {
        predicate.validate()?;
        let b = predicate.b.as_ref().unwrap_or(&Value::Null);
        match (&predicate.column, &predicate.a) {
            (Some(column), None) => {
                let cells = table
                    .column(column)
                    .ok_or_else(|| EngineError::MissingColumn(column.clone()))?;
                cells
                    .iter()
                    .map(|cell| self.registry.compare(&predicate.op, cell, b))
                    .collect()
            }
            (None, Some(a)) => {
                let constant = self.registry.compare(&predicate.op, a, b)?;
                Ok(vec![constant; table.len()])
            }
            // validate() has already rejected these shapes
            _ => Err(EngineError::Configuration(
                "Predicate must set exactly one of column and literal a".to_string(),
            )),
        }
    }

    /// Combined AND mask of all of a rule's predicates.
    ///
    /// Order-independent; an empty predicate list is a configuration error.
    pub fn selection_mask(&self, rule: &Rule, table: &Table) -> EngineResult<Vec<bool>> {
        rule.validate()?;
        let mut combined = vec![true; table.len()];
        for predicate in &rule.select {
            let mask = self.evaluate(predicate, table)?;
            for (acc, hit) in combined.iter_mut().zip(mask) {
                *acc &= hit;
            }
        }
        Ok(combined)
    }

    /// Apply one rule to the table, returning the number of selected rows.
    ///
    /// The selection mask is computed once per rule; every action then
    /// writes through it in declared order.
    pub fn apply(&self, rule: &Rule, table: &mut Table) -> EngineResult<usize> {
        let mask = self.selection_mask(rule, table)?;
        let selected = mask.iter().filter(|hit| **hit).count();
        for action in &rule.apply {
            match action.op.as_str() {
                ACTION_ASSIGN => {
                    let value = action.b.clone().unwrap_or(Value::Null);
                    table.set_where(&action.column, &mask, &value)?;
                }
                other => return Err(EngineError::UnsupportedAction(other.to_string())),
            }
        }
        tracing::debug!(
            rows = selected,
            actions = rule.apply.len(),
            "applied rule"
        );
        Ok(selected)
    }

    /// Apply a sequence of rules in declared order.
    ///
    /// The whole sequence is structurally checked before the first write, so
    /// a malformed rule aborts without half the rules applied. Later rules
    /// overwrite earlier assignments; the author orders general rules and
    /// exceptions accordingly. Data-level errors (missing column, type
    /// mismatch) abort mid-sequence and leave the table partially
    /// rewritten; callers must discard it in that case.
    pub fn apply_all(&self, rules: &[Rule], table: &mut Table) -> EngineResult<()> {
        for rule in rules {
            self.check(rule)?;
        }
        for rule in rules {
            self.apply(rule, table)?;
        }
        Ok(())
    }

    /// Structural pre-validation: rule shape, operator resolvability, and
    /// action tags, without touching the table
    fn check(&self, rule: &Rule) -> EngineResult<()> {
        rule.validate()?;
        for predicate in &rule.select {
            if !self.registry.resolves(&predicate.op) {
                return Err(EngineError::UnsupportedOperator(
                    predicate.op.tag().to_string(),
                ));
            }
        }
        for action in &rule.apply {
            if action.op != ACTION_ASSIGN {
                return Err(EngineError::UnsupportedAction(action.op.clone()));
            }
        }
        Ok(())
    }
}
