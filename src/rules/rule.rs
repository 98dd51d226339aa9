//! Rule, predicate, and action definitions

use serde::{Deserialize, Serialize};

use crate::rules::operator::Operator;
use crate::types::{EngineError, EngineResult, Value};

/// Action tag implemented by the engine
pub const ACTION_ASSIGN: &str = "assign";

/// Row-selection predicate.
///
/// Compares a named column (or the literal `a`) against the literal `b`
/// with an operator. Exactly one of `column` and `a` must be set: the
/// column form tests each row, the literal form degenerates into a
/// row-independent constant test, which is the intentional way to express
/// "apply unconditionally" rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOp {
    /// Comparison operator tag
    pub op: Operator,
    /// Column whose cells are compared against `b`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Left literal of the constant-test form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<Value>,
    /// Right literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<Value>,
}

impl SelectOp {
    /// Create a predicate, enforcing that exactly one of `column`/`a` is set
    pub fn new(
        op: Operator,
        column: Option<String>,
        a: Option<Value>,
        b: Option<Value>,
    ) -> EngineResult<Self> {
        let predicate = Self { op, column, a, b };
        predicate.validate()?;
        Ok(predicate)
    }

    /// Predicate testing a column against a literal
    pub fn column(op: Operator, column: impl Into<String>, b: impl Into<Value>) -> Self {
        Self {
            op,
            column: Some(column.into()),
            a: None,
            b: Some(b.into()),
        }
    }

    /// Row-independent constant test over two literals
    pub fn literal(op: Operator, a: impl Into<Value>, b: impl Into<Value>) -> Self {
        Self {
            op,
            column: None,
            a: Some(a.into()),
            b: Some(b.into()),
        }
    }

    /// Check the column/literal exclusivity invariant.
    ///
    /// Deserialized predicates bypass [`SelectOp::new`], so evaluation
    /// re-checks before use.
    pub fn validate(&self) -> EngineResult<()> {
        match (&self.column, &self.a) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (Some(_), Some(_)) => Err(EngineError::Configuration(
                "Predicate must not set both column and literal a".to_string(),
            )),
            (None, None) => Err(EngineError::Configuration(
                "Predicate must set either column or literal a".to_string(),
            )),
        }
    }
}

/// Column mutation applied to selected rows.
///
/// Only the `assign` tag is implemented; unknown tags survive
/// deserialization and fail at apply time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyOp {
    /// Action tag
    pub op: String,
    /// Column written to
    pub column: String,
    /// Literal broadcast to selected rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<Value>,
}

impl ApplyOp {
    /// Create an action with an arbitrary tag
    pub fn new(op: impl Into<String>, column: impl Into<String>, b: Option<Value>) -> Self {
        Self {
            op: op.into(),
            column: column.into(),
            b,
        }
    }

    /// Assign a literal to a column on selected rows
    pub fn assign(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(ACTION_ASSIGN, column, Some(value.into()))
    }

    /// Validate the action's structure (not its tag, which stays lazy)
    pub fn validate(&self) -> EngineResult<()> {
        if self.column.trim().is_empty() {
            return Err(EngineError::Configuration(
                "Action column must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Conjunctive selection paired with ordered assignment actions.
///
/// Predicates AND together, so their declared order does not change the
/// selection; action order is the order writes happen in.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Predicates, implicitly AND-combined
    pub select: Vec<SelectOp>,
    /// Actions applied to selected rows, in order
    pub apply: Vec<ApplyOp>,
}

impl Rule {
    /// Create a rule from predicates and actions
    pub fn new(select: Vec<SelectOp>, apply: Vec<ApplyOp>) -> Self {
        Self { select, apply }
    }

    /// Start building a rule
    pub fn builder() -> RuleBuilder {
        RuleBuilder::new()
    }

    /// Validate the rule's structure.
    ///
    /// A rule with no predicates is invalid: there is no neutral
    /// "always true" mask, and unconditional rules are spelled as a
    /// trivially-true literal predicate instead.
    pub fn validate(&self) -> EngineResult<()> {
        if self.select.is_empty() {
            return Err(EngineError::Configuration(
                "Rule must have at least one predicate".to_string(),
            ));
        }
        for predicate in &self.select {
            predicate.validate()?;
        }
        for action in &self.apply {
            action.validate()?;
        }
        Ok(())
    }
}

/// Builder for assembling rules predicate by predicate
#[derive(Debug, Default)]
pub struct RuleBuilder {
    select: Vec<SelectOp>,
    apply: Vec<ApplyOp>,
}

impl RuleBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a selection predicate
    pub fn when(mut self, predicate: SelectOp) -> Self {
        self.select.push(predicate);
        self
    }

    /// Add an action
    pub fn then(mut self, action: ApplyOp) -> Self {
        self.apply.push(action);
        self
    }

    /// Build and validate the rule
    pub fn build(self) -> EngineResult<Rule> {
        let rule = Rule::new(self.select, self.apply);
        rule.validate()?;
        Ok(rule)
    }
}
