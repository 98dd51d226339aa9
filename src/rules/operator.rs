//! Comparison operators and the registry escape hatch
//!
//! Builtin operators are a closed tagged set with canonical string tags so
//! rule files stay tool-independent. Arbitrary user-supplied binary
//! functions register under their own tags; a tag neither builtin nor
//! registered deserializes fine and only fails when a rule carrying it is
//! evaluated.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{EngineError, EngineResult, Value};

/// Binary comparison function used for registered custom operators
pub type OperatorFn = Arc<dyn Fn(&Value, &Value) -> EngineResult<bool> + Send + Sync>;

/// Comparison operator, either a builtin or an unresolved custom tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Typed equality; `Null` matches nothing
    Eq,
    /// Complement of `Eq`
    Ne,
    /// Substring test over text values
    Contains,
    /// Strictly greater
    Gt,
    /// Greater or equal
    Ge,
    /// Strictly less
    Lt,
    /// Less or equal
    Le,
    /// Tag not recognized as a builtin; resolved through the registry at
    /// evaluation time
    Custom(String),
}

impl Operator {
    /// Resolve a canonical tag, keeping unknown tags as `Custom`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "contains" => Operator::Contains,
            "gt" => Operator::Gt,
            "ge" => Operator::Ge,
            "lt" => Operator::Lt,
            "le" => Operator::Le,
            other => Operator::Custom(other.to_string()),
        }
    }

    /// Canonical tag this operator serializes to
    pub fn tag(&self) -> &str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Contains => "contains",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Custom(tag) => tag,
        }
    }

    /// Whether this operator is part of the builtin set
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Operator::Custom(_))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Operator::from_tag(&tag))
    }
}

/// Registry mapping operator tags to comparison functions.
///
/// Builtins are always resolvable; `register` adds or overrides custom
/// entries under their tag.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    custom: HashMap<String, OperatorFn>,
}

impl OperatorRegistry {
    /// Create a registry with only the builtin operators
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom binary comparison under a tag
    pub fn register<F>(&mut self, tag: impl Into<String>, function: F)
    where
        F: Fn(&Value, &Value) -> EngineResult<bool> + Send + Sync + 'static,
    {
        self.custom.insert(tag.into(), Arc::new(function));
    }

    /// Whether the operator can be resolved by this registry
    pub fn resolves(&self, operator: &Operator) -> bool {
        match operator {
            Operator::Custom(tag) => self.custom.contains_key(tag),
            _ => true,
        }
    }

    /// Apply an operator to two values
    pub fn compare(&self, operator: &Operator, x: &Value, y: &Value) -> EngineResult<bool> {
        match operator {
            Operator::Eq => Ok(x.equals(y)),
            Operator::Ne => Ok(!x.equals(y)),
            Operator::Contains => x.contains(y),
            Operator::Gt => Self::ordered(operator, x, y, |ord| ord == Ordering::Greater),
            Operator::Ge => Self::ordered(operator, x, y, |ord| ord != Ordering::Less),
            Operator::Lt => Self::ordered(operator, x, y, |ord| ord == Ordering::Less),
            Operator::Le => Self::ordered(operator, x, y, |ord| ord != Ordering::Greater),
            Operator::Custom(tag) => {
                let function = self
                    .custom
                    .get(tag)
                    .ok_or_else(|| EngineError::UnsupportedOperator(tag.clone()))?;
                function(x, y)
            }
        }
    }

    fn ordered(
        operator: &Operator,
        x: &Value,
        y: &Value,
        test: impl Fn(Ordering) -> bool,
    ) -> EngineResult<bool> {
        Ok(x.compare(y, operator.tag())?.is_some_and(test))
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}
