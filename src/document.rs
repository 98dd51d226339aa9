//! Document serialization for rules
//!
//! Every predicate, action, and rule round-trips through an explicit
//! `{type, data}` envelope, where `type` names the constructor and `data`
//! carries its fields. Operators serialize to their canonical string tags
//! so files stay tool-independent; unknown operator and action tags
//! survive the trip and only fail if evaluated. Two formats are supported:
//! JSON (a rule set is a bare array of nodes) and human-editable TOML (a
//! `rules = [...]` document).

use serde::{Deserialize, Serialize};

use crate::rules::{ApplyOp, Rule, SelectOp};
use crate::types::{EngineError, EngineResult};

/// One `{type, data}` envelope node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Node {
    /// A predicate node
    SelectOp(SelectOp),
    /// An action node
    ApplyOp(ApplyOp),
    /// A rule node wrapping predicate and action nodes
    Rule(RuleData),
}

impl Node {
    /// Constructor name carried in the `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            Node::SelectOp(_) => "SelectOp",
            Node::ApplyOp(_) => "ApplyOp",
            Node::Rule(_) => "Rule",
        }
    }
}

/// Field mapping of a [`Rule`] node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleData {
    /// Predicate nodes
    pub select: Vec<Node>,
    /// Action nodes
    pub apply: Vec<Node>,
}

/// Capability interface for entities that serialize to document nodes
pub trait Documented: Sized {
    /// Wrap the entity in its envelope node
    fn to_node(&self) -> Node;

    /// Unwrap an envelope node back into the entity
    fn from_node(node: Node) -> EngineResult<Self>;
}

impl Documented for SelectOp {
    fn to_node(&self) -> Node {
        Node::SelectOp(self.clone())
    }

    fn from_node(node: Node) -> EngineResult<Self> {
        match node {
            Node::SelectOp(predicate) => Ok(predicate),
            other => Err(unexpected_node("SelectOp", &other)),
        }
    }
}

impl Documented for ApplyOp {
    fn to_node(&self) -> Node {
        Node::ApplyOp(self.clone())
    }

    fn from_node(node: Node) -> EngineResult<Self> {
        match node {
            Node::ApplyOp(action) => Ok(action),
            other => Err(unexpected_node("ApplyOp", &other)),
        }
    }
}

impl Documented for Rule {
    fn to_node(&self) -> Node {
        Node::Rule(RuleData {
            select: self.select.iter().map(Documented::to_node).collect(),
            apply: self.apply.iter().map(Documented::to_node).collect(),
        })
    }

    fn from_node(node: Node) -> EngineResult<Self> {
        match node {
            Node::Rule(data) => {
                let select = data
                    .select
                    .into_iter()
                    .map(SelectOp::from_node)
                    .collect::<EngineResult<Vec<_>>>()?;
                let apply = data
                    .apply
                    .into_iter()
                    .map(ApplyOp::from_node)
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(Rule::new(select, apply))
            }
            other => Err(unexpected_node("Rule", &other)),
        }
    }
}

fn unexpected_node(expected: &str, found: &Node) -> EngineError {
    EngineError::Document(format!(
        "Expected {} node, found {}",
        expected,
        found.kind()
    ))
}

/// A rule file: an ordered list of rule nodes.
///
/// This is the top-level shape of the TOML format; the JSON format is the
/// bare node array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rule nodes in application order
    pub rules: Vec<Node>,
}

impl RuleSet {
    /// Wrap rules into their document nodes
    pub fn from_rules(rules: &[Rule]) -> Self {
        Self {
            rules: rules.iter().map(Documented::to_node).collect(),
        }
    }

    /// Unwrap every node back into a rule
    pub fn into_rules(self) -> EngineResult<Vec<Rule>> {
        self.rules.into_iter().map(Rule::from_node).collect()
    }
}

/// Serialize rules to a JSON array of `{type, data}` nodes
pub fn rules_to_json(rules: &[Rule]) -> EngineResult<String> {
    let nodes: Vec<Node> = rules.iter().map(Documented::to_node).collect();
    serde_json::to_string_pretty(&nodes).map_err(|e| EngineError::Document(e.to_string()))
}

/// Deserialize rules from a JSON array of `{type, data}` nodes
pub fn rules_from_json(json: &str) -> EngineResult<Vec<Rule>> {
    let nodes: Vec<Node> =
        serde_json::from_str(json).map_err(|e| EngineError::Document(e.to_string()))?;
    nodes.into_iter().map(Rule::from_node).collect()
}

/// Serialize rules to the human-editable TOML format
pub fn rules_to_toml(rules: &[Rule]) -> EngineResult<String> {
    toml::to_string(&RuleSet::from_rules(rules)).map_err(|e| EngineError::Document(e.to_string()))
}

/// Deserialize rules from the human-editable TOML format
pub fn rules_from_toml(document: &str) -> EngineResult<Vec<Rule>> {
    let set: RuleSet =
        toml::from_str(document).map_err(|e| EngineError::Document(e.to_string()))?;
    set.into_rules()
}
