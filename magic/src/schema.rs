//! Schema registry
//!
//! Registered query patterns live in a prefix trie. Literal words share
//! prefixes; each node has at most one typed slot edge; a fully matched
//! pattern ends at a node carrying its `SchemaEntry`.

use crate::pattern::{ArgSlot, Pattern, PatternTerm};
use magic_core::{ConfigError, MagicError};
use magic_engine::FunctionDef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Fetched schema configuration for one culture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub querys: Vec<QueryConfig>,
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
}

impl SchemaConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Registration pattern, e.g. `reduce {0:expression}`
    pub query: String,
    /// Operation id
    pub exec: String,
    #[serde(default)]
    pub brief: String,
    #[serde(default)]
    pub example: String,
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_output() -> String {
    "{output}".to_string()
}

/// Terminal payload of a registered pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub operation: String,
    pub brief: String,
    pub example: String,
    pub pattern: Pattern,
    pub output: Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEdge {
    pub slot: ArgSlot,
    pub child: TrieNode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieNode {
    words: BTreeMap<String, TrieNode>,
    slot: Option<Box<SlotEdge>>,
    terminal: Option<SchemaEntry>,
}

impl TrieNode {
    pub fn word(&self, text: &str) -> Option<&TrieNode> {
        self.words.get(text)
    }

    pub fn slot(&self) -> Option<&SlotEdge> {
        self.slot.as_deref()
    }

    pub fn terminal(&self) -> Option<&SchemaEntry> {
        self.terminal.as_ref()
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a SchemaEntry>) {
        if let Some(entry) = &self.terminal {
            out.push(entry);
        }
        for child in self.words.values() {
            child.collect(out);
        }
        if let Some(edge) = &self.slot {
            edge.child.collect(out);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    root: TrieNode,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SchemaConfig) -> Result<Self, MagicError> {
        let mut registry = Self::new();
        for q in &config.querys {
            registry.register(&q.query, &q.output, &q.exec, &q.brief, &q.example)?;
        }
        Ok(registry)
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    /// Add one pattern; the trie is untouched if either string is invalid
    pub fn register(
        &mut self,
        pattern: &str,
        output: &str,
        operation: &str,
        brief: &str,
        example: &str,
    ) -> Result<(), MagicError> {
        let query = Pattern::query(pattern)?;
        let template = Pattern::template(output)?;

        let declared: BTreeSet<usize> = query.slots().map(|s| s.index).collect();
        if let Some(index) = template.references().find(|i| !declared.contains(i)) {
            return Err(ConfigError::UndeclaredSlot { pattern: pattern.to_string(), index }.into());
        }

        let mut node = &mut self.root;
        for term in &query.terms {
            match term {
                PatternTerm::Literal(text) => {
                    node = node.words.entry(text.clone()).or_default();
                }
                PatternTerm::Slot(slot) => {
                    let edge = node
                        .slot
                        .get_or_insert_with(|| Box::new(SlotEdge { slot: *slot, child: TrieNode::default() }));
                    if edge.slot.ty != slot.ty {
                        tracing::warn!(
                            pattern,
                            index = slot.index,
                            previous = %edge.slot.ty,
                            declared = %slot.ty,
                            "slot type overwritten"
                        );
                    }
                    edge.slot = *slot;
                    node = &mut edge.child;
                }
                // rejected by Pattern::query
                PatternTerm::Template(_) => {}
            }
        }

        if node.terminal.is_some() {
            tracing::debug!(pattern, operation, "replacing registered pattern");
        }
        tracing::debug!(pattern, operation, "registered pattern");
        node.terminal = Some(SchemaEntry {
            operation: operation.to_string(),
            brief: brief.to_string(),
            example: example.to_string(),
            pattern: query,
            output: template,
        });
        Ok(())
    }

    /// Every registered entry, literal words before slots, words in order
    pub fn entries(&self) -> Vec<&SchemaEntry> {
        let mut out = Vec::new();
        self.root.collect(&mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magic_core::{ArgType, ParseError};

    fn reduce_registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register("reduce {0:expression}", "{output}", "reduce", "Reduce", "reduce 3*x + 5*x")
            .unwrap();
        registry
    }

    #[test]
    fn test_register_builds_path() {
        let registry = reduce_registry();
        let reduce = registry.root().word("reduce").unwrap();
        let edge = reduce.slot().unwrap();
        assert_eq!(edge.slot, ArgSlot { index: 0, ty: ArgType::Expression });
        assert_eq!(edge.child.terminal().unwrap().operation, "reduce");
        assert!(registry.root().terminal().is_none());
    }

    #[test]
    fn test_shared_prefix() {
        let mut registry = reduce_registry();
        registry
            .register("reduce fraction {0:expression}", "{output}", "reduce", "", "")
            .unwrap();
        let reduce = registry.root().word("reduce").unwrap();
        assert!(reduce.word("fraction").is_some());
        assert!(reduce.slot().is_some());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_slot_type_last_write_wins() {
        let mut registry = SchemaRegistry::new();
        registry.register("{0:expression}", "{output}", "reduce", "", "").unwrap();
        registry.register("{0:string}", "{output}", "reduce", "", "").unwrap();
        let edge = registry.root().slot().unwrap();
        assert_eq!(edge.slot.ty, ArgType::String);
    }

    #[test]
    fn test_reregistering_replaces_terminal() {
        let mut registry = reduce_registry();
        registry
            .register("reduce {0:expression}", "{0} is {output}", "expand", "", "")
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].operation, "expand");
    }

    #[test]
    fn test_undeclared_template_slot() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register("reduce {0:expression}", "{1} = {output}", "reduce", "", "")
            .unwrap_err();
        assert_eq!(
            err,
            MagicError::Config(ConfigError::UndeclaredSlot {
                pattern: "reduce {0:expression}".to_string(),
                index: 1,
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_pattern_leaves_trie_untouched() {
        let mut registry = reduce_registry();
        let before = registry.root().clone();
        assert!(matches!(
            registry.register("expand {0:matrix}", "{output}", "expand", "", ""),
            Err(MagicError::Parse(ParseError::UnknownType { .. }))
        ));
        assert_eq!(registry.root(), &before);
    }

    #[test]
    fn test_config_defaults() {
        let config = SchemaConfig::from_json(
            r#"{ "querys": [ { "query": "reduce {0:expression}", "exec": "reduce" } ] }"#,
        )
        .unwrap();
        assert!(config.functions.is_empty());
        assert_eq!(config.querys[0].output, "{output}");
        assert_eq!(config.querys[0].brief, "");
    }

    #[test]
    fn test_config_rejects_unknown_function_type() {
        let err = SchemaConfig::from_json(
            r#"{ "functions": [ { "name": "sin", "args": ["matrix"], "func": "sin" } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_from_config() {
        let config = SchemaConfig::from_json(
            r#"{
                "querys": [
                    { "query": "reduce {0:expression}", "exec": "reduce", "brief": "Reduce",
                      "example": "reduce 2x + x", "output": "{output}" },
                    { "query": "derivative of {0:expression} by {1:string}", "exec": "derivative",
                      "output": "derivative of {0} by {1} is {output}" }
                ],
                "functions": [ { "name": "sin", "args": ["expression"], "func": "sin" } ]
            }"#,
        )
        .unwrap();
        let registry = SchemaRegistry::from_config(&config).unwrap();
        let operations: Vec<&str> = registry.entries().iter().map(|e| e.operation.as_str()).collect();
        assert_eq!(operations, vec!["derivative", "reduce"]);
        assert_eq!(config.functions[0].args, vec![ArgType::Expression]);
    }
}
