//! Typed arguments captured from a matched query

use crate::Expr;
use dashu_int::IBig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Declared type of a pattern slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    Expression,
    String,
    Integer,
}

impl ArgType {
    pub fn name(&self) -> &'static str {
        match self {
            ArgType::Expression => "expression",
            ArgType::String => "string",
            ArgType::Integer => "integer",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArgType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expression" => Ok(ArgType::Expression),
            "string" => Ok(ArgType::String),
            "integer" => Ok(ArgType::Integer),
            other => Err(other.to_string()),
        }
    }
}

/// Argument value captured at a slot
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Expression(Expr),
    Text(String),
    Integer(IBig),
}

impl Value {
    pub fn arg_type(&self) -> ArgType {
        match self {
            Value::Expression(_) => ArgType::Expression,
            Value::Text(_) => ArgType::String,
            Value::Integer(_) => ArgType::Integer,
        }
    }

    pub fn as_expression(&self) -> Option<&Expr> {
        match self {
            Value::Expression(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&IBig> {
        match self {
            Value::Integer(i) => Some(i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Expression(e) => write!(f, "{}", e),
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
        }
    }
}

/// Captured arguments keyed by slot index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    slots: BTreeMap<usize, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, value: Value) {
        self.slots.insert(index, value);
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(&index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.slots.iter().map(|(k, v)| (*k, v))
    }
}

impl FromIterator<(usize, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (usize, Value)>>(iter: I) -> Self {
        Self { slots: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_type_from_str() {
        assert_eq!("expression".parse::<ArgType>(), Ok(ArgType::Expression));
        assert_eq!("integer".parse::<ArgType>(), Ok(ArgType::Integer));
        assert_eq!("number".parse::<ArgType>(), Err("number".to_string()));
    }

    #[test]
    fn test_arg_type_serde() {
        let json = serde_json::to_string(&ArgType::String).unwrap();
        assert_eq!(json, "\"string\"");
    }

    #[test]
    fn test_arguments_ordered() {
        let args: Arguments = vec![
            (1, Value::Text("b".to_string())),
            (0, Value::Integer(IBig::from(3))),
        ]
        .into_iter()
        .collect();
        let order: Vec<usize> = args.iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![0, 1]);
        assert_eq!(args.get(0).map(Value::arg_type), Some(ArgType::Integer));
    }
}
