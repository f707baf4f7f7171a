//! Magic Standard Library

pub mod operations;
mod engine;
mod poly;
mod print;

pub use engine::{PolyEngine, PolyScope};
pub use poly::{Monomial, Polynomial};

use magic_core::ArgType;
use magic_engine::{FunctionDef, FunctionTable, OperationRegistry};

/// Load standard operations into registry
pub fn load_standard_library(registry: OperationRegistry) -> OperationRegistry {
    registry
        .with_operation(operations::reduce())
        .with_operation(operations::expand())
        .with_operation(operations::factor())
        .with_operation(operations::gcd())
        .with_operation(operations::lcm())
        .with_operation(operations::div())
        .with_operation(operations::resultant())
        .with_operation(operations::derivative())
        .with_operation(operations::root())
        // Older schemas name the reduction by its noun
        .with_alias("reduction", "reduce")
        .with_alias("diff", "derivative")
}

/// Create registry with standard library
pub fn standard_registry() -> OperationRegistry {
    load_standard_library(OperationRegistry::new())
}

/// Functions available in queries when the schema declares none
pub fn standard_functions() -> FunctionTable {
    const UNARY: &[&str] = &[
        "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh", "asinh", "acosh",
        "atanh", "ln", "exp", "abs", "sqrt",
    ];
    let mut table: FunctionTable = UNARY
        .iter()
        .map(|name| FunctionDef {
            name: name.to_string(),
            args: vec![ArgType::Expression],
            func: name.to_string(),
        })
        .collect();
    table.insert(FunctionDef {
        name: "root".to_string(),
        args: vec![ArgType::Expression, ArgType::Integer],
        func: "root".to_string(),
    });
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = standard_registry();
        assert!(registry.contains("reduce"));
        assert!(registry.contains("Reduction"));
        assert!(!registry.contains("integrate"));
        assert_eq!(registry.list(Some("algebra")).len(), 9);
    }

    #[test]
    fn test_standard_functions() {
        let functions = standard_functions();
        assert_eq!(functions.len(), 17);
        assert_eq!(functions.get("SIN").map(|f| f.func.as_str()), Some("sin"));
        assert_eq!(functions.get("root").map(|f| f.args.len()), Some(2));
    }
}
