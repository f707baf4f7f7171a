//! Magic Engine Seam
//!
//! Provides the traits Magic uses to reach an external computation engine:
//! - `Engine` / `Scope`: term construction, transforms, pretty-printing
//! - `Operation`: what a matched schema entry dispatches to
//! - `FunctionTable`: builtins callable inside query expressions

mod traits;
mod registry;
mod context;
mod functions;

pub use traits::{ArgMeta, Engine, Operation, OperationMeta, Scope, Term};
pub use registry::OperationRegistry;
pub use context::{ExecContext, RenderMode};
pub use functions::{FunctionDef, FunctionTable};

/// Re-export core types for operation authors
pub mod prelude {
    pub use crate::{
        ArgMeta, Engine, ExecContext, FunctionDef, FunctionTable, Operation, OperationMeta,
        OperationRegistry, RenderMode, Scope, Term,
    };
    pub use magic_core::prelude::*;
}
