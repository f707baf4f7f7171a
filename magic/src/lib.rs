//! Magic - natural-language math queries
//!
//! A query such as `reduce 3*x + 5*x` is parsed, matched against the
//! patterns registered by a schema, dispatched to an operation and
//! rendered through the matched entry's output template.

mod lexer;
mod parser;
mod matcher;
mod render;
mod source;
pub mod pattern;
pub mod schema;

pub use lexer::{tokenize, Lexeme, Lexer};
pub use parser::{parse, Parser};
pub use matcher::{match_program, match_statement, Match};
pub use render::Formatter;
pub use source::{FileSource, SchemaSource, StaticSource};
pub use schema::{QueryConfig, SchemaConfig, SchemaEntry, SchemaRegistry};

use magic_core::{ConfigError, Diagnostic, MagicError};
use magic_engine::{Engine, ExecContext, FunctionTable, OperationRegistry, RenderMode, Scope};
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_CULTURE: &str = "en-US";

/// A successfully answered query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub operation: String,
    pub output: String,
}

/// Outcome of `Interpreter::compile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Answer(Answer),
    /// The query had no terms
    Empty,
    Error(Diagnostic),
}

/// One recognized query shape, for help listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    pub query: String,
    pub operation: String,
    pub brief: String,
    pub example: String,
}

impl From<&SchemaEntry> for HelpEntry {
    fn from(entry: &SchemaEntry) -> Self {
        Self {
            query: entry.pattern.to_string(),
            operation: entry.operation.clone(),
            brief: entry.brief.clone(),
            example: entry.example.clone(),
        }
    }
}

/// State that exists between `init` and `stop`
struct Session {
    schema: SchemaRegistry,
    functions: FunctionTable,
    scope: Box<dyn Scope>,
}

/// Main Magic interpreter
pub struct Interpreter {
    engine: Arc<dyn Engine>,
    operations: Arc<OperationRegistry>,
    functions: FunctionTable,
    culture: String,
    render_mode: RenderMode,
    session: Option<Session>,
}

impl Interpreter {
    pub fn new(engine: impl Engine + 'static, operations: OperationRegistry) -> Self {
        Self {
            engine: Arc::new(engine),
            operations: Arc::new(operations),
            functions: FunctionTable::new(),
            culture: DEFAULT_CULTURE.to_string(),
            render_mode: RenderMode::default(),
            session: None,
        }
    }

    pub fn with_standard_library() -> Self {
        Self::new(magic_std::PolyEngine, magic_std::standard_registry())
            .with_functions(magic_std::standard_functions())
    }

    /// Functions available before the schema's own `functions` are added
    pub fn with_functions(mut self, functions: FunctionTable) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = culture.into();
        self
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn culture(&self) -> &str {
        &self.culture
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Fetch the schema for this interpreter's culture and open an engine scope
    pub async fn init(&mut self, source: &dyn SchemaSource) -> Result<(), MagicError> {
        let text = source.fetch(&self.culture).await?;
        let config = SchemaConfig::from_json(&text)?;
        self.init_from_config(&config)
    }

    /// Build the schema trie and open a fresh engine scope.
    ///
    /// The new scope is opened before any previous session is released, so
    /// on failure the previous session stays.
    pub fn init_from_config(&mut self, config: &SchemaConfig) -> Result<(), MagicError> {
        let schema = SchemaRegistry::from_config(config)?;
        let mut functions = self.functions.clone();
        for def in &config.functions {
            functions.insert(def.clone());
        }

        let scope = self.engine.open_scope()?;
        if self.session.take().is_some() {
            tracing::info!("releasing previous engine scope");
        }

        tracing::info!(
            culture = %self.culture,
            engine = self.engine.name(),
            patterns = schema.len(),
            functions = functions.len(),
            "interpreter initialized"
        );
        self.session = Some(Session { schema, functions, scope });
        Ok(())
    }

    /// Release the engine scope
    pub fn stop(&mut self) -> Result<(), MagicError> {
        match self.session.take() {
            Some(_) => {
                tracing::info!("interpreter stopped");
                Ok(())
            }
            None => Err(ConfigError::NotInitialized.into()),
        }
    }

    /// Answer one query; `None` when it has no terms
    pub fn run(&mut self, query: &str) -> Result<Option<Answer>, MagicError> {
        let session = self.session.as_mut().ok_or(ConfigError::NotInitialized)?;

        let program = parse(query)?;
        let Some(matched) = match_program(&session.schema, &program)? else {
            return Ok(None);
        };

        session.scope.reset();
        let mut ctx = ExecContext::new(session.scope.as_mut(), &session.functions);
        let result = self.operations.execute(matched.operation(), &matched.args, &mut ctx)?;
        let output = Formatter::new(self.render_mode).format(
            matched.entry,
            &matched.args,
            result,
            &mut ctx,
        )?;

        Ok(Some(Answer { operation: matched.entry.operation.clone(), output }))
    }

    /// Answer one query, turning any failure into a diagnostic
    pub fn compile(&mut self, query: &str) -> Response {
        match self.run(query) {
            Ok(Some(answer)) => Response::Answer(answer),
            Ok(None) => Response::Empty,
            Err(e) => {
                tracing::debug!(query, error = %e, "query failed");
                Response::Error(e.to_diagnostic())
            }
        }
    }

    /// Recognized queries, optionally only those dispatching to `operation`
    pub fn help(&self, operation: Option<&str>) -> Result<Vec<HelpEntry>, MagicError> {
        let session = self.session.as_ref().ok_or(ConfigError::NotInitialized)?;
        Ok(session
            .schema
            .entries()
            .into_iter()
            .filter(|e| operation.map_or(true, |op| e.operation.eq_ignore_ascii_case(op)))
            .map(HelpEntry::from)
            .collect())
    }

    pub fn operations(&self) -> &OperationRegistry {
        &self.operations
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::with_standard_library()
    }
}
