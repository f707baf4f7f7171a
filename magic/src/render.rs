//! Output formatter
//!
//! Renders a matched entry's output template: literal words as written,
//! `{N}` as the captured argument, `{output}` as the computed result.

use crate::pattern::{PatternTerm, TemplateRef};
use crate::schema::SchemaEntry;
use magic_core::{Arguments, ExecError, MagicError, Value};
use magic_engine::{ExecContext, RenderMode, Term};

pub struct Formatter {
    mode: RenderMode,
}

impl Formatter {
    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    /// Placed between segments, never before the first
    pub fn separator(&self) -> &'static str {
        match self.mode {
            RenderMode::Text => " ",
            RenderMode::Latex => "\\ ",
        }
    }

    pub fn format(
        &self,
        entry: &SchemaEntry,
        args: &Arguments,
        result: Term,
        ctx: &mut ExecContext<'_>,
    ) -> Result<String, MagicError> {
        let mut segments = Vec::with_capacity(entry.output.terms.len());
        for term in &entry.output.terms {
            let segment = match term {
                PatternTerm::Literal(text) => self.text(text),
                PatternTerm::Template(TemplateRef::Output) => ctx.pretty(result, self.mode)?,
                PatternTerm::Template(TemplateRef::Arg(index)) => {
                    let value = args.get(*index).ok_or_else(|| ExecError::MissingArgument {
                        name: entry.operation.clone(),
                        index: *index,
                    })?;
                    self.value(value, ctx)?
                }
                // output templates hold no declarations
                PatternTerm::Slot(_) => continue,
            };
            segments.push(segment);
        }
        Ok(segments.join(self.separator()))
    }

    fn value(&self, value: &Value, ctx: &mut ExecContext<'_>) -> Result<String, MagicError> {
        match value {
            Value::Expression(_) => {
                let term = ctx.term(value)?;
                ctx.pretty(term, self.mode)
            }
            Value::Text(text) => Ok(self.text(text)),
            Value::Integer(n) => Ok(n.to_string()),
        }
    }

    fn text(&self, text: &str) -> String {
        match self.mode {
            RenderMode::Text => text.to_string(),
            RenderMode::Latex => format!("\\text{{{}}}", text),
        }
    }
}
