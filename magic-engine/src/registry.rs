//! Operation Registry

use crate::{ExecContext, Operation, OperationMeta, Term};
use magic_core::{Arguments, ExecError, MagicError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Central operation registry, keyed by lower-cased operation id
pub struct OperationRegistry {
    operations: HashMap<String, Arc<dyn Operation>>,
    aliases: HashMap<String, String>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self {
            operations: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    pub fn with_operation<O: Operation + 'static>(mut self, op: O) -> Self {
        let name = op.meta().name.to_lowercase();
        self.operations.insert(name, Arc::new(op));
        self
    }

    /// Make `alias` dispatch to the operation registered as `target`
    pub fn with_alias(mut self, alias: &str, target: &str) -> Self {
        self.aliases.insert(alias.to_lowercase(), target.to_lowercase());
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Operation> {
        let key = name.to_lowercase();
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.operations.get(key).map(|op| op.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn execute(
        &self,
        name: &str,
        args: &Arguments,
        ctx: &mut ExecContext<'_>,
    ) -> Result<Term, MagicError> {
        match self.get(name) {
            Some(op) => {
                tracing::debug!(operation = name, args = args.len(), "executing operation");
                op.execute(args, ctx)
            }
            None => {
                let similar = similar_names(name, self.operations.keys().chain(self.aliases.keys()));
                Err(ExecError::UnknownOperation { name: name.to_string(), similar }.into())
            }
        }
    }

    pub fn list(&self, category: Option<&str>) -> Vec<OperationMeta> {
        let mut metas: Vec<OperationMeta> = self
            .operations
            .values()
            .map(|op| op.meta())
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect();
        metas.sort_by(|a, b| a.name.cmp(b.name));
        metas
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Names similar to `query`, best first (for error suggestions)
pub(crate) fn similar_names<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a String>,
) -> Vec<String> {
    let query = query.to_lowercase();
    let mut matches: Vec<(String, usize)> = candidates
        .filter_map(|name| {
            let score = similarity_score(&query, name);
            if score > 0 {
                Some((name.clone(), score))
            } else {
                None
            }
        })
        .collect();

    // Higher = more similar; ties broken by name for stable output
    matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    matches.into_iter().map(|(name, _)| name).take(5).collect()
}

fn similarity_score(query: &str, candidate: &str) -> usize {
    let mut score = 0;

    if candidate.starts_with(query) {
        score += 100;
    } else if candidate.contains(query) {
        score += 50;
    } else if query.contains(candidate) {
        score += 30;
    }

    let query_chars: HashSet<char> = query.chars().collect();
    let candidate_chars: HashSet<char> = candidate.chars().collect();
    let common = query_chars.intersection(&candidate_chars).count();
    score += common * 2;

    let len_diff = (query.len() as i64 - candidate.len() as i64).unsigned_abs() as usize;
    if len_diff < 5 && score > 0 {
        score += 5 - len_diff;
    }

    score
}
