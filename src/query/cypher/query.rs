//! Whole-query assembly.

use tracing::trace;

use crate::query::cypher::clauses::{
    LimitClause, MatchClause, OrderByClause, ReturnClause, SkipClause, WhereClause, WithClause,
};
use crate::query::cypher::element::Compile;
use crate::query::value::Params;

/// Query text paired with the parameters it references.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledQuery {
    /// Cypher text with `$pN` placeholders.
    pub text: String,
    /// Parameter values keyed by placeholder name.
    pub params: Params,
}

/// A complete read query.
///
/// Clauses are emitted in the fixed order `MATCH`, `WHERE`, `WITH`,
/// `RETURN`, `ORDER BY`, `SKIP`, `LIMIT`.
#[derive(Clone, Debug, PartialEq)]
pub struct CypherQuery {
    /// One or more match clauses.
    pub matches: Vec<MatchClause>,
    /// Optional filter.
    pub where_clause: Option<WhereClause>,
    /// Intermediate projections.
    pub with_clauses: Vec<WithClause>,
    /// Final projection.
    pub return_clause: Option<ReturnClause>,
    /// Sort keys.
    pub order_by: Option<OrderByClause>,
    /// Rows to skip.
    pub skip: Option<SkipClause>,
    /// Maximum rows.
    pub limit: Option<LimitClause>,
}

impl CypherQuery {
    /// Starts a query from its first match clause.
    pub fn new(first: MatchClause) -> Self {
        Self {
            matches: vec![first],
            where_clause: None,
            with_clauses: Vec::new(),
            return_clause: None,
            order_by: None,
            skip: None,
            limit: None,
        }
    }

    /// Compiles from index zero into a fresh parameter map.
    pub fn compile_query(&self) -> CompiledQuery {
        let mut params = Params::new();
        let (text, next) = self.compile(&mut params, 0);
        trace!(params = next, len = text.len(), "compiled cypher query");
        CompiledQuery { text, params }
    }
}

impl Compile for CypherQuery {
    fn compile(&self, params: &mut Params, mut index: usize) -> (String, usize) {
        let mut parts = Vec::new();
        let mut push = |part: String| {
            if !part.is_empty() {
                parts.push(part);
            }
        };
        for clause in &self.matches {
            let (part, next) = clause.compile(params, index);
            push(part);
            index = next;
        }
        if let Some(clause) = &self.where_clause {
            let (part, next) = clause.compile(params, index);
            push(part);
            index = next;
        }
        for clause in &self.with_clauses {
            let (part, next) = clause.compile(params, index);
            push(part);
            index = next;
        }
        if let Some(clause) = &self.return_clause {
            let (part, next) = clause.compile(params, index);
            push(part);
            index = next;
        }
        if let Some(clause) = &self.order_by {
            let (part, next) = clause.compile(params, index);
            push(part);
            index = next;
        }
        if let Some(clause) = &self.skip {
            let (part, next) = clause.compile(params, index);
            push(part);
            index = next;
        }
        if let Some(clause) = &self.limit {
            let (part, next) = clause.compile(params, index);
            push(part);
            index = next;
        }
        (parts.join(" "), index)
    }
}
