//! Fluent query builder.
//!
//! Builder calls only record state. Nothing is compiled until a terminal
//! operation ([`QueryBuilder::find`], [`QueryBuilder::find_one`],
//! [`QueryBuilder::count`]) or an explicit [`QueryBuilder::compile`]; each
//! of those derives a fresh parameter map starting at `p0`.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::config::CompilerConfig;
use crate::error::{QueryError, Result};
use crate::model::{decode_value, Entity, FieldRegistry};
use crate::query::adapter::ExpressionAdapter;
use crate::query::cypher::{
    keywords, CompiledQuery, CypherQuery, Element, FunctionCall, LimitClause, MatchClause,
    NodePattern, OrderByClause, Projection, PropertyRef, ReturnClause, SkipClause, SortDirection,
    WhereClause,
};
use crate::query::expr::{Expr, Field};
use crate::query::transaction::ExecutionContext;
use crate::query::value::Value;

/// Column holding the aggregate returned by [`QueryBuilder::count`].
pub const COUNT_COLUMN: &str = "count";

/// Argument accepted by the builder's `where`.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// A complete expression.
    Expr(Expr),
    /// `true` collects a pending containment expression; otherwise a literal.
    Flag(bool),
}

impl From<Expr> for Condition {
    fn from(expr: Expr) -> Self {
        Condition::Expr(expr)
    }
}

impl From<bool> for Condition {
    fn from(flag: bool) -> Self {
        Condition::Flag(flag)
    }
}

/// Fluent builder over entities of type `M`.
pub struct QueryBuilder<'tx, M: Entity> {
    context: Option<&'tx dyn ExecutionContext>,
    registry: Option<&'tx dyn FieldRegistry>,
    config: CompilerConfig,
    conditions: Vec<Expr>,
    order: Option<(String, SortDirection)>,
    limit: Option<u64>,
    skip: Option<u64>,
    _entity: PhantomData<fn() -> M>,
}

impl<M: Entity> QueryBuilder<'static, M> {
    /// Creates a builder with no transaction; it can compile but not execute.
    pub fn new() -> Self {
        Self::detached(CompilerConfig::default())
    }

    /// Detached builder using `config`.
    pub fn detached(config: CompilerConfig) -> Self {
        Self {
            context: None,
            registry: None,
            config,
            conditions: Vec::new(),
            order: None,
            limit: None,
            skip: None,
            _entity: PhantomData,
        }
    }
}

impl<M: Entity> Default for QueryBuilder<'static, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'tx, M: Entity> QueryBuilder<'tx, M> {
    /// Builder bound to an open transaction.
    pub fn bound(context: &'tx dyn ExecutionContext, config: CompilerConfig) -> Self {
        Self {
            context: Some(context),
            registry: None,
            config,
            conditions: Vec::new(),
            order: None,
            limit: None,
            skip: None,
            _entity: PhantomData,
        }
    }

    /// Consults `registry` when resolving fields by name.
    pub fn with_registry<'r>(self, registry: &'r dyn FieldRegistry) -> QueryBuilder<'r, M>
    where
        'tx: 'r,
    {
        QueryBuilder {
            context: self.context,
            registry: Some(registry),
            config: self.config,
            conditions: self.conditions,
            order: self.order,
            limit: self.limit,
            skip: self.skip,
            _entity: PhantomData,
        }
    }

    /// Field of `M` named `name`, marked as a collection when declared so by
    /// the entity or the registry.
    pub fn field(&self, name: &str) -> Field {
        match self.registry {
            Some(registry) if registry.is_registered_array_field(M::label(), name) => {
                Field::array(name)
            }
            _ => M::field(name),
        }
    }

    /// Accumulated conditions in insertion order.
    pub fn conditions(&self) -> &[Expr] {
        &self.conditions
    }

    /// Adds a condition.
    ///
    /// Any incomplete chained comparison is discarded first. Passing `true`
    /// collects the expression parked by the last containment test; with
    /// nothing parked it adds a literal `true` condition.
    pub fn r#where<C>(mut self, condition: C) -> Self
    where
        C: Into<Condition>,
    {
        self.clear_stale_chain();
        let capture = self.context.map(|ctx| ctx.capture());
        let expr = match condition.into() {
            Condition::Expr(expr) => expr,
            Condition::Flag(true) => capture
                .and_then(|c| c.take_last_expression())
                .unwrap_or(Expr::Literal(true)),
            Condition::Flag(false) => Expr::Literal(false),
        };
        self.conditions.push(expr);
        self
    }

    /// Adds `field = value` for each pair.
    pub fn where_eq<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.clear_stale_chain();
        for (name, value) in pairs {
            let expr = self.field(name.as_ref()).eq(value);
            self.conditions.push(expr);
        }
        self
    }

    /// Adds a containment test on `name`, using the configured collection rules.
    ///
    /// Fails immediately with `NullOperand` for a null value.
    pub fn where_contains(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.clear_stale_chain();
        let expr = self
            .field(name)
            .contains_with(value, &self.config.array_fields)?;
        self.conditions.push(expr);
        Ok(self)
    }

    /// Adds `name IN collection`.
    ///
    /// Fails immediately with `NotACollection` when `collection` is not a list.
    pub fn where_in(mut self, name: &str, collection: impl Into<Value>) -> Result<Self> {
        self.clear_stale_chain();
        let expr = self.field(name).within(collection)?;
        self.conditions.push(expr);
        Ok(self)
    }

    /// Adds every condition from `conditions`.
    pub fn where_all<I>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        self.clear_stale_chain();
        self.conditions.extend(conditions);
        self
    }

    // The half of a chained comparison that never got its partner must not
    // leak into the next comparison on this transaction.
    fn clear_stale_chain(&self) {
        if let Some(context) = self.context {
            context.capture().clear_chain();
        }
    }

    /// Orders results by `name`.
    pub fn order_by(mut self, name: impl Into<String>, descending: bool) -> Self {
        self.order = Some((name.into(), SortDirection::from_descending(descending)));
        self
    }

    /// Caps the number of results.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skips the first `n` results.
    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    fn assemble(&self, count: bool) -> CypherQuery {
        let var = self.config.entity_var.as_str();
        let adapter = ExpressionAdapter::new(var);
        let mut query = CypherQuery::new(MatchClause::new(NodePattern::new(var).label(M::label())));
        if !self.conditions.is_empty() {
            query.where_clause = Some(WhereClause::new(
                self.conditions.iter().map(|c| adapter.convert(c)).collect(),
            ));
        }
        if count {
            let total = FunctionCall::new(keywords::FN_COUNT, [Element::Variable(var.to_owned())]);
            query.return_clause = Some(ReturnClause::new([Projection::aliased(
                total,
                COUNT_COLUMN,
            )]));
            return query;
        }
        query.return_clause = Some(ReturnClause::new([Projection::var(var)]));
        if let Some((name, direction)) = &self.order {
            query.order_by = Some(OrderByClause::new(
                PropertyRef::new(var, name.as_str()),
                *direction,
            ));
        }
        query.skip = self.skip.map(SkipClause);
        query.limit = self.limit.or(self.config.default_limit).map(LimitClause);
        query
    }

    /// Compiles the row query without executing it.
    pub fn compile(&self) -> CompiledQuery {
        self.assemble(false).compile_query()
    }

    /// Compiles the count query without executing it.
    pub fn compile_count(&self) -> CompiledQuery {
        self.assemble(true).compile_query()
    }

    fn context(&self) -> Result<&'tx dyn ExecutionContext> {
        let context = self.context.ok_or(QueryError::NoActiveTransaction)?;
        self.clear_stale_chain();
        Ok(context)
    }

    /// Executes the query and decodes every row.
    pub fn find(self) -> Result<Vec<M>> {
        let context = self.context()?;
        let compiled = self.compile();
        debug!(
            label = M::label(),
            query = %compiled.text,
            params = compiled.params.len(),
            "find"
        );
        let rows = context.execute(&compiled.text, &compiled.params)?;
        let var = self.config.entity_var.as_str();
        rows.iter().map(|row| M::from_record(row, var)).collect()
    }

    /// Executes with `LIMIT 1` and returns the first row, if any.
    pub fn find_one(self) -> Result<Option<M>> {
        Ok(self.limit(1).find()?.into_iter().next())
    }

    /// Counts matching entities without materialising them.
    pub fn count(self) -> Result<u64> {
        let context = self.context()?;
        let compiled = self.compile_count();
        debug!(
            label = M::label(),
            query = %compiled.text,
            params = compiled.params.len(),
            "count"
        );
        let rows = context.execute(&compiled.text, &compiled.params)?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(0);
        };
        let value = row
            .get(COUNT_COLUMN)
            .cloned()
            .ok_or_else(|| QueryError::MissingColumn {
                column: COUNT_COLUMN.to_owned(),
            })?;
        decode_value(value, COUNT_COLUMN)
    }
}

impl<M: Entity> fmt::Debug for QueryBuilder<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("label", &M::label())
            .field("bound", &self.context.is_some())
            .field("conditions", &self.conditions)
            .field("order", &self.order)
            .field("limit", &self.limit)
            .field("skip", &self.skip)
            .finish()
    }
}
