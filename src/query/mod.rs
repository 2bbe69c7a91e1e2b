#![forbid(unsafe_code)]

//! Declarative query compilation.
//!
//! This module turns composable filter expressions into parameterised
//! Cypher text, including the element tree the text is emitted from, the
//! adapter between the two, and the fluent builder that drives execution.

/// Scalar and collection values bound as query parameters.
pub mod value;

/// Declarative expression tree.
///
/// Field references, comparisons, and logical combinators, independent of
/// any query syntax.
pub mod expr;

/// Cypher element tree.
///
/// Property references, comparisons, patterns, and clauses that compile
/// to text plus a parameter map.
pub mod cypher;

/// Expression-to-element lowering.
pub mod adapter;

/// Per-transaction capture of chained comparisons and containment tests.
pub mod capture;

/// Fluent query builder.
///
/// Accumulates conditions, ordering, and paging, then compiles and
/// executes them through a transaction.
pub mod builder;

/// Runner and transaction boundary.
pub mod transaction;

pub use adapter::ExpressionAdapter;
pub use builder::{Condition, QueryBuilder};
pub use capture::{CaptureState, CapturingField};
pub use cypher::{CompiledQuery, Compile, CypherQuery};
pub use expr::{Expr, Field, FieldKind, FunctionArg, FunctionExpr};
pub use transaction::{ExecutionContext, QueryRunner, Transaction};
pub use value::{Params, Record, Value};
