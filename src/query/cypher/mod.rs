//! Cypher element tree.
//!
//! The element tree is the query-language-specific representation that
//! expressions are lowered into. Every node implements [`Compile`].

/// Keyword constants, operators, connectives, and sort directions.
pub mod keywords;

/// Expression-level elements and the [`Compile`] trait.
pub mod element;

/// Node, relationship, and path patterns.
pub mod patterns;

/// Clause elements.
pub mod clauses;

/// Whole-query assembly.
pub mod query;

pub use clauses::{
    Clause, LimitClause, MatchClause, OrderByClause, Projection, ReturnClause, SkipClause,
    WhereClause, WithClause,
};
pub use element::{
    param_name, Argument, Comparison, Compile, Element, FunctionCall, Logical, Negation,
    PropertyRef,
};
pub use keywords::{Connective, Operator, SortDirection};
pub use patterns::{EdgeDirection, NodePattern, PathPattern, RelationshipPattern};
pub use query::{CompiledQuery, CypherQuery};
