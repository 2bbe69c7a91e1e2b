//! Declarative query compiler for labelled-property graph databases.
//!
//! Filter conditions are written as expression trees, lowered into a Cypher
//! element tree, and compiled into query text with positional `$pN`
//! parameters. Execution is delegated to a [`QueryRunner`] inside a
//! [`Transaction`].
//!
//! ```
//! use neoquery::query::{Field, QueryBuilder};
//! use neoquery::Entity;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Person {
//!     name: String,
//! }
//!
//! impl Entity for Person {
//!     fn label() -> &'static str {
//!         "Person"
//!     }
//! }
//!
//! let query = QueryBuilder::<Person>::new()
//!     .r#where(Field::new("age").between(25, 35)?)
//!     .order_by("name", true)
//!     .limit(5)
//!     .compile();
//! assert_eq!(
//!     query.text,
//!     "MATCH (e:Person) WHERE (e.age >= $p0 AND e.age <= $p1) RETURN e ORDER BY e.name DESC LIMIT 5"
//! );
//! # Ok::<(), neoquery::QueryError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Compiler configuration and collection-field rules.
pub mod config;
/// Error types.
pub mod error;
/// Logging bootstrap.
pub mod logging;
/// Entity boundary and field registry.
pub mod model;
/// Expression tree, element tree, builder, and transactions.
pub mod query;

pub use config::{ArrayFieldRules, CompilerConfig, ConfigError};
pub use error::{QueryError, QueryErrorWithCode, Result};
pub use model::{ArrayFieldRegistry, Entity, FieldRegistry};
pub use query::{QueryBuilder, QueryRunner, Transaction};
