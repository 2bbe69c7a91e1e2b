//! Transaction boundary.
//!
//! The compiler only produces `(text, params)` pairs and consumes rows. How
//! those pairs reach a database is up to a [`QueryRunner`]. A
//! [`Transaction`] couples a runner with the [`CaptureState`] its builders
//! share; capturing starts when the transaction opens and is reset when it
//! commits, rolls back, or is dropped on an error path.

use tracing::{debug, warn};

use crate::config::CompilerConfig;
use crate::error::Result;
use crate::model::{Entity, FieldRegistry};
use crate::query::builder::QueryBuilder;
use crate::query::capture::{CaptureState, CapturingField};
use crate::query::expr::Field;
use crate::query::value::{Params, Record};

/// Executes compiled queries against a database.
pub trait QueryRunner {
    /// Runs `text` with `params` and returns the result records.
    fn run(&self, text: &str, params: &Params) -> Result<Vec<Record>>;

    /// Makes the transaction's writes durable.
    fn commit(&self) -> Result<()> {
        Ok(())
    }

    /// Discards the transaction's writes.
    fn rollback(&self) -> Result<()> {
        Ok(())
    }
}

impl<F> QueryRunner for F
where
    F: Fn(&str, &Params) -> Result<Vec<Record>>,
{
    fn run(&self, text: &str, params: &Params) -> Result<Vec<Record>> {
        self(text, params)
    }
}

/// What a builder needs from an open transaction.
pub trait ExecutionContext {
    /// Capture state scoped to this transaction.
    fn capture(&self) -> &CaptureState;

    /// Submits a compiled query.
    fn execute(&self, text: &str, params: &Params) -> Result<Vec<Record>>;
}

/// Open transaction over a [`QueryRunner`].
pub struct Transaction<R: QueryRunner> {
    runner: R,
    capture: CaptureState,
    config: CompilerConfig,
}

impl<R: QueryRunner> Transaction<R> {
    /// Opens a transaction with the default configuration.
    pub fn new(runner: R) -> Self {
        Self::with_config(runner, CompilerConfig::default())
    }

    /// Opens a transaction with `config` applied to its builders.
    pub fn with_config(runner: R, config: CompilerConfig) -> Self {
        let capture = CaptureState::new();
        capture.begin();
        debug!(entity_var = %config.entity_var, "transaction opened");
        Self {
            runner,
            capture,
            config,
        }
    }

    /// Configuration handed to builders.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Starts a query over `M` bound to this transaction.
    pub fn query<M: Entity>(&self) -> QueryBuilder<'_, M> {
        QueryBuilder::bound(self, self.config.clone())
    }

    /// Field of `M` whose comparisons participate in capture.
    pub fn field<M: Entity>(&self, name: &str) -> CapturingField<'_> {
        self.capture
            .field(M::field(name))
            .with_rules(self.config.array_fields.clone())
    }

    /// Like [`Transaction::field`], but `registry` can mark the field as a
    /// collection for `M`'s label.
    pub fn field_with_registry<M: Entity>(
        &self,
        name: &str,
        registry: &dyn FieldRegistry,
    ) -> CapturingField<'_> {
        let field = if registry.is_registered_array_field(M::label(), name) {
            Field::array(name)
        } else {
            M::field(name)
        };
        self.capture_field(field)
    }

    /// Arbitrary field whose comparisons participate in capture.
    pub fn capture_field(&self, field: Field) -> CapturingField<'_> {
        self.capture
            .field(field)
            .with_rules(self.config.array_fields.clone())
    }

    /// Commits and closes the transaction.
    pub fn commit(self) -> Result<()> {
        self.capture.end();
        self.runner.commit().inspect_err(|e| warn!(error = %e, "commit failed"))?;
        debug!("transaction committed");
        Ok(())
    }

    /// Rolls back and closes the transaction.
    pub fn rollback(self) -> Result<()> {
        self.capture.end();
        self.runner
            .rollback()
            .inspect_err(|e| warn!(error = %e, "rollback failed"))?;
        debug!("transaction rolled back");
        Ok(())
    }
}

impl<R: QueryRunner> ExecutionContext for Transaction<R> {
    fn capture(&self) -> &CaptureState {
        &self.capture
    }

    fn execute(&self, text: &str, params: &Params) -> Result<Vec<Record>> {
        debug!(query = text, params = params.len(), "executing query");
        self.runner
            .run(text, params)
            .inspect_err(|e| warn!(error = %e, query = text, "query execution failed"))
    }
}

impl<R: QueryRunner> Drop for Transaction<R> {
    fn drop(&mut self) {
        if self.capture.is_capturing() {
            self.capture.end();
            debug!("transaction closed without commit");
        }
    }
}

impl<R: QueryRunner + std::fmt::Debug> std::fmt::Debug for Transaction<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("runner", &self.runner)
            .field("capture", &self.capture)
            .field("config", &self.config)
            .finish()
    }
}
