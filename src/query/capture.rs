//! Capture state for chained comparisons and containment tests.
//!
//! Some call sites cannot hand an expression straight to the builder: a
//! containment test reports a plain `bool`, and a chained range comparison
//! arrives as two independent calls on the same field. A [`CaptureState`]
//! parks the pending expression until the builder picks it up.
//!
//! Each [`Transaction`](crate::query::transaction::Transaction) owns exactly
//! one state. The state uses interior mutability through `Cell`/`RefCell`,
//! so it is `!Sync` and can never be observed from two threads at once.
//! Reads through the `take_*` methods clear the slot they read.
//!
//! The primary API remains [`Field::between`] and [`Field::contains`]; the
//! capture path exists for callers that build conditions piecemeal.

use std::cell::{Cell, RefCell};

use tracing::trace;

use crate::config::ArrayFieldRules;
use crate::error::Result;
use crate::query::expr::{Expr, Field};
use crate::query::value::Value;

/// Per-transaction slots for in-flight expressions.
#[derive(Debug, Default)]
pub struct CaptureState {
    capturing: Cell<bool>,
    last_expression: RefCell<Option<Expr>>,
    chain_expression: RefCell<Option<Expr>>,
}

impl CaptureState {
    /// Inactive state with both slots empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables capturing and clears both slots.
    pub fn begin(&self) {
        self.capturing.set(true);
        self.last_expression.replace(None);
        self.chain_expression.replace(None);
        trace!("capture begin");
    }

    /// Restores the inactive state.
    pub fn end(&self) {
        self.capturing.set(false);
        self.last_expression.replace(None);
        self.chain_expression.replace(None);
        trace!("capture end");
    }

    /// Whether capturing is active.
    pub fn is_capturing(&self) -> bool {
        self.capturing.get()
    }

    /// Removes and returns the pending containment expression.
    pub fn take_last_expression(&self) -> Option<Expr> {
        self.last_expression.take()
    }

    /// Removes and returns the pending left half of a chain.
    pub fn take_chain_expression(&self) -> Option<Expr> {
        self.chain_expression.take()
    }

    /// Discards any incomplete chain.
    pub fn clear_chain(&self) {
        if self.chain_expression.take().is_some() {
            trace!("discarded stale chain expression");
        }
    }

    /// Parks `expr` for the next `where(true)`, when capturing.
    pub fn record_last(&self, expr: &Expr) {
        if self.is_capturing() {
            self.last_expression.replace(Some(expr.clone()));
        }
    }

    /// Feeds one comparison of a chain through the state.
    ///
    /// With a pending left half, returns `pending AND expr` and empties the
    /// slot. Otherwise parks a copy of `expr` (when capturing) and returns it
    /// unchanged.
    pub fn chain(&self, expr: Expr) -> Expr {
        if let Some(pending) = self.take_chain_expression() {
            trace!("completed chained comparison");
            return pending.and(expr);
        }
        if self.is_capturing() {
            self.chain_expression.replace(Some(expr.clone()));
        }
        expr
    }

    /// Wraps `field` so its comparisons go through this state.
    pub fn field(&self, field: Field) -> CapturingField<'_> {
        CapturingField {
            state: self,
            field,
            rules: None,
        }
    }

    /// Begins capturing until the returned guard drops.
    pub fn scope(&self) -> CaptureScope<'_> {
        self.begin();
        CaptureScope { state: self }
    }
}

/// Guard returned by [`CaptureState::scope`].
#[derive(Debug)]
pub struct CaptureScope<'a> {
    state: &'a CaptureState,
}

impl Drop for CaptureScope<'_> {
    fn drop(&mut self) {
        self.state.end();
    }
}

/// Field whose comparisons participate in chaining and containment capture.
///
/// Every non-null comparison goes through the shared chain slot, so two
/// comparisons inside one `&` or `|` expression fold into each other:
/// `name.eq("x") | age.gt(5)?` yields `name = x OR (name = x AND age > 5)`.
/// Build compound conditions from plain [`Field`] values, or use
/// [`Field::between`] for ranges, and keep capturing fields to one
/// comparison (or one chained pair) per `where` call.
#[derive(Debug, Clone)]
pub struct CapturingField<'a> {
    state: &'a CaptureState,
    field: Field,
    rules: Option<ArrayFieldRules>,
}

impl CapturingField<'_> {
    /// Uses `rules` instead of the defaults for containment tests.
    pub fn with_rules(mut self, rules: ArrayFieldRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Underlying field.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// `field = value`; null checks are never chained.
    pub fn eq(&self, value: impl Into<Value>) -> Expr {
        match value.into() {
            Value::Null => self.field.is_null(),
            value => self.state.chain(self.field.eq(value)),
        }
    }

    /// `field <> value`; null checks are never chained.
    pub fn ne(&self, value: impl Into<Value>) -> Expr {
        match value.into() {
            Value::Null => self.field.is_not_null(),
            value => self.state.chain(self.field.ne(value)),
        }
    }

    /// Chained `field > value`. A rejected operand leaves the chain untouched.
    pub fn gt(&self, value: impl Into<Value>) -> Result<Expr> {
        Ok(self.state.chain(self.field.gt(value)?))
    }

    /// Chained `field < value`.
    pub fn lt(&self, value: impl Into<Value>) -> Result<Expr> {
        Ok(self.state.chain(self.field.lt(value)?))
    }

    /// Chained `field >= value`.
    pub fn ge(&self, value: impl Into<Value>) -> Result<Expr> {
        Ok(self.state.chain(self.field.ge(value)?))
    }

    /// Chained `field <= value`.
    pub fn le(&self, value: impl Into<Value>) -> Result<Expr> {
        Ok(self.state.chain(self.field.le(value)?))
    }

    /// Containment test reporting `true` and parking the real expression.
    ///
    /// The parked expression is `ANY IN` for collection fields and
    /// `CONTAINS` otherwise; pass `true` to the builder's `where` to collect it.
    pub fn contains_value(&self, value: impl Into<Value>) -> Result<bool> {
        let expr = match &self.rules {
            Some(rules) => self.field.contains_with(value, rules)?,
            None => self.field.contains(value)?,
        };
        self.state.record_last(&expr);
        trace!(field = self.field.name(), "captured containment test");
        Ok(true)
    }
}
