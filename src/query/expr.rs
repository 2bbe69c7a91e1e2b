//! Declarative expression tree.
//!
//! Expressions describe filter conditions without committing to any query
//! syntax. They are immutable: every combinator consumes its operands and
//! returns a new node. Lowering into Cypher happens in
//! [`adapter`](crate::query::adapter).
//!
//! ```
//! use neoquery::query::expr::Field;
//!
//! let age = Field::new("age");
//! let name = Field::new("name");
//! let adult_alice = age.ge(18)? & name.eq("Alice");
//! let not_bob = !name.starts_with("Bob");
//! let _either = adult_alice | not_bob;
//! # Ok::<(), neoquery::QueryError>(())
//! ```
//!
//! Constructors whose operand can be invalid, such as an ordering
//! comparison against null, return [`Result`] and fail immediately.

use std::ops::{BitAnd, BitOr, Not};

use crate::config::{ArrayFieldRules, DEFAULT_ARRAY_FIELDS};
use crate::error::{QueryError, Result};
use crate::query::cypher::element::normalize_operand;
use crate::query::cypher::keywords::{self, Connective, Operator};
use crate::query::value::Value;

/// Closed set of expression variants.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Bare field reference.
    Field(Field),
    /// `field <op> value`.
    Binary(BinaryOp),
    /// `left AND/OR right`.
    Composite(Composite),
    /// `NOT inner`.
    Not(Box<Expr>),
    /// Function call over fields and literals.
    Function(FunctionExpr),
    /// `function(...) <op> value`.
    FunctionComparison(FunctionComparison),
    /// Constant condition.
    Literal(bool),
}

impl Expr {
    /// Logical AND with `other`.
    pub fn and(self, other: impl Into<Expr>) -> Expr {
        Expr::Composite(Composite::new(self, Connective::And, other.into()))
    }

    /// Logical OR with `other`.
    pub fn or(self, other: impl Into<Expr>) -> Expr {
        Expr::Composite(Composite::new(self, Connective::Or, other.into()))
    }

    /// Logical negation.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl<T: Into<Expr>> BitAnd<T> for Expr {
    type Output = Expr;

    fn bitand(self, rhs: T) -> Expr {
        self.and(rhs)
    }
}

impl<T: Into<Expr>> BitOr<T> for Expr {
    type Output = Expr;

    fn bitor(self, rhs: T) -> Expr {
        self.or(rhs)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// How a field's collection-ness is decided.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum FieldKind {
    /// Registered as holding a single value.
    Scalar,
    /// Registered as holding a collection.
    Array,
    /// Unregistered; decided by [`ArrayFieldRules`].
    #[default]
    Inferred,
}

/// Reference to an entity property.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    kind: FieldKind,
}

impl Field {
    /// Unregistered field; collection-ness is inferred from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Inferred)
    }

    /// Field explicitly registered as a collection.
    pub fn array(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Array)
    }

    /// Field explicitly registered as a scalar, overriding name inference.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Scalar)
    }

    /// Field with the given kind.
    pub fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registration kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether the field is treated as a collection under the default rules.
    ///
    /// Unregistered names match the fixed list of known collection fields
    /// or, as a fallback, end in `s` but not `ss`.
    pub fn is_array(&self) -> bool {
        match self.kind {
            FieldKind::Array => true,
            FieldKind::Scalar => false,
            FieldKind::Inferred => {
                DEFAULT_ARRAY_FIELDS.contains(&self.name.as_str())
                    || (self.name.ends_with('s') && !self.name.ends_with("ss"))
            }
        }
    }

    /// Whether the field is treated as a collection under `rules`.
    pub fn is_array_with(&self, rules: &ArrayFieldRules) -> bool {
        match self.kind {
            FieldKind::Array => true,
            FieldKind::Scalar => false,
            FieldKind::Inferred => rules.matches(&self.name),
        }
    }

    fn binary(&self, op: Operator, value: Value) -> Result<Expr> {
        let (op, value) = normalize_operand(op, value)?;
        Ok(Expr::Binary(BinaryOp {
            field: self.name.clone(),
            op,
            value,
        }))
    }

    /// Builds a comparison whose operand is never null.
    fn bound(&self, op: Operator, value: Value) -> Expr {
        Expr::Binary(BinaryOp {
            field: self.name.clone(),
            op,
            value: Some(value),
        })
    }

    fn nullary(&self, op: Operator) -> Expr {
        Expr::Binary(BinaryOp {
            field: self.name.clone(),
            op,
            value: None,
        })
    }

    /// `field = value`; a null value yields `IS NULL`.
    pub fn eq(&self, value: impl Into<Value>) -> Expr {
        match value.into() {
            Value::Null => self.is_null(),
            value => self.bound(Operator::Eq, value),
        }
    }

    /// `field <> value`; a null value yields `IS NOT NULL`.
    pub fn ne(&self, value: impl Into<Value>) -> Expr {
        match value.into() {
            Value::Null => self.is_not_null(),
            value => self.bound(Operator::Ne, value),
        }
    }

    /// `field > value`; fails with `NullOperand` for a null value.
    pub fn gt(&self, value: impl Into<Value>) -> Result<Expr> {
        self.binary(Operator::Gt, value.into())
    }

    /// `field < value`.
    pub fn lt(&self, value: impl Into<Value>) -> Result<Expr> {
        self.binary(Operator::Lt, value.into())
    }

    /// `field >= value`.
    pub fn ge(&self, value: impl Into<Value>) -> Result<Expr> {
        self.binary(Operator::Ge, value.into())
    }

    /// `field <= value`.
    pub fn le(&self, value: impl Into<Value>) -> Result<Expr> {
        self.binary(Operator::Le, value.into())
    }

    /// Inclusive range, `field >= min AND field <= max`.
    pub fn between(&self, min: impl Into<Value>, max: impl Into<Value>) -> Result<Expr> {
        Ok(self.ge(min)?.and(self.le(max)?))
    }

    /// `field STARTS WITH prefix`.
    pub fn starts_with(&self, prefix: impl Into<String>) -> Expr {
        self.bound(Operator::StartsWith, Value::String(prefix.into()))
    }

    /// `field ENDS WITH suffix`.
    pub fn ends_with(&self, suffix: impl Into<String>) -> Expr {
        self.bound(Operator::EndsWith, Value::String(suffix.into()))
    }

    /// Element membership for collection fields, substring test otherwise.
    pub fn contains(&self, value: impl Into<Value>) -> Result<Expr> {
        self.containment(self.is_array(), value.into())
    }

    /// [`Field::contains`] with explicit collection rules.
    pub fn contains_with(
        &self,
        value: impl Into<Value>,
        rules: &ArrayFieldRules,
    ) -> Result<Expr> {
        self.containment(self.is_array_with(rules), value.into())
    }

    fn containment(&self, array: bool, value: Value) -> Result<Expr> {
        let op = if array {
            Operator::AnyIn
        } else {
            Operator::Contains
        };
        self.binary(op, value)
    }

    /// `field IN [values]`.
    pub fn in_list<I, V>(&self, values: I) -> Expr
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.bound(Operator::In, Value::List(values))
    }

    /// Alias of [`Field::in_list`] for literal argument lists.
    pub fn one_of<I, V>(&self, values: I) -> Expr
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.in_list(values)
    }

    /// `field IN collection`, rejecting anything that is not a list.
    pub fn within(&self, collection: impl Into<Value>) -> Result<Expr> {
        match collection.into() {
            Value::List(values) => Ok(self.bound(Operator::In, Value::List(values))),
            other => Err(QueryError::NotACollection {
                field: self.name.clone(),
                found: other.type_name(),
            }),
        }
    }

    /// `field IS NULL`.
    pub fn is_null(&self) -> Expr {
        self.nullary(Operator::IsNull)
    }

    /// `field IS NOT NULL`.
    pub fn is_not_null(&self) -> Expr {
        self.nullary(Operator::IsNotNull)
    }

    /// `length(field)`.
    pub fn length(&self) -> FunctionExpr {
        FunctionExpr::new(keywords::FN_LENGTH, [FunctionArg::field(self.name.clone())])
    }

    /// `toLower(field)`.
    pub fn lower(&self) -> FunctionExpr {
        FunctionExpr::new(keywords::FN_TO_LOWER, [FunctionArg::field(self.name.clone())])
    }

    /// `toUpper(field)`.
    pub fn upper(&self) -> FunctionExpr {
        FunctionExpr::new(keywords::FN_TO_UPPER, [FunctionArg::field(self.name.clone())])
    }
}

impl From<Field> for Expr {
    fn from(field: Field) -> Self {
        Expr::Field(field)
    }
}

/// Comparison of a named field against a value.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryOp {
    /// Field name.
    pub field: String,
    /// Operator.
    pub op: Operator,
    /// Operand; `None` for `IS NULL` / `IS NOT NULL`.
    pub value: Option<Value>,
}

impl BinaryOp {
    /// Builds a comparison from an arbitrary operator, validating the operand.
    ///
    /// `=`/`<>` against null become `IS NULL`/`IS NOT NULL`.
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Result<Self> {
        let (op, value) = normalize_operand(op, value.into())?;
        Ok(Self {
            field: field.into(),
            op,
            value,
        })
    }

    /// Like [`BinaryOp::new`] but parses the operator symbol.
    pub fn parse(field: impl Into<String>, op: &str, value: impl Into<Value>) -> Result<Self> {
        let parsed = Operator::parse(op).ok_or_else(|| QueryError::UnknownOperator {
            op: op.to_owned(),
        })?;
        Self::new(field, parsed, value)
    }
}

impl From<BinaryOp> for Expr {
    fn from(op: BinaryOp) -> Self {
        Expr::Binary(op)
    }
}

/// Two expressions joined by a connective.
#[derive(Clone, Debug, PartialEq)]
pub struct Composite {
    /// Left operand.
    pub left: Box<Expr>,
    /// Connective.
    pub connective: Connective,
    /// Right operand.
    pub right: Box<Expr>,
}

impl Composite {
    /// Joins two expressions.
    pub fn new(left: Expr, connective: Connective, right: Expr) -> Self {
        Self {
            left: Box::new(left),
            connective,
            right: Box::new(right),
        }
    }
}

/// Function argument, tagged as a field reference or a literal.
#[derive(Clone, Debug, PartialEq)]
pub enum FunctionArg {
    /// Property of the queried entity.
    Field(String),
    /// Literal bound as a parameter.
    Literal(Value),
}

impl FunctionArg {
    /// Field argument.
    pub fn field(name: impl Into<String>) -> Self {
        FunctionArg::Field(name.into())
    }

    /// Literal argument.
    pub fn literal(value: impl Into<Value>) -> Self {
        FunctionArg::Literal(value.into())
    }

    /// Classifies an untagged string argument by its shape.
    ///
    /// Strings starting with `$`, `:` or `?`, or wrapped in matching single
    /// or double quotes, are literals; anything else names a field. This
    /// sniffing is a heuristic; prefer [`FunctionArg::field`] and
    /// [`FunctionArg::literal`].
    pub fn infer(raw: &str) -> Self {
        let sigil = raw.starts_with('$') || raw.starts_with(':') || raw.starts_with('?');
        let quoted = raw.len() >= 2
            && ((raw.starts_with('"') && raw.ends_with('"'))
                || (raw.starts_with('\'') && raw.ends_with('\'')));
        if sigil || quoted {
            FunctionArg::Literal(Value::String(raw.to_owned()))
        } else {
            FunctionArg::Field(raw.to_owned())
        }
    }
}

/// Function call expression such as `length(name)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionExpr {
    /// Function name.
    pub name: String,
    /// Arguments in call order.
    pub args: Vec<FunctionArg>,
}

impl FunctionExpr {
    /// Creates a function call.
    pub fn new<I>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = FunctionArg>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    fn compare(self, op: Operator, value: Value) -> Result<Expr> {
        let (op, value) = normalize_operand(op, value)?;
        Ok(Expr::FunctionComparison(FunctionComparison {
            function: self,
            op,
            value,
        }))
    }

    fn compare_nullable(self, op: Operator, null_check: Operator, value: Value) -> Expr {
        let (op, value) = match value {
            Value::Null => (null_check, None),
            value => (op, Some(value)),
        };
        Expr::FunctionComparison(FunctionComparison {
            function: self,
            op,
            value,
        })
    }

    /// `fn(...) = value`; a null value yields `IS NULL`.
    pub fn eq(self, value: impl Into<Value>) -> Expr {
        self.compare_nullable(Operator::Eq, Operator::IsNull, value.into())
    }

    /// `fn(...) <> value`; a null value yields `IS NOT NULL`.
    pub fn ne(self, value: impl Into<Value>) -> Expr {
        self.compare_nullable(Operator::Ne, Operator::IsNotNull, value.into())
    }

    /// `fn(...) > value`; fails with `NullOperand` for a null value.
    pub fn gt(self, value: impl Into<Value>) -> Result<Expr> {
        self.compare(Operator::Gt, value.into())
    }

    /// `fn(...) < value`.
    pub fn lt(self, value: impl Into<Value>) -> Result<Expr> {
        self.compare(Operator::Lt, value.into())
    }

    /// `fn(...) >= value`.
    pub fn ge(self, value: impl Into<Value>) -> Result<Expr> {
        self.compare(Operator::Ge, value.into())
    }

    /// `fn(...) <= value`.
    pub fn le(self, value: impl Into<Value>) -> Result<Expr> {
        self.compare(Operator::Le, value.into())
    }
}

impl From<FunctionExpr> for Expr {
    fn from(function: FunctionExpr) -> Self {
        Expr::Function(function)
    }
}

/// Function result compared against a value.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionComparison {
    /// Function call on the left.
    pub function: FunctionExpr,
    /// Operator.
    pub op: Operator,
    /// Operand; `None` for the null checks.
    pub value: Option<Value>,
}

impl From<FunctionComparison> for Expr {
    fn from(cmp: FunctionComparison) -> Self {
        Expr::FunctionComparison(cmp)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(expr: &Expr) -> &BinaryOp {
        match expr {
            Expr::Binary(op) => op,
            other => panic!("expected binary op, got {other:?}"),
        }
    }

    #[test]
    fn null_equality_becomes_null_check() {
        let email = Field::new("email");
        assert_eq!(binary(&email.eq(Value::Null)).op, Operator::IsNull);
        assert_eq!(binary(&email.ne(Option::<i64>::None)).op, Operator::IsNotNull);
        assert_eq!(binary(&email.eq(Value::Null)).value, None);
    }

    #[test]
    fn contains_depends_on_collection_detection() -> Result<()> {
        assert_eq!(binary(&Field::new("tags").contains("x")?).op, Operator::AnyIn);
        assert_eq!(binary(&Field::new("email").contains("x")?).op, Operator::Contains);
        assert_eq!(binary(&Field::new("address").contains("x")?).op, Operator::Contains);
        // Plural heuristic misfires on `status`; explicit registration fixes it.
        assert_eq!(binary(&Field::new("status").contains("x")?).op, Operator::AnyIn);
        assert_eq!(binary(&Field::scalar("status").contains("x")?).op, Operator::Contains);
        assert_eq!(
            binary(&Field::new("skills").contains_with("x", &ArrayFieldRules::strict())?).op,
            Operator::Contains
        );
        assert_eq!(binary(&Field::array("aka").contains("x")?).op, Operator::AnyIn);
        Ok(())
    }

    #[test]
    fn null_operands_are_rejected_at_construction() {
        let age = Field::new("age");
        for result in [
            age.gt(Value::Null),
            age.lt(Value::Null),
            age.ge(Option::<i64>::None),
            age.le(Value::Null),
            age.between(Value::Null, 35),
            Field::new("tags").contains(Value::Null),
            age.length().gt(Value::Null),
        ] {
            let err = result.unwrap_err();
            assert_eq!(err.code(), "NullOperand");
            assert!(err.is_construction());
        }
        let via_op = BinaryOp::new("age", Operator::Gt, Value::Null).unwrap_err();
        assert_eq!(via_op.code(), age.gt(Value::Null).unwrap_err().code());
    }

    #[test]
    fn combinators_build_new_nodes() -> Result<()> {
        let age = Field::new("age");
        let a = age.gt(1)?;
        let b = age.lt(9)?;
        let and = a.clone().and(b.clone());
        assert_eq!(and, a.clone() & b.clone());
        match &and {
            Expr::Composite(c) => {
                assert_eq!(c.connective, Connective::And);
                assert_eq!(*c.left, a);
                assert_eq!(*c.right, b);
            }
            other => panic!("expected composite, got {other:?}"),
        }
        assert_eq!(a.clone().or(b.clone()), a.clone() | b);
        assert_eq!(a.clone().not(), !a);
        Ok(())
    }

    #[test]
    fn between_is_inclusive_conjunction() -> Result<()> {
        let age = Field::new("age");
        assert_eq!(age.between(25, 35)?, age.ge(25)?.and(age.le(35)?));
        Ok(())
    }

    #[test]
    fn within_rejects_non_collections() {
        let role = Field::new("role");
        let ok = role.within(vec!["admin", "manager"]).expect("list operand");
        assert_eq!(binary(&ok).op, Operator::In);
        let err = role.within("admin").unwrap_err();
        assert!(matches!(err, QueryError::NotACollection { found: "string", .. }));
    }

    #[test]
    fn binary_op_validates_operands() {
        let op = BinaryOp::parse("name", "=", Value::Null).expect("rewritten");
        assert_eq!(op.op, Operator::IsNull);
        assert!(BinaryOp::new("age", Operator::Gt, Value::Null).is_err());
        assert!(BinaryOp::parse("age", "~", 1).is_err());
    }

    #[test]
    fn function_arguments_are_classified() {
        assert_eq!(FunctionArg::infer("name"), FunctionArg::field("name"));
        assert_eq!(FunctionArg::infer("$p"), FunctionArg::literal("$p"));
        assert_eq!(FunctionArg::infer("'x'"), FunctionArg::literal("'x'"));
        assert_eq!(FunctionArg::infer("\"x"), FunctionArg::field("\"x"));
    }

    #[test]
    fn function_comparisons() -> Result<()> {
        let name = Field::new("name");
        match name.length().gt(10)? {
            Expr::FunctionComparison(cmp) => {
                assert_eq!(cmp.function.name, "length");
                assert_eq!(cmp.op, Operator::Gt);
                assert_eq!(cmp.value, Some(Value::Int(10)));
            }
            other => panic!("expected function comparison, got {other:?}"),
        }
        match name.lower().eq(Value::Null) {
            Expr::FunctionComparison(cmp) => assert_eq!(cmp.op, Operator::IsNull),
            other => panic!("expected function comparison, got {other:?}"),
        }
        Ok(())
    }
}
