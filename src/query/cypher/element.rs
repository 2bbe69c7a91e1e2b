//! Compilable Cypher elements.
//!
//! Every element exposes a single operation through [`Compile`]: given the
//! parameter map under construction and the next free parameter index, it
//! returns its query fragment and the index after any parameters it bound.
//! Compilation never touches state outside its arguments, so compiling the
//! same element twice from the same index yields identical output.

use std::borrow::Cow;

use crate::config::is_identifier;
use crate::error::{QueryError, Result};
use crate::query::cypher::keywords::{self, Connective, Operator};
use crate::query::cypher::patterns::{NodePattern, PathPattern, RelationshipPattern};
use crate::query::value::{Params, Value};

/// Compilation into a Cypher fragment with positional parameters.
pub trait Compile {
    /// Emits this element, binding literal values into `params` starting at
    /// `index`, and returns the fragment together with the next free index.
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize);
}

/// Name of the parameter allocated at `index`.
pub fn param_name(index: usize) -> String {
    format!("p{index}")
}

/// Binds `value` to the next parameter slot and returns its placeholder.
pub(crate) fn bind(params: &mut Params, index: usize, value: Value) -> (String, usize) {
    let name = param_name(index);
    let placeholder = format!("${name}");
    params.insert(name, value);
    (placeholder, index + 1)
}

/// Emits `ident` unquoted when it is a plain identifier, backtick-quoted
/// otherwise. Empty identifiers (anonymous pattern parts) stay empty.
pub(crate) fn escape_ident(ident: &str) -> Cow<'_, str> {
    if ident.is_empty() || is_identifier(ident) {
        Cow::Borrowed(ident)
    } else {
        Cow::Owned(format!("`{}`", ident.replace('`', "``")))
    }
}

/// Closed set of expression-level and pattern elements.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// Bare variable reference (`e`).
    Variable(String),
    /// Property access (`e.name`).
    Property(PropertyRef),
    /// Boolean constant.
    Literal(bool),
    /// Binary or unary comparison.
    Comparison(Comparison),
    /// `AND` / `OR` combination.
    Logical(Logical),
    /// `NOT (...)`.
    Negation(Negation),
    /// Function invocation.
    Function(FunctionCall),
    /// Node pattern `(n:Label)`.
    Node(NodePattern),
    /// Relationship pattern `-[r:TYPE]->`.
    Relationship(RelationshipPattern),
    /// Path pattern `(a)-[r]->(b)`.
    Path(PathPattern),
}

impl Compile for Element {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        match self {
            Element::Variable(name) => (escape_ident(name).into_owned(), index),
            Element::Property(prop) => prop.compile(params, index),
            Element::Literal(value) => (value.to_string(), index),
            Element::Comparison(cmp) => cmp.compile(params, index),
            Element::Logical(logical) => logical.compile(params, index),
            Element::Negation(neg) => neg.compile(params, index),
            Element::Function(call) => call.compile(params, index),
            Element::Node(node) => node.compile(params, index),
            Element::Relationship(rel) => rel.compile(params, index),
            Element::Path(path) => path.compile(params, index),
        }
    }
}

/// Property reference scoped to a variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRef {
    /// Node or relationship variable.
    pub variable: String,
    /// Property name.
    pub property: String,
}

impl PropertyRef {
    /// Creates `variable.property`.
    pub fn new(variable: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            property: property.into(),
        }
    }
}

impl Compile for PropertyRef {
    fn compile(&self, _params: &mut Params, index: usize) -> (String, usize) {
        (
            format!(
                "{}.{}",
                escape_ident(&self.variable),
                escape_ident(&self.property)
            ),
            index,
        )
    }
}

/// Comparison of an operand element against an optional literal value.
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    /// Left operand, usually a property reference or function call.
    pub left: Box<Element>,
    /// Operator.
    pub op: Operator,
    /// Right-hand value; `None` exactly when the operator is nullary.
    pub right: Option<Value>,
}

impl Comparison {
    /// Validates and builds a comparison.
    ///
    /// `=`/`<>` against null are rewritten to `IS NULL`/`IS NOT NULL`; any
    /// other operator rejects a null operand, and the nullary operators
    /// reject a non-null one.
    pub fn new(left: impl Into<Element>, op: Operator, right: Value) -> Result<Self> {
        let (op, right) = normalize_operand(op, right)?;
        Ok(Self::from_parts(left.into(), op, right))
    }

    /// Builds a nullary comparison (`IS NULL` / `IS NOT NULL`).
    pub fn unary(left: impl Into<Element>, op: Operator) -> Result<Self> {
        if !op.is_nullary() {
            return Err(QueryError::MissingOperand {
                op: op.symbol().to_owned(),
            });
        }
        Ok(Self::from_parts(left.into(), op, None))
    }

    pub(crate) fn from_parts(left: Element, op: Operator, right: Option<Value>) -> Self {
        Self {
            left: Box::new(left),
            op,
            right,
        }
    }
}

/// Applies the null rewriting rules shared by expressions and elements.
pub(crate) fn normalize_operand(op: Operator, value: Value) -> Result<(Operator, Option<Value>)> {
    match (op, value.is_null()) {
        (Operator::Eq, true) => Ok((Operator::IsNull, None)),
        (Operator::Ne, true) => Ok((Operator::IsNotNull, None)),
        (op, true) if op.is_nullary() => Ok((op, None)),
        (op, false) if op.is_nullary() => Err(QueryError::UnexpectedOperand {
            op: op.symbol().to_owned(),
        }),
        (op, true) => Err(QueryError::NullOperand {
            op: op.symbol().to_owned(),
        }),
        (op, false) => Ok((op, Some(value))),
    }
}

impl Compile for Comparison {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        let (left, index) = self.left.compile(params, index);
        let value = match (&self.right, self.op.is_nullary()) {
            (_, true) | (None, false) => return (format!("{left} {}", self.op), index),
            (Some(value), false) => value.clone(),
        };
        let (placeholder, next) = bind(params, index, value);
        match self.op {
            Operator::AnyIn => (
                format!("ANY(item IN {left} WHERE item = {placeholder})"),
                next,
            ),
            op => (format!("{left} {op} {placeholder}"), next),
        }
    }
}

/// Parenthesised logical combination of two elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Logical {
    /// Left operand.
    pub left: Box<Element>,
    /// Connective.
    pub connective: Connective,
    /// Right operand.
    pub right: Box<Element>,
}

impl Logical {
    /// Combines two elements.
    pub fn new(left: impl Into<Element>, connective: Connective, right: impl Into<Element>) -> Self {
        Self {
            left: Box::new(left.into()),
            connective,
            right: Box::new(right.into()),
        }
    }
}

impl Compile for Logical {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        let (left, index) = self.left.compile(params, index);
        let (right, index) = self.right.compile(params, index);
        (format!("({left} {} {right})", self.connective), index)
    }
}

/// Logical negation.
#[derive(Clone, Debug, PartialEq)]
pub struct Negation {
    /// Negated element.
    pub inner: Box<Element>,
}

impl Negation {
    /// Wraps `inner` in `NOT (...)`.
    pub fn new(inner: impl Into<Element>) -> Self {
        Self {
            inner: Box::new(inner.into()),
        }
    }
}

impl Compile for Negation {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        let (inner, index) = self.inner.compile(params, index);
        (format!("{} ({inner})", keywords::NOT), index)
    }
}

/// Argument passed to a [`FunctionCall`].
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    /// Nested element emitted inline.
    Element(Element),
    /// Literal bound as a parameter.
    Value(Value),
}

impl From<Element> for Argument {
    fn from(element: Element) -> Self {
        Argument::Element(element)
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Value(value)
    }
}

/// Function invocation such as `length(e.name)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCall {
    /// Function name; `lower`/`upper` are emitted as `toLower`/`toUpper`.
    pub name: String,
    /// Arguments in call order.
    pub args: Vec<Argument>,
}

impl FunctionCall {
    /// Creates a function call.
    pub fn new<I, A>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Compile for FunctionCall {
    fn compile(&self, params: &mut Params, mut index: usize) -> (String, usize) {
        let mut parts = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            let (part, next) = match arg {
                Argument::Element(element) => element.compile(params, index),
                Argument::Value(value) => bind(params, index, value.clone()),
            };
            parts.push(part);
            index = next;
        }
        (
            format!(
                "{}({})",
                keywords::canonical_function_name(&self.name),
                parts.join(", ")
            ),
            index,
        )
    }
}

macro_rules! element_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Element {
                fn from(value: $ty) -> Self {
                    Element::$variant(value)
                }
            }
        )*
    };
}

element_from! {
    PropertyRef => Property,
    Comparison => Comparison,
    Logical => Logical,
    Negation => Negation,
    FunctionCall => Function,
    NodePattern => Node,
    RelationshipPattern => Relationship,
    PathPattern => Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(element: impl Compile) -> (String, Params, usize) {
        let mut params = Params::new();
        let (text, next) = element.compile(&mut params, 0);
        (text, params, next)
    }

    #[test]
    fn comparison_allocates_one_parameter() {
        let cmp = Comparison::new(PropertyRef::new("e", "age"), Operator::Gt, Value::Int(30))
            .expect("valid comparison");
        let (text, params, next) = compile(cmp);
        assert_eq!(text, "e.age > $p0");
        assert_eq!(next, 1);
        assert_eq!(params.get("p0"), Some(&Value::Int(30)));
    }

    #[test]
    fn null_checks_bind_nothing() {
        let cmp = Comparison::new(PropertyRef::new("e", "email"), Operator::Eq, Value::Null)
            .expect("rewritten to IS NULL");
        let (text, params, next) = compile(cmp);
        assert_eq!(text, "e.email IS NULL");
        assert!(params.is_empty());
        assert_eq!(next, 0);

        let cmp = Comparison::new(PropertyRef::new("e", "email"), Operator::Ne, Value::Null)
            .expect("rewritten to IS NOT NULL");
        assert_eq!(compile(cmp).0, "e.email IS NOT NULL");
    }

    #[test]
    fn invalid_operands_fail_at_construction() {
        let err = Comparison::new(PropertyRef::new("e", "a"), Operator::Gt, Value::Null)
            .unwrap_err();
        assert_eq!(err.code(), "NullOperand");
        let err = Comparison::new(PropertyRef::new("e", "a"), Operator::IsNull, Value::Int(1))
            .unwrap_err();
        assert_eq!(err.code(), "UnexpectedOperand");
        let err = Comparison::unary(PropertyRef::new("e", "a"), Operator::Lt).unwrap_err();
        assert_eq!(err.code(), "MissingOperand");
    }

    #[test]
    fn any_in_uses_existential_subquery() {
        let cmp = Comparison::new(
            PropertyRef::new("e", "tags"),
            Operator::AnyIn,
            Value::from("rust"),
        )
        .expect("valid");
        let (text, _, _) = compile(cmp);
        assert_eq!(text, "ANY(item IN e.tags WHERE item = $p0)");
    }

    #[test]
    fn logical_and_negation_wrap_children() {
        let left = Comparison::new(PropertyRef::new("e", "a"), Operator::Eq, Value::Int(1))
            .expect("valid");
        let right = Comparison::new(PropertyRef::new("e", "b"), Operator::Lt, Value::Int(2))
            .expect("valid");
        let logical = Logical::new(left, Connective::Or, right);
        let (text, params, next) = compile(Negation::new(logical));
        assert_eq!(text, "NOT ((e.a = $p0 OR e.b < $p1))");
        assert_eq!(params.len(), 2);
        assert_eq!(next, 2);
    }

    #[test]
    fn function_call_binds_literal_arguments() {
        let call = FunctionCall::new(
            "lower",
            vec![
                Argument::Element(PropertyRef::new("e", "name").into()),
                Argument::Value(Value::from("x")),
            ],
        );
        let (text, params, next) = compile(call);
        assert_eq!(text, "toLower(e.name, $p0)");
        assert_eq!(params.len(), 1);
        assert_eq!(next, 1);
    }

    #[test]
    fn odd_identifiers_are_quoted() {
        let (text, _, _) = compile(PropertyRef::new("e", "first name"));
        assert_eq!(text, "e.`first name`");
    }

    #[test]
    fn compilation_is_repeatable() {
        let cmp = Comparison::new(PropertyRef::new("e", "n"), Operator::In, Value::from(vec![1i64]))
            .expect("valid");
        let element = Element::from(cmp);
        let mut first = Params::new();
        let mut second = Params::new();
        assert_eq!(element.compile(&mut first, 3), element.compile(&mut second, 3));
        assert_eq!(first, second);
    }
}
