//! Lowering of expressions into Cypher elements.

use crate::query::cypher::element::{
    Argument, Comparison, Element, FunctionCall, Logical, Negation, PropertyRef,
};
use crate::query::expr::{Expr, FunctionArg, FunctionExpr};

/// Converts [`Expr`] trees into [`Element`] trees scoped to one variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpressionAdapter {
    entity_var: String,
}

impl ExpressionAdapter {
    /// Adapter emitting properties of `entity_var`.
    pub fn new(entity_var: impl Into<String>) -> Self {
        Self {
            entity_var: entity_var.into(),
        }
    }

    /// Variable that field references are scoped to.
    pub fn entity_var(&self) -> &str {
        &self.entity_var
    }

    fn property(&self, field: &str) -> Element {
        PropertyRef::new(self.entity_var.clone(), field).into()
    }

    fn function(&self, function: &FunctionExpr) -> FunctionCall {
        let args = function.args.iter().map(|arg| match arg {
            FunctionArg::Field(name) => Argument::Element(self.property(name)),
            FunctionArg::Literal(value) => Argument::Value(value.clone()),
        });
        FunctionCall::new(function.name.clone(), args)
    }

    /// Converts an expression. Total over every [`Expr`] variant.
    pub fn convert(&self, expr: &Expr) -> Element {
        match expr {
            Expr::Field(field) => self.property(field.name()),
            Expr::Binary(op) => {
                Comparison::from_parts(self.property(&op.field), op.op, op.value.clone()).into()
            }
            Expr::Composite(composite) => Logical::new(
                self.convert(&composite.left),
                composite.connective,
                self.convert(&composite.right),
            )
            .into(),
            Expr::Not(inner) => Negation::new(self.convert(inner)).into(),
            Expr::Function(function) => self.function(function).into(),
            Expr::FunctionComparison(cmp) => Comparison::from_parts(
                self.function(&cmp.function).into(),
                cmp.op,
                cmp.value.clone(),
            )
            .into(),
            Expr::Literal(value) => Element::Literal(*value),
        }
    }
}

impl Default for ExpressionAdapter {
    fn default() -> Self {
        Self::new("e")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::query::cypher::element::Compile;
    use crate::query::expr::Field;
    use crate::query::value::{Params, Value};

    fn compile(expr: &Expr) -> (String, Params) {
        let mut params = Params::new();
        let (text, _) = ExpressionAdapter::new("n")
            .convert(expr)
            .compile(&mut params, 0);
        (text, params)
    }

    #[test]
    fn fields_scope_to_entity_variable() {
        assert_eq!(compile(&Field::new("age").into()).0, "n.age");
        assert_eq!(ExpressionAdapter::default().entity_var(), "e");
    }

    #[test]
    fn containment_strategies() -> Result<()> {
        let (text, params) = compile(&Field::new("tags").contains("rust")?);
        assert_eq!(text, "ANY(item IN n.tags WHERE item = $p0)");
        assert_eq!(params.get("p0"), Some(&Value::from("rust")));
        assert_eq!(
            compile(&Field::new("email").contains("@")?).0,
            "n.email CONTAINS $p0"
        );
        Ok(())
    }

    #[test]
    fn composite_and_negation() -> Result<()> {
        let age = Field::new("age");
        let expr = !(age.gt(18)? | Field::new("name").is_null());
        let (text, params) = compile(&expr);
        assert_eq!(text, "NOT ((n.age > $p0 OR n.name IS NULL))");
        assert_eq!(params.len(), 1);
        Ok(())
    }

    #[test]
    fn function_arguments_follow_their_tags() {
        let expr = Field::new("name").lower().eq("ada");
        assert_eq!(compile(&expr).0, "toLower(n.name) = $p0");

        let call = FunctionExpr::new(
            "coalesce",
            [FunctionArg::field("nick"), FunctionArg::literal("anon")],
        );
        let (text, params) = compile(&call.into());
        assert_eq!(text, "coalesce(n.nick, $p0)");
        assert_eq!(params.get("p0"), Some(&Value::from("anon")));
    }

    #[test]
    fn literal_conditions_bind_nothing() {
        let (text, params) = compile(&Expr::Literal(true));
        assert_eq!(text, "true");
        assert!(params.is_empty());
    }
}
