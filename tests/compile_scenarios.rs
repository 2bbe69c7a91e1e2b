use neoquery::query::cypher::{
    EdgeDirection, MatchClause, NodePattern, PathPattern, Projection, RelationshipPattern,
    ReturnClause,
};
use neoquery::query::{Compile, CypherQuery, ExpressionAdapter, Field, Params, QueryBuilder, Value};
use neoquery::{ArrayFieldRules, CompilerConfig, Entity, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct User {
    email: String,
}

impl Entity for User {
    fn label() -> &'static str {
        "User"
    }
}

fn compile(expr: &neoquery::query::Expr) -> (String, Params) {
    let mut params = Params::new();
    let (text, _) = ExpressionAdapter::new("e")
        .convert(expr)
        .compile(&mut params, 0);
    (text, params)
}

#[test]
fn tags_containment_is_existential() -> Result<()> {
    let (text, params) = compile(&Field::new("tags").contains("graph")?);
    assert_eq!(text, "ANY(item IN e.tags WHERE item = $p0)");
    assert_eq!(params.get("p0"), Some(&Value::from("graph")));
    Ok(())
}

#[test]
fn email_containment_is_substring() -> Result<()> {
    let (text, _) = compile(&Field::new("email").contains("@example.com")?);
    assert_eq!(text, "e.email CONTAINS $p0");
    Ok(())
}

#[test]
fn strict_rules_ignore_plural_names() -> Result<()> {
    let rules = CompilerConfig::strict().array_fields;
    assert_eq!(rules, ArrayFieldRules::strict());
    let (text, _) = compile(&Field::new("address").contains_with("Main", &rules)?);
    assert_eq!(text, "e.address CONTAINS $p0");
    let (text, _) = compile(&Field::new("keywords").contains_with("rust", &rules)?);
    assert_eq!(text, "ANY(item IN e.keywords WHERE item = $p0)");
    Ok(())
}

#[test]
fn null_equality_compiles_to_null_checks() {
    let email = Field::new("email");
    let (text, params) = compile(&email.eq(Value::Null));
    assert_eq!(text, "e.email IS NULL");
    assert!(params.is_empty());
    let (text, params) = compile(&email.ne(Value::Null));
    assert_eq!(text, "e.email IS NOT NULL");
    assert!(params.is_empty());
}

#[test]
fn null_ordering_operand_is_rejected_before_compilation() {
    let err = Field::new("age").gt(Value::Null).unwrap_err();
    assert_eq!(err.code(), "NullOperand");
    let err = Field::new("name").length().le(Value::Null).unwrap_err();
    assert_eq!(err.code(), "NullOperand");
}

#[test]
fn full_query_emits_clauses_in_order() -> Result<()> {
    let compiled = QueryBuilder::<User>::new()
        .r#where(Field::new("age").gt(21)?)
        .order_by("age", true)
        .limit(5)
        .compile();
    let text = &compiled.text;
    let positions: Vec<usize> = ["MATCH", "WHERE", "RETURN", "ORDER BY", "LIMIT 5"]
        .iter()
        .map(|kw| text.find(kw).unwrap_or_else(|| panic!("missing {kw} in {text}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    assert!(text.contains("ORDER BY e.age DESC"));
    assert_eq!(compiled.params.len(), 1);
    assert_eq!(compiled.params.get("p0"), Some(&Value::Int(21)));
    Ok(())
}

#[test]
fn function_comparisons_and_string_helpers() -> Result<()> {
    let name = Field::new("name");
    let expr = name.length().gt(3)? & name.upper().eq("ADA") | name.ends_with("son");
    let (text, params) = compile(&expr);
    assert_eq!(
        text,
        "((length(e.name) > $p0 AND toUpper(e.name) = $p1) OR e.name ENDS WITH $p2)"
    );
    assert_eq!(params.len(), 3);
    Ok(())
}

#[test]
fn membership_lists_bind_one_parameter() {
    let (text, params) = compile(&Field::new("role").one_of(["admin", "owner"]));
    assert_eq!(text, "e.role IN $p0");
    assert_eq!(
        params.get("p0"),
        Some(&Value::List(vec![Value::from("admin"), Value::from("owner")]))
    );
}

#[test]
fn path_patterns_inline_properties() {
    let path = PathPattern::new(
        NodePattern::new("a").label("Person").property("name", "Ada"),
        RelationshipPattern::new("r")
            .rel_type("KNOWS")
            .direction(EdgeDirection::Both),
        NodePattern::new("b").label("Person"),
    );
    let mut query = CypherQuery::new(MatchClause::new(path));
    query.return_clause = Some(ReturnClause::new([Projection::var("b")]));
    let compiled = query.compile_query();
    assert_eq!(
        compiled.text,
        "MATCH (a:Person {$p0})-[r:KNOWS]-(b:Person) RETURN b"
    );
    assert_eq!(compiled.params.len(), 1);
}
