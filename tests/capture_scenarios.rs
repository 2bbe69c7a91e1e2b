use neoquery::query::{Expr, Field, Params, Record};
use neoquery::{ArrayFieldRegistry, Entity, Result, Transaction};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Person {
    #[serde(rename = "lastName")]
    last_name: String,
    age: i64,
}

impl Entity for Person {
    fn label() -> &'static str {
        "Person"
    }
}

fn no_rows(_: &str, _: &Params) -> Result<Vec<Record>> {
    Ok(Vec::new())
}

#[test]
fn chained_comparison_equals_between() -> Result<()> {
    let tx = Transaction::new(no_rows);
    let age = tx.field::<Person>("age");
    let _left = age.ge(25)?;
    let builder = tx.query::<Person>().r#where(age.le(35)?);
    assert_eq!(builder.conditions(), &[Field::new("age").between(25, 35)?]);
    Ok(())
}

#[test]
fn stale_chain_does_not_leak_into_later_conditions() -> Result<()> {
    let tx = Transaction::new(no_rows);
    let age = tx.field::<Person>("age");
    let builder = tx.query::<Person>().r#where(age.ge(25)?);
    let name = tx.field::<Person>("lastName");
    let builder = builder.r#where(name.eq("Smith"));
    assert_eq!(
        builder.conditions(),
        &[Field::new("age").ge(25)?, Field::new("lastName").eq("Smith")]
    );
    Ok(())
}

#[test]
fn where_all_discards_stale_chain() -> Result<()> {
    let tx = Transaction::new(no_rows);
    let age = tx.field::<Person>("age");
    let name = tx.field::<Person>("lastName");
    let builder = tx
        .query::<Person>()
        .where_all([age.ge(25)?])
        .r#where(name.eq("x"));
    assert_eq!(
        builder.conditions(),
        &[Field::new("age").ge(25)?, Field::new("lastName").eq("x")]
    );
    assert_eq!(
        builder.compile().text,
        "MATCH (e:Person) WHERE e.age >= $p0 AND e.lastName = $p1 RETURN e"
    );
    Ok(())
}

#[test]
fn every_where_variant_discards_stale_chain() -> Result<()> {
    let tx = Transaction::new(no_rows);
    let age = tx.field::<Person>("age");
    let name = tx.field::<Person>("lastName");

    let _dangling = age.ge(25)?;
    let builder = tx
        .query::<Person>()
        .where_eq([("role", "admin")])
        .r#where(name.eq("x"));

    let _dangling = age.ge(25)?;
    let builder = builder.where_contains("bio", "math")?.r#where(name.eq("y"));

    let _dangling = age.ge(25)?;
    let builder = builder.where_in("team", vec!["core"])?.r#where(name.eq("z"));

    let last_name = Field::new("lastName");
    assert_eq!(
        builder.conditions(),
        &[
            Field::new("role").eq("admin"),
            last_name.eq("x"),
            Field::new("bio").contains("math")?,
            last_name.eq("y"),
            Field::new("team").within(vec!["core"])?,
            last_name.eq("z"),
        ]
    );
    Ok(())
}

#[test]
fn containment_is_collected_once() -> Result<()> {
    let tx = Transaction::new(no_rows);
    let last_name = tx.field::<Person>("lastName");
    assert!(last_name.contains_value("Smith")?);
    let builder = tx.query::<Person>().r#where(true);
    assert_eq!(
        builder.conditions(),
        &[Field::new("lastName").contains("Smith")?]
    );

    let builder = builder.r#where(true);
    assert_eq!(builder.conditions().len(), 2);
    assert_eq!(builder.conditions()[1], Expr::Literal(true));

    assert_eq!(
        builder.compile().text,
        "MATCH (e:Person) WHERE e.lastName CONTAINS $p0 AND true RETURN e"
    );
    Ok(())
}

#[test]
fn collection_containment_under_capture() -> Result<()> {
    let tx = Transaction::new(no_rows);
    tx.field::<Person>("tags").contains_value("vip")?;
    let compiled = tx.query::<Person>().r#where(true).compile();
    assert_eq!(
        compiled.text,
        "MATCH (e:Person) WHERE ANY(item IN e.tags WHERE item = $p0) RETURN e"
    );
    Ok(())
}

#[test]
fn registry_marks_captured_field_as_collection() -> Result<()> {
    let mut registry = ArrayFieldRegistry::new();
    registry.register_array_field("Person", "address");
    let tx = Transaction::new(no_rows);

    tx.field::<Person>("address").contains_value("Main")?;
    let builder = tx.query::<Person>().r#where(true);
    assert_eq!(
        builder.compile().text,
        "MATCH (e:Person) WHERE e.address CONTAINS $p0 RETURN e"
    );

    tx.field_with_registry::<Person>("address", &registry)
        .contains_value("Main")?;
    let builder = tx.query::<Person>().r#where(true);
    assert_eq!(
        builder.compile().text,
        "MATCH (e:Person) WHERE ANY(item IN e.address WHERE item = $p0) RETURN e"
    );
    Ok(())
}

#[test]
fn separate_transactions_do_not_share_capture() -> Result<()> {
    let first = Transaction::new(no_rows);
    let second = Transaction::new(no_rows);
    first.field::<Person>("lastName").contains_value("Smith")?;
    let builder = second.query::<Person>().r#where(true);
    assert_eq!(builder.conditions(), &[Expr::Literal(true)]);
    let builder = first.query::<Person>().r#where(true);
    assert_eq!(
        builder.conditions(),
        &[Field::new("lastName").contains("Smith")?]
    );
    Ok(())
}

#[test]
fn transactions_on_other_threads_are_isolated() -> Result<()> {
    let handle = std::thread::spawn(|| -> Result<Vec<Expr>> {
        let tx = Transaction::new(no_rows);
        tx.field::<Person>("lastName").contains_value("Jones")?;
        let conditions = tx.query::<Person>().r#where(true).conditions().to_vec();
        Ok(conditions)
    });
    let tx = Transaction::new(no_rows);
    let age = tx.field::<Person>("age");
    let _left = age.gt(1)?;
    let local = tx.query::<Person>().r#where(age.lt(9)?).conditions().to_vec();
    let remote = handle.join().expect("thread completes")?;
    assert_eq!(remote, vec![Field::new("lastName").contains("Jones")?]);
    assert_eq!(local, vec![Field::new("age").gt(1)?.and(Field::new("age").lt(9)?)]);
    Ok(())
}
