//! Entity boundary between typed models and query records.
//!
//! The compiler knows nothing about model declarations. It asks an
//! [`Entity`] for its label and collection fields, consults a
//! [`FieldRegistry`] to override name-based collection inference, and
//! decodes returned records with `serde_json`.

use std::collections::{BTreeSet, HashMap};

use serde::de::DeserializeOwned;

use crate::error::{QueryError, Result};
use crate::query::expr::{Field, FieldKind};
use crate::query::value::{Record, Value};

/// Node type that can be queried and decoded from result records.
pub trait Entity: DeserializeOwned {
    /// Label matched by queries over this type.
    fn label() -> &'static str;

    /// Properties that hold collections.
    fn array_fields() -> &'static [&'static str] {
        &[]
    }

    /// Field reference resolved against [`Entity::array_fields`].
    fn field(name: &str) -> Field {
        if Self::array_fields().contains(&name) {
            Field::array(name)
        } else {
            Field::new(name)
        }
    }

    /// Decodes `column` of `record` into this type.
    fn from_record(record: &Record, column: &str) -> Result<Self> {
        let value = record
            .get(column)
            .ok_or_else(|| QueryError::MissingColumn {
                column: column.to_owned(),
            })?;
        decode_value(value.clone(), column)
    }
}

/// Deserialises a single result value.
pub fn decode_value<T: DeserializeOwned>(value: Value, column: &str) -> Result<T> {
    serde_json::from_value(value.into_json()).map_err(|e| QueryError::Decode {
        column: column.to_owned(),
        reason: e.to_string(),
    })
}

/// Lookup of fields explicitly declared as collections.
pub trait FieldRegistry {
    /// Whether `field` on `type_name` is declared as a collection.
    fn is_registered_array_field(&self, type_name: &str, field: &str) -> bool;

    /// Field reference for `field`, marked as a collection when registered.
    fn resolve(&self, type_name: &str, field: &str) -> Field {
        let kind = if self.is_registered_array_field(type_name, field) {
            FieldKind::Array
        } else {
            FieldKind::Inferred
        };
        Field::with_kind(field, kind)
    }
}

/// In-memory [`FieldRegistry`].
#[derive(Debug, Clone, Default)]
pub struct ArrayFieldRegistry {
    fields: HashMap<String, BTreeSet<String>>,
}

impl ArrayFieldRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `field` on `type_name` as a collection.
    pub fn register_array_field(&mut self, type_name: impl Into<String>, field: impl Into<String>) {
        self.fields
            .entry(type_name.into())
            .or_default()
            .insert(field.into());
    }

    /// Registers every [`Entity::array_fields`] entry of `M`.
    pub fn register_entity<M: Entity>(&mut self) {
        for field in M::array_fields() {
            self.register_array_field(M::label(), *field);
        }
    }

    /// Collection fields declared for `type_name`, sorted.
    pub fn array_fields(&self, type_name: &str) -> Vec<&str> {
        self.fields
            .get(type_name)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl FieldRegistry for ArrayFieldRegistry {
    fn is_registered_array_field(&self, type_name: &str, field: &str) -> bool {
        self.fields
            .get(type_name)
            .is_some_and(|set| set.contains(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: String,
        #[serde(default)]
        aliases: Vec<String>,
    }

    impl Entity for Person {
        fn label() -> &'static str {
            "Person"
        }

        fn array_fields() -> &'static [&'static str] {
            &["aka"]
        }
    }

    #[test]
    fn entity_fields_use_declared_collections() {
        assert_eq!(Person::field("aka").kind(), FieldKind::Array);
        assert_eq!(Person::field("name").kind(), FieldKind::Inferred);
    }

    #[test]
    fn registry_overrides_inference() {
        let mut registry = ArrayFieldRegistry::new();
        registry.register_array_field("Person", "address");
        registry.register_entity::<Person>();
        assert!(registry.is_registered_array_field("Person", "address"));
        assert!(!registry.is_registered_array_field("Company", "address"));
        assert!(registry.resolve("Person", "address").is_array());
        assert_eq!(registry.array_fields("Person"), vec!["address", "aka"]);
        assert!(registry.array_fields("Nobody").is_empty());
    }

    #[test]
    fn decodes_records() {
        let mut node = std::collections::BTreeMap::new();
        node.insert("name".to_owned(), Value::from("Ada"));
        node.insert("aliases".to_owned(), Value::from(vec!["Countess"]));
        let mut record = Record::new();
        record.insert("e".to_owned(), Value::Map(node));

        let person = Person::from_record(&record, "e").expect("decodes");
        assert_eq!(person.name, "Ada");
        assert_eq!(person.aliases, vec!["Countess".to_owned()]);

        let err = Person::from_record(&record, "n").unwrap_err();
        assert_eq!(err.code(), "MissingColumn");

        record.insert("e".to_owned(), Value::Int(3));
        let err = Person::from_record(&record, "e").unwrap_err();
        assert_eq!(err.code(), "Decode");
    }
}
