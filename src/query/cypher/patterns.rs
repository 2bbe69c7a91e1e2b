//! Node, relationship, and path patterns.
//!
//! Inline property maps are bound as a single map parameter rather than one
//! parameter per key, which keeps pattern fragments compact.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;
use crate::query::cypher::element::{bind, escape_ident, Compile};
use crate::query::value::{Params, Value};

/// Direction selector for relationship patterns.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum EdgeDirection {
    /// `-[...]->`
    #[default]
    Out,
    /// `<-[...]-`
    In,
    /// `-[...]-`
    Both,
}

impl EdgeDirection {
    /// Arrow marker used when parsing (`->`, `<-`, `-`).
    pub fn marker(self) -> &'static str {
        match self {
            EdgeDirection::Out => "->",
            EdgeDirection::In => "<-",
            EdgeDirection::Both => "-",
        }
    }
}

impl FromStr for EdgeDirection {
    type Err = QueryError;

    fn from_str(marker: &str) -> Result<Self, Self::Err> {
        match marker {
            "->" => Ok(EdgeDirection::Out),
            "<-" => Ok(EdgeDirection::In),
            "-" => Ok(EdgeDirection::Both),
            other => Err(QueryError::InvalidDirection {
                marker: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for EdgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Node pattern such as `(p:Person {$p0})`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePattern {
    /// Variable bound to the node; empty for an anonymous node.
    pub variable: String,
    /// Labels, emitted in order.
    pub labels: Vec<String>,
    /// Inline property constraints.
    pub properties: BTreeMap<String, Value>,
}

impl NodePattern {
    /// Creates a node pattern with the supplied variable and no labels.
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            ..Self::default()
        }
    }

    /// Adds a label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Adds an inline property constraint.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl Compile for NodePattern {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        let mut pattern = escape_ident(&self.variable).into_owned();
        for label in &self.labels {
            pattern.push(':');
            pattern.push_str(&escape_ident(label));
        }
        let (properties, index) = inline_properties(&self.properties, params, index);
        pattern.push_str(&properties);
        (format!("({pattern})"), index)
    }
}

/// Relationship pattern such as `-[r:KNOWS]->`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelationshipPattern {
    /// Variable bound to the relationship; empty for an anonymous one.
    pub variable: String,
    /// Alternative relationship types, joined with `|`.
    pub types: Vec<String>,
    /// Inline property constraints.
    pub properties: BTreeMap<String, Value>,
    /// Traversal direction.
    pub direction: EdgeDirection,
}

impl RelationshipPattern {
    /// Creates an outgoing relationship pattern.
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            ..Self::default()
        }
    }

    /// Creates a relationship pattern from a textual direction marker.
    pub fn with_marker(variable: impl Into<String>, marker: &str) -> Result<Self, QueryError> {
        Ok(Self::new(variable).direction(marker.parse()?))
    }

    /// Adds an alternative relationship type.
    pub fn rel_type(mut self, rel_type: impl Into<String>) -> Self {
        self.types.push(rel_type.into());
        self
    }

    /// Adds an inline property constraint.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Sets the traversal direction.
    pub fn direction(mut self, direction: EdgeDirection) -> Self {
        self.direction = direction;
        self
    }
}

impl Compile for RelationshipPattern {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        let mut pattern = escape_ident(&self.variable).into_owned();
        if !self.types.is_empty() {
            let types: Vec<_> = self.types.iter().map(|t| escape_ident(t)).collect();
            pattern.push(':');
            pattern.push_str(&types.join("|"));
        }
        let (properties, index) = inline_properties(&self.properties, params, index);
        pattern.push_str(&properties);
        let fragment = match self.direction {
            EdgeDirection::Out => format!("-[{pattern}]->"),
            EdgeDirection::In => format!("<-[{pattern}]-"),
            EdgeDirection::Both => format!("-[{pattern}]-"),
        };
        (fragment, index)
    }
}

/// Single-hop path `(start)-[rel]->(end)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPattern {
    /// Start node.
    pub start: NodePattern,
    /// Connecting relationship.
    pub relationship: RelationshipPattern,
    /// End node.
    pub end: NodePattern,
}

impl PathPattern {
    /// Creates a path from its three parts.
    pub fn new(start: NodePattern, relationship: RelationshipPattern, end: NodePattern) -> Self {
        Self {
            start,
            relationship,
            end,
        }
    }
}

impl Compile for PathPattern {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        let (start, index) = self.start.compile(params, index);
        let (rel, index) = self.relationship.compile(params, index);
        let (end, index) = self.end.compile(params, index);
        (format!("{start}{rel}{end}"), index)
    }
}

fn inline_properties(
    properties: &BTreeMap<String, Value>,
    params: &mut Params,
    index: usize,
) -> (String, usize) {
    if properties.is_empty() {
        return (String::new(), index);
    }
    let (placeholder, index) = bind(params, index, Value::Map(properties.clone()));
    (format!(" {{{placeholder}}}"), index)
}
