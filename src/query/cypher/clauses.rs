//! Clause elements: `MATCH`, `WHERE`, `RETURN`, `WITH`, `ORDER BY`, `SKIP`,
//! `LIMIT`.
//!
//! Clauses keep their children in caller order; nothing is reordered.

use crate::query::cypher::element::{escape_ident, Compile, Element};
use crate::query::cypher::keywords::{self, SortDirection};
use crate::query::value::Params;

fn compile_all<'a, I>(items: I, params: &mut Params, mut index: usize) -> (Vec<String>, usize)
where
    I: IntoIterator<Item = &'a Element>,
{
    let mut parts = Vec::new();
    for item in items {
        let (part, next) = item.compile(params, index);
        parts.push(part);
        index = next;
    }
    (parts, index)
}

/// `MATCH` or `OPTIONAL MATCH` over one or more patterns.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchClause {
    /// Patterns, emitted comma-separated.
    pub patterns: Vec<Element>,
    /// Emit `OPTIONAL MATCH`.
    pub optional: bool,
}

impl MatchClause {
    /// Creates a non-optional match over a single pattern.
    pub fn new(pattern: impl Into<Element>) -> Self {
        Self {
            patterns: vec![pattern.into()],
            optional: false,
        }
    }

    /// Adds a further comma-separated pattern.
    pub fn and_pattern(mut self, pattern: impl Into<Element>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Marks the clause as `OPTIONAL MATCH`.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl Compile for MatchClause {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        let keyword = if self.optional {
            keywords::OPTIONAL_MATCH
        } else {
            keywords::MATCH
        };
        let (parts, index) = compile_all(&self.patterns, params, index);
        (format!("{keyword} {}", parts.join(", ")), index)
    }
}

/// `WHERE` clause joining its conditions with `AND`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WhereClause {
    /// Conditions in caller order.
    pub conditions: Vec<Element>,
}

impl WhereClause {
    /// Creates a clause from conditions.
    pub fn new(conditions: Vec<Element>) -> Self {
        Self { conditions }
    }
}

impl Compile for WhereClause {
    /// An empty condition list compiles to an empty fragment.
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        if self.conditions.is_empty() {
            return (String::new(), index);
        }
        let (parts, index) = compile_all(&self.conditions, params, index);
        (format!("{} {}", keywords::WHERE, parts.join(" AND ")), index)
    }
}

/// Item projected by `RETURN` or `WITH`.
#[derive(Clone, Debug, PartialEq)]
pub enum Projection {
    /// Projection of a variable binding.
    Var {
        /// Variable to project.
        var: String,
        /// Optional alias.
        alias: Option<String>,
    },
    /// Projection of a computed element.
    Expr {
        /// Element to evaluate.
        expr: Element,
        /// Optional alias.
        alias: Option<String>,
    },
}

impl Projection {
    /// Projects a variable without alias.
    pub fn var(var: impl Into<String>) -> Self {
        Projection::Var {
            var: var.into(),
            alias: None,
        }
    }

    /// Projects an element under `alias`.
    pub fn aliased(expr: impl Into<Element>, alias: impl Into<String>) -> Self {
        Projection::Expr {
            expr: expr.into(),
            alias: Some(alias.into()),
        }
    }
}

impl From<&str> for Projection {
    fn from(var: &str) -> Self {
        Projection::var(var)
    }
}

impl From<Element> for Projection {
    fn from(expr: Element) -> Self {
        Projection::Expr { expr, alias: None }
    }
}

impl Compile for Projection {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        let (text, index, alias) = match self {
            Projection::Var { var, alias } => (escape_ident(var).into_owned(), index, alias),
            Projection::Expr { expr, alias } => {
                let (text, index) = expr.compile(params, index);
                (text, index, alias)
            }
        };
        match alias {
            Some(alias) => (
                format!("{text} {} {}", keywords::AS, escape_ident(alias)),
                index,
            ),
            None => (text, index),
        }
    }
}

fn compile_projections(
    keyword: &str,
    items: &[Projection],
    distinct: bool,
    params: &mut Params,
    mut index: usize,
) -> (String, usize) {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let (part, next) = item.compile(params, index);
        parts.push(part);
        index = next;
    }
    let distinct = if distinct {
        format!(" {}", keywords::DISTINCT)
    } else {
        String::new()
    };
    (format!("{keyword}{distinct} {}", parts.join(", ")), index)
}

/// `RETURN` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnClause {
    /// Projected items.
    pub items: Vec<Projection>,
    /// Emit `RETURN DISTINCT`.
    pub distinct: bool,
}

impl ReturnClause {
    /// Creates a non-distinct return clause.
    pub fn new<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Projection>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            distinct: false,
        }
    }

    /// Marks the clause as distinct.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

impl Compile for ReturnClause {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        compile_projections(keywords::RETURN, &self.items, self.distinct, params, index)
    }
}

/// `WITH` clause chaining query parts.
#[derive(Clone, Debug, PartialEq)]
pub struct WithClause {
    /// Items carried forward.
    pub items: Vec<Projection>,
    /// Emit `WITH DISTINCT`.
    pub distinct: bool,
}

impl WithClause {
    /// Creates a non-distinct with clause.
    pub fn new<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Projection>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            distinct: false,
        }
    }

    /// Marks the clause as distinct.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

impl Compile for WithClause {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        compile_projections(keywords::WITH, &self.items, self.distinct, params, index)
    }
}

/// `ORDER BY` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderByClause {
    /// Sort keys with their directions.
    pub items: Vec<(Element, SortDirection)>,
}

impl OrderByClause {
    /// Creates an order-by over a single key.
    pub fn new(item: impl Into<Element>, direction: SortDirection) -> Self {
        Self {
            items: vec![(item.into(), direction)],
        }
    }

    /// Adds a secondary sort key.
    pub fn then(mut self, item: impl Into<Element>, direction: SortDirection) -> Self {
        self.items.push((item.into(), direction));
        self
    }
}

impl Compile for OrderByClause {
    fn compile(&self, params: &mut Params, mut index: usize) -> (String, usize) {
        let mut parts = Vec::with_capacity(self.items.len());
        for (item, direction) in &self.items {
            let (text, next) = item.compile(params, index);
            parts.push(format!("{text} {direction}"));
            index = next;
        }
        (format!("{} {}", keywords::ORDER_BY, parts.join(", ")), index)
    }
}

/// `LIMIT n`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LimitClause(pub u64);

impl Compile for LimitClause {
    fn compile(&self, _params: &mut Params, index: usize) -> (String, usize) {
        (format!("{} {}", keywords::LIMIT, self.0), index)
    }
}

/// `SKIP n`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SkipClause(pub u64);

impl Compile for SkipClause {
    fn compile(&self, _params: &mut Params, index: usize) -> (String, usize) {
        (format!("{} {}", keywords::SKIP, self.0), index)
    }
}

/// Closed set of clause variants.
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    /// `MATCH` / `OPTIONAL MATCH`.
    Match(MatchClause),
    /// `WHERE`.
    Where(WhereClause),
    /// `RETURN`.
    Return(ReturnClause),
    /// `ORDER BY`.
    OrderBy(OrderByClause),
    /// `LIMIT`.
    Limit(LimitClause),
    /// `SKIP`.
    Skip(SkipClause),
    /// `WITH`.
    With(WithClause),
}

impl Compile for Clause {
    fn compile(&self, params: &mut Params, index: usize) -> (String, usize) {
        match self {
            Clause::Match(c) => c.compile(params, index),
            Clause::Where(c) => c.compile(params, index),
            Clause::Return(c) => c.compile(params, index),
            Clause::OrderBy(c) => c.compile(params, index),
            Clause::Limit(c) => c.compile(params, index),
            Clause::Skip(c) => c.compile(params, index),
            Clause::With(c) => c.compile(params, index),
        }
    }
}
