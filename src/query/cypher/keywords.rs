//! Cypher keyword constants and operator enums.

use std::fmt;

/// Clause keyword: `MATCH`.
pub const MATCH: &str = "MATCH";
/// Clause keyword: `OPTIONAL MATCH`.
pub const OPTIONAL_MATCH: &str = "OPTIONAL MATCH";
/// Clause keyword: `WHERE`.
pub const WHERE: &str = "WHERE";
/// Clause keyword: `RETURN`.
pub const RETURN: &str = "RETURN";
/// Clause keyword: `WITH`.
pub const WITH: &str = "WITH";
/// Clause keyword: `ORDER BY`.
pub const ORDER_BY: &str = "ORDER BY";
/// Clause keyword: `SKIP`.
pub const SKIP: &str = "SKIP";
/// Clause keyword: `LIMIT`.
pub const LIMIT: &str = "LIMIT";
/// Modifier keyword: `DISTINCT`.
pub const DISTINCT: &str = "DISTINCT";
/// Alias keyword: `AS`.
pub const AS: &str = "AS";
/// Negation keyword: `NOT`.
pub const NOT: &str = "NOT";

/// Function name: `count`.
pub const FN_COUNT: &str = "count";
/// Function name: `length`.
pub const FN_LENGTH: &str = "length";
/// Function name: `toLower`.
pub const FN_TO_LOWER: &str = "toLower";
/// Function name: `toUpper`.
pub const FN_TO_UPPER: &str = "toUpper";

/// Maps short aliases to Cypher function names (`lower` -> `toLower`).
pub fn canonical_function_name(name: &str) -> &str {
    match name {
        "lower" => FN_TO_LOWER,
        "upper" => FN_TO_UPPER,
        other => other,
    }
}

/// Comparison operator between an operand and a value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `STARTS WITH`
    StartsWith,
    /// `ENDS WITH`
    EndsWith,
    /// `CONTAINS` (substring test)
    Contains,
    /// `IN` (value is a member of a parameter list)
    In,
    /// Existential collection membership, compiled to `ANY(...)`.
    AnyIn,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
}

impl Operator {
    /// Textual symbol as emitted in query text.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::StartsWith => "STARTS WITH",
            Operator::EndsWith => "ENDS WITH",
            Operator::Contains => "CONTAINS",
            Operator::In => "IN",
            Operator::AnyIn => "ANY IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator is unary and never allocates a parameter.
    pub fn is_nullary(self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Parses an operator symbol (case-insensitive for word operators).
    pub fn parse(symbol: &str) -> Option<Self> {
        let op = match symbol.trim().to_ascii_uppercase().as_str() {
            "=" | "==" => Operator::Eq,
            "<>" | "!=" => Operator::Ne,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Ge,
            "<=" => Operator::Le,
            "STARTS WITH" => Operator::StartsWith,
            "ENDS WITH" => Operator::EndsWith,
            "CONTAINS" => Operator::Contains,
            "IN" => Operator::In,
            "ANY IN" => Operator::AnyIn,
            "IS NULL" => Operator::IsNull,
            "IS NOT NULL" => Operator::IsNotNull,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Binary logical connective.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Connective {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        })
    }
}

/// Sort direction used by `ORDER BY`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum SortDirection {
    /// `ASC`
    #[default]
    Asc,
    /// `DESC`
    Desc,
}

impl SortDirection {
    /// `Desc` when `descending` is set, `Asc` otherwise.
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        })
    }
}
