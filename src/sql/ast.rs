//! Abstract Syntax Tree (AST) for SELECT statements.
//!
//! This module defines the shape the parser hands to the executor. The parser
//! emits `relations`, `attributes` and `aggregates` in *reverse* textual order;
//! [`Selects`] keeps that layout so it can be filled directly by a parser, and
//! [`SelectsBuilder`] produces it from textual order for programmatic callers.

use std::fmt;

use crate::datum::Value;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompOp {
    /// `=`
    EqualTo,
    /// `<=`
    LessEqual,
    /// `<>`
    NotEqual,
    /// `<`
    LessThan,
    /// `>=`
    GreatEqual,
    /// `>`
    GreatThan,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    NotNull,
    /// Parser sentinel for "no operator"; never valid in a bound condition.
    NoOp,
}

impl CompOp {
    /// Returns the operator that gives the same result with its operands swapped.
    pub fn flip(self) -> Self {
        match self {
            CompOp::LessEqual => CompOp::GreatEqual,
            CompOp::LessThan => CompOp::GreatThan,
            CompOp::GreatEqual => CompOp::LessEqual,
            CompOp::GreatThan => CompOp::LessThan,
            other => other,
        }
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompOp::EqualTo => "=",
            CompOp::LessEqual => "<=",
            CompOp::NotEqual => "<>",
            CompOp::LessThan => "<",
            CompOp::GreatEqual => ">=",
            CompOp::GreatThan => ">",
            CompOp::IsNull => "IS NULL",
            CompOp::NotNull => "IS NOT NULL",
            CompOp::NoOp => "NO_OP",
        };
        f.write_str(symbol)
    }
}

/// A possibly qualified attribute reference (`a`, `t.a`, `*`, `t.*`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelAttr {
    /// Relation qualifier, if written.
    pub relation_name: Option<String>,
    /// Attribute name, `*`, or a numeric literal inside an aggregate.
    pub attribute_name: String,
}

impl RelAttr {
    /// Creates an unqualified attribute reference.
    pub fn new(attribute_name: impl Into<String>) -> Self {
        Self {
            relation_name: None,
            attribute_name: attribute_name.into(),
        }
    }

    /// Creates a `relation.attribute` reference.
    pub fn qualified(relation_name: impl Into<String>, attribute_name: impl Into<String>) -> Self {
        Self {
            relation_name: Some(relation_name.into()),
            attribute_name: attribute_name.into(),
        }
    }

    /// Creates the bare `*` reference.
    pub fn star() -> Self {
        Self::new("*")
    }

    /// Returns true if the attribute name is `*`.
    pub fn is_star(&self) -> bool {
        self.attribute_name == "*"
    }
}

impl fmt::Display for RelAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relation_name {
            Some(relation) => write!(f, "{}.{}", relation, self.attribute_name),
            None => f.write_str(&self.attribute_name),
        }
    }
}

/// One side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Column reference.
    Attr(RelAttr),
    /// Literal value.
    Value(Value),
}

impl Operand {
    /// Shorthand for an unqualified column operand.
    pub fn attr(attribute_name: impl Into<String>) -> Self {
        Operand::Attr(RelAttr::new(attribute_name))
    }

    /// Shorthand for a qualified column operand.
    pub fn qualified(relation_name: impl Into<String>, attribute_name: impl Into<String>) -> Self {
        Operand::Attr(RelAttr::qualified(relation_name, attribute_name))
    }

    /// Returns true for column operands.
    pub fn is_attr(&self) -> bool {
        matches!(self, Operand::Attr(_))
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

/// A WHERE-clause conjunct: `left <comp> right`.
///
/// `a IS NULL` is represented as `(attr a, IsNull, NULL)` and
/// `a IS NOT NULL` as `(attr a, NotNull, NULL)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Left operand.
    pub left: Operand,
    /// Comparison operator.
    pub comp: CompOp,
    /// Right operand.
    pub right: Operand,
}

impl Condition {
    /// Creates a condition.
    pub fn new(left: impl Into<Operand>, comp: CompOp, right: impl Into<Operand>) -> Self {
        Self {
            left: left.into(),
            comp,
            right: right.into(),
        }
    }

    /// `attr IS NULL`
    pub fn is_null(attr: Operand) -> Self {
        Self::new(attr, CompOp::IsNull, Value::Null)
    }

    /// `attr IS NOT NULL`
    pub fn not_null(attr: Operand) -> Self {
        Self::new(attr, CompOp::NotNull, Value::Null)
    }
}

/// ORDER BY key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Column to order by.
    pub attr: RelAttr,
    /// Descending order when true.
    pub is_desc: bool,
}

/// A parsed SELECT statement.
///
/// `relations`, `attributes` and `aggregates` are stored in reverse textual
/// order, exactly as the parser produces them. `aggregates` is either empty
/// (plain projection) or parallel to `attributes`. `conditions` and `orders`
/// are in textual order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selects {
    /// FROM relations, reversed.
    pub relations: Vec<String>,
    /// SELECT list attributes, reversed.
    pub attributes: Vec<RelAttr>,
    /// Aggregate function names paired with `attributes`, reversed.
    pub aggregates: Vec<String>,
    /// WHERE conjuncts.
    pub conditions: Vec<Condition>,
    /// ORDER BY keys.
    pub orders: Vec<OrderBy>,
}

impl Selects {
    /// Starts building a statement in textual order.
    pub fn builder() -> SelectsBuilder {
        SelectsBuilder::default()
    }

    /// Number of aggregate functions in the SELECT list.
    pub fn aggregate_num(&self) -> usize {
        self.aggregates.len()
    }
}

/// Builds [`Selects`] from clauses given in textual order.
#[derive(Debug, Default)]
pub struct SelectsBuilder {
    relations: Vec<String>,
    items: Vec<(Option<String>, RelAttr)>,
    conditions: Vec<Condition>,
    orders: Vec<OrderBy>,
}

impl SelectsBuilder {
    /// Adds a plain SELECT-list column.
    pub fn column(mut self, attr: RelAttr) -> Self {
        self.items.push((None, attr));
        self
    }

    /// Adds an aggregate call such as `avg(t.a)` or `count(*)`.
    pub fn aggregate(mut self, function: impl Into<String>, attr: RelAttr) -> Self {
        self.items.push((Some(function.into()), attr));
        self
    }

    /// Adds a FROM relation.
    pub fn from(mut self, relation: impl Into<String>) -> Self {
        self.relations.push(relation.into());
        self
    }

    /// Adds a WHERE conjunct.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds an ORDER BY key.
    pub fn order_by(mut self, attr: RelAttr, is_desc: bool) -> Self {
        self.orders.push(OrderBy { attr, is_desc });
        self
    }

    /// Produces the parser-ordered statement.
    ///
    /// When any item is an aggregate, plain columns get an empty aggregate
    /// name so the lists stay parallel; the executor rejects such a mix.
    pub fn build(self) -> Selects {
        let has_aggregate = self.items.iter().any(|(function, _)| function.is_some());
        let mut attributes = Vec::with_capacity(self.items.len());
        let mut aggregates = Vec::new();
        for (function, attr) in self.items.into_iter().rev() {
            if has_aggregate {
                aggregates.push(function.unwrap_or_default());
            }
            attributes.push(attr);
        }
        Selects {
            relations: self.relations.into_iter().rev().collect(),
            attributes,
            aggregates,
            conditions: self.conditions,
            orders: self.orders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_reverses_parser_lists() {
        let selects = Selects::builder()
            .column(RelAttr::new("b"))
            .column(RelAttr::new("a"))
            .from("t")
            .from("u")
            .build();
        assert_eq!(selects.relations, vec!["u".to_string(), "t".to_string()]);
        assert_eq!(selects.attributes, vec![RelAttr::new("a"), RelAttr::new("b")]);
        assert!(selects.aggregates.is_empty());
    }

    #[test]
    fn test_builder_keeps_aggregates_parallel() {
        let selects = Selects::builder()
            .aggregate("avg", RelAttr::new("a"))
            .aggregate("count", RelAttr::star())
            .from("t")
            .build();
        assert_eq!(selects.aggregate_num(), 2);
        assert_eq!(selects.aggregates, vec!["count".to_string(), "avg".to_string()]);
        assert_eq!(selects.attributes[0], RelAttr::star());
    }

    #[test]
    fn test_flip() {
        assert_eq!(CompOp::LessThan.flip(), CompOp::GreatThan);
        assert_eq!(CompOp::GreatEqual.flip(), CompOp::LessEqual);
        assert_eq!(CompOp::EqualTo.flip(), CompOp::EqualTo);
        assert_eq!(CompOp::IsNull.flip(), CompOp::IsNull);
    }

    #[test]
    fn test_rel_attr_display() {
        assert_eq!(RelAttr::qualified("t", "a").to_string(), "t.a");
        assert_eq!(RelAttr::new("a").to_string(), "a");
        assert!(RelAttr::star().is_star());
    }
}
