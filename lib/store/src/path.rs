use spargebra::algebra::{GraphPattern, PropertyPathExpression};
use std::collections::BTreeSet;
use std::fmt;

/// A SPARQL [property path](https://www.w3.org/TR/sparql11-query/#propertypaths) expression.
///
/// Unlike [`PropertyPathExpression`], paths are totally ordered: first by the kind of path
/// (in declaration order), then by their operands.
/// This allows keeping the paths of a request in sorted collections.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathExpr {
    Iri(String),
    Reverse(Box<PathExpr>),
    Sequence(Box<PathExpr>, Box<PathExpr>),
    Alternative(Box<PathExpr>, Box<PathExpr>),
    ZeroOrMore(Box<PathExpr>),
    OneOrMore(Box<PathExpr>),
    ZeroOrOne(Box<PathExpr>),
    NegatedPropertySet(Vec<String>),
}

impl From<&PropertyPathExpression> for PathExpr {
    fn from(path: &PropertyPathExpression) -> Self {
        let boxed = |p: &PropertyPathExpression| Box::new(Self::from(p));
        match path {
            PropertyPathExpression::NamedNode(node) => Self::Iri(node.as_str().to_owned()),
            PropertyPathExpression::Reverse(p) => Self::Reverse(boxed(p)),
            PropertyPathExpression::Sequence(a, b) => Self::Sequence(boxed(a), boxed(b)),
            PropertyPathExpression::Alternative(a, b) => {
                Self::Alternative(boxed(a), boxed(b))
            }
            PropertyPathExpression::ZeroOrMore(p) => Self::ZeroOrMore(boxed(p)),
            PropertyPathExpression::OneOrMore(p) => Self::OneOrMore(boxed(p)),
            PropertyPathExpression::ZeroOrOne(p) => Self::ZeroOrOne(boxed(p)),
            PropertyPathExpression::NegatedPropertySet(nodes) => Self::NegatedPropertySet(
                nodes.iter().map(|n| n.as_str().to_owned()).collect(),
            ),
        }
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Reverse(p) => write!(f, "^({p})"),
            Self::Sequence(a, b) => write!(f, "({a} / {b})"),
            Self::Alternative(a, b) => write!(f, "({a} | {b})"),
            Self::ZeroOrMore(p) => write!(f, "({p})*"),
            Self::OneOrMore(p) => write!(f, "({p})+"),
            Self::ZeroOrOne(p) => write!(f, "({p})?"),
            Self::NegatedPropertySet(iris) => {
                f.write_str("!(")?;
                for (i, iri) in iris.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "<{iri}>")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Adds every property path occurring in `pattern` to `paths`.
///
/// Paths nested in `EXISTS` filters are not visited.
pub(crate) fn collect_paths(pattern: &GraphPattern, paths: &mut BTreeSet<PathExpr>) {
    match pattern {
        GraphPattern::Path { path, .. } => {
            paths.insert(PathExpr::from(path));
        }
        GraphPattern::Join { left, right }
        | GraphPattern::LeftJoin { left, right, .. }
        | GraphPattern::Union { left, right }
        | GraphPattern::Minus { left, right } => {
            collect_paths(left, paths);
            collect_paths(right, paths);
        }
        GraphPattern::Filter { inner, .. }
        | GraphPattern::Graph { inner, .. }
        | GraphPattern::Extend { inner, .. }
        | GraphPattern::OrderBy { inner, .. }
        | GraphPattern::Project { inner, .. }
        | GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::Group { inner, .. }
        | GraphPattern::Service { inner, .. } => collect_paths(inner, paths),
        _ => {}
    }
}
