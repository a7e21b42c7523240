//! Expression AST nodes.
//!
//! Type positions share the expression grammar: a field type is an
//! expression like `foo.Bar`, `List<Int>?` or `String(size(1..10))`. Literal
//! values, ranges, objects, arrays and wildcards are legal expressions but
//! only meaningful inside constraints and transport configuration.

use std::fmt;

use tether_core::{Literal, NodeId, NodeRef, Span};

/// An identifier with its own node identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

/// A key/value pair of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: Ident,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `Foo`
    Identifier(String),
    /// `base.name`
    Member { base: Box<Expr>, name: Ident },
    /// `base<args>`
    Generic { base: Box<Expr>, args: Vec<Expr> },
    /// `inner?`
    Optional(Box<Expr>),
    /// `callee(args)`: a constraint call, or a type with constraints.
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// String, number or boolean literal.
    Literal(Literal),
    /// `lower..upper`
    Range { lower: Box<Expr>, upper: Box<Expr> },
    /// `*`
    Wildcard,
    /// `{ key: value, ... }`
    Object(Vec<ObjectEntry>),
    /// `[a, b, ...]`
    Array(Vec<Expr>),
}

/// One segment of a dotted path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment<'a> {
    pub name: &'a str,
    pub node: NodeRef,
}

impl Expr {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }

    /// The segments of an identifier or dotted path, outermost first.
    ///
    /// Returns `None` for any other expression shape.
    pub fn path_segments(&self) -> Option<Vec<PathSegment<'_>>> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(vec![PathSegment {
                name,
                node: self.node(),
            }]),
            ExprKind::Member { base, name } => {
                let mut segments = base.path_segments()?;
                segments.push(PathSegment {
                    name: &name.name,
                    node: name.node(),
                });
                Some(segments)
            }
            _ => None,
        }
    }

    /// The name of a plain identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExprKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind, ExprKind::Wildcard)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Identifier(name) => f.write_str(name),
            ExprKind::Member { base, name } => write!(f, "{base}.{name}"),
            ExprKind::Generic { base, args } => {
                write!(f, "{base}<")?;
                write_list(f, args)?;
                write!(f, ">")
            }
            ExprKind::Optional(inner) => write!(f, "{inner}?"),
            ExprKind::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::Literal(literal) => write!(f, "{literal}"),
            ExprKind::Range { lower, upper } => write!(f, "{lower}..{upper}"),
            ExprKind::Wildcard => f.write_str("*"),
            ExprKind::Object(entries) => {
                write!(f, "{{ ")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", entry.key, entry.value)?;
                }
                write!(f, " }}")
            }
            ExprKind::Array(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::FileBuilder;
    use tether_core::FileId;

    #[test]
    fn display_renders_source_form() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let expr = b.optional(b.map(b.ident("String"), b.list(b.path(&["foo", "Bar"]))));
        assert_eq!(expr.to_string(), "Map<String, List<foo.Bar>>?");

        let constrained = b.call(
            b.ident("String"),
            vec![b.constraint("size", vec![b.range(b.int(1), b.wildcard())])],
        );
        assert_eq!(constrained.to_string(), "String(size(1..*))");
    }

    #[test]
    fn path_segments_of_dotted_path() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let expr = b.path(&["foo", "bar", "Baz"]);
        let names: Vec<&str> = expr
            .path_segments()
            .unwrap()
            .iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["foo", "bar", "Baz"]);
    }

    #[test]
    fn path_segments_reject_other_shapes() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        assert!(b.list(b.ident("Int")).path_segments().is_none());
        assert!(b.int(3).path_segments().is_none());
    }
}
