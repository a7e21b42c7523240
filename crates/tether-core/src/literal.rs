//! Literal values shared by the AST and constraint model.

use std::fmt;

use ordered_float::OrderedFloat;

/// A numeric literal.
///
/// Whole numbers keep their integer representation so `size(...)` bounds
/// can tell `3` apart from `3.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Number {
    /// A whole number literal.
    Integer(i64),
    /// A literal with a fractional part or exponent.
    Float(OrderedFloat<f64>),
}

impl Number {
    /// Create a float literal.
    pub fn float(value: f64) -> Self {
        Number::Float(OrderedFloat(value))
    }

    /// Numeric value as `f64`, for bound comparisons.
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(value) => *value as f64,
            Number::Float(value) => value.into_inner(),
        }
    }

    /// The value as a non-negative whole number, if it is one.
    pub fn as_whole(&self) -> Option<u64> {
        match self {
            Number::Integer(value) => u64::try_from(*value).ok(),
            Number::Float(_) => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(value) => write!(f, "{value}"),
            Number::Float(value) => write!(f, "{}", value.into_inner()),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::float(value)
    }
}

/// A scalar literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Number(Number),
    Boolean(bool),
}

impl Literal {
    /// Human-readable kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Number(_) => "number",
            Literal::Boolean(_) => "boolean",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(value) => write!(f, "\"{value}\""),
            Literal::Number(value) => write!(f, "{value}"),
            Literal::Boolean(value) => write!(f, "{value}"),
        }
    }
}
