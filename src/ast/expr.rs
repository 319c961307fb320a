//! Expression AST nodes.
//!
//! Expressions are the operand fragments inside statement token slots:
//! literals, variables, array elements, operators, built-in functions and
//! user-defined function calls.
//!
//! # Expression Precedence
//!
//! From highest to lowest (as implemented in the parser):
//!
//! 1. Primary: literals, identifiers, calls, `a[i]`, parenthesized expressions
//! 2. Power: `**` (right-associative)
//! 3. Unary: `-x`, `!x`
//! 4. Multiplicative: `*`, `/`, `//`, `%`
//! 5. Additive: `+`, `-`
//! 6. Comparison: `==`, `!=`, `<`, `>`, `<=`, `>=`
//! 7. Logical AND: `&&`
//! 8. Logical OR: `||`

use super::Span;

/// An expression with its location in the fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// The kind of expression.
    pub kind: ExprKind,
    /// Byte range in the normalized fragment.
    pub span: Span,
}

impl Expr {
    /// Creates a new expression with the given kind and span.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Visits this expression and every sub-expression in pre-order.
    pub fn walk(&self, visit: &mut impl FnMut(&Expr)) {
        visit(self);
        match &self.kind {
            ExprKind::Number(_)
            | ExprKind::StringLiteral(_)
            | ExprKind::Bool(_)
            | ExprKind::Identifier(_) => {}
            ExprKind::Index { base, index } => {
                base.walk(visit);
                index.walk(visit);
            }
            ExprKind::Call { args, .. } | ExprKind::Builtin { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            ExprKind::Unary { operand, .. } => operand.walk(visit),
            ExprKind::Binary { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            ExprKind::Grouped(inner) => inner.walk(visit),
        }
    }

    /// Numeric value of a literal, looking through grouping and negation.
    pub fn literal_number(&self) -> Option<f64> {
        match &self.kind {
            ExprKind::Number(text) => text.parse().ok(),
            ExprKind::Grouped(inner) => inner.literal_number(),
            ExprKind::Unary {
                op: UnaryOp::Negate,
                operand,
            } => operand.literal_number().map(|n| -n),
            _ => None,
        }
    }

    /// Integer value of a literal written without a fractional part,
    /// looking through grouping and negation.
    pub fn literal_integer(&self) -> Option<i64> {
        match &self.kind {
            ExprKind::Number(text) => text.parse().ok(),
            ExprKind::Grouped(inner) => inner.literal_integer(),
            ExprKind::Unary {
                op: UnaryOp::Negate,
                operand,
            } => operand.literal_integer().map(|n| -n),
            _ => None,
        }
    }

    /// A numeric literal such as `0.5` or `2.0`.
    pub fn is_fractional_literal(&self) -> bool {
        self.literal_number().is_some() && self.literal_integer().is_none()
    }

    /// Returns true for expressions that never need wrapping parentheses.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Number(_)
                | ExprKind::StringLiteral(_)
                | ExprKind::Bool(_)
                | ExprKind::Identifier(_)
                | ExprKind::Index { .. }
                | ExprKind::Call { .. }
                | ExprKind::Grouped(_)
        )
    }

    /// If this is a plain variable or array element, the variable name.
    pub fn assignable_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            ExprKind::Index { base, .. } => base.assignable_name(),
            _ => None,
        }
    }
}

/// The different kinds of expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Number literal, kept as written: `42`, `3.14`
    Number(String),

    /// String literal contents (without quotes)
    StringLiteral(String),

    /// `true` / `false`
    Bool(bool),

    /// Variable or constant reference
    Identifier(String),

    /// Array element: `scores[i]`
    Index { base: Box<Expr>, index: Box<Expr> },

    /// Function call. `user_defined` is set when the call carried the
    /// `UserDefined:` marker.
    Call {
        name: String,
        args: Vec<Expr>,
        user_defined: bool,
    },

    /// Call of a built-in function
    Builtin { func: Builtin, args: Vec<Expr> },

    /// Unary operation: `-x`, `!flag`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation: `left op right`
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Parenthesized expression, preserved for faithful re-rendering
    Grouped(Box<Expr>),
}

/// Built-in functions of the pseudocode vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `Square(x)` = x * x
    Square,
    /// `Exponentiation(a, b)` = a to the power b
    Exponentiation,
    /// `Random(m, n)` = random integer in `m..=n`
    Random,
    /// `Odd(x)` = x is odd
    Odd,
    /// `Binary(x)` = base-2 string of x
    Binary,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Square,
        Builtin::Exponentiation,
        Builtin::Random,
        Builtin::Odd,
        Builtin::Binary,
    ];

    /// Looks up a built-in by its pseudocode name.
    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Square => "Square",
            Builtin::Exponentiation => "Exponentiation",
            Builtin::Random => "Random",
            Builtin::Odd => "Odd",
            Builtin::Binary => "Binary",
        }
    }

    /// Number of arguments the built-in takes.
    pub fn arity(self) -> usize {
        match self {
            Builtin::Exponentiation | Builtin::Random => 2,
            Builtin::Square | Builtin::Odd | Builtin::Binary => 1,
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `**`
    Power,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `//` - flooring division
    FloorDivide,
    /// `%` - remainder
    Modulo,
    /// `+` - addition and string concatenation
    Add,
    /// `-`
    Subtract,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEqual,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// Returns true if this operator is right-associative.
    pub fn is_right_associative(self) -> bool {
        matches!(self, BinaryOp::Power)
    }

    /// Returns true for comparison operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterEqual
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Negate,
    /// `!`
    Not,
}
