//! Expression printing.
//!
//! One [`ExprSyntax`] table per target describes its operators, literals and
//! built-in rewrites; a single precedence-aware printer walks an [`Expr`]
//! with that table. Parentheses the user wrote survive as
//! [`ExprKind::Grouped`]; the printer adds its own only where a rewrite
//! produces text that binds looser than its surroundings (`Odd(x)` becomes a
//! comparison, JavaScript's `Random` becomes an addition).

use std::collections::HashSet;

use crate::ast::{BinaryOp, Builtin, Expr, ExprKind, UnaryOp};
use crate::parser::{Precedence, binary_precedence};

use super::transliterate::IdentifierMap;

/// Printed expression text and how tightly it binds.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Printed {
    pub text: String,
    pub prec: Precedence,
}

impl Printed {
    pub fn new(text: impl Into<String>, prec: Precedence) -> Self {
        Self {
            text: text.into(),
            prec,
        }
    }

    pub fn primary(text: impl Into<String>) -> Self {
        Self::new(text, Precedence::Primary)
    }

    /// Text safe to use where only an atom is allowed.
    pub fn atom(&self) -> String {
        self.at_least(Precedence::Primary)
    }

    /// Text wrapped in parentheses unless it binds at least as tightly as `min`.
    pub fn at_least(&self, min: Precedence) -> String {
        if self.prec >= min {
            self.text.clone()
        } else {
            format!("({})", self.text)
        }
    }

    /// Text wrapped unless it binds strictly tighter than `than`.
    pub fn tighter_than(&self, than: Precedence) -> String {
        if self.prec > than {
            self.text.clone()
        } else {
            format!("({})", self.text)
        }
    }
}

/// How a target spells flooring division.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FloorDivide {
    /// A native operator such as `//` or `\`.
    Operator(&'static str),
    /// `prefix` + `a / b` + `suffix`, e.g. `Math.floor(a / b)`.
    Wrapped {
        prefix: &'static str,
        suffix: &'static str,
    },
}

/// Operator and built-in table for one target.
#[derive(Debug)]
pub(crate) struct ExprSyntax {
    pub power: &'static str,
    /// True when a prefix operator may not apply directly to a power
    /// (JavaScript rejects `-a ** 2`).
    pub unary_wraps_power: bool,
    pub modulo: &'static str,
    pub equal: &'static str,
    pub not_equal: &'static str,
    pub and: &'static str,
    pub or: &'static str,
    /// Prefix for logical negation, including any trailing space.
    pub not: &'static str,
    /// True when the negation keyword binds looser than comparisons.
    pub word_not: bool,
    pub true_literal: &'static str,
    pub false_literal: &'static str,
    pub floor_divide: FloorDivide,
    /// Delimiters around an array index.
    pub index: (&'static str, &'static str),
    /// `Random(m, n)` rewrite.
    pub random: fn(&Printed, &Printed) -> Printed,
    /// `Binary(x)` rewrite.
    pub binary: fn(&Printed) -> Printed,
    /// String literal contents as the target must spell them.
    pub escape: fn(&str) -> String,
}

impl ExprSyntax {
    fn operator(&self, op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::Power => self.power,
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::FloorDivide => match self.floor_divide {
                FloorDivide::Operator(op) => op,
                FloorDivide::Wrapped { .. } => "/",
            },
            BinaryOp::Modulo => self.modulo,
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Equal => self.equal,
            BinaryOp::NotEqual => self.not_equal,
            BinaryOp::LessThan => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => self.and,
            BinaryOp::Or => self.or,
        }
    }
}

/// Prints expressions in one target's syntax.
pub(crate) struct ExprPrinter<'a> {
    syntax: &'static ExprSyntax,
    idents: Option<&'a IdentifierMap>,
    /// Built-ins printed so far (drives prologues such as `import random`).
    pub used: HashSet<Builtin>,
}

impl<'a> ExprPrinter<'a> {
    pub fn new(syntax: &'static ExprSyntax, idents: Option<&'a IdentifierMap>) -> Self {
        Self {
            syntax,
            idents,
            used: HashSet::new(),
        }
    }

    /// A user-visible name, transliterated when the target needs it.
    pub fn name(&self, name: &str) -> String {
        let Some(map) = self.idents else {
            return name.to_string();
        };
        name.split('.')
            .map(|segment| map.get(segment).unwrap_or(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn print(&mut self, expr: &Expr) -> String {
        self.print_prec(expr).text
    }

    pub fn print_prec(&mut self, expr: &Expr) -> Printed {
        match &expr.kind {
            ExprKind::Number(text) => Printed::primary(text.clone()),
            ExprKind::StringLiteral(text) => {
                Printed::primary(format!("\"{}\"", (self.syntax.escape)(text)))
            }
            ExprKind::Bool(true) => Printed::primary(self.syntax.true_literal),
            ExprKind::Bool(false) => Printed::primary(self.syntax.false_literal),
            ExprKind::Identifier(name) => Printed::primary(self.name(name)),
            ExprKind::Index { base, index } => {
                let base = self.print_prec(base).atom();
                let index = self.print(index);
                let (open, close) = self.syntax.index;
                Printed::primary(format!("{base}{open}{index}{close}"))
            }
            ExprKind::Call { name, args, .. } => {
                let args = self.print_args(args);
                Printed::primary(format!("{}({args})", self.name(name)))
            }
            ExprKind::Builtin { func, args } => {
                self.used.insert(*func);
                let args: Vec<Printed> = args.iter().map(|a| self.print_prec(a)).collect();
                self.builtin(*func, &args)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.print_prec(operand);
                let bound = if self.syntax.unary_wraps_power {
                    Precedence::Power
                } else {
                    Precedence::Unary
                };
                match op {
                    UnaryOp::Negate => Printed::new(
                        format!("-{}", operand.tighter_than(bound)),
                        Precedence::Unary,
                    ),
                    UnaryOp::Not => {
                        let prec = if self.syntax.word_not {
                            Precedence::And
                        } else {
                            Precedence::Unary
                        };
                        let operand = if self.syntax.unary_wraps_power {
                            operand.tighter_than(bound)
                        } else {
                            operand.at_least(bound)
                        };
                        Printed::new(format!("{}{operand}", self.syntax.not), prec)
                    }
                }
            }
            ExprKind::Binary { left, op, right } => {
                let left = self.print_prec(left);
                let right = self.print_prec(right);
                self.binary(*op, &left, &right)
            }
            ExprKind::Grouped(inner) => {
                Printed::primary(format!("({})", self.print(inner)))
            }
        }
    }

    pub fn print_args(&mut self, args: &[Expr]) -> String {
        args.iter()
            .map(|a| self.print(a))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn binary(&self, op: BinaryOp, left: &Printed, right: &Printed) -> Printed {
        let prec = binary_precedence(op);
        // Comparisons never chain; Python reads `a < b < c` as a range test.
        let (l, r) = if op.is_comparison() {
            (left.tighter_than(prec), right.tighter_than(prec))
        } else if op.is_right_associative() {
            (left.tighter_than(prec), right.at_least(prec))
        } else {
            (left.at_least(prec), right.tighter_than(prec))
        };
        let text = format!("{l} {} {r}", self.syntax.operator(op));
        match (op, self.syntax.floor_divide) {
            (BinaryOp::FloorDivide, FloorDivide::Wrapped { prefix, suffix }) => {
                Printed::primary(format!("{prefix}{text}{suffix}"))
            }
            _ => Printed::new(text, prec),
        }
    }

    fn builtin(&self, func: Builtin, args: &[Printed]) -> Printed {
        let syntax = self.syntax;
        match (func, args) {
            (Builtin::Square, [x]) => {
                let x = x.atom();
                Printed::primary(format!("({x} * {x})"))
            }
            (Builtin::Exponentiation, [a, b]) => {
                Printed::primary(format!("({} {} {})", a.atom(), syntax.power, b.atom()))
            }
            (Builtin::Random, [m, n]) => (syntax.random)(m, n),
            (Builtin::Odd, [x]) => Printed::new(
                format!(
                    "{} {} 2 {} 0",
                    x.at_least(Precedence::Multiplicative),
                    syntax.modulo,
                    syntax.not_equal
                ),
                Precedence::Comparison,
            ),
            (Builtin::Binary, [x]) => (syntax.binary)(x),
            // Arity is checked by the parser; print a plain call otherwise.
            _ => Printed::primary(format!(
                "{}({})",
                func.name(),
                args.iter()
                    .map(|a| a.text.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Backslash escapes for C-family string literals.
pub(crate) fn backslash_escaped(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `n - m + 1` as the size of an inclusive range, for the JS and VBA rewrites.
pub(crate) fn range_size(m: &Printed, n: &Printed) -> String {
    format!(
        "{} - {} + 1",
        n.at_least(Precedence::Additive),
        m.tighter_than(Precedence::Additive)
    )
}

pub(crate) fn random_tail(m: &Printed) -> String {
    m.tighter_than(Precedence::Additive)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::codegen::Target;
    use crate::normalizer::prepare;

    pub(crate) fn print(target: Target, fragment: &str) -> String {
        let expr = prepare(fragment).unwrap();
        ExprPrinter::new(target.syntax(), None).print(&expr)
    }

    #[test]
    fn test_builtin_rewrites() {
        assert_eq!(print(Target::JavaScript, "Square(5)"), "(5 * 5)");
        assert_eq!(print(Target::JavaScript, "Exponentiation(2, 3)"), "(2 ** 3)");
        assert_eq!(print(Target::Vba, "Exponentiation(2, 3)"), "(2 ^ 3)");
        assert_eq!(print(Target::Python, "Odd(b)"), "b % 2 != 0");
        assert_eq!(print(Target::Vba, "Odd(b)"), "b Mod 2 <> 0");
    }

    #[test]
    fn test_square_wraps_compound_argument() {
        assert_eq!(print(Target::Python, "Square(a + 1)"), "((a + 1) * (a + 1))");
        assert_eq!(print(Target::Python, "Square((a + 1))"), "((a + 1) * (a + 1))");
    }

    #[test]
    fn test_rewrites_inside_larger_expressions() {
        assert_eq!(print(Target::JavaScript, "Odd(n) && n > 3"), "n % 2 !== 0 && n > 3");
        assert_eq!(print(Target::Python, "Odd(n) == false"), "(n % 2 != 0) == False");
        assert_eq!(
            print(Target::JavaScript, "10 - Random(1, 6)"),
            "10 - (Math.floor(Math.random() * (6 - 1 + 1)) + 1)"
        );
    }

    #[test]
    fn test_random_per_target() {
        assert_eq!(
            print(Target::JavaScript, "Random(1, n)"),
            "Math.floor(Math.random() * (n - 1 + 1)) + 1"
        );
        assert_eq!(print(Target::Python, "Random(1, n)"), "random.randint(1, n)");
        assert_eq!(
            print(Target::Vba, "Random(1, n)"),
            "Int(Rnd() * (n - 1 + 1)) + 1"
        );
        assert_eq!(print(Target::Ruby, "Random(1, n)"), "rand(1..n)");
    }

    #[test]
    fn test_binary_per_target() {
        assert_eq!(print(Target::JavaScript, "Binary(x)"), "Number(x).toString(2)");
        assert_eq!(print(Target::Python, "Binary(x)"), "format(x, \"b\")");
        assert_eq!(print(Target::Vba, "Binary(x)"), "WorksheetFunction.Dec2Bin(x)");
        assert_eq!(print(Target::Ruby, "Binary(x + 1)"), "(x + 1).to_s(2)");
    }

    #[test]
    fn test_operators_per_target() {
        assert_eq!(print(Target::JavaScript, "a = b"), "a === b");
        assert_eq!(print(Target::Vba, "a != b かつ c"), "a <> b And c");
        assert_eq!(print(Target::Python, "!a || b"), "not a or b");
        assert_eq!(print(Target::Python, "a ÷ b"), "a // b");
        assert_eq!(print(Target::JavaScript, "a ÷ b"), "Math.floor(a / b)");
        assert_eq!(print(Target::Vba, "a ÷ b"), "a \\ b");
        assert_eq!(print(Target::Ruby, "a ÷ b"), "(a / b).floor");
    }

    #[test]
    fn test_word_not_binds_loosely() {
        assert_eq!(print(Target::Python, "!a == b"), "(not a) == b");
        assert_eq!(print(Target::JavaScript, "!a == b"), "!a === b");
    }

    #[test]
    fn test_prefix_operator_before_power() {
        assert_eq!(print(Target::JavaScript, "-a ** 2"), "-(a ** 2)");
        assert_eq!(print(Target::JavaScript, "!a ** 2"), "!(a ** 2)");
        assert_eq!(print(Target::JavaScript, "-a * 2"), "-a * 2");
        assert_eq!(print(Target::Python, "-a ** 2"), "-a ** 2");
        assert_eq!(print(Target::Ruby, "-a ** 2"), "-a ** 2");
        assert_eq!(print(Target::Vba, "-a ** 2"), "-a ^ 2");
    }

    #[test]
    fn test_string_escapes_per_target() {
        let quoted = r#""say \"hi\"""#;
        assert_eq!(print(Target::JavaScript, quoted), r#""say \"hi\"""#);
        assert_eq!(print(Target::Python, quoted), r#""say \"hi\"""#);
        assert_eq!(print(Target::Vba, quoted), r#""say ""hi""""#);
        assert_eq!(print(Target::Ruby, r##""#{x}""##), r##""\#{x}""##);
        assert_eq!(print(Target::Python, r#""a\\b""#), r#""a\\b""#);
        assert_eq!(print(Target::Vba, r#""a\\b""#), r#""a\b""#);
    }

    #[test]
    fn test_user_defined_marker_stripped() {
        assert_eq!(print(Target::Ruby, "UserDefined:twice(a, 2)"), "twice(a, 2)");
    }

    #[test]
    fn test_index_delimiters() {
        assert_eq!(print(Target::JavaScript, "a[i + 1]"), "a[i + 1]");
        assert_eq!(print(Target::Vba, "a[i + 1]"), "a(i + 1)");
    }

    #[test]
    fn test_printing_is_stable_for_javascript() {
        for fragment in ["Square(5)", "(a + b) * c", "!(x > 1) && y", "a[i] - 1"] {
            let once = print(Target::JavaScript, fragment);
            assert_eq!(print(Target::JavaScript, &once), once, "{fragment}");
        }
    }
}
