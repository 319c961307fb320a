//! Expression parsing using Pratt (precedence climbing) parsing.
//!
//! Handles:
//! - Binary operators with correct precedence and associativity
//! - Unary operators (negation, logical not)
//! - Parenthesized expressions
//! - Built-in calls, user-defined calls and array indexing

use crate::ast::{BinaryOp, Builtin, Expr, ExprKind, Span, UnaryOp};
use crate::lexer::TokenKind;

use super::{ExprError, Parser, Precedence};

impl<'a> Parser<'a> {
    /// Parses an expression.
    pub fn parse_expression(&mut self) -> Result<Expr, ExprError> {
        self.parse_expr_precedence(Precedence::Lowest)
    }

    /// Parses an expression with the given minimum precedence.
    pub(super) fn parse_expr_precedence(&mut self, min_prec: Precedence) -> Result<Expr, ExprError> {
        let mut left = self.parse_prefix()?;

        while let Some(kind) = self.peek_kind() {
            let op_prec = Self::get_precedence(kind);
            if op_prec <= min_prec {
                break;
            }
            left = self.parse_infix(left, op_prec)?;
        }

        Ok(left)
    }

    /// Parses a prefix expression (literal, name, unary op, or group).
    fn parse_prefix(&mut self) -> Result<Expr, ExprError> {
        let Some(token) = self.advance() else {
            return Err(ExprError::eof("a value"));
        };
        let span: Span = token.span.clone().into();

        match token.kind {
            TokenKind::Number => Ok(Expr::new(ExprKind::Number(token.text.clone()), span)),
            TokenKind::StringLiteral => {
                let inner = unescape(&token.text[1..token.text.len() - 1]);
                Ok(Expr::new(ExprKind::StringLiteral(inner), span))
            }
            TokenKind::UnterminatedString => Err(ExprError::UnterminatedString {
                offset: span.start,
            }),
            TokenKind::True => Ok(Expr::new(ExprKind::Bool(true), span)),
            TokenKind::False => Ok(Expr::new(ExprKind::Bool(false), span)),
            TokenKind::Identifier => self.parse_name(token.text.clone(), span),
            TokenKind::UserDefinedMarker => {
                let name = self.expect(TokenKind::Identifier)?;
                let name_text = name.text.clone();
                let args = self.parse_call_args()?;
                let span = Span::new(span.start, self.previous_end());
                Ok(Expr::new(
                    ExprKind::Call {
                        name: name_text,
                        args,
                        user_defined: true,
                    },
                    span,
                ))
            }
            TokenKind::LeftParen => {
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RightParen)?;
                let span = Span::new(span.start, self.previous_end());
                Ok(Expr::new(ExprKind::Grouped(Box::new(inner)), span))
            }
            TokenKind::Minus => self.parse_unary(UnaryOp::Negate, span),
            TokenKind::Not => self.parse_unary(UnaryOp::Not, span),
            other => Err(ExprError::unexpected(
                &token.text,
                if other == TokenKind::RightParen {
                    "a value before `)`".to_string()
                } else {
                    "a value".to_string()
                },
                span.start,
            )),
        }
    }

    /// Parses what follows an identifier: a call, indexing, or nothing.
    fn parse_name(&mut self, name: String, span: Span) -> Result<Expr, ExprError> {
        let mut expr = if self.check(TokenKind::LeftParen) {
            let args = self.parse_call_args()?;
            let span = Span::new(span.start, self.previous_end());
            match Builtin::from_name(&name) {
                Some(func) => {
                    Self::check_builtin(func, &args)?;
                    Expr::new(ExprKind::Builtin { func, args }, span)
                }
                None => Expr::new(
                    ExprKind::Call {
                        name,
                        args,
                        user_defined: false,
                    },
                    span,
                ),
            }
        } else {
            Expr::new(ExprKind::Identifier(name), span)
        };

        while self.match_token(TokenKind::LeftBracket) {
            let index = self.parse_expression()?;
            self.expect(TokenKind::RightBracket)?;
            let span = Span::new(expr.span.start, self.previous_end());
            expr = Expr::new(
                ExprKind::Index {
                    base: Box::new(expr),
                    index: Box::new(index),
                },
                span,
            );
        }

        Ok(expr)
    }

    /// Parses `( arg, ... )`.
    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ExprError> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = Vec::new();
        if self.match_token(TokenKind::RightParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(args)
    }

    /// Validates arity and, for `Random`, literal argument order.
    fn check_builtin(func: Builtin, args: &[Expr]) -> Result<(), ExprError> {
        if args.len() != func.arity() {
            return Err(ExprError::BuiltinArity {
                name: func.name(),
                expected: func.arity(),
                found: args.len(),
            });
        }
        if func == Builtin::Random
            && let (Some(min), Some(max)) = (args[0].literal_number(), args[1].literal_number())
            && min > max
        {
            return Err(ExprError::RandomRange {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(())
    }

    /// Parses a unary expression.
    fn parse_unary(&mut self, op: UnaryOp, start: Span) -> Result<Expr, ExprError> {
        let operand = self.parse_expr_precedence(Precedence::Unary)?;
        let span = start.merge(&operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// Parses an infix expression (binary operation).
    fn parse_infix(&mut self, left: Expr, precedence: Precedence) -> Result<Expr, ExprError> {
        let Some(op_token) = self.advance() else {
            return Err(ExprError::eof("an operator"));
        };
        let Some(op) = Self::token_to_binary_op(op_token.kind) else {
            return Err(ExprError::unexpected(
                &op_token.text,
                "an operator",
                op_token.span.start,
            ));
        };

        // For right-associative operators, use lower precedence for right side
        let right_prec = if op.is_right_associative() {
            Precedence::from_u8(precedence as u8 - 1)
        } else {
            precedence
        };

        let right = self.parse_expr_precedence(right_prec)?;
        let span = left.span.merge(&right.span);

        Ok(Expr::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        ))
    }

    /// Gets the precedence of a token as an infix operator.
    pub(crate) fn get_precedence(kind: TokenKind) -> Precedence {
        match Self::token_to_binary_op(kind) {
            Some(op) => binary_precedence(op),
            None => Precedence::Lowest,
        }
    }

    /// Converts a token kind to a binary operator.
    fn token_to_binary_op(kind: TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Subtract,
            TokenKind::Star => BinaryOp::Multiply,
            TokenKind::StarStar => BinaryOp::Power,
            TokenKind::Slash => BinaryOp::Divide,
            TokenKind::SlashSlash => BinaryOp::FloorDivide,
            TokenKind::Percent => BinaryOp::Modulo,
            TokenKind::Equal => BinaryOp::Equal,
            TokenKind::NotEqual => BinaryOp::NotEqual,
            TokenKind::Less => BinaryOp::LessThan,
            TokenKind::LessEqual => BinaryOp::LessEqual,
            TokenKind::Greater => BinaryOp::GreaterThan,
            TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }
}

/// Precedence of a binary operator.
pub fn binary_precedence(op: BinaryOp) -> Precedence {
    match op {
        BinaryOp::Or => Precedence::Or,
        BinaryOp::And => Precedence::And,
        BinaryOp::Equal
        | BinaryOp::NotEqual
        | BinaryOp::LessThan
        | BinaryOp::LessEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterEqual => Precedence::Comparison,
        BinaryOp::Add | BinaryOp::Subtract => Precedence::Additive,
        BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::FloorDivide | BinaryOp::Modulo => {
            Precedence::Multiplicative
        }
        BinaryOp::Power => Precedence::Power,
    }
}

/// Contents of a string literal with `\x` escapes resolved.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.extend(chars.next()),
            _ => out.push(ch),
        }
    }
    out
}

