//! Statement emission shared by every target.
//!
//! The tree is walked once per render. Within each sibling list the emitter
//! keeps a stack of open block headers, so a continuation (`ElseIf`, `Else`)
//! or closer (`EndFor`, `EndDoWhile`, ...) is rendered knowing its opener:
//! VBA's `Next i` needs the loop variable and a do-while footer needs the
//! condition. A loop stack tells `Break` which loop it leaves.
//!
//! Dialects only map one node to lines; indentation, empty-block filler and
//! `Sub` regions are handled here.

use std::collections::HashSet;

use crate::ast::{Builtin, Expr, ExprKind};
use crate::model::{StatementKind, StatementNode};
use crate::normalizer;
use crate::parser::Precedence;

use super::error::{CodeGenError, CodeGenErrorKind};
use super::syntax::{ExprPrinter, ExprSyntax, Printed};
use super::transliterate::IdentifierMap;
use super::RenderOptions;

/// One output line, indented relative to the node that produced it.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Line {
    pub depth: usize,
    pub text: String,
    pub comment: bool,
}

impl Line {
    pub fn new(text: impl Into<String>) -> Self {
        Self::nested(0, text)
    }

    pub fn nested(depth: usize, text: impl Into<String>) -> Self {
        Self {
            depth,
            text: text.into(),
            comment: false,
        }
    }

    pub fn comment(prefix: &str, text: &str) -> Self {
        Self {
            depth: 0,
            text: format!("{prefix} {text}"),
            comment: true,
        }
    }
}

/// Target-specific statement rendering.
pub(super) trait Dialect {
    fn syntax(&self) -> &'static ExprSyntax;

    /// Line comment prefix.
    fn comment_prefix(&self) -> &'static str;

    /// Statement to emit when a block would otherwise be empty.
    fn empty_block(&self, _kind: StatementKind) -> Option<&'static str> {
        None
    }

    /// Lines for one node, excluding its children.
    fn statement(
        &self,
        cx: &mut NodeContext<'_, '_>,
        node: &StatementNode,
    ) -> Result<Vec<Line>, CodeGenError>;
}

/// What a dialect can see while rendering one node.
pub(super) struct NodeContext<'c, 'i> {
    printer: &'c mut ExprPrinter<'i>,
    /// Header that this continuation or closer belongs to.
    pub opener: Option<&'c StatementNode>,
    /// Innermost loop around the node.
    pub enclosing_loop: Option<StatementKind>,
}

impl<'c> NodeContext<'c, '_> {
    pub fn name(&self, name: &str) -> String {
        self.printer.name(name.trim())
    }

    /// Parsed expression in slot `slot` of `node`.
    pub fn parsed(&self, node: &StatementNode, slot: usize) -> Result<Expr, CodeGenError> {
        normalizer::prepare(node.token(slot)).map_err(|err| expression_error(node, err))
    }

    pub fn print(&mut self, expr: &Expr) -> Printed {
        self.printer.print_prec(expr)
    }

    /// Expression in slot `slot` of `node`, with its binding strength.
    pub fn expr(&mut self, node: &StatementNode, slot: usize) -> Result<Printed, CodeGenError> {
        let expr = self.parsed(node, slot)?;
        Ok(self.print(&expr))
    }

    pub fn text(&mut self, node: &StatementNode, slot: usize) -> Result<String, CodeGenError> {
        Ok(self.expr(node, slot)?.text)
    }

    /// A condition with one redundant outer pair of parentheses removed.
    pub fn condition(&mut self, node: &StatementNode, slot: usize) -> Result<String, CodeGenError> {
        let expr = self.parsed(node, slot)?;
        let inner = match &expr.kind {
            ExprKind::Grouped(inner) => inner.as_ref(),
            _ => &expr,
        };
        Ok(self.printer.print(inner))
    }

    /// Items of a comma-separated slot.
    pub fn list(&mut self, node: &StatementNode, slot: usize) -> Result<Vec<String>, CodeGenError> {
        let items =
            normalizer::prepare_list(node.token(slot)).map_err(|err| expression_error(node, err))?;
        Ok(items.iter().map(|item| self.printer.print(item)).collect())
    }

    /// Every token of an `Output` node.
    pub fn all(&mut self, node: &StatementNode) -> Result<Vec<String>, CodeGenError> {
        (0..node.tokens.len())
            .map(|slot| self.text(node, slot))
            .collect()
    }

    /// The opener, or an internal error when a closer has none.
    pub fn require_opener(&self, node: &StatementNode) -> Result<&'c StatementNode, CodeGenError> {
        self.opener.ok_or_else(|| {
            CodeGenError::internal(format!("`{}` without an opening line", node.kind))
                .with_node(&node.id)
        })
    }
}

fn expression_error(node: &StatementNode, err: crate::parser::ExprError) -> CodeGenError {
    CodeGenError::new(CodeGenErrorKind::Expression(err))
        .with_node(&node.id)
        .with_context(format!("in `{}`", node.kind))
}

/// Walks statement lists and collects the rendered lines.
pub(super) struct Emitter<'d, 'i, D: Dialect> {
    dialect: &'d D,
    printer: ExprPrinter<'i>,
    unit: String,
    /// Current indentation level.
    pub indent: usize,
    loop_stack: Vec<StatementKind>,
    output: String,
    code_lines: usize,
}

impl<'d, 'i, D: Dialect> Emitter<'d, 'i, D> {
    pub fn new(dialect: &'d D, options: &RenderOptions, idents: Option<&'i IdentifierMap>) -> Self {
        Self {
            dialect,
            printer: ExprPrinter::new(dialect.syntax(), idents),
            unit: " ".repeat(options.indent_width),
            indent: 0,
            loop_stack: Vec::new(),
            output: String::new(),
            code_lines: 0,
        }
    }

    /// Writes a line at the current indentation.
    pub fn line(&mut self, text: &str) {
        self.push(&Line::new(text));
    }

    fn push(&mut self, line: &Line) {
        if !line.text.is_empty() {
            for _ in 0..self.indent + line.depth {
                self.output.push_str(&self.unit);
            }
            self.output.push_str(&line.text);
        }
        self.output.push('\n');
        if !line.comment {
            self.code_lines += 1;
        }
    }

    pub fn emit_block(&mut self, nodes: &[StatementNode]) -> Result<(), CodeGenError> {
        let dialect = self.dialect;
        let mut openers: Vec<&StatementNode> = Vec::new();

        for node in nodes {
            let opener = match node.kind {
                StatementKind::ElseIf | StatementKind::Else => openers.last().copied(),
                kind if kind.closes_block() => openers.pop(),
                _ => None,
            };
            let mut cx = NodeContext {
                printer: &mut self.printer,
                opener,
                enclosing_loop: self.loop_stack.last().copied(),
            };
            for line in dialect.statement(&mut cx, node)? {
                self.push(&line);
            }

            if node.kind.opens_block() {
                openers.push(node);
            }
            if node.kind.is_scoping() {
                self.emit_children(node)?;
            }
        }
        Ok(())
    }

    fn emit_children(&mut self, node: &StatementNode) -> Result<(), CodeGenError> {
        // A `Sub` only labels its region; its children stay at its depth.
        let nested = node.kind != StatementKind::Sub;
        if nested {
            self.indent += 1;
        }
        if node.kind.is_loop() {
            self.loop_stack.push(node.kind);
        }

        let before = self.code_lines;
        self.emit_block(&node.children)?;
        if nested
            && self.code_lines == before
            && let Some(filler) = self.dialect.empty_block(node.kind)
        {
            self.line(filler);
        }

        if node.kind.is_loop() {
            self.loop_stack.pop();
        }
        if nested {
            self.indent -= 1;
        }
        Ok(())
    }

    /// Built-ins the rendered expressions used.
    pub fn used_builtins(&self) -> &HashSet<Builtin> {
        &self.printer.used
    }

    pub fn finish(self) -> String {
        self.output
    }
}

/// Renders a whole statement list with no surrounding structure.
pub(super) fn emit_program<D: Dialect>(
    dialect: &D,
    nodes: &[StatementNode],
    options: &RenderOptions,
    idents: Option<&IdentifierMap>,
) -> Result<(String, HashSet<Builtin>), CodeGenError> {
    let mut emitter = Emitter::new(dialect, options, idents);
    emitter.emit_block(nodes)?;
    let used = emitter.used_builtins().clone();
    Ok((emitter.finish(), used))
}

/// Comment line opening or closing a `Sub` region.
pub(super) fn sub_marker(
    cx: &NodeContext<'_, '_>,
    node: &StatementNode,
    prefix: &str,
) -> Result<Vec<Line>, CodeGenError> {
    let text = match node.kind {
        StatementKind::Sub => format!("begin: {}", node.token(0).trim()),
        _ => format!("end: {}", cx.require_opener(node)?.token(0).trim()),
    };
    Ok(vec![Line::comment(prefix, &text)])
}

/// True when a loop step is the literal `1`.
pub(super) fn is_unit_step(step: &Printed) -> bool {
    step.text == "1"
}

/// A descending loop's step as a negative amount.
pub(super) fn negated(step: &Printed) -> String {
    match step.text.parse::<i64>() {
        Ok(value) => (-value).to_string(),
        Err(_) => format!("-{}", step.tighter_than(Precedence::Unary)),
    }
}
