//! Python backend.
//!
//! Python has no post-tested loop, so a do-while becomes `while True:` with
//! the negated condition checked at the end of the body. The vocabulary has
//! no `continue`, so every pass through the body reaches that check and the
//! lowering is exact. Empty blocks get `pass`.

use crate::ast::{Builtin, Expr};
use crate::model::{Program, StatementKind, StatementNode};
use crate::parser::Precedence;

use super::emitter::{Dialect, Line, NodeContext, emit_program, is_unit_step, negated, sub_marker};
use super::error::CodeGenError;
use super::syntax::{ExprSyntax, FloorDivide, Printed, backslash_escaped};
use super::transliterate::IdentifierMap;
use super::{CodeGenerator, GeneratedOutput, RenderOptions, Target};

pub(super) static SYNTAX: ExprSyntax = ExprSyntax {
    power: "**",
    unary_wraps_power: false,
    modulo: "%",
    equal: "==",
    not_equal: "!=",
    and: "and",
    or: "or",
    not: "not ",
    word_not: true,
    true_literal: "True",
    false_literal: "False",
    floor_divide: FloorDivide::Operator("//"),
    index: ("[", "]"),
    random,
    binary,
    escape: backslash_escaped,
};

fn random(m: &Printed, n: &Printed) -> Printed {
    Printed::primary(format!("random.randint({}, {})", m.text, n.text))
}

fn binary(x: &Printed) -> Printed {
    Printed::primary(format!("format({}, \"b\")", x.text))
}

/// Renders programs as Python 3.
#[derive(Debug, Default, Clone, Copy)]
pub struct Python;

impl Python {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for Python {
    fn generate(
        &self,
        program: &Program,
        options: &RenderOptions,
        idents: Option<&IdentifierMap>,
    ) -> Result<GeneratedOutput, CodeGenError> {
        let (body, used) = emit_program(self, &program.statements, options, idents)?;
        let code = if used.contains(&Builtin::Random) {
            format!("import random\n\n{body}")
        } else {
            body
        };
        Ok(GeneratedOutput::new(Target::Python, code))
    }

    fn target(&self) -> Target {
        Target::Python
    }
}

impl Dialect for Python {
    fn syntax(&self) -> &'static ExprSyntax {
        &SYNTAX
    }

    fn comment_prefix(&self) -> &'static str {
        "#"
    }

    fn empty_block(&self, kind: StatementKind) -> Option<&'static str> {
        (kind != StatementKind::DoWhile).then_some("pass")
    }

    fn statement(
        &self,
        cx: &mut NodeContext<'_, '_>,
        node: &StatementNode,
    ) -> Result<Vec<Line>, CodeGenError> {
        use StatementKind::*;

        let line = match node.kind {
            Assign => format!("{} = {}", cx.text(node, 0)?, cx.text(node, 1)?),
            InitializeArray => {
                let items = cx.list(node, 1)?;
                format!("{} = [{}]", cx.text(node, 0)?, items.join(", "))
            }
            BulkAssignToArray => {
                let name = cx.text(node, 0)?;
                let value = cx.text(node, 1)?;
                format!("{name} = [{value}] * len({name})")
            }
            Increment => format!("{} += {}", cx.text(node, 0)?, cx.text(node, 1)?),
            Decrement => format!("{} -= {}", cx.text(node, 0)?, cx.text(node, 1)?),
            Output => format!("print({})", cx.all(node)?.join(", ")),
            If => format!("if {}:", cx.text(node, 0)?),
            ElseIf => format!("elif {}:", cx.text(node, 0)?),
            Else => "else:".to_string(),
            While => format!("while {}:", cx.text(node, 0)?),
            DoWhile => "while True:".to_string(),
            EndDoWhile => {
                let opener = cx.require_opener(node)?;
                let condition = cx.expr(opener, 0)?;
                return Ok(vec![
                    Line::nested(1, format!("if not {}:", condition.atom())),
                    Line::nested(2, "break"),
                ]);
            }
            ForIncrement | ForDecrement => return for_header(cx, node),
            EndFor => return for_footer(cx, node),
            EndIf | EndWhile | Defined => return Ok(Vec::new()),
            DefineFunction => {
                let params = cx.list(node, 1)?;
                format!("def {}({}):", cx.name(node.token(0)), params.join(", "))
            }
            CallUserFunction => {
                let args = cx.list(node, 1)?;
                format!("{}({})", cx.name(node.token(0)), args.join(", "))
            }
            Break => "break".to_string(),
            Sub | EndSub => return sub_marker(cx, node, self.comment_prefix()),
        };
        Ok(vec![Line::new(line)])
    }
}

/// `range` bounds are exclusive, so the end moves one step past the last value.
///
/// `range` only counts in integers; a loop with a fractional literal bound or
/// step becomes a `while` loop whose footer advances the variable.
fn for_header(
    cx: &mut NodeContext<'_, '_>,
    node: &StatementNode,
) -> Result<Vec<Line>, CodeGenError> {
    let var = cx.text(node, 0)?;
    let start = cx.text(node, 1)?;
    let end_expr = cx.parsed(node, 2)?;
    let end = cx.print(&end_expr);
    let step = cx.expr(node, 3)?;
    let ascending = node.kind == StatementKind::ForIncrement;

    if counts_fractionally(cx, node)? {
        let cmp = if ascending { "<=" } else { ">=" };
        return Ok(vec![
            Line::new(format!("{var} = {start}")),
            Line::new(format!(
                "while {var} {cmp} {}:",
                end.tighter_than(Precedence::Comparison)
            )),
        ]);
    }

    let stop = shift(&end_expr, &end, if ascending { 1 } else { -1 });
    let args = match (ascending, is_unit_step(&step)) {
        (true, true) => format!("{start}, {stop}"),
        (true, false) => format!("{start}, {stop}, {}", step.text),
        (false, _) => format!("{start}, {stop}, {}", negated(&step)),
    };
    Ok(vec![Line::new(format!("for {var} in range({args}):"))])
}

/// The step at the end of a `while`-lowered loop body.
fn for_footer(
    cx: &mut NodeContext<'_, '_>,
    node: &StatementNode,
) -> Result<Vec<Line>, CodeGenError> {
    let opener = cx.require_opener(node)?;
    if !counts_fractionally(cx, opener)? {
        return Ok(Vec::new());
    }
    let var = cx.text(opener, 0)?;
    let step = cx.text(opener, 3)?;
    let op = if opener.kind == StatementKind::ForIncrement {
        "+="
    } else {
        "-="
    };
    Ok(vec![Line::nested(1, format!("{var} {op} {step}"))])
}

fn counts_fractionally(
    cx: &NodeContext<'_, '_>,
    node: &StatementNode,
) -> Result<bool, CodeGenError> {
    for slot in 1..=3 {
        if cx.parsed(node, slot)?.is_fractional_literal() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `end + delta`, folded when `end` is an integer literal.
fn shift(end_expr: &Expr, end: &Printed, delta: i64) -> String {
    if let Some(value) = end_expr.literal_integer() {
        return (value + delta).to_string();
    }
    let sign = if delta < 0 { "-" } else { "+" };
    format!("{} {sign} {}", end.at_least(Precedence::Additive), delta.abs())
}

#[cfg(test)]
mod tests {
    use crate::codegen::{RenderOptions, Target, render};
    use crate::model::tests::node;
    use crate::model::{Program, StatementKind::*, StatementNode};

    fn py(statements: Vec<StatementNode>) -> String {
        render(
            &Program::new(statements),
            Target::Python,
            &RenderOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_assign_and_output() {
        let code = py(vec![
            node("1", Assign, &["a", "2"]),
            node("2", Output, &["a"]),
        ]);
        assert_eq!(code, "a = 2\nprint(a)\n");
    }

    #[test]
    fn test_if_chain_with_empty_branch() {
        let code = py(vec![
            node("1", If, &["a > 1"]),
            node("2", Else, &[]).with_children(vec![node("3", Output, &["a"])]),
            node("4", EndIf, &[]),
        ]);
        assert_eq!(code, "if a > 1:\n    pass\nelse:\n    print(a)\n");
    }

    #[test]
    fn test_comment_only_block_gets_pass() {
        let code = py(vec![
            node("1", While, &["x"]).with_children(vec![
                node("2", Sub, &["label"]),
                node("3", EndSub, &[]),
            ]),
            node("4", EndWhile, &[]),
        ]);
        assert_eq!(
            code,
            "while x:\n    # begin: label\n    # end: label\n    pass\n"
        );
    }

    #[test]
    fn test_do_while_lowering() {
        let code = py(vec![
            node("1", DoWhile, &["n < 5"]).with_children(vec![node("2", Increment, &["n", "1"])]),
            node("3", EndDoWhile, &[]),
        ]);
        assert_eq!(
            code,
            "while True:\n    n += 1\n    if not (n < 5):\n        break\n"
        );
    }

    #[test]
    fn test_do_while_atomic_condition() {
        let code = py(vec![
            node("1", DoWhile, &["running"]).with_children(vec![node("2", Output, &["1"])]),
            node("3", EndDoWhile, &[]),
        ]);
        assert!(code.contains("    if not running:\n        break\n"), "{code}");
    }

    #[test]
    fn test_fractional_loop_becomes_while() {
        let code = py(vec![
            node("1", ForIncrement, &["x", "0", "1.5", "0.5"])
                .with_children(vec![node("2", Output, &["x"])]),
            node("3", EndFor, &[]),
            node("4", ForDecrement, &["y", "2.0", "0", "1"]),
            node("5", EndFor, &[]),
        ]);
        assert_eq!(
            code,
            "x = 0\n\
             while x <= 1.5:\n\
             \x20   print(x)\n\
             \x20   x += 0.5\n\
             y = 2.0\n\
             while y >= 0:\n\
             \x20   pass\n\
             \x20   y -= 1\n"
        );
    }

    #[test]
    fn test_negative_literal_end_folds() {
        let code = py(vec![
            node("1", ForDecrement, &["i", "3", "-2", "1"]),
            node("2", EndFor, &[]),
        ]);
        assert!(code.starts_with("for i in range(3, -3, -1):\n"), "{code}");
    }

    #[test]
    fn test_range_bounds() {
        let code = py(vec![
            node("1", ForIncrement, &["i", "1", "10", "1"]),
            node("2", EndFor, &[]),
            node("3", ForIncrement, &["i", "0", "n", "2"]),
            node("4", EndFor, &[]),
            node("5", ForDecrement, &["i", "10", "1", "1"]),
            node("6", EndFor, &[]),
            node("7", ForDecrement, &["i", "n", "m", "s"]),
            node("8", EndFor, &[]),
        ]);
        let headers: Vec<&str> = code.lines().filter(|l| l.starts_with("for")).collect();
        assert_eq!(
            headers,
            vec![
                "for i in range(1, 11):",
                "for i in range(0, n + 1, 2):",
                "for i in range(10, 0, -1):",
                "for i in range(n, m - 1, -s):",
            ]
        );
    }

    #[test]
    fn test_random_import() {
        let code = py(vec![node("1", Assign, &["d", "Random(1, 6)"])]);
        assert_eq!(code, "import random\n\nd = random.randint(1, 6)\n");
    }

    #[test]
    fn test_bulk_assign() {
        let code = py(vec![node("1", BulkAssignToArray, &["xs", "0"])]);
        assert_eq!(code, "xs = [0] * len(xs)\n");
    }

    #[test]
    fn test_function_without_body() {
        let code = py(vec![
            node("1", DefineFunction, &["noop", ""]),
            node("2", Defined, &[]),
            node("3", CallUserFunction, &["noop", ""]),
        ]);
        assert_eq!(code, "def noop():\n    pass\nnoop()\n");
    }
}
