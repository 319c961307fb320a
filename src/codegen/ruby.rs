//! Ruby backend.

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
    and: "&&",
    or: "||",
    not: "!",
    word_not: false,
    true_literal: "true",
    false_literal: "false",
    floor_divide: FloorDivide::Wrapped {
        prefix: "(",
        suffix: ").floor",
    },
    index: ("[", "]"),
    random,
    binary,
    escape,
};

fn random(m: &Printed, n: &Printed) -> Printed {
    Printed::primary(format!("rand({}..{})", m.text, n.text))
}

/// `#` would start an interpolation inside a double-quoted string.
fn escape(text: &str) -> String {
    backslash_escaped(text).replace('#', "\\#")
}

fn binary(x: &Printed) -> Printed {
    Printed::primary(format!("{}.to_s(2)", x.atom()))
}

/// Renders programs as Ruby.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ruby;

impl Ruby {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for Ruby {
    fn generate(
        &self,
        program: &Program,
        options: &RenderOptions,
        idents: Option<&IdentifierMap>,
    ) -> Result<GeneratedOutput, CodeGenError> {
        let (code, _) = emit_program(self, &program.statements, options, idents)?;
        Ok(GeneratedOutput::new(Target::Ruby, code))
    }

    fn target(&self) -> Target {
        Target::Ruby
    }
}

impl Dialect for Ruby {
    fn syntax(&self) -> &'static ExprSyntax {
        &SYNTAX
    }

    fn comment_prefix(&self) -> &'static str {
        "#"
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
            BulkAssignToArray => format!("{}.fill({})", cx.text(node, 0)?, cx.text(node, 1)?),
            Increment => format!("{} += {}", cx.text(node, 0)?, cx.text(node, 1)?),
            Decrement => format!("{} -= {}", cx.text(node, 0)?, cx.text(node, 1)?),
            Output => {
                let items = cx.all(node)?;
                if items.len() == 1 {
                    format!("puts {}", items[0])
                } else {
                    format!("puts [{}].join(\" \")", items.join(", "))
                }
            }
            If => format!("if {}", cx.text(node, 0)?),
            ElseIf => format!("elsif {}", cx.text(node, 0)?),
            Else => "else".to_string(),
            While => format!("while {}", cx.text(node, 0)?),
            DoWhile => "begin".to_string(),
            EndDoWhile => {
                let opener = cx.require_opener(node)?;
                format!("end while {}", cx.text(opener, 0)?)
            }
            ForIncrement | ForDecrement => for_header(cx, node)?,
            EndIf | EndWhile | EndFor | Defined => "end".to_string(),
            DefineFunction => {
                let params = cx.list(node, 1)?;
                format!("def {}({})", cx.name(node.token(0)), params.join(", "))
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

fn for_header(cx: &mut NodeContext<'_, '_>, node: &StatementNode) -> Result<String, CodeGenError> {
    let var = cx.text(node, 0)?;
    let start = cx.expr(node, 1)?;
    let end = cx.text(node, 2)?;
    let step = cx.expr(node, 3)?;
    let header = match (node.kind, is_unit_step(&step)) {
        (StatementKind::ForIncrement, true) => {
            format!("({}..{end}).each", start.at_least(Precedence::Additive))
        }
        (StatementKind::ForIncrement, false) => {
            format!("{}.step({end}, {})", start.atom(), step.text)
        }
        (_, true) => format!("{}.downto({end})", start.atom()),
        (_, false) => format!("{}.step({end}, {})", start.atom(), negated(&step)),
    };
    Ok(format!("{header} do |{var}|"))
}

#[cfg(test)]
mod tests {
    use crate::codegen::{RenderOptions, Target, render};
    use crate::model::tests::node;
    use crate::model::{Program, StatementKind::*, StatementNode};

    fn rb(statements: Vec<StatementNode>) -> String {
        render(
            &Program::new(statements),
            Target::Ruby,
            &RenderOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_output_items() {
        let code = rb(vec![
            node("1", Output, &["a"]),
            node("2", Output, &["a", "\"and\"", "b"]),
        ]);
        assert_eq!(code, "puts a\nputs [a, \"and\", b].join(\" \")\n");
    }

    #[test]
    fn test_loop_headers() {
        let code = rb(vec![
            node("1", ForIncrement, &["i", "1", "5", "1"]),
            node("2", EndFor, &[]),
            node("3", ForIncrement, &["i", "0", "10", "2"]),
            node("4", EndFor, &[]),
            node("5", ForDecrement, &["i", "5", "1", "1"]),
            node("6", EndFor, &[]),
            node("7", ForDecrement, &["i", "n - 1", "0", "3"]),
            node("8", EndFor, &[]),
        ]);
        let headers: Vec<&str> = code.lines().filter(|l| l.ends_with("|")).collect();
        assert_eq!(
            headers,
            vec![
                "(1..5).each do |i|",
                "0.step(10, 2) do |i|",
                "5.downto(1) do |i|",
                "(n - 1).step(0, -3) do |i|",
            ]
        );
    }

    #[test]
    fn test_do_while() {
        let code = rb(vec![
            node("1", DoWhile, &["n < 5"]).with_children(vec![node("2", Increment, &["n", "1"])]),
            node("3", EndDoWhile, &[]),
        ]);
        assert_eq!(code, "begin\n    n += 1\nend while n < 5\n");
    }

    #[test]
    fn test_if_chain_and_functions() {
        let code = rb(vec![
            node("1", DefineFunction, &["sign", "x"]).with_children(vec![
                node("2", If, &["x > 0"]).with_children(vec![node("3", Output, &["1"])]),
                node("4", ElseIf, &["x < 0"]).with_children(vec![node("5", Output, &["-1"])]),
                node("6", EndIf, &[]),
            ]),
            node("7", Defined, &[]),
            node("8", CallUserFunction, &["sign", "3"]),
        ]);
        assert_eq!(
            code,
            "def sign(x)\n    if x > 0\n        puts 1\n    elsif x < 0\n        puts -1\n    end\nend\nsign(3)\n"
        );
    }
}
