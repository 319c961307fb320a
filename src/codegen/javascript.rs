//! JavaScript backend.

use crate::model::{Program, StatementKind, StatementNode};
use crate::parser::Precedence;

use super::emitter::{Dialect, Line, NodeContext, emit_program, is_unit_step, sub_marker};
use super::error::CodeGenError;
use super::syntax::{
    ExprSyntax, FloorDivide, Printed, backslash_escaped, random_tail, range_size,
};
use super::transliterate::IdentifierMap;
use super::{CodeGenerator, GeneratedOutput, RenderOptions, Target};

pub(super) static SYNTAX: ExprSyntax = ExprSyntax {
    power: "**",
    unary_wraps_power: true,
    modulo: "%",
    equal: "===",
    not_equal: "!==",
    and: "&&",
    or: "||",
    not: "!",
    word_not: false,
    true_literal: "true",
    false_literal: "false",
    floor_divide: FloorDivide::Wrapped {
        prefix: "Math.floor(",
        suffix: ")",
    },
    index: ("[", "]"),
    random,
    binary,
    escape: backslash_escaped,
};

fn random(m: &Printed, n: &Printed) -> Printed {
    Printed::new(
        format!(
            "Math.floor(Math.random() * ({})) + {}",
            range_size(m, n),
            random_tail(m)
        ),
        Precedence::Additive,
    )
}

fn binary(x: &Printed) -> Printed {
    Printed::primary(format!("Number({}).toString(2)", x.text))
}

/// Renders programs as JavaScript.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaScript;

impl JavaScript {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for JavaScript {
    fn generate(
        &self,
        program: &Program,
        options: &RenderOptions,
        idents: Option<&IdentifierMap>,
    ) -> Result<GeneratedOutput, CodeGenError> {
        let (code, _) = emit_program(self, &program.statements, options, idents)?;
        Ok(GeneratedOutput::new(Target::JavaScript, code))
    }

    fn target(&self) -> Target {
        Target::JavaScript
    }
}

impl Dialect for JavaScript {
    fn syntax(&self) -> &'static ExprSyntax {
        &SYNTAX
    }

    fn comment_prefix(&self) -> &'static str {
        "//"
    }

    fn statement(
        &self,
        cx: &mut NodeContext<'_, '_>,
        node: &StatementNode,
    ) -> Result<Vec<Line>, CodeGenError> {
        use StatementKind::*;

        let line = match node.kind {
            Assign => {
                let target = cx.text(node, 0)?;
                let value = cx.text(node, 1)?;
                if node.is_constant {
                    format!("const {target} = {value};")
                } else {
                    format!("{target} = {value};")
                }
            }
            InitializeArray => {
                let items = cx.list(node, 1)?;
                format!("{} = [{}];", cx.text(node, 0)?, items.join(", "))
            }
            BulkAssignToArray => {
                format!("{}.fill({});", cx.text(node, 0)?, cx.text(node, 1)?)
            }
            Increment => format!("{} += {};", cx.text(node, 0)?, cx.text(node, 1)?),
            Decrement => format!("{} -= {};", cx.text(node, 0)?, cx.text(node, 1)?),
            Output => format!("console.log({});", cx.all(node)?.join(", ")),
            If => format!("if ({}) {{", cx.condition(node, 0)?),
            ElseIf => format!("}} else if ({}) {{", cx.condition(node, 0)?),
            Else => "} else {".to_string(),
            While => format!("while ({}) {{", cx.condition(node, 0)?),
            DoWhile => "do {".to_string(),
            EndDoWhile => {
                let opener = cx.require_opener(node)?;
                format!("}} while ({});", cx.condition(opener, 0)?)
            }
            ForIncrement | ForDecrement => for_header(cx, node)?,
            EndIf | EndWhile | EndFor | Defined => "}".to_string(),
            DefineFunction => {
                let params = cx.list(node, 1)?;
                format!("function {}({}) {{", cx.name(node.token(0)), params.join(", "))
            }
            CallUserFunction => {
                let args = cx.list(node, 1)?;
                format!("{}({});", cx.name(node.token(0)), args.join(", "))
            }
            Break => "break;".to_string(),
            Sub | EndSub => return sub_marker(cx, node, self.comment_prefix()),
        };
        Ok(vec![Line::new(line)])
    }
}

fn for_header(cx: &mut NodeContext<'_, '_>, node: &StatementNode) -> Result<String, CodeGenError> {
    let var = cx.text(node, 0)?;
    let start = cx.text(node, 1)?;
    let end = cx.text(node, 2)?;
    let step = cx.expr(node, 3)?;
    let (compare, update) = if node.kind == StatementKind::ForIncrement {
        ("<=", "+")
    } else {
        (">=", "-")
    };
    let advance = if is_unit_step(&step) {
        format!("{var}{update}{update}")
    } else {
        format!("{var} {update}= {}", step.text)
    };
    Ok(format!(
        "for (let {var} = {start}; {var} {compare} {end}; {advance}) {{"
    ))
}
