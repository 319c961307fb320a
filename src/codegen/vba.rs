//! VBA backend.
//!
//! VBA cannot run statements at module level, so top-level function
//! definitions are hoisted to the top of the module and everything else is
//! wrapped in an entry-point `Sub`. Identifiers must be ASCII; non-ASCII
//! names arrive already mapped through an [`IdentifierMap`].

use crate::model::{Program, StatementKind, StatementNode};
use crate::parser::Precedence;

use super::emitter::{Dialect, Emitter, Line, NodeContext, is_unit_step, negated, sub_marker};
use super::error::CodeGenError;
use super::syntax::{ExprSyntax, FloorDivide, Printed, random_tail, range_size};
use super::transliterate::IdentifierMap;
use super::{CodeGenerator, GeneratedOutput, RenderOptions, Target};

pub(super) static SYNTAX: ExprSyntax = ExprSyntax {
    power: "^",
    unary_wraps_power: false,
    modulo: "Mod",
    equal: "=",
    not_equal: "<>",
    and: "And",
    or: "Or",
    not: "Not ",
    word_not: true,
    true_literal: "True",
    false_literal: "False",
    floor_divide: FloorDivide::Operator("\\"),
    index: ("(", ")"),
    random,
    binary,
    escape,
};

fn random(m: &Printed, n: &Printed) -> Printed {
    Printed::new(
        format!("Int(Rnd() * ({})) + {}", range_size(m, n), random_tail(m)),
        Precedence::Additive,
    )
}

fn escape(text: &str) -> String {
    text.replace('"', "\"\"")
}

fn binary(x: &Printed) -> Printed {
    Printed::primary(format!("WorksheetFunction.Dec2Bin({})", x.text))
}

/// Loop variable used when filling an array in place.
const FILL_INDEX: &str = "fill_index";

/// Renders programs as a VBA module.
#[derive(Debug, Default, Clone, Copy)]
pub struct Vba;

impl Vba {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for Vba {
    fn generate(
        &self,
        program: &Program,
        options: &RenderOptions,
        idents: Option<&IdentifierMap>,
    ) -> Result<GeneratedOutput, CodeGenError> {
        let (functions, main) = split_functions(&program.statements);

        let mut emitter = Emitter::new(self, options, idents);
        if !functions.is_empty() {
            emitter.emit_block(&functions)?;
            emitter.line("");
        }
        emitter.line(&format!("Sub {}()", options.entry_point));
        emitter.indent += 1;
        emitter.emit_block(&main)?;
        emitter.indent -= 1;
        emitter.line("End Sub");

        Ok(GeneratedOutput::new(Target::Vba, emitter.finish()))
    }

    fn target(&self) -> Target {
        Target::Vba
    }
}

/// Separates top-level `DefineFunction`..`Defined` pairs from the rest.
fn split_functions(statements: &[StatementNode]) -> (Vec<StatementNode>, Vec<StatementNode>) {
    let mut functions = Vec::new();
    let mut main = Vec::new();
    let mut in_function = false;
    for node in statements {
        match node.kind {
            StatementKind::DefineFunction => {
                in_function = true;
                functions.push(node.clone());
            }
            StatementKind::Defined if in_function => {
                in_function = false;
                functions.push(node.clone());
            }
            _ => main.push(node.clone()),
        }
    }
    (functions, main)
}

impl Dialect for Vba {
    fn syntax(&self) -> &'static ExprSyntax {
        &SYNTAX
    }

    fn comment_prefix(&self) -> &'static str {
        "'"
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
                    format!("Const {target} = {value}")
                } else {
                    format!("{target} = {value}")
                }
            }
            InitializeArray => {
                let items = cx.list(node, 1)?;
                format!("{} = Array({})", cx.text(node, 0)?, items.join(", "))
            }
            BulkAssignToArray => {
                let name = cx.text(node, 0)?;
                let value = cx.text(node, 1)?;
                format!(
                    "For {FILL_INDEX} = LBound({name}) To UBound({name}): {name}({FILL_INDEX}) = {value}: Next {FILL_INDEX}"
                )
            }
            Increment | Decrement => {
                let target = cx.text(node, 0)?;
                let amount = cx.expr(node, 1)?;
                let op = if node.kind == Increment { "+" } else { "-" };
                format!(
                    "{target} = {target} {op} {}",
                    amount.tighter_than(Precedence::Additive)
                )
            }
            Output => output(cx, node)?,
            If => format!("If {} Then", cx.text(node, 0)?),
            ElseIf => format!("ElseIf {} Then", cx.text(node, 0)?),
            Else => "Else".to_string(),
            EndIf => "End If".to_string(),
            While => format!("Do While {}", cx.text(node, 0)?),
            EndWhile => "Loop".to_string(),
            DoWhile => "Do".to_string(),
            EndDoWhile => {
                let opener = cx.require_opener(node)?;
                format!("Loop While {}", cx.text(opener, 0)?)
            }
            ForIncrement | ForDecrement => for_header(cx, node)?,
            EndFor => {
                let opener = cx.require_opener(node)?;
                format!("Next {}", cx.text(opener, 0)?)
            }
            DefineFunction => {
                let params = cx.list(node, 1)?;
                format!("Sub {}({})", cx.name(node.token(0)), params.join(", "))
            }
            Defined => "End Sub".to_string(),
            CallUserFunction => {
                let args = cx.list(node, 1)?;
                format!("Call {}({})", cx.name(node.token(0)), args.join(", "))
            }
            Break => match cx.enclosing_loop {
                Some(ForIncrement | ForDecrement) => "Exit For".to_string(),
                _ => "Exit Do".to_string(),
            },
            Sub | EndSub => return sub_marker(cx, node, self.comment_prefix()),
        };
        Ok(vec![Line::new(line)])
    }
}

/// Several items print on one line separated by spaces.
fn output(cx: &mut NodeContext<'_, '_>, node: &StatementNode) -> Result<String, CodeGenError> {
    if node.tokens.len() == 1 {
        return Ok(format!("Debug.Print {}", cx.text(node, 0)?));
    }
    let mut items = Vec::with_capacity(node.tokens.len());
    for slot in 0..node.tokens.len() {
        // `&` binds looser than arithmetic and tighter than comparisons.
        items.push(cx.expr(node, slot)?.at_least(Precedence::Additive));
    }
    Ok(format!("Debug.Print {}", items.join(" & \" \" & ")))
}

fn for_header(cx: &mut NodeContext<'_, '_>, node: &StatementNode) -> Result<String, CodeGenError> {
    let var = cx.text(node, 0)?;
    let start = cx.text(node, 1)?;
    let end = cx.text(node, 2)?;
    let step = cx.expr(node, 3)?;
    let header = format!("For {var} = {start} To {end}");
    Ok(match (node.kind, is_unit_step(&step)) {
        (StatementKind::ForIncrement, true) => header,
        (StatementKind::ForIncrement, false) => format!("{header} Step {}", step.text),
        _ => format!("{header} Step {}", negated(&step)),
    })
}
