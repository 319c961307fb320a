//! Expression validation and token building.
//!
//! Turns an [`OperandBag`] into the token slots of one statement. Every slot
//! is checked against its grammar, then the assembled tokens go through the
//! bracket check and the normalizer. All problems are collected; nothing is
//! built unless the list is empty.

use log::debug;

use crate::ast::Builtin;
use crate::lexer::{TokenKind, lex};
use crate::model::StatementKind;
use crate::normalizer::{self, check_brackets, check_reserved, substitute_glyphs};
use crate::semantic::UserDefinedFunctionInfo;

use super::grammar::{is_constant_name, is_index, is_number, is_variable_name};
use super::{OperandBag, OperandError, OperandType, Side, Slot};

/// Validates `bag` for a statement of `kind` and builds its token slots.
///
/// `functions` are the definitions currently in the tree, used to check
/// user-defined calls.
///
/// # Example
///
/// ```
/// use pseudoblocks::model::StatementKind;
/// use pseudoblocks::operand::{OperandBag, build_tokens};
///
/// let bag = OperandBag::new()
///     .with("left_operand_0", "a")
///     .with("right_operand_0", "2")
///     .with("right_type_0", "number");
/// let tokens = build_tokens(StatementKind::Assign, &bag, &[]).unwrap();
/// assert_eq!(tokens, vec!["a", "2"]);
/// ```
pub fn build_tokens(
    kind: StatementKind,
    bag: &OperandBag,
    functions: &[UserDefinedFunctionInfo],
) -> Result<Vec<String>, Vec<OperandError>> {
    let mut builder = TokenBuilder {
        bag,
        functions,
        errors: Vec::new(),
    };
    let tokens = builder.build(kind);
    let errors = builder.finish(kind, &tokens);
    if errors.is_empty() {
        debug!("built {kind} tokens {tokens:?}");
        Ok(tokens)
    } else {
        debug!("{kind} operands rejected with {} error(s)", errors.len());
        Err(errors)
    }
}

struct TokenBuilder<'a> {
    bag: &'a OperandBag,
    functions: &'a [UserDefinedFunctionInfo],
    errors: Vec<OperandError>,
}

impl TokenBuilder<'_> {
    fn build(&mut self, kind: StatementKind) -> Vec<String> {
        match kind {
            StatementKind::Assign => {
                let target = self.target(self.bag.is_constant());
                let value = self.side(Side::Right);
                vec![target, value]
            }
            StatementKind::InitializeArray => {
                let name = self.name_field(Slot::Operand { side: Side::Left, index: 0 });
                let items = (0..self.bag.operand_count(Side::Right))
                    .map(|i| self.operand(Side::Right, i))
                    .collect::<Vec<_>>();
                vec![name, items.join(", ")]
            }
            StatementKind::BulkAssignToArray => {
                let name = self.name_field(Slot::Operand { side: Side::Left, index: 0 });
                vec![name, self.side(Side::Right)]
            }
            StatementKind::Increment | StatementKind::Decrement => {
                let target = self.target(false);
                let amount = if self.bag.operand_count(Side::Right) == 0 {
                    "1".to_string()
                } else {
                    self.side(Side::Right)
                };
                vec![target, amount]
            }
            StatementKind::Output => self.output_items(),
            StatementKind::If
            | StatementKind::ElseIf
            | StatementKind::While
            | StatementKind::DoWhile => vec![self.condition()],
            StatementKind::ForIncrement | StatementKind::ForDecrement => self.for_header(),
            StatementKind::DefineFunction => {
                let name = self.field_name("function_name");
                let params = self.name_list("arguments", true);
                vec![name, params.join(", ")]
            }
            StatementKind::CallUserFunction => self.call(),
            StatementKind::Sub => match self.bag.get("label") {
                Some(label) => vec![label.to_string()],
                None => {
                    self.errors.push(OperandError::Missing {
                        slot: Slot::Field("label"),
                    });
                    vec![String::new()]
                }
            },
            StatementKind::Else
            | StatementKind::EndIf
            | StatementKind::EndWhile
            | StatementKind::EndDoWhile
            | StatementKind::EndFor
            | StatementKind::Defined
            | StatementKind::Break
            | StatementKind::EndSub => Vec::new(),
        }
    }

    /// Statement-wide checks over the assembled tokens.
    fn finish(mut self, kind: StatementKind, tokens: &[String]) -> Vec<OperandError> {
        if !self.errors.is_empty() {
            return self.errors;
        }
        let bracket_errors = check_brackets(tokens);
        if !bracket_errors.is_empty() {
            self.errors
                .extend(bracket_errors.into_iter().map(|source| OperandError::Expression {
                    slot: Slot::Statement,
                    source,
                }));
            return self.errors;
        }
        for slot in kind.expression_slots(tokens.len()) {
            let token = tokens[slot].as_str();
            let result = if kind.is_list_slot(slot) {
                normalizer::prepare_list(token).map(drop)
            } else {
                normalizer::prepare(token).map(drop)
            };
            if let Err(source) = result {
                self.errors.push(OperandError::Expression {
                    slot: Slot::Statement,
                    source,
                });
            }
        }
        self.errors
    }

    /// The written-to side: one variable, optionally indexed.
    fn target(&mut self, constant: bool) -> String {
        let slot = Slot::Operand {
            side: Side::Left,
            index: 0,
        };
        let Some(name) = self.bag.operand(Side::Left, 0) else {
            self.errors.push(OperandError::Missing { slot });
            return String::new();
        };
        if constant {
            if !is_constant_name(name) {
                self.errors.push(OperandError::InvalidConstantName {
                    slot,
                    value: name.to_string(),
                });
            }
            return name.to_string();
        }
        self.operand(Side::Left, 0)
    }

    /// A bare name in the first left slot.
    fn name_field(&mut self, slot: Slot) -> String {
        match self.bag.operand(Side::Left, 0) {
            Some(name) => {
                self.check_name(slot, name);
                name.to_string()
            }
            None => {
                self.errors.push(OperandError::Missing { slot });
                String::new()
            }
        }
    }

    fn field_name(&mut self, field: &'static str) -> String {
        match self.bag.get(field) {
            Some(name) => {
                self.check_name(Slot::Field(field), name);
                name.to_string()
            }
            None => {
                self.errors.push(OperandError::Missing {
                    slot: Slot::Field(field),
                });
                String::new()
            }
        }
    }

    fn check_name(&mut self, slot: Slot, name: &str) {
        if !is_variable_name(name) {
            self.errors.push(OperandError::InvalidVariableName {
                slot,
                value: name.to_string(),
            });
        }
    }

    /// Comma-separated names (parameters); empty is allowed.
    fn name_list(&mut self, field: &'static str, names_only: bool) -> Vec<String> {
        let Some(raw) = self.bag.get(field) else {
            return Vec::new();
        };
        let text = substitute_glyphs(raw);
        let mut items = Vec::new();
        for item in text.split(',').map(str::trim) {
            if names_only {
                self.check_name(Slot::Field(field), item);
            } else if item.is_empty() {
                self.errors.push(OperandError::Missing {
                    slot: Slot::Field(field),
                });
            }
            items.push(item.to_string());
        }
        items
    }

    /// All operands of one side joined by their operators.
    fn side(&mut self, side: Side) -> String {
        let count = self.bag.operand_count(side);
        if count == 0 {
            self.errors.push(OperandError::Missing {
                slot: Slot::Operand { side, index: 0 },
            });
            return String::new();
        }
        let mut text = self.operand(side, 0);
        for i in 1..count {
            let op = self.operator(side, i - 1);
            text.push(' ');
            text.push_str(&op);
            text.push(' ');
            text.push_str(&self.operand(side, i));
        }
        text
    }

    fn operator(&mut self, side: Side, index: usize) -> String {
        let slot = Slot::Operand { side, index };
        let Some(raw) = self.bag.operator(side, index) else {
            self.errors.push(OperandError::UnknownOperator {
                slot,
                value: String::new(),
            });
            return String::new();
        };
        let op = substitute_glyphs(raw).trim().to_string();
        if !is_binary_operator(&op) {
            self.errors.push(OperandError::UnknownOperator {
                slot,
                value: raw.to_string(),
            });
        }
        op
    }

    /// One operand rendered as expression text, after its slot checks.
    fn operand(&mut self, side: Side, index: usize) -> String {
        let slot = Slot::Operand { side, index };
        let Some(raw) = self.bag.operand(side, index) else {
            self.errors.push(OperandError::Missing { slot });
            return String::new();
        };

        let declared = match self.bag.operand_type(side, index) {
            Some(text) => match text.parse::<OperandType>() {
                Ok(ty) => ty,
                Err(()) => {
                    self.errors.push(OperandError::UnknownType {
                        slot,
                        value: text.to_string(),
                    });
                    return raw.to_string();
                }
            },
            None => OperandType::infer(raw),
        };

        if let Some(function) = self.bag.function(side, index) {
            return self.function_call(slot, function, raw, self.bag.argc(side, index));
        }

        if let Err(source) = check_reserved(raw, declared == OperandType::Boolean) {
            self.errors.push(OperandError::Expression { slot, source });
            return raw.to_string();
        }

        match declared {
            OperandType::Number => {
                if !is_number(raw) {
                    self.errors.push(OperandError::InvalidNumber {
                        slot,
                        value: raw.to_string(),
                    });
                }
                raw.to_string()
            }
            OperandType::String => {
                let inner = raw
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .or_else(|| raw.strip_prefix('「').and_then(|s| s.strip_suffix('」')))
                    .unwrap_or(raw);
                format!("\"{}\"", quoted_contents(inner))
            }
            OperandType::Boolean => {
                if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
                    raw.to_ascii_lowercase()
                } else {
                    self.errors.push(OperandError::InvalidBoolean {
                        slot,
                        value: raw.to_string(),
                    });
                    raw.to_string()
                }
            }
            OperandType::Variable | OperandType::Array => {
                self.check_name(slot.clone(), raw);
                match self.bag.index(side, index) {
                    Some(idx) => {
                        if !is_index(idx) {
                            self.errors.push(OperandError::InvalidIndex {
                                slot,
                                value: idx.to_string(),
                            });
                        }
                        format!("{raw}[{}]", substitute_glyphs(idx).trim())
                    }
                    None => raw.to_string(),
                }
            }
        }
    }

    /// A built-in or user-defined call wrapping the operand as its arguments.
    fn function_call(&mut self, slot: Slot, function: &str, args: &str, argc: Option<&str>) -> String {
        let found = args.split([',', '、']).filter(|a| !a.trim().is_empty()).count();
        let declared = argc.and_then(|a| a.parse::<usize>().ok());

        if let Some(builtin) = Builtin::from_name(function) {
            let expected = builtin.arity();
            if found != expected || declared.is_some_and(|d| d != expected) {
                self.errors.push(OperandError::ArgumentCount {
                    slot,
                    name: function.to_string(),
                    expected,
                    found,
                });
            }
            return format!("{function}({args})");
        }

        match self.functions.iter().find(|f| f.func_name == function) {
            Some(info) => {
                if found != info.argument_count {
                    self.errors.push(OperandError::ArgumentCount {
                        slot,
                        name: function.to_string(),
                        expected: info.argument_count,
                        found,
                    });
                }
            }
            None => self.errors.push(OperandError::UndefinedFunction {
                slot,
                name: function.to_string(),
            }),
        }
        format!("UserDefined:{function}({args})")
    }

    fn output_items(&mut self) -> Vec<String> {
        let count = self.bag.operand_count(Side::Left);
        if count == 0 {
            self.errors.push(OperandError::Missing {
                slot: Slot::Operand {
                    side: Side::Left,
                    index: 0,
                },
            });
            return vec![String::new()];
        }
        let joined = (0..count.saturating_sub(1)).any(|i| self.bag.operator(Side::Left, i).is_some());
        if joined {
            vec![self.side(Side::Left)]
        } else {
            (0..count).map(|i| self.operand(Side::Left, i)).collect()
        }
    }

    fn condition(&mut self) -> String {
        let left = self.side(Side::Left);
        let Some(raw) = self.bag.get("comparison_operator") else {
            if self.bag.operand_count(Side::Right) > 0 {
                self.errors.push(OperandError::UnknownOperator {
                    slot: Slot::Field("comparison_operator"),
                    value: String::new(),
                });
            }
            return left;
        };
        let op = substitute_glyphs(raw).trim().to_string();
        if !is_binary_operator(&op) {
            self.errors.push(OperandError::UnknownOperator {
                slot: Slot::Field("comparison_operator"),
                value: raw.to_string(),
            });
        }
        let right = self.side(Side::Right);
        format!("{left} {op} {right}")
    }

    fn for_header(&mut self) -> Vec<String> {
        let var = self.field_name("loop_variable");
        let start = self.loop_bound("initial_value");
        let end = self.loop_bound("end_value");
        let step = if self.bag.get("step_value").is_some() {
            self.loop_bound("step_value")
        } else {
            "1".to_string()
        };
        vec![var, start, end, step]
    }

    fn loop_bound(&mut self, field: &'static str) -> String {
        let slot = Slot::Field(field);
        match self.bag.get(field) {
            Some(value) if is_number(value) || is_variable_name(value) => value.to_string(),
            Some(value) => {
                self.errors.push(OperandError::InvalidNumber {
                    slot,
                    value: value.to_string(),
                });
                value.to_string()
            }
            None => {
                self.errors.push(OperandError::Missing { slot });
                String::new()
            }
        }
    }

    fn call(&mut self) -> Vec<String> {
        let name = self.field_name("function_name");
        let args = self.name_list("arguments", false);
        if !name.is_empty() {
            match self.functions.iter().find(|f| f.func_name == name) {
                Some(info) if info.argument_count != args.len() => {
                    self.errors.push(OperandError::ArgumentCount {
                        slot: Slot::Field("arguments"),
                        name: name.clone(),
                        expected: info.argument_count,
                        found: args.len(),
                    });
                }
                Some(_) => {}
                None => self.errors.push(OperandError::UndefinedFunction {
                    slot: Slot::Field("function_name"),
                    name: name.clone(),
                }),
            }
        }
        vec![name, args.join(", ")]
    }
}

/// Exactly one binary operator token, after glyph folding.
fn is_binary_operator(text: &str) -> bool {
    matches!(
        lex(text).as_deref(),
        Ok([token]) if matches!(
            token.kind,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::StarStar
                | TokenKind::Slash
                | TokenKind::SlashSlash
                | TokenKind::Percent
                | TokenKind::Equal
                | TokenKind::NotEqual
                | TokenKind::Less
                | TokenKind::LessEqual
                | TokenKind::Greater
                | TokenKind::GreaterEqual
                | TokenKind::And
                | TokenKind::Or
        )
    )
}

/// String operand text escaped so it lexes as one literal.
fn quoted_contents(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    for ch in inner.chars() {
        if matches!(ch, '\\' | '"' | '「' | '」') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
