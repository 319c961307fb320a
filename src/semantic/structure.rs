//! Structural rules.
//!
//! Each block kind constrains its immediate siblings (same parent) rather
//! than its children: a `While` owns its body and must be followed by an
//! `EndWhile` sibling.
//!
//! | Kind | Next sibling | Previous sibling |
//! |------|--------------|------------------|
//! | If | ElseIf, Else, EndIf | |
//! | ElseIf | ElseIf, Else, EndIf | If, ElseIf |
//! | Else | EndIf | If, ElseIf |
//! | EndIf | | If, ElseIf, Else |
//! | While / EndWhile | EndWhile | While |
//! | DoWhile / EndDoWhile | EndDoWhile | DoWhile |
//! | ForIncrement, ForDecrement / EndFor | EndFor | ForIncrement, ForDecrement |
//! | DefineFunction / Defined | Defined | DefineFunction |
//! | Sub / EndSub | EndSub | Sub |

use crate::model::StatementKind;

use super::functions::list_len;
use super::{ValidationErrorKind, Validator};

use StatementKind::*;

/// Allowed next-sibling kinds and their description, for kinds that need one.
fn required_successor(kind: StatementKind) -> Option<(&'static [StatementKind], &'static str)> {
    let rule: (&'static [StatementKind], &'static str) = match kind {
        If | ElseIf => (&[ElseIf, Else, EndIf], "ElseIf, Else or EndIf"),
        Else => (&[EndIf], "EndIf"),
        While => (&[EndWhile], "EndWhile"),
        DoWhile => (&[EndDoWhile], "EndDoWhile"),
        ForIncrement | ForDecrement => (&[EndFor], "EndFor"),
        DefineFunction => (&[Defined], "Defined"),
        Sub => (&[EndSub], "EndSub"),
        _ => return None,
    };
    Some(rule)
}

/// Allowed previous-sibling kinds and their description, for kinds that need one.
fn required_predecessor(kind: StatementKind) -> Option<(&'static [StatementKind], &'static str)> {
    let rule: (&'static [StatementKind], &'static str) = match kind {
        ElseIf | Else => (&[If, ElseIf], "If or ElseIf"),
        EndIf => (&[If, ElseIf, Else], "If, ElseIf or Else"),
        EndWhile => (&[While], "While"),
        EndDoWhile => (&[DoWhile], "DoWhile"),
        EndFor => (&[ForIncrement, ForDecrement], "ForIncrement or ForDecrement"),
        Defined => (&[DefineFunction], "DefineFunction"),
        EndSub => (&[Sub], "Sub"),
        _ => return None,
    };
    Some(rule)
}

impl Validator<'_> {
    pub(super) fn check_structure(&mut self, index: usize) {
        let items = self.items;
        let item = &items[index];
        let kind = item.kind;

        if let Some((allowed, expected)) = required_successor(kind) {
            let ok = self
                .next_sibling(index)
                .is_some_and(|next| allowed.contains(&next.kind));
            if !ok {
                self.report(index, ValidationErrorKind::MissingSuccessor { kind, expected });
            }
        }

        if let Some((allowed, expected)) = required_predecessor(kind) {
            let ok = self
                .previous_sibling(index)
                .is_some_and(|prev| allowed.contains(&prev.kind));
            if !ok {
                self.report(index, ValidationErrorKind::MissingPredecessor { kind, expected });
            }
        }

        if !kind.is_scoping() && self.has_children(index) {
            self.report(index, ValidationErrorKind::ChildrenNotAllowed { kind });
        }

        if let Some(expected) = kind.token_arity()
            && item.tokens.len() != expected
        {
            self.report(
                index,
                ValidationErrorKind::TokenCount {
                    kind,
                    expected,
                    found: item.tokens.len(),
                },
            );
        } else if kind == Output && item.tokens.is_empty() {
            self.report(
                index,
                ValidationErrorKind::TokenCount {
                    kind,
                    expected: 1,
                    found: 0,
                },
            );
        }

        match kind {
            Break => self.check_break(index),
            DefineFunction => self.check_definition(index),
            CallUserFunction => self.check_call(index),
            _ => {}
        }
    }

    fn check_break(&mut self, index: usize) {
        if !self.ancestors(index).any(|a| a.kind.is_loop()) {
            self.report(index, ValidationErrorKind::BreakOutsideLoop);
        }
    }

    fn check_definition(&mut self, index: usize) {
        let items = self.items;
        let item = &items[index];
        let name = item.token(0).trim().to_string();

        if item.depth > 0 {
            self.report(index, ValidationErrorKind::NestedFunction { name: name.clone() });
        }

        let original = items[..index]
            .iter()
            .position(|other| other.kind == DefineFunction && other.token(0).trim() == name);
        if let Some(original) = original {
            self.report(
                index,
                ValidationErrorKind::DuplicateFunction {
                    name,
                    original_line: original + 1,
                },
            );
        }
    }

    fn check_call(&mut self, index: usize) {
        let items = self.items;
        let item = &items[index];
        let name = item.token(0).trim();
        let found = list_len(item.token(1));

        let kind = match self.functions.iter().find(|f| f.func_name == name) {
            None => ValidationErrorKind::UndefinedFunction {
                name: name.to_string(),
            },
            Some(info) if info.argument_count != found => {
                ValidationErrorKind::ArgumentCountMismatch {
                    name: name.to_string(),
                    expected: info.argument_count,
                    found,
                }
            }
            Some(_) => return,
        };
        self.report(index, kind);
    }
}
