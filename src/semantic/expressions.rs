//! Expression checks inside node tokens.
//!
//! Brackets are balanced per statement over all of its tokens; every
//! expression slot must then normalize and parse. Parsed expressions are
//! also checked for write targets and for `UserDefined:` calls.

use crate::ast::{Expr, ExprKind};
use crate::model::StatementKind;
use crate::normalizer::{self, check_brackets};

use super::{ValidationErrorKind, Validator};

/// Which slots must be a plain name (as opposed to any expression).
enum Target {
    Name,
    Assignable,
}

fn target_rule(kind: StatementKind, slot: usize) -> Option<Target> {
    match (kind, slot) {
        (StatementKind::Assign, 0)
        | (StatementKind::Increment, 0)
        | (StatementKind::Decrement, 0) => Some(Target::Assignable),
        (StatementKind::InitializeArray, 0)
        | (StatementKind::BulkAssignToArray, 0)
        | (StatementKind::ForIncrement, 0)
        | (StatementKind::ForDecrement, 0)
        | (StatementKind::DefineFunction, _)
        | (StatementKind::CallUserFunction, 0) => Some(Target::Name),
        _ => None,
    }
}

fn satisfies(rule: &Target, expr: &Expr) -> bool {
    match rule {
        Target::Name => matches!(&expr.kind, ExprKind::Identifier(name) if !name.contains('.')),
        Target::Assignable => expr.assignable_name().is_some(),
    }
}

impl Validator<'_> {
    pub(super) fn check_expressions(&mut self, index: usize) {
        let items = self.items;
        let item = &items[index];

        let bracket_errors = check_brackets(&item.tokens);
        if !bracket_errors.is_empty() {
            for err in bracket_errors {
                self.report(index, err.into());
            }
            return;
        }

        for slot in item.kind.expression_slots(item.tokens.len()) {
            let token = item.tokens[slot].as_str();
            let parsed = if item.kind.is_list_slot(slot) {
                normalizer::prepare_list(token)
            } else {
                normalizer::prepare(token).map(|expr| vec![expr])
            };
            let exprs = match parsed {
                Ok(exprs) => exprs,
                Err(err) => {
                    self.report(index, err.into());
                    continue;
                }
            };

            let rule = target_rule(item.kind, slot);
            for expr in &exprs {
                if let Some(rule) = &rule
                    && !satisfies(rule, expr)
                {
                    self.report(
                        index,
                        ValidationErrorKind::NotAssignable {
                            text: token.trim().to_string(),
                        },
                    );
                }
                self.check_user_calls(index, expr);
            }
        }
    }

    fn check_user_calls(&mut self, index: usize, expr: &Expr) {
        let mut problems = Vec::new();
        expr.walk(&mut |e| {
            let ExprKind::Call {
                name,
                args,
                user_defined: true,
            } = &e.kind
            else {
                return;
            };
            match self.functions.iter().find(|f| &f.func_name == name) {
                None => problems.push(ValidationErrorKind::UndefinedFunction { name: name.clone() }),
                Some(info) if info.argument_count != args.len() => {
                    problems.push(ValidationErrorKind::ArgumentCountMismatch {
                        name: name.clone(),
                        expected: info.argument_count,
                        found: args.len(),
                    })
                }
                Some(_) => {}
            }
        });
        for problem in problems {
            self.report(index, problem);
        }
    }
}
