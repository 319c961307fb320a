//! Constant reassignment.
//!
//! A name declared by a constant `Assign` may not be written again by any
//! later line in pre-order: not by a second constant declaration, a plain
//! assignment, increment/decrement, array writes, or a `For` loop variable.

use crate::model::{FlattenedNode, StatementKind};

use super::{ValidationErrorKind, Validator};

/// The variable a line writes to, if any, without any `[index]` suffix.
fn written_name(item: &FlattenedNode) -> Option<&str> {
    let writes = item.kind.is_assignment()
        || matches!(
            item.kind,
            StatementKind::ForIncrement | StatementKind::ForDecrement
        );
    if !writes {
        return None;
    }
    let target = item.token(0);
    let name = target.split('[').next().unwrap_or(target).trim();
    (!name.is_empty()).then_some(name)
}

impl Validator<'_> {
    pub(super) fn check_constants(&mut self, index: usize) {
        let items = self.items;
        let Some(name) = written_name(&items[index]) else {
            return;
        };
        let declared_before = items[..index].iter().any(|earlier| {
            earlier.kind == StatementKind::Assign
                && earlier.is_constant
                && written_name(earlier) == Some(name)
        });
        if declared_before {
            self.report(
                index,
                ValidationErrorKind::ConstantReassigned {
                    name: name.to_string(),
                },
            );
        }
    }
}
