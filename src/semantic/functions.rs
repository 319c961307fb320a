//! User-defined function table.
//!
//! Derived on demand from the `DefineFunction` nodes of the current tree;
//! never stored.

use serde::Serialize;

use crate::model::{FlattenedNode, StatementKind};
use crate::normalizer::substitute_glyphs;

/// Name and arity of one `DefineFunction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDefinedFunctionInfo {
    pub func_name: String,
    pub argument_count: usize,
}

/// Number of items in a comma-separated token; blank means zero.
pub(crate) fn list_len(token: &str) -> usize {
    let text = substitute_glyphs(token);
    if text.trim().is_empty() {
        0
    } else {
        text.split(',').count()
    }
}

/// Every function definition in the flattened program, in order.
///
/// Duplicates are kept; the validator reports them.
pub fn collect_functions(items: &[FlattenedNode]) -> Vec<UserDefinedFunctionInfo> {
    items
        .iter()
        .filter(|item| item.kind == StatementKind::DefineFunction)
        .map(|item| UserDefinedFunctionInfo {
            func_name: item.token(0).trim().to_string(),
            argument_count: list_len(item.token(1)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::node;
    use crate::model::{Program, flatten};

    #[test]
    fn test_collect_functions() {
        let program = Program::new(vec![
            node("1", StatementKind::DefineFunction, &["twice", "x"]),
            node("2", StatementKind::Defined, &[]),
            node("3", StatementKind::DefineFunction, &["hello", ""]),
            node("4", StatementKind::Defined, &[]),
        ]);
        let functions = collect_functions(&flatten(&program));
        assert_eq!(
            functions,
            vec![
                UserDefinedFunctionInfo {
                    func_name: "twice".into(),
                    argument_count: 1
                },
                UserDefinedFunctionInfo {
                    func_name: "hello".into(),
                    argument_count: 0
                },
            ]
        );
    }

    #[test]
    fn test_list_len() {
        assert_eq!(list_len("a, b、c"), 3);
        assert_eq!(list_len("  "), 0);
    }
}
