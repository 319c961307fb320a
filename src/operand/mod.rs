//! Operand bags: the raw form input behind one statement.
//!
//! The statement editor collects operands as a flat, string-keyed map. Keys
//! are grouped by side (`left`/`right`) and a 0-based slot index:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `left_operand_0` | raw operand text |
//! | `left_type_0` | `variable`, `number`, `string`, `array` or `boolean` |
//! | `left_index_0` | array index (`i`, `3`, or `1, 2` for bulk assignment) |
//! | `left_function_0` | built-in name or user-defined function name |
//! | `left_argc_0` | declared argument count of that function |
//! | `left_operator_0` | operator joining slot 0 and slot 1 |
//! | `comparison_operator` | operator between the left and right side |
//! | `is_constant` | `true` to declare a constant |
//! | `loop_variable`, `initial_value`, `end_value`, `step_value` | `For` fields |
//! | `function_name`, `arguments` | `DefineFunction` / `CallUserFunction` |
//! | `label` | `Sub` label |
//!
//! A bag lives for one edit: [`build_tokens`] validates it and turns it into
//! the token slots of a [`crate::model::StatementNode`], then it is dropped.

mod builder;
mod grammar;

pub use builder::build_tokens;
pub use grammar::{is_constant_name, is_index, is_number, is_variable_name};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::ExprError;

/// Which side of a statement an operand belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn prefix(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Declared type of an operand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    Variable,
    Number,
    String,
    Array,
    Boolean,
}

impl OperandType {
    /// Best guess for a slot whose type the form did not send.
    pub fn infer(value: &str) -> Self {
        let value = value.trim();
        if is_number(value) {
            OperandType::Number
        } else if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            OperandType::Boolean
        } else if value.starts_with('"') || value.starts_with('「') {
            OperandType::String
        } else {
            OperandType::Variable
        }
    }
}

impl FromStr for OperandType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "variable" => Ok(OperandType::Variable),
            "number" => Ok(OperandType::Number),
            "string" => Ok(OperandType::String),
            "array" => Ok(OperandType::Array),
            "boolean" => Ok(OperandType::Boolean),
            _ => Err(()),
        }
    }
}

/// Where in the form a problem was found.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// A side operand; `index` is 0-based and shown 1-based.
    Operand { side: Side, index: usize },
    /// A named field such as `initial_value`.
    Field(&'static str),
    /// The statement as a whole.
    Statement,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Operand { side, index } => write!(f, "{side} operand {}", index + 1),
            Slot::Field(name) => f.write_str(&name.replace('_', " ")),
            Slot::Statement => f.write_str("statement"),
        }
    }
}

/// A problem with the operands of one statement.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperandError {
    #[error("{slot}: a value is required")]
    Missing { slot: Slot },

    #[error("{slot}: `{value}` is not a valid variable name")]
    InvalidVariableName { slot: Slot, value: String },

    #[error("{slot}: `{value}` is not a number")]
    InvalidNumber { slot: Slot, value: String },

    #[error("{slot}: `{value}` is not a valid array index")]
    InvalidIndex { slot: Slot, value: String },

    #[error("{slot}: constant `{value}` must start with an uppercase letter")]
    InvalidConstantName { slot: Slot, value: String },

    #[error("{slot}: `{value}` must be true or false")]
    InvalidBoolean { slot: Slot, value: String },

    #[error("{slot}: unknown operand type `{value}`")]
    UnknownType { slot: Slot, value: String },

    #[error("{slot}: `{value}` is not an operator")]
    UnknownOperator { slot: Slot, value: String },

    #[error("{slot}: function `{name}` is not defined")]
    UndefinedFunction { slot: Slot, name: String },

    #[error("{slot}: `{name}` takes {expected} argument(s), found {found}")]
    ArgumentCount {
        slot: Slot,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("{slot}: {source}")]
    Expression {
        slot: Slot,
        #[source]
        source: ExprError,
    },
}

/// Raw operand fields collected from the statement form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperandBag {
    fields: BTreeMap<String, String>,
}

impl OperandBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the bag for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// A field's value; blank values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn side_field(&self, side: Side, field: &str, index: usize) -> Option<&str> {
        self.get(&format!("{}_{field}_{index}", side.prefix()))
    }

    pub fn operand(&self, side: Side, index: usize) -> Option<&str> {
        self.side_field(side, "operand", index)
    }

    pub fn operand_type(&self, side: Side, index: usize) -> Option<&str> {
        self.side_field(side, "type", index)
    }

    pub fn index(&self, side: Side, index: usize) -> Option<&str> {
        self.side_field(side, "index", index)
    }

    pub fn function(&self, side: Side, index: usize) -> Option<&str> {
        self.side_field(side, "function", index)
    }

    pub fn argc(&self, side: Side, index: usize) -> Option<&str> {
        self.side_field(side, "argc", index)
    }

    pub fn operator(&self, side: Side, index: usize) -> Option<&str> {
        self.side_field(side, "operator", index)
    }

    /// Number of contiguous operand slots on `side`, starting at 0.
    pub fn operand_count(&self, side: Side) -> usize {
        (0..).take_while(|&i| self.operand(side, i).is_some()).count()
    }

    /// Whether the form asked for a constant declaration.
    pub fn is_constant(&self) -> bool {
        self.get("is_constant")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_count_stops_at_gap() {
        let bag = OperandBag::new()
            .with("left_operand_0", "a")
            .with("left_operand_1", "b")
            .with("left_operand_3", "d");
        assert_eq!(bag.operand_count(Side::Left), 2);
        assert_eq!(bag.operand_count(Side::Right), 0);
    }

    #[test]
    fn test_blank_is_absent() {
        let bag = OperandBag::new().with("label", "  ");
        assert_eq!(bag.get("label"), None);
    }

    #[test]
    fn test_type_parse_and_infer() {
        assert_eq!("Array".parse::<OperandType>(), Ok(OperandType::Array));
        assert!("matrix".parse::<OperandType>().is_err());
        assert_eq!(OperandType::infer("-2.5"), OperandType::Number);
        assert_eq!(OperandType::infer("「x」"), OperandType::String);
        assert_eq!(OperandType::infer("TRUE"), OperandType::Boolean);
        assert_eq!(OperandType::infer("total"), OperandType::Variable);
    }

    #[test]
    fn test_slot_display_is_one_based() {
        let slot = Slot::Operand {
            side: Side::Right,
            index: 1,
        };
        assert_eq!(slot.to_string(), "right operand 2");
        assert_eq!(Slot::Field("initial_value").to_string(), "initial value");
    }

    #[test]
    fn test_bag_from_json() {
        let bag: OperandBag =
            serde_json::from_str(r#"{"left_operand_0": "a", "is_constant": "true"}"#).unwrap();
        assert_eq!(bag.operand(Side::Left, 0), Some("a"));
        assert!(bag.is_constant());
    }
}
