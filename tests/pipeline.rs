//! End-to-end: JSON program → validate → render.

use std::sync::Arc;

use pseudoblocks::codegen::{
    CodeGenErrorKind, CodepointTransliterator, RenderOptions, Target, TransliterationCache,
    normalize, render, render_all,
};
use pseudoblocks::model::{NodeId, NodeProperty, Program, StatementKind, StatementNode};
use pseudoblocks::operand::{OperandBag, build_tokens};
use pseudoblocks::semantic::validate;

fn render_default(program: &Program, target: Target) -> String {
    render(program, target, &RenderOptions::default()).unwrap()
}

#[test]
fn test_assign_then_output() {
    let program = Program::from_json(
        r#"[
            {"id": "1", "kind": "assign", "tokens": ["a", "2"]},
            {"id": "2", "kind": "output", "tokens": ["a"]}
        ]"#,
    )
    .unwrap();

    assert_eq!(
        render_default(&program, Target::JavaScript),
        "a = 2;\nconsole.log(a);\n"
    );
    assert_eq!(render_default(&program, Target::Python), "a = 2\nprint(a)\n");
    assert!(render_default(&program, Target::Vba).contains("Debug.Print a"));
    assert_eq!(render_default(&program, Target::Ruby), "a = 2\nputs a\n");
}

const FIZZBUZZ: &str = r#"[
    {"id": "f", "kind": "forIncrement", "tokens": ["i", "1", "15", "1"], "children": [
        {"id": "c1", "kind": "if", "tokens": ["i % 15 == 0"], "children": [
            {"id": "o1", "kind": "output", "tokens": ["\"FizzBuzz\""]}
        ]},
        {"id": "c2", "kind": "elseIf", "tokens": ["i % 3 == 0"], "children": [
            {"id": "o2", "kind": "output", "tokens": ["「Fizz」"]}
        ]},
        {"id": "c3", "kind": "else", "children": [
            {"id": "o3", "kind": "output", "tokens": ["i"]}
        ]},
        {"id": "c4", "kind": "endIf"}
    ]},
    {"id": "e", "kind": "endFor"}
]"#;

#[test]
fn test_nested_blocks_per_target() {
    let program = Program::from_json(FIZZBUZZ).unwrap();
    assert!(!validate(&program).has_error());

    assert_eq!(
        render_default(&program, Target::Python),
        "for i in range(1, 16):\n\
         \x20   if i % 15 == 0:\n\
         \x20       print(\"FizzBuzz\")\n\
         \x20   elif i % 3 == 0:\n\
         \x20       print(\"Fizz\")\n\
         \x20   else:\n\
         \x20       print(i)\n"
    );
    assert_eq!(
        render_default(&program, Target::Vba),
        "Sub Main()\n\
         \x20   For i = 1 To 15\n\
         \x20       If i Mod 15 = 0 Then\n\
         \x20           Debug.Print \"FizzBuzz\"\n\
         \x20       ElseIf i Mod 3 = 0 Then\n\
         \x20           Debug.Print \"Fizz\"\n\
         \x20       Else\n\
         \x20           Debug.Print i\n\
         \x20       End If\n\
         \x20   Next i\n\
         End Sub\n"
    );
}

#[test]
fn test_invalid_json_program_reports_lines() {
    let program = Program::from_json(
        r#"[
            {"id": "1", "kind": "assign", "tokens": ["MAX", "3"], "isConstant": true},
            {"id": "2", "kind": "while", "tokens": ["MAX > (0"]},
            {"id": "3", "kind": "increment", "tokens": ["MAX", "1"]}
        ]"#,
    )
    .unwrap();
    let report = validate(&program);
    assert_eq!(report.line_numbers(), vec![2, 2, 3]);

    let err = render(&program, Target::Ruby, &RenderOptions::default()).unwrap_err();
    assert!(matches!(err.kind, CodeGenErrorKind::InvalidProgram(ref errors) if errors.len() == 3));
}

#[test]
fn test_operand_form_to_rendered_line() {
    let bag = OperandBag::new()
        .with("left_operand_0", "total")
        .with("right_operand_0", "total")
        .with("right_operator_0", "＋")
        .with("right_operand_1", "x")
        .with("right_function_1", "Square")
        .with("right_argc_1", "1");
    let tokens = build_tokens(StatementKind::Assign, &bag, &[]).unwrap();
    let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
    let program = Program::new(vec![StatementNode::new("1", StatementKind::Assign, &refs)]);

    assert_eq!(
        render_default(&program, Target::JavaScript),
        "total = total + (x * x);\n"
    );
}

#[test]
fn test_edit_then_render() {
    let program = Program::new(vec![
        StatementNode::new("1", StatementKind::Assign, &["LIMIT", "Exponentiation(2, 8)"]),
        StatementNode::new("2", StatementKind::Output, &["LIMIT"]),
    ]);
    let edited = program
        .set_property(&NodeId::new("1"), NodeProperty::Constant, |v| !v)
        .unwrap();
    assert_eq!(
        render_default(&edited, Target::JavaScript),
        "const LIMIT = (2 ** 8);\nconsole.log(LIMIT);\n"
    );
    assert_eq!(
        render_default(&program, Target::Python),
        "LIMIT = (2 ** 8)\nprint(LIMIT)\n"
    );
}

#[test]
fn test_normalize_fragment() {
    assert_eq!(normalize("Square(5)", Target::Ruby).unwrap(), "(5 * 5)");
    assert_eq!(normalize("(ａ > 1)でない", Target::Python).unwrap(), "not (a > 1)");
    assert!(normalize("Random(5, 1)", Target::Python).is_err());
}

#[tokio::test]
async fn test_render_all_targets() {
    let program = Arc::new(Program::from_json(FIZZBUZZ).unwrap());
    let outputs = render_all(
        program,
        &RenderOptions::default(),
        &CodepointTransliterator,
        &TransliterationCache::new(),
    )
    .await
    .unwrap();
    assert_eq!(outputs.keys().copied().collect::<Vec<_>>(), Target::ALL.to_vec());
    assert!(outputs[&Target::JavaScript].starts_with("for (let i = 1; i <= 15; i++) {\n"));
    assert!(outputs[&Target::Ruby].starts_with("(1..15).each do |i|\n"));
}

#[test]
fn test_target_keywords_and_helper_names_refused() {
    for name in ["lambda", "delete", "retry", "Resume", "fill_index", "random"] {
        let program = Program::new(vec![StatementNode::new(
            "1",
            StatementKind::Assign,
            &[name, "1"],
        )]);
        assert_eq!(validate(&program).line_numbers(), vec![1], "{name}");
        for target in Target::ALL {
            assert!(
                render(&program, target, &RenderOptions::default()).is_err(),
                "{name} rendered for {target}"
            );
        }
    }
}

#[test]
fn test_duplicate_ids_do_not_hang_rendering() {
    let program = Program::from_json(
        r#"[
            {"id": "x", "kind": "if", "tokens": ["a"], "children": [
                {"id": "x", "kind": "break"}
            ]},
            {"id": "e", "kind": "endIf"}
        ]"#,
    )
    .unwrap();
    let err = render(&program, Target::JavaScript, &RenderOptions::default()).unwrap_err();
    assert!(
        err.validation_errors()
            .iter()
            .any(|e| e.to_string() == "line 2: statement id `x` is already used on line 1"),
        "{err}"
    );
}

#[test]
fn test_quoted_string_output() {
    let bag = OperandBag::new()
        .with("left_operand_0", r#"say "hi""#)
        .with("left_type_0", "string");
    let tokens = build_tokens(StatementKind::Output, &bag, &[]).unwrap();
    let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
    let program = Program::new(vec![StatementNode::new("1", StatementKind::Output, &refs)]);

    assert_eq!(
        render_default(&program, Target::JavaScript),
        "console.log(\"say \\\"hi\\\"\");\n"
    );
    assert!(render_default(&program, Target::Vba).contains(r#"Debug.Print "say ""hi""""#));
}
