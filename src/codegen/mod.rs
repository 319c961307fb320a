//! Code generation for pseudoblocks.
//!
//! A valid statement tree renders to JavaScript, Python, VBA or Ruby. Every
//! backend shares one tree walk (`emitter`) and one expression printer
//! (`syntax`); a backend supplies its operator table and a per-statement
//! mapping.
//!
//! # Architecture
//!
//! ```text
//! Program → validate → CodeGenerator → GeneratedOutput
//!                           ↑
//!              JavaScript | Python | Vba | Ruby
//! ```
//!
//! Rendering refuses programs with validation errors. VBA additionally needs
//! ASCII identifiers; [`render_all`] resolves them through an asynchronous
//! [`Transliterator`] before rendering every target concurrently.
//!
//! # Example
//!
//! ```
//! use pseudoblocks::codegen::{RenderOptions, Target, render};
//! use pseudoblocks::model::{Program, StatementKind, StatementNode};
//!
//! let program = Program::new(vec![
//!     StatementNode::new("1", StatementKind::Assign, &["a", "2"]),
//!     StatementNode::new("2", StatementKind::Output, &["a"]),
//! ]);
//! let code = render(&program, Target::Python, &RenderOptions::default()).unwrap();
//! assert_eq!(code, "a = 2\nprint(a)\n");
//! ```

mod cache;
mod emitter;
mod error;
mod javascript;
mod python;
mod ruby;
mod syntax;
mod transliterate;
mod vba;

pub use cache::RenderCache;
pub use error::{CodeGenError, CodeGenErrorKind};
pub use javascript::JavaScript;
pub use python::Python;
pub use ruby::Ruby;
pub use transliterate::{
    CodepointTransliterator, IdentifierMap, TransliterationCache, TransliterationError,
    Transliterator, non_ascii_identifiers, program_identifiers, resolve_identifiers,
};
pub use vba::Vba;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::Program;
use crate::normalizer;
use crate::parser::ExprError;
use crate::semantic::validate;

use syntax::{ExprPrinter, ExprSyntax};

/// A language programs can be rendered to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[value(name = "javascript", alias = "js")]
    JavaScript,
    #[value(name = "python", alias = "py")]
    Python,
    #[value(name = "vba")]
    Vba,
    #[value(name = "ruby", alias = "rb")]
    Ruby,
}

impl Target {
    pub const ALL: [Target; 4] = [Target::JavaScript, Target::Python, Target::Vba, Target::Ruby];

    /// Display name of the language.
    pub fn name(self) -> &'static str {
        match self {
            Target::JavaScript => "JavaScript",
            Target::Python => "Python",
            Target::Vba => "VBA",
            Target::Ruby => "Ruby",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Target::JavaScript => "js",
            Target::Python => "py",
            Target::Vba => "bas",
            Target::Ruby => "rb",
        }
    }

    /// Whether identifiers must be ASCII in this language.
    pub fn requires_ascii_identifiers(self) -> bool {
        self == Target::Vba
    }

    /// The backend for this target.
    pub fn generator(self) -> &'static dyn CodeGenerator {
        match self {
            Target::JavaScript => &JavaScript,
            Target::Python => &Python,
            Target::Vba => &Vba,
            Target::Ruby => &Ruby,
        }
    }

    pub(crate) fn syntax(self) -> &'static ExprSyntax {
        match self {
            Target::JavaScript => &javascript::SYNTAX,
            Target::Python => &python::SYNTAX,
            Target::Vba => &vba::SYNTAX,
            Target::Ruby => &ruby::SYNTAX,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output from code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutput {
    /// The generated source code.
    pub code: String,

    /// Human-readable description of the output format.
    pub format: String,

    /// Suggested file extension for the output.
    pub extension: String,
}

impl GeneratedOutput {
    pub fn new(target: Target, code: String) -> Self {
        Self {
            code,
            format: target.name().to_string(),
            extension: target.extension().to_string(),
        }
    }
}

/// Layout settings shared by every backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Name of the `Sub` that wraps top-level VBA statements.
    pub entry_point: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            entry_point: "Main".to_string(),
        }
    }
}

/// Trait for code generation backends.
///
/// Backends receive programs that already passed validation; pairing and
/// token counts can be relied on.
pub trait CodeGenerator: Send + Sync {
    /// Generates code for a validated program.
    ///
    /// `idents` maps identifiers the target cannot spell as written.
    fn generate(
        &self,
        program: &Program,
        options: &RenderOptions,
        idents: Option<&IdentifierMap>,
    ) -> Result<GeneratedOutput, CodeGenError>;

    fn target(&self) -> Target;

    /// Returns the name of this backend for diagnostics.
    fn backend_name(&self) -> &str {
        self.target().name()
    }
}

/// Validates `program` and renders it for `target`.
///
/// Fails with [`CodeGenErrorKind::InvalidProgram`] when validation reports
/// any error, and with [`CodeGenErrorKind::Untransliterated`] when VBA is
/// asked for a program with non-ASCII identifiers (use [`render_with`] or
/// [`render_all`] for those).
pub fn render(
    program: &Program,
    target: Target,
    options: &RenderOptions,
) -> Result<String, CodeGenError> {
    check_valid(program)?;
    generate(program, target, options, None)
}

/// Like [`render`], with a precomputed identifier mapping.
pub fn render_with(
    program: &Program,
    target: Target,
    options: &RenderOptions,
    idents: &IdentifierMap,
) -> Result<String, CodeGenError> {
    check_valid(program)?;
    generate(program, target, options, Some(idents))
}

/// Validates once, resolves VBA identifiers, then renders every target.
///
/// Each render runs on the blocking pool; the tree is shared read-only. Only
/// targets that need ASCII identifiers see the mapping.
pub async fn render_all<T: Transliterator>(
    program: Arc<Program>,
    options: &RenderOptions,
    transliterator: &T,
    cache: &TransliterationCache,
) -> Result<BTreeMap<Target, String>, CodeGenError> {
    check_valid(&program)?;
    let idents = Arc::new(resolve_identifiers(&program, transliterator, cache).await?);

    let handles: Vec<_> = Target::ALL
        .into_iter()
        .map(|target| {
            let program = Arc::clone(&program);
            let options = options.clone();
            let idents = Arc::clone(&idents);
            let handle = tokio::task::spawn_blocking(move || {
                let idents = target.requires_ascii_identifiers().then_some(idents.as_ref());
                generate(&program, target, &options, idents)
            });
            (target, handle)
        })
        .collect();

    let mut outputs = BTreeMap::new();
    for (target, handle) in handles {
        let code = handle
            .await
            .map_err(|err| CodeGenError::internal(format!("render task failed: {err}")))??;
        outputs.insert(target, code);
    }
    Ok(outputs)
}

/// Normalizes one expression fragment and prints it for `target`.
///
/// Built-ins are rewritten (`Square(5)` → `(5 * 5)`) and full-width text is
/// folded. Printing the result again yields the same text.
pub fn normalize(fragment: &str, target: Target) -> Result<String, ExprError> {
    let expr = normalizer::prepare(fragment)?;
    Ok(ExprPrinter::new(target.syntax(), None).print(&expr))
}

fn check_valid(program: &Program) -> Result<(), CodeGenError> {
    let report = validate(program);
    if report.has_error() {
        return Err(CodeGenError::invalid_program(report.errors));
    }
    Ok(())
}

fn generate(
    program: &Program,
    target: Target,
    options: &RenderOptions,
    idents: Option<&IdentifierMap>,
) -> Result<String, CodeGenError> {
    if target.requires_ascii_identifiers() {
        let missing: Vec<String> = non_ascii_identifiers(program)
            .into_iter()
            .filter(|name| idents.is_none_or(|map| map.get(name).is_none()))
            .collect();
        if !missing.is_empty() {
            return Err(CodeGenError::new(CodeGenErrorKind::Untransliterated(missing)));
        }
    }
    let output = target.generator().generate(program, options, idents)?;
    debug!(
        "rendered {} statement(s) as {}",
        program.len(),
        output.format
    );
    Ok(output.code)
}
