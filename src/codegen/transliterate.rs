//! Identifier transliteration for ASCII-only targets.
//!
//! VBA rejects non-ASCII identifiers, so before rendering VBA every such name
//! in the program is mapped to an ASCII one. The mapping comes from an
//! asynchronous [`Transliterator`] (typically a remote service) with results
//! memoized in a caller-owned [`TransliterationCache`]. Rendering itself
//! stays synchronous: it consults the finished [`IdentifierMap`].

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write;
use std::future::Future;

use log::{debug, info};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::ast::ExprKind;
use crate::model::{Program, flatten};
use crate::normalizer;
use crate::operand::is_variable_name;

use super::error::CodeGenError;

/// Failure at the transliteration boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransliterationError {
    #[error("could not transliterate `{text}`: {reason}")]
    Failed { text: String, reason: String },

    #[error("`{text}` transliterated to `{result}`, which is not an ASCII identifier")]
    InvalidResult { text: String, result: String },
}

/// Maps a name to an ASCII spelling.
pub trait Transliterator: Send + Sync {
    fn transliterate(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<String, TransliterationError>> + Send;
}

/// Deterministic offline transliterator: each non-ASCII character becomes
/// `_u` followed by its code point in hex.
///
/// ```
/// use pseudoblocks::codegen::CodepointTransliterator;
///
/// assert_eq!(CodepointTransliterator::spell("合計"), "v_u5408_u8a08");
/// assert_eq!(CodepointTransliterator::spell("x合"), "x_u5408");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct CodepointTransliterator;

impl CodepointTransliterator {
    pub fn spell(text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        for c in text.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                out.push(c);
            } else {
                let _ = write!(out, "_u{:x}", c as u32);
            }
        }
        if !out.starts_with(|c: char| c.is_ascii_alphabetic()) {
            out.insert(0, 'v');
        }
        out
    }
}

impl Transliterator for CodepointTransliterator {
    async fn transliterate(&self, text: &str) -> Result<String, TransliterationError> {
        Ok(Self::spell(text))
    }
}

/// Thread-safe memo of transliteration results, shared across renders.
#[derive(Debug, Default)]
pub struct TransliterationCache {
    entries: RwLock<HashMap<String, String>>,
}

impl TransliterationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, text: &str) -> Option<String> {
        self.entries.read().await.get(text).cloned()
    }

    pub async fn insert(&self, text: impl Into<String>, result: impl Into<String>) {
        self.entries.write().await.insert(text.into(), result.into());
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Cached result, or a fresh one from `transliterator` which is then cached.
    pub async fn resolve<T: Transliterator>(
        &self,
        transliterator: &T,
        text: &str,
    ) -> Result<String, TransliterationError> {
        if let Some(hit) = self.get(text).await {
            return Ok(hit);
        }
        let result = transliterator.transliterate(text).await?;
        if !result.is_ascii() || !is_variable_name(&result) {
            return Err(TransliterationError::InvalidResult {
                text: text.to_string(),
                result,
            });
        }
        debug!("transliterated `{text}` to `{result}`");
        self.insert(text, result.clone()).await;
        Ok(result)
    }
}

/// Rendered spelling for each program identifier that needed one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMap {
    names: HashMap<String, String>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, spelling: impl Into<String>) {
        self.names.insert(name.into(), spelling.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Every identifier the program's expression slots mention, in sorted order.
///
/// Dotted names (`xs.length`) contribute each segment.
pub fn program_identifiers(program: &Program) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for item in flatten(program) {
        for slot in item.kind.expression_slots(item.tokens.len()) {
            let token = item.tokens[slot].as_str();
            let exprs = if item.kind.is_list_slot(slot) {
                normalizer::prepare_list(token).unwrap_or_default()
            } else {
                normalizer::prepare(token).map(|e| vec![e]).unwrap_or_default()
            };
            for expr in &exprs {
                expr.walk(&mut |e| match &e.kind {
                    ExprKind::Identifier(name) | ExprKind::Call { name, .. } => {
                        names.extend(name.split('.').map(str::to_string));
                    }
                    _ => {}
                });
            }
        }
    }
    names
}

/// Identifiers that an ASCII-only target cannot spell as written.
pub fn non_ascii_identifiers(program: &Program) -> BTreeSet<String> {
    program_identifiers(program)
        .into_iter()
        .filter(|name| !name.is_ascii())
        .collect()
}

/// Builds the identifier map for `program`.
///
/// Spellings are unique: a result that collides with another identifier or
/// an earlier spelling gets a numeric suffix.
pub async fn resolve_identifiers<T: Transliterator>(
    program: &Program,
    transliterator: &T,
    cache: &TransliterationCache,
) -> Result<IdentifierMap, CodeGenError> {
    let all = program_identifiers(program);
    let mut taken: HashSet<String> = all.iter().filter(|n| n.is_ascii()).cloned().collect();
    let mut map = IdentifierMap::new();

    for name in all.iter().filter(|n| !n.is_ascii()) {
        let base = cache.resolve(transliterator, name).await?;
        let mut spelling = base.clone();
        let mut suffix = 2;
        while !taken.insert(spelling.clone()) {
            spelling = format!("{base}_{suffix}");
            suffix += 1;
        }
        map.insert(name.clone(), spelling);
    }

    if !map.is_empty() {
        info!("mapped {} identifier(s) to ASCII", map.len());
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::model::StatementKind::*;
    use crate::model::tests::node;

    /// Counts calls and returns a fixed spelling.
    struct Fixed {
        spelling: &'static str,
        calls: AtomicUsize,
    }

    impl Transliterator for Fixed {
        async fn transliterate(&self, _text: &str) -> Result<String, TransliterationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.spelling.to_string())
        }
    }

    fn japanese_program() -> Program {
        Program::new(vec![
            node("1", Assign, &["合計", "0"]),
            node("2", Assign, &["個数", "合計 + 1"]),
            node("3", Output, &["合計", "total"]),
        ])
    }

    #[test]
    fn test_spell() {
        assert_eq!(CodepointTransliterator::spell("abc"), "abc");
        assert_eq!(CodepointTransliterator::spell("_x"), "v_x");
    }

    #[test]
    fn test_program_identifiers() {
        let names = program_identifiers(&japanese_program());
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["total", "個数", "合計"]
        );
        assert_eq!(non_ascii_identifiers(&japanese_program()).len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_identifiers() {
        let cache = TransliterationCache::new();
        let map = resolve_identifiers(&japanese_program(), &CodepointTransliterator, &cache)
            .await
            .unwrap();
        assert_eq!(map.get("合計"), Some("v_u5408_u8a08"));
        assert_eq!(map.get("total"), None);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_collisions_get_suffixes() {
        let fixed = Fixed {
            spelling: "total",
            calls: AtomicUsize::new(0),
        };
        let cache = TransliterationCache::new();
        let map = resolve_identifiers(&japanese_program(), &fixed, &cache)
            .await
            .unwrap();
        let mut spellings: Vec<&str> = ["個数", "合計"].iter().filter_map(|n| map.get(n)).collect();
        spellings.sort();
        assert_eq!(spellings, vec!["total_2", "total_3"]);
    }

    #[tokio::test]
    async fn test_cache_avoids_repeat_calls() {
        let fixed = Fixed {
            spelling: "sum",
            calls: AtomicUsize::new(0),
        };
        let cache = TransliterationCache::new();
        let program = Program::new(vec![node("1", Output, &["合計"])]);
        resolve_identifiers(&program, &fixed, &cache).await.unwrap();
        resolve_identifiers(&program, &fixed, &cache).await.unwrap();
        assert_eq!(fixed.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_result_rejected() {
        let fixed = Fixed {
            spelling: "not valid",
            calls: AtomicUsize::new(0),
        };
        let program = Program::new(vec![node("1", Output, &["合計"])]);
        let err = resolve_identifiers(&program, &fixed, &TransliterationCache::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not an ASCII identifier"));
    }
}
