//! Memoized renders keyed by tree content.
//!
//! Editors re-render on every change, and most changes (collapsing a block,
//! re-rendering after an undo) leave the rendered code unchanged. Entries
//! are keyed by [`Program::content_hash`], which ignores node ids and editor
//! flags, plus the target.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::trace;

use crate::model::Program;

use super::{CodeGenError, RenderOptions, Target, render};

/// Cache of rendered code for one set of [`RenderOptions`].
#[derive(Debug, Default)]
pub struct RenderCache {
    options: RenderOptions,
    entries: HashMap<(u64, Target), String>,
    hits: usize,
}

impl RenderCache {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Rendered code for `program`, reusing an earlier render of the same content.
    ///
    /// Failed renders are not cached.
    pub fn render(&mut self, program: &Program, target: Target) -> Result<&str, CodeGenError> {
        let key = (program.content_hash(), target);
        let code = match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                trace!("render cache hit for {target}");
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(render(program, target, &self.options)?),
        };
        Ok(code.as_str())
    }

    /// Drops every entry not rendered from `program`'s current content.
    pub fn retain_current(&mut self, program: &Program) {
        let hash = program.content_hash();
        self.entries.retain(|(key, _), _| *key == hash);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of renders served from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeId;
    use crate::model::StatementKind::*;
    use crate::model::tests::{node, sample_program};

    #[test]
    fn test_repeat_render_hits() {
        let mut cache = RenderCache::new(RenderOptions::default());
        let program = sample_program();
        let first = cache.render(&program, Target::Python).unwrap().to_string();
        let second = cache.render(&program, Target::Python).unwrap().to_string();
        assert_eq!(first, second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ids_do_not_affect_key() {
        let mut cache = RenderCache::new(RenderOptions::default());
        let program = sample_program();
        let mut renamed = sample_program();
        renamed.statements[0].id = NodeId::new("fresh");
        cache.render(&program, Target::Ruby).unwrap();
        cache.render(&renamed, Target::Ruby).unwrap();
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_targets_cached_separately() {
        let mut cache = RenderCache::new(RenderOptions::default());
        let program = sample_program();
        for target in Target::ALL {
            cache.render(&program, target).unwrap();
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_retain_current_drops_stale() {
        let mut cache = RenderCache::new(RenderOptions::default());
        let old = sample_program();
        cache.render(&old, Target::JavaScript).unwrap();
        let edited = Program::new(vec![node("1", Output, &["1"])]);
        cache.render(&edited, Target::JavaScript).unwrap();
        cache.retain_current(&edited);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_not_cached() {
        let mut cache = RenderCache::new(RenderOptions::default());
        let program = Program::new(vec![node("1", Break, &[])]);
        assert!(cache.render(&program, Target::Python).is_err());
        assert!(cache.is_empty());
    }
}
