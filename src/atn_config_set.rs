//! Ordered, deduped `ATNConfigSet` (§3, §4.D, §9 "Ordered set keyed by
//! structural hash"): a vector for insertion order plus a hash index for
//! O(1) membership, keyed by `LexerATNConfig`'s full structural equality.

use rustc_hash::FxHashSet;

use crate::atn_config::LexerATNConfig;

#[derive(Clone, Debug, Default)]
pub struct ATNConfigSet {
    configs: Vec<LexerATNConfig>,
    seen: FxHashSet<LexerATNConfig>,
    read_only: bool,
    has_semantic_context: bool,
}

impl ATNConfigSet {
    pub fn new() -> Self {
        ATNConfigSet::default()
    }

    /// Adds `config` if an equal one (§3 full five-field equality) isn't
    /// already present. Returns whether it was newly added.
    pub fn add(&mut self, config: LexerATNConfig) -> bool {
        assert!(!self.read_only, "attempt to mutate a frozen ATNConfigSet");
        if self.seen.contains(&config) {
            return false;
        }
        self.seen.insert(config.clone());
        self.configs.push(config);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &LexerATNConfig> {
        self.configs.iter()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn set_has_semantic_context(&mut self, v: bool) {
        self.has_semantic_context = v;
    }

    pub fn has_semantic_context(&self) -> bool {
        self.has_semantic_context
    }

    /// Freezes the set: no further `add` is permitted. DFA states always
    /// hold a frozen config set (§3 "Lifecycles").
    pub fn freeze(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl PartialEq for ATNConfigSet {
    fn eq(&self, other: &Self) -> bool {
        self.configs == other.configs
    }
}
impl Eq for ATNConfigSet {}

impl std::hash::Hash for ATNConfigSet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for c in &self.configs {
            c.hash(state);
        }
        self.configs.len().hash(state);
    }
}
