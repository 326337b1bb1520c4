//! Persistent prediction context (§3, §4.C): a singly-linked stack of ATN
//! return-state integers, hash-consed across one simulator instance.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::transition::ATNStateRef;

pub const EMPTY_RETURN_STATE: ATNStateRef = usize::MAX;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum PredictionContext {
    Empty,
    Singleton { parent: Arc<PredictionContext>, return_state: ATNStateRef },
    Array { parents: Vec<Arc<PredictionContext>>, return_states: Vec<ATNStateRef> },
}

static EMPTY: Lazy<Arc<PredictionContext>> = Lazy::new(|| Arc::new(PredictionContext::Empty));

impl PredictionContext {
    pub fn empty() -> Arc<PredictionContext> {
        EMPTY.clone()
    }

    pub fn size(&self) -> usize {
        match self {
            PredictionContext::Empty => 1,
            PredictionContext::Singleton { .. } => 1,
            PredictionContext::Array { return_states, .. } => return_states.len(),
        }
    }

    pub fn get_return_state(&self, i: usize) -> ATNStateRef {
        match self {
            PredictionContext::Empty => EMPTY_RETURN_STATE,
            PredictionContext::Singleton { return_state, .. } => {
                assert_eq!(i, 0);
                *return_state
            }
            PredictionContext::Array { return_states, .. } => return_states[i],
        }
    }

    pub fn get_parent(&self, i: usize) -> Arc<PredictionContext> {
        match self {
            PredictionContext::Empty => PredictionContext::empty(),
            PredictionContext::Singleton { parent, .. } => {
                assert_eq!(i, 0);
                parent.clone()
            }
            PredictionContext::Array { parents, .. } => parents[i].clone(),
        }
    }

    /// True iff some path through this context ends at [`EMPTY_RETURN_STATE`].
    pub fn has_empty_path(&self) -> bool {
        match self {
            PredictionContext::Empty => true,
            PredictionContext::Singleton { return_state, .. } => *return_state == EMPTY_RETURN_STATE,
            PredictionContext::Array { return_states, .. } => {
                return_states.last().copied() == Some(EMPTY_RETURN_STATE)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PredictionContext::Empty)
    }
}

/// Hash-conses [`PredictionContext::Singleton`] creation and performs the
/// array-merge used when two configs reach the same state via different
/// call stacks (§4.C). One cons table per simulator instance — this is not
/// process-wide global state, only the interned `EMPTY` singleton above is.
#[derive(Default)]
pub struct PredictionContextCache {
    singletons: FxHashMap<(usize, ATNStateRef), Arc<PredictionContext>>,
}

impl PredictionContextCache {
    pub fn new() -> Self {
        PredictionContextCache { singletons: FxHashMap::default() }
    }

    /// Returns a (possibly shared) singleton context `parent -> return_state`.
    pub fn create(&mut self, parent: Arc<PredictionContext>, return_state: ATNStateRef) -> Arc<PredictionContext> {
        let key = (Arc::as_ptr(&parent) as usize, return_state);
        if let Some(existing) = self.singletons.get(&key) {
            return existing.clone();
        }
        let created = Arc::new(PredictionContext::Singleton { parent, return_state });
        self.singletons.insert(key, created.clone());
        created
    }

    /// Merges two contexts reaching the same ATN state via different call
    /// stacks into a minimal `Array` context (parents/return-states deduped
    /// and sorted by return state for a canonical, hashable representation).
    pub fn merge(&self, a: &Arc<PredictionContext>, b: &Arc<PredictionContext>) -> Arc<PredictionContext> {
        if Arc::ptr_eq(a, b) {
            return a.clone();
        }
        let mut pairs: Vec<(ATNStateRef, Arc<PredictionContext>)> = Vec::new();
        Self::flatten(a, &mut pairs);
        Self::flatten(b, &mut pairs);
        pairs.sort_by_key(|(rs, _)| *rs);
        pairs.dedup_by(|x, y| x.0 == y.0 && Arc::ptr_eq(&x.1, &y.1));

        if pairs.len() == 1 {
            let (return_state, parent) = pairs.into_iter().next().unwrap();
            return Arc::new(PredictionContext::Singleton { parent, return_state });
        }
        let (return_states, parents): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Arc::new(PredictionContext::Array { parents, return_states })
    }

    fn flatten(ctx: &Arc<PredictionContext>, out: &mut Vec<(ATNStateRef, Arc<PredictionContext>)>) {
        match ctx.as_ref() {
            PredictionContext::Empty => out.push((EMPTY_RETURN_STATE, PredictionContext::empty())),
            PredictionContext::Singleton { parent, return_state } => out.push((*return_state, parent.clone())),
            PredictionContext::Array { parents, return_states } => {
                for (rs, p) in return_states.iter().zip(parents.iter()) {
                    out.push((*rs, p.clone()));
                }
            }
        }
    }
}
