//! Deferred lexer actions (§4.E). Actions are recorded during simulation and
//! fired only once the winning accept is committed and the input has been
//! repositioned back to the accept point.

use std::sync::Arc;

use crate::recognizer::Recognizer;

/// One entry in an ATN's lexer-action table (§4.B), referenced by index from
/// `Action` transitions.
#[derive(Clone, Debug)]
pub enum LexerAction {
    /// Fires a grammar-defined action callback. Not position-dependent.
    Custom { rule_index: usize, action_index: usize },
    /// `-> skip`.
    Skip,
    /// `-> more`.
    More,
    /// `-> mode(m)`.
    Mode { mode: usize },
    /// `-> pushMode(m)`.
    PushMode { mode: usize },
    /// `-> popMode`.
    PopMode,
    /// `-> type(t)`.
    Type { token_type: isize },
    /// `-> channel(c)`.
    Channel { channel: isize },
    /// Position-dependent: must be replayed at `startIndex + offset`, where
    /// `offset` is bound once by [`LexerActionExecutor::fix_offset_before_match`].
    Text { replacement: Arc<str> },
}

impl LexerAction {
    pub fn is_position_dependent(&self) -> bool {
        matches!(self, LexerAction::Custom { .. } | LexerAction::Text { .. })
    }
}

/// The result a [`LexerActionExecutor`] hands back to the driver (§4.H):
/// most actions are opaque side effects, but a handful change how the
/// current token is emitted.
#[derive(Default, Clone, Copy, Debug)]
pub struct LexerActionEffects {
    pub skip: bool,
    pub more: bool,
    pub mode: Option<usize>,
    pub push_mode: Option<usize>,
    pub pop_mode: bool,
    pub type_override: Option<isize>,
    pub channel_override: Option<isize>,
}

/// One bound action: the table index plus, for position-dependent actions,
/// the offset (relative to token start) at which it must fire.
#[derive(Clone, Debug)]
struct BoundAction {
    action: Arc<LexerAction>,
    offset: Option<usize>,
}

/// An immutable, ordered vector of lexer actions (§3, §4.E). Cheap to clone
/// (`Arc`-shared) because it is carried on every [`crate::atn_config::LexerATNConfig`].
#[derive(Clone, Debug, Default)]
pub struct LexerActionExecutor {
    actions: Vec<BoundAction>,
}

impl PartialEq for LexerActionExecutor {
    fn eq(&self, other: &Self) -> bool {
        self.actions.len() == other.actions.len()
            && self
                .actions
                .iter()
                .zip(other.actions.iter())
                .all(|(a, b)| Arc::ptr_eq(&a.action, &b.action) && a.offset == b.offset)
    }
}
impl Eq for LexerActionExecutor {}

impl std::hash::Hash for LexerActionExecutor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.actions.len().hash(state);
        for a in &self.actions {
            (Arc::as_ptr(&a.action) as usize).hash(state);
            a.offset.hash(state);
        }
    }
}

impl LexerActionExecutor {
    pub fn empty() -> Self {
        LexerActionExecutor { actions: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns a *new* executor with `action` appended; the original is left
    /// untouched (persistent data structure, matches prediction contexts).
    pub fn append(existing: &LexerActionExecutor, action: Arc<LexerAction>) -> Self {
        let mut actions = existing.actions.clone();
        actions.push(BoundAction { action, offset: None });
        LexerActionExecutor { actions }
    }

    /// Returns a new executor in which every position-dependent action is
    /// bound to `offset` (§4.E), so it can be replayed after the scanner
    /// seeks back to the accept index.
    pub fn fix_offset_before_match(&self, offset: usize) -> Self {
        let actions = self
            .actions
            .iter()
            .map(|b| {
                if b.action.is_position_dependent() && b.offset.is_none() {
                    BoundAction { action: b.action.clone(), offset: Some(offset) }
                } else {
                    b.clone()
                }
            })
            .collect();
        LexerActionExecutor { actions }
    }

    /// Executes every action in order. Position-dependent actions seek the
    /// input to `start_index + offset` before firing and restore afterward.
    pub fn execute<R: Recognizer>(
        &self,
        recognizer: &mut R,
        input: &mut dyn crate::int_stream::IntStream,
        start_index: usize,
    ) -> LexerActionEffects {
        let mut effects = LexerActionEffects::default();
        let saved_index = input.index();
        for bound in &self.actions {
            if let Some(offset) = bound.offset {
                input.seek(start_index + offset);
            }
            match bound.action.as_ref() {
                LexerAction::Custom { rule_index, action_index } => {
                    recognizer.action(*rule_index, *action_index);
                }
                LexerAction::Skip => effects.skip = true,
                LexerAction::More => effects.more = true,
                LexerAction::Mode { mode } => effects.mode = Some(*mode),
                LexerAction::PushMode { mode } => effects.push_mode = Some(*mode),
                LexerAction::PopMode => effects.pop_mode = true,
                LexerAction::Type { token_type } => effects.type_override = Some(*token_type),
                LexerAction::Channel { channel } => effects.channel_override = Some(*channel),
                LexerAction::Text { .. } => {}
            }
            if bound.offset.is_some() {
                input.seek(saved_index);
            }
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_does_not_mutate_original() {
        let base = LexerActionExecutor::empty();
        let appended = LexerActionExecutor::append(&base, Arc::new(LexerAction::Skip));
        assert!(base.is_empty());
        assert!(!appended.is_empty());
    }

    #[test]
    fn fix_offset_only_binds_position_dependent_actions() {
        let base = LexerActionExecutor::append(&LexerActionExecutor::empty(), Arc::new(LexerAction::Skip));
        let base = LexerActionExecutor::append(&base, Arc::new(LexerAction::Custom { rule_index: 0, action_index: 0 }));
        let fixed = base.fix_offset_before_match(3);
        assert_eq!(fixed.actions[0].offset, None);
        assert_eq!(fixed.actions[1].offset, Some(3));
    }
}
