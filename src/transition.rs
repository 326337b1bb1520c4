//! Tagged transition variants (§3). A tagged `enum` is used instead of
//! subclass dispatch; `matches`/serialization-kind behaviors are data-driven
//! on the tag, per the design notes (§9).

use crate::int_stream::EOF;
use crate::interval_set::IntervalSet;

pub type ATNStateRef = usize;

#[derive(Clone, Debug)]
pub enum Transition {
    Atom { target: ATNStateRef, code_point: isize },
    Range { target: ATNStateRef, lo: isize, hi: isize },
    Set { target: ATNStateRef, set: IntervalSet },
    NotSet { target: ATNStateRef, set: IntervalSet },
    Epsilon { target: ATNStateRef },
    Rule { target: ATNStateRef, follow_state: ATNStateRef, rule_index: usize },
    Predicate { target: ATNStateRef, rule_index: usize, pred_index: usize, is_ctx_dependent: bool },
    Action { target: ATNStateRef, action_index: usize },
    /// Rejected during lexer closure (§3, §7 class 3); still representable so
    /// the type mirrors the full transition taxonomy of an ATN.
    Precedence { target: ATNStateRef, level: isize },
}

impl Transition {
    pub fn target(&self) -> ATNStateRef {
        match *self {
            Transition::Atom { target, .. }
            | Transition::Range { target, .. }
            | Transition::Set { target, .. }
            | Transition::NotSet { target, .. }
            | Transition::Epsilon { target }
            | Transition::Rule { target, .. }
            | Transition::Predicate { target, .. }
            | Transition::Action { target, .. }
            | Transition::Precedence { target, .. } => target,
        }
    }

    pub fn is_epsilon(&self) -> bool {
        !matches!(self, Transition::Atom { .. } | Transition::Range { .. } | Transition::Set { .. } | Transition::NotSet { .. })
    }

    /// Whether this transition consumes `symbol` (a code point, possibly `EOF`).
    /// `min_cp`/`max_cp` bound the vocabulary for `NotSet`'s complement check.
    pub fn matches(&self, symbol: isize, min_cp: isize, max_cp: isize) -> bool {
        match self {
            Transition::Atom { code_point, .. } => symbol == *code_point,
            Transition::Range { lo, hi, .. } => symbol >= *lo && symbol <= *hi,
            Transition::Set { set, .. } => set.contains(symbol),
            Transition::NotSet { set, .. } => {
                symbol != EOF && symbol >= min_cp && symbol <= max_cp && !set.contains(symbol)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_matches_bounds_inclusive() {
        let t = Transition::Range { target: 0, lo: 10, hi: 20 };
        assert!(t.matches(10, 0, 100));
        assert!(t.matches(20, 0, 100));
        assert!(!t.matches(21, 0, 100));
    }

    #[test]
    fn not_set_excludes_members_and_eof() {
        let mut set = IntervalSet::new();
        set.add_range(10, 20);
        let t = Transition::NotSet { target: 0, set };
        assert!(!t.matches(15, 0, 100));
        assert!(t.matches(5, 0, 100));
        assert!(!t.matches(EOF, 0, 100));
    }

    #[test]
    fn epsilon_classification() {
        assert!(Transition::Epsilon { target: 0 }.is_epsilon());
        assert!(!Transition::Atom { target: 0, code_point: 'a' as isize }.is_epsilon());
    }
}
