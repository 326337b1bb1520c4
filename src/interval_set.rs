//! Sorted, disjoint integer-range set algebra.
//!
//! Every [`IntervalSet`] maintains the invariant that its intervals are sorted
//! by lower bound and that no two intervals are adjacent or overlapping; see
//! [`IntervalSet::invariant_check`] for the check used by tests.

use std::fmt;

use once_cell::sync::Lazy;

use crate::int_stream::EOF;

/// Upper bound used by callers that want "every valid code point".
pub const MAX_CHAR_VALUE: isize = 0x10FFFF;

const INTERVAL_POOL_MAX_VALUE: isize = 1000;

/// An immutable inclusive range `[a, b]`. `b < a` denotes an empty interval.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Interval {
    pub a: isize,
    pub b: isize,
}

impl Interval {
    pub const INVALID: Interval = Interval { a: -1, b: -2 };

    pub fn new(a: isize, b: isize) -> Self {
        Interval { a, b }
    }

    pub fn len(&self) -> isize {
        if self.b < self.a { 0 } else { self.b - self.a + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.b < self.a
    }

    fn adjacent_or_overlapping(&self, other: &Interval) -> bool {
        self.a <= other.b + 1 && other.a <= self.b + 1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == self.b {
            write!(f, "{}", self.a)
        } else {
            write!(f, "{}..{}", self.a, self.b)
        }
    }
}

/// Interns singleton intervals `[a, a]` for `a` in `[0, INTERVAL_POOL_MAX_VALUE]`,
/// so small singletons used pervasively by `Atom` transitions don't each allocate.
static SINGLETON_POOL: Lazy<Vec<Interval>> = Lazy::new(|| {
    (0..=INTERVAL_POOL_MAX_VALUE)
        .map(|v| Interval::new(v, v))
        .collect()
});

/// Returns the interned singleton `[a, a]` when `a` is small enough to be pooled.
pub fn pooled_singleton(a: isize) -> Interval {
    if (0..=INTERVAL_POOL_MAX_VALUE).contains(&a) {
        SINGLETON_POOL[a as usize]
    } else {
        Interval::new(a, a)
    }
}

/// A sorted vector of non-overlapping, non-adjacent [`Interval`]s.
///
/// Once [`IntervalSet::set_read_only`] has been called, every mutating method
/// panics; this mirrors the ANTLR runtimes' "frozen after first use" sets,
/// which are shared freely once they've been installed in a DFA state.
#[derive(Clone, Default, Eq, PartialEq, Hash, Debug)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
    read_only: bool,
}

impl IntervalSet {
    pub fn new() -> Self {
        IntervalSet { intervals: Vec::new(), read_only: false }
    }

    pub fn of(a: isize, b: isize) -> Self {
        let mut set = IntervalSet::new();
        set.add_range(a, b);
        set
    }

    pub fn set_read_only(&mut self) {
        self.read_only = true;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn assert_mutable(&self) {
        assert!(!self.read_only, "attempt to mutate a read-only IntervalSet");
    }

    /// Merges `[a, b]` into the set, coalescing adjacent or overlapping runs.
    pub fn add_range(&mut self, a: isize, b: isize) {
        self.assert_mutable();
        if b < a {
            return;
        }
        let incoming = Interval::new(a, b);
        let mut insert_at = self.intervals.len();
        for (i, existing) in self.intervals.iter().enumerate() {
            if incoming.adjacent_or_overlapping(existing) {
                insert_at = i;
                break;
            }
            if incoming.b < existing.a - 1 {
                insert_at = i;
                break;
            }
        }
        self.intervals.insert(insert_at.min(self.intervals.len()), incoming);
        self.coalesce_from(insert_at.saturating_sub(1).min(self.intervals.len().saturating_sub(1)));
    }

    pub fn add_one(&mut self, v: isize) {
        self.add_range(v, v);
    }

    pub fn add_interval(&mut self, i: Interval) {
        self.add_range(i.a, i.b);
    }

    fn coalesce_from(&mut self, start: usize) {
        let mut i = start;
        while i + 1 < self.intervals.len() {
            let cur = self.intervals[i];
            let next = self.intervals[i + 1];
            if cur.b + 1 >= next.a {
                self.intervals[i] = Interval::new(cur.a.min(next.a), cur.b.max(next.b));
                self.intervals.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn size(&self) -> isize {
        self.intervals.iter().map(Interval::len).sum()
    }

    pub fn min(&self) -> Option<isize> {
        self.intervals.first().map(|i| i.a)
    }

    pub fn max(&self) -> Option<isize> {
        self.intervals.last().map(|i| i.b)
    }

    /// O(log n) binary search for membership.
    pub fn contains(&self, v: isize) -> bool {
        if v == EOF {
            return false;
        }
        let idx = self.intervals.partition_point(|iv| iv.b < v);
        self.intervals.get(idx).map_or(false, |iv| iv.a <= v)
    }

    pub fn to_list(&self) -> Vec<isize> {
        let mut out = Vec::with_capacity(self.size().max(0) as usize);
        for iv in &self.intervals {
            out.extend(iv.a..=iv.b);
        }
        out
    }

    pub fn union(&self, other: &IntervalSet) -> IntervalSet {
        let mut out = IntervalSet::new();
        for iv in self.intervals.iter().chain(other.intervals.iter()) {
            out.add_interval(*iv);
        }
        out
    }

    pub fn intersection(&self, other: &IntervalSet) -> IntervalSet {
        let mut out = IntervalSet::new();
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.intervals.len() && j < other.intervals.len() {
            let a = self.intervals[i];
            let b = other.intervals[j];
            let lo = a.a.max(b.a);
            let hi = a.b.min(b.b);
            if lo <= hi {
                out.add_range(lo, hi);
            }
            if a.b < b.b {
                i += 1;
            } else {
                j += 1;
            }
        }
        out
    }

    /// `self \ other`: walks both sorted lists with two indices, splitting
    /// `self`'s current interval at most into `[a, other.a-1]` and `[other.b+1, b]`.
    pub fn subtract(&self, other: &IntervalSet) -> IntervalSet {
        let mut out = IntervalSet::new();
        for &iv in &self.intervals {
            let mut remaining = vec![iv];
            for &sub in &other.intervals {
                let mut next = Vec::new();
                for r in remaining {
                    if sub.b < r.a || sub.a > r.b {
                        next.push(r);
                        continue;
                    }
                    if sub.a > r.a {
                        next.push(Interval::new(r.a, sub.a - 1));
                    }
                    if sub.b < r.b {
                        next.push(Interval::new(sub.b + 1, r.b));
                    }
                }
                remaining = next;
            }
            for r in remaining {
                out.add_interval(r);
            }
        }
        out
    }

    pub fn complement(&self, vocabulary: &IntervalSet) -> IntervalSet {
        vocabulary.subtract(self)
    }

    pub fn invariant_check(&self) -> bool {
        self.intervals.windows(2).all(|w| w[0].b + 1 < w[1].a)
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{iv}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(isize, isize)> for IntervalSet {
    fn from_iter<T: IntoIterator<Item = (isize, isize)>>(iter: T) -> Self {
        let mut set = IntervalSet::new();
        for (a, b) in iter {
            set.add_range(a, b);
        }
        set
    }
}

/// What a grammar literal escape resolves to: a single code point (`\n`,
/// `\uXXXX`, `\u{...}`) or a named Unicode property, which a grammar
/// compiler resolves against its own property tables before folding into
/// an `IntervalSet`. Resolving the property name itself is out of scope
/// here; only the parse/length accounting is.
#[derive(Clone, Debug, PartialEq)]
pub enum EscapeValue {
    CodePoint(isize),
    UnicodeProperty { name: String, negated: bool },
}

/// Result of [`parse_escape`]: the decoded value plus how many `char`s of
/// the input prefix it consumed, so a caller scanning a longer literal
/// knows where to resume.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedEscape {
    pub value: EscapeValue,
    pub code_unit_length: usize,
}

/// Parses one grammar-literal escape sequence from the start of `s`:
/// `\n`, `\r`, `\t`, `\\`, `\uXXXX`, `\u{...}`, `\p{Name}`, `\P{Name}`.
/// Returns `None` for anything else (including a bare `\` at end of input,
/// a non-hex `\u` body, or an unterminated `{...}`).
pub fn parse_escape(s: &str) -> Option<ParsedEscape> {
    let mut chars = s.chars();
    if chars.next()? != '\\' {
        return None;
    }
    match chars.next()? {
        'n' => Some(single(s, '\n' as isize)),
        'r' => Some(single(s, '\r' as isize)),
        't' => Some(single(s, '\t' as isize)),
        '\\' => Some(single(s, '\\' as isize)),
        'u' => parse_unicode_escape(s),
        'p' => parse_property_escape(s, false),
        'P' => parse_property_escape(s, true),
        _ => None,
    }
}

fn single(s: &str, code_point: isize) -> ParsedEscape {
    debug_assert!(s.starts_with('\\'));
    ParsedEscape { value: EscapeValue::CodePoint(code_point), code_unit_length: 2 }
}

fn parse_unicode_escape(s: &str) -> Option<ParsedEscape> {
    let rest = &s[2..];
    if let Some(braced) = rest.strip_prefix('{') {
        let end = braced.find('}')?;
        let hex = &braced[..end];
        let code_point = parse_hex_code_point(hex)?;
        Some(ParsedEscape { value: EscapeValue::CodePoint(code_point), code_unit_length: 2 + 1 + hex.chars().count() + 1 })
    } else {
        let hex: String = rest.chars().take(4).collect();
        if hex.chars().count() != 4 {
            return None;
        }
        let code_point = parse_hex_code_point(&hex)?;
        Some(ParsedEscape { value: EscapeValue::CodePoint(code_point), code_unit_length: 6 })
    }
}

fn parse_hex_code_point(hex: &str) -> Option<isize> {
    if hex.is_empty() || hex.len() > 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    char::from_u32(value).map(|c| c as isize)
}

fn parse_property_escape(s: &str, negated: bool) -> Option<ParsedEscape> {
    let rest = &s[2..];
    let braced = rest.strip_prefix('{')?;
    let end = braced.find('}')?;
    let name = &braced[..end];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(ParsedEscape {
        value: EscapeValue::UnicodeProperty { name: name.to_string(), negated },
        code_unit_length: 2 + 1 + name.chars().count() + 1,
    })
}
