//! Character stream contract (§6) and a `Vec<char>`-backed reference
//! implementation used throughout this crate's own tests.

use crate::int_stream::{IntStream, Marker, EOF};
use crate::interval_set::Interval;

/// A [`CharStream`] additionally knows how to render a source interval back
/// to text, needed for error messages and for `MORE`-accumulated token text.
pub trait CharStream: IntStream {
    fn get_text(&self, interval: Interval) -> String;
}

/// RAII guard pairing a [`IntStream::mark`] with its [`IntStream::release`],
/// so every exit path (normal return, `SKIP`, an `Err` propagated by `?`)
/// releases the mark exactly once, per the scoped-resource requirement of
/// the simulator's resource model.
pub struct MarkGuard<'s, S: IntStream + ?Sized> {
    stream: &'s mut S,
    marker: Option<Marker>,
}

impl<'s, S: IntStream + ?Sized> MarkGuard<'s, S> {
    pub fn new(stream: &'s mut S) -> Self {
        let marker = stream.mark();
        MarkGuard { stream, marker: Some(marker) }
    }
}

impl<'s, S: IntStream + ?Sized> Drop for MarkGuard<'s, S> {
    fn drop(&mut self) {
        if let Some(marker) = self.marker.take() {
            self.stream.release(marker);
        }
    }
}

/// A simple, owned, in-memory [`CharStream`] over a sequence of Unicode
/// scalar values. This is the reference implementation exercised by every
/// test in this repository; it does not need a backtracking buffer because
/// nothing ever `seek`s backward past a still-held mark.
pub struct InputStream {
    name: String,
    data: Vec<char>,
    index: usize,
    open_marks: usize,
}

impl InputStream {
    pub fn new(text: &str) -> Self {
        InputStream { name: "<unnamed>".to_string(), data: text.chars().collect(), index: 0, open_marks: 0 }
    }

    pub fn with_name(text: &str, name: &str) -> Self {
        InputStream { name: name.to_string(), data: text.chars().collect(), index: 0, open_marks: 0 }
    }
}

impl IntStream for InputStream {
    fn consume(&mut self) {
        assert!(self.index < self.data.len(), "cannot consume EOF");
        self.index += 1;
    }

    fn la(&mut self, offset: isize) -> isize {
        if offset == 0 {
            return 0;
        }
        let pos = self.index as isize + offset - 1;
        if pos < 0 || pos as usize >= self.data.len() {
            return EOF;
        }
        self.data[pos as usize] as isize
    }

    fn mark(&mut self) -> Marker {
        self.open_marks += 1;
        -1
    }

    fn release(&mut self, _marker: Marker) {
        assert!(self.open_marks > 0, "release without a matching mark");
        self.open_marks -= 1;
    }

    fn index(&self) -> usize {
        self.index
    }

    fn seek(&mut self, index: usize) {
        self.index = index.min(self.data.len());
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn get_source_name(&self) -> &str {
        &self.name
    }
}

impl CharStream for InputStream {
    fn get_text(&self, interval: Interval) -> String {
        if interval.is_empty() {
            return String::new();
        }
        let start = interval.a.max(0) as usize;
        let stop = (interval.b as usize).min(self.data.len().saturating_sub(1));
        if start > stop || start >= self.data.len() {
            return String::new();
        }
        self.data[start..=stop].iter().collect()
    }
}

/// Escapes whitespace the way the upstream runtimes do when rendering the
/// offending text of a `NoViableAlt` error.
pub fn escape_for_error(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        })
        .collect()
}
