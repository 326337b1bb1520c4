//! Minimal integer-stream contract shared by char and token streams.

/// Sentinel returned by `la`/`consume` once the stream is exhausted.
pub const EOF: isize = -1;

/// An opaque marker returned by [`IntStream::mark`] and consumed by
/// [`IntStream::release`]. Implementations are free to make this a plain
/// index; callers must never inspect its value.
pub type Marker = isize;

/// The read side of a position-tracked stream of integers (code points or
/// token indices). `mark`/`release` pairs must nest like a stack and must be
/// balanced across every exit path of the code that opened them — see
/// [`crate::char_stream::MarkGuard`] for the RAII helper that guarantees this.
pub trait IntStream {
    /// Advances the stream by one symbol. Calling `consume` at EOF is an
    /// error in the reference stream (it asserts) exactly like the upstream
    /// runtimes this crate is modeled on.
    fn consume(&mut self);

    /// Looks ahead `offset` symbols (1 = next unconsumed symbol) without
    /// advancing. Returns `EOF` past the end of input.
    fn la(&mut self, offset: isize) -> isize;

    fn mark(&mut self) -> Marker;

    fn release(&mut self, marker: Marker);

    /// Current cursor, i.e. the index of the next symbol `la(1)` would return.
    fn index(&self) -> usize;

    fn seek(&mut self, index: usize);

    fn size(&self) -> usize;

    fn get_source_name(&self) -> &str;
}
