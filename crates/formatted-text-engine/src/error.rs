/// Violations of the line formatting invariants, and names that do not match
/// any block type or format.
///
/// Editing operations never produce these; they surface when checking input
/// such as a JSON file or a command line argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("format span {index} has zero length")]
    EmptySpan { index: usize },
    #[error("format span [{start}, {end}) exceeds line length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
    #[error("format span starting at {start} overlaps the previous span ending at {previous_end}")]
    Overlap { start: usize, previous_end: usize },
    #[error("format span starting at {start} is out of order")]
    Unsorted { start: usize },
    #[error("unknown {kind} `{name}`")]
    UnknownName { kind: &'static str, name: String },
}
