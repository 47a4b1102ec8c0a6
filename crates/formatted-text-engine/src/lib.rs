pub mod editing;
pub mod error;
pub mod io;
pub mod models;

// Re-export key types for easier usage
pub use editing::{Delta, DeltaError, LineAction};
pub use error::ModelError;
pub use io::*;
pub use models::{
    Block, BlockType, Document, Format, FormatType, Line, MAX_INDENT, ResolvedPosition, Segment,
    Segments,
};
