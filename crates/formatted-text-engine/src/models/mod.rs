pub mod block;
pub mod document;
pub mod format;
pub mod line;
pub mod text;

pub use block::{Block, BlockType, MAX_INDENT};
pub use document::{Document, ResolvedPosition};
pub use format::{Format, FormatType};
pub use line::{Line, Segment, Segments};
