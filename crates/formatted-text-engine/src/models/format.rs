use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Inline formatting flags that can be applied to a run of text.
///
/// Declaration order is the canonical order: flag sets are always stored
/// sorted by it so that equal sets compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormatType {
    Bold,
    Underline,
    Italic,
    Strike,
    Superscript,
    Subscript,
    Code,
    Highlight,
}

impl FormatType {
    pub const ALL: [FormatType; 8] = [
        FormatType::Bold,
        FormatType::Underline,
        FormatType::Italic,
        FormatType::Strike,
        FormatType::Superscript,
        FormatType::Subscript,
        FormatType::Code,
        FormatType::Highlight,
    ];

    /// Wire name, as used in JSON and configuration files.
    pub fn name(self) -> &'static str {
        match self {
            FormatType::Bold => "BOLD",
            FormatType::Underline => "UNDERLINE",
            FormatType::Italic => "ITALIC",
            FormatType::Strike => "STRIKE",
            FormatType::Superscript => "SUPERSCRIPT",
            FormatType::Subscript => "SUBSCRIPT",
            FormatType::Code => "CODE",
            FormatType::Highlight => "HIGHLIGHT",
        }
    }

    /// Short lowercase name used by the debug notation of a line.
    pub fn short_name(self) -> &'static str {
        match self {
            FormatType::Bold => "bld",
            FormatType::Underline => "ul",
            FormatType::Italic => "itl",
            FormatType::Strike => "str",
            FormatType::Superscript => "sup",
            FormatType::Subscript => "sub",
            FormatType::Code => "code",
            FormatType::Highlight => "hl",
        }
    }
}

/// Parses a wire name, ignoring case.
impl FromStr for FormatType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        FormatType::ALL
            .into_iter()
            .find(|flag| flag.name() == wanted)
            .ok_or_else(|| ModelError::UnknownName {
                kind: "format",
                name: s.to_string(),
            })
    }
}

/// A formatted region `[index, index + length)` of a line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Format {
    pub(crate) index: usize,
    pub(crate) length: usize,
    #[serde(rename = "formats", deserialize_with = "deserialize_flags")]
    pub(crate) flags: Vec<FormatType>,
}

impl Format {
    /// Creates a span, storing `flags` de-duplicated in canonical order.
    pub fn new(index: usize, length: usize, flags: &[FormatType]) -> Self {
        Self {
            index,
            length,
            flags: canonical(flags.to_vec()),
        }
    }

    /// Start offset (in chars) within the line.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Length in chars.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.index + self.length
    }

    pub fn flags(&self) -> &[FormatType] {
        &self.flags
    }

    pub fn contains(&self, flag: FormatType) -> bool {
        self.flags.binary_search(&flag).is_ok()
    }

    /// Same span and flags, different `[index, index + length)`.
    pub(crate) fn relocated(&self, index: usize, length: usize) -> Self {
        Self {
            index,
            length,
            flags: self.flags.clone(),
        }
    }

    pub(crate) fn with_flag(&self, flag: FormatType) -> Vec<FormatType> {
        let mut flags = self.flags.clone();
        flags.push(flag);
        canonical(flags)
    }

    pub(crate) fn without_flag(&self, flag: FormatType) -> Vec<FormatType> {
        self.flags.iter().copied().filter(|f| *f != flag).collect()
    }
}

fn canonical(mut flags: Vec<FormatType>) -> Vec<FormatType> {
    flags.sort_unstable();
    flags.dedup();
    flags
}

fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<FormatType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Vec::<FormatType>::deserialize(deserializer).map(canonical)
}
