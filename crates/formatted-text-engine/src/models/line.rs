use std::fmt;
use std::iter::FusedIterator;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::models::format::{Format, FormatType};
use crate::models::text::{byte_offset, char_len, char_slice, normalize, normalize_mapped};

/// A single line of text with its formatting overlay.
///
/// Formats are kept sorted by index, non-overlapping, non-empty and within
/// the bounds of the text. Every mutating operation restores this before
/// returning, so [`Line::check`] only fails for lines read from outside.
///
/// All offsets count chars, not bytes. Offsets passed to the editing
/// operations are signed: negative and overflowing values are clamped
/// rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLine")]
pub struct Line {
    text: String,
    #[serde(rename = "formatting")]
    formats: Vec<Format>,
}

/// A run of text sharing the same flags, produced by [`Line::traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub flags: &'a [FormatType],
}

impl Line {
    /// Creates an empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unformatted line from `text` (normalized as by [`Line::append`]).
    pub fn from_text(text: &str) -> Self {
        let mut line = Self::new();
        line.append(text, &[]);
        line
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Appends `text`, recording a format over it when `flags` is non-empty.
    ///
    /// Non-breaking spaces become spaces and control / bidi characters are
    /// stripped first. Empty text is ignored.
    pub fn append(&mut self, text: &str, flags: &[FormatType]) -> &mut Self {
        let text = normalize(text);
        if text.is_empty() {
            return self;
        }
        if !flags.is_empty() {
            self.formats
                .push(Format::new(self.len(), char_len(&text), flags));
        }
        self.text.push_str(&text);
        self
    }

    /// Inserts `text` at `start`.
    ///
    /// A negative start or one at or beyond the end appends (unformatted).
    /// Formats at or after `start` move right; a format that starts before
    /// `start` and ends at or after it grows to cover the inserted text.
    pub fn insert(&mut self, start: isize, text: &str) {
        let text = normalize(text);
        if text.is_empty() {
            return;
        }
        let len = self.len();
        if start < 0 || start as usize >= len {
            trace!("insert at {start} beyond line length {len}, appending");
            self.text.push_str(&text);
            return;
        }
        let start = start as usize;
        let added = char_len(&text);
        self.text.insert_str(byte_offset(&self.text, start), &text);
        for format in &mut self.formats {
            if format.index >= start {
                format.index += added;
            } else if format.end() >= start {
                format.length += added;
            }
        }
        self.normalise();
    }

    /// Removes `len` chars starting at `start`, returning whether anything
    /// was removed.
    ///
    /// A negative start shortens `len` by the overshoot. The removal end is
    /// clamped to the text. Formats are adjusted as follows:
    ///
    /// - starting inside the removal: moved to `start`, keeping only the part
    ///   past the removal end;
    /// - ending inside the removal: truncated at `start`;
    /// - enclosing the removal: shortened by the removed length;
    /// - after the removal: shifted left.
    pub fn remove(&mut self, start: isize, len: isize) -> bool {
        let (start, len) = clamp_start(start, len);
        if len <= 0 {
            return false;
        }
        let text_len = self.len();
        let start = start as usize;
        if start >= text_len {
            return false;
        }
        let end = start.saturating_add(len as usize).min(text_len);
        let removed = end - start;

        let (from, to) = (byte_offset(&self.text, start), byte_offset(&self.text, end));
        self.text.replace_range(from..to, "");

        for format in &mut self.formats {
            let (s, e) = (format.index, format.end());
            if s >= start && s < end {
                format.index = start;
                format.length = e.saturating_sub(end);
            } else if s < start && e > start {
                if e <= end {
                    format.length = start - s;
                } else {
                    format.length -= removed;
                }
            } else if s >= end {
                format.index -= removed;
            }
        }
        self.normalise();
        true
    }

    /// Splits the line at `idx`, keeping `[0, idx)` here and returning the
    /// rest as a new line.
    ///
    /// `idx <= 0` moves the whole line into the result and leaves this one
    /// empty; `idx >= len` returns an empty line. A format straddling `idx`
    /// is cut in two, both halves keeping its flags.
    pub fn split(&mut self, idx: isize) -> Line {
        if idx <= 0 {
            return std::mem::take(self);
        }
        let idx = idx as usize;
        if idx >= self.len() {
            return Line::new();
        }
        let at = byte_offset(&self.text, idx);
        let mut right = Line {
            text: self.text.split_off(at),
            formats: Vec::new(),
        };
        for format in std::mem::take(&mut self.formats) {
            if format.end() <= idx {
                self.formats.push(format);
            } else if format.index >= idx {
                right
                    .formats
                    .push(format.relocated(format.index - idx, format.length));
            } else {
                let diff = idx - format.index;
                self.formats.push(format.relocated(format.index, diff));
                right.formats.push(format.relocated(0, format.length - diff));
            }
        }
        right
    }

    /// Appends `other` (text and formats) to the end of this line.
    pub fn merge(&mut self, other: &Line) {
        let offset = self.len();
        self.text.push_str(&other.text);
        self.formats.extend(
            other
                .formats
                .iter()
                .map(|f| f.relocated(f.index + offset, f.length)),
        );
        self.normalise();
    }

    pub fn strip_formatting(&mut self) {
        self.formats.clear();
    }

    /// Walks the line as alternating unformatted gaps and formatted spans.
    ///
    /// The trailing unformatted run is always produced, even when empty, so
    /// an empty line yields exactly one empty segment.
    pub fn traverse(&self) -> Segments<'_> {
        Segments {
            line: self,
            next_format: 0,
            cursor: 0,
            done: false,
        }
    }

    /// Adds `flag` to every char in `[start, start + len)`.
    ///
    /// Formats overlapping the range are cut at its edges and the overlap
    /// gains the flag; unformatted gaps inside the range get new formats.
    pub fn add_format(&mut self, start: usize, len: usize, flag: FormatType) {
        let end = start.saturating_add(len).min(self.len());
        if start >= end {
            return;
        }
        let mut result = Vec::with_capacity(self.formats.len() + 2);
        let mut covered = start;

        for f in std::mem::take(&mut self.formats) {
            let f_end = f.end();
            if f_end <= start {
                result.push(f);
                continue;
            }
            if f.index >= end {
                if covered < end {
                    result.push(Format::new(covered, end - covered, &[flag]));
                    covered = end;
                }
                result.push(f);
                continue;
            }
            let gap_start = covered.max(start);
            if gap_start < f.index {
                result.push(Format::new(gap_start, f.index - gap_start, &[flag]));
            }
            if f.index < start {
                result.push(f.relocated(f.index, start - f.index));
            }
            let overlap_start = f.index.max(start);
            let overlap_end = f_end.min(end);
            result.push(Format::new(
                overlap_start,
                overlap_end - overlap_start,
                &f.with_flag(flag),
            ));
            if f_end > end {
                result.push(f.relocated(end, f_end - end));
            }
            covered = covered.max(overlap_end);
        }
        if covered < end {
            result.push(Format::new(covered, end - covered, &[flag]));
        }

        self.formats = result;
        self.normalise();
    }

    /// Removes `flag` from every char in `[start, start + len)`.
    ///
    /// Fragments left without any flag are dropped.
    pub fn remove_format(&mut self, start: usize, len: usize, flag: FormatType) {
        let end = start.saturating_add(len);
        if start >= end {
            return;
        }
        let mut result = Vec::with_capacity(self.formats.len() + 2);

        for f in std::mem::take(&mut self.formats) {
            let f_end = f.end();
            if f_end <= start || f.index >= end {
                result.push(f);
                continue;
            }
            if f.index < start {
                result.push(f.relocated(f.index, start - f.index));
            }
            let reduced = f.without_flag(flag);
            if !reduced.is_empty() {
                let overlap_start = f.index.max(start);
                let overlap_end = f_end.min(end);
                result.push(Format::new(
                    overlap_start,
                    overlap_end - overlap_start,
                    &reduced,
                ));
            }
            if f_end > end {
                result.push(f.relocated(end, f_end - end));
            }
        }

        self.formats = result;
        self.normalise();
    }

    /// Whether every char in `[start, start + len)` carries `flag`.
    pub fn has_format(&self, start: usize, len: usize, flag: FormatType) -> bool {
        if len == 0 {
            return false;
        }
        let end = start.saturating_add(len);
        let mut covered = start;
        for f in &self.formats {
            if f.index >= end {
                break;
            }
            if f.end() <= covered {
                continue;
            }
            if f.index > covered || !f.contains(flag) {
                return false;
            }
            covered = f.end().min(end);
        }
        covered >= end
    }

    /// Verifies the format invariants.
    pub fn check(&self) -> Result<(), ModelError> {
        let len = self.len();
        let mut previous: Option<&Format> = None;
        for format in &self.formats {
            if format.length == 0 {
                return Err(ModelError::EmptySpan {
                    index: format.index,
                });
            }
            if format.end() > len {
                return Err(ModelError::SpanOutOfBounds {
                    start: format.index,
                    end: format.end(),
                    len,
                });
            }
            if let Some(previous) = previous {
                if format.index < previous.index {
                    return Err(ModelError::Unsorted {
                        start: format.index,
                    });
                }
                if format.index < previous.end() {
                    return Err(ModelError::Overlap {
                        start: format.index,
                        previous_end: previous.end(),
                    });
                }
            }
            previous = Some(format);
        }
        Ok(())
    }

    /// Restores the format invariants: clips spans to the text, drops empty
    /// ones, sorts by index and trims any overlap off the later span.
    fn normalise(&mut self) {
        let len = self.len();
        let before = self.formats.len();
        for f in &mut self.formats {
            if f.end() > len {
                f.length = len.saturating_sub(f.index);
            }
        }
        self.formats.retain(|f| f.length > 0);
        self.formats.sort_by_key(|f| f.index);

        let mut previous_end = 0;
        for f in &mut self.formats {
            if f.index < previous_end {
                let end = f.end();
                f.index = previous_end;
                f.length = end.saturating_sub(previous_end);
            }
            previous_end = previous_end.max(f.end());
        }
        self.formats.retain(|f| f.length > 0);

        if self.formats.len() != before {
            trace!(
                "normalised formats on {:?}: {} -> {} spans",
                self.text,
                before,
                self.formats.len()
            );
        }
    }
}

/// Folds a negative start into the length, as every remove operation does.
pub(crate) fn clamp_start(start: isize, len: isize) -> (isize, isize) {
    if start < 0 {
        (0, len.saturating_add(start))
    } else {
        (start, len)
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Line::from_text(text)
    }
}

/// Debug notation: `plain [{index,length} flag...]formatted[/] plain`.
impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cursor = 0;
        for format in &self.formats {
            f.write_str(char_slice(&self.text, cursor, format.index))?;
            write!(f, "[{{{},{}}}", format.index, format.length)?;
            for flag in &format.flags {
                write!(f, " {}", flag.short_name())?;
            }
            write!(
                f,
                "]{}[/]",
                char_slice(&self.text, format.index, format.end())
            )?;
            cursor = format.end();
        }
        f.write_str(char_slice(&self.text, cursor, self.len()))
    }
}

/// Iterator returned by [`Line::traverse`].
pub struct Segments<'a> {
    line: &'a Line,
    next_format: usize,
    cursor: usize,
    done: bool,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let text = &self.line.text;
        if let Some(format) = self.line.formats.get(self.next_format) {
            if format.index > self.cursor {
                let segment = Segment {
                    text: char_slice(text, self.cursor, format.index),
                    flags: &[],
                };
                self.cursor = format.index;
                return Some(segment);
            }
            self.cursor = format.end();
            self.next_format += 1;
            return Some(Segment {
                text: char_slice(text, format.index, format.end()),
                flags: &format.flags,
            });
        }
        self.done = true;
        Some(Segment {
            text: char_slice(text, self.cursor, self.line.len()),
            flags: &[],
        })
    }
}

impl FusedIterator for Segments<'_> {}

#[derive(Deserialize)]
struct RawLine {
    text: String,
    #[serde(default)]
    formatting: Vec<Format>,
}

impl TryFrom<RawLine> for Line {
    type Error = ModelError;

    fn try_from(raw: RawLine) -> Result<Self, Self::Error> {
        let raw = Line {
            text: raw.text,
            formats: raw
                .formatting
                .into_iter()
                .filter(|f| f.length > 0 && !f.flags.is_empty())
                .collect(),
        };
        raw.check()?;

        // spans are checked against the text as written, then moved onto the
        // normalized text; a span covering only stripped chars disappears
        let (text, offsets) = normalize_mapped(&raw.text);
        let formats = raw
            .formats
            .iter()
            .filter_map(|format| {
                let start = offsets[format.index];
                let end = offsets[format.end()];
                (end > start).then(|| format.relocated(start, end - start))
            })
            .collect();
        Ok(Line { text, formats })
    }
}
