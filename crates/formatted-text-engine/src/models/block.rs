use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use log::{debug, trace};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ModelError;
use crate::models::line::{Line, clamp_start};

/// Largest indent level a block can carry.
pub const MAX_INDENT: u8 = 5;

/// The kinds of block a document is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    NumberedList,
    Equation,
    Diagram,
}

impl BlockType {
    pub const ALL: [BlockType; 7] = [
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::NumberedList,
        BlockType::Equation,
        BlockType::Diagram,
    ];

    /// Wire name, as used in JSON and configuration files.
    pub fn name(self) -> &'static str {
        match self {
            BlockType::Paragraph => "PARAGRAPH",
            BlockType::Heading1 => "HEADING1",
            BlockType::Heading2 => "HEADING2",
            BlockType::Heading3 => "HEADING3",
            BlockType::NumberedList => "NUMBERED_LIST",
            BlockType::Equation => "EQUATION",
            BlockType::Diagram => "DIAGRAM",
        }
    }

    /// Whether inline formatting survives a transform into this type.
    pub fn keeps_formatting(self) -> bool {
        matches!(self, BlockType::Paragraph | BlockType::NumberedList)
    }

    /// Equations and diagrams are edited as a unit; a caret cannot enter them.
    pub fn is_atomic(self) -> bool {
        matches!(self, BlockType::Equation | BlockType::Diagram)
    }
}

/// Parses a wire name, ignoring case and accepting `-` for `_`.
impl FromStr for BlockType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        BlockType::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| ModelError::UnknownName {
                kind: "block type",
                name: s.to_string(),
            })
    }
}

/// A typed block holding one or more lines.
///
/// Offsets into a block count the chars of each line plus one virtual char
/// for every line break, so a block with lines `"ab"` and `"cd"` has length
/// 5 and offset 3 is the start of the second line.
///
/// A new block has no lines. Editing operations always leave at least one
/// line behind; an empty block is a single empty line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    kind: BlockType,
    #[serde(default)]
    lines: Vec<Line>,
    #[serde(
        default,
        skip_serializing_if = "is_zero",
        deserialize_with = "deserialize_indent"
    )]
    indent: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
}

impl Block {
    pub fn new(kind: BlockType) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            indent: 0,
            caption: None,
        }
    }

    pub fn kind(&self) -> BlockType {
        self.kind
    }

    pub fn indent(&self) -> u8 {
        self.indent
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Sets the indent, clamped to `[0, MAX_INDENT]`.
    pub fn set_indent(&mut self, indent: isize) {
        self.indent = indent.clamp(0, MAX_INDENT as isize) as u8;
    }

    pub fn with_indent(mut self, indent: isize) -> Self {
        self.set_indent(indent);
        self
    }

    pub fn set_caption(&mut self, caption: Option<String>) {
        self.caption = caption;
    }

    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = Some(caption.to_string());
        self
    }

    /// Total length including one unit per line break.
    pub fn length(&self) -> usize {
        self.lines.iter().map(Line::len).sum::<usize>() + self.lines.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Adds a new line and hands it to `build` for configuration.
    pub fn line(&mut self, build: impl FnOnce(&mut Line)) -> &mut Self {
        let mut line = Line::new();
        build(&mut line);
        self.lines.push(line);
        self
    }

    /// Adds an unformatted line.
    pub fn push_line(&mut self, text: &str) -> &mut Self {
        self.lines.push(Line::from_text(text));
        self
    }

    /// Adds one unformatted line per `\n` separated part of `text`.
    pub fn push_lines(&mut self, text: &str) -> &mut Self {
        self.lines.extend(text.split('\n').map(Line::from_text));
        self
    }

    /// Adds a copy of `line`, returning the copy.
    pub fn add(&mut self, line: &Line) -> &mut Line {
        let index = self.lines.len();
        self.lines.push(line.clone());
        &mut self.lines[index]
    }

    /// The last line, created if the block has none.
    pub fn last_line(&mut self) -> &mut Line {
        self.ensure_line();
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    /// Maps a block offset to `(line, column)`, clamping to the end of the
    /// last line. An offset on a line break resolves to the end of the line
    /// before it.
    pub fn locate(&self, offset: usize) -> (usize, usize) {
        let mut remaining = offset;
        for (row, line) in self.lines.iter().enumerate() {
            let len = line.len();
            if remaining <= len {
                return (row, remaining);
            }
            remaining -= len + 1;
        }
        match self.lines.last() {
            Some(line) => (self.lines.len() - 1, line.len()),
            None => (0, 0),
        }
    }

    /// Inserts unformatted `text` at `start`.
    ///
    /// A negative start or one at or beyond the end appends to the last
    /// line.
    pub fn insert(&mut self, start: isize, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        if start < 0 || start as usize >= self.length() {
            trace!("block insert at {start} appends to last line");
            self.last_line().append(text, &[]);
            return self;
        }
        let (row, column) = self.locate(start as usize);
        trace!("block insert resolved to line {row} column {column}");
        self.lines[row].insert(column as isize, text);
        self
    }

    /// Inserts the content of another block of the same type at `start`.
    ///
    /// The first inserted line joins the line at `start`, any further lines
    /// follow it and the remainder of the original line is joined onto the
    /// last inserted line. Blocks of a different type or without lines are
    /// ignored.
    pub fn insert_block(&mut self, start: isize, block: &Block) -> &mut Self {
        if block.kind != self.kind || block.lines.is_empty() {
            debug!(
                "ignoring insert of {:?} block into {:?} block",
                block.kind, self.kind
            );
            return self;
        }
        if block.lines.len() == 1 && block.lines[0].formats().is_empty() {
            return self.insert(start, block.lines[0].text());
        }
        if start < 0 || start as usize >= self.length() {
            self.merge(block);
            return self;
        }

        let (row, column) = self.locate(start as usize);
        let tail = self.lines[row].split(column as isize);
        let mut incoming = block.lines.iter();
        if let Some(first) = incoming.next() {
            self.lines[row].merge(first);
        }
        let mut at = row + 1;
        for line in incoming {
            self.lines.insert(at, line.clone());
            at += 1;
        }
        self.lines[at - 1].merge(&tail);
        self
    }

    /// Removes `len` units starting at `start`.
    ///
    /// Each line in turn receives the outstanding removal; the virtual break
    /// after a line consumes one unit. A line emptied by the removal is
    /// dropped. Lines either side of a consumed break are not joined, use
    /// [`Block::merge`] at the line level for that.
    pub fn remove(&mut self, start: isize, len: isize) -> &mut Self {
        let (mut start, mut len) = clamp_start(start, len);
        if len <= 0 {
            return self;
        }

        let mut remaining = std::mem::take(&mut self.lines).into_iter();
        let mut kept = Vec::new();
        for mut line in remaining.by_ref() {
            let line_len = line.len() as isize;
            let removed = line.remove(start, len);
            if removed && line.is_empty() {
                trace!("dropping line emptied by removal");
            } else {
                kept.push(line);
            }
            start -= line_len + 1;
            if start < 0 {
                len += start;
                start = 0;
            }
            if len <= 0 {
                break;
            }
        }
        kept.extend(remaining);
        self.lines = kept;
        self.ensure_line();
        self
    }

    /// Splits the block at `idx`, returning everything from `idx` onwards as
    /// a new block with the same type and indent.
    ///
    /// Splitting exactly on a line break drops the break: the two lines end
    /// up on either side of the new block boundary.
    pub fn split(&mut self, idx: isize) -> Block {
        let mut right = Block {
            kind: self.kind,
            lines: Vec::new(),
            indent: self.indent,
            caption: None,
        };
        if idx <= 0 {
            right.lines = std::mem::take(&mut self.lines);
        } else {
            let mut idx = idx;
            for mut line in std::mem::take(&mut self.lines) {
                let offset = idx;
                let len = line.len() as isize;
                idx -= len + 1;
                if offset <= 0 {
                    right.lines.push(line);
                } else if len <= offset {
                    self.lines.push(line);
                } else {
                    right.lines.push(line.split(offset));
                    self.lines.push(line);
                }
            }
        }
        self.ensure_line();
        right.ensure_line();
        right
    }

    /// Appends `other` to this block: its first line joins the last line
    /// here and the rest are copied after it. A block of another type is
    /// ignored.
    pub fn merge(&mut self, other: &Block) {
        if other.kind != self.kind {
            debug!(
                "ignoring merge of {:?} block into {:?} block",
                other.kind, self.kind
            );
            return;
        }
        if self.lines.is_empty() {
            self.lines.extend(other.lines.iter().cloned());
        } else {
            let mut others = other.lines.iter();
            if let Some(first) = others.next() {
                self.last_line().merge(first);
            }
            self.lines.extend(others.cloned());
        }
        self.ensure_line();
    }

    /// Converts to another block type.
    ///
    /// The same type borrows `self`. Otherwise a copy is returned, with all
    /// inline formatting stripped unless the target keeps formatting.
    pub fn transform(&self, kind: BlockType) -> Cow<'_, Block> {
        if kind == self.kind {
            return Cow::Borrowed(self);
        }
        let mut block = self.clone();
        block.kind = kind;
        if !kind.keeps_formatting() {
            block.lines.iter_mut().for_each(Line::strip_formatting);
        }
        Cow::Owned(block)
    }

    /// The unformatted text with lines separated by `\n`.
    pub fn flatten(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn lines_mut(&mut self) -> &mut Vec<Line> {
        &mut self.lines
    }

    pub(crate) fn ensure_line(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(Line::new());
        }
    }
}

/// Debug notation: lines separated by `[//]`, followed by the indent when set.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("[//]")?;
            }
            write!(f, "{line}")?;
        }
        if self.indent > 0 {
            write!(f, "{{indent={}}}", self.indent)?;
        }
        if let Some(caption) = &self.caption {
            write!(f, "{{caption={caption}}}")?;
        }
        Ok(())
    }
}

fn is_zero(indent: &u8) -> bool {
    *indent == 0
}

fn deserialize_indent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    u8::deserialize(deserializer).map(|indent| indent.min(MAX_INDENT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format::{Format, FormatType::*};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("paragraph", BlockType::Paragraph)]
    #[case("HEADING2", BlockType::Heading2)]
    #[case("numbered-list", BlockType::NumberedList)]
    #[case("Numbered_List", BlockType::NumberedList)]
    fn parse_block_type(#[case] name: &str, #[case] expected: BlockType) {
        assert_eq!(name.parse::<BlockType>(), Ok(expected));
    }

    #[test]
    fn unknown_block_type() {
        assert_eq!(
            "table".parse::<BlockType>(),
            Err(ModelError::UnknownName {
                kind: "block type",
                name: "table".to_string()
            })
        );
    }

    fn three_part() -> Block {
        let mut block = Block::new(BlockType::Paragraph);
        block.line(|line| {
            line.append("This is to the left, ", &[])
                .append("this is the middle", &[Bold])
                .append(" and this is the right.", &[]);
        });
        block
    }

    fn broken() -> Block {
        let mut block = Block::new(BlockType::Paragraph);
        block
            .push_line("This is to the left ")
            .push_line(" and this is the right.");
        block
    }

    fn plain(text: &str) -> Block {
        let mut block = Block::new(BlockType::Paragraph);
        block.push_line(text);
        block
    }

    #[test]
    fn length_of_single_formatted_line() {
        let mut block = Block::new(BlockType::Paragraph);
        block.line(|line| {
            line.append("AAA, ", &[])
                .append("BBB", &[Bold])
                .append(" and CCC.", &[]);
        });
        assert_eq!(block.length(), 17);
    }

    #[test]
    fn length_counts_line_breaks() {
        let mut block = Block::new(BlockType::Paragraph);
        block.push_line("AAA ").push_line(" and BBB.");
        assert_eq!(block.length(), 14);
        assert_eq!(Block::new(BlockType::Paragraph).length(), 0);
    }

    #[rstest]
    #[case(-3, 0)]
    #[case(0, 0)]
    #[case(3, 3)]
    #[case(5, 5)]
    #[case(9, 5)]
    fn indent_is_clamped(#[case] requested: isize, #[case] expected: u8) {
        let block = Block::new(BlockType::Paragraph).with_indent(requested);
        assert_eq!(block.indent(), expected);
    }

    #[test]
    fn split_left_of_formatting_keeps_indent() {
        let mut left = three_part().with_indent(2);
        let right = left.split(10);
        assert_eq!(left.to_string(), "This is to{indent=2}");
        assert_eq!(
            right.to_string(),
            " the left, [{11,18} bld]this is the middle[/] and this is the right.{indent=2}"
        );
    }

    #[rstest]
    #[case(
        44,
        "This is to the left, [{21,18} bld]this is the middle[/] and ",
        "this is the right."
    )]
    #[case(
        26,
        "This is to the left, [{21,5} bld]this [/]",
        "[{0,13} bld]is the middle[/] and this is the right."
    )]
    #[case(
        21,
        "This is to the left, ",
        "[{0,18} bld]this is the middle[/] and this is the right."
    )]
    #[case(
        39,
        "This is to the left, [{21,18} bld]this is the middle[/]",
        " and this is the right."
    )]
    fn split_around_formatting(#[case] at: isize, #[case] left: &str, #[case] right: &str) {
        let mut block = three_part();
        let balance = block.split(at);
        assert_eq!(block.to_string(), left);
        assert_eq!(balance.to_string(), right);
    }

    #[rstest]
    #[case(20, "This is to the left ", " and this is the right.")]
    #[case(21, "This is to the left ", " and this is the right.")]
    #[case(19, "This is to the left", " [//] and this is the right.")]
    #[case(22, "This is to the left [//] ", "and this is the right.")]
    fn split_near_line_break(#[case] at: isize, #[case] left: &str, #[case] right: &str) {
        let mut block = broken();
        let balance = block.split(at);
        assert_eq!(block.to_string(), left);
        assert_eq!(balance.to_string(), right);
    }

    #[test]
    fn split_at_start_moves_everything() {
        let mut block = broken();
        let original = block.clone();
        let balance = block.split(0);
        assert_eq!(balance, original);
        assert_eq!(block.lines(), &[Line::new()]);
    }

    #[test]
    fn split_past_end_leaves_empty_balance() {
        let mut block = broken();
        let original = block.clone();
        let balance = block.split(100);
        assert_eq!(block, original);
        assert_eq!(balance.lines(), &[Line::new()]);
        assert_eq!(balance.kind(), BlockType::Paragraph);
    }

    #[test]
    fn clone_is_deep() {
        let block = three_part().with_indent(3).with_caption("Figure 1");
        let mut copy = block.clone();
        assert_eq!(copy, block);
        copy.insert(0, "changed ");
        assert_ne!(copy, block);
        assert_eq!(
            block.to_string(),
            "This is to the left, [{21,18} bld]this is the middle[/] and this is the right.{indent=3}{caption=Figure 1}"
        );
    }

    #[test]
    fn transform_to_same_type_borrows() {
        let block = three_part();
        assert!(matches!(block.transform(BlockType::Paragraph), Cow::Borrowed(_)));
    }

    #[rstest]
    #[case(BlockType::Heading1)]
    #[case(BlockType::Heading2)]
    #[case(BlockType::Heading3)]
    #[case(BlockType::Equation)]
    #[case(BlockType::Diagram)]
    fn transform_strips_formatting(#[case] kind: BlockType) {
        let block = three_part();
        let transformed = block.transform(kind);
        assert_eq!(transformed.kind(), kind);
        assert_eq!(
            transformed.to_string(),
            "This is to the left, this is the middle and this is the right."
        );
        // the source block is untouched
        assert_eq!(block.lines()[0].formats().len(), 1);
    }

    #[test]
    fn transform_to_list_keeps_formatting() {
        let block = three_part();
        let list = block.transform(BlockType::NumberedList);
        assert_eq!(list.kind(), BlockType::NumberedList);
        assert_eq!(list.lines()[0].formats(), &[Format::new(21, 18, &[Bold])]);
    }

    #[test]
    fn transform_is_lossy() {
        let block = three_part();
        let heading = block.transform(BlockType::Heading1).into_owned();
        let back = heading.transform(BlockType::Paragraph);
        assert_eq!(back.kind(), BlockType::Paragraph);
        assert!(back.lines()[0].formats().is_empty());
    }

    #[rstest]
    #[case(10, 4, "This is a  of text")]
    #[case(0, 4, " is a line of text")]
    #[case(17, 5, "This is a line of")]
    #[case(0, 22, "")]
    #[case(-1, 4, "s is a line of text")]
    #[case(-3, 4, "his is a line of text")]
    #[case(-4, 4, "This is a line of text")]
    #[case(-40, 4, "This is a line of text")]
    #[case(17, 10, "This is a line of")]
    #[case(20, 10, "This is a line of te")]
    #[case(22, 10, "This is a line of text")]
    #[case(40, 10, "This is a line of text")]
    fn remove_single_line(#[case] start: isize, #[case] len: isize, #[case] expected: &str) {
        let mut block = plain("This is a line of text");
        assert_eq!(block.remove(start, len).to_string(), expected);
        assert_eq!(block.lines().len(), 1);
    }

    #[rstest]
    #[case(10, 4, "This is a [{10,3} bld] of[/] text")]
    #[case(0, 4, " is a [{6,7} bld]line of[/] text")]
    #[case(8, 4, "This is [{8,5} bld]ne of[/] text")]
    #[case(17, 5, "This is a [{10,7} bld]line of[/]")]
    #[case(14, 5, "This is a [{10,4} bld]line[/]ext")]
    #[case(0, 22, "")]
    fn remove_single_line_with_formatting(
        #[case] start: isize,
        #[case] len: isize,
        #[case] expected: &str,
    ) {
        let mut block = Block::new(BlockType::Paragraph);
        block.line(|line| {
            line.append("This is a ", &[])
                .append("line of", &[Bold])
                .append(" text", &[]);
        });
        assert_eq!(block.remove(start, len).to_string(), expected);
    }

    #[rstest]
    #[case(5, 2, "This  a line[//]This is a another line")]
    #[case(20, 4, "This is a line[//]This  another line")]
    #[case(10, 8, "This is a [//]s is a another line")]
    fn remove_two_lines(#[case] start: isize, #[case] len: isize, #[case] expected: &str) {
        let mut block = Block::new(BlockType::Paragraph);
        block
            .push_line("This is a line")
            .push_line("This is a another line");
        assert_eq!(block.remove(start, len).to_string(), expected);
    }

    #[test]
    fn remove_across_break_keeps_both_lines() {
        let mut block = Block::new(BlockType::Paragraph);
        block.push_line("Line1").push_line("Line2");
        assert_eq!(block.length(), 11);

        block.remove(4, 3);
        let texts: Vec<_> = block.lines().iter().map(Line::text).collect();
        assert_eq!(texts, vec!["Line", "ine2"]);
        assert_eq!(block.length(), 9);
    }

    #[test]
    fn remove_drops_emptied_lines() {
        let mut block = Block::new(BlockType::Paragraph);
        block.push_lines("ab\ncd\nef");
        block.remove(3, 3);
        let texts: Vec<_> = block.lines().iter().map(Line::text).collect();
        assert_eq!(texts, vec!["ab", "ef"]);
    }

    #[test]
    fn remove_keeps_untouched_empty_lines() {
        let mut block = Block::new(BlockType::Paragraph);
        block.push_lines("A\n\nB");
        block.remove(3, 1);
        let texts: Vec<_> = block.lines().iter().map(Line::text).collect();
        assert_eq!(texts, vec!["A", ""]);
    }

    #[rstest]
    #[case(5, "This  hubba is a line")]
    #[case(0, " hubba This is a line")]
    #[case(14, "This is a line hubba ")]
    #[case(-1, "This is a line hubba ")]
    fn insert_single_line(#[case] start: isize, #[case] expected: &str) {
        let mut block = plain("This is a line");
        assert_eq!(block.insert(start, " hubba ").to_string(), expected);
    }

    #[test]
    fn insert_with_formatting() {
        let mut block = Block::new(BlockType::Paragraph);
        block.line(|line| {
            line.append("This is a ", &[])
                .append("line of", &[Bold])
                .append(" text", &[]);
        });
        assert_eq!(
            block.clone().insert(12, " hubba ").to_string(),
            "This is a [{10,14} bld]li hubba ne of[/] text"
        );
        assert_eq!(
            block.clone().insert(10, " hubba ").to_string(),
            "This is a  hubba [{17,7} bld]line of[/] text"
        );
    }

    #[rstest]
    #[case(0, "XLine1[//]Line2")]
    #[case(5, "Line1X[//]Line2")]
    #[case(6, "Line1[//]XLine2")]
    #[case(8, "Line1[//]LiXne2")]
    #[case(11, "Line1[//]Line2X")]
    fn insert_counts_line_breaks(#[case] start: isize, #[case] expected: &str) {
        let mut block = Block::new(BlockType::Paragraph);
        block.push_line("Line1").push_line("Line2");
        assert_eq!(block.insert(start, "X").to_string(), expected);
    }

    #[test]
    fn insert_into_empty_block_creates_line() {
        let mut block = Block::new(BlockType::Heading2);
        block.insert(3, "Title");
        assert_eq!(block.lines(), &[Line::from_text("Title")]);
    }

    #[test]
    fn merge_joins_boundary_lines() {
        let mut first = Block::new(BlockType::Paragraph);
        first.push_line("one").push_line("two");
        let mut second = Block::new(BlockType::Paragraph);
        second.line(|line| {
            line.append("three", &[Italic]);
        });
        second.push_line("four");

        first.merge(&second);
        assert_eq!(first.to_string(), "one[//]two[{3,5} itl]three[/][//]four");
        assert_eq!(second.lines().len(), 2);
    }

    #[test]
    fn merge_into_empty_block_adopts_lines() {
        let mut target = Block::new(BlockType::Paragraph);
        let source = broken();
        target.merge(&source);
        assert_eq!(target.lines(), source.lines());
    }

    #[test]
    fn merge_of_other_type_is_ignored() {
        let mut target = plain("keep");
        let mut heading = Block::new(BlockType::Heading1);
        heading.push_line("ignored");
        target.merge(&heading);
        assert_eq!(target.to_string(), "keep");
    }

    #[test]
    fn split_then_merge_restores_block() {
        let original = three_part();
        for at in 0..=original.length() as isize {
            let mut left = original.clone();
            let right = left.split(at);
            left.merge(&right);
            assert_eq!(left.flatten(), original.flatten(), "split at {at}");
        }
    }

    #[test]
    fn insert_block_at_tail_merges() {
        let mut target = plain("Hello");
        let mut incoming = Block::new(BlockType::Paragraph);
        incoming.line(|line| {
            line.append(" bold", &[Bold]);
        });
        incoming.push_line("next");
        target.insert_block(-1, &incoming);
        assert_eq!(target.to_string(), "Hello[{5,5} bld] bold[/][//]next");
    }

    #[test]
    fn insert_block_internally_splices_lines() {
        let mut target = Block::new(BlockType::Paragraph);
        target.push_line("start end").push_line("after");
        let mut incoming = Block::new(BlockType::Paragraph);
        incoming.line(|line| {
            line.append("A", &[Bold]);
        });
        incoming.push_line("B ");
        target.insert_block(6, &incoming);
        assert_eq!(
            target.to_string(),
            "start [{6,1} bld]A[/][//]B end[//]after"
        );
    }

    #[test]
    fn insert_block_plain_single_line_is_text_insert() {
        let mut target = plain("ac");
        target.insert_block(1, &plain("b"));
        assert_eq!(target.to_string(), "abc");
    }

    #[test]
    fn insert_block_of_other_type_is_ignored() {
        let mut target = plain("ac");
        let mut heading = Block::new(BlockType::Heading3);
        heading.push_line("b");
        target.insert_block(1, &heading);
        assert_eq!(target.to_string(), "ac");
    }

    #[rstest]
    #[case(0, (0, 0))]
    #[case(5, (0, 5))]
    #[case(6, (1, 0))]
    #[case(9, (1, 3))]
    #[case(40, (1, 5))]
    fn locate_maps_offsets_to_lines(#[case] offset: usize, #[case] expected: (usize, usize)) {
        let mut block = Block::new(BlockType::Paragraph);
        block.push_line("Line1").push_line("Line2");
        assert_eq!(block.locate(offset), expected);
    }

    #[test]
    fn flatten_joins_lines() {
        assert_eq!(broken().flatten(), "This is to the left \n and this is the right.");
    }
}
