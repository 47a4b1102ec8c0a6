//! An ordered sequence of blocks and the flat coordinate system editors use
//! to address a caret anywhere in it.
//!
//! Each block occupies `2 + content size` flat positions: one for its
//! opening boundary, one per unit of content and one for its closing
//! boundary. Equations and diagrams are atomic and have no content
//! positions at all.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::models::block::{Block, BlockType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    blocks: Vec<Block>,
}

/// Where a flat position lands inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPosition {
    /// Index of the block holding the position.
    pub block: usize,
    /// Offset into the block's content, `0` for atomic blocks.
    pub offset: usize,
    /// `(line, column)` within the block, `None` for atomic blocks.
    pub line: Option<(usize, usize)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new block of `kind` and hands it to `build`.
    pub fn block(&mut self, kind: BlockType, build: impl FnOnce(&mut Block)) -> &mut Self {
        let mut block = Block::new(kind);
        build(&mut block);
        block.ensure_line();
        self.blocks.push(block);
        self
    }

    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    /// Inserts `block` before position `index`, appending when past the end.
    pub fn insert(&mut self, index: usize, block: Block) {
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
    }

    /// Removes and returns the block at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Block> {
        (index < self.blocks.len()).then(|| self.blocks.remove(index))
    }

    /// Replaces the block at `index` with the given type. Returns `false` if
    /// there is no such block.
    pub fn transform(&mut self, index: usize, kind: BlockType) -> bool {
        let Some(block) = self.blocks.get_mut(index) else {
            return false;
        };
        if let Cow::Owned(transformed) = block.transform(kind) {
            *block = transformed;
        }
        true
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text of every block, separated by a blank line.
    pub fn flatten(&self) -> String {
        self.blocks
            .iter()
            .map(Block::flatten)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Number of flat positions spanned by the whole document.
    pub fn size(&self) -> usize {
        self.blocks.iter().map(node_size).sum()
    }

    /// Flat position of `offset` inside block `block`, with the offset
    /// clamped to the block's content.
    pub fn to_flat(&self, block: usize, offset: usize) -> Option<usize> {
        let target = self.blocks.get(block)?;
        let start: usize = self.blocks[..block].iter().map(node_size).sum();
        Some(start + 1 + offset.min(content_size(target)))
    }

    /// Resolves a flat position to a block and an offset inside it.
    ///
    /// Boundary positions resolve to the nearest content edge of their
    /// block; positions past the end resolve to the end of the last block.
    pub fn resolve(&self, position: usize) -> Option<ResolvedPosition> {
        let mut start = 0;
        for (index, block) in self.blocks.iter().enumerate() {
            let size = node_size(block);
            if position < start + size {
                let offset = position.saturating_sub(start + 1).min(content_size(block));
                return Some(resolved(index, block, offset));
            }
            start += size;
        }
        let index = self.blocks.len().checked_sub(1)?;
        let block = &self.blocks[index];
        Some(resolved(index, block, content_size(block)))
    }
}

impl FromIterator<Block> for Document {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}

fn content_size(block: &Block) -> usize {
    if block.kind().is_atomic() {
        0
    } else {
        block.length()
    }
}

fn node_size(block: &Block) -> usize {
    2 + content_size(block)
}

fn resolved(index: usize, block: &Block, offset: usize) -> ResolvedPosition {
    ResolvedPosition {
        block: index,
        offset,
        line: (!block.kind().is_atomic()).then(|| block.locate(offset)),
    }
}
