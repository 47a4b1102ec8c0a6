// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use formatted_text_engine::{Block, BlockType, FormatType, Line};

/// A line of `words` words where every third word is bold and every fifth
/// italic.
#[allow(dead_code)]
pub fn formatted_line(words: usize) -> Line {
    let mut line = Line::new();
    for i in 0..words {
        let mut flags = Vec::new();
        if i % 3 == 0 {
            flags.push(FormatType::Bold);
        }
        if i % 5 == 0 {
            flags.push(FormatType::Italic);
        }
        line.append(&format!("word{i}"), &flags).append(" ", &[]);
    }
    line
}

#[allow(dead_code)]
pub fn formatted_block(lines: usize, words: usize) -> Block {
    let mut block = Block::new(BlockType::Paragraph);
    let line = formatted_line(words);
    for _ in 0..lines {
        block.add(&line);
    }
    block
}
