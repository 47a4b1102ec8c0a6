//! HTML rendering of a document through a [`StyleTable`].

use std::fmt::{self, Write};
use std::path::Path;

use formatted_text_config::StyleTable;
use formatted_text_engine::{Block, BlockType, Document, Line};
use html_escape::{encode_double_quoted_attribute, encode_text};

pub fn render_document(
    document: &Document,
    styles: &StyleTable,
    stylesheet: Option<&Path>,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if let Some(stylesheet) = stylesheet {
        let href = stylesheet.to_string_lossy();
        writeln!(
            out,
            "<link rel=\"stylesheet\" href=\"{}\">",
            encode_double_quoted_attribute(&href)
        )?;
    }

    let mut in_list = false;
    for block in document.blocks() {
        let is_list = block.kind() == BlockType::NumberedList;
        if is_list && !in_list {
            out.push_str("<ol>\n");
        } else if !is_list && in_list {
            out.push_str("</ol>\n");
        }
        in_list = is_list;
        render_block(&mut out, block, styles)?;
        out.push('\n');
    }
    if in_list {
        out.push_str("</ol>\n");
    }
    Ok(out)
}

fn render_block(out: &mut String, block: &Block, styles: &StyleTable) -> fmt::Result {
    let style = styles.block(block.kind());
    write!(out, "<{}", style.tag)?;
    if let Some(class) = &style.class {
        write!(out, " class=\"{}\"", encode_double_quoted_attribute(class))?;
    }
    if block.indent() > 0 {
        write!(out, " data-indent=\"{}\"", block.indent())?;
    }
    out.push('>');

    if block.kind().is_atomic() {
        // no inline formatting, keep the source lines as they are
        write!(out, "<pre>{}</pre>", encode_text(&block.flatten()))?;
    } else {
        for (i, line) in block.lines().iter().enumerate() {
            if i > 0 {
                out.push_str("<br>");
            }
            render_line(out, line, styles)?;
        }
    }

    if let Some(caption) = block.caption() {
        write!(out, "<figcaption>{}</figcaption>", encode_text(caption))?;
    }
    write!(out, "</{}>", style.tag)
}

fn render_line(out: &mut String, line: &Line, styles: &StyleTable) -> fmt::Result {
    for segment in line.traverse() {
        for flag in segment.flags {
            write!(out, "<{}>", styles.format_tag(*flag))?;
        }
        out.push_str(&encode_text(segment.text));
        for flag in segment.flags.iter().rev() {
            write!(out, "</{}>", styles.format_tag(*flag))?;
        }
    }
    Ok(())
}
