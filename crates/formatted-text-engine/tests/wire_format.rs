use formatted_text_engine::{Block, BlockType, Document, FormatType, Line, parse_document};
use insta::assert_snapshot;

fn json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap()
}

#[test]
fn plain_line() {
    assert_snapshot!(json(&Line::from_text("hello")), @r#"{"text":"hello","formatting":[]}"#);
}

#[test]
fn formatted_line() {
    let mut line = Line::new();
    line.append("say ", &[])
        .append("\"hi\"", &[FormatType::Italic, FormatType::Bold]);
    assert_snapshot!(
        json(&line),
        @r#"{"text":"say \"hi\"","formatting":[{"index":4,"length":4,"formats":["BOLD","ITALIC"]}]}"#
    );
}

#[test]
fn block_omits_default_indent_and_caption() {
    let mut block = Block::new(BlockType::NumberedList);
    block.push_line("one");
    assert_snapshot!(
        json(&block),
        @r#"{"type":"NUMBERED_LIST","lines":[{"text":"one","formatting":[]}]}"#
    );
}

#[test]
fn block_with_indent_and_caption() {
    let mut block = Block::new(BlockType::Diagram)
        .with_indent(2)
        .with_caption("Figure 1");
    block.push_line("a -> b");
    assert_snapshot!(
        json(&block),
        @r#"{"type":"DIAGRAM","lines":[{"text":"a -> b","formatting":[]}],"indent":2,"caption":"Figure 1"}"#
    );
}

#[test]
fn heading_type_names() {
    let names: Vec<String> = [BlockType::Heading1, BlockType::Heading2, BlockType::Heading3]
        .iter()
        .map(json)
        .collect();
    assert_snapshot!(names.join(" "), @r#""HEADING1" "HEADING2" "HEADING3""#);
}

#[test]
fn document_round_trip() {
    let mut doc = Document::new();
    doc.block(BlockType::Heading1, |b| {
        b.push_line("Title");
    })
    .block(BlockType::Paragraph, |b| {
        b.line(|l| {
            l.append("x", &[FormatType::Code]).append("y", &[FormatType::Highlight]);
        });
    });

    let text = json(&doc);
    assert_snapshot!(
        text,
        @r#"{"blocks":[{"type":"HEADING1","lines":[{"text":"Title","formatting":[]}]},{"type":"PARAGRAPH","lines":[{"text":"xy","formatting":[{"index":0,"length":1,"formats":["CODE"]},{"index":1,"length":1,"formats":["HIGHLIGHT"]}]}]}]}"#
    );
    assert_eq!(parse_document(&text).unwrap(), doc);
}

#[test]
fn reading_fills_defaults_and_clamps_indent() {
    let doc = parse_document(r#"{"blocks":[{"type":"PARAGRAPH","indent":9,"lines":[{"text":"a"}]}]}"#)
        .unwrap();
    let block = &doc.blocks()[0];
    assert_eq!(block.indent(), 5);
    assert_eq!(block.caption(), None);
    assert!(block.lines()[0].formats().is_empty());
}
