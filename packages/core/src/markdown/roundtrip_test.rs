//! Round-trip properties: parse ∘ serialize preserves content, and
//! serialize ∘ parse is idempotent after one normalizing pass.

use super::*;
use crate::models::{Alignment, Block, BlockKind, CalloutKind, ImageAttrs, Inline, Mark};

/// serialize → parse → serialize must be a fixed point
fn assert_stable(markdown: &str) {
    let once = serialize(&parse(markdown));
    let twice = serialize(&parse(&once));
    assert_eq!(once, twice, "round trip not idempotent for {markdown:?}");
}

/// blocks → markdown → blocks must preserve content (ids are fresh)
fn assert_content_survives(blocks: Vec<Block>) {
    let markdown = serialize_blocks(&blocks);
    let reparsed = parse_fragment(&markdown);
    assert_eq!(
        blocks.len(),
        reparsed.len(),
        "block count changed through {markdown:?}"
    );
    for (a, b) in blocks.iter().zip(&reparsed) {
        assert!(
            a.content_eq(b),
            "content diverged through {markdown:?}:\n{a:#?}\nvs\n{b:#?}"
        );
    }
}

#[test]
fn test_simple_document_round_trips() {
    assert_content_survives(vec![
        Block::heading(1, "Post title"),
        Block::paragraph("First paragraph."),
        Block::paragraph("Second paragraph."),
    ]);
}

#[test]
fn test_marked_text_round_trips() {
    assert_content_survives(vec![Block::paragraph_of(vec![
        Inline::text("plain "),
        Inline::marked("bold", vec![Mark::Bold]),
        Inline::text(" then "),
        Inline::marked("code", vec![Mark::Code]),
    ])]);
}

#[test]
fn test_nested_marks_round_trip() {
    assert_content_survives(vec![Block::paragraph_of(vec![Inline::marked(
        "all three",
        vec![Mark::Bold, Mark::Italic, Mark::Strike],
    )])]);
}

#[test]
fn test_link_round_trips() {
    assert_content_survives(vec![Block::paragraph_of(vec![Inline::marked(
        "my blog",
        vec![Mark::Link {
            href: "https://blog.example.com".into(),
            title: Some("home".into()),
        }],
    )])]);
}

#[test]
fn test_lists_round_trip() {
    assert_content_survives(vec![
        Block::new(BlockKind::BulletList {
            items: vec![
                Block::new(BlockKind::ListItem {
                    content: vec![Block::paragraph("one")],
                }),
                Block::new(BlockKind::ListItem {
                    content: vec![Block::paragraph("two")],
                }),
            ],
        }),
        Block::new(BlockKind::OrderedList {
            start: 3,
            items: vec![Block::new(BlockKind::ListItem {
                content: vec![Block::paragraph("three")],
            })],
        }),
    ]);
}

#[test]
fn test_task_list_round_trips() {
    assert_content_survives(vec![Block::new(BlockKind::TaskList {
        items: vec![
            Block::new(BlockKind::TaskItem {
                checked: true,
                content: vec![Block::paragraph("shipped")],
            }),
            Block::new(BlockKind::TaskItem {
                checked: false,
                content: vec![Block::paragraph("pending")],
            }),
        ],
    })]);
}

#[test]
fn test_quote_code_and_rule_round_trip() {
    assert_content_survives(vec![
        Block::new(BlockKind::Blockquote {
            content: vec![Block::paragraph("quoted words")],
        }),
        Block::new(BlockKind::CodeBlock {
            language: "rust".into(),
            code: "fn main() {\n    println!(\"hi\");\n}".into(),
        }),
        Block::new(BlockKind::HorizontalRule),
    ]);
}

#[test]
fn test_extended_blocks_round_trip() {
    assert_content_survives(vec![
        Block::new(BlockKind::Callout {
            kind: CalloutKind::Danger,
            content: vec![Block::paragraph("do not deploy on friday")],
        }),
        Block::new(BlockKind::Details {
            summary: vec![Inline::text("Spoiler")],
            content: vec![Block::paragraph("hidden text")],
        }),
        Block::new(BlockKind::VideoEmbed {
            url: "https://example.com/clip.mp4".into(),
        }),
        Block::new(BlockKind::MathBlock {
            expr: "a^2 + b^2 = c^2".into(),
        }),
    ]);
}

#[test]
fn test_image_attributes_round_trip() {
    assert_content_survives(vec![
        Block::image(
            ImageAttrs::new("https://example.com/a.png")
                .with_alt("a photo")
                .with_align(Alignment::Right),
        ),
        Block::image(ImageAttrs::new("https://example.com/b.png").with_title("caption")),
    ]);
}

#[test]
fn test_table_round_trips() {
    assert_content_survives(vec![Block::new(BlockKind::Table {
        header: vec![vec![Inline::text("name")], vec![Inline::text("count")]],
        rows: vec![
            vec![vec![Inline::text("apples")], vec![Inline::text("3")]],
            vec![vec![Inline::text("pears")], vec![Inline::text("7")]],
        ],
    })]);
}

#[test]
fn test_placeholder_dropped_on_round_trip() {
    let blocks = vec![
        Block::paragraph("kept"),
        Block::image_placeholder(),
    ];
    let reparsed = parse_fragment(&serialize_blocks(&blocks));
    assert_eq!(reparsed.len(), 1);
    assert_eq!(reparsed[0].plain_text(), "kept");
}

#[test]
fn test_serialization_is_idempotent() {
    assert_stable("# Title\n\nsome *styled* text with `code`\n");
    assert_stable("- a\n- b\n  - nested\n");
    assert_stable("> quote\n\n```rust\nlet x = 1;\n```\n");
    assert_stable("| a | b |\n| --- | --- |\n| 1 | 2 |\n");
    assert_stable("```callout:note\nremember\n```\n");
    assert_stable("오늘은 **맑음**, 내일은 비\n");
}

#[test]
fn test_messy_input_normalizes_then_stabilizes() {
    // sloppy spacing, setext heading, asterisk bullets
    assert_stable("Title\n=====\n\n*  spaced   item\n*  another\n\n\n\ntrailing");
}

#[test]
fn test_special_characters_survive_round_trip() {
    assert_content_survives(vec![Block::paragraph("5 * 3 = 15, a_b, 100$ [sic]")]);
}

#[test]
fn test_paragraph_of_dashes_stays_a_paragraph() {
    assert_content_survives(vec![Block::paragraph("---")]);
    assert_stable("\\---\n");
}

#[test]
fn test_leading_list_markers_stay_literal_text() {
    assert_content_survives(vec![Block::paragraph("- not a list")]);
    assert_content_survives(vec![Block::paragraph("+ plus sign first")]);
    assert_content_survives(vec![Block::paragraph("1. looks ordered")]);
    assert_content_survives(vec![Block::paragraph("7) still prose")]);
}
