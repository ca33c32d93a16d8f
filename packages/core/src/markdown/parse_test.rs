//! Parser tests: structure recovery, mark stacking, reserved fences, and
//! the degrade-to-paragraph fallbacks.

use super::*;
use crate::models::{Alignment, Block, BlockKind, Inline, Mark};

fn parse_one(markdown: &str) -> Block {
    let mut blocks = parse_fragment(markdown);
    assert_eq!(blocks.len(), 1, "expected one block from {markdown:?}");
    blocks.remove(0)
}

#[test]
fn test_heading_levels() {
    let block = parse_one("### Third");
    match block.kind {
        BlockKind::Heading { level, content } => {
            assert_eq!(level, 3);
            assert_eq!(content, vec![Inline::text("Third")]);
        }
        other => panic!("expected heading, got {other:?}"),
    }
}

#[test]
fn test_nested_marks_stack() {
    let block = parse_one("**bold *both***");
    match block.kind {
        BlockKind::Paragraph { content } => {
            assert_eq!(
                content,
                vec![
                    Inline::marked("bold ", vec![Mark::Bold]),
                    Inline::marked("both", vec![Mark::Bold, Mark::Italic]),
                ]
            );
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn test_link_with_title() {
    let block = parse_one("[site](https://example.com \"the title\")");
    match block.kind {
        BlockKind::Paragraph { content } => {
            assert_eq!(
                content,
                vec![Inline::marked(
                    "site",
                    vec![Mark::Link {
                        href: "https://example.com".into(),
                        title: Some("the title".into()),
                    }]
                )]
            );
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn test_inline_code_keeps_outer_marks() {
    let block = parse_one("**`x`**");
    match block.kind {
        BlockKind::Paragraph { content } => {
            assert_eq!(content, vec![Inline::marked("x", vec![Mark::Bold, Mark::Code])]);
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn test_tight_and_nested_lists() {
    let blocks = parse_fragment("- top\n  - inner\n- second");
    assert_eq!(blocks.len(), 1);
    match &blocks[0].kind {
        BlockKind::BulletList { items } => {
            assert_eq!(items.len(), 2);
            let first = items[0].kind.child_blocks().unwrap();
            assert_eq!(first.len(), 2);
            assert_eq!(first[0].plain_text(), "top");
            assert!(matches!(first[1].kind, BlockKind::BulletList { .. }));
        }
        other => panic!("expected bullet list, got {other:?}"),
    }
}

#[test]
fn test_ordered_list_start_survives() {
    let block = parse_one("4. four\n5. five");
    match block.kind {
        BlockKind::OrderedList { start, items } => {
            assert_eq!(start, 4);
            assert_eq!(items.len(), 2);
        }
        other => panic!("expected ordered list, got {other:?}"),
    }
}

#[test]
fn test_task_list_markers() {
    let block = parse_one("- [x] done\n- [ ] open");
    match block.kind {
        BlockKind::TaskList { items } => {
            assert!(matches!(
                items[0].kind,
                BlockKind::TaskItem { checked: true, .. }
            ));
            assert!(matches!(
                items[1].kind,
                BlockKind::TaskItem { checked: false, .. }
            ));
        }
        other => panic!("expected task list, got {other:?}"),
    }
}

#[test]
fn test_blockquote_with_two_paragraphs() {
    let block = parse_one("> one\n>\n> two");
    match block.kind {
        BlockKind::Blockquote { content } => {
            assert_eq!(content.len(), 2);
        }
        other => panic!("expected blockquote, got {other:?}"),
    }
}

#[test]
fn test_plain_fence_stays_code() {
    let block = parse_one("```rust\nfn main() {}\n```");
    match block.kind {
        BlockKind::CodeBlock { language, code } => {
            assert_eq!(language, "rust");
            assert_eq!(code, "fn main() {}");
        }
        other => panic!("expected code block, got {other:?}"),
    }
}

#[test]
fn test_callout_fence_is_lifted() {
    let block = parse_one("```callout:tip\nstretch first\n```");
    match block.kind {
        BlockKind::Callout { kind, content } => {
            assert_eq!(kind, crate::models::CalloutKind::Tip);
            assert_eq!(content[0].plain_text(), "stretch first");
        }
        other => panic!("expected callout, got {other:?}"),
    }
}

#[test]
fn test_details_fence_splits_summary() {
    let block = parse_one("```details\nSpoilers\n---\nthe butler did it\n```");
    match block.kind {
        BlockKind::Details { summary, content } => {
            assert_eq!(summary, vec![Inline::text("Spoilers")]);
            assert_eq!(content[0].plain_text(), "the butler did it");
        }
        other => panic!("expected details, got {other:?}"),
    }
}

#[test]
fn test_video_fence_becomes_embed() {
    let block = parse_one("```video\nhttps://example.com/v.mp4\n```");
    assert!(matches!(
        block.kind,
        BlockKind::VideoEmbed { url } if url == "https://example.com/v.mp4"
    ));
}

#[test]
fn test_empty_video_fence_stays_code() {
    let block = parse_one("```video\n```");
    assert!(matches!(block.kind, BlockKind::CodeBlock { .. }));
}

#[test]
fn test_display_math_block() {
    let block = parse_one("$$e = mc^2$$");
    assert!(matches!(
        block.kind,
        BlockKind::MathBlock { expr } if expr == "e = mc^2"
    ));
}

#[test]
fn test_inline_math_degrades_to_text() {
    let block = parse_one("value $x$ here");
    assert_eq!(block.plain_text(), "value $x$ here");
}

#[test]
fn test_lone_image_becomes_block() {
    let block = parse_one("![alt text](https://example.com/a.png)");
    match block.kind {
        BlockKind::Image { attrs } => {
            assert_eq!(attrs.src, "https://example.com/a.png");
            assert_eq!(attrs.alt, "alt text");
            assert_eq!(attrs.align, Alignment::Center);
        }
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn test_image_alignment_fragment() {
    let block = parse_one("![a](https://example.com/a.png#align=left)");
    match block.kind {
        BlockKind::Image { attrs } => {
            assert_eq!(attrs.src, "https://example.com/a.png");
            assert_eq!(attrs.align, Alignment::Left);
        }
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn test_image_inside_text_paragraph_splits_out() {
    let blocks = parse_fragment("before ![a](https://example.com/a.png) after");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].plain_text(), "before  after");
    assert!(matches!(blocks[1].kind, BlockKind::Image { .. }));
}

#[test]
fn test_pipe_table() {
    let block = parse_one("| a | b |\n| --- | --- |\n| 1 | 2 |");
    match block.kind {
        BlockKind::Table { header, rows } => {
            assert_eq!(header.len(), 2);
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0][1], vec![Inline::text("2")]);
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn test_soft_break_becomes_space() {
    let block = parse_one("line one\nline two");
    assert_eq!(block.plain_text(), "line one line two");
}

#[test]
fn test_hard_break_survives() {
    let block = parse_one("line one\\\nline two");
    match block.kind {
        BlockKind::Paragraph { content } => {
            assert!(content.contains(&Inline::HardBreak));
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn test_raw_html_degrades_to_text() {
    let blocks = parse_fragment("<div>inside</div>");
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].plain_text().contains("inside"));
}

#[test]
fn test_empty_input_yields_empty_document() {
    let doc = parse("");
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.blocks()[0].plain_text(), "");
}

#[test]
fn test_korean_text_is_preserved() {
    let block = parse_one("오늘은 **맑음**이다");
    assert_eq!(block.plain_text(), "오늘은 맑음이다");
}
