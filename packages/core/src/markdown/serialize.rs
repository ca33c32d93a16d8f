//! Tree → Markdown
//!
//! Emits CommonMark plus the extensions the parser understands: pipe
//! tables, strikethrough, task lists, and `$$` math. Types with no
//! Markdown equivalent (callouts, toggles, video embeds) are written as
//! fenced blocks with a reserved info string so they survive a round trip
//! through plain-text storage. Upload placeholders are transient editing
//! state and are omitted entirely.

use crate::editor::document::Document;
use crate::models::{Alignment, Block, BlockKind, Inline, Mark};

/// Serialize a whole document. Output ends with a single newline.
pub fn serialize(doc: &Document) -> String {
    let mut out = serialize_blocks(doc.blocks());
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Serialize a block sequence, blocks separated by blank lines
pub fn serialize_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter_map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_block(block: &Block) -> Option<String> {
    match &block.kind {
        BlockKind::ImagePlaceholder => None,
        BlockKind::Paragraph { content } => Some(escape_block_starts(&render_inlines(content))),
        BlockKind::Heading { level, content } => Some(format!(
            "{} {}",
            "#".repeat(usize::from(*level)),
            render_inlines(content)
        )),
        BlockKind::BulletList { items } => Some(render_list(items, |_| "- ".to_string())),
        BlockKind::OrderedList { start, items } => {
            Some(render_list(items, |i| format!("{}. ", start + i as u64)))
        }
        BlockKind::TaskList { items } => Some(render_list(items, |_| String::new())),
        // loose items outside a list render as their content
        BlockKind::ListItem { content } | BlockKind::TaskItem { content, .. } => {
            Some(serialize_blocks(content))
        }
        BlockKind::Blockquote { content } => {
            let inner = serialize_blocks(content);
            Some(
                inner
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {line}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        }
        BlockKind::CodeBlock { language, code } => Some(fenced(language, code)),
        BlockKind::MathBlock { expr } => {
            if expr.contains('\n') {
                Some(format!("$$\n{expr}\n$$"))
            } else {
                Some(format!("$${expr}$$"))
            }
        }
        BlockKind::Callout { kind, content } => Some(fenced(
            &format!("callout:{}", kind.as_str()),
            &serialize_blocks(content),
        )),
        BlockKind::Details { summary, content } => {
            let body = format!(
                "{}\n---\n{}",
                render_inlines(summary),
                serialize_blocks(content)
            );
            Some(fenced("details", &body))
        }
        BlockKind::Table { header, rows } => Some(render_table(header, rows)),
        BlockKind::HorizontalRule => Some("---".to_string()),
        BlockKind::Image { attrs } => {
            let mut src = attrs.src.clone();
            match attrs.align {
                Alignment::Center => {}
                Alignment::Left => src.push_str("#align=left"),
                Alignment::Right => src.push_str("#align=right"),
            }
            let title = attrs
                .title
                .as_ref()
                .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
                .unwrap_or_default();
            Some(format!("![{}]({src}{title})", escape_text(&attrs.alt)))
        }
        BlockKind::VideoEmbed { url } => Some(fenced("video", url)),
    }
}

/// Render list items with a per-item marker; task items get their checkbox
/// appended to the marker. Continuation lines are indented to the marker
/// width so nested content stays inside the item.
fn render_list<F: Fn(usize) -> String>(items: &[Block], marker: F) -> String {
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let mut prefix = marker(i);
        if let BlockKind::TaskItem { checked, .. } = &item.kind {
            prefix = format!("- [{}] ", if *checked { 'x' } else { ' ' });
        }
        let indent = " ".repeat(prefix.len());
        let body = match item.kind.child_blocks() {
            Some(children) => serialize_blocks(children),
            None => render_block(item).unwrap_or_default(),
        };
        let mut lines = body.lines();
        let mut rendered = match lines.next() {
            Some(first) => format!("{prefix}{first}"),
            None => prefix.trim_end().to_string(),
        };
        for line in lines {
            rendered.push('\n');
            if line.is_empty() {
                // blank separator inside a loose item
            } else {
                rendered.push_str(&indent);
                rendered.push_str(line);
            }
        }
        out.push(rendered);
    }
    out.join("\n")
}

fn render_table(header: &[Vec<Inline>], rows: &[Vec<Vec<Inline>>]) -> String {
    let row_line = |cells: &[Vec<Inline>]| {
        let rendered: Vec<String> = cells
            .iter()
            .map(|cell| render_inlines(cell).replace('\n', " "))
            .collect();
        format!("| {} |", rendered.join(" | "))
    };
    let mut out = row_line(header);
    out.push('\n');
    out.push_str(&format!(
        "|{}|",
        vec![" --- "; header.len().max(1)].join("|")
    ));
    for row in rows {
        out.push('\n');
        out.push_str(&row_line(row));
    }
    out
}

/// Fenced block whose fence is longer than any backtick run in the body
fn fenced(info: &str, body: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(body).max(2) + 1);
    if body.is_empty() {
        format!("{fence}{info}\n{fence}")
    } else {
        format!("{fence}{info}\n{body}\n{fence}")
    }
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

/// Render an inline sequence, merging adjacent leaves that carry the same
/// marks so delimiters never double up
pub fn render_inlines(content: &[Inline]) -> String {
    let mut out = String::new();
    let mut pending: Option<(String, Vec<Mark>)> = None;

    let mut flush = |pending: &mut Option<(String, Vec<Mark>)>, out: &mut String| {
        if let Some((text, marks)) = pending.take() {
            out.push_str(&render_leaf(&text, &marks));
        }
    };

    for inline in content {
        match inline {
            Inline::Text { text, marks } => match &mut pending {
                Some((buf, held)) if held == marks => buf.push_str(text),
                _ => {
                    flush(&mut pending, &mut out);
                    pending = Some((text.clone(), marks.clone()));
                }
            },
            Inline::HardBreak => {
                flush(&mut pending, &mut out);
                out.push_str("\\\n");
            }
        }
    }
    flush(&mut pending, &mut out);
    out
}

/// Wrap one text leaf in its mark delimiters, innermost (highest rank)
/// first so nesting comes out canonical: link around bold around italic
/// around strike around code
fn render_leaf(text: &str, marks: &[Mark]) -> String {
    let is_code = marks.iter().any(|m| matches!(m, Mark::Code));
    let mut s = if is_code {
        code_span(text)
    } else {
        escape_text(text)
    };
    for mark in marks.iter().rev() {
        s = match mark {
            Mark::Code => s,
            Mark::Strike => format!("~~{s}~~"),
            Mark::Italic => format!("*{s}*"),
            Mark::Bold => format!("**{s}**"),
            Mark::Link { href, title } => {
                let title = title
                    .as_ref()
                    .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
                    .unwrap_or_default();
                format!("[{s}]({href}{title})")
            }
        };
    }
    s
}

fn code_span(text: &str) -> String {
    let delim = "`".repeat(longest_backtick_run(text) + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{delim} {text} {delim}")
    } else {
        format!("{delim}{text}{delim}")
    }
}

/// Escape leading markers that would turn a paragraph line into a list
/// item, thematic break, or setext underline when read back
fn escape_block_starts(text: &str) -> String {
    text.split('\n')
        .map(escape_line_start)
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_line_start(line: &str) -> String {
    let mut chars = line.chars();
    match chars.next() {
        Some(c @ ('-' | '+')) => {
            // a dash line may be a break or setext underline even without
            // a following space
            let dash_run = c == '-' && line.chars().all(|ch| ch == '-' || ch == ' ');
            if dash_run || matches!(chars.next(), None | Some(' ')) {
                return format!("\\{line}");
            }
        }
        Some('=') => {
            if line.chars().all(|ch| ch == '=') {
                return format!("\\{line}");
            }
        }
        Some('0'..='9') => {
            // ordered list marker: 1-9 digits, then '.' or ')', then space
            // or end of line. Digits cannot be backslash-escaped, so the
            // delimiter takes the escape.
            let digits = line.chars().take_while(|ch| ch.is_ascii_digit()).count();
            let rest = &line[digits..];
            let mut rest_chars = rest.chars();
            if digits <= 9
                && matches!(rest_chars.next(), Some('.' | ')'))
                && matches!(rest_chars.next(), None | Some(' '))
            {
                return format!("{}\\{rest}", &line[..digits]);
            }
        }
        _ => {}
    }
    line.to_string()
}

/// Escape the characters that would otherwise be read back as syntax
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '~' | '`' | '[' | ']' | '#' | '|' | '$' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
