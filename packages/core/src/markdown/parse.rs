//! Markdown → Tree
//!
//! Event-driven builder over pulldown-cmark with tables, strikethrough,
//! task lists, and math enabled. Fenced blocks with reserved info strings
//! (`callout:*`, `details`, `video`) are lifted back into their native
//! block types, with a depth guard so a pathological nesting of fences
//! cannot recurse unboundedly. Parsing never fails: anything the builder
//! cannot place becomes plain paragraph text, and the finished fragment is
//! normalized through the content-model repair pass.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::editor::document::Document;
use crate::models::{
    repair_fragment, Alignment, Block, BlockKind, CalloutKind, ImageAttrs, Inline, Mark,
};

/// Reserved-fence recursion ceiling; deeper fences stay code blocks
const MAX_FENCE_DEPTH: usize = 8;

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH
}

/// Parse Markdown into a full document. An empty input yields the empty
/// document (one blank paragraph).
pub fn parse(markdown: &str) -> Document {
    let blocks = parse_fragment(markdown);
    if blocks.is_empty() {
        Document::new()
    } else {
        Document::from_repaired(blocks)
    }
}

/// Parse Markdown into a repaired block fragment (the memo insertion path)
pub fn parse_fragment(markdown: &str) -> Vec<Block> {
    repair_fragment(parse_blocks(markdown, 0))
}

fn parse_blocks(markdown: &str, depth: usize) -> Vec<Block> {
    let mut builder = TreeBuilder::new(depth);
    for event in Parser::new_ext(markdown, options()) {
        builder.handle(event);
    }
    builder.finish()
}

/// An open container or leaf being assembled
enum Frame {
    Paragraph,
    Heading(u8),
    Quote(Vec<Block>),
    List {
        start: Option<u64>,
        items: Vec<Block>,
    },
    Item {
        blocks: Vec<Block>,
        checked: Option<bool>,
    },
    Code {
        info: String,
        text: String,
    },
    Table {
        header: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
        current: Vec<Vec<Inline>>,
        in_head: bool,
    },
    Image {
        dest: String,
        title: String,
        alt: String,
    },
}

struct TreeBuilder {
    depth: usize,
    out: Vec<Block>,
    stack: Vec<Frame>,
    inline: Vec<Inline>,
    marks: Vec<Mark>,
    /// Block-level atoms (images, display math) found inside the current
    /// textblock, emitted right after it closes
    pending: Vec<Block>,
}

impl TreeBuilder {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            out: Vec::new(),
            stack: Vec::new(),
            inline: Vec::new(),
            marks: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match self.stack.last_mut() {
                Some(Frame::Code { text: buf, .. }) => buf.push_str(&text),
                Some(Frame::Image { alt, .. }) => alt.push_str(&text),
                _ => self.push_text(&text),
            },
            Event::Code(text) => match self.stack.last_mut() {
                Some(Frame::Image { alt, .. }) => alt.push_str(&text),
                _ => {
                    let mut marks = self.marks.clone();
                    marks.push(Mark::Code);
                    self.inline.push(Inline::marked(text.to_string(), marks));
                }
            },
            Event::InlineMath(expr) => self.push_text(&format!("${expr}$")),
            Event::DisplayMath(expr) => {
                let block = Block::new(BlockKind::MathBlock {
                    expr: expr.trim().to_string(),
                });
                if self.in_textblock() {
                    self.pending.push(block);
                } else {
                    self.push_block(block);
                }
            }
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.inline.push(Inline::HardBreak),
            Event::Rule => self.push_block(Block::new(BlockKind::HorizontalRule)),
            Event::TaskListMarker(done) => {
                for frame in self.stack.iter_mut().rev() {
                    if let Frame::Item { checked, .. } = frame {
                        *checked = Some(done);
                        break;
                    }
                }
            }
            // raw HTML degrades to visible text
            Event::Html(text) | Event::InlineHtml(text) => self.push_text(text.trim_end()),
            Event::FootnoteReference(name) => self.push_text(&format!("[^{name}]")),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::HtmlBlock => {
                self.flush_loose_inline();
                self.stack.push(Frame::Paragraph);
            }
            Tag::Heading { level, .. } => {
                self.flush_loose_inline();
                self.stack.push(Frame::Heading(level as u8));
            }
            Tag::BlockQuote(_) => {
                self.flush_loose_inline();
                self.stack.push(Frame::Quote(Vec::new()));
            }
            Tag::List(start) => {
                self.flush_loose_inline();
                self.stack.push(Frame::List {
                    start,
                    items: Vec::new(),
                });
            }
            Tag::Item => self.stack.push(Frame::Item {
                blocks: Vec::new(),
                checked: None,
            }),
            Tag::CodeBlock(kind) => {
                self.flush_loose_inline();
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.stack.push(Frame::Code {
                    info,
                    text: String::new(),
                });
            }
            Tag::Table(_) => {
                self.flush_loose_inline();
                self.stack.push(Frame::Table {
                    header: Vec::new(),
                    rows: Vec::new(),
                    current: Vec::new(),
                    in_head: false,
                });
            }
            Tag::TableHead => {
                if let Some(Frame::Table { in_head, .. }) = self.stack.last_mut() {
                    *in_head = true;
                }
            }
            Tag::TableRow | Tag::TableCell => {}
            Tag::Emphasis => self.marks.push(Mark::Italic),
            Tag::Strong => self.marks.push(Mark::Bold),
            Tag::Strikethrough => self.marks.push(Mark::Strike),
            Tag::Link {
                dest_url, title, ..
            } => self.marks.push(Mark::Link {
                href: dest_url.to_string(),
                title: (!title.is_empty()).then(|| title.to_string()),
            }),
            Tag::Image {
                dest_url, title, ..
            } => self.stack.push(Frame::Image {
                dest: dest_url.to_string(),
                title: title.to_string(),
                alt: String::new(),
            }),
            // options() never produces the remaining tags
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::HtmlBlock => {
                if matches!(self.stack.last(), Some(Frame::Paragraph)) {
                    self.stack.pop();
                }
                let inline = std::mem::take(&mut self.inline);
                if !inline.is_empty() && inline.iter().any(is_visible) {
                    self.push_block(Block::paragraph_of(inline));
                }
                self.flush_pending();
            }
            TagEnd::Heading(_) => {
                let level = match self.stack.pop() {
                    Some(Frame::Heading(level)) => level,
                    _ => 1,
                };
                let inline = std::mem::take(&mut self.inline);
                self.push_block(Block::new(BlockKind::Heading {
                    level,
                    content: inline,
                }));
                self.flush_pending();
            }
            TagEnd::BlockQuote => {
                if let Some(Frame::Quote(content)) = self.stack.pop() {
                    if !content.is_empty() {
                        self.push_block(Block::new(BlockKind::Blockquote { content }));
                    }
                }
            }
            TagEnd::Item => {
                self.flush_loose_inline();
                if let Some(Frame::Item { blocks, checked }) = self.stack.pop() {
                    let item = match checked {
                        Some(done) => Block::new(BlockKind::TaskItem {
                            checked: done,
                            content: blocks,
                        }),
                        None => Block::new(BlockKind::ListItem { content: blocks }),
                    };
                    if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                        items.push(item);
                    } else {
                        self.push_block(item);
                    }
                }
            }
            TagEnd::List(_) => {
                if let Some(Frame::List { start, items }) = self.stack.pop() {
                    if items.is_empty() {
                        return;
                    }
                    let tasks = items
                        .iter()
                        .any(|i| matches!(i.kind, BlockKind::TaskItem { .. }));
                    let kind = if tasks {
                        BlockKind::TaskList {
                            items: items.into_iter().map(coerce_task_item).collect(),
                        }
                    } else if let Some(start) = start {
                        BlockKind::OrderedList { start, items }
                    } else {
                        BlockKind::BulletList { items }
                    };
                    self.push_block(Block::new(kind));
                }
            }
            TagEnd::CodeBlock => {
                if let Some(Frame::Code { info, mut text }) = self.stack.pop() {
                    if text.ends_with('\n') {
                        text.pop();
                    }
                    let block = self.lift_fenced(&info, text);
                    self.push_block(block);
                }
            }
            TagEnd::TableCell => {
                let cell = std::mem::take(&mut self.inline);
                if let Some(Frame::Table {
                    header,
                    current,
                    in_head,
                    ..
                }) = self.stack.last_mut()
                {
                    if *in_head {
                        header.push(cell);
                    } else {
                        current.push(cell);
                    }
                }
            }
            TagEnd::TableRow => {
                if let Some(Frame::Table { rows, current, .. }) = self.stack.last_mut() {
                    rows.push(std::mem::take(current));
                }
            }
            TagEnd::TableHead => {
                if let Some(Frame::Table { in_head, .. }) = self.stack.last_mut() {
                    *in_head = false;
                }
            }
            TagEnd::Table => {
                if let Some(Frame::Table { header, rows, .. }) = self.stack.pop() {
                    if !header.is_empty() {
                        self.push_block(Block::new(BlockKind::Table { header, rows }));
                    }
                }
            }
            TagEnd::Emphasis => self.pop_mark(&Mark::Italic),
            TagEnd::Strong => self.pop_mark(&Mark::Bold),
            TagEnd::Strikethrough => self.pop_mark(&Mark::Strike),
            TagEnd::Link => self.pop_mark(&Mark::Link {
                href: String::new(),
                title: None,
            }),
            TagEnd::Image => {
                if let Some(Frame::Image { dest, title, alt }) = self.stack.pop() {
                    self.finish_image(dest, title, alt);
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_loose_inline();
        self.flush_pending();
        self.out
    }

    // ------------------------------------------------------------------
    // placement helpers
    // ------------------------------------------------------------------

    /// Whether a paragraph or heading is currently open
    fn in_textblock(&self) -> bool {
        self.stack
            .iter()
            .any(|f| matches!(f, Frame::Paragraph | Frame::Heading(_)))
    }

    /// Append a finished block to the innermost open container, or to the
    /// top level when none is open
    fn push_block(&mut self, block: Block) {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Quote(content) => {
                    content.push(block);
                    return;
                }
                Frame::Item { blocks, .. } => {
                    blocks.push(block);
                    return;
                }
                _ => {}
            }
        }
        self.out.push(block);
    }

    /// Append text under the current marks. The event stream splits text at
    /// escape sequences, so adjacent same-mark runs coalesce into one leaf.
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Inline::Text { text: last, marks }) = self.inline.last_mut() {
            if *marks == self.marks {
                last.push_str(text);
                return;
            }
        }
        self.inline
            .push(Inline::marked(text.to_string(), self.marks.clone()));
    }

    fn pop_mark(&mut self, mark: &Mark) {
        if let Some(pos) = self.marks.iter().rposition(|m| m.same_type(mark)) {
            self.marks.remove(pos);
        }
    }

    /// Tight list items carry bare text with no paragraph wrapper; wrap any
    /// dangling inline content before a block boundary
    fn flush_loose_inline(&mut self) {
        if self.inline.is_empty() {
            return;
        }
        let inline = std::mem::take(&mut self.inline);
        if !inline.iter().any(is_visible) {
            return;
        }
        let block = Block::paragraph_of(inline);
        self.push_block(block);
        self.flush_pending();
    }

    fn flush_pending(&mut self) {
        for block in std::mem::take(&mut self.pending) {
            self.push_block(block);
        }
    }

    /// An image alone is a block; inside a heading it is deferred until the
    /// heading closes, and in any other inline context it degrades to its
    /// alt text
    fn finish_image(&mut self, dest: String, title: String, alt: String) {
        if dest.is_empty() {
            self.push_text(&alt);
            return;
        }
        let (src, align) = split_align_fragment(&dest);
        let mut attrs = ImageAttrs::new(src).with_align(align);
        if !alt.is_empty() {
            attrs = attrs.with_alt(alt);
        }
        if !title.is_empty() {
            attrs = attrs.with_title(title);
        }
        let block = Block::image(attrs);
        if self.in_textblock() {
            self.pending.push(block);
        } else {
            self.push_block(block);
        }
    }

    /// Lift a fenced block with a reserved info string back into its native
    /// type; anything else stays a code block
    fn lift_fenced(&self, info: &str, text: String) -> Block {
        let language = info.split_whitespace().next().unwrap_or("").to_string();
        if self.depth >= MAX_FENCE_DEPTH {
            return Block::new(BlockKind::CodeBlock { language, code: text });
        }
        if let Some(kind) = language.strip_prefix("callout:") {
            let content = nested_blocks(&text, self.depth);
            return Block::new(BlockKind::Callout {
                kind: CalloutKind::from_str_lossy(kind),
                content,
            });
        }
        match language.as_str() {
            "callout" => Block::new(BlockKind::Callout {
                kind: CalloutKind::default(),
                content: nested_blocks(&text, self.depth),
            }),
            "details" => {
                let (summary, body) = split_details_body(&text);
                Block::new(BlockKind::Details {
                    summary: parse_inline_line(&summary, self.depth),
                    content: nested_blocks(&body, self.depth),
                })
            }
            "video" => {
                let url = text.trim().to_string();
                if url.is_empty() {
                    Block::new(BlockKind::CodeBlock { language, code: text })
                } else {
                    Block::new(BlockKind::VideoEmbed { url })
                }
            }
            _ => Block::new(BlockKind::CodeBlock { language, code: text }),
        }
    }
}

fn is_visible(inline: &Inline) -> bool {
    match inline {
        Inline::Text { text, .. } => !text.trim().is_empty(),
        Inline::HardBreak => false,
    }
}

/// Lists parsed with mixed task markers coerce the plain items to unchecked
/// tasks so the container stays homogeneous
fn coerce_task_item(item: Block) -> Block {
    match item.kind {
        BlockKind::TaskItem { .. } => item,
        BlockKind::ListItem { content } => Block {
            id: item.id,
            kind: BlockKind::TaskItem {
                checked: false,
                content,
            },
        },
        _ => item,
    }
}

/// Parse the body of a reserved fence, guaranteeing at least one child so
/// the container validates
fn nested_blocks(text: &str, depth: usize) -> Vec<Block> {
    let mut blocks = repair_fragment(parse_blocks(text, depth + 1));
    if blocks.is_empty() {
        blocks.push(Block::paragraph_of(Vec::new()));
    }
    blocks
}

/// A details body is `summary line, --- separator, content`; a body without
/// the separator is all content with an empty summary
fn split_details_body(text: &str) -> (String, String) {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or("").to_string();
    let rest: Vec<&str> = lines.collect();
    match rest.first() {
        Some(&"---") => (first, rest[1..].join("\n")),
        _ => (String::new(), text.to_string()),
    }
}

/// Parse one line of Markdown as inline content
fn parse_inline_line(line: &str, depth: usize) -> Vec<Inline> {
    if line.trim().is_empty() {
        return Vec::new();
    }
    let blocks = parse_blocks(line, depth + 1);
    blocks
        .into_iter()
        .next()
        .and_then(|b| match b.kind {
            BlockKind::Paragraph { content } | BlockKind::Heading { content, .. } => Some(content),
            _ => None,
        })
        .unwrap_or_else(|| vec![Inline::text(line.trim())])
}

/// Split a trailing `#align=left|right` fragment off an image source
fn split_align_fragment(dest: &str) -> (&str, Alignment) {
    match dest.rfind("#align=") {
        Some(idx) => {
            let align = Alignment::from_str_lossy(&dest[idx + "#align=".len()..]);
            (&dest[..idx], align)
        }
        None => (dest, Alignment::Center),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod parse_test;
