//! Slash-Command Palette
//!
//! A static catalog of insertable content templates. Matching is a plain
//! case-insensitive substring filter over title and search terms in catalog
//! declaration order; there is no relevance ranking.
//!
//! Execution is atomic from the caller's point of view: the trigger text is
//! deleted and the content mutation applied in one call. Items that need a
//! URL take it as a pre-collected prompt value; a cancelled prompt (`None`)
//! performs no mutation at all and leaves the trigger text in place.

use crate::editor::document::{BlockType, Cursor, Document, TextRange};
use crate::editor::error::EditorError;
use crate::editor::upload::validate_absolute_url;
use crate::models::{Block, BlockId, BlockKind, CalloutKind, ImageAttrs, Inline, Mark};

/// What a palette item does when invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSpec {
    SetParagraph,
    SetHeading(u8),
    BulletList,
    OrderedList,
    TaskList,
    ToggleBlockquote,
    CodeBlock,
    MathBlock,
    Callout(CalloutKind),
    Details,
    Table,
    HorizontalRule,
    ImagePlaceholder,
    /// Prompts for a URL, then inserts a resolved image block directly
    ImageByUrl,
    /// Prompts for a URL, then inserts a linked text run at the cursor
    InsertLink,
    /// Prompts for a URL, then inserts a video embed block
    VideoEmbed,
    /// Signals the surrounding UI to open the memo panel; no tree mutation
    InsertMemo,
}

impl CommandSpec {
    /// Whether this item blocks on a URL prompt before mutating
    pub fn needs_prompt(&self) -> bool {
        matches!(
            self,
            CommandSpec::ImageByUrl | CommandSpec::InsertLink | CommandSpec::VideoEmbed
        )
    }
}

/// One entry of the palette catalog
#[derive(Debug, Clone, Copy)]
pub struct CommandItem {
    pub title: &'static str,
    pub description: &'static str,
    pub search_terms: &'static [&'static str],
    pub icon: &'static str,
    pub spec: CommandSpec,
}

/// The palette catalog, in display order
pub const COMMAND_CATALOG: &[CommandItem] = &[
    CommandItem {
        title: "Text",
        description: "Plain paragraph",
        search_terms: &["paragraph", "plain", "p"],
        icon: "text",
        spec: CommandSpec::SetParagraph,
    },
    CommandItem {
        title: "Heading 1",
        description: "Large section heading",
        search_terms: &["h1", "title", "big"],
        icon: "heading-1",
        spec: CommandSpec::SetHeading(1),
    },
    CommandItem {
        title: "Heading 2",
        description: "Medium section heading",
        search_terms: &["h2", "subtitle"],
        icon: "heading-2",
        spec: CommandSpec::SetHeading(2),
    },
    CommandItem {
        title: "Heading 3",
        description: "Small section heading",
        search_terms: &["h3"],
        icon: "heading-3",
        spec: CommandSpec::SetHeading(3),
    },
    CommandItem {
        title: "Bullet List",
        description: "Unordered list",
        search_terms: &["ul", "list", "unordered"],
        icon: "list",
        spec: CommandSpec::BulletList,
    },
    CommandItem {
        title: "Numbered List",
        description: "Ordered list",
        search_terms: &["ol", "ordered", "numbers"],
        icon: "list-ordered",
        spec: CommandSpec::OrderedList,
    },
    CommandItem {
        title: "Task List",
        description: "Checklist with checkboxes",
        search_terms: &["todo", "task", "checkbox", "check"],
        icon: "list-todo",
        spec: CommandSpec::TaskList,
    },
    CommandItem {
        title: "Quote",
        description: "Blockquote",
        search_terms: &["blockquote", "quote", "cite"],
        icon: "quote",
        spec: CommandSpec::ToggleBlockquote,
    },
    CommandItem {
        title: "Code Block",
        description: "Fenced code with syntax highlighting",
        search_terms: &["code", "codeblock", "snippet"],
        icon: "code",
        spec: CommandSpec::CodeBlock,
    },
    CommandItem {
        title: "Math",
        description: "Display math block",
        search_terms: &["math", "latex", "katex", "equation"],
        icon: "sigma",
        spec: CommandSpec::MathBlock,
    },
    CommandItem {
        title: "Callout",
        description: "Highlighted note box",
        search_terms: &["callout", "note", "info", "banner"],
        icon: "megaphone",
        spec: CommandSpec::Callout(CalloutKind::Note),
    },
    CommandItem {
        title: "Toggle",
        description: "Collapsible details block",
        search_terms: &["details", "toggle", "collapse", "fold"],
        icon: "chevron-right",
        spec: CommandSpec::Details,
    },
    CommandItem {
        title: "Table",
        description: "Simple table",
        search_terms: &["table", "grid", "rows"],
        icon: "table",
        spec: CommandSpec::Table,
    },
    CommandItem {
        title: "Divider",
        description: "Horizontal rule",
        search_terms: &["hr", "divider", "rule", "separator", "line"],
        icon: "minus",
        spec: CommandSpec::HorizontalRule,
    },
    CommandItem {
        title: "Image",
        description: "Upload or link a picture",
        search_terms: &["image", "photo", "picture", "upload", "img"],
        icon: "image",
        spec: CommandSpec::ImagePlaceholder,
    },
    CommandItem {
        title: "Image by URL",
        description: "Embed a hosted picture without uploading",
        search_terms: &["image", "url", "hotlink"],
        icon: "image-plus",
        spec: CommandSpec::ImageByUrl,
    },
    CommandItem {
        title: "Link",
        description: "Insert a hyperlink",
        search_terms: &["link", "url", "href", "a"],
        icon: "link",
        spec: CommandSpec::InsertLink,
    },
    CommandItem {
        title: "Video",
        description: "Embed a video by URL",
        search_terms: &["video", "youtube", "embed"],
        icon: "video",
        spec: CommandSpec::VideoEmbed,
    },
    CommandItem {
        title: "Memo",
        description: "Insert a saved memo",
        search_terms: &["memo", "note", "clip"],
        icon: "sticky-note",
        spec: CommandSpec::InsertMemo,
    },
];

/// Filter the catalog by a free-text query: case-insensitive substring over
/// title and search terms, declaration order preserved.
pub fn match_commands(query: &str) -> Vec<&'static CommandItem> {
    let needle = query.trim().to_lowercase();
    COMMAND_CATALOG
        .iter()
        .filter(|item| {
            needle.is_empty()
                || item.title.to_lowercase().contains(&needle)
                || item
                    .search_terms
                    .iter()
                    .any(|term| term.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Where the palette was triggered: the block the caret is in, and the
/// trigger text range (`/query`) to delete before mutating
#[derive(Debug, Clone, Copy)]
pub struct CursorContext {
    pub block: BlockId,
    pub trigger: Option<TextRange>,
}

/// Result of invoking a palette item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The mutation was applied; the caret belongs in this block now
    Applied { focus: BlockId },
    /// Signal item: the UI should open the memo side panel
    OpenMemoPanel,
    /// A required prompt was cancelled; nothing was mutated
    Cancelled,
}

/// Invoke a palette item against the current cursor.
///
/// `prompt` carries the URL for prompt-flavored items (`None` = the user
/// cancelled the prompt). On any error the document is left unmodified
/// apart from an already-deleted trigger range.
pub fn execute(
    doc: &mut Document,
    ctx: &CursorContext,
    item: &CommandItem,
    prompt: Option<&str>,
) -> Result<CommandOutcome, EditorError> {
    // Resolve and validate the prompt before touching the document, so a
    // cancelled or malformed URL leaves everything in place
    let url = match (item.spec.needs_prompt(), prompt) {
        (true, None) => return Ok(CommandOutcome::Cancelled),
        (true, Some(url)) => {
            validate_absolute_url(url).map_err(EditorError::Upload)?;
            url
        }
        (false, _) => "",
    };
    if matches!(item.spec, CommandSpec::InsertMemo) {
        return Ok(CommandOutcome::OpenMemoPanel);
    }

    // Clear the trigger text first so the mutation lands on clean content
    if let Some(range) = &ctx.trigger {
        doc.delete_range(range)?;
    }
    tracing::debug!(command = item.title, block = %ctx.block, "executing palette command");

    let block = ctx.block;
    match item.spec {
        CommandSpec::SetParagraph => {
            doc.set_block_type(block, BlockType::Paragraph)?;
            Ok(CommandOutcome::Applied { focus: block })
        }
        CommandSpec::SetHeading(level) => {
            doc.set_block_type(block, BlockType::Heading(level))?;
            Ok(CommandOutcome::Applied { focus: block })
        }
        CommandSpec::CodeBlock => {
            if doc
                .find(block)
                .map(|b| b.kind.inline_content().is_some())
                .unwrap_or(false)
            {
                doc.set_block_type(
                    block,
                    BlockType::CodeBlock {
                        language: String::new(),
                    },
                )?;
                Ok(CommandOutcome::Applied { focus: block })
            } else {
                let new = Block::new(BlockKind::CodeBlock {
                    language: String::new(),
                    code: String::new(),
                });
                let focus = doc.insert_after(block, new)?;
                Ok(CommandOutcome::Applied { focus })
            }
        }
        CommandSpec::MathBlock => {
            let new = Block::new(BlockKind::MathBlock {
                expr: String::new(),
            });
            let focus = doc.insert_after(block, new)?;
            Ok(CommandOutcome::Applied { focus })
        }
        CommandSpec::BulletList | CommandSpec::OrderedList | CommandSpec::TaskList => {
            let original = doc
                .find(block)
                .ok_or(EditorError::BlockNotFound { id: block })?
                .clone();
            let item_block = match item.spec {
                CommandSpec::TaskList => Block::new(BlockKind::TaskItem {
                    checked: false,
                    content: vec![original],
                }),
                _ => Block::new(BlockKind::ListItem {
                    content: vec![original],
                }),
            };
            let list = match item.spec {
                CommandSpec::BulletList => Block::new(BlockKind::BulletList {
                    items: vec![item_block],
                }),
                CommandSpec::OrderedList => Block::new(BlockKind::OrderedList {
                    start: 1,
                    items: vec![item_block],
                }),
                _ => Block::new(BlockKind::TaskList {
                    items: vec![item_block],
                }),
            };
            doc.replace_block(block, list)?;
            Ok(CommandOutcome::Applied { focus: block })
        }
        CommandSpec::ToggleBlockquote => {
            doc.toggle_wrapper(block)?;
            Ok(CommandOutcome::Applied { focus: block })
        }
        CommandSpec::Callout(kind) => {
            let original = doc
                .find(block)
                .ok_or(EditorError::BlockNotFound { id: block })?
                .clone();
            let callout = Block::new(BlockKind::Callout {
                kind,
                content: vec![original],
            });
            doc.replace_block(block, callout)?;
            Ok(CommandOutcome::Applied { focus: block })
        }
        CommandSpec::Details => {
            let new = Block::new(BlockKind::Details {
                summary: vec![Inline::text("Toggle")],
                content: vec![Block::paragraph_of(Vec::new())],
            });
            let focus = doc.insert_after(block, new)?;
            Ok(CommandOutcome::Applied { focus })
        }
        CommandSpec::Table => {
            let new = Block::new(BlockKind::Table {
                header: vec![vec![Inline::text("")], vec![Inline::text("")]],
                rows: vec![vec![vec![Inline::text("")], vec![Inline::text("")]]],
            });
            let focus = doc.insert_after(block, new)?;
            Ok(CommandOutcome::Applied { focus })
        }
        CommandSpec::HorizontalRule => {
            let focus = doc.insert_after(block, Block::new(BlockKind::HorizontalRule))?;
            Ok(CommandOutcome::Applied { focus })
        }
        CommandSpec::ImagePlaceholder => {
            let focus = doc.insert_after(block, Block::image_placeholder())?;
            Ok(CommandOutcome::Applied { focus })
        }
        CommandSpec::ImageByUrl => {
            let new = Block::image(ImageAttrs::new(url));
            let focus = doc.insert_after(block, new)?;
            Ok(CommandOutcome::Applied { focus })
        }
        CommandSpec::InsertLink => {
            let offset = ctx.trigger.map(|r| r.start).unwrap_or(0);
            doc.insert_text(&Cursor { block, offset }, url)?;
            doc.toggle_mark(
                &TextRange::new(block, offset, offset + url.chars().count()),
                Mark::Link {
                    href: url.to_string(),
                    title: None,
                },
            )?;
            Ok(CommandOutcome::Applied { focus: block })
        }
        CommandSpec::VideoEmbed => {
            let new = Block::new(BlockKind::VideoEmbed {
                url: url.to_string(),
            });
            let focus = doc.insert_after(block, new)?;
            Ok(CommandOutcome::Applied { focus })
        }
        CommandSpec::InsertMemo => unreachable!("handled above"),
    }
}
