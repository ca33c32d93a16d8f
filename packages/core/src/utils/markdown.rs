//! Markdown stripping utilities for title extraction and keyword scoring
//!
//! This module provides functions to strip markdown formatting from content,
//! producing clean plain text suitable for category scoring and display.

use regex::Regex;
use std::sync::LazyLock;

/// Compiled regex patterns for markdown stripping
///
/// The order of these patterns matters:
/// 1. Fenced blocks first (their bodies would confuse inline patterns)
/// 2. Images (to not conflict with links or italic)
/// 3. Links (before italic since links use brackets)
/// 4. Bold (before italic since ** conflicts with *)
/// 5. Other inline styles
/// 6. Line-start patterns (headers, lists, etc.)
static MARKDOWN_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // Drop non-text fence bodies entirely: video embeds
        (
            Regex::new(r"(?s)```+video\n.*?\n?```+").unwrap(),
            "",
        ),
        // Unwrap callout/details fences, keeping their text bodies
        (
            Regex::new(r"```+(?:callout[^\n]*|details)\n").unwrap(),
            "",
        ),
        // Remove remaining fence lines (code fences, math fences)
        (Regex::new(r"^`{3,}[^\n]*$").unwrap(), ""),
        // Remove display math: $$expr$$ -> expr
        (Regex::new(r"\$\$([^$]+)\$\$").unwrap(), "$1"),
        // Remove images FIRST: ![alt](url) -> alt
        (Regex::new(r"!\[([^\]]*)\]\([^)]+\)").unwrap(), "$1"),
        // Remove markdown links, keeping link text: [text](url) -> text
        (Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap(), "$1"),
        // Remove inline code: `code` -> code
        (Regex::new(r"`([^`]+)`").unwrap(), "$1"),
        // Remove bold: **text** or __text__ -> text (process before italic)
        (Regex::new(r"\*\*([^*]+)\*\*").unwrap(), "$1"),
        (Regex::new(r"__([^_]+)__").unwrap(), "$1"),
        // Remove strikethrough: ~~text~~ -> text
        (Regex::new(r"~~([^~]+)~~").unwrap(), "$1"),
        // Remove italic: *text* or _text_ -> text
        // Process after bold to avoid conflicts
        (Regex::new(r"\*([^*]+)\*").unwrap(), "$1"),
        (Regex::new(r"_([^_]+)_").unwrap(), "$1"),
        // Remove headers: # Header -> Header (up to 6 levels)
        (Regex::new(r"^#{1,6}\s+").unwrap(), ""),
        // Remove blockquote markers: > quote -> quote
        (Regex::new(r"^>\s*").unwrap(), ""),
        // Remove ordered list markers: 1. item -> item
        (Regex::new(r"^\d+\.\s+").unwrap(), ""),
        // Remove task checkboxes: - [x] item -> item
        (Regex::new(r"^[-*+]\s+\[[ xX]\]\s+").unwrap(), ""),
        // Remove unordered list markers: - item or * item -> item
        (Regex::new(r"^[-*+]\s+").unwrap(), ""),
        // Remove horizontal rules and details separators
        (Regex::new(r"^[-*_]{3,}$").unwrap(), ""),
        // Remove table separator rows
        (Regex::new(r"^\|[\s\-:|]+\|$").unwrap(), ""),
        // Remove table pipes, keeping cell text
        (Regex::new(r"\s*\|\s*").unwrap(), " "),
        // Remove HTML tags
        (Regex::new(r"<[^>]+>").unwrap(), ""),
        // Remove escape backslashes: \* -> *
        (Regex::new(r"\\([\\*_~`\[\]#|$>])").unwrap(), "$1"),
    ]
});

/// Compiled regex for whitespace normalization
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip markdown formatting from content to produce plain text
///
/// This function removes common markdown syntax, including the extended
/// fence forms the serializer emits, to produce clean text suitable for
/// category keyword scoring and title derivation.
///
/// # Examples
///
/// ```
/// use penmark_core::utils::strip_markdown;
///
/// assert_eq!(strip_markdown("# Hello World"), "Hello World");
/// assert_eq!(strip_markdown("**bold** text"), "bold text");
/// assert_eq!(strip_markdown("[link](http://example.com)"), "link");
/// ```
pub fn strip_markdown(content: &str) -> String {
    let mut result = content.to_string();

    // Apply each pattern
    for (pattern, replacement) in MARKDOWN_PATTERNS.iter() {
        // For line-start patterns, process line by line
        if replacement.is_empty() && pattern.as_str().starts_with('^') {
            result = result
                .lines()
                .map(|line| pattern.replace_all(line, *replacement).to_string())
                .collect::<Vec<_>>()
                .join("\n");
        } else {
            result = pattern.replace_all(&result, *replacement).to_string();
        }
    }

    // Clean up multiple whitespace and trim
    result = WHITESPACE_RE.replace_all(&result, " ").to_string();
    result.trim().to_string()
}

/// Derive a display title from the first content line: the first heading if
/// one leads the document, otherwise the first non-empty line, stripped
pub fn derive_title(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(strip_markdown)
        .unwrap_or_default()
}
