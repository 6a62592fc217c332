//! Inline elements for paragraph content

use serde::{Deserialize, Serialize};

/// Inline-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    /// Plain text content
    Text(String),
    /// Formatted content (bold, italic, underline)
    Format(FormatType, Box<Inline>),
    /// A span containing multiple inline elements
    Span(Vec<Inline>),
    /// A line break
    Break,
}

/// Text formatting types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatType {
    Bold,
    Italic,
    Underline,
}

impl Inline {
    /// Shorthand for a plain text run
    pub fn text(value: impl Into<String>) -> Self {
        Inline::Text(value.into())
    }

    /// Shorthand for a bold text run
    pub fn bold(value: impl Into<String>) -> Self {
        Inline::Format(FormatType::Bold, Box::new(Inline::Text(value.into())))
    }

    /// Flatten to plain text (formatting dropped, breaks become newlines)
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(text) => text.clone(),
            Inline::Format(_, inner) => inner.plain_text(),
            Inline::Span(inlines) => inlines.iter().map(Inline::plain_text).collect(),
            Inline::Break => "\n".to_string(),
        }
    }
}
