use crate::syntax::TokenKind;
use std::fmt;
use std::sync::Arc;

/// A run of text sharing one token classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodePart {
    pub token: TokenKind,
    pub text: String,
}

impl CodePart {
    pub fn new(token: TokenKind, text: impl Into<String>) -> Self {
        Self {
            token,
            text: text.into(),
        }
    }
}

/// Position of a line within a fold group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FoldState {
    #[default]
    NotFolded,
    /// First line of a group of `hidden` lines, itself included.
    Start { hidden: usize },
    Member,
    /// Last line of a group of two or more lines.
    End,
}

impl FoldState {
    pub fn is_folded(self) -> bool {
        self != FoldState::NotFolded
    }
}

/// One displayed line: its parts plus presentation state.
///
/// Parts live behind an `Arc` so lines the listing does not touch keep the
/// same storage across mutations of their neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    pub(crate) parts: Arc<[CodePart]>,
    pub(crate) has_newline: bool,
    pub(crate) line_number: Option<usize>,
    pub(crate) highlighted: bool,
    pub(crate) folded: FoldState,
}

impl CodeLine {
    pub fn new(parts: Vec<CodePart>, has_newline: bool) -> Self {
        Self {
            parts: parts.into(),
            has_newline,
            line_number: None,
            highlighted: false,
            folded: FoldState::NotFolded,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), false)
    }

    pub fn parts(&self) -> &[CodePart] {
        &self.parts
    }

    pub fn has_newline(&self) -> bool {
        self.has_newline
    }

    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn fold_state(&self) -> FoldState {
        self.folded
    }

    /// Raw text of the line, without its newline.
    pub fn text(&self) -> String {
        self.parts.iter().map(|part| part.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.parts.iter().all(|part| part.text.trim().is_empty())
    }

    /// Number of chars in the line
    pub fn len_chars(&self) -> usize {
        self.parts.iter().map(|part| part.text.chars().count()).sum()
    }

    /// Same text and tokens, ignoring presentation state.
    pub fn same_content(&self, other: &CodeLine) -> bool {
        self.parts == other.parts
    }

    /// Whether both lines share one part allocation.
    pub fn same_parts(&self, other: &CodeLine) -> bool {
        Arc::ptr_eq(&self.parts, &other.parts)
    }

    pub fn last_token(&self) -> Option<TokenKind> {
        self.parts.last().map(|part| part.token)
    }

    pub fn first_token(&self) -> Option<TokenKind> {
        self.parts.first().map(|part| part.token)
    }

    /// Copy of this line with the presentation state of `other`.
    pub(crate) fn with_state_of(mut self, other: &CodeLine) -> Self {
        self.highlighted = other.highlighted;
        self.folded = other.folded;
        self.line_number = other.line_number;
        self
    }

    /// Append text to the last part without reclassifying it.
    pub(crate) fn extend_last_part(&mut self, text: &str) {
        let mut parts = self.parts.to_vec();
        match parts.last_mut() {
            Some(last) => last.text.push_str(text),
            None => parts.push(CodePart::new(TokenKind::Text, text)),
        }
        self.parts = parts.into();
    }
}

impl Default for CodeLine {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for CodeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in self.parts.iter() {
            f.write_str(&part.text)?;
        }
        Ok(())
    }
}

/// Rebuild the source text of a sequence of lines.
pub fn lines_to_text(lines: &[CodeLine]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(&line.text());
        if line.has_newline {
            text.push('\n');
        }
    }
    text
}
