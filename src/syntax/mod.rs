pub mod cache;
pub mod config;
pub mod console;
pub mod highlighter;
pub mod language;
pub mod query_loader;
pub mod theme;
pub mod token;
pub mod tokenizer;

use std::fmt;
use std::ops::Range;

pub use config::{LanguagesConfig, load_languages_config};
pub use console::SessionDialect;
pub use highlighter::SyntaxHighlighter;
pub use language::{Grammar, LexerRegistry, LexerSpec, ThemeFamily, get_language_config};
pub use query_loader::QueryLoader;
pub use theme::{Color, Style, Theme};
pub use token::{TokenKind, resolve, resolve_with};
pub use tokenizer::{LexError, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Bash,
}

impl LanguageId {
    pub fn name(self) -> &'static str {
        match self {
            LanguageId::Rust => "rust",
            LanguageId::Python => "python",
            LanguageId::JavaScript => "javascript",
            LanguageId::TypeScript => "typescript",
            LanguageId::Bash => "bash",
        }
    }
}

#[derive(Debug)]
pub struct LanguageConfig {
    pub id: LanguageId,
    pub tree_sitter_language: fn() -> tree_sitter::Language,
    /// Query override, relative to the runtime directory
    pub highlight_query_path: Option<String>,
    /// Embedded query, concatenated in order when the override is missing
    pub highlight_query_fallback: &'static [&'static str],
}

/// A classified byte range of some source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub range: Range<usize>,
    pub token: TokenKind,
}

impl Span {
    pub fn new(range: Range<usize>, token: TokenKind) -> Self {
        Self { range, token }
    }
}

/// Caller supplied grammar.
///
/// Implementors return spans in any order; gaps are filled with text and
/// malformed spans are recovered as errors by the tokenizer, so a lexer never
/// has to be perfect.
pub trait CustomLexer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn lex(&self, text: &str) -> Vec<Span>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_id_variants() {
        assert_eq!(LanguageId::Rust, LanguageId::Rust);
        assert_ne!(LanguageId::Python, LanguageId::JavaScript);
        assert_eq!(LanguageId::Bash.name(), "bash");
    }
}
