use crate::error::ListingError;
use crate::line::{CodeLine, CodePart};
use crate::syntax::console::lex_session;
use crate::syntax::{Grammar, LexerSpec, QueryLoader, Span, SyntaxHighlighter, TokenKind};
use log::{debug, warn};
use std::ops::Range;

/// A span a lexer produced that cannot be painted as given.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("span {start}..{end} is outside text of {len} bytes")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("span {start}..{end} is reversed")]
    Reversed { start: usize, end: usize },
    #[error("span {start}..{end} splits a character")]
    CharBoundary { start: usize, end: usize },
}

/// Per-byte token assignment. Later paints overwrite earlier ones.
struct Painter<'a> {
    text: &'a str,
    tokens: Vec<Option<TokenKind>>,
}

impl<'a> Painter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            tokens: vec![None; text.len()],
        }
    }

    /// Paint a span, recovering a malformed one as an error over the bytes
    /// it touches.
    fn paint(&mut self, span: &Span) -> Result<(), LexError> {
        let Range { start, end } = span.range.clone();
        let len = self.text.len();

        if start > end {
            self.fill(self.widen(end.min(len)..start.min(len)), TokenKind::Error);
            return Err(LexError::Reversed { start, end });
        }
        if end > len {
            self.fill(self.widen(start.min(len)..len), TokenKind::Error);
            return Err(LexError::OutOfBounds { start, end, len });
        }
        if !self.text.is_char_boundary(start) || !self.text.is_char_boundary(end) {
            self.fill(self.widen(start..end), TokenKind::Error);
            return Err(LexError::CharBoundary { start, end });
        }
        self.fill(start..end, span.token);
        Ok(())
    }

    /// Grow a byte range outwards to the nearest char boundaries.
    fn widen(&self, range: Range<usize>) -> Range<usize> {
        let mut start = range.start;
        let mut end = range.end;
        while start > 0 && !self.text.is_char_boundary(start) {
            start -= 1;
        }
        while end < self.text.len() && !self.text.is_char_boundary(end) {
            end += 1;
        }
        start..end
    }

    fn fill(&mut self, range: Range<usize>, token: TokenKind) {
        for slot in &mut self.tokens[range] {
            *slot = Some(token);
        }
    }

    /// Merge painted chars into parts, splitting lines on `\n`.
    fn finish(self) -> Vec<CodeLine> {
        let mut builder = LineBuilder::default();
        for (at, ch) in self.text.char_indices() {
            if ch == '\n' {
                builder.end_line(true);
                continue;
            }
            let token = self.tokens[at].unwrap_or(if ch.is_whitespace() {
                TokenKind::Whitespace
            } else {
                TokenKind::Text
            });
            builder.push(token, &self.text[at..at + ch.len_utf8()]);
        }
        builder.finish()
    }
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<CodeLine>,
    parts: Vec<CodePart>,
}

impl LineBuilder {
    fn push(&mut self, token: TokenKind, text: &str) {
        match self.parts.last_mut() {
            Some(last) if last.token == token => last.text.push_str(text),
            _ => self.parts.push(CodePart::new(token, text)),
        }
    }

    fn end_line(&mut self, has_newline: bool) {
        let parts = std::mem::take(&mut self.parts);
        self.lines.push(CodeLine::new(parts, has_newline));
    }

    fn finish(mut self) -> Vec<CodeLine> {
        if !self.parts.is_empty() {
            self.end_line(false);
        }
        self.lines
    }
}

/// Turns raw text into lines of classified parts for one [`LexerSpec`].
///
/// Tokenizing never fails: malformed spans become `Error` parts and a grammar
/// that cannot be loaded degrades to unclassified text.
#[derive(Debug)]
pub struct Tokenizer {
    spec: LexerSpec,
    query_loader: QueryLoader,
    highlighter: Option<SyntaxHighlighter>,
    unavailable: bool,
}

impl Tokenizer {
    pub fn new(spec: &LexerSpec) -> Result<Self, ListingError> {
        Self::with_loader(spec, QueryLoader::new())
    }

    /// Tokenizer whose queries come from `query_loader`, e.g. one pointing
    /// at a runtime directory.
    pub fn with_loader(spec: &LexerSpec, query_loader: QueryLoader) -> Result<Self, ListingError> {
        let mut tokenizer = Self {
            spec: spec.clone(),
            query_loader,
            highlighter: None,
            unavailable: false,
        };

        match spec.language_config() {
            Some(config) => {
                let highlighter = SyntaxHighlighter::with_loader(config, &tokenizer.query_loader)
                    .map_err(|e| ListingError::Grammar(e.to_string()))?;
                tokenizer.highlighter = Some(highlighter);
            }
            None if matches!(spec.grammar, Grammar::TreeSitter(_) | Grammar::Console(_)) => {
                warn!(
                    "Grammar for spec '{}' is not compiled in, using plain text",
                    spec.name
                );
                tokenizer.unavailable = true;
            }
            None => {}
        }
        Ok(tokenizer)
    }

    pub fn spec(&self) -> &LexerSpec {
        &self.spec
    }

    fn highlighter_mut(&mut self) -> Option<&mut SyntaxHighlighter> {
        if self.highlighter.is_none() && !self.unavailable {
            match self.spec.language_config() {
                Some(config) => match SyntaxHighlighter::with_loader(config, &self.query_loader) {
                    Ok(highlighter) => self.highlighter = Some(highlighter),
                    Err(e) => {
                        warn!("Failed to rebuild highlighter for '{}': {}", self.spec.name, e);
                        self.unavailable = true;
                    }
                },
                None => self.unavailable = true,
            }
        }
        self.highlighter.as_mut()
    }

    /// Classify `text` and split it into lines. Concatenating the parts of
    /// the result, with a `\n` after every line that has one, gives back
    /// `text` exactly.
    pub fn tokenize(&mut self, text: &str) -> Vec<CodeLine> {
        if text.is_empty() {
            return Vec::new();
        }

        let spans = match self.spec.grammar.clone() {
            Grammar::Plain => return plain_lines(text, TokenKind::GenericOutput),
            Grammar::TreeSitter(_) => match self.highlighter_mut() {
                Some(highlighter) => highlighter.highlight(text),
                None => Vec::new(),
            },
            Grammar::Console(dialect) => {
                let mut highlighter = self.highlighter_mut();
                lex_session(dialect, text, |code| match highlighter.as_mut() {
                    Some(highlighter) => highlighter.highlight(code),
                    None => Vec::new(),
                })
            }
            Grammar::Custom(lexer) => lexer.lex(text),
        };

        let mut painter = Painter::new(text);
        for span in &spans {
            if let Err(e) = painter.paint(span) {
                warn!("Lexer '{}' produced a bad span: {}", self.spec.name, e);
            }
        }
        debug!("Painted {} spans for spec '{}'", spans.len(), self.spec.name);
        painter.finish()
    }

    /// Tokenize text that is known to be a single line.
    pub fn tokenize_line(&mut self, text: &str) -> CodeLine {
        let mut lines = self.tokenize(text);
        match lines.len() {
            0 => CodeLine::empty(),
            1 => lines.remove(0),
            _ => {
                // merge back into one line so callers never lose text
                let parts = lines
                    .iter()
                    .enumerate()
                    .flat_map(|(i, line)| {
                        let newline = (i + 1 < lines.len() || line.has_newline)
                            .then(|| CodePart::new(TokenKind::Whitespace, "\n"));
                        line.parts().iter().cloned().chain(newline)
                    })
                    .collect();
                CodeLine::new(parts, false)
            }
        }
    }
}

impl Clone for Tokenizer {
    /// The clone rebuilds its highlighter on first use.
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            query_loader: self.query_loader.clone(),
            highlighter: None,
            unavailable: self.unavailable,
        }
    }
}

/// One part per line, all of the same token.
fn plain_lines(text: &str, token: TokenKind) -> Vec<CodeLine> {
    let mut builder = LineBuilder::default();
    for piece in text.split_inclusive('\n') {
        let (content, has_newline) = match piece.strip_suffix('\n') {
            Some(content) => (content, true),
            None => (piece, false),
        };
        if !content.is_empty() {
            builder.push(token, content);
        }
        builder.end_line(has_newline);
    }
    builder.finish()
}
