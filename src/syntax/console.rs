// Interactive session transcripts: prompts, statements and their output

use crate::syntax::{LanguageId, Span, TokenKind};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static PYTHON_PROMPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>>>(?: |$)").unwrap());
static ELLIPSIS_PROMPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\.\.\.(?: |$)").unwrap());
static BASH_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\(\S+\)\s*)?[$#%](?:\s|$)").unwrap());
static DOLLAR_PROMPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^$\n]*\$(?:\s|$)").unwrap());
static BASH_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>(?: |$)").unwrap());
static NODE_PROMPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>(?: |$)").unwrap());

const TRACEBACK_HEADER: &str = "Traceback (most recent call last):";

/// Flavour of interactive transcript a console spec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionDialect {
    /// `>>> ` and `... ` prompts, with tracebacks.
    Python,
    /// `$ `, `# ` or `% ` prompts, optionally behind a `(venv)` marker.
    Bash,
    /// Anything up to and including the first `$`, e.g. `user@host:~$ `.
    DollarBash,
    /// `> ` and `... ` prompts.
    Node,
}

impl SessionDialect {
    /// Grammar used for the statements typed at the prompt.
    pub fn language(self) -> LanguageId {
        match self {
            SessionDialect::Python => LanguageId::Python,
            SessionDialect::Bash | SessionDialect::DollarBash => LanguageId::Bash,
            SessionDialect::Node => LanguageId::JavaScript,
        }
    }

    fn prompt(self) -> &'static Regex {
        match self {
            SessionDialect::Python => &PYTHON_PROMPT,
            SessionDialect::Bash => &BASH_PROMPT,
            SessionDialect::DollarBash => &DOLLAR_PROMPT,
            SessionDialect::Node => &NODE_PROMPT,
        }
    }

    fn continuation(self) -> &'static Regex {
        match self {
            SessionDialect::Python | SessionDialect::Node => &ELLIPSIS_PROMPT,
            SessionDialect::Bash | SessionDialect::DollarBash => &BASH_CONTINUATION,
        }
    }

    /// Shell continuations only follow a line ending in a backslash.
    fn continues(self, code: &str) -> bool {
        match self {
            SessionDialect::Python | SessionDialect::Node => true,
            SessionDialect::Bash | SessionDialect::DollarBash => code.trim_end().ends_with('\\'),
        }
    }

    /// Length of the prompt at the start of `line`, if it is a prompt line.
    pub fn prompt_len(self, line: &str) -> Option<usize> {
        self.prompt().find(line).map(|m| m.end())
    }

    fn continuation_len(self, line: &str) -> Option<usize> {
        self.continuation().find(line).map(|m| m.end())
    }
}

/// Kind of a single transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// Starts a statement; the prompt occupies the first `prompt` bytes.
    Prompt { prompt: usize },
    /// Continues the statement on the line above.
    Continuation { prompt: usize },
    Output,
    Traceback,
    Exception,
}

impl LineRole {
    pub fn prompt_len(self) -> Option<usize> {
        match self {
            LineRole::Prompt { prompt } | LineRole::Continuation { prompt } => Some(prompt),
            _ => None,
        }
    }
}

/// Classify every line of a transcript. Lines are split on `\n`, matching
/// `str::split`.
pub fn line_roles(dialect: SessionDialect, text: &str) -> Vec<LineRole> {
    let mut roles = Vec::new();
    let mut open_statement: Option<&str> = None;
    let mut in_traceback = false;

    for line in text.split('\n') {
        if let Some(code) = open_statement
            && dialect.continues(code)
            && let Some(prompt) = dialect.continuation_len(line)
        {
            roles.push(LineRole::Continuation { prompt });
            open_statement = Some(&line[prompt..]);
            continue;
        }
        open_statement = None;

        if let Some(prompt) = dialect.prompt_len(line) {
            in_traceback = false;
            roles.push(LineRole::Prompt { prompt });
            open_statement = Some(&line[prompt..]);
        } else if dialect == SessionDialect::Python && in_traceback {
            if line.starts_with(char::is_whitespace) {
                roles.push(LineRole::Traceback);
            } else {
                roles.push(LineRole::Exception);
                in_traceback = false;
            }
        } else if dialect == SessionDialect::Python && line.starts_with(TRACEBACK_HEADER) {
            in_traceback = true;
            roles.push(LineRole::Traceback);
        } else {
            roles.push(LineRole::Output);
        }
    }
    roles
}

/// A statement's code gathered from its prompt lines, with the position of
/// each piece in the original transcript.
#[derive(Debug, Default)]
struct Statement {
    code: String,
    segments: Vec<(Range<usize>, usize)>, // range in `code` -> offset in transcript
}

impl Statement {
    fn push(&mut self, piece: &str, offset: usize) {
        if !self.segments.is_empty() {
            self.code.push('\n');
        }
        let start = self.code.len();
        self.code.push_str(piece);
        self.segments.push((start..self.code.len(), offset));
    }

    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Translate spans over `code` back onto the transcript. Spans crossing
    /// a joining newline are split per segment.
    fn map_spans(&self, spans: Vec<Span>, out: &mut Vec<Span>) {
        for span in spans {
            for (range, offset) in &self.segments {
                let start = span.range.start.max(range.start);
                let end = span.range.end.min(range.end);
                if start < end {
                    out.push(Span::new(
                        offset + start - range.start..offset + end - range.start,
                        span.token,
                    ));
                }
            }
        }
    }
}

/// Lex a transcript into spans in paint order. `lex_code` classifies the
/// code of each statement, continuation lines included.
pub fn lex_session<F>(dialect: SessionDialect, text: &str, mut lex_code: F) -> Vec<Span>
where
    F: FnMut(&str) -> Vec<Span>,
{
    let mut spans = Vec::new();
    let mut statement = Statement::default();
    let mut flush = |statement: &mut Statement, spans: &mut Vec<Span>| {
        if !statement.is_empty() {
            let code_spans = lex_code(&statement.code);
            statement.map_spans(code_spans, spans);
            *statement = Statement::default();
        }
    };

    let mut offset = 0;
    for (line, role) in text.split('\n').zip(line_roles(dialect, text)) {
        let line_range = offset..offset + line.len();
        match role {
            LineRole::Prompt { prompt } | LineRole::Continuation { prompt } => {
                if matches!(role, LineRole::Prompt { .. }) {
                    flush(&mut statement, &mut spans);
                }
                if prompt > 0 {
                    spans.push(Span::new(offset..offset + prompt, TokenKind::GenericPrompt));
                }
                statement.push(&line[prompt..], offset + prompt);
            }
            other => {
                flush(&mut statement, &mut spans);
                let token = match other {
                    LineRole::Traceback => TokenKind::GenericTraceback,
                    LineRole::Exception => TokenKind::GenericError,
                    _ => TokenKind::GenericOutput,
                };
                if !line_range.is_empty() {
                    spans.push(Span::new(line_range, token));
                }
            }
        }
        offset += line.len() + 1;
    }
    flush(&mut statement, &mut spans);
    spans
}
