// src/syntax/token.rs - Token classification hierarchy

use std::fmt;

/// Classification tag for a span of source text.
///
/// Tags form a tree rooted at [`TokenKind::Token`]. The tree is fixed: every
/// tag knows its parent through [`TokenKind::parent`], so ancestor walks are a
/// handful of table lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Token,

    Text,
    Whitespace,
    Error,

    Keyword,
    KeywordConstant,
    KeywordType,
    KeywordNamespace,

    Name,
    NameAttribute,
    NameBuiltin,
    NameBuiltinPseudo,
    NameClass,
    NameConstant,
    NameDecorator,
    NameException,
    NameFunction,
    NameLabel,
    NameNamespace,
    NameTag,
    NameVariable,

    Literal,
    String,
    StringDoc,
    StringEscape,
    StringInterpol,
    StringRegex,
    Number,

    Operator,
    Punctuation,
    Comment,

    Generic,
    GenericPrompt,
    GenericOutput,
    GenericTraceback,
    GenericError,
}

use TokenKind::*;

const ALL: &[TokenKind] = &[
    Token,
    Text,
    Whitespace,
    Error,
    Keyword,
    KeywordConstant,
    KeywordType,
    KeywordNamespace,
    Name,
    NameAttribute,
    NameBuiltin,
    NameBuiltinPseudo,
    NameClass,
    NameConstant,
    NameDecorator,
    NameException,
    NameFunction,
    NameLabel,
    NameNamespace,
    NameTag,
    NameVariable,
    Literal,
    String,
    StringDoc,
    StringEscape,
    StringInterpol,
    StringRegex,
    Number,
    Operator,
    Punctuation,
    Comment,
    Generic,
    GenericPrompt,
    GenericOutput,
    GenericTraceback,
    GenericError,
];

/// Highlight query capture names and the tag each one maps to. Capture names
/// missing here fall back to their dotted parent (`keyword.control` ->
/// `keyword`) before giving up.
const CAPTURES: &[(&str, TokenKind)] = &[
    ("attribute", NameDecorator),
    ("comment", Comment),
    ("constant", NameConstant),
    ("constant.builtin", KeywordConstant),
    ("constructor", NameClass),
    ("embedded", StringInterpol),
    ("escape", StringEscape),
    ("function", NameFunction),
    ("function.builtin", NameBuiltin),
    ("function.macro", NameFunction),
    ("function.method", NameFunction),
    ("keyword", Keyword),
    ("label", NameLabel),
    ("module", NameNamespace),
    ("namespace", NameNamespace),
    ("number", Number),
    ("operator", Operator),
    ("property", NameAttribute),
    ("punctuation", Punctuation),
    ("string", String),
    ("string.doc", StringDoc),
    ("string.escape", StringEscape),
    ("string.regex", StringRegex),
    ("string.special", StringRegex),
    ("tag", NameTag),
    ("type", NameClass),
    ("type.builtin", KeywordType),
    ("variable", Name),
    ("variable.builtin", NameBuiltinPseudo),
    ("variable.parameter", NameVariable),
];

impl TokenKind {
    /// Direct parent in the hierarchy, `None` only for the root.
    pub const fn parent(self) -> Option<TokenKind> {
        match self {
            Token => None,
            Text | Error | Keyword | Name | Literal | Operator | Punctuation | Comment
            | Generic => Some(Token),
            Whitespace => Some(Text),
            KeywordConstant | KeywordType | KeywordNamespace => Some(Keyword),
            NameAttribute | NameBuiltin | NameClass | NameConstant | NameDecorator
            | NameException | NameFunction | NameLabel | NameNamespace | NameTag
            | NameVariable => Some(Name),
            NameBuiltinPseudo => Some(NameBuiltin),
            String | Number => Some(Literal),
            StringDoc | StringEscape | StringInterpol | StringRegex => Some(String),
            GenericPrompt | GenericOutput | GenericTraceback | GenericError => Some(Generic),
        }
    }

    /// The tag itself followed by each ancestor, most specific first.
    pub fn lineage(self) -> impl Iterator<Item = TokenKind> {
        std::iter::successors(Some(self), |kind| kind.parent())
    }

    /// Ancestors of the tag, most general first. The tag itself is excluded.
    pub fn ancestors(self) -> Vec<TokenKind> {
        let mut chain: Vec<TokenKind> = self.lineage().skip(1).collect();
        chain.reverse();
        chain
    }

    /// True when `self` is `other` or descends from it.
    pub fn is_a(self, other: TokenKind) -> bool {
        self.lineage().any(|kind| kind == other)
    }

    /// Dotted name, e.g. `Name.Builtin.Pseudo`.
    pub const fn name(self) -> &'static str {
        match self {
            Token => "Token",
            Text => "Text",
            Whitespace => "Text.Whitespace",
            Error => "Error",
            Keyword => "Keyword",
            KeywordConstant => "Keyword.Constant",
            KeywordType => "Keyword.Type",
            KeywordNamespace => "Keyword.Namespace",
            Name => "Name",
            NameAttribute => "Name.Attribute",
            NameBuiltin => "Name.Builtin",
            NameBuiltinPseudo => "Name.Builtin.Pseudo",
            NameClass => "Name.Class",
            NameConstant => "Name.Constant",
            NameDecorator => "Name.Decorator",
            NameException => "Name.Exception",
            NameFunction => "Name.Function",
            NameLabel => "Name.Label",
            NameNamespace => "Name.Namespace",
            NameTag => "Name.Tag",
            NameVariable => "Name.Variable",
            Literal => "Literal",
            String => "Literal.String",
            StringDoc => "Literal.String.Doc",
            StringEscape => "Literal.String.Escape",
            StringInterpol => "Literal.String.Interpol",
            StringRegex => "Literal.String.Regex",
            Number => "Literal.Number",
            Operator => "Operator",
            Punctuation => "Punctuation",
            Comment => "Comment",
            Generic => "Generic",
            GenericPrompt => "Generic.Prompt",
            GenericOutput => "Generic.Output",
            GenericTraceback => "Generic.Traceback",
            GenericError => "Generic.Error",
        }
    }

    /// Parse a dotted name. The `Literal.` prefix of string and number tags
    /// is optional, so `String.Doc` and `Literal.String.Doc` both resolve.
    pub fn from_name(name: &str) -> Option<TokenKind> {
        let name = name.trim();
        ALL.iter().copied().find(|kind| {
            let full = kind.name();
            full == name || full.strip_prefix("Literal.") == Some(name)
        })
    }

    /// Every tag, root first.
    pub fn all() -> &'static [TokenKind] {
        ALL
    }

    /// Map a tree-sitter highlight capture name onto a tag.
    pub fn from_capture(capture: &str) -> TokenKind {
        let mut name = capture;
        loop {
            if let Some((_, kind)) = CAPTURES.iter().find(|(key, _)| *key == name) {
                return *kind;
            }
            match name.rsplit_once('.') {
                Some((parent, _)) => name = parent,
                None => return Text,
            }
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Translate `token` into the most specific member of `known`.
///
/// Walks from the token up through its ancestors and returns the first tag
/// found in `known`. Falls back to [`TokenKind::Token`] when nothing matches,
/// so callers always get something they can style.
pub fn resolve(token: TokenKind, known: &[TokenKind]) -> TokenKind {
    resolve_with(token, |kind| known.contains(&kind))
}

/// [`resolve`] against an arbitrary membership test, e.g. a map's keys.
pub fn resolve_with<F>(token: TokenKind, mut is_known: F) -> TokenKind
where
    F: FnMut(TokenKind) -> bool,
{
    token.lineage().find(|kind| is_known(*kind)).unwrap_or(Token)
}
