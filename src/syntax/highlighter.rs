use crate::syntax::{LanguageConfig, QueryLoader, Span, TokenKind};
use log::{debug, trace, warn};
use std::fmt;
use tree_sitter::{Node, Parser, Query, QueryCursor, Tree};

/// Parses source text with a tree-sitter grammar and classifies it through
/// the language's highlight query.
pub struct SyntaxHighlighter {
    parser: Parser,
    tree: Option<Tree>,
    language_config: LanguageConfig,
    query: Option<Query>,
}

impl fmt::Debug for SyntaxHighlighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxHighlighter")
            .field("language", &self.language_config.id)
            .field("has_query", &self.query.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
struct Capture {
    start: usize,
    end: usize,
    pattern_index: usize,
    token: TokenKind,
}

impl SyntaxHighlighter {
    pub fn new(language_config: LanguageConfig) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_loader(language_config, &QueryLoader::new())
    }

    pub fn with_loader(
        language_config: LanguageConfig,
        query_loader: &QueryLoader,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut parser = Parser::new();
        let language = (language_config.tree_sitter_language)();
        parser.set_language(language)?;

        // a broken query degrades to unclassified text rather than failing
        let query = match query_loader.load_query(
            language,
            language_config.id.name(),
            language_config.highlight_query_path.as_deref(),
            language_config.highlight_query_fallback,
        ) {
            Ok(query) => {
                debug!("Query loaded for {}", language_config.id.name());
                Some(query)
            }
            Err(e) => {
                warn!(
                    "Failed to load highlight query for {}: {}",
                    language_config.id.name(),
                    e
                );
                None
            }
        };

        Ok(Self {
            parser,
            tree: None,
            language_config,
            query,
        })
    }

    pub fn language_config(&self) -> &LanguageConfig {
        &self.language_config
    }

    pub fn has_query(&self) -> bool {
        self.query.is_some()
    }

    pub fn get_tree(&self) -> &Option<Tree> {
        &self.tree
    }

    /// Parse `text` and return its spans in paint order.
    ///
    /// Error regions come first, then captures ordered outermost first so
    /// that painting them in sequence lets the innermost capture win. For
    /// captures over the same range the earliest query pattern is painted
    /// last.
    pub fn highlight(&mut self, text: &str) -> Vec<Span> {
        self.tree = self.parser.parse(text, None);
        let Some(tree) = &self.tree else {
            debug!("Parser produced no tree");
            return Vec::new();
        };

        let mut spans = Vec::new();
        collect_errors(tree.root_node(), text, &mut spans);

        if let Some(query) = &self.query {
            let mut captures = Self::apply_query(text, tree, query);
            captures.sort_by(|a, b| {
                a.start
                    .cmp(&b.start)
                    .then((b.end - b.start).cmp(&(a.end - a.start)))
                    .then(b.pattern_index.cmp(&a.pattern_index))
            });
            spans.extend(
                captures
                    .into_iter()
                    .map(|capture| Span::new(capture.start..capture.end, capture.token)),
            );
        }

        spans
    }

    fn apply_query(text: &str, tree: &Tree, query: &Query) -> Vec<Capture> {
        let mut cursor = QueryCursor::new();
        let mut found = Vec::new();

        for (mat, index) in cursor.captures(query, tree.root_node(), text.as_bytes()) {
            let capture = &mat.captures[index];
            let capture_name = &query.capture_names()[capture.index as usize];
            if capture_name.starts_with('_')
                || capture_name.starts_with("local")
                || capture_name.starts_with("injection")
            {
                continue;
            }
            let token = TokenKind::from_capture(capture_name);
            if token == TokenKind::Text {
                trace!("Ignoring unmapped capture @{}", capture_name);
                continue;
            }
            let (start, end) = (capture.node.start_byte(), capture.node.end_byte());
            if start >= end {
                continue;
            }
            found.push(Capture {
                start,
                end,
                pattern_index: mat.pattern_index,
                token,
            });
        }

        trace!("Found {} captures", found.len());
        found
    }
}

/// Error nodes become error spans, minus their whitespace.
fn collect_errors(node: Node, text: &str, spans: &mut Vec<Span>) {
    if !node.has_error() {
        return;
    }
    if node.is_error() {
        push_non_whitespace(text, node.start_byte(), node.end_byte(), spans);
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(child, text, spans);
    }
}

fn push_non_whitespace(text: &str, start: usize, end: usize, spans: &mut Vec<Span>) {
    let Some(region) = text.get(start..end) else {
        return;
    };
    let mut run_start = None;
    for (offset, ch) in region.char_indices() {
        let at = start + offset;
        match (ch.is_whitespace(), run_start) {
            (false, None) => run_start = Some(at),
            (true, Some(begin)) => {
                spans.push(Span::new(begin..at, TokenKind::Error));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = run_start {
        spans.push(Span::new(begin..end, TokenKind::Error));
    }
}
