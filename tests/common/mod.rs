// Common test utilities for listing tests

use codereel::listing::ViewRow;
use codereel::{LexerSpec, Listing};

/// Build listings from raw text
pub mod build {
    use super::*;

    /// Plain-text listing, numbered from 1
    #[allow(dead_code)]
    pub fn plain_listing(text: &str) -> Listing {
        Listing::from_text(text, &LexerSpec::plain())
            .unwrap()
            .with_line_numbers(1)
    }

    /// Listing of `count` lines named "line 1", "line 2", ...
    #[allow(dead_code)]
    pub fn numbered_listing(count: usize) -> Listing {
        let text: Vec<String> = (1..=count).map(|n| format!("line {}", n)).collect();
        plain_listing(&text.join("\n"))
    }

    #[allow(dead_code)]
    pub fn spec(name: &str) -> LexerSpec {
        LexerSpec::from_name(name).unwrap()
    }
}

/// Inspect listing state
pub mod inspect {
    use super::*;

    #[allow(dead_code)]
    pub fn texts(listing: &Listing) -> Vec<String> {
        listing.lines().iter().map(|line| line.text()).collect()
    }

    #[allow(dead_code)]
    pub fn highlighted(listing: &Listing) -> Vec<usize> {
        listing
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_highlighted())
            .map(|(index, _)| index + 1)
            .collect()
    }

    /// One string per view row; fold markers read `[start-end: hidden]`
    #[allow(dead_code)]
    pub fn view_texts(listing: &Listing) -> Vec<String> {
        listing
            .view()
            .into_iter()
            .map(|row| match row {
                ViewRow::Line { line, .. } => line.text(),
                ViewRow::Fold {
                    start, end, hidden, ..
                } => format!("[{}-{}: {}]", start, end, hidden),
            })
            .collect()
    }

    /// Line numbers run from the starting number without gaps, and every
    /// line but the last ends with a newline
    #[allow(dead_code)]
    pub fn assert_consistent(listing: &Listing) {
        let start = listing.starting_line_number();
        let len = listing.len();
        for (index, line) in listing.lines().iter().enumerate() {
            assert_eq!(line.line_number(), start.map(|s| s + index));
            if index + 1 < len {
                assert!(line.has_newline(), "line {} lost its newline", index + 1);
            }
        }
    }
}
