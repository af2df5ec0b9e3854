use crate::content::Code;
use crate::diff::{self, Change};
use crate::error::ListingError;
use crate::highlight::{ChainStep, HighlightChain, HighlightSpec};
use crate::line::{CodeLine, FoldState, lines_to_text};
use crate::syntax::{LexerSpec, TokenKind, Tokenizer};
use crate::typewriter::Step;
use log::debug;
use std::path::Path;

/// Text to add to a listing: raw text is tokenized with the listing's spec,
/// a [`Code`] with its own spec, and lines are used as given.
#[derive(Debug, Clone)]
pub enum Content {
    Text(String),
    Code(Code),
    Lines(Vec<CodeLine>),
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Code> for Content {
    fn from(code: Code) -> Self {
        Content::Code(code)
    }
}

impl From<&Code> for Content {
    fn from(code: &Code) -> Self {
        Content::Code(code.clone())
    }
}

impl From<Vec<CodeLine>> for Content {
    fn from(lines: Vec<CodeLine>) -> Self {
        Content::Lines(lines)
    }
}

impl From<CodeLine> for Content {
    fn from(line: CodeLine) -> Self {
        Content::Lines(vec![line])
    }
}

/// A collapsed run of lines, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldGroup {
    pub start: usize,
    pub end: usize,
    pub hidden: usize,
}

/// One row of the linear view of a listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewRow<'a> {
    Line { position: usize, line: &'a CodeLine },
    /// Marker standing in for a whole fold group; `line` is its first line.
    Fold {
        start: usize,
        end: usize,
        hidden: usize,
        line: &'a CodeLine,
    },
}

/// The lines shown in one code box, and every mutation applied to them.
///
/// Positions are 1-based. After each operation line numbers, newline flags
/// and fold groups are consistent again.
#[derive(Debug, Clone)]
pub struct Listing {
    lines: Vec<CodeLine>,
    tokenizer: Tokenizer,
    starting_line_number: Option<usize>,
}

impl Listing {
    /// An empty listing for `spec`.
    pub fn new(spec: &LexerSpec) -> Result<Self, ListingError> {
        Ok(Self::with_tokenizer(Tokenizer::new(spec)?))
    }

    pub fn with_tokenizer(tokenizer: Tokenizer) -> Self {
        Self {
            lines: Vec::new(),
            tokenizer,
            starting_line_number: None,
        }
    }

    pub fn from_text(text: &str, spec: &LexerSpec) -> Result<Self, ListingError> {
        let mut listing = Self::new(spec)?;
        listing.lines = listing.tokenizer.tokenize(text);
        listing.normalise();
        Ok(listing)
    }

    pub fn from_code(code: &Code) -> Result<Self, ListingError> {
        Self::from_text(code.source(), code.spec())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ListingError> {
        Self::from_code(&Code::from_file(path)?)
    }

    pub fn with_line_numbers(mut self, start: usize) -> Self {
        self.set_starting_line_number(Some(start));
        self
    }

    /// Turn numbering on from `start`, or off with `None`.
    pub fn set_starting_line_number(&mut self, start: Option<usize>) {
        self.starting_line_number = start;
        self.normalise();
    }

    pub fn starting_line_number(&self) -> Option<usize> {
        self.starting_line_number
    }

    pub fn spec(&self) -> &LexerSpec {
        self.tokenizer.spec()
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CodeLine] {
        &self.lines
    }

    pub fn line(&self, position: usize) -> Option<&CodeLine> {
        position.checked_sub(1).and_then(|index| self.lines.get(index))
    }

    /// Source text of the whole listing.
    pub fn text(&self) -> String {
        lines_to_text(&self.lines)
    }

    /// Digits needed for the largest line number, 0 without numbering.
    pub fn line_number_width(&self) -> usize {
        match self.starting_line_number {
            Some(start) => {
                let largest = start + self.lines.len().saturating_sub(1);
                largest.to_string().len()
            }
            None => 0,
        }
    }

    fn tokenize_content(&mut self, content: Content) -> Result<Vec<CodeLine>, ListingError> {
        match content {
            Content::Text(text) => Ok(self.tokenizer.tokenize(&text)),
            Content::Code(code) if code.spec().name == self.tokenizer.spec().name => {
                Ok(self.tokenizer.tokenize(code.source()))
            }
            Content::Code(code) => code.tokenize(),
            Content::Lines(lines) => Ok(lines),
        }
    }

    // ---- structure ----

    pub fn append(&mut self, content: impl Into<Content>) -> Result<usize, ListingError> {
        let position = self.lines.len() + 1;
        self.insert(position, content)
    }

    /// Insert before `position`; `len + 1` appends. Returns the number of
    /// lines added.
    pub fn insert(
        &mut self,
        position: usize,
        content: impl Into<Content>,
    ) -> Result<usize, ListingError> {
        self.check_insert_position(position)?;
        let lines = self.tokenize_content(content.into())?;
        self.insert_lines(position, lines)
    }

    pub fn insert_lines(
        &mut self,
        position: usize,
        mut lines: Vec<CodeLine>,
    ) -> Result<usize, ListingError> {
        self.check_insert_position(position)?;
        let index = position - 1;
        let count = lines.len();
        if count == 0 {
            return Ok(0);
        }

        // lines strictly inside a fold group join it
        let enclosing = self
            .fold_ranges()
            .into_iter()
            .find(|&(start, end)| start < index && index <= end);
        for line in &mut lines {
            line.folded = if enclosing.is_some() {
                FoldState::Member
            } else {
                FoldState::NotFolded
            };
        }
        if let Some((start, _)) = enclosing
            && let FoldState::Start { hidden } = &mut self.lines[start].folded
        {
            *hidden += count;
        }

        // the old last line now has a successor
        if index == self.lines.len()
            && let Some(last) = self.lines.last_mut()
        {
            last.has_newline = true;
        }
        self.lines.splice(index..index, lines);
        self.normalise();
        Ok(count)
    }

    fn check_insert_position(&self, position: usize) -> Result<(), ListingError> {
        if position == 0 || position > self.lines.len() + 1 {
            return Err(ListingError::range(position, 0, self.lines.len()));
        }
        Ok(())
    }

    fn check_range(&self, position: usize, count: usize) -> Result<usize, ListingError> {
        let len = self.lines.len();
        if position == 0 || position.checked_add(count).is_none_or(|end| end - 1 > len) {
            return Err(ListingError::range(position, count, len));
        }
        Ok(position - 1)
    }

    /// Remove `count` lines starting at `position`, returning them.
    pub fn remove(&mut self, position: usize, count: usize) -> Result<Vec<CodeLine>, ListingError> {
        let start = self.check_range(position, count)?;
        let end = start + count;

        for (fold_start, fold_end) in self.fold_ranges() {
            let start_removed = (start..end).contains(&fold_start);
            let end_removed = (start..end).contains(&fold_end);
            if start_removed || end_removed {
                self.dissolve(fold_start, fold_end);
            } else if fold_start < start && end <= fold_end {
                if let FoldState::Start { hidden } = &mut self.lines[fold_start].folded {
                    *hidden -= count;
                }
            }
        }

        let was_last = end == self.lines.len();
        let mut removed: Vec<CodeLine> = self.lines.drain(start..end).collect();
        for line in &mut removed {
            line.folded = FoldState::NotFolded;
            line.line_number = None;
        }
        // the new last line keeps the newline state of the old one
        if was_last
            && let (Some(last), Some(old_last)) = (self.lines.last_mut(), removed.last())
        {
            last.has_newline = old_last.has_newline;
        }
        self.normalise();
        Ok(removed)
    }

    /// Replace one line with the given content; the highlight is cleared.
    pub fn replace(&mut self, position: usize, content: impl Into<Content>) -> Result<usize, ListingError> {
        self.replace_inner(position, content.into(), false)
    }

    pub fn replace_keeping_highlight(
        &mut self,
        position: usize,
        content: impl Into<Content>,
    ) -> Result<usize, ListingError> {
        self.replace_inner(position, content.into(), true)
    }

    fn replace_inner(
        &mut self,
        position: usize,
        content: Content,
        keep_highlight: bool,
    ) -> Result<usize, ListingError> {
        self.check_range(position, 1)?;
        let mut lines = self.tokenize_content(content)?;
        let removed = self.remove(position, 1)?;
        let highlighted = keep_highlight && removed.iter().any(|line| line.highlighted);
        for line in &mut lines {
            line.highlighted = highlighted;
        }
        if let (Some(last), Some(old)) = (lines.last_mut(), removed.first()) {
            last.has_newline = old.has_newline;
        }
        self.insert_lines(position, lines)
    }

    /// Append raw text to one line; `-1` is the last line. Only that line is
    /// tokenized again, unless the text brings newlines with it.
    pub fn suffix(&mut self, position: isize, text: &str) -> Result<(), ListingError> {
        let index = self.resolve_position(position)?;
        if text.is_empty() {
            return Ok(());
        }

        if !text.contains('\n') && self.ends_inside_string(index) {
            debug!("Suffix on line {} extends an open string", index + 1);
            let mut line = self.lines[index].clone();
            line.extend_last_part(text);
            self.lines[index] = line;
            return Ok(());
        }

        let combined = format!("{}{}", self.lines[index].text(), text);
        if !text.contains('\n') {
            let line = self.tokenizer.tokenize_line(&combined);
            self.set_line(index, line);
            return Ok(());
        }

        // the line's own newline still follows the added text
        let segment = match self.lines[index].has_newline {
            true => format!("{}\n", combined),
            false => combined,
        };
        let mut lines = self.tokenizer.tokenize(&segment);
        if lines.is_empty() {
            lines.push(CodeLine::empty());
        }
        let first = lines.remove(0);
        let first_newline = first.has_newline;
        self.set_line(index, first);
        self.lines[index].has_newline = first_newline;
        if !lines.is_empty() {
            self.insert_lines(index + 2, lines)?;
        }
        Ok(())
    }

    /// Whether the line ends inside a string that carries on into the next
    /// line.
    fn ends_inside_string(&self, index: usize) -> bool {
        let is_string = |token: Option<TokenKind>| token.is_some_and(|t| t.is_a(TokenKind::String));
        is_string(self.lines[index].last_token())
            && is_string(self.lines.get(index + 1).and_then(CodeLine::first_token))
    }

    fn resolve_position(&self, position: isize) -> Result<usize, ListingError> {
        let len = self.lines.len();
        let index = match position {
            -1 => len.checked_sub(1),
            p if p >= 1 && (p as usize) <= len => Some(p as usize - 1),
            _ => None,
        };
        index.ok_or_else(|| ListingError::range(position, 1, len))
    }

    /// Swap the parts of a line, keeping its presentation state.
    fn set_line(&mut self, index: usize, line: CodeLine) {
        let has_newline = self.lines[index].has_newline;
        let mut line = line.with_state_of(&self.lines[index]);
        line.has_newline = has_newline;
        self.lines[index] = line;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    // ---- highlighting ----

    /// Set or clear the highlight on the referenced lines. Numbers past the
    /// end are ignored. Returns how many lines were touched.
    pub fn highlight(&mut self, spec: impl Into<HighlightSpec>, on: bool) -> usize {
        let spec = spec.into();
        let len = self.lines.len();
        if spec.exceeds(len) {
            debug!("Ignoring highlighted lines past {} in {:?}", len, spec.ranges());
        }
        let mut touched = 0;
        for number in spec.clipped(len) {
            self.lines[number - 1].highlighted = on;
            touched += 1;
        }
        touched
    }

    pub fn highlight_off_all(&mut self) {
        for line in &mut self.lines {
            line.highlighted = false;
        }
    }

    pub fn apply_highlight_step(&mut self, step: &ChainStep) -> usize {
        let mut touched = 0;
        if let Some(off) = &step.off {
            touched += self.highlight(off.clone(), false);
        }
        if let Some(on) = &step.on {
            touched += self.highlight(on.clone(), true);
        }
        touched
    }

    /// Run every group of a chain, leaving the last group highlighted.
    pub fn highlight_chain<I, S>(&mut self, specs: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<HighlightSpec>,
    {
        HighlightChain::new(specs)
            .without_finish()
            .map(|step| self.apply_highlight_step(&step))
            .sum()
    }

    // ---- folding ----

    /// Fold lines `start..=end`. An `end` of `-1` folds to the end of the
    /// run of non-blank lines that begins at `start`.
    pub fn fold(&mut self, start: usize, end: isize) -> Result<(), ListingError> {
        let len = self.lines.len();
        let first = self.check_range(start, 1)?;
        let last = match end {
            -1 => {
                let mut last = first;
                while last + 1 < len && !self.lines[last + 1].is_blank() {
                    last += 1;
                }
                last
            }
            e if e >= start as isize && (e as usize) <= len => e as usize - 1,
            _ => {
                return Err(ListingError::range(start, usize::try_from(end).unwrap_or(0), len));
            }
        };

        for (fold_start, fold_end) in self.fold_ranges() {
            if fold_start <= last && fold_end >= first {
                self.dissolve(fold_start, fold_end);
            }
        }

        self.lines[first].folded = FoldState::Start {
            hidden: last - first + 1,
        };
        for line in &mut self.lines[first + 1..=last] {
            line.folded = FoldState::Member;
        }
        if last > first {
            self.lines[last].folded = FoldState::End;
        }
        Ok(())
    }

    /// Dissolve the group starting at `position`. Returns whether there was
    /// one.
    pub fn unfold(&mut self, position: usize) -> Result<bool, ListingError> {
        let index = self.check_range(position, 1)?;
        match self.lines[index].folded {
            FoldState::Start { hidden } => {
                self.dissolve(index, index + hidden - 1);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn folds(&self) -> Vec<FoldGroup> {
        self.fold_ranges()
            .into_iter()
            .map(|(start, end)| FoldGroup {
                start: start + 1,
                end: end + 1,
                hidden: end - start + 1,
            })
            .collect()
    }

    /// 0-based inclusive ranges of every group.
    fn fold_ranges(&self) -> Vec<(usize, usize)> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| match line.folded {
                FoldState::Start { hidden } => Some((index, index + hidden - 1)),
                _ => None,
            })
            .collect()
    }

    fn dissolve(&mut self, start: usize, end: usize) {
        let end = end.min(self.lines.len().saturating_sub(1));
        for line in &mut self.lines[start..=end] {
            line.folded = FoldState::NotFolded;
        }
    }

    /// Visible rows: unfolded lines, and one marker per fold group.
    pub fn view(&self) -> Vec<ViewRow<'_>> {
        let mut rows = Vec::new();
        let mut index = 0;
        while index < self.lines.len() {
            let line = &self.lines[index];
            match line.folded {
                FoldState::Start { hidden } => {
                    rows.push(ViewRow::Fold {
                        start: index + 1,
                        end: index + hidden,
                        hidden,
                        line,
                    });
                    index += hidden;
                }
                _ => {
                    rows.push(ViewRow::Line {
                        position: index + 1,
                        line,
                    });
                    index += 1;
                }
            }
        }
        rows
    }

    // ---- transitions and steps ----

    /// Replace the whole content through the smallest set of line changes.
    /// Returns the changes applied.
    pub fn transition(&mut self, content: impl Into<Content>) -> Result<Vec<Change>, ListingError> {
        let target = self.tokenize_content(content.into())?;
        let changes = diff::changes(&self.lines, &target);
        debug!("Transition with {} changes", changes.len());
        for change in &changes {
            self.apply_change(change)?;
        }
        // trailing newline state follows the target
        if let (Some(last), Some(target_last)) = (self.lines.last_mut(), target.last()) {
            last.has_newline = target_last.has_newline;
        }
        Ok(changes)
    }

    pub fn apply_change(&mut self, change: &Change) -> Result<(), ListingError> {
        match change {
            Change::Remove { position, count } => {
                self.remove(*position, *count)?;
            }
            Change::Insert { position, lines } => {
                self.insert_lines(*position, lines.clone())?;
            }
            Change::Replace { position, line } => {
                self.replace(*position, line.clone())?;
            }
        }
        Ok(())
    }

    /// Apply one typewriter step. Pauses leave the listing alone.
    pub fn apply_step(&mut self, step: &Step) -> Result<(), ListingError> {
        match step {
            Step::Reveal {
                position,
                line,
                insert: true,
            } => {
                self.insert_lines(*position, vec![line.clone()])?;
            }
            Step::Reveal { position, line, .. } => {
                let index = self.check_range(*position, 1)?;
                let has_newline = self.lines[index].has_newline || line.has_newline;
                self.set_line(index, line.clone());
                self.lines[index].has_newline = has_newline;
            }
            Step::Pause(_) => {}
        }
        Ok(())
    }

    /// Restore numbering and newline flags after a structural change.
    fn normalise(&mut self) {
        let count = self.lines.len();
        for (index, line) in self.lines.iter_mut().enumerate() {
            line.line_number = self.starting_line_number.map(|start| start + index);
            if index + 1 < count {
                line.has_newline = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> Listing {
        Listing::from_text(text, &LexerSpec::plain()).unwrap()
    }

    fn texts(listing: &Listing) -> Vec<String> {
        listing.lines().iter().map(CodeLine::text).collect()
    }

    #[test]
    fn test_from_text() {
        let listing = plain("a\nb\nc\n");
        assert_eq!(listing.len(), 3);
        assert_eq!(listing.text(), "a\nb\nc\n");
        assert!(plain("").is_empty());
    }

    #[test]
    fn test_insert_and_numbers() {
        let mut listing = plain("1\n2\n3\n4\n5\n").with_line_numbers(1);
        assert_eq!(listing.insert(3, "x = 1").unwrap(), 1);
        assert_eq!(listing.len(), 6);
        assert_eq!(listing.line(3).unwrap().text(), "x = 1");
        assert_eq!(listing.line(4).unwrap().text(), "3");
        for (index, line) in listing.lines().iter().enumerate() {
            assert_eq!(line.line_number(), Some(index + 1));
        }
        assert!(listing.line(3).unwrap().has_newline());
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut listing = plain("a\n");
        assert!(matches!(listing.insert(0, "x"), Err(ListingError::Range { .. })));
        assert!(matches!(listing.insert(3, "x"), Err(ListingError::Range { .. })));
        assert_eq!(listing.insert(2, "x").unwrap(), 1);
    }

    #[test]
    fn test_append_to_unterminated() {
        let mut listing = plain("a");
        listing.append("b").unwrap();
        assert_eq!(listing.text(), "a\nb");
        let mut empty = Listing::new(&LexerSpec::plain()).unwrap();
        empty.append("x\ny\n").unwrap();
        assert_eq!(empty.text(), "x\ny\n");
    }

    #[test]
    fn test_remove() {
        let mut listing = plain("a\nb\nc").with_line_numbers(10);
        let removed = listing.remove(2, 1).unwrap();
        assert_eq!(removed[0].text(), "b");
        assert_eq!(texts(&listing), vec!["a", "c"]);
        assert_eq!(listing.line(2).unwrap().line_number(), Some(11));

        let removed = listing.remove(2, 1).unwrap();
        assert_eq!(removed[0].text(), "c");
        assert_eq!(listing.text(), "a");
        assert!(listing.remove(1, 2).is_err());
        assert!(listing.remove(0, 1).is_err());
    }

    #[test]
    fn test_extreme_positions_are_range_errors() {
        let mut listing = plain("a\nb\n");
        assert!(matches!(listing.remove(usize::MAX, 2), Err(ListingError::Range { .. })));
        assert!(matches!(listing.remove(2, usize::MAX), Err(ListingError::Range { .. })));
        assert!(matches!(listing.remove(9, 0), Err(ListingError::Range { .. })));
        assert!(listing.replace(usize::MAX, "x").is_err());
        assert!(listing.fold(usize::MAX, -1).is_err());
        assert!(listing.unfold(usize::MAX).is_err());
        assert_eq!(listing.text(), "a\nb\n");
    }

    #[test]
    fn test_replace() {
        let mut listing = plain("a\nb\nc\n");
        listing.highlight(2, true);
        listing.replace(2, "x\ny").unwrap();
        assert_eq!(texts(&listing), vec!["a", "x", "y", "c"]);
        assert!(!listing.line(2).unwrap().is_highlighted());

        listing.highlight(1, true);
        listing.replace_keeping_highlight(1, "z").unwrap();
        assert!(listing.line(1).unwrap().is_highlighted());
        assert!(listing.replace(9, "q").is_err());
    }

    #[test]
    fn test_suffix() {
        let mut listing = plain("a\nb\nc");
        let before = listing.lines().to_vec();
        listing.suffix(-1, " # done").unwrap();
        assert_eq!(listing.line(3).unwrap().text(), "c # done");
        assert!(listing.line(1).unwrap().same_parts(&before[0]));
        assert!(listing.line(2).unwrap().same_parts(&before[1]));

        listing.suffix(1, "!").unwrap();
        assert_eq!(listing.line(1).unwrap().text(), "a!");
        assert!(matches!(listing.suffix(-2, "x"), Err(ListingError::Range { .. })));
        assert!(matches!(listing.suffix(4, "x"), Err(ListingError::Range { .. })));
        assert!(Listing::new(&LexerSpec::plain()).unwrap().suffix(-1, "x").is_err());
    }

    #[test]
    fn test_suffix_with_newline_splices() {
        let mut listing = plain("a\nb");
        listing.suffix(1, "1\n2").unwrap();
        assert_eq!(texts(&listing), vec!["a1", "2", "b"]);
        assert_eq!(listing.text(), "a1\n2\nb");
    }

    #[test]
    fn test_suffix_with_trailing_newline() {
        let mut listing = plain("a");
        listing.suffix(1, "x\n").unwrap();
        assert_eq!(listing.text(), "ax\n");
        assert_eq!(listing.len(), 1);

        listing.suffix(-1, "y\nz\n").unwrap();
        assert_eq!(texts(&listing), vec!["axy", "z"]);
        assert_eq!(listing.text(), "axy\nz\n");

        let mut listing = plain("a\nb");
        listing.suffix(1, "\n").unwrap();
        assert_eq!(texts(&listing), vec!["a", "", "b"]);
        assert_eq!(listing.text(), "a\n\nb");
    }

    #[test]
    fn test_suffix_keeps_state() {
        let mut listing = plain("a\nb\nc\n");
        listing.highlight(2, true);
        listing.fold(1, 3).unwrap();
        listing.suffix(2, "x").unwrap();
        assert!(listing.line(2).unwrap().is_highlighted());
        assert_eq!(listing.line(2).unwrap().fold_state(), FoldState::Member);
    }

    #[test]
    fn test_highlight() {
        let mut listing = plain("1\n2\n3\n4\n5\n6\n");
        assert_eq!(listing.highlight("2,4-5", true), 3);
        let on: Vec<bool> = listing.lines().iter().map(CodeLine::is_highlighted).collect();
        assert_eq!(on, vec![false, true, false, true, true, false]);
        assert_eq!(listing.highlight("2,4-5,99", false), 3);
        assert!(listing.lines().iter().all(|line| !line.is_highlighted()));
    }

    #[test]
    fn test_highlight_huge_range_is_clipped() {
        let mut listing = plain("a\nb\nc\n");
        assert_eq!(listing.highlight("2-18446744073709551615", true), 2);
        assert_eq!(listing.highlight("1-4000000000", false), 3);
        assert_eq!(listing.highlight("7-9", true), 0);
        assert!(listing.lines().iter().all(|line| !line.is_highlighted()));
    }

    #[test]
    fn test_highlight_chain() {
        let mut listing = plain("1\n2\n3\n");
        listing.highlight_chain(["1", "2-3"]);
        let on: Vec<bool> = listing.lines().iter().map(CodeLine::is_highlighted).collect();
        assert_eq!(on, vec![false, true, true]);
        listing.highlight_off_all();
        assert!(listing.lines().iter().all(|line| !line.is_highlighted()));
    }

    #[test]
    fn test_fold_view() {
        let mut listing = plain("a\nb\nc\nd\n");
        listing.fold(2, 3).unwrap();
        assert_eq!(listing.len(), 4);
        let view = listing.view();
        assert_eq!(view.len(), 3);
        assert!(matches!(view[0], ViewRow::Line { position: 1, .. }));
        assert!(matches!(
            view[1],
            ViewRow::Fold { start: 2, end: 3, hidden: 2, .. }
        ));
        assert!(matches!(view[2], ViewRow::Line { position: 4, line } if line.text() == "d"));
    }

    #[test]
    fn test_fold_to_end_of_block() {
        let mut listing = plain("a\nb\nc\n\nd\n");
        listing.fold(1, -1).unwrap();
        assert_eq!(listing.folds(), vec![FoldGroup { start: 1, end: 3, hidden: 3 }]);
        assert!(listing.fold(3, 2).is_err());
        assert!(listing.fold(0, 2).is_err());
        assert!(listing.fold(1, 9).is_err());
        assert!(listing.fold(1, -2).is_err());
    }

    #[test]
    fn test_fold_is_idempotent() {
        let mut listing = plain("a\nb\nc\nd\n");
        listing.fold(2, 3).unwrap();
        let once = listing.lines().to_vec();
        listing.fold(2, 3).unwrap();
        assert_eq!(listing.lines(), &once[..]);
    }

    #[test]
    fn test_fold_replaces_intersecting() {
        let mut listing = plain("a\nb\nc\nd\ne\n");
        listing.fold(1, 2).unwrap();
        listing.fold(4, 5).unwrap();
        listing.fold(2, 4).unwrap();
        assert_eq!(listing.folds(), vec![FoldGroup { start: 2, end: 4, hidden: 3 }]);
        assert_eq!(listing.line(1).unwrap().fold_state(), FoldState::NotFolded);
        assert_eq!(listing.line(5).unwrap().fold_state(), FoldState::NotFolded);
    }

    #[test]
    fn test_unfold() {
        let mut listing = plain("a\nb\nc\n");
        listing.fold(1, 2).unwrap();
        assert!(!listing.unfold(2).unwrap());
        assert!(listing.unfold(1).unwrap());
        assert!(listing.folds().is_empty());
        assert!(listing.unfold(4).is_err());
    }

    #[test]
    fn test_remove_fold_lines() {
        let mut listing = plain("a\nb\nc\nd\ne\n");
        listing.fold(1, 4).unwrap();
        listing.remove(2, 2).unwrap();
        assert_eq!(listing.folds(), vec![FoldGroup { start: 1, end: 2, hidden: 2 }]);

        listing.remove(1, 1).unwrap();
        assert!(listing.folds().is_empty());
        assert!(listing.lines().iter().all(|line| !line.fold_state().is_folded()));
    }

    #[test]
    fn test_insert_inside_fold() {
        let mut listing = plain("a\nb\nc\nd\n");
        listing.fold(1, 3).unwrap();
        listing.insert(3, "x").unwrap();
        assert_eq!(listing.folds(), vec![FoldGroup { start: 1, end: 4, hidden: 4 }]);
        // before the start or after the end stays outside
        listing.insert(1, "y").unwrap();
        listing.insert(7, "z").unwrap();
        assert_eq!(listing.folds(), vec![FoldGroup { start: 2, end: 5, hidden: 4 }]);
    }

    #[test]
    fn test_line_number_width() {
        let mut listing = plain("a\nb\n");
        assert_eq!(listing.line_number_width(), 0);
        listing.set_starting_line_number(Some(9));
        assert_eq!(listing.line_number_width(), 2);
        listing.set_starting_line_number(None);
        assert!(listing.lines().iter().all(|line| line.line_number().is_none()));
    }

    #[test]
    fn test_transition() {
        let mut listing = plain("a\nb\nc\n");
        let before = listing.lines().to_vec();
        let changes = listing.transition("a\nx\nc\nd\n").unwrap();
        assert_eq!(listing.text(), "a\nx\nc\nd\n");
        assert!(!changes.is_empty());
        assert!(listing.line(1).unwrap().same_parts(&before[0]));
        assert!(listing.line(3).unwrap().same_parts(&before[2]));
    }

    #[test]
    fn test_clear() {
        let mut listing = plain("a\nb\n");
        listing.clear();
        assert!(listing.is_empty());
    }
}
