//! Typing animation as a sequence of listing updates.
//!
//! A [`TypewriterScript`] describes text to be typed into a listing. Its
//! [`steps`](TypewriterScript::steps) reveal that text one grapheme cluster
//! at a time, each step carrying the fully tokenized line as it looks at
//! that moment. Steps are produced lazily and the sequence can be restarted.

use crate::error::ListingError;
use crate::line::CodeLine;
use crate::listing::Listing;
use crate::syntax::console::line_roles;
use crate::syntax::{Grammar, TokenKind, Tokenizer};
use std::collections::VecDeque;
use std::ops::Range;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

/// One update for the animation driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Set line `position` to `line`, inserting it first when `insert` is
    /// set.
    Reveal {
        position: usize,
        line: CodeLine,
        insert: bool,
    },
    /// Wait before the next step. Producing a pause never sleeps.
    Pause(Duration),
}

/// Where typed text lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// New lines after the last line.
    Append,
    /// New lines before the 1-based position.
    Insert(usize),
    /// The end of an existing line (`-1` for the last), new lines after it.
    Suffix(isize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypewriterOptions {
    /// Show whitespace runs in one step.
    pub skip_whitespace: bool,
    /// Show comments in one step.
    pub skip_comments: bool,
}

#[derive(Debug, Clone)]
pub struct TypewriterScript {
    tokenizer: Tokenizer,
    content: String,
    base: String,
    base_newline: bool,
    first_position: usize,
    suffix: bool,
    options: TypewriterOptions,
    pauses: Vec<(usize, Duration)>,
}

impl TypewriterScript {
    /// Script typing `content` into `listing` at `target`. The listing is
    /// only read; apply the steps to change it.
    pub fn new(listing: &Listing, content: &str, target: Target) -> Result<Self, ListingError> {
        let len = listing.len();
        let (first_position, suffix) = match target {
            Target::Append => (len + 1, false),
            Target::Insert(position) if (1..=len + 1).contains(&position) => (position, false),
            Target::Insert(position) => return Err(ListingError::range(position, 0, len)),
            Target::Suffix(-1) if len > 0 => (len, true),
            Target::Suffix(position) if position >= 1 && position as usize <= len => {
                (position as usize, true)
            }
            Target::Suffix(position) => return Err(ListingError::range(position, 1, len)),
        };
        let (base, base_newline) = match listing.line(first_position) {
            Some(line) if suffix => (line.text(), line.has_newline()),
            _ => (String::new(), false),
        };

        Ok(Self {
            tokenizer: listing.tokenizer().clone(),
            content: content.to_string(),
            base,
            base_newline,
            first_position,
            suffix,
            options: TypewriterOptions::default(),
            pauses: Vec::new(),
        })
    }

    pub fn with_options(mut self, options: TypewriterOptions) -> Self {
        self.options = options;
        self
    }

    /// Pause for `duration` once the grapheme at `index` of the content has
    /// been revealed.
    pub fn pause_after(mut self, index: usize, duration: Duration) -> Self {
        self.pauses.push((index, duration));
        self
    }

    pub fn with_pauses(mut self, pauses: impl IntoIterator<Item = (usize, Duration)>) -> Self {
        self.pauses.extend(pauses);
        self
    }

    /// A fresh pass over the steps.
    pub fn steps(&self) -> Steps {
        let plan = build_plan(self);

        Steps {
            tokenizer: self.tokenizer.clone(),
            text: format!("{}{}", self.base, self.content),
            base_len: self.base.len(),
            plan: plan.into(),
        }
    }
}

#[derive(Debug, Clone)]
enum Planned {
    Reveal {
        position: usize,
        line_index: usize,
        /// Byte offset into the content typed once this step shows.
        end: usize,
        insert: bool,
        has_newline: Option<bool>,
    },
    Pause(Duration),
}

fn build_plan(script: &TypewriterScript) -> Vec<Planned> {
    let content = &script.content;
    let mut lines: Vec<&str> = content.split('\n').collect();
    // a trailing newline typed onto a line that already has one opens a
    // blank line before the old newline
    let opens_line = script.suffix && script.base_newline;
    if content.is_empty() || (content.ends_with('\n') && !opens_line) {
        lines.pop();
    }
    let full = format!("{}{}", script.base, content);
    let roles = match &script.tokenizer.spec().grammar {
        Grammar::Console(dialect) => Some(line_roles(*dialect, &full)),
        _ => None,
    };
    let atomic_tokens = script.options.skip_comments || script.options.skip_whitespace;
    let final_lines = if atomic_tokens {
        script.tokenizer.clone().tokenize(&full)
    } else {
        Vec::new()
    };

    let mut pauses: VecDeque<(usize, Duration)> = {
        let mut pauses = script.pauses.clone();
        pauses.sort_by_key(|(index, _)| *index);
        pauses.into()
    };
    let mut flush = |plan: &mut Vec<Planned>, consumed: usize| {
        while let Some(&(index, duration)) = pauses.front() {
            if index >= consumed {
                break;
            }
            plan.push(Planned::Pause(duration));
            pauses.pop_front();
        }
    };

    let mut plan = Vec::new();
    let mut line_start = 0;
    let mut graphemes_before = 0;
    for (index, line) in lines.iter().enumerate() {
        let inserts = !(script.suffix && index == 0);
        let position = script.first_position + index;
        let offset = if index == 0 { script.base.len() } else { 0 };
        let newline_follows = index + 1 < lines.len() || content.ends_with('\n');
        // a suffixed line keeps its own newline unless the content adds one,
        // and the last typed line inherits it
        let has_newline = match inserts {
            true => Some(newline_follows || opens_line),
            false => newline_follows.then_some(true),
        };

        let ends: Vec<usize> = line.grapheme_indices(true).map(|(at, g)| at + g.len()).collect();
        let mut atomic = Vec::new();
        if let Some(role) = roles.as_ref().and_then(|roles| roles.get(index)) {
            match role.prompt_len() {
                Some(prompt) => atomic.push(0..prompt.saturating_sub(offset)),
                None => atomic.push(0..line.len()),
            }
        }
        if let Some(final_line) = final_lines.get(index) {
            atomic.extend(script.atomic_parts(final_line, offset));
        }
        let units = merge_units(&ends, &atomic);

        if units.is_empty() && (inserts || has_newline.is_some()) {
            // blank line, or a bare newline after the suffixed line, in one step
            plan.push(Planned::Reveal {
                position,
                line_index: index,
                end: line_start,
                insert: inserts,
                has_newline,
            });
        }
        for (n, end) in units.iter().enumerate() {
            plan.push(Planned::Reveal {
                position,
                line_index: index,
                end: line_start + end,
                insert: inserts && n == 0,
                has_newline,
            });
            let revealed = ends.iter().take_while(|e| *e <= end).count();
            flush(&mut plan, graphemes_before + revealed);
        }

        graphemes_before += ends.len() + 1;
        line_start += line.len() + 1;
        flush(&mut plan, graphemes_before);
    }

    // markers past the end
    while let Some((_, duration)) = pauses.pop_front() {
        plan.push(Planned::Pause(duration));
    }
    plan
}

impl TypewriterScript {
    /// Byte ranges of a final line, relative to the typed part of it, that
    /// show in one step.
    fn atomic_parts(&self, line: &CodeLine, offset: usize) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut at = 0;
        for part in line.parts() {
            let range = at..at + part.text.len();
            at = range.end;
            let whole = (self.options.skip_comments && part.token.is_a(TokenKind::Comment))
                || (self.options.skip_whitespace
                    && (part.token.is_a(TokenKind::Whitespace) || part.text.trim().is_empty()));
            if whole && range.end > offset {
                ranges.push(range.start.saturating_sub(offset)..range.end - offset);
            }
        }
        ranges
    }
}

/// Unit end offsets: grapheme ends, minus those falling strictly inside an
/// atomic range.
fn merge_units(ends: &[usize], atomic: &[Range<usize>]) -> Vec<usize> {
    ends.iter()
        .copied()
        .filter(|end| !atomic.iter().any(|range| range.start < *end && *end < range.end))
        .collect()
}

/// Iterator over the steps of a [`TypewriterScript`].
#[derive(Debug)]
pub struct Steps {
    tokenizer: Tokenizer,
    text: String,
    base_len: usize,
    plan: VecDeque<Planned>,
}

impl Iterator for Steps {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let planned = self.plan.pop_front()?;
        Some(match planned {
            Planned::Pause(duration) => Step::Pause(duration),
            Planned::Reveal {
                position,
                line_index,
                end,
                insert,
                has_newline,
            } => {
                let typed = &self.text[..self.base_len + end];
                let mut line = self
                    .tokenizer
                    .tokenize(typed)
                    .into_iter()
                    .nth(line_index)
                    .unwrap_or_default();
                if let Some(has_newline) = has_newline {
                    line.has_newline = has_newline;
                }
                Step::Reveal {
                    position,
                    line,
                    insert,
                }
            }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.plan.len(), Some(self.plan.len()))
    }
}

impl ExactSizeIterator for Steps {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::LexerSpec;

    fn reveals(steps: &[Step]) -> Vec<(usize, String, bool)> {
        steps
            .iter()
            .filter_map(|step| match step {
                Step::Reveal {
                    position,
                    line,
                    insert,
                } => Some((*position, line.text(), *insert)),
                Step::Pause(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_two_characters() {
        let listing = Listing::new(&LexerSpec::plain()).unwrap();
        let script = TypewriterScript::new(&listing, "ab", Target::Append).unwrap();
        let steps: Vec<Step> = script.steps().collect();
        assert_eq!(
            reveals(&steps),
            vec![(1, "a".to_string(), true), (1, "ab".to_string(), false)]
        );
    }

    #[test]
    fn test_suffix_empty_line() {
        let listing = Listing::from_text("\n", &LexerSpec::plain()).unwrap();
        let script = TypewriterScript::new(&listing, "ab", Target::Suffix(-1)).unwrap();
        let steps: Vec<Step> = script.steps().collect();
        assert_eq!(
            reveals(&steps),
            vec![(1, "a".to_string(), false), (1, "ab".to_string(), false)]
        );
    }

    #[test]
    fn test_restartable() {
        let listing = Listing::new(&LexerSpec::plain()).unwrap();
        let script = TypewriterScript::new(&listing, "xyz", Target::Append).unwrap();
        assert_eq!(script.steps().count(), 3);
        assert_eq!(script.steps().collect::<Vec<_>>(), script.steps().collect::<Vec<_>>());
    }

    #[test]
    fn test_graphemes_are_not_split() {
        let listing = Listing::new(&LexerSpec::plain()).unwrap();
        let script = TypewriterScript::new(&listing, "e\u{301}🇫🇷", Target::Append).unwrap();
        let steps: Vec<Step> = script.steps().collect();
        assert_eq!(
            reveals(&steps).into_iter().map(|(_, text, _)| text).collect::<Vec<_>>(),
            vec!["e\u{301}".to_string(), "e\u{301}🇫🇷".to_string()]
        );
    }

    #[test]
    fn test_blank_lines_and_positions() {
        let listing = Listing::from_text("top\n", &LexerSpec::plain()).unwrap();
        let script = TypewriterScript::new(&listing, "a\n\nb\n", Target::Append).unwrap();
        let steps: Vec<Step> = script.steps().collect();
        assert_eq!(
            reveals(&steps),
            vec![
                (2, "a".to_string(), true),
                (3, "".to_string(), true),
                (4, "b".to_string(), true),
            ]
        );
        assert!(steps.iter().all(|step| matches!(step, Step::Reveal { line, .. } if line.has_newline())));
    }

    #[test]
    fn test_pauses() {
        let listing = Listing::new(&LexerSpec::plain()).unwrap();
        let short = Duration::from_millis(10);
        let long = Duration::from_millis(500);
        let script = TypewriterScript::new(&listing, "abc", Target::Append)
            .unwrap()
            .pause_after(9, long)
            .pause_after(1, short);
        let steps: Vec<Step> = script.steps().collect();
        assert_eq!(steps.len(), 5);
        assert!(matches!(steps[1], Step::Reveal { .. }));
        assert_eq!(steps[2], Step::Pause(short));
        assert_eq!(steps[4], Step::Pause(long));
    }

    #[test]
    fn test_bad_targets() {
        let listing = Listing::from_text("a\n", &LexerSpec::plain()).unwrap();
        assert!(TypewriterScript::new(&listing, "x", Target::Insert(3)).is_err());
        assert!(TypewriterScript::new(&listing, "x", Target::Suffix(2)).is_err());
        assert!(TypewriterScript::new(&listing, "x", Target::Suffix(-3)).is_err());
        let empty = Listing::new(&LexerSpec::plain()).unwrap();
        assert!(TypewriterScript::new(&empty, "x", Target::Suffix(-1)).is_err());
    }

    #[test]
    fn test_applying_steps() {
        let mut listing = Listing::from_text("first\nlast", &LexerSpec::plain()).unwrap();
        let script = TypewriterScript::new(&listing, "mid\n", Target::Insert(2)).unwrap();
        for step in script.steps() {
            listing.apply_step(&step).unwrap();
        }
        assert_eq!(listing.text(), "first\nmid\nlast");
    }

    #[test]
    fn test_suffix_with_trailing_newline() {
        let mut listing = Listing::from_text("a", &LexerSpec::plain()).unwrap();
        let script = TypewriterScript::new(&listing, "x\n", Target::Suffix(-1)).unwrap();
        for step in script.steps() {
            listing.apply_step(&step).unwrap();
        }
        assert_eq!(listing.text(), "ax\n");

        let mut listing = Listing::from_text("a\nb", &LexerSpec::plain()).unwrap();
        let script = TypewriterScript::new(&listing, "\n", Target::Suffix(1)).unwrap();
        let steps: Vec<Step> = script.steps().collect();
        assert_eq!(reveals(&steps), vec![(1, "a".to_string(), false), (2, "".to_string(), true)]);
        for step in &steps {
            listing.apply_step(step).unwrap();
        }
        assert_eq!(listing.text(), "a\n\nb");
    }

    #[test]
    fn test_merge_units() {
        assert_eq!(merge_units(&[1, 2, 3, 4], &[0..3]), vec![3, 4]);
        assert_eq!(merge_units(&[1, 2, 3, 4], &[]), vec![1, 2, 3, 4]);
        assert_eq!(merge_units(&[1, 2, 3, 4], &[1..3, 3..4]), vec![1, 3, 4]);
    }

    #[cfg(feature = "python")]
    #[test]
    fn test_console_prompts_and_output_whole() {
        let spec = LexerSpec::from_name("con").unwrap();
        let listing = Listing::new(&spec).unwrap();
        let script = TypewriterScript::new(&listing, ">>> 1\n1\n", Target::Append).unwrap();
        let texts: Vec<String> = reveals(&script.steps().collect::<Vec<_>>())
            .into_iter()
            .map(|(_, text, _)| text)
            .collect();
        assert_eq!(texts, vec![">>> ", ">>> 1", "1"]);
    }

    #[cfg(feature = "python")]
    #[test]
    fn test_skip_comments() {
        let spec = LexerSpec::from_name("py3").unwrap();
        let listing = Listing::new(&spec).unwrap();
        let options = TypewriterOptions {
            skip_comments: true,
            skip_whitespace: true,
        };
        let script = TypewriterScript::new(&listing, "x  # note\n", Target::Append)
            .unwrap()
            .with_options(options);
        let texts: Vec<String> = reveals(&script.steps().collect::<Vec<_>>())
            .into_iter()
            .map(|(_, text, _)| text)
            .collect();
        assert_eq!(texts, vec!["x", "x  ", "x  # note"]);
    }
}
