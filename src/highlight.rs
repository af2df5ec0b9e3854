// Line selections for highlighting, and chains of them

use log::debug;
use std::ops::RangeInclusive;

/// A set of 1-based line numbers, kept as sorted, disjoint inclusive
/// ranges.
///
/// Parsed from strings like `"5,6,10-20"`. Items that are not a number or an
/// inclusive `start-end` range, zero, and reversed ranges are skipped rather
/// than reported. Ranges stay unexpanded until a listing clips them to its
/// length, so `"1-99999999999"` costs no more than `"1-2"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightSpec {
    ranges: Vec<RangeInclusive<usize>>,
}

impl HighlightSpec {
    pub fn parse(text: &str) -> Self {
        let mut ranges = Vec::new();
        for item in text.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            match parse_item(item) {
                Some(range) => ranges.push(range),
                None => debug!("Ignoring highlight item '{}'", item),
            }
        }
        Self::from_ranges(ranges)
    }

    pub fn from_lines(lines: impl IntoIterator<Item = usize>) -> Self {
        Self::from_ranges(lines.into_iter().map(|line| line..=line))
    }

    /// Sort and merge ranges; empty ones and any touching line zero are
    /// dropped.
    pub fn from_ranges(ranges: impl IntoIterator<Item = RangeInclusive<usize>>) -> Self {
        let mut sorted: Vec<RangeInclusive<usize>> = ranges
            .into_iter()
            .filter(|range| *range.start() > 0 && !range.is_empty())
            .collect();
        sorted.sort_unstable_by_key(|range| (*range.start(), *range.end()));

        let mut ranges: Vec<RangeInclusive<usize>> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match ranges.last_mut() {
                Some(last) if *range.start() <= last.end().saturating_add(1) => {
                    let end = (*last.end()).max(*range.end());
                    *last = *last.start()..=end;
                }
                _ => ranges.push(range),
            }
        }
        Self { ranges }
    }

    pub fn ranges(&self) -> &[RangeInclusive<usize>] {
        &self.ranges
    }

    /// Every line number, ascending. Unbounded for huge ranges; see
    /// [`HighlightSpec::clipped`].
    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.ranges.iter().flat_map(Clone::clone)
    }

    /// Line numbers that exist in a listing of `len` lines.
    pub fn clipped(&self, len: usize) -> impl Iterator<Item = usize> + '_ {
        self.ranges
            .iter()
            .take_while(move |range| *range.start() <= len)
            .flat_map(move |range| *range.start()..=(*range.end()).min(len))
    }

    /// Whether any line lies past `len`.
    pub fn exceeds(&self, len: usize) -> bool {
        self.ranges.last().is_some_and(|range| *range.end() > len)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, line: usize) -> bool {
        self.ranges
            .binary_search_by(|range| {
                if *range.end() < line {
                    std::cmp::Ordering::Less
                } else if *range.start() > line {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }
}

fn parse_item(item: &str) -> Option<RangeInclusive<usize>> {
    match item.split_once('-') {
        Some((start, end)) => {
            let start: usize = start.trim().parse().ok()?;
            let end: usize = end.trim().parse().ok()?;
            (start > 0 && start <= end).then_some(start..=end)
        }
        None => {
            let line: usize = item.parse().ok()?;
            (line > 0).then_some(line..=line)
        }
    }
}

impl From<&str> for HighlightSpec {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for HighlightSpec {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<usize> for HighlightSpec {
    fn from(line: usize) -> Self {
        Self::from_lines([line])
    }
}

impl From<Vec<usize>> for HighlightSpec {
    fn from(lines: Vec<usize>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<&[usize]> for HighlightSpec {
    fn from(lines: &[usize]) -> Self {
        Self::from_lines(lines.iter().copied())
    }
}

impl From<RangeInclusive<usize>> for HighlightSpec {
    fn from(range: RangeInclusive<usize>) -> Self {
        Self::from_ranges([range])
    }
}

/// One step of a highlight chain: lines to turn off, then lines to turn on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    pub off: Option<HighlightSpec>,
    pub on: Option<HighlightSpec>,
}

/// Highlights groups of lines one after another, each step turning off the
/// previous group.
///
/// Yields one step per group followed by a finishing step that turns the
/// last group off, unless built with [`HighlightChain::without_finish`].
#[derive(Debug, Clone)]
pub struct HighlightChain {
    specs: Vec<HighlightSpec>,
    next: usize,
    finish: bool,
}

impl HighlightChain {
    pub fn new<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<HighlightSpec>,
    {
        Self {
            specs: specs.into_iter().map(Into::into).collect(),
            next: 0,
            finish: true,
        }
    }

    pub fn without_finish(mut self) -> Self {
        self.finish = false;
        self
    }

    pub fn specs(&self) -> &[HighlightSpec] {
        &self.specs
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.step_count()
    }

    fn step_count(&self) -> usize {
        match self.specs.len() {
            0 => 0,
            n if self.finish => n + 1,
            n => n,
        }
    }
}

impl Iterator for HighlightChain {
    type Item = ChainStep;

    fn next(&mut self) -> Option<ChainStep> {
        if self.is_done() {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let off = index
            .checked_sub(1)
            .and_then(|previous| self.specs.get(previous))
            .cloned();
        let on = self.specs.get(index).cloned();
        Some(ChainStep { off, on })
    }
}
