//! Line-level edit scripts between two listings.
//!
//! Lines compare by content (text and tokens), never by presentation state.
//! The script is built from a longest common subsequence after the shared
//! prefix and suffix are skipped. Memory stays linear in the line count;
//! time is quadratic in the size of the differing middle.

use crate::line::CodeLine;

/// One edit, positioned against the listing as it stands after every earlier
/// change in the same script has been applied. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Remove { position: usize, count: usize },
    Insert { position: usize, lines: Vec<CodeLine> },
    Replace { position: usize, line: CodeLine },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Keep,
    Delete,
    Add(usize), // index into the new middle
}

/// Minimal sequence of changes that turns `old` into `new`.
pub fn changes(old: &[CodeLine], new: &[CodeLine]) -> Vec<Change> {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| a.same_content(b))
        .count();
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a.same_content(b))
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];
    let ops = lcs_ops(old_mid, new_mid);

    let mut script = Vec::new();
    let mut position = prefix + 1;
    let mut deleted = 0;
    let mut added: Vec<CodeLine> = Vec::new();

    for op in ops.into_iter().chain(std::iter::once(Op::Keep)) {
        match op {
            Op::Delete => deleted += 1,
            Op::Add(index) => added.push(new_mid[index].clone()),
            Op::Keep => {
                position += flush(&mut script, position, deleted, std::mem::take(&mut added));
                deleted = 0;
                position += 1;
            }
        }
    }
    script
}

/// Emit the changes for a block of deletions and additions at `position`.
/// Returns how many lines the block leaves in place.
fn flush(script: &mut Vec<Change>, position: usize, deleted: usize, added: Vec<CodeLine>) -> usize {
    let count = added.len();
    let replaced = deleted.min(count);
    let mut added = added.into_iter();

    for (offset, line) in added.by_ref().take(replaced).enumerate() {
        script.push(Change::Replace {
            position: position + offset,
            line,
        });
    }
    if deleted > replaced {
        script.push(Change::Remove {
            position: position + replaced,
            count: deleted - replaced,
        });
    }
    let rest: Vec<CodeLine> = added.collect();
    if !rest.is_empty() {
        script.push(Change::Insert {
            position: position + replaced,
            lines: rest,
        });
    }
    count
}

/// Edit operations over two sequences. Hirschberg's split keeps memory
/// linear in the input while still finding a longest common subsequence.
fn lcs_ops(old: &[CodeLine], new: &[CodeLine]) -> Vec<Op> {
    let old: Vec<&CodeLine> = old.iter().collect();
    let new: Vec<&CodeLine> = new.iter().collect();
    let mut ops = Vec::with_capacity(old.len() + new.len());
    split_ops(&old, &new, 0, &mut ops);
    ops
}

fn split_ops(old: &[&CodeLine], new: &[&CodeLine], offset: usize, ops: &mut Vec<Op>) {
    match (old, new) {
        ([], _) => ops.extend((0..new.len()).map(|j| Op::Add(offset + j))),
        (_, []) => ops.extend(std::iter::repeat_n(Op::Delete, old.len())),
        ([line], _) => match new.iter().position(|other| line.same_content(other)) {
            Some(k) => {
                ops.extend((0..k).map(|j| Op::Add(offset + j)));
                ops.push(Op::Keep);
                ops.extend((k + 1..new.len()).map(|j| Op::Add(offset + j)));
            }
            None => {
                ops.push(Op::Delete);
                ops.extend((0..new.len()).map(|j| Op::Add(offset + j)));
            }
        },
        _ => {
            let mid = old.len() / 2;
            let forward = lcs_row(&old[..mid], new);
            let old_tail: Vec<&CodeLine> = old[mid..].iter().rev().copied().collect();
            let new_rev: Vec<&CodeLine> = new.iter().rev().copied().collect();
            let backward = lcs_row(&old_tail, &new_rev);

            // first split point with the longest combined subsequence
            let m = new.len();
            let mut split = 0;
            for k in 1..=m {
                if forward[k] + backward[m - k] > forward[split] + backward[m - split] {
                    split = k;
                }
            }
            split_ops(&old[..mid], &new[..split], offset, ops);
            split_ops(&old[mid..], &new[split..], offset + split, ops);
        }
    }
}

/// Last row of the LCS table: `row[j]` is the LCS length of `old` and
/// `new[..j]`.
fn lcs_row(old: &[&CodeLine], new: &[&CodeLine]) -> Vec<usize> {
    let mut row = vec![0; new.len() + 1];
    for line in old {
        let mut diagonal = 0;
        for (j, other) in new.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if line.same_content(other) {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row
}

/// Apply a change to a plain line vector. Returns false when the change
/// does not fit the lines.
pub fn apply_change(lines: &mut Vec<CodeLine>, change: &Change) -> bool {
    match change {
        Change::Remove { position, count } => {
            let start = position.wrapping_sub(1);
            if *position == 0 || start > lines.len() || *count > lines.len() - start {
                return false;
            }
            lines.drain(start..start + count);
        }
        Change::Insert { position, lines: added } => {
            if *position == 0 || *position > lines.len() + 1 {
                return false;
            }
            lines.splice(position - 1..position - 1, added.iter().cloned());
        }
        Change::Replace { position, line } => {
            if *position == 0 || *position > lines.len() {
                return false;
            }
            lines[position - 1] = line.clone();
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::CodePart;
    use crate::syntax::TokenKind;

    fn lines(text: &str) -> Vec<CodeLine> {
        text.split('\n')
            .map(|t| CodeLine::new(vec![CodePart::new(TokenKind::Text, t)], true))
            .collect()
    }

    fn texts(lines: &[CodeLine]) -> Vec<String> {
        lines.iter().map(CodeLine::text).collect()
    }

    fn check(old: &str, new: &str) -> Vec<Change> {
        let (old, new) = (lines(old), lines(new));
        let script = changes(&old, &new);
        let mut applied = old.clone();
        for change in &script {
            assert!(apply_change(&mut applied, change), "{:?}", change);
        }
        assert_eq!(texts(&applied), texts(&new));
        script
    }

    #[test]
    fn test_identical_is_empty() {
        assert!(check("a\nb\nc", "a\nb\nc").is_empty());
    }

    #[test]
    fn test_single_replace() {
        let script = check("a\nb\nc", "a\nx\nc");
        assert_eq!(script.len(), 1);
        assert!(matches!(script[0], Change::Replace { position: 2, .. }));
    }

    #[test]
    fn test_insert_and_remove() {
        let script = check("a\nc", "a\nb\nc");
        assert!(matches!(&script[..], [Change::Insert { position: 2, lines }] if lines.len() == 1));

        let script = check("a\nb\nb\nc", "a\nc");
        assert_eq!(script, vec![Change::Remove { position: 2, count: 2 }]);
    }

    #[test]
    fn test_mixed_blocks() {
        check("a\nb\nc\nd\ne", "x\na\nc\ny\nz\ne\nw");
        check("", "a\nb");
        check("a\nb", "");
        check("a\nb\nc", "c\nb\na");
    }

    #[test]
    fn test_script_is_minimal() {
        // one kept line in the middle means two replaces and one insert
        let script = check("a\nb\nc", "x\nb\ny\nz");
        assert_eq!(script.len(), 3);
        // the longest subsequence "b d" is kept
        let script = check("a\nb\nc\nd", "b\nx\nd\ny");
        let kept = 4 - script
            .iter()
            .map(|change| match change {
                Change::Remove { count, .. } => *count,
                Change::Replace { .. } => 1,
                Change::Insert { .. } => 0,
            })
            .sum::<usize>();
        assert_eq!(kept, 2);
    }

    #[test]
    fn test_long_middles() {
        let old: Vec<String> = (0..300).map(|n| format!("{}", n % 7)).collect();
        let new: Vec<String> = (0..280).map(|n| format!("{}", n % 5)).collect();
        check(&old.join("\n"), &new.join("\n"));
    }

    #[test]
    fn test_apply_change_rejects_bad_positions() {
        let mut l = lines("a");
        assert!(!apply_change(&mut l, &Change::Remove { position: 0, count: 1 }));
        assert!(!apply_change(&mut l, &Change::Remove { position: 1, count: 2 }));
        assert!(!apply_change(&mut l, &Change::Remove { position: usize::MAX, count: 2 }));
        assert!(!apply_change(&mut l, &Change::Remove { position: 1, count: usize::MAX }));
        assert!(!apply_change(&mut l, &Change::Insert { position: 3, lines: vec![] }));
        assert!(!apply_change(&mut l, &Change::Replace { position: 2, line: CodeLine::empty() }));
    }
}
