//! Diff engine
//!
//! Computes the shortest edit script between two token sequences with the
//! linear-space variant of Myers' O(ND) algorithm (divide and conquer on the
//! middle snake). The script maximizes the number of matched tokens.
//!
//! Within each run of changes between two equal runs, all deletions are
//! emitted before all insertions, so a replaced word shows up as one
//! delete/insert pair instead of interleaved fragments.

use crate::error::CompareError;
use crate::tokenize::{tokenize, Granularity, Token};
use compare_types::{CoordinateUnit, Hunk, Operation, OperationType, TextComparisonOptions, TextRange};
use std::ops::{Index, IndexMut, Range};

/// A run of tokens sharing one edit kind, in token indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EditRun {
    kind: OperationType,
    old_start: usize,
    old_len: usize,
    new_start: usize,
    new_len: usize,
}

/// Furthest-reaching x per diagonal k, indexable by negative k
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d + 1],
        }
    }
}

impl Index<isize> for V {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for V {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn max_d(n: usize, m: usize) -> usize {
    (n + m + 1) / 2 + 1
}

struct Myers<'a, T: PartialEq> {
    old: &'a [T],
    new: &'a [T],
    vf: V,
    vb: V,
    runs: Vec<EditRun>,
}

impl<'a, T: PartialEq> Myers<'a, T> {
    fn new(old: &'a [T], new: &'a [T]) -> Self {
        let d = max_d(old.len(), new.len());
        Self {
            old,
            new,
            vf: V::new(d),
            vb: V::new(d),
            runs: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<EditRun> {
        self.conquer(0..self.old.len(), 0..self.new.len());
        self.runs
    }

    fn push(&mut self, kind: OperationType, old_start: usize, old_len: usize, new_start: usize, new_len: usize) {
        if let Some(last) = self.runs.last_mut() {
            if last.kind == kind
                && last.old_start + last.old_len == old_start
                && last.new_start + last.new_len == new_start
            {
                last.old_len += old_len;
                last.new_len += new_len;
                return;
            }
        }
        self.runs.push(EditRun {
            kind,
            old_start,
            old_len,
            new_start,
            new_len,
        });
    }

    fn common_prefix(&self, old: Range<usize>, new: Range<usize>) -> usize {
        self.old[old]
            .iter()
            .zip(&self.new[new])
            .take_while(|(a, b)| a == b)
            .count()
    }

    fn common_suffix(&self, old: Range<usize>, new: Range<usize>) -> usize {
        self.old[old]
            .iter()
            .rev()
            .zip(self.new[new].iter().rev())
            .take_while(|(a, b)| a == b)
            .count()
    }

    fn conquer(&mut self, mut old: Range<usize>, mut new: Range<usize>) {
        let prefix = self.common_prefix(old.clone(), new.clone());
        if prefix > 0 {
            self.push(OperationType::Equal, old.start, prefix, new.start, prefix);
        }
        old.start += prefix;
        new.start += prefix;

        let suffix = self.common_suffix(old.clone(), new.clone());
        old.end -= suffix;
        new.end -= suffix;
        let (suffix_old, suffix_new) = (old.end, new.end);

        if old.is_empty() && new.is_empty() {
            // nothing between prefix and suffix
        } else if new.is_empty() {
            self.push(OperationType::Delete, old.start, old.len(), new.start, 0);
        } else if old.is_empty() {
            self.push(OperationType::Insert, old.start, 0, new.start, new.len());
        } else if let Some((x, y)) = self.find_middle_snake(old.clone(), new.clone()) {
            self.conquer(old.start..x, new.start..y);
            self.conquer(x..old.end, y..new.end);
        } else {
            self.push(OperationType::Delete, old.start, old.len(), new.start, 0);
            self.push(OperationType::Insert, old.end, 0, new.start, new.len());
        }

        if suffix > 0 {
            self.push(OperationType::Equal, suffix_old, suffix, suffix_new, suffix);
        }
    }

    /// Start of the middle snake of the optimal path, in absolute indexes
    fn find_middle_snake(&mut self, old: Range<usize>, new: Range<usize>) -> Option<(usize, usize)> {
        let n = old.len();
        let m = new.len();
        let delta = n as isize - m as isize;
        let odd = delta & 1 == 1;

        self.vf[1] = 0;
        self.vb[1] = 0;

        let d_max = max_d(n, m) as isize;
        for d in 0..d_max {
            // Forward search
            let mut k = d;
            while k >= -d {
                let mut x = if k == -d || (k != d && self.vf[k - 1] < self.vf[k + 1]) {
                    self.vf[k + 1]
                } else {
                    self.vf[k - 1] + 1
                };
                let y = (x as isize - k) as usize;
                let (x0, y0) = (x, y);
                if x < n && y < m {
                    x += self.common_prefix(old.start + x..old.end, new.start + y..new.end);
                }
                self.vf[k] = x;

                // Paths can only meet on a forward step when delta is odd
                if odd && (k - delta).abs() <= d - 1 && self.vf[k] + self.vb[-(k - delta)] >= n {
                    return Some((old.start + x0, new.start + y0));
                }
                k -= 2;
            }

            // Backward search
            let mut k = d;
            while k >= -d {
                let mut x = if k == -d || (k != d && self.vb[k - 1] < self.vb[k + 1]) {
                    self.vb[k + 1]
                } else {
                    self.vb[k - 1] + 1
                };
                let mut y = (x as isize - k) as usize;
                if x < n && y < m {
                    let advance = self.common_suffix(
                        old.start..old.start + n - x,
                        new.start..new.start + m - y,
                    );
                    x += advance;
                    y += advance;
                }
                self.vb[k] = x;

                if !odd && (k - delta).abs() <= d && self.vb[k] + self.vf[-(k - delta)] >= n {
                    return Some((old.start + n - x, new.start + m - y));
                }
                k -= 2;
            }
        }

        None
    }
}

/// Collapse every change cluster into one deletion followed by one insertion
fn compact_runs(runs: Vec<EditRun>) -> Vec<EditRun> {
    let mut out: Vec<EditRun> = Vec::with_capacity(runs.len());
    let mut i = 0;

    while i < runs.len() {
        let run = runs[i];
        if run.kind == OperationType::Equal {
            match out.last_mut() {
                Some(last) if last.kind == OperationType::Equal => {
                    last.old_len += run.old_len;
                    last.new_len += run.new_len;
                }
                _ => out.push(run),
            }
            i += 1;
            continue;
        }

        let (old_start, new_start) = (run.old_start, run.new_start);
        let (mut old_len, mut new_len) = (0, 0);
        while i < runs.len() && runs[i].kind != OperationType::Equal {
            old_len += runs[i].old_len;
            new_len += runs[i].new_len;
            i += 1;
        }

        if old_len > 0 {
            out.push(EditRun {
                kind: OperationType::Delete,
                old_start,
                old_len,
                new_start,
                new_len: 0,
            });
        }
        if new_len > 0 {
            out.push(EditRun {
                kind: OperationType::Insert,
                old_start: old_start + old_len,
                old_len: 0,
                new_start,
                new_len,
            });
        }
    }

    out
}

/// Maps token index spans back to text and unit ranges
struct TokenSpans<'a> {
    text: &'a str,
    tokens: &'a [Token<'a>],
    total_units: usize,
}

impl<'a> TokenSpans<'a> {
    fn offset(&self, index: usize) -> (usize, usize) {
        match self.tokens.get(index) {
            Some(token) => (token.range.position, token.byte_start),
            None => (self.total_units, self.text.len()),
        }
    }

    fn span(&self, start: usize, len: usize) -> (TextRange, &'a str) {
        let (unit_start, byte_start) = self.offset(start);
        let (unit_end, byte_end) = self.offset(start + len);
        (
            TextRange::from_bounds(unit_start, unit_end),
            &self.text[byte_start..byte_end],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffEngine {
    granularity: Granularity,
    unit: CoordinateUnit,
}

impl DiffEngine {
    pub fn new(granularity: Granularity, unit: CoordinateUnit) -> Self {
        Self { granularity, unit }
    }

    pub fn from_options(options: &TextComparisonOptions) -> Self {
        Self::new(Granularity::from(options), CoordinateUnit::default())
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn unit(&self) -> CoordinateUnit {
        self.unit
    }

    /// Reject text measured in a different unit than this engine's
    pub fn check_unit(&self, found: CoordinateUnit) -> Result<(), CompareError> {
        if found == self.unit {
            Ok(())
        } else {
            Err(CompareError::UnitMismatch {
                expected: self.unit,
                found,
            })
        }
    }

    /// Diff two texts into hunks
    pub fn diff(&self, original: &str, changed: &str) -> Vec<Hunk> {
        group_hunks(self.diff_operations(original, changed))
    }

    /// Diff two texts into a flat operation list
    ///
    /// Two empty inputs yield a single empty `equal` operation.
    pub fn diff_operations(&self, original: &str, changed: &str) -> Vec<Operation> {
        let old_tokens = tokenize(original, self.granularity, self.unit);
        let new_tokens = tokenize(changed, self.granularity, self.unit);

        let old_keys: Vec<&str> = old_tokens.iter().map(|t| t.text).collect();
        let new_keys: Vec<&str> = new_tokens.iter().map(|t| t.text).collect();
        let runs = compact_runs(Myers::new(&old_keys, &new_keys).run());

        let old_spans = TokenSpans {
            text: original,
            tokens: &old_tokens,
            total_units: self.unit.measure(original),
        };
        let new_spans = TokenSpans {
            text: changed,
            tokens: &new_tokens,
            total_units: self.unit.measure(changed),
        };

        let mut operations: Vec<Operation> = runs
            .iter()
            .map(|run| {
                let (original_range, old_text) = old_spans.span(run.old_start, run.old_len);
                let (changed_range, new_text) = new_spans.span(run.new_start, run.new_len);
                let text = match run.kind {
                    OperationType::Insert => new_text,
                    OperationType::Delete | OperationType::Equal => old_text,
                };
                Operation {
                    op_type: run.kind,
                    text: text.to_string(),
                    original_range,
                    changed_range,
                    original_text_blocks: Vec::new(),
                    changed_text_blocks: Vec::new(),
                }
            })
            .collect();

        if operations.is_empty() {
            operations.push(Operation {
                op_type: OperationType::Equal,
                text: String::new(),
                original_range: TextRange::default(),
                changed_range: TextRange::default(),
                original_text_blocks: Vec::new(),
                changed_text_blocks: Vec::new(),
            });
        }

        operations
    }
}

/// Split operations into hunks
///
/// A new hunk starts at every `equal` operation that follows a change, so a
/// hunk is an optional leading equal run plus one change cluster.
pub fn group_hunks(operations: Vec<Operation>) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current: Vec<Operation> = Vec::new();

    for op in operations {
        if op.op_type == OperationType::Equal && current.iter().any(Operation::is_change) {
            hunks.push(make_hunk(std::mem::take(&mut current)));
        }
        current.push(op);
    }
    if !current.is_empty() {
        hunks.push(make_hunk(current));
    }

    hunks
}

fn make_hunk(operations: Vec<Operation>) -> Hunk {
    let bounds = |range: fn(&Operation) -> TextRange| {
        let start = operations.first().map(|op| range(op).position).unwrap_or(0);
        let end = operations.last().map(|op| range(op).end()).unwrap_or(start);
        TextRange::from_bounds(start, end)
    };
    Hunk {
        original_range: bounds(|op| op.original_range),
        changed_range: bounds(|op| op.changed_range),
        operations,
    }
}
