//! Property tests for the diff engine and the page comparison pipeline
//!
//! Run with: cargo test -p compare-core --test diff_properties

use compare_core::{compare_extracted, DiffEngine, Granularity, InMemoryDocument, TextExtractor};
use compare_types::{
    CoordinateUnit, Hunk, Operation, OperationType, PageSelector, TextComparisonOptions, TextRange,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn engine(word_level: bool) -> DiffEngine {
    let granularity = if word_level {
        Granularity::Word
    } else {
        Granularity::Character
    };
    DiffEngine::new(granularity, CoordinateUnit::Utf16CodeUnit)
}

fn operations(hunks: &[Hunk]) -> impl Iterator<Item = &Operation> {
    hunks.iter().flat_map(|h| h.operations.iter())
}

/// Concatenated text of the operations that consume one side
fn side_text(hunks: &[Hunk], keep: fn(OperationType) -> bool) -> String {
    operations(hunks)
        .filter(|op| keep(op.op_type))
        .map(|op| op.text.as_str())
        .collect()
}

fn total_len(hunks: &[Hunk], op_type: OperationType) -> usize {
    operations(hunks)
        .filter(|op| op.op_type == op_type)
        .map(Operation::len)
        .sum()
}

/// Longest common subsequence length by dynamic programming
fn lcs_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        let mut diagonal = 0;
        for (j, y) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if x == y {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Short texts over a small alphabet so matches are frequent
fn text_strategy() -> impl Strategy<Value = String> {
    "[ab cé\n.]{0,40}"
}

/// Same, with characters outside the Basic Multilingual Plane
fn wide_text_strategy() -> impl Strategy<Value = String> {
    "[ab 𝄞é.]{0,30}"
}

// ============================================================================
// Algebraic properties
// ============================================================================

proptest! {
    /// Property: delete+equal rebuilds the original, insert+equal the changed text
    #[test]
    fn round_trip(a in text_strategy(), b in text_strategy(), word_level in any::<bool>()) {
        let hunks = engine(word_level).diff(&a, &b);
        prop_assert_eq!(side_text(&hunks, OperationType::touches_original), a);
        prop_assert_eq!(side_text(&hunks, OperationType::touches_changed), b);
    }

    /// Property: round trip holds with surrogate pairs
    #[test]
    fn round_trip_wide(a in wide_text_strategy(), b in wide_text_strategy()) {
        let hunks = engine(false).diff(&a, &b);
        prop_assert_eq!(side_text(&hunks, OperationType::touches_original), a);
        prop_assert_eq!(side_text(&hunks, OperationType::touches_changed), b);
    }

    /// Property: matched length equals the longest common subsequence
    #[test]
    fn equal_length_is_maximal(a in text_strategy(), b in text_strategy()) {
        let hunks = engine(false).diff(&a, &b);
        let a_chars: Vec<char> = a.chars().collect();
        let b_chars: Vec<char> = b.chars().collect();
        // Every character of the alphabet is one UTF-16 unit
        prop_assert_eq!(total_len(&hunks, OperationType::Equal), lcs_len(&a_chars, &b_chars));
    }

    /// Property: a text diffed against itself is one equal hunk
    #[test]
    fn idempotence(a in text_strategy(), word_level in any::<bool>()) {
        let hunks = engine(word_level).diff(&a, &a);
        prop_assert_eq!(hunks.len(), 1);
        prop_assert_eq!(hunks[0].operations.len(), 1);
        prop_assert_eq!(hunks[0].operations[0].op_type, OperationType::Equal);
        prop_assert_eq!(&hunks[0].operations[0].text, &a);
    }

    /// Property: swapping inputs swaps insert and delete totals
    #[test]
    fn symmetry(a in text_strategy(), b in text_strategy()) {
        let forward = engine(false).diff(&a, &b);
        let backward = engine(false).diff(&b, &a);
        prop_assert_eq!(
            total_len(&forward, OperationType::Equal),
            total_len(&backward, OperationType::Equal)
        );
        prop_assert_eq!(
            total_len(&forward, OperationType::Insert),
            total_len(&backward, OperationType::Delete)
        );
        prop_assert_eq!(
            total_len(&forward, OperationType::Delete),
            total_len(&backward, OperationType::Insert)
        );
    }

    /// Property: hunks tile both streams without gaps or overlaps
    #[test]
    fn hunks_partition_streams(a in wide_text_strategy(), b in wide_text_strategy(), word_level in any::<bool>()) {
        let hunks = engine(word_level).diff(&a, &b);
        let (mut original_end, mut changed_end) = (0, 0);
        for hunk in &hunks {
            prop_assert_eq!(hunk.original_range.position, original_end);
            prop_assert_eq!(hunk.changed_range.position, changed_end);
            for op in &hunk.operations {
                prop_assert_eq!(op.original_range.position, original_end);
                prop_assert_eq!(op.changed_range.position, changed_end);
                original_end = op.original_range.end();
                changed_end = op.changed_range.end();
            }
            prop_assert_eq!(hunk.original_range.end(), original_end);
            prop_assert_eq!(hunk.changed_range.end(), changed_end);
        }
        prop_assert_eq!(original_end, CoordinateUnit::Utf16CodeUnit.measure(&a));
        prop_assert_eq!(changed_end, CoordinateUnit::Utf16CodeUnit.measure(&b));
    }

    /// Property: inside a hunk deletions never follow insertions
    #[test]
    fn deletions_precede_insertions(a in text_strategy(), b in text_strategy(), word_level in any::<bool>()) {
        for hunk in engine(word_level).diff(&a, &b) {
            let kinds: Vec<OperationType> = hunk.changes().map(|op| op.op_type).collect();
            prop_assert!(kinds.len() <= 2);
            prop_assert!(kinds != vec![OperationType::Insert, OperationType::Delete]);
        }
    }

    /// Property: empty original is a single full insertion
    #[test]
    fn boundary_empty_original(b in "[ab cé.]{1,40}") {
        let hunks = engine(false).diff("", &b);
        prop_assert_eq!(hunks.len(), 1);
        prop_assert_eq!(hunks[0].operations.len(), 1);
        prop_assert_eq!(hunks[0].operations[0].op_type, OperationType::Insert);
        prop_assert_eq!(
            hunks[0].operations[0].changed_range,
            TextRange::new(0, CoordinateUnit::Utf16CodeUnit.measure(&b))
        );
    }

    /// Property: empty changed text is a single full deletion
    #[test]
    fn boundary_empty_changed(a in "[ab cé.]{1,40}", word_level in any::<bool>()) {
        let hunks = engine(word_level).diff(&a, "");
        prop_assert_eq!(hunks.len(), 1);
        prop_assert_eq!(hunks[0].operations.len(), 1);
        prop_assert_eq!(hunks[0].operations[0].op_type, OperationType::Delete);
        prop_assert_eq!(&hunks[0].operations[0].text, &a);
    }
}

// ============================================================================
// Scenarios
// ============================================================================

fn changes(hunks: &[Hunk]) -> Vec<(OperationType, String)> {
    operations(hunks)
        .filter(|op| op.is_change())
        .map(|op| (op.op_type, op.text.clone()))
        .collect()
}

#[test]
fn scenario_character_level_changes() {
    let hunks = engine(false).diff("The cat sat.", "The dog sat down.");
    assert_eq!(
        changes(&hunks),
        vec![
            (OperationType::Delete, "cat".to_string()),
            (OperationType::Insert, "dog".to_string()),
            (OperationType::Insert, " down".to_string()),
        ]
    );
    // " down" is inserted right before the final period
    let last = hunks.last().unwrap();
    assert_eq!(last.operations[0].text, ".");
}

#[test]
fn scenario_word_level_groups_replacement() {
    let hunks = engine(true).diff("The cat sat.", "The dog sat down.");
    let first_change_hunk = hunks.iter().find(|h| h.has_changes()).unwrap();
    let pair: Vec<(OperationType, &str)> = first_change_hunk
        .changes()
        .map(|op| (op.op_type, op.text.as_str()))
        .collect();
    assert_eq!(
        pair,
        vec![(OperationType::Delete, "cat"), (OperationType::Insert, "dog")]
    );
}

#[test]
fn scenario_first_page_selection() {
    let extractor = TextExtractor::default();
    let selection = [PageSelector::Index(0)];
    let original = extractor
        .extract(
            &InMemoryDocument::from_pages(&["Intro text\nshared", "Appendix A"]),
            Some(&selection),
        )
        .unwrap();
    let changed = extractor
        .extract(
            &InMemoryDocument::from_pages(&["Intro words\nshared", "Appendix B", "Extra"]),
            Some(&selection),
        )
        .unwrap();

    let result =
        compare_extracted(&original, &changed, &TextComparisonOptions::word_level()).unwrap();
    assert_eq!(result.page_pairs(), vec![(Some(0), Some(0))]);
    for op in result.operations() {
        assert!(op
            .original_text_blocks
            .iter()
            .chain(&op.changed_text_blocks)
            .all(|block| block.page_index == 0));
    }
}
