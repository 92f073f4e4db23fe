//! Tokenization for the diff engine
//!
//! Character mode yields one token per `char`. Word mode splits on Unicode
//! default word boundaries (UAX #29), keeping whitespace and punctuation as
//! their own tokens, so the concatenated tokens always reproduce the input.

use compare_types::{CoordinateUnit, TextComparisonOptions, TextRange};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    #[default]
    Character,
    Word,
}

impl From<&TextComparisonOptions> for Granularity {
    fn from(options: &TextComparisonOptions) -> Self {
        if options.word_level {
            Granularity::Word
        } else {
            Granularity::Character
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// Byte offset of the token in the source string
    pub byte_start: usize,
    /// Range in the coordinate unit
    pub range: TextRange,
}

pub fn tokenize(text: &str, granularity: Granularity, unit: CoordinateUnit) -> Vec<Token<'_>> {
    let pieces: Vec<(usize, &str)> = match granularity {
        Granularity::Character => text
            .char_indices()
            .map(|(byte_start, c)| (byte_start, &text[byte_start..byte_start + c.len_utf8()]))
            .collect(),
        Granularity::Word => text.split_word_bound_indices().collect(),
    };

    let mut offset = 0;
    pieces
        .into_iter()
        .map(|(byte_start, piece)| {
            let length = unit.measure(piece);
            let token = Token {
                text: piece,
                byte_start,
                range: TextRange::new(offset, length),
            };
            offset += length;
            token
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
        tokens.iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_character_tokens() {
        let tokens = tokenize("ab𝄞", Granularity::Character, CoordinateUnit::Utf16CodeUnit);
        assert_eq!(texts(&tokens), vec!["a", "b", "𝄞"]);
        assert_eq!(tokens[2].range, TextRange::new(2, 2));
        assert_eq!(tokens[2].byte_start, 2);
    }

    #[test]
    fn test_word_tokens_keep_separators() {
        let tokens = tokenize("The cat sat.", Granularity::Word, CoordinateUnit::Utf16CodeUnit);
        assert_eq!(texts(&tokens), vec!["The", " ", "cat", " ", "sat", "."]);
        assert_eq!(tokens[4].range, TextRange::new(8, 3));
    }

    #[test]
    fn test_word_tokens_reassemble_input() {
        let input = "Prix: 12,50 € — café\nnaïve résumé";
        let tokens = tokenize(input, Granularity::Word, CoordinateUnit::Utf16CodeUnit);
        assert_eq!(texts(&tokens).concat(), input);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("", Granularity::Word, CoordinateUnit::Utf16CodeUnit).is_empty());
    }
}
