/// One display row: a lyric line and its translation at the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePair {
    pub original: String,
    pub translation: String,
}

/// Pair original and translated text line by line for side-by-side display.
///
/// Pairing is purely positional; when one side has fewer lines, it is padded
/// with empty lines so every row has both columns.
pub fn pair_lines(original: &str, translation: &str) -> Vec<LinePair> {
    let original: Vec<&str> = original.lines().collect();
    let translation: Vec<&str> = translation.lines().collect();
    let rows = original.len().max(translation.len());

    (0..rows)
        .map(|i| LinePair {
            original: original.get(i).copied().unwrap_or("").to_string(),
            translation: translation.get(i).copied().unwrap_or("").to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_lengths() {
        let pairs = pair_lines("one\ntwo", "אחת\nשתיים");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].original, "one");
        assert_eq!(pairs[0].translation, "אחת");
        assert_eq!(pairs[1].original, "two");
        assert_eq!(pairs[1].translation, "שתיים");
    }

    #[test]
    fn test_short_translation_is_padded() {
        let pairs = pair_lines("one\ntwo\nthree", "אחת");
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1].translation, "");
        assert_eq!(pairs[2].translation, "");
        assert_eq!(pairs[2].original, "three");
    }

    #[test]
    fn test_short_original_is_padded() {
        let pairs = pair_lines("one", "אחת\nשתיים");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].original, "");
        assert_eq!(pairs[1].translation, "שתיים");
    }

    #[test]
    fn test_blank_lines_are_kept_in_place() {
        let pairs = pair_lines("one\n\ntwo", "אחת\n\nשתיים");
        assert_eq!(pairs[1].original, "");
        assert_eq!(pairs[1].translation, "");
        assert_eq!(pairs[2].original, "two");
    }

    #[test]
    fn test_empty_inputs() {
        assert!(pair_lines("", "").is_empty());
    }
}
