use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Clean raw lyric markup into display text.
///
/// Steps, in order: `<br>` variants become newlines, remaining tags are
/// stripped, lines whose trimmed content is nothing but a bracketed section
/// label (e.g. `[Chorus]`) are dropped, and every surviving line is trimmed.
/// The result is NFC-normalized. Running the cleanup on its own output is a
/// no-op.
pub fn clean_lyrics(raw: &str) -> String {
    let br = Regex::new(r"(?i)<br\s*/?>").unwrap();
    let tag = Regex::new(r"<[^>]+>").unwrap();

    let text = br.replace_all(raw, "\n");
    let text = tag.replace_all(&text, "");

    let cleaned = text
        .lines()
        .filter(|line| !is_section_label(line))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    cleaned.nfc().collect()
}

/// A line whose trimmed content is entirely a bracketed annotation, e.g.
/// `[Chorus]` or `[Verse 1: Someone]`.
pub fn is_section_label(line: &str) -> bool {
    let re = Regex::new(r"^\[.*\]$").unwrap();
    re.is_match(line.trim())
}
