//! Search term normalization.
//!
//! Terms and indexed names are both lower-cased and have hiragana folded to
//! katakana, so `ぴかちゅう`, `ピカチュウ` and `PIKA` all compare in one form.

const HIRAGANA_START: u32 = 0x3041;
const HIRAGANA_END: u32 = 0x3096;
const KATAKANA_OFFSET: u32 = 0x60;

/// Fold a single hiragana character to katakana; other characters pass through.
fn hiragana_to_katakana(c: char) -> char {
    let code = c as u32;
    if (HIRAGANA_START..=HIRAGANA_END).contains(&code) {
        char::from_u32(code + KATAKANA_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

/// Normalize a search term or indexed name.
pub fn normalize_term(term: &str) -> String {
    term.trim()
        .to_lowercase()
        .chars()
        .map(hiragana_to_katakana)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hiragana_folds_to_katakana() {
        assert_eq!(normalize_term("ぴかちゅう"), "ピカチュウ");
        assert_eq!(normalize_term("ピカチュウ"), "ピカチュウ");
        assert_eq!(normalize_term("ふしぎだね"), "フシギダネ");
    }

    #[test]
    fn test_lowercases_and_trims() {
        assert_eq!(normalize_term("  PikaChu "), "pikachu");
        assert_eq!(normalize_term("25"), "25");
    }

    #[test]
    fn test_kanji_untouched() {
        assert_eq!(normalize_term("草原"), "草原");
    }
}
