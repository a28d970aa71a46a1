//! Uzbek Latin alphabet as taught by the app.
//!
//! # Responsibility
//! - Define the ordered grapheme table used for indexing and leveling.
//! - Carry the three canonical example words per grapheme.
//!
//! # Invariants
//! - The table holds exactly `ALPHABET_LEN` distinct graphemes.
//! - Order is fixed; a grapheme's position is its `letter_index`.
//! - Every grapheme has exactly `WORDS_PER_LETTER` example words.

use serde::Serialize;

/// Number of graphemes in the alphabet (24 letters + 5 digraphs).
pub const ALPHABET_LEN: usize = 29;

/// Example words a learner must complete per grapheme.
pub const WORDS_PER_LETTER: u32 = 3;

/// One example word attached to a grapheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExampleWord {
    pub word: &'static str,
    /// Russian gloss shown next to the word.
    pub translation: &'static str,
    /// 1 (easiest) ..= 3.
    pub difficulty: u8,
}

/// One taught unit of the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grapheme {
    /// Display form, e.g. `A`, `O'`, `Sh`.
    pub letter: &'static str,
    /// Spoken letter name, e.g. `be`, `she`.
    pub name: &'static str,
    pub words: [ExampleWord; 3],
}

impl Grapheme {
    /// Returns whether this grapheme is one of the two-character digraphs.
    pub fn is_digraph(&self) -> bool {
        self.letter.chars().count() > 1
    }

    /// Returns the example words as plain strings.
    pub fn example_words(&self) -> [&'static str; 3] {
        [self.words[0].word, self.words[1].word, self.words[2].word]
    }
}

const fn w(word: &'static str, translation: &'static str, difficulty: u8) -> ExampleWord {
    ExampleWord {
        word,
        translation,
        difficulty,
    }
}

const fn g(letter: &'static str, name: &'static str, words: [ExampleWord; 3]) -> Grapheme {
    Grapheme {
        letter,
        name,
        words,
    }
}

/// Ordered alphabet table.
pub const ALPHABET: [Grapheme; ALPHABET_LEN] = [
    g("A", "a", [w("Anor", "гранат", 1), w("Archa", "ёлка", 2), w("Avtobus", "автобус", 2)]),
    g("B", "be", [w("Bola", "ребенок", 1), w("Bosh", "голова", 1), w("Bog", "сад", 1)]),
    g("D", "de", [w("Daraxt", "дерево", 2), w("Dost", "друг", 1), w("Dars", "урок", 1)]),
    g("E", "e", [w("El", "страна", 1), w("Eshik", "дверь", 2), w("Ertak", "сказка", 2)]),
    g("F", "fe", [w("Fayl", "файл", 1), w("Futbol", "футбол", 2), w("Film", "фильм", 1)]),
    g("G", "ge", [w("Gul", "цветок", 1), w("Gapir", "говори", 2), w("Gazeta", "газета", 2)]),
    g("H", "he", [w("Hayvon", "животное", 2), w("Hajm", "объём", 1), w("Hokim", "правитель", 2)]),
    g("I", "i", [w("Ish", "работа", 1), w("Ilhom", "вдохновение", 2), w("Imtihon", "экзамен", 2)]),
    g("J", "je", [w("Juma", "пятница", 2), w("Jon", "душа", 1), w("Jild", "том", 1)]),
    g("K", "ke", [w("Kitob", "книга", 2), w("Ko'z", "глаз", 1), w("Kuch", "сила", 1)]),
    g("L", "le", [w("Lola", "тюльпан", 2), w("Limon", "лимон", 1), w("Lampa", "лампа", 2)]),
    g("M", "me", [w("Maktab", "школа", 2), w("Mashina", "машина", 2), w("Meva", "фрукт", 2)]),
    g("N", "ne", [w("Nur", "свет", 1), w("Non", "хлеб", 1), w("Nima", "что", 1)]),
    g("O", "o", [w("Ona", "мать", 1), w("Olma", "яблоко", 2), w("Oyi", "месяц", 1)]),
    g("P", "pe", [w("Poytaxt", "столица", 2), w("Pul", "деньги", 1), w("Piyola", "чашка", 2)]),
    g("Q", "qe", [w("Qalam", "ручка", 2), w("Qiz", "девочка", 1), w("Qush", "птица", 1)]),
    g("R", "re", [w("Rasm", "рисунок", 1), w("Rang", "цвет", 1), w("Ruchka", "ручка", 2)]),
    g("S", "se", [w("Sabzi", "морковь", 2), w("Soat", "час", 1), w("Suv", "вода", 1)]),
    g("T", "te", [w("Tosh", "камень", 1), w("Til", "язык", 1), w("Tom", "крыша", 1)]),
    g("U", "u", [w("Uy", "дом", 1), w("Ustoz", "учитель", 2), w("Uzoq", "далеко", 2)]),
    g("V", "ve", [w("Vatan", "родина", 2), w("Voda", "вода", 1), w("Vazifa", "задание", 2)]),
    g("X", "xe", [w("Xona", "комната", 2), w("Xat", "письмо", 1), w("Xayr", "до свидания", 1)]),
    g("Y", "ye", [w("Yoz", "лето", 1), w("Yol", "дорога", 1), w("Yosh", "молодой", 1)]),
    g("Z", "ze", [w("Zamin", "земля", 2), w("Zil", "колокол", 1), w("Zavod", "завод", 2)]),
    g("O'", "o'", [w("O'q", "стрела", 1), w("O't", "трава", 1), w("O'g'il", "сын", 2)]),
    g("G'", "g'", [w("G'isht", "кирпич", 2), w("G'oza", "хлопок", 2), w("G'alaba", "победа", 2)]),
    g("Sh", "she", [w("Shahar", "город", 2), w("Shamol", "ветер", 2), w("Shaxmat", "шахматы", 2)]),
    g("Ch", "che", [w("Choy", "чай", 1), w("Chiroq", "лампа", 2), w("Chashka", "чашка", 2)]),
    g("Ng", "nge", [w("Ming", "тысяча", 2), w("Ting", "слушай", 1), w("Qo'ng'iroq", "колокол", 3)]),
];

/// Returns the grapheme at `index`, or `None` when out of range.
pub fn grapheme_at(index: usize) -> Option<&'static Grapheme> {
    ALPHABET.get(index)
}

/// Finds a grapheme by its display letter, case-insensitively.
///
/// Returns `(letter_index, grapheme)`.
pub fn find_grapheme(letter: &str) -> Option<(usize, &'static Grapheme)> {
    let needle = letter.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    ALPHABET
        .iter()
        .enumerate()
        .find(|(_, grapheme)| grapheme.letter.to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::{find_grapheme, grapheme_at, ALPHABET, ALPHABET_LEN};
    use std::collections::BTreeSet;

    #[test]
    fn alphabet_has_distinct_letters() {
        let letters = ALPHABET
            .iter()
            .map(|grapheme| grapheme.letter.to_lowercase())
            .collect::<BTreeSet<_>>();
        assert_eq!(letters.len(), ALPHABET_LEN);
    }

    #[test]
    fn alphabet_has_five_digraphs_at_the_end() {
        let digraphs = ALPHABET
            .iter()
            .filter(|grapheme| grapheme.is_digraph())
            .map(|grapheme| grapheme.letter)
            .collect::<Vec<_>>();
        assert_eq!(digraphs, vec!["O'", "G'", "Sh", "Ch", "Ng"]);
        assert!(ALPHABET[..24].iter().all(|grapheme| !grapheme.is_digraph()));
    }

    #[test]
    fn find_grapheme_is_case_insensitive() {
        let (index, grapheme) = find_grapheme("sh").expect("sh should resolve");
        assert_eq!(index, 26);
        assert_eq!(grapheme.letter, "Sh");
        assert_eq!(find_grapheme(" o' ").map(|(index, _)| index), Some(24));
        assert!(find_grapheme("w").is_none());
        assert!(find_grapheme("").is_none());
    }

    #[test]
    fn grapheme_at_rejects_out_of_range() {
        assert_eq!(grapheme_at(0).map(|grapheme| grapheme.letter), Some("A"));
        assert!(grapheme_at(ALPHABET_LEN).is_none());
    }
}
