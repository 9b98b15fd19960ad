//! Vietnamese diacritic folding and tokenization.

use std::fmt;
use std::ops::Deref;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

/// Characters deleted outright during normalization (not replaced by a space).
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\'', '"', '(', ')', '[', ']', '{', '}', '<', '>', '«', '»',
    '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '–', '—', '…', '·', '•', '/', '\\', '|', '@',
    '#', '$', '%', '^', '&', '*', '+', '=', '~', '`', '_', '-',
];

/// Precomposed Vietnamese letters and their base Latin letter.
///
/// NFD already splits all of these except `đ`/`Đ`, but the table keeps the
/// folding correct for input that arrives partially composed.
const VIETNAMESE_FOLDS: &[(&str, char)] = &[
    ("àáảãạăằắẳẵặâầấẩẫậÀÁẢÃẠĂẰẮẲẴẶÂẦẤẨẪẬ", 'a'),
    ("èéẻẽẹêềếểễệÈÉẺẼẸÊỀẾỂỄỆ", 'e'),
    ("ìíỉĩịÌÍỈĨỊ", 'i'),
    ("òóỏõọôồốổỗộơờớởỡợÒÓỎÕỌÔỒỐỔỖỘƠỜỚỞỠỢ", 'o'),
    ("ùúủũụưừứửữựÙÚỦŨỤƯỪỨỬỮỰ", 'u'),
    ("ỳýỷỹỵỲÝỶỸỴ", 'y'),
    ("đĐ", 'd'),
];

/// Text in canonical comparable form.
///
/// Guaranteed lowercase, trimmed, single-space separated, free of the
/// stripped punctuation set and of Vietnamese diacritics. Only [`normalize`]
/// constructs it, and normalizing it again is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, which is what the topic rules measure.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for NormalizedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for NormalizedText {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NormalizedText {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Folds raw text into [`NormalizedText`].
///
/// Steps:
/// 1. Lowercase
/// 2. Canonical decomposition, dropping combining marks U+0300..=U+036F
/// 3. Fold remaining precomposed Vietnamese letters (and `đ`) to Latin
/// 4. Delete the punctuation set
/// 5. Trim and collapse whitespace runs to a single space
///
/// Empty input yields empty output.
///
/// # Examples
///
/// ```
/// use van_tutor_core::text::normalize;
///
/// assert_eq!(normalize("Đăm Săn"), "dam san");
/// assert_eq!(normalize("  Chữ   người tử tù! "), "chu nguoi tu tu");
/// ```
#[must_use]
pub fn normalize(input: &str) -> NormalizedText {
    if input.is_empty() {
        return NormalizedText::default();
    }

    let folded: String = input
        .to_lowercase()
        .nfd()
        .filter(|ch| !is_combining_diacritic(*ch))
        .map(fold_vietnamese)
        .filter(|ch| !STRIPPED_PUNCTUATION.contains(ch))
        .collect();

    NormalizedText(folded.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Splits normalized text into its non-empty tokens.
#[must_use]
pub fn tokenize(normalized: &NormalizedText) -> Vec<&str> {
    normalized
        .as_str()
        .split(' ')
        .filter(|token| !token.is_empty())
        .collect()
}

/// Normalizes `input` and returns owned tokens.
#[must_use]
pub fn tokens(input: &str) -> Vec<String> {
    tokenize(&normalize(input))
        .into_iter()
        .map(String::from)
        .collect()
}

fn is_combining_diacritic(ch: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&ch)
}

fn fold_vietnamese(ch: char) -> char {
    if ch.is_ascii() {
        return ch;
    }
    VIETNAMESE_FOLDS
        .iter()
        .find(|(letters, _)| letters.contains(ch))
        .map_or(ch, |(_, base)| *base)
}
