/// Characters that split keywords and search terms into tokens, in addition to
/// whitespace.
const SEPARATORS: &[char] = &[
    '!', '?', '<', '>', '"', '\'', '=', '+', '*', '.', ':', ',', ';', '\\', '/', '_', '-',
];

fn is_separator(c: char) -> bool {
    c.is_whitespace() || SEPARATORS.contains(&c)
}

/// Split `text` into lower-cased tokens, dropping empty fragments.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(is_separator)
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
