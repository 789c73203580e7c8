/// Query tokens shorter than this only ever match by prefix.
const MIN_FUZZY_LEN: usize = 3;

/// Longest token length still limited to a single edit.
const SINGLE_EDIT_MAX_LEN: usize = 6;

/// Number of edits tolerated for a query token of `len` characters.
pub(super) fn threshold(len: usize) -> Option<usize> {
    match len {
        0..MIN_FUZZY_LEN => None,
        MIN_FUZZY_LEN..=SINGLE_EDIT_MAX_LEN => Some(1),
        _ => Some(2),
    }
}

/// Smallest Levenshtein distance between `query` and a prefix of `key`, or
/// `None` if it exceeds `max`.
///
/// Only prefixes between `min(query.len(), key.len())` and
/// `query.len() + max` characters long are considered.
pub(super) fn prefix_distance(query: &[char], key: &[char], max: usize) -> Option<usize> {
    let cols = key.len().min(query.len() + max);
    let shortest = query.len().min(key.len());

    let mut prev: Vec<usize> = (0..=cols).collect();
    let mut cur = vec![0; cols + 1];

    for (i, &q) in query.iter().enumerate() {
        cur[0] = i + 1;
        let mut row_min = cur[0];
        for j in 1..=cols {
            let cost = usize::from(q != key[j - 1]);
            cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
            row_min = row_min.min(cur[j]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev[shortest..=cols]
        .iter()
        .copied()
        .min()
        .filter(|distance| *distance <= max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn distance(query: &str, key: &str, max: usize) -> Option<usize> {
        prefix_distance(&chars(query), &chars(key), max)
    }

    #[test]
    fn thresholds_scale_with_length() {
        assert_eq!(threshold(2), None);
        assert_eq!(threshold(3), Some(1));
        assert_eq!(threshold(6), Some(1));
        assert_eq!(threshold(7), Some(2));
    }

    #[test]
    fn exact_prefix_has_zero_distance() {
        assert_eq!(distance("fire", "firefox", 1), Some(0));
    }

    #[test]
    fn single_substitution() {
        assert_eq!(distance("firefix", "firefox", 2), Some(1));
    }

    #[test]
    fn transposition_costs_two_edits() {
        assert_eq!(distance("fierfox", "firefox", 2), Some(2));
        assert_eq!(distance("fierfox", "firefox", 1), None);
    }

    #[test]
    fn typo_inside_a_prefix() {
        assert_eq!(distance("frie", "firefox", 1), None);
        assert_eq!(distance("fure", "firefox", 1), Some(1));
        assert_eq!(distance("firf", "firefox", 1), Some(1));
    }

    #[test]
    fn short_keys_compare_whole() {
        assert_eq!(distance("files", "file", 1), Some(1));
        assert_eq!(distance("firefix", "files", 2), None);
    }
}
