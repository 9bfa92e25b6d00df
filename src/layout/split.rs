//! Two-row split for overlong lines

/// Lines longer than this many characters are split at display time
pub const DEFAULT_SPLIT_THRESHOLD: usize = 55;

/// Characters after which a long line may be split
const PIVOTS: &[char] = &['!', ',', '.', ';', ':'];

/// Split `text` into two rows at the punctuation mark nearest its middle.
///
/// Text of at most `threshold` characters, or without any pivot punctuation,
/// is returned unchanged. The punctuation stays on the first row. Ties go to
/// the earlier index. Only one split is ever made.
pub fn split_if_long(text: &str, threshold: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= threshold {
        return text.to_string();
    }

    let middle = chars.len() / 2;
    let pivot = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| PIVOTS.contains(c))
        .min_by_key(|(i, _)| i.abs_diff(middle))
        .map(|(i, _)| i);

    match pivot {
        Some(index) => {
            let mut out: String = chars[..=index].iter().collect();
            out.push('\n');
            out.extend(&chars[index + 1..]);
            out
        }
        None => text.to_string(),
    }
}
