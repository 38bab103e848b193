//! Human-readable labels derived from directory and file names

/// Derive a display label from a directory name or file stem
///
/// `-` and `_` become spaces, and the first letter of every word is
/// upper-cased. Words are runs of ASCII letters and digits; any other
/// character, accented letters included, is kept as-is and starts a new word.
pub fn format_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len());
    let mut at_word_start = true;

    for ch in name.chars() {
        let ch = if ch == '-' || ch == '_' { ' ' } else { ch };
        if ch.is_ascii_alphanumeric() {
            if at_word_start {
                label.push(ch.to_ascii_uppercase());
            } else {
                label.push(ch);
            }
            at_word_start = false;
        } else {
            label.push(ch);
            at_word_start = true;
        }
    }

    label
}
