//! Label normalization shared by node and edge labels.

const ARTICLES: [&str; 3] = ["the", "an", "a"];
const RELATIVE_PRONOUNS: [&str; 3] = ["that", "which", "who"];

/// Characters that would break bracket or quote matching in diagram text.
fn is_delimiter(ch: char) -> bool {
    matches!(
        ch,
        '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>' | '"' | '`' | '|' | '\u{201c}' | '\u{201d}'
    )
}

fn is_quote_like(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2018}' | '\u{2019}')
}

/// Remove delimiters, drop single quotes that are not inside a word, and
/// collapse whitespace runs to one space.
pub(crate) fn scrub(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut kept = String::with_capacity(raw.len());
    for (index, &ch) in chars.iter().enumerate() {
        if is_delimiter(ch) {
            kept.push(' ');
            continue;
        }
        if is_quote_like(ch) {
            let inside_word = index > 0
                && chars[index - 1].is_alphanumeric()
                && chars.get(index + 1).is_some_and(|next| next.is_alphanumeric());
            if !inside_word {
                kept.push(' ');
                continue;
            }
        }
        kept.push(ch);
    }
    collapse_whitespace(&kept)
}

pub(crate) fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip one leading word from `words` (case-insensitive) when it is followed
/// by whitespace or is the whole text.
fn strip_leading_word<'a>(text: &'a str, words: &[&str], allow_whole: bool) -> &'a str {
    for word in words {
        let Some(head) = text.get(..word.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(word) {
            continue;
        }
        let rest = &text[word.len()..];
        if rest.is_empty() {
            if allow_whole {
                return rest;
            }
            continue;
        }
        if rest.starts_with(char::is_whitespace) {
            return rest.trim_start();
        }
    }
    text
}

pub(crate) fn strip_leading_article(text: &str) -> &str {
    strip_leading_word(text, &ARTICLES, false)
}

pub(crate) fn strip_relative_pronoun(text: &str) -> &str {
    strip_leading_word(text, &RELATIVE_PRONOUNS, true)
}

/// Node label: scrubbed, leading article removed.
pub(crate) fn clean_node_label(raw: &str) -> String {
    let scrubbed = scrub(raw);
    strip_leading_article(&scrubbed).to_string()
}

/// Edge label: node cleaning, then a leading relative pronoun removed,
/// `fallback` when nothing is left, truncated to `max_chars`.
pub(crate) fn clean_edge_label(raw: &str, fallback: &str, max_chars: usize) -> String {
    let node_clean = clean_node_label(raw);
    let stripped = strip_relative_pronoun(&node_clean);
    let label = if stripped.is_empty() {
        fallback
    } else {
        stripped
    };
    truncate_label(label, max_chars)
}

pub(crate) const ELLIPSIS: &str = "...";

/// Labels longer than `max_chars` keep `max_chars - 3` characters followed
/// by [`ELLIPSIS`].
pub(crate) fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = label.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
