//! Text helpers: escaping, the bold/italic markdown subset, and statistic
//! highlighting for the decorative layouts.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+?)\*").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?\b(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?(?:[kKmM]\b|%|\b)").unwrap()
});
static VERSION_BEFORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:v|version)\s*$").unwrap());
static MODEL_BEFORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:gpt|model|llm|bert|roberta|t5|v\d)").unwrap());
static VERSION_SUFFIX_AFTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-.]\s*(?:turbo|base|large|small|mini|nano|pro|plus|max)").unwrap()
});
static BULLET_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:(?:[-•]|>+)\s+)+").unwrap());

const CONTEXT_CHARS: usize = 10;

/// Escapes `&`, `<` and `>` for element content.
pub fn escape_html_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes text for a double-quoted attribute value.
pub fn escape_html_attr(text: &str) -> String {
    escape_html_text(text)
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escapes `text`, then turns `**bold**` into `<strong>` and `*italic*` into `<em>`.
pub fn markdown_to_html(text: &str) -> String {
    let escaped = escape_html_text(text);
    let bolded = BOLD.replace_all(&escaped, "<strong>$1</strong>");

    let mut out = String::with_capacity(bolded.len());
    let mut last = 0;
    for caps in ITALIC.captures_iter(&bolded) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let starred_before = bolded[..whole.start()].ends_with('*');
        let starred_after = bolded[whole.end()..].starts_with('*');
        if starred_before || starred_after {
            continue;
        }
        out.push_str(&bolded[last..whole.start()]);
        out.push_str("<em>");
        out.push_str(inner.as_str());
        out.push_str("</em>");
        last = whole.end();
    }
    out.push_str(&bolded[last..]);
    out
}

/// Wraps statistics (`5`, `700,000`, `25%`, `$2.5M`) in a highlight span.
///
/// Text inside tags is left untouched. Numbers that look like versions or
/// model names (`v2.0`, `GPT-4`, `3.5-turbo`) are skipped; this is a
/// heuristic and has false positives on things like years.
pub fn highlight_numbers(html: &str, primary_color: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for tag in TAG.find_iter(html) {
        out.push_str(&highlight_segment(&html[last..tag.start()], primary_color));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&highlight_segment(&html[last..], primary_color));
    out
}

fn highlight_segment(text: &str, primary_color: &str) -> String {
    NUMBER
        .replace_all(text, |caps: &Captures| {
            let Some(found) = caps.get(0) else {
                return String::new();
            };
            let number = found.as_str();
            if is_version_like(number, &text[..found.start()], &text[found.end()..]) {
                number.to_string()
            } else {
                format!(
                    r#"<span class="fancy-number-highlight" style="color: {}; font-size: 1.4em; font-weight: 700;">{}</span>"#,
                    primary_color, number
                )
            }
        })
        .into_owned()
}

fn is_version_like(number: &str, before: &str, after: &str) -> bool {
    let before = tail_chars(before, CONTEXT_CHARS).to_lowercase();
    let after: String = after.chars().take(CONTEXT_CHARS).collect::<String>().to_lowercase();

    VERSION_BEFORE.is_match(&before)
        || MODEL_BEFORE.is_match(&before)
        || VERSION_SUFFIX_AFTER.is_match(&after)
        || (number.contains('.') && (after.starts_with('-') || after.starts_with('.')))
}

fn tail_chars(text: &str, count: usize) -> &str {
    match text.char_indices().rev().nth(count.saturating_sub(1)) {
        Some((index, _)) if count > 0 => &text[index..],
        _ if count == 0 => "",
        _ => text,
    }
}

/// Drops leading `-`, `•` and `>` markers from a bullet. A marker must be
/// followed by whitespace, so signed values such as `-5%` are kept.
pub fn strip_bullet_marker(text: &str) -> String {
    BULLET_MARKER.replace(text, "").trim().to_string()
}

/// `<ul class="bullet-points">` with one markdown-rendered `<li>` per point.
pub fn bullet_list_html<S: AsRef<str>>(points: &[S]) -> String {
    let items: String = points
        .iter()
        .map(|point| format!("<li>{}</li>", markdown_to_html(point.as_ref())))
        .collect();
    format!(r#"<ul class="bullet-points">{}</ul>"#, items)
}

/// The first `count` whitespace-separated words, and whether any were dropped.
pub fn first_words(text: &str, count: usize) -> (String, bool) {
    let words: Vec<&str> = text.split_whitespace().collect();
    let truncated = words.len() > count;
    (words.into_iter().take(count).collect::<Vec<_>>().join(" "), truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighted(html: &str) -> Vec<String> {
        let marker = "font-weight: 700;\">";
        html.match_indices(marker)
            .map(|(i, _)| {
                let rest = &html[i + marker.len()..];
                rest[..rest.find("</span>").unwrap()].to_string()
            })
            .collect()
    }

    #[test]
    fn markdown_subset() {
        assert_eq!(
            markdown_to_html("**Bold** and *it* <b>"),
            "<strong>Bold</strong> and <em>it</em> &lt;b&gt;"
        );
        assert_eq!(markdown_to_html("a * b"), "a * b");
        assert_eq!(markdown_to_html("***x***"), "<em><strong>x</strong></em>");
        assert_eq!(markdown_to_html("**a** *b*"), "<strong>a</strong> <em>b</em>");
    }

    #[test]
    fn statistics_are_highlighted() {
        let out = highlight_numbers("5 scenarios, 700,000 prompts, 25% gain, $2.5M", "#000");
        assert_eq!(highlighted(&out), vec!["5", "700,000", "25%", "$2.5M"]);
    }

    #[test]
    fn versions_are_skipped() {
        for text in ["GPT-4 results", "v2.0 release", "GPT-3.5-turbo", "version 3", "BERT 2"] {
            let out = highlight_numbers(text, "#000");
            assert!(highlighted(&out).is_empty(), "{} -> {}", text, out);
        }
    }

    #[test]
    fn tags_are_not_touched() {
        let out = highlight_numbers(r#"<strong data-x="12">3 wins</strong>"#, "#000");
        assert!(out.starts_with(r#"<strong data-x="12">"#));
        assert_eq!(highlighted(&out), vec!["3"]);
    }

    #[test]
    fn bullet_markers_are_stripped() {
        assert_eq!(strip_bullet_marker("  - • >> point"), "point");
        assert_eq!(strip_bullet_marker("-5% drop"), "-5% drop");
        assert_eq!(strip_bullet_marker("- -5% drop"), "-5% drop");
    }

    #[test]
    fn words_and_lists() {
        assert_eq!(first_words("one two three", 2), ("one two".to_string(), true));
        assert_eq!(first_words("one", 2), ("one".to_string(), false));
        assert_eq!(
            bullet_list_html(&["**a**", "b"]),
            r#"<ul class="bullet-points"><li><strong>a</strong></li><li>b</li></ul>"#
        );
    }

    #[test]
    fn attributes_escape_quotes() {
        assert_eq!(escape_html_attr(r#"a "b" & 'c'"#), "a &quot;b&quot; &amp; &#39;c&#39;");
    }
}
