//! Content pillar: density and structure analysis of extracted markdown.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::scoring::{round1, round2};
use crate::core::types::ContentReport;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})\s").expect("valid regex"));
static HEADING_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s.*$").expect("valid regex"));
static LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-*+]\s").expect("valid regex"));
static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));
static VOWEL_GROUPS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[aeiou]+").expect("valid regex"));

/// Syllable estimate: contiguous vowel groups, floored at one per word.
fn count_syllables(word: &str) -> usize {
    VOWEL_GROUPS_RE.find_iter(word).count().max(1)
}

/// Flesch-Kincaid Grade Level, or `None` for texts under 30 words.
fn readability_grade(text: &str) -> Option<f64> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 30 {
        return None;
    }
    let mut sentence_count = SENTENCE_END_RE
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count();
    if sentence_count == 0 {
        sentence_count = 1; // treat the whole text as one sentence
    }
    let total_syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
    let grade = 0.39 * (words.len() as f64 / sentence_count as f64)
        + 11.8 * (total_syllables as f64 / words.len() as f64)
        - 15.59;
    Some(round1(grade))
}

/// Count headings and validate the hierarchy: each heading may go at most one
/// level deeper than any seen so far; going back up is always valid. No H1
/// requirement.
fn analyze_headings(markdown: &str) -> (usize, bool) {
    let levels: Vec<usize> = HEADING_RE
        .captures_iter(markdown)
        .filter_map(|c| c.get(1).map(|m| m.as_str().len()))
        .collect();
    let Some(&first) = levels.first() else {
        return (0, true);
    };
    let mut valid = true;
    let mut max_seen = first;
    for &level in &levels[1..] {
        if level > max_seen + 1 {
            valid = false;
            break;
        }
        max_seen = max_seen.max(level);
    }
    (levels.len(), valid)
}

/// First sentence of a section: everything up to the first `.`, `!`, or `?`
/// that is followed by whitespace, punctuation included. Falls back to the
/// whole section when no boundary exists.
fn first_sentence(section: &str) -> &str {
    let bytes = section.as_bytes();
    for i in 0..bytes.len().saturating_sub(1) {
        if matches!(bytes[i], b'.' | b'!' | b'?') && bytes[i + 1].is_ascii_whitespace() {
            return &section[..=i];
        }
    }
    section
}

/// Fraction of heading-delimited sections whose first sentence is a statement
/// rather than a question, rounded to 2 decimals.
fn answer_first_ratio(markdown: &str) -> f64 {
    if markdown.trim().is_empty() {
        return 0.0;
    }
    let sections: Vec<&str> = HEADING_LINE_RE
        .split(markdown)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if sections.is_empty() {
        return 0.0;
    }
    let answer_first = sections
        .iter()
        .filter(|section| {
            let first = first_sentence(section).trim();
            !first.is_empty() && !first.trim_end().ends_with('?')
        })
        .count();
    round2(answer_first as f64 / sections.len() as f64)
}

/// Split on headings and size up the chunks: count, integer-mean words, and
/// how many land in the 50-150 word citation sweet spot.
fn analyze_chunks(markdown: &str) -> (usize, usize, usize) {
    let chunk_words: Vec<usize> = HEADING_LINE_RE
        .split(markdown)
        .filter(|c| !c.trim().is_empty())
        .map(|c| c.split_whitespace().count())
        .collect();
    let chunk_count = chunk_words.len();
    if chunk_count == 0 {
        return (0, 0, 0);
    }
    let avg = chunk_words.iter().sum::<usize>() / chunk_count;
    let sweet = chunk_words.iter().filter(|&&w| (50..=150).contains(&w)).count();
    (chunk_count, avg, sweet)
}

/// Analyze markdown content density.
pub fn check_content(markdown: &str) -> ContentReport {
    if markdown.is_empty() {
        return ContentReport {
            detail: "No content extracted".to_string(),
            ..Default::default()
        };
    }

    let word_count = markdown.split_whitespace().count();
    let char_count = markdown.chars().count();
    let has_headings = HEADING_RE.is_match(markdown);
    let has_lists = LIST_RE.is_match(markdown);
    let has_code_blocks = markdown.contains("```");
    let (chunk_count, avg_chunk_words, chunks_in_sweet_spot) = analyze_chunks(markdown);
    let readability = readability_grade(markdown);
    let (heading_count, heading_hierarchy_valid) = analyze_headings(markdown);
    let answer_first = answer_first_ratio(markdown);

    let mut detail = format!("{word_count} words");
    if has_headings {
        detail.push_str(", has headings");
    }
    if has_lists {
        detail.push_str(", has lists");
    }
    if has_code_blocks {
        detail.push_str(", has code blocks");
    }

    ContentReport {
        word_count,
        char_count,
        has_headings,
        has_lists,
        has_code_blocks,
        chunk_count,
        avg_chunk_words,
        chunks_in_sweet_spot,
        readability_grade: readability,
        heading_count,
        heading_hierarchy_valid,
        answer_first_ratio: answer_first,
        score: 0.0,
        detail,
    }
}
