//! Keyword extraction from popular deal titles.

use indexmap::IndexMap;

use crate::traits::keywords::KeywordFrequency;

/// Words shorter than this are ignored.
const MIN_KEYWORD_CHARS: usize = 4;

const STOP_WORDS: &[&str] = &[
    "ve", "ile", "için", "bir", "çok", "daha", "the", "and", "with", "for", "from", "a", "an",
    "in", "on", "at", "to", "of", "yeni", "new",
];

/// Frequency-ranked keywords from titles.
///
/// Words are lowercased and stripped of surrounding punctuation; short words
/// and stop words are dropped. Ties keep first-appearance order.
pub fn keywords_from_titles<I, S>(titles: I, limit: usize) -> Vec<KeywordFrequency>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: IndexMap<String, u32> = IndexMap::new();

    for title in titles {
        for word in title.as_ref().split_whitespace() {
            let clean = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if clean.chars().count() < MIN_KEYWORD_CHARS || STOP_WORDS.contains(&clean.as_str())
            {
                continue;
            }
            *counts.entry(clean).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<KeywordFrequency> = counts
        .into_iter()
        .map(|(keyword, frequency)| KeywordFrequency { keyword, frequency })
        .collect();
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    ranked.truncate(limit);
    ranked
}
