use itertools::Itertools;
use std::collections::HashMap;

use crate::domain::page::ExtractedPage;
use crate::domain::report::{ContentAnalysis, KeywordDensity};

const STOP_WORDS: [&str; 24] = [
    "the", "and", "for", "with", "that", "this", "from", "your", "have", "has", "are", "was",
    "were", "will", "can", "all", "our", "you", "not", "but", "they", "their", "more", "into",
];

/// Content quality scoring over the extracted main text. The single score
/// blends readability (40%), structure (30%) and content length (30%).
pub fn analyze(page: &ExtractedPage) -> ContentAnalysis {
    let text = page.main_text.as_str();

    let word_count = text.split_whitespace().count();
    let sentence_count = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let avg_sentence_length = word_count as f64 / sentence_count as f64;

    let readability_score = readability(text);
    let keyword_density = top_keyword_density(text);
    let structure_score = structure(page);

    let mut recommendations = Vec::new();
    if word_count < 300 {
        recommendations.push(
            "Content is too short. Aim for at least 300 words on important pages.".to_string(),
        );
    }
    if avg_sentence_length > 25.0 {
        recommendations.push(
            "Average sentence length is too high. Shorten sentences for better readability."
                .to_string(),
        );
    }
    if structure_score < 0.7 {
        recommendations.push(
            "Improve content structure by using subheadings (H2, H3) to break the text into logical sections."
                .to_string(),
        );
    }
    if readability_score < 50 {
        recommendations.push(
            "The text is hard to read. Simplify the language and use shorter sentences."
                .to_string(),
        );
    }

    let length_factor = (word_count.min(600) as f64 / 600.0) * 100.0;
    let score =
        (readability_score as f64 * 0.4 + structure_score * 100.0 * 0.3 + length_factor * 0.3)
            .round()
            .clamp(0.0, 100.0) as u8;

    ContentAnalysis {
        word_count,
        sentence_count,
        avg_sentence_length: (avg_sentence_length * 10.0).round() / 10.0,
        readability_score,
        keyword_density,
        structure_score: (structure_score * 100.0).round() / 100.0,
        score,
        recommendations,
    }
}

/// Simplified readability: share of complex (3+ syllable) words, inverted
/// so higher is better.
fn readability(text: &str) -> u8 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0;
    }

    let complex_words = words.iter().filter(|w| syllables(w) >= 3).count();
    let complex_percentage = complex_words as f64 / words.len() as f64;
    (100.0 - complex_percentage * 100.0).round() as u8
}

fn syllables(word: &str) -> usize {
    let mut word = word.to_lowercase();
    for suffix in ["es", "ed", "e"] {
        if let Some(stripped) = word.strip_suffix(suffix) {
            word = stripped.to_string();
            break;
        }
    }

    let mut count = 0;
    let mut prev_is_vowel = false;
    for c in word.chars() {
        let is_vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if is_vowel && !prev_is_vowel {
            count += 1;
        }
        prev_is_vowel = is_vowel;
    }
    count.max(1)
}

/// Density percentages for the ten most frequent meaningful words.
fn top_keyword_density(text: &str) -> Vec<KeywordDensity> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() > 3 && !STOP_WORDS.contains(&w.as_str()))
        .collect();

    if words.is_empty() {
        return vec![];
    }
    let total = words.len() as f64;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in words {
        *counts.entry(word).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .take(10)
        .map(|(keyword, count)| KeywordDensity {
            keyword,
            percent: ((count as f64 / total) * 1000.0).round() / 10.0,
        })
        .collect()
}

/// Structure score in [0,1]: heading-to-paragraph ratio (70%) plus list
/// presence (30%).
fn structure(page: &ExtractedPage) -> f64 {
    let text_blocks = page.paragraph_count as f64 + 1.0;
    let heading_ratio = (page.heading_count as f64 / (text_blocks / 4.0)).min(1.0);
    let has_lists = if page.list_count > 0 { 1.0 } else { 0.0 };
    heading_ratio * 0.7 + has_lists * 0.3
}

#[cfg(test)]
mod tests {
    use super::{analyze, syllables, top_keyword_density};
    use crate::domain::page::ExtractedPage;

    #[test]
    fn syllable_counting_is_sane() {
        assert_eq!(syllables("cat"), 1);
        assert_eq!(syllables("tea"), 1);
        assert_eq!(syllables("organic"), 3);
        // Every word has at least one syllable
        assert_eq!(syllables("x"), 1);
    }

    #[test]
    fn density_is_ordered_and_capped_at_ten() {
        let text = "coffee coffee coffee leaves leaves water garden garden garden garden";
        let density = top_keyword_density(text);

        assert_eq!(density[0].keyword, "garden");
        assert_eq!(density[1].keyword, "coffee");
        assert!(density.len() <= 10);
        // 4 of 10 meaningful words
        assert!((density[0].percent - 40.0).abs() < 0.01);
    }

    #[test]
    fn thin_content_gets_flagged() {
        let page = ExtractedPage::from_html(
            "<html><body><p>Just a few words here.</p></body></html>",
            "https://example.com",
        );
        let result = analyze(&page);

        assert!(result.word_count < 300);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("too short")));
    }

    #[test]
    fn structured_content_scores_better_than_a_wall_of_text() {
        let wall = format!(
            "<html><body><p>{}</p></body></html>",
            "plain words repeated over and over again ".repeat(40)
        );
        let structured = format!(
            "<html><body><main><h1>Guide</h1><h2>Part one</h2><p>{}</p><h2>Part two</h2><p>{}</p><ul><li>point</li></ul></main></body></html>",
            "plain words repeated over and over again ".repeat(20),
            "plain words repeated over and over again ".repeat(20),
        );

        let wall_result = analyze(&ExtractedPage::from_html(&wall, "https://example.com"));
        let structured_result =
            analyze(&ExtractedPage::from_html(&structured, "https://example.com"));

        assert!(structured_result.score > wall_result.score);
        assert!(structured_result.structure_score > wall_result.structure_score);
    }

    #[test]
    fn empty_page_scores_zero_without_panicking() {
        let page = ExtractedPage::from_html("<html><body></body></html>", "https://example.com");
        let result = analyze(&page);

        assert_eq!(result.word_count, 0);
        assert_eq!(result.readability_score, 0);
        assert!(result.keyword_density.is_empty());
    }
}
