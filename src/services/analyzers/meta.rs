use crate::domain::page::ExtractedPage;
use crate::domain::report::{DescriptionAnalysis, KeywordsAnalysis, MetaAnalysis, TitleAnalysis};

const TITLE_SEPARATORS: [&str; 6] = [" | ", " - ", " \u{2013} ", " \u{2014} ", " :: ", " > "];
const CTA_WORDS: [&str; 10] = [
    "learn", "discover", "get", "buy", "order", "contact", "call", "read", "shop", "find",
];

/// Metadata scoring: 100, minus 20 per title issue, 20 per description
/// issue, and 20 when Open Graph tags are missing entirely.
pub fn analyze(page: &ExtractedPage) -> MetaAnalysis {
    let title = analyze_title(page);
    let description = analyze_description(page);
    let keywords = analyze_keywords(page);

    let has_open_graph = page.open_graph.any_present();
    let has_twitter_cards = page.twitter.any_present();

    let mut recommendations: Vec<String> = Vec::new();
    recommendations.extend(title.issues.iter().cloned());
    recommendations.extend(description.issues.iter().cloned());
    recommendations.extend(keywords.issues.iter().cloned());
    if !has_open_graph {
        recommendations.push(
            "Add Open Graph metadata for better presentation when shared on social networks."
                .to_string(),
        );
    }
    if !has_twitter_cards {
        recommendations
            .push("Add Twitter Cards metadata to improve how links render on Twitter.".to_string());
    }

    let mut score: i32 = 100;
    score -= title.issues.len() as i32 * 20;
    score -= description.issues.len() as i32 * 20;
    if !has_open_graph {
        score -= 20;
    }

    MetaAnalysis {
        title,
        description,
        keywords,
        has_open_graph,
        has_twitter_cards,
        author: page.author.clone(),
        score: score.max(0) as u8,
        recommendations,
    }
}

fn analyze_title(page: &ExtractedPage) -> TitleAnalysis {
    let Some(title) = page.title.clone() else {
        return TitleAnalysis {
            content: None,
            length: 0,
            is_optimized: false,
            issues: vec!["Missing title tag. Add a page title.".to_string()],
            has_brand: false,
            brand_position: None,
        };
    };

    let mut issues = Vec::new();
    let length = title.chars().count();
    if length < 10 {
        issues.push("Title is too short (under 10 characters).".to_string());
    } else if length > 60 {
        issues.push("Title is too long (over 60 characters). Shorten it for better SEO.".to_string());
    }

    let brand_position = TITLE_SEPARATORS.iter().find_map(|separator| {
        title.split_once(separator).map(|(prefix, _)| {
            if prefix.chars().count() < 20 {
                "prefix".to_string()
            } else {
                "suffix".to_string()
            }
        })
    });

    TitleAnalysis {
        content: Some(title),
        length,
        is_optimized: issues.is_empty(),
        has_brand: brand_position.is_some(),
        brand_position,
        issues,
    }
}

fn analyze_description(page: &ExtractedPage) -> DescriptionAnalysis {
    let Some(description) = page.description_or_fallback() else {
        return DescriptionAnalysis {
            content: None,
            length: 0,
            is_optimized: false,
            issues: vec![
                "Missing meta description. Add a short summary (150-160 characters).".to_string(),
            ],
            has_cta: false,
        };
    };

    let mut issues = Vec::new();
    let length = description.chars().count();
    if length < 50 {
        issues.push("Meta description is too short (under 50 characters).".to_string());
    } else if length > 160 {
        issues.push(
            "Meta description is too long (over 160 characters). Shorten it for better display in search results."
                .to_string(),
        );
    }

    let lower = description.to_lowercase();
    let has_cta = CTA_WORDS.iter().any(|w| lower.contains(w));

    DescriptionAnalysis {
        content: Some(description),
        length,
        is_optimized: issues.is_empty(),
        issues,
        has_cta,
    }
}

fn analyze_keywords(page: &ExtractedPage) -> KeywordsAnalysis {
    let Some(raw) = page.meta_keywords.clone() else {
        return KeywordsAnalysis {
            content: None,
            keywords: vec![],
            count: 0,
            is_optimized: false,
            issues: vec![
                "Missing meta keywords. Their SEO weight is limited, but adding relevant keywords is still recommended."
                    .to_string(),
            ],
        };
    };

    let keywords: Vec<String> = raw
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    let mut issues = Vec::new();
    if keywords.len() < 3 {
        issues.push("Too few keywords. Add more relevant keywords.".to_string());
    } else if keywords.len() > 10 {
        issues.push("Too many keywords. Trim the list down to the most relevant ones.".to_string());
    }
    if keywords.iter().any(|k| k.chars().count() > 30) {
        issues.push(
            "Some keywords are too long. Use shorter, more precise terms.".to_string(),
        );
    }

    KeywordsAnalysis {
        count: keywords.len(),
        is_optimized: issues.is_empty(),
        content: Some(raw),
        keywords,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::analyze;
    use crate::domain::page::ExtractedPage;

    fn page(html: &str) -> ExtractedPage {
        ExtractedPage::from_html(html, "https://example.com")
    }

    #[test]
    fn well_formed_metadata_scores_high() {
        let result = analyze(&page(
            r#"<html><head>
                <title>Acme Widgets | Quality Tools</title>
                <meta name="description" content="Shop durable widgets with a lifetime warranty and free two-day shipping on all orders.">
                <meta name="keywords" content="widgets, tools, hardware">
                <meta property="og:title" content="Acme Widgets">
            </head><body></body></html>"#,
        ));

        assert_eq!(result.score, 100);
        assert!(result.title.is_optimized);
        assert!(result.description.is_optimized);
        assert!(result.title.has_brand);
        assert_eq!(result.title.brand_position.as_deref(), Some("prefix"));
        assert!(result.description.has_cta);
    }

    #[test]
    fn bare_page_scores_conservatively_without_failing() {
        let result = analyze(&page("<html><head></head><body></body></html>"));

        // Missing title (-20), missing description (-20), no OG (-20)
        assert_eq!(result.score, 40);
        assert!(!result.title.is_optimized);
        assert!(result.recommendations.len() >= 3);
    }

    #[test]
    fn long_title_is_flagged() {
        let long_title = "A".repeat(70);
        let html = format!("<html><head><title>{}</title></head><body></body></html>", long_title);
        let result = analyze(&page(&html));

        assert!(!result.title.is_optimized);
        assert_eq!(result.title.issues.len(), 1);
    }

    #[test]
    fn keyword_count_bounds_are_enforced() {
        let result = analyze(&page(
            r#"<html><head><meta name="keywords" content="one, two"></head><body></body></html>"#,
        ));
        assert!(!result.keywords.is_optimized);
        assert_eq!(result.keywords.count, 2);
    }
}
