use crate::domain::page::ExtractedPage;
use crate::domain::report::{
    CanonicalCheck, RobotsCheck, SchemaCheck, TechnicalAnalysis, UrlStructureCheck,
};

/// Technical SEO scoring: 100 minus 25 per recommendation, floored at 0.
pub fn analyze(page: &ExtractedPage) -> TechnicalAnalysis {
    let canonical = check_canonical(page);
    let robots = check_robots(page);
    let url_analysis = analyze_url_path(&page.path);
    let schema_markup = SchemaCheck {
        has_schema: page.json_ld_count > 0 || page.microdata_count > 0,
        json_ld_count: page.json_ld_count,
        microdata_count: page.microdata_count,
    };

    let mut recommendations = Vec::new();
    if !canonical.has_canonical {
        recommendations
            .push("Add a canonical URL to prevent duplicate-content issues.".to_string());
    }
    if !robots.has_robots_tag {
        recommendations.push("Add a robots meta tag to control page indexing.".to_string());
    }
    if !url_analysis.issues.is_empty() {
        recommendations.push(format!("URL issues: {}.", url_analysis.issues.join(", ")));
    }
    if !schema_markup.has_schema {
        recommendations.push(
            "Add structured data (Schema.org) to improve how the page appears in search results."
                .to_string(),
        );
    }

    let score = (100 - recommendations.len() as i32 * 25).max(0) as u8;

    TechnicalAnalysis {
        canonical,
        robots,
        url_analysis,
        hreflang_languages: page.hreflang.clone(),
        schema_markup,
        has_sitemap_link: page.has_sitemap_link,
        score,
        recommendations,
    }
}

fn check_canonical(page: &ExtractedPage) -> CanonicalCheck {
    match &page.canonical {
        None => CanonicalCheck {
            has_canonical: false,
            canonical_url: None,
            is_self_canonical: false,
        },
        Some(canonical_url) => CanonicalCheck {
            has_canonical: true,
            is_self_canonical: canonical_url == &page.url,
            canonical_url: Some(canonical_url.clone()),
        },
    }
}

fn check_robots(page: &ExtractedPage) -> RobotsCheck {
    match &page.robots {
        None => RobotsCheck {
            has_robots_tag: false,
            directives: vec![],
            is_noindex: false,
            is_nofollow: false,
        },
        Some(content) => {
            let directives: Vec<String> = content
                .split(',')
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect();
            RobotsCheck {
                has_robots_tag: true,
                is_noindex: directives.iter().any(|d| d == "noindex"),
                is_nofollow: directives.iter().any(|d| d == "nofollow"),
                directives,
            }
        }
    }
}

fn analyze_url_path(path: &str) -> UrlStructureCheck {
    let mut issues = Vec::new();

    if path.chars().any(|c| c.is_ascii_uppercase()) {
        issues.push("URL contains uppercase letters".to_string());
    }
    if path
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '/' || c == '-'))
    {
        issues.push("URL contains special characters".to_string());
    }
    if path.contains("--") {
        issues.push("URL contains double hyphens".to_string());
    }
    if path.chars().count() > 100 {
        issues.push("URL is too long".to_string());
    }

    UrlStructureCheck {
        path: path.to_string(),
        is_optimized: issues.is_empty(),
        issues,
    }
}
