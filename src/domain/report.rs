use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize)]
pub struct TitleAnalysis {
    pub content: Option<String>,
    pub length: usize,
    pub is_optimized: bool,
    pub issues: Vec<String>,
    pub has_brand: bool,
    pub brand_position: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DescriptionAnalysis {
    pub content: Option<String>,
    pub length: usize,
    pub is_optimized: bool,
    pub issues: Vec<String>,
    pub has_cta: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct KeywordsAnalysis {
    pub content: Option<String>,
    pub keywords: Vec<String>,
    pub count: usize,
    pub is_optimized: bool,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetaAnalysis {
    pub title: TitleAnalysis,
    pub description: DescriptionAnalysis,
    pub keywords: KeywordsAnalysis,
    pub has_open_graph: bool,
    pub has_twitter_cards: bool,
    pub author: Option<String>,
    pub score: u8,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct KeywordDensity {
    pub keyword: String,
    pub percent: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ContentAnalysis {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub readability_score: u8,
    pub keyword_density: Vec<KeywordDensity>,
    pub structure_score: f64,
    pub score: u8,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CanonicalCheck {
    pub has_canonical: bool,
    pub canonical_url: Option<String>,
    pub is_self_canonical: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RobotsCheck {
    pub has_robots_tag: bool,
    pub directives: Vec<String>,
    pub is_noindex: bool,
    pub is_nofollow: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct UrlStructureCheck {
    pub path: String,
    pub issues: Vec<String>,
    pub is_optimized: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaCheck {
    pub has_schema: bool,
    pub json_ld_count: usize,
    pub microdata_count: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TechnicalAnalysis {
    pub canonical: CanonicalCheck,
    pub robots: RobotsCheck,
    pub url_analysis: UrlStructureCheck,
    pub hreflang_languages: Vec<String>,
    pub schema_markup: SchemaCheck,
    pub has_sitemap_link: bool,
    pub score: u8,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ViewportCheck {
    pub has_viewport: bool,
    pub content: Option<String>,
    pub is_responsive: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TouchTargetCheck {
    pub total_touch_targets: usize,
    pub potential_small_targets: usize,
    pub adequate_sizing: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FontSizeCheck {
    pub small_inline_fonts: usize,
    pub small_class_elements: usize,
    pub potential_issues: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MobileAnalysis {
    pub viewport: ViewportCheck,
    pub touch_targets: TouchTargetCheck,
    pub font_sizes: FontSizeCheck,
    pub has_theme_color: bool,
    pub has_apple_touch_icon: bool,
    pub score: u8,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PagespeedReport {
    pub performance_score: f64,
    pub first_contentful_paint: Option<String>,
    pub largest_contentful_paint: Option<String>,
    pub time_to_interactive: Option<String>,
    pub cumulative_layout_shift: Option<String>,
    pub recommendations: Vec<String>,
}

/// Per-facet results. Each block is optional: a failed or unavailable
/// sub-analysis is recorded as absent, never zero-filled.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Metrics {
    pub meta_analysis: Option<MetaAnalysis>,
    pub content_analysis: Option<ContentAnalysis>,
    pub technical_analysis: Option<TechnicalAnalysis>,
    pub mobile_analysis: Option<MobileAnalysis>,
    pub pagespeed: Option<PagespeedReport>,
}

impl Metrics {
    pub fn available_scores(&self) -> Vec<f64> {
        let mut scores = Vec::new();
        if let Some(meta) = &self.meta_analysis {
            scores.push(meta.score as f64);
        }
        if let Some(content) = &self.content_analysis {
            scores.push(content.score as f64);
        }
        if let Some(technical) = &self.technical_analysis {
            scores.push(technical.score as f64);
        }
        if let Some(mobile) = &self.mobile_analysis {
            scores.push(mobile.score as f64);
        }
        if let Some(pagespeed) = &self.pagespeed {
            scores.push(pagespeed.performance_score);
        }
        scores
    }

    /// Mean of the metrics that are actually present. Absent metrics are
    /// excluded from the denominator so an unrelated collaborator outage
    /// does not drag the score down.
    pub fn overall_score(&self) -> u8 {
        let scores = self.available_scores();
        if scores.is_empty() {
            return 0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.round().clamp(0.0, 100.0) as u8
    }
}

/// One completed (or partially completed) analysis. Immutable once cached;
/// regeneration produces a new value.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisReport {
    pub url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<String>,
    pub metrics: Metrics,
    pub recommendations: Vec<String>,
    pub generated_description: Option<String>,
    pub confidence: f64,
    pub overall_score: u8,
    pub computed_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// A new report with a swapped-in description. Used by regeneration:
    /// the previous report stays untouched until the new description
    /// exists.
    pub fn with_description(&self, description: String, confidence: f64) -> Self {
        let mut next = self.clone();
        next.generated_description = Some(description);
        next.confidence = confidence;
        next.computed_at = Utc::now();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mobile(score: u8) -> MobileAnalysis {
        MobileAnalysis {
            viewport: ViewportCheck {
                has_viewport: true,
                content: None,
                is_responsive: true,
            },
            touch_targets: TouchTargetCheck {
                total_touch_targets: 0,
                potential_small_targets: 0,
                adequate_sizing: true,
            },
            font_sizes: FontSizeCheck {
                small_inline_fonts: 0,
                small_class_elements: 0,
                potential_issues: false,
            },
            has_theme_color: false,
            has_apple_touch_icon: false,
            score,
            recommendations: vec![],
        }
    }

    #[test]
    fn absent_metrics_are_excluded_from_the_average() {
        let metrics = Metrics {
            mobile_analysis: Some(mobile(40)),
            pagespeed: Some(PagespeedReport {
                performance_score: 80.0,
                first_contentful_paint: None,
                largest_contentful_paint: None,
                time_to_interactive: None,
                cumulative_layout_shift: None,
                recommendations: vec![],
            }),
            ..Metrics::default()
        };

        // (40 + 80) / 2, not (40 + 80) / 5
        assert_eq!(metrics.overall_score(), 60);
    }

    #[test]
    fn no_metrics_means_zero_overall() {
        assert_eq!(Metrics::default().overall_score(), 0);
    }

    #[test]
    fn single_metric_is_its_own_average() {
        let metrics = Metrics {
            mobile_analysis: Some(mobile(70)),
            ..Metrics::default()
        };
        assert_eq!(metrics.overall_score(), 70);
    }

    #[test]
    fn swapping_the_description_leaves_metrics_untouched() {
        let report = AnalysisReport {
            url: "https://example.com".to_string(),
            title: Some("Example".to_string()),
            meta_description: None,
            keywords: None,
            metrics: Metrics {
                mobile_analysis: Some(mobile(70)),
                ..Metrics::default()
            },
            recommendations: vec!["Add a viewport meta tag.".to_string()],
            generated_description: Some("Old description.".to_string()),
            confidence: 0.5,
            overall_score: 70,
            computed_at: Utc::now(),
        };

        let updated = report.with_description("New description.".to_string(), 0.9);

        assert_eq!(updated.generated_description.as_deref(), Some("New description."));
        assert_eq!(updated.confidence, 0.9);
        assert_eq!(
            updated.metrics.mobile_analysis.as_ref().unwrap().score,
            report.metrics.mobile_analysis.as_ref().unwrap().score
        );
        assert_eq!(updated.recommendations, report.recommendations);
        // The original report is unchanged
        assert_eq!(report.generated_description.as_deref(), Some("Old description."));
    }
}
