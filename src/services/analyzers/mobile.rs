use crate::domain::page::ExtractedPage;
use crate::domain::report::{FontSizeCheck, MobileAnalysis, TouchTargetCheck, ViewportCheck};

/// Mobile-friendliness scoring: missing viewport -40, small touch targets
/// -30, small fonts -30.
pub fn analyze(page: &ExtractedPage) -> MobileAnalysis {
    let viewport = check_viewport(page);
    let touch_targets = TouchTargetCheck {
        total_touch_targets: page.touch_target_total,
        potential_small_targets: page.touch_target_small,
        adequate_sizing: page.touch_target_small == 0,
    };
    let font_sizes = FontSizeCheck {
        small_inline_fonts: page.small_inline_fonts,
        small_class_elements: page.small_class_elements,
        potential_issues: page.small_inline_fonts > 0 || page.small_class_elements > 0,
    };

    let mut recommendations = Vec::new();
    let mut score: i32 = 100;

    if !viewport.has_viewport {
        recommendations.push(
            "Add a viewport meta tag so the page renders correctly on mobile devices.".to_string(),
        );
        score -= 40;
    }
    if !touch_targets.adequate_sizing {
        recommendations.push(
            "Increase the size of interface elements so they are easy to tap on mobile devices."
                .to_string(),
        );
        score -= 30;
    }
    if font_sizes.potential_issues {
        recommendations.push(
            "Review font sizes for better readability on mobile devices.".to_string(),
        );
        score -= 30;
    }

    MobileAnalysis {
        viewport,
        touch_targets,
        font_sizes,
        has_theme_color: page.has_theme_color,
        has_apple_touch_icon: page.has_apple_touch_icon,
        score: score.max(0) as u8,
        recommendations,
    }
}

fn check_viewport(page: &ExtractedPage) -> ViewportCheck {
    match &page.viewport {
        None => ViewportCheck {
            has_viewport: false,
            content: None,
            is_responsive: false,
        },
        Some(content) => {
            let has_width = content.contains("width=device-width");
            let has_initial_scale = content.contains("initial-scale=1");
            ViewportCheck {
                has_viewport: true,
                content: Some(content.clone()),
                is_responsive: has_width && has_initial_scale,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::analyze;
    use crate::domain::page::ExtractedPage;

    #[test]
    fn responsive_page_with_no_issues_scores_100() {
        let page = ExtractedPage::from_html(
            r#"<html><head>
                <meta name="viewport" content="width=device-width, initial-scale=1">
            </head><body><a href="/shop">Shop</a></body></html>"#,
            "https://example.com",
        );
        let result = analyze(&page);

        assert_eq!(result.score, 100);
        assert!(result.viewport.is_responsive);
        assert!(result.touch_targets.adequate_sizing);
    }

    #[test]
    fn missing_viewport_costs_40_points() {
        let page = ExtractedPage::from_html(
            "<html><head></head><body></body></html>",
            "https://example.com",
        );
        let result = analyze(&page);

        assert_eq!(result.score, 60);
        assert!(!result.viewport.has_viewport);
    }

    #[test]
    fn small_targets_and_fonts_stack_deductions() {
        let page = ExtractedPage::from_html(
            r#"<html><head></head><body>
                <button class="btn-sm">Go</button>
                <span style="font-size: 9px">terms</span>
            </body></html>"#,
            "https://example.com",
        );
        let result = analyze(&page);

        // 100 - 40 (viewport) - 30 (targets) - 30 (fonts)
        assert_eq!(result.score, 0);
        assert_eq!(result.recommendations.len(), 3);
    }
}
