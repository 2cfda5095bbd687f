use scraper::{Html, Selector};
use url::Url;

/// Social metadata pulled from `og:*` properties.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct OpenGraphTags {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub kind: Option<String>,
}

impl OpenGraphTags {
    pub fn any_present(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.image.is_some()
            || self.url.is_some()
            || self.kind.is_some()
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TwitterTags {
    pub card: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl TwitterTags {
    pub fn any_present(&self) -> bool {
        self.card.is_some()
            || self.title.is_some()
            || self.description.is_some()
            || self.image.is_some()
    }
}

/// Everything the sub-analyzers need, extracted from the raw HTML in one
/// pass. `scraper::Html` is not `Send`, so the parse happens up front and
/// only this plain struct crosses await points in the worker.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractedPage {
    pub url: String,
    pub path: String,

    // Metadata
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub author: Option<String>,
    pub canonical: Option<String>,
    pub robots: Option<String>,
    pub viewport: Option<String>,
    pub open_graph: OpenGraphTags,
    pub twitter: TwitterTags,
    pub hreflang: Vec<String>,

    // Structure
    pub h1_tags: Vec<String>,
    pub h2_tags: Vec<String>,
    pub heading_count: usize,
    pub paragraph_count: usize,
    pub list_count: usize,
    pub first_paragraphs: Vec<String>,
    pub img_without_alt: usize,
    pub internal_links: usize,
    pub external_links: usize,

    // Technical markers
    pub json_ld_count: usize,
    pub microdata_count: usize,
    pub has_sitemap_link: bool,

    // Mobile markers
    pub has_theme_color: bool,
    pub has_apple_touch_icon: bool,
    pub touch_target_total: usize,
    pub touch_target_small: usize,
    pub small_inline_fonts: usize,
    pub small_class_elements: usize,

    /// Text of the main content region (nav/footer excluded where the page
    /// marks one up), whitespace-collapsed.
    pub main_text: String,
}

impl ExtractedPage {
    pub fn from_html(html: &str, url: &str) -> Self {
        let document = Html::parse_document(html);

        let path = Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_default();

        let title = select_text(&document, "title");
        let meta_description = meta_content(&document, "description");
        let meta_keywords = meta_content(&document, "keywords");
        let author = meta_content(&document, "author");
        let robots = meta_content(&document, "robots");
        let viewport = meta_content(&document, "viewport");
        let canonical = attr_of(&document, r#"link[rel="canonical"]"#, "href");

        let open_graph = OpenGraphTags {
            title: og_content(&document, "og:title"),
            description: og_content(&document, "og:description"),
            image: og_content(&document, "og:image"),
            url: og_content(&document, "og:url"),
            kind: og_content(&document, "og:type"),
        };
        let twitter = TwitterTags {
            card: meta_content(&document, "twitter:card"),
            title: meta_content(&document, "twitter:title"),
            description: meta_content(&document, "twitter:description"),
            image: meta_content(&document, "twitter:image"),
        };

        let hreflang_selector = Selector::parse(r#"link[rel="alternate"][hreflang]"#).unwrap();
        let hreflang = document
            .select(&hreflang_selector)
            .filter_map(|el| el.value().attr("hreflang").map(|v| v.to_string()))
            .collect();

        let h1_tags = all_text(&document, "h1");
        let h2_tags = all_text(&document, "h2");
        let heading_selector = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
        let heading_count = document.select(&heading_selector).count();

        let p_selector = Selector::parse("p").unwrap();
        let paragraphs: Vec<String> = document
            .select(&p_selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect();
        let paragraph_count = paragraphs.len();
        let first_paragraphs = paragraphs.into_iter().take(2).collect();

        let list_selector = Selector::parse("ul, ol").unwrap();
        let list_count = document.select(&list_selector).count();

        let img_selector = Selector::parse("img").unwrap();
        let img_without_alt = document
            .select(&img_selector)
            .filter(|img| img.value().attr("alt").map_or(true, |a| a.is_empty()))
            .count();

        let a_selector = Selector::parse("a[href]").unwrap();
        let mut internal_links = 0;
        let mut external_links = 0;
        let mut has_sitemap_link = false;
        for a in document.select(&a_selector) {
            let href = a.value().attr("href").unwrap_or("");
            if href.contains("sitemap.xml") {
                has_sitemap_link = true;
            }
            if href.starts_with('/') {
                internal_links += 1;
            } else if Url::parse(href).map_or(false, |u| u.host_str().is_some()) {
                external_links += 1;
            }
        }

        let json_ld_selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
        let json_ld_count = document.select(&json_ld_selector).count();

        let itemtype_selector = Selector::parse("[itemtype]").unwrap();
        let microdata_count = document
            .select(&itemtype_selector)
            .filter(|el| {
                el.value()
                    .attr("itemtype")
                    .map_or(false, |v| v.contains("schema.org"))
            })
            .count();

        let has_theme_color = meta_content(&document, "theme-color").is_some();
        let has_apple_touch_icon = document
            .select(&Selector::parse(r#"link[rel="apple-touch-icon"]"#).unwrap())
            .next()
            .is_some();

        let (touch_target_total, touch_target_small) = count_touch_targets(&document);
        let (small_inline_fonts, small_class_elements) = count_small_fonts(&document);

        let main_text = extract_main_text(&document);

        ExtractedPage {
            url: url.to_string(),
            path,
            title,
            meta_description,
            meta_keywords,
            author,
            canonical,
            robots,
            viewport,
            open_graph,
            twitter,
            hreflang,
            h1_tags,
            h2_tags,
            heading_count,
            paragraph_count,
            list_count,
            first_paragraphs,
            img_without_alt,
            internal_links,
            external_links,
            json_ld_count,
            microdata_count,
            has_sitemap_link,
            has_theme_color,
            has_apple_touch_icon,
            touch_target_total,
            touch_target_small,
            small_inline_fonts,
            small_class_elements,
            main_text,
        }
    }

    /// Meta description with the classic first-paragraphs fallback.
    pub fn description_or_fallback(&self) -> Option<String> {
        if let Some(desc) = &self.meta_description {
            if !desc.trim().is_empty() {
                return Some(desc.trim().to_string());
            }
        }
        if self.first_paragraphs.is_empty() {
            None
        } else {
            Some(self.first_paragraphs.join(" "))
        }
    }
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn all_text(document: &Html, selector: &str) -> Vec<String> {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn meta_content(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[name="{}"]"#, name)).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn og_content(document: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[property="{}"]"#, property)).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn attr_of(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pull a pixel value out of an inline style, e.g. `style_px("width: 30px", "width")`.
/// Matches whole declarations only, so `width` does not hit `max-width`.
fn style_px(style: &str, property: &str) -> Option<u32> {
    let lower = style.to_lowercase();
    for declaration in lower.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        if name.trim() != property {
            continue;
        }
        return value.trim().strip_suffix("px")?.trim().parse().ok();
    }
    None
}

fn count_touch_targets(document: &Html) -> (usize, usize) {
    let selector = Selector::parse(
        r#"a, button, input[type="button"], input[type="submit"], input[type="checkbox"], input[type="radio"]"#,
    )
    .unwrap();

    let mut total = 0;
    let mut small = 0;
    for el in document.select(&selector) {
        total += 1;
        let classes: Vec<&str> = el
            .value()
            .attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        let style = el.value().attr("style").unwrap_or("");

        if classes.contains(&"btn-sm")
            || classes.contains(&"small")
            || style_px(style, "width").map_or(false, |w| w < 40)
        {
            small += 1;
        }
    }
    (total, small)
}

fn count_small_fonts(document: &Html) -> (usize, usize) {
    let styled = Selector::parse("[style]").unwrap();
    let inline = document
        .select(&styled)
        .filter(|el| {
            el.value()
                .attr("style")
                .and_then(|s| style_px(s, "font-size"))
                .map_or(false, |px| px < 12)
        })
        .count();

    let classed = Selector::parse("[class]").unwrap();
    let small_classes = ["small", "text-xs", "text-sm", "fine-print"];
    let by_class = document
        .select(&classed)
        .filter(|el| {
            el.value().attr("class").map_or(false, |c| {
                c.split_whitespace().any(|cls| small_classes.contains(&cls))
            })
        })
        .count();

    (inline, by_class)
}

/// Main content area lookup, preferring semantic containers and falling
/// back to the whole body.
fn extract_main_text(document: &Html) -> String {
    let candidates = [
        "main",
        "#content",
        "#main-content",
        ".content",
        ".main-content",
        "article",
        "body",
    ];
    for candidate in candidates {
        let selector = Selector::parse(candidate).unwrap();
        if let Some(el) = document.select(&selector).next() {
            let text = collapse_whitespace(&el.text().collect::<String>());
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::ExtractedPage;

    const PAGE: &str = r##"
        <!DOCTYPE html>
        <html>
            <head>
                <meta charset="utf-8">
                <title>Green Tea Shop - Organic Teas</title>
                <meta name="description" content="Buy organic green tea online with free shipping.">
                <meta name="keywords" content="green tea, organic, shop">
                <meta name="viewport" content="width=device-width, initial-scale=1">
                <meta name="robots" content="index, follow">
                <meta name="theme-color" content="#00aa55">
                <meta property="og:title" content="Green Tea Shop">
                <link rel="canonical" href="https://greentea.example/shop">
                <link rel="alternate" hreflang="en" href="https://greentea.example/en">
                <link rel="alternate" hreflang="de" href="https://greentea.example/de">
                <script type="application/ld+json">{"@type": "Store"}</script>
            </head>
            <body>
                <main>
                    <h1>Organic Green Tea</h1>
                    <h2>Why our tea</h2>
                    <p>Hand picked leaves from mountain farms.</p>
                    <p>Shipped fresh to your door.</p>
                    <ul><li>Sencha</li><li>Matcha</li></ul>
                    <a href="/shop">Shop</a>
                    <a href="/about">About</a>
                    <a href="https://partner.example/deal">Partner</a>
                    <a href="/sitemap.xml">Sitemap</a>
                    <img src="a.png" alt="Tea field">
                    <img src="b.png">
                    <button class="btn-sm">Buy</button>
                    <span style="font-size: 10px">fine print</span>
                </main>
            </body>
        </html>
    "##;

    #[test]
    fn extracts_metadata_and_structure() {
        let page = ExtractedPage::from_html(PAGE, "https://greentea.example/shop");

        assert_eq!(page.title.as_deref(), Some("Green Tea Shop - Organic Teas"));
        assert_eq!(
            page.meta_description.as_deref(),
            Some("Buy organic green tea online with free shipping.")
        );
        assert_eq!(page.canonical.as_deref(), Some("https://greentea.example/shop"));
        assert!(page.open_graph.any_present());
        assert!(!page.twitter.any_present());
        assert_eq!(page.hreflang, vec!["en", "de"]);
        assert_eq!(page.h1_tags, vec!["Organic Green Tea"]);
        assert_eq!(page.heading_count, 2);
        assert_eq!(page.paragraph_count, 2);
        assert_eq!(page.list_count, 1);
        assert_eq!(page.img_without_alt, 1);
        assert_eq!(page.internal_links, 3);
        assert_eq!(page.external_links, 1);
        assert!(page.has_sitemap_link);
        assert_eq!(page.json_ld_count, 1);
        assert!(page.has_theme_color);
        assert!(page.main_text.contains("Hand picked leaves"));
    }

    #[test]
    fn counts_mobile_markers() {
        let page = ExtractedPage::from_html(PAGE, "https://greentea.example/shop");

        // 4 links + 1 button
        assert_eq!(page.touch_target_total, 5);
        assert_eq!(page.touch_target_small, 1);
        assert_eq!(page.small_inline_fonts, 1);
    }

    #[test]
    fn width_matching_ignores_max_width_declarations() {
        let html = r#"<html><body>
            <a href="/wide" style="max-width: 30px">wide enough</a>
            <a href="/narrow" style="color: red; width: 30px;">small</a>
            <span style="min-font-size: 8px">not a font-size</span>
        </body></html>"#;
        let page = ExtractedPage::from_html(html, "https://example.com");

        assert_eq!(page.touch_target_total, 2);
        assert_eq!(page.touch_target_small, 1);
        assert_eq!(page.small_inline_fonts, 0);
    }

    #[test]
    fn description_falls_back_to_first_paragraphs() {
        let html = "<html><body><p>First.</p><p>Second.</p><p>Third.</p></body></html>";
        let page = ExtractedPage::from_html(html, "https://example.com");

        assert!(page.meta_description.is_none());
        assert_eq!(page.description_or_fallback().as_deref(), Some("First. Second."));
    }

    #[test]
    fn empty_page_yields_conservative_defaults() {
        let page = ExtractedPage::from_html("<html><body></body></html>", "https://example.com");

        assert!(page.title.is_none());
        assert!(page.description_or_fallback().is_none());
        assert_eq!(page.heading_count, 0);
        assert_eq!(page.touch_target_total, 0);
    }
}
