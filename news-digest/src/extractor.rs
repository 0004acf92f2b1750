use crate::utils::text;
use chrono::{DateTime, NaiveDateTime, Utc};
use scraper::{Html, Selector};
use tracing::debug;

const PUBLISHED_META: &str = r#"meta[property="article:published_time"]"#;

/// Body text and publish time pulled out of one article page.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub word_count: usize,
    pub published: DateTime<Utc>,
    /// False when `published` is the wall-clock fallback.
    pub published_known: bool,
}

pub struct ContentExtractor {
    max_chars: usize,
    min_word_count: usize,
}

impl ContentExtractor {
    pub fn new(max_chars: usize, min_word_count: usize) -> Self {
        Self {
            max_chars,
            min_word_count,
        }
    }

    /// Text of every `<p>` element, truncated to `max_chars`, plus the
    /// `article:published_time` meta value.
    ///
    /// A missing or unparseable publish time falls back to the current time,
    /// which makes "unknown" indistinguishable from "just published" unless
    /// `published_known` is checked.
    pub fn extract(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);
        let text = self.paragraph_text(&document);
        let word_count = text::word_count(&text);
        let (published, published_known) = match published_time(&document) {
            Some(published) => (published, true),
            None => (Utc::now(), false),
        };

        Extraction {
            text,
            word_count,
            published,
            published_known,
        }
    }

    /// Admission floor: enough words to be worth summarizing.
    pub fn admits(&self, extraction: &Extraction) -> bool {
        extraction.word_count >= self.min_word_count
    }

    fn paragraph_text(&self, document: &Html) -> String {
        let Ok(selector) = Selector::parse("p") else {
            return String::new();
        };

        let paragraphs: Vec<String> = document
            .select(&selector)
            .map(|el| text::collapse_whitespace(&el.text().collect::<String>()))
            .filter(|p| !p.is_empty())
            .collect();

        text::truncate_chars(&paragraphs.join(" "), self.max_chars).to_string()
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(2000, 100)
    }
}

fn published_time(document: &Html) -> Option<DateTime<Utc>> {
    let selector = Selector::parse(PUBLISHED_META).ok()?;
    let raw = document
        .select(&selector)
        .find_map(|el| el.value().attr("content"))?
        .trim();

    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        debug!("Unparseable article:published_time value: {:?}", raw);
    }
    parsed
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn page(meta: Option<&str>, paragraphs: &[&str]) -> String {
        let meta = meta
            .map(|m| format!(r#"<meta property="article:published_time" content="{}">"#, m))
            .unwrap_or_default();
        let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
        format!("<html><head>{}</head><body><div>{}</div></body></html>", meta, body)
    }

    #[test]
    fn test_extract_text_joins_paragraphs() {
        let html = page(None, &["First  paragraph.", "", "Second\n paragraph <b>bold</b>."]);
        let extractor = ContentExtractor::default();
        assert_eq!(extractor.extract(&html).text, "First paragraph. Second paragraph bold.");
    }

    #[test]
    fn test_extract_text_truncates() {
        let long = "word ".repeat(1000);
        let html = page(None, &[long.as_str()]);
        let extractor = ContentExtractor::new(2000, 100);
        assert_eq!(extractor.extract(&html).text.chars().count(), 2000);
    }

    #[test]
    fn test_extract_text_without_paragraphs_is_empty() {
        let extractor = ContentExtractor::default();
        assert_eq!(extractor.extract("<html><body><div>no p here</div></body></html>").text, "");
        assert_eq!(extractor.extract("not html at all").text, "");
    }

    #[test]
    fn test_published_time_formats() {
        let extractor = ContentExtractor::default();
        let expected = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();

        for raw in [
            "2024-03-09T14:30:00Z",
            "2024-03-09T15:30:00+01:00",
            "Sat, 09 Mar 2024 14:30:00 +0000",
            "2024-03-09T14:30:00",
        ] {
            let html = page(Some(raw), &["text"]);
            let extraction = extractor.extract(&html);
            assert!(extraction.published_known, "format {}", raw);
            assert_eq!(extraction.published, expected, "format {}", raw);
        }
    }

    #[test]
    fn test_published_time_falls_back_to_now() {
        let extractor = ContentExtractor::default();
        for html in [page(None, &["text"]), page(Some("last tuesday"), &["text"])] {
            let before = Utc::now();
            let extraction = extractor.extract(&html);
            assert!(!extraction.published_known);
            assert!(extraction.published >= before);
            assert!(extraction.published - before < Duration::seconds(5));
        }
    }

    #[test]
    fn test_admission_floor() {
        let extractor = ContentExtractor::default();
        let short_body = "word ".repeat(40);
        let first = "word ".repeat(300);
        let second = "more ".repeat(200);
        let short = page(None, &[short_body.as_str()]);
        let long = page(None, &[first.as_str(), second.as_str()]);

        assert!(!extractor.admits(&extractor.extract(&short)));
        // 500 words, truncated to 2000 chars, still clears the floor
        assert!(extractor.admits(&extractor.extract(&long)));

        let exact_body = "word ".repeat(100);
        let exact = page(None, &[exact_body.as_str()]);
        assert!(extractor.admits(&extractor.extract(&exact)));
    }
}
