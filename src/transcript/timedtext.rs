//! Parsing of YouTube timedtext XML.

use super::TranscriptSegment;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static TEXT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("text").expect("text selector"));

/// Parse a timedtext document into segments.
///
/// Caption text is escaped twice in the wild (`&amp;#39;`, `&lt;font&gt;`), so
/// the decoded element text is parsed once more as HTML to unescape the rest
/// and drop formatting tags. Elements without text are skipped.
pub fn parse_timedtext(xml: &str) -> Vec<TranscriptSegment> {
    let document = Html::parse_fragment(xml);

    document
        .select(&TEXT_SELECTOR)
        .filter_map(|element| {
            let raw: String = element.text().collect();
            if raw.is_empty() {
                return None;
            }
            let text = strip_markup(&raw);

            let start = parse_seconds(element.value().attr("start"));
            let duration = parse_seconds(element.value().attr("dur"));
            Some(TranscriptSegment::new(text, start, duration))
        })
        .collect()
}

fn strip_markup(text: &str) -> String {
    if !text.contains('<') && !text.contains('&') {
        return text.to_string();
    }
    Html::parse_fragment(text)
        .root_element()
        .text()
        .collect()
}

fn parse_seconds(value: Option<&str>) -> f64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0.0)
}
