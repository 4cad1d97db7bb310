//! HTML event page scraping.
//!
//! Fallback for events the API does not know: the public event page is
//! parsed with `scraper` and its visible text is matched against the date
//! layouts Campfire pages use. Wall-clock times on the page are read in the
//! configured display timezone.

use std::sync::LazyLock;

use campfire_core::{EventRecord, EventSpan, NormalizerConfig, local_to_utc};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Headings and paragraphs, in document order.
static FLOW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, p").expect("Invalid flow selector"));

/// Elements whose text is never page content.
const NON_CONTENT: &[&str] = &["script", "style", "noscript", "template", "title"];

/// `July 15, 2025 7:00 PM – 9:00 PM` (en dash, em dash or hyphen).
static RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<date>[A-Z][a-z]+\.? \d{1,2}, \d{4}),? (?:at )?(?P<start>\d{1,2}:\d{2} ?[AaPp]\.?[Mm]\.?) ?[–—-] ?(?P<end>\d{1,2}:\d{2} ?[AaPp]\.?[Mm]\.?)",
    )
    .expect("Invalid time range regex")
});

/// `Start: July 15, 2025 7:00 PM`
static START_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Start:\s*(?P<date>[A-Z][a-z]+\.? \d{1,2}, \d{4}),? (?:at )?(?P<time>\d{1,2}:\d{2} ?[AaPp]\.?[Mm]\.?)",
    )
    .expect("Invalid start regex")
});

/// `End: July 15, 2025 9:00 PM` or `End: 9:00 PM`
static END_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"End:\s*(?:(?P<date>[A-Z][a-z]+\.? \d{1,2}, \d{4}),? (?:at )?)?(?P<time>\d{1,2}:\d{2} ?[AaPp]\.?[Mm]\.?)",
    )
    .expect("Invalid end regex")
});

/// Scrapes an event page into an [`EventRecord`].
///
/// The attendee count is always zero since pages do not list RSVPs.
///
/// # Errors
///
/// Returns a parse error when the page has no `<h2>` title or no
/// recognizable date.
pub fn scrape_event(
    html: &str,
    page_url: &str,
    config: &NormalizerConfig,
) -> ProviderResult<EventRecord> {
    let document = Html::parse_document(html);

    let (title, description) = heading_and_paragraph(&document)
        .ok_or_else(|| ProviderError::parse("event page has no title heading"))?;
    let text_blocks = text_blocks(&document);
    let span = find_span(&text_blocks.join(" "), config)?;

    let location = text_blocks
        .iter()
        .find(|block| block.contains(',') && block.contains("United"))
        .cloned()
        .or_else(|| {
            let url = page_url.trim();
            (!url.is_empty()).then(|| url.to_string())
        })
        .unwrap_or_else(|| config.fallback_location.clone());

    debug!("scraped {:?} at {} from {}", title, span.start(), page_url);

    Ok(EventRecord::new(title, span, config.timezone)
        .with_description(description)
        .with_location(location)
        .with_source_url(page_url.trim()))
}

/// Whitespace-collapsed text of an element.
fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first non-empty `<h2>` and the text of the first `<p>` after it
/// (empty if none).
fn heading_and_paragraph(document: &Html) -> Option<(String, String)> {
    let flow: Vec<ElementRef<'_>> = document.select(&FLOW_SELECTOR).collect();
    let (at, title) = flow
        .iter()
        .enumerate()
        .filter(|(_, el)| el.value().name() == "h2")
        .map(|(i, el)| (i, element_text(*el)))
        .find(|(_, text)| !text.is_empty())?;

    let description = flow[at + 1..]
        .iter()
        .find(|el| el.value().name() == "p")
        .map(|el| element_text(*el))
        .unwrap_or_default();

    Some((title, description))
}

/// Non-empty visible text nodes of the page, whitespace collapsed.
fn text_blocks(document: &Html) -> Vec<String> {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| NON_CONTENT.contains(&el.name()))
            });
            (!hidden).then(|| collapse_whitespace(text))
        })
        .filter(|block| !block.is_empty())
        .collect()
}

/// Finds the event time in the page text.
fn find_span(text: &str, config: &NormalizerConfig) -> ProviderResult<EventSpan> {
    for caps in RANGE_REGEX.captures_iter(text) {
        let Some(date) = parse_date(&caps["date"]) else {
            continue;
        };
        let (Some(start), Some(end)) = (parse_clock(&caps["start"]), parse_clock(&caps["end"]))
        else {
            continue;
        };
        return build_span(date.and_time(start), Some(date.and_time(end)), config);
    }

    if let Some(caps) = START_REGEX.captures(text) {
        if let (Some(date), Some(time)) = (parse_date(&caps["date"]), parse_clock(&caps["time"])) {
            let start = date.and_time(time);
            let end = END_REGEX
                .captures(text)
                .and_then(|end| parse_end(&end, date));
            return build_span(start, end, config);
        }
    }

    Err(ProviderError::parse("no event time found on page"))
}

fn parse_end(caps: &Captures<'_>, start_date: NaiveDate) -> Option<NaiveDateTime> {
    let date = match caps.name("date") {
        Some(m) => parse_date(m.as_str())?,
        None => start_date,
    };
    Some(date.and_time(parse_clock(&caps["time"])?))
}

/// Converts wall-clock times to a span, rolling an earlier end to the next
/// day.
fn build_span(
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
    config: &NormalizerConfig,
) -> ProviderResult<EventSpan> {
    let start_utc = local_to_utc(start, &config.timezone)?;

    let end_utc = match end {
        Some(end) => {
            let end = if end < start {
                end + Duration::days(1)
            } else {
                end
            };
            Some(local_to_utc(end, &config.timezone)?)
        }
        None => None,
    };

    Ok(EventSpan::new(start_utc, end_utc, config.assumed_duration))
}

/// `July 15, 2025` or `Jul. 15, 2025`.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.replace('.', "");
    NaiveDate::parse_from_str(&value, "%B %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(&value, "%b %d, %Y"))
        .ok()
}

/// `7:00 PM`, `7:00pm` or `7:00 p.m.`.
fn parse_clock(value: &str) -> Option<NaiveTime> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect::<String>()
        .to_ascii_uppercase();
    let (clock, meridiem) = compact.split_at(compact.len().checked_sub(2)?);
    NaiveTime::parse_from_str(&format!("{} {}", clock, meridiem), "%I:%M %p").ok()
}
