//! Amendment tags and bracketed annotations.
//!
//! Statute text carries two kinds of bracketed notes:
//! - `<개정 2020.1.1, 2021.3.15>` amendment tags, parsed into
//!   [`AmendmentTag`] records (one per date);
//! - `[본조신설 2019.1.15]`-style notes and any other bracketed remark,
//!   kept verbatim as plain annotations and never read as amendment tags.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::types::{parse_change_date, AmendmentKind, AmendmentTag};

/// Amendment tag: `<type date(, date)*>`.
///
/// Dates are "YYYY.M.D"; PDF text often prints them as "2019. 12. 26.", so
/// whitespace after the dots and a trailing dot are tolerated.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static AMENDMENT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<\s*(개정|신설|삭제|타법개정)\s*(\d{4}\.\s*\d{1,2}\.\s*\d{1,2}\.?(?:\s*,\s*\d{4}\.\s*\d{1,2}\.\s*\d{1,2}\.?)*)\s*>",
    )
    .expect("valid regex")
});

/// One date inside an amendment tag.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TAG_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\.\s*(\d{1,2})\.\s*(\d{1,2})").expect("valid regex")
});

/// Angle-bracket note.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ANGLE_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>]+)>").expect("valid regex"));

/// Square-bracket note.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SQUARE_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]+)\]").expect("valid regex"));

/// Extract every amendment record from `text`.
///
/// # Examples
/// ```
/// use lawchunk_ingest::amendment::extract_amendments;
///
/// let tags = extract_amendments("<개정 2020.1.1, 2021.3.15>");
/// assert_eq!(tags.len(), 2);
/// assert_eq!(tags[1].date, "2021.3.15");
/// ```
#[must_use]
pub fn extract_amendments(text: &str) -> Vec<AmendmentTag> {
    let mut tags = Vec::new();
    for caps in AMENDMENT_TAG.captures_iter(text) {
        let Some(kind) = AmendmentKind::from_label(&caps[1]) else {
            continue;
        };
        for date in TAG_DATE.captures_iter(&caps[2]) {
            tags.push(AmendmentTag::new(
                kind,
                format!("{}.{}.{}", &date[1], &date[2], &date[3]),
            ));
        }
    }
    tags
}

/// Bracketed notes removed from a piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    /// Notes that are not amendment tags, in order of appearance
    /// (angle-bracket notes first, then square-bracket notes).
    pub notes: Vec<String>,

    /// Amendment records from angle-bracket tags.
    pub amendments: Vec<AmendmentTag>,

    /// The text with every bracketed note removed.
    pub text: String,
}

/// Remove `<...>` and `[...]` notes from `text`.
///
/// Amendment tags become [`AmendmentTag`] records; everything else is kept
/// as a plain note. Square-bracket notes are never parsed as amendments,
/// even when they mention amendment words.
#[must_use]
pub fn strip_annotations(text: &str) -> Annotations {
    let mut notes = Vec::new();
    let mut amendments = Vec::new();

    for caps in ANGLE_NOTE.captures_iter(text) {
        let tags = extract_amendments(&caps[0]);
        if tags.is_empty() {
            notes.push(collapse(&caps[1]));
        } else {
            amendments.extend(tags);
        }
    }
    let without_angle = ANGLE_NOTE.replace_all(text, "");

    for caps in SQUARE_NOTE.captures_iter(&without_angle) {
        notes.push(collapse(&caps[1]));
    }
    let without_square = SQUARE_NOTE.replace_all(&without_angle, "");

    Annotations {
        notes,
        amendments,
        text: without_square.trim().to_string(),
    }
}

fn collapse(note: &str) -> String {
    note.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Distinct change dates, oldest first.
///
/// Dates that are not real calendar dates keep their input order after the
/// valid ones.
#[must_use]
pub fn distinct_change_dates(tags: &[AmendmentTag]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dates: Vec<&str> = tags
        .iter()
        .map(|t| t.date.as_str())
        .filter(|d| seen.insert(*d))
        .collect();
    // Stable sort keeps the original order among equal keys
    dates.sort_by_key(|d| match parse_change_date(d) {
        Some(date) => (0, Some(date)),
        None => (1, None),
    });
    dates.into_iter().map(String::from).collect()
}
