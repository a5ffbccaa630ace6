//! Generic marker-based splitting.

use regex::{Captures, Regex};

use super::types::{Segment, Split};

/// Split `text` at every marker match that `label` accepts.
///
/// Rejected matches are not boundaries and stay inside the surrounding
/// segment. When nothing is accepted the whole text is the intro.
///
/// # Examples
/// ```
/// use lawchunk_ingest::splitting::split_on_marker;
/// use regex::Regex;
///
/// let marker = Regex::new(r"(?m)^(\d+)\.\s").unwrap();
/// let split = split_on_marker("다음과 같다.\n1. 추락\n2. 낙하", &marker, |c| {
///     Some(c[1].to_string())
/// });
/// assert_eq!(split.intro, "다음과 같다.\n");
/// assert_eq!(split.segments[1].body, "낙하");
/// ```
pub fn split_on_marker<'a, L>(
    text: &'a str,
    marker: &Regex,
    label: impl Fn(&Captures<'_>) -> Option<L>,
) -> Split<'a, L> {
    let boundaries: Vec<(L, usize, usize)> = marker
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            label(&caps).map(|l| (l, whole.start(), whole.end()))
        })
        .collect();

    let intro_end = boundaries.first().map_or(text.len(), |(_, start, _)| *start);
    let next_starts: Vec<usize> = boundaries
        .iter()
        .skip(1)
        .map(|(_, start, _)| *start)
        .chain(std::iter::once(text.len()))
        .collect();

    let segments = boundaries
        .into_iter()
        .zip(next_starts)
        .map(|((label, offset, body_start), body_end)| Segment {
            label,
            offset,
            body: &text[body_start..body_end],
        })
        .collect();

    Split {
        intro: &text[..intro_end],
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn digits() -> Regex {
        Regex::new(r"(?m)^(\d{1,2})\.\s").unwrap()
    }

    #[test]
    fn test_no_marker_keeps_text_as_intro() {
        let split = split_on_marker("마커가 없는 본문", &digits(), |c| Some(c[1].to_string()));
        assert!(split.is_flat());
        assert_eq!(split.intro, "마커가 없는 본문");
    }

    #[test]
    fn test_segments_tile_the_text() {
        let text = "머리말\n1. 첫째\n2. 둘째\n3. 셋째";
        let split = split_on_marker(text, &digits(), |c| Some(c[1].to_string()));
        assert_eq!(split.segments.len(), 3);

        let mut rebuilt = split.intro.to_string();
        for segment in &split.segments {
            let marker_end = segment.offset + format!("{}. ", segment.label).len();
            rebuilt.push_str(&text[segment.offset..marker_end]);
            rebuilt.push_str(segment.body);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_rejected_markers_stay_in_body() {
        let text = "1. 하나\n0. 영\n2. 둘";
        let split = split_on_marker(text, &digits(), |c| {
            c[1].parse::<u8>().ok().filter(|n| *n > 0).map(|n| n.to_string())
        });
        let bodies: Vec<_> = split.segments.iter().map(|s| s.body).collect();
        assert_eq!(bodies, vec!["하나\n0. 영\n", "둘"]);
    }

    #[test]
    fn test_offsets_point_at_markers() {
        let text = "가\n1. 나";
        let split = split_on_marker(text, &digits(), |c| Some(c[1].to_string()));
        assert_eq!(&text[split.segments[0].offset..], "1. 나");
    }
}
