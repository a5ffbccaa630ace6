//! Mapping between offsets in the joined document text and PDF pages.

/// Monotonic `[start, end)` byte ranges of each page in the joined text.
///
/// The joined text is every page followed by one `"\n"`, so each page
/// covers its own length plus the separator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSpans {
    spans: Vec<(usize, usize)>,
}

impl PageSpans {
    /// Compute spans for pages joined with a trailing newline each.
    ///
    /// # Examples
    /// ```
    /// use lawchunk_ingest::annex::PageSpans;
    ///
    /// let spans = PageSpans::from_pages(&["abc", "", "de"]);
    /// assert_eq!(spans.index_to_page(0), Some(1));
    /// assert_eq!(spans.index_to_page(4), Some(2));
    /// assert_eq!(spans.index_to_page(5), Some(3));
    /// ```
    #[must_use]
    pub fn from_pages<S: AsRef<str>>(pages: &[S]) -> Self {
        let mut cursor = 0;
        let spans = pages
            .iter()
            .map(|page| {
                let start = cursor;
                cursor += page.as_ref().len() + 1;
                (start, cursor)
            })
            .collect();
        Self { spans }
    }

    /// Join pages the way the spans expect.
    #[must_use]
    pub fn join<S: AsRef<str>>(pages: &[S]) -> String {
        let mut text = String::new();
        for page in pages {
            text.push_str(page.as_ref());
            text.push('\n');
        }
        text
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether there are no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// 1-based page containing byte `index`.
    ///
    /// Offsets past the end map to the last page; `None` only when there
    /// are no pages.
    #[must_use]
    pub fn index_to_page(&self, index: usize) -> Option<usize> {
        let position = self.spans.partition_point(|(_, end)| *end <= index);
        if position < self.spans.len() {
            Some(position + 1)
        } else if self.spans.is_empty() {
            None
        } else {
            Some(self.spans.len())
        }
    }

    /// 1-based pages overlapping `[start, end)`, ascending.
    #[must_use]
    pub fn span_to_pages(&self, start: usize, end: usize) -> Vec<usize> {
        self.spans
            .iter()
            .enumerate()
            .filter(|(_, (s, e))| start < *e && *s < end)
            .map(|(i, _)| i + 1)
            .collect()
    }
}
