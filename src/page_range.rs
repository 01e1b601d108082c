use anyhow::{anyhow, Result};
use serde::Serialize;

/// Inclusive, 1-indexed page selection.
///
/// A `PageRange` may hold values that do not fit the loaded document while it
/// is being edited; [`is_valid`] decides whether it can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl Default for PageRange {
    fn default() -> Self {
        PageRange { start: 1, end: 1 }
    }
}

/// Returns true iff `[start, end]` selects at least one page of a document
/// with `total_pages` pages.
pub fn is_valid(start: u32, end: u32, total_pages: u32) -> bool {
    total_pages > 0 && start >= 1 && end >= start && end <= total_pages
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageRef {
    Number(u32),
    End,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        PageRange { start, end }
    }

    /// The whole document.
    pub fn all(total_pages: u32) -> Self {
        PageRange {
            start: 1,
            end: total_pages,
        }
    }

    pub fn is_valid_for(&self, total_pages: u32) -> bool {
        is_valid(self.start, self.end, total_pages)
    }

    /// Number of pages selected. Zero for a reversed range, saturating at
    /// `u32::MAX`.
    pub fn len(&self) -> u32 {
        if self.end >= self.start {
            (self.end - self.start).saturating_add(1)
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-based page indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        if self.is_empty() || self.start == 0 {
            return Vec::new();
        }
        ((self.start - 1) as usize..self.end as usize).collect()
    }

    /// Parse a single range like "3-5", "7" or "4-end".
    ///
    /// `end` resolves against `total_pages`. The result is not validated.
    pub fn parse(s: &str, total_pages: u32) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow!("Empty page range"));
        }
        if s.contains(',') {
            return Err(anyhow!("Only a single page range is supported: {}", s));
        }

        let (start, end) = if let Some(dash_pos) = s.find('-') {
            // "-5" is not a range
            if dash_pos == 0 {
                return Err(anyhow!("Invalid page range: {}", s));
            }
            let start = parse_page_ref(&s[..dash_pos])?;
            let end = parse_page_ref(&s[dash_pos + 1..])?;
            (start, end)
        } else {
            let page = parse_page_ref(s)?;
            (page.clone(), page)
        };

        let resolve = |r: PageRef| match r {
            PageRef::Number(n) => n,
            PageRef::End => total_pages,
        };

        Ok(PageRange {
            start: resolve(start),
            end: resolve(end),
        })
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

fn parse_page_ref(s: &str) -> Result<PageRef> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        Ok(PageRef::End)
    } else {
        s.parse::<u32>()
            .map(PageRef::Number)
            .map_err(|_| anyhow!("Invalid page number: {}", s))
    }
}
