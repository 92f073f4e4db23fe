//! Page selection
//!
//! Selectors address pages by 0-based index, either one page or an inclusive
//! range. They are validated against the page count before any text is read.

use crate::error::CompareError;
use compare_types::PageSelector;
use std::collections::BTreeSet;

/// Parse a selector string like "0, 2-4, 7"
pub fn parse_page_selectors(input: &str) -> Result<Vec<PageSelector>, CompareError> {
    let mut selectors = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start
                .trim()
                .parse()
                .map_err(|_| CompareError::InvalidSelector(format!("Invalid start: {}", start)))?;
            let end: u32 = end
                .trim()
                .parse()
                .map_err(|_| CompareError::InvalidSelector(format!("Invalid end: {}", end)))?;

            if start > end {
                return Err(CompareError::InvalidSelector(format!(
                    "Start {} > end {}",
                    start, end
                )));
            }
            selectors.push(PageSelector::Range(start, end));
        } else {
            let page: u32 = part
                .parse()
                .map_err(|_| CompareError::InvalidSelector(format!("Invalid page: {}", part)))?;
            selectors.push(PageSelector::Index(page));
        }
    }

    if selectors.is_empty() {
        return Err(CompareError::InvalidSelector(
            "Page selection cannot be empty".to_string(),
        ));
    }

    Ok(selectors)
}

/// Resolve selectors to sorted, unique page indexes
///
/// `None` selects every page. Any index at or past `page_count` fails with
/// [`CompareError::PageOutOfRange`].
pub fn resolve_page_indexes(
    selectors: Option<&[PageSelector]>,
    page_count: u32,
) -> Result<Vec<u32>, CompareError> {
    let Some(selectors) = selectors else {
        return Ok((0..page_count).collect());
    };

    if selectors.is_empty() {
        return Err(CompareError::InvalidSelector(
            "Page selection cannot be empty".to_string(),
        ));
    }

    let mut pages = BTreeSet::new();
    for selector in selectors {
        let (start, end) = selector.bounds();
        if start > end {
            return Err(CompareError::InvalidSelector(format!(
                "Start {} > end {}",
                start, end
            )));
        }
        if end >= page_count {
            return Err(CompareError::PageOutOfRange {
                page_index: end,
                page_count,
            });
        }
        pages.extend(start..=end);
    }

    Ok(pages.into_iter().collect())
}
